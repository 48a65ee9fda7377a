//! Metrics Server
//!
//! Serves the registry in the Prometheus text format.
//!
//! - `GET /metrics` - current gauge values
//! - `GET /healthz` - liveness
//! - anything else - 404

use std::convert::Infallible;
use std::net::SocketAddr;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

/// Create the process-wide registry.
///
/// On Linux the process collector (CPU, memory, file descriptors) is
/// registered as well.
pub fn new_registry() -> Result<Registry> {
    let registry = Registry::new();

    #[cfg(target_os = "linux")]
    registry
        .register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
        .map_err(|e| Error::Internal(format!("Failed to register process collector: {}", e)))?;

    Ok(registry)
}

// =============================================================================
// Server
// =============================================================================

/// HTTP endpoint exposing a registry
pub struct MetricsServer {
    listener: TcpListener,
    registry: Registry,
}

impl MetricsServer {
    /// Bind the listening socket.
    ///
    /// Failing to bind is fatal for the process.
    pub async fn bind(addr: SocketAddr, registry: Registry) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        Ok(Self { listener, registry })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// Connections already accepted are left to finish on their own.
    pub async fn serve(self, shutdown: CancellationToken) {
        match self.listener.local_addr() {
            Ok(addr) => info!("Metrics server listening on {}", addr),
            Err(_) => info!("Metrics server listening"),
        }

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Received signal. Shutting down the metrics server.");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Metrics server accept error: {}", e);
                        continue;
                    }
                },
            };

            let io = TokioIo::new(stream);
            let registry = self.registry.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let response = route(&req, &registry);
                    async move { Ok::<_, Infallible>(response) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Metrics server connection error from {}: {}", peer, e);
                }
            });
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn route<B>(req: &Request<B>, registry: &Registry) -> Response<Full<Bytes>> {
    match req.uri().path() {
        "/metrics" => metrics_response(registry),
        "/healthz" => text_response(StatusCode::OK, "ok"),
        _ => text_response(StatusCode::NOT_FOUND, "not found"),
    }
}

fn metrics_response(registry: &Registry) -> Response<Full<Bytes>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return text_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics");
    }

    let mut response = Response::new(Full::new(Bytes::from(buffer)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(prometheus::TEXT_FORMAT));
    response
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_route_metrics() {
        let registry = Registry::new();
        let gauge = prometheus::Gauge::new("test_gauge", "help").unwrap();
        gauge.set(3.0);
        registry.register(Box::new(gauge)).unwrap();

        let response = route(&request("/metrics"), &registry);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], prometheus::TEXT_FORMAT);
    }

    #[test]
    fn test_route_health() {
        let response = route(&request("/healthz"), &Registry::new());
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_route_unknown_path() {
        let response = route(&request("/other"), &Registry::new());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_new_registry() {
        assert!(new_registry().is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let first = MetricsServer::bind("127.0.0.1:0".parse().unwrap(), Registry::new())
            .await
            .unwrap();
        let addr = first.local_addr().unwrap();

        let second = MetricsServer::bind(addr, Registry::new()).await;

        assert!(matches!(second, Err(Error::Bind { .. })));
    }
}
