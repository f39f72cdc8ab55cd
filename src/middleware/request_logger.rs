//! Access-log middleware.
//!
//! One structured line per completed request, tagged with a process-local
//! sequence number so interleaved requests can be told apart in the log.
//! Health probes are skipped to keep orchestrator noise out.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(0);

fn is_probe(path: &str) -> bool {
    path.ends_with("/health") || path.ends_with("/ready")
}

/// Access logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            if is_probe(&path) {
                return Ok(res);
            }

            let status = res.status();
            let duration_ms = start.elapsed().as_millis();

            if status.is_server_error() {
                error!(
                    target: "api",
                    seq,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status = status.as_u16(),
                    duration_ms,
                    "request failed"
                );
            } else if status.is_client_error() {
                warn!(
                    target: "api",
                    seq,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status = status.as_u16(),
                    duration_ms,
                    "request rejected"
                );
            } else {
                info!(
                    target: "api",
                    seq,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status = status.as_u16(),
                    duration_ms,
                    "request completed"
                );
            }

            Ok(res)
        })
    }
}
