/// HTTP middleware utilities for asset-service
use actix_cors::Cors;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http, Error};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::config::CorsConfig;
use crate::metrics::Metrics;

/// CORS policy: read-only endpoints, any origin unless configured otherwise
pub fn cors(config: &CorsConfig) -> Cors {
    let base = Cors::default()
        .allowed_methods(vec![http::Method::GET, http::Method::HEAD])
        .allow_any_header()
        .max_age(3600);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return base.allow_any_origin();
    }

    config
        .allowed_origins
        .iter()
        .fold(base, |cors, origin| cors.allowed_origin(origin))
}

/// Counts responses by method and status
pub struct MetricsMiddleware {
    metrics: Metrics,
}

impl MetricsMiddleware {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
            metrics: self.metrics.clone(),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
    metrics: Metrics,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let metrics = self.metrics.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let status = match &res {
                Ok(response) => response.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };
            metrics.record_http_request(&method, status);

            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, status, %elapsed, "request completed");
            res
        })
    }
}
