//! Rate limiting middleware
//!
//! Runs admission control before the wrapped service. Denied requests are answered here with
//! 429 and never reach a handler; admitted responses are annotated with rate limit headers.

use crate::core::rate_limit::{
    AdmissionControl, AdmissionOutcome, AuthenticatedPrincipal, CallerContext,
};
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::{HttpMessage, HttpResponse};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Rate limit middleware for Actix-web
#[derive(Clone)]
pub struct RateLimitMiddleware {
    admission: Arc<AdmissionControl>,
}

impl RateLimitMiddleware {
    pub fn new(admission: Arc<AdmissionControl>) -> Self {
        Self { admission }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            admission: Arc::clone(&self.admission),
        }))
    }
}

/// Service implementation for rate limit middleware
pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    admission: Arc<AdmissionControl>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let admission = Arc::clone(&self.admission);

        Box::pin(async move {
            // The percent-decoded path the router matches on, not the raw request target
            let path = req.match_info().get_ref().path().to_string();
            if admission.should_bypass(&path) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let caller = {
                let extensions = req.extensions();
                let ctx = CallerContext {
                    headers: req.headers(),
                    principal: extensions
                        .get::<AuthenticatedPrincipal>()
                        .map(|principal| principal.0.as_str()),
                    peer_addr: req.peer_addr().map(|addr| addr.ip()),
                };
                admission.identify(&ctx)
            };

            let outcome = admission.check(&path, &caller).await;
            if !outcome.allowed() {
                let response = rate_limited_response(&outcome);
                return Ok(req.into_response(response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            insert_rate_limit_headers(res.headers_mut(), &outcome);
            Ok(res.map_into_left_body())
        })
    }
}

/// The 429 answer for a denied request
fn rate_limited_response(outcome: &AdmissionOutcome) -> HttpResponse {
    let mut response = HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, outcome.result.retry_after.to_string()))
        .json(serde_json::json!({
            "error": "Rate limit exceeded",
            "message": format!(
                "Too many requests to {} endpoints. Please try again later.",
                outcome.endpoint_class
            ),
            "retry_after": outcome.result.retry_after,
            "violations": outcome.result.violations,
            "type": "rate_limit_exceeded"
        }));
    insert_rate_limit_headers(response.headers_mut(), outcome);
    response
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, outcome: &AdmissionOutcome) {
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_LIMIT),
        HeaderValue::from(outcome.limit),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_REMAINING),
        HeaderValue::from(outcome.result.tokens_remaining),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_RESET),
        HeaderValue::from(outcome.reset_at),
    );
}
