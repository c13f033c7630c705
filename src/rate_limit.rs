//!
//! # Rate Limiting
//!
//! Per-client quota over the API, 10 requests per 5 minutes by default,
//! keyed by client IP so one busy client cannot exhaust anyone else's
//! allowance. The client address is taken from `X-Forwarded-For` when a
//! proxy supplies it, falling back to the peer address. Over-quota requests
//! fail `RateLimited` and go through the normal error responder like every
//! other failure.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use governor::{
    clock::DefaultClock, state::keyed::DashMapStateStore, Quota, RateLimiter,
};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, ErrorKind};

type IpLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>;

#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<IpLimiter>,
}

impl RateLimit {
    /// Allows `max_requests` per `window` per client address, with the full
    /// allowance available as a burst.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max = NonZeroU32::new(max_requests).expect("max_requests must be non-zero");
        let quota = Quota::with_period(window / max_requests)
            .expect("window must be non-zero")
            .allow_burst(max);

        Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(5 * 60))
    }
}

fn forwarded_ip(req: &ServiceRequest) -> Option<IpAddr> {
    req.headers()
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limiter: Arc<IpLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
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
        let client_ip = forwarded_ip(&req).or_else(|| req.peer_addr().map(|addr| addr.ip()));

        match client_ip {
            Some(ip) => {
                if self.limiter.check_key(&ip).is_err() {
                    return Box::pin(async move {
                        Err(AppError::new(ErrorKind::RateLimited).into())
                    });
                }
            }
            // A request with no determinable address (in-process test calls)
            // is not counted against any quota.
            None => log::warn!("could not determine client address for rate limiting"),
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use std::net::SocketAddr;

    /// Like `test::call_service`, but renders a service-level `Err` the way
    /// the HTTP layer would, so the middleware's error returns can be
    /// asserted on as responses.
    async fn call_rendered<S, B>(app: &S, req: actix_http::Request) -> ServiceResponse
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody + 'static,
    {
        match test::try_call_service(app, req).await {
            Ok(resp) => resp.map_into_boxed_body(),
            Err(err) => ServiceResponse::new(
                test::TestRequest::default().to_http_request(),
                err.error_response(),
            ),
        }
    }

    // `use actix_web::test` also pulls in actix's `#[test]` attribute macro,
    // so name the standard test attribute explicitly for this sync test.
    #[::core::prelude::v1::test]
    fn test_quota_exhaustion_is_per_key() {
        let limit = RateLimit::new(3, Duration::from_secs(60));
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limit.limiter.check_key(&first).is_ok());
        assert!(limit.limiter.check_key(&first).is_ok());
        assert!(limit.limiter.check_key(&first).is_ok());
        assert!(limit.limiter.check_key(&first).is_err());

        // A different client still has its full allowance.
        assert!(limit.limiter.check_key(&second).is_ok());
    }

    #[actix_rt::test]
    async fn test_one_client_cannot_exhaust_another() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(2, Duration::from_secs(60)))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let busy: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let quiet: SocketAddr = "10.0.0.2:4000".parse().unwrap();

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/ping")
                .peer_addr(busy)
                .to_request();
            assert!(call_rendered(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::get()
            .uri("/ping")
            .peer_addr(busy)
            .to_request();
        let resp = call_rendered(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let req = test::TestRequest::get()
            .uri("/ping")
            .peer_addr(quiet)
            .to_request();
        assert!(call_rendered(&app, req).await.status().is_success());
    }

    #[actix_rt::test]
    async fn test_forwarded_address_takes_precedence() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(1, Duration::from_secs(60)))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let proxy: SocketAddr = "10.0.0.1:4000".parse().unwrap();

        let req = test::TestRequest::get()
            .uri("/ping")
            .peer_addr(proxy)
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        assert!(call_rendered(&app, req).await.status().is_success());

        // Same proxy, different originating client: separate quota.
        let req = test::TestRequest::get()
            .uri("/ping")
            .peer_addr(proxy)
            .insert_header(("x-forwarded-for", "203.0.113.8"))
            .to_request();
        assert!(call_rendered(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri("/ping")
            .peer_addr(proxy)
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        let resp = call_rendered(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
