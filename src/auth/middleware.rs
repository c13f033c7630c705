use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::error::{AppError, ErrorKind};
use crate::store::UserStore;

/// Per-request authentication gate.
///
/// The only place in the application that trusts a raw token. It extracts
/// the bearer token, verifies it, loads the acting user (password hash
/// excluded) and attaches it to the request; everything downstream works
/// with the already-resolved identity.
///
/// Outcomes, in order:
/// - no `Authorization: Bearer` header: `Unauthenticated`
/// - token invalid or expired: `TokenExpiredOrInvalid`
/// - token subject no longer exists: `NotFound`, reported with status 401
///   so a stale token cannot be used to probe which accounts exist
///
/// Collaborators are injected at construction; the middleware reads no
/// ambient state.
#[derive(Clone)]
pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
            users: Arc::clone(&self.users),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let service = Rc::clone(&self.service);
        let tokens = Arc::clone(&self.tokens);
        let users = Arc::clone(&self.users);

        Box::pin(async move {
            let bearer = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let token = bearer.ok_or(AppError::new(ErrorKind::Unauthenticated))?;
            let claims = tokens.verify(&token)?;

            let user = users.find_by_id(claims.sub).await?.ok_or_else(|| {
                AppError::new(ErrorKind::NotFound).with_status(StatusCode::UNAUTHORIZED)
            })?;

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
