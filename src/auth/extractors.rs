use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::{AppError, ErrorKind};
use crate::models::User;

/// Extracts the authenticated user from request extensions.
///
/// `AuthMiddleware` resolves the identity and inserts it; this extractor is
/// how handlers read it back. Exactly one identity exists per request and it
/// is discarded when the request ends.
///
/// If no identity is present (the middleware did not run or was bypassed),
/// the request is rejected as unauthenticated rather than served with a
/// default identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(CurrentUser(user))),
            None => ready(Err(AppError::new(ErrorKind::Unauthenticated).into())),
        }
    }
}
