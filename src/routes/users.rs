use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, TokenService},
    error::{AppError, ErrorKind},
    federation::IdentityProvider,
    identity::IdentityService,
};
use actix_web::{get, http::header, post, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates a local account and returns an authentication token.
#[post("/register")]
pub async fn register(
    identity: web::Data<IdentityService>,
    tokens: web::Data<TokenService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = identity
        .register_local(&payload.username, &payload.email, &payload.password)
        .await?;
    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse { token }))
}

/// Login user
///
/// Authenticates a local account and returns an authentication token.
#[post("/login")]
pub async fn login(
    identity: web::Data<IdentityService>,
    tokens: web::Data<TokenService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = identity
        .authenticate_local(&payload.email, &payload.password)
        .await?;
    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

/// Phase 1 of the Google handshake: redirect the caller to the provider.
/// Terminal for this request; no identity is resolved yet.
#[get("/google")]
pub async fn google_login(provider: web::Data<dyn IdentityProvider>) -> impl Responder {
    let state = Uuid::new_v4().to_string();
    HttpResponse::Found()
        .append_header((header::LOCATION, provider.authorize_url(&state)))
        .finish()
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    #[allow(dead_code)]
    pub state: Option<String>,
}

/// Phase 2 of the Google handshake.
///
/// The provider reporting a failure is `FederatedAuthFailed`; a callback
/// without a code means the user simply did not complete the login, so they
/// are sent back to the login entry point rather than handed an error.
/// Otherwise the provider-asserted profile is resolved to an account and a
/// token is issued.
#[get("/google/callback")]
pub async fn google_callback(
    provider: web::Data<dyn IdentityProvider>,
    identity: web::Data<IdentityService>,
    tokens: web::Data<TokenService>,
    query: web::Query<GoogleCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    if let Some(provider_error) = &query.error {
        log::warn!("google callback reported an error: {}", provider_error);
        return Err(AppError::new(ErrorKind::FederatedAuthFailed));
    }

    let code = match &query.code {
        Some(code) => code,
        None => {
            return Ok(HttpResponse::Found()
                .append_header((header::LOCATION, "/api/users/login"))
                .finish())
        }
    };

    let profile = provider.exchange(code).await?;
    let user = identity.resolve_federated(&profile).await?;
    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}
