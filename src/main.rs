use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use taskgate::auth::{AuthMiddleware, PasswordHasher, TokenService};
use taskgate::config::Config;
use taskgate::federation::{GoogleProvider, IdentityProvider};
use taskgate::identity::IdentityService;
use taskgate::rate_limit::RateLimit;
use taskgate::routes;
use taskgate::store::postgres::{PgTaskStore, PgUserStore};
use taskgate::store::{TaskStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // A bounded acquire timeout makes a saturated or unreachable database
    // surface as DatabaseUnavailable instead of hanging the request.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl_secs,
    ));
    let identity = IdentityService::new(Arc::clone(&users), PasswordHasher::new(config.bcrypt_cost));
    let provider: Arc<dyn IdentityProvider> = Arc::new(GoogleProvider::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_callback_url.clone(),
    ));
    let auth = AuthMiddleware::new(Arc::clone(&tokens), Arc::clone(&users));
    let limiter = RateLimit::default();

    log::info!("Starting taskgate server at {}", config.server_url());

    let bind_address = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        let auth = auth.clone();
        App::new()
            .app_data(web::Data::new(identity.clone()))
            .app_data(web::Data::from(Arc::clone(&tokens)))
            .app_data(web::Data::from(Arc::clone(&users)))
            .app_data(web::Data::from(Arc::clone(&tasks)))
            .app_data(web::Data::from(Arc::clone(&provider)))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(limiter.clone())
                    .configure(|cfg| routes::config(cfg, auth)),
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
