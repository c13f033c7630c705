pub mod health;
pub mod tasks;
pub mod users;

use crate::auth::AuthMiddleware;
use crate::error;
use actix_web::web;

/// Wires the API surface. Only the task routes sit behind the auth
/// middleware; registration, login and the Google handshake are reachable
/// without a token.
///
/// Extractor failures (unparseable bodies, non-UUID path segments) are
/// routed through the taxonomy handlers here so that every error response
/// is taxonomy-shaped, not just the ones raised by handlers.
pub fn config(cfg: &mut web::ServiceConfig, auth: AuthMiddleware) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::login)
                .service(users::google_login)
                .service(users::google_callback),
        )
        .service(
            web::scope("/tasks")
                .wrap(auth)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
