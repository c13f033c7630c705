use actix_web::{get, HttpResponse, Responder};

/// Liveness probe. No authentication, no collaborators.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok"
    }))
}
