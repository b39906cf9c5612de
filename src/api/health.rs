use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, HealthResponse};

/// Liveness plus a cheap snapshot of the node: chain height, difficulty,
/// pending pool size and number of known peers.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let node = state.node.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        height: node.chain().len(),
        difficulty: node.chain().difficulty(),
        pending: node.pool().len(),
        peers: node.peers().len(),
    })
}
