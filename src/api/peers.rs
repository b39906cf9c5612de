use actix_web::{HttpResponse, Responder, post, web};
use log::{info, warn};

use super::models::AppState;

/// Register a batch of peer addresses (`["host:port", ...]`).
#[post("/add_nodes")]
pub async fn add_nodes(
    state: web::Data<AppState>,
    body: Option<web::Json<Vec<String>>>,
) -> impl Responder {
    let batch = body.map(|b| b.into_inner()).unwrap_or_default();
    let mut node = state.node.lock().expect("mutex poisoned");
    match node.register_peers(batch) {
        Ok(added) => {
            info!("POST /add_nodes - {added} new peers ({} known)", node.peers().len());
            HttpResponse::Created().body("Success")
        }
        Err(e) => {
            warn!("POST /add_nodes - rejected: {e}");
            HttpResponse::BadRequest().body("Invalid data")
        }
    }
}
