use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, warn};

use super::models::AppState;
use crate::transaction::NewTransaction;

/// Submit a new post into the pending pool.
#[post("/new_transaction")]
pub async fn new_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTransaction>,
) -> impl Responder {
    let mut node = state.node.lock().expect("mutex poisoned");
    match node.submit_transaction(body.into_inner()) {
        Ok(tx) => {
            debug!("POST /new_transaction - accepted post by {}", tx.author);
            HttpResponse::Created().body("Success")
        }
        Err(e) => {
            warn!("POST /new_transaction - rejected: {e}");
            HttpResponse::BadRequest().body("Invalid transaction data")
        }
    }
}

/// Transactions waiting to be mined, in submission order.
#[get("/pending_tx")]
pub async fn pending_tx(state: web::Data<AppState>) -> impl Responder {
    let node = state.node.lock().expect("mutex poisoned");
    let pending = node.pool().snapshot();
    HttpResponse::Ok().json(pending)
}
