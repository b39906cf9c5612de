use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, ChainQuery};
use crate::blockchain::Block;
use crate::consensus::reconcile_node;

/// Full chain. Unless called with `consensus=false` (as peers do), runs a
/// consensus pass first so the caller sees the longest valid chain this node
/// knows about.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>, query: web::Query<ChainQuery>) -> impl Responder {
    if query.consensus && reconcile_node(&state.node, &state.peers_client).await {
        info!("GET /chain - local chain replaced by consensus");
    }
    let dump = {
        let node = state.node.lock().expect("mutex poisoned");
        node.dump()
    };
    HttpResponse::Ok().json(dump)
}

/// Ingest a block mined by another node. Uses the block's `hash` as the
/// proof and the same checks as local mining.
#[post("/add_block")]
pub async fn add_block(state: web::Data<AppState>, body: web::Json<Block>) -> impl Responder {
    let block = body.into_inner();
    let index = block.index;
    let mut node = state.node.lock().expect("mutex poisoned");
    match node.ingest_block(block) {
        Ok(()) => HttpResponse::Created().body("The block was added to the chain."),
        Err(reason) => {
            warn!("POST /add_block - discarded block #{index}: {reason}");
            HttpResponse::BadRequest().body("The block was discarded by the node.")
        }
    }
}
