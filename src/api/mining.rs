use actix_web::{HttpResponse, Responder, get, web};
use log::{error, info, warn};

use super::models::AppState;
use crate::error::NodeError;

/// Mine every pending transaction into one block.
///
/// The candidate is cut under the node lock, the nonce search runs on the
/// blocking pool with the lock released, and the commit re-checks linkage
/// through `add_block`. If the tip moved meanwhile the block is discarded
/// and the transactions stay pending.
#[get("/mine")]
pub async fn mine(state: web::Data<AppState>) -> impl Responder {
    let job = {
        let node = state.node.lock().expect("mutex poisoned");
        match node.prepare_mining() {
            Ok(job) => job,
            Err(NodeError::EmptyPool) => {
                return HttpResponse::Ok().body("There are no transactions to mine.");
            }
            Err(e) => {
                error!("GET /mine - cannot build candidate: {e}");
                return HttpResponse::InternalServerError().body(e.to_string());
            }
        }
    };

    let (job, proof) = match web::block(move || job.solve()).await {
        Ok(solved) => solved,
        Err(e) => {
            error!("GET /mine - proof-of-work task failed: {e}");
            return HttpResponse::InternalServerError().body("mining failed");
        }
    };

    let (block, peers) = {
        let mut node = state.node.lock().expect("mutex poisoned");
        match node.commit_mined(job, &proof) {
            Ok(block) => (block, node.peers().to_vec()),
            Err(reason) => {
                warn!("GET /mine - mined block discarded: {reason}");
                return HttpResponse::Conflict().body("The mined block was discarded by the node.");
            }
        }
    };

    info!("GET /mine - announcing block #{} to {} peers", block.index, peers.len());
    let index = block.index;
    state.peers_client.broadcast_block(peers, block);
    HttpResponse::Ok().body(format!("Block #{index} has been mined."))
}
