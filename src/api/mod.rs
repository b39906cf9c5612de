mod chain;
mod health;
mod mining;
pub mod models;
mod peers;
mod tx;

use actix_web::web::ServiceConfig;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(tx::new_transaction)
        .service(tx::pending_tx)
        .service(chain::get_chain)
        .service(chain::add_block)
        .service(mining::mine)
        .service(peers::add_nodes);
}
