use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use blocknet_node::api::{self, AppState};
use blocknet_node::config::NodeConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = NodeConfig::from_env();
    info!(
        "⛓️ Starting ledger node at http://{}:{} (difficulty={}, peers={})",
        cfg.host,
        cfg.port,
        cfg.difficulty,
        cfg.bootstrap_peers.len()
    );

    let state = AppState::new(&cfg).map_err(std::io::Error::other)?;
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await
}
