mod api;
mod blockchain;
mod config;
mod error;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;

use api::AppState;
use blockchain::{Ledger, PendingBlock};
use config::Config;
use transaction::ContractPipeline;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let ledger = Ledger::new(
        PendingBlock::genesis(),
        ContractPipeline::default(),
        config.sealer(),
    )
    .map_err(std::io::Error::other)?;

    log::info!(
        "⛓️ Starting ledger API at http://{}:{} (difficulty={}, contracts={:?})",
        config.host,
        config.port,
        config.difficulty,
        ledger.pipeline().names()
    );

    let state = web::Data::new(AppState::new(ledger));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
