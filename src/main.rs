#[macro_use]
extern crate lazy_static;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod db;
mod env;
mod error;
mod routes;
mod traits;
mod util;

pub use crate::error::AppError;
pub use crate::traits::RequestBody;

use crate::db::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env::RUST_LOG.clone()))
        .init();

    let args = cli::Args::parse();
    let store = Store::new(env::DB_PATH.clone());

    match args.command.unwrap_or_default() {
        cli::Command::Reset => {
            store.reset().expect("error resetting data file");
            tracing::info!("data file reset to an empty document");
            return;
        }
        cli::Command::Run => (),
    }

    let state = AppState {
        store: Arc::new(store),
    };
    state
        .ensure_seed_data()
        .expect("error seeding bootstrap data");

    let app = routes::router().with_state(state);
    let listener = tokio::net::TcpListener::bind(env::BIND_ADDR.as_str())
        .await
        .expect("can't bind listen address");
    tracing::info!("listening on {}", env::BIND_ADDR.as_str());
    axum::serve(listener, app).await.expect("server error");
}
