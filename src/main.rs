use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use student_progress::api::{self, SharedStore};
use student_progress::config::Config;
use student_progress::database::{MemoryStore, RecordStore};

async fn start_api(config: Config, store: MemoryStore) -> io::Result<()> {
    let boxed: Box<dyn RecordStore> = Box::new(store);
    let store_data: web::Data<SharedStore> = web::Data::new(RwLock::new(boxed));

    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .configure(api::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    info!("Loading record store from {}", config.data_dir.display());

    let data_dir = config.data_dir.clone();
    let store = tokio::task::spawn_blocking(move || MemoryStore::load_dir(&data_dir))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    info!("Starting student progress API on http://{}:{}", config.bind_addr, config.port);
    start_api(config, store).await
}
