mod cache;
mod config;
mod error;
mod services;
mod store;

use crate::cache::LayerCache;
use crate::config::ServerConfig;
use crate::store::LayerStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::other(e.to_string())
    })?;

    let cache = LayerCache::new(&config.cache_path);
    let store = LayerStore::open(&config.store_path, cache).map_err(|e| {
        error!("Cannot open store at {}: {}", config.store_path.display(), e);
        io::Error::other(e.to_string())
    })?;

    let cache_path = config.cache_path.display();
    match store.cache().ids().await {
        Ok(ids) => info!("Layer cache at {} holds {} entries", cache_path, ids.len()),
        Err(e) => warn!("Layer cache at {} is unusable: {}", cache_path, e),
    }

    let json_limit = config.json_limit_bytes();
    info!("Server running at http://{}", config.socket_addr());

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(store.clone()))
            .service(services::layers::configure_routes())
            .service(services::groups::configure_routes())
            .service(services::cache::configure_routes())
            .configure(services::proxy::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
