//! # Cache Service Module
//!
//! `DELETE /api/cache` empties the local layer cache. The next listing reads
//! every layer from the store and repopulates it. Unlike cache errors during
//! normal operation, a failure here is reported to the caller.

use crate::store::LayerStore;
use actix_web::web::{self, scope};
use actix_web::{HttpResponse, ResponseError, Scope};
use log::{error, info};

const API_PATH: &str = "/api/cache";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", web::delete().to(clear))
}

async fn clear(store: web::Data<LayerStore>) -> HttpResponse {
    match store.cache().clear().await {
        Ok(()) => {
            info!("Layer cache cleared");
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            error!("Error clearing layer cache: {}", e);
            e.error_response()
        }
    }
}
