pub mod halls;
pub mod reservations;
pub mod tables;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(halls::routes())
        .merge(tables::routes())
        .merge(reservations::routes())
}
