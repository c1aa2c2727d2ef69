use axum::{routing::get, Json, Router};
use std::sync::Arc;

use crate::models::{hall, Hall};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/halls", get(list_halls))
}

// GET /api/halls
async fn list_halls() -> Json<Vec<Hall>> {
    Json(hall::catalogue())
}
