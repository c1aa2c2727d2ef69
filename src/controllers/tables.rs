use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewTable, TablePatch, TableStatus};
use crate::services::tables;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tables", get(list_tables).post(create_table))
        .route("/tables/{id}", get(get_table).patch(update_table))
        .route("/tables/{id}/status", patch(update_table_status))
}

/* ---------- TABLES ---------- */

// GET /api/tables?hall_id=white&date=2026-10-19
#[derive(Debug, Deserialize)]
struct TablesQuery {
    hall_id: Option<String>,
    date: Option<String>,
}

async fn list_tables(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TablesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hall_id = params.hall_id.as_deref().filter(|h| !h.is_empty());
    let date = params.date.as_deref().filter(|d| !d.is_empty());
    let views = tables::list_views(state.storage.as_ref(), hall_id, date).await?;
    Ok(Json(views))
}

// GET /api/tables/{id}
async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let table = state
        .storage
        .get_table(id)
        .await?
        .ok_or(AppError::NotFound("Стол не найден"))?;
    Ok(Json(table))
}

// POST /api/tables
async fn create_table(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewTable>,
) -> Result<impl IntoResponse, AppError> {
    let table = tables::create(state.storage.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

// PATCH /api/tables/{id}
async fn update_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<TablePatch>,
) -> Result<impl IntoResponse, AppError> {
    let table = tables::update(state.storage.as_ref(), id, req).await?;
    Ok(Json(table))
}

// PATCH /api/tables/{id}/status
#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

async fn update_table_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<StatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status: TableStatus = req
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Неверный статус".to_string()))?;
    let table = tables::update(state.storage.as_ref(), id, TablePatch::status(status)).await?;
    Ok(Json(table))
}
