use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewReservation, ReservationPatch};
use crate::services::reservations;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/reservations/{id}",
            get(get_reservation)
                .patch(update_reservation)
                .delete(delete_reservation),
        )
}

/* ---------- RESERVATIONS ---------- */

// GET /api/reservations?date=2026-10-19&table_id=3
#[derive(Debug, Deserialize)]
struct ReservationsQuery {
    date: Option<String>,
    table_id: Option<i32>,
}

async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReservationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = params.date.as_deref().filter(|d| !d.is_empty());
    let mut list = state.storage.list_reservations(date).await?;
    if let Some(table_id) = params.table_id {
        list.retain(|r| r.table_id == table_id);
    }
    Ok(Json(list))
}

// GET /api/reservations/{id}
async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state
        .storage
        .get_reservation(id)
        .await?
        .ok_or(AppError::NotFound("Бронирование не найдено"))?;
    Ok(Json(reservation))
}

// POST /api/reservations
async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewReservation>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = reservations::create(state.storage.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

// PATCH /api/reservations/{id}
async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<ReservationPatch>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = reservations::update(state.storage.as_ref(), id, req).await?;
    Ok(Json(reservation))
}

// DELETE /api/reservations/{id}
async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    reservations::delete(state.storage.as_ref(), id).await?;
    Ok(Json(json!({ "message": "Бронирование удалено" })))
}
