use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{CinemaError, Entity};
use crate::middleware::{Filter, ValidatedJson};
use crate::models::SeatPayload;
use crate::services::seating;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seat", get(list_seats).post(claim_seat))
        .route("/seat/{id}", get(get_seat).put(update_seat).delete(release_seat))
}

#[derive(Debug, Deserialize)]
struct SeatFilter {
    schedule: Option<i64>,
}

// GET /api/seat?schedule=<id>
async fn list_seats(
    State(state): State<Arc<AppState>>,
    Filter(filter): Filter<SeatFilter>,
) -> Result<impl IntoResponse, CinemaError> {
    Ok(Json(state.store.list_seats(filter.schedule).await?))
}

// POST /api/seat
async fn claim_seat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SeatPayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let seat = seating::claim_seat(state.store.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

// GET /api/seat/{id}
async fn get_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    let seat = state
        .store
        .get_seat(id)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::OccupiedSeat, id))?;
    Ok(Json(seat))
}

// PUT /api/seat/{id}
async fn update_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<SeatPayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let seat = seating::update_seat(state.store.as_ref(), id, &req).await?;
    Ok(Json(seat))
}

// DELETE /api/seat/{id}
async fn release_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    if !state.store.delete_seat(id).await? {
        return Err(CinemaError::not_found(Entity::OccupiedSeat, id));
    }
    tracing::info!("Seat {} released", id);
    Ok(StatusCode::NO_CONTENT)
}
