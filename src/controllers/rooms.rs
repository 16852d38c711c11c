use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{CinemaError, Entity};
use crate::middleware::ValidatedJson;
use crate::models::RoomPayload;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room).put(update_room).delete(delete_room))
}

// GET /api/rooms
async fn list_rooms(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, CinemaError> {
    if let Some(rooms) = state.cache.get_rooms().await {
        return Ok(Json(rooms));
    }
    let rooms = state.store.list_rooms().await?;
    state.cache.save_rooms(&rooms).await;
    Ok(Json(rooms))
}

// POST /api/rooms
async fn create_room(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RoomPayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let room = state.store.insert_room(&req).await?;
    state.cache.invalidate_rooms().await;
    tracing::info!("Room {} created ({}x{})", room.id, room.rows, room.seats_per_row);
    Ok((StatusCode::CREATED, Json(room)))
}

// GET /api/rooms/{id}
async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    let room = state
        .store
        .get_room(id)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Room, id))?;
    Ok(Json(room))
}

// PUT /api/rooms/{id}
async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<RoomPayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let room = state
        .store
        .update_room(id, &req)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Room, id))?;
    state.cache.invalidate_rooms().await;
    Ok(Json(room))
}

// DELETE /api/rooms/{id} - вместе с сеансами и местами
async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    if !state.store.delete_room(id).await? {
        return Err(CinemaError::not_found(Entity::Room, id));
    }
    state.cache.invalidate_rooms().await;
    Ok(StatusCode::NO_CONTENT)
}
