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
use crate::models::SchedulePayload;
use crate::services::scheduling;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedule", get(list_schedules).post(create_schedule))
        .route(
            "/schedule/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
}

#[derive(Debug, Deserialize)]
struct ScheduleFilter {
    room: Option<i64>,
}

// GET /api/schedule?room=<id>
async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Filter(filter): Filter<ScheduleFilter>,
) -> Result<impl IntoResponse, CinemaError> {
    Ok(Json(state.store.list_schedules(filter.room).await?))
}

// POST /api/schedule
async fn create_schedule(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SchedulePayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let schedule = scheduling::create_schedule(state.store.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

// GET /api/schedule/{id}
async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    let schedule = state
        .store
        .get_schedule(id)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Schedule, id))?;
    Ok(Json(schedule))
}

// PUT /api/schedule/{id}
async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<SchedulePayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let schedule = scheduling::update_schedule(state.store.as_ref(), id, &req).await?;
    Ok(Json(schedule))
}

// DELETE /api/schedule/{id} - занятые места удаляются вместе с сеансом
async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    if !state.store.delete_schedule(id).await? {
        return Err(CinemaError::not_found(Entity::Schedule, id));
    }
    Ok(StatusCode::NO_CONTENT)
}
