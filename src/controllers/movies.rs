use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{CinemaError, CinemaResult, Entity};
use crate::middleware::{Filter, ValidatedJson};
use crate::models::MoviePayload;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie", get(list_movies).post(create_movie))
        .route("/movie/{id}", get(get_movie).put(update_movie).delete(delete_movie))
}

#[derive(Debug, Deserialize)]
struct MovieFilter {
    // "1,2,3"
    id: Option<String>,
}

/// Разбирает список id через запятую. Пустые элементы пропускаются.
fn parse_id_list(raw: &str) -> CinemaResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| CinemaError::payload(format!("Invalid movie id: {s:?}")))
        })
        .collect()
}

// GET /api/movie?id=1,2,3
async fn list_movies(
    State(state): State<Arc<AppState>>,
    Filter(filter): Filter<MovieFilter>,
) -> Result<impl IntoResponse, CinemaError> {
    let ids = match filter.id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id_list(raw)?),
        _ => None,
    };

    if let Some(ids) = ids {
        return Ok(Json(state.store.list_movies(Some(ids.as_slice())).await?));
    }

    if let Some(movies) = state.cache.get_movies().await {
        return Ok(Json(movies));
    }
    let movies = state.store.list_movies(None).await?;
    state.cache.save_movies(&movies).await;
    Ok(Json(movies))
}

// POST /api/movie
async fn create_movie(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<MoviePayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let movie = state.store.insert_movie(&req).await?;
    state.cache.invalidate_movies().await;
    tracing::info!("Movie {} created: {:?} ({} min)", movie.id, movie.title, movie.duration);
    Ok((StatusCode::CREATED, Json(movie)))
}

// GET /api/movie/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    let movie = state
        .store
        .get_movie(id)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Movie, id))?;
    Ok(Json(movie))
}

// PUT /api/movie/{id}
// Длительность меняется без пересчета end_time у существующих сеансов
async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<MoviePayload>,
) -> Result<impl IntoResponse, CinemaError> {
    let movie = state
        .store
        .update_movie(id, &req)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Movie, id))?;
    state.cache.invalidate_movies().await;
    Ok(Json(movie))
}

// DELETE /api/movie/{id}
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CinemaError> {
    if !state.store.delete_movie(id).await? {
        return Err(CinemaError::not_found(Entity::Movie, id));
    }
    state.cache.invalidate_movies().await;
    Ok(StatusCode::NO_CONTENT)
}
