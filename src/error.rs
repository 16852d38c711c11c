//! error.rs
//!
//! Таксономия ошибок бронирования и их отображение в HTTP-ответы.
//!
//! - `NotFound` — ссылка на несуществующий зал, фильм, сеанс или место.
//! - `ValidationError` — запрос некорректен сам по себе (позиция, диапазон времени, поля).
//! - `ConflictError` — запрос корректен, но противоречит уже сохраненным данным.
//!
//! Все ответы с ошибкой имеют вид `{"error": "<сообщение>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Room,
    Movie,
    Schedule,
    OccupiedSeat,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Room => "Room",
            Entity::Movie => "Movie",
            Entity::Schedule => "Schedule",
            Entity::OccupiedSeat => "Occupied seat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Position must contain exactly two elements: [row, column]")]
    MalformedPosition,
    #[error("Row and column values must be greater than zero")]
    NonPositiveCoordinate,
    #[error("Invalid seat position")]
    OutOfBounds {
        row: i32,
        column: i32,
        rows: i32,
        seats_per_row: i32,
    },
    #[error("end_time must be later than start_time")]
    InvalidTimeRange,
    #[error("{0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("The room already has a screening overlapping this time")]
    ScheduleOverlap { room: i64 },
    #[error("The seat at this position is already occupied for this schedule")]
    AlreadyOccupied { schedule: i64, row: i32, column: i32 },
}

#[derive(Debug, Error)]
pub enum CinemaError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type CinemaResult<T> = Result<T, CinemaError>;

impl CinemaError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        CinemaError::NotFound { entity, id }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        CinemaError::Validation(ValidationError::InvalidPayload(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CinemaError::NotFound { .. } => StatusCode::NOT_FOUND,
            CinemaError::Validation(_) | CinemaError::Conflict(_) => StatusCode::BAD_REQUEST,
            CinemaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CinemaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            CinemaError::Storage(e) => {
                tracing::error!("storage error: {:?}", e);
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            CinemaError::not_found(Entity::Schedule, 7).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CinemaError::from(ValidationError::MalformedPosition).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CinemaError::from(ConflictError::ScheduleOverlap { room: 1 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CinemaError::Storage(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = CinemaError::not_found(Entity::Schedule, 42);
        assert_eq!(err.to_string(), "Schedule with id 42 not found");
    }
}
