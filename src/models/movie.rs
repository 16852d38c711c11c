use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    /// Длительность в минутах
    pub duration: i32,
    pub price: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoviePayload {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1))]
    pub duration: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub price: i32,
}
