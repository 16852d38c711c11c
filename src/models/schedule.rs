use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Сеанс: фильм в зале на интервале `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    #[sqlx(rename = "room_id")]
    pub room: i64,
    #[sqlx(rename = "movie_id")]
    pub movie: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SchedulePayload {
    #[validate(range(min = 1))]
    pub room: i64,
    #[validate(range(min = 1))]
    pub movie: i64,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(default, alias = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Сеанс после проверки: время окончания всегда известно.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub room: i64,
    pub movie: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Schedule {
    pub fn from_new(id: i64, new: &NewSchedule) -> Self {
        Schedule {
            id,
            room: new.room,
            movie: new.movie,
            start_time: new.start_time,
            end_time: new.end_time,
        }
    }

    // Полное пересечение полуоткрытых интервалов, без привязки к дате
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}
