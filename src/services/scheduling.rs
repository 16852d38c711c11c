//! scheduling.rs
//!
//! Проверка сеансов перед записью.
//!
//! Правило: в одном зале два сеанса одного календарного дня (UTC) не могут
//! пересекаться по времени суток на полуоткрытых интервалах `[start, end)`.
//! Сеансы "встык" (`a.end == b.start`) допустимы. Пересечения через полночь
//! этот проход не видит; их отсекает exclusion constraint в хранилище.

use chrono::{DateTime, Duration, Utc};
use futures::try_join;
use tracing::info;

use crate::error::{CinemaError, CinemaResult, ConflictError, Entity, ValidationError};
use crate::models::{Movie, NewSchedule, Schedule, SchedulePayload};
use crate::store::CinemaStore;

/// Время окончания по умолчанию: начало + длительность фильма.
pub fn derive_end_time(start_time: DateTime<Utc>, movie: &Movie) -> DateTime<Utc> {
    start_time + Duration::minutes(i64::from(movie.duration))
}

/// Пересекается ли существующий сеанс с `[start, end)` по времени суток.
pub fn overlaps_same_day(existing: &Schedule, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    existing.start_time.time() < end.time() && existing.end_time.time() > start.time()
}

/// Проверяет запрос на сеанс и возвращает его с заполненным `end_time`.
///
/// `current` — сохраненная версия при обновлении: она исключается из поиска
/// конфликтов, а ее `end_time` остается в силе, если в запросе его нет.
pub async fn validate_schedule(
    store: &dyn CinemaStore,
    payload: &SchedulePayload,
    current: Option<&Schedule>,
) -> CinemaResult<NewSchedule> {
    let (room, movie) = try_join!(store.get_room(payload.room), store.get_movie(payload.movie))?;
    room.ok_or_else(|| CinemaError::not_found(Entity::Room, payload.room))?;
    let movie = movie.ok_or_else(|| CinemaError::not_found(Entity::Movie, payload.movie))?;

    let end_time = match (payload.end_time, current) {
        (Some(end_time), _) => end_time,
        (None, Some(current)) => current.end_time,
        (None, None) => derive_end_time(payload.start_time, &movie),
    };
    if end_time <= payload.start_time {
        return Err(ValidationError::InvalidTimeRange.into());
    }

    let candidate = NewSchedule {
        room: payload.room,
        movie: payload.movie,
        start_time: payload.start_time,
        end_time,
    };

    let same_day = store
        .schedules_on_day(
            candidate.room,
            candidate.start_time.date_naive(),
            current.map(|s| s.id),
        )
        .await?;

    if let Some(clash) = same_day
        .iter()
        .find(|existing| overlaps_same_day(existing, candidate.start_time, candidate.end_time))
    {
        info!(
            "Schedule rejected: room {} is busy {}..{} (schedule {})",
            candidate.room, clash.start_time, clash.end_time, clash.id
        );
        return Err(ConflictError::ScheduleOverlap { room: candidate.room }.into());
    }

    Ok(candidate)
}

pub async fn create_schedule(
    store: &dyn CinemaStore,
    payload: &SchedulePayload,
) -> CinemaResult<Schedule> {
    let candidate = validate_schedule(store, payload, None).await?;
    let schedule = store.insert_schedule(&candidate).await?;
    info!(
        "Schedule {} created: movie {} in room {} at {}",
        schedule.id, schedule.movie, schedule.room, schedule.start_time
    );
    Ok(schedule)
}

// Обновление проходит ту же проверку, что и создание
pub async fn update_schedule(
    store: &dyn CinemaStore,
    id: i64,
    payload: &SchedulePayload,
) -> CinemaResult<Schedule> {
    let current = store
        .get_schedule(id)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Schedule, id))?;
    let candidate = validate_schedule(store, payload, Some(&current)).await?;
    store
        .update_schedule(id, &candidate)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Schedule, id))
}
