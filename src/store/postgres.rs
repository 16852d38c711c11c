use async_trait::async_trait;
use chrono::NaiveDate;

use super::CinemaStore;
use crate::database::Database;
use crate::error::{CinemaError, CinemaResult, ConflictError, Entity, ValidationError};
use crate::models::seat::OccupiedSeatRow;
use crate::models::{
    Movie, MoviePayload, NewOccupiedSeat, NewSchedule, OccupiedSeat, Position, Room, RoomPayload,
    Schedule,
};

// SQLSTATE коды, которые означают нарушение инварианта, а не сбой БД
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const EXCLUSION_VIOLATION: &str = "23P01";

const SCHEDULE_COLUMNS: &str = "id, room_id, movie_id, start_time, end_time";
const SEAT_COLUMNS: &str = "id, schedule_id, seat_row, seat_column";

#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const MOVIE_FKEY: &str = "schedules_movie_id_fkey";

fn schedule_write_error(err: sqlx::Error, schedule: &NewSchedule) -> CinemaError {
    let mapped = err
        .as_database_error()
        .and_then(|db| schedule_violation(db.code().as_deref(), db.constraint(), schedule));
    mapped.unwrap_or(CinemaError::Storage(err))
}

fn seat_write_error(err: sqlx::Error, seat: &NewOccupiedSeat) -> CinemaError {
    let mapped = err
        .as_database_error()
        .and_then(|db| seat_violation(db.code().as_deref(), db.constraint(), seat));
    mapped.unwrap_or(CinemaError::Storage(err))
}

/// Нарушение ограничения при записи сеанса в доменную ошибку:
/// exclusion constraint `schedules_no_overlap` дает тот же конфликт,
/// что и валидатор. `None` - настоящий сбой БД.
fn schedule_violation(
    code: Option<&str>,
    constraint: Option<&str>,
    schedule: &NewSchedule,
) -> Option<CinemaError> {
    match code? {
        EXCLUSION_VIOLATION => Some(ConflictError::ScheduleOverlap { room: schedule.room }.into()),
        FOREIGN_KEY_VIOLATION if constraint == Some(MOVIE_FKEY) => {
            Some(CinemaError::not_found(Entity::Movie, schedule.movie))
        }
        FOREIGN_KEY_VIOLATION => Some(CinemaError::not_found(Entity::Room, schedule.room)),
        CHECK_VIOLATION => Some(ValidationError::InvalidTimeRange.into()),
        _ => None,
    }
}

fn seat_violation(
    code: Option<&str>,
    _constraint: Option<&str>,
    seat: &NewOccupiedSeat,
) -> Option<CinemaError> {
    match code? {
        UNIQUE_VIOLATION => Some(
            ConflictError::AlreadyOccupied {
                schedule: seat.schedule,
                row: seat.position.row(),
                column: seat.position.column(),
            }
            .into(),
        ),
        FOREIGN_KEY_VIOLATION => Some(CinemaError::not_found(Entity::Schedule, seat.schedule)),
        CHECK_VIOLATION => Some(ValidationError::NonPositiveCoordinate.into()),
        _ => None,
    }
}

#[async_trait]
impl CinemaStore for PgStore {
    async fn list_rooms(&self) -> CinemaResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT id, name, rows, seats_per_row FROM rooms ORDER BY id",
        )
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rooms)
    }

    async fn get_room(&self, id: i64) -> CinemaResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            "SELECT id, name, rows, seats_per_row FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(room)
    }

    async fn insert_room(&self, room: &RoomPayload) -> CinemaResult<Room> {
        let room = sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (name, rows, seats_per_row)
             VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_per_row",
        )
        .bind(&room.name)
        .bind(room.rows)
        .bind(room.seats_per_row)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(room)
    }

    async fn update_room(&self, id: i64, room: &RoomPayload) -> CinemaResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            "UPDATE rooms SET name = $2, rows = $3, seats_per_row = $4
             WHERE id = $1
             RETURNING id, name, rows, seats_per_row",
        )
        .bind(id)
        .bind(&room.name)
        .bind(room.rows)
        .bind(room.seats_per_row)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(room)
    }

    async fn delete_room(&self, id: i64) -> CinemaResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_movies(&self, ids: Option<&[i64]>) -> CinemaResult<Vec<Movie>> {
        let movies = match ids {
            Some(ids) => {
                sqlx::query_as::<_, Movie>(
                    "SELECT id, title, duration, price FROM movies WHERE id = ANY($1) ORDER BY id",
                )
                .bind(ids)
                .fetch_all(&self.db.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Movie>("SELECT id, title, duration, price FROM movies ORDER BY id")
                    .fetch_all(&self.db.pool)
                    .await?
            }
        };
        Ok(movies)
    }

    async fn get_movie(&self, id: i64) -> CinemaResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, duration, price FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(movie)
    }

    async fn insert_movie(&self, movie: &MoviePayload) -> CinemaResult<Movie> {
        let movie = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, duration, price)
             VALUES ($1, $2, $3)
             RETURNING id, title, duration, price",
        )
        .bind(&movie.title)
        .bind(movie.duration)
        .bind(movie.price)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(movie)
    }

    async fn update_movie(&self, id: i64, movie: &MoviePayload) -> CinemaResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "UPDATE movies SET title = $2, duration = $3, price = $4
             WHERE id = $1
             RETURNING id, title, duration, price",
        )
        .bind(id)
        .bind(&movie.title)
        .bind(movie.duration)
        .bind(movie.price)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(movie)
    }

    async fn delete_movie(&self, id: i64) -> CinemaResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_schedules(&self, room: Option<i64>) -> CinemaResult<Vec<Schedule>> {
        let schedules = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules
             WHERE ($1::bigint IS NULL OR room_id = $1)
             ORDER BY start_time, id"
        ))
        .bind(room)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(schedules)
    }

    async fn get_schedule(&self, id: i64) -> CinemaResult<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(schedule)
    }

    async fn schedules_on_day(
        &self,
        room: i64,
        day: NaiveDate,
        exclude: Option<i64>,
    ) -> CinemaResult<Vec<Schedule>> {
        let schedules = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules
             WHERE room_id = $1
               AND (start_time AT TIME ZONE 'UTC')::date = $2
               AND ($3::bigint IS NULL OR id <> $3)
             ORDER BY start_time"
        ))
        .bind(room)
        .bind(day)
        .bind(exclude)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(schedules)
    }

    async fn insert_schedule(&self, schedule: &NewSchedule) -> CinemaResult<Schedule> {
        sqlx::query_as::<_, Schedule>(&format!(
            "INSERT INTO schedules (room_id, movie_id, start_time, end_time)
             VALUES ($1, $2, $3, $4)
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(schedule.room)
        .bind(schedule.movie)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .fetch_one(&self.db.pool)
        .await
        .map_err(|e| schedule_write_error(e, schedule))
    }

    async fn update_schedule(&self, id: i64, schedule: &NewSchedule) -> CinemaResult<Option<Schedule>> {
        sqlx::query_as::<_, Schedule>(&format!(
            "UPDATE schedules SET room_id = $2, movie_id = $3, start_time = $4, end_time = $5
             WHERE id = $1
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .bind(schedule.room)
        .bind(schedule.movie)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .fetch_optional(&self.db.pool)
        .await
        .map_err(|e| schedule_write_error(e, schedule))
    }

    async fn delete_schedule(&self, id: i64) -> CinemaResult<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_seats(&self, schedule: Option<i64>) -> CinemaResult<Vec<OccupiedSeat>> {
        let rows = sqlx::query_as::<_, OccupiedSeatRow>(&format!(
            "SELECT {SEAT_COLUMNS} FROM occupied_seats
             WHERE ($1::bigint IS NULL OR schedule_id = $1)
             ORDER BY schedule_id, seat_row, seat_column"
        ))
        .bind(schedule)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows.into_iter().map(OccupiedSeat::from).collect())
    }

    async fn get_seat(&self, id: i64) -> CinemaResult<Option<OccupiedSeat>> {
        let row = sqlx::query_as::<_, OccupiedSeatRow>(&format!(
            "SELECT {SEAT_COLUMNS} FROM occupied_seats WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(row.map(OccupiedSeat::from))
    }

    async fn seat_taken(
        &self,
        schedule: i64,
        position: Position,
        exclude: Option<i64>,
    ) -> CinemaResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
               SELECT 1 FROM occupied_seats
               WHERE schedule_id = $1 AND seat_row = $2 AND seat_column = $3
                 AND ($4::bigint IS NULL OR id <> $4)
             )",
        )
        .bind(schedule)
        .bind(position.row())
        .bind(position.column())
        .bind(exclude)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_seat(&self, seat: &NewOccupiedSeat) -> CinemaResult<OccupiedSeat> {
        sqlx::query_as::<_, OccupiedSeatRow>(&format!(
            "INSERT INTO occupied_seats (schedule_id, seat_row, seat_column)
             VALUES ($1, $2, $3)
             RETURNING {SEAT_COLUMNS}"
        ))
        .bind(seat.schedule)
        .bind(seat.position.row())
        .bind(seat.position.column())
        .fetch_one(&self.db.pool)
        .await
        .map(OccupiedSeat::from)
        .map_err(|e| seat_write_error(e, seat))
    }

    async fn update_seat(&self, id: i64, seat: &NewOccupiedSeat) -> CinemaResult<Option<OccupiedSeat>> {
        let row = sqlx::query_as::<_, OccupiedSeatRow>(&format!(
            "UPDATE occupied_seats SET schedule_id = $2, seat_row = $3, seat_column = $4
             WHERE id = $1
             RETURNING {SEAT_COLUMNS}"
        ))
        .bind(id)
        .bind(seat.schedule)
        .bind(seat.position.row())
        .bind(seat.position.column())
        .fetch_optional(&self.db.pool)
        .await
        .map_err(|e| seat_write_error(e, seat))?;
        Ok(row.map(OccupiedSeat::from))
    }

    async fn delete_seat(&self, id: i64) -> CinemaResult<bool> {
        let result = sqlx::query("DELETE FROM occupied_seats WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> NewSchedule {
        NewSchedule {
            room: 3,
            movie: 7,
            start_time: "2025-01-10T14:00:00Z".parse().unwrap(),
            end_time: "2025-01-10T16:00:00Z".parse().unwrap(),
        }
    }

    fn seat() -> NewOccupiedSeat {
        NewOccupiedSeat { schedule: 5, position: Position(2, 4) }
    }

    #[test]
    fn schedule_constraints_map_to_domain_errors() {
        let s = schedule();
        assert!(matches!(
            schedule_violation(Some("23P01"), Some("schedules_no_overlap"), &s),
            Some(CinemaError::Conflict(ConflictError::ScheduleOverlap { room: 3 }))
        ));
        assert!(matches!(
            schedule_violation(Some("23503"), Some("schedules_room_id_fkey"), &s),
            Some(CinemaError::NotFound { entity: Entity::Room, id: 3 })
        ));
        assert!(matches!(
            schedule_violation(Some("23503"), Some("schedules_movie_id_fkey"), &s),
            Some(CinemaError::NotFound { entity: Entity::Movie, id: 7 })
        ));
        assert!(matches!(
            schedule_violation(Some("23514"), Some("schedules_time_range_check"), &s),
            Some(CinemaError::Validation(ValidationError::InvalidTimeRange))
        ));
        // У сеансов нет уникального индекса
        assert!(schedule_violation(Some("23505"), None, &s).is_none());
    }

    #[test]
    fn seat_constraints_map_to_domain_errors() {
        let s = seat();
        assert!(matches!(
            seat_violation(Some("23505"), Some("occupied_seats_position_key"), &s),
            Some(CinemaError::Conflict(ConflictError::AlreadyOccupied { schedule: 5, row: 2, column: 4 }))
        ));
        assert!(matches!(
            seat_violation(Some("23503"), Some("occupied_seats_schedule_id_fkey"), &s),
            Some(CinemaError::NotFound { entity: Entity::Schedule, id: 5 })
        ));
        assert!(matches!(
            seat_violation(Some("23514"), Some("occupied_seats_seat_row_check"), &s),
            Some(CinemaError::Validation(ValidationError::NonPositiveCoordinate))
        ));
        assert!(seat_violation(Some("23P01"), None, &s).is_none());
    }

    #[test]
    fn unknown_codes_stay_storage_errors() {
        for code in [None, Some("40001"), Some("08006"), Some("")] {
            assert!(schedule_violation(code, None, &schedule()).is_none(), "{code:?}");
            assert!(seat_violation(code, None, &seat()).is_none(), "{code:?}");
        }
    }
}
