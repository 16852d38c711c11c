//! Слой хранения.
//!
//! Валидаторы только читают через `CinemaStore`; запись идет отдельными
//! вызовами после успешной проверки. Обе реализации сами держат инварианты
//! (уникальность места в сеансе, непересечение сеансов в зале), так что
//! гонка "проверили, потом вставили" заканчивается `ConflictError`, а не дублем.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::CinemaResult;
use crate::models::{
    Movie, MoviePayload, NewOccupiedSeat, NewSchedule, OccupiedSeat, Position, Room, RoomPayload,
    Schedule,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CinemaStore: Send + Sync {
    // --- Залы ---
    async fn list_rooms(&self) -> CinemaResult<Vec<Room>>;
    async fn get_room(&self, id: i64) -> CinemaResult<Option<Room>>;
    async fn insert_room(&self, room: &RoomPayload) -> CinemaResult<Room>;
    async fn update_room(&self, id: i64, room: &RoomPayload) -> CinemaResult<Option<Room>>;
    async fn delete_room(&self, id: i64) -> CinemaResult<bool>;

    // --- Фильмы ---
    /// `ids = None` — все фильмы, иначе только перечисленные.
    async fn list_movies(&self, ids: Option<&[i64]>) -> CinemaResult<Vec<Movie>>;
    async fn get_movie(&self, id: i64) -> CinemaResult<Option<Movie>>;
    async fn insert_movie(&self, movie: &MoviePayload) -> CinemaResult<Movie>;
    async fn update_movie(&self, id: i64, movie: &MoviePayload) -> CinemaResult<Option<Movie>>;
    async fn delete_movie(&self, id: i64) -> CinemaResult<bool>;

    // --- Сеансы ---
    async fn list_schedules(&self, room: Option<i64>) -> CinemaResult<Vec<Schedule>>;
    async fn get_schedule(&self, id: i64) -> CinemaResult<Option<Schedule>>;
    /// Сеансы зала, начинающиеся в указанный день (UTC).
    async fn schedules_on_day(
        &self,
        room: i64,
        day: NaiveDate,
        exclude: Option<i64>,
    ) -> CinemaResult<Vec<Schedule>>;
    async fn insert_schedule(&self, schedule: &NewSchedule) -> CinemaResult<Schedule>;
    async fn update_schedule(&self, id: i64, schedule: &NewSchedule) -> CinemaResult<Option<Schedule>>;
    async fn delete_schedule(&self, id: i64) -> CinemaResult<bool>;

    // --- Занятые места ---
    async fn list_seats(&self, schedule: Option<i64>) -> CinemaResult<Vec<OccupiedSeat>>;
    async fn get_seat(&self, id: i64) -> CinemaResult<Option<OccupiedSeat>>;
    async fn seat_taken(
        &self,
        schedule: i64,
        position: Position,
        exclude: Option<i64>,
    ) -> CinemaResult<bool>;
    async fn insert_seat(&self, seat: &NewOccupiedSeat) -> CinemaResult<OccupiedSeat>;
    async fn update_seat(&self, id: i64, seat: &NewOccupiedSeat) -> CinemaResult<Option<OccupiedSeat>>;
    async fn delete_seat(&self, id: i64) -> CinemaResult<bool>;
}
