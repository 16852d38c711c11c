use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::CinemaStore;
use crate::error::{CinemaError, CinemaResult, ConflictError, Entity, ValidationError};
use crate::models::{
    Movie, MoviePayload, NewOccupiedSeat, NewSchedule, OccupiedSeat, Position, Room, RoomPayload,
    Schedule,
};

/// Хранилище в памяти с теми же ограничениями, что и схема Postgres.
/// Каждая запись вместе с проверками выполняется под одной блокировкой.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    rooms: BTreeMap<i64, Room>,
    movies: BTreeMap<i64, Movie>,
    schedules: BTreeMap<i64, Schedule>,
    seats: BTreeMap<i64, OccupiedSeat>,
    // Своя последовательность у каждой таблицы, как BIGSERIAL
    room_seq: i64,
    movie_seq: i64,
    schedule_seq: i64,
    seat_seq: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {

    // Аналог внешних ключей и ограничений таблицы schedules
    fn check_schedule(&self, schedule: &NewSchedule, exclude: Option<i64>) -> CinemaResult<()> {
        if !self.rooms.contains_key(&schedule.room) {
            return Err(CinemaError::not_found(Entity::Room, schedule.room));
        }
        if !self.movies.contains_key(&schedule.movie) {
            return Err(CinemaError::not_found(Entity::Movie, schedule.movie));
        }
        if schedule.end_time <= schedule.start_time {
            return Err(ValidationError::InvalidTimeRange.into());
        }
        let overlap = self.schedules.values().any(|existing| {
            Some(existing.id) != exclude
                && existing.room == schedule.room
                && existing.intersects(schedule.start_time, schedule.end_time)
        });
        if overlap {
            return Err(ConflictError::ScheduleOverlap { room: schedule.room }.into());
        }
        Ok(())
    }

    // Аналог ограничений таблицы occupied_seats
    fn check_seat(&self, seat: &NewOccupiedSeat, exclude: Option<i64>) -> CinemaResult<()> {
        if !self.schedules.contains_key(&seat.schedule) {
            return Err(CinemaError::not_found(Entity::Schedule, seat.schedule));
        }
        if !seat.position.is_positive() {
            return Err(ValidationError::NonPositiveCoordinate.into());
        }
        if self.seat_taken(seat.schedule, seat.position, exclude) {
            return Err(ConflictError::AlreadyOccupied {
                schedule: seat.schedule,
                row: seat.position.row(),
                column: seat.position.column(),
            }
            .into());
        }
        Ok(())
    }

    fn seat_taken(&self, schedule: i64, position: Position, exclude: Option<i64>) -> bool {
        self.seats.values().any(|seat| {
            Some(seat.id) != exclude && seat.schedule == schedule && seat.position == position
        })
    }

    // Каскадное удаление сеансов и их мест
    fn remove_schedules_where(&mut self, pred: impl Fn(&Schedule) -> bool) {
        let doomed: Vec<i64> = self
            .schedules
            .values()
            .filter(|s| pred(s))
            .map(|s| s.id)
            .collect();
        for id in doomed {
            self.schedules.remove(&id);
            self.seats.retain(|_, seat| seat.schedule != id);
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CinemaStore for MemoryStore {
    async fn list_rooms(&self) -> CinemaResult<Vec<Room>> {
        Ok(self.tables.read().await.rooms.values().cloned().collect())
    }

    async fn get_room(&self, id: i64) -> CinemaResult<Option<Room>> {
        Ok(self.tables.read().await.rooms.get(&id).cloned())
    }

    async fn insert_room(&self, room: &RoomPayload) -> CinemaResult<Room> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.room_seq);
        let room = Room {
            id,
            name: room.name.clone(),
            rows: room.rows,
            seats_per_row: room.seats_per_row,
        };
        tables.rooms.insert(id, room.clone());
        Ok(room)
    }

    async fn update_room(&self, id: i64, room: &RoomPayload) -> CinemaResult<Option<Room>> {
        let mut tables = self.tables.write().await;
        Ok(tables.rooms.get_mut(&id).map(|existing| {
            existing.name = room.name.clone();
            existing.rows = room.rows;
            existing.seats_per_row = room.seats_per_row;
            existing.clone()
        }))
    }

    async fn delete_room(&self, id: i64) -> CinemaResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.rooms.remove(&id).is_none() {
            return Ok(false);
        }
        tables.remove_schedules_where(|s| s.room == id);
        Ok(true)
    }

    async fn list_movies(&self, ids: Option<&[i64]>) -> CinemaResult<Vec<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .values()
            .filter(|m| ids.is_none_or(|ids| ids.contains(&m.id)))
            .cloned()
            .collect())
    }

    async fn get_movie(&self, id: i64) -> CinemaResult<Option<Movie>> {
        Ok(self.tables.read().await.movies.get(&id).cloned())
    }

    async fn insert_movie(&self, movie: &MoviePayload) -> CinemaResult<Movie> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.movie_seq);
        let movie = Movie {
            id,
            title: movie.title.clone(),
            duration: movie.duration,
            price: movie.price,
        };
        tables.movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, id: i64, movie: &MoviePayload) -> CinemaResult<Option<Movie>> {
        let mut tables = self.tables.write().await;
        Ok(tables.movies.get_mut(&id).map(|existing| {
            existing.title = movie.title.clone();
            existing.duration = movie.duration;
            existing.price = movie.price;
            existing.clone()
        }))
    }

    async fn delete_movie(&self, id: i64) -> CinemaResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.movies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.remove_schedules_where(|s| s.movie == id);
        Ok(true)
    }

    async fn list_schedules(&self, room: Option<i64>) -> CinemaResult<Vec<Schedule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .schedules
            .values()
            .filter(|s| room.is_none_or(|room| s.room == room))
            .cloned()
            .collect())
    }

    async fn get_schedule(&self, id: i64) -> CinemaResult<Option<Schedule>> {
        Ok(self.tables.read().await.schedules.get(&id).cloned())
    }

    async fn schedules_on_day(
        &self,
        room: i64,
        day: NaiveDate,
        exclude: Option<i64>,
    ) -> CinemaResult<Vec<Schedule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .schedules
            .values()
            .filter(|s| s.room == room && s.start_time.date_naive() == day && Some(s.id) != exclude)
            .cloned()
            .collect())
    }

    async fn insert_schedule(&self, schedule: &NewSchedule) -> CinemaResult<Schedule> {
        let mut tables = self.tables.write().await;
        tables.check_schedule(schedule, None)?;
        let id = next_id(&mut tables.schedule_seq);
        let schedule = Schedule::from_new(id, schedule);
        tables.schedules.insert(id, schedule.clone());
        Ok(schedule)
    }

    async fn update_schedule(&self, id: i64, schedule: &NewSchedule) -> CinemaResult<Option<Schedule>> {
        let mut tables = self.tables.write().await;
        if !tables.schedules.contains_key(&id) {
            return Ok(None);
        }
        tables.check_schedule(schedule, Some(id))?;
        let schedule = Schedule::from_new(id, schedule);
        tables.schedules.insert(id, schedule.clone());
        Ok(Some(schedule))
    }

    async fn delete_schedule(&self, id: i64) -> CinemaResult<bool> {
        let mut tables = self.tables.write().await;
        let existed = tables.schedules.contains_key(&id);
        tables.remove_schedules_where(|s| s.id == id);
        Ok(existed)
    }

    async fn list_seats(&self, schedule: Option<i64>) -> CinemaResult<Vec<OccupiedSeat>> {
        let tables = self.tables.read().await;
        Ok(tables
            .seats
            .values()
            .filter(|seat| schedule.is_none_or(|schedule| seat.schedule == schedule))
            .cloned()
            .collect())
    }

    async fn get_seat(&self, id: i64) -> CinemaResult<Option<OccupiedSeat>> {
        Ok(self.tables.read().await.seats.get(&id).cloned())
    }

    async fn seat_taken(
        &self,
        schedule: i64,
        position: Position,
        exclude: Option<i64>,
    ) -> CinemaResult<bool> {
        Ok(self.tables.read().await.seat_taken(schedule, position, exclude))
    }

    async fn insert_seat(&self, seat: &NewOccupiedSeat) -> CinemaResult<OccupiedSeat> {
        let mut tables = self.tables.write().await;
        tables.check_seat(seat, None)?;
        let id = next_id(&mut tables.seat_seq);
        let seat = OccupiedSeat {
            id,
            schedule: seat.schedule,
            position: seat.position,
        };
        tables.seats.insert(id, seat.clone());
        Ok(seat)
    }

    async fn update_seat(&self, id: i64, seat: &NewOccupiedSeat) -> CinemaResult<Option<OccupiedSeat>> {
        let mut tables = self.tables.write().await;
        if !tables.seats.contains_key(&id) {
            return Ok(None);
        }
        tables.check_seat(seat, Some(id))?;
        let seat = OccupiedSeat {
            id,
            schedule: seat.schedule,
            position: seat.position,
        };
        tables.seats.insert(id, seat.clone());
        Ok(Some(seat))
    }

    async fn delete_seat(&self, id: i64) -> CinemaResult<bool> {
        Ok(self.tables.write().await.seats.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    async fn seeded() -> (MemoryStore, Room, Movie) {
        let store = MemoryStore::new();
        let room = store
            .insert_room(&RoomPayload { name: "Room 1".into(), rows: 10, seats_per_row: 8 })
            .await
            .unwrap();
        let movie = store
            .insert_movie(&MoviePayload { title: "Movie 1".into(), duration: 120, price: 3000 })
            .await
            .unwrap();
        (store, room, movie)
    }

    fn screening(room: &Room, movie: &Movie, start: &str, end: &str) -> NewSchedule {
        NewSchedule { room: room.id, movie: movie.id, start_time: at(start), end_time: at(end) }
    }

    #[tokio::test]
    async fn rejects_overlap_across_midnight() {
        let (store, room, movie) = seeded().await;
        store
            .insert_schedule(&screening(&room, &movie, "2025-01-10T23:00:00Z", "2025-01-11T01:00:00Z"))
            .await
            .unwrap();

        let err = store
            .insert_schedule(&screening(&room, &movie, "2025-01-11T00:30:00Z", "2025-01-11T02:30:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, CinemaError::Conflict(ConflictError::ScheduleOverlap { .. })));
    }

    #[tokio::test]
    async fn duplicate_seat_is_rejected_by_storage() {
        let (store, room, movie) = seeded().await;
        let schedule = store
            .insert_schedule(&screening(&room, &movie, "2025-01-10T14:00:00Z", "2025-01-10T16:00:00Z"))
            .await
            .unwrap();
        let seat = NewOccupiedSeat { schedule: schedule.id, position: Position(1, 1) };

        store.insert_seat(&seat).await.unwrap();
        let err = store.insert_seat(&seat).await.unwrap_err();
        assert!(matches!(err, CinemaError::Conflict(ConflictError::AlreadyOccupied { .. })));
    }

    #[tokio::test]
    async fn deleting_room_cascades_to_schedules_and_seats() {
        let (store, room, movie) = seeded().await;
        let schedule = store
            .insert_schedule(&screening(&room, &movie, "2025-01-10T14:00:00Z", "2025-01-10T16:00:00Z"))
            .await
            .unwrap();
        store
            .insert_seat(&NewOccupiedSeat { schedule: schedule.id, position: Position(2, 3) })
            .await
            .unwrap();

        assert!(store.delete_room(room.id).await.unwrap());
        assert!(store.get_schedule(schedule.id).await.unwrap().is_none());
        assert!(store.list_seats(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn schedule_update_ignores_itself() {
        let (store, room, movie) = seeded().await;
        let schedule = store
            .insert_schedule(&screening(&room, &movie, "2025-01-10T14:00:00Z", "2025-01-10T16:00:00Z"))
            .await
            .unwrap();

        let moved = screening(&room, &movie, "2025-01-10T15:00:00Z", "2025-01-10T17:00:00Z");
        let updated = store.update_schedule(schedule.id, &moved).await.unwrap().unwrap();
        assert_eq!(updated.start_time, at("2025-01-10T15:00:00Z"));
    }

    #[tokio::test]
    async fn movie_filter_by_ids() {
        let (store, _room, movie) = seeded().await;
        let other = store
            .insert_movie(&MoviePayload { title: "Movie 2".into(), duration: 90, price: 2000 })
            .await
            .unwrap();

        let only_other = store.list_movies(Some(&[other.id][..])).await.unwrap();
        assert_eq!(only_other, vec![other]);
        assert_eq!(store.list_movies(None).await.unwrap().len(), 2);
        assert!(store.list_movies(Some(&[movie.id + 100][..])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_sequenced_per_table() {
        let (store, room, movie) = seeded().await;
        let schedule = store
            .insert_schedule(&screening(&room, &movie, "2025-01-10T14:00:00Z", "2025-01-10T16:00:00Z"))
            .await
            .unwrap();
        let seat = store
            .insert_seat(&NewOccupiedSeat { schedule: schedule.id, position: Position(1, 1) })
            .await
            .unwrap();
        assert_eq!((room.id, movie.id, schedule.id, seat.id), (1, 1, 1, 1));

        let second_room = store
            .insert_room(&RoomPayload { name: "Room 2".into(), rows: 5, seats_per_row: 5 })
            .await
            .unwrap();
        assert_eq!(second_room.id, 2);
    }
}
