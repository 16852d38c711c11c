//! seating.rs
//!
//! Проверка занятия места на сеанс. Порядок проверок фиксирован, первая
//! неудача определяет ответ:
//!
//! 1. сеанс существует;
//! 2. `position` — ровно два целых числа;
//! 3. обе координаты > 0;
//! 4. место внутри сетки зала этого сеанса;
//! 5. место на этом сеансе еще не занято.
//!
//! Границы проверяются до дубликата: заведомо невозможное место получает
//! `OutOfBounds`, а не `AlreadyOccupied`.

use tracing::info;

use crate::error::{CinemaError, CinemaResult, ConflictError, Entity, ValidationError};
use crate::models::{NewOccupiedSeat, OccupiedSeat, Position, Room, SeatPayload};
use crate::store::CinemaStore;

/// Шаги 2-4: форма позиции и попадание в зал. Без обращения к хранилищу.
pub fn check_position(room: &Room, raw: &serde_json::Value) -> Result<Position, ValidationError> {
    let position = Position::parse(raw)?;
    if !position.is_positive() {
        return Err(ValidationError::NonPositiveCoordinate);
    }
    if !room.contains(position) {
        return Err(ValidationError::OutOfBounds {
            row: position.row(),
            column: position.column(),
            rows: room.rows,
            seats_per_row: room.seats_per_row,
        });
    }
    Ok(position)
}

/// `exclude` — id записи, которая обновляется (не считается дубликатом).
pub async fn validate_seat_claim(
    store: &dyn CinemaStore,
    payload: &SeatPayload,
    exclude: Option<i64>,
) -> CinemaResult<NewOccupiedSeat> {
    let schedule = store
        .get_schedule(payload.schedule)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Schedule, payload.schedule))?;

    // Зал удаляется каскадом вместе с сеансами, так что отсутствие зала здесь - гонка
    let room = store
        .get_room(schedule.room)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::Room, schedule.room))?;

    let position = check_position(&room, &payload.position).inspect_err(|e| {
        info!("Seat rejected for schedule {}: {}", schedule.id, e);
    })?;

    if store.seat_taken(schedule.id, position, exclude).await? {
        info!(
            "Seat [{}, {}] already occupied for schedule {}",
            position.row(),
            position.column(),
            schedule.id
        );
        return Err(ConflictError::AlreadyOccupied {
            schedule: schedule.id,
            row: position.row(),
            column: position.column(),
        }
        .into());
    }

    Ok(NewOccupiedSeat {
        schedule: schedule.id,
        position,
    })
}

pub async fn claim_seat(store: &dyn CinemaStore, payload: &SeatPayload) -> CinemaResult<OccupiedSeat> {
    let claim = validate_seat_claim(store, payload, None).await?;
    let seat = store.insert_seat(&claim).await?;
    info!(
        "Seat [{}, {}] occupied for schedule {}",
        seat.position.row(),
        seat.position.column(),
        seat.schedule
    );
    Ok(seat)
}

pub async fn update_seat(
    store: &dyn CinemaStore,
    id: i64,
    payload: &SeatPayload,
) -> CinemaResult<OccupiedSeat> {
    if store.get_seat(id).await?.is_none() {
        return Err(CinemaError::not_found(Entity::OccupiedSeat, id));
    }
    let claim = validate_seat_claim(store, payload, Some(id)).await?;
    store
        .update_seat(id, &claim)
        .await?
        .ok_or_else(|| CinemaError::not_found(Entity::OccupiedSeat, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoviePayload, NewSchedule, RoomPayload};
    use crate::store::MemoryStore;
    use proptest::prelude::*;
    use serde_json::json;

    fn room(rows: i32, seats_per_row: i32) -> Room {
        Room { id: 1, name: "Room 1".into(), rows, seats_per_row }
    }

    async fn seeded() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let room = store
            .insert_room(&RoomPayload { name: "Room 1".into(), rows: 10, seats_per_row: 8 })
            .await
            .unwrap();
        let movie = store
            .insert_movie(&MoviePayload { title: "Movie 1".into(), duration: 120, price: 3000 })
            .await
            .unwrap();
        let schedule = store
            .insert_schedule(&NewSchedule {
                room: room.id,
                movie: movie.id,
                start_time: "2025-01-10T14:00:00Z".parse().unwrap(),
                end_time: "2025-01-10T16:00:00Z".parse().unwrap(),
            })
            .await
            .unwrap();
        (store, schedule.id)
    }

    fn claim(schedule: i64, position: serde_json::Value) -> SeatPayload {
        SeatPayload { schedule, position }
    }

    #[tokio::test]
    async fn scenario_from_booking_flow() {
        let (store, schedule) = seeded().await;

        claim_seat(&store, &claim(schedule, json!([1, 1]))).await.unwrap();

        let err = claim_seat(&store, &claim(schedule, json!([1, 1]))).await.unwrap_err();
        assert!(matches!(err, CinemaError::Conflict(ConflictError::AlreadyOccupied { .. })));

        let err = claim_seat(&store, &claim(schedule, json!([11, 1]))).await.unwrap_err();
        assert!(matches!(err, CinemaError::Validation(ValidationError::OutOfBounds { .. })));

        let err = claim_seat(&store, &claim(schedule, json!([0, 1]))).await.unwrap_err();
        assert!(matches!(err, CinemaError::Validation(ValidationError::NonPositiveCoordinate)));

        assert_eq!(store.list_seats(Some(schedule)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_schedule_wins_over_bad_position() {
        let (store, schedule) = seeded().await;
        let err = claim_seat(&store, &claim(schedule + 100, json!("nonsense")))
            .await
            .unwrap_err();
        assert!(matches!(err, CinemaError::NotFound { entity: Entity::Schedule, .. }));
    }

    #[tokio::test]
    async fn malformed_position_is_reported() {
        let (store, schedule) = seeded().await;
        for raw in [json!([1]), json!([1, 2, 3]), json!(null), json!(["a", 1])] {
            let err = claim_seat(&store, &claim(schedule, raw)).await.unwrap_err();
            assert!(matches!(err, CinemaError::Validation(ValidationError::MalformedPosition)));
        }
    }

    #[tokio::test]
    async fn rejection_is_idempotent() {
        let (store, schedule) = seeded().await;
        claim_seat(&store, &claim(schedule, json!([4, 5]))).await.unwrap();
        for _ in 0..5 {
            let err = claim_seat(&store, &claim(schedule, json!([4, 5]))).await.unwrap_err();
            assert!(matches!(err, CinemaError::Conflict(ConflictError::AlreadyOccupied { .. })));
        }
    }

    #[tokio::test]
    async fn update_moves_seat_and_rechecks() {
        let (store, schedule) = seeded().await;
        let a = claim_seat(&store, &claim(schedule, json!([1, 1]))).await.unwrap();
        claim_seat(&store, &claim(schedule, json!([1, 2]))).await.unwrap();

        // Та же позиция у самой записи - не дубликат
        update_seat(&store, a.id, &claim(schedule, json!([1, 1]))).await.unwrap();

        let err = update_seat(&store, a.id, &claim(schedule, json!([1, 2]))).await.unwrap_err();
        assert!(matches!(err, CinemaError::Conflict(ConflictError::AlreadyOccupied { .. })));

        let err = update_seat(&store, a.id, &claim(schedule, json!([1, 9]))).await.unwrap_err();
        assert!(matches!(err, CinemaError::Validation(ValidationError::OutOfBounds { .. })));

        let moved = update_seat(&store, a.id, &claim(schedule, json!([3, 3]))).await.unwrap();
        assert_eq!(moved.position, Position(3, 3));
    }

    #[test]
    fn huge_coordinates_get_bounds_and_sign_errors() {
        assert!(matches!(
            check_position(&room(10, 8), &json!([1, 5_000_000_000i64])),
            Err(ValidationError::OutOfBounds { .. })
        ));
        assert_eq!(
            check_position(&room(10, 8), &json!([-5_000_000_000i64, 1])),
            Err(ValidationError::NonPositiveCoordinate)
        );
    }

    proptest! {
        #[test]
        fn seats_inside_grid_are_accepted(rows in 1i32..40, cols in 1i32..40, r in 1i32..40, c in 1i32..40) {
            prop_assume!(r <= rows && c <= cols);
            prop_assert_eq!(check_position(&room(rows, cols), &json!([r, c])), Ok(Position(r, c)));
        }

        #[test]
        fn seats_outside_grid_are_rejected(rows in 1i32..40, cols in 1i32..40, r in 1i32..80, c in 1i32..80) {
            prop_assume!(r > rows || c > cols);
            let rejected = matches!(
                check_position(&room(rows, cols), &json!([r, c])),
                Err(ValidationError::OutOfBounds { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn zero_or_negative_is_rejected(r in -5i32..=0, c in -5i32..10) {
            prop_assert_eq!(
                check_position(&room(10, 8), &json!([r, c])),
                Err(ValidationError::NonPositiveCoordinate)
            );
            prop_assert_eq!(
                check_position(&room(10, 8), &json!([c.max(1), r])),
                Err(ValidationError::NonPositiveCoordinate)
            );
        }
    }
}
