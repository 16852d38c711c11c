use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use crate::error::ValidationError;

/// Место в зале: `[row, column]`, нумерация с 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(pub i32, pub i32);

impl Position {
    pub fn row(self) -> i32 {
        self.0
    }

    pub fn column(self) -> i32 {
        self.1
    }

    /// Разбирает сырое значение `position` из запроса.
    /// Ровно два целых числа, иначе `MalformedPosition`.
    pub fn parse(raw: &Value) -> Result<Self, ValidationError> {
        let items = raw.as_array().ok_or(ValidationError::MalformedPosition)?;
        let [row, column] = items.as_slice() else {
            return Err(ValidationError::MalformedPosition);
        };
        Ok(Position(coordinate(row)?, coordinate(column)?))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0 && self.1 > 0
    }
}

// Любое целое JSON; вне диапазона i32 насыщается, знак сохраняется,
// так что проверки положительности и границ зала дают нужную ошибку
fn coordinate(value: &Value) -> Result<i32, ValidationError> {
    let wide = match (value.as_i64(), value.as_u64()) {
        (Some(v), _) => v,
        (None, Some(_)) => i64::MAX,
        (None, None) => return Err(ValidationError::MalformedPosition),
    };
    Ok(wide.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedSeat {
    pub id: i64,
    pub schedule: i64,
    pub position: Position,
}

// Строка таблицы occupied_seats
#[derive(Debug, FromRow)]
pub(crate) struct OccupiedSeatRow {
    pub id: i64,
    pub schedule_id: i64,
    pub seat_row: i32,
    pub seat_column: i32,
}

impl From<OccupiedSeatRow> for OccupiedSeat {
    fn from(row: OccupiedSeatRow) -> Self {
        OccupiedSeat {
            id: row.id,
            schedule: row.schedule_id,
            position: Position(row.seat_row, row.seat_column),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SeatPayload {
    #[validate(range(min = 1))]
    pub schedule: i64,
    // Разбирается валидатором мест, чтобы порядок ошибок был предсказуемым
    #[serde(default)]
    pub position: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOccupiedSeat {
    pub schedule: i64,
    pub position: Position,
}
