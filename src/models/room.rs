use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::Position;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_per_row: i32,
}

impl Room {
    // Попадает ли место в сетку зала (координаты с 1)
    pub fn contains(&self, position: Position) -> bool {
        position.row() <= self.rows && position.column() <= self.seats_per_row
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoomPayload {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default = "default_rows")]
    #[validate(range(min = 1))]
    pub rows: i32,
    #[serde(default = "default_seats_per_row")]
    #[validate(range(min = 1))]
    pub seats_per_row: i32,
}

fn default_rows() -> i32 {
    10
}

fn default_seats_per_row() -> i32 {
    8
}
