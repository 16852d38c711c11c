pub mod room;
pub mod movie;
pub mod schedule;
pub mod seat;

pub use room::{Room, RoomPayload};
pub use movie::{Movie, MoviePayload};
pub use schedule::{NewSchedule, Schedule, SchedulePayload};
pub use seat::{NewOccupiedSeat, OccupiedSeat, Position, SeatPayload};
