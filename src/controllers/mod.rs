pub mod rooms;
pub mod movies;
pub mod schedules;
pub mod seats;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(rooms::routes())
        .merge(movies::routes())
        .merge(schedules::routes())
        .merge(seats::routes())
}
