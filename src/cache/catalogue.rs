use crate::cache::CacheService;
use crate::models::{Movie, Room};

const MOVIES_KEY: &str = "movies:all";
const ROOMS_KEY: &str = "rooms:all";

impl CacheService {
    // === Фильмы (только полный список, фильтр по id идет мимо кеша) ===
    pub async fn get_movies(&self) -> Option<Vec<Movie>> {
        self.get_json(MOVIES_KEY).await
    }

    pub async fn save_movies(&self, movies: &[Movie]) {
        self.set_json(MOVIES_KEY, movies).await
    }

    pub async fn invalidate_movies(&self) {
        self.invalidate(MOVIES_KEY).await
    }

    // === Залы ===
    pub async fn get_rooms(&self) -> Option<Vec<Room>> {
        self.get_json(ROOMS_KEY).await
    }

    pub async fn save_rooms(&self, rooms: &[Room]) {
        self.set_json(ROOMS_KEY, rooms).await
    }

    pub async fn invalidate_rooms(&self) {
        self.invalidate(ROOMS_KEY).await
    }
}
