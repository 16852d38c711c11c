//! Правила бронирования. Валидаторы только читают хранилище; запись идет
//! отдельным вызовом, когда все проверки пройдены.

pub mod scheduling;
pub mod seating;
