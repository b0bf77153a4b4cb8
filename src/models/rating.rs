use chrono::NaiveDateTime;
use serde::Serialize;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A row of the `ratings` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub movie_title: String,
    pub rating: i64,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A rating shown on the per-movie page, attributed to its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MovieRating {
    pub rating: i64,
    pub description: Option<String>,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// A rating shown on the user's own ratings page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserRating {
    pub movie_title: String,
    pub rating: i64,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}
