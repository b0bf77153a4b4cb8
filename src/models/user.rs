use serde::{Deserialize, Serialize};

/// The identity returned by a successful login and kept in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthenticatedUser {
    #[sqlx(rename = "id")]
    pub user_id: i64,
    pub username: String,
}
