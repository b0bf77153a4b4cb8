use std::path::Path;

use sha2::{Digest, Sha256};
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection,
};

use crate::{
    error::{AppError, AppResult},
    models::{AuthenticatedUser, MovieRating, Rating, UserRating, MAX_RATING, MIN_RATING},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Hex-encoded SHA-256 digest of a password
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Handle to the embedded SQLite store
///
/// Holds only the connection options. Every operation opens its own
/// connection and closes it before returning; there is no pool.
#[derive(Debug, Clone)]
pub struct Database {
    options: SqliteConnectOptions,
}

impl Database {
    /// Opens (creating if needed) the database file and applies migrations
    pub async fn connect(path: impl AsRef<Path>) -> AppResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);

        let database = Self { options };

        let mut conn = database.open().await?;
        MIGRATOR.run(&mut conn).await?;
        conn.close().await?;

        let users = database.count_users().await?;
        tracing::info!(path = %path.as_ref().display(), users, "Database ready");

        Ok(database)
    }

    async fn open(&self) -> AppResult<SqliteConnection> {
        Ok(SqliteConnection::connect_with(&self.options).await?)
    }

    /// Registers a new user and returns its id
    ///
    /// Fails with [`AppError::Conflict`] when the username or email is taken;
    /// the users table is left unchanged in that case.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> AppResult<i64> {
        let mut conn = self.open().await?;

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(hash_password(password))
        .execute(&mut conn)
        .await;

        conn.close().await?;

        match result {
            Ok(done) => {
                let user_id = done.last_insert_rowid();
                tracing::info!(user_id, username = %username, "User created");
                Ok(user_id)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::info!(username = %username, "Signup rejected, username or email taken");
                Err(AppError::Conflict(
                    "Username or email already exists".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the user only if both the username and the password hash match
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<AuthenticatedUser>> {
        let mut conn = self.open().await?;

        let user = sqlx::query_as::<_, AuthenticatedUser>(
            "SELECT id, username FROM users WHERE username = ? AND password_hash = ?",
        )
        .bind(username)
        .bind(hash_password(password))
        .fetch_optional(&mut conn)
        .await?;

        conn.close().await?;
        Ok(user)
    }

    /// Number of registered users
    pub async fn count_users(&self) -> AppResult<i64> {
        let mut conn = self.open().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut conn)
            .await?;

        conn.close().await?;
        Ok(count)
    }

    /// Stores a rating, replacing any earlier rating by the same user for the same title
    pub async fn add_rating(
        &self,
        user_id: i64,
        movie_title: &str,
        rating: i64,
        description: Option<&str>,
    ) -> AppResult<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        if movie_title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Movie title cannot be empty".to_string(),
            ));
        }

        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let mut conn = self.open().await?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ratings (user_id, movie_title, rating, description)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(movie_title)
        .bind(rating)
        .bind(description)
        .execute(&mut conn)
        .await?;

        conn.close().await?;

        tracing::info!(user_id, movie_title = %movie_title, rating, "Rating stored");
        Ok(())
    }

    /// The rating a user gave to a title, if any
    pub async fn get_rating(&self, user_id: i64, movie_title: &str) -> AppResult<Option<Rating>> {
        let mut conn = self.open().await?;

        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_title, rating, description, created_at
            FROM ratings
            WHERE user_id = ? AND movie_title = ?
            "#,
        )
        .bind(user_id)
        .bind(movie_title)
        .fetch_optional(&mut conn)
        .await?;

        conn.close().await?;
        Ok(rating)
    }

    /// Ratings the given user has submitted, newest first
    pub async fn get_user_ratings(&self, user_id: i64) -> AppResult<Vec<UserRating>> {
        let mut conn = self.open().await?;

        let ratings = sqlx::query_as::<_, UserRating>(
            r#"
            SELECT movie_title, rating, description, created_at
            FROM ratings
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;
        Ok(ratings)
    }

    /// Ratings for one title together with their authors, newest first
    pub async fn get_movie_ratings(&self, movie_title: &str) -> AppResult<Vec<MovieRating>> {
        let mut conn = self.open().await?;

        let ratings = sqlx::query_as::<_, MovieRating>(
            r#"
            SELECT r.rating, r.description, u.username, r.created_at
            FROM ratings r
            JOIN users u ON r.user_id = u.id
            WHERE r.movie_title = ?
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(movie_title)
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::connect(dir.path().join("test.db")).await.unwrap();
        (dir, db)
    }

    /// (username, email, password_hash) rows in insertion order
    async fn stored_users(db: &Database) -> Vec<(String, String, String)> {
        let mut conn = db.open().await.unwrap();
        sqlx::query_as("SELECT username, email, password_hash FROM users ORDER BY id")
            .fetch_all(&mut conn)
            .await
            .unwrap()
    }

    #[test]
    fn test_hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("again.db");

        let db = Database::connect(&path).await.unwrap();
        db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        let reopened = Database::connect(&path).await.unwrap();
        assert_eq!(reopened.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (_dir, db) = create_test_db().await;
        db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        let result = db.create_user("alice", "other@example.com", "pw2").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let users = stored_users(&db).await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].1, "alice@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (_dir, db) = create_test_db().await;
        db.create_user("alice", "shared@example.com", "pw").await.unwrap();

        let result = db.create_user("bob", "shared@example.com", "pw").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stored_hash_matches_password() {
        let (_dir, db) = create_test_db().await;
        db.create_user("alice", "alice@example.com", "hunter2").await.unwrap();

        let users = stored_users(&db).await;
        assert_eq!(users[0].2, hash_password("hunter2"));
    }

    #[tokio::test]
    async fn test_authenticate_exact_pair_only() {
        let (_dir, db) = create_test_db().await;
        let alice_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();
        db.create_user("bob", "bob@example.com", "other").await.unwrap();

        let user = db.authenticate_user("alice", "pw").await.unwrap().unwrap();
        assert_eq!(user.user_id, alice_id);
        assert_eq!(user.username, "alice");

        assert!(db.authenticate_user("alice", "PW").await.unwrap().is_none());
        assert!(db.authenticate_user("alice", "other").await.unwrap().is_none());
        assert!(db.authenticate_user("Alice", "pw").await.unwrap().is_none());
        assert!(db.authenticate_user("carol", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_rating_replaces_first() {
        let (_dir, db) = create_test_db().await;
        let user_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        db.add_rating(user_id, "Inception", 3, Some("fine")).await.unwrap();
        db.add_rating(user_id, "Inception", 5, Some("better the second time"))
            .await
            .unwrap();

        let ratings = db.get_movie_ratings("Inception").await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 5);
        assert_eq!(ratings[0].description.as_deref(), Some("better the second time"));

        let stored = db.get_rating(user_id, "Inception").await.unwrap().unwrap();
        assert_eq!(stored.rating, 5);
    }

    #[tokio::test]
    async fn test_ratings_from_different_users_coexist() {
        let (_dir, db) = create_test_db().await;
        let alice = db.create_user("alice", "alice@example.com", "pw").await.unwrap();
        let bob = db.create_user("bob", "bob@example.com", "pw").await.unwrap();

        db.add_rating(alice, "Joker", 4, None).await.unwrap();
        db.add_rating(bob, "Joker", 2, Some("too dark")).await.unwrap();

        let ratings = db.get_movie_ratings("Joker").await.unwrap();
        assert_eq!(ratings.len(), 2);
        // Same-second inserts fall back to id order, newest first
        assert_eq!(ratings[0].username, "bob");
        assert_eq!(ratings[1].username, "alice");
        assert_eq!(ratings[1].description, None);
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected() {
        let (_dir, db) = create_test_db().await;
        let user_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        for bad in [0, 6, -1] {
            let result = db.add_rating(user_id, "Avatar", bad, None).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }

        assert!(db.get_user_ratings(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_description_stored_as_null() {
        let (_dir, db) = create_test_db().await;
        let user_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        db.add_rating(user_id, "Thor", 3, Some("   ")).await.unwrap();

        let stored = db.get_rating(user_id, "Thor").await.unwrap().unwrap();
        assert_eq!(stored.description, None);
    }

    #[tokio::test]
    async fn test_user_ratings_only_lists_own() {
        let (_dir, db) = create_test_db().await;
        let alice = db.create_user("alice", "alice@example.com", "pw").await.unwrap();
        let bob = db.create_user("bob", "bob@example.com", "pw").await.unwrap();

        db.add_rating(alice, "Avatar", 4, None).await.unwrap();
        db.add_rating(alice, "Titanic", 2, None).await.unwrap();
        db.add_rating(bob, "Avatar", 1, None).await.unwrap();

        let ratings = db.get_user_ratings(alice).await.unwrap();
        let titles: Vec<_> = ratings.iter().map(|r| r.movie_title.as_str()).collect();
        assert_eq!(titles, vec!["Titanic", "Avatar"]);
    }

    #[tokio::test]
    async fn test_title_is_found_by_the_string_it_was_stored_under() {
        let (_dir, db) = create_test_db().await;
        let user_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        db.add_rating(user_id, " Joker ", 4, None).await.unwrap();

        assert_eq!(db.get_movie_ratings(" Joker ").await.unwrap().len(), 1);
        let stored = db.get_rating(user_id, " Joker ").await.unwrap().unwrap();
        assert_eq!(stored.movie_title, " Joker ");
        assert!(db.get_movie_ratings("Joker").await.unwrap().is_empty());

        db.add_rating(user_id, " Joker ", 2, None).await.unwrap();
        let ratings = db.get_user_ratings(user_id).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 2);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let (_dir, db) = create_test_db().await;
        let user_id = db.create_user("alice", "alice@example.com", "pw").await.unwrap();

        let result = db.add_rating(user_id, "   ", 4, None).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(db.get_user_ratings(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rating_for_unknown_user_fails() {
        let (_dir, db) = create_test_db().await;
        let result = db.add_rating(42, "Avatar", 4, None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
