pub mod test_helpers {
    use chrono::{DateTime, Duration, Utc};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    use crate::models::user::{SubscriptionStatus, TRIAL_PERIOD_DAYS};

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing.
    /// Useful when the session store and the app share the pool across
    /// requests and a single in-memory connection is too tight.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a trial user with a hashed password, returning the row id.
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let trial_ends_at: DateTime<Utc> = Utc::now() + Duration::days(TRIAL_PERIOD_DAYS);

        let result = sqlx::query(
            "INSERT INTO users \
             (email, password_hash, first_name, status, subscription_status, trial_ends_at) \
             VALUES (?, ?, ?, 'quilter', 'trial', ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind("Test")
        .bind(trial_ends_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Force a user's stored billing state, bypassing the service layer.
    pub async fn set_subscription_state(
        pool: &SqlitePool,
        user_id: i64,
        status: SubscriptionStatus,
        trial_ends_at: Option<DateTime<Utc>>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET subscription_status = ?, trial_ends_at = ? WHERE id = ?")
            .bind(status)
            .bind(trial_ends_at)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
