//! User repository for database operations

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{LoginCredentials, UpdateUser, User};
use crate::password::{before_save, is_password_correct};
use crate::validation::{ValidatedUser, validate_record, validate_update};

const USER_COLUMNS: &str = "id, username, email, full_name, avatar, cover_image, watch_history, \
     password, refresh_token, created_at, updated_at";

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the `users` table migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Register a new user
    pub async fn create(&self, validated: ValidatedUser) -> RepositoryResult<User> {
        info!("Creating new user: {}", validated.username);

        let mut user = User::new(validated);
        validate_record(&mut user)?;
        before_save(&mut user)?;

        let query = format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.avatar)
            .bind(&user.cover_image)
            .bind(&user.watch_history)
            .bind(&user.password)
            .bind(&user.refresh_token)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Ok(created)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        info!("Finding user by ID: {}", id);

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user by username or email, case-insensitively
    pub async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> RepositoryResult<Option<User>> {
        let needle = username_or_email.trim().to_lowercase();
        info!("Finding user by username or email: {}", needle);

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&needle)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look a user up and check the password
    ///
    /// Returns `None` both for an unknown user and a wrong password.
    pub async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> RepositoryResult<Option<User>> {
        let Some(user) = self
            .find_by_username_or_email(&credentials.username_or_email)
            .await?
        else {
            return Ok(None);
        };

        if is_password_correct(&user, &credentials.password) {
            Ok(Some(user))
        } else {
            warn!("Invalid password for user: {}", user.id);
            Ok(None)
        }
    }

    /// Persist every mutable field of a record
    ///
    /// Every field is validated again and a password set through
    /// [`User::set_password`] is hashed first; nothing is written when a
    /// field fails.
    pub async fn save(&self, user: &mut User) -> RepositoryResult<()> {
        validate_record(user)?;
        before_save(user)?;
        user.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, full_name = $4, avatar = $5, cover_image = $6,
                watch_history = $7, password = $8, refresh_token = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar)
        .bind(&user.cover_image)
        .bind(&user.watch_history)
        .bind(&user.password)
        .bind(&user.refresh_token)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(user.id));
        }
        Ok(())
    }

    /// Apply a validated profile edit
    ///
    /// Absent fields are left unchanged; a blank `cover_image` removes the
    /// cover.
    pub async fn update_profile(&self, id: Uuid, update: UpdateUser) -> RepositoryResult<User> {
        let update = validate_update(update)?;
        let mut user = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;

        user.apply_update(update);
        self.save(&mut user).await?;
        Ok(user)
    }

    /// Store or clear the refresh token of a user
    pub async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(refresh_token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    /// Append a video to the end of the watch history
    pub async fn append_watch_history(&self, id: Uuid, video_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET watch_history = array_append(watch_history, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}

fn map_unique_violation(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let field = match db_error.constraint() {
                Some(constraint) if constraint.contains("email") => "email",
                _ => "username",
            };
            return RepositoryError::Duplicate(field);
        }
    }
    RepositoryError::Database(error)
}
