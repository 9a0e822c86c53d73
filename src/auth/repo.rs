use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::{NewUser, User, UserRow};

const EMAIL_UNIQUE: &str = "users_email_key";
const USERNAME_UNIQUE: &str = "users_username_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error("username already exists")]
    DuplicateUsername,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some(EMAIL_UNIQUE) => return StoreError::DuplicateEmail,
                    Some(USERNAME_UNIQUE) => return StoreError::DuplicateUsername,
                    _ => {}
                }
            }
        }
        StoreError::Backend(e.into())
    }
}

/// Persistence for user accounts.
///
/// Implementations must reject a second record with the same email (or the
/// same non-null username) on `insert` itself, not only via a prior lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user in one atomic statement.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
}

const USER_COLUMNS: &str = "id, name, username, email, password_hash, gender, dob, location, \
     about, profile_image_path, gallery_images, notes, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, username, email, password_hash, gender, dob)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.gender.as_str())
        .bind(new_user.dob)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }
}
