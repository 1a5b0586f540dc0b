//! Persistence for user accounts.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, ProfileUpdate, User};

/// Postgres unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn find(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>>;

    /// Links `kit_code` to the user and marks the kit scanned. Fails with
    /// `Conflict` when another user already holds the code.
    async fn claim_kit_code(&self, id: Uuid, kit_code: &str) -> AppResult<Option<User>>;
}

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
    async fn create(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".into())
            } else {
                AppError::Database(e)
            }
        })
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_active = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        // $4 says whether avatar was sent at all; $5 may be NULL to clear it.
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                avatar = CASE WHEN $4::boolean THEN $5::text ELSE avatar END,
                stress_level = COALESCE($6, stress_level),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(update.avatar.is_some())
        .bind(update.avatar.flatten())
        .bind(update.stress_level)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn claim_kit_code(&self, id: Uuid, kit_code: &str) -> AppResult<Option<User>> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE kit_code = $1")
            .bind(kit_code)
            .fetch_optional(&self.db)
            .await?;

        if owner.is_some_and(|owner| owner != id) {
            return Err(AppError::Conflict("Kit code already in use".into()));
        }

        // The unique index still guards against a concurrent claim.
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET kit_code = $2, kit_scanned = true, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(kit_code)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Kit code already in use".into())
            } else {
                AppError::Database(e)
            }
        })
    }
}
