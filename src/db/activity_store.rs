//! Persistence for activity records.
//!
//! Handlers only see the [`ActivityStore`] capability; the Postgres
//! implementation is wired in `main`, tests use the in-memory one.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::activity::{Activity, ActivityFilter, DateRange, NewActivity};

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert(&self, activity: NewActivity) -> AppResult<Activity>;

    /// All of a user's activities within `range`, newest first.
    async fn fetch_activities(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<Activity>>;

    /// One page of a user's activities plus the total matching the filter.
    async fn list(&self, user_id: Uuid, filter: ActivityFilter) -> AppResult<(Vec<Activity>, i64)>;

    async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Activity>>;

    /// Returns false when nothing owned by `user_id` matched.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgActivityStore {
    db: PgPool,
}

impl PgActivityStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn insert(&self, activity: NewActivity) -> AppResult<Activity> {
        let row = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (id, user_id, activity_type, duration, mood, notes, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(activity.user_id)
        .bind(activity.activity_type)
        .bind(activity.duration)
        .bind(activity.mood)
        .bind(&activity.notes)
        .bind(activity.completed_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn fetch_activities(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR completed_at >= $2)
              AND ($3::timestamptz IS NULL OR completed_at <= $3)
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list(&self, user_id: Uuid, filter: ActivityFilter) -> AppResult<(Vec<Activity>, i64)> {
        let rows = sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE user_id = $1 AND ($2::activity_type IS NULL OR activity_type = $2)
            ORDER BY completed_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(filter.activity_type)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM activities
            WHERE user_id = $1 AND ($2::activity_type IS NULL OR activity_type = $2)
            "#,
        )
        .bind(user_id)
        .bind(filter.activity_type)
        .fetch_one(&self.db)
        .await?;

        Ok((rows, total))
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Activity>> {
        let row = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
