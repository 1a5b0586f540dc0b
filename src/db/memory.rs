use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::activity_store::ActivityStore;
use super::user_store::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::activity::{Activity, ActivityFilter, DateRange, NewActivity};
use crate::models::user::{NewUser, ProfileUpdate, User};

/// Vec-backed activity store for handler tests.
#[derive(Default)]
pub struct MemoryActivityStore {
    rows: RwLock<Vec<Activity>>,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, activity: Activity) {
        self.rows.write().await.push(activity);
    }

    async fn owned_by(&self, user_id: Uuid) -> Vec<Activity> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        rows
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn insert(&self, activity: NewActivity) -> AppResult<Activity> {
        let row = Activity {
            id: Uuid::new_v4(),
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            duration: activity.duration,
            mood: activity.mood,
            notes: activity.notes,
            completed_at: activity.completed_at,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn fetch_activities(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<Activity>> {
        Ok(self
            .owned_by(user_id)
            .await
            .into_iter()
            .filter(|a| range.contains(a.completed_at))
            .collect())
    }

    async fn list(&self, user_id: Uuid, filter: ActivityFilter) -> AppResult<(Vec<Activity>, i64)> {
        let matching: Vec<_> = self
            .owned_by(user_id)
            .await
            .into_iter()
            .filter(|a| filter.activity_type.map_or(true, |t| a.activity_type == t))
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Activity>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|a| !(a.id == id && a.user_id == user_id));
        Ok(rows.len() < before)
    }
}

/// Vec-backed user accounts for handler tests.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, user: User) {
        self.rows.write().await.push(user);
    }

    /// Apply `change` to the user with `id`, returning the updated row.
    pub async fn modify(&self, id: Uuid, change: impl FnOnce(&mut User)) -> Option<User> {
        let mut rows = self.rows.write().await;
        let user = rows.iter_mut().find(|u| u.id == id)?;
        change(user);
        Some(user.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            avatar: None,
            stress_level: 5,
            onboarding_completed: false,
            kit_scanned: false,
            kit_code: None,
            last_active: now,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.rows.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.modify(id, |u| u.last_active = Utc::now()).await)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        Ok(self
            .modify(id, |u| {
                if let Some(name) = update.name {
                    u.name = name;
                }
                if let Some(phone) = update.phone {
                    u.phone = phone;
                }
                if let Some(avatar) = update.avatar {
                    u.avatar = avatar;
                }
                if let Some(stress_level) = update.stress_level {
                    u.stress_level = stress_level;
                }
                u.updated_at = Utc::now();
            })
            .await)
    }

    async fn claim_kit_code(&self, id: Uuid, kit_code: &str) -> AppResult<Option<User>> {
        let taken = self
            .rows
            .read()
            .await
            .iter()
            .any(|u| u.id != id && u.kit_code.as_deref() == Some(kit_code));
        if taken {
            return Err(AppError::Conflict("Kit code already in use".into()));
        }

        Ok(self
            .modify(id, |u| {
                u.kit_code = Some(kit_code.to_string());
                u.kit_scanned = true;
                u.updated_at = Utc::now();
            })
            .await)
    }
}
