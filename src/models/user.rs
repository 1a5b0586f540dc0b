use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub stress_level: i32,
    pub onboarding_completed: bool,
    pub kit_scanned: bool,
    pub kit_code: Option<String>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Partial profile change. `None` leaves a field as is; `avatar: Some(None)`
/// clears the avatar.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<Option<String>>,
    pub stress_level: Option<i32>,
}

/// Public view of a user, as returned by auth and profile endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub stress_level: i32,
    pub onboarding_completed: bool,
    pub kit_scanned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kit_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            avatar: u.avatar,
            stress_level: u.stress_level,
            onboarding_completed: u.onboarding_completed,
            kit_scanned: u.kit_scanned,
            kit_code: u.kit_code,
            created_at: u.created_at,
        }
    }
}

/// Kit codes look like `WC-2024-00001`.
pub fn is_valid_kit_code(code: &str) -> bool {
    let mut parts = code.split('-');
    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    matches!(
        (parts.next(), parts.next(), parts.next(), parts.next()),
        (Some("WC"), Some(year), Some(serial), None) if all_digits(year, 4) && all_digits(serial, 5)
    )
}
