//! # WaiCalm Request/Response DTOs
//!
//! API contract types shared by the handlers. Field names are camelCase on
//! the wire to match the mobile client.
//!
//! Conventions:
//! - `*Request` → deserialized from client JSON body
//! - `*Query`   → deserialized from query params
//! - Field-level validation is expressed via `validator` derive macros;
//!   cross-field and clock-dependent checks live in the helpers at the bottom

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::models::activity::{ActivityFilter, ActivityType, DateRange};
use crate::models::user::{is_valid_kit_code, ProfileUpdate, UserProfile};

/// Clock skew tolerated on client-supplied `completedAt`.
const MAX_FUTURE_SKEW_SECS: i64 = 300;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Envelope
// ============================================================================

/// Every success response: `{ "success": true, "message"?, "data" }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

/// Response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// ============================================================================
// User
// ============================================================================

/// PUT /api/user/profile: partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    /// Absent leaves the avatar alone; `null` clears it.
    #[serde(default, deserialize_with = "present_or_null")]
    pub avatar: Option<Option<String>>,

    #[validate(range(min = 1, max = 10, message = "Stress level must be between 1 and 10"))]
    pub stress_level: Option<i32>,
}

/// PUT /api/user/kit-code
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KitCodeRequest {
    #[validate(custom = "validate_kit_code")]
    pub kit_code: String,
}

// ============================================================================
// Activities
// ============================================================================

/// POST /api/activities
///
/// `activity_type` stays a string so an unknown type is a 400 with a clear
/// message instead of a JSON rejection.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub activity_type: String,

    #[validate(range(min = 0, max = 60, message = "Duration must be between 0 and 60 minutes"))]
    pub duration: Option<i32>,

    #[validate(length(max = 500, message = "Notes must be under 500 characters"))]
    pub notes: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: Option<i32>,

    /// Defaults to server-now.
    pub completed_at: Option<DateTime<Utc>>,
}

/// GET /api/activities
#[derive(Debug, Default, Deserialize)]
pub struct ActivityListQuery {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityListResponse<T> {
    pub activities: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// ============================================================================
// Stats
// ============================================================================

/// GET /api/stats
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/stats/cortisol
#[derive(Debug, Default, Deserialize)]
pub struct CortisolQuery {
    pub period: Option<String>,
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Tells an explicit `null` apart from a missing field (paired with `default`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
    if phone.trim().len() < 8 || !phone.chars().all(allowed) {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number".into());
        return Err(err);
    }
    Ok(())
}

fn validate_kit_code(code: &str) -> Result<(), ValidationError> {
    if !is_valid_kit_code(code) {
        let mut err = ValidationError::new("kit_code");
        err.message = Some("Invalid kit code format".into());
        return Err(err);
    }
    Ok(())
}

impl RegisterRequest {
    /// Trim free text and lowercase the email before validation.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.phone = self.phone.trim().to_string();
    }
}

impl UpdateProfileRequest {
    pub fn normalize(&mut self) {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
        if let Some(phone) = self.phone.as_mut() {
            *phone = phone.trim().to_string();
        }
    }

    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name,
            phone: self.phone,
            avatar: self.avatar,
            stress_level: self.stress_level,
        }
    }
}

impl CreateActivityRequest {
    pub fn parse_type(&self) -> Result<ActivityType, String> {
        self.activity_type
            .parse()
            .map_err(|_| "Invalid activity type".to_string())
    }

    /// Reject timestamps from the future beyond tolerated clock skew.
    pub fn validate_completed_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
        let completed_at = self.completed_at.unwrap_or(now);
        if completed_at > now + Duration::seconds(MAX_FUTURE_SKEW_SECS) {
            return Err("completedAt cannot be in the future".into());
        }
        Ok(completed_at)
    }
}

impl ActivityListQuery {
    /// Unknown types are ignored rather than rejected.
    pub fn to_filter(&self) -> ActivityFilter {
        ActivityFilter {
            activity_type: self.activity_type.as_deref().and_then(|t| t.parse().ok()),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

impl StatsQuery {
    /// Both bounds inclusive. A bare `YYYY-MM-DD` end date covers that whole day.
    pub fn to_range(&self) -> Result<DateRange, String> {
        let start = self
            .start_date
            .as_deref()
            .map(|raw| parse_bound(raw, NaiveTime::MIN))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|raw| parse_bound(raw, end_of_day()))
            .transpose()?;
        Ok(DateRange { start, end })
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(raw: &str, date_only_time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(date_only_time).and_utc())
        .map_err(|_| format!("Invalid date: {}", raw))
}
