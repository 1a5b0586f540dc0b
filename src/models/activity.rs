use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "activity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Breathing,
    Journal,
    Gummies,
    Rollon,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Breathing,
        ActivityType::Journal,
        ActivityType::Gummies,
        ActivityType::Rollon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Breathing => "breathing",
            ActivityType::Journal => "journal",
            ActivityType::Gummies => "gummies",
            ActivityType::Rollon => "rollon",
        }
    }

    /// Only timed activities carry a meaningful duration.
    pub fn is_timed(&self) -> bool {
        matches!(self, ActivityType::Breathing | ActivityType::Journal)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid activity type: {0}")]
pub struct UnknownActivityType(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownActivityType(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: ActivityType,
    pub duration: Option<i32>,
    pub mood: Option<i32>,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A validated activity ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub activity_type: ActivityType,
    pub duration: Option<i32>,
    pub mood: Option<i32>,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Inclusive `completed_at` bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Filter and pagination for listing a user's activities.
#[derive(Debug, Clone, Copy)]
pub struct ActivityFilter {
    pub activity_type: Option<ActivityType>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_activity_type_parses_closed_set() {
        assert_eq!("breathing".parse::<ActivityType>(), Ok(ActivityType::Breathing));
        assert_eq!("rollon".parse::<ActivityType>(), Ok(ActivityType::Rollon));
        assert!("yoga".parse::<ActivityType>().is_err());
        assert!("Breathing".parse::<ActivityType>().is_err());
    }

    #[test]
    fn test_activity_type_serializes_lowercase() {
        let json = serde_json::to_value(ActivityType::Gummies).unwrap();
        assert_eq!(json, "gummies");
    }

    #[test]
    fn test_activity_serializes_camel_case() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let activity = Activity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            activity_type: ActivityType::Journal,
            duration: Some(10),
            mood: Some(4),
            notes: None,
            completed_at: ts,
            created_at: ts,
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["activityType"], "journal");
        assert!(json.get("completedAt").is_some());
        assert!(json.get("userId").is_some());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let range = DateRange {
            start: Some(start),
            end: Some(end),
        };
        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(end + chrono::Duration::seconds(1)));
        assert!(DateRange::default().contains(start));
    }
}
