use serde::{Deserialize, Serialize};

use super::activity::ActivityType;

/// Per-type counters. Every type is always present on the wire, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByType {
    pub breathing: u64,
    pub journal: u64,
    pub gummies: u64,
    pub rollon: u64,
}

impl ByType {
    pub fn increment(&mut self, activity_type: ActivityType) {
        *self.slot_mut(activity_type) += 1;
    }

    pub fn get(&self, activity_type: ActivityType) -> u64 {
        match activity_type {
            ActivityType::Breathing => self.breathing,
            ActivityType::Journal => self.journal,
            ActivityType::Gummies => self.gummies,
            ActivityType::Rollon => self.rollon,
        }
    }

    pub fn sum(&self) -> u64 {
        ActivityType::ALL.iter().map(|t| self.get(*t)).sum()
    }

    fn slot_mut(&mut self, activity_type: ActivityType) -> &mut u64 {
        match activity_type {
            ActivityType::Breathing => &mut self.breathing,
            ActivityType::Journal => &mut self.journal,
            ActivityType::Gummies => &mut self.gummies,
            ActivityType::Rollon => &mut self.rollon,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total: u64,
    pub by_type: ByType,
    pub this_week: u64,
    pub this_month: u64,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CortisolPoint {
    /// Calendar day key, `YYYY-MM-DD`.
    pub date: String,
    pub value: f64,
}

/// Lookback window for the cortisol chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CortisolPeriod {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl CortisolPeriod {
    /// Unrecognized input falls back to `7d`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("30d") => CortisolPeriod::Month,
            Some("90d") => CortisolPeriod::Quarter,
            _ => CortisolPeriod::Week,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CortisolPeriod::Week => "7d",
            CortisolPeriod::Month => "30d",
            CortisolPeriod::Quarter => "90d",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            CortisolPeriod::Week => 7,
            CortisolPeriod::Month => 30,
            CortisolPeriod::Quarter => 90,
        }
    }
}

/// `period` echoes the client's query value as sent, even when it was not
/// recognized and the window fell back to `7d`.
#[derive(Debug, Serialize)]
pub struct CortisolSeries {
    pub period: String,
    pub data: Vec<CortisolPoint>,
}
