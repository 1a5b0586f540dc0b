//! Synthetic daily cortisol series.
//!
//! Stands in for a biosensor feed until one exists: every logged activity on
//! a day pulls that day's value down from a baseline, plus bounded uniform
//! jitter. Not a physiological model.

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;

use crate::models::activity::Activity;
use crate::models::stats::CortisolPoint;
use crate::services::dates::{day_key, days_inclusive, format_day};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CortisolParams {
    /// Level for a day with no activities, in μg/dL.
    pub baseline: f64,
    /// Reduction per activity logged that day.
    pub activity_weight: f64,
    /// Half-width of the uniform jitter.
    pub jitter: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for CortisolParams {
    fn default() -> Self {
        Self {
            baseline: 5.0,
            activity_weight: 0.3,
            jitter: 0.5,
            min: 2.0,
            max: 8.0,
        }
    }
}

/// One point per calendar day from `start` to `end` inclusive, ascending.
///
/// Returns an empty series when `start > end`.
pub fn synthesize_cortisol_series<R: Rng + ?Sized>(
    activities: &[Activity],
    start: NaiveDate,
    end: NaiveDate,
    params: &CortisolParams,
    rng: &mut R,
) -> Vec<CortisolPoint> {
    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for activity in activities {
        *per_day.entry(day_key(activity.completed_at)).or_default() += 1;
    }

    days_inclusive(start, end)
        .map(|day| {
            let count = per_day.get(&day).copied().unwrap_or(0);
            CortisolPoint {
                date: format_day(day),
                value: day_value(count, params, rng),
            }
        })
        .collect()
}

fn day_value<R: Rng + ?Sized>(count: u32, params: &CortisolParams, rng: &mut R) -> f64 {
    let base = params.baseline - params.activity_weight * f64::from(count);
    let jitter = if params.jitter > 0.0 {
        rng.gen_range(-params.jitter..=params.jitter)
    } else {
        0.0
    };
    round2((base + jitter).clamp(params.min, params.max))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
