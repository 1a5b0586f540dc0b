use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::activity::Activity;
use crate::models::stats::{ActivityStats, ByType};
use crate::services::dates::day_key;

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// Upper bound on days walked backward when counting a streak.
const MAX_STREAK_ITERATIONS: usize = 366;

/// Aggregate a user's activity snapshot relative to `now`.
///
/// The caller has already scoped `activities` to one user (and optionally a
/// date range). Output depends only on the inputs.
pub fn compute_stats(activities: &[Activity], now: DateTime<Utc>) -> ActivityStats {
    let week_ago = now - Duration::days(WEEK_DAYS);
    let month_ago = now - Duration::days(MONTH_DAYS);

    let mut by_type = ByType::default();
    let mut this_week = 0;
    let mut this_month = 0;

    for activity in activities {
        by_type.increment(activity.activity_type);
        if activity.completed_at >= week_ago {
            this_week += 1;
        }
        if activity.completed_at >= month_ago {
            this_month += 1;
        }
    }

    debug_assert_eq!(by_type.sum(), activities.len() as u64);

    let days: HashSet<NaiveDate> = activities.iter().map(|a| day_key(a.completed_at)).collect();

    ActivityStats {
        total: activities.len() as u64,
        by_type,
        this_week,
        this_month,
        streak: current_streak(&days, day_key(now)),
    }
}

/// Consecutive active days walking backward from `today`.
///
/// An empty `today` is a day still in progress and does not break the streak.
pub fn current_streak(active_days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = today;

    for _ in 0..MAX_STREAK_ITERATIONS {
        if active_days.contains(&cursor) {
            streak += 1;
        } else if cursor != today {
            break;
        }
        cursor -= Duration::days(1);
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::ActivityType;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 15, 30, 0).unwrap()
    }

    fn activity(activity_type: ActivityType, completed_at: DateTime<Utc>) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            activity_type,
            duration: None,
            mood: None,
            notes: None,
            completed_at,
            created_at: completed_at,
        }
    }

    fn days_ago(n: i64) -> DateTime<Utc> {
        now() - Duration::days(n)
    }

    #[test]
    fn test_empty_set() {
        let stats = compute_stats(&[], now());
        assert_eq!(stats, ActivityStats::default());
        assert_eq!(stats.by_type, ByType::default());
    }

    #[test]
    fn test_today_and_yesterday() {
        let activities = vec![
            activity(ActivityType::Breathing, now()),
            activity(ActivityType::Journal, days_ago(1)),
        ];
        let stats = compute_stats(&activities, now());
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_type.breathing, 1);
        assert_eq!(stats.by_type.journal, 1);
        assert_eq!(stats.by_type.gummies, 0);
        assert_eq!(stats.by_type.rollon, 0);
    }

    #[test]
    fn test_empty_today_does_not_break_streak() {
        let activities = vec![
            activity(ActivityType::Gummies, days_ago(1)),
            activity(ActivityType::Gummies, days_ago(2)),
            activity(ActivityType::Rollon, days_ago(3)),
        ];
        assert_eq!(compute_stats(&activities, now()).streak, 3);
    }

    #[test]
    fn test_gap_keeps_only_recent_suffix() {
        // Chain up to yesterday, broken two days ago.
        let activities = vec![
            activity(ActivityType::Breathing, days_ago(1)),
            activity(ActivityType::Breathing, days_ago(3)),
            activity(ActivityType::Breathing, days_ago(4)),
            activity(ActivityType::Breathing, days_ago(5)),
        ];
        assert_eq!(compute_stats(&activities, now()).streak, 1);
    }

    #[test]
    fn test_no_activity_today_or_yesterday() {
        let activities = vec![activity(ActivityType::Journal, days_ago(2))];
        assert_eq!(compute_stats(&activities, now()).streak, 0);
    }

    #[test]
    fn test_multiple_activities_same_day_count_once() {
        let morning = Utc.with_ymd_and_hms(2026, 2, 10, 6, 0, 0).unwrap();
        let activities = vec![
            activity(ActivityType::Breathing, morning),
            activity(ActivityType::Journal, now()),
        ];
        let stats = compute_stats(&activities, now());
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_rolling_windows() {
        let activities = vec![
            activity(ActivityType::Breathing, days_ago(0)),
            activity(ActivityType::Breathing, days_ago(7)),
            activity(ActivityType::Breathing, days_ago(7) - Duration::seconds(1)),
            activity(ActivityType::Breathing, days_ago(30)),
            activity(ActivityType::Breathing, days_ago(45)),
        ];
        let stats = compute_stats(&activities, now());
        // Window bounds are inclusive of exactly now - 7d / now - 30d.
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.this_month, 4);
        assert_eq!(stats.total, 5);
    }

    #[test]
    fn test_streak_is_bounded() {
        let activities: Vec<_> = (0..500)
            .map(|n| activity(ActivityType::Rollon, days_ago(n)))
            .collect();
        assert_eq!(compute_stats(&activities, now()).streak, 366);
    }

    #[test]
    fn test_future_days_never_extend_streak() {
        let activities = vec![activity(ActivityType::Journal, now() + Duration::days(1))];
        let stats = compute_stats(&activities, now());
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_invariants_over_random_sets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(0..40);
            let activities: Vec<_> = (0..len)
                .map(|_| {
                    let t = ActivityType::ALL[rng.gen_range(0..4)];
                    let offset = Duration::minutes(rng.gen_range(0..60 * 24 * 60));
                    activity(t, now() - offset)
                })
                .collect();

            let stats = compute_stats(&activities, now());
            assert_eq!(stats.by_type.sum(), stats.total);
            assert!(stats.this_week <= stats.this_month);
            assert!(stats.this_month <= stats.total);

            let has_today = activities.iter().any(|a| day_key(a.completed_at) == day_key(now()));
            if has_today {
                assert!(stats.streak >= 1);
            }

            assert_eq!(stats, compute_stats(&activities, now()), "must be idempotent");
        }
    }
}
