//! Progress statistics derived from a user's sessions and logs.
//!
//! Nothing is cached: every call recomputes from the current store state.
//! Calendar-day rules (streak, weekly profile) use the time zone of the
//! `now` instant passed in; `user_stats` uses the local zone.

use crate::store::MemStore;
use crate::types::{DayProgress, UserStats, WorkoutSession};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use std::collections::HashSet;

/// Days scanned backwards when computing a streak
const STREAK_LOOKBACK_DAYS: i64 = 30;

/// Length of the weekly window and the progress profile
const WEEK_DAYS: i64 = 7;

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl MemStore {
    /// Stats for `user_id` as of now, in the local time zone
    pub fn user_stats(&self, user_id: &str) -> UserStats {
        self.user_stats_at(user_id, &Local::now())
    }

    /// Stats for `user_id` as of `now`, with calendar days taken in `now`'s zone
    pub fn user_stats_at<Tz: TimeZone>(&self, user_id: &str, now: &DateTime<Tz>) -> UserStats {
        let sessions = self.list_workout_sessions(user_id, None);
        let logs = self.list_exercise_logs(user_id, None);

        let total_weight: f64 = logs.iter().map(|log| log.volume()).sum();

        let stats = UserStats {
            weekly_workouts: weekly_workouts(&sessions, now),
            total_weight: round_half_up(total_weight),
            streak: streak(&sessions, now),
            weekly_progress: weekly_progress(&sessions, now),
        };

        tracing::debug!(
            "Computed stats for {}: {} weekly, {} total weight, {} day streak",
            user_id,
            stats.weekly_workouts,
            stats.total_weight,
            stats.streak
        );

        stats
    }
}

/// Nearest integer, with halves rounded toward positive infinity
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Sessions started within [now - 7 days, now]
fn weekly_workouts<Tz: TimeZone>(sessions: &[WorkoutSession], now: &DateTime<Tz>) -> usize {
    let now = now.with_timezone(&Utc);
    let week_ago = now - Duration::days(WEEK_DAYS);
    sessions
        .iter()
        .filter(|s| s.start_time >= week_ago && s.start_time <= now)
        .count()
}

fn session_date<Tz: TimeZone>(session: &WorkoutSession, tz: &Tz) -> NaiveDate {
    session.start_time.with_timezone(tz).date_naive()
}

/// Consecutive days with a session, walking back from today
///
/// A missing today does not break the streak; any other gap does.
fn streak<Tz: TimeZone>(sessions: &[WorkoutSession], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let workout_days: HashSet<NaiveDate> = sessions.iter().map(|s| session_date(s, &tz)).collect();
    let today = now.date_naive();

    let mut streak = 0;
    for i in 0..STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(i);
        if workout_days.contains(&day) {
            streak += 1;
        } else if i > 0 {
            break;
        }
    }
    streak
}

/// Duration of the first session found on each of the last 7 days, oldest first
///
/// `sessions` must be sorted newest first, ties in insertion order.
fn weekly_progress<Tz: TimeZone>(sessions: &[WorkoutSession], now: &DateTime<Tz>) -> Vec<DayProgress> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..WEEK_DAYS)
        .rev()
        .map(|i| {
            let day = today - Duration::days(i);
            let duration = sessions
                .iter()
                .find(|s| session_date(s, &tz) == day)
                .and_then(|s| s.duration)
                .unwrap_or(0);
            DayProgress {
                day: DAY_LABELS[day.weekday().num_days_from_monday() as usize].to_string(),
                duration,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewExerciseLog, NewWorkoutSession};

    const USER: &str = "u1";

    /// Thursday 2024-06-13 18:00 UTC
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 13, 18, 0, 0).unwrap()
    }

    fn session(duration: Option<i32>) -> NewWorkoutSession {
        NewWorkoutSession {
            user_id: Some(USER.into()),
            template_id: None,
            name: "Workout".into(),
            end_time: None,
            exercises: vec![],
            notes: None,
            total_weight: None,
            duration,
        }
    }

    fn log(sets: i32, reps: i32, weight: Option<&str>) -> NewExerciseLog {
        NewExerciseLog {
            user_id: Some(USER.into()),
            exercise_id: None,
            session_id: None,
            sets,
            reps,
            weight: weight.map(Into::into),
            notes: None,
        }
    }

    fn store_with_sessions_days_ago(days: &[i64]) -> MemStore {
        let mut store = MemStore::empty();
        for d in days {
            store.create_workout_session_at(session(Some(30)), fixed_now() - Duration::days(*d));
        }
        store
    }

    #[test]
    fn test_empty_user_stats() {
        let store = MemStore::empty();
        let stats = store.user_stats_at(USER, &fixed_now());

        assert_eq!(stats.weekly_workouts, 0);
        assert_eq!(stats.total_weight, 0);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.weekly_progress.len(), 7);
        assert!(stats.weekly_progress.iter().all(|d| d.duration == 0));

        let labels: Vec<&str> = stats.weekly_progress.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(labels, vec!["Fri", "Sat", "Sun", "Mon", "Tue", "Wed", "Thu"]);
    }

    #[test]
    fn test_total_weight_single_log() {
        let mut store = MemStore::empty();
        store.create_exercise_log(log(3, 10, Some("135")));
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, 4050);
    }

    #[test]
    fn test_total_weight_missing_or_bad_weight_counts_zero() {
        let mut store = MemStore::empty();
        store.create_exercise_log(log(3, 10, None));
        store.create_exercise_log(log(3, 10, Some("heavy")));
        store.create_exercise_log(log(1, 1, Some("22.5")));
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, 23);
    }

    #[test]
    fn test_total_weight_rounds_halves_up() {
        let mut store = MemStore::empty();
        store.create_exercise_log(log(1, 1, Some("-0.5")));
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, 0);

        store.create_exercise_log(log(1, 1, Some("3")));
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, 3);

        let mut store = MemStore::empty();
        store.create_exercise_log(log(1, 1, Some("-1.5")));
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, -1);
    }

    #[test]
    fn test_total_weight_ignores_other_users() {
        let mut store = MemStore::empty();
        let mut other = log(5, 5, Some("100"));
        other.user_id = Some("someone-else".into());
        store.create_exercise_log(other);
        assert_eq!(store.user_stats_at(USER, &fixed_now()).total_weight, 0);
    }

    #[test]
    fn test_streak_today_and_yesterday() {
        let store = store_with_sessions_days_ago(&[0, 1, 3]);
        assert_eq!(store.user_stats_at(USER, &fixed_now()).streak, 2);
    }

    #[test]
    fn test_streak_tolerates_missing_today_once() {
        let store = store_with_sessions_days_ago(&[1, 3]);
        assert_eq!(store.user_stats_at(USER, &fixed_now()).streak, 1);
    }

    #[test]
    fn test_streak_multiple_sessions_same_day_count_once() {
        let store = store_with_sessions_days_ago(&[0, 0, 1, 2]);
        assert_eq!(store.user_stats_at(USER, &fixed_now()).streak, 3);
    }

    #[test]
    fn test_streak_capped_by_lookback() {
        let days: Vec<i64> = (0..40).collect();
        let store = store_with_sessions_days_ago(&days);
        assert_eq!(store.user_stats_at(USER, &fixed_now()).streak, 30);
    }

    #[test]
    fn test_streak_uses_calendar_days_not_durations() {
        let mut store = MemStore::empty();
        let now = fixed_now();
        // 23:30 the previous evening is less than 24h ago but on yesterday's date
        let late_yesterday = Utc.with_ymd_and_hms(2024, 6, 12, 23, 30, 0).unwrap();
        let early_day_before = Utc.with_ymd_and_hms(2024, 6, 11, 0, 30, 0).unwrap();
        store.create_workout_session_at(session(None), late_yesterday);
        store.create_workout_session_at(session(None), early_day_before);

        assert_eq!(store.user_stats_at(USER, &now).streak, 2);
    }

    #[test]
    fn test_weekly_workouts_window() {
        let mut store = MemStore::empty();
        let now = fixed_now();
        store.create_workout_session_at(session(None), now - Duration::days(7));
        store.create_workout_session_at(session(None), now - Duration::days(2));
        store.create_workout_session_at(session(None), now - Duration::days(8));
        store.create_workout_session_at(session(None), now + Duration::hours(1));

        assert_eq!(store.user_stats_at(USER, &now).weekly_workouts, 2);
    }

    #[test]
    fn test_weekly_progress_same_start_uses_first_inserted() {
        for _ in 0..20 {
            let mut store = MemStore::empty();
            let now = fixed_now();
            let at = now - Duration::hours(3);
            store.create_workout_session_at(session(Some(10)), at);
            store.create_workout_session_at(session(Some(20)), at);

            let progress = store.user_stats_at(USER, &now).weekly_progress;
            assert_eq!(progress[6].duration, 10);
        }
    }

    #[test]
    fn test_weekly_progress_durations() {
        let mut store = MemStore::empty();
        let now = fixed_now();
        store.create_workout_session_at(session(Some(45)), now - Duration::hours(2));
        store.create_workout_session_at(session(Some(60)), now - Duration::days(2));
        store.create_workout_session_at(session(None), now - Duration::days(3));
        store.create_workout_session_at(session(Some(90)), now - Duration::days(9));

        let progress = store.user_stats_at(USER, &now).weekly_progress;
        let durations: Vec<i32> = progress.iter().map(|d| d.duration).collect();
        assert_eq!(durations, vec![0, 0, 0, 0, 60, 0, 45]);
        assert_eq!(progress[6].day, "Thu");
        assert_eq!(progress[4].day, "Tue");
    }

    #[test]
    fn test_weekly_progress_uses_latest_session_of_day() {
        let mut store = MemStore::empty();
        let now = fixed_now();
        store.create_workout_session_at(session(Some(20)), now - Duration::hours(8));
        store.create_workout_session_at(session(Some(50)), now - Duration::hours(1));

        let progress = store.user_stats_at(USER, &now).weekly_progress;
        assert_eq!(progress[6].duration, 50);
    }

    #[test]
    fn test_calendar_days_follow_time_zone() {
        let mut store = MemStore::empty();
        // 02:00 UTC on the 13th is still the 12th at UTC-5
        store.create_workout_session_at(
            session(Some(30)),
            Utc.with_ymd_and_hms(2024, 6, 13, 2, 0, 0).unwrap(),
        );

        let eastern = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 13, 12, 0, 0).unwrap();
        let progress = store.user_stats_at(USER, &now.with_timezone(&eastern)).weekly_progress;

        assert_eq!(progress[6].duration, 0);
        assert_eq!(progress[5].duration, 30);
        assert_eq!(progress[5].day, "Wed");
    }

    #[test]
    fn test_seeded_demo_stats() {
        let store = MemStore::new();
        let stats = store.user_stats(crate::DEMO_USER_ID);

        assert_eq!(stats.weekly_workouts, 1);
        assert_eq!(stats.total_weight, 135 * 30 + 185 * 36);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.weekly_progress.len(), 7);
    }
}
