//! Adherence streaks
//!
//! A week is clean when it had scheduled sessions and no unaccounted misses.
//! Weeks with nothing scheduled are gaps: they neither extend nor break a
//! streak.

use crate::types::{StreakResult, WeekAdherenceStatus};
use tracing::debug;

/// Current and longest runs of consecutive clean weeks.
///
/// Input is re-sorted by week start date, so callers may pass weeks in any
/// order.
pub fn compute_streak(weeks: &[WeekAdherenceStatus]) -> StreakResult {
    if weeks.is_empty() {
        return StreakResult::default();
    }

    let mut ordered: Vec<&WeekAdherenceStatus> = weeks.iter().collect();
    ordered.sort_by_key(|w| w.week_start_date);

    let mut current_streak: u32 = 0;
    let mut last_clean_week_date = None;
    for week in ordered.iter().rev() {
        if week.is_gap() {
            continue;
        }
        if !week.is_clean() {
            break;
        }
        if last_clean_week_date.is_none() {
            last_clean_week_date = Some(week.week_start_date);
        }
        current_streak += 1;
    }

    let mut longest_streak: u32 = 0;
    let mut run: u32 = 0;
    for week in &ordered {
        if week.is_gap() {
            continue;
        }
        if week.is_clean() {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    debug!(
        weeks = weeks.len(),
        current_streak, longest_streak, "adherence streak"
    );

    StreakResult {
        current_streak,
        longest_streak,
        last_clean_week_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn monday(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap() + Duration::weeks(n)
    }

    fn clean(n: i64) -> WeekAdherenceStatus {
        WeekAdherenceStatus {
            week_start_date: monday(n),
            scheduled: 4,
            completed: 3,
            skipped_with_disruption: 1,
            unaccounted_misses: 0,
        }
    }

    fn missed(n: i64) -> WeekAdherenceStatus {
        WeekAdherenceStatus {
            week_start_date: monday(n),
            scheduled: 4,
            completed: 2,
            skipped_with_disruption: 0,
            unaccounted_misses: 2,
        }
    }

    fn gap(n: i64) -> WeekAdherenceStatus {
        WeekAdherenceStatus {
            week_start_date: monday(n),
            scheduled: 0,
            completed: 0,
            skipped_with_disruption: 0,
            unaccounted_misses: 0,
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            compute_streak(&[]),
            StreakResult {
                current_streak: 0,
                longest_streak: 0,
                last_clean_week_date: None,
            }
        );
    }

    #[test]
    fn test_current_and_longest_streak() {
        let weeks = [clean(0), clean(1), clean(2), missed(3), clean(4), clean(5)];
        let result = compute_streak(&weeks);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 3);
        assert_eq!(result.last_clean_week_date, Some(monday(5)));
    }

    #[test]
    fn test_most_recent_week_missed() {
        let weeks = [clean(0), clean(1), missed(2)];
        let result = compute_streak(&weeks);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
        assert_eq!(result.last_clean_week_date, None);
    }

    #[test]
    fn test_gap_weeks_are_neutral() {
        let without_gap = compute_streak(&[clean(0), clean(1), clean(3)]);
        let with_gap = compute_streak(&[clean(0), clean(1), gap(2), clean(3)]);
        assert_eq!(with_gap, without_gap);
        assert_eq!(with_gap.current_streak, 3);
        assert_eq!(with_gap.longest_streak, 3);
    }

    #[test]
    fn test_trailing_gap_does_not_reset_current_streak() {
        let result = compute_streak(&[missed(0), clean(1), clean(2), gap(3)]);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.last_clean_week_date, Some(monday(2)));
    }

    #[test]
    fn test_only_gap_weeks() {
        let result = compute_streak(&[gap(0), gap(1)]);
        assert_eq!(result, StreakResult::default());
    }

    #[test]
    fn test_unsorted_input_is_ordered_first() {
        let sorted = compute_streak(&[clean(0), missed(1), clean(2), clean(3)]);
        let shuffled = compute_streak(&[clean(3), clean(0), clean(2), missed(1)]);
        assert_eq!(shuffled, sorted);
        assert_eq!(shuffled.current_streak, 2);
        assert_eq!(shuffled.longest_streak, 2);
    }

    #[test]
    fn test_current_never_exceeds_longest() {
        let sequences: Vec<Vec<WeekAdherenceStatus>> = vec![
            vec![clean(0)],
            vec![missed(0), clean(1), gap(2), clean(3)],
            vec![clean(0), clean(1), missed(2), clean(3), clean(4), clean(5)],
            vec![gap(0), missed(1), gap(2)],
        ];
        for weeks in sequences {
            let result = compute_streak(&weeks);
            assert!(result.current_streak <= result.longest_streak);
        }
    }
}
