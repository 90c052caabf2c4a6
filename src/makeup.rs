//! Makeup-window evaluation for missed sessions
//!
//! A missed session may be made up until the day before the next session of
//! the same lift. With no later same-lift session in the cycle, the window
//! runs to the Sunday closing the missed session's Monday-start week.

use crate::types::SessionRef;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

/// Last calendar day on which `missed` may still be made up
pub fn makeup_window_last_day(missed: &SessionRef, sessions_this_cycle: &[SessionRef]) -> NaiveDate {
    let next_same_lift = sessions_this_cycle
        .iter()
        .filter(|s| s.lift == missed.lift && s.scheduled_date > missed.scheduled_date)
        .map(|s| s.scheduled_date)
        .min();

    match next_same_lift {
        Some(next) => next - Duration::days(1),
        None => end_of_week(missed.scheduled_date),
    }
}

/// Whether the makeup window for `missed` has lapsed as of `today`
pub fn is_makeup_window_expired(
    missed: &SessionRef,
    sessions_this_cycle: &[SessionRef],
    today: NaiveDate,
) -> bool {
    let last_day = makeup_window_last_day(missed, sessions_this_cycle);
    let expired = today > last_day;
    debug!(
        session_id = %missed.id,
        lift = missed.lift.as_str(),
        %last_day,
        %today,
        expired,
        "makeup window"
    );
    expired
}

/// Sunday of the Monday-start week containing `date`
fn end_of_week(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(days_to_sunday)
}
