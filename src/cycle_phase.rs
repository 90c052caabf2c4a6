//! Menstrual-cycle phase calculation
//!
//! Phase boundaries are defined on a canonical 28-day cycle. Other cycle
//! lengths are scaled onto it before the boundaries are applied.

use crate::config::{RulesConfig, DEFAULT_CYCLE_LENGTH_DAYS};
use crate::types::{CycleContext, CyclePhase};
use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

const CANONICAL_CYCLE_DAYS: f64 = 28.0;

/// Cycle position on `reference_date` for a cycle that last started on
/// `last_period_start`.
///
/// A `cycle_length_days` of `None` uses the 28-day default. Reference dates
/// before the period start wrap backwards into the previous cycle.
pub fn compute_cycle_phase(
    last_period_start: NaiveDate,
    cycle_length_days: Option<u32>,
    reference_date: NaiveDate,
) -> CycleContext {
    compute_cycle_phase_with_config(
        last_period_start,
        cycle_length_days,
        reference_date,
        &RulesConfig::default(),
    )
}

/// Same as [`compute_cycle_phase`], using the local calendar date as the
/// reference.
pub fn compute_cycle_phase_today(
    last_period_start: NaiveDate,
    cycle_length_days: Option<u32>,
) -> CycleContext {
    compute_cycle_phase(last_period_start, cycle_length_days, Local::now().date_naive())
}

pub fn compute_cycle_phase_with_config(
    last_period_start: NaiveDate,
    cycle_length_days: Option<u32>,
    reference_date: NaiveDate,
    config: &RulesConfig,
) -> CycleContext {
    let cycle_length = resolve_cycle_length(cycle_length_days, config);

    let days_since_start = (reference_date - last_period_start).num_days();
    let day_of_cycle = days_since_start.rem_euclid(cycle_length as i64) as u32 + 1;
    let days_until_next_period = cycle_length - day_of_cycle;

    let scaled_day = scale_to_canonical(day_of_cycle, cycle_length);
    let phase = phase_for_canonical_day(scaled_day);

    debug!(
        %last_period_start,
        %reference_date,
        cycle_length,
        day_of_cycle,
        scaled_day,
        phase = phase.as_str(),
        "cycle phase"
    );

    CycleContext {
        phase,
        day_of_cycle,
        days_until_next_period,
        is_ovulatory_window: (12..=16).contains(&scaled_day),
        is_late_luteal: scaled_day >= 24,
    }
}

fn resolve_cycle_length(cycle_length_days: Option<u32>, config: &RulesConfig) -> u32 {
    match cycle_length_days {
        Some(0) => {
            warn!("cycle length of 0 days; using configured default");
            config.default_cycle_length_days.max(1)
        }
        Some(days) => days,
        None => config.default_cycle_length_days.max(1),
    }
}

/// Map a day of an arbitrary-length cycle onto the 28-day scale
fn scale_to_canonical(day_of_cycle: u32, cycle_length: u32) -> u32 {
    if cycle_length == DEFAULT_CYCLE_LENGTH_DAYS {
        return day_of_cycle;
    }
    (day_of_cycle as f64 * CANONICAL_CYCLE_DAYS / cycle_length as f64).round() as u32
}

fn phase_for_canonical_day(day: u32) -> CyclePhase {
    match day {
        0..=5 => CyclePhase::Menstrual,
        6..=11 => CyclePhase::Follicular,
        12..=16 => CyclePhase::Ovulatory,
        17..=23 => CyclePhase::Luteal,
        _ => CyclePhase::LateLuteal,
    }
}
