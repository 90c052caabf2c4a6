//! Cycle completion and session performance classification

use crate::config::RulesConfig;
use crate::types::{CycleCompletionInput, CycleCompletionResult, SessionPerformance};
use tracing::debug;

/// Completion percentage and badge eligibility for a training cycle.
///
/// Sessions skipped for a documented disruption count as completed. The
/// caller guarantees `completed + skipped_with_disruption <= total_scheduled`.
pub fn classify_completion(input: &CycleCompletionInput) -> CycleCompletionResult {
    classify_completion_with_config(input, &RulesConfig::default())
}

pub fn classify_completion_with_config(
    input: &CycleCompletionInput,
    config: &RulesConfig,
) -> CycleCompletionResult {
    if input.total_scheduled == 0 {
        return CycleCompletionResult {
            is_complete: false,
            completion_pct: 0.0,
            qualifies_for_badge: false,
        };
    }

    let covered = input.completed + input.skipped_with_disruption;
    let completion_pct = covered as f64 / input.total_scheduled as f64;

    let result = CycleCompletionResult {
        is_complete: completion_pct >= 1.0,
        completion_pct,
        qualifies_for_badge: completion_pct >= config.badge_threshold,
    };
    debug!(
        total_scheduled = input.total_scheduled,
        covered,
        completion_pct,
        qualifies_for_badge = result.qualifies_for_badge,
        "cycle completion"
    );
    result
}

/// Classify a session by actual volume against planned volume.
///
/// This is an approximation: a volume ratio cannot tell "more sets than
/// planned" apart from "fewer, heavier sets". Callers should not read more
/// into `Over` than "moved more total load than planned".
pub fn classify_performance(planned_volume: f64, actual_volume: f64) -> SessionPerformance {
    classify_performance_with_config(planned_volume, actual_volume, &RulesConfig::default())
}

pub fn classify_performance_with_config(
    planned_volume: f64,
    actual_volume: f64,
    config: &RulesConfig,
) -> SessionPerformance {
    if planned_volume <= 0.0 {
        return if actual_volume > 0.0 {
            SessionPerformance::Over
        } else {
            SessionPerformance::OnTarget
        };
    }

    let ratio = actual_volume / planned_volume;
    if ratio > config.over_performance_ratio {
        SessionPerformance::Over
    } else if ratio < config.under_performance_ratio {
        SessionPerformance::Under
    } else {
        SessionPerformance::OnTarget
    }
}
