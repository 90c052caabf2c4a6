//! Disruption-driven workout adjustments
//!
//! Each reported disruption is mapped through a type x severity table onto
//! zero or more adjustments, which are then applied to every upcoming
//! session of an affected lift.

use crate::types::{
    AdjustmentAction, Disruption, DisruptionAdjustmentSuggestion, DisruptionType, Lift,
    PlannedSession, Severity,
};
use tracing::debug;

/// Reps removed per set where the table calls for a rep cut
const ILLNESS_REPS_REDUCTION: u32 = 2;

/// One row of the decision table, before it is bound to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjustment {
    Skip,
    ReduceWeight(u32),
    ReduceReps(u32),
    Substitute,
}

/// Adjustments the table prescribes for a disruption
fn adjustments_for(disruption_type: DisruptionType, severity: Severity) -> Vec<Adjustment> {
    use Adjustment::*;

    match (disruption_type, severity) {
        (DisruptionType::Injury, Severity::Major) => vec![Skip],
        (DisruptionType::Injury, Severity::Moderate) => vec![ReduceWeight(40)],
        (DisruptionType::Injury, Severity::Minor) => vec![ReduceWeight(20)],

        (DisruptionType::Illness, Severity::Major) => vec![Skip],
        (DisruptionType::Illness, Severity::Moderate) => {
            vec![ReduceWeight(25), ReduceReps(ILLNESS_REPS_REDUCTION)]
        }
        (DisruptionType::Illness, Severity::Minor) => vec![ReduceReps(ILLNESS_REPS_REDUCTION)],

        (DisruptionType::Travel, _) => vec![ReduceWeight(30)],

        (DisruptionType::Fatigue, Severity::Major) => vec![Skip],
        (DisruptionType::Fatigue, Severity::Moderate) => vec![ReduceWeight(20)],
        (DisruptionType::Fatigue, Severity::Minor) => vec![ReduceWeight(10)],

        (DisruptionType::EquipmentUnavailable, _) => vec![Substitute],

        (DisruptionType::UnprogrammedEvent, _)
        | (DisruptionType::Other, _)
        | (DisruptionType::Unrecognized, _) => Vec::new(),
    }
}

/// Per-session adjustment suggestions for one disruption.
///
/// Only sessions whose primary lift the disruption affects are considered.
/// Output follows session order, then table order within a session.
pub fn suggest_adjustments(
    disruption: &Disruption,
    planned_sessions: &[PlannedSession],
) -> Vec<DisruptionAdjustmentSuggestion> {
    let adjustments = adjustments_for(disruption.disruption_type, disruption.severity);
    if adjustments.is_empty() {
        debug!(
            disruption_type = disruption.disruption_type.as_str(),
            "no actionable adjustment for disruption"
        );
        return Vec::new();
    }

    let suggestions: Vec<DisruptionAdjustmentSuggestion> = planned_sessions
        .iter()
        .filter(|session| disruption.affects(session.primary_lift))
        .flat_map(|session| {
            adjustments
                .iter()
                .map(move |adjustment| build_suggestion(disruption, session, *adjustment))
        })
        .collect();

    debug!(
        disruption_type = disruption.disruption_type.as_str(),
        severity = disruption.severity.as_str(),
        sessions = planned_sessions.len(),
        suggestions = suggestions.len(),
        "disruption adjustments"
    );
    suggestions
}

fn build_suggestion(
    disruption: &Disruption,
    session: &PlannedSession,
    adjustment: Adjustment,
) -> DisruptionAdjustmentSuggestion {
    let lift = session.primary_lift;
    let header = format!(
        "{} {}",
        severity_label(disruption.severity),
        disruption.disruption_type.as_str()
    );

    let (action, reduction_pct, reps_reduction, advice) = match adjustment {
        Adjustment::Skip => (
            AdjustmentAction::SessionSkipped,
            None,
            None,
            skip_advice(disruption.disruption_type, lift),
        ),
        Adjustment::ReduceWeight(pct) => (
            AdjustmentAction::WeightReduced,
            Some(pct),
            None,
            format!("reduce {} load by {}%", lift, pct),
        ),
        Adjustment::ReduceReps(reps) => (
            AdjustmentAction::RepsReduced,
            None,
            Some(reps),
            format!("cut {} reps per set on {}", reps, lift),
        ),
        Adjustment::Substitute => (
            AdjustmentAction::ExerciseSubstituted,
            None,
            None,
            format!("substitute a {} variation that fits the available equipment", lift),
        ),
    };

    let substitution_note = match (disruption.disruption_type, adjustment) {
        (DisruptionType::Travel, _) => Some(travel_alternatives(lift).to_string()),
        (_, Adjustment::Substitute) => Some(equipment_alternatives(lift).to_string()),
        _ => None,
    };

    DisruptionAdjustmentSuggestion {
        session_id: session.id.clone(),
        action,
        reduction_pct,
        reps_reduction,
        rationale: format!("{}: {}", header, advice),
        substitution_note,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Minor => "Minor",
        Severity::Moderate => "Moderate",
        Severity::Major => "Major",
    }
}

fn skip_advice(disruption_type: DisruptionType, lift: Lift) -> String {
    match disruption_type {
        DisruptionType::Injury => {
            format!("skip this {} session and let the injury settle before loading it again", lift)
        }
        DisruptionType::Illness => format!("skip this {} session until symptoms resolve", lift),
        _ => format!("skip this {} session to recover", lift),
    }
}

fn travel_alternatives(lift: Lift) -> &'static str {
    match lift {
        Lift::Squat => "If no rack is available, use goblet squats, split squats or pistol squats",
        Lift::Bench => "If no bench is available, use dumbbell floor press or weighted push-ups",
        Lift::Deadlift => {
            "If no barbell is available, use dumbbell Romanian deadlifts or single-leg hip hinges"
        }
    }
}

fn equipment_alternatives(lift: Lift) -> &'static str {
    match lift {
        Lift::Squat => "Swap to safety-bar squat, belt squat or leg press",
        Lift::Bench => "Swap to dumbbell bench press or machine chest press",
        Lift::Deadlift => "Swap to trap-bar deadlift, rack pulls or dumbbell Romanian deadlifts",
    }
}
