//! JSON request API
//!
//! One tagged request type covering every rule, so hosts (the FFI layer, the
//! CLI, or a backend job) can call the engine with a single JSON document.
//!
//! ```ignore
//! let out = evaluate_json(
//!     r#"{"op":"strength_score","total_kg":600,"bodyweight_kg":100,"sex":"male"}"#,
//!     &RulesConfig::default(),
//! )?;
//! // {"op":"strength_score","result":437.62}
//! ```

use crate::adjustments::suggest_adjustments;
use crate::completion::{classify_completion_with_config, classify_performance_with_config};
use crate::config::RulesConfig;
use crate::cycle_phase::compute_cycle_phase_with_config;
use crate::error::EngineError;
use crate::formulas::compute_strength_score;
use crate::makeup::makeup_window_last_day;
use crate::records::detect_records_with_config;
use crate::streak::compute_streak;
use crate::types::{
    CompletedSet, CycleCompletionInput, CycleCompletionResult, CycleContext, Disruption,
    DisruptionAdjustmentSuggestion, HistoricalPrSnapshot, Lift, PersonalRecord, PlannedSession,
    SessionPerformance, SessionRef, Sex, StreakResult, WeekAdherenceStatus,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    DetectRecords {
        session_id: String,
        lift: Lift,
        achieved_at: DateTime<Utc>,
        sets: Vec<CompletedSet>,
        #[serde(default)]
        snapshot: HistoricalPrSnapshot,
        #[serde(default)]
        active_disruptions: Vec<Disruption>,
    },
    ComputeStreak {
        weeks: Vec<WeekAdherenceStatus>,
    },
    ClassifyCompletion(CycleCompletionInput),
    StrengthScore {
        total_kg: f64,
        bodyweight_kg: f64,
        sex: Sex,
    },
    CyclePhase {
        last_period_start: NaiveDate,
        #[serde(default)]
        cycle_length_days: Option<u32>,
        /// Local date is used when absent
        #[serde(default)]
        reference_date: Option<NaiveDate>,
    },
    SuggestAdjustments {
        disruption: Disruption,
        planned_sessions: Vec<PlannedSession>,
    },
    MakeupWindow {
        missed_session: SessionRef,
        all_sessions_this_cycle: Vec<SessionRef>,
        today: NaiveDate,
    },
    ClassifyPerformance {
        planned_volume: f64,
        actual_volume: f64,
    },
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::DetectRecords { .. } => "detect_records",
            Request::ComputeStreak { .. } => "compute_streak",
            Request::ClassifyCompletion(_) => "classify_completion",
            Request::StrengthScore { .. } => "strength_score",
            Request::CyclePhase { .. } => "cycle_phase",
            Request::SuggestAdjustments { .. } => "suggest_adjustments",
            Request::MakeupWindow { .. } => "makeup_window",
            Request::ClassifyPerformance { .. } => "classify_performance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "result", rename_all = "snake_case")]
pub enum Response {
    DetectRecords(Vec<PersonalRecord>),
    ComputeStreak(StreakResult),
    ClassifyCompletion(CycleCompletionResult),
    StrengthScore(f64),
    CyclePhase(CycleContext),
    SuggestAdjustments(Vec<DisruptionAdjustmentSuggestion>),
    MakeupWindow {
        expired: bool,
        last_valid_day: NaiveDate,
    },
    ClassifyPerformance(SessionPerformance),
}

/// Run one request through the matching rule
pub fn evaluate(request: &Request, config: &RulesConfig) -> Response {
    debug!(op = request.op(), "evaluating request");

    match request {
        Request::DetectRecords {
            session_id,
            lift,
            achieved_at,
            sets,
            snapshot,
            active_disruptions,
        } => Response::DetectRecords(detect_records_with_config(
            session_id,
            *lift,
            *achieved_at,
            sets,
            snapshot,
            active_disruptions,
            config,
        )),
        Request::ComputeStreak { weeks } => Response::ComputeStreak(compute_streak(weeks)),
        Request::ClassifyCompletion(input) => {
            Response::ClassifyCompletion(classify_completion_with_config(input, config))
        }
        Request::StrengthScore {
            total_kg,
            bodyweight_kg,
            sex,
        } => Response::StrengthScore(compute_strength_score(*total_kg, *bodyweight_kg, *sex)),
        Request::CyclePhase {
            last_period_start,
            cycle_length_days,
            reference_date,
        } => {
            let reference = reference_date.unwrap_or_else(|| Local::now().date_naive());
            Response::CyclePhase(compute_cycle_phase_with_config(
                *last_period_start,
                *cycle_length_days,
                reference,
                config,
            ))
        }
        Request::SuggestAdjustments {
            disruption,
            planned_sessions,
        } => Response::SuggestAdjustments(suggest_adjustments(disruption, planned_sessions)),
        Request::MakeupWindow {
            missed_session,
            all_sessions_this_cycle,
            today,
        } => {
            let last_valid_day = makeup_window_last_day(missed_session, all_sessions_this_cycle);
            Response::MakeupWindow {
                expired: *today > last_valid_day,
                last_valid_day,
            }
        }
        Request::ClassifyPerformance {
            planned_volume,
            actual_volume,
        } => Response::ClassifyPerformance(classify_performance_with_config(
            *planned_volume,
            *actual_volume,
            config,
        )),
    }
}

/// Parse a JSON request, evaluate it, and serialize the response
pub fn evaluate_json(request_json: &str, config: &RulesConfig) -> Result<String, EngineError> {
    let request: Request = serde_json::from_str(request_json)
        .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
    let response = evaluate(&request, config);
    Ok(serde_json::to_string(&response)?)
}
