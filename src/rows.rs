//! Row-store boundary mapping
//!
//! Rows come back from the hosted database as loosely shaped JSON: joined
//! relations may arrive as a single object, an array, or null, and dates may
//! be plain dates or full timestamps. This module maps those rows onto the
//! engine's value types and rejects numerics the rules assume are valid.

use crate::error::EngineError;
use crate::types::{
    CompletedSet, Disruption, DisruptionType, HistoricalPrSnapshot, Lift, PlannedSession,
    RecordType, SessionRef, SessionStatus, Severity, WeightBucket,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// A joined relation that may be embedded as one object or as an array
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Flatten an optional join into a vector
pub fn join_to_vec<T>(join: Option<OneOrMany<T>>) -> Vec<T> {
    join.map(OneOrMany::into_vec).unwrap_or_default()
}

/// Parse a local calendar date.
///
/// Accepts `YYYY-MM-DD` or any timestamp that starts with one. The leading
/// date is taken exactly as written; no timezone conversion is applied.
pub fn parse_local_date(raw: &str) -> Result<NaiveDate, EngineError> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| EngineError::DateParseError(format!("{}: {}", raw, e)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub scheduled_date: String,
    pub primary_lift: Lift,
    pub status: SessionStatus,
    #[serde(default)]
    pub week_number: Option<u32>,
}

impl SessionRow {
    pub fn to_planned_session(&self) -> PlannedSession {
        PlannedSession {
            id: self.id.clone(),
            primary_lift: self.primary_lift,
            status: self.status,
        }
    }

    pub fn to_session_ref(&self) -> Result<SessionRef, EngineError> {
        let week_number = self
            .week_number
            .ok_or_else(|| EngineError::MissingField(format!("week_number on session {}", self.id)))?;
        Ok(SessionRef {
            id: self.id.clone(),
            scheduled_date: parse_local_date(&self.scheduled_date)?,
            lift: self.primary_lift,
            week_number,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetLogRow {
    pub weight_kg: f64,
    pub reps: u32,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub estimated_1rm_kg: Option<f64>,
}

impl SetLogRow {
    pub fn to_completed_set(&self) -> Result<CompletedSet, EngineError> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(EngineError::InvalidRow(format!(
                "weight_kg must be positive, got {}",
                self.weight_kg
            )));
        }
        if let Some(rpe) = self.rpe {
            if !(6.0..=10.0).contains(&rpe) {
                return Err(EngineError::InvalidRow(format!(
                    "rpe must be within 6-10, got {}",
                    rpe
                )));
            }
        }
        if let Some(e1rm) = self.estimated_1rm_kg {
            if !e1rm.is_finite() || e1rm < 0.0 {
                return Err(EngineError::InvalidRow(format!(
                    "estimated_1rm_kg must be non-negative, got {}",
                    e1rm
                )));
            }
        }
        Ok(CompletedSet {
            weight_kg: self.weight_kg,
            reps: self.reps,
            rpe: self.rpe,
            estimated_1rm_kg: self.estimated_1rm_kg,
        })
    }
}

/// Session log row with its sets joined in
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLogRow {
    pub session_id: String,
    pub lift: Lift,
    #[serde(default)]
    pub sets: Option<OneOrMany<SetLogRow>>,
}

impl SessionLogRow {
    pub fn completed_sets(self) -> Result<Vec<CompletedSet>, EngineError> {
        join_to_vec(self.sets)
            .iter()
            .map(SetLogRow::to_completed_set)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisruptionRow {
    #[serde(rename = "type")]
    pub disruption_type: DisruptionType,
    pub severity: Severity,
    #[serde(default)]
    pub affected_lifts: Option<OneOrMany<Lift>>,
}

impl DisruptionRow {
    pub fn to_disruption(&self) -> Disruption {
        let lifts = self.affected_lifts.clone().map(OneOrMany::into_vec);
        Disruption {
            disruption_type: self.disruption_type,
            severity: self.severity,
            affected_lifts: lifts.filter(|l| !l.is_empty()),
        }
    }
}

/// A stored personal record
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalRecordRow {
    pub lift: Lift,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: f64,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// Fold stored records for `lift` into a pre-session snapshot.
///
/// Rows for other lifts are ignored. Rep-at-weight rows without a weight are
/// rejected.
pub fn snapshot_from_rows(
    lift: Lift,
    rows: &[PersonalRecordRow],
) -> Result<HistoricalPrSnapshot, EngineError> {
    let mut snapshot = HistoricalPrSnapshot::default();

    for row in rows.iter().filter(|r| r.lift == lift) {
        match row.record_type {
            RecordType::Estimated1rm => {
                snapshot.best_1rm_kg = snapshot.best_1rm_kg.max(row.value);
            }
            RecordType::Volume => {
                snapshot.best_volume_kg_cubed = snapshot.best_volume_kg_cubed.max(row.value);
            }
            RecordType::RepAtWeight => {
                let weight = row.weight_kg.ok_or_else(|| {
                    EngineError::MissingField("weight_kg on rep_at_weight record".to_string())
                })?;
                let reps = row.value.max(0.0).round() as u32;
                let best = snapshot
                    .rep_prs
                    .entry(WeightBucket::from_kg(weight))
                    .or_insert(0);
                *best = (*best).max(reps);
            }
        }
    }

    Ok(snapshot)
}
