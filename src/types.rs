//! Core value types for the Powerlog engine
//!
//! Everything here is a plain value: built fresh by the caller for each
//! invocation, read by the rule functions, and returned by value. Nothing in
//! this crate owns or mutates persisted state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Weight increment used for rep-PR buckets and plate rounding (kg)
pub const PLATE_INCREMENT_KG: f64 = 2.5;

/// Competition lift a session or record is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lift {
    Squat,
    Bench,
    Deadlift,
}

impl Lift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lift::Squat => "squat",
            Lift::Bench => "bench",
            Lift::Deadlift => "deadlift",
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sex used to select strength-score coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// One logged set in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSet {
    /// Load on the bar (kg)
    pub weight_kg: f64,
    /// Repetitions performed
    pub reps: u32,
    /// Logged RPE (6-10), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    /// Estimated 1RM precomputed by the estimation collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_1rm_kg: Option<f64>,
}

/// A rounded weight, stored as a whole number of 2.5 kg increments.
///
/// Serialized as a decimal kg string (`"120"`, `"122.5"`) so it can be used as
/// a JSON object key. Any incoming value is re-rounded on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeightBucket(i64);

impl WeightBucket {
    /// Bucket for the nearest 2.5 kg increment to `weight_kg`
    pub fn from_kg(weight_kg: f64) -> Self {
        Self((weight_kg / PLATE_INCREMENT_KG).round() as i64)
    }

    /// Center weight of the bucket (kg)
    pub fn kg(&self) -> f64 {
        self.0 as f64 * PLATE_INCREMENT_KG
    }
}

impl fmt::Display for WeightBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kg = self.kg();
        if kg.fract() == 0.0 {
            write!(f, "{}", kg as i64)
        } else {
            write!(f, "{:.1}", kg)
        }
    }
}

impl Serialize for WeightBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeightBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BucketVisitor;

        impl serde::de::Visitor<'_> for BucketVisitor {
            type Value = WeightBucket;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a weight in kg as a number or numeric string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.trim()
                    .parse::<f64>()
                    .map(WeightBucket::from_kg)
                    .map_err(|_| E::custom(format!("invalid weight key: {}", v)))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(WeightBucket::from_kg(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(WeightBucket::from_kg(v as f64))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(WeightBucket::from_kg(v as f64))
            }
        }

        deserializer.deserialize_any(BucketVisitor)
    }
}

/// Records held by the athlete before the session under evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalPrSnapshot {
    /// Best estimated 1RM (kg)
    pub best_1rm_kg: f64,
    /// Best single-session volume, sum of weight x reps
    pub best_volume_kg_cubed: f64,
    /// Best rep count per rounded weight
    #[serde(deserialize_with = "max_per_bucket")]
    pub rep_prs: BTreeMap<WeightBucket, u32>,
}

/// Keys that re-round onto the same bucket keep their highest rep count
fn max_per_bucket<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<WeightBucket, u32>, D::Error> {
    struct RepPrsVisitor;

    impl<'de> serde::de::Visitor<'de> for RepPrsVisitor {
        type Value = BTreeMap<WeightBucket, u32>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of weight keys to rep counts")
        }

        fn visit_map<A: serde::de::MapAccess<'de>>(
            self,
            mut access: A,
        ) -> Result<Self::Value, A::Error> {
            let mut rep_prs = BTreeMap::new();
            while let Some((bucket, reps)) = access.next_entry::<WeightBucket, u32>()? {
                let best = rep_prs.entry(bucket).or_insert(0);
                *best = (*best).max(reps);
            }
            Ok(rep_prs)
        }
    }

    deserializer.deserialize_map(RepPrsVisitor)
}

impl HistoricalPrSnapshot {
    /// Best reps recorded at the bucket containing `weight_kg` (0 if none)
    pub fn best_reps_at(&self, weight_kg: f64) -> u32 {
        self.rep_prs
            .get(&WeightBucket::from_kg(weight_kg))
            .copied()
            .unwrap_or(0)
    }
}

/// Kind of personal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "estimated_1rm")]
    Estimated1rm,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "rep_at_weight")]
    RepAtWeight,
}

/// A record broken in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub lift: Lift,
    /// kg for 1RM, kg x reps for volume, reps for rep-at-weight
    pub value: f64,
    /// Rounded weight (kg), only for rep-at-weight records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub session_id: String,
    pub achieved_at: DateTime<Utc>,
}

/// Adherence summary for one calendar week with scheduled sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAdherenceStatus {
    /// Monday of the week
    pub week_start_date: NaiveDate,
    pub scheduled: u32,
    pub completed: u32,
    #[serde(default)]
    pub skipped_with_disruption: u32,
    #[serde(default)]
    pub unaccounted_misses: u32,
}

impl WeekAdherenceStatus {
    /// Week had no scheduled sessions
    pub fn is_gap(&self) -> bool {
        self.scheduled == 0
    }

    /// Every scheduled session was completed or covered by a disruption
    pub fn is_clean(&self) -> bool {
        self.scheduled > 0 && self.unaccounted_misses == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Serialized as an empty string when there is no clean week
    #[serde(default, with = "empty_date")]
    pub last_clean_week_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCompletionInput {
    pub total_scheduled: u32,
    pub completed: u32,
    #[serde(default)]
    pub skipped_with_disruption: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleCompletionResult {
    pub is_complete: bool,
    /// Fraction of scheduled sessions completed or disruption-covered (0-1)
    pub completion_pct: f64,
    pub qualifies_for_badge: bool,
}

/// Session volume against plan. See [`crate::completion::classify_performance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPerformance {
    Under,
    OnTarget,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionType {
    Injury,
    Illness,
    Travel,
    Fatigue,
    EquipmentUnavailable,
    UnprogrammedEvent,
    Other,
    /// Any type string this build does not know about
    #[serde(other)]
    Unrecognized,
}

impl DisruptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisruptionType::Injury => "injury",
            DisruptionType::Illness => "illness",
            DisruptionType::Travel => "travel",
            DisruptionType::Fatigue => "fatigue",
            DisruptionType::EquipmentUnavailable => "equipment unavailable",
            DisruptionType::UnprogrammedEvent => "unprogrammed event",
            DisruptionType::Other => "other",
            DisruptionType::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
        }
    }
}

/// A reported disruption to training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    #[serde(rename = "type")]
    pub disruption_type: DisruptionType,
    pub severity: Severity,
    /// Lifts affected; `None` or empty means all lifts
    #[serde(default)]
    pub affected_lifts: Option<Vec<Lift>>,
}

impl Disruption {
    pub fn affects(&self, lift: Lift) -> bool {
        match &self.affected_lifts {
            None => true,
            Some(lifts) if lifts.is_empty() => true,
            Some(lifts) => lifts.contains(&lift),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Planned,
    InProgress,
    Completed,
    Skipped,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSession {
    pub id: String,
    pub primary_lift: Lift,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentAction {
    WeightReduced,
    RepsReduced,
    SessionSkipped,
    ExerciseSubstituted,
}

/// Suggested change to one upcoming session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionAdjustmentSuggestion {
    pub session_id: String,
    pub action: AdjustmentAction,
    /// Load reduction in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction_pct: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_reduction: Option<u32>,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_note: Option<String>,
}

/// Scheduled session as seen by the makeup-window evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRef {
    pub id: String,
    /// Local calendar date of the session
    pub scheduled_date: NaiveDate,
    pub lift: Lift,
    pub week_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
    LateLuteal,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Ovulatory => "ovulatory",
            CyclePhase::Luteal => "luteal",
            CyclePhase::LateLuteal => "late_luteal",
        }
    }
}

/// Menstrual-cycle position on a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleContext {
    pub phase: CyclePhase,
    /// 1-indexed day within the current cycle
    pub day_of_cycle: u32,
    pub days_until_next_period: u32,
    pub is_ovulatory_window: bool,
    pub is_late_luteal: bool,
}

/// Serde helper mapping `None` to `""` and back
mod empty_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
