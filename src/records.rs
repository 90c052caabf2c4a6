//! Personal-record detection
//!
//! Compares one session's completed sets for a lift against the athlete's
//! records from before the session:
//! - Estimated 1RM, from sets logged at a high enough RPE
//! - Session volume (sum of weight x reps)
//! - Reps at a given weight, bucketed to the nearest 2.5 kg
//!
//! Sessions trained under a major disruption are never credited.

use crate::config::RulesConfig;
use crate::types::{
    CompletedSet, Disruption, HistoricalPrSnapshot, Lift, PersonalRecord, RecordType, Severity,
    WeightBucket,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Records broken by `sets` relative to `snapshot`.
///
/// Returns at most one estimated-1RM record, at most one volume record, and
/// at most three rep-at-weight records (the heaviest qualifying weights).
pub fn detect_records(
    session_id: &str,
    lift: Lift,
    achieved_at: DateTime<Utc>,
    sets: &[CompletedSet],
    snapshot: &HistoricalPrSnapshot,
    active_disruptions: &[Disruption],
) -> Vec<PersonalRecord> {
    detect_records_with_config(
        session_id,
        lift,
        achieved_at,
        sets,
        snapshot,
        active_disruptions,
        &RulesConfig::default(),
    )
}

pub fn detect_records_with_config(
    session_id: &str,
    lift: Lift,
    achieved_at: DateTime<Utc>,
    sets: &[CompletedSet],
    snapshot: &HistoricalPrSnapshot,
    active_disruptions: &[Disruption],
    config: &RulesConfig,
) -> Vec<PersonalRecord> {
    if active_disruptions
        .iter()
        .any(|d| d.severity == Severity::Major)
    {
        debug!(session_id, lift = lift.as_str(), "major disruption active; records not credited");
        return Vec::new();
    }

    let record = |record_type: RecordType, value: f64, weight_kg: Option<f64>| PersonalRecord {
        record_type,
        lift,
        value,
        weight_kg,
        session_id: session_id.to_string(),
        achieved_at,
    };

    let mut records = Vec::new();

    if let Some(best) = best_estimated_1rm(sets, config.min_rpe_for_1rm_pr) {
        if best > snapshot.best_1rm_kg {
            records.push(record(RecordType::Estimated1rm, best, None));
        }
    }

    let volume = session_volume(sets);
    if volume > snapshot.best_volume_kg_cubed {
        records.push(record(RecordType::Volume, volume, None));
    }

    for (bucket, reps) in rep_records(sets, snapshot, config.max_rep_prs_per_session) {
        records.push(record(RecordType::RepAtWeight, reps as f64, Some(bucket.kg())));
    }

    debug!(
        session_id,
        lift = lift.as_str(),
        sets = sets.len(),
        records = records.len(),
        "record detection"
    );
    records
}

/// Highest precomputed estimated 1RM among sets at or above `min_rpe`
fn best_estimated_1rm(sets: &[CompletedSet], min_rpe: f64) -> Option<f64> {
    sets.iter()
        .filter(|s| s.rpe.is_some_and(|rpe| rpe >= min_rpe))
        .filter_map(|s| s.estimated_1rm_kg)
        .fold(None, |best, e1rm| match best {
            Some(b) if b >= e1rm => Some(b),
            _ => Some(e1rm),
        })
}

/// Sum of weight x reps across every set, regardless of RPE
pub fn session_volume(sets: &[CompletedSet]) -> f64 {
    sets.iter().map(|s| s.weight_kg * s.reps as f64).sum()
}

/// Rep-at-weight records, heaviest first, capped at `max_records`.
///
/// Sets that round to the same bucket merge into one candidate before the
/// cap applies, so candidates never tie on weight.
fn rep_records(
    sets: &[CompletedSet],
    snapshot: &HistoricalPrSnapshot,
    max_records: usize,
) -> Vec<(WeightBucket, u32)> {
    let mut best_by_bucket: Vec<(WeightBucket, u32)> = Vec::new();
    for set in sets {
        let bucket = WeightBucket::from_kg(set.weight_kg);
        match best_by_bucket.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, reps)) => *reps = (*reps).max(set.reps),
            None => best_by_bucket.push((bucket, set.reps)),
        }
    }

    let mut qualifying: Vec<(WeightBucket, u32)> = best_by_bucket
        .into_iter()
        .filter(|(bucket, reps)| *reps > snapshot.rep_prs.get(bucket).copied().unwrap_or(0))
        .collect();

    qualifying.sort_by(|a, b| b.0.cmp(&a.0));

    if qualifying.len() > max_records {
        debug!(
            qualifying = qualifying.len(),
            kept = max_records,
            "rep records truncated to heaviest weights"
        );
        qualifying.truncate(max_records);
    }
    qualifying
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisruptionType;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 23, 18, 0, 0).unwrap()
    }

    fn set(weight_kg: f64, reps: u32, rpe: Option<f64>, e1rm: Option<f64>) -> CompletedSet {
        CompletedSet {
            weight_kg,
            reps,
            rpe,
            estimated_1rm_kg: e1rm,
        }
    }

    fn snapshot(best_1rm: f64, best_volume: f64, reps: &[(f64, u32)]) -> HistoricalPrSnapshot {
        HistoricalPrSnapshot {
            best_1rm_kg: best_1rm,
            best_volume_kg_cubed: best_volume,
            rep_prs: reps
                .iter()
                .map(|(w, r)| (WeightBucket::from_kg(*w), *r))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn of_type(records: &[PersonalRecord], t: RecordType) -> Vec<&PersonalRecord> {
        records.iter().filter(|r| r.record_type == t).collect()
    }

    fn major_injury() -> Disruption {
        Disruption {
            disruption_type: DisruptionType::Injury,
            severity: Severity::Major,
            affected_lifts: None,
        }
    }

    #[test]
    fn test_estimated_1rm_record_above_previous_best() {
        let sets = [
            set(180.0, 3, Some(9.0), Some(198.0)),
            set(170.0, 5, Some(8.5), Some(201.5)),
        ];
        let old = snapshot(200.0, f64::MAX, &[(180.0, 10), (170.0, 10)]);

        let records = detect_records("sess-1", Lift::Squat, at(), &sets, &old, &[]);

        assert_eq!(
            records,
            vec![PersonalRecord {
                record_type: RecordType::Estimated1rm,
                lift: Lift::Squat,
                value: 201.5,
                weight_kg: None,
                session_id: "sess-1".to_string(),
                achieved_at: at(),
            }]
        );
    }

    #[test]
    fn test_estimated_1rm_equal_or_below_best_is_not_a_record() {
        let old = snapshot(200.0, f64::MAX, &[(180.0, 10)]);
        for value in [200.0, 199.9] {
            let sets = [set(180.0, 3, Some(9.5), Some(value))];
            let records = detect_records("s", Lift::Bench, at(), &sets, &old, &[]);
            assert!(of_type(&records, RecordType::Estimated1rm).is_empty());
        }
    }

    #[test]
    fn test_estimated_1rm_monotonic_over_values() {
        let old = snapshot(150.0, f64::MAX, &[(140.0, 20)]);
        for value in [150.5, 160.0, 175.25] {
            let sets = [set(140.0, 4, Some(9.0), Some(value))];
            let records = detect_records("s", Lift::Bench, at(), &sets, &old, &[]);
            let e1rm = of_type(&records, RecordType::Estimated1rm);
            assert_eq!(e1rm.len(), 1);
            assert_eq!(e1rm[0].value, value);
        }
    }

    #[test]
    fn test_low_rpe_and_missing_estimates_are_ignored() {
        let sets = [
            set(200.0, 3, Some(8.0), Some(230.0)),
            set(200.0, 3, None, Some(240.0)),
            set(200.0, 3, Some(9.5), None),
        ];
        let old = snapshot(210.0, f64::MAX, &[(200.0, 10)]);
        let records = detect_records("s", Lift::Deadlift, at(), &sets, &old, &[]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_volume_record_counts_all_sets() {
        // 100x5 + 110x5 (RPE 6) + 120x3 = 500 + 550 + 360 = 1410
        let sets = [
            set(100.0, 5, None, None),
            set(110.0, 5, Some(6.0), None),
            set(120.0, 3, Some(9.0), None),
        ];
        let old = snapshot(500.0, 1400.0, &[(100.0, 10), (110.0, 10), (120.0, 10)]);
        let records = detect_records("s", Lift::Squat, at(), &sets, &old, &[]);

        let volume = of_type(&records, RecordType::Volume);
        assert_eq!(volume.len(), 1);
        assert!((volume[0].value - 1410.0).abs() < 1e-9);
        assert_eq!(volume[0].weight_kg, None);
    }

    #[test]
    fn test_volume_equal_to_best_is_not_a_record() {
        let sets = [set(100.0, 5, None, None)];
        let old = snapshot(500.0, 500.0, &[(100.0, 10)]);
        let records = detect_records("s", Lift::Squat, at(), &sets, &old, &[]);
        assert!(of_type(&records, RecordType::Volume).is_empty());
    }

    #[test]
    fn test_rep_record_uses_rounded_bucket() {
        // 121 kg compares against the 120 kg bucket
        let sets = [set(121.0, 6, None, None)];
        let old = snapshot(500.0, f64::MAX, &[(120.0, 5), (122.5, 99)]);
        let records = detect_records("s", Lift::Bench, at(), &sets, &old, &[]);

        let reps = of_type(&records, RecordType::RepAtWeight);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].weight_kg, Some(120.0));
        assert_eq!(reps[0].value, 6.0);
    }

    #[test]
    fn test_rep_record_not_broken_when_bucket_best_is_higher() {
        let sets = [set(121.0, 5, None, None)];
        let old = snapshot(500.0, f64::MAX, &[(120.0, 5)]);
        let records = detect_records("s", Lift::Bench, at(), &sets, &old, &[]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_json_snapshot_with_colliding_keys_keeps_best() {
        let old: HistoricalPrSnapshot = serde_json::from_str(
            r#"{"best_1rm_kg":500,"best_volume_kg_cubed":100000,"rep_prs":{"120":9,"121":2}}"#,
        )
        .unwrap();
        let sets = [set(120.0, 5, None, None)];

        let records = detect_records("sess-4", Lift::Squat, at(), &sets, &old, &[]);

        assert!(of_type(&records, RecordType::RepAtWeight).is_empty());
    }

    #[test]
    fn test_first_set_at_a_weight_always_counts() {
        let sets = [set(142.5, 1, None, None)];
        let old = snapshot(500.0, f64::MAX, &[]);
        let records = detect_records("s", Lift::Deadlift, at(), &sets, &old, &[]);
        let reps = of_type(&records, RecordType::RepAtWeight);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].weight_kg, Some(142.5));
    }

    #[test]
    fn test_rep_records_capped_at_three_heaviest() {
        let sets = [
            set(100.0, 8, None, None),
            set(140.0, 2, None, None),
            set(110.0, 6, None, None),
            set(130.0, 3, None, None),
            set(120.0, 5, None, None),
        ];
        let old = snapshot(500.0, f64::MAX, &[]);
        let records = detect_records("s", Lift::Squat, at(), &sets, &old, &[]);

        let weights: Vec<Option<f64>> = of_type(&records, RecordType::RepAtWeight)
            .iter()
            .map(|r| r.weight_kg)
            .collect();
        assert_eq!(weights, vec![Some(140.0), Some(130.0), Some(120.0)]);
    }

    #[test]
    fn test_equal_rounded_weights_merge_into_one_candidate() {
        // 119 and 121 both land in the 120 bucket; the best of the two counts once
        let sets = [set(119.0, 4, None, None), set(121.0, 7, None, None)];
        let old = snapshot(500.0, f64::MAX, &[(120.0, 6)]);
        let records = detect_records("s", Lift::Bench, at(), &sets, &old, &[]);

        let reps = of_type(&records, RecordType::RepAtWeight);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].value, 7.0);
    }

    #[test]
    fn test_rep_records_independent_of_set_order() {
        let forward = [
            set(100.0, 8, None, None),
            set(140.0, 2, None, None),
            set(121.0, 6, None, None),
            set(119.0, 4, None, None),
            set(130.0, 3, None, None),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        let old = snapshot(500.0, f64::MAX, &[]);

        let a = detect_records("s", Lift::Squat, at(), &forward, &old, &[]);
        let b = detect_records("s", Lift::Squat, at(), &reversed, &old, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rep_records_respect_configured_cap() {
        let sets = [
            set(100.0, 8, None, None),
            set(110.0, 6, None, None),
            set(120.0, 5, None, None),
        ];
        let config = RulesConfig {
            max_rep_prs_per_session: 1,
            ..RulesConfig::default()
        };
        let records = detect_records_with_config(
            "s",
            Lift::Squat,
            at(),
            &sets,
            &snapshot(500.0, f64::MAX, &[]),
            &[],
            &config,
        );
        let reps = of_type(&records, RecordType::RepAtWeight);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].weight_kg, Some(120.0));
    }

    #[test]
    fn test_major_disruption_suppresses_everything() {
        let sets = [set(250.0, 5, Some(10.0), Some(290.0))];
        let old = snapshot(0.0, 0.0, &[]);
        let minor = Disruption {
            severity: Severity::Minor,
            ..major_injury()
        };
        let records =
            detect_records("s", Lift::Squat, at(), &sets, &old, &[minor, major_injury()]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_minor_and_moderate_disruptions_do_not_suppress() {
        let sets = [set(250.0, 5, Some(10.0), Some(290.0))];
        let old = snapshot(0.0, 0.0, &[]);
        let active = [
            Disruption {
                severity: Severity::Minor,
                ..major_injury()
            },
            Disruption {
                disruption_type: DisruptionType::Fatigue,
                severity: Severity::Moderate,
                affected_lifts: None,
            },
        ];
        let records = detect_records("s", Lift::Squat, at(), &sets, &old, &active);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].record_type, RecordType::Estimated1rm);
        assert_eq!(records[1].record_type, RecordType::Volume);
        assert_eq!(records[2].record_type, RecordType::RepAtWeight);
    }

    #[test]
    fn test_empty_session_breaks_nothing() {
        let records = detect_records("s", Lift::Squat, at(), &[], &snapshot(0.0, 0.0, &[]), &[]);
        assert!(records.is_empty());
    }
}
