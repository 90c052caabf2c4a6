//! Formula primitives
//!
//! Strength score (Wilks-style), plate rounding, unit conversion, and the
//! default Epley 1RM estimate.

use crate::types::{Sex, PLATE_INCREMENT_KG};
use tracing::debug;

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.204_622_62;

/// Numerator of the strength-score ratio
const SCORE_NUMERATOR: f64 = 600.0;

/// Lower bound of the polynomial's bodyweight domain for both sexes (kg)
const MIN_BODYWEIGHT_KG: f64 = 40.0;
const MAX_BODYWEIGHT_MALE_KG: f64 = 200.0;
const MAX_BODYWEIGHT_FEMALE_KG: f64 = 150.0;

/// Published coefficients, c0..c5
const MALE_COEFFICIENTS: [f64; 6] = [
    47.461_788_54,
    8.472_061_379,
    0.073_694_103_46,
    -0.001_395_833_811,
    7.076_659_730_707_43e-6,
    -1.208_043_364_823_15e-8,
];

const FEMALE_COEFFICIENTS: [f64; 6] = [
    -125.425_539_8,
    13.712_194_19,
    -0.033_072_506_31,
    -0.001_050_400_051,
    9.387_738_814_627_99e-6,
    -2.333_461_388_495_4e-8,
];

/// Bodyweight-normalized strength score for a competition total.
///
/// Bodyweight is clamped into the formula's domain (40-200 kg male,
/// 40-150 kg female). Returns 0 for a non-positive total. Rounded to 2 dp.
pub fn compute_strength_score(total_kg: f64, bodyweight_kg: f64, sex: Sex) -> f64 {
    if total_kg <= 0.0 {
        return 0.0;
    }

    let (coefficients, max_bw) = match sex {
        Sex::Male => (&MALE_COEFFICIENTS, MAX_BODYWEIGHT_MALE_KG),
        Sex::Female => (&FEMALE_COEFFICIENTS, MAX_BODYWEIGHT_FEMALE_KG),
    };
    let bw = bodyweight_kg.clamp(MIN_BODYWEIGHT_KG, max_bw);

    // Horner evaluation of c0 + c1*bw + ... + c5*bw^5
    let denominator = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * bw + c);

    let score = round_to_cents(total_kg * (SCORE_NUMERATOR / denominator));
    debug!(total_kg, bodyweight_kg, clamped_bw = bw, ?sex, score, "strength score");
    score
}

/// Round to 2 decimal places, halves away from zero
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to the nearest multiple of `increment`
pub fn round_to_increment(weight: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return weight;
    }
    (weight / increment).round() * increment
}

/// Round to the nearest loadable 2.5 kg
pub fn round_to_plate(weight_kg: f64) -> f64 {
    round_to_increment(weight_kg, PLATE_INCREMENT_KG)
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb / LB_PER_KG
}

/// Epley estimate: `w * (1 + reps / 30)`.
///
/// A single is its own 1RM; zero reps or no load yields 0.
pub fn estimate_one_rep_max_epley(weight_kg: f64, reps: u32) -> f64 {
    if weight_kg <= 0.0 || reps == 0 {
        return 0.0;
    }
    if reps == 1 {
        return weight_kg;
    }
    weight_kg * (1.0 + reps as f64 / 30.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_score_reference_values() {
        assert!((compute_strength_score(600.0, 100.0, Sex::Male) - 437.62).abs() < 1e-9);
        assert!((compute_strength_score(400.0, 60.0, Sex::Female) - 527.61).abs() < 1e-9);
    }

    #[test]
    fn test_strength_score_zero_total() {
        assert_eq!(compute_strength_score(0.0, 90.0, Sex::Male), 0.0);
        assert_eq!(compute_strength_score(-10.0, 90.0, Sex::Female), 0.0);
    }

    #[test]
    fn test_strength_score_clamps_low_bodyweight() {
        for total in [100.0, 500.0, 812.5] {
            assert_eq!(
                compute_strength_score(total, 25.0, Sex::Male),
                compute_strength_score(total, 40.0, Sex::Male)
            );
        }
        assert!((compute_strength_score(500.0, 25.0, Sex::Male) - 694.77).abs() < 1e-9);
    }

    #[test]
    fn test_strength_score_clamps_high_bodyweight() {
        assert_eq!(
            compute_strength_score(700.0, 240.0, Sex::Male),
            compute_strength_score(700.0, 200.0, Sex::Male)
        );
        assert_eq!(
            compute_strength_score(300.0, 180.0, Sex::Female),
            compute_strength_score(300.0, 150.0, Sex::Female)
        );
        assert!((compute_strength_score(300.0, 150.0, Sex::Female) - 289.04).abs() < 1e-9);
    }

    #[test]
    fn test_strength_score_decreases_with_bodyweight() {
        for sex in [Sex::Male, Sex::Female] {
            let mut previous = f64::MAX;
            for bw in (40..=150).step_by(5) {
                let score = compute_strength_score(500.0, bw as f64, sex);
                assert!(score <= previous, "{:?} score rose at {} kg", sex, bw);
                previous = score;
            }
        }
    }

    #[test]
    fn test_strength_score_is_deterministic() {
        let a = compute_strength_score(655.0, 82.7, Sex::Male);
        let b = compute_strength_score(655.0, 82.7, Sex::Male);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_to_plate() {
        assert_eq!(round_to_plate(121.0), 120.0);
        assert_eq!(round_to_plate(121.3), 122.5);
        assert_eq!(round_to_plate(123.75), 125.0);
        assert_eq!(round_to_increment(101.0, 0.0), 101.0);
    }

    #[test]
    fn test_unit_conversion() {
        assert!((kg_to_lb(100.0) - 220.462262).abs() < 1e-6);
        assert!((lb_to_kg(kg_to_lb(142.5)) - 142.5).abs() < 1e-9);
    }

    #[test]
    fn test_epley_estimate() {
        assert_eq!(estimate_one_rep_max_epley(200.0, 1), 200.0);
        assert_eq!(estimate_one_rep_max_epley(200.0, 0), 0.0);
        assert_eq!(estimate_one_rep_max_epley(0.0, 5), 0.0);
        // 150 * (1 + 5/30) = 175
        assert!((estimate_one_rep_max_epley(150.0, 5) - 175.0).abs() < 1e-9);
    }
}
