//! Tunable rule thresholds
//!
//! `RulesConfig` is passed into the `*_with_config` entry points as a plain
//! value. The plain entry points use `RulesConfig::default()`.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Minimum logged RPE for a set to count toward an estimated-1RM record
pub const DEFAULT_MIN_RPE_FOR_1RM_PR: f64 = 8.5;

/// Maximum rep-at-weight records credited per session; configs may lower it
/// but never raise it
pub const DEFAULT_MAX_REP_PRS_PER_SESSION: usize = 3;

/// Completion fraction needed for the cycle badge
pub const DEFAULT_BADGE_THRESHOLD: f64 = 0.80;

/// Cycle length assumed when none is recorded
pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;

/// Volume ratio above which a session counts as over-performed
pub const DEFAULT_OVER_PERFORMANCE_RATIO: f64 = 1.10;

/// Volume ratio below which a session counts as under-performed
pub const DEFAULT_UNDER_PERFORMANCE_RATIO: f64 = 0.90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub min_rpe_for_1rm_pr: f64,
    pub max_rep_prs_per_session: usize,
    pub badge_threshold: f64,
    pub default_cycle_length_days: u32,
    pub over_performance_ratio: f64,
    pub under_performance_ratio: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_rpe_for_1rm_pr: DEFAULT_MIN_RPE_FOR_1RM_PR,
            max_rep_prs_per_session: DEFAULT_MAX_REP_PRS_PER_SESSION,
            badge_threshold: DEFAULT_BADGE_THRESHOLD,
            default_cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            over_performance_ratio: DEFAULT_OVER_PERFORMANCE_RATIO,
            under_performance_ratio: DEFAULT_UNDER_PERFORMANCE_RATIO,
        }
    }
}

impl RulesConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: RulesConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(6.0..=10.0).contains(&self.min_rpe_for_1rm_pr) {
            return Err(EngineError::InvalidConfig(format!(
                "min_rpe_for_1rm_pr must be within 6-10, got {}",
                self.min_rpe_for_1rm_pr
            )));
        }
        if !(1..=DEFAULT_MAX_REP_PRS_PER_SESSION).contains(&self.max_rep_prs_per_session) {
            return Err(EngineError::InvalidConfig(format!(
                "max_rep_prs_per_session must be within 1-{}, got {}",
                DEFAULT_MAX_REP_PRS_PER_SESSION, self.max_rep_prs_per_session
            )));
        }
        if !(self.badge_threshold > 0.0 && self.badge_threshold <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "badge_threshold must be within (0, 1], got {}",
                self.badge_threshold
            )));
        }
        if self.default_cycle_length_days == 0 {
            return Err(EngineError::InvalidConfig(
                "default_cycle_length_days must be at least 1".to_string(),
            ));
        }
        if !(self.under_performance_ratio > 0.0
            && self.under_performance_ratio < self.over_performance_ratio)
        {
            return Err(EngineError::InvalidConfig(format!(
                "under_performance_ratio ({}) must be positive and below over_performance_ratio ({})",
                self.under_performance_ratio, self.over_performance_ratio
            )));
        }
        Ok(())
    }
}
