//! Powerlog Engine - Training-signal and adjustment rules for powerlifting
//!
//! The engine turns logged training data into deterministic signals: personal
//! records, adherence streaks, cycle completion, bodyweight-normalized
//! strength scores, menstrual-cycle phase context, disruption adjustments and
//! make-up windows. Every rule is a pure function of its inputs.
//!
//! ## Modules
//!
//! - **Rules**: `records`, `streak`, `completion`, `formulas`, `cycle_phase`,
//!   `adjustments`, `makeup`
//! - **Boundary**: `rows` maps database rows, `api` evaluates JSON requests,
//!   `ffi` exposes the API over a C ABI

pub mod adjustments;
pub mod api;
pub mod completion;
pub mod config;
pub mod cycle_phase;
pub mod error;
pub mod formulas;
pub mod makeup;
pub mod records;
pub mod rows;
pub mod streak;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use api::{evaluate, evaluate_json, Request, Response};
pub use config::RulesConfig;
pub use error::EngineError;

// Rule exports
pub use adjustments::suggest_adjustments;
pub use completion::{classify_completion, classify_performance};
pub use cycle_phase::compute_cycle_phase;
pub use formulas::compute_strength_score;
pub use makeup::is_makeup_window_expired;
pub use records::detect_records;
pub use streak::compute_streak;

/// Engine version reported by the CLI and FFI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by diagnostics
pub const PRODUCER_NAME: &str = "powerlog-engine";
