//! Expansion of experiment descriptions into concrete scenario documents.

mod apply;
mod experiment;
mod hash;
mod model;
mod odometer;
mod scenarios;
mod serde;
mod validate;

pub use apply::{apply_arm, apply_combination};
pub use experiment::{ExperimentDescription, DEFAULT_EXPERIMENT_NAME};
pub use hash::{document_hash, stable_hash_string};
pub use model::{
    Arm, CombinationBlock, Combinations, ExplicitRows, SubstitutionValue, Sweep, SweepTable,
};
pub use scenarios::Scenarios;
pub use validate::ValidationReport;

pub use crate::serde::{from_yaml_slice, to_canonical_json_bytes};
pub use sweepgen_core::{ErrorInfo, SweepError};
