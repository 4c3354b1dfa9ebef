use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sweepgen_core::{ErrorInfo, SweepError};
use tracing::debug;

use crate::apply;
use crate::model::{Arm, Combinations, Sweep, SweepTable};
use crate::odometer::Odometer;
use crate::scenarios::Scenarios;

/// Name reported for experiments that do not carry one.
pub const DEFAULT_EXPERIMENT_NAME: &str = "Unnamed Experiment";

fn default_name() -> String {
    DEFAULT_EXPERIMENT_NAME.to_string()
}

fn malformed(code: &str, err: impl ToString) -> SweepError {
    SweepError::Input(
        ErrorInfo::new(code, err.to_string())
            .with_hint("expected an object with `base`, `sweeps` and `combinations`"),
    )
}

/// Base template, sweeps and combinations describing a family of scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDescription {
    #[serde(default = "default_name")]
    name: String,
    base: String,
    sweeps: SweepTable,
    combinations: Combinations,
}

impl ExperimentDescription {
    /// Creates an unnamed experiment with no sweeps.
    pub fn new(base: impl Into<String>, combinations: Combinations) -> Self {
        Self {
            name: default_name(),
            base: base.into(),
            sweeps: SweepTable::new(),
            combinations,
        }
    }

    /// Parses an experiment from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SweepError> {
        serde_json::from_str(text).map_err(|err| malformed("json-parse", err))
    }

    /// Parses an experiment from YAML text with the same shape as the JSON form.
    pub fn from_yaml_str(text: &str) -> Result<Self, SweepError> {
        serde_yaml::from_str(text).map_err(|err| malformed("yaml-parse", err))
    }

    /// Parses an experiment from an open JSON stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SweepError> {
        serde_json::from_reader(reader).map_err(|err| malformed("json-parse", err))
    }

    /// Builds an experiment from an already parsed JSON document.
    ///
    /// Keyed combination blocks follow the key order of `value`'s object map.
    pub fn from_value(value: Value) -> Result<Self, SweepError> {
        if !value.is_object() {
            return Err(malformed(
                "not-an-object",
                "experiment description must be a JSON object",
            ));
        }
        serde_json::from_value(value).map_err(|err| malformed("json-shape", err))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Replaces the template that every scenario starts from.
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = base.into();
    }

    pub fn base_mut(&mut self) -> &mut String {
        &mut self.base
    }

    pub fn sweeps(&self) -> &SweepTable {
        &self.sweeps
    }

    pub fn combinations(&self) -> &Combinations {
        &self.combinations
    }

    pub fn set_combinations(&mut self, combinations: Combinations) {
        self.combinations = combinations;
    }

    /// Creates an empty sweep, replacing any existing sweep of the same name.
    pub fn add_sweep(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.sweeps.insert(name.clone(), Sweep::new()).is_some() {
            debug!(sweep = %name, "replaced existing sweep");
        }
    }

    /// Inserts or replaces an arm of an existing sweep.
    ///
    /// Substitution keys are checked when the arm is applied, not here.
    pub fn add_arm(
        &mut self,
        sweep: &str,
        arm: impl Into<String>,
        substitutions: Arm,
    ) -> Result<(), SweepError> {
        let arms = self
            .sweeps
            .get_mut(sweep)
            .ok_or_else(|| SweepError::unknown_sweep(sweep))?;
        arms.insert(arm.into(), substitutions);
        Ok(())
    }

    /// Applies one arm to `document`.
    pub fn apply_arm(&self, document: &str, sweep: &str, arm: &str) -> Result<String, SweepError> {
        apply::apply_arm(&self.sweeps, document, sweep, arm)
    }

    /// Applies `arms[i]` of `sweeps[i]` to `document` in order.
    pub fn apply_combination<S, A>(
        &self,
        document: &str,
        sweeps: &[S],
        arms: &[A],
    ) -> Result<String, SweepError>
    where
        S: AsRef<str>,
        A: AsRef<str>,
    {
        apply::apply_combination(&self.sweeps, document, sweeps, arms)
    }

    /// Lazily yields every expanded document.
    ///
    /// Each call starts an independent traversal. The iterator stops after
    /// the first error.
    pub fn scenarios(&self) -> Scenarios<'_> {
        Scenarios::new(self)
    }

    /// Number of documents [`ExperimentDescription::scenarios`] yields when no
    /// error occurs, saturating at `usize::MAX`.
    pub fn scenario_count(&self) -> usize {
        self.combinations
            .blocks()
            .into_iter()
            .map(|block| {
                let rows = block.rows().len().max(1);
                let free = self
                    .free_sweeps(block.pinned())
                    .map(|(_, arms)| arms.len())
                    .collect();
                rows.saturating_mul(Odometer::new(free).len())
            })
            .fold(0usize, usize::saturating_add)
    }

    /// Sweeps not pinned by `pinned`, in name order.
    pub(crate) fn free_sweeps<'a>(
        &'a self,
        pinned: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a Sweep)> + 'a {
        self.sweeps
            .iter()
            .filter(move |(name, _)| !pinned.contains(name))
            .map(|(name, arms)| (name.as_str(), arms))
    }
}

impl fmt::Display for ExperimentDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CombinationBlock, SubstitutionValue};

    #[test]
    fn missing_name_uses_default() {
        let exp = ExperimentDescription::from_json_str(
            r#"{"base": "<xml/>", "sweeps": {}, "combinations": []}"#,
        )
        .unwrap();
        assert_eq!(exp.name(), DEFAULT_EXPERIMENT_NAME);
        assert_eq!(exp.to_string(), "Unnamed Experiment");
    }

    #[test]
    fn rejects_non_objects() {
        let err = ExperimentDescription::from_value(serde_json::json!(1)).unwrap_err();
        assert_eq!(err.info().code, "not-an-object");
        let err = ExperimentDescription::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SweepError::Input(_)));
        let err = ExperimentDescription::from_json_str(r#"{"base": "x"}"#).unwrap_err();
        assert_eq!(err.info().code, "json-parse");
    }

    #[test]
    fn add_sweep_overwrites() {
        let mut exp = ExperimentDescription::new("@a@", Combinations::default());
        exp.add_sweep("a");
        exp.add_arm("a", "one", Arm::from([("@a@".to_string(), SubstitutionValue::from(1i64))]))
            .unwrap();
        assert_eq!(exp.sweeps()["a"].len(), 1);
        exp.add_sweep("a");
        assert!(exp.sweeps()["a"].is_empty());
    }

    #[test]
    fn add_arm_requires_sweep() {
        let mut exp = ExperimentDescription::new("", Combinations::default());
        let err = exp.add_arm("missing", "arm", Arm::new()).unwrap_err();
        assert!(matches!(err, SweepError::Lookup(_)));
    }

    #[test]
    fn count_follows_cardinality_law() {
        let mut exp = ExperimentDescription::new(
            "",
            Combinations::Single(
                CombinationBlock::explicit(
                    vec!["a".into()],
                    vec![vec!["a1".into()], vec!["a2".into()]],
                )
                .unwrap(),
            ),
        );
        for (sweep, arms) in [("a", 2), ("b", 3), ("c", 2)] {
            exp.add_sweep(sweep);
            for idx in 0..arms {
                exp.add_arm(sweep, format!("{sweep}{idx}"), Arm::new()).unwrap();
            }
        }
        assert_eq!(exp.scenario_count(), 2 * 3 * 2);
        exp.set_combinations(Combinations::default());
        assert_eq!(exp.scenario_count(), 2 * 3 * 2);
        exp.add_sweep("empty");
        assert_eq!(exp.scenario_count(), 0);
    }

    #[test]
    fn serializes_back_to_input_shape() {
        let text = r#"{"name":"E","base":"@x@","sweeps":{"x":{"x1":{"@x@":1}}},"combinations":[["x"],["x1"]]}"#;
        let exp = ExperimentDescription::from_json_str(text).unwrap();
        let value = serde_json::to_value(&exp).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(text).unwrap());
    }
}
