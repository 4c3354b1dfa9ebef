use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sweepgen_core::{is_placeholder_token, SweepError};

use crate::experiment::ExperimentDescription;

/// Outcome of an eager check over everything a traversal would touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub experiment: String,
    pub scenario_count: usize,
    #[serde(default)]
    pub errors: Vec<SweepError>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ExperimentDescription {
    /// Checks every sweep/arm reference and every substitution key reachable
    /// from the combinations, collecting all problems instead of stopping at
    /// the first one the way [`ExperimentDescription::scenarios`] does.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut reachable: BTreeSet<(&str, &str)> = BTreeSet::new();

        for (idx, block) in self.combinations().blocks().into_iter().enumerate() {
            for sweep in block.pinned() {
                if !self.sweeps().contains_key(sweep) {
                    errors.push(SweepError::unknown_sweep(sweep));
                }
            }
            if !block.pinned().is_empty() && block.rows().is_empty() {
                warnings.push(format!(
                    "block {} pins {:?} without any combination rows",
                    idx + 1,
                    block.pinned()
                ));
            }
            for row in block.rows() {
                for (sweep, arm) in block.pinned().iter().zip(row) {
                    match self.sweeps().get(sweep) {
                        Some(arms) if arms.contains_key(arm) => {
                            reachable.insert((sweep.as_str(), arm.as_str()));
                        }
                        Some(_) => errors.push(SweepError::unknown_arm(sweep, arm)),
                        None => {}
                    }
                }
            }
            for (sweep, arms) in self.free_sweeps(block.pinned()) {
                if arms.is_empty() {
                    warnings.push(format!(
                        "block {} leaves sweep `{sweep}` free but it has no arms",
                        idx + 1
                    ));
                }
                reachable.extend(arms.keys().map(|arm| (sweep, arm.as_str())));
            }
        }

        for (sweep, arm) in reachable {
            let substitutions = &self.sweeps()[sweep][arm];
            errors.extend(
                substitutions
                    .keys()
                    .filter(|token| !is_placeholder_token(token))
                    .map(|token| SweepError::invalid_token(sweep, arm, token)),
            );
        }

        ValidationReport {
            experiment: self.name().to_string(),
            scenario_count: self.scenario_count(),
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::experiment::ExperimentDescription;

    #[test]
    fn collects_every_problem() {
        let exp = ExperimentDescription::from_json_str(
            r#"{
                "base": "@a@ @b@",
                "sweeps": {
                    "a": {"a1": {"a": "1"}, "a2": {"@a@": "2"}},
                    "b": {"b1": {"@b@": "x"}, "b2": {"b@": "y"}},
                    "idle": {}
                },
                "combinations": [["a", "ghost"], ["a1", "g1"], ["a9", "g2"]]
            }"#,
        )
        .unwrap();
        let report = exp.validate();
        assert!(!report.is_ok());
        let codes: Vec<_> = report.errors.iter().map(|err| err.info().code.as_str()).collect();
        assert_eq!(
            codes,
            ["unknown-sweep", "unknown-arm", "invalid-token", "invalid-token"]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.scenario_count, 0);
    }

    #[test]
    fn clean_experiment_passes() {
        let exp = ExperimentDescription::from_json_str(
            r#"{"name": "ok", "base": "@a@", "sweeps": {"a": {"a1": {"@a@": 1}}}, "combinations": []}"#,
        )
        .unwrap();
        let report = exp.validate();
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert_eq!(report.scenario_count, 1);
        assert_eq!(report.experiment, "ok");
    }

    #[test]
    fn pinned_without_rows_is_a_warning() {
        let exp = ExperimentDescription::from_json_str(
            r#"{"base": "@a@ @b@", "sweeps": {"a": {"a1": {"@a@": 1}}, "b": {"b1": {"@b@": "x"}}}, "combinations": [["a"]]}"#,
        )
        .unwrap();
        let report = exp.validate();
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("without any combination rows"));
        assert_eq!(report.scenario_count, 1);
    }
}
