pub mod count;
pub mod expand;
pub mod validate;
pub mod version;

use std::error::Error;
use std::fs;
use std::path::Path;

use sweepgen_exp::ExperimentDescription;
use tracing::debug;

/// Reads an experiment file; `.yaml`/`.yml` files are parsed as YAML, anything
/// else as JSON.
pub fn load_experiment(path: &Path) -> Result<ExperimentDescription, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let experiment = if is_yaml {
        ExperimentDescription::from_yaml_str(&text)?
    } else {
        ExperimentDescription::from_json_str(&text)?
    };
    debug!(
        path = %path.display(),
        experiment = %experiment,
        sweeps = experiment.sweeps().len(),
        "loaded experiment"
    );
    Ok(experiment)
}
