use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use sweepgen_exp::{document_hash, stable_hash_string, to_canonical_json_bytes, ExperimentDescription};
use tracing::{debug, info};

use super::load_experiment;
use crate::config::OutputConfig;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Experiment description (JSON, or YAML by extension).
    #[arg(long)]
    pub experiment: PathBuf,
    /// Directory receiving one file per scenario; prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// YAML file controlling output file naming.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Record of one written scenario document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub file: String,
    pub sha256: String,
}

/// Index of an expansion run written next to the documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioManifest {
    pub experiment: String,
    pub experiment_hash: String,
    pub count: usize,
    pub documents: Vec<ManifestEntry>,
}

pub fn run(args: &ExpandArgs) -> Result<(), Box<dyn Error>> {
    let experiment = load_experiment(&args.experiment)?;
    match &args.out {
        Some(out) => {
            let config = OutputConfig::load(args.config.as_deref())?;
            let manifest = write_scenarios(&experiment, out, &config)?;
            info!(
                experiment = %experiment,
                count = manifest.count,
                out = %out.display(),
                "wrote scenarios"
            );
            Ok(())
        }
        None => print_scenarios(&experiment),
    }
}

fn print_scenarios(experiment: &ExperimentDescription) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for scenario in experiment.scenarios() {
        writeln!(writer, "{}", scenario?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every scenario to `out`. Files written before a failing scenario
/// are left in place.
pub fn write_scenarios(
    experiment: &ExperimentDescription,
    out: &Path,
    config: &OutputConfig,
) -> Result<ScenarioManifest, Box<dyn Error>> {
    fs::create_dir_all(out)?;
    let mut documents = Vec::with_capacity(experiment.scenario_count());
    for (index, scenario) in experiment.scenarios().enumerate() {
        let scenario = scenario?;
        let file = config.file_name(index);
        fs::write(out.join(&file), &scenario)?;
        debug!(index, file = %file, "wrote scenario");
        documents.push(ManifestEntry {
            index,
            file,
            sha256: document_hash(&scenario),
        });
    }
    let manifest = ScenarioManifest {
        experiment: experiment.name().to_string(),
        experiment_hash: stable_hash_string(experiment)?,
        count: documents.len(),
        documents,
    };
    if config.manifest {
        fs::write(out.join("manifest.json"), to_canonical_json_bytes(&manifest)?)?;
    }
    Ok(manifest)
}
