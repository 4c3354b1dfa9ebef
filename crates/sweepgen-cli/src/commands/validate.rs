use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sweepgen_exp::to_canonical_json_bytes;
use tracing::warn;

use super::load_experiment;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Experiment description (JSON, or YAML by extension).
    #[arg(long)]
    pub experiment: PathBuf,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let experiment = load_experiment(&args.experiment)?;
    let report = experiment.validate();
    for warning in &report.warnings {
        warn!("{warning}");
    }
    let json = to_canonical_json_bytes(&report)?;
    println!("{}", String::from_utf8(json)?);
    if !report.is_ok() {
        return Err(format!("{} problem(s) found", report.errors.len()).into());
    }
    Ok(())
}
