use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::load_experiment;

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Experiment description (JSON, or YAML by extension).
    #[arg(long)]
    pub experiment: PathBuf,
}

pub fn run(args: &CountArgs) -> Result<(), Box<dyn Error>> {
    let experiment = load_experiment(&args.experiment)?;
    println!("{}", experiment.scenario_count());
    Ok(())
}
