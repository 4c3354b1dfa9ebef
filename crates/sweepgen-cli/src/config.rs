use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sweepgen_exp::from_yaml_slice;

/// YAML-configurable naming of generated scenario files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prepended to the zero-padded scenario index.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// File extension without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Minimum number of digits in the scenario index.
    #[serde(default = "default_index_width")]
    pub index_width: usize,
    /// Whether to write `manifest.json` next to the documents.
    #[serde(default = "default_manifest")]
    pub manifest: bool,
}

fn default_file_prefix() -> String {
    "scenario_".to_string()
}

fn default_extension() -> String {
    "xml".to_string()
}

fn default_index_width() -> usize {
    4
}

fn default_manifest() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            extension: default_extension(),
            index_width: default_index_width(),
            manifest: default_manifest(),
        }
    }
}

impl OutputConfig {
    /// Loads the configuration from `path`, or the defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => Ok(from_yaml_slice(&fs::read(path)?)?),
            None => Ok(Self::default()),
        }
    }

    /// File name for the scenario at `index`.
    pub fn file_name(&self, index: usize) -> String {
        let width = self.index_width;
        if self.extension.is_empty() {
            format!("{}{index:0width$}", self.file_prefix)
        } else {
            format!("{}{index:0width$}.{}", self.file_prefix, self.extension)
        }
    }
}
