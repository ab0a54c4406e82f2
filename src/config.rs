//! Generator configuration.

use std::path::PathBuf;

use crate::error::{GenError, Result};

/// Name of the generated file, written inside `output_dir`.
pub const OUTPUT_FILE_NAME: &str = "fan_zone_defs.cpp";

/// Input document paths and output location for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Fan zone definition YAML (required).
    pub zone_yaml: Option<PathBuf>,

    /// Fan definition YAML (required).
    pub fan_yaml: Option<PathBuf>,

    /// Events YAML. Without it every zone has an empty event list.
    pub events_yaml: Option<PathBuf>,

    /// Zone conditions YAML.
    pub zone_conditions_yaml: Option<PathBuf>,

    /// Directory the generated file is written to.
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            zone_yaml: None,
            fan_yaml: None,
            events_yaml: None,
            zone_conditions_yaml: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl GeneratorConfig {
    /// Check the required paths are present. Nothing is read yet.
    pub fn validate(&self) -> Result<()> {
        if self.zone_yaml.is_none() {
            return Err(GenError::MissingRequiredInput("zone YAML"));
        }
        if self.fan_yaml.is_none() {
            return Err(GenError::MissingRequiredInput("fan YAML"));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE_NAME)
    }
}
