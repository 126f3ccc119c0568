//! Pipeline configuration loaded from YAML

use doublet_common::{ConfigError, DoubletConfig};
use doublet_inference::TensorNames;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where scored doublets are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Three tab-separated logs per event
    #[default]
    Text,
    /// One JSON-lines file per run
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "jsonl" | "json-lines" => Ok(OutputFormat::Jsonl),
            other => Err(ConfigError::Invalid(format!(
                "unknown output format '{other}' (expected text or jsonl)"
            ))),
        }
    }
}

/// Everything the event processor needs besides the events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tag used in output file names
    pub process_name: String,
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    /// Exported doublet CNN
    pub model_path: Option<PathBuf>,
    pub tensor_names: TensorNames,
    /// Try GPU execution before the CPU
    pub accelerated: bool,
    /// Encoding constants
    pub doublets: DoubletConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            process_name: "HLT".to_string(),
            output_dir: PathBuf::from("doublets"),
            output_format: OutputFormat::Text,
            model_path: None,
            tensor_names: TensorNames::default(),
            accelerated: false,
            doublets: DoubletConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file; missing keys keep their defaults
    pub fn from_yaml(yaml_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(yaml_path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_name.is_empty() {
            return Err(ConfigError::Invalid(
                "process_name must not be empty".to_string(),
            ));
        }
        if self.process_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "process_name '{}' must not contain path separators",
                self.process_name
            )));
        }
        let names = &self.tensor_names;
        if names.image_input.is_empty() || names.feature_input.is_empty() || names.output.is_empty()
        {
            return Err(ConfigError::Invalid(
                "tensor names must not be empty".to_string(),
            ));
        }
        self.doublets.validate()
    }
}
