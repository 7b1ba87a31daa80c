use crate::scheduler::policy::{Comparison, DEFAULT_THRESHOLD, ThresholdPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_PROMETHEUS_ADDRESS: &str = "http://localhost:8080";
pub const DEFAULT_METRIC_NAME: &str = "DCGM_FI_DEV_FB_USED";
pub const DEFAULT_NODE_LABEL: &str = "kubernetes_node";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid plugin args: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

/// Plugin args, as given in the scheduler profile's `pluginConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GpuMemoryFilterArgs {
    #[validate(url)]
    pub prometheus_address: String,
    #[validate(length(min = 1))]
    pub metric_name: String,
    #[validate(length(min = 1))]
    pub node_label: String,
    #[validate(custom(function = "validate_finite"))]
    pub threshold: f64,
    pub comparison: Comparison,
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
}

impl Default for GpuMemoryFilterArgs {
    fn default() -> Self {
        GpuMemoryFilterArgs {
            prometheus_address: DEFAULT_PROMETHEUS_ADDRESS.to_string(),
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            node_label: DEFAULT_NODE_LABEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            comparison: Comparison::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new("finite"));
    }
    Ok(())
}

impl GpuMemoryFilterArgs {
    /// Absent args mean defaults.
    pub fn from_plugin_config(config: Option<&serde_json::Value>) -> Result<Self, ConfigError> {
        let args = match config {
            None | Some(serde_json::Value::Null) => GpuMemoryFilterArgs::default(),
            Some(value) => GpuMemoryFilterArgs::deserialize(value)?,
        };
        args.validate()?;
        Ok(args)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = shellexpand::tilde(path).to_string();
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let args: GpuMemoryFilterArgs = serde_yaml::from_str(&contents)?;
        args.validate()?;
        Ok(args)
    }

    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy::new(self.threshold, self.comparison)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
