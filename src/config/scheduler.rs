//! Scheduler Configuration
//!
//! Learning rate scheduler configuration loaded from YAML or JSON.
//!
//! ```yaml
//! name: decaying_cosine_with_restarts
//! options:
//!   total_iters: 1000
//!   T_mult: 2
//!   eta_min: 1.0e-7
//!   restart_decay: 0.8
//!   warmup_steps: 100
//!   warmup_start_factor: 0.1
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SchedulerError};
use crate::optim::{get_lr_scheduler, LRScheduler, ParamGroups, SchedulerKind, SchedulerOptions};

/// Learning rate scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Scheduler name (cosine, cosine_with_restarts, decaying_cosine_with_restarts,
    /// step, constant, linear, constant_with_warmup)
    pub name: String,

    /// Scheduler options
    #[serde(default)]
    pub options: SchedulerOptions,
}

impl SchedulerConfig {
    /// Create a configuration for `name` with no options
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: SchedulerOptions::default() }
    }

    /// Set scheduler options
    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| SchedulerError::Config(format!("Failed to parse YAML config: {e}")))
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SchedulerError::Config(format!("Failed to parse JSON config: {e}")))
    }

    /// Load a YAML configuration file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = fs::read_to_string(path.as_ref()).map_err(|e| {
            SchedulerError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SchedulerError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Resolve the scheduler kind
    pub fn kind(&self) -> Result<SchedulerKind> {
        self.name.parse()
    }

    /// Build the scheduler for `groups`, publishing its first rates
    pub fn build(&self, groups: &mut dyn ParamGroups) -> Result<Box<dyn LRScheduler>> {
        get_lr_scheduler(&self.name, groups, self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DECAYING_YAML: &str = r#"
name: decaying_cosine_with_restarts
options:
  total_iters: 100
  T_mult: 2
  eta_min: 1.0e-7
  restart_decay: 0.8
"#;

    #[test]
    fn test_parse_yaml() {
        let config = SchedulerConfig::from_yaml_str(DECAYING_YAML).unwrap();
        assert_eq!(config.name, "decaying_cosine_with_restarts");
        assert_eq!(config.options.total_iters, Some(100));
        assert_eq!(config.options.t_mult, Some(2));
        assert_eq!(config.options.restart_decay, Some(0.8));
        assert_eq!(config.kind().unwrap(), SchedulerKind::DecayingCosineWithRestarts);
    }

    #[test]
    fn test_parse_yaml_without_options() {
        let config = SchedulerConfig::from_yaml_str("name: constant\n").unwrap();
        assert_eq!(config.options, SchedulerOptions::default());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let yaml = "name: step\noptions:\n  step_size: 10\n  momentum: 0.9\n";
        let err = SchedulerConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SchedulerError::Config(_)));
        assert!(err.to_string().contains("momentum"));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"name": "cosine", "options": {"T_max": 50, "eta_min": 0.001}}"#;
        let config = SchedulerConfig::from_json_str(json).unwrap();
        assert_eq!(config.options.t_max, Some(50));
        assert_eq!(config.options.eta_min, Some(0.001));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_option_names() {
        let config = SchedulerConfig::from_yaml_str(DECAYING_YAML).unwrap();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("T_mult"));
        assert!(!yaml.contains("T_max"));
        assert_eq!(SchedulerConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_build_publishes_first_rate() {
        let config = SchedulerConfig::from_yaml_str(DECAYING_YAML).unwrap();
        let mut groups = vec![1e-4];
        let mut scheduler = config.build(&mut groups).unwrap();
        assert_abs_diff_eq!(groups[0], 1e-4, epsilon = 1e-15);

        for _ in 0..100 {
            scheduler.step_and_apply(&mut groups);
        }
        assert_abs_diff_eq!(groups[0], 8e-5, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_name() {
        let mut groups = vec![0.1];
        let err = SchedulerConfig::new("onecycle").build(&mut groups).unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownScheduler(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SchedulerConfig::from_yaml_file("/nonexistent/scheduler.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
