//! The ordered list of build configurations a run operates on.

use tracing::debug;

use super::types::{BuildConfig, ConfigError};

/// Ordered collection of build configurations.
///
/// Populated before planning and passed explicitly into the orchestrator.
/// Duplicate names are accepted here; if they make two different rules claim
/// the same output path, planning fails with a conflicting-rule error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRegistry {
  configs: Vec<BuildConfig>,
}

impl ConfigRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append one configuration.
  pub fn add(&mut self, config: BuildConfig) {
    debug!(name = %config.name, files = config.files.len(), "adding build configuration");
    self.configs.push(config);
  }

  /// Replace every configuration.
  pub fn replace_all(&mut self, configs: Vec<BuildConfig>) {
    debug!(count = configs.len(), "replacing build configurations");
    self.configs = configs;
  }

  pub fn iter(&self) -> impl Iterator<Item = &BuildConfig> {
    self.configs.iter()
  }

  pub fn len(&self) -> usize {
    self.configs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.configs.is_empty()
  }

  /// Validate every configuration, stopping at the first error.
  pub fn validate(&self) -> Result<(), ConfigError> {
    self
      .configs
      .iter()
      .enumerate()
      .try_for_each(|(index, config)| config.validate(index))
  }
}

impl From<Vec<BuildConfig>> for ConfigRegistry {
  fn from(configs: Vec<BuildConfig>) -> Self {
    Self { configs }
  }
}
