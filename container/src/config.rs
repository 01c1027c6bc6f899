//! Declarative container setup from YAML.

use crate::container::Container;
use crate::error::{ContainerError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

// BTreeMap so that bindings are applied in a stable order.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
  #[serde(default = "default_version")]
  pub version: u32,
  /// Scalar values registered as shared instances.
  #[serde(default)]
  pub instances: BTreeMap<String, InstanceValue>,
  #[serde(default)]
  pub bindings: BTreeMap<String, BindingConfig>,
}

fn default_version() -> u32 {
  1
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      version: default_version(),
      instances: BTreeMap::new(),
      bindings: BTreeMap::new(),
    }
  }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum InstanceValue {
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
}

/// Either `Abstract: Concrete` or the long form with an explicit shared flag.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum BindingConfig {
  Concrete(String),
  Full(BindingConfigFull),
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BindingConfigFull {
  /// Defaults to the abstract itself (a self-binding).
  #[serde(default)]
  pub concrete: Option<String>,
  #[serde(default)]
  pub shared: bool,
}

impl ContainerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    let config: ContainerConfig =
      serde_yaml::from_str(source).map_err(|err| ContainerError::ConfigParse(err.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let source = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&source)
  }

  fn validate(&self) -> Result<()> {
    if self.version != 1 {
      return Err(ContainerError::InvalidConfigValue {
        field: "version".to_string(),
        message: format!("unsupported version {}, expected 1", self.version),
      });
    }
    for (abstract_, binding) in &self.bindings {
      if let BindingConfig::Concrete(concrete) | BindingConfig::Full(BindingConfigFull { concrete: Some(concrete), .. }) =
        binding
      {
        if concrete.trim().is_empty() {
          return Err(ContainerError::InvalidConfigValue {
            field: format!("bindings.{abstract_}"),
            message: "concrete must not be empty".to_string(),
          });
        }
      }
    }
    Ok(())
  }

  /// Registers the configured instances, then the configured bindings.
  pub fn apply(&self, container: &Container) -> Result<()> {
    for (abstract_, value) in &self.instances {
      match value {
        InstanceValue::Bool(value) => container.instance(abstract_, *value)?,
        InstanceValue::Int(value) => container.instance(abstract_, *value)?,
        InstanceValue::Float(value) => container.instance(abstract_, *value)?,
        InstanceValue::String(value) => container.instance(abstract_, value.clone())?,
      }
    }

    for (abstract_, binding) in &self.bindings {
      match binding {
        BindingConfig::Concrete(concrete) => container.bind(abstract_, concrete.as_str(), false)?,
        BindingConfig::Full(BindingConfigFull {
          concrete: Some(concrete),
          shared,
        }) => container.bind(abstract_, concrete.as_str(), *shared)?,
        BindingConfig::Full(BindingConfigFull { concrete: None, shared }) => {
          container.bind_self(abstract_, *shared)?
        }
      }
    }

    tracing::debug!(
      instances = self.instances.len(),
      bindings = self.bindings.len(),
      "container configuration applied"
    );
    Ok(())
  }
}
