use thiserror::Error;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum ContainerError {
  /// `build` was asked to construct an interface, an abstract class, or a
  /// class that has no way of being instantiated.
  #[error("Target [{target}] is not instantiable{}.", while_building(.stack))]
  NotInstantiable { target: String, stack: Vec<String> },

  /// `build` was asked to construct a name that is neither bound nor defined.
  #[error("Target class [{target}] does not exist{}.", while_building(.stack))]
  ClassNotFound { target: String, stack: Vec<String> },

  /// A parameter had no supplied value, no resolvable class type and no default.
  #[error("Unresolvable dependency resolving [{parameter}] in {owner}.")]
  Unresolvable { parameter: String, owner: String },

  #[error("Circular dependency detected while resolving [{target}]: {}.", .chain.join(" -> "))]
  CircularDependency { target: String, chain: Vec<String> },

  #[error("Invalid call target: {0}")]
  InvalidCallTarget(String),

  #[error("Method [{class}::{method}] does not exist.")]
  MethodNotFound { class: String, method: String },

  #[error("Value for [{name}] is not of type {expected}.")]
  TypeMismatch { name: String, expected: &'static str },

  /// Raised by user factories, constructors and methods.
  #[error("{0}")]
  Custom(String),

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },
}

impl ContainerError {
  pub fn custom(message: impl Into<String>) -> Self {
    ContainerError::Custom(message.into())
  }

  /// Failures an optional class-typed parameter recovers from by taking its default.
  pub(crate) fn falls_back_to_default(&self) -> bool {
    matches!(
      self,
      ContainerError::NotInstantiable { .. }
        | ContainerError::ClassNotFound { .. }
        | ContainerError::Unresolvable { .. }
    )
  }
}

fn while_building(stack: &[String]) -> String {
  if stack.is_empty() {
    String::new()
  } else {
    format!(" while building [{}]", stack.join(", "))
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;
