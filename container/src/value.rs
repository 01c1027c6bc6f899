//! Resolved objects, caller-supplied parameter bags, and assembled argument lists.

use crate::error::{ContainerError, Result};
use crate::reflect::Parameter;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A materialized object, type-erased.
///
/// Shared instances are handed out as clones of the same `Arc`, so identity
/// can be checked with `Arc::ptr_eq`.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Wraps a value into an [`Object`].
pub fn object<T: Any + Send + Sync>(value: T) -> Object {
  Arc::new(value)
}

/// How a caller-supplied parameter is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
  Name(String),
  Index(usize),
}

/// An ordered bag of caller-supplied override values.
///
/// Entries are keyed by parameter name or by position. Positional entries are
/// remapped to the matching constructor parameter's name before a build.
#[derive(Clone, Default)]
pub struct Parameters {
  entries: Vec<(ParamKey, Object)>,
}

impl Parameters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a named value.
  pub fn with<T: Any + Send + Sync>(self, name: &str, value: T) -> Self {
    self.with_object(name, Arc::new(value))
  }

  /// Adds a named, already-shared object. The object is passed on as-is.
  pub fn with_object(mut self, name: &str, value: Object) -> Self {
    self.insert(ParamKey::Name(name.to_owned()), value);
    self
  }

  /// Adds the next positional value.
  pub fn push<T: Any + Send + Sync>(self, value: T) -> Self {
    self.push_object(Arc::new(value))
  }

  pub fn push_object(mut self, value: Object) -> Self {
    let index = self
      .entries
      .iter()
      .filter(|(key, _)| matches!(key, ParamKey::Index(_)))
      .count();
    self.insert(ParamKey::Index(index), value);
    self
  }

  /// Inserts an entry, replacing any existing entry with the same key in place.
  pub fn insert(&mut self, key: ParamKey, value: Object) {
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((key, value)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&Object> {
    self.entries.iter().find_map(|(key, value)| match key {
      ParamKey::Name(n) if n == name => Some(value),
      _ => None,
    })
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  /// Removes and returns a named entry.
  pub fn take(&mut self, name: &str) -> Option<Object> {
    let position = self
      .entries
      .iter()
      .position(|(key, _)| matches!(key, ParamKey::Name(n) if n == name))?;
    Some(self.entries.remove(position).1)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Object)> {
    self.entries.iter().map(|(key, value)| (key, value))
  }

  pub fn into_entries(self) -> Vec<(ParamKey, Object)> {
    self.entries
  }

  /// Rewrites positional entries onto the names of `params` by ordinal.
  ///
  /// A positional entry overrides a named entry of the same name. Positions
  /// past the end of `params` have nothing to bind to and are dropped.
  pub(crate) fn remap_positional(&self, params: &[Parameter]) -> Parameters {
    let mut remapped = Parameters::new();
    for (key, value) in &self.entries {
      if let ParamKey::Name(_) = key {
        remapped.insert(key.clone(), value.clone());
      }
    }
    for (key, value) in &self.entries {
      if let ParamKey::Index(index) = key {
        match params.get(*index) {
          Some(param) => remapped.insert(ParamKey::Name(param.name().to_owned()), value.clone()),
          None => {
            trace!(index, "positional parameter has no matching constructor parameter");
          }
        }
      }
    }
    remapped
  }
}

impl fmt::Debug for Parameters {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.entries.iter().map(|(key, _)| key))
      .finish()
  }
}

/// The argument list assembled for a constructor, method or function.
///
/// Each entry remembers the parameter name it was assembled for, so typed
/// lookups by name stay correct even when unresolvable optional parameters
/// were omitted. A `None` value is an explicit null default.
pub struct Arguments {
  owner: String,
  values: Vec<(Option<String>, Option<Object>)>,
}

impl Arguments {
  pub(crate) fn new(owner: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      values: Vec::new(),
    }
  }

  pub(crate) fn push(&mut self, name: Option<String>, value: Option<Object>) {
    self.values.push((name, value));
  }

  /// What these arguments are for, e.g. `class Mailer` or `method Mailer::send`.
  pub fn owner(&self) -> &str {
    &self.owner
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, Option<&Object>)> {
    self
      .values
      .iter()
      .map(|(name, value)| (name.as_deref(), value.as_ref()))
  }

  fn find(&self, name: &str) -> Option<&Option<Object>> {
    self
      .values
      .iter()
      .find(|(n, _)| n.as_deref() == Some(name))
      .map(|(_, value)| value)
  }

  fn missing(&self, name: &str) -> ContainerError {
    ContainerError::Unresolvable {
      parameter: name.to_owned(),
      owner: self.owner.clone(),
    }
  }

  /// The raw object for `name`.
  pub fn object(&self, name: &str) -> Result<Object> {
    match self.find(name) {
      Some(Some(value)) => Ok(value.clone()),
      Some(None) => Err(ContainerError::TypeMismatch {
        name: name.to_owned(),
        expected: "a non-null value",
      }),
      None => Err(self.missing(name)),
    }
  }

  /// The argument for `name`, downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    downcast(name, self.object(name)?)
  }

  /// A clone of the argument for `name`.
  pub fn value<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T> {
    self.get::<T>(name).map(|value| (*value).clone())
  }

  /// The argument for `name`, or `None` when it is null or was omitted.
  pub fn optional<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
    match self.find(name) {
      Some(Some(value)) => downcast(name, value.clone()).map(Some),
      _ => Ok(None),
    }
  }

  /// The argument at `index`, downcast to `T`.
  pub fn at<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    let label = format!("#{index}");
    match self.values.get(index) {
      Some((_, Some(value))) => downcast(&label, value.clone()),
      Some((_, None)) => Err(ContainerError::TypeMismatch {
        name: label,
        expected: "a non-null value",
      }),
      None => Err(self.missing(&label)),
    }
  }
}

impl fmt::Debug for Arguments {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Arguments")
      .field("owner", &self.owner)
      .field(
        "names",
        &self.values.iter().map(|(name, _)| name).collect::<Vec<_>>(),
      )
      .finish()
  }
}

pub(crate) fn downcast<T: Any + Send + Sync>(name: &str, value: Object) -> Result<Arc<T>> {
  value.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
    name: name.to_owned(),
    expected: type_name::<T>(),
  })
}
