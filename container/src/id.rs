//! Abstract identifiers and their normalization.

use std::fmt;
use std::sync::Arc;

/// The name under which a service is bound and requested.
///
/// Identifiers are normalized on construction: any leading namespace
/// separators (`\` or `::`) are stripped, so `"::app::Logger"`,
/// `"\\app::Logger"` and `"app::Logger"` all name the same registry entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbstractId(Arc<str>);

impl AbstractId {
  pub fn new(raw: impl AsRef<str>) -> Self {
    Self(Arc::from(normalize(raw.as_ref())))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// Strips leading namespace separators from a raw identifier.
pub fn normalize(raw: &str) -> &str {
  let mut id = raw;
  loop {
    if let Some(rest) = id.strip_prefix('\\') {
      id = rest;
    } else if let Some(rest) = id.strip_prefix("::") {
      id = rest;
    } else {
      return id;
    }
  }
}

impl From<&str> for AbstractId {
  fn from(raw: &str) -> Self {
    Self::new(raw)
  }
}

impl From<String> for AbstractId {
  fn from(raw: String) -> Self {
    Self::new(raw)
  }
}

impl From<&String> for AbstractId {
  fn from(raw: &String) -> Self {
    Self::new(raw)
  }
}

impl From<&AbstractId> for AbstractId {
  fn from(id: &AbstractId) -> Self {
    id.clone()
  }
}

impl AsRef<str> for AbstractId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl PartialEq<str> for AbstractId {
  fn eq(&self, other: &str) -> bool {
    &*self.0 == other
  }
}

impl PartialEq<&str> for AbstractId {
  fn eq(&self, other: &&str) -> bool {
    &*self.0 == *other
  }
}

impl fmt::Display for AbstractId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl fmt::Debug for AbstractId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "AbstractId({})", self.0)
  }
}
