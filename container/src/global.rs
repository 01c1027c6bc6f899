//! The process-wide container holder.

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

// Empty until first accessed or explicitly set.
static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

/// Provides the process-wide container, creating an empty one on first access.
///
/// # Examples
///
/// ```
/// use fibre_container::global;
///
/// global().instance("app.name", String::from("fibre")).unwrap();
/// assert!(global().bound("app.name"));
/// ```
pub fn global() -> Arc<Container> {
  if let Some(container) = GLOBAL_CONTAINER.read().as_ref() {
    return Arc::clone(container);
  }
  let mut slot = GLOBAL_CONTAINER.write();
  Arc::clone(slot.get_or_insert_with(|| Arc::new(Container::new())))
}

/// The process-wide container, if one has been created or set.
pub fn try_global() -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.read().clone()
}

/// Installs `container` as the process-wide container, returning the previous one.
pub fn set_global(container: Arc<Container>) -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().replace(container)
}

/// Clears the holder; the next [`global`] call creates a fresh container.
pub fn reset_global() -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().take()
}
