//! Core, non-public data structures for the container.

use crate::error::{ContainerError, Result};
use crate::factory::Factory;
use crate::id::AbstractId;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Distinguishes the frames of different containers sharing one thread.
pub(crate) fn next_container_id() -> u64 {
  NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Default)]
struct CallChain {
  // Abstract identifiers currently inside `make`.
  resolving: Vec<(u64, AbstractId)>,
  // Concrete classes currently inside `build`.
  building: Vec<(u64, AbstractId)>,
}

thread_local! {
  // Each resolution call tree runs to completion on one thread, so the active
  // chain of that tree is exactly this thread's chain.
  static CHAIN: RefCell<CallChain> = RefCell::new(CallChain::default());
}

/// An RAII guard marking an abstract identifier as being resolved.
///
/// Entering fails if the identifier is already being resolved by the same
/// container on this thread. Dropping the guard removes the entry again.
pub(crate) struct ResolutionGuard {
  container: u64,
  id: AbstractId,
}

impl ResolutionGuard {
  pub(crate) fn enter(container: u64, id: &AbstractId) -> Result<Self> {
    CHAIN.with(|chain| {
      let mut chain = chain.borrow_mut();
      let first = chain
        .resolving
        .iter()
        .position(|(owner, active)| *owner == container && active == id);
      if let Some(first) = first {
        let mut cycle: Vec<String> = chain.resolving[first..]
          .iter()
          .filter(|(owner, _)| *owner == container)
          .map(|(_, active)| active.to_string())
          .collect();
        cycle.push(id.to_string());
        return Err(ContainerError::CircularDependency {
          target: id.to_string(),
          chain: cycle,
        });
      }
      chain.resolving.push((container, id.clone()));
      Ok(())
    })?;
    Ok(Self {
      container,
      id: id.clone(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    CHAIN.with(|chain| {
      let mut chain = chain.borrow_mut();
      if let Some(index) = chain
        .resolving
        .iter()
        .rposition(|(owner, active)| *owner == self.container && *active == self.id)
      {
        chain.resolving.remove(index);
      }
    });
  }
}

/// An RAII guard for one build-stack frame.
pub(crate) struct BuildFrame {
  container: u64,
  class: AbstractId,
}

impl BuildFrame {
  pub(crate) fn push(container: u64, class: &AbstractId) -> Self {
    CHAIN.with(|chain| {
      chain.borrow_mut().building.push((container, class.clone()));
    });
    Self {
      container,
      class: class.clone(),
    }
  }
}

impl Drop for BuildFrame {
  fn drop(&mut self) {
    CHAIN.with(|chain| {
      let mut chain = chain.borrow_mut();
      if let Some(index) = chain
        .building
        .iter()
        .rposition(|(owner, class)| *owner == self.container && *class == self.class)
      {
        chain.building.remove(index);
      }
    });
  }
}

/// The classes `container` is currently building on this thread, outermost first.
pub(crate) fn build_stack(container: u64) -> Vec<String> {
  CHAIN.with(|chain| {
    chain
      .borrow()
      .building
      .iter()
      .filter(|(owner, _)| *owner == container)
      .map(|(_, class)| class.to_string())
      .collect()
  })
}

/// A registered binding. Class-name concretes are already wrapped into
/// `factory`; `concrete` keeps the name for introspection.
#[derive(Clone)]
pub(crate) struct Binding {
  pub(crate) factory: Factory,
  pub(crate) concrete: Option<AbstractId>,
  pub(crate) shared: bool,
}
