//! Factories: the uniform `(container, parameters) -> object` construction strategy.

use crate::container::Container;
use crate::error::Result;
use crate::id::AbstractId;
use crate::value::{Object, Parameters};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type FactoryFn = dyn Fn(&Container, &Parameters) -> Result<Object> + Send + Sync;

/// A function taking the container and a parameter bag and returning a built object.
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
  /// A factory producing a fresh `T` per invocation.
  pub fn new<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Container, &Parameters) -> Result<T> + Send + Sync + 'static,
  {
    Self(Arc::new(move |container, parameters| {
      factory(container, parameters).map(|value| Arc::new(value) as Object)
    }))
  }

  /// A factory returning an already type-erased object, e.g. the result of
  /// another `make`.
  pub fn from_fn<F>(factory: F) -> Self
  where
    F: Fn(&Container, &Parameters) -> Result<Object> + Send + Sync + 'static,
  {
    Self(Arc::new(factory))
  }

  /// A factory that returns the same object on every invocation.
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_object(Arc::new(value))
  }

  pub fn from_object(object: Object) -> Self {
    Self(Arc::new(move |_, _| Ok(object.clone())))
  }

  /// The factory stored for a class-name concrete: builds `concrete` directly
  /// when it names the abstract itself, otherwise resolves it as an alias.
  pub(crate) fn for_concrete(abstract_: AbstractId, concrete: AbstractId) -> Self {
    Self(Arc::new(move |container, parameters| {
      if abstract_ == concrete {
        container.build(&concrete, parameters)
      } else {
        container.make_with(&concrete, parameters)
      }
    }))
  }

  /// Wraps this factory so its first result is cached and returned verbatim on
  /// every later invocation.
  ///
  /// The cache belongs to the returned factory (and its clones), not to any
  /// container, so one shared factory can be bound under several identifiers
  /// and still yield a single object.
  pub fn shared(self) -> Self {
    let cell: OnceCell<Object> = OnceCell::new();
    Self(Arc::new(move |container, parameters| {
      cell
        .get_or_try_init(|| self.invoke(container, parameters))
        .map(Arc::clone)
    }))
  }

  pub fn invoke(&self, container: &Container, parameters: &Parameters) -> Result<Object> {
    (self.0)(container, parameters)
  }

  /// Whether both handles point at the same factory.
  pub fn ptr_eq(&self, other: &Factory) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Factory(..)")
  }
}

/// What an abstract identifier is bound to, or what `build` is asked to construct.
#[derive(Debug, Clone)]
pub enum Concrete {
  /// A class name: constructed directly when it equals the abstract, resolved
  /// as another abstract identifier otherwise.
  Class(AbstractId),
  Factory(Factory),
}

impl From<&str> for Concrete {
  fn from(class: &str) -> Self {
    Concrete::Class(class.into())
  }
}

impl From<String> for Concrete {
  fn from(class: String) -> Self {
    Concrete::Class(class.into())
  }
}

impl From<AbstractId> for Concrete {
  fn from(class: AbstractId) -> Self {
    Concrete::Class(class)
  }
}

impl From<&AbstractId> for Concrete {
  fn from(class: &AbstractId) -> Self {
    Concrete::Class(class.clone())
  }
}

impl From<Factory> for Concrete {
  fn from(factory: Factory) -> Self {
    Concrete::Factory(factory)
  }
}
