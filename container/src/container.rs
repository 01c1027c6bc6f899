//! The main `Container` struct: binding registry, instance cache and the
//! `make`/`build` resolution engine.

use crate::core::{build_stack, next_container_id, Binding, BuildFrame, ResolutionGuard};
use crate::error::{ContainerError, Result};
use crate::factory::{Concrete, Factory};
use crate::id::AbstractId;
use crate::reflect::{ClassDef, Construction, ParamType};
use crate::value::{downcast, Arguments, Object, Parameters};
use dashmap::{DashMap, DashSet};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A read-only view of one binding, as returned by [`Container::bindings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
  /// The class or alias the binding was declared with; `None` for factories.
  pub concrete: Option<AbstractId>,
  pub shared: bool,
}

/// The Inversion of Control (IoC) container.
///
/// Holds the type-description table, the binding registry, the cache of shared
/// instances and the set of identifiers resolved so far. All of it sits behind
/// concurrent maps, so the container is `Send + Sync` and every method takes
/// `&self`; factories receive the container and may resolve further services.
pub struct Container {
  id: u64,
  classes: DashMap<AbstractId, Arc<ClassDef>>,
  class_names: DashMap<TypeId, AbstractId>,
  bindings: DashMap<AbstractId, Binding>,
  instances: DashMap<AbstractId, Object>,
  resolved: DashSet<AbstractId>,
}

impl Default for Container {
  fn default() -> Self {
    Self {
      id: next_container_id(),
      classes: DashMap::new(),
      class_names: DashMap::new(),
      bindings: DashMap::new(),
      instances: DashMap::new(),
      resolved: DashSet::new(),
    }
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Type Table ---

  /// Describes a class so it can be built and its methods called.
  /// Redefining a name replaces the previous description.
  pub fn define(&self, class: impl Into<ClassDef>) {
    let class = class.into();
    // A redefinition may be backed by a different Rust type.
    self.class_names.retain(|_, name| *name != *class.name());
    if let Some(type_id) = class.type_id() {
      self.class_names.insert(type_id, class.name().clone());
    }
    trace!(class = %class.name(), kind = ?class.kind(), "class defined");
    self.classes.insert(class.name().clone(), Arc::new(class));
  }

  pub fn class(&self, name: impl Into<AbstractId>) -> Option<Arc<ClassDef>> {
    self.classes.get(&name.into()).map(|class| Arc::clone(class.value()))
  }

  pub fn has_class(&self, name: impl Into<AbstractId>) -> bool {
    self.classes.contains_key(&name.into())
  }

  /// The class description of the object's concrete Rust type, if defined.
  pub fn class_of(&self, object: &Object) -> Option<Arc<ClassDef>> {
    let erased: &(dyn Any + Send + Sync) = &**object;
    let name = self.class_names.get(&erased.type_id())?.value().clone();
    self.class(name)
  }

  // --- Binding Registration ---

  /// Binds `abstract_` to a class name, an alias, or a factory.
  ///
  /// Any cached instance is dropped. If the identifier was resolved before,
  /// it is resolved again right away so the container's cache reflects the
  /// new binding; objects handed out earlier are left untouched. When that
  /// refresh fails, the previous binding and cached instance are restored
  /// and the error is returned.
  pub fn bind(&self, abstract_: impl Into<AbstractId>, concrete: impl Into<Concrete>, shared: bool) -> Result<()> {
    self.bind_internal(abstract_.into(), Some(concrete.into()), shared)
  }

  /// Binds `abstract_` to itself, i.e. as a directly constructible class.
  pub fn bind_self(&self, abstract_: impl Into<AbstractId>, shared: bool) -> Result<()> {
    self.bind_internal(abstract_.into(), None, shared)
  }

  pub fn singleton(&self, abstract_: impl Into<AbstractId>, concrete: impl Into<Concrete>) -> Result<()> {
    self.bind(abstract_, concrete, true)
  }

  pub fn singleton_self(&self, abstract_: impl Into<AbstractId>) -> Result<()> {
    self.bind_self(abstract_, true)
  }

  fn bind_internal(&self, abstract_: AbstractId, concrete: Option<Concrete>, shared: bool) -> Result<()> {
    let stale = self.instances.remove(&abstract_).map(|(_, instance)| instance);

    let concrete = concrete.unwrap_or_else(|| Concrete::Class(abstract_.clone()));
    let binding = match concrete {
      Concrete::Factory(factory) => Binding {
        factory,
        concrete: None,
        shared,
      },
      Concrete::Class(class) => Binding {
        factory: Factory::for_concrete(abstract_.clone(), class.clone()),
        concrete: Some(class),
        shared,
      },
    };
    debug!(id = %abstract_, concrete = ?binding.concrete, shared, "binding registered");
    let previous = self.bindings.insert(abstract_.clone(), binding);

    if self.resolved(&abstract_) {
      debug!(id = %abstract_, "rebound after resolution, refreshing");
      if let Err(err) = self.make(&abstract_) {
        debug!(id = %abstract_, error = %err, "refresh failed, restoring previous binding");
        match previous {
          Some(previous) => self.bindings.insert(abstract_.clone(), previous),
          None => self.bindings.remove(&abstract_).map(|(_, binding)| binding),
        };
        if let Some(stale) = stale {
          self.instances.insert(abstract_, stale);
        }
        return Err(err);
      }
    }
    Ok(())
  }

  /// Registers `value` as the shared instance of `abstract_`.
  pub fn instance<T: Any + Send + Sync>(&self, abstract_: impl Into<AbstractId>, value: T) -> Result<()> {
    self.instance_object(abstract_, Arc::new(value))
  }

  /// Registers an already-shared object as the instance of `abstract_`.
  pub fn instance_object(&self, abstract_: impl Into<AbstractId>, object: Object) -> Result<()> {
    let abstract_ = abstract_.into();
    let bound = self.bound(&abstract_);
    self.instances.insert(abstract_.clone(), object);
    debug!(id = %abstract_, bound, "instance registered");

    // A `make` here would only hit the cache; what remains of it is the marker.
    if bound {
      self.resolved.insert(abstract_);
    }
    Ok(())
  }

  // --- Introspection ---

  pub fn bound(&self, abstract_: impl Into<AbstractId>) -> bool {
    let abstract_ = abstract_.into();
    self.bindings.contains_key(&abstract_) || self.instances.contains_key(&abstract_)
  }

  pub fn resolved(&self, abstract_: impl Into<AbstractId>) -> bool {
    let abstract_ = abstract_.into();
    self.resolved.contains(&abstract_) || self.instances.contains_key(&abstract_)
  }

  /// True if an instance is cached, or the binding is shared.
  pub fn is_shared(&self, abstract_: impl Into<AbstractId>) -> bool {
    let abstract_ = abstract_.into();
    if self.instances.contains_key(&abstract_) {
      return true;
    }
    self
      .bindings
      .get(&abstract_)
      .map_or(false, |binding| binding.shared)
  }

  /// True if `concrete` is a factory, or a class name equal to `abstract_`.
  pub fn is_buildable(concrete: &Concrete, abstract_: &AbstractId) -> bool {
    match concrete {
      Concrete::Factory(_) => true,
      Concrete::Class(class) => class == abstract_,
    }
  }

  /// A snapshot of the binding registry.
  pub fn bindings(&self) -> HashMap<AbstractId, BindingInfo> {
    self
      .bindings
      .iter()
      .map(|entry| {
        let info = BindingInfo {
          concrete: entry.concrete.clone(),
          shared: entry.shared,
        };
        (entry.key().clone(), info)
      })
      .collect()
  }

  // --- Cache Management ---

  pub fn forget_instance(&self, abstract_: impl Into<AbstractId>) {
    self.instances.remove(&abstract_.into());
  }

  pub fn forget_instances(&self) {
    self.instances.clear();
  }

  /// Drops every binding, cached instance and resolved marker.
  /// Class descriptions are kept.
  pub fn flush(&self) {
    self.resolved.clear();
    self.bindings.clear();
    self.instances.clear();
    debug!("container flushed");
  }

  // --- Resolution ---

  pub fn make(&self, abstract_: impl Into<AbstractId>) -> Result<Object> {
    self.make_with(abstract_, &Parameters::new())
  }

  /// Resolves `abstract_`, using `parameters` as overrides for the build.
  pub fn make_with(&self, abstract_: impl Into<AbstractId>, parameters: &Parameters) -> Result<Object> {
    let abstract_ = abstract_.into();

    if let Some(instance) = self.instances.get(&abstract_) {
      trace!(id = %abstract_, "resolved from instance cache");
      return Ok(instance.value().clone());
    }

    let _guard = ResolutionGuard::enter(self.id, &abstract_)?;

    let concrete = match self.bindings.get(&abstract_) {
      Some(binding) => Concrete::Factory(binding.factory.clone()),
      None => Concrete::Class(abstract_.clone()),
    };

    let object = match concrete {
      Concrete::Class(ref alias) if !Self::is_buildable(&concrete, &abstract_) => {
        self.make_with(alias, parameters)?
      }
      concrete => self.build(concrete, parameters)?,
    };

    let object = if self.is_shared(&abstract_) {
      // First writer wins, so concurrent resolutions agree on one instance.
      self.instances.entry(abstract_.clone()).or_insert(object).value().clone()
    } else {
      object
    };

    self.resolved.insert(abstract_);
    Ok(object)
  }

  /// Resolves `abstract_` and downcasts the result.
  pub fn make_as<T: Any + Send + Sync>(&self, abstract_: impl Into<AbstractId>) -> Result<Arc<T>> {
    let abstract_ = abstract_.into();
    let object = self.make(&abstract_)?;
    downcast(abstract_.as_str(), object)
  }

  /// Alias for [`Container::make_with`].
  pub fn resolve(&self, abstract_: impl Into<AbstractId>, parameters: &Parameters) -> Result<Object> {
    self.make_with(abstract_, parameters)
  }

  /// Invokes a factory, or constructs a class from its type description.
  ///
  /// Constructor parameters take, in order of preference: the caller-supplied
  /// value of the same name (positional values are mapped by ordinal first),
  /// the resolved instance of the declared class type, the declared default.
  /// An optional class-typed parameter whose resolution fails takes its default.
  pub fn build(&self, concrete: impl Into<Concrete>, parameters: &Parameters) -> Result<Object> {
    let class_name = match concrete.into() {
      Concrete::Factory(factory) => return factory.invoke(self, parameters),
      Concrete::Class(class_name) => class_name,
    };

    let class = self.class(&class_name).ok_or_else(|| ContainerError::ClassNotFound {
      target: class_name.to_string(),
      stack: build_stack(self.id),
    })?;

    let not_instantiable = || ContainerError::NotInstantiable {
      target: class_name.to_string(),
      stack: build_stack(self.id),
    };
    if !class.is_instantiable() {
      return Err(not_instantiable());
    }

    let frame = BuildFrame::push(self.id, &class_name);
    trace!(class = %class_name, "building");

    let (params, construct) = match class.construction() {
      Construction::Constructor { params, construct } => (params, construct),
      Construction::Bare(instantiate) => return Ok(instantiate()),
      Construction::None => return Err(not_instantiable()),
    };

    let parameters = parameters.remap_positional(params);
    let mut args = Arguments::new(format!("class {class_name}"));

    for param in params {
      let name = Some(param.name().to_owned());

      if let Some(value) = parameters.get(param.name()) {
        args.push(name, Some(value.clone()));
        continue;
      }

      match param.ty() {
        ParamType::Class(dependency) => match self.make(dependency) {
          Ok(instance) => args.push(name, Some(instance)),
          Err(err) if err.falls_back_to_default() && param.is_optional() => {
            debug!(class = %class_name, parameter = param.name(), error = %err, "dependency unresolvable, using default");
            args.push(name, param.default().and_then(|default| default.to_argument()));
          }
          Err(err) => return Err(err),
        },
        ParamType::Scalar(_) | ParamType::Untyped => match param.default() {
          Some(default) => args.push(name, default.to_argument()),
          None => {
            return Err(ContainerError::Unresolvable {
              parameter: param.to_string(),
              owner: format!("class {class_name}"),
            })
          }
        },
      }
    }

    drop(frame);
    construct(&args)
  }

  /// Wraps `factory` so it runs once and then returns its first result.
  /// The result is cached in the returned factory, not in this container.
  pub fn share(&self, factory: Factory) -> Factory {
    factory.shared()
  }

  // --- Map-style Access ---

  /// Same as [`Container::bound`].
  pub fn has(&self, abstract_: impl Into<AbstractId>) -> bool {
    self.bound(abstract_)
  }

  /// Same as [`Container::make`].
  pub fn get(&self, abstract_: impl Into<AbstractId>) -> Result<Object> {
    self.make(abstract_)
  }

  /// Binds `abstract_` (non-shared). A [`Factory`] is bound as-is; any other
  /// value is wrapped in a factory returning that same object.
  pub fn set<T: Any + Send + Sync>(&self, abstract_: impl Into<AbstractId>, value: T) -> Result<()> {
    let factory = match (Arc::new(value) as Object).downcast::<Factory>() {
      Ok(factory) => (*factory).clone(),
      Err(object) => Factory::from_object(object),
    };
    self.bind(abstract_, factory, false)
  }

  /// Drops the binding, cached instance and resolved marker of `abstract_`.
  pub fn remove(&self, abstract_: impl Into<AbstractId>) {
    let abstract_ = abstract_.into();
    self.bindings.remove(&abstract_);
    self.instances.remove(&abstract_);
    self.resolved.remove(&abstract_);
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("classes", &self.classes.len())
      .field("bindings", &self.bindings.len())
      .field("instances", &self.instances.len())
      .field("resolved", &self.resolved.len())
      .finish()
  }
}
