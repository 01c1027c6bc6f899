//! Invoking arbitrary callables with their dependencies injected.

use crate::container::Container;
use crate::error::{ContainerError, Result};
use crate::id::AbstractId;
use crate::reflect::Parameter;
use crate::value::{Arguments, Object, ParamKey, Parameters};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type CallableFn = dyn Fn(&Arguments) -> Result<Object> + Send + Sync;

/// A free function or closure together with its declared parameters.
#[derive(Clone)]
pub struct Callable {
  name: String,
  params: Vec<Parameter>,
  invoke: Arc<CallableFn>,
}

impl Callable {
  pub fn new<R, F>(name: &str, params: Vec<Parameter>, function: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self {
      name: name.to_owned(),
      params,
      invoke: Arc::new(move |args| function(args).map(|value| Arc::new(value) as Object)),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn params(&self) -> &[Parameter] {
    &self.params
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("name", &self.name)
      .field("params", &self.params)
      .finish_non_exhaustive()
  }
}

/// Anything [`Container::call`] can invoke.
#[derive(Clone)]
pub enum CallTarget {
  Function(Callable),
  /// `"Class@method"`, `"Class::method"`, or a bare `"Class"` used together
  /// with a default method.
  Spec(String),
  /// `[Class, method]`: a static method.
  Static { class: AbstractId, method: String },
  /// `[instance, method]`.
  Bound { instance: Object, method: String },
}

impl CallTarget {
  pub fn static_method(class: impl Into<AbstractId>, method: &str) -> Self {
    CallTarget::Static {
      class: class.into(),
      method: method.to_owned(),
    }
  }

  pub fn method(instance: Object, method: &str) -> Self {
    CallTarget::Bound {
      instance,
      method: method.to_owned(),
    }
  }
}

impl fmt::Debug for CallTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CallTarget::Function(callable) => write!(f, "Function({})", callable.name),
      CallTarget::Spec(spec) => write!(f, "Spec({spec})"),
      CallTarget::Static { class, method } => write!(f, "Static({class}::{method})"),
      CallTarget::Bound { method, .. } => write!(f, "Bound(<instance>, {method})"),
    }
  }
}

impl From<Callable> for CallTarget {
  fn from(callable: Callable) -> Self {
    CallTarget::Function(callable)
  }
}

impl From<&str> for CallTarget {
  fn from(spec: &str) -> Self {
    CallTarget::Spec(spec.to_owned())
  }
}

impl From<String> for CallTarget {
  fn from(spec: String) -> Self {
    CallTarget::Spec(spec)
  }
}

impl From<(Object, &str)> for CallTarget {
  fn from((instance, method): (Object, &str)) -> Self {
    CallTarget::method(instance, method)
  }
}

impl Container {
  /// Invokes `target`, injecting every parameter not supplied in `parameters`.
  ///
  /// Each declared parameter takes the supplied value of the same name, else
  /// the resolved instance of its class type, else its default; parameters
  /// matching none of these are left out. Supplied values that no parameter
  /// consumed are passed after the assembled ones.
  ///
  /// `default_method` turns a bare class name into `Class@default_method`.
  pub fn call(
    &self,
    target: impl Into<CallTarget>,
    parameters: &Parameters,
    default_method: Option<&str>,
  ) -> Result<Object> {
    let target = match target.into() {
      CallTarget::Spec(spec) if spec.contains('@') || (default_method.is_some() && !spec.contains("::")) => {
        let segments: Vec<&str> = spec.split('@').collect();
        let method = match segments.as_slice() {
          [_, method] => Some(*method),
          _ => default_method,
        };
        let method = method.ok_or_else(|| ContainerError::InvalidCallTarget("Method not provided.".into()))?;
        let instance = self.make(segments[0])?;
        return self.call(CallTarget::method(instance, method), parameters, None);
      }
      CallTarget::Spec(spec) => match spec.rsplit_once("::") {
        Some((class, method)) => CallTarget::static_method(class, method),
        None => return Err(ContainerError::InvalidCallTarget("Method not provided.".into())),
      },
      target => target,
    };

    match target {
      CallTarget::Function(callable) => {
        let args = self.inject(&format!("function {}", callable.name), &callable.params, parameters)?;
        trace!(function = %callable.name, "calling function");
        (callable.invoke)(&args)
      }
      CallTarget::Static { class, method } => {
        let class_def = self.class(&class).ok_or_else(|| ContainerError::ClassNotFound {
          target: class.to_string(),
          stack: Vec::new(),
        })?;
        let method = class_def.find_method(&method)?;
        if !method.is_static() {
          return Err(ContainerError::InvalidCallTarget(format!(
            "Non-static method [{class}::{}] cannot be called statically.",
            method.name()
          )));
        }
        let args = self.inject(&format!("method {class}::{}", method.name()), method.params(), parameters)?;
        trace!(class = %class, method = method.name(), "calling static method");
        method.invoke(None, &args)
      }
      CallTarget::Bound { instance, method } => {
        let class_def = self.class_of(&instance).ok_or_else(|| {
          ContainerError::InvalidCallTarget(format!(
            "Cannot call [{method}] on an instance of an undefined class."
          ))
        })?;
        let method = class_def.find_method(&method)?;
        let args = self.inject(
          &format!("method {}::{}", class_def.name(), method.name()),
          method.params(),
          parameters,
        )?;
        trace!(class = %class_def.name(), method = method.name(), "calling method");
        method.invoke(Some(&instance), &args)
      }
      CallTarget::Spec(_) => Err(ContainerError::InvalidCallTarget("Method not provided.".into())),
    }
  }

  /// A deferred call: the returned thunk calls `target` with `parameters`
  /// each time it is invoked.
  pub fn wrap(&self, target: CallTarget, parameters: Parameters) -> impl Fn() -> Result<Object> + '_ {
    move || self.call(target.clone(), &parameters, None)
  }

  fn inject(&self, owner: &str, params: &[Parameter], parameters: &Parameters) -> Result<Arguments> {
    let mut remaining = parameters.clone();
    let mut args = Arguments::new(owner);

    for param in params {
      let name = Some(param.name().to_owned());
      if let Some(value) = remaining.take(param.name()) {
        args.push(name, Some(value));
      } else if let Some(dependency) = param.class_type() {
        args.push(name, Some(self.make(dependency)?));
      } else if let Some(default) = param.default() {
        args.push(name, default.to_argument());
      }
    }

    for (key, value) in remaining.into_entries() {
      let name = match key {
        ParamKey::Name(name) => Some(name),
        ParamKey::Index(_) => None,
      };
      args.push(name, Some(value));
    }
    Ok(args)
  }
}
