//! The type-description table: how each class is constructed and which
//! methods it exposes to `Container::call`.

use crate::error::{ContainerError, Result};
use crate::id::AbstractId;
use crate::value::{Arguments, Object};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
  Concrete,
  Abstract,
  Interface,
}

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
  /// A class or interface, resolved through the container when not supplied.
  Class(AbstractId),
  /// A plain value type such as `u16` or `String`; never resolved.
  Scalar(&'static str),
  Untyped,
}

/// The declared default of an optional parameter.
#[derive(Clone)]
pub enum DefaultValue {
  Null,
  Value(Object),
}

impl DefaultValue {
  pub(crate) fn to_argument(&self) -> Option<Object> {
    match self {
      DefaultValue::Null => None,
      DefaultValue::Value(value) => Some(value.clone()),
    }
  }
}

impl fmt::Debug for DefaultValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DefaultValue::Null => f.write_str("Null"),
      DefaultValue::Value(_) => f.write_str("Value(..)"),
    }
  }
}

/// One declared parameter of a constructor, method or function.
#[derive(Debug, Clone)]
pub struct Parameter {
  name: String,
  ty: ParamType,
  default: Option<DefaultValue>,
}

impl Parameter {
  pub fn class(name: &str, class: impl Into<AbstractId>) -> Self {
    Self::with_type(name, ParamType::Class(class.into()))
  }

  pub fn scalar<T: 'static>(name: &str) -> Self {
    Self::with_type(name, ParamType::Scalar(type_name::<T>()))
  }

  pub fn untyped(name: &str) -> Self {
    Self::with_type(name, ParamType::Untyped)
  }

  fn with_type(name: &str, ty: ParamType) -> Self {
    Self {
      name: name.to_owned(),
      ty,
      default: None,
    }
  }

  /// Makes the parameter optional with the given default.
  pub fn default_value<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.default = Some(DefaultValue::Value(Arc::new(value)));
    self
  }

  /// Makes the parameter optional with a null default.
  pub fn default_null(mut self) -> Self {
    self.default = Some(DefaultValue::Null);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> &ParamType {
    &self.ty
  }

  pub fn class_type(&self) -> Option<&AbstractId> {
    match &self.ty {
      ParamType::Class(class) => Some(class),
      _ => None,
    }
  }

  pub fn default(&self) -> Option<&DefaultValue> {
    self.default.as_ref()
  }

  pub fn is_optional(&self) -> bool {
    self.default.is_some()
  }
}

impl fmt::Display for Parameter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.ty {
      ParamType::Class(class) => write!(f, "{}: {}", self.name, class),
      ParamType::Scalar(ty) => write!(f, "{}: {}", self.name, ty),
      ParamType::Untyped => f.write_str(&self.name),
    }?;
    if self.is_optional() {
      f.write_str(" = <default>")?;
    }
    Ok(())
  }
}

pub(crate) type ConstructFn = Arc<dyn Fn(&Arguments) -> Result<Object> + Send + Sync>;
pub(crate) type InstantiateFn = Arc<dyn Fn() -> Object + Send + Sync>;
pub(crate) type MethodFn = Arc<dyn Fn(Option<&Object>, &Arguments) -> Result<Object> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Construction {
  /// Not instantiable: interfaces, abstract classes, or nothing registered.
  None,
  /// No constructor; instantiated without arguments.
  Bare(InstantiateFn),
  Constructor {
    params: Vec<Parameter>,
    construct: ConstructFn,
  },
}

/// A method exposed to `Container::call`.
#[derive(Clone)]
pub struct Method {
  name: String,
  params: Vec<Parameter>,
  is_static: bool,
  invoke: MethodFn,
}

impl Method {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn params(&self) -> &[Parameter] {
    &self.params
  }

  pub fn is_static(&self) -> bool {
    self.is_static
  }

  pub(crate) fn invoke(&self, receiver: Option<&Object>, args: &Arguments) -> Result<Object> {
    (self.invoke)(receiver, args)
  }
}

impl fmt::Debug for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Method")
      .field("name", &self.name)
      .field("params", &self.params)
      .field("is_static", &self.is_static)
      .finish_non_exhaustive()
  }
}

/// The description of one class: its kind, how to construct it, and its methods.
#[derive(Clone)]
pub struct ClassDef {
  name: AbstractId,
  kind: ClassKind,
  type_id: Option<TypeId>,
  construction: Construction,
  methods: HashMap<String, Method>,
}

impl ClassDef {
  /// Starts describing the concrete class `name`, backed by the Rust type `T`.
  pub fn of<T: Any + Send + Sync>(name: impl Into<AbstractId>) -> ClassBuilder<T> {
    ClassBuilder {
      def: ClassDef {
        name: name.into(),
        kind: ClassKind::Concrete,
        type_id: Some(TypeId::of::<T>()),
        construction: Construction::None,
        methods: HashMap::new(),
      },
      _marker: PhantomData,
    }
  }

  /// Describes a concrete class without a constructor, built with `T::default()`.
  pub fn default_of<T: Any + Send + Sync + Default>(name: impl Into<AbstractId>) -> ClassBuilder<T> {
    Self::of::<T>(name).bare(T::default)
  }

  pub fn interface(name: impl Into<AbstractId>) -> Self {
    Self::non_instantiable(name.into(), ClassKind::Interface)
  }

  pub fn abstract_class(name: impl Into<AbstractId>) -> Self {
    Self::non_instantiable(name.into(), ClassKind::Abstract)
  }

  fn non_instantiable(name: AbstractId, kind: ClassKind) -> Self {
    Self {
      name,
      kind,
      type_id: None,
      construction: Construction::None,
      methods: HashMap::new(),
    }
  }

  pub fn name(&self) -> &AbstractId {
    &self.name
  }

  pub fn kind(&self) -> ClassKind {
    self.kind
  }

  pub fn type_id(&self) -> Option<TypeId> {
    self.type_id
  }

  pub fn is_instantiable(&self) -> bool {
    self.kind == ClassKind::Concrete && !matches!(self.construction, Construction::None)
  }

  /// The constructor's parameters, or `None` when the class has no constructor.
  pub fn constructor_params(&self) -> Option<&[Parameter]> {
    match &self.construction {
      Construction::Constructor { params, .. } => Some(params),
      _ => None,
    }
  }

  pub fn method(&self, name: &str) -> Option<&Method> {
    self.methods.get(name)
  }

  pub(crate) fn find_method(&self, name: &str) -> Result<&Method> {
    self.method(name).ok_or_else(|| ContainerError::MethodNotFound {
      class: self.name.to_string(),
      method: name.to_owned(),
    })
  }

  pub(crate) fn construction(&self) -> &Construction {
    &self.construction
  }
}

impl fmt::Debug for ClassDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut methods: Vec<_> = self.methods.keys().collect();
    methods.sort();
    f.debug_struct("ClassDef")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .field("constructor", &self.constructor_params())
      .field("methods", &methods)
      .finish()
  }
}

/// Typed builder for a concrete [`ClassDef`].
pub struct ClassBuilder<T> {
  def: ClassDef,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
  /// The class has no constructor; `instantiate` produces a fresh instance.
  pub fn bare(mut self, instantiate: impl Fn() -> T + Send + Sync + 'static) -> Self {
    self.def.construction = Construction::Bare(Arc::new(move || Arc::new(instantiate()) as Object));
    self
  }

  /// The class is constructed from the resolved values of `params`.
  pub fn constructor<F>(mut self, params: Vec<Parameter>, construct: F) -> Self
  where
    F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
  {
    self.def.construction = Construction::Constructor {
      params,
      construct: Arc::new(move |args| construct(args).map(|value| Arc::new(value) as Object)),
    };
    self
  }

  /// Exposes an instance method.
  pub fn method<R, F>(self, name: &str, params: Vec<Parameter>, method: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&T, &Arguments) -> Result<R> + Send + Sync + 'static,
  {
    let qualified = format!("{}::{}", self.def.name, name);
    let invoke: MethodFn = Arc::new(move |receiver, args| {
      let this = receiver
        .and_then(|object| object.downcast_ref::<T>())
        .ok_or_else(|| {
          ContainerError::InvalidCallTarget(format!(
            "Non-static method [{qualified}] requires an instance of {}.",
            type_name::<T>()
          ))
        })?;
      method(this, args).map(|value| Arc::new(value) as Object)
    });
    self.insert_method(name, params, false, invoke)
  }

  /// Exposes a static method.
  pub fn static_method<R, F>(self, name: &str, params: Vec<Parameter>, method: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    let invoke: MethodFn = Arc::new(move |_, args| method(args).map(|value| Arc::new(value) as Object));
    self.insert_method(name, params, true, invoke)
  }

  fn insert_method(mut self, name: &str, params: Vec<Parameter>, is_static: bool, invoke: MethodFn) -> Self {
    self.def.methods.insert(
      name.to_owned(),
      Method {
        name: name.to_owned(),
        params,
        is_static,
        invoke,
      },
    );
    self
  }

  pub fn build(self) -> ClassDef {
    self.def
  }
}

impl<T: Any + Send + Sync> From<ClassBuilder<T>> for ClassDef {
  fn from(builder: ClassBuilder<T>) -> Self {
    builder.build()
  }
}
