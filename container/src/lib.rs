//! # Fibre Container
//!
//! A reflective, thread-safe Inversion of Control (IoC) container for Rust.
//!
//! Callers ask for "an abstract thing" by name and receive a fully wired
//! concrete instance. The container keeps a registry of bindings from abstract
//! identifiers to construction strategies, caches shared instances, and builds
//! object graphs by recursively satisfying constructor dependencies.
//!
//! ## Core Concepts
//!
//! - **Class descriptions**: Rust has no runtime reflection, so each buildable
//!   type is described once with [`ClassDef`]: its constructor parameters and
//!   the methods [`Container::call`] may invoke.
//! - **Bindings**: [`Container::bind`] maps an abstract identifier to a class,
//!   an alias, or a [`Factory`]. [`Container::singleton`] does the same with the
//!   result cached.
//! - **Resolution**: [`Container::make`] resolves an identifier. Unbound names
//!   are built directly from their class description; class-typed constructor
//!   parameters are resolved recursively.
//! - **Invocation**: [`Container::call`] invokes a function, `"Class@method"`,
//!   `"Class::method"` or `[instance, method]`, injecting what was not supplied.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_container::{ClassDef, Container, Parameter, Parameters};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, line: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct FileLogger;
//!
//! impl Logger for FileLogger {
//!     fn log(&self, line: &str) -> String {
//!         format!("file: {line}")
//!     }
//! }
//!
//! struct Mailer {
//!     logger: std::sync::Arc<FileLogger>,
//! }
//!
//! let container = Container::new();
//! container.define(ClassDef::interface("Logger"));
//! container.define(ClassDef::default_of::<FileLogger>("FileLogger"));
//! container.define(
//!     ClassDef::of::<Mailer>("Mailer")
//!         .constructor(vec![Parameter::class("logger", "Logger")], |args| {
//!             Ok(Mailer { logger: args.get("logger")? })
//!         })
//!         .method("send", vec![Parameter::scalar::<String>("to")], |mailer, args| {
//!             Ok(mailer.logger.log(&args.value::<String>("to")?))
//!         }),
//! );
//!
//! container.singleton("Logger", "FileLogger").unwrap();
//!
//! let sent = container
//!     .call("Mailer@send", &Parameters::new().with("to", "a@example.com".to_string()), None)
//!     .unwrap();
//! assert_eq!(*sent.downcast::<String>().unwrap(), "file: a@example.com");
//! ```

mod call;
mod config;
mod container;
mod core;
mod error;
mod factory;
mod global;
mod id;
mod macros;
mod reflect;
mod value;

pub use call::{CallTarget, Callable};
pub use config::{BindingConfig, BindingConfigFull, ContainerConfig, InstanceValue};
pub use container::{BindingInfo, Container};
pub use error::{ContainerError, Result};
pub use factory::{Concrete, Factory};
pub use global::{global, reset_global, set_global, try_global};
pub use id::{normalize, AbstractId};
pub use reflect::{ClassBuilder, ClassDef, ClassKind, DefaultValue, Method, ParamType, Parameter};
pub use value::{object, Arguments, Object, ParamKey, Parameters};
