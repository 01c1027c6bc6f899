mod common;

use common::{app_container, counter, Database, FileLogger, NullLogger, Reporter, Server, UserRepository};
use fibre_container::{ClassDef, Container, ContainerError, Factory, Parameter, Parameters};
use pretty_assertions::assert_eq;
use std::sync::Arc;

// --- Constructor Injection ---

#[test]
fn test_constructor_dependencies_are_resolved_recursively() {
  // Arrange
  let container = app_container(counter());
  container.singleton("Logger", "FileLogger").unwrap();

  // Act
  let repo = container.make_as::<UserRepository>("UserRepository").unwrap();

  // Assert
  assert_eq!(repo.db.url, "sqlite::memory:");
  let logger = container.make_as::<FileLogger>("Logger").unwrap();
  assert!(Arc::ptr_eq(&repo.logger, &logger));
}

#[test]
fn test_named_parameters_override_injection() {
  let container = app_container(counter());
  container.singleton("Logger", "FileLogger").unwrap();
  let db = Arc::new(Database {
    url: "postgres://db".to_string(),
  });

  let repo = container
    .make_with(
      "UserRepository",
      &Parameters::new().with_object("db", db.clone()),
    )
    .unwrap()
    .downcast::<UserRepository>()
    .unwrap();

  assert!(Arc::ptr_eq(&repo.db, &db));
}

#[test]
fn test_positional_parameters_map_by_ordinal() {
  let container = app_container(counter());

  let server = container
    .make_as_with_server(&Parameters::new().push("0.0.0.0".to_string()).push(9000_u16));

  assert_eq!(server.host, "0.0.0.0");
  assert_eq!(server.port, 9000);
}

#[test]
fn test_positional_parameter_wins_over_named() {
  let container = app_container(counter());

  let server = container.make_as_with_server(
    &Parameters::new()
      .with("port", 80_u16)
      .push("localhost".to_string())
      .push(8080_u16),
  );

  assert_eq!(server.port, 8080);
}

#[test]
fn test_scalar_defaults_fill_missing_parameters() {
  let container = app_container(counter());

  let server = container.make_as_with_server(&Parameters::new().with("port", 443_u16));

  assert_eq!(server.host, "127.0.0.1");
  assert_eq!(server.port, 443);
}

#[test]
fn test_scalar_without_default_is_unresolvable() {
  // Arrange
  let container = app_container(counter());

  // Act
  let err = container.make("Server").unwrap_err();

  // Assert
  match &err {
    ContainerError::Unresolvable { parameter, owner } => {
      assert_eq!(parameter, "port: u16");
      assert_eq!(owner, "class Server");
    }
    other => panic!("expected an unresolvable dependency, got {other:?}"),
  }
  assert_eq!(
    err.to_string(),
    "Unresolvable dependency resolving [port: u16] in class Server."
  );
}

#[test]
fn test_interface_without_binding_is_not_instantiable() {
  let container = app_container(counter());

  let err = container.make("Logger").unwrap_err();

  assert!(matches!(err, ContainerError::NotInstantiable { ref stack, .. } if stack.is_empty()));
  assert_eq!(err.to_string(), "Target [Logger] is not instantiable.");
}

#[test]
fn test_not_instantiable_error_reports_build_stack() {
  // UserRepository needs Logger, which is an unbound interface.
  let container = app_container(counter());

  let err = container.make("UserRepository").unwrap_err();

  match &err {
    ContainerError::NotInstantiable { target, stack } => {
      assert_eq!(target, "Logger");
      assert_eq!(stack, &vec!["UserRepository".to_string()]);
    }
    other => panic!("expected a non-instantiable error, got {other:?}"),
  }
  assert_eq!(
    err.to_string(),
    "Target [Logger] is not instantiable while building [UserRepository]."
  );
}

#[test]
fn test_abstract_class_is_not_instantiable() {
  let container = Container::new();
  container.define(ClassDef::abstract_class("BaseController"));

  let err = container.build("BaseController", &Parameters::new()).unwrap_err();

  assert!(matches!(err, ContainerError::NotInstantiable { .. }));
}

#[test]
fn test_concrete_class_without_construction_is_not_instantiable() {
  struct Opaque;
  let container = Container::new();
  container.define(ClassDef::of::<Opaque>("Opaque"));

  let err = container.make("Opaque").unwrap_err();

  assert!(matches!(err, ContainerError::NotInstantiable { .. }));
}

#[test]
fn test_undefined_class_is_reported() {
  let container = Container::new();

  let err = container.make("Nowhere").unwrap_err();

  assert_eq!(err.to_string(), "Target class [Nowhere] does not exist.");
}

#[test]
fn test_build_stack_is_cleared_after_failure() {
  // Arrange: a failed build must not leak its frame into the next error.
  let container = app_container(counter());
  assert!(container.make("UserRepository").is_err());

  // Act
  let err = container.make("Logger").unwrap_err();

  // Assert
  assert_eq!(err.to_string(), "Target [Logger] is not instantiable.");
}

#[test]
fn test_optional_class_parameter_falls_back_to_default() {
  // Logger is an unbound interface, so the null default kicks in.
  let container = app_container(counter());

  let reporter = container.make_as::<Reporter>("Reporter").unwrap();

  assert!(reporter.logger.is_none());
}

#[test]
fn test_optional_class_parameter_uses_binding_when_available() {
  let container = app_container(counter());
  container.singleton("Logger", "FileLogger").unwrap();

  let reporter = container.make_as::<Reporter>("Reporter").unwrap();

  assert_eq!(reporter.logger.as_ref().map(|l| l.serial), Some(0));
}

#[test]
fn test_optional_class_parameter_masks_broken_dependency_chain() {
  // Logger resolves to a class whose own constructor cannot be satisfied;
  // the optional parameter still falls back to its default.
  let container = app_container(counter());
  container.bind("Logger", "Server", false).unwrap();

  let reporter = container.make_as::<Reporter>("Reporter").unwrap();

  assert!(reporter.logger.is_none());
}

#[test]
fn test_optional_class_parameter_with_value_default() {
  struct Audit {
    sink: Arc<NullLogger>,
  }
  let container = app_container(counter());
  let fallback = NullLogger;
  container.define(ClassDef::of::<Audit>("Audit").constructor(
    vec![Parameter::class("sink", "Logger").default_value(fallback)],
    |args| Ok(Audit { sink: args.get("sink")? }),
  ));

  let audit = container.make_as::<Audit>("Audit").unwrap();
  let again = container.make_as::<Audit>("Audit").unwrap();

  // Defaults are declared once and shared by every build.
  assert!(Arc::ptr_eq(&audit.sink, &again.sink));
}

#[test]
fn test_required_class_parameter_propagates_failure() {
  let container = app_container(counter());
  container.bind("Logger", "Server", false).unwrap();

  let err = container.make("UserRepository").unwrap_err();

  match err {
    ContainerError::Unresolvable { parameter, owner } => {
      assert_eq!(parameter, "port: u16");
      assert_eq!(owner, "class Server");
    }
    other => panic!("expected an unresolvable dependency, got {other:?}"),
  }
}

#[test]
fn test_build_invokes_factory_directly() {
  let container = Container::new();
  let factory = Factory::new(|_, params| {
    Ok(params.get("n").and_then(|n| n.downcast_ref::<i32>().copied()).unwrap_or(0) * 2)
  });

  let value = container
    .build(factory, &Parameters::new().with("n", 21_i32))
    .unwrap();

  assert_eq!(*value.downcast::<i32>().unwrap(), 42);
  // `build` never touches the registry.
  assert!(container.bindings().is_empty());
}

#[test]
fn test_factory_errors_propagate() {
  let container = Container::new();
  container
    .bind(
      "flaky",
      Factory::new(|_, _| -> Result<(), ContainerError> { Err(ContainerError::custom("backend offline")) }),
      true,
    )
    .unwrap();

  let err = container.make("flaky").unwrap_err();

  assert_eq!(err.to_string(), "backend offline");
  assert!(!container.resolved("flaky"));
}

// --- Cycle Detection ---

struct Chicken;
struct Egg;

fn cyclic_container() -> Container {
  let container = Container::new();
  container.define(
    ClassDef::of::<Chicken>("Chicken").constructor(vec![Parameter::class("egg", "Egg")], |_| Ok(Chicken)),
  );
  container.define(
    ClassDef::of::<Egg>("Egg").constructor(vec![Parameter::class("chicken", "Chicken")], |_| Ok(Egg)),
  );
  container
}

#[test]
fn test_constructor_cycle_is_detected() {
  let container = cyclic_container();

  let err = container.make("Chicken").unwrap_err();

  match &err {
    ContainerError::CircularDependency { target, chain } => {
      assert_eq!(target, "Chicken");
      assert_eq!(chain, &vec!["Chicken".to_string(), "Egg".to_string(), "Chicken".to_string()]);
    }
    other => panic!("expected a circular dependency, got {other:?}"),
  }
  assert_eq!(
    err.to_string(),
    "Circular dependency detected while resolving [Chicken]: Chicken -> Egg -> Chicken."
  );
}

#[test]
fn test_cycle_is_not_masked_by_optional_default() {
  struct Hen;
  let container = cyclic_container();
  container.define(
    ClassDef::of::<Hen>("Hen").constructor(vec![Parameter::class("egg", "Egg").default_null()], |_| Ok(Hen)),
  );
  container.bind("Egg", "Hen", false).unwrap();
  container.bind("Hen", "Hen", false).unwrap();

  // Hen -> Egg (bound to Hen) -> Hen
  let err = container.make("Hen").unwrap_err();

  assert!(matches!(err, ContainerError::CircularDependency { .. }));
}

#[test]
fn test_factory_alias_cycle_is_detected() {
  let container = Container::new();
  container.bind("a", "b", false).unwrap();
  container.bind("b", "a", false).unwrap();

  let err = container.make("a").unwrap_err();

  match err {
    ContainerError::CircularDependency { chain, .. } => assert_eq!(chain, vec!["a", "b", "a"]),
    other => panic!("expected a circular dependency, got {other:?}"),
  }
}

#[test]
fn test_container_stays_usable_after_cycle() {
  let container = cyclic_container();
  assert!(container.make("Chicken").is_err());

  container.instance("Egg", Egg).unwrap();

  assert!(container.make("Chicken").is_ok());
}

// --- Helpers ---

trait ServerExt {
  fn make_as_with_server(&self, parameters: &Parameters) -> Arc<Server>;
}

impl ServerExt for Container {
  fn make_as_with_server(&self, parameters: &Parameters) -> Arc<Server> {
    self
      .make_with("Server", parameters)
      .unwrap()
      .downcast::<Server>()
      .unwrap()
  }
}
