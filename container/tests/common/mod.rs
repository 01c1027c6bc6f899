#![allow(dead_code)]

use fibre_container::{ClassDef, Container, ContainerError, Parameter};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Shared Fixtures ---

pub trait Logger: Send + Sync {
  fn log(&self, line: &str) -> String;
}

#[derive(Debug)]
pub struct FileLogger {
  pub serial: usize,
}

impl Logger for FileLogger {
  fn log(&self, line: &str) -> String {
    format!("[file #{}] {}", self.serial, line)
  }
}

#[derive(Debug, Default)]
pub struct NullLogger;

#[derive(Debug)]
pub struct Database {
  pub url: String,
}

#[derive(Debug)]
pub struct UserRepository {
  pub db: Arc<Database>,
  pub logger: Arc<FileLogger>,
}

#[derive(Debug)]
pub struct Server {
  pub host: String,
  pub port: u16,
}

/// A service whose logger is optional and null by default.
#[derive(Debug)]
pub struct Reporter {
  pub logger: Option<Arc<FileLogger>>,
}

pub struct Mailer {
  pub logger: Arc<FileLogger>,
}

/// Defines the fixture classes on a fresh container. `FileLogger` instances
/// are numbered by `counter` in construction order.
pub fn app_container(counter: Arc<AtomicUsize>) -> Container {
  let container = Container::new();

  container.define(ClassDef::interface("Logger"));
  container.define(ClassDef::of::<FileLogger>("FileLogger").bare(move || FileLogger {
    serial: counter.fetch_add(1, Ordering::SeqCst),
  }));
  container.define(ClassDef::default_of::<NullLogger>("NullLogger"));

  container.define(
    ClassDef::of::<Database>("Database").constructor(
      vec![Parameter::scalar::<String>("url").default_value("sqlite::memory:".to_string())],
      |args| {
        Ok(Database {
          url: args.value("url")?,
        })
      },
    ),
  );

  container.define(ClassDef::of::<UserRepository>("UserRepository").constructor(
    vec![
      Parameter::class("db", "Database"),
      Parameter::class("logger", "Logger"),
    ],
    |args| {
      Ok(UserRepository {
        db: args.get("db")?,
        logger: args.get("logger")?,
      })
    },
  ));

  container.define(ClassDef::of::<Server>("Server").constructor(
    vec![
      Parameter::scalar::<String>("host").default_value("127.0.0.1".to_string()),
      Parameter::scalar::<u16>("port"),
    ],
    |args| {
      Ok(Server {
        host: args.value("host")?,
        port: args.value("port")?,
      })
    },
  ));

  container.define(ClassDef::of::<Reporter>("Reporter").constructor(
    vec![Parameter::class("logger", "Logger").default_null()],
    |args| {
      Ok(Reporter {
        logger: args.optional("logger")?,
      })
    },
  ));

  container.define(
    ClassDef::of::<Mailer>("Mailer")
      .constructor(vec![Parameter::class("logger", "Logger")], |args| {
        Ok(Mailer {
          logger: args.get("logger")?,
        })
      })
      .method(
        "send",
        vec![
          Parameter::scalar::<String>("to"),
          Parameter::class("db", "Database"),
          Parameter::scalar::<String>("subject").default_value("(no subject)".to_string()),
        ],
        |mailer, args| {
          let to: String = args.value("to")?;
          let subject: String = args.value("subject")?;
          let db = args.get::<Database>("db")?;
          Ok(mailer.logger.log(&format!("mail to {to} [{subject}] via {}", db.url)))
        },
      )
      .method("fail", vec![], |_, _| -> Result<(), ContainerError> {
        Err(ContainerError::custom("smtp down"))
      })
      .static_method("version", vec![], |_| Ok("1.0".to_string())),
  );

  container
}

pub fn counter() -> Arc<AtomicUsize> {
  Arc::new(AtomicUsize::new(0))
}
