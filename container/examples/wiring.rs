//! Constructor injection against an interface, and calling a method with
//! injected arguments.

use fibre_container::{ClassDef, Container, Parameter, Parameters};
use std::sync::Arc;

trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

struct ReportService {
  logger: Arc<ConsoleLogger>,
  title: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let container = Container::new();

  container.define(ClassDef::interface("Logger"));
  container.define(ClassDef::of::<ConsoleLogger>("ConsoleLogger").bare(|| ConsoleLogger));
  container.define(
    ClassDef::of::<ReportService>("ReportService")
      .constructor(
        vec![
          Parameter::class("logger", "Logger"),
          Parameter::scalar::<String>("title").default_value("Monthly".to_string()),
        ],
        |args| {
          Ok(ReportService {
            logger: args.get("logger")?,
            title: args.value("title")?,
          })
        },
      )
      .method("generate", vec![Parameter::scalar::<u32>("pages")], |report, args| {
        let pages: u32 = args.value("pages")?;
        report.logger.log(&format!("{} report: {pages} pages", report.title));
        Ok(pages)
      }),
  );

  // The interface resolves to the console logger, built once.
  container.singleton("Logger", "ConsoleLogger")?;

  let report = container.make_with("ReportService", &Parameters::new().with("title", "Weekly".to_string()))?;
  container.call((report, "generate"), &Parameters::new().with("pages", 3_u32), None)?;

  let pages = container.call("ReportService@generate", &Parameters::new().with("pages", 12_u32), None)?;
  assert_eq!(*pages.downcast::<u32>().map_err(|_| "unexpected return type")?, 12);
  Ok(())
}
