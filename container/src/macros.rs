//! Public macros for ergonomic service resolution.

/// Resolves a service from the global container.
///
/// `resolve!(id)` yields the type-erased object, `resolve!(id => Type)` the
/// downcast `Arc<Type>`.
///
/// # Panics
///
/// Panics if the service cannot be resolved. For a non-panicking version,
/// use [`maybe_resolve!`] or `global().make(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_container::{global, resolve};
///
/// global().instance("greeting", String::from("hello")).unwrap();
///
/// let message = resolve!("greeting" => String);
/// assert_eq!(*message, "hello");
/// ```
#[macro_export]
macro_rules! resolve {
  ($abstract:expr => $type:ty) => {
    $crate::resolve_from!(&*$crate::global(), $abstract => $type)
  };

  ($abstract:expr) => {
    $crate::resolve_from!(&*$crate::global(), $abstract)
  };
}

/// Resolves a service from the given container, panicking on failure.
#[macro_export]
macro_rules! resolve_from {
  ($container:expr, $abstract:expr => $type:ty) => {{
    let abstract_id = $crate::AbstractId::from($abstract);
    $container
      .make_as::<$type>(&abstract_id)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service [{}] as {}: {}",
          abstract_id,
          std::any::type_name::<$type>(),
          err
        )
      })
  }};

  ($container:expr, $abstract:expr) => {{
    let abstract_id = $crate::AbstractId::from($abstract);
    $container
      .make(&abstract_id)
      .unwrap_or_else(|err| panic!("Failed to resolve required service [{}]: {}", abstract_id, err))
  }};
}

/// Resolves a service from the global container, returning `None` on failure.
#[macro_export]
macro_rules! maybe_resolve {
  ($abstract:expr => $type:ty) => {
    $crate::maybe_resolve_from!(&*$crate::global(), $abstract => $type)
  };

  ($abstract:expr) => {
    $crate::maybe_resolve_from!(&*$crate::global(), $abstract)
  };
}

/// Resolves a service from the given container, returning `None` on failure.
#[macro_export]
macro_rules! maybe_resolve_from {
  ($container:expr, $abstract:expr => $type:ty) => {
    $container.make_as::<$type>($abstract).ok()
  };

  ($container:expr, $abstract:expr) => {
    $container.make($abstract).ok()
  };
}
