use fibre_container::{global, reset_global, set_global, try_global, Container};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_global_is_created_lazily_and_reused() {
  // Arrange
  reset_global();
  assert!(try_global().is_none());

  // Act
  let first = global();
  let second = global();

  // Assert
  assert!(Arc::ptr_eq(&first, &second));
  assert!(try_global().is_some());
}

#[test]
#[serial]
fn test_set_global_replaces_the_holder() {
  // Arrange
  reset_global();
  let previous = global();
  previous.instance("marker", "old").unwrap();
  let replacement = Arc::new(Container::new());
  replacement.instance("marker", "new").unwrap();

  // Act
  let returned = set_global(Arc::clone(&replacement));

  // Assert
  assert!(Arc::ptr_eq(returned.as_ref().unwrap(), &previous));
  assert!(Arc::ptr_eq(&global(), &replacement));
  assert_eq!(*global().make_as::<&str>("marker").unwrap(), "new");
}

#[test]
#[serial]
fn test_reset_global_starts_fresh() {
  reset_global();
  global().singleton_self("counter").unwrap();
  global().instance("counter", 7_u32).unwrap();

  let old = reset_global();

  assert!(old.is_some_and(|container| container.bound("counter")));
  assert!(!global().bound("counter"));
}

#[test]
#[serial]
fn test_global_is_shared_across_threads() {
  reset_global();
  global().instance("shared.value", 99_i32).unwrap();

  let seen = std::thread::spawn(|| *global().make_as::<i32>("shared.value").unwrap())
    .join()
    .unwrap();

  assert_eq!(seen, 99);
}
