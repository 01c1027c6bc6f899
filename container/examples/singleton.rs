use fibre_container::{global, resolve, ClassDef};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  // --- Class Description ---
  global().define(ClassDef::of::<RequestTracker>("RequestTracker").bare(|| {
    println!("Creating RequestTracker...");
    RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    }
  }));

  // --- Registration ---
  // Built once, then served from the instance cache.
  global().singleton("singleton_tracker", "RequestTracker").unwrap();
  // Built on every resolution.
  global().bind("transient_tracker", "RequestTracker", false).unwrap();

  println!("--- Resolving Singletons ---");
  let s1 = resolve!("singleton_tracker" => RequestTracker);
  let s2 = resolve!("singleton_tracker" => RequestTracker);
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Transients ---");
  let t1 = resolve!("transient_tracker" => RequestTracker);
  let t2 = resolve!("transient_tracker" => RequestTracker);
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");
}
