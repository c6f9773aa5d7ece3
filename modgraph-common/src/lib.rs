#![doc = "Shared I/O errors and filesystem utilities used across modgraph's crates."]

mod error;
pub use error::Error;

mod lock;
pub use lock::{atomic_write, resolve_within, ScopedLock};
