#![doc = "Catalog abstraction, module descriptor text format, and writable library for modgraph."]

mod catalog;
pub use catalog::{Catalog, CompositeChain, RemoteCatalog};

pub mod descriptor;

mod error;
pub use error::Error;

mod library;
pub use library::Library;
