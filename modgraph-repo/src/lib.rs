#![doc = "Repository stream catalog for published modgraph module files."]

mod catalog_file;
pub use catalog_file::StreamCatalog;

mod entry;
pub use entry::RepoEntry;

mod error;
pub use error::Error;

mod repository;
pub use repository::Repository;

mod validation;
pub use validation::ValidationReport;

mod wire;
