#![doc = "Frozen resolved-configuration queries and the classloader boundary for modgraph."]

mod config;
pub use config::ModuleSystemConfig;

mod configuration;
pub use configuration::Configuration;

mod error;
pub use error::Error;

mod loader;
pub use loader::{ClassLoaderBoundary, DefaultClassLoaderBoundary};
