#![doc = "Dependence resolution: turns root module queries into a concrete module graph."]

mod error;
pub use error::Error;

mod location;
pub use location::Location;

mod resolution;
pub use resolution::Resolution;

mod resolver;
pub use resolver::resolve;
