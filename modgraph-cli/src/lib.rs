#![doc = "Library and command line interface for the modgraph module system."]

#[cfg(feature = "cli")]
#[doc(hidden)]
pub mod cli;

mod error;
pub use error::Error;
