#![doc = "Context partitioning and cross-context package linking for modgraph module graphs."]

mod builder;
pub use builder::{build_contexts, ContextGraph};

mod class_manifest;
pub use class_manifest::ClassManifest;

mod context;
pub use context::{Context, ContextId};

mod error;
pub use error::Error;

mod linker;
pub use linker::{link, link_graph};
