#![doc = "Identifiers, versions, dependences, and module metadata for modgraph."]

mod checksum;
pub use checksum::{digests, Checksum};

mod dependence;
pub use dependence::{Dependence, DependenceModifier};

mod error;
pub use error::Error;

mod id;
pub use id::{ComparisonOp, ModuleId, ModuleIdQuery};

mod macros;

mod module;
pub use module::{ModuleInfo, ModuleView};

mod name;
pub use name::Name;

mod version;
pub use version::{Version, VersionComparison, VersionRequirement};
