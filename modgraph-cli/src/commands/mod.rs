//! The implementation behind each `modgraph` subcommand.

mod catalog;
pub use catalog::catalog;

mod inspect;
pub use inspect::inspect;

mod pack;
pub use pack::pack;

mod resolve;
pub use resolve::resolve;

mod verify;
pub use verify::verify;
