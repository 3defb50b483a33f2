//! Workflow graph, persistence, and compilation.
//!
//! A workflow is the mutable editing state of the builder: steps bound to
//! resolved actions, directed connections between step ports, a trigger
//! specification, and a target runner. The compiler projects that state
//! into a GitHub Actions configuration document.

mod compile;
mod persist;
mod triggers;
mod types;

pub use compile::compile;
pub use persist::WorkflowStore;
pub use triggers::*;
pub use types::{Connection, Port, Step, Workflow};
