//! Provider layer
//!
//! Declarative resource management on top of [`crate::aidbox`]: schemas,
//! the attribute bag, the planner, the per-resource handlers and the
//! lifecycle that ties them together.
//!
//! Each resource instance is handled the same way:
//! 1. its configuration is validated against the resource schema
//! 2. [`diff::plan`] compares it with the prior state
//! 3. the registered [`handler::ResourceHandler`] performs the change
//! 4. the result is written back as state

pub mod data;
pub mod diagnostic;
pub mod diff;
pub mod handler;
pub mod lifecycle;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod state;

pub use data::ResourceData;
pub use diagnostic::{Diagnostic, Severity};
pub use lifecycle::Outcome;
pub use registry::{get_data_source, get_resource, provider_schema};
pub use state::ResourceFile;
