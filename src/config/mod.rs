//! Threshold vectors, run configuration files and run identity

pub mod identity;
pub mod ini;
pub mod run_config;
pub mod vector;

pub use identity::{ContentHashIdentity, RunId, RunIdentity, SequentialIdentity};
pub use ini::IniDocument;
pub use run_config::{run_directory, DatabaseInfo, RunConfig};
pub use vector::{ConfigVector, VectorField};
