//! Layered lint rule policies.
//!
//! A [`Descriptor`](descriptor::Descriptor) names presets, local rule
//! entries, ignore patterns and file-pattern overrides. Compiling it against a
//! [`Catalog`](policy::Catalog) locates everything it references; the
//! resulting [`CompiledPolicy`](policy::CompiledPolicy) then resolves the
//! effective rules for any file path.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod policy;
pub mod scan;

pub use error::ConfigError;
