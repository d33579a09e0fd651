//! Rule policy resolution: catalog lookup, layer flattening, and per-file folding.

pub mod catalog;
pub mod environments;
pub mod matcher;
pub mod merge;
pub mod resolver;

pub use catalog::Catalog;
pub use resolver::{resolve, CompiledPolicy, LayerSource, ResolvedPolicy};
