//! Domain model: source files, targets and the build graph.

pub mod graph;
pub mod source;
pub mod target;

pub use graph::{BuildGraph, GenStep};
pub use source::{FileFormat, SourceFile};
pub use target::{AutogenConfig, CompileSettings, GenTarget, GeneratedPolicy, PolicyDecision};
