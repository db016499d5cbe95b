//! Genplan - planning stage for build-time code generators.
//!
//! Given a target's declared source list and per-configuration build
//! settings, the planner decides which files require processing by which
//! generator tool (reflection, UI, resource packing), resolves versioned
//! tool executables, computes the dependencies of the generated outputs and
//! emits a persisted descriptor for the execution stage that invokes the
//! tools at build time.

pub mod core;
pub mod planner;
pub mod util;

pub use crate::core::{
    AutogenConfig, BuildGraph, CompileSettings, FileFormat, GenStep, GenTarget, GeneratedPolicy,
    SourceFile,
};
pub use crate::planner::emit::{emit_plan, EmitError};
pub use crate::planner::tools::{QtMajor, ToolKind, ToolResolveError};
pub use crate::planner::{plan_target, Plan, PlanSession, ResourceLister};
