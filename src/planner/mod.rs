//! Code-generation planning.
//!
//! A [`Plan`] is built fresh once per target per planning invocation, never
//! mutated after being handed to the emitter, and has no existence beyond
//! that call. The stages run in strict sequence: classification feeds tool
//! resolution, configuration diffing and option merging; the dependency
//! builder consumes classifier output plus build-graph queries; emission
//! runs last.

pub mod classify;
pub mod config_diff;
pub mod deps;
pub mod descriptor;
pub mod emit;
pub mod options;
pub mod tools;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{BuildGraph, GenTarget};
use crate::util::fs::collapse_path;
use crate::util::hash::path_checksum;
use crate::util::list::{expand_list, to_sub_list};
use crate::util::Diagnostic;

use self::descriptor::Descriptor;
use self::tools::{ToolKind, ToolResolveError};

/// External collaborator that lists a resource-description file's declared
/// content inputs.
///
/// Planning never parses resource files itself.
pub trait ResourceLister {
    /// List the input files declared by `resource`.
    fn list_inputs(&self, rcc_executable: &Path, resource: &Path) -> Result<Vec<PathBuf>>;
}

/// Accumulates diagnostics across one planning invocation.
///
/// Non-fatal problems are collected here instead of aborting, so a single
/// misconfigured target does not block planning of the rest of the project.
#[derive(Debug, Default)]
pub struct PlanSession {
    /// All diagnostics, in the order they occurred
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanSession {
    /// Create an empty session.
    pub fn new() -> Self {
        PlanSession::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an error diagnostic from a message.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::error(message));
    }

    /// Whether any error-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::util::diagnostic::Severity::Error)
    }

    /// Warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == crate::util::diagnostic::Severity::Warning)
    }
}

/// Reflection tool portion of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MocPlan {
    /// Resolved executable; empty when resolution failed
    pub executable: PathBuf,
    /// Files the tool must not process
    pub skip: Vec<PathBuf>,
    /// Baseline include directories, canonically joined
    pub includes: String,
    /// Baseline preprocessor defines, canonically joined
    pub defines: String,
    /// Target-wide tool options
    pub options: Vec<String>,
    /// Relaxed include matching
    pub relaxed_mode: bool,
    /// Macro names to scan for
    pub macro_names: Vec<String>,
    /// Dependency filters
    pub depend_filters: Vec<String>,
    /// Compiler predefines command (tool generation 5.8 and newer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefs_cmd: Option<String>,
    /// Per-configuration include overrides (diffs against baseline)
    pub config_includes: BTreeMap<String, String>,
    /// Per-configuration define overrides (diffs against baseline)
    pub config_defines: BTreeMap<String, String>,
}

/// UI tool portion of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UicPlan {
    /// Resolved executable; empty when resolution failed or the version-5
    /// binding is simply absent
    pub executable: PathBuf,
    /// Files the tool must not process
    pub skip: Vec<PathBuf>,
    /// Baseline target-wide options, canonically joined
    pub target_options: String,
    /// Per-configuration option overrides (diffs against baseline)
    pub config_options: BTreeMap<String, String>,
    /// UI file search paths, absolute
    pub search_paths: Vec<PathBuf>,
    /// Files carrying per-file options
    pub file_files: Vec<PathBuf>,
    /// Option strings parallel to `file_files`, sub-separator encoded
    pub file_options: Vec<String>,
}

/// Resource tool portion of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RccPlan {
    /// Resolved executable; empty when resolution failed
    pub executable: PathBuf,
    /// Resource files to pack
    pub resources: Vec<ResourcePlan>,
}

/// One resource-description file in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// Canonical path of the resource file
    pub path: PathBuf,
    /// Produced by an earlier build step
    pub generated: bool,
    /// Merged target and file options
    pub options: Vec<String>,
    /// Declared content inputs; empty for generated resource files
    pub inputs: Vec<PathBuf>,
    /// Generated translation unit this file packs into
    pub output: PathBuf,
}

/// The complete, immutable plan for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Target the plan belongs to
    pub target: String,
    /// Name of the registered autogen step
    pub step_name: String,
    /// Human-readable step description
    pub comment: String,
    /// Detected major tool generation (may be empty)
    pub qt_version_major: String,
    /// Directory the generators write into
    pub build_dir: PathBuf,
    /// Step working directory (the target's binary dir)
    pub working_dir: PathBuf,
    /// Where the descriptor is persisted
    pub descriptor_path: PathBuf,
    /// Compilable code eligible for the reflection/UI tools
    pub sources: Vec<PathBuf>,
    /// Headers eligible for the reflection/UI tools
    pub headers: Vec<PathBuf>,
    /// Configuration name to file-suffix map; empty outside
    /// multi-configuration mode
    pub config_suffixes: BTreeMap<String, String>,
    /// Reflection tool plan, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moc: Option<MocPlan>,
    /// UI tool plan, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uic: Option<UicPlan>,
    /// Resource tool plan, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcc: Option<RccPlan>,
    /// Everything the autogen step depends on
    pub depends: Vec<String>,
    /// Generated files the autogen step provides
    pub provides: Vec<PathBuf>,
}

impl Plan {
    /// Render the plan as its persisted descriptor.
    pub fn descriptor(&self) -> Descriptor {
        emit::compose_descriptor(self)
    }
}

/// Plan code generation for one target.
///
/// Tool resolution and resource listing failures surface as diagnostics on
/// the session and leave the affected fields empty; only an unknown target
/// is an error here.
pub fn plan_target(
    graph: &mut BuildGraph,
    lister: &dyn ResourceLister,
    target_name: &str,
    session: &mut PlanSession,
) -> Result<Plan> {
    let Some(target) = graph.target(target_name).cloned() else {
        bail!("autogen planning requested for unknown target: {target_name}");
    };
    let cfg = target.autogen.clone();
    debug!(
        "planning code generation for target {} (moc={} uic={} rcc={})",
        target_name, cfg.moc, cfg.uic, cfg.rcc
    );

    let baseline = graph.baseline_configuration().to_string();
    let configs = graph.configurations();

    // Read the memoized source list, then invalidate it immediately:
    // co-dependent targets planned later must observe the generated
    // outputs registered by the emitter.
    let files = graph.sources(target_name);
    graph.clear_source_cache(target_name);

    let scan = classify::acquire_scan_files(
        &files,
        cfg.moc,
        cfg.uic,
        cfg.policy,
        &mut session.diagnostics,
    );
    let generated_sources = classify::generated_scan_sources(&files, cfg.moc, cfg.uic);
    let resource_files = classify::eligible_resources(&files, cfg.rcc);

    let qt_major = tools::qt_major_version(graph, &target);
    let qt_minor = tools::qt_minor_version(graph, &target, &qt_major);

    let build_dir = target.autogen_build_dir();
    let descriptor_path = target.autogen_files_dir().join("autogen_info.txt");

    let (base_settings, diffs) = config_diff::diff_configs(&target, &baseline, &configs);

    let moc = if cfg.moc {
        let executable = match tools::resolve_tool(graph, ToolKind::Moc, &qt_major, target_name) {
            Ok(path) => path,
            Err(err) => {
                session.error(err.to_string());
                PathBuf::new()
            }
        };
        let predefs_cmd = tools::version_at_least(&qt_major, &qt_minor, 5, 8)
            .then(|| graph.safe_definition("CXX_COMPILER_PREDEFINES_COMMAND").to_string());
        Some(MocPlan {
            executable,
            skip: scan.moc_skip.clone().into_vec(),
            includes: base_settings.moc_includes.clone(),
            defines: base_settings.moc_defines.clone(),
            options: cfg.moc_options.clone(),
            relaxed_mode: cfg.moc_relaxed_mode,
            macro_names: cfg.moc_macro_names.clone(),
            depend_filters: cfg.moc_depend_filters.clone(),
            predefs_cmd,
            config_includes: diffs.moc_includes.clone(),
            config_defines: diffs.moc_defines.clone(),
        })
    } else {
        None
    };

    let uic = if cfg.uic {
        let executable = match tools::resolve_tool(graph, ToolKind::Uic, &qt_major, target_name) {
            Ok(path) => path,
            // A project without widgets has no version-5 uic binding; the
            // executable stays empty without a diagnostic.
            Err(ToolResolveError::ImportMissing { .. }) if qt_major == "5" => PathBuf::new(),
            Err(err) => {
                session.error(err.to_string());
                PathBuf::new()
            }
        };
        let search_paths = cfg
            .uic_search_paths
            .iter()
            .map(|p| collapse_path(p, &target.source_dir))
            .collect();

        let mut file_files = Vec::new();
        let mut file_options = Vec::new();
        for file in &files {
            let Some(opts) = &file.uic_options else {
                continue;
            };
            if file.uic_skipped() {
                continue;
            }
            file_files.push(file.canonical());
            file_options.push(to_sub_list(opts));
        }

        Some(UicPlan {
            executable,
            skip: scan.uic_skip.clone().into_vec(),
            target_options: base_settings.uic_options.clone(),
            config_options: diffs.uic_options.clone(),
            search_paths,
            file_files,
            file_options,
        })
    } else {
        None
    };

    let rcc = if cfg.rcc {
        let executable = match tools::resolve_tool(graph, ToolKind::Rcc, &qt_major, target_name) {
            Ok(path) => path,
            Err(err) => {
                session.error(err.to_string());
                PathBuf::new()
            }
        };
        let v5 = qt_major == "5";
        let mut resources = Vec::new();
        for file in &resource_files {
            let mut merged = cfg.rcc_options.clone();
            if let Some(file_opts) = &file.rcc_options {
                options::merge_options(&mut merged, &expand_list(file_opts), v5);
            }
            // Content inputs are listed only for non-generated resource
            // files; a generated one does not exist at configure time.
            let inputs = if file.generated {
                Vec::new()
            } else {
                match lister.list_inputs(&executable, &file.path) {
                    Ok(inputs) => inputs,
                    Err(err) => {
                        session.push(
                            Diagnostic::error(format!("{err:#}"))
                                .with_location(file.path.clone()),
                        );
                        Vec::new()
                    }
                }
            };
            let fragment = path_checksum(&target.source_dir, &file.path);
            let stem = file
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("resource");
            let output = build_dir.join(fragment).join(format!("qrc_{stem}.cpp"));
            resources.push(ResourcePlan {
                path: file.path.clone(),
                generated: file.generated,
                options: merged,
                inputs,
                output,
            });
        }
        Some(RccPlan {
            executable,
            resources,
        })
    } else {
        None
    };

    let mut provides: Vec<PathBuf> = Vec::new();
    if moc.is_some() {
        provides.push(build_dir.join("mocs_compilation.cpp"));
    }
    if let Some(rcc_plan) = &rcc {
        provides.extend(rcc_plan.resources.iter().map(|r| r.output.clone()));
    }

    let empty = Vec::new();
    let resource_plans = rcc.as_ref().map(|r| &r.resources).unwrap_or(&empty);
    let depends =
        deps::build_dependency_set(graph, &target, &generated_sources, resource_plans).into_vec();

    let config_suffixes = if graph.is_multi_config() {
        configs
            .iter()
            .map(|c| (c.clone(), format!("_{c}")))
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(Plan {
        target: target.name.clone(),
        step_name: target.autogen_step_name(),
        comment: compose_comment(&target, cfg.moc, cfg.uic, cfg.rcc),
        qt_version_major: qt_major,
        build_dir,
        working_dir: target.binary_dir.clone(),
        descriptor_path,
        sources: scan.sources.into_vec(),
        headers: scan.headers.into_vec(),
        config_suffixes,
        moc,
        uic,
        rcc,
        depends,
        provides,
    })
}

/// Compose the step description, e.g. "Automatic MOC and UIC for target x".
fn compose_comment(target: &GenTarget, moc: bool, uic: bool, rcc: bool) -> String {
    let mut names: Vec<&str> = Vec::new();
    if moc {
        names.push("MOC");
    }
    if uic {
        names.push("UIC");
    }
    if rcc {
        names.push("RCC");
    }
    let tools = match names.len() {
        0 => "code generation".to_string(),
        1 => names[0].to_string(),
        n => format!("{} and {}", names[..n - 1].join(", "), names[n - 1]),
    };
    format!("Automatic {} for target {}", tools, target.name)
}
