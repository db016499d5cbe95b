//! Build-graph model.
//!
//! The planner's view of the surrounding build system: known targets,
//! imported tool locations, project-wide definitions, declared build
//! configurations, and the registration sinks the emitter writes into
//! (generated sources, steps, clean files, reconfigure triggers).
//!
//! The per-target source list is memoized here. The planner must invalidate
//! it right after consuming it so a subsequently planned target that shares
//! object-library sources observes the just-added generated outputs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::core::source::SourceFile;
use crate::core::target::GenTarget;

/// A build step registered by the planner.
///
/// The execution stage turns this into a custom command or target; the
/// planner only records inputs, outputs and the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenStep {
    /// Step name, conventionally `<target>_autogen`
    pub name: String,

    /// Human-readable description of what the step runs
    pub comment: String,

    /// Working directory (the target's binary directory)
    pub working_dir: PathBuf,

    /// Paths and target names the step depends on
    pub inputs: Vec<String>,

    /// Generated files the step provides
    pub outputs: Vec<PathBuf>,

    /// IDE folder, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// The build graph the planner reads from and registers into.
#[derive(Debug, Default)]
pub struct BuildGraph {
    multi_config: bool,
    configurations: Vec<String>,
    build_type: String,
    definitions: BTreeMap<String, String>,
    global_properties: BTreeMap<String, String>,
    imported_locations: BTreeMap<String, PathBuf>,
    targets: BTreeMap<String, GenTarget>,
    known: BTreeSet<String>,
    steps: Vec<GenStep>,
    dependencies: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
    clean_files: Vec<PathBuf>,
    reconfigure_files: Vec<PathBuf>,
    source_groups: BTreeMap<String, Vec<PathBuf>>,
    source_cache: HashMap<String, Vec<SourceFile>>,
    extra_sources: HashMap<String, Vec<SourceFile>>,
}

impl BuildGraph {
    /// Create a single-configuration graph.
    pub fn new() -> Self {
        BuildGraph::default()
    }

    /// Create a multi-configuration graph with the declared configurations.
    pub fn with_configurations(configurations: Vec<String>) -> Self {
        BuildGraph {
            multi_config: true,
            configurations,
            ..BuildGraph::default()
        }
    }

    /// Whether the active generator keeps several configurations at once.
    pub fn is_multi_config(&self) -> bool {
        self.multi_config
    }

    /// Set the single-configuration build type (e.g. "Debug").
    pub fn set_build_type(&mut self, build_type: impl Into<String>) {
        self.build_type = build_type.into();
    }

    /// The configuration used for default (non-suffixed) output.
    ///
    /// Empty in multi-configuration mode; the build type otherwise.
    pub fn baseline_configuration(&self) -> &str {
        if self.multi_config {
            ""
        } else {
            &self.build_type
        }
    }

    /// All declared configurations, with an empty one on demand.
    pub fn configurations(&self) -> Vec<String> {
        if self.configurations.is_empty() {
            vec![String::new()]
        } else {
            self.configurations.clone()
        }
    }

    /// Per-configuration file suffixes (`_<config>`), or a single empty
    /// suffix outside multi-configuration mode.
    pub fn config_suffixes(&self) -> Vec<String> {
        let mut suffixes: Vec<String> = Vec::new();
        if self.multi_config {
            suffixes = self
                .configurations
                .iter()
                .map(|c| format!("_{}", c))
                .collect();
        }
        if suffixes.is_empty() {
            suffixes.push(String::new());
        }
        suffixes
    }

    /// Add a project-wide definition.
    pub fn add_definition(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.definitions.insert(key.into(), value.into());
    }

    /// Look up a project-wide definition.
    pub fn definition(&self, key: &str) -> Option<&str> {
        self.definitions.get(key).map(String::as_str)
    }

    /// Look up a definition, defaulting to the empty string.
    pub fn safe_definition(&self, key: &str) -> &str {
        self.definition(key).unwrap_or("")
    }

    /// Set a global property (source group names, folder conventions).
    pub fn set_global_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.global_properties.insert(key.into(), value.into());
    }

    /// Look up a global property.
    pub fn global_property(&self, key: &str) -> Option<&str> {
        self.global_properties.get(key).map(String::as_str)
    }

    /// Register an imported target's resolved location (e.g. `Qt5::moc`).
    pub fn add_imported_location(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let name = name.into();
        self.known.insert(name.clone());
        self.imported_locations.insert(name, path.into());
    }

    /// Resolved location of an imported target.
    pub fn imported_location(&self, name: &str) -> Option<&Path> {
        self.imported_locations.get(name).map(PathBuf::as_path)
    }

    /// Add a target to the graph.
    pub fn add_target(&mut self, target: GenTarget) {
        self.known.insert(target.name.clone());
        self.ensure_node(&target.name);
        self.targets.insert(target.name.clone(), target);
    }

    /// Register a target name without generator metadata (libraries,
    /// utilities). Needed so dependency filtering can tell build-graph
    /// targets from external library names.
    pub fn add_known_target(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.ensure_node(&name);
        self.known.insert(name);
    }

    /// Whether a name resolves to a real build-graph target.
    pub fn find_target(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Borrow a target.
    pub fn target(&self, name: &str) -> Option<&GenTarget> {
        self.targets.get(name)
    }

    /// Mutably borrow a target.
    pub fn target_mut(&mut self, name: &str) -> Option<&mut GenTarget> {
        self.targets.get_mut(name)
    }

    /// The target's full source list, generated additions included.
    ///
    /// Memoized per target until [`BuildGraph::clear_source_cache`] is
    /// called.
    pub fn sources(&mut self, name: &str) -> Vec<SourceFile> {
        if let Some(cached) = self.source_cache.get(name) {
            return cached.clone();
        }
        let mut list = self
            .targets
            .get(name)
            .map(|t| t.sources.clone())
            .unwrap_or_default();
        if let Some(extra) = self.extra_sources.get(name) {
            list.extend(extra.iter().cloned());
        }
        self.source_cache.insert(name.to_string(), list.clone());
        list
    }

    /// Drop the memoized source list for a target.
    pub fn clear_source_cache(&mut self, name: &str) {
        self.source_cache.remove(name);
    }

    /// Register a generated source file on a target.
    ///
    /// The file carries the generated marker and the skip-all-generators
    /// marker so planning never recursively processes its own outputs.
    pub fn add_generated_source(&mut self, target_name: &str, path: &Path) {
        let file = SourceFile::new(path).generated().skip_autogen();
        self.extra_sources
            .entry(target_name.to_string())
            .or_default()
            .push(file);
    }

    /// Attach a file to a named source group.
    pub fn add_group_file(&mut self, group: &str, file: PathBuf) {
        self.source_groups
            .entry(group.to_string())
            .or_default()
            .push(file);
    }

    /// Files attached to a source group.
    pub fn group_files(&self, group: &str) -> Option<&[PathBuf]> {
        self.source_groups.get(group).map(Vec::as_slice)
    }

    /// Register a build step.
    pub fn add_step(&mut self, step: GenStep) {
        self.ensure_node(&step.name);
        self.steps.push(step);
    }

    /// All registered steps.
    pub fn steps(&self) -> &[GenStep] {
        &self.steps
    }

    /// Record that `from` must be built after `to`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        if self.dependencies.find_edge(a, b).is_none() {
            self.dependencies.add_edge(a, b, ());
        }
    }

    /// Whether a dependency edge exists.
    pub fn depends_on(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(&a), Some(&b)) => self.dependencies.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Register a file to delete on a full clean.
    pub fn add_clean_file(&mut self, path: PathBuf) {
        self.clean_files.push(path);
    }

    /// All registered clean files.
    pub fn clean_files(&self) -> &[PathBuf] {
        &self.clean_files
    }

    /// Register a file whose change must trigger a reconfiguration.
    pub fn add_reconfigure_file(&mut self, path: PathBuf) {
        self.reconfigure_files.push(path);
    }

    /// All registered reconfigure triggers.
    pub fn reconfigure_files(&self) -> &[PathBuf] {
        &self.reconfigure_files
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }
        let idx = self.dependencies.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }
}
