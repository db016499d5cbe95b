//! Generator-facing target model.
//!
//! A GenTarget carries everything the planner reads from the build graph for
//! one target: its source list, per-configuration compile settings, declared
//! dependencies and the typed autogen configuration. Property lookups are
//! explicit struct fields with documented defaults rather than string-keyed
//! bags.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::source::SourceFile;

/// Policy for source files that are both tool-eligible and generated.
///
/// Historically generated files were silently excluded from the generators;
/// the policy provides the opt-in migration path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedPolicy {
    /// Always honor the file as eligible
    Required,
    /// Warn, then behave like `Old` (default)
    #[default]
    Warn,
    /// Silently drop the file from eligibility
    Old,
    /// Honor eligibility unconditionally
    New,
}

/// Outcome of applying a [`GeneratedPolicy`] to an eligible generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Process the file
    Accept,
    /// Drop the file silently
    Reject,
    /// Drop the file and report a warning
    RejectWithWarning,
}

impl GeneratedPolicy {
    /// Decide what to do with an eligible generated file.
    pub fn decide(&self) -> PolicyDecision {
        match self {
            GeneratedPolicy::Required | GeneratedPolicy::New => PolicyDecision::Accept,
            GeneratedPolicy::Old => PolicyDecision::Reject,
            GeneratedPolicy::Warn => PolicyDecision::RejectWithWarning,
        }
    }
}

/// Typed autogen configuration of a target.
///
/// Defaults: all tools disabled, `Warn` generated-file policy, no overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutogenConfig {
    /// Run the reflection tool over this target's sources
    #[serde(default)]
    pub moc: bool,

    /// Run the UI tool over this target's sources
    #[serde(default)]
    pub uic: bool,

    /// Run the resource tool over this target's resource files
    #[serde(default)]
    pub rcc: bool,

    /// Policy for generated tool-eligible files (configured upstream)
    #[serde(default)]
    pub policy: GeneratedPolicy,

    /// Override for the autogen build directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<PathBuf>,

    /// Target-wide reflection tool options
    #[serde(default)]
    pub moc_options: Vec<String>,

    /// Reflection macro names to scan for
    #[serde(default)]
    pub moc_macro_names: Vec<String>,

    /// Reflection dependency filters
    #[serde(default)]
    pub moc_depend_filters: Vec<String>,

    /// Relaxed include matching for the reflection tool
    #[serde(default)]
    pub moc_relaxed_mode: bool,

    /// Target-wide resource tool options
    #[serde(default)]
    pub rcc_options: Vec<String>,

    /// UI file search paths, relative to the target source dir
    #[serde(default)]
    pub uic_search_paths: Vec<String>,

    /// User-declared extra dependencies (single configuration string)
    #[serde(default)]
    pub extra_depends: String,

    /// IDE folder for the autogen step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Link-propagated major version override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qt_major_override: Option<String>,

    /// Link-propagated minor version override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qt_minor_override: Option<String>,
}

/// Per-configuration compile settings of a target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileSettings {
    /// Include directories, in declared order
    #[serde(default)]
    pub include_dirs: Vec<String>,

    /// Preprocessor defines
    #[serde(default)]
    pub defines: Vec<String>,

    /// UI tool options for this configuration
    #[serde(default)]
    pub uic_options: Vec<String>,
}

/// A build target as seen by the generator planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenTarget {
    /// Target name
    pub name: String,

    /// Directory the target's sources live in
    pub source_dir: PathBuf,

    /// Directory the target builds into
    pub binary_dir: PathBuf,

    /// Declared source list with per-file metadata
    #[serde(default)]
    pub sources: Vec<SourceFile>,

    /// Autogen configuration
    #[serde(default)]
    pub autogen: AutogenConfig,

    /// Declared link libraries (names; may be external)
    #[serde(default)]
    pub link_libraries: Vec<String>,

    /// Declared utility dependencies
    #[serde(default)]
    pub utilities: Vec<String>,

    /// Include directories added by planning (e.g. the autogen include dir)
    #[serde(default)]
    pub extra_include_dirs: Vec<PathBuf>,

    /// Settings used when a configuration has no dedicated entry
    #[serde(default)]
    default_settings: CompileSettings,

    /// Per-configuration settings overrides
    #[serde(default)]
    config_settings: BTreeMap<String, CompileSettings>,
}

impl GenTarget {
    /// Create a target with empty sources and default configuration.
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
    ) -> Self {
        GenTarget {
            name: name.into(),
            source_dir: source_dir.into(),
            binary_dir: binary_dir.into(),
            sources: Vec::new(),
            autogen: AutogenConfig::default(),
            link_libraries: Vec::new(),
            utilities: Vec::new(),
            extra_include_dirs: Vec::new(),
            default_settings: CompileSettings::default(),
            config_settings: BTreeMap::new(),
        }
    }

    /// Set the settings used for configurations without a dedicated entry.
    pub fn set_default_settings(&mut self, settings: CompileSettings) {
        self.default_settings = settings;
    }

    /// Set dedicated settings for one configuration.
    pub fn set_config_settings(&mut self, config: impl Into<String>, settings: CompileSettings) {
        self.config_settings.insert(config.into(), settings);
    }

    /// Settings for a configuration, falling back to the default entry.
    pub fn settings_for(&self, config: &str) -> &CompileSettings {
        if config.is_empty() {
            return &self.default_settings;
        }
        self.config_settings
            .get(config)
            .unwrap_or(&self.default_settings)
    }

    /// Name of this target's autogen step.
    pub fn autogen_step_name(&self) -> String {
        format!("{}_autogen", self.name)
    }

    /// Directory the generators write their outputs into.
    pub fn autogen_build_dir(&self) -> PathBuf {
        match &self.autogen.build_dir {
            Some(dir) => dir.clone(),
            None => self.binary_dir.join(self.autogen_step_name()),
        }
    }

    /// Directory holding the descriptor and per-run bookkeeping files.
    pub fn autogen_files_dir(&self) -> PathBuf {
        self.binary_dir
            .join(".genplan")
            .join(format!("{}.dir", self.autogen_step_name()))
    }
}
