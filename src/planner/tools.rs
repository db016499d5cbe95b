//! Generator tool identity and versioned executable resolution.
//!
//! Tools are located through conventionally named import targets in the
//! build graph (`Qt5::moc`, `Qt4::rcc`, ...). Resolution failures are
//! non-fatal to planning; the plan still emits with an empty executable
//! path and the failure surfaces as a configure-time diagnostic.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::{BuildGraph, GenTarget};

/// The three generator tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Reflection tool: scans code/headers for annotated declarations
    Moc,
    /// UI tool: compiles declarative UI descriptions into code
    Uic,
    /// Resource tool: bundles resource inputs into a translation unit
    Rcc,
}

impl ToolKind {
    /// Lower-case tool name, as used in import target names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Moc => "moc",
            ToolKind::Uic => "uic",
            ToolKind::Rcc => "rcc",
        }
    }

    /// Feature name used in diagnostics.
    pub fn feature(&self) -> &'static str {
        match self {
            ToolKind::Moc => "AUTOMOC",
            ToolKind::Uic => "AUTOUIC",
            ToolKind::Rcc => "AUTORCC",
        }
    }

    /// Conventional import target name for a major version.
    pub fn import_target(&self, major: QtMajor) -> String {
        format!("Qt{}::{}", major.as_str(), self.as_str())
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported tool generations.
///
/// Anything else is rejected explicitly instead of falling through to a
/// generic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QtMajor {
    V4,
    V5,
}

impl QtMajor {
    /// Parse a requested major version string.
    pub fn parse(version: &str) -> Option<QtMajor> {
        match version {
            "4" => Some(QtMajor::V4),
            "5" => Some(QtMajor::V5),
            _ => None,
        }
    }

    /// The version digit as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            QtMajor::V4 => "4",
            QtMajor::V5 => "5",
        }
    }

    /// Whether this is the newer generation with double-dash long options.
    pub fn is_v5(&self) -> bool {
        matches!(self, QtMajor::V5)
    }
}

/// Tool resolution failure.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
pub enum ToolResolveError {
    /// The expected import target does not exist in the build graph.
    #[error("{feature}: {import} target not found ({target})")]
    #[diagnostic(code(genplan::tools::import_target_missing))]
    ImportMissing {
        feature: String,
        import: String,
        target: String,
    },

    /// The requested major version is not supported.
    #[error("the {feature} feature supports only Qt 4 and Qt 5, got version \"{version}\" ({target})")]
    #[diagnostic(code(genplan::tools::unsupported_version))]
    UnsupportedVersion {
        feature: String,
        version: String,
        target: String,
    },
}

/// Resolve the executable for a tool at a requested major version.
pub fn resolve_tool(
    graph: &BuildGraph,
    kind: ToolKind,
    version: &str,
    target_name: &str,
) -> Result<PathBuf, ToolResolveError> {
    let Some(major) = QtMajor::parse(version) else {
        return Err(ToolResolveError::UnsupportedVersion {
            feature: kind.feature().to_string(),
            version: version.to_string(),
            target: target_name.to_string(),
        });
    };

    let import = kind.import_target(major);
    match graph.imported_location(&import) {
        Some(path) => Ok(path.to_path_buf()),
        None => Err(ToolResolveError::ImportMissing {
            feature: kind.feature().to_string(),
            import,
            target: target_name.to_string(),
        }),
    }
}

/// Detect the major tool generation for a target.
///
/// A link-dependency-propagated override wins over the project-wide
/// definitions.
pub fn qt_major_version(graph: &BuildGraph, target: &GenTarget) -> String {
    let mut major = graph.safe_definition("QT_VERSION_MAJOR").to_string();
    if major.is_empty() {
        major = graph.safe_definition("Qt5Core_VERSION_MAJOR").to_string();
    }
    if let Some(override_) = &target.autogen.qt_major_override {
        major = override_.clone();
    }
    major
}

/// Detect the minor tool version for a target.
pub fn qt_minor_version(graph: &BuildGraph, target: &GenTarget, major: &str) -> String {
    let mut minor = String::new();
    if major == "5" {
        minor = graph.safe_definition("Qt5Core_VERSION_MINOR").to_string();
    }
    if minor.is_empty() {
        minor = graph.safe_definition("QT_VERSION_MINOR").to_string();
    }
    if let Some(override_) = &target.autogen.qt_minor_override {
        minor = override_.clone();
    }
    minor
}

/// Numeric greater-or-equal comparison of version strings.
///
/// Non-numeric components compare false.
pub fn version_at_least(major: &str, minor: &str, req_major: u32, req_minor: u32) -> bool {
    match (major.parse::<u32>(), minor.parse::<u32>()) {
        (Ok(ma), Ok(mi)) => ma > req_major || (ma == req_major && mi >= req_minor),
        _ => false,
    }
}
