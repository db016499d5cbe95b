//! Source file metadata.
//!
//! The planner never parses file contents; it only looks at a file's
//! extension, its generator skip flags and whether an earlier build step
//! produces it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::fs::canonical_path;

/// File format class, detected from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Compilable code (.cpp, .cxx, ...)
    Source,
    /// Header (.h, .hpp, ...)
    Header,
    /// Resource description (.qrc)
    Resource,
    /// Anything else; excluded from all buckets
    Other,
}

impl FileFormat {
    /// Classify a file extension.
    pub fn from_extension(ext: &str) -> FileFormat {
        match ext {
            "c" | "cc" | "cpp" | "cxx" | "c++" | "m" | "mm" => FileFormat::Source,
            "h" | "hh" | "hpp" | "hxx" | "h++" | "hm" | "in" | "txx" => FileFormat::Header,
            "qrc" => FileFormat::Resource,
            _ => FileFormat::Other,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> FileFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(FileFormat::from_extension)
            .unwrap_or(FileFormat::Other)
    }

    /// Whether the reflection and UI tools consider this format at all.
    pub fn is_scannable(&self) -> bool {
        matches!(self, FileFormat::Source | FileFormat::Header)
    }
}

/// A source file of a target, with its generator metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// File path; canonicalized on demand
    pub path: PathBuf,

    /// Produced by an earlier build step rather than authored
    #[serde(default)]
    pub generated: bool,

    /// Skip all generators
    #[serde(default)]
    pub skip_autogen: bool,

    /// Skip the reflection tool only
    #[serde(default)]
    pub skip_moc: bool,

    /// Skip the UI tool only
    #[serde(default)]
    pub skip_uic: bool,

    /// Skip the resource tool only
    #[serde(default)]
    pub skip_rcc: bool,

    /// Per-file UI tool options (semicolon list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uic_options: Option<String>,

    /// Per-file resource tool options (semicolon list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcc_options: Option<String>,
}

impl SourceFile {
    /// Create a plain source file entry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            generated: false,
            skip_autogen: false,
            skip_moc: false,
            skip_uic: false,
            skip_rcc: false,
            uic_options: None,
            rcc_options: None,
        }
    }

    /// Mark the file as produced by an earlier build step.
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Exclude the file from all generators.
    pub fn skip_autogen(mut self) -> Self {
        self.skip_autogen = true;
        self
    }

    /// Exclude the file from the reflection tool.
    pub fn skip_moc(mut self) -> Self {
        self.skip_moc = true;
        self
    }

    /// Exclude the file from the UI tool.
    pub fn skip_uic(mut self) -> Self {
        self.skip_uic = true;
        self
    }

    /// Exclude the file from the resource tool.
    pub fn skip_rcc(mut self) -> Self {
        self.skip_rcc = true;
        self
    }

    /// Attach per-file UI tool options.
    pub fn with_uic_options(mut self, options: impl Into<String>) -> Self {
        self.uic_options = Some(options.into());
        self
    }

    /// Attach per-file resource tool options.
    pub fn with_rcc_options(mut self, options: impl Into<String>) -> Self {
        self.rcc_options = Some(options.into());
        self
    }

    /// The file's format class.
    pub fn format(&self) -> FileFormat {
        FileFormat::from_path(&self.path)
    }

    /// Absolute canonical path, symlinks resolved.
    pub fn canonical(&self) -> PathBuf {
        canonical_path(&self.path)
    }

    /// Whether the reflection tool must not process this file.
    pub fn moc_skipped(&self) -> bool {
        self.skip_autogen || self.skip_moc
    }

    /// Whether the UI tool must not process this file.
    pub fn uic_skipped(&self) -> bool {
        self.skip_autogen || self.skip_uic
    }

    /// Whether the resource tool must not process this file.
    pub fn rcc_skipped(&self) -> bool {
        self.skip_autogen || self.skip_rcc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("cpp"), FileFormat::Source);
        assert_eq!(FileFormat::from_extension("cxx"), FileFormat::Source);
        assert_eq!(FileFormat::from_extension("mm"), FileFormat::Source);
        assert_eq!(FileFormat::from_extension("h"), FileFormat::Header);
        assert_eq!(FileFormat::from_extension("hpp"), FileFormat::Header);
        assert_eq!(FileFormat::from_extension("qrc"), FileFormat::Resource);
        assert_eq!(FileFormat::from_extension("txt"), FileFormat::Other);
        assert_eq!(FileFormat::from_extension("ui"), FileFormat::Other);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("/p/main.cpp")),
            FileFormat::Source
        );
        assert_eq!(FileFormat::from_path(Path::new("Makefile")), FileFormat::Other);
    }

    #[test]
    fn test_skip_all_implies_every_tool() {
        let sf = SourceFile::new("/p/a.h").skip_autogen();
        assert!(sf.moc_skipped());
        assert!(sf.uic_skipped());
        assert!(sf.rcc_skipped());
    }

    #[test]
    fn test_skip_flags_are_independent() {
        let sf = SourceFile::new("/p/a.h").skip_moc();
        assert!(sf.moc_skipped());
        assert!(!sf.uic_skipped());
        assert!(!sf.rcc_skipped());
    }
}
