//! Source classification.
//!
//! Partitions a target's source list into the buckets the generators care
//! about: compilable code and headers for the reflection/UI tools, resource
//! descriptions for the resource tool, plus the per-tool skip lists.

use std::path::PathBuf;

use tracing::debug;

use crate::core::{FileFormat, GeneratedPolicy, PolicyDecision, SourceFile};
use crate::util::{Diagnostic, OrderedSet};

/// Classified code/header files for the reflection and UI tools.
#[derive(Debug, Default)]
pub struct ScanFiles {
    /// Compilable code eligible for processing
    pub sources: OrderedSet<PathBuf>,

    /// Headers eligible for processing
    pub headers: OrderedSet<PathBuf>,

    /// Files the reflection tool must not process.
    ///
    /// Skip membership is recorded even for files that end up ineligible,
    /// because a skip entry can be referenced as an exclusion signal by
    /// files processed later.
    pub moc_skip: OrderedSet<PathBuf>,

    /// Files the UI tool must not process
    pub uic_skip: OrderedSet<PathBuf>,
}

/// Partition code/header sources for the reflection and UI tools.
pub fn acquire_scan_files(
    files: &[SourceFile],
    moc_enabled: bool,
    uic_enabled: bool,
    policy: GeneratedPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> ScanFiles {
    let mut scan = ScanFiles::default();

    for file in files {
        let format = file.format();
        if !format.is_scannable() {
            continue;
        }
        let abs = file.canonical();
        let moc_skip = file.moc_skipped();
        let uic_skip = file.uic_skipped();
        let accept = (moc_enabled && !moc_skip) || (uic_enabled && !uic_skip);

        if accept && file.generated {
            match policy.decide() {
                PolicyDecision::Accept => {}
                PolicyDecision::RejectWithWarning => {
                    diagnostics.push(
                        Diagnostic::warning("AUTOMOC/AUTOUIC: ignoring generated source file")
                            .with_location(abs.clone()),
                    );
                    continue;
                }
                PolicyDecision::Reject => {
                    debug!("ignoring generated source file {}", abs.display());
                    continue;
                }
            }
        }

        if moc_skip {
            scan.moc_skip.insert(abs.clone());
        }
        if uic_skip {
            scan.uic_skip.insert(abs.clone());
        }

        if accept {
            match format {
                FileFormat::Source => {
                    scan.sources.insert(abs);
                }
                FileFormat::Header => {
                    scan.headers.insert(abs);
                }
                _ => {}
            }
        }
    }

    scan
}

/// Resource-description files eligible for the resource tool, with
/// canonicalized paths.
pub fn eligible_resources(files: &[SourceFile], rcc_enabled: bool) -> Vec<SourceFile> {
    if !rcc_enabled {
        return Vec::new();
    }
    let mut seen: OrderedSet<PathBuf> = OrderedSet::new();
    let mut resources = Vec::new();
    for file in files {
        if file.format() != FileFormat::Resource || file.rcc_skipped() {
            continue;
        }
        let mut resource = file.clone();
        resource.path = file.canonical();
        if seen.insert(resource.path.clone()) {
            resources.push(resource);
        }
    }
    resources
}

/// Generated code/header files the reflection/UI tools will scan.
///
/// These must exist before the generators run, so they feed the dependency
/// set. Files skipping all generators are not considered at all.
pub fn generated_scan_sources(
    files: &[SourceFile],
    moc_enabled: bool,
    uic_enabled: bool,
) -> Vec<PathBuf> {
    if !moc_enabled && !uic_enabled {
        return Vec::new();
    }
    let mut result: OrderedSet<PathBuf> = OrderedSet::new();
    for file in files {
        if file.skip_autogen || !file.generated || !file.format().is_scannable() {
            continue;
        }
        if (moc_enabled && !file.skip_moc) || (uic_enabled && !file.skip_uic) {
            result.insert(file.canonical());
        }
    }
    result.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<SourceFile> {
        vec![
            SourceFile::new("/p/main.cpp"),
            SourceFile::new("/p/widget.h"),
            SourceFile::new("/p/skipped.h").skip_autogen(),
            SourceFile::new("/p/no_moc.h").skip_moc(),
            SourceFile::new("/p/icons.qrc"),
            SourceFile::new("/p/readme.txt"),
        ]
    }

    #[test]
    fn test_buckets_have_no_duplicates() {
        let mut files = sample_files();
        files.push(SourceFile::new("/p/main.cpp"));
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, true, GeneratedPolicy::New, &mut diags);

        assert_eq!(scan.sources.len(), 1);
        assert_eq!(scan.headers.len(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_skip_all_never_eligible_but_always_skip_listed() {
        let files = sample_files();
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, true, GeneratedPolicy::New, &mut diags);

        let skipped = PathBuf::from("/p/skipped.h");
        assert!(!scan.sources.contains(&skipped));
        assert!(!scan.headers.contains(&skipped));
        assert!(scan.moc_skip.contains(&skipped));
        assert!(scan.uic_skip.contains(&skipped));
    }

    #[test]
    fn test_tool_specific_skip_keeps_other_tool_eligible() {
        let files = sample_files();
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, true, GeneratedPolicy::New, &mut diags);

        let no_moc = PathBuf::from("/p/no_moc.h");
        assert!(scan.moc_skip.contains(&no_moc));
        assert!(!scan.uic_skip.contains(&no_moc));
        // Still eligible through the UI tool.
        assert!(scan.headers.contains(&no_moc));
    }

    #[test]
    fn test_disabled_tools_still_record_skips() {
        let files = vec![SourceFile::new("/p/a.h").skip_moc()];
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, false, false, GeneratedPolicy::New, &mut diags);

        assert!(scan.headers.is_empty());
        assert!(scan.moc_skip.contains(&PathBuf::from("/p/a.h")));
    }

    #[test]
    fn test_unrecognized_format_is_silently_excluded() {
        let files = sample_files();
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, true, GeneratedPolicy::New, &mut diags);

        let readme = PathBuf::from("/p/readme.txt");
        assert!(!scan.sources.contains(&readme));
        assert!(!scan.moc_skip.contains(&readme));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_generated_policy_new_and_required_accept() {
        let files = vec![SourceFile::new("/p/gen.h").generated()];
        for policy in [GeneratedPolicy::New, GeneratedPolicy::Required] {
            let mut diags = Vec::new();
            let scan = acquire_scan_files(&files, true, false, policy, &mut diags);
            assert!(scan.headers.contains(&PathBuf::from("/p/gen.h")));
            assert!(diags.is_empty());
        }
    }

    #[test]
    fn test_generated_policy_old_rejects_silently() {
        let files = vec![SourceFile::new("/p/gen.h").generated()];
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, false, GeneratedPolicy::Old, &mut diags);

        assert!(scan.headers.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_generated_policy_warn_rejects_with_warning() {
        let files = vec![SourceFile::new("/p/gen.h").generated()];
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, false, GeneratedPolicy::Warn, &mut diags);

        assert!(scan.headers.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, crate::util::diagnostic::Severity::Warning);
    }

    #[test]
    fn test_generated_ineligible_file_bypasses_policy() {
        // A generated file that is skipped anyway produces no warning.
        let files = vec![SourceFile::new("/p/gen.h").generated().skip_autogen()];
        let mut diags = Vec::new();
        let scan = acquire_scan_files(&files, true, true, GeneratedPolicy::Warn, &mut diags);

        assert!(diags.is_empty());
        assert!(scan.moc_skip.contains(&PathBuf::from("/p/gen.h")));
    }

    #[test]
    fn test_eligible_resources() {
        let files = vec![
            SourceFile::new("/p/icons.qrc"),
            SourceFile::new("/p/skip.qrc").skip_rcc(),
            SourceFile::new("/p/all.qrc").skip_autogen(),
            SourceFile::new("/p/main.cpp"),
        ];
        let resources = eligible_resources(&files, true);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].path, PathBuf::from("/p/icons.qrc"));

        assert!(eligible_resources(&files, false).is_empty());
    }

    #[test]
    fn test_generated_scan_sources() {
        let files = vec![
            SourceFile::new("/p/gen.h").generated(),
            SourceFile::new("/p/gen_skip.h").generated().skip_autogen(),
            SourceFile::new("/p/gen_no_moc.h").generated().skip_moc(),
            SourceFile::new("/p/plain.h"),
        ];

        let moc_only = generated_scan_sources(&files, true, false);
        assert_eq!(moc_only, vec![PathBuf::from("/p/gen.h")]);

        let both = generated_scan_sources(&files, true, true);
        assert_eq!(
            both,
            vec![PathBuf::from("/p/gen.h"), PathBuf::from("/p/gen_no_moc.h")]
        );

        assert!(generated_scan_sources(&files, false, false).is_empty());
    }
}
