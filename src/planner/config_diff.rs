//! Per-configuration settings diffing.
//!
//! Configurations commonly share identical generator inputs. The baseline
//! configuration's settings are always computed; every other configuration
//! records only the values that are textually different, which keeps the
//! descriptor small and makes an absent override mean "use baseline".

use std::collections::{BTreeMap, BTreeSet};

use crate::core::GenTarget;
use crate::util::list::join_list;

/// Baseline generator settings, canonically joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineSettings {
    /// Include directories, `;`-joined in declared order
    pub moc_includes: String,
    /// Preprocessor defines, sorted and `;`-joined
    pub moc_defines: String,
    /// UI tool options, `;`-joined
    pub uic_options: String,
}

/// Values recorded for configurations that differ from baseline.
#[derive(Debug, Clone, Default)]
pub struct ConfigDiffs {
    pub moc_includes: BTreeMap<String, String>,
    pub moc_defines: BTreeMap<String, String>,
    pub uic_options: BTreeMap<String, String>,
}

/// Include and define strings for one configuration.
///
/// Equality below is a full string comparison of this canonical joined
/// representation, not set equality, so ordering differences count.
pub fn compile_strings(target: &GenTarget, config: &str) -> (String, String) {
    let settings = target.settings_for(config);
    let includes = join_list(&settings.include_dirs);
    let defines: BTreeSet<&str> = settings.defines.iter().map(String::as_str).collect();
    let defines = defines.into_iter().collect::<Vec<_>>().join(";");
    (includes, defines)
}

/// UI tool option string for one configuration.
pub fn uic_options_string(target: &GenTarget, config: &str) -> String {
    join_list(&target.settings_for(config).uic_options)
}

/// Compute baseline settings and per-configuration diffs.
pub fn diff_configs(
    target: &GenTarget,
    baseline: &str,
    configs: &[String],
) -> (BaselineSettings, ConfigDiffs) {
    let (moc_includes, moc_defines) = compile_strings(target, baseline);
    let uic_options = uic_options_string(target, baseline);
    let base = BaselineSettings {
        moc_includes,
        moc_defines,
        uic_options,
    };

    let mut diffs = ConfigDiffs::default();
    for config in configs {
        let (includes, defines) = compile_strings(target, config);
        if includes != base.moc_includes {
            diffs.moc_includes.insert(config.clone(), includes);
        }
        if defines != base.moc_defines {
            diffs.moc_defines.insert(config.clone(), defines);
        }
        let uic = uic_options_string(target, config);
        if uic != base.uic_options {
            diffs.uic_options.insert(config.clone(), uic);
        }
    }

    (base, diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompileSettings;

    fn target_with(
        default: CompileSettings,
        configs: Vec<(&str, CompileSettings)>,
    ) -> GenTarget {
        let mut target = GenTarget::new("app", "/src", "/build");
        target.set_default_settings(default);
        for (name, settings) in configs {
            target.set_config_settings(name, settings);
        }
        target
    }

    #[test]
    fn test_identical_config_records_no_diff() {
        let settings = CompileSettings {
            include_dirs: vec!["/a".into(), "/b".into()],
            defines: vec!["FOO".into()],
            uic_options: vec!["-g".into()],
        };
        let target = target_with(settings.clone(), vec![("Debug", settings)]);

        let configs = vec!["Debug".to_string()];
        let (_, diffs) = diff_configs(&target, "", &configs);
        assert!(diffs.moc_includes.is_empty());
        assert!(diffs.moc_defines.is_empty());
        assert!(diffs.uic_options.is_empty());
    }

    #[test]
    fn test_ordering_difference_is_a_diff() {
        let default = CompileSettings {
            include_dirs: vec!["/a".into(), "/b".into()],
            ..Default::default()
        };
        let reordered = CompileSettings {
            include_dirs: vec!["/b".into(), "/a".into()],
            ..Default::default()
        };
        let target = target_with(default, vec![("Release", reordered)]);

        let configs = vec!["Release".to_string()];
        let (base, diffs) = diff_configs(&target, "", &configs);
        assert_eq!(base.moc_includes, "/a;/b");
        assert_eq!(diffs.moc_includes.get("Release").unwrap(), "/b;/a");
    }

    #[test]
    fn test_defines_are_sorted_before_joining() {
        let default = CompileSettings {
            defines: vec!["ZETA".into(), "ALPHA".into()],
            ..Default::default()
        };
        let target = target_with(default, vec![]);

        let (_, defines) = compile_strings(&target, "");
        assert_eq!(defines, "ALPHA;ZETA");
    }

    #[test]
    fn test_value_difference_is_recorded_per_config() {
        let default = CompileSettings {
            defines: vec!["FOO".into()],
            ..Default::default()
        };
        let release = CompileSettings {
            defines: vec!["FOO".into(), "NDEBUG".into()],
            ..Default::default()
        };
        let target = target_with(default, vec![("Release", release)]);

        let configs = vec!["Debug".to_string(), "Release".to_string()];
        let (base, diffs) = diff_configs(&target, "", &configs);
        assert_eq!(base.moc_defines, "FOO");
        assert_eq!(diffs.moc_defines.len(), 1);
        assert_eq!(diffs.moc_defines.get("Release").unwrap(), "FOO;NDEBUG");
    }

    #[test]
    fn test_baseline_always_computed_without_configs() {
        let default = CompileSettings {
            include_dirs: vec!["/inc".into()],
            uic_options: vec!["-tr".into(), "i18n".into()],
            ..Default::default()
        };
        let target = target_with(default, vec![]);

        let (base, diffs) = diff_configs(&target, "", &[String::new()]);
        assert_eq!(base.moc_includes, "/inc");
        assert_eq!(base.uic_options, "-tr;i18n");
        assert!(diffs.uic_options.is_empty());
    }
}
