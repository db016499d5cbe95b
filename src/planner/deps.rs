//! Dependency set aggregation.
//!
//! Everything the generated outputs must be rebuilt after: user-declared
//! extra dependencies, utility/link targets that exist in the build graph,
//! generated sources the tools will scan, and resource content inputs.

use std::path::PathBuf;

use tracing::debug;

use crate::core::{BuildGraph, GenTarget};
use crate::planner::ResourcePlan;
use crate::util::list::expand_list;
use crate::util::OrderedSet;

/// Build the deduplicated dependency set for a target's autogen step.
///
/// Non-generated resource files are additionally registered as reconfigure
/// triggers: a change to their declared content list must re-run planning.
pub fn build_dependency_set(
    graph: &mut BuildGraph,
    target: &GenTarget,
    generated_sources: &[PathBuf],
    resources: &[ResourcePlan],
) -> OrderedSet<String> {
    let mut depends = OrderedSet::new();

    // User-declared extra dependencies.
    depends.extend(expand_list(&target.autogen.extra_depends));

    // Utility and link-library names that resolve to real build-graph
    // targets. Unresolvable names are external or system libraries.
    for name in target.utilities.iter().chain(target.link_libraries.iter()) {
        if graph.find_target(name) {
            depends.insert(name.clone());
        } else {
            debug!("skipping non-target dependency {name}");
        }
    }

    // Generated sources must exist before the generators can scan them.
    for path in generated_sources {
        depends.insert(path.display().to_string());
    }

    for resource in resources {
        if resource.generated {
            // The resource file itself must be produced before it is read.
            depends.insert(resource.path.display().to_string());
        } else {
            graph.add_reconfigure_file(resource.path.clone());
            for input in &resource.inputs {
                depends.insert(input.display().to_string());
            }
        }
    }

    depends
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(path: &str, generated: bool, inputs: &[&str]) -> ResourcePlan {
        ResourcePlan {
            path: PathBuf::from(path),
            generated,
            options: Vec::new(),
            inputs: inputs.iter().map(PathBuf::from).collect(),
            output: PathBuf::from("/build/out.cpp"),
        }
    }

    #[test]
    fn test_generated_resource_contributes_only_its_own_path() {
        let mut graph = BuildGraph::new();
        let target = GenTarget::new("app", "/src", "/build");
        let resources = vec![resource("/src/gen.qrc", true, &["/src/unused.png"])];

        let depends = build_dependency_set(&mut graph, &target, &[], &resources);
        assert_eq!(depends.as_slice(), &["/src/gen.qrc".to_string()]);
        assert!(graph.reconfigure_files().is_empty());
    }

    #[test]
    fn test_plain_resource_contributes_inputs_and_reconfigure_trigger() {
        let mut graph = BuildGraph::new();
        let target = GenTarget::new("app", "/src", "/build");
        let resources = vec![resource("/src/icons.qrc", false, &["/src/a.png", "/src/b.png"])];

        let depends = build_dependency_set(&mut graph, &target, &[], &resources);
        assert!(depends.contains(&"/src/a.png".to_string()));
        assert!(depends.contains(&"/src/b.png".to_string()));
        assert!(!depends.contains(&"/src/icons.qrc".to_string()));
        assert_eq!(graph.reconfigure_files(), &[PathBuf::from("/src/icons.qrc")]);
    }

    #[test]
    fn test_unresolvable_link_names_are_excluded() {
        let mut graph = BuildGraph::new();
        graph.add_known_target("corelib");

        let mut target = GenTarget::new("app", "/src", "/build");
        target.link_libraries = vec!["corelib".into(), "m".into(), "pthread".into()];
        target.utilities = vec!["docs".into()];

        let depends = build_dependency_set(&mut graph, &target, &[], &[]);
        assert!(depends.contains(&"corelib".to_string()));
        assert!(!depends.contains(&"m".to_string()));
        assert!(!depends.contains(&"pthread".to_string()));
        assert!(!depends.contains(&"docs".to_string()));
    }

    #[test]
    fn test_extra_depends_expand_and_dedup() {
        let mut graph = BuildGraph::new();
        let mut target = GenTarget::new("app", "/src", "/build");
        target.autogen.extra_depends = "/src/proto.h;codegen;/src/proto.h".to_string();

        let generated = vec![PathBuf::from("/src/proto.h")];
        let depends = build_dependency_set(&mut graph, &target, &generated, &[]);
        assert_eq!(
            depends.as_slice(),
            &["/src/proto.h".to_string(), "codegen".to_string()]
        );
    }
}
