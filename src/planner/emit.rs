//! Plan emission.
//!
//! Serializes a [`Plan`] into the descriptor consumed by the execution
//! stage and registers the side effects with the build graph: generated
//! output files, the autogen step with its dependency edge, source-group
//! membership, include directories and clean-file bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use tracing::debug;

use crate::core::{BuildGraph, GenStep};
use crate::planner::descriptor::Descriptor;
use crate::planner::tools::ToolKind;
use crate::planner::Plan;
use crate::util::fs::{ensure_dir, ensure_writable};
use crate::util::list::{join_list, LIST_SEP};

/// Fatal emission failure. The configure step does not produce a usable
/// build for the target.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum EmitError {
    /// The descriptor could not be written.
    #[error("failed to write autogen descriptor {}: {reason}", .path.display())]
    #[diagnostic(
        code(genplan::emit::descriptor_write),
        help("check permissions on the build directory")
    )]
    DescriptorWrite { path: PathBuf, reason: String },
}

/// Compose the descriptor for a plan.
///
/// Key order is fixed so that re-running planning with unchanged inputs
/// produces a byte-identical descriptor.
pub fn compose_descriptor(plan: &Plan) -> Descriptor {
    let mut d = Descriptor::new();
    d.push("AM_BUILD_DIR", plan.build_dir.display().to_string());
    d.push("AM_QT_VERSION_MAJOR", plan.qt_version_major.clone());
    d.push_list("AM_SOURCES", &path_strings(&plan.sources));
    d.push_list("AM_HEADERS", &path_strings(&plan.headers));

    if let Some(moc) = &plan.moc {
        d.push_list("AM_MOC_SKIP", &path_strings(&moc.skip));
        d.push("AM_MOC_DEFINITIONS", moc.defines.clone());
        d.push("AM_MOC_INCLUDES", moc.includes.clone());
        d.push_list("AM_MOC_OPTIONS", &moc.options);
        d.push(
            "AM_MOC_RELAXED_MODE",
            if moc.relaxed_mode { "TRUE" } else { "FALSE" },
        );
        d.push_list("AM_MOC_MACRO_NAMES", &moc.macro_names);
        d.push_list("AM_MOC_DEPEND_FILTERS", &moc.depend_filters);
        if let Some(predefs) = &moc.predefs_cmd {
            d.push("AM_MOC_PREDEFS_CMD", predefs.clone());
        }
        d.push("AM_QT_MOC_EXECUTABLE", moc.executable.display().to_string());
    }

    if let Some(uic) = &plan.uic {
        d.push_list("AM_UIC_SKIP", &path_strings(&uic.skip));
        d.push("AM_UIC_TARGET_OPTIONS", uic.target_options.clone());
        d.push_list("AM_UIC_SEARCH_PATHS", &path_strings(&uic.search_paths));
        d.push_list("AM_UIC_OPTIONS_FILES", &path_strings(&uic.file_files));
        d.push_list("AM_UIC_OPTIONS_OPTIONS", &uic.file_options);
        d.push("AM_QT_UIC_EXECUTABLE", uic.executable.display().to_string());
    }

    if let Some(rcc) = &plan.rcc {
        d.push("AM_QT_RCC_EXECUTABLE", rcc.executable.display().to_string());
        let files: Vec<String> = rcc.resources.iter().map(|r| r.path.display().to_string()).collect();
        d.push_list("AM_RCC_SOURCES", &files);
        let inputs: Vec<String> = rcc
            .resources
            .iter()
            .map(|r| format!("{{{}}}", join_list(&path_strings(&r.inputs)).replace(';', LIST_SEP)))
            .collect();
        d.push_list("AM_RCC_INPUTS", &inputs);
        // Only resource files with a non-empty merged option list.
        let mut option_files = Vec::new();
        let mut option_values = Vec::new();
        for resource in &rcc.resources {
            if resource.options.is_empty() {
                continue;
            }
            option_files.push(resource.path.display().to_string());
            option_values.push(resource.options.join(LIST_SEP));
        }
        d.push_list("AM_RCC_OPTIONS_FILES", &option_files);
        d.push_list("AM_RCC_OPTIONS_OPTIONS", &option_values);
    }

    // Per-configuration overrides. The suffix map is emitted whenever
    // multi-configuration mode declared one; the rest only when a value
    // differs from baseline.
    for (config, suffix) in &plan.config_suffixes {
        d.push(format!("AM_CONFIG_SUFFIX_{config}"), suffix.clone());
    }
    if let Some(moc) = &plan.moc {
        for (config, value) in &moc.config_defines {
            d.push(format!("AM_MOC_DEFINITIONS_{config}"), value.clone());
        }
        for (config, value) in &moc.config_includes {
            d.push(format!("AM_MOC_INCLUDES_{config}"), value.clone());
        }
    }
    if let Some(uic) = &plan.uic {
        for (config, value) in &uic.config_options {
            d.push(format!("AM_UIC_TARGET_OPTIONS_{config}"), value.clone());
        }
    }

    d
}

/// Write the descriptor and register the plan's side effects.
pub fn emit_plan(graph: &mut BuildGraph, plan: &Plan) -> Result<(), EmitError> {
    let descriptor = compose_descriptor(plan);
    write_descriptor(&descriptor, &plan.descriptor_path)?;
    debug!(
        "wrote autogen descriptor for {} to {}",
        plan.target,
        plan.descriptor_path.display()
    );

    // Remove the build dir and stale per-configuration settings files from
    // previous runs on a full clean.
    graph.add_clean_file(plan.build_dir.clone());
    if let Some(files_dir) = plan.descriptor_path.parent() {
        for suffix in graph.config_suffixes() {
            graph.add_clean_file(files_dir.join(format!("old_settings{suffix}.txt")));
        }
    }

    // Register generated outputs as sources of the original target. They
    // carry the skip-all-generators marker so planning never recursively
    // processes its own outputs.
    if plan.moc.is_some() {
        let mocs = plan.build_dir.join("mocs_compilation.cpp");
        graph.add_generated_source(&plan.target, &mocs);
        attach_to_source_group(graph, ToolKind::Moc, mocs);
    }
    if let Some(rcc) = &plan.rcc {
        for resource in &rcc.resources {
            graph.add_generated_source(&plan.target, &resource.output);
            attach_to_source_group(graph, ToolKind::Rcc, resource.output.clone());
        }
    }

    // The generated headers land under the autogen include dir; the
    // original target must see it.
    if plan.moc.is_some() || plan.uic.is_some() {
        let mut dirs: Vec<PathBuf> = Vec::new();
        if graph.is_multi_config() {
            for config in graph.configurations() {
                dirs.push(plan.build_dir.join(format!("include_{config}")));
            }
        } else {
            dirs.push(plan.build_dir.join("include"));
        }
        if let Some(target) = graph.target_mut(&plan.target) {
            for (i, dir) in dirs.into_iter().enumerate() {
                target.extra_include_dirs.insert(i, dir);
            }
        }
    }

    let folder = graph
        .global_property("AUTOMOC_TARGETS_FOLDER")
        .or_else(|| graph.global_property("AUTOGEN_TARGETS_FOLDER"))
        .map(str::to_string)
        .or_else(|| {
            graph
                .target(&plan.target)
                .and_then(|t| t.autogen.folder.clone())
        });

    graph.add_step(GenStep {
        name: plan.step_name.clone(),
        comment: plan.comment.clone(),
        working_dir: plan.working_dir.clone(),
        inputs: plan.depends.clone(),
        outputs: plan.provides.clone(),
        folder,
    });
    graph.add_dependency(&plan.target, &plan.step_name);

    Ok(())
}

fn write_descriptor(descriptor: &Descriptor, path: &Path) -> Result<(), EmitError> {
    let fail = |reason: String| EmitError::DescriptorWrite {
        path: path.to_path_buf(),
        reason,
    };
    if let Some(parent) = path.parent() {
        ensure_dir(parent).map_err(|e| fail(format!("{e:#}")))?;
    }
    // A previous run may have left the descriptor read-only.
    ensure_writable(path).map_err(|e| fail(format!("{e:#}")))?;
    fs::write(path, descriptor.render()).map_err(|e| fail(e.to_string()))?;
    Ok(())
}

/// Attach a generated file to the configured source group, if any.
///
/// The tool-specific group property wins over the shared one; the group
/// name is split on the configured delimiter into a folder path.
fn attach_to_source_group(graph: &mut BuildGraph, tool: ToolKind, file: PathBuf) {
    let specific = match tool {
        ToolKind::Moc => graph.global_property("AUTOMOC_SOURCE_GROUP"),
        ToolKind::Rcc => graph.global_property("AUTORCC_SOURCE_GROUP"),
        ToolKind::Uic => None,
    };
    let name = specific
        .filter(|v| !v.is_empty())
        .or_else(|| graph.global_property("AUTOGEN_SOURCE_GROUP"))
        .filter(|v| !v.is_empty());
    let Some(name) = name else {
        return;
    };
    let delimiter = graph
        .definition("SOURCE_GROUP_DELIMITER")
        .unwrap_or("\\")
        .to_string();
    let group = name
        .split(delimiter.as_str())
        .collect::<Vec<_>>()
        .join("/");
    graph.add_group_file(&group, file);
}

fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}
