//! Raw model to Omni model conversion.
//!
//! Capability-dependent attributes are probed: an `Unsupported` read turns
//! into `None`, a value into `Some(value)`. Any other read failure aborts
//! the conversion with the raw failure, unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::error::RawFailure;
use crate::omni::{
    OmniAccessRule, OmniClasspathAttribute, OmniEclipseProject, OmniEclipseSourceDirectory,
    OmniExternalDependency, OmniModuleVersion, OmniProjectDependency, OmniTaskSelector,
};
use crate::raw::{
    RawAccessRule, RawAttribute, RawClasspathAttribute, RawEclipseModel, RawEclipseProject,
    RawExternalDependency, RawProjectId, RawSourceDirectory, RawTaskSelector,
};

/// Normalize the subtree of `model` rooted at `id`.
///
/// Each project is visited at most once; child links that cycle or reach a
/// project twice make the model malformed.
pub fn normalize(
    model: &RawEclipseModel,
    id: RawProjectId,
) -> Result<Arc<OmniEclipseProject>, RawFailure> {
    normalize_subtree(model, id, &mut HashSet::new())
}

fn normalize_subtree(
    model: &RawEclipseModel,
    id: RawProjectId,
    visited: &mut HashSet<RawProjectId>,
) -> Result<Arc<OmniEclipseProject>, RawFailure> {
    if !visited.insert(id) {
        return Err(RawFailure::malformed(format!(
            "child links reach project {id} more than once (cycle or shared child)"
        )));
    }
    let raw = model.project(id)?;

    let parent_path = match raw.parent {
        Some(parent) => Some(model.project(parent)?.path.clone()),
        None => None,
    };
    let children = raw
        .children
        .iter()
        .map(|child| normalize_subtree(model, *child, visited))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arc::new(project(raw, parent_path, children)?))
}

fn project(
    raw: &RawEclipseProject,
    parent_path: Option<String>,
    children: Vec<Arc<OmniEclipseProject>>,
) -> Result<OmniEclipseProject, RawFailure> {
    let task_selectors = probe(&raw.task_selectors, "task_selectors")?
        .map(|selectors| selectors.iter().map(task_selector).collect());

    Ok(OmniEclipseProject {
        name: raw.name.clone(),
        description: raw.description.clone(),
        path: raw.path.clone(),
        project_directory: raw.project_directory.clone(),
        parent_path,
        children,
        source_directories: raw
            .source_directories
            .iter()
            .map(source_directory)
            .collect::<Result<_, _>>()?,
        external_dependencies: raw
            .external_dependencies
            .iter()
            .map(external_dependency)
            .collect::<Result<_, _>>()?,
        project_dependencies: raw
            .project_dependencies
            .iter()
            .map(|d| OmniProjectDependency {
                target_project_path: d.path.clone(),
                exported: d.exported,
            })
            .collect(),
        task_selectors,
    })
}

fn source_directory(raw: &RawSourceDirectory) -> Result<OmniEclipseSourceDirectory, RawFailure> {
    Ok(OmniEclipseSourceDirectory {
        directory: raw.directory.clone(),
        path: raw.path.clone(),
        excludes: probe(&raw.excludes, "excludes")?,
        includes: probe(&raw.includes, "includes")?,
        output: probe(&raw.output, "output")?.flatten(),
        classpath_attributes: probe(&raw.classpath_attributes, "classpath_attributes")?
            .map(|attrs| classpath_attributes(&attrs)),
        access_rules: probe(&raw.access_rules, "access_rules")?.map(|rules| access_rules(&rules)),
    })
}

fn external_dependency(raw: &RawExternalDependency) -> Result<OmniExternalDependency, RawFailure> {
    Ok(OmniExternalDependency {
        file: raw.file.clone(),
        source: raw.source.clone(),
        javadoc: raw.javadoc.clone(),
        exported: raw.exported,
        gradle_module_version: probe(&raw.gradle_module_version, "gradle_module_version")?
            .flatten()
            .map(|v| OmniModuleVersion {
                group: v.group,
                name: v.name,
                version: v.version,
            }),
        classpath_attributes: probe(&raw.classpath_attributes, "classpath_attributes")?
            .map(|attrs| classpath_attributes(&attrs)),
        access_rules: probe(&raw.access_rules, "access_rules")?.map(|rules| access_rules(&rules)),
    })
}

fn task_selector(raw: &RawTaskSelector) -> OmniTaskSelector {
    OmniTaskSelector {
        name: raw.name.clone(),
        description: raw.description.clone(),
        is_public: raw.public,
        selected_task_paths: raw.selected_task_paths.iter().cloned().collect(),
    }
}

fn classpath_attributes(raw: &[RawClasspathAttribute]) -> Vec<OmniClasspathAttribute> {
    raw.iter()
        .map(|a| OmniClasspathAttribute {
            name: a.name.clone(),
            value: a.value.clone(),
        })
        .collect()
}

fn access_rules(raw: &[RawAccessRule]) -> Vec<OmniAccessRule> {
    raw.iter()
        .map(|r| OmniAccessRule {
            kind: r.kind,
            pattern: r.pattern.clone(),
        })
        .collect()
}

/// Read a capability-dependent attribute.
fn probe<T: Clone>(attribute: &RawAttribute<T>, name: &str) -> Result<Option<T>, RawFailure> {
    match attribute {
        RawAttribute::Value(value) => Ok(Some(value.clone())),
        RawAttribute::Unsupported => {
            trace!(attribute = name, "attribute not supported by build tool");
            Ok(None)
        }
        RawAttribute::Failed(failure) => Err(failure.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RawFailureKind;
    use crate::raw::RawEclipseProject;

    #[test]
    fn test_probe_maps_unsupported_to_none() {
        let attr: RawAttribute<Vec<String>> = RawAttribute::Unsupported;
        assert_eq!(probe(&attr, "excludes").unwrap(), None);
    }

    #[test]
    fn test_probe_keeps_empty_value() {
        let attr: RawAttribute<Vec<String>> = RawAttribute::Value(Vec::new());
        assert_eq!(probe(&attr, "excludes").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_probe_propagates_other_failures() {
        let failure = RawFailure::new(RawFailureKind::Connection, "connection reset");
        let attr: RawAttribute<Vec<String>> = RawAttribute::Failed(failure.clone());
        assert_eq!(probe(&attr, "excludes").unwrap_err(), failure);
    }

    #[test]
    fn test_child_cycle_is_malformed() {
        let mut model = RawEclipseModel::new();
        let root = model.add_project(RawEclipseProject::new("a", ":", "/a"), None);
        model.projects[root.0].children.push(root);
        let err = normalize(&model, root).unwrap_err();
        assert!(err.message.contains("cycle"));
    }

    #[test]
    fn test_repeated_child_is_rejected_without_revisiting() {
        // Every level lists the next project twice; a walk that does not
        // track visited projects would expand 2^depth nodes.
        let mut model = RawEclipseModel::new();
        let mut parent = model.add_project(RawEclipseProject::new("p0", ":", "/p0"), None);
        let root = parent;
        for level in 1..64 {
            let child = model.add_project(
                RawEclipseProject::new(format!("p{level}"), format!(":p{level}"), format!("/p{level}")),
                Some(parent),
            );
            model.projects[parent.0].children.push(child);
            parent = child;
        }
        let err = normalize(&model, root).unwrap_err();
        assert_eq!(err.kind, RawFailureKind::Other);
        assert!(err.message.contains("more than once"));
    }
}
