//! Normalized, tool-agnostic build models
//!
//! Every type here is immutable once built. Attributes a build tool may not
//! provide are `Option`s: `None` means the tool could not tell us, which is
//! different from an empty value.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// A node of a normalized project tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniEclipseProject {
    pub name: String,
    pub description: Option<String>,
    /// Build path, `:` for a root project.
    pub path: String,
    pub project_directory: PathBuf,
    /// Build path of the parent, `None` for a root project.
    pub parent_path: Option<String>,
    pub children: Vec<Arc<OmniEclipseProject>>,
    pub source_directories: Vec<OmniEclipseSourceDirectory>,
    pub external_dependencies: Vec<OmniExternalDependency>,
    pub project_dependencies: Vec<OmniProjectDependency>,
    /// `None` when the build tool version cannot report task selectors.
    pub task_selectors: Option<Vec<OmniTaskSelector>>,
}

impl OmniEclipseProject {
    pub fn is_root(&self) -> bool {
        self.parent_path.is_none()
    }

    /// Find a project in this subtree by build path.
    pub fn find_by_path(self: &Arc<Self>, path: &str) -> Option<Arc<OmniEclipseProject>> {
        preorder(self).into_iter().find(|p| p.path == path)
    }

    /// Number of projects in this subtree, this one included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// All projects of the subtree rooted at `root`, root first, then each
/// child's subtree in order.
pub fn preorder(root: &Arc<OmniEclipseProject>) -> Vec<Arc<OmniEclipseProject>> {
    let mut out = vec![Arc::clone(root)];
    for child in &root.children {
        out.extend(preorder(child));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniClasspathAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniAccessRule {
    pub kind: i32,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniEclipseSourceDirectory {
    pub directory: PathBuf,
    pub path: String,
    pub excludes: Option<Vec<String>>,
    pub includes: Option<Vec<String>>,
    pub output: Option<String>,
    pub classpath_attributes: Option<Vec<OmniClasspathAttribute>>,
    pub access_rules: Option<Vec<OmniAccessRule>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniModuleVersion {
    pub group: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniExternalDependency {
    pub file: PathBuf,
    pub source: Option<PathBuf>,
    pub javadoc: Option<PathBuf>,
    pub exported: bool,
    pub gradle_module_version: Option<OmniModuleVersion>,
    pub classpath_attributes: Option<Vec<OmniClasspathAttribute>>,
    pub access_rules: Option<Vec<OmniAccessRule>>,
}

impl OmniExternalDependency {
    pub fn file_name(&self) -> Option<&str> {
        self.file.file_name().and_then(|n| n.to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniProjectDependency {
    pub target_project_path: String,
    pub exported: bool,
}

/// Selects every task of a given name across a project and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniTaskSelector {
    pub name: String,
    pub description: Option<String>,
    /// Public selectors select at least one public project task.
    pub is_public: bool,
    /// Selected tasks, identified by their unique path.
    pub selected_task_paths: BTreeSet<String>,
}

impl OmniTaskSelector {
    pub fn selects(&self, task_path: &str) -> bool {
        self.selected_task_paths.contains(task_path)
    }
}
