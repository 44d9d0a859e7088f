//! Raw model shapes returned by a build connection
//!
//! A participant's connection hands back one [`RawEclipseModel`]: an arena
//! holding every project of the build, linked by parent and child ids, with
//! [`RawEclipseModel::requested`] pointing at the project for the
//! participant's own directory (which may be a subproject).
//!
//! Attributes that only newer build tool versions provide are wrapped in
//! [`RawAttribute`], so reading them can report "unsupported" instead of a
//! value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RawFailure;

// ---------------------------------------------------------------------------
// RawAttribute: capability-dependent reads
// ---------------------------------------------------------------------------

/// Outcome of reading a capability-dependent attribute.
///
/// A missing field in a serialized model reads as `Unsupported`, the same
/// as an older tool version that never had the accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAttribute<T> {
    /// The tool provided a value.
    Value(T),
    /// The accessor does not exist for this tool version.
    Unsupported,
    /// Reading the attribute failed for another reason.
    Failed(RawFailure),
}

impl<T> Default for RawAttribute<T> {
    fn default() -> Self {
        RawAttribute::Unsupported
    }
}

impl<T> From<T> for RawAttribute<T> {
    fn from(value: T) -> Self {
        RawAttribute::Value(value)
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Index of a project inside a [`RawEclipseModel`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RawProjectId(pub usize);

impl std::fmt::Display for RawProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The raw project tree of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEclipseModel {
    pub projects: Vec<RawEclipseProject>,
    /// Project the connection was opened for.
    #[serde(default)]
    pub requested: RawProjectId,
}

impl RawEclipseModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project, linking it under `parent` when given.
    pub fn add_project(
        &mut self,
        mut project: RawEclipseProject,
        parent: Option<RawProjectId>,
    ) -> RawProjectId {
        let id = RawProjectId(self.projects.len());
        project.parent = parent;
        self.projects.push(project);
        if let Some(parent) = parent {
            if let Some(parent) = self.projects.get_mut(parent.0) {
                parent.children.push(id);
            }
        }
        id
    }

    /// Mark the project the connection was opened for.
    pub fn with_requested(mut self, id: RawProjectId) -> Self {
        self.requested = id;
        self
    }

    /// Look up a project, failing on a dangling id.
    pub fn project(&self, id: RawProjectId) -> Result<&RawEclipseProject, RawFailure> {
        self.projects
            .get(id.0)
            .ok_or_else(|| RawFailure::malformed(format!("no project with id {id}")))
    }

    pub fn requested_project(&self) -> Result<&RawEclipseProject, RawFailure> {
        self.project(self.requested)
    }

    /// Id of the project whose directory is `dir`, if any.
    pub fn find_by_directory(&self, dir: &Path) -> Option<RawProjectId> {
        self.projects
            .iter()
            .position(|p| p.project_directory == dir)
            .map(RawProjectId)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEclipseProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Build path, e.g. `:` for a root and `:core:api` for a subproject.
    pub path: String,
    pub project_directory: PathBuf,
    #[serde(default)]
    pub parent: Option<RawProjectId>,
    #[serde(default)]
    pub children: Vec<RawProjectId>,
    #[serde(default)]
    pub source_directories: Vec<RawSourceDirectory>,
    #[serde(default)]
    pub external_dependencies: Vec<RawExternalDependency>,
    #[serde(default)]
    pub project_dependencies: Vec<RawProjectDependency>,
    #[serde(default)]
    pub task_selectors: RawAttribute<Vec<RawTaskSelector>>,
}

impl RawEclipseProject {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        project_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            path: path.into(),
            project_directory: project_directory.into(),
            parent: None,
            children: Vec::new(),
            source_directories: Vec::new(),
            external_dependencies: Vec::new(),
            project_dependencies: Vec::new(),
            task_selectors: RawAttribute::Unsupported,
        }
    }
}

// ---------------------------------------------------------------------------
// Classpath
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClasspathAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccessRule {
    /// 0 = accessible, 1 = non-accessible, 2 = discouraged.
    pub kind: i32,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSourceDirectory {
    pub directory: PathBuf,
    /// Path relative to the project directory.
    pub path: String,
    #[serde(default)]
    pub excludes: RawAttribute<Vec<String>>,
    #[serde(default)]
    pub includes: RawAttribute<Vec<String>>,
    #[serde(default)]
    pub output: RawAttribute<Option<String>>,
    #[serde(default)]
    pub classpath_attributes: RawAttribute<Vec<RawClasspathAttribute>>,
    #[serde(default)]
    pub access_rules: RawAttribute<Vec<RawAccessRule>>,
}

impl RawSourceDirectory {
    pub fn new(directory: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            path: path.into(),
            excludes: RawAttribute::Unsupported,
            includes: RawAttribute::Unsupported,
            output: RawAttribute::Unsupported,
            classpath_attributes: RawAttribute::Unsupported,
            access_rules: RawAttribute::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModuleVersion {
    pub group: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExternalDependency {
    pub file: PathBuf,
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub javadoc: Option<PathBuf>,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub gradle_module_version: RawAttribute<Option<RawModuleVersion>>,
    #[serde(default)]
    pub classpath_attributes: RawAttribute<Vec<RawClasspathAttribute>>,
    #[serde(default)]
    pub access_rules: RawAttribute<Vec<RawAccessRule>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProjectDependency {
    /// Build path of the target project.
    pub path: String,
    #[serde(default)]
    pub exported: bool,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTaskSelector {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub selected_task_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_project_links_parent_and_children() {
        let mut model = RawEclipseModel::new();
        let root = model.add_project(RawEclipseProject::new("app", ":", "/ws/app"), None);
        let core = model.add_project(
            RawEclipseProject::new("core", ":core", "/ws/app/core"),
            Some(root),
        );

        assert_eq!(model.project(core).unwrap().parent, Some(root));
        assert_eq!(model.project(root).unwrap().children, vec![core]);
    }

    #[test]
    fn test_dangling_id_is_malformed() {
        let model = RawEclipseModel::new();
        let err = model.project(RawProjectId(3)).unwrap_err();
        assert!(err.message.contains("malformed"));
    }

    #[test]
    fn test_missing_attribute_deserializes_as_unsupported() {
        let json = r#"{ "directory": "/ws/app/src", "path": "src" }"#;
        let dir: RawSourceDirectory = serde_json::from_str(json).unwrap();
        assert_eq!(dir.excludes, RawAttribute::Unsupported);
        assert_eq!(dir.output, RawAttribute::Unsupported);
    }

    #[test]
    fn test_attribute_value_deserializes() {
        let json = r#"{ "directory": "/d", "path": "d", "includes": { "value": ["**/*.java"] } }"#;
        let dir: RawSourceDirectory = serde_json::from_str(json).unwrap();
        assert_eq!(dir.includes, RawAttribute::Value(vec!["**/*.java".to_string()]));
    }

    #[test]
    fn test_find_by_directory() {
        let mut model = RawEclipseModel::new();
        let root = model.add_project(RawEclipseProject::new("app", ":", "/ws/app"), None);
        model.add_project(RawEclipseProject::new("web", ":web", "/ws/app/web"), Some(root));
        assert_eq!(
            model.find_by_directory(Path::new("/ws/app/web")),
            Some(RawProjectId(1))
        );
        assert_eq!(model.find_by_directory(Path::new("/elsewhere")), None);
    }
}
