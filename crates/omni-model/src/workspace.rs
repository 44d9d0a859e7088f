//! The composite workspace: every normalized project of every participant.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::omni::OmniEclipseProject;

/// All normalized projects of a composite, in collection order.
///
/// Holds exactly the projects it was built from. Deduplication happens per
/// resolved root during aggregation; distinct projects may share a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmniEclipseWorkspace {
    projects: Vec<Arc<OmniEclipseProject>>,
}

impl OmniEclipseWorkspace {
    pub fn new(projects: impl IntoIterator<Item = Arc<OmniEclipseProject>>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
        }
    }

    pub fn projects(&self) -> &[Arc<OmniEclipseProject>] {
        &self.projects
    }

    /// Projects without a parent, one per distinct build.
    pub fn root_projects(&self) -> Vec<Arc<OmniEclipseProject>> {
        self.projects
            .iter()
            .filter(|p| p.is_root())
            .cloned()
            .collect()
    }

    /// First project collected from `dir`.
    pub fn find_by_directory(&self, dir: &Path) -> Option<&Arc<OmniEclipseProject>> {
        self.projects.iter().find(|p| p.project_directory == dir)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
