//! Composite participants and their distribution selectors

use std::path::{Path, PathBuf};

/// Which build tool distribution a participant's connection uses.
///
/// A participant without a selector uses the distribution its build declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// A locally installed distribution.
    Installation(PathBuf),
    /// A distribution archive downloaded from a URI.
    Uri(String),
    /// A released version, resolved by the connection mechanism.
    Version(String),
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Installation(home) => write!(f, "installation at {}", home.display()),
            Distribution::Uri(uri) => write!(f, "distribution from {uri}"),
            Distribution::Version(version) => write!(f, "version {version}"),
        }
    }
}

/// One build included in a composite, identified by its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    root_dir: PathBuf,
    distribution: Option<Distribution>,
}

impl Participant {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            distribution: None,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// `None` means the build's own declared distribution.
    pub fn distribution(&self) -> Option<&Distribution> {
        self.distribution.as_ref()
    }

    pub fn use_installation(&mut self, home: impl Into<PathBuf>) -> &mut Self {
        self.distribution = Some(Distribution::Installation(home.into()));
        self
    }

    pub fn use_distribution(&mut self, uri: impl Into<String>) -> &mut Self {
        self.distribution = Some(Distribution::Uri(uri.into()));
        self
    }

    pub fn use_gradle_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.distribution = Some(Distribution::Version(version.into()));
        self
    }

    pub fn use_build_distribution(&mut self) -> &mut Self {
        self.distribution = None;
        self
    }

    pub fn set_distribution(&mut self, distribution: Option<Distribution>) -> &mut Self {
        self.distribution = distribution;
        self
    }
}
