//! Request attributes
//!
//! Fixed attributes identify what is being built and are part of the cache
//! key. Transient attributes only affect how a fetch reports progress.

use std::path::PathBuf;
use std::sync::Arc;

use omni_client::{CompositeModelBuilder, Distribution, ProgressListener};

/// Attributes that select a distinct build model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedRequestAttributes {
    pub project_dir: PathBuf,
    pub gradle_user_home: Option<PathBuf>,
    /// `None` uses the distribution the build declares.
    pub distribution: Option<Distribution>,
    pub java_home: Option<PathBuf>,
    pub jvm_arguments: Vec<String>,
    pub arguments: Vec<String>,
}

impl FixedRequestAttributes {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            gradle_user_home: None,
            distribution: None,
            java_home: None,
            jvm_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn apply(&self, builder: CompositeModelBuilder) -> CompositeModelBuilder {
        builder
            .set_gradle_user_home(self.gradle_user_home.clone())
            .set_java_home(self.java_home.clone())
            .with_jvm_arguments(self.jvm_arguments.iter().cloned())
            .with_arguments(self.arguments.iter().cloned())
    }
}

/// Attributes that never change the resulting model.
#[derive(Clone, Default)]
pub struct TransientRequestAttributes {
    pub color_output: bool,
    pub progress_listeners: Vec<Arc<dyn ProgressListener>>,
}

impl TransientRequestAttributes {
    pub(crate) fn apply(&self, builder: CompositeModelBuilder) -> CompositeModelBuilder {
        self.progress_listeners
            .iter()
            .cloned()
            .fold(builder.set_color_output(self.color_output), |b, listener| {
                b.add_progress_listener(listener)
            })
    }
}

impl std::fmt::Debug for TransientRequestAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransientRequestAttributes")
            .field("color_output", &self.color_output)
            .field("progress_listeners", &self.progress_listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixed_attributes_distinguish_distributions() {
        let a = FixedRequestAttributes::new("/ws/app");
        let b = FixedRequestAttributes::new("/ws/app")
            .with_distribution(Distribution::Version("8.5".to_string()));
        let keys: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }
}
