//! Model types and request identities

use std::path::{Path, PathBuf};

use crate::error::ToolingError;

/// Models a build connection can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelType {
    EclipseProject,
    GradleProject,
    GradleBuild,
    BuildEnvironment,
    IdeaProject,
}

impl ModelType {
    /// The only model a composite can currently produce.
    pub const COMPOSITE: ModelType = ModelType::EclipseProject;

    pub const ALL: [ModelType; 5] = [
        ModelType::EclipseProject,
        ModelType::GradleProject,
        ModelType::GradleBuild,
        ModelType::BuildEnvironment,
        ModelType::IdeaProject,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelType::EclipseProject => "EclipseProject",
            ModelType::GradleProject => "GradleProject",
            ModelType::GradleBuild => "GradleBuild",
            ModelType::BuildEnvironment => "BuildEnvironment",
            ModelType::IdeaProject => "IdeaProject",
        }
    }

    /// Parse a model name. Names that denote no model at all are rejected.
    pub fn from_name(name: &str) -> Result<ModelType, ToolingError> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                ToolingError::invalid_argument(format!(
                    "Cannot fetch a model of type '{name}' as this type is not a model type."
                ))
            })
    }

    /// Reject every model type a composite cannot produce.
    pub fn ensure_composite(self) -> Result<ModelType, ToolingError> {
        if self == Self::COMPOSITE {
            Ok(self)
        } else {
            Err(ToolingError::invalid_argument(format!(
                "The only supported model for a composite build is {}, not {}.",
                Self::COMPOSITE.name(),
                self.name()
            )))
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the request that produced a model: the participant whose
/// connection delivered it, and the requested model type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub participant: PathBuf,
    pub model: ModelType,
}

/// A model paired with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResult<T> {
    request: RequestId,
    model: T,
}

impl<T> ModelResult<T> {
    pub fn new(request: RequestId, model: T) -> Self {
        Self { request, model }
    }

    pub fn request(&self) -> &RequestId {
        &self.request
    }

    pub fn participant(&self) -> &Path {
        &self.request.participant
    }

    pub fn model(&self) -> &T {
        &self.model
    }

    pub fn into_model(self) -> T {
        self.model
    }
}
