/// Convenience result type used across chalkline.
pub type ChalkResult<T> = Result<T, ChalkError>;

/// Engine component that was running when a scene failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    /// Layer rasterization (text, shapes, images).
    Rasterizer,
    /// Layer placement and painting.
    Compositor,
    /// Draw-order scheduling.
    Scheduler,
    /// Viewport projection and camera sequences.
    Camera,
    /// Frame timing and scene sequencing.
    Orchestrator,
    /// Frame consumer (spool, encoder).
    Sink,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rasterizer => "rasterizer",
            Self::Compositor => "compositor",
            Self::Scheduler => "scheduler",
            Self::Camera => "camera",
            Self::Orchestrator => "orchestrator",
            Self::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChalkError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-positive zoom, zero-size viewport, malformed tile edge.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An external rasterizer (text, shape, image decode) failed.
    #[error("rasterize error: {0}")]
    Rasterize(String),

    /// A frame sink failed to accept or finalize frames.
    #[error("encode error: {0}")]
    Encode(String),

    /// A scene failed; partial frames of that scene must be discarded.
    #[error("scene {index} failed in {component}: {source}")]
    Scene {
        /// 0-based scene index in the project.
        index: usize,
        /// Component that raised the error.
        component: Component,
        /// Underlying error.
        source: Box<ChalkError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChalkError {
    /// Build a [`ChalkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChalkError::InvalidGeometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`ChalkError::Rasterize`] value.
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Build a [`ChalkError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Attribute this error to `component` of scene `index`.
    ///
    /// Errors that already carry a scene attribution are returned unchanged.
    pub fn in_scene(self, index: usize, component: Component) -> Self {
        match self {
            Self::Scene { .. } => self,
            other => Self::Scene {
                index,
                component,
                source: Box::new(other),
            },
        }
    }

    /// Return the scene index if this error is attributed to a scene.
    pub fn scene_index(&self) -> Option<usize> {
        match self {
            Self::Scene { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
