use brickpose_proto::FailureKind;
use thiserror::Error;

pub type Result<T, E = PoseError> = std::result::Result<T, E>;

/// Every way a single estimation request can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum PoseError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("ambiguous segmentation: {clusters} line clusters (expected 1 or 2)")]
    AmbiguousSegmentation { clusters: usize },

    #[error("insufficient edge evidence: {0}")]
    InsufficientEdgeEvidence(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("segmentation model failed")]
    Model(#[source] anyhow::Error),
}

impl PoseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PoseError::MalformedInput(_) => FailureKind::MalformedInput,
            PoseError::Configuration(_) => FailureKind::Configuration,
            PoseError::AmbiguousSegmentation { .. } => FailureKind::AmbiguousSegmentation,
            PoseError::InsufficientEdgeEvidence(_) => FailureKind::InsufficientEdgeEvidence,
            PoseError::InvalidGeometry(_) => FailureKind::InvalidGeometry,
            PoseError::Model(_) => FailureKind::Model,
        }
    }
}

macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::PoseError::Configuration(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_config;
