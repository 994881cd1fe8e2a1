//! Error types for copy and paste

use plait_core::{ModelError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("presentation {0} is not on a diagram")]
    DetachedPresentation(NodeId),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T, E = CopyError> = std::result::Result<T, E>;
