//! Error types for the three-way compare

use plait_core::{ModelError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChangesetError {
    /// The same id names elements of different types in ancestor and incoming.
    #[error("incompatible types for element {id}: {ancestor} != {incoming}")]
    UnmatchableModel {
        id: NodeId,
        ancestor: String,
        incoming: String,
    },

    #[error("element {0} is not a valid change record")]
    InvalidChange(NodeId),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T, E = ChangesetError> = std::result::Result<T, E>;
