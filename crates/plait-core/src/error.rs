//! Error types for the model graph

use thiserror::Error;

use crate::model::NodeId;

/// Errors raised while building, loading or resolving a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no element with id {0}")]
    UnknownElement(NodeId),

    #[error("{element_type} has no property {property:?}")]
    UnknownProperty {
        element_type: String,
        property: String,
    },

    #[error("unknown element type {name:?} (namespace {namespace:?})")]
    UnknownType {
        name: String,
        namespace: Option<String>,
    },

    #[error("unknown modeling language namespace {0:?}")]
    UnknownNamespace(String),

    #[error("element {0} is not a diagram")]
    NotADiagram(NodeId),

    #[error("element id {0} is out of range")]
    IdOutOfRange(NodeId),

    #[error("element id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("invalid value {value:?} for property {property:?}")]
    InvalidValue { property: String, value: String },

    #[error("property {0:?} does not hold references")]
    NotAReference(String),

    #[error("malformed transport payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
