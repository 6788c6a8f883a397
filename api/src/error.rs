use std::time::Duration;

use thiserror::Error;

use crate::ObjectKey;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Object metadata is missing: {0}")]
    ObjectMetaMissing(&'static str),
    #[error("Invalid apiVersion {0:?}")]
    InvalidApiVersion(String),
    #[error("Unknown resource kind {0}")]
    UnknownResourceKind(ObjectKey),
    #[error("Failed to serialize {key}: {source}")]
    Serialization {
        key: ObjectKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode {type_name} as an object: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Apply of {key} conflicts with fields owned by another manager: {message}")]
    Conflict { key: ObjectKey, message: String },
    #[error("Request for {key} failed: {source}")]
    Transport {
        key: ObjectKey,
        #[source]
        source: kube::Error,
    },
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),
    #[error("Request for {key} timed out after {timeout:?}")]
    Timeout { key: ObjectKey, timeout: Duration },
    #[error("Field manager name must not be empty")]
    EmptyFieldManager,
    #[error("Expected a value of type {0} but found {1}")]
    ExpectedType(&'static str, &'static str),
}

impl Error {
    pub(crate) fn expected_json_type(expected: &'static str, found: &serde_json::Value) -> Self {
        match found {
            serde_json::Value::Null => Self::ExpectedType(expected, "null"),
            serde_json::Value::Bool(_) => Self::ExpectedType(expected, "bool"),
            serde_json::Value::Number(_) => Self::ExpectedType(expected, "number"),
            serde_json::Value::String(_) => Self::ExpectedType(expected, "string"),
            serde_json::Value::Array(_) => Self::ExpectedType(expected, "array"),
            serde_json::Value::Object(_) => Self::ExpectedType(expected, "object"),
        }
    }

    /// Replaces the key of an error raised before the object's name was
    /// known, e.g. by discovery, with the full key of `object`.
    pub(crate) fn for_object(self, object: &ObjectKey) -> Self {
        match self {
            Self::UnknownResourceKind(_) => Self::UnknownResourceKind(object.clone()),
            Self::Serialization { source, .. } => Self::Serialization {
                key: object.clone(),
                source,
            },
            Self::Conflict { message, .. } => Self::Conflict {
                key: object.clone(),
                message,
            },
            Self::Transport { source, .. } => Self::Transport {
                key: object.clone(),
                source,
            },
            Self::Timeout { timeout, .. } => Self::Timeout {
                key: object.clone(),
                timeout,
            },
            err => err,
        }
    }

    /// Maps a failed apply request. The API server answers field ownership
    /// conflicts with 409.
    pub(crate) fn from_apply(key: ObjectKey, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 409 => Self::Conflict {
                key,
                message: response.message.clone(),
            },
            source => Self::Transport { key, source },
        }
    }

    #[inline]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    #[inline]
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Self::UnknownResourceKind(_))
    }

    /// The object the error concerns, when there is one.
    pub fn key(&self) -> Option<&ObjectKey> {
        match self {
            Self::UnknownResourceKind(key)
            | Self::Serialization { key, .. }
            | Self::Conflict { key, .. }
            | Self::Transport { key, .. }
            | Self::Timeout { key, .. } => Some(key),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error(transparent)]
    Config(#[from] kube::config::InferConfigError),
    #[error(transparent)]
    Kube(#[from] kube::Error),
    #[error(transparent)]
    Dynamic(#[from] Error),
}
