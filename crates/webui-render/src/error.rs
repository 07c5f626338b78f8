#![deny(unsafe_code)]

use std::path::PathBuf;

use webui_model::NodePath;

/// Render-time data problems.
///
/// None of these abort a render: the offending node is skipped and the
/// error is kept as a notice for the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown component type '{kind}' at {path}")]
    UnknownComponentType { path: NodePath, kind: String },

    #[error("unknown datatype '{datatype}' for parameter '{name}' at {path}")]
    UnknownDatatype {
        path: NodePath,
        name: String,
        datatype: String,
    },

    #[error("field id '{id}' at {path} is already used by another parameter")]
    DuplicateFieldId { path: NodePath, id: String },

    #[error("{operation} is not implemented (component at {path})")]
    UnimplementedOperation {
        operation: &'static str,
        path: NodePath,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("failed to write markup: {0}")]
    Write(String),

    #[error("rendered markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown access level: {0}")]
    UnknownLevel(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {0} is disabled at the current level")]
    FieldDisabled(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache entry {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Markup(#[from] MarkupError),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
