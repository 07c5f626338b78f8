use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid level name: {0:?}")]
    InvalidLevelName(String),
    #[error("invalid parameter name: {0:?}")]
    InvalidParameterName(String),
    #[error("duplicate access level: {0}")]
    DuplicateLevel(String),
    #[error("access level list is empty")]
    EmptyCatalog,
    #[error("invalid repeat bounds: repeat_min {min} exceeds repeat_max {max}")]
    InvalidRepeatBounds { min: u32, max: u32 },
    #[error("repeat_min {min} exceeds the limit of {limit} instances")]
    RepeatMinTooLarge { min: u32, limit: u32 },
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("malformed {kind} component: {message}")]
    Malformed { kind: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
