//! Validation of posted form data against the loaded model.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use webui_model::Level;

use crate::model::FormModel;

/// Why a submission was refused. The messages are shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Invalid POST format (no valid JSON)")]
    InvalidJson,
    #[error("Submitted form data is incomplete.")]
    Incomplete,
    #[error(
        "The data model has changed since you loaded this form, please reload and try again."
    )]
    ModelChanged,
    #[error(
        "The selected form level is too high, please request a higher access level or select a different level above."
    )]
    LevelTooHigh,
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSubmission {
    pub level: Level,
    /// Remaining posted fields, without `form_version` and `level`.
    pub values: Map<String, Value>,
}

/// Response body returned to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
}

impl SubmissionOutcome {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: "Submission accepted.".to_string(),
        }
    }

    pub fn rejected(reason: &Rejection) -> Self {
        Self {
            success: false,
            message: reason.to_string(),
        }
    }
}

pub fn validate_submission(
    json: &str,
    model: &FormModel,
    user_max: Level,
) -> Result<AcceptedSubmission, Rejection> {
    let data: Value = serde_json::from_str(json).map_err(|_| Rejection::InvalidJson)?;
    let Value::Object(mut values) = data else {
        return Err(Rejection::Incomplete);
    };
    let version = values.remove("form_version").ok_or(Rejection::Incomplete)?;
    let level = values.remove("level").ok_or(Rejection::Incomplete)?;

    if version.as_str() != Some(model.version_tag().as_str()) {
        return Err(Rejection::ModelChanged);
    }
    let level = level
        .as_str()
        .and_then(|name| model.catalog.find(name))
        .filter(|level| *level <= user_max)
        .ok_or(Rejection::LevelTooHigh)?;

    Ok(AcceptedSubmission { level, values })
}

/// Check a posted form and build the response for it.
pub fn check_submission(json: &str, model: &FormModel, user_max: Level) -> SubmissionOutcome {
    match validate_submission(json, model, user_max) {
        Ok(accepted) => {
            info!(
                level = accepted.level.index(),
                fields = accepted.values.len(),
                "submission accepted"
            );
            SubmissionOutcome::accepted()
        }
        Err(reason) => {
            warn!(%reason, "submission rejected");
            SubmissionOutcome::rejected(&reason)
        }
    }
}
