//! Model file loading, configuration presets and submission checks for the
//! form renderer.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod submission;

pub use config::{FormConfig, Preset};
pub use error::LoaderError;
pub use model::{FileStamp, FormModel};
pub use store::ModelStore;
pub use submission::{
    AcceptedSubmission, Rejection, SubmissionOutcome, check_submission, validate_submission,
};
