//! Errors reported to the operator

use std::io;
use std::path::PathBuf;

use relim_rules::DocumentError;
use thiserror::Error;

use crate::input::InputError;
use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("the rule file {} could not be read: {source}", .path.display())]
    RulesFile { path: PathBuf, source: io::Error },

    #[error("error while parsing the rule file {}: {source}", .path.display())]
    Document { path: PathBuf, source: DocumentError },

    #[error("invalid values: {0}")]
    Input(#[from] InputError),

    #[error("the limits of rule {rule:?} are out of range for this declared value")]
    OutOfRange { rule: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}
