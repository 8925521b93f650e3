use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {0}")]
    AI(#[from] AIError), // Errors raised at the generation boundary.

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError), // Invalid or unreadable scenario catalog.

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("No finished game to save")]
    NothingToSave,
}

// Errors related to the generation collaborator.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Failed to parse turn result: {0}")]
    TurnResultParse(String),
}

impl From<serde_json::Error> for AIError {
    fn from(err: serde_json::Error) -> AIError {
        AIError::TurnResultParse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has no scenarios")]
    Empty,

    #[error("Duplicate scenario id: {0}")]
    DuplicateScenario(String),

    #[error("Scenario {scenario}: {reason}")]
    InvalidScenario { scenario: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

// A stored transcript entry that breaks the role rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("User message cannot carry a mood or score delta")]
    UserWithOpponentFields,

    #[error("Opponent message has no mood")]
    MissingMood,

    #[error("Score delta {0} is out of range")]
    DeltaOutOfRange(i32),
}
