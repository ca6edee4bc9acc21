//! Error types for the rf-app service layer.

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for the CLI and service callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Simulation faulted: {0}")]
    Faulted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<rf_project::ProjectError> for AppError {
    fn from(err: rf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<rf_sim::SimError> for AppError {
    fn from(err: rf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
