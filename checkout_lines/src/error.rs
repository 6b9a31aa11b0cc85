//! Error types for the checkout simulation.

use des::DesError;
use des::parallel::ScenarioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected before any simulation starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No customer finished service, so there is no mean to take.
    #[error("no completed services at arrival interval {interval} (trial {trial})")]
    NoSamples { interval: f64, trial: usize },

    #[error("trial {trial} produced no store statistics")]
    MissingStats { trial: usize },

    #[error("simulation engine error: {0}")]
    Engine(#[from] DesError),

    #[error("trial {trial} panicked: {message}")]
    TrialPanicked { trial: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SimError {
    pub(crate) fn invalid(message: impl Into<String>) -> SimError {
        SimError::InvalidConfiguration(message.into())
    }

    pub(crate) fn from_scenario(trial: usize, error: ScenarioError) -> SimError {
        match error {
            ScenarioError::Engine(e) => SimError::Engine(e),
            ScenarioError::Panicked(message) => SimError::TrialPanicked { trial, message },
        }
    }
}
