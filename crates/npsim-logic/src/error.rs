//! Error types for run configuration and persona catalog loading.

use thiserror::Error;

/// Run configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A run needs at least one agent.
    #[error("invalid configuration: population size must be at least 1, got {0}")]
    EmptyPopulation(usize),
    /// CSAT score outside [0, 1] (or NaN).
    #[error("invalid configuration: csat score must be within 0.0..=1.0, got {0}")]
    CsatOutOfRange(f64),
    /// Initial satisfaction override outside [0, 10].
    #[error("invalid configuration: initial satisfaction for '{persona}' must be within 0..=10, got {value}")]
    SatisfactionOutOfRange { persona: String, value: u8 },
}

/// Persona catalog loading error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no groups")]
    NoGroups,
    #[error("group '{0}' has no personas")]
    EmptyGroup(String),
    #[error("duplicate group name '{0}'")]
    DuplicateGroup(String),
    #[error("duplicate persona name '{0}'")]
    DuplicatePersona(String),
    /// Baseline satisfaction or NPS outside [0, 10].
    #[error("persona '{persona}' has {field} {value}, expected 0..=10")]
    BaselineOutOfRange {
        persona: String,
        field: &'static str,
        value: u8,
    },
}

/// Any failure while setting up a run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
