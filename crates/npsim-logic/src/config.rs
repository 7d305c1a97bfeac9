//! Run configuration: the opaque parameter bundle a driver hands the engine.
//!
//! ```
//! use npsim_logic::config::{validate_config, RunConfig};
//!
//! let mut config = RunConfig::default();
//! config.initial_satisfaction.insert("Data Engineer".into(), 3);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agent::MAX_SATISFACTION;
use crate::error::ConfigError;

/// Parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of agents (must be ≥ 1).
    pub num_users: usize,
    /// Number of steps a driver should run.
    pub num_steps: usize,
    /// Satisfaction-influence score in [0, 1]. Recorded with the run but
    /// not read by the transition rule.
    pub csat_score: f64,
    /// Persona name → initial satisfaction (0–10). Personas not listed
    /// start from their catalog baseline; unknown names are ignored.
    pub initial_satisfaction: BTreeMap<String, u8>,
    /// Seed for the run's random stream.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_users: 1000,
            num_steps: 50,
            csat_score: 0.8,
            initial_satisfaction: BTreeMap::new(),
            seed: 42,
        }
    }
}

/// Validate a run configuration, returning all errors found.
pub fn validate_config(config: &RunConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.num_users == 0 {
        errors.push(ConfigError::EmptyPopulation(config.num_users));
    }
    if !(0.0..=1.0).contains(&config.csat_score) {
        errors.push(ConfigError::CsatOutOfRange(config.csat_score));
    }
    for (persona, &value) in &config.initial_satisfaction {
        if value > MAX_SATISFACTION {
            errors.push(ConfigError::SatisfactionOutOfRange {
                persona: persona.clone(),
                value,
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let errors = validate_config(&RunConfig::default());
        assert!(errors.is_empty(), "default config should be valid: {errors:?}");
    }

    #[test]
    fn zero_users_rejected() {
        let config = RunConfig {
            num_users: 0,
            ..RunConfig::default()
        };
        assert_eq!(validate_config(&config), vec![ConfigError::EmptyPopulation(0)]);
    }

    #[test]
    fn csat_out_of_range_rejected() {
        for csat in [-0.1, 1.5, f64::NAN] {
            let config = RunConfig {
                csat_score: csat,
                ..RunConfig::default()
            };
            let errors = validate_config(&config);
            assert_eq!(errors.len(), 1, "csat {csat}");
            assert!(matches!(errors[0], ConfigError::CsatOutOfRange(_)));
        }
    }

    #[test]
    fn csat_bounds_accepted() {
        for csat in [0.0, 1.0] {
            let config = RunConfig {
                csat_score: csat,
                ..RunConfig::default()
            };
            assert!(validate_config(&config).is_empty());
        }
    }

    #[test]
    fn override_above_ten_rejected() {
        let mut config = RunConfig::default();
        config.initial_satisfaction.insert("Data Steward".into(), 11);
        config.initial_satisfaction.insert("DataOps".into(), 10);
        assert_eq!(
            validate_config(&config),
            vec![ConfigError::SatisfactionOutOfRange {
                persona: "Data Steward".into(),
                value: 11,
            }]
        );
    }

    #[test]
    fn unknown_persona_override_is_not_an_error() {
        let mut config = RunConfig::default();
        config.initial_satisfaction.insert("Nobody".into(), 4);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = RunConfig {
            num_users: 0,
            csat_score: 2.0,
            ..RunConfig::default()
        };
        config.initial_satisfaction.insert("Data Steward".into(), 200);
        assert_eq!(validate_config(&config).len(), 3);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: RunConfig =
            serde_json::from_str(r#"{"num_users": 3, "initial_satisfaction": {"DataOps": 2}}"#)
                .unwrap();
        assert_eq!(config.num_users, 3);
        assert_eq!(config.num_steps, 50);
        assert_eq!(config.initial_satisfaction["DataOps"], 2);
    }
}
