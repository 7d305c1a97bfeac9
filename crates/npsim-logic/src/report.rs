//! End-of-run snapshot handed to presentation layers.
//!
//! The report carries data only. Charts, tables and file exports are the
//! caller's business; serializing the report with serde is as far as this
//! crate goes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::engine::SimulationEngine;
use crate::metrics::{persona_breakdown, MetricsRecord, PersonaNps, SentimentCounts};

/// Aggregated results of a finished (or in-progress) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: RunConfig,
    pub steps_run: usize,
    pub agent_count: usize,
    /// Metrics time series, step 0 first.
    pub metrics: Vec<MetricsRecord>,
    /// Metrics of the latest recorded step.
    pub final_metrics: Option<MetricsRecord>,
    /// Latest NPS per group.
    pub group_nps: BTreeMap<String, f64>,
    /// Latest class shares and NPS per persona present in the population.
    pub personas: Vec<PersonaNps>,
    /// Sentiment totals over the whole comment log.
    pub sentiments: SentimentCounts,
}

impl RunReport {
    pub fn from_engine(engine: &SimulationEngine) -> Self {
        let final_metrics = engine.latest_metrics().cloned();
        let group_nps = final_metrics
            .as_ref()
            .map(|m| m.group_nps.clone())
            .unwrap_or_default();

        Self {
            config: engine.config().clone(),
            steps_run: engine.current_step(),
            agent_count: engine.agents().len(),
            metrics: engine.metrics().to_vec(),
            final_metrics,
            group_nps,
            personas: persona_breakdown(engine.agents(), engine.catalog()),
            sentiments: SentimentCounts::tally(engine.comments().iter().map(|c| c.sentiment)),
        }
    }

    /// Overall NPS of the latest step, or 0 if nothing was recorded.
    pub fn final_nps(&self) -> f64 {
        self.final_metrics
            .as_ref()
            .map(|m| m.overall_nps)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_matches_engine() {
        let config = RunConfig {
            num_users: 60,
            num_steps: 6,
            seed: 9,
            ..RunConfig::default()
        };
        let engine = SimulationEngine::simulate(&config).unwrap();
        let report = RunReport::from_engine(&engine);

        assert_eq!(report.steps_run, 6);
        assert_eq!(report.agent_count, 60);
        assert_eq!(report.metrics.len(), 7);
        assert_eq!(report.sentiments.total(), 360);
        assert_eq!(report.group_nps.len(), 4);
        assert_eq!(report.final_nps(), engine.metrics()[6].overall_nps);

        let persona_agents: usize = report.personas.iter().map(|p| p.agents).sum();
        assert_eq!(persona_agents, 60);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let config = RunConfig {
            num_users: 5,
            num_steps: 1,
            ..RunConfig::default()
        };
        let engine = SimulationEngine::simulate(&config).unwrap();
        let report = RunReport::from_engine(&engine);

        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.steps_run, report.steps_run);
        assert_eq!(back.sentiments, report.sentiments);
    }
}
