//! Metrics aggregation: overall, per-group and per-persona NPS.
//!
//! All functions are read-only over the current agent population and are
//! re-derived from scratch on every call. Promoter/passive/detractor bands
//! are applied to the agent's NPS value:
//!
//! | Class | NPS |
//! |-------|-----|
//! | Promoter | ≥ 9 |
//! | Passive | 7–8 |
//! | Detractor | ≤ 6 |
//!
//! An empty population (or a group/persona with no agents) yields 0 rather
//! than dividing by zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Sentiment};
use crate::personas::PersonaCatalog;

/// Promoter/passive/detractor classification of one NPS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpsClass {
    Promoter,
    Passive,
    Detractor,
}

impl NpsClass {
    pub fn of(nps: u8) -> Self {
        match nps {
            9..=u8::MAX => NpsClass::Promoter,
            7..=8 => NpsClass::Passive,
            _ => NpsClass::Detractor,
        }
    }
}

/// Promoter/passive/detractor head counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub promoters: usize,
    pub passives: usize,
    pub detractors: usize,
}

impl ClassCounts {
    pub fn tally<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut counts = Self::default();
        for agent in agents {
            match NpsClass::of(agent.nps()) {
                NpsClass::Promoter => counts.promoters += 1,
                NpsClass::Passive => counts.passives += 1,
                NpsClass::Detractor => counts.detractors += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.promoters + self.passives + self.detractors
    }

    /// (promoters − detractors) / total × 100, or 0 when empty.
    pub fn nps_score(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.promoters as f64 - self.detractors as f64) / total as f64 * 100.0
    }

    pub fn promoters_pct(&self) -> f64 {
        percent(self.promoters, self.total())
    }

    pub fn passives_pct(&self) -> f64 {
        percent(self.passives, self.total())
    }

    pub fn detractors_pct(&self) -> f64 {
        percent(self.detractors, self.total())
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// (promoters − detractors) / population × 100.
pub fn overall_nps(agents: &[Agent]) -> f64 {
    ClassCounts::tally(agents).nps_score()
}

pub fn promoters_pct(agents: &[Agent]) -> f64 {
    ClassCounts::tally(agents).promoters_pct()
}

pub fn passives_pct(agents: &[Agent]) -> f64 {
    ClassCounts::tally(agents).passives_pct()
}

pub fn detractors_pct(agents: &[Agent]) -> f64 {
    ClassCounts::tally(agents).detractors_pct()
}

/// NPS per group name. Every catalog group is present; empty groups score 0.
pub fn group_nps(agents: &[Agent], catalog: &PersonaCatalog) -> BTreeMap<String, f64> {
    catalog
        .groups()
        .iter()
        .enumerate()
        .map(|(gi, group)| {
            let counts = ClassCounts::tally(agents.iter().filter(|a| a.group == gi));
            (group.name.clone(), counts.nps_score())
        })
        .collect()
}

/// Aggregate metrics for one recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// 0 is the snapshot taken before any step.
    pub step: usize,
    pub overall_nps: f64,
    pub promoters_pct: f64,
    pub passives_pct: f64,
    pub detractors_pct: f64,
    pub group_nps: BTreeMap<String, f64>,
}

impl MetricsRecord {
    pub fn capture(step: usize, agents: &[Agent], catalog: &PersonaCatalog) -> Self {
        Self {
            step,
            overall_nps: overall_nps(agents),
            promoters_pct: promoters_pct(agents),
            passives_pct: passives_pct(agents),
            detractors_pct: detractors_pct(agents),
            group_nps: group_nps(agents, catalog),
        }
    }
}

/// Class shares and NPS for one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaNps {
    pub group: String,
    pub persona: String,
    pub agents: usize,
    pub promoters_pct: f64,
    pub passives_pct: f64,
    pub detractors_pct: f64,
    pub nps_score: f64,
}

/// Per-persona breakdown for personas with at least one agent, in catalog order.
pub fn persona_breakdown(agents: &[Agent], catalog: &PersonaCatalog) -> Vec<PersonaNps> {
    let mut rows = Vec::new();
    for (gi, group) in catalog.groups().iter().enumerate() {
        for (pi, persona) in group.personas.iter().enumerate() {
            let counts = ClassCounts::tally(
                agents
                    .iter()
                    .filter(|a| a.group == gi && a.persona == pi),
            );
            let total = counts.total();
            if total == 0 {
                continue;
            }
            rows.push(PersonaNps {
                group: group.name.clone(),
                persona: persona.name.clone(),
                agents: total,
                promoters_pct: counts.promoters_pct(),
                passives_pct: counts.passives_pct(),
                detractors_pct: counts.detractors_pct(),
                nps_score: counts.nps_score(),
            });
        }
    }
    rows
}

/// Number of comments per sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn tally(sentiments: impl IntoIterator<Item = Sentiment>) -> Self {
        let mut counts = Self::default();
        for s in sentiments {
            match s {
                Sentiment::Positive => counts.positive += 1,
                Sentiment::Neutral => counts.neutral += 1,
                Sentiment::Negative => counts.negative += 1,
            }
        }
        counts
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_with_nps(id: usize, group: usize, nps: u8) -> Agent {
        Agent::new(id, group, 0, 5, nps)
    }

    #[test]
    fn test_class_bands() {
        assert_eq!(NpsClass::of(10), NpsClass::Promoter);
        assert_eq!(NpsClass::of(9), NpsClass::Promoter);
        assert_eq!(NpsClass::of(8), NpsClass::Passive);
        assert_eq!(NpsClass::of(7), NpsClass::Passive);
        assert_eq!(NpsClass::of(6), NpsClass::Detractor);
        assert_eq!(NpsClass::of(0), NpsClass::Detractor);
    }

    #[test]
    fn test_empty_population_is_zero() {
        let agents: Vec<Agent> = Vec::new();
        assert_eq!(overall_nps(&agents), 0.0);
        assert_eq!(promoters_pct(&agents), 0.0);
        assert_eq!(passives_pct(&agents), 0.0);
        assert_eq!(detractors_pct(&agents), 0.0);
    }

    #[test]
    fn test_mixed_population() {
        let agents = vec![
            agent_with_nps(0, 0, 10),
            agent_with_nps(1, 0, 10),
            agent_with_nps(2, 1, 8),
            agent_with_nps(3, 1, 6),
        ];
        assert!((overall_nps(&agents) - 25.0).abs() < 1e-9);
        assert!((promoters_pct(&agents) - 50.0).abs() < 1e-9);
        assert!((passives_pct(&agents) - 25.0).abs() < 1e-9);
        assert!((detractors_pct(&agents) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_nps_six_is_detractor() {
        let agents = vec![agent_with_nps(0, 0, 6); 3];
        assert_eq!(overall_nps(&agents), -100.0);
        assert_eq!(detractors_pct(&agents), 100.0);
    }

    #[test]
    fn test_group_nps_includes_empty_groups() {
        let catalog = PersonaCatalog::builtin().unwrap();
        let agents = vec![agent_with_nps(0, 0, 10), agent_with_nps(1, 0, 2)];
        let by_group = group_nps(&agents, &catalog);

        assert_eq!(by_group.len(), catalog.group_count());
        assert_eq!(by_group["Business Specialist"], 0.0);
        assert_eq!(by_group["Data Expert"], 0.0);

        let promoters_only = vec![agent_with_nps(0, 2, 10)];
        assert_eq!(group_nps(&promoters_only, &catalog)["Data Expert"], 100.0);
    }

    #[test]
    fn test_capture_sums_to_hundred() {
        let catalog = PersonaCatalog::builtin().unwrap();
        let agents: Vec<Agent> = (0..7)
            .map(|i| agent_with_nps(i, i % 4, [2, 4, 6, 8, 10, 7, 9][i]))
            .collect();
        let record = MetricsRecord::capture(3, &agents, &catalog);
        assert_eq!(record.step, 3);
        let sum = record.promoters_pct + record.passives_pct + record.detractors_pct;
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_capture_matches_aggregate_functions() {
        let catalog = PersonaCatalog::builtin().unwrap();
        let agents = vec![
            agent_with_nps(0, 0, 10),
            agent_with_nps(1, 1, 9),
            agent_with_nps(2, 1, 8),
            agent_with_nps(3, 2, 4),
            agent_with_nps(4, 3, 2),
        ];
        let record = MetricsRecord::capture(1, &agents, &catalog);
        assert_eq!(record.overall_nps, overall_nps(&agents));
        assert_eq!(record.promoters_pct, promoters_pct(&agents));
        assert_eq!(record.passives_pct, passives_pct(&agents));
        assert_eq!(record.detractors_pct, detractors_pct(&agents));
        assert_eq!(record.group_nps, group_nps(&agents, &catalog));
        assert!(record.overall_nps.abs() < 1e-9);
        assert!((record.promoters_pct - 40.0).abs() < 1e-9);
        assert!((record.passives_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_class_counts_shares() {
        let counts = ClassCounts {
            promoters: 1,
            passives: 1,
            detractors: 2,
        };
        assert_eq!(counts.promoters_pct(), 25.0);
        assert_eq!(counts.passives_pct(), 25.0);
        assert_eq!(counts.detractors_pct(), 50.0);
        assert_eq!(ClassCounts::default().promoters_pct(), 0.0);
    }

    #[test]
    fn test_persona_breakdown_skips_absent_personas() {
        let catalog = PersonaCatalog::builtin().unwrap();
        let agents = vec![
            Agent::new(0, 2, 1, 9, 10),
            Agent::new(1, 2, 1, 5, 6),
            Agent::new(2, 0, 0, 7, 8),
        ];
        let rows = persona_breakdown(&agents, &catalog);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].persona, "Operational Worker");
        assert_eq!(rows[0].passives_pct, 100.0);

        assert_eq!(rows[1].group, "Data Expert");
        assert_eq!(rows[1].persona, "Data Engineer");
        assert_eq!(rows[1].agents, 2);
        assert_eq!(rows[1].nps_score, 0.0);
        assert_eq!(rows[1].promoters_pct, 50.0);
    }

    #[test]
    fn test_sentiment_counts() {
        let counts = SentimentCounts::tally([
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Negative,
        ]);
        assert_eq!(counts.get(Sentiment::Positive), 1);
        assert_eq!(counts.get(Sentiment::Neutral), 0);
        assert_eq!(counts.get(Sentiment::Negative), 2);
        assert_eq!(counts.total(), 3);
    }
}
