//! Simulation engine: owns the population, the random stream and the run logs.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{nps_bucket, Agent, Sentiment};
use crate::config::{validate_config, RunConfig};
use crate::error::{ConfigError, SimError};
use crate::metrics::MetricsRecord;
use crate::personas::PersonaCatalog;

/// One agent's comment for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub agent_id: usize,
    pub group: String,
    pub persona: String,
    pub comment: String,
    pub sentiment: Sentiment,
}

/// One agent's state at one recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub step: usize,
    pub agent_id: usize,
    pub group: String,
    pub persona: String,
    pub satisfaction: u8,
    pub nps: u8,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// Configuration the run was built from
    config: RunConfig,
    /// Groups and personas agents refer to
    catalog: PersonaCatalog,
    /// All agents, in creation order
    agents: Vec<Agent>,
    /// The run's only source of randomness
    rng: ChaCha8Rng,
    /// Steps executed so far
    step: usize,
    /// Metrics per recorded step, starting with the step-0 snapshot
    metrics: Vec<MetricsRecord>,
    /// Every comment emitted, in step then agent order
    comments: Vec<CommentRecord>,
    /// Per-agent state per recorded step
    agent_history: Vec<AgentRecord>,
}

impl SimulationEngine {
    /// Build a run from `config` against `catalog`.
    ///
    /// Each agent draws a group index, then a persona index within that
    /// group, from the seeded stream in creation order. Initial satisfaction
    /// comes from the persona's override if one is configured, otherwise from
    /// its baseline. Initial NPS is the persona's baseline NPS, except for
    /// overridden personas: their NPS is `nps_bucket(override)`, not the
    /// catalog baseline, so the step-0 snapshot classifies them by the
    /// overridden satisfaction. Overriding Data Engineer (baseline NPS 9)
    /// to 3 therefore starts those agents at NPS 4, as detractors.
    pub fn new(config: &RunConfig, catalog: PersonaCatalog) -> Result<Self, ConfigError> {
        if let Some(err) = validate_config(config).into_iter().next() {
            return Err(err);
        }

        for name in config.initial_satisfaction.keys() {
            if catalog.find_persona(name).is_none() {
                debug!("ignoring initial satisfaction for unknown persona '{}'", name);
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut agents = Vec::with_capacity(config.num_users);
        for id in 0..config.num_users {
            let group = rng.gen_range(0..catalog.group_count());
            let persona_count = catalog.groups()[group].personas.len();
            let persona = rng.gen_range(0..persona_count);
            let record = &catalog.groups()[group].personas[persona];

            let agent = match config.initial_satisfaction.get(&record.name) {
                Some(&satisfaction) => {
                    Agent::new(id, group, persona, satisfaction, nps_bucket(satisfaction))
                }
                None => Agent::new(id, group, persona, record.satisfaction, record.nps),
            };
            agents.push(agent);
        }

        let mut engine = Self {
            config: config.clone(),
            catalog,
            agents,
            rng,
            step: 0,
            metrics: Vec::new(),
            comments: Vec::new(),
            agent_history: Vec::new(),
        };
        engine.collect();

        info!(
            "Simulation created: {} agents across {} groups (seed {}, csat {:.2})",
            engine.agents.len(),
            engine.catalog.group_count(),
            config.seed,
            config.csat_score
        );

        Ok(engine)
    }

    /// Build with the built-in catalog and run `config.num_steps` steps.
    pub fn simulate(config: &RunConfig) -> Result<Self, SimError> {
        let catalog = PersonaCatalog::builtin()?;
        let mut engine = Self::new(config, catalog)?;
        engine.run(config.num_steps);
        Ok(engine)
    }

    /// Advance every agent by one step, then record metrics and comments.
    pub fn step(&mut self) {
        for agent in &mut self.agents {
            agent.step(&mut self.rng);
        }
        self.step += 1;
        self.collect();

        for agent in &self.agents {
            self.comments.push(CommentRecord {
                agent_id: agent.id,
                group: self.catalog.groups()[agent.group].name.clone(),
                persona: self.catalog.groups()[agent.group].personas[agent.persona]
                    .name
                    .clone(),
                comment: agent.comment().to_string(),
                sentiment: agent.sentiment(),
            });
        }

        if let Some(latest) = self.metrics.last() {
            debug!(
                "step {}: nps={:.1} promoters={:.1}% passives={:.1}% detractors={:.1}%",
                self.step,
                latest.overall_nps,
                latest.promoters_pct,
                latest.passives_pct,
                latest.detractors_pct
            );
        }
    }

    /// Run `steps` sequential steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
        if let Some(latest) = self.metrics.last() {
            info!(
                "Simulation finished at step {}: overall NPS {:.2}",
                self.step, latest.overall_nps
            );
        }
    }

    /// Record metrics and per-agent state for the current step.
    fn collect(&mut self) {
        self.metrics
            .push(MetricsRecord::capture(self.step, &self.agents, &self.catalog));

        for agent in &self.agents {
            let group = &self.catalog.groups()[agent.group];
            self.agent_history.push(AgentRecord {
                step: self.step,
                agent_id: agent.id,
                group: group.name.clone(),
                persona: group.personas[agent.persona].name.clone(),
                satisfaction: agent.satisfaction(),
                nps: agent.nps(),
            });
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Metrics time series; index `i` holds step `i`.
    pub fn metrics(&self) -> &[MetricsRecord] {
        &self.metrics
    }

    pub fn latest_metrics(&self) -> Option<&MetricsRecord> {
        self.metrics.last()
    }

    pub fn comments(&self) -> &[CommentRecord] {
        &self.comments
    }

    pub fn agent_history(&self) -> &[AgentRecord] {
        &self.agent_history
    }

    /// Number of steps executed so far.
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// The configured satisfaction-influence score. Not read by the
    /// transition rule.
    pub fn csat_score(&self) -> f64 {
        self.config.csat_score
    }
}
