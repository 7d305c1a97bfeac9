//! npsim Headless Simulation Harness
//!
//! Runs a seeded persona population in-process and validates the
//! simulation's invariants against it. No rendering, no files written.
//!
//! Usage:
//!   cargo run -p npsim-simtest
//!   cargo run -p npsim-simtest -- --users 500 --steps 30 --seed 7 --verbose
//!   cargo run -p npsim-simtest -- --override "Data Engineer=3" --json

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use npsim_logic::agent::{comment_for, nps_bucket, Agent, Sentiment, NPS_VALUES};
use npsim_logic::config::RunConfig;
use npsim_logic::engine::SimulationEngine;
use npsim_logic::metrics::{ClassCounts, NpsClass};
use npsim_logic::personas::PersonaCatalog;
use npsim_logic::report::RunReport;
use tracing_subscriber::EnvFilter;

// ── Command line ────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "npsim-simtest", about = "Run and validate a persona NPS simulation")]
struct Args {
    /// Number of simulated users
    #[arg(long, default_value_t = 1000)]
    users: usize,

    /// Number of simulation steps
    #[arg(long, default_value_t = 50)]
    steps: usize,

    /// CSAT score in [0, 1] (recorded, not used by the transition rule)
    #[arg(long, default_value_t = 0.8)]
    csat: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Initial satisfaction override, e.g. "Data Engineer=3" (repeatable)
    #[arg(long = "override", value_name = "PERSONA=LEVEL", value_parser = parse_override)]
    overrides: Vec<(String, u8)>,

    /// Persona catalog JSON (defaults to the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Print every check and per-group detail
    #[arg(long)]
    verbose: bool,
}

fn parse_override(raw: &str) -> Result<(String, u8), String> {
    let (name, level) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PERSONA=LEVEL, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing persona name in '{raw}'"));
    }
    let level: u8 = level
        .trim()
        .parse()
        .map_err(|e| format!("invalid level in '{raw}': {e}"))?;
    Ok((name.to_string(), level))
}

impl Args {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            num_users: self.users,
            num_steps: self.steps,
            csat_score: self.csat,
            initial_satisfaction: self.overrides.iter().cloned().collect::<BTreeMap<_, _>>(),
            seed: self.seed,
        }
    }

    fn load_catalog(&self) -> Result<PersonaCatalog, String> {
        match &self.catalog {
            None => PersonaCatalog::builtin().map_err(|e| e.to_string()),
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("reading {}: {}", path.display(), e))?;
                PersonaCatalog::from_json(&text).map_err(|e| format!("{}: {}", path.display(), e))
            }
        }
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let catalog = match args.load_catalog() {
        Ok(c) => c,
        Err(e) => {
            error!("catalog error: {}", e);
            std::process::exit(2);
        }
    };

    let config = args.run_config();
    let engine = match build_and_run(&config, catalog.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    eprintln!("=== npsim Simulation Harness ===\n");
    let mut results = Vec::new();

    // 1. Persona catalog
    results.extend(validate_catalog(&catalog, args.verbose));

    // 2. Transition rule sweep
    results.extend(validate_transition_rule());

    // 3. Per-agent invariants over the run
    results.extend(validate_agent_invariants(&engine));

    // 4. Aggregates and log growth
    results.extend(validate_aggregates(&engine, args.verbose));

    // 5. Seeded reproducibility
    results.extend(validate_determinism(&config, &catalog, &engine));

    // ── Summary ──
    eprintln!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            eprintln!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    eprintln!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if args.json {
        let report = RunReport::from_engine(&engine);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("report serialization failed: {}", e);
                std::process::exit(2);
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn build_and_run(
    config: &RunConfig,
    catalog: PersonaCatalog,
) -> Result<SimulationEngine, npsim_logic::error::ConfigError> {
    let mut engine = SimulationEngine::new(config, catalog)?;
    engine.run(config.num_steps);
    info!(
        "ran {} agents for {} steps",
        engine.agents().len(),
        engine.current_step()
    );
    Ok(engine)
}

// ── 1. Persona Catalog ──────────────────────────────────────────────────

fn validate_catalog(catalog: &PersonaCatalog, verbose: bool) -> Vec<TestResult> {
    eprintln!("--- Persona Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: catalog.group_count() > 0 && catalog.persona_count() > 0,
        detail: format!(
            "{} groups, {} personas",
            catalog.group_count(),
            catalog.persona_count()
        ),
    });

    // Every persona resolves back to the group that lists it
    let misfiled: Vec<_> = catalog
        .personas()
        .filter(|(g, p)| catalog.group_of(&p.name) != Some(g.name.as_str()))
        .map(|(_, p)| p.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_one_group_per_persona".into(),
        passed: misfiled.is_empty(),
        detail: if misfiled.is_empty() {
            "every persona belongs to exactly one group".into()
        } else {
            format!("ambiguous personas: {}", misfiled.join(", "))
        },
    });

    let bad_baseline = catalog
        .personas()
        .filter(|(_, p)| p.satisfaction > 10 || p.nps > 10)
        .count();
    results.push(TestResult {
        name: "catalog_baselines_in_range".into(),
        passed: bad_baseline == 0,
        detail: format!("{} personas with baseline outside 0-10", bad_baseline),
    });

    if verbose {
        eprintln!("  Personas by group:");
        for group in catalog.groups() {
            eprintln!("    {:22}: {} personas", group.name, group.personas.len());
        }
    }

    results
}

// ── 2. Transition Rule ──────────────────────────────────────────────────

fn validate_transition_rule() -> Vec<TestResult> {
    eprintln!("--- Transition Rule ---");
    let mut results = Vec::new();

    let table: Vec<u8> = (0..=10).map(nps_bucket).collect();
    results.push(TestResult {
        name: "rule_nps_buckets".into(),
        passed: table == [2, 2, 2, 4, 4, 6, 6, 8, 8, 10, 10],
        detail: format!("satisfaction 0..=10 → {:?}", table),
    });

    let sentiments: Vec<Sentiment> = (0..=10).map(|s| comment_for(s).1).collect();
    let expected_sentiment = |s: u8| match s {
        8..=10 => Sentiment::Positive,
        5..=7 => Sentiment::Neutral,
        _ => Sentiment::Negative,
    };
    results.push(TestResult {
        name: "rule_sentiment_bands".into(),
        passed: (0..=10u8).all(|s| sentiments[s as usize] == expected_sentiment(s)),
        detail: "≥8 positive, 5-7 neutral, ≤4 negative".into(),
    });

    // Clamping at both ends
    let mut top = Agent::new(0, 0, 0, 10, 10);
    top.apply_fluctuation(1);
    let mut bottom = Agent::new(1, 0, 0, 0, 2);
    bottom.apply_fluctuation(-1);
    results.push(TestResult {
        name: "rule_clamps".into(),
        passed: top.satisfaction() == 10 && bottom.satisfaction() == 0,
        detail: format!(
            "10+1 → {}, 0-1 → {}",
            top.satisfaction(),
            bottom.satisfaction()
        ),
    });

    // NPS 8 is never a promoter, NPS 6 always a detractor
    results.push(TestResult {
        name: "rule_class_thresholds".into(),
        passed: NpsClass::of(8) == NpsClass::Passive
            && NpsClass::of(10) == NpsClass::Promoter
            && NpsClass::of(6) == NpsClass::Detractor,
        detail: "10 promoter, 8 passive, ≤6 detractor".into(),
    });

    results
}

// ── 3. Agent Invariants ─────────────────────────────────────────────────

fn validate_agent_invariants(engine: &SimulationEngine) -> Vec<TestResult> {
    eprintln!("--- Agent Invariants ---");
    let mut results = Vec::new();
    let history = engine.agent_history();

    let out_of_range = history.iter().filter(|r| r.satisfaction > 10).count();
    results.push(TestResult {
        name: "agents_satisfaction_clamped".into(),
        passed: out_of_range == 0,
        detail: format!(
            "{} of {} agent-step records outside 0-10",
            out_of_range,
            history.len()
        ),
    });

    let inconsistent = history
        .iter()
        .filter(|r| r.step > 0)
        .filter(|r| !NPS_VALUES.contains(&r.nps) || r.nps != nps_bucket(r.satisfaction))
        .count();
    results.push(TestResult {
        name: "agents_nps_matches_satisfaction".into(),
        passed: inconsistent == 0,
        detail: format!("{} stepped records with inconsistent NPS", inconsistent),
    });

    let n = engine.agents().len();
    let jumps = history
        .iter()
        .zip(history.iter().skip(n))
        .filter(|(a, b)| (a.satisfaction as i16 - b.satisfaction as i16).abs() > 1)
        .count();
    results.push(TestResult {
        name: "agents_move_one_level_per_step".into(),
        passed: jumps == 0,
        detail: format!("{} step transitions larger than ±1", jumps),
    });

    results
}

// ── 4. Aggregates & Logs ────────────────────────────────────────────────

fn validate_aggregates(engine: &SimulationEngine, verbose: bool) -> Vec<TestResult> {
    eprintln!("--- Aggregates & Logs ---");
    let mut results = Vec::new();
    let steps = engine.current_step();
    let n = engine.agents().len();

    results.push(TestResult {
        name: "logs_metrics_length".into(),
        passed: engine.metrics().len() == steps + 1,
        detail: format!("{} records after {} steps", engine.metrics().len(), steps),
    });

    results.push(TestResult {
        name: "logs_comment_length".into(),
        passed: engine.comments().len() == steps * n,
        detail: format!(
            "{} comments for {} steps × {} agents",
            engine.comments().len(),
            steps,
            n
        ),
    });

    let worst_sum_error = engine
        .metrics()
        .iter()
        .map(|m| (m.promoters_pct + m.passives_pct + m.detractors_pct - 100.0).abs())
        .fold(0.0_f64, f64::max);
    results.push(TestResult {
        name: "aggregates_shares_sum_to_100".into(),
        passed: worst_sum_error < 1e-6,
        detail: format!("max deviation {:.2e}", worst_sum_error),
    });

    // Latest record must agree with a fresh recount of the live population
    let recount = ClassCounts::tally(engine.agents()).nps_score();
    let recorded = engine.latest_metrics().map(|m| m.overall_nps).unwrap_or(0.0);
    results.push(TestResult {
        name: "aggregates_latest_matches_population".into(),
        passed: (recount - recorded).abs() < 1e-9,
        detail: format!("recorded {:.2}, recount {:.2}", recorded, recount),
    });

    if verbose {
        if let Some(latest) = engine.latest_metrics() {
            eprintln!(
                "  Final NPS {:.2} (promoters {:.1}%, passives {:.1}%, detractors {:.1}%)",
                latest.overall_nps, latest.promoters_pct, latest.passives_pct, latest.detractors_pct
            );
            for (group, nps) in &latest.group_nps {
                eprintln!("    {:22}: {:7.2}", group, nps);
            }
        }
        let report = RunReport::from_engine(engine);
        for s in Sentiment::all() {
            eprintln!("    {:8}: {} comments", s.label(), report.sentiments.get(*s));
        }
    }

    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(
    config: &RunConfig,
    catalog: &PersonaCatalog,
    engine: &SimulationEngine,
) -> Vec<TestResult> {
    eprintln!("--- Determinism ---");
    let mut results = Vec::new();

    match build_and_run(config, catalog.clone()) {
        Ok(replay) => {
            let same_metrics = replay.metrics() == engine.metrics();
            let same_comments = replay.comments() == engine.comments();
            results.push(TestResult {
                name: "determinism_replay".into(),
                passed: same_metrics && same_comments,
                detail: format!(
                    "seed {}: metrics identical={} comments identical={}",
                    config.seed, same_metrics, same_comments
                ),
            });
        }
        Err(e) => results.push(TestResult {
            name: "determinism_replay".into(),
            passed: false,
            detail: format!("replay failed: {}", e),
        }),
    }

    results
}
