//! Pure simulation logic for npsim.
//!
//! A population of synthetic users, each assigned a persona, evolves its
//! satisfaction and Net Promoter Score over discrete steps. Everything here
//! is plain data in, plain data out: no rendering, no file formats beyond
//! the persona catalog text, no host scheduler. The same code backs the
//! headless harness and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agent`] | Per-agent transition rule, NPS buckets, comment/sentiment |
//! | [`config`] | Run configuration bundle and validation |
//! | [`engine`] | Seeded simulation engine, metrics time series, comment log |
//! | [`error`] | Configuration and catalog error types |
//! | [`metrics`] | Overall/group/persona NPS and class percentages |
//! | [`personas`] | Strongly typed persona catalog (groups → personas) |
//! | [`report`] | Serializable end-of-run snapshot for presentation layers |
//!
//! ```
//! use npsim_logic::config::RunConfig;
//! use npsim_logic::engine::SimulationEngine;
//!
//! let config = RunConfig {
//!     num_users: 50,
//!     num_steps: 10,
//!     ..RunConfig::default()
//! };
//! let engine = SimulationEngine::simulate(&config).unwrap();
//! assert_eq!(engine.metrics().len(), 11);
//! assert_eq!(engine.comments().len(), 500);
//! ```

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod personas;
pub mod report;
