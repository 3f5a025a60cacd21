//! Tournament scheduling and rating simulation core.
//!
//! This crate simulates multi-round tournaments for four-team, two-alliance
//! events under random or Swiss-system scheduling, to study how scheduling
//! choice, tie-break formula and score noise affect how well a predictive
//! rating tracks the final standings. The pieces:
//!
//! - Weighted-graph Swiss pairing over a maximum-weight matching solver
//! - A regularized least-squares rating estimator
//! - A formula-driven ranking and tie-break engine
//! - The trial orchestrator that drives rounds, days and statistics
//!
//! The `tourney_sim` binary wires this crate to a TOML options file.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod formula;
pub mod output;
pub mod pairing;
pub mod ranking;
pub mod rating;
pub mod scheduler;
pub mod sim;
pub mod stats;
pub mod types;

pub use config::{Options, PairingMethod, SchedulingModel, TbpMethod};
pub use engine::Engine;
pub use error::{Error, Result};
pub use stats::{BatchStats, EventStats};
pub use types::{Alliance, Match, MatchSet, Roster, Team};
