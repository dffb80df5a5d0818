//! Synthetic student-activity generation.
//!
//! A daily interest signal decides how many students are active each day;
//! the generator fabricates their movie and quiz records, deliberately
//! injects duplicate-ingestion noise, and the store persists the result.

pub mod activity;
pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod persist;
pub mod rng;
pub mod score;
pub mod store;
pub mod trend;
pub mod types;
