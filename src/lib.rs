//! crosstrader: single-shot moving-average crossover trading engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. One invocation runs one cycle:
//! signal generation, risk vetting, then at most one order submission, always
//! ending in a reportable execution result.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
