//! Analysis engine.
//!
//! This module is the entry point for running rules over a document. It is
//! split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! PipelineConfig ── RuleRegistry::from_config ──┐       (registry.rs)
//!                                               │
//! text ── segment ── InputTraits::scan ─────────┴─ select active rules
//!                    (trigger.rs)                  │
//!                                                  v
//!                                        Runner::run (runner.rs)
//!                                          - rules in parallel (rayon)
//!                                          - panics / errors isolated per rule
//!                                          - deadline polled by rules
//!                                                  │
//!                                                  v
//!                                        aggregate (resolve.rs)
//!                                          - (range, rule_id) dedup (dedup.rs)
//!                                          - overlap resolution
//!                                          - stable ordering
//!                                                  │
//!                                                  v
//!                                           DiagnosticReport
//! ```
//!
//! ## Responsibilities by module
//!
//! - `registry.rs`: owns the rules of one pipeline and indexes them by the
//!   input traits they need.
//! - `trigger.rs`: classifies segmented input into coarse `InputTraits`.
//! - `runner.rs`: one pass: segment, select, run, collect failures, aggregate.
//! - `dedup.rs`: the identity of a diagnostic for duplicate collapsing.
//! - `resolve.rs`: aggregation into the final ordered report.
//! - `metrics.rs`: timing data for a pass.
//!
//! ## Debugging
//!
//! Run with `RUST_LOG=proofline=debug` to log trigger decisions, dictionary
//! loading and aggregation counts per pass.

#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/registry.rs"]
mod registry;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/runner.rs"]
mod runner;
#[path = "engine/trigger.rs"]
mod trigger;

pub use metrics::{RuleTiming, RunMetrics, RunResult};
pub use registry::RuleRegistry;
pub use resolve::aggregate;
pub use runner::Runner;
pub use trigger::InputTraits;
