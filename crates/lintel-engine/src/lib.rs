//! The lintel validation engine.
//!
//! Evaluates the active rule set against a tenant's architecture
//! elements, overlays approved exceptions, aggregates per-layer
//! scorecards, and rebuilds the traceability matrix — one validation
//! cycle at a time.

pub mod cycle;
pub mod evaluator;
pub mod exceptions;
pub mod matrix;
pub mod rules;
pub mod scorecard;

pub use cycle::CycleRunner;
pub use evaluator::{evaluate_rules, IssueCandidate};
pub use exceptions::ExceptionOverlay;
pub use rules::RuleLogic;
