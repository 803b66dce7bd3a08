//! Horn Logic - Forward and Backward Chaining over Propositional Rules
//!
//! This crate decides whether a question proposition follows from a set of facts under
//! Horn rules (a conjunction of antecedents implies exactly one consequent). Two
//! strategies are provided and always agree:
//!
//! - **Forward chaining** propagates from the facts with one counter per rule.
//! - **Backward chaining** searches from the question and stays correct on cyclic rule
//!   graphs by tracking discovery orders, parking blocked rules, and settling unprovable
//!   cycles in one batch when their root finishes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Horn Logic                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │          Exchange Record  │  Benchmark Generators     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │ link                             │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                       Graph                           │   │
//! │  │   Variables │ Rules │ Name Registry │ Reset           │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                      Reasoner                         │   │
//! │  │  Forward Chaining │ Backward Chaining │ Stats/Timing  │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use horn_logic::{backward, forward, ExchangeRecord};
//!
//! let record = ExchangeRecord::from_json(
//!     r#"{"rules": ["A∧B => C", "C => Q"], "facts": ["A", "B"], "question": "Q"}"#,
//! )
//! .unwrap();
//!
//! let mut graph = record.link().unwrap();
//! assert!(forward(&mut graph).unwrap());
//!
//! graph.reset();
//! assert!(backward(&mut graph).unwrap());
//! ```

pub mod backward;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod forward;
pub mod generator;
pub mod graph;
pub mod rule;
pub mod variable;

/// Log targets used by this crate, for filtering with `RUST_LOG`.
pub mod log_targets {
    /// Forward chaining.
    pub const FORWARD: &str = "forward";
    /// Backward chaining.
    pub const BACKWARD: &str = "backward";
    /// Graph linking and reset.
    pub const GRAPH: &str = "graph";
    /// The reasoner facade.
    pub const ENGINE: &str = "engine";
    /// Exchange record loading.
    pub const EXCHANGE: &str = "exchange";
}

// Re-exports
pub use backward::{backward, backward_with_limit, backward_with_stats};
pub use config::{EngineConfig, InferenceMode};
pub use context::ExecutionContext;
pub use engine::{EngineStats, Reasoner, RunReport, StrategyOutcome, Timing};
pub use error::{Error, Result};
pub use exchange::ExchangeRecord;
pub use forward::{forward, forward_with_stats};
pub use generator::Family;
pub use graph::Graph;
pub use rule::{Rule, RuleId, RuleSpec};
pub use variable::{Variable, VariableId, VariableState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
