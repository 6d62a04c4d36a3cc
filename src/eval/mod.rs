//! # Evaluator
//!
//! Executes a [`BoundProgram`](crate::binder::BoundProgram).
//!
//! ```text
//! Start ─▶ ConditionEvaluated{true|false} ─▶ Executing(step i) ─▶ … ─▶ Completed
//!                                                   │
//!                                                   └──────────────▶ Aborted
//! ```
//!
//! Conditions are evaluated synchronously against the variable environment
//! and the host's [`FactLookup`](crate::capability::FactLookup). Chains await
//! each dispatched step before starting the next. Independent event chains
//! run concurrently and share nothing but a read-only variable snapshot.

pub mod cancel;
pub mod chain;
pub mod condition;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod value;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use chain::{AbortReason, Branch, ChainReport, ChainState, ExecutedStep};
pub use environment::VariableEnvironment;
pub use error::{RuntimeError, RuntimeResult};
pub use evaluator::{Evaluator, RunReport};
pub use value::Value;
