//! # Event Dispatch
//!
//! `when` rules become [`EventSubscription`](dispatcher::EventSubscription)s at
//! bind time. An incoming `(subject, value)` pair selects every subscription
//! whose subject and target match exactly; the runtime then runs each matched
//! chain as an independent chain execution.
//!
//! ```text
//! ┌──────────┐  ingest   ┌────────────────┐  chains  ┌───────────┐
//! │Event feed│──────────▶│EventDispatcher │─────────▶│ Evaluator │
//! └──────────┘           └────────────────┘          └───────────┘
//! ```

pub mod dispatcher;

pub use dispatcher::{EventDispatcher, EventSubscription};
