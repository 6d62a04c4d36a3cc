//! # Capabilities
//!
//! The rule core never talks to the outside world itself. Facts and action
//! execution are supplied by the host through two capabilities:
//!
//! * [`FactLookup`]: answers attribute phrases such as `file size` while a
//!   condition is evaluated
//! * [`ActionDispatch`]: executes one action step against a named service
//!
//! [`ServiceRegistry`] lists the service names a host knows about; the binder
//! uses it only to warn about unknown names.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

use crate::binder::bound::RuleId;
use crate::eval::value::Value;

/// Answers attribute phrases during condition evaluation.
///
/// Returning `None` makes the evaluator report `UnknownFact`.
#[automock]
pub trait FactLookup: Send + Sync {
    fn lookup(&self, attribute: &str) -> Option<Value>;
}

impl FactLookup for HashMap<String, Value> {
    fn lookup(&self, attribute: &str) -> Option<Value> {
        self.get(attribute).cloned()
    }
}

impl FactLookup for BTreeMap<String, Value> {
    fn lookup(&self, attribute: &str) -> Option<Value> {
        self.get(attribute).cloned()
    }
}

/// Executes action steps.
///
/// Called once per step; the evaluator awaits each call before starting the
/// next step of the same chain. Implementations own their concurrency safety.
#[automock]
#[async_trait]
pub trait ActionDispatch: Send + Sync {
    async fn dispatch(&self, request: ActionRequest) -> Result<ActionOutput, DispatchError>;
}

/// One step handed to [`ActionDispatch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    pub verb: String,
    pub object: Option<Value>,
    /// Resolved service name; passed through uninterpreted.
    pub service: Option<String>,
    pub context: ActionContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionContext {
    pub rule: RuleId,
    pub step: usize,
    pub trigger: Option<EventTrigger>,
    pub variables: BTreeMap<String, Value>,
}

/// The event that started an event-rule chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTrigger {
    pub subject: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionOutput {
    pub payload: Option<serde_json::Value>,
}

impl ActionOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: serde_json::Value) -> Self {
        Self {
            payload: Some(payload),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
    pub payload: Option<serde_json::Value>,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Dispatch that only logs each step and reports success.
#[derive(Debug, Clone, Default)]
pub struct DryRunDispatch;

#[async_trait]
impl ActionDispatch for DryRunDispatch {
    async fn dispatch(&self, request: ActionRequest) -> Result<ActionOutput, DispatchError> {
        tracing::info!(
            rule = request.context.rule,
            step = request.context.step,
            verb = %request.verb,
            service = request.service.as_deref().unwrap_or("-"),
            "dry run"
        );
        Ok(ActionOutput::with_payload(serde_json::json!({
            "dryRun": true,
            "verb": request.verb,
            "service": request.service,
        })))
    }
}

/// Service names known to the host.
///
/// An empty registry accepts every name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRegistry {
    names: BTreeSet<String>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ServiceRegistry {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
