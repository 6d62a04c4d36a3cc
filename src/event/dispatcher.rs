use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::Literal;
use crate::binder::bound::BoundChain;
use crate::eval::value::Value;

/// A `when` rule registered for an exact (subject, target) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSubscription {
    pub subject: String,
    pub target: Literal,
    pub chain: Arc<BoundChain>,
}

impl EventSubscription {
    /// Exact match on the subject string and on the text form of the target.
    pub fn matches(&self, subject: &str, value: &Value) -> bool {
        self.subject == subject && self.target.as_text() == value.as_text()
    }
}

/// Holds every event subscription of a bound program.
///
/// Subscriptions keep registration order; a subject index avoids scanning
/// unrelated subjects. Unmatched events are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDispatcher {
    subscriptions: Vec<EventSubscription>,
    by_subject: HashMap<String, Vec<usize>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, subscription: EventSubscription) {
        tracing::debug!(
            subject = %subscription.subject,
            target = %subscription.target,
            rule = subscription.chain.rule,
            "registered event subscription"
        );
        self.by_subject
            .entry(subscription.subject.clone())
            .or_default()
            .push(self.subscriptions.len());
        self.subscriptions.push(subscription);
    }

    /// Matching subscriptions in registration order.
    pub fn dispatch(&self, subject: &str, value: &Value) -> Vec<&EventSubscription> {
        let matched: Vec<&EventSubscription> = self
            .by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(|&i| &self.subscriptions[i])
            .filter(|s| s.matches(subject, value))
            .collect();

        if matched.is_empty() {
            tracing::debug!(subject, value = %value, "no subscription matched");
        }
        matched
    }

    pub fn subscriptions(&self) -> &[EventSubscription] {
        &self.subscriptions
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
