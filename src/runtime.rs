//! A running program instance.
//!
//! [`Runtime`] owns one bound program and one variable environment. `run`
//! replaces the environment with the one built by the latest run; `ingest`
//! feeds one event through the dispatcher and runs the matched chains
//! against that environment.

use std::sync::Arc;

use crate::binder::bound::BoundProgram;
use crate::capability::{ActionDispatch, EventTrigger, FactLookup};
use crate::config::RuntimeConfig;
use crate::eval::{Cancellation, Evaluator, RunReport, Value, VariableEnvironment};

pub struct Runtime {
    program: Arc<BoundProgram>,
    evaluator: Evaluator,
    environment: VariableEnvironment,
}

impl Runtime {
    pub fn new(
        program: BoundProgram,
        facts: Arc<dyn FactLookup>,
        dispatch: Arc<dyn ActionDispatch>,
    ) -> Self {
        Self {
            program: Arc::new(program),
            evaluator: Evaluator::new(facts, dispatch),
            environment: VariableEnvironment::new(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.evaluator = self.evaluator.with_config(config);
        self
    }

    pub fn program(&self) -> &BoundProgram {
        &self.program
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.evaluator.config()
    }

    /// Environment built by the most recent run; empty before the first.
    pub fn environment(&self) -> &VariableEnvironment {
        &self.environment
    }

    pub async fn run(&mut self) -> RunReport {
        self.run_with_cancellation(&Cancellation::never()).await
    }

    #[tracing::instrument(level = "info", skip_all)]
    pub async fn run_with_cancellation(&mut self, cancellation: &Cancellation) -> RunReport {
        let (report, environment) = self.evaluator.run(&self.program, cancellation).await;
        self.environment = environment;
        tracing::info!(
            executed = report.executed_steps.len(),
            failures = report.failures.len(),
            "run finished"
        );
        report
    }

    /// Feeds one `(subject, value)` event. Unmatched events yield an empty
    /// report.
    pub async fn ingest(&self, subject: &str, value: impl Into<Value>) -> RunReport {
        self.ingest_with_cancellation(subject, value, &Cancellation::never())
            .await
    }

    #[tracing::instrument(level = "info", skip(self, value, cancellation))]
    pub async fn ingest_with_cancellation(
        &self,
        subject: &str,
        value: impl Into<Value>,
        cancellation: &Cancellation,
    ) -> RunReport {
        let value = value.into();
        let matched = self.program.dispatcher.dispatch(subject, &value);
        if matched.is_empty() {
            tracing::debug!(%value, "no matching event rule");
            return RunReport::default();
        }

        let trigger = EventTrigger {
            subject: subject.to_string(),
            value,
        };
        self.evaluator
            .run_event_chains(&matched, trigger, &self.environment, cancellation)
            .await
    }
}
