//! Sequential execution of a then-chain.
//!
//! Each step is dispatched and awaited before the next one starts. A chain
//! stops early when a step fails under [`StepFailurePolicy::Abort`], when the
//! host cancels it, or when the chain deadline passes.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::time::Instant;

use crate::binder::bound::{BoundChain, BoundStep, RuleId};
use crate::capability::{ActionContext, ActionDispatch, ActionOutput, ActionRequest, EventTrigger};
use crate::config::{RuntimeConfig, StepFailurePolicy};

use super::cancel::Cancellation;
use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

/// Which path of a rule a chain was run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Branch {
    Then,
    Else,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AbortReason {
    StepFailed,
    Cancelled,
    DeadlineElapsed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChainState {
    Completed,
    Aborted {
        last_completed: Option<usize>,
        reason: AbortReason,
    },
}

/// A step whose dispatch succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedStep {
    pub rule: RuleId,
    pub index: usize,
    pub verb: String,
    pub object: Option<Value>,
    pub service: Option<String>,
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainReport {
    pub rule: RuleId,
    pub branch: Branch,
    pub state: ChainState,
    pub steps: Vec<ExecutedStep>,
    pub failures: Vec<RuntimeError>,
}

impl ChainReport {
    fn new(rule: RuleId, branch: Branch) -> Self {
        Self {
            rule,
            branch,
            state: ChainState::Completed,
            steps: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn verbs(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.verb.as_str()).collect()
    }

    pub fn is_completed(&self) -> bool {
        self.state == ChainState::Completed
    }

    fn last_completed(&self) -> Option<usize> {
        self.steps.last().map(|s| s.index)
    }

    fn abort(mut self, reason: AbortReason) -> Self {
        let last_completed = self.last_completed();
        if reason != AbortReason::StepFailed {
            self.failures.push(RuntimeError::Aborted {
                rule: self.rule,
                last_completed,
            });
        }
        tracing::warn!(rule = self.rule, %reason, ?last_completed, "chain aborted");
        self.state = ChainState::Aborted {
            last_completed,
            reason,
        };
        self
    }
}

enum StepOutcome {
    Finished(RuntimeResult<ActionOutput>),
    Cancelled,
    DeadlineElapsed,
}

/// Runs chains against one dispatch capability and variable snapshot.
pub struct ChainExecutor<'a> {
    dispatch: &'a dyn ActionDispatch,
    config: &'a RuntimeConfig,
    cancellation: &'a Cancellation,
    variables: BTreeMap<String, Value>,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(
        dispatch: &'a dyn ActionDispatch,
        config: &'a RuntimeConfig,
        cancellation: &'a Cancellation,
        variables: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            dispatch,
            config,
            cancellation,
            variables,
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(rule = chain.rule, %branch))]
    pub async fn execute(
        &self,
        chain: &BoundChain,
        branch: Branch,
        trigger: Option<EventTrigger>,
    ) -> ChainReport {
        let mut report = ChainReport::new(chain.rule, branch);

        let deadline = until(self.config.chain_timeout.map(|t| Instant::now() + t));
        tokio::pin!(deadline);
        let cancelled = self.cancellation.cancelled();
        tokio::pin!(cancelled);

        for step in &chain.steps {
            if self.cancellation.is_cancelled() {
                return report.abort(AbortReason::Cancelled);
            }

            let request = self.request(chain.rule, step, trigger.clone());
            let outcome = tokio::select! {
                biased;
                _ = &mut cancelled => StepOutcome::Cancelled,
                _ = &mut deadline => StepOutcome::DeadlineElapsed,
                result = self.dispatch_step(chain.rule, step, request) => StepOutcome::Finished(result),
            };

            match outcome {
                StepOutcome::Finished(Ok(output)) => {
                    tracing::debug!(index = step.index, verb = %step.verb, "step completed");
                    report.steps.push(ExecutedStep {
                        rule: chain.rule,
                        index: step.index,
                        verb: step.verb.clone(),
                        object: step.object.as_ref().map(Value::from),
                        service: step.service.clone(),
                        payload: output.payload,
                    });
                }
                StepOutcome::Finished(Err(error)) => {
                    tracing::warn!(%error, "step failed");
                    report.failures.push(error);
                    if self.config.on_step_failure == StepFailurePolicy::Abort {
                        return report.abort(AbortReason::StepFailed);
                    }
                }
                StepOutcome::Cancelled => return report.abort(AbortReason::Cancelled),
                StepOutcome::DeadlineElapsed => {
                    return report.abort(AbortReason::DeadlineElapsed)
                }
            }
        }

        report
    }

    fn request(&self, rule: RuleId, step: &BoundStep, trigger: Option<EventTrigger>) -> ActionRequest {
        ActionRequest {
            verb: step.verb.clone(),
            object: step.object.as_ref().map(Value::from),
            service: step.service.clone(),
            context: ActionContext {
                rule,
                step: step.index,
                trigger,
                variables: self.variables.clone(),
            },
        }
    }

    async fn dispatch_step(
        &self,
        rule: RuleId,
        step: &BoundStep,
        request: ActionRequest,
    ) -> RuntimeResult<ActionOutput> {
        let call = self.dispatch.dispatch(request);
        let result = match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                RuntimeError::StepTimeout {
                    rule,
                    index: step.index,
                    verb: step.verb.clone(),
                    timeout_ms: limit.as_millis() as u64,
                }
            })?,
            None => call.await,
        };
        result.map_err(|error| RuntimeError::StepFailed {
            rule,
            index: step.index,
            verb: step.verb.clone(),
            error,
        })
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
