use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::binder::bound::{BoundProgram, BoundStatement};
use crate::capability::{ActionDispatch, EventTrigger, FactLookup};
use crate::config::RuntimeConfig;
use crate::event::dispatcher::EventSubscription;

use super::cancel::Cancellation;
use super::chain::{Branch, ChainExecutor, ChainReport, ExecutedStep};
use super::condition;
use super::environment::VariableEnvironment;
use super::error::RuntimeError;

/// Outcome of a program run or of one ingested event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Successful steps of every chain, in execution order.
    pub executed_steps: Vec<ExecutedStep>,
    pub failures: Vec<RuntimeError>,
    pub chains: Vec<ChainReport>,
}

impl RunReport {
    fn record(&mut self, chain: ChainReport) {
        self.executed_steps.extend(chain.steps.iter().cloned());
        self.failures.extend(chain.failures.iter().cloned());
        self.chains.push(chain);
    }

    pub fn executed_verbs(&self) -> Vec<&str> {
        self.executed_steps.iter().map(|s| s.verb.as_str()).collect()
    }

    pub fn executed_services(&self) -> Vec<Option<&str>> {
        self.executed_steps
            .iter()
            .map(|s| s.service.as_deref())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes bound programs against host capabilities.
pub struct Evaluator {
    facts: Arc<dyn FactLookup>,
    dispatch: Arc<dyn ActionDispatch>,
    config: RuntimeConfig,
}

impl Evaluator {
    pub fn new(facts: Arc<dyn FactLookup>, dispatch: Arc<dyn ActionDispatch>) -> Self {
        Self {
            facts,
            dispatch,
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Runs every statement in source order with a fresh environment.
    ///
    /// Assignments update the environment; each conditional runs exactly one
    /// of its branches, or none when its condition fails to evaluate. Event
    /// rules are left to [`Evaluator::run_event_chains`].
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub async fn run(
        &self,
        program: &BoundProgram,
        cancellation: &Cancellation,
    ) -> (RunReport, VariableEnvironment) {
        let mut env = VariableEnvironment::new();
        let mut report = RunReport::default();

        for statement in &program.statements {
            match statement {
                BoundStatement::Assignment { name, value } => env.assign(name.clone(), value),
                BoundStatement::Conditional {
                    rule,
                    condition,
                    then_chain,
                    else_chain,
                } => {
                    let selected = match condition::evaluate(condition, self.facts.as_ref(), &env)
                    {
                        Ok(true) => Some((then_chain, Branch::Then)),
                        Ok(false) => else_chain.as_ref().map(|chain| (chain, Branch::Else)),
                        Err(error) => {
                            tracing::warn!(rule, %error, "condition failed");
                            report.failures.push(error);
                            None
                        }
                    };

                    if let Some((chain, branch)) = selected {
                        tracing::debug!(rule, %branch, "branch selected");
                        let executor = ChainExecutor::new(
                            self.dispatch.as_ref(),
                            &self.config,
                            cancellation,
                            env.snapshot(),
                        );
                        report.record(executor.execute(chain, branch, None).await);
                    }
                }
                BoundStatement::EventRule { .. } => {}
            }
        }

        (report, env)
    }

    /// Runs the chains of matched subscriptions concurrently.
    ///
    /// Reports are recorded in subscription order regardless of completion
    /// order.
    #[tracing::instrument(level = "debug", skip_all, fields(subject = %trigger.subject, matched = subscriptions.len()))]
    pub async fn run_event_chains(
        &self,
        subscriptions: &[&EventSubscription],
        trigger: EventTrigger,
        env: &VariableEnvironment,
        cancellation: &Cancellation,
    ) -> RunReport {
        let executor = ChainExecutor::new(
            self.dispatch.as_ref(),
            &self.config,
            cancellation,
            env.snapshot(),
        );
        let chains = join_all(subscriptions.iter().map(|subscription| {
            executor.execute(&subscription.chain, Branch::Event, Some(trigger.clone()))
        }))
        .await;

        let mut report = RunReport::default();
        for chain in chains {
            report.record(chain);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::analyzer;
    use crate::capability::{ActionOutput, DryRunDispatch, MockActionDispatch, ServiceRegistry};
    use crate::eval::value::Value;
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::Tokenizer;
    use std::collections::HashMap;

    fn compile(source: &str) -> BoundProgram {
        let tokens =
            TokenPreprocessor::default().process(Tokenizer::new().tokenize(source).unwrap());
        bind(analyzer::parse_tokens(&tokens).unwrap(), &ServiceRegistry::new()).unwrap()
    }

    fn facts(entries: &[(&str, Value)]) -> Arc<dyn FactLookup> {
        Arc::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn test_exactly_one_branch_runs() {
        let program = compile("if size > 10 then big then bigger else then small");
        for (size, expected) in [(20, vec!["big", "bigger"]), (5, vec!["small"])] {
            let evaluator =
                Evaluator::new(facts(&[("size", Value::Integer(size))]), Arc::new(DryRunDispatch));
            let (report, _) = evaluator.run(&program, &Cancellation::never()).await;
            assert_eq!(report.executed_verbs(), expected);
            assert_eq!(report.chains.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_condition_error_runs_neither_branch() {
        let program = compile("if size > 10 then big else then small\nif ok == true then next");
        let evaluator = Evaluator::new(
            facts(&[("ok", Value::Boolean(true))]),
            Arc::new(DryRunDispatch),
        );
        let (report, _) = evaluator.run(&program, &Cancellation::never()).await;
        assert_eq!(report.executed_verbs(), vec!["next"]);
        assert!(matches!(
            report.failures.as_slice(),
            [RuntimeError::UnknownFact { attribute, .. }] if attribute == "size"
        ));
    }

    #[tokio::test]
    async fn test_context_carries_variables() {
        let program = compile("mode: \"fast\"\nif mode == \"fast\" then go");
        let mut dispatch = MockActionDispatch::new();
        dispatch
            .expect_dispatch()
            .withf(|request| {
                request.context.variables.get("mode") == Some(&Value::from("fast"))
                    && request.context.trigger.is_none()
            })
            .times(1)
            .returning(|_| Ok(ActionOutput::empty()));

        let evaluator = Evaluator::new(facts(&[]), Arc::new(dispatch));
        let (report, env) = evaluator.run(&program, &Cancellation::never()).await;
        assert!(report.is_success());
        assert_eq!(env.get("mode"), Some(&Value::from("fast")));
    }

    #[tokio::test]
    async fn test_event_rules_do_not_run() {
        let program = compile("when order status to \"shipped\" then notify");
        let evaluator = Evaluator::new(facts(&[]), Arc::new(MockActionDispatch::new()));
        let (report, _) = evaluator.run(&program, &Cancellation::never()).await;
        assert_eq!(report, RunReport::default());
    }

    #[tokio::test]
    async fn test_event_chains_keep_registration_order() {
        let program = compile(
            "when job to \"done\" then first a then first b\nwhen job to \"done\" then second",
        );
        let value = Value::from("done");
        let matched = program.dispatcher.dispatch("job", &value);
        let evaluator = Evaluator::new(facts(&[]), Arc::new(DryRunDispatch));
        let trigger = EventTrigger {
            subject: "job".to_string(),
            value,
        };
        let report = evaluator
            .run_event_chains(
                &matched,
                trigger,
                &VariableEnvironment::new(),
                &Cancellation::never(),
            )
            .await;
        assert_eq!(report.executed_verbs(), vec!["first a", "first b", "second"]);
        assert!(report.chains.iter().all(|c| c.branch == Branch::Event));
    }
}
