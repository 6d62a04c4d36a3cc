mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{upload_facts, ADVANCED_EXAMPLE};
use pretty_assertions::assert_eq;
use ruleflow::capability::MockActionDispatch;
use ruleflow::eval::{cancellation, AbortReason, Branch, ChainState};
use ruleflow::{
    compile, run, ActionDispatch, ActionOutput, ActionRequest, DispatchError, DryRunDispatch,
    Runtime, RuntimeConfig, RuntimeError, ServiceRegistry, StepFailurePolicy,
};

fn advanced() -> ruleflow::BoundProgram {
    compile(ADVANCED_EXAMPLE, &ServiceRegistry::new()).unwrap()
}

fn echo_payloads(dispatch: &mut MockActionDispatch, failing_verb: &'static str) {
    dispatch.expect_dispatch().returning(move |request| {
        if request.verb == failing_verb {
            Err(DispatchError::new("service unavailable")
                .with_payload(serde_json::json!({ "status": 503 })))
        } else {
            Ok(ActionOutput::with_payload(serde_json::json!({ "done": request.verb })))
        }
    });
}

#[tokio::test]
async fn test_runs_then_chain_in_order() {
    let report = run(&advanced(), upload_facts(42), Arc::new(DryRunDispatch)).await;

    assert!(report.is_success());
    assert_eq!(
        report.executed_verbs(),
        vec!["process image", "store metadata", "send notification"]
    );
    assert_eq!(
        report.executed_services(),
        vec![Some("ImageMagick"), Some("PostgreSQL"), Some("Twilio")]
    );
    assert_eq!(report.chains[0].branch, Branch::Then);
}

#[tokio::test]
async fn test_runs_else_chain_when_condition_is_false() {
    let report = run(&advanced(), upload_facts(3), Arc::new(DryRunDispatch)).await;

    assert_eq!(
        report.executed_verbs(),
        vec!["store original file", "log file size"]
    );
    assert_eq!(report.executed_services(), vec![None, None]);
    assert_eq!(report.chains[0].branch, Branch::Else);
}

#[tokio::test]
async fn test_picks_the_same_branch_every_time() {
    let program = advanced();
    let facts = upload_facts(11);
    let mut branches = Vec::new();
    for _ in 0..5 {
        let report = run(&program, facts.clone(), Arc::new(DryRunDispatch)).await;
        assert_eq!(report.chains.len(), 1);
        branches.push(report.chains[0].branch);
    }
    assert!(branches.iter().all(|branch| *branch == Branch::Then));
}

#[tokio::test]
async fn test_aborts_only_the_failing_chain() {
    let source = r#"
if ready == true then prepare then upload then announce
if ready == true then audit
"#;
    let program = compile(source, &ServiceRegistry::new()).unwrap();
    let mut dispatch = MockActionDispatch::new();
    echo_payloads(&mut dispatch, "upload");

    let facts = common::facts(&[("ready", true.into())]);
    let report = run(&program, facts, Arc::new(dispatch)).await;

    assert_eq!(report.executed_verbs(), vec!["prepare", "audit"]);
    assert_eq!(
        report.executed_steps[0].payload,
        Some(serde_json::json!({ "done": "prepare" }))
    );
    assert_eq!(
        report.chains[0].state,
        ChainState::Aborted {
            last_completed: Some(0),
            reason: AbortReason::StepFailed,
        }
    );
    assert!(report.chains[1].is_completed());

    let [RuntimeError::StepFailed { index, error, .. }] = report.failures.as_slice() else {
        panic!("expected one step failure, got {:?}", report.failures);
    };
    assert_eq!(*index, 1);
    assert_eq!(error.payload, Some(serde_json::json!({ "status": 503 })));
}

#[tokio::test]
async fn test_continues_chain_when_configured() {
    let program = compile("if ready == true then a then b then c", &ServiceRegistry::new()).unwrap();
    let mut dispatch = MockActionDispatch::new();
    echo_payloads(&mut dispatch, "b");

    let config = ruleflow::config::from_str(r#"{ "onStepFailure": "continueChain" }"#).unwrap();
    assert_eq!(config.on_step_failure, StepFailurePolicy::ContinueChain);

    let mut runtime = Runtime::new(
        program,
        common::facts(&[("ready", true.into())]),
        Arc::new(dispatch),
    )
    .with_config(config);
    let report = runtime.run().await;

    assert_eq!(report.executed_verbs(), vec!["a", "c"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.chains[0].is_completed());
}

#[tokio::test]
async fn test_serializes_run_report() {
    let report = run(&advanced(), upload_facts(3), Arc::new(DryRunDispatch)).await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["executedSteps"][0]["verb"], "store original file");
    assert_eq!(json["chains"][0]["state"]["state"], "completed");
    assert_eq!(json["failures"], serde_json::json!([]));
}

/// Completes quickly, except for steps named `wait`.
struct SlowDispatch;

#[async_trait]
impl ActionDispatch for SlowDispatch {
    async fn dispatch(&self, request: ActionRequest) -> Result<ActionOutput, DispatchError> {
        if request.verb == "wait" {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok(ActionOutput::empty())
    }
}

#[tokio::test]
async fn test_times_out_slow_steps() {
    let program = compile("if go == 1 then start then wait then finish", &ServiceRegistry::new())
        .unwrap();
    let mut runtime = Runtime::new(
        program,
        common::facts(&[("go", 1i64.into())]),
        Arc::new(SlowDispatch),
    )
    .with_config(RuntimeConfig::default().with_step_timeout(Duration::from_millis(25)));

    let report = runtime.run().await;
    assert_eq!(report.executed_verbs(), vec!["start"]);
    assert!(matches!(
        report.failures.as_slice(),
        [RuntimeError::StepTimeout { index: 1, timeout_ms: 25, .. }]
    ));
}

#[tokio::test]
async fn test_stops_a_cancelled_run() {
    let program = compile(
        "if go == 1 then start then wait then finish\nif go == 1 then later",
        &ServiceRegistry::new(),
    )
    .unwrap();
    let mut runtime = Runtime::new(
        program,
        common::facts(&[("go", 1i64.into())]),
        Arc::new(SlowDispatch),
    );

    let (handle, cancellation) = cancellation();
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    };
    let (report, _) = tokio::join!(runtime.run_with_cancellation(&cancellation), canceller);

    assert_eq!(report.executed_verbs(), vec!["start"]);
    assert_eq!(
        report.chains[0].state,
        ChainState::Aborted {
            last_completed: Some(0),
            reason: AbortReason::Cancelled,
        }
    );
    // Later chains never dispatch once cancelled.
    assert!(report.chains[1].steps.is_empty());
    assert!(matches!(
        report.failures.as_slice(),
        [
            RuntimeError::Aborted { last_completed: Some(0), .. },
            RuntimeError::Aborted { last_completed: None, .. },
        ]
    ));
}

#[tokio::test]
async fn test_enforces_chain_deadline() {
    let program = compile("if go == 1 then start then wait", &ServiceRegistry::new()).unwrap();
    let mut runtime = Runtime::new(
        program,
        common::facts(&[("go", 1i64.into())]),
        Arc::new(SlowDispatch),
    )
    .with_config(RuntimeConfig::default().with_chain_timeout(Duration::from_millis(30)));

    let report = runtime.run().await;
    assert!(matches!(
        report.chains[0].state,
        ChainState::Aborted {
            reason: AbortReason::DeadlineElapsed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_reports_condition_errors_and_keeps_going() {
    let program = compile(
        "if file size > 10 then big\nif file type == \"png\" then convert",
        &ServiceRegistry::new(),
    )
    .unwrap();
    let facts = common::facts(&[("file type", "png".into())]);
    let report = run(&program, facts, Arc::new(DryRunDispatch)).await;

    assert_eq!(report.executed_verbs(), vec!["convert"]);
    assert!(matches!(
        report.failures.as_slice(),
        [RuntimeError::UnknownFact { attribute, .. }] if attribute == "file size"
    ));
}

#[tokio::test]
async fn test_quoted_operand_compares_as_text() {
    let program = compile(
        "if version == \"1.10\" then upgrade\nif zip == \"007\" then route\nif build == 7 then tag",
        &ServiceRegistry::new(),
    )
    .unwrap();
    let facts = common::facts(&[
        ("version", "1.1".into()),
        ("zip", "7".into()),
        ("build", "7".into()),
    ]);
    let report = run(&program, facts, Arc::new(DryRunDispatch)).await;

    assert!(report.is_success());
    assert_eq!(report.executed_verbs(), vec!["tag"]);
}
