// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::DeadLetterSink;
use async_trait::async_trait;
use scout_agents::{Agent, AgentContext, AgentError, SecretStore};
use scout_contracts::{Mode, SchemaRegistry, Validator};
use scout_core::{AgentTask, FakeClock, JobId};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const IN_SCHEMA: &str = "https://contracts.scout.dev/discovery/input.json";
const OUT_SCHEMA: &str = "https://contracts.scout.dev/extraction/output.json";

/// Test agent whose behavior is scripted per call index.
struct ScriptedAgent {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    script: Arc<dyn Fn(usize, &AgentTask) -> Result<serde_json::Value, AgentError> + Send + Sync>,
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn input_schema_id(&self) -> &'static str {
        IN_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUT_SCHEMA
    }

    async fn execute(
        &self,
        task: &AgentTask,
        _ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(call, task)
    }
}

struct Fixture {
    executor: AgentExecutor,
    calls: Arc<AtomicUsize>,
    dlq_dir: tempfile::TempDir,
    clock: FakeClock,
    metrics: Metrics,
}

fn build_fixture(mode: Mode, registry: AgentRegistry, calls: Arc<AtomicUsize>) -> Fixture {
    let dlq_dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let shared: SharedClock = Arc::new(clock.clone());
    let metrics = Metrics::new();

    let validator = Arc::new(Validator::new(Arc::new(SchemaRegistry::builtin().unwrap()), mode));
    let base_ctx = AgentContext::builder()
        .secrets(Arc::new(SecretStore::new(Vec::new(), Duration::from_secs(300), shared.clone())))
        .clock(shared.clone())
        .job_id(JobId::from_string("job-exec-test"))
        .build()
        .unwrap();
    let retry = scout_http::RetryPolicy {
        max_retries: 3,
        base: Duration::from_millis(10),
        multiplier: 2.0,
        max_backoff: Duration::from_millis(100),
    };
    let dlq = DeadLetterSink::new(dlq_dir.path(), shared.clone());

    let executor =
        AgentExecutor::new(registry, validator, base_ctx, retry, dlq, metrics.clone(), shared);
    Fixture { executor, calls, dlq_dir, clock, metrics }
}

fn fixture(
    mode: Mode,
    script: impl Fn(usize, &AgentTask) -> Result<serde_json::Value, AgentError>
        + Send
        + Sync
        + 'static,
) -> Fixture {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::empty();
    let script = Arc::new(script);
    let agent_calls = calls.clone();
    registry.register("testing.scripted", move || {
        Arc::new(ScriptedAgent {
            name: "testing.scripted",
            calls: agent_calls.clone(),
            script: script.clone(),
        })
    });
    build_fixture(mode, registry, calls)
}

fn dlq_entries(f: &Fixture) -> Vec<crate::DeadLetterEntry> {
    DeadLetterSink::new(f.dlq_dir.path(), Arc::new(f.clock.clone())).read_all()
}

fn ok_output() -> serde_json::Value {
    json!({ "success": true, "records": [] })
}

fn task() -> AgentTask {
    AgentTask::new("testing.scripted", json!({ "url": "https://t.example" }))
        .with_deadline(Duration::from_secs(5))
}

#[tokio::test(start_paused = true)]
async fn success_returns_output_and_counts() {
    let f = fixture(Mode::Soft, |_, _| Ok(ok_output()));
    let result = f.executor.spawn("testing.scripted", task()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.output["success"], true);
    assert_eq!(f.metrics.counter("agent_invocations_total", &[("outcome", "success")]), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_agent_is_a_fatal_config_error() {
    let f = fixture(Mode::Soft, |_, _| Ok(ok_output()));
    let err = f.executor.spawn("testing.unknown", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
    assert!(err.kind.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn transient_failures_retry_then_succeed() {
    let f = fixture(Mode::Soft, |call, _| {
        if call < 2 {
            Err(AgentError::Http(scout_http::HttpError::Timeout { host: "t.example".into() }))
        } else {
            Ok(ok_output())
        }
    });
    let result = f.executor.spawn("testing.scripted", task()).await.unwrap();
    assert!(result.success);
    assert_eq!(f.calls.load(Ordering::SeqCst), 3);
    assert!(dlq_entries(&f).is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_dead_letter_the_task() {
    let f = fixture(Mode::Soft, |_, _| {
        Err(AgentError::Http(scout_http::HttpError::Status {
            host: "t.example".into(),
            status: 503,
        }))
    });
    let err = f.executor.spawn("testing.scripted", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transient);
    // 1 initial + 3 retries
    assert_eq!(f.calls.load(Ordering::SeqCst), 4);

    let entries = dlq_entries(&f);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].attempts, 4);
    assert_eq!(entries[0].task.agent_type, "testing.scripted");
    assert_eq!(f.metrics.counter("agent_invocations_total", &[("outcome", "failed")]), 1);
}

#[tokio::test(start_paused = true)]
async fn skippable_failures_do_not_dead_letter() {
    let f = fixture(Mode::Soft, |_, _| {
        Err(AgentError::Http(scout_http::HttpError::Status {
            host: "t.example".into(),
            status: 404,
        }))
    });
    let err = f.executor.spawn("testing.scripted", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    assert!(dlq_entries(&f).is_empty());
    assert_eq!(f.metrics.counter("agent_invocations_total", &[("outcome", "skipped")]), 1);
}

/// Agent that hangs past any deadline on its first call, then succeeds.
struct SlowFirstCall {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Agent for SlowFirstCall {
    fn name(&self) -> &'static str {
        "testing.slow"
    }

    fn input_schema_id(&self) -> &'static str {
        IN_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUT_SCHEMA
    }

    async fn execute(
        &self,
        _task: &AgentTask,
        _ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(ok_output())
    }
}

#[tokio::test(start_paused = true)]
async fn deadline_overrun_cancels_and_retries_as_transient() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::empty();
    let agent_calls = calls.clone();
    registry.register("testing.slow", move || {
        Arc::new(SlowFirstCall { calls: agent_calls.clone() })
    });
    let f = build_fixture(Mode::Soft, registry, calls);

    let slow_task = AgentTask::new("testing.slow", json!({ "url": "https://t.example" }))
        .with_deadline(Duration::from_secs(5));
    let result = f.executor.spawn("testing.slow", slow_task).await.unwrap();
    assert!(result.success);
    // First call was cancelled at the deadline, second succeeded.
    assert_eq!(f.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn internal_agent_errors_are_fatal() {
    let f = fixture(Mode::Soft, |_, _| Err(AgentError::Internal("invariant broken".into())));
    let err = f.executor.spawn("testing.scripted", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert!(err.kind.is_fatal());
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_provenance_is_a_policy_violation() {
    let f = fixture(Mode::Soft, |_, _| {
        Ok(json!({ "success": true, "records": [{ "id": "cmp-1" }] }))
    });
    let err = f.executor.spawn("testing.scripted", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert!(err.kind.is_skippable());
    assert_eq!(f.metrics.counter_total("policy_violations_total"), 1);
    assert!(dlq_entries(&f).is_empty());
}

// Scenario: agent returns a payload missing a required field in strict
// mode. Terminal failure, DLQ'd, schema counter up, policy counter
// untouched.
#[tokio::test(start_paused = true)]
async fn strict_schema_rejection_is_terminal_and_dead_lettered() {
    let f = fixture(Mode::Strict, |_, _| {
        // Output missing the required "records" field.
        Ok(json!({ "success": true }))
    });
    let err = f.executor.spawn("testing.scripted", task()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SchemaViolation);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1, "no retry for contract rejection");

    assert_eq!(dlq_entries(&f).len(), 1);
    assert_eq!(f.metrics.counter_total("schema_violations_total"), 1);
    assert_eq!(f.metrics.counter_total("policy_violations_total"), 0);
}

#[tokio::test(start_paused = true)]
async fn soft_schema_rejection_passes_through() {
    let f = fixture(Mode::Soft, |_, _| Ok(json!({ "success": true })));
    let result = f.executor.spawn("testing.scripted", task()).await.unwrap();
    assert!(result.success);
    assert!(dlq_entries(&f).is_empty());
}

#[tokio::test(start_paused = true)]
async fn spawn_parallel_preserves_input_order() {
    let f = fixture(Mode::Soft, |_, task| {
        let url = task.payload["url"].as_str().unwrap_or("").to_string();
        Ok(json!({ "success": true, "records": [], "echo": url }))
    });

    let tasks: Vec<AgentTask> = (0..10)
        .map(|i| {
            AgentTask::new("testing.scripted", json!({ "url": format!("https://t.example/{i}") }))
                .with_deadline(Duration::from_secs(5))
        })
        .collect();
    let results = f.executor.spawn_parallel("testing.scripted", tasks, 3).await;

    assert_eq!(results.len(), 10);
    for (i, result) in results.iter().enumerate() {
        let output = &result.as_ref().unwrap().output;
        assert_eq!(output["echo"], format!("https://t.example/{i}"));
    }
}

#[tokio::test(start_paused = true)]
async fn parallel_failures_do_not_cancel_peers() {
    let f = fixture(Mode::Soft, |_, task| {
        if task.payload["url"].as_str().unwrap_or("").ends_with("/bad") {
            Err(AgentError::Http(scout_http::HttpError::Status {
                host: "t.example".into(),
                status: 404,
            }))
        } else {
            Ok(ok_output())
        }
    });

    let tasks = vec![
        AgentTask::new("testing.scripted", json!({ "url": "https://t.example/ok1" })),
        AgentTask::new("testing.scripted", json!({ "url": "https://t.example/bad" })),
        AgentTask::new("testing.scripted", json!({ "url": "https://t.example/ok2" })),
    ];
    let results = f.executor.spawn_parallel("testing.scripted", tasks, 2).await;

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}
