//! Two-attempt content-shape retry around the generation backend
//!
//! State machine: lenient attempt, then (only on parse or validation
//! failure) one strict attempt. At most two upstream calls per inbound
//! request, strictly sequential, no backoff — this reacts to output shape,
//! not to transport reliability. Transport errors propagate immediately and
//! are never retried here.

use serde_json::Value;

use crate::error::TaskError;
use crate::generate::GenerationBackend;
use crate::types::{AttemptMode, GenerationRequest};

/// Drive the lenient→strict protocol for one request.
///
/// Returns the first candidate that parses as JSON and passes the task's
/// validator. If neither attempt conforms, fails with `UpstreamFormat`
/// carrying the last raw response (truncated) as debug context.
pub async fn run(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
) -> Result<Value, TaskError> {
    let mut last_raw = String::new();
    for mode in [AttemptMode::Lenient, AttemptMode::Strict] {
        let raw = backend.generate(request, mode).await?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(candidate) if request.task.validate(&candidate) => return Ok(candidate),
            Ok(_) => tracing::warn!(
                task = request.task.slug(),
                ?mode,
                "generator output failed schema validation"
            ),
            Err(e) => tracing::warn!(
                task = request.task.slug(),
                ?mode,
                error = %e,
                "generator output was not JSON"
            ),
        }
        last_raw = raw;
    }
    Err(TaskError::upstream_format(
        "The generator did not return the expected format. Please try again.",
        &last_raw,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::DEBUG_EXCERPT_CHARS;
    use crate::tasks::TaskKind;
    use crate::types::TaskInput;

    /// Backend that replays a fixed script of responses and records the
    /// attempt modes it saw.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<String, String>>>,
        calls: AtomicU32,
        modes: Mutex<Vec<AttemptMode>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, String>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
                modes: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(
            &self,
            _request: &GenerationRequest,
            mode: AttemptMode,
        ) -> Result<String, TaskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.modes.lock().unwrap().push(mode);
            let mut script = self.script.lock().unwrap();
            assert!(!script.is_empty(), "backend called more times than scripted");
            script.remove(0).map_err(TaskError::UpstreamTransport)
        }
    }

    fn critique_request() -> GenerationRequest {
        TaskKind::Critique.spec().to_request(&TaskInput {
            image_data_url: Some("data:image/jpeg;base64,AA==".into()),
            ..Default::default()
        })
    }

    fn valid_critique_json() -> String {
        json!({
            "opening": "x".repeat(60),
            "closing": "x".repeat(20),
            "suggestions": ["y".repeat(40), "y".repeat(40), "y".repeat(40)],
        })
        .to_string()
    }

    #[tokio::test]
    async fn accepts_first_conformant_attempt() {
        let backend = ScriptedBackend::new(vec![Ok(valid_critique_json())]);
        let result = run(&backend, &critique_request()).await.unwrap();
        assert!(TaskKind::Critique.validate(&result));
        assert_eq!(backend.calls(), 1);
        assert_eq!(*backend.modes.lock().unwrap(), vec![AttemptMode::Lenient]);
    }

    #[tokio::test]
    async fn prose_then_valid_triggers_exactly_one_strict_retry() {
        let backend = ScriptedBackend::new(vec![
            Ok("Here are my thoughts on your painting...".into()),
            Ok(valid_critique_json()),
        ]);
        let result = run(&backend, &critique_request()).await.unwrap();
        assert!(TaskKind::Critique.validate(&result));
        assert_eq!(backend.calls(), 2);
        assert_eq!(
            *backend.modes.lock().unwrap(),
            vec![AttemptMode::Lenient, AttemptMode::Strict]
        );
    }

    #[tokio::test]
    async fn valid_json_failing_validation_also_retries() {
        let backend = ScriptedBackend::new(vec![
            Ok(json!({ "opening": "too short" }).to_string()),
            Ok(valid_critique_json()),
        ]);
        let result = run(&backend, &critique_request()).await.unwrap();
        assert!(TaskKind::Critique.validate(&result));
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn two_failures_reject_with_last_raw_as_debug() {
        let second = format!("still prose: {}", "z".repeat(10_000));
        let backend =
            ScriptedBackend::new(vec![Ok("first prose".into()), Ok(second.clone())]);
        let err = run(&backend, &critique_request()).await.unwrap_err();
        assert_eq!(backend.calls(), 2);
        let TaskError::UpstreamFormat { debug, .. } = err else {
            panic!("expected UpstreamFormat, got {err:?}");
        };
        assert_eq!(debug.chars().count(), DEBUG_EXCERPT_CHARS);
        assert!(second.starts_with(&debug));
    }

    #[tokio::test]
    async fn never_issues_more_than_two_calls() {
        let backend = ScriptedBackend::new(vec![
            Ok("not json".into()),
            Ok("also not json".into()),
            Ok(valid_critique_json()),
        ]);
        let _ = run(&backend, &critique_request()).await;
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn transport_error_propagates_without_retry() {
        let backend = ScriptedBackend::new(vec![Err("connection refused".into())]);
        let err = run(&backend, &critique_request()).await.unwrap_err();
        assert!(matches!(err, TaskError::UpstreamTransport(_)));
        assert_eq!(backend.calls(), 1);
    }
}
