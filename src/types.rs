//! Core request/response types shared across the pipeline.

use serde::Deserialize;
use serde_json::Value;

use crate::error::TaskError;
use crate::tasks::TaskKind;

/// One ordered part of the user-visible content sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text.
    Text(String),
    /// Inline image referenced as a `data:` URI.
    ImageUrl(String),
}

/// How forcefully the upstream is instructed to emit schema-conformant JSON.
///
/// The two modes differ only in phrasing; the schema descriptor itself is
/// identical across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptMode {
    Lenient,
    Strict,
}

/// Immutable description of one generation call.
///
/// Constructed once per inbound request by the task spec and handed to the
/// orchestrator; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub task: TaskKind,
    pub persona: &'static str,
    pub schema: &'static str,
    pub parts: Vec<ContentPart>,
}

/// Inbound request body, shared across tasks.
///
/// Field names mirror the wire (camelCase). Every field is optional at the
/// parse stage; per-task presence rules are enforced by
/// [`crate::tasks::TaskSpec::check_inputs`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskInput {
    pub image_data_url: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub keywords: Option<String>,
    pub tone: Option<String>,
    /// Interview answers for the statement-bio task.
    pub answers: Option<Vec<String>>,
}

impl TaskInput {
    /// Whether a non-empty image payload is attached.
    pub fn has_image(&self) -> bool {
        self.image_data_url
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Observable lifecycle of one client-side submission.
///
/// A UI drives this as a plain state machine instead of toggling loading
/// flags from callbacks: `start()` when the request is issued, `finish()`
/// with the outcome when it completes. Prior UI state (image preview etc.)
/// is untouched by transitions here.
#[derive(Debug, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Completed(Result<Value, TaskError>),
}

impl SubmissionState {
    pub fn start(&mut self) {
        *self = Self::InFlight;
    }

    pub fn finish(&mut self, outcome: Result<Value, TaskError>) {
        *self = Self::Completed(outcome);
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// The validated result, if the submission completed successfully.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Completed(Ok(v)) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_input_parses_camel_case_and_tolerates_absence() {
        let input: TaskInput =
            serde_json::from_value(json!({ "imageDataUrl": "data:image/jpeg;base64,AA==" }))
                .unwrap();
        assert!(input.has_image());
        assert!(input.description.is_none());

        let empty: TaskInput = serde_json::from_value(json!({})).unwrap();
        assert!(!empty.has_image());
    }

    #[test]
    fn blank_image_string_counts_as_absent() {
        let input: TaskInput = serde_json::from_value(json!({ "imageDataUrl": "  " })).unwrap();
        assert!(!input.has_image());
    }

    #[test]
    fn submission_state_transitions() {
        let mut state = SubmissionState::default();
        assert!(!state.is_in_flight());
        state.start();
        assert!(state.is_in_flight());
        state.finish(Ok(json!({"ok": true})));
        assert_eq!(state.result(), Some(&json!({"ok": true})));

        state.start();
        state.finish(Err(TaskError::MissingInput("image".into())));
        assert!(state.result().is_none());
    }
}
