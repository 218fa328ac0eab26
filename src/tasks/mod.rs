//! Task catalog: the six creative tasks and their generation specs
//!
//! One generic [`TaskSpec`] — persona text, schema descriptor, validator,
//! input policy, user-content builder — consumed by the one generic request
//! handler and orchestrator. The persona and schema strings are opaque
//! configuration passed through to the generator; only the validator
//! interprets the schema semantics.

use serde_json::Value;

use crate::error::TaskError;
use crate::types::{ContentPart, GenerationRequest, TaskInput};
use crate::validate;

/// The six supported tasks, addressed by URL slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ArtistMatch,
    SeriesIdeas,
    Critique,
    AbstractionPaths,
    TitleGeneration,
    StatementBio,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::ArtistMatch,
        TaskKind::SeriesIdeas,
        TaskKind::Critique,
        TaskKind::AbstractionPaths,
        TaskKind::TitleGeneration,
        TaskKind::StatementBio,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::ArtistMatch => "artist-match",
            Self::SeriesIdeas => "series-ideas",
            Self::Critique => "critique",
            Self::AbstractionPaths => "abstraction-paths",
            Self::TitleGeneration => "title-generation",
            Self::StatementBio => "statement-bio",
        }
    }

    pub fn spec(self) -> &'static TaskSpec {
        match self {
            Self::ArtistMatch => &ARTIST_MATCH,
            Self::SeriesIdeas => &SERIES_IDEAS,
            Self::Critique => &CRITIQUE,
            Self::AbstractionPaths => &ABSTRACTION_PATHS,
            Self::TitleGeneration => &TITLE_GENERATION,
            Self::StatementBio => &STATEMENT_BIO,
        }
    }

    /// Run this task's structural validator against a parsed candidate.
    pub fn validate(self, candidate: &Value) -> bool {
        (self.spec().validate)(candidate)
    }
}

/// Which inputs a task insists on before any upstream call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPolicy {
    /// An image or a textual description, at least one.
    ImageOrDescription,
    /// An image, always.
    ImageRequired,
    /// At least one non-empty interview answer; image optional.
    AnswersRequired,
}

/// Static configuration for one task.
pub struct TaskSpec {
    pub kind: TaskKind,
    /// System/persona instruction sent with every request for this task.
    pub persona: &'static str,
    /// Machine-readable description of the expected response shape, embedded
    /// as text in the user content.
    pub schema: &'static str,
    pub validate: fn(&Value) -> bool,
    pub inputs: InputPolicy,
}

impl TaskSpec {
    /// Enforce this task's input policy. Violations are `MissingInput`.
    pub fn check_inputs(&self, input: &TaskInput) -> Result<(), TaskError> {
        let ok = match self.inputs {
            InputPolicy::ImageOrDescription => {
                input.has_image()
                    || input
                        .description
                        .as_deref()
                        .is_some_and(|d| !d.trim().is_empty())
            }
            InputPolicy::ImageRequired => input.has_image(),
            InputPolicy::AnswersRequired => input
                .answers
                .as_deref()
                .is_some_and(|a| a.iter().any(|s| !s.trim().is_empty())),
        };
        if ok {
            Ok(())
        } else {
            Err(TaskError::MissingInput(
                match self.inputs {
                    InputPolicy::ImageOrDescription => {
                        "Please provide either an image or a description"
                    }
                    InputPolicy::ImageRequired => "Please provide an image",
                    InputPolicy::AnswersRequired => {
                        "Please answer at least one interview question"
                    }
                }
                .to_string(),
            ))
        }
    }

    /// Assemble the ordered user content for this task: labeled text parts
    /// first, then the image.
    pub fn build_user_content(&self, input: &TaskInput) -> Vec<ContentPart> {
        let mut parts = Vec::new();
        let mut push_labeled = |label: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref()
                && !v.trim().is_empty()
            {
                parts.push(ContentPart::Text(format!("{label}: {}", v.trim())));
            }
        };
        push_labeled("Artwork description", &input.description);
        push_labeled("Artist notes", &input.notes);
        push_labeled("Keywords to consider", &input.keywords);
        push_labeled("Preferred tone", &input.tone);
        if let Some(answers) = input.answers.as_deref() {
            let answered: Vec<&str> = answers
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect();
            if !answered.is_empty() {
                parts.push(ContentPart::Text(format!(
                    "Interview answers:\n- {}",
                    answered.join("\n- ")
                )));
            }
        }
        if input.has_image()
            && let Some(url) = input.image_data_url.as_deref()
        {
            parts.push(ContentPart::ImageUrl(url.trim().to_string()));
        }
        parts
    }

    /// Build the immutable generation request for one inbound call.
    pub fn to_request(&self, input: &TaskInput) -> GenerationRequest {
        GenerationRequest {
            task: self.kind,
            persona: self.persona,
            schema: self.schema,
            parts: self.build_user_content(input),
        }
    }
}

static ARTIST_MATCH: TaskSpec = TaskSpec {
    kind: TaskKind::ArtistMatch,
    persona: "You are a widely read art historian and studio mentor. Given an \
              artwork (or a description of one), you name established artists \
              whose work shares a real visual or conceptual kinship with it, \
              explain the connection concretely, and suggest what to study in \
              each artist's practice. You never flatter; you are specific.",
    schema: r#"{
  "artists": [
    {
      "name": "string, the artist's name",
      "visual_connection": "string, >50 chars, what concretely links their work to this piece",
      "suggestion": "string, >20 chars, what to look at or borrow from them"
    }
  ]
}
The artists array must contain 4 or 5 entries."#,
    validate: validate::artist_match,
    inputs: InputPolicy::ImageOrDescription,
};

static SERIES_IDEAS: TaskSpec = TaskSpec {
    kind: TaskKind::SeriesIdeas,
    persona: "You are a working artist and curator who helps other artists \
              grow a single piece into a coherent body of work. You propose \
              series directions that are ambitious but practically achievable \
              in an ordinary studio.",
    schema: r#"{
  "opening": "string, >50 chars, a short read of the piece and why it can carry a series",
  "ideas": [
    {
      "title": "string, a working title for the series",
      "description": "string, >30 chars, what the series explores",
      "practical_note": "string, >20 chars, how to actually start it"
    }
  ],
  "closing": "string, >20 chars, an encouraging next step"
}
The ideas array must contain exactly 5 entries."#,
    validate: validate::series_ideas,
    inputs: InputPolicy::ImageOrDescription,
};

static CRITIQUE: TaskSpec = TaskSpec {
    kind: TaskKind::Critique,
    persona: "You are a rigorous but generous studio critic. You open with \
              what the work is doing, give concrete suggestions an artist \
              could act on this week, and close warmly. No empty praise.",
    schema: r#"{
  "opening": "string, >50 chars, what the piece is doing well and where it sits",
  "suggestions": ["string, >30 chars each, one concrete actionable change"],
  "closing": "string, >15 chars, a warm sign-off"
}
The suggestions array must contain between 3 and 5 entries."#,
    validate: validate::critique,
    inputs: InputPolicy::ImageRequired,
};

static ABSTRACTION_PATHS: TaskSpec = TaskSpec {
    kind: TaskKind::AbstractionPaths,
    persona: "You are an abstraction coach. Given a representational artwork, \
              you chart five progressively bolder paths away from depiction, \
              from a gentle simplification to a fully non-objective treatment, \
              each grounded in what is actually in the image.",
    schema: r#"{
  "paths": [
    {
      "level": "integer 1-5, 1 = gentlest abstraction, 5 = fully non-objective",
      "brief_read": "string, >20 chars, what this level keeps and discards"
    }
  ],
  "closing_line": "string, >5 chars"
}
The paths array must contain exactly 5 entries, and their levels must be exactly 1, 2, 3, 4, 5 — each level used once."#,
    validate: validate::abstraction_paths,
    inputs: InputPolicy::ImageRequired,
};

static TITLE_GENERATION: TaskSpec = TaskSpec {
    kind: TaskKind::TitleGeneration,
    persona: "You are a poet and gallerist who titles artworks. You avoid \
              cliché, favor titles that open the work rather than explain it, \
              and can justify your strongest candidates.",
    schema: r#"{
  "titles": ["string, a candidate title"],
  "top_rationales": [
    { "title": "string, one of the titles above", "rationale": "string, why it works" }
  ],
  "tags": ["string, a short exhibition/search tag"]
}
titles must contain exactly 12 entries, top_rationales exactly 3, tags between 5 and 7."#,
    validate: validate::title_generation,
    inputs: InputPolicy::ImageRequired,
};

static STATEMENT_BIO: TaskSpec = TaskSpec {
    kind: TaskKind::StatementBio,
    persona: "You are an editor who writes artist statements and short bios \
              from interview answers. You write plainly, in the artist's own \
              register, and strip art-speak.",
    schema: r#"{
  "statement": "string, >20 chars, a first-person artist statement",
  "bio": "string, >20 chars, a third-person short bio",
  "tips": ["string, a usage or editing tip"]
}"#,
    validate: validate::statement_bio,
    inputs: InputPolicy::AnswersRequired,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskKind::from_slug(kind.slug()), Some(kind));
            assert_eq!(kind.spec().kind, kind);
        }
        assert_eq!(TaskKind::from_slug("no-such-task"), None);
    }

    #[test]
    fn image_or_description_accepts_either() {
        let spec = TaskKind::ArtistMatch.spec();
        let with_image = TaskInput {
            image_data_url: Some("data:image/jpeg;base64,AA==".into()),
            ..Default::default()
        };
        assert!(spec.check_inputs(&with_image).is_ok());

        let with_text = TaskInput {
            description: Some("a small seascape in oils".into()),
            ..Default::default()
        };
        assert!(spec.check_inputs(&with_text).is_ok());

        let err = spec.check_inputs(&TaskInput::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please provide either an image or a description"
        );
    }

    #[test]
    fn image_required_rejects_text_only() {
        let spec = TaskKind::Critique.spec();
        let text_only = TaskInput {
            description: Some("a painting".into()),
            ..Default::default()
        };
        let err = spec.check_inputs(&text_only).unwrap_err();
        assert!(matches!(err, TaskError::MissingInput(_)));
    }

    #[test]
    fn answers_required_ignores_blank_entries() {
        let spec = TaskKind::StatementBio.spec();
        let blank = TaskInput {
            answers: Some(vec!["  ".into(), "".into()]),
            ..Default::default()
        };
        assert!(spec.check_inputs(&blank).is_err());

        let one = TaskInput {
            answers: Some(vec!["".into(), "I paint tide lines".into()]),
            ..Default::default()
        };
        assert!(spec.check_inputs(&one).is_ok());
    }

    #[test]
    fn content_builder_orders_text_before_image() {
        let input = TaskInput {
            image_data_url: Some("data:image/jpeg;base64,AA==".into()),
            description: Some("storm study".into()),
            tone: Some("playful".into()),
            ..Default::default()
        };
        let parts = TaskKind::ArtistMatch.spec().build_user_content(&input);
        assert_eq!(
            parts,
            vec![
                ContentPart::Text("Artwork description: storm study".into()),
                ContentPart::Text("Preferred tone: playful".into()),
                ContentPart::ImageUrl("data:image/jpeg;base64,AA==".into()),
            ]
        );
    }

    #[test]
    fn content_builder_joins_interview_answers() {
        let input = TaskInput {
            answers: Some(vec!["I grew up by the sea".into(), " ".into(), "Oil and chalk".into()]),
            ..Default::default()
        };
        let parts = TaskKind::StatementBio.spec().build_user_content(&input);
        assert_eq!(
            parts,
            vec![ContentPart::Text(
                "Interview answers:\n- I grew up by the sea\n- Oil and chalk".into()
            )]
        );
    }
}
