//! Atelier — image-aware creative-suggestion relay
//!
//! A thin server-side relay that turns an uploaded artwork (or a textual
//! description) into structured creative suggestions from an LLM upstream.
//! The interesting parts:
//!
//! - **[`normalize`]**: deterministic image preprocessing — bounded
//!   downscale, size-bounded JPEG re-encode, data-URI packaging.
//! - **[`validate`] / [`tasks`]**: a strict structural contract per task,
//!   checked locally against whatever the generator returns.
//! - **[`orchestrator`]**: a two-attempt lenient→strict retry that reacts
//!   to output shape, never to transport failures.
//! - **[`server`]**: one generic axum handler serving all six tasks, with a
//!   fixed error taxonomy (`400`/`502`/`500`) and bounded debug excerpts.
//!
//! Nothing is persisted: images, requests, and results live for one call.

pub mod config;
pub mod error;
pub mod generate;
pub mod normalize;
pub mod orchestrator;
pub mod server;
pub mod tasks;
pub mod types;
pub mod validate;

/// Convenient re-exports for embedding the relay.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{DEBUG_EXCERPT_CHARS, TaskError};
    pub use crate::generate::{GenerationBackend, HttpGenerator};
    pub use crate::normalize::{
        NormalizeOptions, NormalizedImage, OverflowPolicy, UploadedImage, normalize,
    };
    pub use crate::orchestrator;
    pub use crate::server::{AppState, router};
    pub use crate::tasks::{InputPolicy, TaskKind, TaskSpec};
    pub use crate::types::{
        AttemptMode, ContentPart, GenerationRequest, SubmissionState, TaskInput,
    };
}
