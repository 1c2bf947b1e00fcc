#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Voice-to-task pipeline: transcription followed by interpretation.
//!
//! Speech-to-text stays external behind the [`Transcriber`] trait; this
//! crate only wires its output into the interpreter and converts every
//! failure into data on the returned [`PipelineOutcome`]. A transcription
//! failure short-circuits before interpretation ever runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voxtask_core::{ExtractionResult, Interpreter};

/// Successful transcription of one audio payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub language: String,
}

/// Why a transcription attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio payload of {actual_mb} MB exceeds the {limit_mb} MB limit")]
    PayloadTooLarge { actual_mb: u64, limit_mb: u64 },

    #[error("transcription backend failed: {0}")]
    Backend(String),
}

/// External speech-to-text capability.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        filename: &str,
    ) -> Result<Transcription, TranscribeError>;
}

/// Result of one full pipeline run. `task` is absent when transcription
/// fails; interpreter diagnostics are surfaced through `errors` either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub transcription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<ExtractionResult>,
    pub errors: Vec<String>,
}

/// Audio payload guards applied before the transcriber is invoked.
#[derive(Debug, Clone)]
pub struct AudioLimits {
    pub max_size_mb: u64,
    pub supported_formats: Vec<String>,
}

impl Default for AudioLimits {
    fn default() -> Self {
        Self {
            max_size_mb: 50,
            supported_formats: vec!["wav".to_string()],
        }
    }
}

impl AudioLimits {
    /// Reject payloads the transcriber should never see.
    fn check(&self, audio: &[u8], filename: &str) -> Result<(), TranscribeError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        if !self.supported_formats.iter().any(|f| *f == extension) {
            return Err(TranscribeError::UnsupportedFormat(extension));
        }

        let actual_mb = u64::try_from(audio.len()).unwrap_or(u64::MAX) / (1024 * 1024);
        if actual_mb > self.max_size_mb {
            return Err(TranscribeError::PayloadTooLarge {
                actual_mb,
                limit_mb: self.max_size_mb,
            });
        }

        Ok(())
    }
}

/// Full pipeline: audio bytes → transcription → task extraction.
pub struct VoicePipeline {
    transcriber: Box<dyn Transcriber>,
    interpreter: Interpreter,
    limits: AudioLimits,
    users: Vec<String>,
    categories: Vec<String>,
}

impl VoicePipeline {
    #[must_use]
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        interpreter: Interpreter,
        limits: AudioLimits,
        users: Vec<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            transcriber,
            interpreter,
            limits,
            users,
            categories,
        }
    }

    /// Replace both vocabularies wholesale; never mutates them in place,
    /// so in-flight calls on clones are unaffected.
    pub fn set_vocabularies(&mut self, users: Vec<String>, categories: Vec<String>) {
        self.users = users;
        self.categories = categories;
    }

    /// Run the full pipeline on one audio payload.
    pub async fn process(&self, audio: &[u8], filename: &str) -> PipelineOutcome {
        info!(filename, bytes = audio.len(), "processing audio");

        if let Err(e) = self.limits.check(audio, filename) {
            warn!(%e, "audio rejected before transcription");
            return Self::transcription_failure(e.to_string());
        }

        let transcription = match self.transcriber.transcribe(audio, filename).await {
            Ok(t) => t,
            Err(e) => {
                warn!(%e, "transcription failed");
                return Self::transcription_failure(e.to_string());
            }
        };

        let task = self
            .interpreter
            .interpret(&transcription.text, &self.users, &self.categories);

        PipelineOutcome {
            success: task.success,
            transcription: transcription.text,
            errors: task.errors.clone(),
            task: Some(task),
        }
    }

    fn transcription_failure(error: String) -> PipelineOutcome {
        PipelineOutcome {
            success: false,
            transcription: String::new(),
            task: None,
            errors: vec![error],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTranscriber {
        text: &'static str,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _filename: &str,
        ) -> Result<Transcription, TranscribeError> {
            Ok(Transcription {
                text: self.text.to_string(),
                language: "en".to_string(),
            })
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _filename: &str,
        ) -> Result<Transcription, TranscribeError> {
            Err(TranscribeError::Backend("model not loaded".to_string()))
        }
    }

    fn pipeline(transcriber: Box<dyn Transcriber>) -> VoicePipeline {
        VoicePipeline::new(
            transcriber,
            Interpreter::new(),
            AudioLimits::default(),
            vec!["Bob".to_string(), "Alice".to_string()],
            vec!["Construction".to_string()],
        )
    }

    #[tokio::test]
    async fn transcribed_command_flows_into_the_interpreter() {
        let p = pipeline(Box::new(FixedTranscriber {
            text: "task fix door user Bob",
        }));

        let outcome = p.process(b"audio", "cmd.wav").await;
        assert!(outcome.success);
        assert_eq!(outcome.transcription, "task fix door user Bob");

        #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
        let task = outcome.task.expect("task should be present");
        assert_eq!(task.title.as_deref(), Some("fix door"));
        assert_eq!(task.assignee.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn transcription_failure_short_circuits() {
        let p = pipeline(Box::new(FailingTranscriber));

        let outcome = p.process(b"audio", "cmd.wav").await;
        assert!(!outcome.success);
        assert!(outcome.task.is_none());
        assert!(outcome.transcription.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("model not loaded"));
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_before_transcription() {
        let p = pipeline(Box::new(FixedTranscriber { text: "unused" }));

        let outcome = p.process(b"audio", "cmd.mp3").await;
        assert!(!outcome.success);
        assert!(outcome.task.is_none());
        assert!(outcome.errors[0].contains("unsupported audio format"));
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let mut p = pipeline(Box::new(FixedTranscriber { text: "unused" }));
        p.limits.max_size_mb = 0;

        let payload = vec![0_u8; 2 * 1024 * 1024];
        let outcome = p.process(&payload, "cmd.wav").await;
        assert!(!outcome.success);
        assert!(outcome.errors[0].contains("exceeds"));
    }

    #[tokio::test]
    async fn interpreter_diagnostics_surface_in_outcome_errors() {
        let p = pipeline(Box::new(FixedTranscriber {
            text: "task fix door user Bob deadline whenever",
        }));

        let outcome = p.process(b"audio", "cmd.wav").await;
        assert!(outcome.success);
        assert_eq!(
            outcome.errors,
            vec!["Could not parse deadline: whenever".to_string()]
        );
    }
}
