use crate::core::cache::{TranscriptCache, TranscriptResult};
use crate::core::text::TextService;
use crate::core::transcript::TranscriptService;
use crate::core::video_id::{VideoId, extract_video_id};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Marker every failure shown to the user starts with.
pub const ERROR_MARKER: &str = "Error: ";

pub const SUPPORTED_FORMATS_HINT: &str =
    "Supported formats: youtube.com/watch?v=VIDEO_ID, youtu.be/VIDEO_ID, youtube.com/embed/VIDEO_ID, youtube.com/v/VIDEO_ID";
const TRANSLATION_UNAVAILABLE: &str = "Translation unavailable; showing original summary.";

/// The outcome of a user-facing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Success {
        title: String,
        body: String,
        note: Option<String>,
    },
    Failure {
        message: String,
        hint: Option<String>,
    },
}

impl Reply {
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Success {
            title: title.into(),
            body: body.into(),
            note: None,
        }
    }

    pub fn failure(message: impl fmt::Display) -> Self {
        Self::Failure {
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn invalid_url() -> Self {
        Self::Failure {
            message: "Invalid YouTube URL. Please enter a valid URL.".to_string(),
            hint: Some(SUPPORTED_FORMATS_HINT.to_string()),
        }
    }

    /// A fetched transcript, or the reason there is none.
    pub fn transcript(video_id: &VideoId, result: &TranscriptResult) -> Self {
        match result {
            Ok(text) => Self::success(format!("Transcript ({video_id}):"), text.as_str()),
            Err(err) => Self::failure(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Successes always open with their title, failures with `ERROR_MARKER`, so
/// the two can never be confused by someone reading the text.
impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { title, body, note } => {
                write!(f, "{title}\n\n{body}")?;
                if let Some(note) = note {
                    write!(f, "\n\n{note}")?;
                }
                Ok(())
            }
            Self::Failure { message, hint } => {
                write!(f, "{ERROR_MARKER}{message}")?;
                if let Some(hint) = hint {
                    write!(f, "\n{hint}")?;
                }
                Ok(())
            }
        }
    }
}

/// Transcript retrieval plus the text operations, without any session state.
#[derive(Clone)]
pub struct Assistant {
    transcripts: TranscriptService,
    text: TextService,
}

impl Assistant {
    pub fn new(transcripts: TranscriptService, text: TextService) -> Self {
        Self { transcripts, text }
    }

    pub async fn fetch_transcript(&self, video_id: &VideoId) -> TranscriptResult {
        self.transcripts.fetch_transcript(video_id.as_str()).await
    }

    pub async fn summarize_transcript(&self, transcript: &str, translate: bool) -> Reply {
        let summary = match self.text.summarize(transcript).await {
            Ok(summary) => summary,
            Err(err) => return Reply::failure(format!("Could not summarize the transcript: {err}")),
        };

        if !translate {
            return Reply::success("Video Summary:", summary);
        }

        match self.text.translate_to_english(&summary).await {
            Ok(translated) if !translated.is_empty() => {
                Reply::success("Video Summary (English):", translated)
            }
            outcome => {
                if let Err(err) = outcome {
                    warn!("summary translation failed: {err}");
                }
                Reply::Success {
                    title: "Video Summary:".to_string(),
                    body: summary,
                    note: Some(TRANSLATION_UNAVAILABLE.to_string()),
                }
            }
        }
    }

    pub async fn answer(&self, transcript: &str, question: &str) -> Reply {
        match self.text.answer_question(transcript, question).await {
            Ok(answer) => Reply::success("Answer:", answer),
            Err(err) => Reply::failure(format!("Could not process your question: {err}")),
        }
    }
}

/// One user's session: the assistant plus the transcripts fetched so far.
pub struct Session {
    assistant: Assistant,
    cache: TranscriptCache,
}

impl Session {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant,
            cache: TranscriptCache::new(),
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    pub async fn summarize(&mut self, url: &str, translate: bool) -> Reply {
        let Some(video_id) = extract_video_id(url) else {
            return Reply::invalid_url();
        };
        info!("summarizing video {video_id}");

        match self.transcript_for(&video_id).await {
            Ok(transcript) => {
                self.assistant
                    .summarize_transcript(&transcript, translate)
                    .await
            }
            Err(err) => Reply::failure(err),
        }
    }

    pub async fn ask(&mut self, url: &str, question: &str) -> Reply {
        let Some(video_id) = extract_video_id(url) else {
            return Reply::invalid_url();
        };
        if question.trim().is_empty() {
            return Reply::failure("Please enter a question.");
        }
        info!("answering a question about video {video_id}");

        match self.transcript_for(&video_id).await {
            Ok(transcript) => self.assistant.answer(&transcript, question.trim()).await,
            Err(err) => Reply::failure(err),
        }
    }

    pub async fn transcript(&mut self, url: &str) -> Reply {
        let Some(video_id) = extract_video_id(url) else {
            return Reply::invalid_url();
        };

        let result = self.transcript_for(&video_id).await;
        Reply::transcript(&video_id, &result)
    }

    async fn transcript_for(&mut self, video_id: &VideoId) -> TranscriptResult {
        let assistant = &self.assistant;
        self.cache
            .get_or_fetch(video_id, || assistant.fetch_transcript(video_id))
            .await
    }
}
