use crate::core::proxy::ProxyCandidate;
use crate::core::video_id::VideoId;
use crate::error::FetchError;
use async_trait::async_trait;

/// One transcript track advertised for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptInfo {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
}

#[cfg(test)]
impl TranscriptInfo {
    pub fn manual(language_code: &str, language: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            language: language.to_string(),
            is_generated: false,
        }
    }

    pub fn generated(language_code: &str, language: &str) -> Self {
        Self {
            is_generated: true,
            ..Self::manual(language_code, language)
        }
    }
}

/// Transcripts available for a video, manually authored ones first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptListing {
    entries: Vec<TranscriptInfo>,
}

impl TranscriptListing {
    pub fn new(mut entries: Vec<TranscriptInfo>) -> Self {
        // stable: keeps the incoming order inside each group
        entries.sort_by_key(|info| info.is_generated);
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptInfo> {
        self.entries.iter()
    }

    pub fn find_manually_created(&self, language_codes: &[&str]) -> Option<&TranscriptInfo> {
        language_codes.iter().find_map(|code| {
            self.entries
                .iter()
                .find(|info| !info.is_generated && info.language_code == *code)
        })
    }

    pub fn find(&self, language_codes: &[&str]) -> Option<&TranscriptInfo> {
        language_codes
            .iter()
            .find_map(|code| self.entries.iter().find(|info| info.language_code == *code))
    }

    pub fn first(&self) -> Option<&TranscriptInfo> {
        self.entries.first()
    }
}

/// A timed-text segment, already normalised from whatever shape the
/// provider returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[cfg(test)]
impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: 0.0,
            duration: 0.0,
        }
    }
}

/// A connection to the transcript service through one proxy candidate.
///
/// Implementations report video-level problems with the matching
/// `FetchError` variant and everything else as `FetchError::Transient`.
#[async_trait]
pub trait TranscriptSession: Send + Sync {
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptListing, FetchError>;

    async fn fetch_segments(
        &self,
        video_id: &VideoId,
        transcript: &TranscriptInfo,
    ) -> Result<Vec<Segment>, FetchError>;
}

pub trait TranscriptProvider: Send + Sync {
    fn open_session(
        &self,
        candidate: &ProxyCandidate,
    ) -> Result<Box<dyn TranscriptSession>, FetchError>;
}
