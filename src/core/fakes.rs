//! In-memory stand-ins for the transcript service and the completion model.

use crate::core::completion::{ChatMessage, CompletionClient};
use crate::core::provider::{
    Segment, TranscriptInfo, TranscriptListing, TranscriptProvider, TranscriptSession,
};
use crate::core::proxy::ProxyCandidate;
use crate::core::video_id::VideoId;
use crate::error::{FailureKind, FetchError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeState {
    pub listing: TranscriptListing,
    pub segments: Vec<Segment>,
    /// Failures handed out by `list_transcripts`, one per call, before it
    /// starts succeeding.
    pub scripted: Mutex<VecDeque<FetchError>>,
    /// Candidates whose sessions always fail as blocked.
    pub blocked: Vec<ProxyCandidate>,
    pub opened: Mutex<Vec<ProxyCandidate>>,
    pub chosen: Mutex<Vec<TranscriptInfo>>,
}

#[derive(Clone)]
pub struct FakeProvider(Arc<FakeState>);

impl FakeProvider {
    pub fn new(state: FakeState) -> Self {
        Self(Arc::new(state))
    }

    pub fn with_text(segments: &[&str]) -> Self {
        Self::new(FakeState {
            listing: TranscriptListing::new(vec![TranscriptInfo::manual("en", "English")]),
            segments: segments.iter().map(|text| Segment::new(*text)).collect(),
            ..FakeState::default()
        })
    }

    pub fn opened(&self) -> Vec<ProxyCandidate> {
        self.0.opened.lock().unwrap().clone()
    }

    pub fn chosen(&self) -> Vec<TranscriptInfo> {
        self.0.chosen.lock().unwrap().clone()
    }
}

struct FakeSession {
    state: Arc<FakeState>,
    candidate: ProxyCandidate,
}

impl TranscriptProvider for FakeProvider {
    fn open_session(
        &self,
        candidate: &ProxyCandidate,
    ) -> core::result::Result<Box<dyn TranscriptSession>, FetchError> {
        self.0.opened.lock().unwrap().push(candidate.clone());
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.0),
            candidate: candidate.clone(),
        }))
    }
}

#[async_trait]
impl TranscriptSession for FakeSession {
    async fn list_transcripts(
        &self,
        _: &VideoId,
    ) -> core::result::Result<TranscriptListing, FetchError> {
        if self.state.blocked.contains(&self.candidate) {
            return Err(FetchError::transient(
                FailureKind::RequestBlocked,
                format!("blocked via {}", self.candidate),
            ));
        }
        if let Some(err) = self.state.scripted.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.state.listing.clone())
    }

    async fn fetch_segments(
        &self,
        _: &VideoId,
        transcript: &TranscriptInfo,
    ) -> core::result::Result<Vec<Segment>, FetchError> {
        self.state.chosen.lock().unwrap().push(transcript.clone());
        Ok(self.state.segments.clone())
    }
}

/// Records every request and answers from a script, falling back to an echo
/// of the last message's length.
#[derive(Default)]
pub struct RecordingClient {
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    script: Mutex<VecDeque<Result<String>>>,
}

impl RecordingClient {
    pub fn scripted(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Some(reply) = self.script.lock().unwrap().pop_front() {
            return reply;
        }
        let last = messages.last().map(|m| m.content.len()).unwrap_or_default();
        Ok(format!("  echo of {last} chars \n"))
    }
}
