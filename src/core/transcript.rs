use crate::core::provider::{Segment, TranscriptInfo, TranscriptListing, TranscriptProvider};
use crate::core::proxy::{ProxyCandidate, candidate_sequence};
use crate::core::video_id::{VIDEO_ID_LEN, VideoId};
use crate::error::FetchError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ENGLISH_CODES: [&str; 3] = ["en", "en-US", "en-GB"];
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct TranscriptService {
    provider: Arc<dyn TranscriptProvider>,
    proxies: Vec<String>,
    max_attempts: usize,
    backoff_unit: Duration,
}

impl TranscriptService {
    pub fn new(provider: Arc<dyn TranscriptProvider>, proxies: Vec<String>) -> Self {
        Self {
            provider,
            proxies,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[cfg(test)]
    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    /// Fetch the full transcript text of a video, rotating through the
    /// configured proxies (shuffled on every call) before going direct.
    pub async fn fetch_transcript(&self, video_id: &str) -> Result<String, FetchError> {
        if video_id.len() != VIDEO_ID_LEN {
            return Err(FetchError::InvalidId);
        }
        let video_id = VideoId::parse(video_id).ok_or(FetchError::InvalidId)?;

        let candidates = candidate_sequence(&self.proxies, &mut rand::rng());
        self.fetch_with_candidates(&video_id, &candidates).await
    }

    /// Walk `(candidate, attempt)` pairs in order. The first success or the
    /// first non-transient failure ends the walk.
    pub async fn fetch_with_candidates(
        &self,
        video_id: &VideoId,
        candidates: &[ProxyCandidate],
    ) -> Result<String, FetchError> {
        let plan = candidates.iter().flat_map(|candidate| {
            (0..self.max_attempts).map(move |attempt| (candidate, attempt))
        });

        let mut last_failure = None;
        for (number, (candidate, attempt)) in plan.enumerate() {
            debug!(attempt = number + 1, proxy = %candidate, "fetching transcript for {video_id}");

            match self.attempt(video_id, candidate).await {
                Ok(text) => {
                    info!(
                        chars = text.len(),
                        proxy = %candidate,
                        "fetched transcript for {video_id}"
                    );
                    return Ok(text);
                }
                Err(FetchError::Transient(failure)) => {
                    warn!(attempt = number + 1, proxy = %candidate, "transcript attempt failed: {failure}");
                    last_failure = Some(failure);
                    self.backoff(attempt).await;
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(failure) = &last_failure {
            warn!("all transcript attempts failed for {video_id}, last error: {failure}");
        }
        Err(FetchError::ExhaustedRetries { last: last_failure })
    }

    async fn attempt(
        &self,
        video_id: &VideoId,
        candidate: &ProxyCandidate,
    ) -> Result<String, FetchError> {
        let session = self.provider.open_session(candidate)?;
        let listing = session.list_transcripts(video_id).await?;

        let chosen = select_transcript(&listing).ok_or(FetchError::NoTranscriptFound)?;
        debug!(
            available = ?listing.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>(),
            language = %chosen.language,
            code = %chosen.language_code,
            generated = chosen.is_generated,
            "selected transcript"
        );

        let segments = session.fetch_segments(video_id, chosen).await?;
        let covered = segments
            .last()
            .map_or(0.0, |last| last.start + last.duration);
        debug!(segments = segments.len(), seconds = covered, "fetched transcript");
        join_segments(&segments)
    }

    /// Linear in the attempt number: one unit after the first failure, two
    /// after the second.
    pub fn delay(&self, attempt: usize) -> Duration {
        let steps = u32::try_from(attempt + 1).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(steps)
    }

    async fn backoff(&self, attempt: usize) {
        let delay = self.delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Manual English, then any English, then whatever comes first.
pub fn select_transcript(listing: &TranscriptListing) -> Option<&TranscriptInfo> {
    listing
        .find_manually_created(&ENGLISH_CODES)
        .or_else(|| listing.find(&ENGLISH_CODES))
        .or_else(|| listing.first())
}

pub fn join_segments(segments: &[Segment]) -> Result<String, FetchError> {
    if segments.is_empty() {
        return Err(FetchError::EmptyTranscriptData);
    }

    let parts: Vec<&str> = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(FetchError::NoTextContent);
    }
    Ok(parts.join(" "))
}
