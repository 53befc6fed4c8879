use crate::core::provider::{
    Segment, TranscriptInfo, TranscriptListing, TranscriptProvider, TranscriptSession,
};
use crate::core::proxy::ProxyCandidate;
use crate::core::video_id::VideoId;
use crate::error::{FailureKind, FetchError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, Proxy};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};
use yt_transcript_rs::{Transcript, TranscriptList};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Connection-level retry applied to every request a session makes.
#[derive(Debug, Clone, Copy)]
pub struct TransportRetry {
    pub retries: u32,
    pub backoff_base: Duration,
}

impl Default for TransportRetry {
    fn default() -> Self {
        Self {
            retries: 5,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl TransportRetry {
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(retry))
    }

    async fn run<T, F, Fut>(&self, op: F) -> Result<T, CouldNotRetrieveTranscript>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CouldNotRetrieveTranscript>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.retries && is_connection_failure(&err) => {
                    debug!(retry, "transport retry after connection failure: {err}");
                }
                Err(err) => return Err(err),
            }
            tokio::time::sleep(self.delay(retry)).await;
            retry += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct YouTubeProvider {
    retry: TransportRetry,
}

impl TranscriptProvider for YouTubeProvider {
    fn open_session(
        &self,
        candidate: &ProxyCandidate,
    ) -> Result<Box<dyn TranscriptSession>, FetchError> {
        let client = http_client(candidate)?;
        let api = YouTubeTranscriptApi::new(None, None, Some(client.clone()))
            .map_err(|e| FetchError::transient(FailureKind::Other, e.to_string()))?;

        Ok(Box::new(YouTubeSession {
            api,
            client,
            retry: self.retry,
            listed: Mutex::new(None),
        }))
    }
}

/// One client per candidate so listing and fetching share the same route.
fn http_client(candidate: &ProxyCandidate) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers);

    if let Some(url) = candidate.proxy_url() {
        let proxy = Proxy::all(url)
            .map_err(|e| FetchError::transient(FailureKind::InvalidProxy, e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::transient(FailureKind::Other, e.to_string()))
}

struct YouTubeSession {
    api: YouTubeTranscriptApi,
    client: Client,
    retry: TransportRetry,
    /// Last listing, so the chosen track is fetched without listing again.
    listed: Mutex<Option<TranscriptList>>,
}

impl YouTubeSession {
    async fn fetch_list(&self, video_id: &VideoId) -> Result<TranscriptList, FetchError> {
        self.retry
            .run(|| self.api.list_transcripts(video_id.as_str()))
            .await
            .map_err(classify)
    }

    fn remember(&self, list: TranscriptList) {
        if let Ok(mut slot) = self.listed.lock() {
            *slot = Some(list);
        }
    }

    fn remembered(&self, video_id: &VideoId, info: &TranscriptInfo) -> Option<Transcript> {
        let slot = self.listed.lock().ok()?;
        match &*slot {
            Some(list) if list.video_id == video_id.as_str() => lookup(list, info),
            _ => None,
        }
    }
}

#[async_trait]
impl TranscriptSession for YouTubeSession {
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptListing, FetchError> {
        let list = self.fetch_list(video_id).await?;
        let listing = listing_from(&list);
        self.remember(list);
        Ok(listing)
    }

    async fn fetch_segments(
        &self,
        video_id: &VideoId,
        transcript: &TranscriptInfo,
    ) -> Result<Vec<Segment>, FetchError> {
        let selected = match self.remembered(video_id, transcript) {
            Some(selected) => selected,
            None => {
                let list = self.fetch_list(video_id).await?;
                lookup(&list, transcript).ok_or(FetchError::NoTranscriptFound)?
            }
        };

        let fetched = self
            .retry
            .run(|| selected.fetch(&self.client, false))
            .await
            .map_err(classify)?;

        Ok(fetched
            .snippets
            .into_iter()
            .map(|snippet| Segment {
                text: normalize_text(&snippet.text),
                start: snippet.start,
                duration: snippet.duration,
            })
            .collect())
    }
}

/// The library keys tracks by language in hash maps, which loses YouTube's
/// track order. Each group is ordered by language code instead.
pub fn listing_from(list: &TranscriptList) -> TranscriptListing {
    let mut entries: Vec<TranscriptInfo> = list
        .transcripts()
        .map(|transcript| TranscriptInfo {
            language_code: transcript.language_code.clone(),
            language: transcript.language.clone(),
            is_generated: transcript.is_generated,
        })
        .collect();
    entries.sort_by(|a, b| a.language_code.cmp(&b.language_code));

    TranscriptListing::new(entries)
}

fn lookup(list: &TranscriptList, info: &TranscriptInfo) -> Option<Transcript> {
    let group = if info.is_generated {
        &list.generated_transcripts
    } else {
        &list.manually_created_transcripts
    };
    group.get(&info.language_code).cloned()
}

/// Decode HTML entities and fold caption line breaks into spaces.
pub fn normalize_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_connection_failure(err: &CouldNotRetrieveTranscript) -> bool {
    matches!(
        err.reason,
        Some(CouldNotRetrieveTranscriptReason::YouTubeRequestFailed(_))
    )
}

fn classify(err: CouldNotRetrieveTranscript) -> FetchError {
    use CouldNotRetrieveTranscriptReason as Reason;

    let message = err.to_string();
    let kind = match &err.reason {
        Some(Reason::TranscriptsDisabled) => return FetchError::TranscriptsDisabled,
        Some(Reason::VideoUnavailable) => return FetchError::VideoUnavailable,
        Some(Reason::NoTranscriptFound { .. }) => return FetchError::NoTranscriptFound,
        Some(Reason::RequestBlocked(_)) => FailureKind::RequestBlocked,
        Some(Reason::IpBlocked(_)) => FailureKind::IpBlocked,
        Some(Reason::YouTubeRequestFailed(_)) => FailureKind::RequestFailed,
        Some(Reason::YouTubeDataUnparsable(_)) => FailureKind::Unparsable,
        _ => FailureKind::Other,
    };
    FetchError::transient(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::select_transcript;
    use std::sync::atomic::{AtomicU32, Ordering};

    const VIDEO: &str = "dQw4w9WgXcQ";

    fn track(code: &str, generated: bool) -> (String, Transcript) {
        let transcript = Transcript::new(
            VIDEO.to_string(),
            format!("https://www.youtube.com/api/timedtext?v={VIDEO}&lang={code}"),
            format!("Language {code}"),
            code.to_string(),
            generated,
            vec![],
        );
        (code.to_string(), transcript)
    }

    fn transcript_list(manual: &[&str], generated: &[&str]) -> TranscriptList {
        TranscriptList::new(
            VIDEO.to_string(),
            manual.iter().map(|code| track(code, false)).collect(),
            generated.iter().map(|code| track(code, true)).collect(),
            vec![],
        )
    }

    fn failure(reason: CouldNotRetrieveTranscriptReason) -> CouldNotRetrieveTranscript {
        CouldNotRetrieveTranscript {
            video_id: VIDEO.to_string(),
            reason: Some(reason),
        }
    }

    fn no_delay(retries: u32) -> TransportRetry {
        TransportRetry {
            retries,
            backoff_base: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_doubles_from_half_a_second() {
        let retry = TransportRetry::default();
        assert_eq!(retry.delay(0), Duration::from_millis(500));
        assert_eq!(retry.delay(1), Duration::from_millis(1000));
        assert_eq!(retry.delay(4), Duration::from_millis(8000));
    }

    #[test]
    fn normalizes_caption_text() {
        assert_eq!(normalize_text("it&#39;s\nfine"), "it's fine");
        assert_eq!(normalize_text("  Tom &amp; Jerry  "), "Tom & Jerry");
        assert_eq!(normalize_text(" \n "), "");
    }

    #[test]
    fn listing_order_is_stable_across_hash_maps() {
        let manual = ["de", "fr", "ja", "es", "it", "ko"];
        let generated = ["pt", "ar"];

        let codes = |listing: &TranscriptListing| -> Vec<String> {
            listing.iter().map(|t| t.language_code.clone()).collect()
        };
        let expected = vec!["de", "es", "fr", "it", "ja", "ko", "ar", "pt"];

        for _ in 0..50 {
            let listing = listing_from(&transcript_list(&manual, &generated));
            assert_eq!(codes(&listing), expected);
            let chosen = select_transcript(&listing).map(|t| t.language_code.as_str());
            assert_eq!(chosen, Some("de"));
        }
    }

    #[test]
    fn listing_keeps_generated_flag() {
        let listing = listing_from(&transcript_list(&["fr"], &["en"]));
        let chosen = select_transcript(&listing).cloned();
        assert_eq!(
            chosen,
            Some(TranscriptInfo {
                language_code: "en".to_string(),
                language: "Language en".to_string(),
                is_generated: true,
            })
        );
    }

    #[test]
    fn lookup_respects_generated_flag() {
        let list = transcript_list(&["en"], &["en"]);
        let info = TranscriptInfo {
            language_code: "en".to_string(),
            language: "English".to_string(),
            is_generated: true,
        };
        assert!(lookup(&list, &info).is_some_and(|t| t.is_generated));

        let missing = TranscriptInfo {
            language_code: "de".to_string(),
            ..info
        };
        assert!(lookup(&list, &missing).is_none());
    }

    #[test]
    fn video_level_reasons_end_the_fetch() {
        use CouldNotRetrieveTranscriptReason as Reason;

        assert_eq!(
            classify(failure(Reason::TranscriptsDisabled)),
            FetchError::TranscriptsDisabled
        );
        assert_eq!(
            classify(failure(Reason::VideoUnavailable)),
            FetchError::VideoUnavailable
        );
        let not_found = Reason::NoTranscriptFound {
            requested_language_codes: vec!["en".to_string()],
            transcript_data: transcript_list(&[], &[]),
        };
        assert_eq!(classify(failure(not_found)), FetchError::NoTranscriptFound);
    }

    #[test]
    fn other_reasons_are_transient() {
        use CouldNotRetrieveTranscriptReason as Reason;

        let cases = [
            (Reason::RequestBlocked(None), FailureKind::RequestBlocked),
            (Reason::IpBlocked(None), FailureKind::IpBlocked),
            (
                Reason::YouTubeRequestFailed("connection reset".to_string()),
                FailureKind::RequestFailed,
            ),
            (
                Reason::YouTubeDataUnparsable("bad json".to_string()),
                FailureKind::Unparsable,
            ),
            (Reason::AgeRestricted, FailureKind::Other),
        ];

        for (reason, expected) in cases {
            match classify(failure(reason)) {
                FetchError::Transient(failure) => assert_eq!(failure.kind, expected),
                other => panic!("expected a transient failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn transport_retry_gives_up_after_its_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = no_delay(3)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(failure(CouldNotRetrieveTranscriptReason::YouTubeRequestFailed(
                        "connection reset".to_string(),
                    )))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn transport_retry_recovers_from_connection_failures() {
        let calls = AtomicU32::new(0);
        let result = no_delay(5)
            .run(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err(failure(CouldNotRetrieveTranscriptReason::YouTubeRequestFailed(
                            "timeout".to_string(),
                        )))
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.ok(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transport_retry_leaves_blocks_to_the_caller() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = no_delay(5)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(failure(CouldNotRetrieveTranscriptReason::RequestBlocked(None))) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn direct_candidate_opens_a_session() {
        assert!(YouTubeProvider::default()
            .open_session(&ProxyCandidate::Direct)
            .is_ok());
    }

    #[test]
    fn remembered_track_matches_video() {
        let session = YouTubeSession {
            api: YouTubeTranscriptApi::new(None, None, Some(Client::new())).unwrap(),
            client: Client::new(),
            retry: TransportRetry::default(),
            listed: Mutex::new(None),
        };
        let info = TranscriptInfo {
            language_code: "fr".to_string(),
            language: "French".to_string(),
            is_generated: false,
        };
        let video = VideoId::parse(VIDEO).unwrap();
        assert!(session.remembered(&video, &info).is_none());

        session.remember(transcript_list(&["fr"], &[]));
        assert!(session.remembered(&video, &info).is_some());

        let other = VideoId::parse("aaaaaaaaaaa").unwrap();
        assert!(session.remembered(&other, &info).is_none());
    }
}
