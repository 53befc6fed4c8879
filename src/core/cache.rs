use crate::core::video_id::VideoId;
use crate::error::FetchError;
use std::collections::HashMap;
use std::future::Future;

pub type TranscriptResult = Result<String, FetchError>;

/// Transcripts fetched during one session, keyed by video id.
///
/// Video-level failures are remembered alongside successes. Exhausted
/// retries are not, so the next action gets a fresh attempt.
#[derive(Debug, Default)]
pub struct TranscriptCache {
    entries: HashMap<VideoId, TranscriptResult>,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, video_id: &VideoId) -> Option<&TranscriptResult> {
        self.entries.get(video_id)
    }

    /// Returns whether the result was kept.
    pub fn insert(&mut self, video_id: VideoId, result: TranscriptResult) -> bool {
        if matches!(result, Err(FetchError::ExhaustedRetries { .. })) {
            return false;
        }
        self.entries.insert(video_id, result);
        true
    }

    /// Forget a video so the next action fetches it again.
    pub fn remove(&mut self, video_id: &VideoId) -> Option<TranscriptResult> {
        self.entries.remove(video_id)
    }

    pub async fn get_or_fetch<F, Fut>(&mut self, video_id: &VideoId, fetch: F) -> TranscriptResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TranscriptResult>,
    {
        if let Some(cached) = self.entries.get(video_id) {
            return cached.clone();
        }

        let result = fetch().await;
        self.insert(video_id.clone(), result.clone());
        result
    }

    /// Cached ids in a stable order, for listing.
    pub fn ids(&self) -> Vec<&VideoId> {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn id(raw: &str) -> VideoId {
        VideoId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn fetches_once_per_video() {
        let mut cache = TranscriptCache::new();
        let calls = Cell::new(0);
        let video = id("dQw4w9WgXcQ");

        for _ in 0..3 {
            let result = cache
                .get_or_fetch(&video, || async {
                    calls.set(calls.get() + 1);
                    Ok("transcript".to_string())
                })
                .await;
            assert_eq!(result.as_deref(), Ok("transcript"));
        }
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn remembers_video_level_failures() {
        let mut cache = TranscriptCache::new();
        let video = id("aaaaaaaaaaa");

        let first = cache
            .get_or_fetch(&video, || async { Err(FetchError::TranscriptsDisabled) })
            .await;
        let second = cache
            .get_or_fetch(&video, || async { Ok("should not be fetched".to_string()) })
            .await;

        assert_eq!(first, Err(FetchError::TranscriptsDisabled));
        assert_eq!(second, Err(FetchError::TranscriptsDisabled));
    }

    #[tokio::test]
    async fn exhausted_retries_are_not_cached() {
        let mut cache = TranscriptCache::new();
        let video = id("bbbbbbbbbbb");

        let exhausted = cache
            .get_or_fetch(&video, || async { Err(FetchError::ExhaustedRetries { last: None }) })
            .await;
        assert!(exhausted.is_err());
        assert!(cache.get(&video).is_none());

        let retried = cache
            .get_or_fetch(&video, || async { Ok("second time lucky".to_string()) })
            .await;
        assert_eq!(retried.as_deref(), Ok("second time lucky"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn removed_entries_are_fetched_again() {
        let mut cache = TranscriptCache::new();
        let video = id("ccccccccccc");
        cache.insert(video.clone(), Ok("old".into()));

        assert_eq!(cache.remove(&video), Some(Ok("old".to_string())));
        let fresh = cache
            .get_or_fetch(&video, || async { Ok("new".to_string()) })
            .await;
        assert_eq!(fresh.as_deref(), Ok("new"));
    }

    #[test]
    fn ids_are_sorted() {
        let mut cache = TranscriptCache::new();
        cache.insert(id("zzzzzzzzzzz"), Ok("z".into()));
        cache.insert(id("aaaaaaaaaaa"), Ok("a".into()));
        let ids: Vec<_> = cache.ids().into_iter().map(VideoId::as_str).collect();
        assert_eq!(ids, vec!["aaaaaaaaaaa", "zzzzzzzzzzz"]);
    }
}
