use derive_more::Display;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const VIDEO_ID_LEN: usize = 11;

/// Recognised URL shapes, tried in order. The first capture wins.
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/v/([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?.*&v=([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("video URL pattern compiles"))
    .collect()
});

static ID_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9_-]{11}").expect("video id pattern compiles"));

/// An 11 character YouTube video identifier. Only the length and the
/// alphabet are checked; whether the video exists is found out at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == VIDEO_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pull a video id out of whatever the user pasted: a watch, short, embed or
/// legacy `/v/` URL, or failing that any 11 character run of id characters.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for pattern in URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|caps| caps.get(1)) {
            return VideoId::parse(id.as_str());
        }
    }

    if input.len() >= VIDEO_ID_LEN {
        return ID_RUN
            .find(input)
            .and_then(|found| VideoId::parse(found.as_str()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(input: &str) -> Option<String> {
        extract_video_id(input).map(|id| id.to_string())
    }

    #[test]
    fn short_link() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn recognised_url_shapes() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL1234567890  ",
        ];
        for url in urls {
            assert_eq!(id(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn falls_back_to_first_id_like_run() {
        assert_eq!(id("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            id("video: dQw4w9WgXcQ (music)").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_empty_and_short_input() {
        assert_eq!(id(""), None);
        assert_eq!(id("   "), None);
        assert_eq!(id("abc"), None);
        assert_eq!(id("youtu.be/x"), None);
    }

    #[test]
    fn rejects_long_input_without_id_run() {
        assert_eq!(id("https://a.b/c/d?e=f"), None);
    }

    #[test]
    fn parse_checks_length_and_alphabet() {
        assert!(VideoId::parse("dQw4w9WgXcQ").is_some());
        assert!(VideoId::parse("dQw4w9WgXc").is_none());
        assert!(VideoId::parse("dQw4w9WgX/Q").is_none());
    }
}
