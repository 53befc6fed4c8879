use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    Custom(String),

    #[display("API key missing: set {env_var} in the environment or in a .env file")]
    MissingApiKey { env_var: &'static str },

    #[display("Invalid value for {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },

    #[from]
    Fetch(FetchError),

    #[from]
    Text(TextError),

    #[from]
    Io(std::io::Error),

    #[from]
    OpenAI(async_openai::error::OpenAIError),

    #[from]
    Json(serde_json::Error),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }
}

impl std::error::Error for Error {}

/// Why a single transcript attempt failed in a way worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FailureKind {
    RequestBlocked,
    IpBlocked,
    RequestFailed,
    Unparsable,
    InvalidProxy,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{kind}: {message}")]
pub struct TransientFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransientFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FetchError {
    #[display("Invalid YouTube video ID format")]
    InvalidId,

    #[display("Transcripts are disabled for this video")]
    TranscriptsDisabled,

    #[display("The video is unavailable")]
    VideoUnavailable,

    #[display("No transcript found for this video")]
    NoTranscriptFound,

    #[display("No transcript data received")]
    EmptyTranscriptData,

    #[display("No text content found in transcript")]
    NoTextContent,

    /// Network, proxy and rate-limit failures, worth another attempt.
    /// Every other variant reflects the video itself and ends the fetch.
    #[display("Transient failure - {_0}")]
    Transient(TransientFailure),

    #[display(
        "Failed to fetch transcript - {}",
        last.as_ref().map_or_else(|| "unknown error".to_string(), ToString::to_string)
    )]
    ExhaustedRetries { last: Option<TransientFailure> },
}

impl FetchError {
    pub fn transient(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Transient(TransientFailure::new(kind, message))
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TextError {
    #[display("{_0}")]
    CompletionApi(String),

    #[display("The model returned an empty response")]
    EmptyResponse,
}

impl std::error::Error for TextError {}

impl From<Error> for TextError {
    fn from(err: Error) -> Self {
        Self::CompletionApi(err.to_string())
    }
}
