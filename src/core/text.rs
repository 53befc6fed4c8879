use crate::core::completion::{ChatMessage, CompletionClient};
use crate::error::TextError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hard prompt budget, in characters.
pub const MAX_INPUT_CHARS: usize = 4000;

const ASSISTANT_PROMPT: &str = "You are a helpful assistant.";
const TRANSLATOR_PROMPT: &str = "You are a professional translator. Always respond in natural, fluent English. Keep formatting and lists when possible.";
const ANSWER_PROMPT: &str = "You are a helpful assistant. Answer in clear, fluent English.";

#[derive(Clone)]
pub struct TextService {
    client: Arc<dyn CompletionClient>,
}

impl TextService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn summarize(&self, text: &str) -> Result<String, TextError> {
        let text = truncate_chars(text, MAX_INPUT_CHARS);
        self.run(
            "summarize",
            [
                ChatMessage::system(ASSISTANT_PROMPT),
                ChatMessage::user(format!(
                    "Summarize the following text in a concise manner:\n{text}"
                )),
            ],
        )
        .await
    }

    /// Blank input translates to blank output without a round trip.
    pub async fn translate_to_english(&self, text: &str) -> Result<String, TextError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.run(
            "translate",
            [
                ChatMessage::system(TRANSLATOR_PROMPT),
                ChatMessage::user(format!(
                    "Translate the following text to English. If it's already English, improve clarity and grammar while keeping meaning.\n\n{text}"
                )),
            ],
        )
        .await
    }

    /// Answer in English. The raw answer is run through the translator in
    /// case the model ignored the instruction; if that fails the raw answer
    /// is returned as is.
    pub async fn answer_question(&self, text: &str, question: &str) -> Result<String, TextError> {
        let text = truncate_chars(text, MAX_INPUT_CHARS);
        let raw_answer = self
            .run(
                "answer",
                [
                    ChatMessage::system(ANSWER_PROMPT),
                    ChatMessage::user(format!(
                        "Based on the following text, answer the question concisely. If the text or question is not in English, you may think in that language but respond in English.\n\nText: {text}\n\nQuestion: {question}"
                    )),
                ],
            )
            .await?;

        match self.translate_to_english(&raw_answer).await {
            Ok(translated) if !translated.is_empty() => Ok(translated),
            Ok(_) => Ok(raw_answer),
            Err(err) => {
                warn!("answer translation failed, keeping raw answer: {err}");
                Ok(raw_answer)
            }
        }
    }

    async fn run<const N: usize>(
        &self,
        operation: &str,
        messages: [ChatMessage; N],
    ) -> Result<String, TextError> {
        debug!(operation, "calling completion model");
        let response = self.client.complete(&messages).await.map_err(|err| {
            warn!(operation, "completion call failed: {err}");
            TextError::from(err)
        })?;

        let response = response.trim();
        if response.is_empty() {
            return Err(TextError::EmptyResponse);
        }
        Ok(response.to_string())
    }
}

/// Prefix cut to at most `max` characters, never inside a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
