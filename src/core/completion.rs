use crate::error::{Error, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, EasyInputMessageArgs, InputItem, InputParam, OutputItem,
        OutputMessageContent, Role,
    },
};
use async_trait::async_trait;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A hosted chat model: ordered role-tagged messages in, one reply out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenAI-compatible endpoint (Groq by default) driven through `async-openai`.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: &str, api_base: &str, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if messages.is_empty() {
            return Err(Error::custom("completion request has no messages"));
        }

        let items = messages
            .iter()
            .map(|message| -> Result<InputItem> {
                let role = match message.role {
                    MessageRole::System => Role::System,
                    MessageRole::User => Role::User,
                };
                Ok(InputItem::EasyMessage(
                    EasyInputMessageArgs::default()
                        .role(role)
                        .content(message.content.as_str())
                        .build()?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let request = CreateResponseArgs::default()
            .model(self.model.as_str())
            .input(InputParam::Items(items))
            .build()?;

        debug!(model = %self.model, messages = messages.len(), "sending completion request");
        let response = self.client.responses().create(request).await?;

        let mut content = String::new();
        for output in response.output {
            if let OutputItem::Message(out) = output {
                for c in out.content {
                    match c {
                        OutputMessageContent::OutputText(text) => content.push_str(&text.text),
                        other => {
                            warn!("unexpected completion content: {other:?}");
                        }
                    }
                }
            }
        }

        Ok(content)
    }
}
