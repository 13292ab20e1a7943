//! Grounded question answering over the constitution text.
//!
//! A [`Conversation`] owns the message history and the loading flag. Sending happens in two
//! halves so the terminal stays responsive: [`Conversation::begin`] records the question and
//! hands back the request payload, and [`Conversation::settle`] records whatever came back. The
//! network itself sits behind [`ChatTransport`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// First assistant message of every conversation.
pub const GREETING: &str =
    "¡Hola! Soy tu asistente constitucional. Preguntame cualquier duda sobre la Constitución Argentina.";
/// Reply recorded when the model answers with nothing.
pub const EMPTY_REPLY: &str = "Lo siento, no pude generar una respuesta.";
/// Reply recorded when the request fails.
pub const FALLBACK_REPLY: &str =
    "Lo siento, ocurrió un error (posible límite de API). Intenta más tarde.";
/// Characters of the document included in the system prompt.
pub const DEFAULT_CONTEXT_CHARS: usize = 25_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Author of a chat message.
pub enum Role {
    /// Grounding instructions.
    System,
    /// The person asking.
    User,
    /// The model.
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One role-tagged message.
pub struct ChatMessage {
    /// Who wrote it.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    /// Build a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[must_use]
/// System prompt grounding the model in the first `max_chars` characters of `context`.
pub fn system_prompt(context: Option<&str>, max_chars: usize) -> String {
    let truncated: String = context.unwrap_or_default().chars().take(max_chars).collect();
    format!(
        "Eres un asistente experto en la Constitución Nacional Argentina.\n\
         Responde brevemente basándote en:\n{truncated}..."
    )
}

/// Something that can turn a message list into a reply.
pub trait ChatTransport {
    /// Send the ordered messages and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chat`] for non-success responses and transport failures.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Conversation history plus the in-flight flag.
pub struct Conversation {
    /// Messages shown to the user, oldest first. Never contains the system prompt.
    pub messages: Vec<ChatMessage>,
    /// A request has been sent and not yet settled.
    pub is_loading: bool,
    context_chars: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CHARS)
    }
}

impl Conversation {
    #[must_use]
    /// Fresh conversation holding only the greeting.
    pub fn new(context_chars: usize) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
            is_loading: false,
            context_chars,
        }
    }

    #[must_use]
    /// Whether the user has not asked anything yet.
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1 && !self.is_loading
    }

    /// Record a question and build the request payload.
    ///
    /// Returns `None` without touching the history when `input` is blank or a request is
    /// already in flight; overlapping requests are refused rather than raced.
    pub fn begin(&mut self, input: &str, context: Option<&str>) -> Option<Vec<ChatMessage>> {
        if input.trim().is_empty() || self.is_loading {
            return None;
        }

        self.messages.push(ChatMessage::new(Role::User, input));
        self.is_loading = true;

        let mut payload = Vec::with_capacity(self.messages.len() + 1);
        payload.push(ChatMessage::new(
            Role::System,
            system_prompt(context, self.context_chars),
        ));
        payload.extend(self.messages.iter().cloned());
        Some(payload)
    }

    /// Record the outcome of the request started by [`Conversation::begin`].
    ///
    /// Always appends exactly one assistant message and clears the loading flag.
    pub fn settle(&mut self, result: Result<String>) {
        let content = match result {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::new(Role::Assistant, content));
        self.is_loading = false;
    }

    /// Ask synchronously: begin, send, settle.
    ///
    /// Returns whether a request was made.
    pub fn submit(
        &mut self,
        input: &str,
        context: Option<&str>,
        transport: &(impl ChatTransport + ?Sized),
    ) -> bool {
        let Some(payload) = self.begin(input, context) else {
            return false;
        };
        self.settle(transport.complete(&payload));
        true
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct RelayResponse {
    content: Option<String>,
}

#[derive(Serialize)]
struct CompletionsRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn post_json(url: &str, body: &str, bearer: Option<&str>, timeout: Duration) -> Result<String> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let mut request = agent
        .post(url)
        .set("Content-Type", "application/json")
        .set("User-Agent", concat!("carta/", env!("CARGO_PKG_VERSION")));
    if let Some(key) = bearer {
        request = request.set("Authorization", &format!("Bearer {key}"));
    }

    match request.send_string(body) {
        Ok(response) => Ok(response.into_string()?),
        Err(ureq::Error::Status(code, response)) => Err(Error::Chat {
            status: Some(code),
            reason: format!("HTTP {code} {}", response.status_text()),
        }),
        Err(ureq::Error::Transport(e)) => Err(Error::chat_transport(e)),
    }
}

/// Posts `{ "messages": [...] }` to a relay that holds the provider credentials.
pub struct RelayTransport {
    url: String,
    timeout: Duration,
}

impl RelayTransport {
    #[must_use]
    /// Relay at `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl ChatTransport for RelayTransport {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::info!(url = %self.url, messages = messages.len(), "sending chat to relay");
        let body = serde_json::to_string(&RelayRequest { messages })?;
        let raw = post_json(&self.url, &body, None, self.timeout)?;
        let response: RelayResponse = serde_json::from_str(&raw)?;
        Ok(response.content.unwrap_or_default())
    }
}

/// Calls an OpenAI-compatible chat completions endpoint directly.
pub struct CompletionsTransport {
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionsTransport {
    #[must_use]
    /// Endpoint at `url` using `model`; `api_key` is sent as a bearer token when present.
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            api_key,
            model: model.into(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout,
        }
    }

    #[must_use]
    /// Override sampling temperature and reply length.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

impl ChatTransport for CompletionsTransport {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if self.api_key.is_none() {
            tracing::warn!("no API key configured for chat completions");
        }
        tracing::info!(model = %self.model, messages = messages.len(), "sending chat completion");
        let body = serde_json::to_string(&CompletionsRequest {
            messages,
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })?;
        let raw = post_json(&self.url, &body, self.api_key.as_deref(), self.timeout)?;
        let response: CompletionsResponse = serde_json::from_str(&raw)?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "tests/chat.rs"]
mod tests;
