//! Gemini REST client: one-shot generation, image analysis and streaming chat.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::prompts::CHAT_SYSTEM_INSTRUCTION;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);
const STREAM_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    NotConfigured,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response was blocked: {0}")]
    Blocked(String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GeminiError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotConfigured => "The AI assistant is not configured. Add a Gemini API key.",
            Self::InvalidImage(_) => "That image could not be read. Please choose another.",
            Self::Blocked(_) => "The AI declined to answer that request.",
            Self::Network(_) => "Network error. Check your connection.",
            _ => "Failed to get response from AI.",
        }
    }
}

/// Base64 image payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Read an image file, taking the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, GeminiError> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            GeminiError::InvalidImage(format!("unsupported image type: {}", path.display()))
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| GeminiError::InvalidImage(format!("{}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(GeminiError::InvalidImage(format!("{} is empty", path.display())));
        }
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// Parse a `data:<mime>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, GeminiError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| GeminiError::InvalidImage("not a data URL".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| GeminiError::InvalidImage("data URL has no payload".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| GeminiError::InvalidImage("data URL is not base64".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| GeminiError::InvalidImage(e.to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineImage>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: InlineImage) -> Self {
        Self {
            text: None,
            inline_data: Some(image),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".into()),
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".into()),
            parts: vec![Part::text(text)],
        }
    }

    fn instruction(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    pub fn text(&self) -> String {
        self.parts.iter().filter_map(|p| p.text.as_deref()).collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    message: String,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or why there is none.
    fn into_text(self) -> Result<String, GeminiError> {
        if let Some(err) = self.error {
            return Err(GeminiError::Api {
                status: err.code.unwrap_or(0),
                message: err.message,
            });
        }
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(reason));
        }
        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.text())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn endpoint(&self, method: &str) -> Result<Url, GeminiError> {
        Ok(Url::parse(&format!(
            "{}/v1beta/models/{}:{}",
            self.base_url, self.model, method
        ))?)
    }

    async fn send(
        &self,
        mut url: Url,
        request: &GenerateContentRequest<'_>,
        timeout: Duration,
    ) -> Result<reqwest::Response, GeminiError> {
        if !self.is_configured() {
            return Err(GeminiError::NotConfigured);
        }
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        Err(GeminiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn generate(
        &self,
        contents: &[Content],
        system_instruction: Option<&str>,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: system_instruction.map(Content::instruction),
        };
        let response = self
            .send(self.endpoint("generateContent")?, &request, GENERATE_TIMEOUT)
            .await?;
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = body.into_text()?;
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Single text prompt.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let contents = [Content::user(vec![Part::text(prompt)])];
        self.generate(&contents, None).await.map_err(|e| {
            tracing::error!("Error generating content: {}", e);
            e
        })
    }

    /// Text prompt followed by one inline image.
    #[instrument(skip(self, prompt, image), fields(model = %self.model, mime = %image.mime_type))]
    pub async fn generate_content_with_image(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> Result<String, GeminiError> {
        let contents = [Content::user(vec![
            Part::text(prompt),
            Part::image(image.clone()),
        ])];
        self.generate(&contents, None).await.map_err(|e| {
            tracing::error!("Error generating content with image: {}", e);
            e
        })
    }

    /// New chat with the farming-assistant system instruction.
    pub fn start_chat(&self) -> ChatSession {
        ChatSession {
            client: self.clone(),
            system_instruction: CHAT_SYSTEM_INSTRUCTION.to_string(),
            history: Vec::new(),
        }
    }
}

/// Multi-turn conversation. Turns are recorded once a reply completes.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: GeminiClient,
    system_instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    fn contents_with(&self, message: &str) -> (Content, Vec<Content>) {
        let user = Content::user(vec![Part::text(message)]);
        let mut contents = self.history.clone();
        contents.push(user.clone());
        (user, contents)
    }

    /// Send a message and wait for the whole reply.
    pub async fn send_message(&mut self, message: &str) -> Result<String, GeminiError> {
        let (user, contents) = self.contents_with(message);
        let reply = self
            .client
            .generate(&contents, Some(&self.system_instruction))
            .await?;
        self.history.push(user);
        self.history.push(Content::model(reply.clone()));
        Ok(reply)
    }

    /// Send a message and stream the reply as server-sent events.
    #[instrument(skip(self, message), fields(history = self.history.len()))]
    pub async fn send_message_stream(
        &mut self,
        message: &str,
    ) -> Result<ChatStream<'_>, GeminiError> {
        let (user, contents) = self.contents_with(message);
        let request = GenerateContentRequest {
            contents: &contents,
            system_instruction: Some(Content::instruction(&self.system_instruction)),
        };
        let mut url = self.client.endpoint("streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");
        let response = self.client.send(url, &request, STREAM_TIMEOUT).await?;

        Ok(ChatStream {
            session: self,
            response,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            reply: String::new(),
            user_turn: Some(user),
            exhausted: false,
            finished: false,
        })
    }
}

/// Reply chunks of one streamed chat turn.
pub struct ChatStream<'a> {
    session: &'a mut ChatSession,
    response: reqwest::Response,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    reply: String,
    user_turn: Option<Content>,
    exhausted: bool,
    finished: bool,
}

impl ChatStream<'_> {
    /// Next text chunk; `None` once the reply is complete or failed.
    pub async fn next_chunk(&mut self) -> Option<Result<String, GeminiError>> {
        loop {
            if let Some(text) = self.pending.pop_front() {
                self.reply.push_str(&text);
                return Some(Ok(text));
            }
            if self.finished {
                return None;
            }
            if self.exhausted {
                self.finish();
                return None;
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => {
                    self.buffer.extend_from_slice(&bytes);
                    if let Err(e) = self.drain_events() {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
                Ok(None) => {
                    self.buffer.push(b'\n');
                    if let Err(e) = self.drain_events() {
                        self.finished = true;
                        return Some(Err(e));
                    }
                    self.exhausted = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Drain the stream, returning the full reply.
    pub async fn collect_reply(mut self) -> Result<String, GeminiError> {
        while let Some(chunk) = self.next_chunk().await {
            chunk?;
        }
        Ok(self.reply)
    }

    /// Text received so far.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    fn drain_events(&mut self) -> Result<(), GeminiError> {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(data) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }

            let event: GenerateContentResponse =
                serde_json::from_str(data).map_err(|e| GeminiError::Parse(e.to_string()))?;
            let text = event.into_text()?;
            if !text.is_empty() {
                self.pending.push_back(text);
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(user) = self.user_turn.take() {
            self.session.history.push(user);
            self.session.history.push(Content::model(self.reply.clone()));
        }
        tracing::debug!(reply_len = self.reply.len(), "Chat reply complete");
    }
}
