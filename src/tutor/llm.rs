//! Generation backend client
//!
//! Two interchangeable provider shapes: a local Ollama-style service
//! (`/api/generate`, `/api/chat`, NDJSON streaming) and a hosted
//! OpenAI-compatible chat API (`/chat/completions`, SSE streaming). The rest
//! of the tutor only ever sends a system+user pair (or a chat history) and
//! reads text back.

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, TutorError};

/// One turn in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Configuration for a generation provider.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama-style local completion/chat service.
    Local { base_url: String },
    /// Hosted OpenAI-compatible chat-completions API.
    Hosted { base_url: String, api_key: String },
}

/// Generation backend client.
#[derive(Clone)]
pub struct GenClient {
    http: Arc<Client>,
    provider: Provider,
}

impl GenClient {
    pub fn new(provider: Provider) -> Self {
        Self {
            http: Arc::new(Client::new()),
            provider,
        }
    }

    /// One-shot completion: system instruction plus a user prompt.
    pub async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        match &self.provider {
            Provider::Local { base_url } => {
                let body = json!({
                    "model": model,
                    "system": system,
                    "prompt": prompt,
                    "options": { "temperature": temperature },
                    "stream": false,
                });
                let raw = self.post_json(&format!("{base_url}/api/generate"), &body, None).await?;
                Ok(raw
                    .get("response")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string())
            }
            Provider::Hosted { .. } => {
                let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
                self.chat(model, &messages, temperature).await
            }
        }
    }

    /// Streaming variant of [`generate`](Self::generate).
    pub async fn generate_stream(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<TextStream> {
        match &self.provider {
            Provider::Local { base_url } => {
                let body = json!({
                    "model": model,
                    "system": system,
                    "prompt": prompt,
                    "options": { "temperature": temperature },
                    "stream": true,
                });
                let response = self.send(&format!("{base_url}/api/generate"), &body, None).await?;
                Ok(TextStream::new(response, WireFormat::NdjsonGenerate))
            }
            Provider::Hosted { .. } => {
                let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
                self.chat_stream(model, &messages, temperature).await
            }
        }
    }

    /// Multi-turn chat completion over a full message history.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String> {
        match &self.provider {
            Provider::Local { base_url } => {
                let body = json!({
                    "model": model,
                    "messages": messages,
                    "options": { "temperature": temperature },
                    "stream": false,
                });
                let raw = self.post_json(&format!("{base_url}/api/chat"), &body, None).await?;
                Ok(raw
                    .pointer("/message/content")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string())
            }
            Provider::Hosted { base_url, api_key } => {
                let body = json!({
                    "model": model,
                    "messages": messages,
                    "temperature": temperature,
                    "stream": false,
                });
                let raw = self
                    .post_json(&format!("{base_url}/chat/completions"), &body, Some(api_key))
                    .await?;
                Ok(extract_chat_content(&raw))
            }
        }
    }

    /// Streaming variant of [`chat`](Self::chat).
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<TextStream> {
        match &self.provider {
            Provider::Local { base_url } => {
                let body = json!({
                    "model": model,
                    "messages": messages,
                    "options": { "temperature": temperature },
                    "stream": true,
                });
                let response = self.send(&format!("{base_url}/api/chat"), &body, None).await?;
                Ok(TextStream::new(response, WireFormat::NdjsonChat))
            }
            Provider::Hosted { base_url, api_key } => {
                let body = json!({
                    "model": model,
                    "messages": messages,
                    "temperature": temperature,
                    "stream": true,
                });
                let response = self
                    .send(&format!("{base_url}/chat/completions"), &body, Some(api_key))
                    .await?;
                Ok(TextStream::new(response, WireFormat::Sse))
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<reqwest::Response> {
        debug!("generation request to {}", url);
        let mut builder = self.http.post(url).json(body);
        if let Some(key) = api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Backend(format!(
                "generation API error ({status}): {body}"
            )));
        }
        Ok(response)
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<serde_json::Value> {
        let response = self.send(url, body, api_key).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| TutorError::Backend(format!("malformed backend response: {e}")))
    }
}

/// Pull `choices[0].message.content` out of an OpenAI-style response,
/// tolerating both plain-string and array-of-parts content.
fn extract_chat_content(raw: &serde_json::Value) -> String {
    let content = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.pointer("/message/content"));

    match content {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| {
                if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                    part.get("text").and_then(|t| t.as_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy)]
enum WireFormat {
    /// `data: {json}` events terminated by `data: [DONE]` (hosted).
    Sse,
    /// One JSON object per line with a `response` field (local generate).
    NdjsonGenerate,
    /// One JSON object per line with `message.content` (local chat).
    NdjsonChat,
}

#[derive(Debug, Deserialize)]
struct SseChunk {
    #[serde(default)]
    choices: Vec<SseChoice>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    #[serde(default)]
    delta: SseDelta,
}

#[derive(Debug, Default, Deserialize)]
struct SseDelta {
    #[serde(default)]
    content: Option<String>,
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>;

/// A pull-based sequence of generated text fragments.
///
/// Consumed synchronously by the session loop: no two streams are ever read
/// concurrently. An error mid-stream aborts the current operation; nothing
/// is retried.
pub struct TextStream {
    inner: ByteStream,
    buffer: String,
    format: WireFormat,
    done: bool,
}

impl TextStream {
    fn new(response: reqwest::Response, format: WireFormat) -> Self {
        Self {
            inner: Box::pin(response.bytes_stream()),
            buffer: String::new(),
            format,
            done: false,
        }
    }

    /// Next text fragment, or `None` once the stream has completed.
    pub async fn next_chunk(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.drain_buffer()? {
                return Ok(Some(token));
            }
            if self.done {
                return Ok(None);
            }
            match self.inner.next().await {
                Some(Ok(bytes)) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Some(Err(e)) => {
                    return Err(TutorError::Backend(format!("stream read failed: {e}")))
                }
                None => self.done = true,
            }
        }
    }

    /// Concatenate the remaining fragments.
    pub async fn collect(mut self) -> Result<String> {
        let mut full = String::new();
        while let Some(chunk) = self.next_chunk().await? {
            full.push_str(&chunk);
        }
        Ok(full)
    }

    /// Parse one complete event out of the buffer. `Ok(None)` means more
    /// bytes are needed (or the stream signalled completion).
    fn drain_buffer(&mut self) -> Result<Option<String>> {
        match self.format {
            WireFormat::Sse => self.drain_sse(),
            WireFormat::NdjsonGenerate | WireFormat::NdjsonChat => self.drain_ndjson(),
        }
    }

    fn drain_sse(&mut self) -> Result<Option<String>> {
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);

            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };
            if data == "[DONE]" {
                self.done = true;
                return Ok(None);
            }
            let chunk: SseChunk = serde_json::from_str(data)
                .map_err(|e| TutorError::Backend(format!("malformed stream event: {e}")))?;
            if let Some(content) = chunk.choices.first().and_then(|c| c.delta.content.clone()) {
                if !content.is_empty() {
                    return Ok(Some(content));
                }
            }
        }
        Ok(None)
    }

    fn drain_ndjson(&mut self) -> Result<Option<String>> {
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(&line)
                .map_err(|e| TutorError::Backend(format!("malformed stream event: {e}")))?;
            if value.get("done").and_then(|d| d.as_bool()) == Some(true) {
                self.done = true;
            }
            let token = match self.format {
                WireFormat::NdjsonGenerate => value.get("response").and_then(|v| v.as_str()),
                _ => value.pointer("/message/content").and_then(|v| v.as_str()),
            };
            if let Some(token) = token {
                if !token.is_empty() {
                    return Ok(Some(token.to_string()));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_roles() {
        assert_eq!(ChatMessage::system("x").role, "system");
        assert_eq!(ChatMessage::user("x").role, "user");
        assert_eq!(ChatMessage::assistant("x").role, "assistant");
    }

    #[test]
    fn extracts_plain_string_content() {
        let raw = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
        });
        assert_eq!(extract_chat_content(&raw), "hello");
    }

    #[test]
    fn extracts_content_parts() {
        let raw = serde_json::json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "hel" },
                { "type": "text", "text": "lo" }
            ]}}]
        });
        assert_eq!(extract_chat_content(&raw), "hello");
    }

    #[test]
    fn missing_content_yields_empty() {
        let raw = serde_json::json!({ "choices": [] });
        assert_eq!(extract_chat_content(&raw), "");
    }
}
