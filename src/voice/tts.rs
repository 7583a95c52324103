//! Text-to-Speech module
//!
//! Sends cleaned text to an OpenAI-compatible `/audio/speech` endpoint and
//! plays the returned audio on a detached blocking task. Playback never
//! blocks the command loop; a shared stop flag cancels it cooperatively.

use reqwest::Client;
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::VoiceConfig;
use crate::error::{Result, TutorError};

/// Speech synthesis client with background playback.
pub struct Speaker {
    http: Client,
    config: VoiceConfig,
    stop: Arc<AtomicBool>,
}

impl Speaker {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether speech output is configured at all.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Synthesize `text` and start playing it in the background.
    ///
    /// Returns once the audio has been fetched; playback continues on a
    /// blocking task and is not awaited by the caller.
    pub async fn speak(&self, text: &str) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let phrase = cleanup_text(text);
        if phrase.is_empty() {
            return Ok(());
        }

        debug!("requesting speech synthesis ({} chars)", phrase.len());
        let mut builder = self
            .http
            .post(format!(
                "{}/audio/speech",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&json!({
                "model": self.config.model,
                "voice": self.config.voice,
                "input": phrase,
            }));
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Backend(format!(
                "speech API error ({status}): {body}"
            )));
        }
        let audio = response.bytes().await?.to_vec();
        debug!("received {} bytes of audio", audio.len());

        // A new utterance supersedes any playback still running.
        self.stop.store(true, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);
        tokio::task::spawn_blocking(move || {
            stop.store(false, Ordering::Relaxed);
            play_audio(audio, stop);
        });

        Ok(())
    }

    /// Raise the stop flag; the playback loop notices it within ~100ms.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn play_audio(audio: Vec<u8>, stop: Arc<AtomicBool>) {
    let (_stream, handle) = match rodio::OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            warn!("no audio output device: {}", e);
            return;
        }
    };
    let sink = match rodio::Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            warn!("failed to open audio sink: {}", e);
            return;
        }
    };
    match rodio::Decoder::new(Cursor::new(audio)) {
        Ok(source) => sink.append(source),
        Err(e) => {
            warn!("failed to decode audio: {}", e);
            return;
        }
    }

    while !sink.empty() {
        if stop.load(Ordering::Relaxed) {
            sink.stop();
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

/// Strip everything but alphanumerics and whitespace, folding line breaks
/// into sentence pauses. TTS backends choke on Markdown punctuation.
pub fn cleanup_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| if c == '\n' { '\n' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut in_break = false;
    for c in kept.chars() {
        if c == '\n' {
            if !in_break && !out.is_empty() {
                out.push_str(". ");
            }
            in_break = true;
        } else {
            in_break = false;
            out.push(c);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_strips_markup() {
        assert_eq!(cleanup_text("**bold** `code`!"), "bold code");
        assert_eq!(cleanup_text("line one\n\nline two"), "line one. line two");
        assert_eq!(cleanup_text("\n\nleading"), "leading");
        assert_eq!(cleanup_text(""), "");
    }

    #[test]
    fn disabled_speaker_is_a_noop() {
        let speaker = Speaker::new(VoiceConfig::default());
        assert!(!speaker.enabled());
        // speak() with voice disabled must not touch the network.
        tokio_test::block_on(async {
            speaker.speak("hello").await.unwrap();
        });
    }
}
