//! Session context and the Mode capability
//!
//! Each mode (dictionary, word trainer, verb trainer, grammar tutor) is a
//! `Mode` implementation the command router dispatches into. Shared state —
//! store, teacher, speaker, input editor — lives in `AppContext` and is
//! injected rather than held globally.

use async_trait::async_trait;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::store::WordStore;
use crate::tutor::llm::TextStream;
use crate::tutor::teacher::Teacher;
use crate::ui;
use crate::voice::Speaker;

/// The four session modes selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Dictionary,
    WordTrainer,
    VerbTrainer,
    Grammar,
}

/// Result of handling one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading commands.
    Continue,
    /// End the session.
    Quit,
    /// Not a mode-specific action; fall back to the shared table.
    Unhandled,
}

/// Shared session state, injected into every mode.
pub struct AppContext {
    pub store: WordStore,
    pub teacher: Teacher,
    pub speaker: Speaker,
    editor: DefaultEditor,
    /// Last generated or displayed text, the target of `/say` and
    /// auto-speak.
    pub last_output: Option<String>,
    pub auto_speak: bool,
    /// Last resolved command argument; a bare `/info` repeats on it.
    pub previous_argument: Option<String>,
}

impl AppContext {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = WordStore::open(config.database_path()?).await?;
        let teacher = Teacher::new(&config.llm);
        let speaker = Speaker::new(config.voice.clone());
        let editor = DefaultEditor::new()?;
        Ok(Self {
            store,
            teacher,
            speaker,
            editor,
            last_output: None,
            auto_speak: false,
            previous_argument: None,
        })
    }

    /// Context over an in-memory store and default backends, for tests.
    #[cfg(test)]
    pub(crate) async fn stub() -> Self {
        Self {
            store: WordStore::open_in_memory().await.expect("in-memory store"),
            teacher: Teacher::new(&crate::config::LlmConfig::default()),
            speaker: Speaker::new(crate::config::VoiceConfig::default()),
            editor: DefaultEditor::new().expect("line editor"),
            last_output: None,
            auto_speak: false,
            previous_argument: None,
        }
    }

    /// Read one line. `None` means the user ended input (Ctrl-C/Ctrl-D).
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let colored = format!("\x1b[32m{prompt}\x1b[0m > ");
        match self.editor.readline(&colored) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(&line);
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read possibly-continued input: a trailing `\` keeps reading lines.
    pub fn read_multiline(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            let Some(line) = self.read_line(prompt)? else {
                return Ok(None);
            };
            if let Some(stripped) = line.strip_suffix('\\') {
                lines.push(stripped.trim_end().to_string());
            } else {
                lines.push(line);
                break;
            }
        }
        Ok(Some(lines.join(" ")))
    }

    /// Drain a generation stream to the screen, fragment by fragment.
    ///
    /// Records the full text as the last output and auto-speaks it when
    /// enabled. Returns the concatenated text.
    pub async fn show_stream(&mut self, mut stream: TextStream) -> Result<String> {
        ui::stream_begin();
        let mut full = String::new();
        loop {
            match stream.next_chunk().await {
                Ok(Some(chunk)) => {
                    ui::stream_chunk(&chunk);
                    full.push_str(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    ui::stream_end();
                    return Err(e);
                }
            }
        }
        ui::stream_end();
        self.last_output = Some(full.clone());
        self.speak_last().await;
        Ok(full)
    }

    /// Speak the last output when auto-speak is on. Playback problems are
    /// logged, not surfaced: speech is an aside, not the operation.
    pub async fn speak_last(&self) {
        if !self.auto_speak {
            return;
        }
        if let Some(text) = &self.last_output {
            if let Err(e) = self.speaker.speak(text).await {
                warn!("speech synthesis failed: {}", e);
            }
        }
    }

    /// `/say`: speak the argument, or the last output when absent.
    pub async fn say(&mut self, text: Option<&str>) -> Result<()> {
        let phrase = text
            .map(str::to_string)
            .or_else(|| self.last_output.clone());
        match phrase {
            Some(phrase) => self.speaker.speak(&phrase).await,
            None => {
                ui::dim("Nothing to say yet.");
                Ok(())
            }
        }
    }
}

/// A session mode: a table of mode-specific actions plus a free-text
/// handler. Anything it leaves `Unhandled` falls through to the shared
/// command table in the router.
#[async_trait]
pub trait Mode: Send {
    fn kind(&self) -> ModeKind;

    /// Prompt label shown at the main loop.
    fn prompt(&self) -> &'static str;

    async fn handle_command(
        &mut self,
        ctx: &mut AppContext,
        action: &str,
        argument: Option<&str>,
    ) -> Result<Outcome>;

    /// Non-command input: a word to look up, a category to train, a theme
    /// to discuss — whatever the mode drills.
    async fn handle_free_text(&mut self, ctx: &mut AppContext, input: &str) -> Result<Outcome>;
}
