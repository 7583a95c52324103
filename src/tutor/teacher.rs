//! Task-shaped wrappers around the generation backend
//!
//! The `Teacher` owns the chat history for conversation-style dialogs and
//! shapes each tutoring task (explain, translate, riddle, stall, grade) into
//! a system+prompt pair. Temperatures follow the task: deterministic grading,
//! creative riddles.

use crate::config::LlmConfig;
use crate::error::Result;
use crate::store::{GrammarTheme, IrregularVerb};
use crate::tutor::llm::{ChatMessage, GenClient, Provider, TextStream};
use crate::tutor::prompts;

const EXPLAIN_TEMPERATURE: f32 = 0.5;
const TRANSLATE_TEMPERATURE: f32 = 0.3;
const RIDDLE_TEMPERATURE: f32 = 0.7;
const CHAT_TEMPERATURE: f32 = 0.7;
const GRADE_TEMPERATURE: f32 = 0.0;

pub struct Teacher {
    client: GenClient,
    main_model: String,
    translator_model: String,
    history: Vec<ChatMessage>,
}

impl Teacher {
    pub fn new(cfg: &LlmConfig) -> Self {
        let provider = if cfg.backend == "hosted" {
            Provider::Hosted {
                base_url: cfg.hosted_base_url.trim_end_matches('/').to_string(),
                api_key: cfg.api_key.clone().unwrap_or_default(),
            }
        } else {
            Provider::Local {
                base_url: cfg.local_base_url.trim_end_matches('/').to_string(),
            }
        };
        Self {
            client: GenClient::new(provider),
            main_model: cfg.main_model.clone(),
            translator_model: cfg.translator_model.clone(),
            history: Vec::new(),
        }
    }

    // ============ One-shot tasks ============

    /// Stream an explanation of a word or phrase.
    pub async fn explain(&self, word: &str) -> Result<TextStream> {
        let prompt = format!("Explain \"{word}\".");
        self.client
            .generate_stream(&self.main_model, prompts::EXPLAIN, &prompt, EXPLAIN_TEMPERATURE)
            .await
    }

    /// Stream a Russian translation of the given text.
    pub async fn translate(&self, text: &str) -> Result<TextStream> {
        let prompt = format!("The text to translate:\n{text}");
        self.client
            .generate_stream(
                &self.translator_model,
                prompts::TRANSLATE,
                &prompt,
                TRANSLATE_TEMPERATURE,
            )
            .await
    }

    /// Stream a riddle-style clue that never names the word.
    pub async fn riddle(&self, word: &str) -> Result<TextStream> {
        let prompt = format!("The word is \"{word}\".");
        self.client
            .generate_stream(&self.main_model, prompts::RIDDLE, &prompt, RIDDLE_TEMPERATURE)
            .await
    }

    /// Stream a stall message after the learner declined to start,
    /// `attempt` times in a row so far.
    pub async fn stall(&self, attempt: u32) -> Result<TextStream> {
        let system = prompts::STALL.replace("{N}", &attempt.to_string());
        self.client
            .generate_stream(&self.main_model, &system, "I'm not ready", RIDDLE_TEMPERATURE)
            .await
    }

    /// Grade a guess against the hidden word. Non-streaming and
    /// deterministic; the verdict line starts with "Correct" or "Incorrect".
    pub async fn grade(&self, word: &str, answer: &str) -> Result<String> {
        let system = prompts::GRADER.replace("{WORD}", word);
        let prompt = format!("The answer is \"{answer}\".");
        self.client
            .generate(&self.main_model, &system, &prompt, GRADE_TEMPERATURE)
            .await
    }

    // ============ Conversation dialogs ============

    /// Reset the history for a free chat about a word.
    pub fn start_word_chat(&mut self, word: &str) {
        self.history = vec![ChatMessage::system(
            prompts::CONVERSATION.replace("{word}", word),
        )];
    }

    /// Reset the history for a clarification dialog inside the guessing
    /// game, seeded with the riddle the learner is puzzling over.
    pub fn start_riddle_dialog(&mut self, word: &str, riddle: &str) {
        self.history = vec![
            ChatMessage::system(prompts::RIDDLE_QA.replace("{word}", word)),
            ChatMessage::user("Hello!"),
            ChatMessage::assistant(riddle),
        ];
    }

    /// Reset the history for a chat about an irregular verb.
    pub fn start_verb_chat(&mut self, verb: &IrregularVerb) {
        let system = prompts::VERB_CHAT
            .replace("{base}", &verb.base_form)
            .replace("{past}", &verb.past_simple)
            .replace("{participle}", &verb.past_participle);
        self.history = vec![ChatMessage::system(system)];
    }

    /// Reset the history for a grammar-theme conversation.
    pub fn start_grammar_chat(&mut self, theme: &GrammarTheme) {
        let system = prompts::GRAMMAR_CHAT
            .replace("{topic}", &theme.name)
            .replace("{description}", &theme.description);
        self.history = vec![ChatMessage::system(system)];
    }

    /// Send the next user turn and stream the reply. The caller records the
    /// completed reply with [`note_reply`](Self::note_reply) once the stream
    /// has been fully consumed.
    pub async fn converse(&mut self, prompt: &str) -> Result<TextStream> {
        self.history.push(ChatMessage::user(prompt));
        self.client
            .chat_stream(&self.main_model, &self.history, CHAT_TEMPERATURE)
            .await
    }

    /// Record the assistant's completed reply in the history.
    pub fn note_reply(&mut self, content: &str) {
        self.history.push(ChatMessage::assistant(content));
    }
}
