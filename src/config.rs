//! Configuration management
//!
//! TOML configuration under the platform config directory, created with
//! defaults on first run.

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generation backend settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Speech synthesis settings
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Store settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Generation backend settings.
///
/// `backend` selects the provider shape: "local" (Ollama-style) or "hosted"
/// (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,
    #[serde(default = "default_hosted_base_url")]
    pub hosted_base_url: String,
    /// API key for the hosted backend; unused by the local one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model for explanations, riddles, grading, and chat.
    #[serde(default = "default_main_model")]
    pub main_model: String,
    /// Model for translations.
    #[serde(default = "default_translator_model")]
    pub translator_model: String,
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_local_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_hosted_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_main_model() -> String {
    "llama3".to_string()
}

fn default_translator_model() -> String {
    "llama3".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_base_url: default_local_base_url(),
            hosted_base_url: default_hosted_base_url(),
            api_key: None,
            main_model: default_main_model(),
            translator_model: default_translator_model(),
        }
    }
}

/// Speech synthesis settings (OpenAI-compatible `/audio/speech` endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_voice_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_voice_model")]
    pub model: String,
    #[serde(default = "default_voice_name")]
    pub voice: String,
}

fn default_voice_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_voice_model() -> String {
    "tts-1".to_string()
}

fn default_voice_name() -> String {
    "alloy".to_string()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_voice_base_url(),
            api_key: None,
            model: default_voice_model(),
            voice: default_voice_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Store path; defaults under the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, creating it with defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Resolved store path.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        Ok(data_dir()?.join("words.db"))
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "word-tutor", "word-tutor")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "word-tutor", "word-tutor")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Generation backend:");
    println!("  backend:          {}", config.llm.backend);
    println!("  local base URL:   {}", config.llm.local_base_url);
    println!("  hosted base URL:  {}", config.llm.hosted_base_url);
    println!(
        "  API key:          {}",
        if config.llm.api_key.is_some() { "configured" } else { "not set" }
    );
    println!("  main model:       {}", config.llm.main_model);
    println!("  translator model: {}", config.llm.translator_model);

    println!("\nVoice:");
    println!("  enabled:  {}", config.voice.enabled);
    println!("  base URL: {}", config.voice.base_url);
    println!("  model:    {} ({})", config.voice.model, config.voice.voice);

    println!("\nDatabase: {}", config.database_path()?.display());
    println!("\nConfig file: {}", config_path()?.display());

    Ok(())
}

/// Select the generation backend ("local" or "hosted").
pub fn set_backend(backend: &str) -> Result<()> {
    if backend != "local" && backend != "hosted" {
        anyhow::bail!("Unknown backend '{}'. Use 'local' or 'hosted'.", backend);
    }
    let mut config = Config::load()?;
    config.llm.backend = backend.to_string();
    config.save()?;
    println!("Generation backend set to '{}'.", backend);
    Ok(())
}

/// Store the hosted backend API key.
pub fn set_api_key(key: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.llm.api_key = Some(key.to_string());
    config.save()?;
    println!("API key stored.");
    Ok(())
}

/// Set the main or translator model.
pub fn set_model(role: &str, model: &str) -> Result<()> {
    let mut config = Config::load()?;
    match role {
        "main" => config.llm.main_model = model.to_string(),
        "translator" => config.llm.translator_model = model.to_string(),
        _ => anyhow::bail!("Unknown model role '{}'. Use 'main' or 'translator'.", role),
    }
    config.save()?;
    println!("Model for '{}' set to: {}", role, model);
    Ok(())
}

/// Enable or disable speech output.
pub fn set_voice_enabled(enabled: bool) -> Result<()> {
    let mut config = Config::load()?;
    config.voice.enabled = enabled;
    config.save()?;
    println!("Voice {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
