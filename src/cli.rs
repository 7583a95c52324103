//! CLI interface for word-tutor

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::tutor::dictionary::Dictionary;
use crate::tutor::grammar::Grammar;
use crate::tutor::router;
use crate::tutor::session::{AppContext, Mode};
use crate::tutor::verb_trainer::VerbTrainer;
use crate::tutor::word_trainer::WordTrainer;

#[derive(Parser)]
#[command(name = "word-tutor")]
#[command(about = "Personal vocabulary and grammar tutor with spaced drilling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up words and phrases (default when no command given)
    Dictionary,
    /// Train stored words with riddle-based guessing
    Trainer,
    /// Store and drill irregular verbs
    Verbs,
    /// Store grammar themes and discuss them
    Grammar,
    /// Configure the tutor
    Config {
        /// Select the generation backend: local or hosted
        #[arg(long)]
        set_backend: Option<String>,
        /// Set the hosted backend API key
        #[arg(long)]
        set_api_key: Option<String>,
        /// Set model for a role (usage: --set-model role model_id)
        #[arg(long, value_names = &["role", "model"])]
        set_model: Option<Vec<String>>,
        /// Enable or disable speech output: on or off
        #[arg(long)]
        voice: Option<String>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Dictionary) => {
            run_session(&mut Dictionary).await?;
        }
        Some(Commands::Trainer) => {
            run_session(&mut WordTrainer::new()).await?;
        }
        Some(Commands::Verbs) => {
            run_session(&mut VerbTrainer::new()).await?;
        }
        Some(Commands::Grammar) => {
            run_session(&mut Grammar).await?;
        }
        Some(Commands::Config { set_backend, set_api_key, set_model, voice, show }) => {
            if let Some(backend) = set_backend {
                crate::config::set_backend(&backend)?;
            } else if let Some(key) = set_api_key {
                crate::config::set_api_key(&key)?;
            } else if let Some(args) = set_model {
                if args.len() >= 2 {
                    crate::config::set_model(&args[0], &args[1])?;
                } else {
                    eprintln!("Usage: --set-model <role> <model_id>");
                    println!("Available roles: main, translator");
                }
            } else if let Some(voice) = voice {
                match voice.as_str() {
                    "on" => crate::config::set_voice_enabled(true)?,
                    "off" => crate::config::set_voice_enabled(false)?,
                    other => eprintln!("Unknown voice setting '{}'. Use 'on' or 'off'.", other),
                }
            } else if show {
                crate::config::show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --set-backend <local|hosted>  Select the generation backend");
                println!("  --set-api-key <key>           Set the hosted backend API key");
                println!("  --set-model <role> <id>       Set model for a role (main, translator)");
                println!("  --voice <on|off>              Enable or disable speech output");
                println!("  --show                        Display current configuration");
            }
        }
    }

    Ok(())
}

async fn run_session(mode: &mut dyn Mode) -> Result<()> {
    let config = Config::load()?;
    let mut ctx = AppContext::new(&config).await?;
    router::run_mode(&mut ctx, mode).await
}
