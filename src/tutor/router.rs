//! Slash-command parsing and the session loop
//!
//! Input is either a `/command [argument]` pair or free text the active mode
//! interprets. A command with no argument inherits the previous one, so
//! `/n apple` followed by `/say` speaks about the same word.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TutorError};
use crate::tutor::session::{AppContext, Mode, ModeKind, Outcome};
use crate::tutor::words;
use crate::ui;

static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(/[a-zA-Z]+)\s*([a-zA-Z0-9 '_-]*)").unwrap()
});

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command {
        action: String,
        argument: Option<String>,
    },
    Text(String),
}

/// Split a line into command + argument, or pass it through as free text.
///
/// An argument-less command falls back to `previous`, the argument of the
/// last command that carried one.
pub fn parse_command(input: &str, previous: Option<&str>) -> Parsed {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Parsed::Text(trimmed.to_string());
    }
    let Some(caps) = COMMAND_RE.captures(trimmed) else {
        return Parsed::Text(trimmed.to_string());
    };
    let action = caps[1].to_lowercase();
    let argument = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| previous.map(str::to_string));
    Parsed::Command { action, argument }
}

/// Drive one mode until the learner quits or ends input.
///
/// Every error from a handler is recoverable here: it becomes a message and
/// the loop returns to the prompt.
pub async fn run_mode(ctx: &mut AppContext, mode: &mut dyn Mode) -> anyhow::Result<()> {
    ui::show_help(mode.kind());
    loop {
        let Some(line) = ctx.read_line(mode.prompt())? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let outcome = match parse_command(&line, ctx.previous_argument.as_deref()) {
            Parsed::Command { action, argument } => {
                if let Some(arg) = &argument {
                    ctx.previous_argument = Some(arg.clone());
                }
                match mode.handle_command(ctx, &action, argument.as_deref()).await {
                    Ok(Outcome::Unhandled) => {
                        handle_shared(ctx, mode.kind(), &action, argument.as_deref()).await
                    }
                    other => other,
                }
            }
            Parsed::Text(text) => mode.handle_free_text(ctx, &text).await,
        };

        match outcome {
            Ok(Outcome::Quit) => break,
            Ok(_) => {}
            Err(e) => ui::error(&e.to_string()),
        }
    }
    ui::dim("Bye!");
    Ok(())
}

/// Commands every mode understands.
async fn handle_shared(
    ctx: &mut AppContext,
    kind: ModeKind,
    action: &str,
    argument: Option<&str>,
) -> Result<Outcome> {
    match action {
        "/q" | "/quit" => return Ok(Outcome::Quit),
        "/h" | "/help" => ui::show_help(kind),
        "/n" | "/new" => words::process_word(ctx, required(argument)?, false).await?,
        "/i" | "/info" => words::show_info(ctx, required(argument)?).await?,
        "/m" | "/man" => words::manual_update(ctx, required(argument)?).await?,
        "/ct" | "/cat" => words::show_categories(ctx).await?,
        "/a" | "/all" => words::list_words(ctx, argument).await?,
        "/d" | "/del" => words::delete_word(ctx, required(argument)?).await?,
        "/c" | "/conv" => return words::chat_about_word(ctx, required(argument)?).await,
        "/say" => ctx.say(argument).await?,
        "/voice" => set_voice(ctx, argument)?,
        "/stop" => ctx.speaker.stop(),
        "/bye" => ui::dim("Not in a chat right now."),
        other => ui::error(&format!("Unknown command: {other}. /h for help.")),
    }
    Ok(Outcome::Continue)
}

fn set_voice(ctx: &mut AppContext, argument: Option<&str>) -> Result<()> {
    match argument {
        Some("on") => {
            if !ctx.speaker.enabled() {
                ui::error("Voice is disabled in the configuration.");
            } else {
                ctx.auto_speak = true;
                ui::info("Auto-speak on.");
            }
        }
        Some("off") => {
            ctx.auto_speak = false;
            ui::info("Auto-speak off.");
        }
        _ => {
            return Err(TutorError::InvalidInput(
                "use /voice on or /voice off".to_string(),
            ))
        }
    }
    Ok(())
}

/// Reject an argument-less command that needs one.
pub fn required(argument: Option<&str>) -> Result<&str> {
    argument.ok_or_else(|| TutorError::InvalidInput("this command needs an argument".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn help_is_dispatched_from_the_shared_table() {
        let mut ctx = AppContext::stub().await;
        for kind in [ModeKind::Dictionary, ModeKind::VerbTrainer] {
            for action in ["/h", "/help"] {
                let outcome = handle_shared(&mut ctx, kind, action, None).await.unwrap();
                assert_eq!(outcome, Outcome::Continue);
            }
        }
    }

    #[tokio::test]
    async fn quit_is_dispatched_from_the_shared_table() {
        let mut ctx = AppContext::stub().await;
        let outcome = handle_shared(&mut ctx, ModeKind::Dictionary, "/q", None)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Quit);
    }

    #[test]
    fn splits_action_and_argument() {
        assert_eq!(
            parse_command("/new apple pie", None),
            Parsed::Command {
                action: "/new".to_string(),
                argument: Some("apple pie".to_string()),
            }
        );
    }

    #[test]
    fn free_text_passes_through() {
        assert_eq!(
            parse_command("  hello there  ", Some("apple")),
            Parsed::Text("hello there".to_string())
        );
    }

    #[test]
    fn missing_argument_inherits_previous() {
        assert_eq!(
            parse_command("/say", Some("apple")),
            Parsed::Command {
                action: "/say".to_string(),
                argument: Some("apple".to_string()),
            }
        );
        assert_eq!(
            parse_command("/say", None),
            Parsed::Command {
                action: "/say".to_string(),
                argument: None,
            }
        );
    }

    #[test]
    fn explicit_argument_beats_previous() {
        assert_eq!(
            parse_command("/del pear", Some("apple")),
            Parsed::Command {
                action: "/del".to_string(),
                argument: Some("pear".to_string()),
            }
        );
    }

    #[test]
    fn action_is_case_insensitive() {
        assert_eq!(
            parse_command("/NEW Apple", None),
            Parsed::Command {
                action: "/new".to_string(),
                argument: Some("Apple".to_string()),
            }
        );
    }

    #[test]
    fn argument_charset_stops_at_punctuation() {
        assert_eq!(
            parse_command("/new it's on-line, ok?", None),
            Parsed::Command {
                action: "/new".to_string(),
                argument: Some("it's on-line".to_string()),
            }
        );
    }
}
