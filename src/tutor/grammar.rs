//! Grammar tutor: stored themes that seed open-ended conversations

use async_trait::async_trait;

use crate::error::{Result, TutorError};
use crate::store::GrammarTheme;
use crate::tutor::router::required;
use crate::tutor::session::{AppContext, Mode, ModeKind, Outcome};
use crate::tutor::words;
use crate::ui;

pub struct Grammar;

impl Grammar {
    async fn add_theme(&self, ctx: &mut AppContext, argument: Option<&str>) -> Result<()> {
        let name = match argument {
            Some(name) => name.trim().to_string(),
            None => {
                let Some(name) = ctx.read_line("Theme name")? else {
                    return Ok(());
                };
                name
            }
        };
        if name.is_empty() {
            return Err(TutorError::InvalidInput("empty theme name".to_string()));
        }
        let Some(description) = ctx.read_line("Short description")? else {
            return Ok(());
        };
        if description.is_empty() {
            return Err(TutorError::InvalidInput(
                "a description is required".to_string(),
            ));
        }

        ctx.store
            .add_theme(&GrammarTheme { name: name.clone(), description })
            .await?;
        ui::success(&format!("\"{name}\" stored."));
        Ok(())
    }

    async fn delete_theme(&self, ctx: &mut AppContext, name: &str) -> Result<()> {
        let name = name.trim();
        let Some(reply) = ctx.read_line(&format!("Delete \"{name}\"? y/n"))? else {
            return Ok(());
        };
        if !reply.eq_ignore_ascii_case("y") {
            ui::dim("Kept.");
            return Ok(());
        }
        if ctx.store.delete_theme(name).await? {
            ui::success(&format!("\"{name}\" deleted."));
            Ok(())
        } else {
            Err(TutorError::NotFound(name.to_string()))
        }
    }

    /// Open a conversation seeded with the stored theme description.
    async fn discuss(&self, ctx: &mut AppContext, name: &str) -> Result<Outcome> {
        let name = name.trim();
        let theme = ctx
            .store
            .fetch_theme(name)
            .await?
            .ok_or_else(|| TutorError::NotFound(name.to_string()))?;
        ctx.teacher.start_grammar_chat(&theme);
        ui::info(&format!(
            "Discussing \"{}\". /bye ends the chat, end a line with \\ to continue it.",
            theme.name
        ));
        words::chat_loop(ctx, "Hello! Please introduce this topic.").await
    }
}

#[async_trait]
impl Mode for Grammar {
    fn kind(&self) -> ModeKind {
        ModeKind::Grammar
    }

    fn prompt(&self) -> &'static str {
        "grammar"
    }

    async fn handle_command(
        &mut self,
        ctx: &mut AppContext,
        action: &str,
        argument: Option<&str>,
    ) -> Result<Outcome> {
        match action {
            "/nt" | "/newtheme" => self.add_theme(ctx, argument).await?,
            "/dt" | "/deltheme" => self.delete_theme(ctx, required(argument)?).await?,
            "/at" | "/allthemes" => {
                let themes = ctx.store.all_themes().await?;
                ui::show_theme_list(&themes);
            }
            _ => return Ok(Outcome::Unhandled),
        }
        Ok(Outcome::Continue)
    }

    async fn handle_free_text(&mut self, ctx: &mut AppContext, input: &str) -> Result<Outcome> {
        ctx.previous_argument = Some(input.to_string());
        self.discuss(ctx, input).await
    }
}
