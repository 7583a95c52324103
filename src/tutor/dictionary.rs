//! Dictionary mode: type a word, get an explanation and a translation

use async_trait::async_trait;

use crate::error::Result;
use crate::tutor::router::required;
use crate::tutor::session::{AppContext, Mode, ModeKind, Outcome};
use crate::tutor::words;

pub struct Dictionary;

#[async_trait]
impl Mode for Dictionary {
    fn kind(&self) -> ModeKind {
        ModeKind::Dictionary
    }

    fn prompt(&self) -> &'static str {
        "word"
    }

    async fn handle_command(
        &mut self,
        ctx: &mut AppContext,
        action: &str,
        argument: Option<&str>,
    ) -> Result<Outcome> {
        match action {
            "/u" | "/upd" => {
                words::process_word(ctx, required(argument)?, true).await?;
                Ok(Outcome::Continue)
            }
            _ => Ok(Outcome::Unhandled),
        }
    }

    async fn handle_free_text(&mut self, ctx: &mut AppContext, input: &str) -> Result<Outcome> {
        ctx.previous_argument = Some(input.to_string());
        words::process_word(ctx, input, false).await?;
        Ok(Outcome::Continue)
    }
}
