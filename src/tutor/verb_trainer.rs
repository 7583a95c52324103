//! Irregular verb trainer: store the three forms, drill them from memory

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::{Result, TutorError};
use crate::store::IrregularVerb;
use crate::tutor::router::required;
use crate::tutor::selector;
use crate::tutor::session::{AppContext, Mode, ModeKind, Outcome};
use crate::tutor::words;
use crate::ui;

pub struct VerbTrainer {
    /// Verbs already drilled in the current game pass.
    used: HashSet<String>,
}

impl VerbTrainer {
    pub fn new() -> Self {
        Self {
            used: HashSet::new(),
        }
    }

    /// Add a verb: the base form comes from the command, the other two
    /// forms from follow-up prompts.
    async fn add_verb(&self, ctx: &mut AppContext, base_form: &str) -> Result<()> {
        let base_form = base_form.trim().to_lowercase();
        if base_form.is_empty() {
            return Err(TutorError::InvalidInput("empty verb".to_string()));
        }

        let Some(past_simple) = ctx.read_line(&format!("Past simple of \"{base_form}\""))? else {
            return Ok(());
        };
        let Some(past_participle) =
            ctx.read_line(&format!("Past participle of \"{base_form}\""))?
        else {
            return Ok(());
        };
        if past_simple.is_empty() || past_participle.is_empty() {
            return Err(TutorError::InvalidInput(
                "both forms are required".to_string(),
            ));
        }

        let verb = IrregularVerb {
            base_form: base_form.clone(),
            past_simple: past_simple.trim().to_lowercase(),
            past_participle: past_participle.trim().to_lowercase(),
            ask_counter: 1,
            state: 0,
        };
        ctx.store.add_verb(&verb).await?;
        ui::success(&format!("\"{base_form}\" stored."));
        Ok(())
    }

    async fn delete_verb(&self, ctx: &mut AppContext, base_form: &str) -> Result<()> {
        let base_form = base_form.trim();
        let Some(reply) = ctx.read_line(&format!("Delete \"{base_form}\"? y/n"))? else {
            return Ok(());
        };
        if !reply.eq_ignore_ascii_case("y") {
            ui::dim("Kept.");
            return Ok(());
        }
        if ctx.store.delete_verb(base_form).await? {
            ui::success(&format!("\"{base_form}\" deleted."));
            Ok(())
        } else {
            Err(TutorError::NotFound(base_form.to_string()))
        }
    }

    /// Look up a verb's forms. The mastery policy applies: needing the
    /// reminder counts the ask and drops the state.
    async fn lookup(&self, ctx: &mut AppContext, base_form: &str) -> Result<()> {
        let base_form = base_form.trim().to_lowercase();
        let verb = ctx
            .store
            .fetch_verb(&base_form)
            .await?
            .ok_or_else(|| TutorError::NotFound(base_form.clone()))?;
        println!("{verb}");
        ctx.store.increment_verb_counter(&base_form).await?;
        ctx.store.adjust_verb_state(&base_form, -1).await?;
        ctx.last_output = Some(verb.to_string());
        ctx.speak_last().await;
        Ok(())
    }

    /// The drilling game: show a base form, ask for the other two.
    async fn play(&mut self, ctx: &mut AppContext) -> Result<Outcome> {
        self.used.clear();
        loop {
            let pool = ctx.store.all_verbs().await?;
            if pool.is_empty() {
                ui::dim("No verbs stored yet. /nv adds one.");
                return Ok(Outcome::Continue);
            }

            let verb = match selector::select(&pool, &mut self.used, false) {
                Some(verb) => verb.clone(),
                None => {
                    if self.used.is_empty() {
                        ui::dim("Every verb is mastered. Well done!");
                        return Ok(Outcome::Continue);
                    }
                    ui::dim("Pool exhausted; starting the next pass.");
                    self.used.clear();
                    match selector::select(&pool, &mut self.used, false) {
                        Some(verb) => verb.clone(),
                        None => return Ok(Outcome::Continue),
                    }
                }
            };
            ctx.previous_argument = Some(verb.base_form.clone());

            ui::header(&format!("Base form: {}", verb.base_form));
            let Some(past_simple) = ctx.read_line("Past simple (/q ends the game)")? else {
                return Ok(Outcome::Continue);
            };
            if past_simple == "/q" || past_simple == "/quit" {
                return Ok(Outcome::Continue);
            }
            let Some(past_participle) = ctx.read_line("Past participle")? else {
                return Ok(Outcome::Continue);
            };
            if past_participle == "/q" || past_participle == "/quit" {
                return Ok(Outcome::Continue);
            }

            ctx.store.increment_verb_counter(&verb.base_form).await?;
            if forms_match(&verb, &past_simple, &past_participle) {
                ui::success("Correct!");
                ctx.store.adjust_verb_state(&verb.base_form, 1).await?;
                continue;
            }

            ui::error(&format!(
                "Not quite: {} - {} - {}",
                verb.base_form, verb.past_simple, verb.past_participle
            ));
            ctx.store.adjust_verb_state(&verb.base_form, -1).await?;

            let Some(reply) = ctx.read_line("Chat about this verb? y/n")? else {
                return Ok(Outcome::Continue);
            };
            if reply == "/q" || reply == "/quit" {
                return Ok(Outcome::Continue);
            }
            if reply.eq_ignore_ascii_case("y") {
                ctx.teacher.start_verb_chat(&verb);
                ui::info("Chatting about the verb. /bye ends the chat.");
                if let Outcome::Quit = words::chat_loop(ctx, "Hello!").await? {
                    return Ok(Outcome::Quit);
                }
            }
        }
    }

    /// Chat about a stored verb, seeded with its three forms.
    async fn chat(&self, ctx: &mut AppContext, base_form: &str) -> Result<Outcome> {
        let base_form = base_form.trim().to_lowercase();
        let verb = ctx
            .store
            .fetch_verb(&base_form)
            .await?
            .ok_or_else(|| TutorError::NotFound(base_form.clone()))?;
        ctx.teacher.start_verb_chat(&verb);
        ui::info(&format!(
            "Chatting about \"{}\". /bye ends the chat, end a line with \\ to continue it.",
            verb.base_form
        ));
        words::chat_loop(ctx, "Hello!").await
    }
}

/// Both answers must match, ignoring case and surrounding whitespace.
fn forms_match(verb: &IrregularVerb, past_simple: &str, past_participle: &str) -> bool {
    past_simple.trim().eq_ignore_ascii_case(verb.past_simple.trim())
        && past_participle
            .trim()
            .eq_ignore_ascii_case(verb.past_participle.trim())
}

#[async_trait]
impl Mode for VerbTrainer {
    fn kind(&self) -> ModeKind {
        ModeKind::VerbTrainer
    }

    fn prompt(&self) -> &'static str {
        "verbs"
    }

    async fn handle_command(
        &mut self,
        ctx: &mut AppContext,
        action: &str,
        argument: Option<&str>,
    ) -> Result<Outcome> {
        match action {
            "/nv" | "/newverb" => self.add_verb(ctx, required(argument)?).await?,
            "/dv" | "/delverb" => self.delete_verb(ctx, required(argument)?).await?,
            "/iv" | "/infoverb" => {
                let base_form = required(argument)?.trim().to_lowercase();
                let verb = ctx
                    .store
                    .fetch_verb(&base_form)
                    .await?
                    .ok_or_else(|| TutorError::NotFound(base_form.clone()))?;
                println!("{verb}");
            }
            "/av" | "/allverbs" => {
                let verbs = ctx.store.all_verbs().await?;
                ui::show_verb_list(&verbs);
            }
            "/cv" | "/convverb" => return self.chat(ctx, required(argument)?).await,
            "/g" | "/game" => return self.play(ctx).await,
            _ => return Ok(Outcome::Unhandled),
        }
        Ok(Outcome::Continue)
    }

    async fn handle_free_text(&mut self, ctx: &mut AppContext, input: &str) -> Result<Outcome> {
        ctx.previous_argument = Some(input.to_string());
        self.lookup(ctx, input).await?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verb() -> IrregularVerb {
        IrregularVerb {
            base_form: "go".to_string(),
            past_simple: "went".to_string(),
            past_participle: "gone".to_string(),
            ask_counter: 1,
            state: 0,
        }
    }

    #[tokio::test]
    async fn verb_chat_needs_a_stored_verb() {
        let mut ctx = AppContext::stub().await;
        let mut mode = VerbTrainer::new();
        let err = mode
            .handle_command(&mut ctx, "/cv", Some("teleport"))
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::NotFound(_)));
    }

    #[test]
    fn both_forms_must_match() {
        let v = verb();
        assert!(forms_match(&v, "went", "gone"));
        assert!(forms_match(&v, " WENT ", "Gone"));
        assert!(!forms_match(&v, "went", "went"));
        assert!(!forms_match(&v, "goed", "gone"));
        assert!(!forms_match(&v, "", ""));
    }
}
