//! Shared word actions
//!
//! Every mode exposes the same word vocabulary commands: lookup, info,
//! manual edit, categories, listing, deletion, and the word chat. The
//! mastery policy lives here: a repeated lookup counts as forgetting.

use crate::error::{Result, TutorError};
use crate::store::CategoryFilter;
use crate::tutor::mastery;
use crate::tutor::router::{parse_command, Parsed};
use crate::tutor::session::{AppContext, Outcome};
use crate::ui;

/// Look up a word: stored words are replayed from the store, unknown ones
/// are generated and offered for saving.
///
/// With `regenerate` the texts of a stored word are rebuilt; its category,
/// counter, and state survive.
pub async fn process_word(ctx: &mut AppContext, word: &str, regenerate: bool) -> Result<()> {
    let word = word.trim();
    if word.is_empty() {
        return Err(TutorError::InvalidInput("empty word".to_string()));
    }

    match ctx.store.fetch_word(word).await? {
        Some(stored) if !regenerate => {
            // A lookup the learner needed again: count it, drop mastery.
            ui::show_word(&stored);
            ctx.store.increment_counter(word).await?;
            ctx.store.adjust_state(word, -1).await?;
            ctx.last_output = Some(stored.explanation_en);
            ctx.speak_last().await;
            return Ok(());
        }
        Some(_) => ui::dim("Regenerating the texts; progress is kept."),
        None if regenerate => return Err(TutorError::NotFound(word.to_string())),
        None => {}
    }

    generate_and_offer_save(ctx, word).await
}

async fn generate_and_offer_save(ctx: &mut AppContext, word: &str) -> Result<()> {
    let stream = ctx.teacher.explain(word).await?;
    let explanation = ctx.show_stream(stream).await?;
    let stream = ctx.teacher.translate(&explanation).await?;
    let translation = ctx.show_stream(stream).await?;
    // /say should repeat the explanation, not the translation.
    ctx.last_output = Some(explanation.clone());

    let Some(reply) = ctx.read_line("Save? y [category], anything else skips")? else {
        return Ok(());
    };
    let reply = reply.trim();
    let saves = matches!(reply.chars().next(), Some('y') | Some('Y'))
        && reply.chars().nth(1).map_or(true, |c| c == ' ');
    if saves {
        let category = reply[1..].trim();
        ctx.store
            .upsert_word(word, category, &explanation, &translation)
            .await?;
        ui::success(&format!("\"{word}\" saved."));
    } else {
        ui::dim("Not saved.");
    }
    Ok(())
}

/// Show a word's record without touching its counter or state.
pub async fn show_info(ctx: &mut AppContext, word: &str) -> Result<()> {
    let stored = ctx
        .store
        .fetch_word(word.trim())
        .await?
        .ok_or_else(|| TutorError::NotFound(word.to_string()))?;
    println!("{stored}");
    Ok(())
}

/// Manually set a word's category and state. `/` at either prompt keeps
/// the current value.
pub async fn manual_update(ctx: &mut AppContext, word: &str) -> Result<()> {
    let word = word.trim();
    let stored = ctx
        .store
        .fetch_word(word)
        .await?
        .ok_or_else(|| TutorError::NotFound(word.to_string()))?;
    println!("{stored}");

    let Some(category) = ctx.read_line("New category ('/' keeps the current one)")? else {
        return Ok(());
    };
    if !category.starts_with('/') {
        ctx.store.set_category(word, &category).await?;
    }

    let Some(state) = ctx.read_line("New state, 0-8 or a level name ('/' keeps it)")? else {
        return Ok(());
    };
    if !state.starts_with('/') {
        let level = mastery::parse_level(&state)
            .ok_or_else(|| TutorError::InvalidInput(format!("unknown state \"{state}\"")))?;
        ctx.store.set_state(word, level).await?;
    }

    if let Some(updated) = ctx.store.fetch_word(word).await? {
        ui::success(&updated.to_string());
    }
    Ok(())
}

/// Category overview with average mastery per category.
pub async fn show_categories(ctx: &mut AppContext) -> Result<()> {
    let counts = ctx.store.category_counts().await?;
    let mut rows = Vec::with_capacity(counts.len());
    let mut total = 0;
    for (name, count) in counts {
        let avg = ctx.store.category_average(&name).await?;
        rows.push((name, mastery::label(avg.round() as u8), count));
        total += count;
    }
    ui::show_categories(&rows, total);
    Ok(())
}

/// List words for a category argument (empty means uncategorized,
/// "all" means everything).
pub async fn list_words(ctx: &mut AppContext, category: Option<&str>) -> Result<()> {
    let filter = CategoryFilter::parse(category);
    let words = ctx.store.fetch_words(&filter).await?;
    ui::show_word_list(&words);
    Ok(())
}

/// Delete a word after a confirmation prompt.
pub async fn delete_word(ctx: &mut AppContext, word: &str) -> Result<()> {
    let word = word.trim();
    let Some(reply) = ctx.read_line(&format!("Delete \"{word}\"? y/n"))? else {
        return Ok(());
    };
    if !reply.eq_ignore_ascii_case("y") {
        ui::dim("Kept.");
        return Ok(());
    }
    if ctx.store.delete_word(word).await? {
        ui::success(&format!("\"{word}\" deleted."));
    } else {
        return Err(TutorError::NotFound(word.to_string()));
    }
    Ok(())
}

/// Free conversation about a word. Ends with `/bye`; `/q` quits the mode.
pub async fn chat_about_word(ctx: &mut AppContext, word: &str) -> Result<Outcome> {
    ctx.teacher.start_word_chat(word.trim());
    ui::info(&format!(
        "Chatting about \"{}\". /bye ends the chat, end a line with \\ to continue it.",
        word.trim()
    ));
    chat_loop(ctx, "Hello!").await
}

/// Drive a conversation whose history has already been seeded.
///
/// The `opening` is the first user turn; the learner takes over from there.
pub async fn chat_loop(ctx: &mut AppContext, opening: &str) -> Result<Outcome> {
    let mut next = opening.to_string();
    loop {
        let stream = ctx.teacher.converse(&next).await?;
        let reply = ctx.show_stream(stream).await?;
        ctx.teacher.note_reply(&reply);

        loop {
            let Some(line) = ctx.read_multiline("chat")? else {
                return Ok(Outcome::Continue);
            };
            if line.is_empty() {
                continue;
            }
            match parse_command(&line, ctx.previous_argument.as_deref()) {
                Parsed::Command { action, argument } => match action.as_str() {
                    "/bye" => return Ok(Outcome::Continue),
                    "/q" | "/quit" => return Ok(Outcome::Quit),
                    "/say" => ctx.say(argument.as_deref()).await?,
                    "/stop" => ctx.speaker.stop(),
                    _ => ui::dim("In a chat: /bye ends it, /q quits."),
                },
                Parsed::Text(text) => {
                    next = text;
                    break;
                }
            }
        }
    }
}
