//! Integration tests for the item store and the mastery lifecycle.

use word_tutor::store::{CategoryFilter, GrammarTheme, IrregularVerb, WordStore};

#[tokio::test]
async fn word_lifecycle_from_new_to_mastered_and_back() {
    let store = WordStore::open_in_memory().await.unwrap();
    store
        .upsert_word("serendipity", "abstract", "a happy accident", "счастливая случайность")
        .await
        .unwrap();

    let word = store.fetch_word("serendipity").await.unwrap().unwrap();
    assert_eq!(word.ask_counter, 1);
    assert_eq!(word.state, 0);

    // A correct training answer moves mastery up one step.
    store.adjust_state("serendipity", 1).await.unwrap();
    assert_eq!(store.fetch_word("serendipity").await.unwrap().unwrap().state, 1);

    // A repeated lookup counts the ask and drops mastery back.
    store.increment_counter("serendipity").await.unwrap();
    store.adjust_state("serendipity", -1).await.unwrap();
    let word = store.fetch_word("serendipity").await.unwrap().unwrap();
    assert_eq!(word.ask_counter, 2);
    assert_eq!(word.state, 0);

    // Level 0 cannot drop below 0.
    store.adjust_state("serendipity", -1).await.unwrap();
    assert_eq!(store.fetch_word("serendipity").await.unwrap().unwrap().state, 0);
}

#[tokio::test]
async fn regenerating_keeps_category_counter_and_state() {
    let store = WordStore::open_in_memory().await.unwrap();
    store
        .upsert_word("run", "verbs", "to move fast", "бежать")
        .await
        .unwrap();
    store.increment_counter("run").await.unwrap();
    store.adjust_state("run", 4).await.unwrap();

    store
        .upsert_word("run", "", "to move quickly on foot", "быстро бежать")
        .await
        .unwrap();

    let word = store.fetch_word("run").await.unwrap().unwrap();
    assert_eq!(word.category, "verbs", "empty category must not erase the stored one");
    assert_eq!(word.ask_counter, 2);
    assert_eq!(word.state, 4);
    assert_eq!(word.explanation_en, "to move quickly on foot");
}

#[tokio::test]
async fn category_filters_and_averages() {
    let store = WordStore::open_in_memory().await.unwrap();
    store.upsert_word("stray", "", "x", "y").await.unwrap();
    store.upsert_word("cat", "animals", "x", "y").await.unwrap();
    store.upsert_word("dog", "animals", "x", "y").await.unwrap();
    store.adjust_state("cat", 3).await.unwrap();
    store.adjust_state("dog", 5).await.unwrap();

    // None / empty -> uncategorized only; "all" -> everything; name -> exact.
    assert_eq!(store.fetch_words(&CategoryFilter::parse(None)).await.unwrap().len(), 1);
    assert_eq!(store.fetch_words(&CategoryFilter::parse(Some("all"))).await.unwrap().len(), 3);
    assert_eq!(
        store.fetch_words(&CategoryFilter::parse(Some("animals"))).await.unwrap().len(),
        2
    );
    assert!(store
        .fetch_words(&CategoryFilter::parse(Some("plants")))
        .await
        .unwrap()
        .is_empty());

    let avg = store.category_average("animals").await.unwrap();
    assert!((avg - 4.0).abs() < f64::EPSILON);

    let counts = store.category_counts().await.unwrap();
    assert_eq!(counts.len(), 2);
    assert!(counts.contains(&(String::new(), 1)));
    assert!(counts.contains(&("animals".to_string(), 2)));
}

#[tokio::test]
async fn manual_state_edits_are_clamped() {
    let store = WordStore::open_in_memory().await.unwrap();
    store.upsert_word("w", "", "x", "y").await.unwrap();

    store.set_state("w", 7).await.unwrap();
    assert_eq!(store.fetch_word("w").await.unwrap().unwrap().state, 7);

    store.set_state("w", 200).await.unwrap();
    assert_eq!(store.fetch_word("w").await.unwrap().unwrap().state, 8);

    store.set_category("w", "idioms").await.unwrap();
    assert_eq!(store.fetch_word("w").await.unwrap().unwrap().category, "idioms");
}

#[tokio::test]
async fn missing_keys_surface_as_not_found() {
    let store = WordStore::open_in_memory().await.unwrap();

    assert!(store.fetch_word("ghost").await.unwrap().is_none());
    assert!(!store.delete_word("ghost").await.unwrap());
    assert!(store.increment_counter("ghost").await.is_err());
    assert!(store.set_category("ghost", "x").await.is_err());
    assert!(store.set_state("ghost", 1).await.is_err());
    assert!(store.adjust_state("ghost", 1).await.is_err());
}

#[tokio::test]
async fn verb_drilling_updates_state_independently_of_words() {
    let store = WordStore::open_in_memory().await.unwrap();
    store
        .add_verb(&IrregularVerb {
            base_form: "swim".to_string(),
            past_simple: "swam".to_string(),
            past_participle: "swum".to_string(),
            ask_counter: 1,
            state: 0,
        })
        .await
        .unwrap();

    store.increment_verb_counter("swim").await.unwrap();
    store.adjust_verb_state("swim", 1).await.unwrap();

    let verb = store.fetch_verb("swim").await.unwrap().unwrap();
    assert_eq!(verb.ask_counter, 2);
    assert_eq!(verb.state, 1);

    // The words table is untouched.
    assert!(store.fetch_word("swim").await.unwrap().is_none());

    assert!(store.delete_verb("swim").await.unwrap());
    assert!(!store.delete_verb("swim").await.unwrap());
}

#[tokio::test]
async fn file_backed_store_persists_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("words.db");

    {
        let store = WordStore::open(&path).await.unwrap();
        store.upsert_word("echo", "", "a reflected sound", "эхо").await.unwrap();
        store.adjust_state("echo", 2).await.unwrap();
    }

    let store = WordStore::open(&path).await.unwrap();
    let word = store.fetch_word("echo").await.unwrap().unwrap();
    assert_eq!(word.explanation_en, "a reflected sound");
    assert_eq!(word.state, 2);
}

#[tokio::test]
async fn themes_replace_on_reinsert() {
    let store = WordStore::open_in_memory().await.unwrap();
    let theme = GrammarTheme {
        name: "Conditionals".to_string(),
        description: "zero through third".to_string(),
    };
    store.add_theme(&theme).await.unwrap();
    store
        .add_theme(&GrammarTheme {
            description: "zero, first, second, third, mixed".to_string(),
            ..theme.clone()
        })
        .await
        .unwrap();

    let themes = store.all_themes().await.unwrap();
    assert_eq!(themes.len(), 1);
    assert_eq!(themes[0].description, "zero, first, second, third, mixed");

    let fetched = store.fetch_theme("Conditionals").await.unwrap().unwrap();
    assert_eq!(fetched.name, "Conditionals");
    assert!(store.fetch_theme("Articles").await.unwrap().is_none());
}
