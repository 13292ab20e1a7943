use super::{Action, AppState, View};
use crate::catalog::Catalog;
use crate::chat::{Role, FALLBACK_REPLY};
use crate::error::Error;
use crate::filter::{FilterMode, Selection, SAVED_LABEL};
use crate::glossary::Segment;
use crate::preferences::Preferences;

fn state() -> AppState {
    AppState::new(
        Catalog::embedded().unwrap(),
        Some(include_str!("fixtures/extracto.md").to_string()),
        Preferences::default(),
        100,
        25_000,
    )
    .reduce(Action::Resize {
        width: 40,
        height: 5,
    })
}

fn apply(state: AppState, actions: impl IntoIterator<Item = Action>) -> AppState {
    actions.into_iter().fold(state, AppState::reduce)
}

fn active(state: &AppState) -> &str {
    &state.navigator.state().active_section_id
}

#[test]
fn test_toggle_saved_twice_restores_preferences() {
    let app = state();
    let before = app.preferences().clone();

    let app = app.reduce(Action::ToggleSaved("41".to_string()));
    assert!(app.preferences().is_saved("41"));
    assert!(app.message.is_some());

    let app = app.reduce(Action::ToggleSaved("41".to_string()));
    assert_eq!(app.preferences(), &before);
}

#[test]
fn test_saved_chip_lists_saved_articles() {
    let app = apply(
        state(),
        [
            Action::ToggleSaved("41".to_string()),
            Action::Select(Selection::Saved),
        ],
    );
    let ids: Vec<&str> = app.visible_articles().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["41"]);
    assert_eq!(app.chips()[app.active_chip()], SAVED_LABEL);
}

#[test]
fn test_unsaving_under_saved_chip_clamps_cursor() {
    let app = apply(
        state(),
        [
            Action::ToggleSaved("41".to_string()),
            Action::Select(Selection::Saved),
            Action::ToggleSavedAtCursor,
        ],
    );
    assert!(app.visible_articles().is_empty());
    assert_eq!(app.cursor, 0);
    assert!(app.preferences().saved_ids.is_empty());
}

#[test]
fn test_cycle_selection_wraps_through_saved() {
    let app = state().reduce(Action::CycleSelection(false));
    assert_eq!(app.filter.selection, Selection::Saved);

    let app = app.reduce(Action::CycleSelection(true));
    assert_eq!(app.filter.selection, Selection::All);

    let app = app.reduce(Action::CycleSelection(true));
    assert_eq!(
        app.filter.selection,
        Selection::Named("Derechos Civiles".to_string())
    );
}

#[test]
fn test_filter_mode_switch_resets_selection() {
    let app = apply(
        state(),
        [
            Action::CycleSelection(true),
            Action::SetFilterMode(FilterMode::Situation),
        ],
    );
    assert_eq!(app.filter.selection, Selection::All);
    assert_eq!(app.chips()[0], "Todas");
}

#[test]
fn test_search_typing_filters_articles() {
    let app = apply(
        state(),
        std::iter::once(Action::BeginSearch).chain("despido".chars().map(Action::SearchInput)),
    );
    assert!(app.searching);
    let ids: Vec<&str> = app.visible_articles().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["14bis"]);

    let app = app.reduce(Action::ClearSearch);
    assert!(!app.searching);
    assert_eq!(app.visible_articles().len(), app.catalog.articles.len());
}

#[test]
fn test_glossary_is_compiled_with_the_state() {
    let app = state();
    let glossary = app.glossary.as_ref().unwrap();
    assert!(glossary
        .segments("acción de amparo")
        .iter()
        .any(|s| matches!(s, Segment::Term { text: "amparo", .. })));
}

#[test]
fn test_expand_toggles_article_under_cursor() {
    let app = state().reduce(Action::ToggleExpanded);
    let first = app.catalog.articles[0].id.clone();
    assert_eq!(app.expanded.as_deref(), Some(first.as_str()));

    let app = app.reduce(Action::ToggleExpanded);
    assert_eq!(app.expanded, None);
}

#[test]
fn test_chat_submit_then_failure_settles_once() {
    let mut app = apply(
        state(),
        "hola".chars().map(Action::ChatInput).chain([Action::ChatSubmit]),
    );
    assert!(app.conversation.is_loading);
    assert!(app.chat_input.is_empty());
    let payload = app.take_pending_request().unwrap();
    assert_eq!(payload[0].role, Role::System);
    assert!(payload[0].content.contains("ARTÍCULO 1.-"));
    assert!(app.take_pending_request().is_none());

    let app = app.reduce(Action::ChatSettled(Err(Error::Chat {
        status: Some(500),
        reason: "HTTP 500".to_string(),
    })));
    assert!(!app.conversation.is_loading);
    assert_eq!(app.conversation.messages.len(), 3);
    assert_eq!(
        app.conversation.messages.last().map(|m| m.content.as_str()),
        Some(FALLBACK_REPLY)
    );
}

#[test]
fn test_chat_submit_while_loading_keeps_input() {
    let app = apply(
        state(),
        [
            Action::ChatInput('a'),
            Action::ChatSubmit,
            Action::ChatInput('b'),
            Action::ChatSubmit,
        ],
    );
    assert_eq!(app.chat_input, "b");
    assert_eq!(app.conversation.messages.len(), 2);
    assert!(app.message.is_some());
}

#[test]
fn test_chat_page_stays_within_history() {
    let long = "palabra ".repeat(200);
    let app = apply(
        state(),
        [
            Action::ChatInput('a'),
            Action::ChatSubmit,
            Action::ChatSettled(Ok(long)),
        ],
    );
    assert_eq!(app.chat_scroll, 0);

    let app = app.reduce(Action::ChatPage(false));
    assert_eq!(app.chat_scroll, 0);

    let app = app.reduce(Action::ChatPage(true));
    assert_eq!(app.chat_scroll, 5);

    let app = apply(app, (0..100).map(|_| Action::ChatPage(true)));
    let top = app.chat_scroll;
    assert!(top > 5);
    assert_eq!(app.reduce(Action::ChatPage(true)).chat_scroll, top);
}

#[test]
fn test_new_question_returns_chat_to_newest() {
    let app = apply(
        state(),
        [
            Action::ChatInput('a'),
            Action::ChatSubmit,
            Action::ChatSettled(Ok("uno\ndos\ntres\ncuatro\ncinco\nseis".to_string())),
            Action::ChatPage(true),
        ],
    );
    assert!(app.chat_scroll > 0);

    let app = apply(app, [Action::ChatInput('b'), Action::ChatSubmit]);
    assert_eq!(app.chat_scroll, 0);
}

#[test]
fn test_share_shows_link_for_article_under_cursor() {
    let app = state().reduce(Action::ShareAtCursor);
    let message = app.message.unwrap();
    assert!(message.starts_with("Compartir: https://wa.me/?text="));

    let app = apply(
        state(),
        [Action::Select(Selection::Saved), Action::ShareAtCursor],
    );
    assert!(app.message.is_none());
}

#[test]
fn test_stray_reply_is_ignored() {
    let app = state().reduce(Action::ChatSettled(Ok("tarde".to_string())));
    assert_eq!(app.conversation.messages.len(), 1);
}

#[test]
fn test_suggested_question_opens_chat() {
    let mut app = state().reduce(Action::AskSuggested(0));
    assert_eq!(app.view, View::Chat);
    assert!(app.conversation.is_loading);
    assert!(app.take_pending_request().is_some());

    let app = state().reduce(Action::AskSuggested(99));
    assert!(!app.conversation.is_loading);
}

#[test]
fn test_reader_jump_and_neighbours() {
    let app = state().reduce(Action::JumpTo("art-2".to_string()));
    assert_eq!(active(&app), "art-2");

    let app = app.reduce(Action::NextSection);
    assert_eq!(active(&app), "art-3");

    let app = app.reduce(Action::PreviousSection);
    assert_eq!(active(&app), "art-2");
}

#[test]
fn test_neighbours_walk_a_document_shorter_than_the_screen() {
    let mut app = state().reduce(Action::Resize {
        width: 80,
        height: 200,
    });
    let ids: Vec<String> = app
        .navigator
        .sections()
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(active(&app), ids[0]);

    for id in &ids[1..] {
        app = app.reduce(Action::NextSection);
        assert_eq!(active(&app), id.as_str());
        assert_eq!(
            app.navigator.active_section().map(|s| s.id.as_str()),
            Some(id.as_str())
        );
    }

    let app = app.reduce(Action::NextSection);
    assert_eq!(active(&app), ids[ids.len() - 1]);

    let app = app.reduce(Action::PreviousSection);
    assert_eq!(active(&app), ids[ids.len() - 2]);
}

#[test]
fn test_font_change_keeps_active_section() {
    let app = apply(
        state(),
        [Action::JumpTo("art-2".to_string()), Action::AdjustFont(2)],
    );
    assert_eq!(app.navigator.state().font_size, 18);
    assert_eq!(active(&app), "art-2");
}

#[test]
fn test_toc_cursor_jump_closes_toc() {
    let app = apply(
        state(),
        [
            Action::ToggleToc,
            Action::TocCursor(4),
            Action::JumpToTocCursor,
        ],
    );
    assert!(!app.navigator.state().toc_open);
    assert_eq!(active(&app), "art-2");
}

#[test]
fn test_scroll_to_bottom_completes_progress() {
    let app = state().reduce(Action::ScrollToEdge(true));
    assert!((app.navigator.state().reading_progress - 100.0).abs() < f64::EPSILON);

    let app = app.reduce(Action::ScrollToEdge(false));
    assert!(app.navigator.state().reading_progress.abs() < f64::EPSILON);
}

#[test]
fn test_missing_document_is_inert() {
    let app = AppState::new(
        Catalog::embedded().unwrap(),
        None,
        Preferences::default(),
        100,
        25_000,
    );
    assert!(!app.has_document());
    let app = apply(app, [Action::NextSection, Action::Page(true), Action::ToggleColumns]);
    assert!(active(&app).is_empty());
}

#[test]
fn test_views_cycle_and_dark_mode_toggles() {
    let app = apply(state(), [Action::NextView, Action::ToggleDarkMode]);
    assert_eq!(app.view, View::Reader);
    assert!(app.preferences().dark_mode);
    assert_eq!(app.reduce(Action::NextView).view, View::Chat);
}
