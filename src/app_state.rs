//! The core state machine behind the reader.
//!
//! A TUI needs a single source of truth that can be interrogated as it draws and replaced as the
//! user acts. [`AppState`] is that value and [`AppState::reduce`] is its only transition: the
//! event loop turns key presses into [`Action`]s, folds them in, and persists preferences when
//! the fold changed them. Network work never happens in here; a chat submission leaves a
//! pending request for the loop to dispatch and the reply comes back as another action.

use crate::catalog::{Article, Catalog};
use crate::chat::{ChatMessage, Conversation};
use crate::error::Result;
use crate::filter::{filter_articles, Filter, FilterMode, Selection, SAVED_LABEL};
use crate::glossary::Glossary;
use crate::navigator::{ReadingNavigator, Viewport};
use crate::preferences::Preferences;
use crate::reader::{terminal_navigator_config, text_width, wrap, ReaderLayout};
use crate::sectionizer::sectionize;
use crate::share::share_url;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Determines which screen renders and how input is interpreted.
pub enum View {
    #[default]
    /// Curated key articles with search and filter chips.
    Articles,
    /// Full constitution text with navigation aids.
    Reader,
    /// Conversation with the assistant.
    Chat,
}

impl View {
    #[must_use]
    /// Tab order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Articles => Self::Reader,
            Self::Reader => Self::Chat,
            Self::Chat => Self::Articles,
        }
    }

    #[must_use]
    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Articles => "Artículos clave",
            Self::Reader => "Texto completo",
            Self::Chat => "Asistente",
        }
    }
}

#[derive(Debug)]
/// Everything the user (or the chat worker) can do to the state.
pub enum Action {
    /// Switch to a screen.
    Show(View),
    /// Switch to the next screen in tab order.
    NextView,
    /// Start typing into the search box.
    BeginSearch,
    /// Stop typing into the search box, keeping the term.
    EndSearch,
    /// Empty the search box.
    ClearSearch,
    /// Append a character to the search box.
    SearchInput(char),
    /// Remove the last search character.
    SearchBackspace,
    /// Choose the label set for the filter chips.
    SetFilterMode(FilterMode),
    /// Move the active chip forward or backward.
    CycleSelection(bool),
    /// Pick a chip directly.
    Select(Selection),
    /// Move the article cursor by this many entries.
    MoveCursor(isize),
    /// Expand or collapse the article under the cursor.
    ToggleExpanded,
    /// Save or unsave the article under the cursor.
    ToggleSavedAtCursor,
    /// Save or unsave an article by id.
    ToggleSaved(String),
    /// Show a share link for the article under the cursor.
    ShareAtCursor,
    /// Switch between light and dark palettes.
    ToggleDarkMode,
    /// Append a character to the chat input.
    ChatInput(char),
    /// Remove the last chat input character.
    ChatBackspace,
    /// Send the chat input.
    ChatSubmit,
    /// Send one of the suggested questions.
    AskSuggested(usize),
    /// Scroll the chat history by a page; `true` moves back towards older messages.
    ChatPage(bool),
    /// The in-flight chat request finished.
    ChatSettled(Result<String>),
    /// Change the reader font size.
    AdjustFont(i32),
    /// Toggle two-column reading.
    ToggleColumns,
    /// Toggle the narrow focus layout.
    ToggleFocus,
    /// Open or close the table of contents.
    ToggleToc,
    /// Move the table of contents cursor.
    TocCursor(isize),
    /// Jump to the entry under the table of contents cursor.
    JumpToTocCursor,
    /// Jump to a section by id.
    JumpTo(String),
    /// Jump to the section after the active one.
    NextSection,
    /// Jump to the section before the active one.
    PreviousSection,
    /// Scroll the reader by rows.
    Scroll(isize),
    /// Scroll the reader by a page.
    Page(bool),
    /// Scroll the reader to the top or bottom.
    ScrollToEdge(bool),
    /// The reader text area changed size.
    Resize {
        /// Columns available.
        width: usize,
        /// Rows available.
        height: usize,
    },
}

/// Application state, replaced wholesale on every [`Action`].
pub struct AppState {
    /// Curated articles, glossary and labels.
    pub catalog: Catalog,
    /// Matcher over the catalog glossary; `None` if it failed to compile.
    pub glossary: Option<Glossary>,
    /// Search and chip state of the articles screen.
    pub filter: Filter,
    /// Persisted preferences.
    pub preferences: Preferences,
    /// Active screen.
    pub view: View,
    /// Keys go to the search box.
    pub searching: bool,
    /// Cursor in the filtered article list.
    pub cursor: usize,
    /// Id of the expanded article, if any.
    pub expanded: Option<String>,
    /// Full text navigation.
    pub navigator: ReadingNavigator,
    /// Full text laid out for the current reader area.
    pub layout: ReaderLayout,
    /// Cursor in the table of contents.
    pub toc_cursor: usize,
    /// Assistant conversation.
    pub conversation: Conversation,
    /// Chat input being typed.
    pub chat_input: String,
    /// Rows scrolled back from the newest chat message.
    pub chat_scroll: usize,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    document: Option<String>,
    pending_request: Option<Vec<ChatMessage>>,
    wrap_width: usize,
    area: (usize, usize),
}

impl AppState {
    #[must_use]
    /// Build the initial state around a catalog and an optional constitution text.
    pub fn new(
        catalog: Catalog,
        document: Option<String>,
        preferences: Preferences,
        wrap_width: usize,
        context_chars: usize,
    ) -> Self {
        let sections = sectionize(document.as_deref());
        let navigator = ReadingNavigator::new(sections, terminal_navigator_config());
        let area = (wrap_width, 24);
        let layout = ReaderLayout::build(navigator.sections(), wrap_width, area.1, 1);
        let glossary = match Glossary::new(catalog.glossary.clone()) {
            Ok(glossary) => Some(glossary),
            Err(e) => {
                tracing::warn!(error = %e, "glossary highlighting disabled");
                None
            }
        };

        let mut state = Self {
            catalog,
            glossary,
            filter: Filter::default(),
            preferences,
            view: View::default(),
            searching: false,
            cursor: 0,
            expanded: None,
            navigator,
            layout,
            toc_cursor: 0,
            conversation: Conversation::new(context_chars),
            chat_input: String::new(),
            chat_scroll: 0,
            message: None,
            document,
            pending_request: None,
            wrap_width,
            area,
        };
        state.relayout();
        state
    }

    #[must_use]
    /// The slice of state that outlives the session.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    /// Whether a full text was loaded.
    pub fn has_document(&self) -> bool {
        !self.navigator.sections().is_empty()
    }

    #[must_use]
    /// Articles passing the current search and chip.
    pub fn visible_articles(&self) -> Vec<&Article> {
        filter_articles(
            &self.catalog.articles,
            &self.filter,
            &self.preferences.saved_ids,
        )
    }

    #[must_use]
    /// Chip labels for the current filter mode, ending with the saved pseudo-chip.
    pub fn chips(&self) -> Vec<&str> {
        let labels = match self.filter.mode {
            FilterMode::Category => &self.catalog.categories,
            FilterMode::Situation => &self.catalog.life_situations,
        };
        labels
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(SAVED_LABEL))
            .collect()
    }

    #[must_use]
    /// Index of the active chip in [`AppState::chips`].
    pub fn active_chip(&self) -> usize {
        self.chips()
            .iter()
            .position(|label| Selection::from_label(label) == self.filter.selection)
            .unwrap_or(0)
    }

    /// Hand the pending chat payload to the caller, who is responsible for settling it.
    pub fn take_pending_request(&mut self) -> Option<Vec<ChatMessage>> {
        self.pending_request.take()
    }

    #[must_use]
    #[allow(clippy::too_many_lines)]
    /// Fold one action into the state.
    pub fn reduce(mut self, action: Action) -> Self {
        tracing::trace!(?action, "reduce");
        self.message = None;

        match action {
            Action::Show(view) => self.view = view,
            Action::NextView => self.view = self.view.next(),
            Action::BeginSearch => {
                self.view = View::Articles;
                self.searching = true;
            }
            Action::EndSearch => self.searching = false,
            Action::ClearSearch => {
                self.filter.search.clear();
                self.searching = false;
                self.clamp_cursor();
            }
            Action::SearchInput(c) => {
                self.filter.search.push(c);
                self.cursor = 0;
            }
            Action::SearchBackspace => {
                self.filter.search.pop();
                self.cursor = 0;
            }
            Action::SetFilterMode(mode) => {
                self.filter.set_mode(mode);
                self.cursor = 0;
            }
            Action::CycleSelection(forward) => {
                let chips = self.chips();
                let len = chips.len();
                let current = self.active_chip();
                let next = if forward {
                    (current + 1) % len
                } else {
                    (current + len - 1) % len
                };
                self.filter.selection = Selection::from_label(chips[next]);
                self.cursor = 0;
            }
            Action::Select(selection) => {
                self.filter.selection = selection;
                self.cursor = 0;
            }
            Action::MoveCursor(delta) => {
                self.cursor = self.cursor.saturating_add_signed(delta);
                self.clamp_cursor();
            }
            Action::ToggleExpanded => {
                let id = self.visible_articles().get(self.cursor).map(|a| a.id.clone());
                self.expanded = match (id, self.expanded.take()) {
                    (Some(id), Some(open)) if id == open => None,
                    (id, _) => id,
                };
            }
            Action::ToggleSavedAtCursor => {
                if let Some(id) = self.visible_articles().get(self.cursor).map(|a| a.id.clone()) {
                    self = self.reduce(Action::ToggleSaved(id));
                }
            }
            Action::ToggleSaved(id) => {
                self.preferences.toggle_saved(&id);
                self.message = Some(if self.preferences.is_saved(&id) {
                    format!("Guardado: artículo {id}")
                } else {
                    format!("Quitado de guardados: artículo {id}")
                });
                self.clamp_cursor();
            }
            Action::ShareAtCursor => {
                let url = self.visible_articles().get(self.cursor).copied().map(share_url);
                if let Some(url) = url {
                    tracing::info!(%url, "share link");
                    self.message = Some(format!("Compartir: {url}"));
                }
            }
            Action::ToggleDarkMode => self.preferences.dark_mode = !self.preferences.dark_mode,
            Action::ChatInput(c) => self.chat_input.push(c),
            Action::ChatBackspace => {
                self.chat_input.pop();
            }
            Action::ChatSubmit => {
                let input = std::mem::take(&mut self.chat_input);
                if !self.begin_chat(&input) {
                    self.chat_input = input;
                }
            }
            Action::AskSuggested(index) => {
                if let Some(question) = self.catalog.suggested_questions.get(index) {
                    let question = question.question.clone();
                    self.view = View::Chat;
                    self.begin_chat(&question);
                }
            }
            Action::ChatPage(back) => {
                let step = self.area.1.max(1);
                self.chat_scroll = if back {
                    (self.chat_scroll + step).min(self.chat_history_rows())
                } else {
                    self.chat_scroll.saturating_sub(step)
                };
            }
            Action::ChatSettled(result) => {
                if self.conversation.is_loading {
                    self.conversation.settle(result);
                    self.chat_scroll = 0;
                } else {
                    tracing::debug!("dropping reply with no request in flight");
                }
            }
            Action::AdjustFont(delta) => {
                self.navigator.adjust_font_size(delta);
                self.relayout();
            }
            Action::ToggleColumns => {
                self.navigator.toggle_columns();
                self.relayout();
            }
            Action::ToggleFocus => {
                self.navigator.toggle_focus();
                self.relayout();
            }
            Action::ToggleToc => {
                self.navigator.toggle_toc();
                if self.navigator.state().toc_open {
                    self.toc_cursor = self.active_index().unwrap_or(0);
                }
            }
            Action::TocCursor(delta) => {
                let last = self.navigator.sections().len().saturating_sub(1);
                self.toc_cursor = self.toc_cursor.saturating_add_signed(delta).min(last);
            }
            Action::JumpToTocCursor => {
                if let Some(id) = self
                    .navigator
                    .sections()
                    .get(self.toc_cursor)
                    .map(|s| s.id.clone())
                {
                    self.jump_to(&id);
                }
            }
            Action::JumpTo(id) => self.jump_to(&id),
            Action::NextSection => {
                let target = match self.active_id() {
                    Some(id) => self.navigator.next_section(id),
                    None => self.navigator.sections().first(),
                }
                .map(|s| s.id.clone());
                if let Some(id) = target {
                    self.jump_to(&id);
                }
            }
            Action::PreviousSection => {
                let target = self
                    .active_id()
                    .and_then(|id| self.navigator.previous_section(id))
                    .map(|s| s.id.clone());
                if let Some(id) = target {
                    self.jump_to(&id);
                }
            }
            Action::Scroll(rows) => {
                self.layout.scroll_by(rows);
                self.navigator.on_scroll(&self.layout);
            }
            Action::Page(forward) => {
                self.layout.page(forward);
                self.navigator.on_scroll(&self.layout);
            }
            Action::ScrollToEdge(bottom) => {
                self.layout.scroll_to_edge(bottom);
                self.navigator.on_scroll(&self.layout);
            }
            Action::Resize { width, height } => {
                if (width, height) != self.area {
                    self.area = (width, height);
                    self.relayout();
                }
            }
        }

        self
    }

    fn begin_chat(&mut self, input: &str) -> bool {
        if let Some(payload) = self.conversation.begin(input, self.document.as_deref()) {
            self.pending_request = Some(payload);
            self.chat_scroll = 0;
            return true;
        }
        if self.conversation.is_loading {
            self.message = Some("Esperando la respuesta anterior…".to_string());
        }
        false
    }

    /// Upper bound on the wrapped rows the chat history occupies at the current width.
    fn chat_history_rows(&self) -> usize {
        let width = self.area.0.max(1);
        self.conversation
            .messages
            .iter()
            .map(|m| {
                let body: usize = m
                    .content
                    .lines()
                    .map(|line| wrap(line, width).len().max(1))
                    .sum();
                body + 2
            })
            .sum()
    }

    fn active_id(&self) -> Option<&str> {
        let id = self.navigator.state().active_section_id.as_str();
        (!id.is_empty()).then_some(id)
    }

    fn active_index(&self) -> Option<usize> {
        let id = self.active_id()?;
        self.navigator.sections().iter().position(|s| s.id == id)
    }

    fn jump_to(&mut self, id: &str) {
        self.navigator.scroll_to_section(id, &mut self.layout);
        self.settle_on(id);
    }

    /// Recompute the active section, preferring `id` when the content ended before it could
    /// reach the activation band but it is still on screen.
    fn settle_on(&mut self, id: &str) {
        self.navigator.on_scroll(&self.layout);
        let on_screen = self
            .layout
            .anchor_top(id)
            .is_some_and(|top| top >= 0.0 && top < self.layout.client_height());
        if on_screen {
            self.navigator.activate(id);
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_articles().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Rebuild the reader rows after a size or display preference change, keeping the active
    /// section in view.
    fn relayout(&mut self) {
        let state = self.navigator.state();
        let (area_width, area_height) = self.area;
        let columns = if state.column_mode && !state.focus_mode {
            2
        } else {
            1
        };
        let width = text_width(area_width, self.wrap_width, state);
        let active = state.active_section_id.clone();

        self.layout = ReaderLayout::build(self.navigator.sections(), width, area_height, columns);
        if let Some(top) = self.layout.anchor_top(&active) {
            let offset = self.navigator.config().header_offset;
            self.layout.scroll_to((top - offset).max(0.0));
        }
        self.settle_on(&active);
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
