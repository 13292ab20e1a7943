//! carta: a terminal reader for the Argentine constitution.
#![allow(clippy::multiple_crate_versions)]

use carta::app_state::{Action, AppState, View};
use carta::catalog::Catalog;
use carta::chat::{ChatTransport, Conversation};
use carta::config::Config;
use carta::error::Result;
use carta::filter::{filter_articles, Filter, FilterMode, Selection};
use carta::preferences::{FileStore, Preferences};
use carta::{logging, sectionizer, share, ui};
use clap::{Parser, Subcommand};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// How long to wait for a key before checking for chat replies.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Font size change per key press.
const FONT_STEP: i32 = 2;

#[derive(Parser)]
#[command(name = "carta")]
#[command(about = "Read, search and ask about the Argentine constitution", long_about = None)]
struct Args {
    /// Constitution text to open in the reader
    #[arg(long, value_name = "PATH")]
    document: Option<PathBuf>,

    /// Configuration file (defaults to ./carta.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the sections of a document as JSON
    Outline {
        /// Document to split
        path: PathBuf,
    },
    /// List curated articles matching a search
    Search {
        /// Text to look for in article text, label, keywords or application
        term: Option<String>,

        /// Only this category
        #[arg(long, conflicts_with_all = ["situation", "saved"])]
        category: Option<String>,

        /// Only this life situation
        #[arg(long, conflicts_with = "saved")]
        situation: Option<String>,

        /// Only saved articles
        #[arg(long)]
        saved: bool,
    },
    /// Print a share message and link for a curated article
    Share {
        /// Article id, e.g. `14bis`
        id: String,
    },
    /// Ask the assistant a single question
    Ask {
        /// Question to send
        question: String,

        /// Constitution text used as grounding
        #[arg(long, value_name = "PATH")]
        document: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let interactive = args.command.is_none();

    let log_file = if interactive {
        logging::default_log_file()
    } else {
        None
    };
    if let Err(e) = logging::init_tracing(args.verbose, log_file.as_deref()) {
        eprintln!("Logging disabled: {e}");
    }

    let cfg = Config::load(args.config.as_deref());

    match args.command {
        Some(Command::Outline { path }) => outline(&path),
        Some(Command::Search {
            term,
            category,
            situation,
            saved,
        }) => search(&cfg, term, category.as_deref(), situation.as_deref(), saved),
        Some(Command::Share { id }) => share(&id),
        Some(Command::Ask { question, document }) => ask(&cfg, &question, document),
        None => {
            let document = read_document(args.document.or_else(|| cfg.document()))?;
            let store = cfg.preferences_file().map(FileStore::open);
            let preferences = store.as_ref().map(Preferences::load).unwrap_or_default();
            let state = AppState::new(
                Catalog::embedded()?,
                document,
                preferences,
                cfg.wrap_width,
                cfg.context_chars,
            );
            run_tui(state, &cfg, store)
        }
    }
}

fn read_document(path: Option<PathBuf>) -> Result<Option<String>> {
    let Some(path) = path else {
        tracing::info!("no document configured");
        return Ok(None);
    };
    tracing::debug!(path = %path.display(), "reading document");
    Ok(Some(fs::read_to_string(path)?))
}

fn outline(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let sections = sectionizer::sectionize(Some(&text));
    println!("{}", serde_json::to_string_pretty(&sections)?);
    Ok(())
}

fn search(
    cfg: &Config,
    term: Option<String>,
    category: Option<&str>,
    situation: Option<&str>,
    saved: bool,
) -> Result<()> {
    let catalog = Catalog::embedded()?;
    let preferences = cfg
        .preferences_file()
        .map(FileStore::open)
        .as_ref()
        .map(Preferences::load)
        .unwrap_or_default();

    let mut filter = Filter {
        search: term.unwrap_or_default(),
        ..Filter::default()
    };
    if saved {
        filter.selection = Selection::Saved;
    } else if let Some(category) = category {
        filter.selection = Selection::from_label(category);
    } else if let Some(situation) = situation {
        filter.set_mode(FilterMode::Situation);
        filter.selection = Selection::from_label(situation);
    }

    let matches = filter_articles(&catalog.articles, &filter, &preferences.saved_ids);
    if matches.is_empty() {
        eprintln!("No articles found");
    }
    for article in matches {
        println!("{} [{}]", article.article, article.category);
        println!("  {}", article.text);
        println!();
    }
    Ok(())
}

fn share(id: &str) -> Result<()> {
    let catalog = Catalog::embedded()?;
    let mut found = false;
    for article in catalog.articles_with_id(id) {
        found = true;
        println!("{}", share::share_message(article));
        println!();
        println!("{}", share::share_url(article));
    }
    if !found {
        eprintln!("No article with id {id}");
    }
    Ok(())
}

fn ask(cfg: &Config, question: &str, document: Option<PathBuf>) -> Result<()> {
    let document = read_document(document.or_else(|| cfg.document()))?;
    let transport = cfg.transport();
    let mut conversation = Conversation::new(cfg.context_chars);

    if !conversation.submit(question, document.as_deref(), transport.as_ref()) {
        eprintln!("Nothing to ask");
        return Ok(());
    }
    if let Some(reply) = conversation.messages.last() {
        println!("{}", reply.content);
    }
    Ok(())
}

fn run_tui(app: AppState, cfg: &Config, store: Option<FileStore>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app, cfg, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Reduce one action and persist preferences if it changed them.
fn apply(app: AppState, action: Action, store: Option<&mut FileStore>) -> AppState {
    let before = app.preferences().clone();
    let mut app = app.reduce(action);
    if *app.preferences() != before {
        if let Some(store) = store {
            if let Err(e) = app.preferences().save(store) {
                tracing::warn!(error = %e, "failed to save preferences");
                app.message = Some(format!("No se pudieron guardar las preferencias: {e}"));
            }
        }
    }
    app
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: AppState,
    cfg: &Config,
    mut store: Option<FileStore>,
) -> Result<()> {
    let transport: Arc<dyn ChatTransport + Send + Sync> = Arc::from(cfg.transport());
    let (tx, rx) = mpsc::channel();
    let mut text_size = None;

    loop {
        let size = terminal.size()?;
        let current = ui::reader_text_size(Rect::new(0, 0, size.width, size.height));
        if text_size != Some(current) {
            text_size = Some(current);
            let (width, height) = current;
            app = apply(app, Action::Resize { width, height }, store.as_mut());
        }

        while let Ok(result) = rx.try_recv() {
            app = apply(app, Action::ChatSettled(result), store.as_mut());
        }

        if let Some(payload) = app.take_pending_request() {
            let transport = Arc::clone(&transport);
            let tx = tx.clone();
            thread::spawn(move || {
                if tx.send(transport.complete(&payload)).is_err() {
                    tracing::debug!("reader closed before the chat reply arrived");
                }
            });
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_quit(&app, key) {
            return Ok(());
        }
        if let Some(action) = key_action(&app, key) {
            app = apply(app, action, store.as_mut());
        }
    }
}

fn is_quit(app: &AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    match app.view {
        View::Articles => !app.searching && key.code == KeyCode::Char('q'),
        View::Reader => !app.navigator.state().toc_open && key.code == KeyCode::Char('q'),
        View::Chat => false,
    }
}

fn key_action(app: &AppState, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Tab {
        return Some(Action::NextView);
    }
    match app.view {
        View::Articles if app.searching => match key.code {
            KeyCode::Char(c) => Some(Action::SearchInput(c)),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Enter => Some(Action::EndSearch),
            KeyCode::Esc => Some(Action::ClearSearch),
            _ => None,
        },
        View::Articles => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveCursor(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveCursor(1)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ToggleExpanded),
            KeyCode::Left => Some(Action::CycleSelection(false)),
            KeyCode::Right => Some(Action::CycleSelection(true)),
            KeyCode::Char('/') => Some(Action::BeginSearch),
            KeyCode::Char('s') => Some(Action::ToggleSavedAtCursor),
            KeyCode::Char('w') => Some(Action::ShareAtCursor),
            KeyCode::Char('m') => Some(Action::SetFilterMode(match app.filter.mode {
                FilterMode::Category => FilterMode::Situation,
                FilterMode::Situation => FilterMode::Category,
            })),
            KeyCode::Char('d') => Some(Action::ToggleDarkMode),
            KeyCode::Esc => Some(Action::ClearSearch),
            _ => None,
        },
        View::Reader if app.navigator.state().toc_open => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::TocCursor(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::TocCursor(1)),
            KeyCode::Enter => Some(Action::JumpToTocCursor),
            KeyCode::Esc | KeyCode::Char('t') => Some(Action::ToggleToc),
            _ => None,
        },
        View::Reader => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Scroll(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Scroll(1)),
            KeyCode::PageUp => Some(Action::Page(false)),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::Page(true)),
            KeyCode::Home => Some(Action::ScrollToEdge(false)),
            KeyCode::End => Some(Action::ScrollToEdge(true)),
            KeyCode::Char('n') => Some(Action::NextSection),
            KeyCode::Char('p') => Some(Action::PreviousSection),
            KeyCode::Char('t') => Some(Action::ToggleToc),
            KeyCode::Char('+' | '=') => Some(Action::AdjustFont(FONT_STEP)),
            KeyCode::Char('-') => Some(Action::AdjustFont(-FONT_STEP)),
            KeyCode::Char('c') => Some(Action::ToggleColumns),
            KeyCode::Char('f') => Some(Action::ToggleFocus),
            KeyCode::Char('d') => Some(Action::ToggleDarkMode),
            _ => None,
        },
        View::Chat => match key.code {
            KeyCode::Char(c @ '1'..='9')
                if app.conversation.is_fresh() && app.chat_input.is_empty() =>
            {
                c.to_digit(10)
                    .and_then(|d| usize::try_from(d).ok())
                    .map(|d| Action::AskSuggested(d - 1))
            }
            KeyCode::Char(c) => Some(Action::ChatInput(c)),
            KeyCode::Backspace => Some(Action::ChatBackspace),
            KeyCode::Enter => Some(Action::ChatSubmit),
            KeyCode::PageUp => Some(Action::ChatPage(true)),
            KeyCode::PageDown => Some(Action::ChatPage(false)),
            KeyCode::Esc => Some(Action::Show(View::Articles)),
            _ => None,
        },
    }
}
