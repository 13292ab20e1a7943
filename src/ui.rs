//! The UI renders the application state into something visible.
//!
//! The draw function paints the tab bar and help bar, then dispatches on the current view: the
//! curated article browser, the full-text reader, or the assistant chat.

use crate::app_state::{AppState, View};
use crate::catalog::Article;
use crate::glossary::{Glossary, Segment};
use crate::reader::{wrap, RowStyle};
use crate::section::SectionKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

/// Blank columns between the two reader columns; matches the reader's wrap gutter.
const GUTTER: u16 = 4;

#[derive(Clone, Copy)]
struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    term: Color,
}

fn palette(dark: bool) -> Palette {
    if dark {
        Palette {
            text: Color::Gray,
            background: Color::Black,
            accent: Color::LightBlue,
            muted: Color::DarkGray,
            term: Color::LightYellow,
        }
    } else {
        Palette {
            text: Color::Black,
            background: Color::White,
            accent: Color::Blue,
            muted: Color::Gray,
            term: Color::Magenta,
        }
    }
}

fn frame_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Help
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn reader_chunks(body: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(body);
    [chunks[0], chunks[1]]
}

#[must_use]
/// Width and height, in cells, of the reader's text area for a terminal of size `area`.
pub fn reader_text_size(area: Rect) -> (usize, usize) {
    let [_, body, _] = frame_chunks(area);
    let [_, text] = reader_chunks(body);
    let inner = Block::default().borders(Borders::ALL).inner(text);
    (usize::from(inner.width), usize::from(inner.height))
}

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &AppState) {
    let colors = palette(app.preferences.dark_mode);
    let base = Style::default().fg(colors.text).bg(colors.background);
    f.render_widget(Block::default().style(base), f.area());

    let [tabs_area, body, help_area] = frame_chunks(f.area());

    let views = [View::Articles, View::Reader, View::Chat];
    let selected = views.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(views.map(View::title))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Constitución Nacional Argentina"),
        );
    f.render_widget(tabs, tabs_area);

    match app.view {
        View::Articles => draw_articles(f, app, body, colors),
        View::Reader => draw_reader(f, app, body, colors),
        View::Chat => draw_chat(f, app, body, colors),
    }

    let help = if let Some(ref msg) = app.message {
        msg.clone()
    } else {
        help_text(app).to_string()
    };
    let help_widget = Paragraph::new(help).block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, help_area);
}

fn help_text(app: &AppState) -> &'static str {
    match app.view {
        View::Articles if app.searching => "Escribí para buscar | Enter: Listo | Esc: Borrar",
        View::Articles => {
            "↑/↓: Navegar | Enter: Expandir | s: Guardar | w: Compartir | /: Buscar | ←/→: Filtro | m: Categoría/Situación | d: Modo oscuro | Tab: Vista | q: Salir"
        }
        View::Reader if app.navigator.state().toc_open => "↑/↓: Elegir | Enter: Ir | t/Esc: Cerrar índice",
        View::Reader => {
            "↑/↓/PgUp/PgDn: Leer | n/p: Siguiente/Anterior | t: Índice | +/-: Letra | c: Columnas | f: Foco | Tab: Vista | q: Salir"
        }
        View::Chat if app.conversation.is_fresh() => {
            "Escribí tu pregunta | Enter: Enviar | 1-8: Pregunta sugerida | PgUp/PgDn: Historial | Tab: Vista | Esc: Volver"
        }
        View::Chat => {
            "Escribí tu pregunta | Enter: Enviar | PgUp/PgDn: Historial | Tab: Vista | Esc: Volver"
        }
    }
}

fn glossary_spans<'t>(
    glossary: Option<&'t Glossary>,
    text: &'t str,
    colors: Palette,
) -> Vec<Span<'t>> {
    let Some(glossary) = glossary else {
        return vec![Span::raw(text)];
    };
    glossary
        .segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(plain) => Span::raw(plain),
            Segment::Term { text, .. } => Span::styled(
                text,
                Style::default()
                    .fg(colors.term)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect()
}

fn glossary_notes<'t>(
    glossary: Option<&'t Glossary>,
    text: &'t str,
) -> Vec<(&'t str, &'t str)> {
    let mut notes: Vec<(&str, &str)> = Vec::new();
    if let Some(glossary) = glossary {
        for segment in glossary.segments(text) {
            if let Segment::Term { text, definition } = segment {
                if !notes.iter().any(|(_, d)| *d == definition) {
                    notes.push((text, definition));
                }
            }
        }
    }
    notes
}

fn draw_articles(f: &mut Frame, app: &AppState, area: Rect, colors: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search_style = if app.searching {
        Style::default().fg(colors.accent)
    } else {
        Style::default()
    };
    let cursor = if app.searching { "▏" } else { "" };
    let search = Paragraph::new(format!("{}{cursor}", app.filter.search))
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title("Buscar"));
    f.render_widget(search, chunks[0]);

    let active = app.active_chip();
    let mut chips = Vec::new();
    for (i, label) in app.chips().into_iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        chips.push(Span::styled(format!(" {label} "), style));
        chips.push(Span::raw(" "));
    }
    let mode_title = match app.filter.mode {
        crate::filter::FilterMode::Category => "Categorías",
        crate::filter::FilterMode::Situation => "Situaciones",
    };
    let chip_bar = Paragraph::new(Line::from(chips))
        .block(Block::default().borders(Borders::ALL).title(mode_title));
    f.render_widget(chip_bar, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    let articles = app.visible_articles();
    let items: Vec<ListItem> = articles
        .iter()
        .map(|article| {
            let star = if app.preferences.is_saved(&article.id) {
                "★ "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(star, Style::default().fg(colors.term)),
                Span::styled(
                    article.article.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", article.category),
                    Style::default().fg(colors.muted),
                ),
            ]))
        })
        .collect();

    let title = format!("Artículos ({})", articles.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default().with_selected((!articles.is_empty()).then_some(app.cursor));
    f.render_stateful_widget(list, columns[0], &mut list_state);

    let detail = match articles.get(app.cursor) {
        Some(article) => article_detail(app, article, app.glossary.as_ref(), colors),
        None => vec![Line::from(Span::styled(
            "No se encontraron artículos.",
            Style::default().fg(colors.muted),
        ))],
    };
    let detail_widget = Paragraph::new(detail)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Detalle"));
    f.render_widget(detail_widget, columns[1]);
}

fn article_detail<'a>(
    app: &'a AppState,
    article: &'a Article,
    glossary: Option<&'a Glossary>,
    colors: Palette,
) -> Vec<Line<'a>> {
    let heading = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(article.article.as_str(), heading)),
        Line::from(Span::styled(
            article.category.as_str(),
            Style::default().fg(colors.muted),
        )),
        Line::default(),
        Line::from(glossary_spans(glossary, &article.text, colors)),
    ];

    if app.expanded.as_deref() == Some(article.id.as_str()) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("¿Qué significa?", heading)));
        lines.push(Line::from(article.explanation.as_str()));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("En la práctica", heading)));
        lines.push(Line::from(article.application.as_str()));
    } else {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Enter: ver explicación",
            Style::default().fg(colors.muted),
        )));
    }

    let notes = glossary_notes(glossary, &article.text);
    if !notes.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Glosario", heading)));
        for (term, definition) in notes {
            lines.push(Line::from(vec![
                Span::styled(term, Style::default().fg(colors.term)),
                Span::raw(": "),
                Span::raw(definition),
            ]));
        }
    }
    lines
}

fn row_style(style: RowStyle, colors: Palette) -> Style {
    match style {
        RowStyle::Header => Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
        RowStyle::Title => Style::default().add_modifier(Modifier::BOLD),
        RowStyle::Lead | RowStyle::Body | RowStyle::Blank => Style::default(),
        RowStyle::NextLink => Style::default()
            .fg(colors.muted)
            .add_modifier(Modifier::ITALIC),
    }
}

fn draw_reader(f: &mut Frame, app: &AppState, area: Rect, colors: Palette) {
    let [status_area, text_area] = reader_chunks(area);
    let nav = app.navigator.state();

    if !app.has_document() {
        let empty = Paragraph::new("No hay texto cargado. Usá --document para abrir la Constitución.")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, text_area);
        return;
    }

    let kind = if app.navigator.active_is_article() {
        "Artículo"
    } else {
        "Sección"
    };
    let current = app
        .navigator
        .active_section()
        .map_or("", |section| section.title.as_str());
    let mut flags = vec![format!("Letra {}", nav.font_size)];
    if nav.column_mode {
        flags.push("Columnas".to_string());
    }
    if nav.focus_mode {
        flags.push("Foco".to_string());
    }
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{kind}: {current}"))
                .title_bottom(flags.join(" · ")),
        )
        .gauge_style(Style::default().fg(colors.accent))
        .ratio((nav.reading_progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", nav.reading_progress));
    f.render_widget(gauge, status_area);

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(text_area);
    f.render_widget(block, text_area);

    let column_areas = if app.layout.columns() == 2 {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(GUTTER),
                Constraint::Fill(1),
            ])
            .split(inner);
        vec![split[0], split[2]]
    } else {
        let width = u16::try_from(app.layout.width()).unwrap_or(inner.width).min(inner.width);
        let margin = (inner.width - width) / 2;
        vec![Rect {
            x: inner.x + margin,
            width,
            ..inner
        }]
    };

    for (column, column_area) in column_areas.into_iter().enumerate() {
        let lines: Vec<Line> = app
            .layout
            .column_rows(column)
            .iter()
            .map(|row| Line::from(Span::styled(row.text.as_str(), row_style(row.style, colors))))
            .collect();
        f.render_widget(Paragraph::new(lines), column_area);
    }

    if nav.toc_open {
        draw_toc(f, app, inner, colors);
    }
}

fn draw_toc(f: &mut Frame, app: &AppState, area: Rect, colors: Palette) {
    let width = (area.width / 2).max(20).min(area.width);
    let overlay = Rect { width, ..area };

    let items: Vec<ListItem> = app
        .navigator
        .toc()
        .into_iter()
        .map(|entry| {
            let (indent, style) = match entry.kind {
                SectionKind::Header => (
                    "",
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                SectionKind::Intro | SectionKind::Article => ("  ", Style::default()),
            };
            let marker = if entry.active { "▶ " } else { "" };
            ListItem::new(format!("{indent}{marker}{}", entry.title)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Índice"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.toc_cursor));

    f.render_widget(Clear, overlay);
    f.render_stateful_widget(list, overlay, &mut state);
}

fn push_wrapped(lines: &mut Vec<Line<'_>>, text: &str, width: usize) {
    let rows = wrap(text, width);
    if rows.is_empty() {
        lines.push(Line::default());
    }
    lines.extend(rows.into_iter().map(Line::from));
}

fn draw_chat(f: &mut Frame, app: &AppState, area: Rect, colors: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    // Rows are wrapped here so the scroll offset counts what is actually drawn.
    let width = usize::from(chunks[0].width.saturating_sub(2));
    let mut lines = Vec::new();
    for message in &app.conversation.messages {
        let (who, style) = match message.role {
            crate::chat::Role::User => (
                "Vos",
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            crate::chat::Role::Assistant | crate::chat::Role::System => {
                ("Asistente", Style::default().add_modifier(Modifier::BOLD))
            }
        };
        lines.push(Line::from(Span::styled(format!("{who}:"), style)));
        for text in message.content.lines() {
            push_wrapped(&mut lines, text, width);
        }
        lines.push(Line::default());
    }

    if app.conversation.is_loading {
        lines.push(Line::from(Span::styled(
            "Escribiendo…",
            Style::default()
                .fg(colors.muted)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    if app.conversation.is_fresh() {
        lines.push(Line::from(Span::styled(
            "Preguntas sugeridas",
            Style::default().fg(colors.muted),
        )));
        for (i, suggestion) in app.catalog.suggested_questions.iter().enumerate() {
            let entry = format!("{}. {} {}", i + 1, suggestion.emoji, suggestion.question);
            push_wrapped(&mut lines, &entry, width);
        }
    }

    let visible = usize::from(chunks[0].height.saturating_sub(2));
    let newest = lines.len().saturating_sub(visible);
    let skip = newest - app.chat_scroll.min(newest);
    let scroll = u16::try_from(skip).unwrap_or(u16::MAX);

    let history = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Asistente constitucional"));
    f.render_widget(history, chunks[0]);

    let input_title = if app.conversation.is_loading {
        "Esperando respuesta"
    } else {
        "Tu pregunta"
    };
    let input = Paragraph::new(format!("{}▏", app.chat_input))
        .block(Block::default().borders(Borders::ALL).title(input_title));
    f.render_widget(input, chunks[1]);
}
