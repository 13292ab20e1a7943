//! Terminal layout for the full-text reading view.
//!
//! Sections are flattened into wrapped rows once per width/preference change. Each section's
//! first row is its anchor, so scroll positions, anchor offsets and the content height are all
//! measured in rows. This is the [`Viewport`] the navigator sees while the TUI is running.

use crate::navigator::{NavigationState, NavigatorConfig, Viewport, DEFAULT_FONT_SIZE};
use crate::section::{Section, SectionKind};
use crate::sectionizer::strip_article_lead;
use std::collections::HashMap;

/// Characters of the next section's title shown in the "next" link.
const NEXT_TITLE_CHARS: usize = 20;
/// Blank columns between the two text columns.
const COLUMN_GUTTER: usize = 4;
/// Rows from the top of the text area counted as "being read".
const ACTIVATION_ROWS: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How a row should be styled when drawn.
pub enum RowStyle {
    /// Chapter title.
    Header,
    /// Article or intro title.
    Title,
    /// First paragraph of an article, with its number lead removed.
    Lead,
    /// Ordinary paragraph text.
    Body,
    /// Paragraph break or spacing.
    Blank,
    /// Pointer to the following section.
    NextLink,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One wrapped terminal row.
pub struct Row {
    /// Index of the section this row belongs to.
    pub section: usize,
    /// Text to print, already wrapped to the layout width.
    pub text: String,
    /// Styling hint.
    pub style: RowStyle,
}

#[must_use]
/// Navigator geometry tuned for terminal rows.
pub fn terminal_navigator_config() -> NavigatorConfig {
    NavigatorConfig {
        activation_band: 0.0..=ACTIVATION_ROWS,
        header_offset: 1.0,
    }
}

#[must_use]
/// Width of one text column for the given area width and display preferences.
///
/// Larger fonts shorten lines the way they would on a page; focus mode narrows further and
/// column mode splits the remaining width in two.
pub fn text_width(area_width: usize, max_width: usize, state: &NavigationState) -> usize {
    let mut width = area_width.min(max_width);
    width = width * usize::from(DEFAULT_FONT_SIZE) / usize::from(state.font_size.max(1));
    if state.focus_mode {
        width = width * 3 / 4;
    } else if state.column_mode {
        width = width.saturating_sub(COLUMN_GUTTER) / 2;
    }
    width.max(10)
}

#[must_use]
/// Greedy word wrap by character count. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        while word_len > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(i, _)| i);
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        if word_len == 0 {
            continue;
        }
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// Sections laid out as rows plus the current scroll position.
pub struct ReaderLayout {
    rows: Vec<Row>,
    anchors: HashMap<String, usize>,
    width: usize,
    height: usize,
    columns: usize,
    scroll_top: usize,
}

impl ReaderLayout {
    #[must_use]
    /// Lay out `sections` into rows of at most `width` characters.
    ///
    /// `height` is the number of rows visible per column; `columns` is 1 or 2.
    pub fn build(sections: &[Section], width: usize, height: usize, columns: usize) -> Self {
        let mut rows = Vec::new();
        let mut anchors = HashMap::new();

        for (index, section) in sections.iter().enumerate() {
            anchors.insert(section.id.clone(), rows.len());
            push_section(&mut rows, index, section, width);

            if let Some(next) = sections.get(index + 1) {
                let title: String = next.title.chars().take(NEXT_TITLE_CHARS).collect();
                rows.push(blank(index));
                rows.push(Row {
                    section: index,
                    text: format!("Siguiente: {title}... →"),
                    style: RowStyle::NextLink,
                });
                rows.push(blank(index));
            }
        }

        Self {
            rows,
            anchors,
            width,
            height: height.max(1),
            columns: columns.clamp(1, 2),
            scroll_top: 0,
        }
    }

    #[must_use]
    /// Every laid out row.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    /// Column width the rows were wrapped to.
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    /// Number of text columns drawn side by side.
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    /// Rows visible per column.
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    /// First visible row.
    pub fn offset(&self) -> usize {
        self.scroll_top
    }

    #[must_use]
    /// Rows visible in one column, starting at the scroll position.
    pub fn column_rows(&self, column: usize) -> &[Row] {
        let start = (self.scroll_top + column * self.height).min(self.rows.len());
        let end = (start + self.height).min(self.rows.len());
        &self.rows[start..end]
    }

    fn visible_rows(&self) -> usize {
        self.height * self.columns
    }

    #[must_use]
    /// Largest scroll position that still fills the visible area.
    pub fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.visible_rows())
    }

    /// Move the scroll position by `delta` rows, staying in bounds.
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_top = self
            .scroll_top
            .saturating_add_signed(delta)
            .min(self.max_scroll());
    }

    /// Move by one visible area.
    pub fn page(&mut self, forward: bool) {
        let step = isize::try_from(self.visible_rows()).unwrap_or(isize::MAX);
        self.scroll_by(if forward { step } else { -step });
    }

    /// Jump to the very top or bottom.
    pub fn scroll_to_edge(&mut self, bottom: bool) {
        self.scroll_top = if bottom { self.max_scroll() } else { 0 };
    }
}

fn blank(section: usize) -> Row {
    Row {
        section,
        text: String::new(),
        style: RowStyle::Blank,
    }
}

fn push_section(rows: &mut Vec<Row>, index: usize, section: &Section, width: usize) {
    let (title, title_style) = match section.kind {
        SectionKind::Header => (section.title.to_uppercase(), RowStyle::Header),
        SectionKind::Article | SectionKind::Intro => (section.title.clone(), RowStyle::Title),
    };
    for text in wrap(&title, width) {
        rows.push(Row {
            section: index,
            text,
            style: title_style,
        });
    }
    rows.push(blank(index));

    for line in &section.content {
        if line.is_empty() {
            rows.push(blank(index));
            continue;
        }
        let (text, style) = if line.starts_with("ARTÍCULO") {
            (strip_article_lead(line), RowStyle::Lead)
        } else {
            (line.as_str(), RowStyle::Body)
        };
        for text in wrap(text, width) {
            rows.push(Row {
                section: index,
                text,
                style,
            });
        }
    }
}

#[allow(clippy::cast_precision_loss)]
impl Viewport for ReaderLayout {
    fn scroll_top(&self) -> f64 {
        self.scroll_top as f64
    }

    fn scroll_height(&self) -> f64 {
        self.rows.len() as f64
    }

    fn client_height(&self) -> f64 {
        self.visible_rows() as f64
    }

    fn anchor_top(&self, id: &str) -> Option<f64> {
        self.anchors
            .get(id)
            .map(|&row| row as f64 - self.scroll_top as f64)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn scroll_to(&mut self, position: f64) {
        let row = position.round().max(0.0) as usize;
        self.scroll_top = row.min(self.max_scroll());
    }
}

#[cfg(test)]
#[path = "tests/reader.rs"]
mod tests;
