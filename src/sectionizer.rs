//! Line-oriented sectionizer for constitution text.
//!
//! The source text is markdown-ish: chapter titles are wrapped in `<u>` tags (often bolded), and
//! each article starts on its own line with `ARTÍCULO <n>`. Some exports prefix every line with a
//! block-quote marker. We classify each cleaned line on its own, then fold the classified lines
//! into an ordered list of [`Section`]s.

use crate::section::{Section, SectionKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ARTICLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ARTÍCULO\s+[0-9]+").expect("article marker regex is valid"));

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number regex is valid"));

static ARTICLE_LEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ARTÍCULO\s+[0-9]+\.-").expect("article lead regex is valid"));

static UNDERLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?u>").expect("underline tag regex is valid"));

#[derive(Debug, PartialEq, Eq)]
/// What a single cleaned line means to the outline.
pub enum LineKind<'a> {
    /// Nothing left after cleaning; marks a paragraph break.
    Blank,
    /// Starts a chapter section. The line itself is not kept as content.
    Header {
        /// Title with markup removed.
        title: String,
    },
    /// Starts an article section. The line is kept as its first content entry.
    Article {
        /// First run of digits on the line.
        number: &'a str,
        /// Text before the first period.
        title: &'a str,
        /// The whole line.
        line: &'a str,
    },
    /// Any other line, appended to the current section.
    Text(&'a str),
}

#[must_use]
/// Remove a leading block-quote marker and surrounding whitespace.
pub fn clean_line(line: &str) -> &str {
    line.strip_prefix('>').unwrap_or(line).trim()
}

#[must_use]
/// Classify an already cleaned line.
///
/// Precedence is blank, header, article, text: a line carrying both an underline tag and an
/// article marker is a header.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }

    if line.starts_with("<u>") || line.contains("**<u>") {
        return LineKind::Header {
            title: header_title(line),
        };
    }

    if ARTICLE_MARKER.is_match(line) {
        let number = FIRST_NUMBER.find(line).map_or("", |m| m.as_str());
        let title = line.split('.').next().unwrap_or(line);
        return LineKind::Article {
            number,
            title,
            line,
        };
    }

    LineKind::Text(line)
}

#[must_use]
/// Drop the `ARTÍCULO <n>.-` lead from an article's opening line for display.
pub fn strip_article_lead(line: &str) -> &str {
    ARTICLE_LEAD
        .find(line)
        .map_or(line, |m| &line[m.end()..])
        .trim()
}

fn header_title(line: &str) -> String {
    UNDERLINE_TAG
        .replace_all(line, "")
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Fold accumulator: sections already closed plus the one being filled.
struct Outline {
    finished: Vec<Section>,
    current: Section,
    used_ids: HashSet<String>,
}

impl Outline {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Section::intro(),
            used_ids: HashSet::new(),
        }
    }

    fn step(mut self, kind: LineKind<'_>) -> Self {
        match kind {
            LineKind::Blank => {
                if self.current.content.last().is_some_and(|last| !last.is_empty()) {
                    self.current.content.push(String::new());
                }
            }
            LineKind::Header { title } => {
                self.close_current();
                let id = format!("section-{}", self.finished.len());
                self.open(Section {
                    id,
                    title,
                    kind: SectionKind::Header,
                    content: Vec::new(),
                });
            }
            LineKind::Article {
                number,
                title,
                line,
            } => {
                self.close_current();
                let id = self.unique_id(format!("art-{number}"));
                self.open(Section {
                    id,
                    title: title.to_string(),
                    kind: SectionKind::Article,
                    content: vec![line.to_string()],
                });
            }
            LineKind::Text(line) => self.current.content.push(line.to_string()),
        }
        self
    }

    /// Push the in-progress section unless it is an intro nothing was ever written to.
    fn close_current(&mut self) {
        if self.current.has_content() || self.current.kind != SectionKind::Intro {
            let closed = std::mem::replace(&mut self.current, Section::intro());
            self.finished.push(closed);
        }
    }

    fn open(&mut self, section: Section) {
        self.used_ids.insert(section.id.clone());
        self.current = section;
    }

    fn unique_id(&self, base: String) -> String {
        if !self.used_ids.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.used_ids.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn finish(mut self) -> Vec<Section> {
        if self.current.has_content() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

#[must_use]
/// Split constitution text into ordered outline sections.
///
/// Absent or empty text yields no sections. The result depends only on the input, so callers can
/// recompute it whenever the text changes.
pub fn sectionize(text: Option<&str>) -> Vec<Section> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Vec::new();
    };

    let sections = text
        .lines()
        .map(clean_line)
        .map(classify)
        .fold(Outline::new(), Outline::step)
        .finish();

    tracing::debug!(sections = sections.len(), "sectionized document");
    sections
}

#[cfg(test)]
#[path = "tests/sectionizer.rs"]
mod tests;
