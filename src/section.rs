//! Section representation for sectionized constitution text.
//!
//! A section is one outline unit of the document: a chapter header, a numbered article, or the
//! implicit introduction that holds whatever precedes the first of those. Sections keep their
//! source lines verbatim so the reader can lay them out without going back to the raw text.

use serde::{Deserialize, Serialize};

/// Id of the implicit leading section.
pub const INTRO_ID: &str = "intro";

/// Title of the implicit leading section.
pub const INTRO_TITLE: &str = "Inicio";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// What kind of outline unit a section is.
pub enum SectionKind {
    /// Content preceding the first header or article.
    Intro,
    /// A chapter or part heading; carries no heading line in its content.
    Header,
    /// A numbered article; its opening line is the first content entry.
    Article,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Outline unit with its display label and ordered content lines.
pub struct Section {
    /// Unique within one parse: `intro`, `section-<n>` or `art-<number>`.
    pub id: String,
    /// Display label for the table of contents.
    pub title: String,
    /// Header, article or intro.
    #[serde(rename = "type")]
    pub kind: SectionKind,
    /// One entry per source line; empty strings mark paragraph breaks.
    pub content: Vec<String>,
}

impl Section {
    #[must_use]
    /// The implicit section that collects text before the first header or article.
    pub fn intro() -> Self {
        Self {
            id: INTRO_ID.to_string(),
            title: INTRO_TITLE.to_string(),
            kind: SectionKind::Intro,
            content: Vec::new(),
        }
    }

    #[must_use]
    /// Whether any line has been collected yet.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}
