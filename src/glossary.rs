//! Highlighting of glossary terms inside article text.

use crate::error::Result;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A run of article text, either plain or a glossary hit.
pub enum Segment<'a> {
    /// Text with no glossary term.
    Plain(&'a str),
    /// A glossary term exactly as written in the text.
    Term {
        /// Matched text, original casing.
        text: &'a str,
        /// Definition to show alongside.
        definition: &'a str,
    },
}

/// Case-insensitive matcher over a term-to-definition map, compiled once per catalog.
pub struct Glossary {
    entries: BTreeMap<String, String>,
    pattern: Option<Regex>,
}

impl Glossary {
    /// Compile a matcher. Longer terms win over terms they contain.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined pattern exceeds the regex size limit.
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self> {
        if entries.is_empty() {
            return Ok(Self {
                entries,
                pattern: None,
            });
        }

        let mut terms: Vec<&str> = entries.keys().map(String::as_str).collect();
        terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!("({alternation})"))
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            entries,
            pattern: Some(pattern),
        })
    }

    #[must_use]
    /// Split `text` into plain runs and glossary terms, preserving order and content.
    pub fn segments<'t>(&'t self, text: &'t str) -> Vec<Segment<'t>> {
        let Some(pattern) = &self.pattern else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::Plain(text)]
            };
        };

        let mut segments = Vec::new();
        let mut cursor = 0;
        for hit in pattern.find_iter(text) {
            let Some(definition) = self.entries.get(&hit.as_str().to_lowercase()) else {
                continue;
            };
            if hit.start() > cursor {
                segments.push(Segment::Plain(&text[cursor..hit.start()]));
            }
            segments.push(Segment::Term {
                text: hit.as_str(),
                definition,
            });
            cursor = hit.end();
        }
        if cursor < text.len() {
            segments.push(Segment::Plain(&text[cursor..]));
        }
        segments
    }
}
