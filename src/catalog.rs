//! Curated key articles shipped with the binary.
//!
//! The catalog pairs selected constitutional articles with a plain-language explanation and a
//! practical example, and carries the glossary, filter labels and suggested chat questions that
//! the browsing view offers.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EMBEDDED: &str = include_str!("../assets/catalog.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One curated article with its explanations.
pub struct Article {
    /// Stable identifier used for saving; not necessarily unique across records.
    pub id: String,
    /// Display label, e.g. `Artículo 14 bis`.
    pub article: String,
    /// Thematic category.
    pub category: String,
    /// Official text (possibly abridged).
    pub text: String,
    /// What the article means, in plain words.
    pub explanation: String,
    /// How it applies in everyday life.
    pub application: String,
    /// Extra search terms.
    pub keywords: Vec<String>,
    /// Life situations the article is relevant to.
    pub life_situations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A canned question offered before the first chat message.
pub struct SuggestedQuestion {
    /// Topic the question belongs to.
    pub category: String,
    /// Question text, sent verbatim.
    pub question: String,
    /// Decorative prefix.
    pub emoji: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Everything the browsing view needs besides the full text.
pub struct Catalog {
    /// Curated articles in display order.
    pub articles: Vec<Article>,
    /// Lower-case term to definition.
    pub glossary: BTreeMap<String, String>,
    /// Category filter labels; the first one means "all".
    pub categories: Vec<String>,
    /// Life situation filter labels with emoji prefixes; the first one means "all".
    pub life_situations: Vec<String>,
    /// Questions suggested in an empty conversation.
    pub suggested_questions: Vec<SuggestedQuestion>,
}

impl Catalog {
    /// Load the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON does not match the catalog schema.
    pub fn embedded() -> Result<Self> {
        Ok(serde_json::from_str(EMBEDDED)?)
    }

    /// Records carrying `id`.
    pub fn articles_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Article> + 'a {
        self.articles.iter().filter(move |a| a.id == id)
    }
}
