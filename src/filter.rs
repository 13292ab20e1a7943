//! Search and filtering over the curated catalog.

use crate::catalog::Article;

/// Label of the pseudo-category listing saved articles.
pub const SAVED_LABEL: &str = "Mis Guardados";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Which label set the selection is drawn from.
pub enum FilterMode {
    #[default]
    /// Thematic categories.
    Category,
    /// Everyday life situations.
    Situation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The chip the user picked.
pub enum Selection {
    #[default]
    /// No restriction.
    All,
    /// A specific category or life situation label.
    Named(String),
    /// Only saved articles, regardless of mode.
    Saved,
}

impl Selection {
    #[must_use]
    /// Interpret a filter chip label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Todos" | "Todas" | "" => Self::All,
            SAVED_LABEL => Self::Saved,
            other => Self::Named(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Full filter state of the browsing view.
pub struct Filter {
    /// Free text search; empty matches everything.
    pub search: String,
    /// Label set in use.
    pub mode: FilterMode,
    /// Active chip.
    pub selection: Selection,
}

impl Filter {
    /// Switch label set. The selection resets because labels do not carry over.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.selection = Selection::All;
    }
}

#[must_use]
/// Situation labels carry an emoji prefix; the comparable part follows the first space.
pub fn situation_name(label: &str) -> &str {
    label.split_once(' ').map_or(label, |(_, rest)| rest)
}

#[must_use]
/// Case-insensitive substring match on text, label, keywords or application.
pub fn matches_search(article: &Article, term: &str) -> bool {
    let term = term.to_lowercase();
    article.text.to_lowercase().contains(&term)
        || article.article.to_lowercase().contains(&term)
        || article
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&term))
        || article.application.to_lowercase().contains(&term)
}

fn matches_selection(article: &Article, filter: &Filter, saved_ids: &[String]) -> bool {
    match (&filter.selection, filter.mode) {
        (Selection::All, _) => true,
        (Selection::Saved, _) => saved_ids.contains(&article.id),
        (Selection::Named(category), FilterMode::Category) => article.category == *category,
        (Selection::Named(label), FilterMode::Situation) => {
            let name = situation_name(label);
            article.life_situations.iter().any(|s| s == name)
        }
    }
}

#[must_use]
/// Articles passing both the search term and the selection, in catalog order.
pub fn filter_articles<'a>(
    articles: &'a [Article],
    filter: &Filter,
    saved_ids: &[String],
) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|a| matches_search(a, &filter.search))
        .filter(|a| matches_selection(a, filter, saved_ids))
        .collect()
}

#[cfg(test)]
#[path = "tests/filter.rs"]
mod tests;
