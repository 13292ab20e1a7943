//! Shareable summaries of curated articles.
//!
//! A share is a short message (article label, explanation, everyday application) wrapped in a
//! WhatsApp click-to-chat link, so it can be pasted into a browser or a phone.

use crate::catalog::Article;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Click-to-chat endpoint; the message goes in the `text` query parameter.
pub const SHARE_BASE_URL: &str = "https://wa.me/?text=";

/// Characters left unescaped in a URI component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[must_use]
/// Message text for sharing `article`.
pub fn share_message(article: &Article) -> String {
    format!(
        "🏛️ *Constitución Ciudadana*\n\n📌 *{}:* {}\n\n💡 *En la vida diaria:* {}\n\n👉 ¡Conocé tus derechos!",
        article.article, article.explanation, article.application
    )
}

#[must_use]
/// Click-to-chat link carrying [`share_message`] for `article`.
pub fn share_url(article: &Article) -> String {
    let message = share_message(article);
    format!(
        "{SHARE_BASE_URL}{}",
        utf8_percent_encode(&message, COMPONENT)
    )
}

#[cfg(test)]
#[path = "tests/share.rs"]
mod tests;
