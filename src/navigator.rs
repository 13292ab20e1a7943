//! Reading navigation over a sectionized document.
//!
//! The navigator owns the section list for one viewing session and answers three questions as
//! the reader scrolls: which section is currently being read, how far through the document the
//! reader is, and where to scroll to reach a given section. It never measures anything itself;
//! geometry comes from a [`Viewport`], so the same logic drives the terminal reader and the tests.

use crate::section::{Section, SectionKind};
use std::ops::RangeInclusive;

/// Smallest selectable font size.
pub const MIN_FONT_SIZE: u16 = 12;
/// Largest selectable font size.
pub const MAX_FONT_SIZE: u16 = 24;
/// Font size at the start of a session.
pub const DEFAULT_FONT_SIZE: u16 = 16;

/// Scroll geometry and scrolling for a surface that displays sections.
///
/// Units are whatever the surface uses (pixels, terminal rows) as long as they are consistent.
pub trait Viewport {
    /// Distance scrolled from the top of the content.
    fn scroll_top(&self) -> f64;
    /// Full height of the content.
    fn scroll_height(&self) -> f64;
    /// Height of the visible area.
    fn client_height(&self) -> f64;
    /// Top edge of a section's anchor relative to the top of the visible area.
    ///
    /// Returns `None` when the section is not laid out.
    fn anchor_top(&self, id: &str) -> Option<f64>;
    /// Request a scroll so that `position` is at the top of the visible area.
    fn scroll_to(&mut self, position: f64);
}

#[derive(Clone, Debug, PartialEq)]
/// Geometry constants that decide what "in view" means.
pub struct NavigatorConfig {
    /// A section is active when its anchor top falls inside this band.
    pub activation_band: RangeInclusive<f64>,
    /// Height of the fixed header that a jump must clear.
    pub header_offset: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            activation_band: 0.0..=200.0,
            header_offset: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Live navigation state for one viewing session.
pub struct NavigationState {
    /// Section currently considered in view; empty before the first scroll.
    pub active_section_id: String,
    /// Percentage scrolled, in `[0, 100]`.
    pub reading_progress: f64,
    /// Text size preference, in `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
    pub font_size: u16,
    /// Lay content out in two columns.
    pub column_mode: bool,
    /// Emphasise the active section and narrow the text.
    pub focus_mode: bool,
    /// Whether the table of contents overlay is shown.
    pub toc_open: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            active_section_id: String::new(),
            reading_progress: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            column_mode: false,
            focus_mode: false,
            toc_open: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
/// One line of the table of contents.
pub struct TocEntry<'a> {
    /// Section id to jump to.
    pub id: &'a str,
    /// Label to display.
    pub title: &'a str,
    /// Headers render as group titles, articles indented.
    pub kind: SectionKind,
    /// Whether this is the section being read.
    pub active: bool,
}

#[must_use]
/// Percentage of the scrollable distance already covered, clamped to `[0, 100]`.
///
/// Content that fits entirely in the visible area has nothing to scroll and reports `0`.
pub fn reading_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

#[must_use]
/// Clamp a font size change to the allowed range.
pub fn clamp_font_size(current: u16, delta: i32) -> u16 {
    let next = (i32::from(current) + delta).clamp(i32::from(MIN_FONT_SIZE), i32::from(MAX_FONT_SIZE));
    u16::try_from(next).unwrap_or(DEFAULT_FONT_SIZE)
}

/// Bridges the static section list and a scrollable surface.
pub struct ReadingNavigator {
    sections: Vec<Section>,
    config: NavigatorConfig,
    state: NavigationState,
}

impl ReadingNavigator {
    #[must_use]
    /// Start a viewing session over `sections`.
    pub fn new(sections: Vec<Section>, config: NavigatorConfig) -> Self {
        Self {
            sections,
            config,
            state: NavigationState::default(),
        }
    }

    #[must_use]
    /// Sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// Current navigation state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    #[must_use]
    /// Geometry constants in use.
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Replace the document. Display preferences survive; position does not.
    pub fn replace_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        self.state.active_section_id.clear();
        self.state.reading_progress = 0.0;
    }

    /// Recompute progress and the active section from the latest geometry.
    ///
    /// The first section (in document order) whose anchor lies inside the activation band wins.
    /// When none does, the previous active section is kept. Sections that are not laid out are
    /// skipped.
    pub fn on_scroll(&mut self, viewport: &impl Viewport) {
        self.state.reading_progress = reading_progress(
            viewport.scroll_top(),
            viewport.scroll_height(),
            viewport.client_height(),
        );

        let band = &self.config.activation_band;
        let current = self.sections.iter().find(|section| {
            viewport
                .anchor_top(&section.id)
                .is_some_and(|top| band.contains(&top))
        });

        if let Some(section) = current {
            if section.id != self.state.active_section_id {
                tracing::debug!(id = %section.id, "active section changed");
                self.state.active_section_id.clone_from(&section.id);
            }
        }
    }

    /// Scroll so that the section's anchor sits just below the fixed header.
    ///
    /// The table of contents overlay is closed whether or not the anchor exists.
    pub fn scroll_to_section(&mut self, id: &str, viewport: &mut impl Viewport) {
        if let Some(top) = viewport.anchor_top(id) {
            let position = top + viewport.scroll_top() - self.config.header_offset;
            viewport.scroll_to(position.max(0.0));
        } else {
            tracing::debug!(id, "jump target not laid out");
        }
        self.state.toc_open = false;
    }

    /// Mark `id` as the section being read, overriding the activation band.
    ///
    /// Used after a jump whose target is on screen but could not be scrolled into the band
    /// because the content ends first. Unknown ids are ignored.
    pub fn activate(&mut self, id: &str) -> bool {
        if !self.sections.iter().any(|s| s.id == id) {
            return false;
        }
        if self.state.active_section_id != id {
            tracing::debug!(id, "active section set by jump");
            id.clone_into(&mut self.state.active_section_id);
        }
        true
    }

    /// Change the font size by `delta`, clamped to the allowed range.
    pub fn adjust_font_size(&mut self, delta: i32) -> u16 {
        self.state.font_size = clamp_font_size(self.state.font_size, delta);
        self.state.font_size
    }

    /// Show or hide the table of contents.
    pub fn toggle_toc(&mut self) {
        self.state.toc_open = !self.state.toc_open;
    }

    /// Switch between one and two columns.
    pub fn toggle_columns(&mut self) {
        self.state.column_mode = !self.state.column_mode;
    }

    /// Switch focus mode.
    pub fn toggle_focus(&mut self) {
        self.state.focus_mode = !self.state.focus_mode;
    }

    #[must_use]
    /// Table of contents in document order, flagging the active section.
    pub fn toc(&self) -> Vec<TocEntry<'_>> {
        self.sections
            .iter()
            .map(|section| TocEntry {
                id: &section.id,
                title: &section.title,
                kind: section.kind,
                active: section.id == self.state.active_section_id,
            })
            .collect()
    }

    #[must_use]
    /// Section currently being read, if any.
    pub fn active_section(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.id == self.state.active_section_id)
    }

    #[must_use]
    /// Whether the active section is an article rather than a header or intro.
    pub fn active_is_article(&self) -> bool {
        self.active_section()
            .is_some_and(|s| s.kind == SectionKind::Article)
    }

    #[must_use]
    /// Section following `id` in document order.
    pub fn next_section(&self, id: &str) -> Option<&Section> {
        let index = self.sections.iter().position(|s| s.id == id)?;
        self.sections.get(index + 1)
    }

    #[must_use]
    /// Section preceding `id` in document order.
    pub fn previous_section(&self, id: &str) -> Option<&Section> {
        let index = self.sections.iter().position(|s| s.id == id)?;
        index.checked_sub(1).and_then(|i| self.sections.get(i))
    }
}

#[cfg(test)]
#[path = "tests/navigator.rs"]
mod tests;
