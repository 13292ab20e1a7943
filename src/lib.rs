//! carta: read, search and ask questions about the Argentine constitution.
//!
//! The library splits a constitution text into navigable sections, tracks reading position
//! over any scrollable surface, filters a curated catalog of key articles, persists reader
//! preferences, and relays grounded questions to a chat completions service. The `carta` binary
//! wires these into a terminal interface.
#![allow(clippy::multiple_crate_versions)]

pub mod app_state;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod filter;
pub mod glossary;
pub mod logging;
pub mod navigator;
pub mod preferences;
pub mod reader;
pub mod section;
pub mod sectionizer;
pub mod share;
pub mod ui;
