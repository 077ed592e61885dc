//! Scraper for the dealer and event lists of an embedded map widget.
//!
//! A run drives one headless Chromium tab through the widget, turns each
//! detail panel into a typed record, and saves every category as JSON, CSV,
//! XLSX and SQLite.

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod records;
pub mod renderer;
pub mod runner;
pub mod session;
pub mod stealth;
pub mod store;
