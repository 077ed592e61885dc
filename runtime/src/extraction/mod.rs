//! Extraction engine for the embedded map widget.
//!
//! [`engine`] walks the widget, [`mapping`] turns panel rows into records,
//! and [`wait`] holds the polling waits used between clicks.

pub mod engine;
pub mod mapping;
pub mod wait;

pub use engine::{CategoryStats, CollectingSink, CollectionSink, Engine, Harvest};
