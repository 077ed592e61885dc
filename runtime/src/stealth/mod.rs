//! Measures that make the automated browser look like a regular visitor.

pub mod user_agent;
