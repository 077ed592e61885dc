//! Browser rendering abstraction.
//!
//! The extraction engine only talks to a [`RenderContext`]; the concrete
//! backend (Chromium over CDP) lives in [`chromium`]. Elements are addressed
//! by [`ElementPath`] rather than live handles, so every call re-resolves the
//! element against the current DOM. The map widget rebuilds its list each time
//! the detail panel is closed, which would invalidate cached handles.

pub mod chromium;
#[cfg(test)]
pub(crate) mod mock;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

pub use chromium::ChromiumRenderer;

/// Outcome of a top-level navigation.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// URL after redirects.
    pub final_url: String,
    /// Time until the load event, in milliseconds.
    pub load_time_ms: u64,
}

/// Which match of a selector to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nth {
    First,
    Last,
    Index(usize),
}

impl Nth {
    /// Resolve against a match count. `None` when the position does not exist.
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Nth::First if len > 0 => Some(0),
            Nth::Last if len > 0 => Some(len - 1),
            Nth::Index(i) if i < len => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nth::First => write!(f, "first"),
            Nth::Last => write!(f, "last"),
            Nth::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// One hop of an [`ElementPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub selector: String,
    pub nth: Nth,
}

/// Address of an element: a chain of (selector, position) hops, each one
/// searched within the element found by the previous hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    steps: Vec<Step>,
}

impl ElementPath {
    /// A top-level element.
    pub fn root(selector: impl Into<String>, nth: Nth) -> Self {
        Self {
            steps: vec![Step {
                selector: selector.into(),
                nth,
            }],
        }
    }

    /// Descend into a match below this element.
    pub fn child(mut self, selector: impl Into<String>, nth: Nth) -> Self {
        self.steps.push(Step {
            selector: selector.into(),
            nth,
        });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{} ({})", step.selector, step.nth)?;
        }
        Ok(())
    }
}

/// A single browser tab the engine can drive.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate the page and wait for the load event, bounded by `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;

    /// Current page URL.
    async fn get_url(&self) -> Result<String>;

    /// Number of matches for `selector`, searched under `scope` when given.
    ///
    /// An unresolvable `scope` is an error, not zero.
    async fn count(&self, scope: Option<&ElementPath>, selector: &str) -> Result<usize>;

    /// Click the element at `path`.
    async fn click(&mut self, path: &ElementPath) -> Result<()>;

    /// Inner text of the element at `path`.
    async fn inner_text(&self, path: &ElementPath) -> Result<Option<String>>;

    /// Attribute value of the element at `path`.
    async fn attribute(&self, path: &ElementPath, name: &str) -> Result<Option<String>>;

    /// Click the first button whose accessible name contains `name`,
    /// ignoring case.
    async fn click_button(&mut self, name: &str) -> Result<()>;

    /// Close the tab.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Produces browser contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;

    /// Terminate the browser process.
    async fn shutdown(&self) -> Result<()>;
}
