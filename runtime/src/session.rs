//! The browser session a run works in.
//!
//! A run opens exactly one context and must release it whether extraction
//! succeeds or not; [`Session::close`] consumes the session so it can only
//! happen once.

use crate::renderer::{RenderContext, Renderer};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// A browser context plus the time it was opened.
pub struct Session {
    context: Box<dyn RenderContext>,
    created_at: Instant,
}

impl Session {
    pub fn new(context: Box<dyn RenderContext>) -> Self {
        Self {
            context,
            created_at: Instant::now(),
        }
    }

    /// Ask the renderer for a fresh context.
    pub async fn open(renderer: &dyn Renderer) -> Result<Self> {
        let context = renderer
            .new_context()
            .await
            .context("failed to open browser context")?;
        debug!("browser context opened");
        Ok(Self::new(context))
    }

    pub fn context_mut(&mut self) -> &mut dyn RenderContext {
        self.context.as_mut()
    }

    /// How long the session has been alive.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Release the browser context.
    pub async fn close(self) -> Result<()> {
        let age = self.age();
        self.context.close().await?;
        debug!(age_ms = age.as_millis() as u64, "browser context closed");
        Ok(())
    }
}
