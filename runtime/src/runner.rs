//! One complete scrape: browser up, widget walked, collections saved,
//! browser down.

use crate::config::ScrapeConfig;
use crate::extraction::{CategoryStats, Engine};
use crate::renderer::{ChromiumRenderer, Renderer};
use crate::session::Session;
use crate::store::{PersistReport, StoreSink};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// What a finished run did.
#[derive(Debug)]
pub struct RunSummary {
    pub stats: Vec<CategoryStats>,
    /// One report per collection handed to the store.
    pub reports: Vec<PersistReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether every sink of every collection succeeded.
    pub fn fully_persisted(&self) -> bool {
        self.reports.iter().all(PersistReport::is_complete)
    }
}

/// Launch Chromium and scrape with it.
pub async fn run(config: &ScrapeConfig) -> Result<RunSummary> {
    let started = Instant::now();
    let renderer = ChromiumRenderer::launch(&config.browser)
        .await
        .context("failed to launch Chromium")?;

    let result = run_with(&renderer, config).await;
    if let Err(e) = renderer.shutdown().await {
        warn!("browser shutdown failed: {e:#}");
    }

    info!(
        "Execution time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );
    result
}

/// Scrape with an already running renderer. The session is closed on every
/// path; the renderer is left to the caller.
pub async fn run_with(renderer: &dyn Renderer, config: &ScrapeConfig) -> Result<RunSummary> {
    let started = Instant::now();
    let mut session = Session::open(renderer).await?;
    let engine = Engine::new(config);
    let mut sink = StoreSink::default();

    let extracted = engine
        .extract_into(session.context_mut(), &config.url, &mut sink)
        .await;
    if let Err(e) = session.close().await {
        warn!("failed to close browser context: {e:#}");
    }
    let stats = extracted.context("scrape aborted")?;

    let summary = RunSummary {
        stats,
        reports: sink.reports,
        elapsed: started.elapsed(),
    };
    if !summary.fully_persisted() {
        warn!("some outputs were not written; see earlier warnings");
    }
    Ok(summary)
}
