//! Chromium backend over the DevTools protocol.

use super::{ElementPath, NavigationResult, RenderContext, Renderer};
use crate::config::BrowserSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Selector for everything that can carry a button role.
const BUTTON_SELECTOR: &str = r#"button, [role="button"]"#;

/// A launched Chromium process.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumRenderer {
    /// Launch Chromium with the given window, viewport and user agent.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let viewport = Viewport {
            width: settings.width,
            height: settings.height,
            ..Default::default()
        };

        let mut builder = BrowserConfig::builder()
            .window_size(settings.width, settings.height)
            .viewport(viewport)
            .arg(format!("--user-agent={}", settings.user_agent));
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser config: {e}"))?;

        info!(
            headless = settings.headless,
            width = settings.width,
            height = settings.height,
            "launching Chromium"
        );
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // The handler must be polled for any CDP command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler_task: Mutex::new(Some(handler_task)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to open a browser tab")?;
        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await.context("failed to close Chromium")?;
        if let Err(e) = browser.wait().await {
            debug!("waiting for the browser process failed: {e}");
        }

        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
        info!("Chromium stopped");
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

impl ChromiumContext {
    async fn find_all(&self, scope: Option<&Element>, selector: &str) -> Result<Vec<Element>> {
        let found = match scope {
            Some(parent) => parent.find_elements(selector).await,
            None => self.page.find_elements(selector).await,
        };
        found.with_context(|| format!("querying {selector}"))
    }

    async fn resolve(&self, path: &ElementPath) -> Result<Element> {
        let mut current: Option<Element> = None;
        for step in path.steps() {
            let matches = self.find_all(current.as_ref(), &step.selector).await?;
            let len = matches.len();
            let index = step.nth.resolve(len).ok_or_else(|| {
                anyhow!("no {} match for {} ({len} found)", step.nth, step.selector)
            })?;
            current = matches.into_iter().nth(index);
        }
        current.ok_or_else(|| anyhow!("empty element path"))
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();
        tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await
            .map_err(|_| anyhow!("navigation to {url} timed out after {timeout_ms} ms"))?
            .with_context(|| format!("failed to navigate to {url}"))?;

        let final_url = self
            .page
            .url()
            .await?
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn get_url(&self) -> Result<String> {
        self.page
            .url()
            .await?
            .ok_or_else(|| anyhow!("page has no URL"))
    }

    async fn count(&self, scope: Option<&ElementPath>, selector: &str) -> Result<usize> {
        let parent = match scope {
            Some(path) => Some(self.resolve(path).await?),
            None => None,
        };
        Ok(self.find_all(parent.as_ref(), selector).await?.len())
    }

    async fn click(&mut self, path: &ElementPath) -> Result<()> {
        let element = self.resolve(path).await?;
        element
            .click()
            .await
            .with_context(|| format!("failed to click {path}"))?;
        Ok(())
    }

    async fn inner_text(&self, path: &ElementPath) -> Result<Option<String>> {
        let element = self.resolve(path).await?;
        Ok(element.inner_text().await?)
    }

    async fn attribute(&self, path: &ElementPath, name: &str) -> Result<Option<String>> {
        let element = self.resolve(path).await?;
        Ok(element.attribute(name).await?)
    }

    async fn click_button(&mut self, name: &str) -> Result<()> {
        let mut labels = Vec::new();
        for element in self.find_all(None, BUTTON_SELECTOR).await? {
            let label = match element.attribute("aria-label").await? {
                Some(label) => label,
                None => element.inner_text().await?.unwrap_or_default(),
            };
            labels.push((element, label));
        }

        let index = match_button(labels.iter().map(|(_, label)| label.as_str()), name)
            .ok_or_else(|| anyhow!("no button named {name:?}"))?;
        let (element, label) = labels.swap_remove(index);
        debug!("clicking button {label:?}");
        element
            .click()
            .await
            .with_context(|| format!("failed to click button {name:?}"))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("failed to close tab")?;
        Ok(())
    }
}

/// Index of the button an accessible-name lookup resolves to: an exact
/// case-insensitive match first, otherwise the first label containing
/// `name`, ignoring case.
fn match_button<'a>(labels: impl Iterator<Item = &'a str> + Clone, name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    let normalized = labels.map(|label| label.trim().to_lowercase());
    normalized
        .clone()
        .position(|label| label == wanted)
        .or_else(|| normalized.clone().position(|label| label.contains(&wanted)))
}
