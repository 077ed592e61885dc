//! Run configuration with the map widget's defaults.

use crate::stealth::user_agent;
use std::path::PathBuf;
use std::time::Duration;

/// Dealers-and-events page hosting the map widget.
pub const DEFAULT_URL: &str = "https://www.opticron.co.uk/dealers-and-events";

/// Maximum entries processed per category.
pub const DEFAULT_ENTRY_CAP: usize = 31;

/// Bound on the initial page load.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 50_000;

/// Bound on waiting for a widget control to appear.
pub const DEFAULT_UI_TIMEOUT_MS: u64 = 15_000;

/// Bound on waiting for a detail panel to fill in.
pub const DEFAULT_PANEL_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 650;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 540;

/// File stem shared by every output format.
pub const DEFAULT_BASE_NAME: &str = "opticron";

pub const DEFAULT_LOG_FILE: &str = "scrape.log";

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub url: String,
    pub browser: BrowserSettings,
    pub waits: WaitSettings,
    /// Upper bound on entries processed per category.
    pub entry_cap: usize,
    pub output: OutputSettings,
    pub log_file: PathBuf,
    pub selectors: SelectorSet,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            browser: BrowserSettings::default(),
            waits: WaitSettings::default(),
            entry_cap: DEFAULT_ENTRY_CAP,
            output: OutputSettings::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            selectors: SelectorSet::default(),
        }
    }
}

/// Browser launch options.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub width: u32,
    pub height: u32,
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
            user_agent: user_agent::random_user_agent().to_string(),
        }
    }
}

/// Timeouts for the condition-based waits.
///
/// Only `page_load_timeout_ms` bounds a navigation; the rest bound polling
/// loops that check the DOM every `poll_interval`.
#[derive(Debug, Clone)]
pub struct WaitSettings {
    pub page_load_timeout_ms: u64,
    /// Waiting for widget controls (frame, expand, toggles, entry list).
    pub ui_timeout: Duration,
    /// Waiting for a detail panel to fill in.
    pub panel_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            page_load_timeout_ms: DEFAULT_PAGE_LOAD_TIMEOUT_MS,
            ui_timeout: Duration::from_millis(DEFAULT_UI_TIMEOUT_MS),
            panel_timeout: Duration::from_millis(DEFAULT_PANEL_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Where collections are written.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Directory holding the per-category folders.
    pub root: PathBuf,
    pub base_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            base_name: DEFAULT_BASE_NAME.to_string(),
        }
    }
}

/// CSS selectors of the embedded map widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    /// The embedded frame whose `src` hosts the widget.
    pub frame: String,
    /// Control that opens the legend with both category lists.
    pub expand: String,
    /// Category toggles; the first opens places, the last opens events.
    pub category_toggle: String,
    /// Clickable place entries.
    pub place_entries: String,
    /// Event list containers; entries live in the last one.
    pub event_container: String,
    /// Clickable event entries, searched within the event container.
    pub event_entries: String,
    /// Text rows of the detail panel.
    pub panel_fields: String,
    /// Accessible name of the control closing the detail panel.
    pub back_button: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            frame: "iframe".to_string(),
            expand: r#"[class="i4ewOd-pzNkMb-ornU0b-b0t70b-Bz112c"]"#.to_string(),
            category_toggle: r#"[class="HzV7m-pbTTYe-KoToPc-ornU0b"]"#.to_string(),
            place_entries: r#"[class="HzV7m-pbTTYe-ibnC6b pbTTYe-ibnC6b-d6wfac"]"#.to_string(),
            event_container: "div.HzV7m-pbTTYe-JNdkSc-PntVL".to_string(),
            event_entries: "div".to_string(),
            panel_fields: "div.qqvbed-p83tee > div.qqvbed-p83tee-lTBxed".to_string(),
            back_button: "Back".to_string(),
        }
    }
}
