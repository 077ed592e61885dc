//! Command-line flags for the `opticron` binary.

use crate::config::{
    ScrapeConfig, DEFAULT_BASE_NAME, DEFAULT_ENTRY_CAP, DEFAULT_LOG_FILE,
    DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_PANEL_TIMEOUT_MS, DEFAULT_UI_TIMEOUT_MS, DEFAULT_URL,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "opticron",
    version,
    about = "Scrape dealers and events from the Opticron map widget"
)]
pub struct Cli {
    /// Page hosting the map widget.
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Maximum entries visited per category.
    #[arg(long, default_value_t = DEFAULT_ENTRY_CAP)]
    pub entry_cap: usize,

    /// Directory receiving the per-category output folders.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// File stem of every output file.
    #[arg(long, default_value = DEFAULT_BASE_NAME)]
    pub base_name: String,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Show the browser window.
    #[arg(long)]
    pub headed: bool,

    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    pub height: u32,

    /// Fixed user agent instead of a random one from the pool.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Page load timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_PAGE_LOAD_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// How long to wait for widget controls, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_UI_TIMEOUT_MS)]
    pub ui_timeout_ms: u64,

    /// How long to wait for a detail panel, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_PANEL_TIMEOUT_MS)]
    pub panel_timeout_ms: u64,
}

impl Cli {
    pub fn into_config(self) -> ScrapeConfig {
        let mut config = ScrapeConfig {
            url: self.url,
            entry_cap: self.entry_cap,
            log_file: self.log_file,
            ..ScrapeConfig::default()
        };
        config.output.root = self.output;
        config.output.base_name = self.base_name;
        config.browser.headless = !self.headed;
        config.browser.width = self.width;
        config.browser.height = self.height;
        if let Some(user_agent) = self.user_agent {
            config.browser.user_agent = user_agent;
        }
        config.waits.page_load_timeout_ms = self.timeout_ms;
        config.waits.ui_timeout = Duration::from_millis(self.ui_timeout_ms);
        config.waits.panel_timeout = Duration::from_millis(self.panel_timeout_ms);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_gives_defaults() {
        let config = Cli::try_parse_from(["opticron"]).unwrap().into_config();
        let defaults = ScrapeConfig::default();

        assert_eq!(config.url, defaults.url);
        assert_eq!(config.entry_cap, 31);
        assert!(config.browser.headless);
        assert_eq!(config.output.root, PathBuf::from("."));
        assert_eq!(config.log_file, PathBuf::from("scrape.log"));
        assert_eq!(config.waits.ui_timeout, defaults.waits.ui_timeout);
        assert_eq!(config.selectors, defaults.selectors);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "opticron",
            "--url",
            "https://dealers.example/map",
            "--entry-cap",
            "5",
            "-o",
            "out",
            "--base-name",
            "dealers",
            "--headed",
            "--user-agent",
            "TestAgent/1.0",
            "--timeout-ms",
            "1000",
            "--panel-timeout-ms",
            "200",
        ])
        .unwrap();
        let config = cli.into_config();

        assert_eq!(config.url, "https://dealers.example/map");
        assert_eq!(config.entry_cap, 5);
        assert_eq!(config.output.root, PathBuf::from("out"));
        assert_eq!(config.output.base_name, "dealers");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.user_agent, "TestAgent/1.0");
        assert_eq!(config.waits.page_load_timeout_ms, 1000);
        assert_eq!(config.waits.panel_timeout, Duration::from_millis(200));
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Cli::try_parse_from(["opticron", "--entry-cap", "many"]).is_err());
    }
}
