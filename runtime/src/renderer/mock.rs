//! Scripted stand-in for the map widget, used by engine tests.
//!
//! Panel rows are labelled `"<category><entry> row<n>"` so tests can tell
//! which entry a value came from.

use super::{ElementPath, NavigationResult, Nth, RenderContext};
use crate::config::SelectorSet;
use crate::records::Category;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const LANDING_URL: &str = "https://dealers.example/dealers-and-events";
pub const FRAME_SRC: &str = "/maps/d/embed?mid=test";
pub const FRAME_URL: &str = "https://dealers.example/maps/d/embed?mid=test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Blank,
    Landing,
    Frame,
    Legend,
    List(Category),
    Panel(Category, usize),
}

pub struct MockWidget {
    pub selectors: SelectorSet,
    pub frame_src: Option<String>,
    pub expand_present: bool,
    pub fail_landing: bool,
    pub back_fails_for: Option<Category>,
    /// Reveal panel rows gradually, this many per poll.
    pub reveal_rows_per_poll: Option<usize>,
    /// Re-render an opened list gradually, this many entries per poll.
    /// Entries not yet rendered cannot be clicked.
    pub reveal_entries_per_poll: Option<usize>,
    pub navigations: Vec<String>,
    pub clicked: Vec<String>,
    pub back_clicks: usize,
    pub closed: Arc<AtomicBool>,
    places: Vec<Vec<String>>,
    events: Vec<Vec<String>>,
    revealed: AtomicUsize,
    entries_shown: AtomicUsize,
    url: String,
    view: View,
}

impl MockWidget {
    pub fn new(places: Vec<Vec<String>>, events: Vec<Vec<String>>) -> Self {
        let label = |prefix: &str, entries: Vec<Vec<String>>| -> Vec<Vec<String>> {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, rows)| rows.into_iter().map(|r| format!("{prefix}{i} {r}")).collect())
                .collect()
        };
        Self {
            selectors: SelectorSet::default(),
            frame_src: Some(FRAME_SRC.to_string()),
            expand_present: true,
            fail_landing: false,
            back_fails_for: None,
            reveal_rows_per_poll: None,
            reveal_entries_per_poll: None,
            navigations: Vec::new(),
            clicked: Vec::new(),
            back_clicks: 0,
            closed: Arc::new(AtomicBool::new(false)),
            places: label("place", places),
            events: label("event", events),
            revealed: AtomicUsize::new(0),
            entries_shown: AtomicUsize::new(0),
            url: "about:blank".to_string(),
            view: View::Blank,
        }
    }

    pub fn place_rows(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row{i}")).collect()
    }

    pub fn event_rows(n: usize) -> Vec<String> {
        Self::place_rows(n)
    }

    pub async fn open_landing(&mut self) {
        let _ = self.navigate(LANDING_URL, 1_000).await;
    }

    pub fn open_place_panel(&mut self, index: usize) {
        self.view = View::Panel(Category::Place, index);
        self.revealed.store(0, Ordering::SeqCst);
    }

    fn entries(&self, category: Category) -> &[Vec<String>] {
        match category {
            Category::Place => &self.places,
            Category::Event => &self.events,
        }
    }

    fn panel_rows(&self) -> &[String] {
        match self.view {
            View::Panel(category, i) => {
                let rows = &self.entries(category)[i];
                let shown = self.revealed.load(Ordering::SeqCst).min(rows.len());
                match self.reveal_rows_per_poll {
                    Some(_) => &rows[..shown],
                    None => rows,
                }
            }
            _ => &[],
        }
    }

    /// Entries of an open list rendered so far.
    fn visible_entries(&self, category: Category) -> usize {
        let total = self.entries(category).len();
        match self.reveal_entries_per_poll {
            Some(_) => self.entries_shown.load(Ordering::SeqCst).min(total),
            None => total,
        }
    }

    /// One poll of an open list: render a few more entries, report the count.
    fn poll_entries(&self, category: Category) -> usize {
        if let Some(step) = self.reveal_entries_per_poll {
            self.entries_shown.fetch_add(step, Ordering::SeqCst);
        }
        self.visible_entries(category)
    }

    fn legend_visible(&self) -> bool {
        matches!(self.view, View::Legend | View::List(_) | View::Panel(..))
    }

    fn event_container(&self) -> ElementPath {
        ElementPath::root(self.selectors.event_container.clone(), Nth::Last)
    }
}

#[async_trait]
impl RenderContext for MockWidget {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.navigations.push(url.to_string());
        self.view = match url {
            LANDING_URL if self.fail_landing => bail!("net::ERR_TIMED_OUT"),
            LANDING_URL => View::Landing,
            FRAME_URL if self.frame_src.is_some() => View::Frame,
            _ => bail!("unreachable: {url}"),
        };
        self.url = url.to_string();
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn count(&self, scope: Option<&ElementPath>, selector: &str) -> Result<usize> {
        let s = &self.selectors;
        if let Some(path) = scope {
            if *path != self.event_container() || self.view != View::List(Category::Event) {
                bail!("scope {path} not found");
            }
            return Ok(if selector == s.event_entries {
                self.poll_entries(Category::Event)
            } else {
                0
            });
        }

        let n = if selector == s.frame {
            usize::from(self.view == View::Landing && self.frame_src.is_some())
        } else if selector == s.expand {
            usize::from(self.expand_present && !matches!(self.view, View::Blank | View::Landing))
        } else if selector == s.category_toggle {
            if self.legend_visible() {
                2
            } else {
                0
            }
        } else if selector == s.place_entries {
            if self.view == View::List(Category::Place) {
                self.poll_entries(Category::Place)
            } else {
                0
            }
        } else if selector == s.event_container {
            usize::from(self.view == View::List(Category::Event))
        } else if selector == s.panel_fields {
            if let Some(step) = self.reveal_rows_per_poll {
                self.revealed.fetch_add(step, Ordering::SeqCst);
            }
            self.panel_rows().len()
        } else {
            0
        };
        Ok(n)
    }

    async fn click(&mut self, path: &ElementPath) -> Result<()> {
        let s = self.selectors.clone();
        let steps = path.steps();
        let first = &steps[0];

        if steps.len() == 1 && first.selector == s.expand && self.expand_present {
            self.view = View::Legend;
        } else if steps.len() == 1 && first.selector == s.category_toggle && self.legend_visible() {
            self.view = match first.nth {
                Nth::Last => View::List(Category::Event),
                _ => View::List(Category::Place),
            };
            self.entries_shown.store(0, Ordering::SeqCst);
        } else if steps.len() == 1 && first.selector == s.place_entries {
            match (self.view, first.nth) {
                (View::List(Category::Place), Nth::Index(i))
                    if i < self.visible_entries(Category::Place) =>
                {
                    self.clicked.push(format!("place#{i}"));
                    self.view = View::Panel(Category::Place, i);
                }
                _ => bail!("no element at {path}"),
            }
        } else if steps.len() == 2 && *path == self.event_container().child(s.event_entries.clone(), steps[1].nth) {
            match (self.view, steps[1].nth) {
                (View::List(Category::Event), Nth::Index(i))
                    if i < self.visible_entries(Category::Event) =>
                {
                    self.clicked.push(format!("event#{i}"));
                    self.view = View::Panel(Category::Event, i);
                }
                _ => bail!("no element at {path}"),
            }
        } else {
            bail!("no element at {path}");
        }
        self.revealed.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn inner_text(&self, path: &ElementPath) -> Result<Option<String>> {
        match path.steps() {
            [step] if step.selector == self.selectors.panel_fields => {
                let rows = self.panel_rows();
                match step.nth.resolve(rows.len()) {
                    Some(i) => Ok(Some(rows[i].clone())),
                    None => bail!("no element at {path}"),
                }
            }
            _ => bail!("no element at {path}"),
        }
    }

    async fn attribute(&self, path: &ElementPath, name: &str) -> Result<Option<String>> {
        let steps = path.steps();
        if self.view == View::Landing
            && steps.len() == 1
            && steps[0].selector == self.selectors.frame
            && name == "src"
        {
            return Ok(self.frame_src.clone());
        }
        bail!("no element at {path}")
    }

    async fn click_button(&mut self, name: &str) -> Result<()> {
        match self.view {
            View::Panel(category, _)
                if name == self.selectors.back_button && self.back_fails_for != Some(category) =>
            {
                self.back_clicks += 1;
                self.view = View::List(category);
                self.entries_shown.store(0, Ordering::SeqCst);
                Ok(())
            }
            _ => bail!("no button named {name:?}"),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Renderer handing out one prepared [`MockWidget`].
pub struct MockRenderer {
    widget: std::sync::Mutex<Option<MockWidget>>,
    pub shut_down: AtomicBool,
}

impl MockRenderer {
    pub fn new(widget: MockWidget) -> Self {
        Self {
            widget: std::sync::Mutex::new(Some(widget)),
            shut_down: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl super::Renderer for MockRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let widget = self
            .widget
            .lock()
            .map_err(|_| anyhow::anyhow!("mock renderer poisoned"))?
            .take();
        match widget {
            Some(widget) => Ok(Box::new(widget)),
            None => bail!("context already taken"),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}
