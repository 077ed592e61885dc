//! The map-widget state machine.
//!
//! landing page → embedded frame → legend → category list → detail panel →
//! back to the list, once per entry, for places and then events.

use super::mapping;
use super::wait::{wait_for_count, wait_for_selector, wait_for_stable_count};
use crate::config::{OutputSettings, ScrapeConfig, SelectorSet, WaitSettings};
use crate::error::{FieldError, NavigationError};
use crate::records::{Category, Destination, Record, RecordCollection};
use crate::renderer::{ElementPath, Nth, RenderContext};
use tracing::{debug, info, info_span, warn, Instrument};

/// Receives each category's records once that category is done.
pub trait CollectionSink {
    fn accept(&mut self, collection: RecordCollection);
}

/// Keeps collections in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub collections: Vec<RecordCollection>,
}

impl CollectionSink for CollectingSink {
    fn accept(&mut self, collection: RecordCollection) {
        self.collections.push(collection);
    }
}

/// Both categories' records from one run.
#[derive(Debug)]
pub struct Harvest {
    pub places: RecordCollection,
    pub events: RecordCollection,
}

/// Per-category counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: Category,
    /// Entries shown in the list.
    pub listed: usize,
    /// Entries clicked (never above the cap).
    pub visited: usize,
    pub collected: usize,
    /// Entries dropped for missing required fields.
    pub skipped: usize,
}

/// Where a category's entries live in the DOM.
struct EntryList {
    container: Option<ElementPath>,
    item: String,
}

impl EntryList {
    fn entry(&self, index: usize) -> ElementPath {
        match &self.container {
            Some(container) => container.clone().child(self.item.clone(), Nth::Index(index)),
            None => ElementPath::root(self.item.clone(), Nth::Index(index)),
        }
    }

    /// Wait for the list container, if any. `false` when it never appeared.
    async fn container_ready(&self, engine: &Engine, ctx: &dyn RenderContext) -> bool {
        let Some(container) = &self.container else {
            return true;
        };
        let Some(step) = container.steps().first() else {
            return false;
        };
        let waits = &engine.waits;
        wait_for_count(ctx, None, &step.selector, 1, waits.ui_timeout, waits.poll_interval).await
            > 0
    }

    /// Count entries once the list has finished rendering: at least one
    /// entry and the same count on two consecutive polls.
    async fn settled_len(&self, engine: &Engine, ctx: &dyn RenderContext) -> usize {
        if !self.container_ready(engine, ctx).await {
            return 0;
        }
        let waits = &engine.waits;
        wait_for_stable_count(
            ctx,
            self.container.as_ref(),
            &self.item,
            1,
            waits.ui_timeout,
            waits.poll_interval,
        )
        .await
    }

    /// Wait until at least `min` entries are rendered. Returns the last count.
    async fn wait_for_len(&self, engine: &Engine, ctx: &dyn RenderContext, min: usize) -> usize {
        if !self.container_ready(engine, ctx).await {
            return 0;
        }
        let waits = &engine.waits;
        wait_for_count(
            ctx,
            self.container.as_ref(),
            &self.item,
            min,
            waits.ui_timeout,
            waits.poll_interval,
        )
        .await
    }
}

/// Drives one browser context through the widget.
pub struct Engine {
    selectors: SelectorSet,
    waits: WaitSettings,
    entry_cap: usize,
    output: OutputSettings,
}

impl Engine {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            selectors: config.selectors.clone(),
            waits: config.waits.clone(),
            entry_cap: config.entry_cap,
            output: config.output.clone(),
        }
    }

    /// Scrape both categories and return them together.
    pub async fn extract(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
    ) -> Result<Harvest, NavigationError> {
        let mut sink = CollectingSink::default();
        self.extract_into(ctx, url, &mut sink).await?;

        let mut places = None;
        let mut events = None;
        for collection in sink.collections {
            match collection.category() {
                Category::Place => places = Some(collection),
                Category::Event => events = Some(collection),
            }
        }
        Ok(Harvest {
            places: places.unwrap_or_else(|| self.empty_collection(Category::Place)),
            events: events.unwrap_or_else(|| self.empty_collection(Category::Event)),
        })
    }

    /// Scrape both categories, handing each collection to `sink` as soon as
    /// its category finishes, so a later failure cannot lose earlier records.
    pub async fn extract_into(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
        sink: &mut dyn CollectionSink,
    ) -> Result<Vec<CategoryStats>, NavigationError> {
        self.open_widget(ctx, url).await?;

        let mut stats = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let span = info_span!("category", %category);
            let (collection, category_stats) =
                self.extract_category(ctx, category).instrument(span).await?;
            info!(
                %category,
                listed = category_stats.listed,
                collected = category_stats.collected,
                skipped = category_stats.skipped,
                "category complete"
            );
            sink.accept(collection);
            stats.push(category_stats);
        }
        Ok(stats)
    }

    /// Load the page, enter the frame, open the legend.
    async fn open_widget(&self, ctx: &mut dyn RenderContext, url: &str) -> Result<(), NavigationError> {
        info!("opening {url}");
        let nav = ctx
            .navigate(url, self.waits.page_load_timeout_ms)
            .await
            .map_err(|source| NavigationError::PageLoad {
                url: url.to_string(),
                source,
            })?;
        debug!(load_time_ms = nav.load_time_ms, "page loaded");

        info!("navigating to map");
        let page_url = match ctx.get_url().await {
            Ok(current) => current,
            Err(e) => {
                debug!("current URL unavailable, using the load result: {e}");
                nav.final_url
            }
        };
        let frame_url = self.frame_url(ctx, &page_url).await?;
        debug!("frame source {frame_url}");
        ctx.navigate(&frame_url, self.waits.page_load_timeout_ms)
            .await
            .map_err(|source| NavigationError::PageLoad {
                url: frame_url.clone(),
                source,
            })?;

        let expand = &self.selectors.expand;
        wait_for_selector(
            ctx,
            "expand control",
            expand,
            self.waits.ui_timeout,
            self.waits.poll_interval,
        )
        .await?;
        ctx.click(&ElementPath::root(expand.clone(), Nth::First))
            .await
            .map_err(|source| NavigationError::Interaction {
                action: "open the map legend".to_string(),
                source,
            })?;

        debug!("map legend open");
        Ok(())
    }

    /// Absolute URL of the first embedded frame.
    async fn frame_url(&self, ctx: &dyn RenderContext, base: &str) -> Result<String, NavigationError> {
        let selector = &self.selectors.frame;
        let not_found = || NavigationError::FrameNotFound {
            selector: selector.clone(),
        };

        wait_for_count(
            ctx,
            None,
            selector,
            1,
            self.waits.ui_timeout,
            self.waits.poll_interval,
        )
        .await;
        let src = ctx
            .attribute(&ElementPath::root(selector.clone(), Nth::First), "src")
            .await
            .ok()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(not_found)?;

        let base_url = url::Url::parse(base).map_err(|source| NavigationError::BadFrameUrl {
            src: src.clone(),
            base: base.to_string(),
            source,
        })?;
        let resolved = base_url
            .join(src.trim())
            .map_err(|source| NavigationError::BadFrameUrl {
                src: src.clone(),
                base: base.to_string(),
                source,
            })?;
        Ok(resolved.into())
    }

    fn empty_collection(&self, category: Category) -> RecordCollection {
        RecordCollection::new(
            category,
            Destination::for_category(&self.output.root, &self.output.base_name, category),
        )
    }

    fn entry_list(&self, category: Category) -> EntryList {
        match category {
            Category::Place => EntryList {
                container: None,
                item: self.selectors.place_entries.clone(),
            },
            Category::Event => EntryList {
                container: Some(ElementPath::root(
                    self.selectors.event_container.clone(),
                    Nth::Last,
                )),
                item: self.selectors.event_entries.clone(),
            },
        }
    }

    fn toggle(&self, category: Category) -> ElementPath {
        let nth = match category {
            Category::Place => Nth::First,
            Category::Event => Nth::Last,
        };
        ElementPath::root(self.selectors.category_toggle.clone(), nth)
    }

    async fn extract_category(
        &self,
        ctx: &mut dyn RenderContext,
        category: Category,
    ) -> Result<(RecordCollection, CategoryStats), NavigationError> {
        let mut collection = self.empty_collection(category);

        wait_for_selector(
            ctx,
            "category toggle",
            &self.selectors.category_toggle,
            self.waits.ui_timeout,
            self.waits.poll_interval,
        )
        .await?;
        ctx.click(&self.toggle(category))
            .await
            .map_err(|source| NavigationError::Interaction {
                action: format!("open the {category} list"),
                source,
            })?;

        let list = self.entry_list(category);
        let listed = list.settled_len(self, ctx).await;
        let visited = listed.min(self.entry_cap);
        if listed > visited {
            info!("{listed} entries listed, processing the first {visited}");
        } else {
            info!("{listed} entries listed");
        }

        let mut skipped = 0;
        for index in 0..visited {
            let entry = list.entry(index);
            // The next entry must be back on screen before it is clicked.
            let needed = (index + 2).min(visited);
            match self.process_entry(ctx, category, &list, &entry, needed).await? {
                Ok(record) => {
                    debug!(index, ?record, "record extracted");
                    if let Err(e) = collection.push(record) {
                        warn!(index, "dropping record: {e}");
                        skipped += 1;
                    }
                }
                Err(e) => {
                    warn!(index, "skipping entry: {e}");
                    skipped += 1;
                }
            }
        }

        let stats = CategoryStats {
            category,
            listed,
            visited,
            collected: collection.len(),
            skipped,
        };
        Ok((collection, stats))
    }

    /// Open one entry's panel, read it, and return to the list, waiting
    /// until `needed` entries are rendered again.
    ///
    /// The outer error aborts the run; the inner one only skips the entry.
    async fn process_entry(
        &self,
        ctx: &mut dyn RenderContext,
        category: Category,
        list: &EntryList,
        entry: &ElementPath,
        needed: usize,
    ) -> Result<Result<Record, FieldError>, NavigationError> {
        ctx.click(entry)
            .await
            .map_err(|source| NavigationError::Interaction {
                action: format!("open {entry}"),
                source,
            })?;

        let fields = &self.selectors.panel_fields;
        let rows = wait_for_stable_count(
            ctx,
            None,
            fields,
            category.required_fields(),
            self.waits.panel_timeout,
            self.waits.poll_interval,
        )
        .await;
        let mut values = Vec::with_capacity(rows);
        for row in 0..rows {
            let text = ctx
                .inner_text(&ElementPath::root(fields.clone(), Nth::Index(row)))
                .await
                .map_err(|source| NavigationError::Interaction {
                    action: format!("read row {row} of the detail panel of {entry}"),
                    source,
                })?;
            values.push(text.unwrap_or_default());
        }

        ctx.click_button(&self.selectors.back_button)
            .await
            .map_err(|source| NavigationError::Interaction {
                action: format!("leave the detail panel of {entry}"),
                source,
            })?;
        if list.wait_for_len(self, ctx, needed).await < needed {
            return Err(NavigationError::Timeout {
                what: "entry list",
                selector: list.item.clone(),
                waited_ms: self.waits.ui_timeout.as_millis(),
            });
        }

        Ok(mapping::map_record(category, &values))
    }
}
