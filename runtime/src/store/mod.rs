//! Tabular persistence into JSON, CSV, XLSX and SQLite.
//!
//! Each sink declares how it treats an existing file through a
//! [`MergePolicy`]. The defaults reproduce the export layout the scraper has
//! always produced: JSON merges, CSV appends, the workbook and the database
//! are replaced. Sinks run independently; one failing does not stop or undo
//! the others.

pub mod csv_sink;
pub mod json_sink;
pub mod sqlite_sink;
pub mod table;
pub mod xlsx_sink;

use crate::error::StoreError;
use crate::extraction::CollectionSink;
use crate::records::{Destination, RecordCollection};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use table::OutputTable;

/// What a sink does when its file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Overwrite with the current run's rows.
    Replace,
    /// Add the current rows after the existing ones without rewriting them.
    AppendRows,
    /// Read the existing table back, concatenate, rewrite the whole file.
    MergeWholeTable,
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Json,
    Csv,
    Spreadsheet,
    Database,
}

impl SinkKind {
    /// Write order.
    pub const ALL: [SinkKind; 4] = [
        SinkKind::Json,
        SinkKind::Csv,
        SinkKind::Spreadsheet,
        SinkKind::Database,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            SinkKind::Json => "json",
            SinkKind::Csv => "csv",
            SinkKind::Spreadsheet => "xlsx",
            SinkKind::Database => "db",
        }
    }

    pub fn default_policy(self) -> MergePolicy {
        match self {
            SinkKind::Json => MergePolicy::MergeWholeTable,
            SinkKind::Csv => MergePolicy::AppendRows,
            SinkKind::Spreadsheet | SinkKind::Database => MergePolicy::Replace,
        }
    }

    fn write(
        self,
        table: &OutputTable,
        path: &std::path::Path,
        policy: MergePolicy,
    ) -> Result<usize, StoreError> {
        match self {
            SinkKind::Json => json_sink::write(table, path, policy),
            SinkKind::Csv => csv_sink::write(table, path, policy),
            SinkKind::Spreadsheet => xlsx_sink::write(table, path, policy),
            SinkKind::Database => sqlite_sink::write(table, path, policy),
        }
    }
}

/// A sink paired with the policy it runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkPlan {
    pub kind: SinkKind,
    pub policy: MergePolicy,
}

/// Every sink under its default policy.
pub fn default_plan() -> Vec<SinkPlan> {
    SinkKind::ALL
        .iter()
        .map(|&kind| SinkPlan {
            kind,
            policy: kind.default_policy(),
        })
        .collect()
}

/// Result of one sink write.
#[derive(Debug)]
pub struct SinkOutcome {
    pub kind: SinkKind,
    pub path: PathBuf,
    /// Rows written by this call.
    pub result: Result<usize, StoreError>,
}

/// Result of one persist call.
#[derive(Debug)]
pub struct PersistReport {
    pub folder: Result<(), StoreError>,
    pub outcomes: Vec<SinkOutcome>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.folder.is_ok() && self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Writes collections to one destination.
pub struct PersistenceStore {
    destination: Destination,
    plan: Vec<SinkPlan>,
}

impl PersistenceStore {
    pub fn new(destination: Destination) -> Self {
        Self::with_plan(destination, default_plan())
    }

    pub fn with_plan(destination: Destination, plan: Vec<SinkPlan>) -> Self {
        Self { destination, plan }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Create the destination folder and its parents.
    pub fn ensure_folder(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.destination.folder).map_err(|source| StoreError::Io {
            path: self.destination.folder.clone(),
            source,
        })
    }

    /// Flatten the collection and run every sink in the plan.
    pub fn persist(&self, collection: &RecordCollection) -> PersistReport {
        info!(
            records = collection.len(),
            folder = %self.destination.folder.display(),
            "saving data"
        );

        let folder = self.ensure_folder();
        if let Err(e) = &folder {
            warn!("{}", error_chain(e));
        }

        let table = OutputTable::from_collection(collection);
        let mut outcomes = Vec::with_capacity(self.plan.len());
        for plan in &self.plan {
            let path = self.destination.file(plan.kind.extension());
            let result = plan.kind.write(&table, &path, plan.policy);
            match &result {
                Ok(rows) => debug!(path = %path.display(), rows, policy = ?plan.policy, "sink written"),
                Err(e) => warn!(path = %path.display(), "sink failed: {}", error_chain(e)),
            }
            outcomes.push(SinkOutcome {
                kind: plan.kind,
                path,
                result,
            });
        }

        debug!("done saving");
        PersistReport { folder, outcomes }
    }
}

/// Persists every collection it receives to that collection's destination.
#[derive(Debug, Default)]
pub struct StoreSink {
    pub reports: Vec<PersistReport>,
}

impl CollectionSink for StoreSink {
    fn accept(&mut self, collection: RecordCollection) {
        let store = PersistenceStore::new(collection.destination().clone());
        self.reports.push(store.persist(&collection));
    }
}

/// `error: cause: cause` on one line.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
