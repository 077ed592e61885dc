//! Error kinds, split by how far they propagate.

use crate::records::Category;
use std::path::PathBuf;
use thiserror::Error;

/// The widget could not be reached or driven. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("page {url} failed to load")]
    PageLoad {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no embedded frame with a src attribute matching {selector}")]
    FrameNotFound { selector: String },

    #[error("frame src {src:?} is not a valid URL relative to {base}")]
    BadFrameUrl {
        src: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{what} ({selector}) did not appear within {waited_ms} ms")]
    Timeout {
        what: &'static str,
        selector: String,
        waited_ms: u128,
    },

    #[error("failed to {action}")]
    Interaction {
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A detail panel lacked a required field. Skips that entry only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{category} panel has {found} values, needs at least {required}")]
    MissingRequired {
        category: Category,
        found: usize,
        required: usize,
    },
}

/// A record did not fit its collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("cannot add a {found} record to a {expected} collection")]
    CategoryMismatch { expected: Category, found: Category },
}

/// One persistence sink failed. Logged, never propagated to the engine.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} does not hold an array of row objects", path.display())]
    JsonShape { path: PathBuf },

    #[error("CSV error on {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("spreadsheet error on {}", path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("database error on {}", path.display())]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{sink} sink does not support the {policy:?} merge policy")]
    UnsupportedPolicy {
        sink: &'static str,
        policy: crate::store::MergePolicy,
    },
}
