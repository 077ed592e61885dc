//! Positional mapping from detail-panel rows to record fields.
//!
//! Place panels omit the website and type rows inconsistently, so the number
//! of rows decides which optional field a trailing value belongs to:
//!
//! | rows | Web              | Type             |
//! |------|------------------|------------------|
//! | < 5  | entry skipped    | entry skipped    |
//! | 5    | `No website Data`| `No type Data`   |
//! | 6    | `No website Data`| row 5            |
//! | 7+   | row 5            | row 6            |

use crate::error::FieldError;
use crate::records::{Category, EventRecord, PlaceRecord, Record};

/// Which optional rows a place panel carries, by row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceLayout {
    /// Exactly the five required rows.
    Bare,
    /// Six rows: the extra row is the type, never the website.
    TypeOnly,
    /// Seven or more rows: website then type; anything after is ignored.
    WebAndType,
}

impl PlaceLayout {
    pub fn classify(found: usize) -> Result<Self, FieldError> {
        match found {
            n if n < Category::Place.required_fields() => Err(FieldError::MissingRequired {
                category: Category::Place,
                found: n,
                required: Category::Place.required_fields(),
            }),
            5 => Ok(PlaceLayout::Bare),
            6 => Ok(PlaceLayout::TypeOnly),
            _ => Ok(PlaceLayout::WebAndType),
        }
    }
}

/// Build a place record from panel rows.
pub fn map_place(values: &[String]) -> Result<PlaceRecord, FieldError> {
    let layout = PlaceLayout::classify(values.len())?;
    let (web, kind) = match layout {
        PlaceLayout::Bare => (None, None),
        PlaceLayout::TypeOnly => (None, Some(values[5].clone())),
        PlaceLayout::WebAndType => (Some(values[5].clone()), Some(values[6].clone())),
    };

    Ok(PlaceRecord {
        company: values[0].clone(),
        address: values[1].clone(),
        town: values[2].clone(),
        postalcode: values[3].clone(),
        telephone: values[4].clone(),
        web,
        kind,
    })
}

/// Build an event record from panel rows.
pub fn map_event(values: &[String]) -> Result<EventRecord, FieldError> {
    let required = Category::Event.required_fields();
    if values.len() < required {
        return Err(FieldError::MissingRequired {
            category: Category::Event,
            found: values.len(),
            required,
        });
    }

    Ok(EventRecord {
        event_location: values[0].clone(),
        town: values[1].clone(),
        country: values[2].clone(),
        postcode: values[3].clone(),
    })
}

/// Map panel rows for either category.
pub fn map_record(category: Category, values: &[String]) -> Result<Record, FieldError> {
    match category {
        Category::Place => map_place(values).map(Record::Place),
        Category::Event => map_event(values).map(Record::Event),
    }
}
