//! Scraped record types and the per-category collection.
//!
//! Both record shapes serialize with the column names used in every output
//! file. Flattening goes through serde so a nested field would come out as
//! `parent_child`, the same way the table layer names columns.

use crate::error::RecordError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Stands in for a missing website row.
pub const NO_WEBSITE: &str = "No website Data";

/// Stands in for a missing type row.
pub const NO_TYPE: &str = "No type Data";

/// Separator joining nested field names into one column name.
pub const FLATTEN_SEPARATOR: &str = "_";

/// The two workflows of the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Dealers: "place to buy".
    Place,
    Event,
}

impl Category {
    /// Processing order.
    pub const ALL: [Category; 2] = [Category::Place, Category::Event];

    /// Output folder for this category.
    pub fn folder_name(self) -> &'static str {
        match self {
            Category::Place => "opticron_data (place to buy)",
            Category::Event => "opticron_data (Event)",
        }
    }

    /// Column names in field order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Category::Place => &[
                "Company",
                "Address",
                "Town",
                "Postalcode",
                "Telephone",
                "Web",
                "Type",
            ],
            Category::Event => &["Event_Location", "Town", "Country", "Postcode"],
        }
    }

    /// Number of leading panel values that must be present.
    pub fn required_fields(self) -> usize {
        match self {
            Category::Place => 5,
            Category::Event => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Place => write!(f, "place to buy"),
            Category::Event => write!(f, "event"),
        }
    }
}

/// A dealer entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaceRecord {
    pub company: String,
    pub address: String,
    pub town: String,
    pub postalcode: String,
    pub telephone: String,
    #[serde(serialize_with = "or_no_website")]
    pub web: Option<String>,
    #[serde(rename = "Type", serialize_with = "or_no_type")]
    pub kind: Option<String>,
}

impl PlaceRecord {
    pub fn web_or_sentinel(&self) -> &str {
        self.web.as_deref().unwrap_or(NO_WEBSITE)
    }

    pub fn kind_or_sentinel(&self) -> &str {
        self.kind.as_deref().unwrap_or(NO_TYPE)
    }
}

fn or_no_website<S: serde::Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(NO_WEBSITE))
}

fn or_no_type<S: serde::Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(NO_TYPE))
}

/// An event entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    #[serde(rename = "Event_Location")]
    pub event_location: String,
    pub town: String,
    pub country: String,
    pub postcode: String,
}

/// Any scraped record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Place(PlaceRecord),
    Event(EventRecord),
}

impl Record {
    pub fn category(&self) -> Category {
        match self {
            Record::Place(_) => Category::Place,
            Record::Event(_) => Category::Event,
        }
    }

    /// Field name/value pairs in column order, nested objects joined with
    /// [`FLATTEN_SEPARATOR`].
    pub fn flatten(&self) -> Vec<(String, Value)> {
        let value = match self {
            Record::Place(r) => serde_json::to_value(r),
            Record::Event(r) => serde_json::to_value(r),
        }
        .unwrap_or(Value::Null);

        let mut out = Vec::new();
        if let Value::Object(map) = value {
            flatten_into(None, map, &mut out);
        }
        out
    }
}

fn flatten_into(prefix: Option<&str>, map: Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let name = match prefix {
            Some(p) => format!("{p}{FLATTEN_SEPARATOR}{key}"),
            None => key,
        };
        match value {
            Value::Object(inner) => flatten_into(Some(&name), inner, out),
            other => out.push((name, other)),
        }
    }
}

impl From<PlaceRecord> for Record {
    fn from(r: PlaceRecord) -> Self {
        Record::Place(r)
    }
}

impl From<EventRecord> for Record {
    fn from(r: EventRecord) -> Self {
        Record::Event(r)
    }
}

/// Where a collection is persisted: `<folder>/<base_name>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub folder: PathBuf,
    pub base_name: String,
}

impl Destination {
    pub fn new(folder: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            base_name: base_name.into(),
        }
    }

    /// The category's folder under `root`.
    pub fn for_category(root: &Path, base_name: &str, category: Category) -> Self {
        Self::new(root.join(category.folder_name()), base_name)
    }

    /// Output file path for an extension.
    pub fn file(&self, extension: &str) -> PathBuf {
        self.folder.join(format!("{}.{extension}", self.base_name))
    }
}

/// Records of one category on their way to a single persist call.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    category: Category,
    destination: Destination,
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(category: Category, destination: Destination) -> Self {
        Self {
            category,
            destination,
            records: Vec::new(),
        }
    }

    /// Append a record. Records of another category are rejected.
    pub fn push(&mut self, record: impl Into<Record>) -> Result<(), RecordError> {
        let record = record.into();
        if record.category() != self.category {
            return Err(RecordError::CategoryMismatch {
                expected: self.category,
                found: record.category(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(web: Option<&str>, kind: Option<&str>) -> PlaceRecord {
        PlaceRecord {
            company: "Opticron Dealer".into(),
            address: "1 High Street".into(),
            town: "Luton".into(),
            postalcode: "LU1 1AA".into(),
            telephone: "01582 000000".into(),
            web: web.map(String::from),
            kind: kind.map(String::from),
        }
    }

    #[test]
    fn test_place_flatten_order_and_sentinels() {
        let fields = Record::from(place(None, None)).flatten();
        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, Category::Place.columns());
        assert_eq!(fields[5].1, Value::String(NO_WEBSITE.into()));
        assert_eq!(fields[6].1, Value::String(NO_TYPE.into()));
    }

    #[test]
    fn test_place_flatten_present_optionals() {
        let fields = Record::from(place(Some("www.dealer.co.uk"), Some("Stockist"))).flatten();
        assert_eq!(fields[5].1, Value::String("www.dealer.co.uk".into()));
        assert_eq!(fields[6].1, Value::String("Stockist".into()));
    }

    #[test]
    fn test_event_flatten_columns() {
        let record = Record::from(EventRecord {
            event_location: "Birdfair".into(),
            town: "Oakham".into(),
            country: "UK".into(),
            postcode: "LE15 8AB".into(),
        });
        let names: Vec<String> = record.flatten().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, Category::Event.columns());
    }

    #[test]
    fn test_flatten_nested_object() {
        let map = serde_json::json!({"Contact": {"Phone": "1", "Fax": "2"}, "Town": "Luton"});
        let mut out = Vec::new();
        if let Value::Object(m) = map {
            flatten_into(None, m, &mut out);
        }
        let names: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["Contact_Phone", "Contact_Fax", "Town"]);
    }

    #[test]
    fn test_collection_rejects_other_category() {
        let dest = Destination::new("out", "opticron");
        let mut events = RecordCollection::new(Category::Event, dest);
        let err = events.push(place(None, None)).unwrap_err();
        assert_eq!(
            err,
            RecordError::CategoryMismatch {
                expected: Category::Event,
                found: Category::Place
            }
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_destination_paths() {
        let dest = Destination::for_category(Path::new("/data"), "opticron", Category::Event);
        assert_eq!(
            dest.file("csv"),
            PathBuf::from("/data/opticron_data (Event)/opticron.csv")
        );
    }
}
