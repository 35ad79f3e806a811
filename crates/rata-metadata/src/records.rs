//! Normalized reference records and their mappers
//!
//! Each mapper turns exactly one raw feed entry into one record. Mapping
//! never skips, merges or cross-checks entries; a missing key is fatal.

use crate::error::{RataError, Result};
use crate::feed::FeedResource;
use crate::normalize::{normalize_int, normalize_location_code, normalize_text};
use serde_json::Value;
use std::borrow::Cow;

/// One feed entry as delivered: feed field name -> raw value
pub type RawEntry = serde_json::Map<String, Value>;

/// Train describer berth-stepping definition (SMART `BERTHDATA`)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BerthStepRecord {
    pub track_circuit_id: String,
    pub from_berth: Option<String>,
    pub to_berth: Option<String>,
    pub from_line: Option<String>,
    pub to_line: Option<String>,
    pub berth_offset: Option<i32>,
    pub platform: Option<String>,
    pub event_type: Option<String>,
    pub route: Option<String>,
    /// Stanox; zero in the feed is stored as null
    pub location_code: Option<i32>,
    pub location_name: Option<String>,
    pub step_type: Option<String>,
    pub comment: Option<String>,
}

impl BerthStepRecord {
    /// Map entry `index` of the SMART feed
    pub fn from_entry(index: usize, entry: &RawEntry) -> Result<Self> {
        let fields = EntryFields::new(FeedResource::BerthSteps, index, entry);

        Ok(Self {
            track_circuit_id: fields.required_text("TD")?,
            from_berth: fields.text("FROMBERTH")?,
            to_berth: fields.text("TOBERTH")?,
            from_line: fields.text("FROMLINE")?,
            to_line: fields.text("TOLINE")?,
            berth_offset: fields.int("BERTHOFFSET")?,
            platform: fields.text("PLATFORM")?,
            event_type: fields.text("EVENT")?,
            route: fields.text("ROUTE")?,
            location_code: fields.location_code("STANOX")?,
            location_name: fields.text("STANME")?,
            step_type: fields.text("STEPTYPE")?,
            comment: fields.text("COMMENT")?,
        })
    }
}

/// Location reference entry (CORPUS `TIPLOCDATA`)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LocationRecord {
    /// Stanox; zero in the feed is stored as null
    pub location_code: Option<i32>,
    pub uic_code: Option<String>,
    /// 3-alpha (CRS) code
    pub short_code: Option<String>,
    /// TIPLOC
    pub timing_point_code: Option<String>,
    pub national_location_code: Option<i32>,
    pub national_location_description: Option<String>,
    pub description: Option<String>,
}

impl LocationRecord {
    /// Map entry `index` of the CORPUS feed
    pub fn from_entry(index: usize, entry: &RawEntry) -> Result<Self> {
        let fields = EntryFields::new(FeedResource::Locations, index, entry);

        Ok(Self {
            location_code: fields.location_code("STANOX")?,
            uic_code: fields.text("UIC")?,
            short_code: fields.text("3ALPHA")?,
            timing_point_code: fields.text("TIPLOC")?,
            national_location_code: fields.int("NLC")?,
            national_location_description: fields.text("NLCDESC")?,
            description: fields.text("NLCDESC16")?,
        })
    }
}

/// Map every entry of a feed, preserving order
pub fn map_entries<T>(
    entries: &[RawEntry],
    mapper: impl Fn(usize, &RawEntry) -> Result<T>,
) -> Result<Vec<T>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| mapper(index, entry))
        .collect()
}

/// Field lookup over one entry, carrying enough context for error messages
struct EntryFields<'a> {
    resource: FeedResource,
    index: usize,
    entry: &'a RawEntry,
}

impl<'a> EntryFields<'a> {
    fn new(resource: FeedResource, index: usize, entry: &'a RawEntry) -> Self {
        Self {
            resource,
            index,
            entry,
        }
    }

    /// Raw value rendered as text; JSON null counts as empty
    fn raw(&self, field: &'static str) -> Result<Cow<'a, str>> {
        match self.entry.get(field) {
            None => Err(RataError::MissingField {
                resource: self.resource,
                index: self.index,
                field,
            }),
            Some(Value::String(s)) => Ok(Cow::Borrowed(s.as_str())),
            Some(Value::Number(n)) => Ok(Cow::Owned(n.to_string())),
            Some(Value::Null) => Ok(Cow::Borrowed("")),
            Some(other) => Err(RataError::InvalidField {
                resource: self.resource,
                index: self.index,
                field,
                message: format!("expected a string or number, got {}", json_kind(other)),
            }),
        }
    }

    fn text(&self, field: &'static str) -> Result<Option<String>> {
        Ok(normalize_text(&self.raw(field)?))
    }

    fn required_text(&self, field: &'static str) -> Result<String> {
        self.text(field)?.ok_or_else(|| RataError::InvalidField {
            resource: self.resource,
            index: self.index,
            field,
            message: "value is blank".to_string(),
        })
    }

    fn int(&self, field: &'static str) -> Result<Option<i32>> {
        Ok(normalize_int(&self.raw(field)?))
    }

    fn location_code(&self, field: &'static str) -> Result<Option<i32>> {
        Ok(normalize_location_code(&self.raw(field)?))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
