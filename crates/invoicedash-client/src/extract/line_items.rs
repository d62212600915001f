//! Line items have been emitted in several historical layouts. Each layout is a
//! named variant and detection walks [`MATCHERS`] in order; the first match wins.

use serde::Deserialize;
use serde_json::Value;

use crate::extract::envelope::SourceLineItem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineItemsShape<'a> {
    /// `[ {..}, {..} ]`
    DirectArray(&'a [Value]),
    /// `{ "items": { "value": [ {..} ] } }`
    ItemsEnvelope(&'a [Value]),
    /// `{ "items": [ {..} ] }`
    ItemsArray(&'a [Value]),
}

type Matcher = for<'a> fn(&'a Value) -> Option<LineItemsShape<'a>>;

pub const MATCHERS: [(&str, Matcher); 3] = [
    ("direct_array", match_direct_array),
    ("items_envelope", match_items_envelope),
    ("items_array", match_items_array),
];

impl<'a> LineItemsShape<'a> {
    /// Detects the layout of the `lineItems` field. An outer `{ "value": .. }`
    /// envelope is unwrapped first when present.
    pub fn detect(raw: &'a Value) -> Option<Self> {
        let inner = unwrap_envelope(raw)?;
        MATCHERS.iter().find_map(|(_, matcher)| matcher(inner))
    }

    pub fn items(&self) -> &'a [Value] {
        match self {
            Self::DirectArray(items) | Self::ItemsEnvelope(items) | Self::ItemsArray(items) => {
                items
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectArray(_) => "direct_array",
            Self::ItemsEnvelope(_) => "items_envelope",
            Self::ItemsArray(_) => "items_array",
        }
    }
}

/// Resolves the line items of a record. A missing or unrecognized layout means
/// no line items; an item that is not a valid line-item object is an error for
/// the whole record.
pub fn source_line_items(raw: Option<&Value>) -> Result<Vec<SourceLineItem>, serde_json::Error> {
    let Some(shape) = raw.and_then(LineItemsShape::detect) else {
        return Ok(Vec::new());
    };

    shape
        .items()
        .iter()
        .map(SourceLineItem::deserialize)
        .collect()
}

fn unwrap_envelope(raw: &Value) -> Option<&Value> {
    match raw {
        Value::Null => None,
        Value::Object(object) if object.contains_key("value") => {
            object.get("value").filter(|value| !value.is_null())
        }
        other => Some(other),
    }
}

fn match_direct_array(value: &Value) -> Option<LineItemsShape<'_>> {
    value
        .as_array()
        .map(|items| LineItemsShape::DirectArray(items.as_slice()))
}

fn match_items_envelope(value: &Value) -> Option<LineItemsShape<'_>> {
    value
        .get("items")
        .and_then(|items| items.get("value"))
        .and_then(Value::as_array)
        .map(|items| LineItemsShape::ItemsEnvelope(items.as_slice()))
}

fn match_items_array(value: &Value) -> Option<LineItemsShape<'_>> {
    value
        .get("items")
        .and_then(Value::as_array)
        .map(|items| LineItemsShape::ItemsArray(items.as_slice()))
}
