//! Field values, saved entries, and view-field records.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::kind::MediaKind;

/// A draft or stored value of one editable field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    /// Nested `{name, value}` entries, rebuilt into an object.
    Group(Vec<FieldEntry>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert a JSON value into a field value. Numbers are kept as their text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Object(map) => Some(FieldValue::Group(
                map.iter()
                    .filter_map(|(name, v)| {
                        FieldValue::from_json(v).map(|value| FieldEntry::new(name.as_str(), value))
                    })
                    .collect(),
            )),
            Value::Null | Value::Array(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Group(entries) => Value::Object(entries_to_object(entries)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One `{name, value}` pair as emitted by a field at save time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: SmolStr,
    pub value: FieldValue,
}

impl FieldEntry {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Rebuild a plain JSON object from saved entries; later names win.
pub fn entries_to_object(entries: &[FieldEntry]) -> Map<String, Value> {
    let mut object = Map::new();
    for entry in entries {
        object.insert(entry.name.to_string(), entry.value.to_json());
    }
    object
}

/// The user-editable subset of one kind's configuration, keyed by field name.
///
/// Stored records are read as leniently as author JSON: numbers become text
/// and values with no field representation are dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViewFields(BTreeMap<SmolStr, FieldValue>);

impl<'de> Deserialize<'de> for ViewFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_object(&object))
    }
}

impl ViewFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn set(&mut self, name: impl Into<SmolStr>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Store `value`, reporting whether it differs from what was there.
    ///
    /// An absent value compares equal to the empty string.
    pub fn patch(&mut self, name: &str, value: FieldValue) -> bool {
        let empty = FieldValue::Text(String::new());
        let changed = self.0.get(name).unwrap_or(&empty) != &value;
        self.0.insert(SmolStr::new(name), value);
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &FieldValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .filter_map(|(name, v)| FieldValue::from_json(v).map(|fv| (SmolStr::new(name), fv)))
                .collect(),
        )
    }

    pub fn to_object(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect()
    }
}

impl<K: Into<SmolStr>, V: Into<FieldValue>> FromIterator<(K, V)> for ViewFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One view-field record per kind. Records for inactive kinds are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewFieldSet(BTreeMap<MediaKind, ViewFields>);

impl ViewFieldSet {
    pub fn get(&self, kind: &MediaKind) -> Option<&ViewFields> {
        self.0.get(kind)
    }

    pub fn get_or_empty(&self, kind: &MediaKind) -> ViewFields {
        self.0.get(kind).cloned().unwrap_or_default()
    }

    pub fn entry(&mut self, kind: &MediaKind) -> &mut ViewFields {
        self.0.entry(kind.clone()).or_default()
    }

    pub fn insert(&mut self, kind: MediaKind, fields: ViewFields) {
        self.0.insert(kind, fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MediaKind, &ViewFields)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_entries_rebuild_objects() {
        let entries = vec![
            FieldEntry::new("title", "Sunset"),
            FieldEntry::new(
                "behaviour",
                FieldValue::Group(vec![FieldEntry::new("userCanEdit", true)]),
            ),
        ];
        assert_eq!(
            Value::Object(entries_to_object(&entries)),
            json!({ "title": "Sunset", "behaviour": { "userCanEdit": true } })
        );
    }

    #[test]
    fn patch_treats_absent_as_empty() {
        let mut fields = ViewFields::new();
        assert!(!fields.patch("sourceURL", FieldValue::text("")));
        assert!(fields.patch("sourceURL", FieldValue::text("https://a.b/c.png")));
        assert!(!fields.patch("sourceURL", FieldValue::text("https://a.b/c.png")));
        assert!(fields.patch("loop", FieldValue::Bool(false)));
    }

    #[test]
    fn untagged_values_deserialize() {
        let fields: ViewFields =
            serde_json::from_value(json!({ "sizingMode": "cover", "autoplay": true })).unwrap();
        assert_eq!(fields.get_str("sizingMode"), Some("cover"));
        assert_eq!(fields.get("autoplay"), Some(&FieldValue::Bool(true)));
    }
}
