//! The persisted parameter tree.
//!
//! Author parameters arrive as JSON keyed the way the authoring tool stores
//! them (`contentType`, `behaviour`, `viewFieldsImage`, ...). Internally the
//! per-kind view-field records live in a [`ViewFieldSet`] keyed by
//! [`MediaKind`]; conversion between the two goes through
//! [`MediaKind::author_key`].

use std::collections::BTreeMap;

use medium_common::MediumError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::MediaKind;
use crate::value::{ViewFieldSet, ViewFields};

/// Native content description handed to the host runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescription {
    /// Library string, e.g. `"H5P.Image 1.1"`.
    #[serde(default)]
    pub library: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentDescription {
    /// Machine name part of the library string, or `""`.
    pub fn machine_name(&self) -> &str {
        self.library.split(' ').next().unwrap_or_default()
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_library(&self.library)
    }

    pub fn metadata_title(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("title"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Author-level behaviour settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behaviour {
    #[serde(default = "default_true")]
    pub user_can_edit: bool,
    /// The host opens the dialog itself; no edit button is rendered.
    #[serde(default)]
    pub delegate_editor_dialog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_mode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            user_can_edit: true,
            delegate_editor_dialog: false,
            sizing_mode: None,
            extra: Map::new(),
        }
    }
}

pub const DEFAULT_SIZING_MODE: &str = "contain";
pub const DEFAULT_PLAYER_MODE: &str = "full";

/// The full persisted configuration of one embedded medium.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediumParams {
    pub content_type: ContentDescription,
    pub behaviour: Behaviour,
    pub view_fields: ViewFieldSet,
    pub l10n: BTreeMap<String, String>,
    pub a11y: BTreeMap<String, String>,
    /// Author keys this crate does not interpret, kept for round-tripping.
    pub extra: Map<String, Value>,
}

/// Wire shape of [`MediumParams`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorParams {
    #[serde(default)]
    content_type: ContentDescription,
    #[serde(default)]
    behaviour: Behaviour,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    l10n: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    a11y: BTreeMap<String, String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl MediumParams {
    /// Build from author JSON.
    pub fn from_author_json(value: Value) -> Result<Self, MediumError> {
        if !value.is_object() {
            return Err(MediumError::InvalidParams(
                "content parameters must be an object".into(),
            ));
        }
        let AuthorParams {
            content_type,
            behaviour,
            l10n,
            a11y,
            mut rest,
        } = serde_json::from_value(value)?;

        let mut view_fields = ViewFieldSet::default();
        for kind in MediaKind::with_view_fields() {
            let Some(key) = kind.author_key() else {
                continue;
            };
            match rest.remove(key) {
                Some(Value::Object(record)) => {
                    view_fields.insert(kind, ViewFields::from_object(&record))
                }
                Some(Value::Null) | None => {}
                Some(other) => {
                    return Err(MediumError::InvalidParams(format!(
                        "`{key}` must be an object, got {other}"
                    )));
                }
            }
        }

        Ok(Self {
            content_type,
            behaviour,
            view_fields,
            l10n,
            a11y,
            extra: rest,
        })
    }

    /// Serialize back into author JSON.
    pub fn to_author_json(&self) -> Value {
        let mut rest = self.extra.clone();
        for (kind, record) in self.view_fields.iter() {
            if let Some(key) = kind.author_key() {
                rest.insert(key.to_owned(), Value::Object(record.to_object()));
            }
        }
        let wire = AuthorParams {
            content_type: self.content_type.clone(),
            behaviour: self.behaviour.clone(),
            l10n: self.l10n.clone(),
            a11y: self.a11y.clone(),
            rest,
        };
        // Maps with string keys and plain values always serialize.
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.content_type.kind()
    }

    /// The active view-field record (empty when the kind has none yet).
    pub fn active_view_fields(&self) -> ViewFields {
        self.kind()
            .map(|kind| self.view_fields.get_or_empty(&kind))
            .unwrap_or_default()
    }

    /// Carry the active record's `sizingMode` or `playerMode` into the
    /// settings that seed it, so a later re-sync keeps the edit.
    pub fn adopt_view_modes(&mut self) {
        let record = self.active_view_fields();
        match self.kind() {
            Some(MediaKind::Image) => {
                if let Some(mode) = record.get_str("sizingMode").filter(|m| !m.is_empty()) {
                    self.behaviour.sizing_mode = Some(mode.to_owned());
                }
            }
            Some(MediaKind::Audio) => {
                if let Some(mode) = record.get_str("playerMode").filter(|m| !m.is_empty()) {
                    self.content_type
                        .params
                        .insert("playerMode".into(), Value::String(mode.to_owned()));
                }
            }
            Some(MediaKind::Video | MediaKind::Other(_)) | None => {}
        }
    }

    /// Re-seed the image and audio records from author behaviour settings.
    pub fn sync_behaviour_view_fields(&mut self) {
        let sizing_mode = self
            .behaviour
            .sizing_mode
            .clone()
            .unwrap_or_else(|| DEFAULT_SIZING_MODE.to_owned());
        self.view_fields
            .entry(&MediaKind::Image)
            .set("sizingMode", sizing_mode.as_str());

        let player_mode = self
            .content_type
            .param_str("playerMode")
            .unwrap_or(DEFAULT_PLAYER_MODE)
            .to_owned();
        self.view_fields
            .entry(&MediaKind::Audio)
            .set("playerMode", player_mode.as_str());
    }
}

/// Merge `source` into `target` the way the authoring runtime extends objects.
///
/// Objects merge recursively, `null` in `source` leaves `target` untouched,
/// anything else in `source` overwrites.
pub fn extend(target: &mut Value, source: &Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(t), Value::Object(s)) => {
            for (key, value) in s {
                match t.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        extend(existing, value)
                    }
                    _ if value.is_null() => {}
                    _ => {
                        t.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (t, s) => *t = s.clone(),
    }
}

/// Merge two documents, pairing array items by index.
///
/// Used to overlay a translation onto a schema: every label in the
/// translation replaces the one at the same position.
pub fn merge_deep(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Array(b), Value::Array(o)) => {
            let len = b.len().max(o.len());
            (0..len)
                .map(|i| match (b.get(i), o.get(i)) {
                    (Some(bv), Some(ov)) => merge_deep(bv, ov),
                    (Some(bv), None) => bv.clone(),
                    (None, Some(ov)) => ov.clone(),
                    (None, None) => Value::Null,
                })
                .collect()
        }
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (key, ov) in o {
                let value = match b.get(key) {
                    Some(bv) => merge_deep(bv, ov),
                    None => ov.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (b, Value::Null) => b.clone(),
        (_, o) => o.clone(),
    }
}
