//! Persisted user state.

use std::collections::BTreeMap;

use medium_common::MediumError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::MediaKind;
use crate::value::ViewFields;

/// State reported by the media adapter for its live handle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_state: Option<Value>,
}

/// What the host stores between sessions.
///
/// The empty value serializes to `{}` and is what a reset reports so that a
/// previously stored state gets cleared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<ExerciseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_fields: Option<BTreeMap<MediaKind, ViewFields>>,
}

impl PersistedState {
    pub fn from_json(value: &Value) -> Result<Self, MediumError> {
        Ok(Self::deserialize(value)?)
    }

    pub fn to_json(&self) -> Value {
        // Only string keys and plain values.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
