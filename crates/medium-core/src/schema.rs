//! Declarative field schema (semantics) and lookups over it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

/// The field types the schema may declare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Select,
    Boolean,
    Group,
    List,
    Library,
    Number,
    Image,
    Audio,
    Video,
    File,
    #[serde(other)]
    Unknown,
}

/// A selectable option of a `select` field.
///
/// `library` fields list their options as bare strings; those read as an
/// option whose label is its value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "OptionRepr")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Full {
        value: String,
        #[serde(default)]
        label: String,
    },
    Bare(String),
}

impl From<OptionRepr> for SelectOption {
    fn from(repr: OptionRepr) -> Self {
        match repr {
            OptionRepr::Full { value, label } => Self { value, label },
            OptionRepr::Bare(value) => Self {
                label: value.clone(),
                value,
            },
        }
    }
}

/// Pattern constraint of a `text` field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegexpRule {
    pub pattern: Option<String>,
    /// JavaScript-style flags, e.g. `"i"`.
    #[serde(default)]
    pub modifiers: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One node of the field schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(default)]
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub widget: Option<SmolStr>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub regexp: Option<RegexpRule>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Children of a `group`.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    /// Item type of a `list`.
    #[serde(default)]
    pub field: Option<Box<FieldSchema>>,
}

impl FieldSchema {
    /// `defaultValue` if declared, else `default`, as text.
    pub fn default_text(&self) -> Option<String> {
        self.default_value
            .as_ref()
            .or(self.default.as_ref())
            .and_then(json_to_text)
    }

    /// The `default` flag of a boolean field.
    pub fn default_bool(&self) -> bool {
        self.default.as_ref().and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn pattern(&self) -> Option<&RegexpRule> {
        self.regexp.as_ref().filter(|r| r.pattern.is_some())
    }

    /// Schema node with no children and only a type; handy in tests and builders.
    pub fn new(name: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            widget: None,
            label: String::new(),
            description: None,
            default: None,
            default_value: None,
            optional: false,
            options: Vec::new(),
            regexp: None,
            placeholder: None,
            fields: Vec::new(),
            field: None,
        }
    }
}

fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A titled set of fields, as shown by one dialog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldGroup {
    pub label: String,
    pub fields: Vec<FieldSchema>,
}

impl From<&FieldSchema> for FieldGroup {
    fn from(group: &FieldSchema) -> Self {
        Self {
            label: group.label.clone(),
            fields: group.fields.clone(),
        }
    }
}

/// The top-level schema of the content type.
pub type Semantics = Vec<FieldSchema>;

/// Parse semantics from JSON.
pub fn parse_semantics(value: Value) -> Result<Semantics, serde_json::Error> {
    serde_json::from_value(value)
}

/// Collect declared defaults: `default` values, empty lists, and non-empty groups.
///
/// Defaults inside list items are not collected.
pub fn semantics_defaults(fields: &[FieldSchema]) -> Map<String, Value> {
    let mut defaults = Map::new();

    for field in fields {
        if field.name.is_empty() {
            continue;
        }

        if let Some(default) = &field.default {
            defaults.insert(field.name.to_string(), default.clone());
        }

        match field.field_type {
            FieldType::List => {
                defaults.insert(field.name.to_string(), Value::Array(Vec::new()));
            }
            FieldType::Group if !field.fields.is_empty() => {
                let group = semantics_defaults(&field.fields);
                if !group.is_empty() {
                    defaults.insert(field.name.to_string(), Value::Object(group));
                }
            }
            _ => {}
        }
    }

    defaults
}

/// Depth-first search for the first field with `name`. Beware duplicate names.
pub fn find_field<'a>(name: &str, fields: &'a [FieldSchema]) -> Option<&'a FieldSchema> {
    fields.iter().find_map(|field| find_in(name, field))
}

fn find_in<'a>(name: &str, field: &'a FieldSchema) -> Option<&'a FieldSchema> {
    if field.name == name {
        return Some(field);
    }

    if let Some(item) = field.field.as_deref() {
        if let Some(found) = find_in(name, item) {
            return Some(found);
        }
    }

    find_field(name, &field.fields)
}
