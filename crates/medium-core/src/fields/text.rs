use medium_common::SchemaError;
use regex::{Regex, RegexBuilder};

use super::{Control, FieldBase, OptionField, value_as_text};
use crate::schema::{FieldSchema, RegexpRule};
use crate::value::FieldValue;

/// A free-text input holding a URL.
#[derive(Debug)]
pub struct TextField {
    base: FieldBase,
    draft: String,
    pattern: Pattern,
}

#[derive(Debug)]
enum Pattern {
    None,
    Compiled(Regex),
    /// The schema pattern did not compile; nothing matches it.
    Broken,
}

impl TextField {
    pub fn new(schema: FieldSchema, value: Option<&FieldValue>) -> Self {
        let draft = value
            .and_then(value_as_text)
            .or_else(|| schema.default_value.as_ref().and_then(|v| v.as_str().map(str::to_owned)))
            .unwrap_or_default();
        let pattern = compile(&schema);
        let control = Control::TextInput {
            placeholder: schema.placeholder.clone().unwrap_or_default(),
        };

        Self {
            base: FieldBase::new(schema, control),
            draft,
            pattern,
        }
    }

    pub fn text(&self) -> &str {
        &self.draft
    }

    fn pattern_matches(&self, value: &str) -> bool {
        match &self.pattern {
            Pattern::None => true,
            Pattern::Compiled(re) => re.is_match(value),
            Pattern::Broken => false,
        }
    }

    fn pattern_message(&self) -> Option<&str> {
        self.base
            .schema
            .regexp
            .as_ref()
            .and_then(|r| r.message.as_deref())
    }
}

fn compile(schema: &FieldSchema) -> Pattern {
    let Some(RegexpRule {
        pattern: Some(pattern),
        modifiers,
        ..
    }) = schema.pattern()
    else {
        return Pattern::None;
    };

    let mut builder = RegexBuilder::new(pattern);
    for flag in modifiers.as_deref().unwrap_or_default().chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' => {
                builder.unicode(true);
            }
            _ => {}
        }
    }

    match builder.build() {
        Ok(re) => Pattern::Compiled(re),
        Err(source) => {
            let error = SchemaError::InvalidPattern {
                field: schema.name.to_string(),
                pattern: pattern.clone(),
                source,
            };
            tracing::warn!(target: "medium::fields", %error, "nothing will match this field");
            Pattern::Broken
        }
    }
}

impl OptionField for TextField {
    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FieldBase {
        &mut self.base
    }

    fn draft(&self) -> FieldValue {
        FieldValue::Text(self.draft.clone())
    }

    fn set_draft(&mut self, value: FieldValue) {
        if let Some(text) = value_as_text(&value) {
            self.draft = text;
        }
    }

    fn is_valid(&self) -> bool {
        let value = self.draft.trim();
        if value.is_empty() {
            return self.base.schema.optional;
        }
        self.pattern_matches(value)
    }

    fn reset(&mut self) {
        self.draft.clear();
        self.set_error(None);
    }

    fn validate(&mut self) {
        if self.is_valid() {
            self.set_error(None);
            return;
        }

        if !self.pattern_matches(self.draft.trim()) {
            let message = self.pattern_message().unwrap_or_default().to_owned();
            if !message.is_empty() {
                self.set_error(Some(&message));
                return;
            }
        }

        // Failing without a message to show: still flag the field.
        let view = &mut self.base.view;
        view.has_error = true;
        view.error_message.clear();
    }

    fn blur(&mut self) {
        let trimmed = self.draft.trim();
        if !trimmed.is_empty()
            && !trimmed.starts_with("http://")
            && !trimmed.starts_with("https://")
        {
            self.draft = format!("https://{trimmed}");
        }
        self.validate();
    }
}
