use super::{Control, FieldBase, OptionField, value_as_text};
use crate::schema::FieldSchema;
use crate::value::FieldValue;

/// A drop-down of fixed options.
#[derive(Debug)]
pub struct SelectField {
    base: FieldBase,
    draft: String,
}

impl SelectField {
    pub fn new(schema: FieldSchema, value: Option<&FieldValue>) -> Self {
        let draft = value
            .and_then(value_as_text)
            .or_else(|| schema.default_text())
            .unwrap_or_default();
        let control = Control::Select {
            options: schema.options.clone(),
        };

        Self {
            base: FieldBase::new(schema, control),
            draft,
        }
    }

    pub fn selected(&self) -> &str {
        &self.draft
    }
}

impl OptionField for SelectField {
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
        self.base.schema.options.iter().any(|o| o.value == self.draft)
    }

    fn reset(&mut self) {
        let schema = &self.base.schema;
        self.draft = schema
            .default_value
            .as_ref()
            .and_then(|v| v.as_str().map(str::to_owned))
            .or_else(|| schema.options.first().map(|o| o.value.clone()))
            .unwrap_or_default();
        self.set_error(None);
    }
}
