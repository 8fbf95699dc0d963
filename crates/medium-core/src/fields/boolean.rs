use super::{Control, FieldBase, OptionField};
use crate::schema::FieldSchema;
use crate::value::FieldValue;

/// A checkbox. Always valid.
#[derive(Debug)]
pub struct BooleanField {
    base: FieldBase,
    checked: bool,
}

impl BooleanField {
    pub fn new(schema: FieldSchema, value: Option<&FieldValue>) -> Self {
        let checked = value
            .and_then(FieldValue::as_bool)
            .unwrap_or_else(|| schema.default_bool());
        let mut base = FieldBase::new(schema, Control::Checkbox);
        base.view.control_first();

        Self { base, checked }
    }

    pub fn checked(&self) -> bool {
        self.checked
    }
}

impl OptionField for BooleanField {
    fn base(&self) -> &FieldBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FieldBase {
        &mut self.base
    }

    fn draft(&self) -> FieldValue {
        FieldValue::Bool(self.checked)
    }

    fn set_draft(&mut self, value: FieldValue) {
        match value {
            FieldValue::Bool(b) => self.checked = b,
            FieldValue::Text(s) => self.checked = s == "true",
            FieldValue::Group(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldPart;
    use crate::schema::FieldType;

    #[test]
    fn control_precedes_label() {
        let field = BooleanField::new(FieldSchema::new("autoplay", FieldType::Boolean), None);
        assert_eq!(
            field.view().layout,
            vec![FieldPart::Control, FieldPart::Label, FieldPart::Errors]
        );
    }

    #[test]
    fn draft_precedence() {
        let mut schema = FieldSchema::new("loop", FieldType::Boolean);
        assert!(!BooleanField::new(schema.clone(), None).checked());

        schema.default = Some(serde_json::json!(true));
        assert!(BooleanField::new(schema.clone(), None).checked());
        assert!(!BooleanField::new(schema, Some(&false.into())).checked());
    }

    #[test]
    fn always_valid() {
        let mut field = BooleanField::new(FieldSchema::new("loop", FieldType::Boolean), None);
        field.input(true.into());
        field.validate();
        assert!(field.is_valid());
        assert!(!field.view().has_error);
        assert_eq!(field.value().value, FieldValue::Bool(true));
    }
}
