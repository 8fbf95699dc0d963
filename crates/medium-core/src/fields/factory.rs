use super::{BooleanField, OptionField, SelectField, TextField};
use crate::schema::{FieldSchema, FieldType};
use crate::value::FieldValue;

/// Build the widget for a schema node, or `None` when no widget handles it.
pub fn produce(schema: &FieldSchema, value: Option<&FieldValue>) -> Option<Box<dyn OptionField>> {
    let field: Box<dyn OptionField> = match (&schema.field_type, schema.widget.as_deref()) {
        (FieldType::Text, None) => Box::new(TextField::new(schema.clone(), value)),
        (FieldType::Select, None) => Box::new(SelectField::new(schema.clone(), value)),
        (FieldType::Boolean, None) => Box::new(BooleanField::new(schema.clone(), value)),
        (field_type, widget) => {
            tracing::debug!(
                target: "medium::fields",
                field = %schema.name,
                ?field_type,
                ?widget,
                "no widget for schema node"
            );
            return None;
        }
    };
    Some(field)
}
