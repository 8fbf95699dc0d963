//! Editable option fields shown in the overlay dialog.
//!
//! Every field keeps a local draft value and a [`FieldView`] describing what
//! the host should render. Nothing here touches the parameter tree; the
//! dialog reads [`OptionField::value`] when the user saves.

mod boolean;
mod factory;
mod select;
mod text;

pub use boolean::BooleanField;
pub use factory::produce;
pub use select::SelectField;
pub use text::TextField;

use smol_str::{SmolStr, format_smolstr};

use crate::schema::{FieldSchema, FieldType, SelectOption};
use crate::value::{FieldEntry, FieldValue};

pub const FIELD_CLASS: &str = "h5p-editable-medium-overlay-dialog-option-field";
pub const ERROR_CLASS: &str = "has-error";

/// Parts of a rendered field, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldPart {
    Label,
    Description,
    Control,
    Errors,
}

/// The input control a field renders.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    TextInput { placeholder: String },
    Select { options: Vec<SelectOption> },
    Checkbox,
}

/// What the host renders for one field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldView {
    /// Id of the control; the label points at it.
    pub dom_id: SmolStr,
    pub field_type: FieldType,
    pub label: String,
    pub description: Option<String>,
    pub control: Control,
    pub layout: Vec<FieldPart>,
    pub has_error: bool,
    pub error_message: String,
}

impl FieldView {
    fn new(schema: &FieldSchema, control: Control) -> Self {
        let mut layout = vec![FieldPart::Label];
        if schema.description.is_some() {
            layout.push(FieldPart::Description);
        }
        layout.push(FieldPart::Control);
        layout.push(FieldPart::Errors);

        Self {
            dom_id: format_smolstr!("field-{}", uuid::Uuid::new_v4()),
            field_type: schema.field_type.clone(),
            label: schema.label.clone(),
            description: schema.description.clone(),
            control,
            layout,
            has_error: false,
            error_message: String::new(),
        }
    }

    /// Id of the description element, referenced by `aria-describedby`.
    pub fn description_id(&self) -> Option<SmolStr> {
        self.description
            .as_ref()
            .map(|_| format_smolstr!("{}-description", self.dom_id))
    }

    /// CSS classes of the field wrapper.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes = vec![FIELD_CLASS, field_type_class(&self.field_type)];
        if self.has_error {
            classes.push(ERROR_CLASS);
        }
        classes
    }

    /// Move the control in front of the label (checkbox convention).
    fn control_first(&mut self) {
        let control = self.layout.iter().position(|p| *p == FieldPart::Control);
        let label = self.layout.iter().position(|p| *p == FieldPart::Label);
        if let (Some(control), Some(label)) = (control, label) {
            if control > label {
                let part = self.layout.remove(control);
                self.layout.insert(label, part);
            }
        }
    }
}

fn field_type_class(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Text => "text",
        FieldType::Select => "select",
        FieldType::Boolean => "boolean",
        _ => "unknown",
    }
}

/// State shared by every field variant.
#[derive(Clone, Debug)]
pub struct FieldBase {
    pub schema: FieldSchema,
    pub view: FieldView,
}

impl FieldBase {
    fn new(schema: FieldSchema, control: Control) -> Self {
        let view = FieldView::new(&schema, control);
        Self { schema, view }
    }
}

/// Contract of a single editable widget.
pub trait OptionField: std::fmt::Debug {
    fn base(&self) -> &FieldBase;

    fn base_mut(&mut self) -> &mut FieldBase;

    /// Current draft value.
    fn draft(&self) -> FieldValue;

    /// Replace the draft value without side effects.
    fn set_draft(&mut self, value: FieldValue);

    fn name(&self) -> &str {
        &self.base().schema.name
    }

    fn view(&self) -> &FieldView {
        &self.base().view
    }

    fn value(&self) -> FieldEntry {
        FieldEntry::new(self.base().schema.name.clone(), self.draft())
    }

    fn is_valid(&self) -> bool {
        true
    }

    /// Restore the initial draft and clear any error.
    fn reset(&mut self) {
        self.set_error(None);
    }

    /// Recompute validity and toggle the error state.
    fn validate(&mut self) {
        let valid = self.is_valid();
        self.base_mut().view.has_error = !valid;
    }

    /// Show `message`, or clear the error when it is `None` or empty.
    fn set_error(&mut self, message: Option<&str>) {
        let message = message.unwrap_or_default();
        let view = &mut self.base_mut().view;
        view.has_error = !message.is_empty();
        view.error_message = message.to_owned();
    }

    /// The user changed the control.
    fn input(&mut self, value: FieldValue) {
        self.set_draft(value);
        self.set_error(None);
    }

    /// The user left the control.
    fn blur(&mut self) {
        self.validate();
    }
}

/// Text representation of a value for text-like controls.
fn value_as_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Bool(b) => Some(b.to_string()),
        FieldValue::Group(_) => None,
    }
}
