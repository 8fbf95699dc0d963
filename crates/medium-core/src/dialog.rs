//! The modal overlay holding the option fields.
//!
//! The dialog owns its fields and hands the saved `{name, value}` list back
//! to the caller as a [`DialogOutcome`]; it never writes parameters itself.
//! Open state and click/key listening live in shared cells so that work
//! deferred to the next frame can see whether the dialog closed meanwhile.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use smol_str::{SmolStr, format_smolstr};

use crate::events::MainChannel;
use crate::fields::{self, OptionField};
use crate::platform::{ClickTarget, Dictionary, FocusTrap, Focusable, FrameScheduler, MediaEvent};
use crate::schema::FieldGroup;
use crate::value::{FieldEntry, ViewFields};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Decode basic entities and strip markup, leaving display text.
pub fn purify_html(html: &str) -> String {
    let decoded = html
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&");
    TAG_RE.replace_all(&decoded, "").into_owned()
}

/// Result of a dialog interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum DialogOutcome {
    /// Closed with every field valid; entries in field order.
    Saved(Vec<FieldEntry>),
    /// At least one field is invalid; the dialog stays open.
    Blocked,
    Canceled,
    /// The interaction did not concern the dialog.
    Ignored,
}

/// Translated button labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogLabels {
    pub save: String,
    pub cancel: String,
    pub close: String,
}

impl DialogLabels {
    pub fn from_dictionary(dictionary: &dyn Dictionary) -> Self {
        Self {
            save: dictionary.get("l10n.save"),
            cancel: dictionary.get("l10n.cancel"),
            close: dictionary.get("a11y.close"),
        }
    }
}

/// Platform services the dialog needs.
#[derive(Clone)]
pub struct DialogEnv {
    pub frames: Rc<dyn FrameScheduler>,
    pub focus_trap: Rc<dyn FocusTrap>,
    pub dictionary: Rc<dyn Dictionary>,
}

pub struct OverlayDialog {
    dom_id: SmolStr,
    title: String,
    labels: DialogLabels,
    fields: Vec<Box<dyn OptionField>>,
    open: Rc<Cell<bool>>,
    listening: Rc<Cell<bool>>,
    return_focus: Option<Rc<dyn Focusable>>,
    env: DialogEnv,
    main: Rc<MainChannel>,
}

impl OverlayDialog {
    /// Build a closed dialog with one field per supported schema node.
    pub fn new(group: &FieldGroup, values: &ViewFields, env: DialogEnv, main: Rc<MainChannel>) -> Self {
        let fields: Vec<_> = group
            .fields
            .iter()
            .filter_map(|schema| fields::produce(schema, values.get(&schema.name)))
            .collect();

        tracing::debug!(
            target: "medium::dialog",
            title = %group.label,
            declared = group.fields.len(),
            built = fields.len(),
            "dialog built"
        );

        let labels = DialogLabels::from_dictionary(env.dictionary.as_ref());
        let mut dialog = Self {
            dom_id: format_smolstr!("dialog-{}", uuid::Uuid::new_v4()),
            title: String::new(),
            labels,
            fields,
            open: Rc::new(Cell::new(false)),
            listening: Rc::new(Cell::new(false)),
            return_focus: None,
            env,
            main,
        };
        dialog.set_title(&group.label);
        dialog
    }

    /// Open the dialog, remembering where focus should return on close.
    ///
    /// Trap activation, click/key listening and the main resize happen on
    /// the next frame, and not at all if the dialog closed before then.
    pub fn show(&mut self, active_element: Option<Rc<dyn Focusable>>) {
        self.return_focus = active_element;
        self.open.set(true);

        let open = self.open.clone();
        let listening = self.listening.clone();
        let trap = self.env.focus_trap.clone();
        let main = self.main.clone();
        self.env.frames.request_frame(Box::new(move || {
            if !open.get() {
                return;
            }
            trap.activate();
            listening.set(true);
            main.trigger(MediaEvent::Resize, &Value::Null);
        }));
    }

    /// Close if every field is valid, otherwise surface the errors.
    pub fn save(&mut self) -> DialogOutcome {
        if !self.fields.iter().all(|f| f.is_valid()) {
            for field in &mut self.fields {
                field.validate();
            }
            tracing::debug!(target: "medium::dialog", "save blocked by invalid fields");
            return DialogOutcome::Blocked;
        }

        self.hide();
        DialogOutcome::Saved(self.fields.iter().map(|f| f.value()).collect())
    }

    /// Close, resetting only the fields that currently fail validation.
    pub fn cancel(&mut self) -> DialogOutcome {
        self.hide();
        for field in &mut self.fields {
            if !field.is_valid() {
                field.reset();
            }
        }
        DialogOutcome::Canceled
    }

    /// Document-level click. Targets outside the content region cancel.
    pub fn handle_click(&mut self, target: &dyn ClickTarget) -> DialogOutcome {
        if !self.listening.get() {
            return DialogOutcome::Ignored;
        }
        if target.is_connected() && target.is_within(&self.content_id()) {
            return DialogOutcome::Ignored;
        }
        self.cancel()
    }

    pub fn handle_key(&mut self, key: &str) -> DialogOutcome {
        if self.listening.get() && key == "Escape" {
            self.cancel()
        } else {
            DialogOutcome::Ignored
        }
    }

    fn hide(&mut self) {
        self.listening.set(false);
        self.open.set(false);
        self.env.focus_trap.deactivate();

        if let Some(target) = self.return_focus.take() {
            if target.is_connected() {
                self.env.frames.request_frame(Box::new(move || target.focus()));
            }
        }
    }

    pub fn set_title(&mut self, text: &str) {
        self.title = purify_html(text);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The accessible name of the dialog.
    pub fn aria_label(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &DialogLabels {
        &self.labels
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    pub fn dom_id(&self) -> &str {
        &self.dom_id
    }

    /// Id of the region whose clicks do not count as outside.
    pub fn content_id(&self) -> SmolStr {
        format_smolstr!("{}-content", self.dom_id)
    }

    pub fn save_disabled(&self) -> bool {
        self.fields.iter().any(|f| f.view().has_error)
    }

    pub fn fields(&self) -> &[Box<dyn OptionField>] {
        &self.fields
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut (dyn OptionField + 'static)> {
        self.fields
            .iter_mut()
            .find(|f| f.name() == name)
            .map(|f| f.as_mut())
    }
}

impl std::fmt::Debug for OverlayDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayDialog")
            .field("dom_id", &self.dom_id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("open", &self.open.get())
            .field("listening", &self.listening.get())
            .finish()
    }
}
