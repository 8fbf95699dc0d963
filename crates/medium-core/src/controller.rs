//! The editable medium controller.
//!
//! [`EditableMedium`] owns the parameter tree and wires the pieces together:
//! the dialog edits the active view-field record, a save reconciles it into
//! the tree, and a fresh [`MediaAdapter`] re-derives the native content.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use medium_common::{MediumError, SchemaError};
use serde_json::{Map, Value, json};

use crate::adapter::MediaAdapter;
use crate::contract::QuestionContract;
use crate::dialog::{DialogEnv, DialogOutcome, OverlayDialog};
use crate::events::MainChannel;
use crate::kind::MediaKind;
use crate::l10n::{L10nDictionary, LocalizedSchemas, SchemaStore};
use crate::params::{DEFAULT_PLAYER_MODE, DEFAULT_SIZING_MODE, MediumParams, extend};
use crate::platform::{
    ClickTarget, Container, FocusTrap, Focusable, FrameScheduler, HostRuntime, ImmediateFrames,
    MediaEvent, NoFocusTrap,
};
use crate::schema::{FieldGroup, Semantics, find_field, semantics_defaults};
use crate::state::{ExerciseState, PersistedState};
use crate::value::{FieldEntry, ViewFields, entries_to_object};

pub const DEFAULT_DESCRIPTION: &str = "Editable Medium";
/// Library embedded when the author has not chosen one.
pub const DEFAULT_LIBRARY: &str = "H5P.Image 1.1";
/// Library of the editable medium itself, used for translation lookups.
pub const DEFAULT_UBER_NAME: &str = "H5P.EditableMedium 1.0";
pub const MAIN_CLASS: &str = "h5p-editable-medium";

const XAPI_COMPLETED: &str = "http://adlnet.gov/expapi/verbs/completed";

/// Platform services for one controller.
pub struct MediumEnv<R> {
    pub runtime: Rc<R>,
    pub frames: Rc<dyn FrameScheduler>,
    pub focus_trap: Rc<dyn FocusTrap>,
}

impl<R> MediumEnv<R> {
    /// Immediate frames and no focus trap.
    pub fn new(runtime: Rc<R>) -> Self {
        Self {
            runtime,
            frames: Rc::new(ImmediateFrames),
            focus_trap: Rc::new(NoFocusTrap),
        }
    }

    pub fn with_frames(mut self, frames: Rc<dyn FrameScheduler>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_focus_trap(mut self, focus_trap: Rc<dyn FocusTrap>) -> Self {
        self.focus_trap = focus_trap;
        self
    }
}

impl<R> Clone for MediumEnv<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            frames: self.frames.clone(),
            focus_trap: self.focus_trap.clone(),
        }
    }
}

/// Host-supplied context beyond the author parameters.
#[derive(Clone, Debug, Default)]
pub struct Extras {
    pub previous_state: Option<PersistedState>,
    pub metadata_title: Option<String>,
    /// Library of the editable medium itself; defaults to [`DEFAULT_UBER_NAME`].
    pub library: Option<String>,
    /// Saves replace the whole tree instead of patching the active record.
    pub author_mode: bool,
}

pub struct EditableMedium<R: HostRuntime> {
    semantics: Arc<Semantics>,
    schemas: LocalizedSchemas,
    /// Construction defaults; author-mode saves are rebuilt over them.
    defaults: Value,
    params: MediumParams,
    initial_params: MediumParams,
    content_id: String,
    extras: Extras,
    previous_exercise: Option<ExerciseState>,
    main: Rc<MainChannel>,
    dictionary: Rc<L10nDictionary>,
    env: MediumEnv<R>,
    dialog: OverlayDialog,
    adapter: MediaAdapter<R>,
    answer_given: bool,
    /// Reported as `{}` once by the next state query.
    content_was_reset: Cell<bool>,
    wrapper: Option<Container>,
}

impl<R: HostRuntime> EditableMedium<R> {
    pub fn new(
        params: Value,
        semantics: Semantics,
        content_id: impl Into<String>,
        mut extras: Extras,
        env: MediumEnv<R>,
    ) -> Result<Self, MediumError> {
        let defaults = construction_defaults(&semantics, &params);
        let mut merged = defaults.clone();
        extend(&mut merged, &params);
        let mut tree = MediumParams::from_author_json(merged)?;
        let initial_params = tree.clone();

        let previous = extras.previous_state.take().unwrap_or_default();
        for (kind, record) in previous.view_fields.into_iter().flatten() {
            tree.view_fields.insert(kind, record);
        }

        let schemas = LocalizedSchemas::new(semantics);
        let semantics = schemas.base();
        let main = MainChannel::new();
        let dictionary = Rc::new(L10nDictionary::new(&tree.l10n, &tree.a11y));
        let content_id = content_id.into();

        let dialog = build_dialog(&semantics, &tree, dialog_env(&env, &dictionary), main.clone());
        let adapter = MediaAdapter::new(
            env.runtime.clone(),
            main.clone(),
            &tree.content_type,
            &tree.active_view_fields(),
            content_id.clone(),
            previous.exercise.as_ref(),
        );

        tracing::info!(
            target: "medium::controller",
            library = %tree.content_type.library,
            author_mode = extras.author_mode,
            restored = previous.exercise.is_some(),
            "editable medium ready"
        );

        let medium = Self {
            semantics,
            schemas,
            defaults,
            params: tree,
            initial_params,
            content_id,
            extras,
            previous_exercise: previous.exercise,
            main,
            dictionary,
            env,
            dialog,
            adapter,
            answer_given: false,
            content_was_reset: Cell::new(false),
            wrapper: None,
        };
        medium.schedule_resize();
        Ok(medium)
    }

    /// Mount into the host's wrapper. Retries a failed instantiation.
    pub fn attach(&mut self, wrapper: &mut Container) {
        wrapper.add_class(MAIN_CLASS);
        self.wrapper = Some(wrapper.clone());
        self.adapter.initialize();
        self.adapter.reset(true);
    }

    /// Whether the host should render an edit button.
    pub fn shows_edit_button(&self) -> bool {
        self.params.behaviour.user_can_edit && !self.params.behaviour.delegate_editor_dialog
    }

    pub fn open_dialog(&mut self, active_element: Option<Rc<dyn Focusable>>) {
        self.dialog.show(active_element);
    }

    /// Save the dialog, reconciling its entries into the tree on success.
    pub fn save_dialog(&mut self) -> DialogOutcome {
        let outcome = self.dialog.save();
        if let DialogOutcome::Saved(entries) = &outcome {
            self.apply_saved(entries);
        }
        outcome
    }

    pub fn cancel_dialog(&mut self) -> DialogOutcome {
        self.dialog.cancel()
    }

    pub fn handle_click(&mut self, target: &dyn ClickTarget) -> DialogOutcome {
        self.dialog.handle_click(target)
    }

    pub fn handle_key(&mut self, key: &str) -> DialogOutcome {
        self.dialog.handle_key(key)
    }

    fn apply_saved(&mut self, entries: &[FieldEntry]) {
        if self.extras.author_mode {
            // The saved list becomes the whole active record, then the
            // whole tree is rebuilt over the construction defaults. Saved
            // modes move into behaviour before the records are re-synced.
            let mut tree = self.params.to_author_json();
            let key = self.params.kind().as_ref().and_then(MediaKind::author_key);
            if let (Some(key), Value::Object(map)) = (key, &mut tree) {
                map.insert(key.into(), Value::Object(entries_to_object(entries)));
            }
            let mut rebuilt = self.defaults.clone();
            extend(&mut rebuilt, &tree);
            match MediumParams::from_author_json(rebuilt) {
                Ok(mut params) => {
                    params.adopt_view_modes();
                    params.sync_behaviour_view_fields();
                    self.params = params;
                    self.dictionary = Rc::new(L10nDictionary::new(&self.params.l10n, &self.params.a11y));
                    self.rebuild_dialog();
                }
                Err(error) => {
                    tracing::error!(target: "medium::controller", %error, "saved parameters rejected");
                    return;
                }
            }
        } else {
            self.patch_active(entries);
        }

        self.update_exercise();
    }

    fn patch_active(&mut self, entries: &[FieldEntry]) {
        let Some(kind) = self.params.kind() else {
            tracing::warn!(target: "medium::controller", "no media kind, nothing to patch");
            return;
        };

        let record = self.params.view_fields.entry(&kind);
        let mut changed = false;
        for entry in entries {
            changed |= record.patch(&entry.name, entry.value.clone());
        }

        if changed && !self.answer_given {
            tracing::debug!(target: "medium::controller", %kind, "first answer given");
            self.answer_given = true;
        }
    }

    /// Replace the adapter with one derived from the current tree.
    fn update_exercise(&mut self) {
        // The old handle's listeners go before the new handle attaches.
        self.adapter.teardown();
        self.adapter = MediaAdapter::new(
            self.env.runtime.clone(),
            self.main.clone(),
            &self.params.content_type,
            &self.params.active_view_fields(),
            self.content_id.clone(),
            self.previous_exercise.as_ref(),
        );
        self.schedule_resize();
    }

    fn rebuild_dialog(&mut self) {
        self.dialog = build_dialog(
            &self.semantics,
            &self.params,
            dialog_env(&self.env, &self.dictionary),
            self.main.clone(),
        );
    }

    fn schedule_resize(&self) {
        let main = self.main.clone();
        self.env.frames.request_frame(Box::new(move || {
            main.trigger(MediaEvent::Resize, &Value::Null);
        }));
    }

    /// Notify the outer scope and the media of a resize.
    pub fn trigger_resize(&self) {
        self.main.trigger(MediaEvent::Resize, &Value::Null);
    }

    /// Swap to the schema translated into `language`. Returns whether the
    /// dialog now uses it; on failure the current schema stays.
    pub async fn localize(&mut self, store: &impl SchemaStore, language: &str) -> bool {
        let library = self
            .extras
            .library
            .clone()
            .unwrap_or_else(|| DEFAULT_UBER_NAME.to_owned());
        let Some(semantics) = self.schemas.get(store, language, &library).await else {
            return false;
        };

        self.semantics = semantics;
        self.rebuild_dialog();
        true
    }

    pub fn title(&self) -> String {
        self.extras
            .metadata_title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.description())
    }

    pub fn description(&self) -> String {
        match self.params.kind() {
            Some(kind) => format!("{DEFAULT_DESCRIPTION} ({kind})"),
            None => DEFAULT_DESCRIPTION.to_owned(),
        }
    }

    pub fn summary(&self) -> String {
        self.adapter.summary(self.dictionary.as_ref())
    }

    pub fn params(&self) -> &MediumParams {
        &self.params
    }

    pub fn adapter(&self) -> &MediaAdapter<R> {
        &self.adapter
    }

    pub fn dialog(&self) -> &OverlayDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut OverlayDialog {
        &mut self.dialog
    }

    /// The outer channel; hosts listen here for resizes.
    pub fn main(&self) -> &Rc<MainChannel> {
        &self.main
    }

    pub fn wrapper(&self) -> Option<&Container> {
        self.wrapper.as_ref()
    }
}

impl<R: HostRuntime> QuestionContract for EditableMedium<R> {
    fn answer_given(&self) -> bool {
        self.answer_given
    }

    fn reset_task(&mut self) {
        self.content_was_reset.set(true);
        self.answer_given = false;
        self.previous_exercise = None;
        self.params = self.initial_params.clone();
        self.rebuild_dialog();

        let view_fields = self.params.active_view_fields();
        if self.adapter.derived_from(&self.params.content_type, &view_fields) {
            self.adapter.reset(false);
            self.schedule_resize();
        } else {
            self.update_exercise();
        }
    }

    fn current_state(&self) -> Option<PersistedState> {
        if !self.answer_given {
            // Clears what the host stored before the reset.
            return self
                .content_was_reset
                .replace(false)
                .then(PersistedState::default);
        }

        let view_fields = self.params.kind().map(|kind| {
            let record = self.params.view_fields.get_or_empty(&kind);
            BTreeMap::from([(kind, record)])
        });

        Some(PersistedState {
            exercise: Some(self.adapter.current_state()),
            view_fields,
        })
    }

    fn xapi_data(&self) -> Option<Value> {
        let mut data = json!({
            "statement": {
                "verb": {
                    "id": XAPI_COMPLETED,
                    "display": { "en-US": "completed" }
                },
                "object": {
                    "objectType": "Activity",
                    "definition": {
                        "name": { "en-US": self.title() },
                        "description": { "en-US": self.description() }
                    }
                }
            }
        });
        if let Some(child) = self.adapter.xapi_data() {
            data["children"] = json!([child]);
        }
        Some(data)
    }
}

impl<R: HostRuntime> std::fmt::Debug for EditableMedium<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableMedium")
            .field("content_id", &self.content_id)
            .field("library", &self.params.content_type.library)
            .field("author_mode", &self.extras.author_mode)
            .field("answer_given", &self.answer_given)
            .field("adapter", &self.adapter)
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}

/// Schema defaults, then an image content type and behaviour-seeded records.
fn construction_defaults(semantics: &Semantics, author: &Value) -> Value {
    let sizing_mode = author
        .pointer("/behaviour/sizingMode")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SIZING_MODE);
    let player_mode = author
        .pointer("/contentType/params/playerMode")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PLAYER_MODE);

    let mut seeded = Map::new();
    seeded.insert(
        "contentType".into(),
        json!({
            "library": DEFAULT_LIBRARY,
            "params": {},
            "subContentId": uuid::Uuid::new_v4().to_string()
        }),
    );
    for kind in MediaKind::with_view_fields() {
        let record = match kind {
            MediaKind::Image => json!({ "sizingMode": sizing_mode }),
            MediaKind::Audio => json!({ "playerMode": player_mode }),
            _ => json!({}),
        };
        if let Some(key) = kind.author_key() {
            seeded.insert(key.into(), record);
        }
    }

    let mut defaults = Value::Object(semantics_defaults(semantics));
    extend(&mut defaults, &Value::Object(seeded));
    defaults
}

fn dialog_env<R>(env: &MediumEnv<R>, dictionary: &Rc<L10nDictionary>) -> DialogEnv {
    DialogEnv {
        frames: env.frames.clone(),
        focus_trap: env.focus_trap.clone(),
        dictionary: dictionary.clone(),
    }
}

/// The dialog over the active kind's view-field group.
///
/// Kinds without a group in the schema get a dialog without fields.
fn build_dialog(
    semantics: &Semantics,
    params: &MediumParams,
    env: DialogEnv,
    main: Rc<MainChannel>,
) -> OverlayDialog {
    let (group, values) = match params.kind().as_ref().and_then(MediaKind::author_key) {
        Some(key) => match find_field(key, semantics) {
            Some(group) => (FieldGroup::from(group), params.active_view_fields()),
            None => {
                let error = SchemaError::MissingField(key.to_owned());
                tracing::warn!(target: "medium::controller", %error, "dialog left empty");
                (FieldGroup::default(), ViewFields::new())
            }
        },
        None => (FieldGroup::default(), ViewFields::new()),
    };

    OverlayDialog::new(&group, &values, env, main)
}
