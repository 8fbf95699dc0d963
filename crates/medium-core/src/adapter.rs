//! Bridge between view fields and a live host handle.
//!
//! [`derive_native`] turns the active view-field record into the native
//! description of the chosen kind. [`MediaAdapter`] instantiates that
//! description through the [`HostRuntime`], attaches it, and relays resizes
//! both ways between the handle and the controller's [`MainChannel`].

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value, json};
use smol_str::format_smolstr;

use crate::events::MainChannel;
use crate::kind::MediaKind;
use crate::mime::{self, FITTABLE_VIDEO_MIMES};
use crate::params::ContentDescription;
use crate::platform::{Container, Dictionary, HostRuntime, ListenerId, MediaEvent, MediaHandle};
use crate::state::ExerciseState;
use crate::value::ViewFields;

pub const INSTANCE_CLASS: &str = "h5p-editable-medium-exercise-instance";

/// Native description for `content` with the view fields applied.
///
/// Kinds without derivation rules pass through unchanged.
pub fn derive_native(content: &ContentDescription, view_fields: &ViewFields) -> ContentDescription {
    let mut native = content.clone();
    let source = view_fields.get_str("sourceURL").filter(|s| !s.is_empty());
    let params = &mut native.params;

    match content.kind() {
        Some(MediaKind::Image) => {
            if let Some(path) = source {
                params.insert(
                    "file".into(),
                    json!({ "mime": mime::image_mime(path), "path": path }),
                );
            }
        }
        Some(MediaKind::Audio) => {
            params.insert("fitToWrapper".into(), Value::Bool(true));
            if let Some(mode) = view_fields.get_str("playerMode").filter(|m| !m.is_empty()) {
                params.insert("playerMode".into(), Value::String(mode.to_owned()));
            }
            if let Some(path) = source {
                params.insert("files".into(), json!([unlicensed(mime::audio_mime(path), path)]));
            }
        }
        Some(MediaKind::Video) => {
            if let Some(path) = source {
                let mime = mime::video_mime(path);
                let fit = FITTABLE_VIDEO_MIMES.contains(&mime.as_str());
                params.insert("sources".into(), json!([unlicensed(mime, path)]));

                let visuals = params
                    .entry("visuals")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !visuals.is_object() {
                    *visuals = Value::Object(Map::new());
                }
                if let Value::Object(visuals) = visuals {
                    visuals.insert("fit".into(), Value::Bool(fit));
                }
            }
        }
        Some(MediaKind::Other(_)) | None => {}
    }

    native
}

fn unlicensed(mime: String, path: &str) -> Value {
    json!({ "copyright": { "license": "U" }, "mime": mime, "path": path })
}

/// Container classes projected from the view fields.
fn container_for(kind: Option<&MediaKind>, view_fields: &ViewFields) -> Container {
    let mut container =
        Container::new(format_smolstr!("exercise-{}", uuid::Uuid::new_v4())).with_class(INSTANCE_CLASS);
    if kind == Some(&MediaKind::Image) {
        if let Some(mode) = view_fields.get_str("sizingMode") {
            container.add_class(format_smolstr!("sizing-{mode}"));
        }
    }
    container
}

/// Owns the live handle for one derivation.
pub struct MediaAdapter<R: HostRuntime> {
    runtime: Rc<R>,
    main: Rc<MainChannel>,
    source: (ContentDescription, ViewFields),
    content: ContentDescription,
    content_id: String,
    previous_state: Option<Value>,
    container: Container,
    handle: Option<Rc<R::Handle>>,
    attached: Rc<Cell<bool>>,
    handle_listeners: Vec<(MediaEvent, ListenerId)>,
    down_listener: Option<ListenerId>,
}

impl<R: HostRuntime> MediaAdapter<R> {
    /// Derive, instantiate and attach.
    pub fn new(
        runtime: Rc<R>,
        main: Rc<MainChannel>,
        content: &ContentDescription,
        view_fields: &ViewFields,
        content_id: impl Into<String>,
        previous_state: Option<&ExerciseState>,
    ) -> Self {
        let native = derive_native(content, view_fields);
        let container = container_for(native.kind().as_ref(), view_fields);

        let mut adapter = Self {
            runtime,
            main,
            source: (content.clone(), view_fields.clone()),
            content: native,
            content_id: content_id.into(),
            previous_state: previous_state.and_then(|s| s.instance_state.clone()),
            container,
            handle: None,
            attached: Rc::new(Cell::new(false)),
            handle_listeners: Vec::new(),
            down_listener: None,
        };
        adapter.initialize();
        adapter.attach();
        adapter
    }

    /// Instantiate the handle unless one is live. A runtime failure leaves
    /// the adapter handle-less; calling again retries.
    pub fn initialize(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let Some(handle) =
            self.runtime
                .instantiate(&self.content, &self.content_id, self.previous_state.as_ref())
        else {
            tracing::warn!(
                target: "medium::adapter",
                library = %self.content.library,
                "host runtime produced no handle"
            );
            return;
        };
        let handle = Rc::new(handle);

        if self.content.kind() == Some(MediaKind::Image) {
            let main = Rc::downgrade(&self.main);
            let id = handle.on(
                MediaEvent::Loaded,
                Rc::new(move |_: &Value| {
                    if let Some(main) = main.upgrade() {
                        main.trigger(MediaEvent::Resize, &Value::Null);
                    }
                }),
            );
            self.handle_listeners.push((MediaEvent::Loaded, id));
        }

        // Child resizes go up, marked so they are not sent straight back.
        let main = Rc::downgrade(&self.main);
        let id = handle.on(
            MediaEvent::Resize,
            Rc::new(move |payload: &Value| {
                if let Some(main) = main.upgrade() {
                    main.bubble_up(MediaEvent::Resize, payload);
                }
            }),
        );
        self.handle_listeners.push((MediaEvent::Resize, id));

        self.down_listener = Some(self.listen_downward(&handle));
        self.handle = Some(handle);

        tracing::debug!(target: "medium::adapter", library = %self.content.library, "instantiated");
    }

    fn listen_downward(&self, handle: &Rc<R::Handle>) -> ListenerId {
        let main: Weak<MainChannel> = Rc::downgrade(&self.main);
        let handle: Weak<R::Handle> = Rc::downgrade(handle);
        let attached = self.attached.clone();
        self.main.on(
            MediaEvent::Resize,
            Rc::new(move |payload: &Value| {
                let bubbling = main.upgrade().is_some_and(|m| m.is_bubbling_upwards());
                if bubbling || !attached.get() {
                    return;
                }
                if let Some(handle) = handle.upgrade() {
                    handle.trigger(MediaEvent::Resize, payload);
                }
            }),
        )
    }

    /// Attach the handle to the container. Later calls are no-ops.
    pub fn attach(&mut self) {
        if self.attached.get() {
            return;
        }
        let Some(handle) = &self.handle else {
            return;
        };
        handle.attach(&self.container);
        self.attached.set(true);
    }

    /// Reset the content. `is_initial` only makes sure the handle is attached.
    pub fn reset(&mut self, is_initial: bool) {
        if !self.attached.get() {
            self.attach();
        }
        if is_initial {
            return;
        }
        let Some(handle) = self.handle.clone() else {
            return;
        };
        if handle.reset_task() {
            return;
        }

        tracing::debug!(target: "medium::adapter", "no incremental reset, re-instantiating");
        self.teardown();
        // A reset starts from scratch, not from the restored session.
        self.previous_state = None;
        self.initialize();
        self.attach();
    }

    /// Whether this adapter was derived from exactly these inputs.
    pub fn derived_from(&self, content: &ContentDescription, view_fields: &ViewFields) -> bool {
        self.source.0 == *content && self.source.1 == *view_fields
    }

    /// Release every listener and drop the handle.
    pub fn teardown(&mut self) {
        if let Some(id) = self.down_listener.take() {
            self.main.off(id);
        }
        if let Some(handle) = self.handle.take() {
            for (event, id) in self.handle_listeners.drain(..) {
                handle.off(event, id);
            }
        }
        self.handle_listeners.clear();
        self.attached.set(false);
    }

    /// `"<type name>: <title>"`, or just the type name without a title.
    pub fn summary(&self, dictionary: &dyn Dictionary) -> String {
        let kind = self.content.kind();
        let type_name = kind
            .as_ref()
            .map(|k| dictionary.get(&k.a11y_key()))
            .unwrap_or_default();

        let title = match kind {
            Some(MediaKind::Image) => match self.content.params.get("alt") {
                Some(Value::String(alt)) => Some(alt.as_str()),
                Some(Value::Null) | None => self.content.metadata_title(),
                Some(_) => None,
            },
            Some(MediaKind::Audio | MediaKind::Video) => self.content.metadata_title(),
            Some(MediaKind::Other(_)) | None => None,
        };

        match title.filter(|t| !t.is_empty()) {
            Some(title) => format!("{type_name}: {title}"),
            None => type_name,
        }
    }

    pub fn current_state(&self) -> ExerciseState {
        ExerciseState {
            instance_state: self.handle.as_ref().and_then(|h| h.current_state()),
        }
    }

    pub fn xapi_data(&self) -> Option<Value> {
        self.handle.as_ref().and_then(|h| h.xapi_data())
    }

    /// The derived native description.
    pub fn content(&self) -> &ContentDescription {
        &self.content
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn handle(&self) -> Option<&Rc<R::Handle>> {
        self.handle.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

impl<R: HostRuntime> Drop for MediaAdapter<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<R: HostRuntime> std::fmt::Debug for MediaAdapter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAdapter")
            .field("library", &self.content.library)
            .field("container", &self.container)
            .field("has_handle", &self.handle.is_some())
            .field("attached", &self.attached.get())
            .finish()
    }
}
