//! A recording host runtime for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use medium_core::{
    Container, ContentDescription, HostRuntime, Listener, ListenerId, MediaEvent, MediaHandle,
};
use serde_json::{Value, json};

/// Everything one handle saw. Outlives the handle itself.
#[derive(Default)]
pub struct HandleLog {
    pub content: ContentDescription,
    pub previous_state: Option<Value>,
    pub listeners: RefCell<Vec<(ListenerId, MediaEvent, Listener)>>,
    next_id: Cell<u64>,
    pub attached_to: RefCell<Vec<Container>>,
    pub received: RefCell<Vec<MediaEvent>>,
    pub resets: Cell<u32>,
    pub resettable: bool,
}

impl HandleLog {
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn received_count(&self, event: MediaEvent) -> usize {
        self.received.borrow().iter().filter(|e| **e == event).count()
    }
}

pub struct FakeHandle(pub Rc<HandleLog>);

impl FakeHandle {
    /// Emit `event` from the content side, as the content itself would.
    pub fn emit(&self, event: MediaEvent) {
        dispatch(&self.0, event, &Value::Null);
    }
}

fn dispatch(log: &HandleLog, event: MediaEvent, payload: &Value) {
    let snapshot: Vec<Listener> = log
        .listeners
        .borrow()
        .iter()
        .filter(|(_, e, _)| *e == event)
        .map(|(_, _, l)| l.clone())
        .collect();
    for listener in snapshot {
        listener(payload);
    }
}

impl MediaHandle for FakeHandle {
    fn on(&self, event: MediaEvent, listener: Listener) -> ListenerId {
        let id = ListenerId(self.0.next_id.get());
        self.0.next_id.set(id.0 + 1);
        self.0.listeners.borrow_mut().push((id, event, listener));
        id
    }

    fn off(&self, _event: MediaEvent, id: ListenerId) {
        self.0.listeners.borrow_mut().retain(|(lid, _, _)| *lid != id);
    }

    fn trigger(&self, event: MediaEvent, payload: &Value) {
        self.0.received.borrow_mut().push(event);
        dispatch(&self.0, event, payload);
    }

    fn attach(&self, container: &Container) {
        self.0.attached_to.borrow_mut().push(container.clone());
    }

    fn current_state(&self) -> Option<Value> {
        Some(json!({ "progress": self.0.resets.get() }))
    }

    fn reset_task(&self) -> bool {
        if self.0.resettable {
            self.0.resets.set(self.0.resets.get() + 1);
        }
        self.0.resettable
    }

    fn xapi_data(&self) -> Option<Value> {
        Some(json!({ "statement": { "object": { "id": self.0.content.library } } }))
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    pub handles: RefCell<Vec<Rc<HandleLog>>>,
    /// Number of upcoming instantiations that fail.
    pub failures: Cell<u32>,
    pub resettable: bool,
}

impl FakeRuntime {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn resettable() -> Rc<Self> {
        Rc::new(Self {
            resettable: true,
            ..Self::default()
        })
    }

    pub fn last(&self) -> Rc<HandleLog> {
        self.handles
            .borrow()
            .last()
            .cloned()
            .expect("no handle was instantiated")
    }

    pub fn count(&self) -> usize {
        self.handles.borrow().len()
    }
}

impl HostRuntime for FakeRuntime {
    type Handle = FakeHandle;

    fn instantiate(
        &self,
        content: &ContentDescription,
        _content_id: &str,
        previous_state: Option<&Value>,
    ) -> Option<FakeHandle> {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return None;
        }
        let log = Rc::new(HandleLog {
            content: content.clone(),
            previous_state: previous_state.cloned(),
            resettable: self.resettable,
            ..HandleLog::default()
        });
        self.handles.borrow_mut().push(log.clone());
        Some(FakeHandle(log))
    }
}

/// A schema with one view-field group per kind.
pub fn semantics() -> Value {
    json!([
        {
            "name": "contentType",
            "type": "library",
            "options": ["H5P.Image 1.1", "H5P.Audio 1.5", "H5P.Video 1.6"]
        },
        {
            "name": "behaviour",
            "type": "group",
            "fields": [
                { "name": "userCanEdit", "type": "boolean", "default": true },
                { "name": "delegateEditorDialog", "type": "boolean", "default": false },
                {
                    "name": "sizingMode",
                    "type": "select",
                    "default": "contain",
                    "options": [{ "value": "contain", "label": "Contain" }, { "value": "cover", "label": "Cover" }]
                }
            ]
        },
        {
            "name": "viewFieldsImage",
            "type": "group",
            "label": "Image",
            "fields": [
                {
                    "name": "sourceURL",
                    "type": "text",
                    "label": "Source",
                    "regexp": { "pattern": "^https?://.+", "message": "Enter a web address" }
                },
                {
                    "name": "sizingMode",
                    "type": "select",
                    "label": "Sizing",
                    "options": [{ "value": "contain", "label": "Contain" }, { "value": "cover", "label": "Cover" }]
                }
            ]
        },
        {
            "name": "viewFieldsAudio",
            "type": "group",
            "label": "Audio",
            "fields": [
                { "name": "sourceURL", "type": "text", "label": "Source" },
                {
                    "name": "playerMode",
                    "type": "select",
                    "label": "Player",
                    "options": [{ "value": "full", "label": "Full" }, { "value": "minimalistic", "label": "Minimal" }]
                }
            ]
        },
        {
            "name": "viewFieldsVideo",
            "type": "group",
            "label": "Video",
            "fields": [{ "name": "sourceURL", "type": "text", "label": "Source" }]
        },
        {
            "name": "l10n",
            "type": "group",
            "fields": [
                { "name": "save", "type": "text", "default": "Save" },
                { "name": "cancel", "type": "text", "default": "Cancel" }
            ]
        },
        {
            "name": "a11y",
            "type": "group",
            "fields": [
                { "name": "image", "type": "text", "default": "Image" },
                { "name": "audio", "type": "text", "default": "Audio" },
                { "name": "video", "type": "text", "default": "Video" },
                { "name": "close", "type": "text", "default": "Close" }
            ]
        }
    ])
}
