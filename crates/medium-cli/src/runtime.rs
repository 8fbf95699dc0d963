//! A host runtime that renders nothing and remembers what it was asked to do.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use medium_core::{
    Container, ContentDescription, HostRuntime, Listener, ListenerId, MediaEvent, MediaHandle,
};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct RecordingRuntime {
    instantiated: RefCell<Vec<ContentDescription>>,
}

impl RecordingRuntime {
    pub fn instantiations(&self) -> usize {
        self.instantiated.borrow().len()
    }
}

impl HostRuntime for RecordingRuntime {
    type Handle = RecordedHandle;

    fn instantiate(
        &self,
        content: &ContentDescription,
        content_id: &str,
        previous_state: Option<&Value>,
    ) -> Option<RecordedHandle> {
        tracing::info!(
            library = %content.library,
            %content_id,
            restored = previous_state.is_some(),
            "instantiate"
        );
        self.instantiated.borrow_mut().push(content.clone());
        Some(RecordedHandle {
            previous_state: previous_state.cloned(),
            ..RecordedHandle::default()
        })
    }
}

#[derive(Default)]
pub struct RecordedHandle {
    listeners: RefCell<Vec<(ListenerId, MediaEvent, Listener)>>,
    next_id: Cell<u64>,
    previous_state: Option<Value>,
}

impl MediaHandle for RecordedHandle {
    fn on(&self, event: MediaEvent, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, event, listener));
        id
    }

    fn off(&self, _event: MediaEvent, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _, _)| *lid != id);
    }

    fn trigger(&self, event: MediaEvent, payload: &Value) {
        tracing::trace!(%event, "handle received");
        let snapshot: Vec<Listener> = self
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

    fn attach(&self, container: &Container) {
        tracing::debug!(container = %container.id, classes = ?container.classes, "attach");
    }

    /// Whatever was restored is handed back unchanged.
    fn current_state(&self) -> Option<Value> {
        self.previous_state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_instantiations_and_dispatches() {
        let runtime = RecordingRuntime::default();
        let content: ContentDescription =
            serde_json::from_value(json!({ "library": "H5P.Image 1.1" })).unwrap();
        let handle = runtime
            .instantiate(&content, "1", Some(&json!({ "zoom": 2 })))
            .unwrap();
        assert_eq!(runtime.instantiations(), 1);
        assert_eq!(handle.current_state(), Some(json!({ "zoom": 2 })));

        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = handle.on(
            MediaEvent::Resize,
            Rc::new(move |_: &Value| counter.set(counter.get() + 1)),
        );
        handle.trigger(MediaEvent::Resize, &Value::Null);
        handle.off(MediaEvent::Resize, id);
        handle.trigger(MediaEvent::Resize, &Value::Null);
        assert_eq!(hits.get(), 1);
    }
}
