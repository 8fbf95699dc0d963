//! The controller-scoped "main" notification channel.
//!
//! Resizes flow up from the media handle into this channel and down from it
//! into the handle. The channel carries the "bubbling upward" mark that keeps
//! the two directions from ping-ponging. Each controller owns its own channel,
//! so several media on one page never see each other's mark.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::platform::{Listener, ListenerId, MediaEvent};

#[derive(Default)]
pub struct MainChannel {
    listeners: RefCell<Vec<(ListenerId, MediaEvent, Listener)>>,
    next_id: Cell<u64>,
    bubbling_upwards: Cell<bool>,
    emitted: Cell<u64>,
}

impl MainChannel {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn on(&self, event: MediaEvent, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, event, listener));
        id
    }

    pub fn off(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _, _)| *lid != id);
    }

    /// Notify every listener of `event`.
    pub fn trigger(&self, event: MediaEvent, payload: &Value) {
        // Listeners may register, remove or trigger re-entrantly.
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, l)| l.clone())
            .collect();

        self.emitted.set(self.emitted.get() + 1);
        tracing::trace!(target: "medium::events", %event, listeners = snapshot.len(), "main channel emit");

        for listener in snapshot {
            listener(payload);
        }
    }

    /// Re-emit an event that came up from a child, marked so downward
    /// listeners do not send it straight back.
    pub fn bubble_up(&self, event: MediaEvent, payload: &Value) {
        let outer = self.bubbling_upwards.replace(true);
        self.trigger(event, payload);
        self.bubbling_upwards.set(outer);
    }

    pub fn is_bubbling_upwards(&self) -> bool {
        self.bubbling_upwards.get()
    }

    pub fn listener_count(&self, event: MediaEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .count()
    }

    /// Total number of emissions so far, for diagnostics.
    pub fn emitted(&self) -> u64 {
        self.emitted.get()
    }
}

impl std::fmt::Debug for MainChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainChannel")
            .field("listeners", &self.listeners.borrow().len())
            .field("bubbling_upwards", &self.bubbling_upwards.get())
            .finish()
    }
}
