//! Platform abstraction traits.
//!
//! These traits define the interface between the reconciliation engine and the
//! host page: the content runtime that renders media, focus handling, frame
//! scheduling and translations. The browser integration implements them over
//! the DOM; tests implement them with plain recording structs.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use smol_str::SmolStr;

use crate::params::ContentDescription;

/// Events exchanged with a media handle and the main channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    Resize,
    /// The media finished loading its asset.
    Loaded,
}

impl MediaEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaEvent::Resize => "resize",
            MediaEvent::Loaded => "loaded",
        }
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event listener. Payloads are opaque to the engine and forwarded verbatim.
pub type Listener = Rc<dyn Fn(&Value)>;

/// Identifies a registered listener so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A live instance produced by the host runtime.
///
/// Methods take `&self`: handles are shared between the adapter and the
/// listeners it registers, so implementations use interior mutability.
/// `trigger` must not hold a borrow while calling listeners, because a
/// listener may call back into the same handle.
pub trait MediaHandle {
    fn on(&self, event: MediaEvent, listener: Listener) -> ListenerId;

    fn off(&self, event: MediaEvent, id: ListenerId);

    fn trigger(&self, event: MediaEvent, payload: &Value);

    /// Render into `container`. Called at most once per handle.
    fn attach(&self, container: &Container);

    /// State the handle wants persisted, if any.
    fn current_state(&self) -> Option<Value> {
        None
    }

    /// Incremental reset. Returns `false` when the content has none, in which
    /// case the caller tears the handle down and instantiates a fresh one.
    fn reset_task(&self) -> bool {
        false
    }

    /// xAPI statement data reported by the content, if it reports any.
    fn xapi_data(&self) -> Option<Value> {
        None
    }
}

/// The host content runtime.
pub trait HostRuntime {
    type Handle: MediaHandle + 'static;

    /// Instantiate `content`. `None` means the runtime could not produce a
    /// handle; callers must stay usable in that case.
    fn instantiate(
        &self,
        content: &ContentDescription,
        content_id: &str,
        previous_state: Option<&Value>,
    ) -> Option<Self::Handle>;
}

/// Translation lookup.
pub trait Dictionary {
    fn get(&self, key: &str) -> String;
}

/// Keeps keyboard focus inside the open dialog.
pub trait FocusTrap {
    fn activate(&self);
    fn deactivate(&self);
}

/// An element focus can return to.
pub trait Focusable {
    fn is_connected(&self) -> bool;
    fn focus(&self);
}

/// The target of a document-level click.
pub trait ClickTarget {
    /// Whether the element is still part of the live document.
    fn is_connected(&self) -> bool;
    /// Whether the element lies within the region with dom id `region`.
    fn is_within(&self, region: &str) -> bool;
}

/// Defers work to the next animation/idle frame so layout can settle.
pub trait FrameScheduler {
    fn request_frame(&self, task: Box<dyn FnOnce()>);
}

/// Runs frame tasks immediately. Suitable for hosts without a layout pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateFrames;

impl FrameScheduler for ImmediateFrames {
    fn request_frame(&self, task: Box<dyn FnOnce()>) {
        task();
    }
}

/// Focus trap for hosts that do not trap focus.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocusTrap;

impl FocusTrap for NoFocusTrap {
    fn activate(&self) {}
    fn deactivate(&self) {}
}

/// Description of an element the engine renders into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Container {
    pub id: SmolStr,
    pub classes: Vec<SmolStr>,
}

impl Container {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.add_class(class);
        self
    }

    pub fn add_class(&mut self, class: impl Into<SmolStr>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}
