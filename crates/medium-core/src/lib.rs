//! Framework-agnostic core of the editable medium.
//!
//! An author embeds an image, audio or video in a slot and exposes a few of
//! its settings ("view fields") to end users through a modal dialog. This
//! crate keeps the embedded instance, the persisted parameters and the
//! dialog consistent across edits, resets and resizes.
//!
//! Everything platform-specific is reached through the traits in
//! [`platform`]: the host content runtime, focus handling, frame scheduling
//! and translations.

pub mod adapter;
pub mod contract;
pub mod controller;
pub mod dialog;
pub mod events;
pub mod fields;
pub mod kind;
pub mod l10n;
pub mod mime;
pub mod params;
pub mod platform;
pub mod schema;
pub mod state;
pub mod value;

pub use adapter::{MediaAdapter, derive_native};
pub use contract::QuestionContract;
pub use controller::{EditableMedium, Extras, MediumEnv};
pub use dialog::{DialogEnv, DialogOutcome, OverlayDialog};
pub use events::MainChannel;
pub use fields::OptionField;
pub use kind::MediaKind;
pub use l10n::{L10nDictionary, LocalizedSchemas, SchemaStore};
pub use params::{ContentDescription, MediumParams};
pub use platform::{
    ClickTarget, Container, Dictionary, FocusTrap, Focusable, FrameScheduler, HostRuntime,
    ImmediateFrames, Listener, ListenerId, MediaEvent, MediaHandle, NoFocusTrap,
};
pub use schema::{FieldSchema, FieldType, Semantics};
pub use state::{ExerciseState, PersistedState};
pub use value::{FieldEntry, FieldValue, ViewFields};

pub use medium_common::MediumError;
