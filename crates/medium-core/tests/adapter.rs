mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::FakeRuntime;
use medium_core::platform::Dictionary;
use medium_core::{
    ContentDescription, ExerciseState, MainChannel, MediaAdapter, MediaEvent, ViewFields,
};
use serde_json::{Value, json};

fn content(library: &str) -> ContentDescription {
    serde_json::from_value(json!({ "library": library, "params": {} })).unwrap()
}

fn image_fields() -> ViewFields {
    [("sourceURL", "https://example.com/a.png"), ("sizingMode", "cover")]
        .into_iter()
        .collect()
}

fn adapter(runtime: &Rc<FakeRuntime>, main: &Rc<MainChannel>, library: &str) -> MediaAdapter<FakeRuntime> {
    MediaAdapter::new(
        runtime.clone(),
        main.clone(),
        &content(library),
        &image_fields(),
        "42",
        None,
    )
}

/// Counts how often the main channel delivered a resize.
fn count_main_resizes(main: &Rc<MainChannel>) -> Rc<Cell<u32>> {
    let seen = Rc::new(Cell::new(0));
    let counter = seen.clone();
    main.on(
        MediaEvent::Resize,
        Rc::new(move |_: &Value| counter.set(counter.get() + 1)),
    );
    seen
}

#[test]
fn instantiates_and_attaches_once() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let mut adapter = adapter(&runtime, &main, "H5P.Image 1.1");

    adapter.attach();
    adapter.initialize();
    adapter.reset(true);

    assert_eq!(runtime.count(), 1);
    let log = runtime.last();
    assert_eq!(log.attached_to.borrow().len(), 1);
    assert!(log.attached_to.borrow()[0].has_class("sizing-cover"));
    assert_eq!(log.content.params["file"]["mime"], "image/png");
}

#[test]
fn handle_resize_bubbles_up_exactly_once() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let adapter = adapter(&runtime, &main, "H5P.Audio 1.5");
    let seen = count_main_resizes(&main);

    adapter.handle().unwrap().emit(MediaEvent::Resize);

    // One outer emission, one downward check that stands down.
    assert_eq!(main.emitted(), 1);
    assert_eq!(seen.get(), 1);
    assert_eq!(runtime.last().received_count(MediaEvent::Resize), 0);
    assert!(!main.is_bubbling_upwards());
}

#[test]
fn outer_resize_reaches_the_handle_without_looping() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let _adapter = adapter(&runtime, &main, "H5P.Audio 1.5");

    main.trigger(MediaEvent::Resize, &Value::Null);

    // Down into the handle, back up once marked, and no further.
    assert_eq!(runtime.last().received_count(MediaEvent::Resize), 1);
    assert_eq!(main.emitted(), 2);
}

#[test]
fn image_load_resizes_the_outer_scope() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let image = adapter(&runtime, &main, "H5P.Image 1.1");

    image.handle().unwrap().emit(MediaEvent::Loaded);
    // The outer resize is relayed down once and bubbles back up marked.
    assert_eq!(main.emitted(), 2);
    assert_eq!(runtime.last().received_count(MediaEvent::Resize), 1);

    let audio = adapter(&runtime, &main, "H5P.Audio 1.5");
    audio.handle().unwrap().emit(MediaEvent::Loaded);
    assert_eq!(main.emitted(), 2);
}

#[test]
fn failed_instantiation_is_inert_and_retryable() {
    let runtime = FakeRuntime::new();
    runtime.failures.set(1);
    let main = MainChannel::new();
    let mut adapter = adapter(&runtime, &main, "H5P.Video 1.6");

    assert!(adapter.handle().is_none());
    assert!(!adapter.is_attached());
    assert_eq!(main.listener_count(MediaEvent::Resize), 0);
    adapter.reset(false);
    main.trigger(MediaEvent::Resize, &Value::Null);
    assert_eq!(adapter.current_state(), ExerciseState::default());

    adapter.initialize();
    adapter.attach();
    assert!(adapter.is_attached());
    assert_eq!(runtime.count(), 1);
}

#[test]
fn reset_delegates_to_incremental_reset() {
    let runtime = FakeRuntime::resettable();
    let main = MainChannel::new();
    let mut adapter = adapter(&runtime, &main, "H5P.Image 1.1");

    adapter.reset(true);
    assert_eq!(runtime.last().resets.get(), 0);

    adapter.reset(false);
    assert_eq!(runtime.count(), 1);
    assert_eq!(runtime.last().resets.get(), 1);
}

#[test]
fn reset_without_incremental_support_reinstantiates() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let mut adapter = MediaAdapter::new(
        runtime.clone(),
        main.clone(),
        &content("H5P.Image 1.1"),
        &image_fields(),
        "42",
        Some(&ExerciseState {
            instance_state: Some(json!({ "zoom": 2 })),
        }),
    );
    let first = runtime.last();
    assert_eq!(first.previous_state, Some(json!({ "zoom": 2 })));

    adapter.reset(false);

    assert_eq!(runtime.count(), 2);
    assert_eq!(first.listener_count(), 0);
    let second = runtime.last();
    assert_eq!(second.previous_state, None);
    assert_eq!(second.attached_to.borrow().len(), 1);
    assert_eq!(main.listener_count(MediaEvent::Resize), 1);
}

#[test]
fn dropping_releases_all_listeners() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let adapter = adapter(&runtime, &main, "H5P.Image 1.1");
    let log = runtime.last();
    assert_eq!(log.listener_count(), 2);
    assert_eq!(main.listener_count(MediaEvent::Resize), 1);

    drop(adapter);
    assert_eq!(log.listener_count(), 0);
    assert_eq!(main.listener_count(MediaEvent::Resize), 0);
}

struct Names;

impl Dictionary for Names {
    fn get(&self, key: &str) -> String {
        match key {
            "a11y.image" => "Image".into(),
            "a11y.video" => "Video".into(),
            other => other.into(),
        }
    }
}

#[test]
fn summary_combines_type_and_title() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let build = |value: Value| {
        let content: ContentDescription = serde_json::from_value(value).unwrap();
        MediaAdapter::new(runtime.clone(), main.clone(), &content, &ViewFields::new(), "1", None)
    };

    let alt = build(json!({
        "library": "H5P.Image 1.1",
        "params": { "alt": "A lighthouse" },
        "metadata": { "title": "lighthouse.png" }
    }));
    assert_eq!(alt.summary(&Names), "Image: A lighthouse");

    let titled = build(json!({
        "library": "H5P.Image 1.1",
        "params": {},
        "metadata": { "title": "lighthouse.png" }
    }));
    assert_eq!(titled.summary(&Names), "Image: lighthouse.png");

    let empty_alt = build(json!({
        "library": "H5P.Image 1.1",
        "params": { "alt": "" },
        "metadata": { "title": "ignored" }
    }));
    assert_eq!(empty_alt.summary(&Names), "Image");

    let video = build(json!({ "library": "H5P.Video 1.6", "params": {} }));
    assert_eq!(video.summary(&Names), "Video");
}

#[test]
fn state_and_xapi_come_from_the_handle() {
    let runtime = FakeRuntime::new();
    let main = MainChannel::new();
    let adapter = adapter(&runtime, &main, "H5P.Image 1.1");
    assert_eq!(
        adapter.current_state().instance_state,
        Some(json!({ "progress": 0 }))
    );
    assert_eq!(
        adapter.xapi_data().unwrap()["statement"]["object"]["id"],
        "H5P.Image 1.1"
    );
}
