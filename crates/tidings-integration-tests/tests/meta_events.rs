//! Integration tests for `AddListenerEvent` and `RemoveListenerEvent`.

mod common;

use std::sync::Arc;

use tidings::{
    AddListenerEvent, Callback, Context, EmitterConfig, EventKey, RemoveListenerEvent,
};
use tidings_test::{MetaRecorder, Recorder};

fn removal_log(emitter: &tidings::EventEmitter) -> (Arc<std::sync::Mutex<Vec<EventKey>>>, Callback) {
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let callback = Callback::typed::<RemoveListenerEvent, _>(move |removed, _| {
        sink.lock().unwrap().push(removed.event.clone());
        Ok(())
    });
    emitter
        .on(EventKey::of::<RemoveListenerEvent>(), &callback, None)
        .unwrap();
    (seen, callback)
}

#[test]
fn test_off_everything_reports_every_removal_including_its_own() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    emitter.on("X", &recorder.listener("x"), None).unwrap();
    emitter.on("Y", &recorder.listener("y"), None).unwrap();
    let (seen, _) = removal_log(&emitter);

    assert_eq!(emitter.off_all(), 3);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            EventKey::from("X"),
            EventKey::from("Y"),
            EventKey::of::<RemoveListenerEvent>(),
        ]
    );
    assert_eq!(emitter.total_listeners(), 0);
}

#[test]
fn test_removal_listener_removing_only_itself_hears_it() {
    let emitter = common::emitter("meta");
    let (seen, callback) = removal_log(&emitter);

    emitter.off_listener(EventKey::of::<RemoveListenerEvent>(), &callback, None);
    emitter.on("after", &Recorder::new().listener("z"), None).unwrap();
    emitter.off_event("after");

    assert_eq!(*seen.lock().unwrap(), vec![EventKey::of::<RemoveListenerEvent>()]);
}

#[test]
fn test_removal_carries_callback_and_context() {
    let emitter = common::emitter("meta");
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let watcher = Callback::typed::<RemoveListenerEvent, _>(move |removed, _| {
        sink.lock().unwrap().push(removed.clone());
        Ok(())
    });
    emitter.on(EventKey::of::<RemoveListenerEvent>(), &watcher, None).unwrap();

    let listener = Recorder::new().listener("owned");
    let owner = Context::new("owner");
    emitter.on("e", &listener, Some(&owner)).unwrap();
    emitter.clear_listeners(&owner);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].event, EventKey::from("e"));
    assert_eq!(seen[0].listener, listener);
    assert_eq!(seen[0].context.as_ref(), Some(&owner));
}

#[test]
fn test_clear_listeners_reports_in_encounter_order() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    let (seen, _) = removal_log(&emitter);
    let view = Context::new("view");

    emitter.on("b", &recorder.listener("b1"), Some(&view)).unwrap();
    emitter.on("a", &recorder.listener("a1"), Some(&view)).unwrap();
    emitter.on("b", &recorder.listener("b2"), Some(&view)).unwrap();

    assert_eq!(emitter.clear_listeners(&view), 3);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![EventKey::from("b"), EventKey::from("b"), EventKey::from("a")]
    );
}

#[test]
fn test_every_registration_is_announced() {
    let emitter = common::emitter("meta");
    let meta = MetaRecorder::attach(&emitter).unwrap();
    meta.reset();
    let recorder = Recorder::new();

    emitter.on("a", &recorder.listener("a"), None).unwrap();
    emitter.once("b", &recorder.listener("b"), None).unwrap();
    assert!(emitter.on("a", &recorder.listener("a2"), None).is_ok());

    assert_eq!(
        meta.added(),
        vec![EventKey::from("a"), EventKey::from("b"), EventKey::from("a")]
    );
}

#[test]
fn test_rejected_registration_is_not_announced() {
    let emitter = common::emitter("meta");
    let meta = MetaRecorder::attach(&emitter).unwrap();
    let listener = Recorder::new().listener("a");
    emitter.on("a", &listener, None).unwrap();
    meta.reset();

    assert!(emitter.on("a", &listener, None).is_err());
    assert!(meta.added().is_empty());
}

#[test]
fn test_add_listener_observes_its_own_registration() {
    let emitter = common::emitter("meta");
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let watcher = Callback::typed::<AddListenerEvent, _>(move |added, delivery| {
        sink.lock().unwrap().push((added.event.clone(), added.listener == *delivery.callback()));
        Ok(())
    });

    emitter.on(EventKey::of::<AddListenerEvent>(), &watcher, None).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(EventKey::of::<AddListenerEvent>(), true)]
    );
}

#[test]
fn test_add_listener_registering_from_announcement() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    let follower = recorder.listener("follower");
    let to_add = follower.clone();
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let watcher = Callback::typed::<AddListenerEvent, _>(move |added, delivery| {
        sink.lock().unwrap().push(added.event.clone());
        if added.event == EventKey::from("leader") {
            delivery.emitter().on("follower", &to_add, None)?;
        }
        Ok(())
    });
    emitter.on(EventKey::of::<AddListenerEvent>(), &watcher, None).unwrap();

    emitter.on("leader", &recorder.listener("leader"), None).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            EventKey::of::<AddListenerEvent>(),
            EventKey::from("leader"),
            EventKey::from("follower"),
        ]
    );
    emitter.trigger("follower", &[]);
    assert_eq!(recorder.labels(), vec!["follower"]);
}

#[test]
fn test_once_consumption_is_announced() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    let (seen, _) = removal_log(&emitter);
    emitter.once("e", &recorder.listener("once"), None).unwrap();

    emitter.trigger("e", &[]);
    emitter.trigger("e", &[]);

    assert_eq!(*seen.lock().unwrap(), vec![EventKey::from("e")]);
    assert_eq!(recorder.count("once"), 1);
    assert_eq!(emitter.listener_count("e"), 0);
}

#[test]
fn test_once_removal_listener_removed_with_others_hears_one_notice() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    emitter.on("X", &recorder.listener("x"), None).unwrap();
    emitter.on("Y", &recorder.listener("y"), None).unwrap();
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let once_watcher = Callback::typed::<RemoveListenerEvent, _>(move |removed, _| {
        sink.lock().unwrap().push(removed.event.clone());
        Ok(())
    });
    emitter
        .once(EventKey::of::<RemoveListenerEvent>(), &once_watcher, None)
        .unwrap();

    assert_eq!(emitter.off_all(), 3);

    assert_eq!(*seen.lock().unwrap(), vec![EventKey::from("X")]);
    assert_eq!(emitter.total_listeners(), 0);
}

#[test]
fn test_once_removal_listener_consumed_by_first_notice() {
    let emitter = common::emitter("meta");
    let recorder = Recorder::new();
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let once_watcher = Callback::typed::<RemoveListenerEvent, _>(move |removed, _| {
        sink.lock().unwrap().push(removed.event.clone());
        Ok(())
    });
    emitter
        .once(EventKey::of::<RemoveListenerEvent>(), &once_watcher, None)
        .unwrap();
    emitter.on("a", &recorder.listener("a"), None).unwrap();
    emitter.on("b", &recorder.listener("b"), None).unwrap();

    assert_eq!(emitter.off_event("a"), 1);
    assert_eq!(emitter.off_event("b"), 1);

    assert_eq!(*seen.lock().unwrap(), vec![EventKey::from("a")]);
    assert!(!emitter.has_listeners(EventKey::of::<RemoveListenerEvent>()));
}

#[test]
fn test_once_add_listener_consumed_by_own_registration() {
    let emitter = common::emitter("meta");
    let (removed, _) = removal_log(&emitter);
    let seen = common::shared();
    let sink = Arc::clone(&seen);
    let once_watcher = Callback::typed::<AddListenerEvent, _>(move |added, _| {
        sink.lock().unwrap().push(added.event.clone());
        Ok(())
    });

    emitter
        .once(EventKey::of::<AddListenerEvent>(), &once_watcher, None)
        .unwrap();
    emitter.on("later", &Recorder::new().listener("later"), None).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![EventKey::of::<AddListenerEvent>()]);
    assert_eq!(*removed.lock().unwrap(), vec![EventKey::of::<AddListenerEvent>()]);
    assert!(!emitter.has_listeners(EventKey::of::<AddListenerEvent>()));
}

#[test]
fn test_meta_events_disabled_by_config() {
    let emitter = common::emitter_with(EmitterConfig::labeled("meta").with_meta_events(false));
    let recorder = Recorder::new();
    emitter
        .on(EventKey::of::<AddListenerEvent>(), &recorder.listener("add"), None)
        .unwrap();
    emitter
        .on(EventKey::of::<RemoveListenerEvent>(), &recorder.listener("remove"), None)
        .unwrap();

    emitter.on("e", &recorder.listener("e"), None).unwrap();
    emitter.off_all();

    assert!(recorder.calls().is_empty());
}
