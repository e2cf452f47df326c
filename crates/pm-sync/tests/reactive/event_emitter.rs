use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use pm_sync::reactive::EventEmitter;

#[test]
fn emit_reaches_every_listener() {
    let emitter: EventEmitter<[u32]> = EventEmitter::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (a, b) = (Arc::clone(&seen), Arc::clone(&seen));
    emitter.on(move |xs: &[u32]| a.lock().push(xs.len()));
    emitter.on(move |xs: &[u32]| b.lock().push(xs.iter().sum::<u32>() as usize));

    emitter.emit(&[1, 2, 3]);

    assert_eq!(*seen.lock(), vec![3, 6]);
}

#[test]
fn off_removes_listener_and_is_idempotent() {
    let emitter: EventEmitter<str> = EventEmitter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let id = emitter.on(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    emitter.emit("one");
    emitter.off(id);
    emitter.off(id);
    emitter.emit("two");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(emitter.size(), 0);
}

#[test]
fn panicking_listener_is_isolated() {
    let emitter: EventEmitter<str> = EventEmitter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (before, after) = (Arc::clone(&calls), Arc::clone(&calls));
    emitter.on(move |_| {
        before.fetch_add(1, Ordering::SeqCst);
    });
    emitter.on(|_| panic!("boom"));
    emitter.on(move |_| {
        after.fetch_add(1, Ordering::SeqCst);
    });

    emitter.emit("event");
    emitter.emit("event");

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(emitter.size(), 3);
}

#[test]
fn subscription_handle_removes_listener() {
    let emitter: Arc<EventEmitter<str>> = Arc::new(EventEmitter::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let sub = emitter.subscribe(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    emitter.emit("a");
    sub.unsubscribe();
    sub.unsubscribe();
    emitter.emit("b");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!sub.is_active());
}

#[test]
fn listener_added_during_emit_waits_for_next_round() {
    let emitter: Arc<EventEmitter<str>> = Arc::new(EventEmitter::new());
    let late_calls = Arc::new(AtomicUsize::new(0));
    let (e, late) = (Arc::clone(&emitter), Arc::clone(&late_calls));
    let added = Arc::new(AtomicUsize::new(0));
    let added_flag = Arc::clone(&added);
    emitter.on(move |_| {
        if added_flag.fetch_add(1, Ordering::SeqCst) == 0 {
            let late = Arc::clone(&late);
            e.on(move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    emitter.emit("first");
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);

    emitter.emit("second");
    assert_eq!(late_calls.load(Ordering::SeqCst), 1);
}
