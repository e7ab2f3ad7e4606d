//! Single-slot state signal
//!
//! A broadcast cell holding the latest value of a state machine:
//! publishing overwrites the previous value (most-recent-state
//! semantics, not a queue) and notifies every registered listener in
//! registration order. Each coordinator or session owns its own signal;
//! there are no process-wide singletons.
//!
//! Listeners run on whichever thread publishes — for the table loading
//! pipeline that is usually the background worker thread, so listeners
//! must be `Send` and must not assume they run on the caller's thread.

use std::sync::Mutex;

type Listener<T> = Box<dyn Fn(&T) + Send>;

/// Latest value plus version counter, with registered listeners.
pub struct StateSignal<T> {
    slot: Mutex<Slot<T>>,
    listeners: Mutex<Vec<Listener<T>>>,
}

struct Slot<T> {
    latest: Option<T>,
    version: u64,
}

impl<T: Clone> StateSignal<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                latest: None,
                version: 0,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// The most recently published value, if any.
    pub fn latest(&self) -> Option<T> {
        self.slot.lock().unwrap().latest.clone()
    }

    /// Monotonic publish counter, for pollers that want to detect
    /// transitions they may have observed already.
    pub fn version(&self) -> u64 {
        self.slot.lock().unwrap().version
    }

    /// Register a listener. If a value has already been published, the
    /// listener is invoked immediately with the latest one, so late
    /// subscribers never miss the current state.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + 'static) {
        let current = self.latest();
        if let Some(value) = &current {
            listener(value);
        }
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Publish a new value, overwriting the previous one, and notify
    /// all listeners on the calling thread.
    ///
    /// The slot lock is released before listeners run; only the
    /// listener-list lock is held during notification, so listeners may
    /// read `latest()` but must not publish to the same signal.
    pub fn publish(&self, value: T) {
        {
            let mut slot = self.slot.lock().unwrap();
            slot.latest = Some(value.clone());
            slot.version += 1;
        }
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            listener(&value);
        }
    }
}

impl<T: Clone> Default for StateSignal<T> {
    fn default() -> Self {
        Self::new()
    }
}
