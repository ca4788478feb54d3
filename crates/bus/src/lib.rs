//! Synchronous event subscription for widget instances.
//!
//! Listeners are keyed by an event kind and called in registration order.
//! Every registration returns a [`ListenerId`] that `off` accepts; `once`
//! listeners unregister themselves after their first call.

use core_types::ListenerId;

pub type Callback<P> = Box<dyn FnMut(&P)>;

struct Listener<K, P> {
    id: ListenerId,
    kind: K,
    once: bool,
    callback: Callback<P>,
}

pub struct Emitter<K, P> {
    listeners: Vec<Listener<K, P>>,
    next_id: ListenerId,
}

impl<K, P> Default for Emitter<K, P> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K: Copy + PartialEq + std::fmt::Debug, P> Emitter<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, kind: K, once: bool, callback: Callback<P>) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            once,
            callback,
        });
        id
    }

    pub fn on(&mut self, kind: K, callback: impl FnMut(&P) + 'static) -> ListenerId {
        self.register(kind, false, Box::new(callback))
    }

    pub fn once(&mut self, kind: K, callback: impl FnMut(&P) + 'static) -> ListenerId {
        self.register(kind, true, Box::new(callback))
    }

    /// Removes one listener. Returns `false` if `id` was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Removes every listener of `kind`.
    pub fn off_kind(&mut self, kind: K) {
        self.listeners.retain(|l| l.kind != kind);
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Calls every listener registered for `kind`. Returns how many ran.
    pub fn emit(&mut self, kind: K, payload: &P) -> usize {
        let mut called = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.callback)(payload);
            called += 1;
        }
        self.listeners.retain(|l| !(l.once && l.kind == kind));
        log::trace!(target: "bus", "emit {kind:?} -> {called} listener(s)");
        called
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn count(&self, kind: K) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }
}

impl<K, P> std::fmt::Debug for Emitter<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Kind {
        Change,
        Close,
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&String) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v: &String| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn on_receives_only_its_kind() {
        let mut emitter: Emitter<Kind, String> = Emitter::new();
        let (seen, cb) = recorder();
        emitter.on(Kind::Change, cb);
        assert_eq!(emitter.emit(Kind::Change, &"123".to_string()), 1);
        assert_eq!(emitter.emit(Kind::Close, &"x".to_string()), 0);
        assert_eq!(*seen.borrow(), vec!["123".to_string()]);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut emitter: Emitter<Kind, String> = Emitter::new();
        let last = Rc::new(RefCell::new(String::new()));
        for tag in ["123", "456"] {
            let last = Rc::clone(&last);
            emitter.on(Kind::Change, move |_| *last.borrow_mut() = tag.to_string());
        }
        emitter.emit(Kind::Change, &String::new());
        assert_eq!(*last.borrow(), "456");
    }

    #[test]
    fn once_fires_a_single_time() {
        let mut emitter: Emitter<Kind, String> = Emitter::new();
        let (seen, cb) = recorder();
        emitter.once(Kind::Change, cb);
        emitter.emit(Kind::Change, &"a".to_string());
        emitter.emit(Kind::Change, &"b".to_string());
        assert_eq!(*seen.borrow(), vec!["a".to_string()]);
        assert!(emitter.is_empty());
    }

    #[test]
    fn off_and_clear_remove_listeners() {
        let mut emitter: Emitter<Kind, String> = Emitter::new();
        let (seen, cb) = recorder();
        let id = emitter.on(Kind::Change, cb);
        emitter.on(Kind::Close, |_| {});
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(Kind::Change, &"x".to_string());
        assert!(seen.borrow().is_empty());
        assert_eq!(emitter.count(Kind::Close), 1);
        emitter.clear();
        assert_eq!(emitter.len(), 0);
    }
}
