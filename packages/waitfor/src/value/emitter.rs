use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use super::Value;

type Listener = Rc<dyn Fn(&[Value])>;

/// Identifies a listener registered on an [`EventEmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
struct Listeners {
    events: HashMap<String, Vec<Registration>>,
    next_id: u64,
}

/// A source of named events carrying a list of arguments.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Rc<RefCell<Listeners>>,
}

impl EventEmitter {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `listener` every time `event` is emitted.
    pub fn on(
        &self,
        event: impl Into<String>,
        listener: impl Fn(&[Value]) + 'static,
    ) -> ListenerId {
        self.add(event.into(), false, Rc::new(listener))
    }

    /// Calls `listener` the next time `event` is emitted, then forgets it.
    pub fn once(
        &self,
        event: impl Into<String>,
        listener: impl Fn(&[Value]) + 'static,
    ) -> ListenerId {
        self.add(event.into(), true, Rc::new(listener))
    }

    fn add(&self, event: String, once: bool, listener: Listener) -> ListenerId {
        let mut listeners = self.listeners.borrow_mut();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.events.entry(event).or_default().push(Registration {
            id,
            once,
            listener,
        });
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registrations) = listeners.events.get_mut(event) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        before != registrations.len()
    }

    /// Emits `event` with `args`, returning whether any listener was called.
    ///
    /// The set of listeners is fixed when the emit starts: listeners added or removed from inside
    /// a listener only affect later emits. A listener may emit its own event again.
    pub fn emit(&self, event: &str, args: Vec<Value>) -> bool {
        let called: Vec<Listener> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(registrations) = listeners.events.get_mut(event) else {
                return false;
            };
            let called = registrations
                .iter()
                .map(|registration| registration.listener.clone())
                .collect();
            registrations.retain(|registration| !registration.once);
            called
        };

        for listener in &called {
            listener(&args);
        }
        !called.is_empty()
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .events
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Returns `true` if both handles refer to the same emitter.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.listeners, &other.listeners)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_map()
            .entries(
                listeners
                    .events
                    .iter()
                    .map(|(event, registrations)| (event, registrations.len())),
            )
            .finish()
    }
}
