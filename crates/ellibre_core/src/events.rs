//! Event dispatch
//!
//! Objects that carry the event capability own an [`EventDispatcher`]. Handlers
//! run synchronously, in registration order, inside the dispatching call.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::object::Object;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    /// A property value was committed by the host (user input finished)
    pub const CHANGE: EventType = 1;
    /// A property value is being edited
    pub const INPUT: EventType = 2;
}

new_key_type! {
    /// Handle returned when registering a listener
    pub struct ListenerId;
}

/// An event delivered to listeners of a subscribable object
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    /// The object the event was dispatched on
    pub target: Object,
    /// The property the host reported as changed, if known
    pub property: Option<String>,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl Event {
    pub fn new(event_type: EventType, target: Object, property: Option<String>) -> Self {
        Self {
            event_type,
            target,
            property,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Suppress the host's default handling of this event
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Event handler function type
pub type EventHandler = Rc<dyn Fn(&mut Event)>;

struct Registration {
    event_type: EventType,
    handler: EventHandler,
}

/// Dispatches events to registered handlers
#[derive(Default)]
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, Registration>,
    order: FxHashMap<EventType, Vec<ListenerId>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler for an event type
    pub fn register(&mut self, event_type: EventType, handler: EventHandler) -> ListenerId {
        let id = self.listeners.insert(Registration {
            event_type,
            handler,
        });
        self.order.entry(event_type).or_default().push(id);
        id
    }

    /// Remove a handler; returns false if it was already gone
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some(registration) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.order.get_mut(&registration.event_type) {
            ids.retain(|other| *other != id);
        }
        true
    }

    /// Snapshot the handlers for an event type.
    ///
    /// Callers invoke the snapshot after releasing any borrow of the dispatcher,
    /// so handlers are free to register listeners or dispatch further events.
    pub fn handlers(&self, event_type: EventType) -> SmallVec<[EventHandler; 4]> {
        self.order
            .get(&event_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.listeners.get(*id))
                    .map(|r| r.handler.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Run a handler snapshot against an event, honouring `stop_propagation`
pub fn run_handlers(handlers: &[EventHandler], event: &mut Event) {
    for handler in handlers {
        if event.propagation_stopped {
            break;
        }
        handler(event);
    }
}

/// Capability interface for objects that accept change listeners
pub trait Subscribable {
    /// Register a listener for an event type
    fn add_listener(&self, event_type: EventType, handler: EventHandler) -> ListenerId;

    /// Remove a previously registered listener
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Dispatch an event and return it after every listener ran
    fn dispatch(&self, event_type: EventType, property: Option<&str>) -> Event;

    /// Shorthand for a `change` listener
    fn on_change(&self, handler: EventHandler) -> ListenerId {
        self.add_listener(event_types::CHANGE, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_dispatch_order_and_stop_propagation() {
        let mut dispatcher = EventDispatcher::new();
        let calls = Rc::new(Cell::new(0));

        let c = calls.clone();
        dispatcher.register(
            event_types::CHANGE,
            Rc::new(move |e: &mut Event| {
                c.set(c.get() + 1);
                e.stop_propagation();
            }),
        );
        let c = calls.clone();
        dispatcher.register(
            event_types::CHANGE,
            Rc::new(move |_: &mut Event| c.set(c.get() + 10)),
        );

        let mut event = Event::new(event_types::CHANGE, Object::new(), None);
        run_handlers(&dispatcher.handlers(event_types::CHANGE), &mut event);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.register(event_types::INPUT, Rc::new(|_: &mut Event| {}));
        assert_eq!(dispatcher.handlers(event_types::INPUT).len(), 1);
        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert!(dispatcher.handlers(event_types::INPUT).is_empty());
        assert!(dispatcher.is_empty());
    }
}
