//! Shared property containers
//!
//! An [`Object`] is a cheap, cloneable handle to a map of named property slots.
//! A slot either stores a plain [`Value`] or is *bound*: reads and writes are then
//! routed through the binding installed by [`crate::binding::bind`].
//!
//! Objects created with [`Object::subscribable`] also carry the event capability
//! and hand out an [`EventTarget`]. Plain data objects never do.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::binding::BoundProperty;
use crate::element::Element;
use crate::error::BindError;
use crate::events::{
    event_types, run_handlers, Event, EventDispatcher, EventHandler, EventType, ListenerId,
    Subscribable,
};
use crate::value::Value;

pub(crate) enum Slot {
    Plain(Value),
    Bound(Rc<BoundProperty>),
}

struct ObjectData {
    slots: IndexMap<String, Slot>,
    events: Option<EventDispatcher>,
    /// Write-once back-reference to the element this object is bound to
    element: Option<Element>,
}

/// A shared, single-threaded property container
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Create a plain data object
    pub fn new() -> Self {
        Self::with_events(None)
    }

    /// Create an object that accepts event listeners
    pub fn subscribable() -> Self {
        Self::with_events(Some(EventDispatcher::new()))
    }

    fn with_events(events: Option<EventDispatcher>) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            slots: IndexMap::new(),
            events,
            element: None,
        })))
    }

    /// Create a plain object from key/value pairs
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = Self::new();
        for (key, value) in entries {
            let key: String = key.into();
            object.set(&key, value);
        }
        object
    }

    /// Builder: set a property and return the object
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Read a property; missing properties read as `Undefined`
    pub fn get(&self, key: &str) -> Value {
        let data = self.0.borrow();
        let cell = match data.slots.get(key) {
            None => return Value::Undefined,
            Some(Slot::Plain(value)) => return value.clone(),
            Some(Slot::Bound(cell)) => cell.clone(),
        };
        drop(data);
        cell.value()
    }

    /// Write a property.
    ///
    /// Writing a bound property runs its mutators and updates every linked target
    /// before returning.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        let cell = match data.slots.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Slot::Bound(cell) => cell.clone(),
                Slot::Plain(current) => {
                    *current = value;
                    return;
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(Slot::Plain(value));
                return;
            }
        };
        drop(data);
        cell.assign(value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.borrow().slots.contains_key(key)
    }

    /// True if the property is routed through a binding
    pub fn is_bound(&self, key: &str) -> bool {
        matches!(self.0.borrow().slots.get(key), Some(Slot::Bound(_)))
    }

    /// Property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().slots.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().slots.is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_subscribable(&self) -> bool {
        self.0.borrow().events.is_some()
    }

    /// The event capability of this object, if it has one
    pub fn event_target(&self) -> Option<EventTarget> {
        self.is_subscribable().then(|| EventTarget {
            object: self.clone(),
        })
    }

    /// Host-side edit: store `value` and fire `change` on this object.
    ///
    /// This is how a document reports user input. Listeners may call
    /// [`Event::prevent_default`] and overwrite the property.
    pub fn commit_input(&self, key: &str, value: impl Into<Value>) -> Event {
        self.set(key, value);
        match self.event_target() {
            Some(target) => target.dispatch(event_types::CHANGE, Some(key)),
            None => Event::new(event_types::CHANGE, self.clone(), Some(key.to_string())),
        }
    }

    /// Copy this object and every nested object.
    ///
    /// Bound slots are copied as their current plain value. The copy keeps the
    /// event capability but no listeners. The object graph must be acyclic.
    pub fn deep_clone(&self) -> Object {
        let data = self.0.borrow();
        let clone = Self::with_events(data.events.as_ref().map(|_| EventDispatcher::new()));
        {
            let mut clone_data = clone.0.borrow_mut();
            for (key, slot) in &data.slots {
                let value = match slot {
                    Slot::Plain(value) => value.clone(),
                    Slot::Bound(cell) => cell.value(),
                };
                let value = match value {
                    Value::Object(nested) => Value::Object(nested.deep_clone()),
                    other => other,
                };
                clone_data.slots.insert(key.clone(), Slot::Plain(value));
            }
        }
        clone
    }

    /// The element this object was bound to by [`crate::binding::bind_element`]
    pub fn bound_element(&self) -> Option<Element> {
        self.0.borrow().element.clone()
    }

    pub(crate) fn attach_element(&self, element: &Element) -> Result<(), BindError> {
        let mut data = self.0.borrow_mut();
        if let Some(existing) = &data.element {
            return if existing.ptr_eq(element) {
                Ok(())
            } else {
                Err(BindError::ElementAlreadyAttached)
            };
        }
        data.element = Some(element.clone());
        Ok(())
    }

    pub(crate) fn install_binding(&self, key: &str, cell: Rc<BoundProperty>) {
        self.0
            .borrow_mut()
            .slots
            .insert(key.to_string(), Slot::Bound(cell));
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => f
                .debug_struct("Object")
                .field("keys", &data.slots.keys().collect::<Vec<_>>())
                .field("subscribable", &data.events.is_some())
                .finish(),
            Err(_) => f.write_str("Object { .. }"),
        }
    }
}

/// Event capability of a subscribable [`Object`]
#[derive(Clone, Debug)]
pub struct EventTarget {
    object: Object,
}

impl EventTarget {
    pub fn object(&self) -> &Object {
        &self.object
    }
}

impl Subscribable for EventTarget {
    fn add_listener(&self, event_type: EventType, handler: EventHandler) -> ListenerId {
        let mut data = self.object.0.borrow_mut();
        data.events
            .as_mut()
            .map(|events| events.register(event_type, handler))
            .unwrap_or_default()
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut data = self.object.0.borrow_mut();
        data.events
            .as_mut()
            .is_some_and(|events| events.unregister(id))
    }

    fn dispatch(&self, event_type: EventType, property: Option<&str>) -> Event {
        let handlers = {
            let data = self.object.0.borrow();
            data.events
                .as_ref()
                .map(|events| events.handlers(event_type))
                .unwrap_or_default()
        };
        let mut event = Event::new(event_type, self.object.clone(), property.map(str::to_string));
        run_handlers(&handlers, &mut event);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_get_set() {
        let object = Object::new().with("a", 1).with("b", "two");
        assert_eq!(object.get("a"), Value::from(1));
        assert_eq!(object.get("b"), Value::from("two"));
        assert_eq!(object.get("missing"), Value::Undefined);
        assert_eq!(object.keys(), vec!["a".to_string(), "b".to_string()]);

        object.set("a", 3);
        assert_eq!(object.get("a"), Value::from(3));
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_plain_objects_have_no_event_target() {
        assert!(Object::new().event_target().is_none());
        assert!(Object::subscribable().event_target().is_some());
    }

    #[test]
    fn test_commit_input_fires_change() {
        let object = Object::subscribable().with("value", "a");
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let target = object.event_target().unwrap();
        target.on_change(Rc::new(move |event: &mut Event| {
            assert_eq!(event.property.as_deref(), Some("value"));
            assert_eq!(event.target.get("value"), Value::from("b"));
            s.set(s.get() + 1);
        }));

        let event = object.commit_input("value", "b");
        assert_eq!(seen.get(), 1);
        assert!(!event.default_prevented);
    }

    #[test]
    fn test_listener_may_write_its_target() {
        let object = Object::subscribable();
        let target = object.event_target().unwrap();
        target.on_change(Rc::new(|event: &mut Event| {
            event.prevent_default();
            event.target.set("value", "fixed");
        }));

        let event = object.commit_input("value", "typed");
        assert!(event.default_prevented);
        assert_eq!(object.get("value"), Value::from("fixed"));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let style = Object::new().with("width", "10px");
        let object = Object::subscribable().with("style", style.clone());
        let copy = object.deep_clone();

        assert!(copy.is_subscribable());
        let copied_style = copy.get("style").as_object().cloned().unwrap();
        assert!(!copied_style.ptr_eq(&style));

        copied_style.set("width", "20px");
        assert_eq!(style.get("width"), Value::from("10px"));
    }
}
