//! Two-way binding between data objects and elements
//!
//! [`bind`] turns one property of a data object into a bound property. Reading it
//! returns the held value; writing it stores the value and pushes it through every
//! link to the element:
//!
//! - a **mutator** transforms the data value before it is written to the target,
//! - an **observer** inspects a target-side `change` and may return a corrected
//!   value, which then overrides both the target and the held data value.
//!
//! A target change whose observer returns `None` stands as-is and is *not*
//! reflected back into the data object.
//!
//! Bindings are never detached. The data object owns the binding cell; target
//! listeners only hold a weak reference to it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::element::Element;
use crate::error::BindError;
use crate::events::{Event, Subscribable};
use crate::object::Object;
use crate::path::{resolve, PropertyRef};
use crate::value::Value;

/// Transforms a data value into the value written to a target
pub type Mutator = Rc<dyn Fn(&Value) -> Value>;

/// Inspects a target-side change: `(container, new_value, held_value)`.
///
/// Returning `Some` overrides the target and the held data value.
pub type Observer = Rc<dyn Fn(&Object, &Value, &Value) -> Option<Value>>;

/// Called once per link whenever the bound property is written:
/// `(element, link_selector, new_value)`
pub type ChangeObserver = Rc<dyn Fn(&Element, &str, &Value)>;

/// The value side of a keyed link specification
#[derive(Clone)]
pub enum LinkSpec {
    /// A bare mutator
    Mutator(Mutator),
    /// An optional mutator and an optional observer
    Pair {
        mutator: Option<Mutator>,
        observer: Option<Observer>,
    },
}

impl LinkSpec {
    /// Write the raw data value, no observer
    pub fn raw() -> Self {
        LinkSpec::Pair {
            mutator: None,
            observer: None,
        }
    }

    pub fn mutator(f: impl Fn(&Value) -> Value + 'static) -> Self {
        LinkSpec::Mutator(Rc::new(f))
    }

    pub fn observer(f: impl Fn(&Object, &Value, &Value) -> Option<Value> + 'static) -> Self {
        LinkSpec::Pair {
            mutator: None,
            observer: Some(Rc::new(f)),
        }
    }

    pub fn pair(
        mutator: impl Fn(&Value) -> Value + 'static,
        observer: impl Fn(&Object, &Value, &Value) -> Option<Value> + 'static,
    ) -> Self {
        LinkSpec::Pair {
            mutator: Some(Rc::new(mutator)),
            observer: Some(Rc::new(observer)),
        }
    }

    fn into_record(self, selector: String) -> LinkRecord {
        let (mutator, observer) = match self {
            LinkSpec::Mutator(mutator) => (Some(mutator), None),
            LinkSpec::Pair { mutator, observer } => (mutator, observer),
        };
        LinkRecord {
            selector,
            mutator,
            observer,
        }
    }
}

/// One entry of an ordered link specification
#[derive(Clone)]
pub struct LinkRecord {
    /// Dotted address of the target property, relative to the element
    pub selector: String,
    pub mutator: Option<Mutator>,
    pub observer: Option<Observer>,
}

impl LinkRecord {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            mutator: None,
            observer: None,
        }
    }

    pub fn with_mutator(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.mutator = Some(Rc::new(f));
        self
    }

    pub fn with_observer(
        mut self,
        f: impl Fn(&Object, &Value, &Value) -> Option<Value> + 'static,
    ) -> Self {
        self.observer = Some(Rc::new(f));
        self
    }
}

/// Link specifications in either accepted shape
#[derive(Clone)]
pub enum LinkSpecs {
    /// Target selector -> mutator or {mutator, observer}, in insertion order
    Keyed(IndexMap<String, LinkSpec>),
    /// `{selector, mutator, observer}` records
    Ordered(Vec<LinkRecord>),
}

impl LinkSpecs {
    /// An empty keyed specification
    pub fn keyed() -> Self {
        LinkSpecs::Keyed(IndexMap::new())
    }

    /// Builder: add a keyed link (turns an ordered spec into an appended record)
    pub fn link(mut self, selector: &str, spec: LinkSpec) -> Self {
        match &mut self {
            LinkSpecs::Keyed(map) => {
                map.insert(selector.to_string(), spec);
            }
            LinkSpecs::Ordered(records) => records.push(spec.into_record(selector.to_string())),
        }
        self
    }

    /// Normalize into an ordered list of records
    pub fn into_records(self) -> Vec<LinkRecord> {
        match self {
            LinkSpecs::Keyed(map) => map
                .into_iter()
                .map(|(selector, spec)| spec.into_record(selector))
                .collect(),
            LinkSpecs::Ordered(records) => records,
        }
    }
}

impl From<Vec<LinkRecord>> for LinkSpecs {
    fn from(records: Vec<LinkRecord>) -> Self {
        LinkSpecs::Ordered(records)
    }
}

impl From<IndexMap<String, LinkSpec>> for LinkSpecs {
    fn from(map: IndexMap<String, LinkSpec>) -> Self {
        LinkSpecs::Keyed(map)
    }
}

/// A normalized link with its target resolved
struct BindingLink {
    selector: String,
    target: PropertyRef,
    mutator: Option<Mutator>,
    observer: Option<Observer>,
}

impl BindingLink {
    fn target_value(&self, value: &Value) -> Value {
        match &self.mutator {
            Some(mutator) => mutator(value),
            None => value.clone(),
        }
    }

    fn write(&self, value: &Value) {
        self.target.set(self.target_value(value));
    }
}

/// The cell behind a bound data property
pub(crate) struct BoundProperty {
    value: RefCell<Value>,
    links: SmallVec<[BindingLink; 2]>,
    element: Element,
    on_change: Option<ChangeObserver>,
}

impl BoundProperty {
    pub(crate) fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store `value` and push it through every link
    pub(crate) fn assign(&self, value: Value) {
        *self.value.borrow_mut() = value.clone();
        for link in &self.links {
            trace!(selector = %link.selector, %value, "bound write");
            link.write(&value);
            if let Some(on_change) = &self.on_change {
                on_change(&self.element, &link.selector, &value);
            }
        }
    }

    /// Store `value` without touching the targets
    fn hold(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

/// Bind `data_path` of `data` to properties of `element`.
///
/// Every link target is resolved before anything is written. The initial data
/// value is then pushed to every target and the data property becomes bound.
/// Links with an observer on a subscribable container also get a `change`
/// listener on that container.
pub fn bind(
    data: &Object,
    data_path: &str,
    element: &Element,
    links: impl Into<LinkSpecs>,
    on_change: Option<ChangeObserver>,
) -> Result<(), BindError> {
    let source = resolve(data, data_path)?;
    let value = source.get();

    let root = element.properties();
    let links = links
        .into()
        .into_records()
        .into_iter()
        .map(|record| -> Result<BindingLink, BindError> {
            Ok(BindingLink {
                target: resolve(&root, &record.selector)?,
                selector: record.selector,
                mutator: record.mutator,
                observer: record.observer,
            })
        })
        .collect::<Result<SmallVec<[BindingLink; 2]>, BindError>>()?;

    for link in &links {
        link.write(&value);
    }

    let cell = Rc::new(BoundProperty {
        value: RefCell::new(value),
        links,
        element: element.clone(),
        on_change,
    });
    source.container.install_binding(&source.key, cell.clone());

    let mut listeners = 0usize;
    for (index, link) in cell.links.iter().enumerate() {
        if link.observer.is_none() {
            continue;
        }
        let Some(target) = link.target.container.event_target() else {
            warn!(selector = %link.selector, "observed target does not emit change events");
            continue;
        };
        let weak = Rc::downgrade(&cell);
        target.on_change(Rc::new(move |event: &mut Event| {
            observe_target_change(&weak, index, event);
        }));
        listeners += 1;
    }

    debug!(
        data_path,
        links = cell.links.len(),
        listeners,
        "bound data property"
    );
    Ok(())
}

fn observe_target_change(cell: &Weak<BoundProperty>, index: usize, event: &mut Event) {
    let Some(cell) = cell.upgrade() else {
        return;
    };
    let Some(link) = cell.links.get(index) else {
        return;
    };
    let Some(observer) = &link.observer else {
        return;
    };

    let new_value = link.target.get();
    let held = cell.value();
    let Some(result) = observer(&link.target.container, &new_value, &held) else {
        return;
    };

    event.prevent_default();
    link.target.set(result.clone());
    cell.hold(result);
}

/// A convenience binder entry
#[derive(Clone)]
pub enum Binder {
    /// For `"dataPath:targetSelector"` keys
    Link(LinkSpec),
    /// For plain `"dataPath"` keys
    Links(LinkSpecs),
}

impl From<LinkSpec> for Binder {
    fn from(spec: LinkSpec) -> Self {
        Binder::Link(spec)
    }
}

impl From<LinkSpecs> for Binder {
    fn from(specs: LinkSpecs) -> Self {
        Binder::Links(specs)
    }
}

/// Bind several data properties of `data` to `element` at once.
///
/// Keys are either `"dataPath:targetSelector"` with a single [`LinkSpec`], or a
/// plain data path with a full [`LinkSpecs`]. Afterwards `data` keeps a
/// write-once back-reference to `element` ([`Object::bound_element`]).
///
/// Bindings made before a failing entry stay installed.
pub fn bind_element(
    element: &Element,
    data: &Object,
    binders: IndexMap<String, Binder>,
    on_change: Option<ChangeObserver>,
) -> Result<(), BindError> {
    for (key, binder) in binders {
        let parts: Vec<&str> = key.split(':').collect();
        match (parts.as_slice(), binder) {
            ([data_path, selector], Binder::Link(spec)) => {
                let specs = LinkSpecs::keyed().link(selector, spec);
                bind(data, data_path, element, specs, on_change.clone())?;
            }
            ([data_path], Binder::Links(specs)) => {
                bind(data, data_path, element, specs, on_change.clone())?;
            }
            _ => return Err(BindError::InvalidBinder(key.clone())),
        }
    }

    data.attach_element(element)
}
