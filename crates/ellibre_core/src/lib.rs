//! ellibre core
//!
//! Helpers for wiring plain data to a document:
//!
//! - **Values & Objects**: dynamic values in shared, single-threaded property containers
//! - **Binding**: two-way links between a data property and element properties
//! - **Observable Sequences**: vectors that report every mutation as a change record
//! - **Templates**: clone a staged element and reach its named descendants directly
//!
//! # Example
//!
//! ```rust
//! use ellibre_core::{bind, Element, LinkSpec, LinkSpecs, Object, Value};
//!
//! let data = Object::new().with("a", 1);
//! let element = Element::new("div");
//!
//! let doubled = LinkSpec::mutator(|v| Value::from(v.as_number().unwrap_or(0.0) * 2.0));
//! bind(&data, "a", &element, LinkSpecs::keyed().link("x", doubled), None).unwrap();
//! assert_eq!(element.get("x"), Value::from(2));
//!
//! data.set("a", 5);
//! assert_eq!(element.get("x"), Value::from(10));
//! ```

pub mod binding;
pub mod element;
pub mod error;
pub mod events;
pub mod object;
pub mod path;
pub mod sequence;
pub mod template;
pub mod value;

pub use binding::{
    bind, bind_element, Binder, ChangeObserver, LinkRecord, LinkSpec, LinkSpecs, Mutator,
    Observer,
};
pub use element::{Document, Element};
pub use error::{BindError, PathError, SequenceError, TemplateError};
pub use events::{event_types, Event, EventDispatcher, EventType, ListenerId, Subscribable};
pub use object::{EventTarget, Object};
pub use path::{resolve, PropertyRef};
pub use sequence::{Change, ObservableVec};
pub use template::instantiate;
pub use value::{format_number, Value};
