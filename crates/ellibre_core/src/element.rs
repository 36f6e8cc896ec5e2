//! Document elements
//!
//! A minimal host document: elements carry a tag, an optional id, string
//! attributes, child elements and a subscribable property object. The property
//! object always contains a nested `style` object, so addresses such as
//! `"style.width"` resolve the same way they would against a browser node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::object::Object;
use crate::value::Value;

struct ElementData {
    tag: String,
    id: Option<String>,
    attributes: IndexMap<String, String>,
    properties: Object,
    children: Vec<Element>,
    /// Descendants registered by name (see [`crate::template`])
    named: IndexMap<String, Element>,
}

/// A shared handle to a document node
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    pub fn new(tag: &str) -> Self {
        let properties = Object::subscribable();
        properties.set("style", Object::new());
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.to_string(),
            id: None,
            attributes: IndexMap::new(),
            properties,
            children: Vec::new(),
            named: IndexMap::new(),
        })))
    }

    /// Builder: set the id
    pub fn with_id(self, id: &str) -> Self {
        self.set_id(Some(id));
        self
    }

    /// Builder: set an attribute
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: set a property
    pub fn with_property(self, key: &str, value: impl Into<Value>) -> Self {
        self.properties().set(key, value);
        self
    }

    /// Builder: set a style property
    pub fn with_style(self, key: &str, value: impl Into<Value>) -> Self {
        self.style().set(key, value);
        self
    }

    /// Builder: append a child
    pub fn with_child(self, child: Element) -> Self {
        self.append_child(child);
        self
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.0.borrow().id.clone()
    }

    pub fn set_id(&self, id: Option<&str>) {
        self.0.borrow_mut().id = id.map(str::to_string);
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.0.borrow_mut().attributes.shift_remove(name)
    }

    /// The element's property object (the root for target addresses)
    pub fn properties(&self) -> Object {
        self.0.borrow().properties.clone()
    }

    /// The nested `style` object, created on first access if it was replaced
    pub fn style(&self) -> Object {
        let properties = self.properties();
        if let Value::Object(style) = properties.get("style") {
            return style;
        }
        let style = Object::new();
        properties.set("style", style.clone());
        style
    }

    /// Shorthand for `properties().get(key)`
    pub fn get(&self, key: &str) -> Value {
        self.properties().get(key)
    }

    /// Shorthand for `properties().set(key, value)`
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.properties().set(key, value);
    }

    pub fn append_child(&self, child: Element) {
        self.0.borrow_mut().children.push(child);
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    /// All descendants in document order (excluding `self`)
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// A descendant registered under `name` on this element
    pub fn named(&self, name: &str) -> Option<Element> {
        self.0.borrow().named.get(name).cloned()
    }

    /// Names registered on this element, in registration order
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().named.keys().cloned().collect()
    }

    pub(crate) fn register_named(&self, name: &str, element: &Element) {
        self.0
            .borrow_mut()
            .named
            .insert(name.to_string(), element.clone());
        // expose the descendant's properties for dotted addresses like "title.value"
        self.properties().set(name, element.properties());
    }

    /// Find `self` or a descendant carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        if self.id().as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_id(id))
    }

    /// Copy this element and its subtree.
    ///
    /// Properties, style, attributes and ids are copied; listeners and named
    /// registrations are not.
    pub fn deep_clone(&self) -> Element {
        let data = self.0.borrow();
        Self(Rc::new(RefCell::new(ElementData {
            tag: data.tag.clone(),
            id: data.id.clone(),
            attributes: data.attributes.clone(),
            properties: data.properties.deep_clone(),
            children: data.children.iter().map(Element::deep_clone).collect(),
            named: IndexMap::new(),
        })))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn collect_descendants(element: &Element, out: &mut Vec<Element>) {
    for child in element.children() {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => f
                .debug_struct("Element")
                .field("tag", &data.tag)
                .field("id", &data.id)
                .field("children", &data.children.len())
                .finish(),
            Err(_) => f.write_str("Element { .. }"),
        }
    }
}

/// The host document: a root element and id lookup
#[derive(Clone, Debug)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Element::new("body"),
        }
    }

    pub fn with_root(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Append a top-level element
    pub fn append(&self, element: Element) {
        self.root.append_child(element);
    }

    /// Depth-first lookup by id
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.root.find_by_id(id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
