//! Template instantiation
//!
//! A template is an ordinary element staged in the document (typically with
//! `position: absolute` and `visibility: hidden`) whose descendants carry
//! `name` attributes. [`instantiate`] clones it and registers every named
//! descendant on the clone's root, regardless of nesting depth.
//!
//! When two descendants share a name the later one in document order wins.

use tracing::debug;

use crate::element::{Document, Element};
use crate::error::TemplateError;

/// Attribute that marks a descendant for named access
pub const NAME_ATTRIBUTE: &str = "name";

/// Clone the element with id `template_id` and expose its named descendants.
pub fn instantiate(document: &Document, template_id: &str) -> Result<Element, TemplateError> {
    let source = document
        .get_element_by_id(template_id)
        .ok_or_else(|| TemplateError::NotFound(template_id.to_string()))?;

    let node = source.deep_clone();
    node.set_id(None);

    let style = node.style();
    style.set("visibility", "visible");
    style.set("position", "static");

    let mut registered = 0usize;
    for descendant in node.descendants() {
        if let Some(name) = descendant.attribute(NAME_ATTRIBUTE) {
            node.register_named(&name, &descendant);
            registered += 1;
        }
    }

    debug!(template_id, registered, "instantiated template");
    Ok(node)
}
