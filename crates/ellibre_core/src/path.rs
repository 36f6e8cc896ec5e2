//! Dotted property addresses
//!
//! `resolve(root, "a.b.c")` walks `root.a.b` and returns it together with the
//! leaf key `c`. Nothing is cached; every call walks the graph again.

use crate::error::PathError;
use crate::object::Object;
use crate::value::Value;

/// A resolved (container, key) pair
#[derive(Clone, Debug)]
pub struct PropertyRef {
    pub container: Object,
    pub key: String,
}

impl PropertyRef {
    pub fn get(&self) -> Value {
        self.container.get(&self.key)
    }

    pub fn set(&self, value: impl Into<Value>) {
        self.container.set(&self.key, value);
    }
}

/// Resolve a dotted address against `root`.
///
/// Every segment but the last must name an object; the leaf itself may be absent.
pub fn resolve(root: &Object, address: &str) -> Result<PropertyRef, PathError> {
    let mut segments: Vec<&str> = address.split('.').collect();
    // split always yields at least one segment
    let key = segments.pop().unwrap_or_default();

    let mut container = root.clone();
    for segment in segments {
        container = match container.get(segment) {
            Value::Object(next) => next,
            _ => {
                return Err(PathError {
                    path: address.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
    }

    Ok(PropertyRef {
        container,
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Object {
        let c = Object::new().with("d", 4);
        let b = Object::new().with("c", c);
        Object::new().with("a", 1).with("b", b)
    }

    #[test]
    fn test_resolve_top_level() {
        let root = graph();
        let target = resolve(&root, "a").unwrap();
        assert!(target.container.ptr_eq(&root));
        assert_eq!(target.key, "a");
        assert_eq!(target.get(), Value::from(1));
    }

    #[test]
    fn test_resolve_nested() {
        let root = graph();
        let target = resolve(&root, "b.c.d").unwrap();
        assert_eq!(target.key, "d");
        assert_eq!(target.get(), Value::from(4));

        target.set(5);
        let again = resolve(&root, "b.c.d").unwrap();
        assert_eq!(again.get(), Value::from(5));
    }

    #[test]
    fn test_missing_leaf_resolves() {
        let root = graph();
        let target = resolve(&root, "b.nope").unwrap();
        assert_eq!(target.get(), Value::Undefined);
    }

    #[test]
    fn test_missing_intermediate_fails() {
        let root = graph();
        let err = resolve(&root, "b.x.y").unwrap_err();
        assert_eq!(err.segment, "x");
        assert_eq!(err.path, "b.x.y");

        // a plain value cannot be walked into either
        assert!(resolve(&root, "a.b").is_err());
    }
}
