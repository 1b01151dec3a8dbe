//! Exports
//!
//! The object a scoped script hands to its event-bound elements. Inline
//! handlers on those elements see its entries as free identifiers.

use std::collections::BTreeMap;
use std::rc::Rc;

use islet_handler::{CallContext, HandlerError, Object, Scope, Value};

/// Produces a fresh exports object each time a bound handler runs
pub type ExportsProducer = Rc<dyn Fn() -> Exports>;

/// String-keyed exports of a scoped script
#[derive(Debug, Clone, Default)]
pub struct Exports {
    entries: BTreeMap<String, Value>,
}

impl Exports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export a host function
    pub fn function<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, HandlerError> + 'static,
    {
        self.entries.insert(name.to_string(), Value::function(name, f));
        self
    }

    /// Export a plain value
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.entries.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: Value) -> Option<Value> {
        self.entries.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into a handler object value
    pub fn into_object(self) -> Object {
        Object::from_entries(self.entries)
    }
}

impl Scope for Exports {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}

impl From<Exports> for Value {
    fn from(exports: Exports) -> Self {
        Value::Object(exports.into_object())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let exports = Exports::new()
            .function("save", |_, _| Ok(Value::Undefined))
            .value("limit", 3)
            .value("label", "Save");

        assert_eq!(exports.len(), 3);
        assert_eq!(exports.names().collect::<Vec<_>>(), vec!["label", "limit", "save"]);
        assert_eq!(exports.lookup("limit"), Some(Value::from(3)));
        assert_eq!(exports.lookup("save").map(|v| v.type_name()), Some("function"));
        assert_eq!(exports.lookup("missing"), None);
    }

    #[test]
    fn test_later_export_replaces_earlier() {
        let mut exports = Exports::new().value("mode", "a");
        assert_eq!(exports.insert("mode", Value::from("b")), Some(Value::from("a")));
        assert_eq!(exports.get("mode"), Some(&Value::from("b")));
    }

    #[test]
    fn test_nested_object() {
        let inner = Exports::new().value("x", 1);
        let outer = Exports::new().value("inner", inner);
        let object = outer.into_object();
        match object.get("inner") {
            Some(Value::Object(o)) => assert_eq!(o.get("x"), Some(&Value::from(1))),
            other => panic!("expected object, got {:?}", other),
        }
    }
}
