//! Global Scope
//!
//! Outermost scope of every handler: `console`, `alert`, `document` and
//! whatever the host defines. Console output is forwarded to `tracing`.

use std::collections::BTreeMap;

use islet_handler::{Object, Scope, Value};

/// Names visible to every handler after exports, `event` and the
/// element's own properties
#[derive(Debug, Clone)]
pub struct GlobalScope {
    entries: BTreeMap<String, Value>,
}

impl GlobalScope {
    /// Globals with the built-in `console`, `alert` and `document`
    pub fn new() -> Self {
        let mut globals = Self::empty();
        globals.define("console", Value::Object(console()));
        globals.define("document", Value::Object(document()));
        globals.define(
            "alert",
            Value::function("alert", |_, args| {
                let message = args.first().map(Value::to_display_string).unwrap_or_default();
                tracing::info!("[alert] {}", message);
                Ok(Value::Undefined)
            }),
        );
        globals
    }

    /// Globals with nothing defined
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Define or replace a global
    pub fn define(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(name.to_string(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for GlobalScope {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

fn console() -> Object {
    let method = |name: &'static str, level: Level| {
        (
            name,
            Value::function(name, move |_, args| {
                log_with_level(level, args);
                Ok(Value::Undefined)
            }),
        )
    };

    Object::from_entries([
        method("log", Level::Log),
        method("info", Level::Info),
        method("warn", Level::Warn),
        method("error", Level::Error),
        method("debug", Level::Debug),
    ])
}

fn document() -> Object {
    Object::from_entries([
        (
            "getElementById",
            Value::function("getElementById", |cx, args| {
                let id = args.first().map(Value::to_display_string).unwrap_or_default();
                Ok(cx
                    .document
                    .get_element_by_id(&id)
                    .map(Value::Element)
                    .unwrap_or(Value::Null))
            }),
        ),
        (
            "getTitle",
            Value::function("getTitle", |cx, _| Ok(Value::from(cx.document.title()))),
        ),
    ])
}

fn log_with_level(level: Level, args: &[Value]) {
    let output = args
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ");

    match level {
        Level::Error => tracing::error!("[console] {}", output),
        Level::Warn => tracing::warn!("[console] {}", output),
        Level::Debug => tracing::debug!("[console] {}", output),
        Level::Log | Level::Info => tracing::info!("[console] {}", output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let globals = GlobalScope::new();
        let names: Vec<_> = globals.names().collect();
        assert_eq!(names, vec!["alert", "console", "document"]);

        let Some(Value::Object(console)) = globals.lookup("console") else {
            panic!("console should be an object");
        };
        for method in ["log", "info", "warn", "error", "debug"] {
            assert_eq!(console.get(method).map(Value::type_name), Some("function"));
        }

        let Some(Value::Object(document)) = globals.lookup("document") else {
            panic!("document should be an object");
        };
        assert!(document.get("getElementById").is_some());
    }

    #[test]
    fn test_define_and_remove() {
        let mut globals = GlobalScope::empty();
        globals.define("limit", 10).define("name", "islet");

        assert_eq!(globals.lookup("limit"), Some(Value::from(10)));
        assert_eq!(globals.remove("limit"), Some(Value::from(10)));
        assert_eq!(globals.lookup("limit"), None);
        assert_eq!(globals.get("name"), Some(&Value::from("islet")));
    }
}
