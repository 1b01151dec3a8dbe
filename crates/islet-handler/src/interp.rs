//! Handler Interpreter
//!
//! Tree-walking evaluation of a `Program` against a document, the event
//! being dispatched and a chain of name scopes.

use islet_dom::{Document, DomTree, Event, EventPhase, NodeId};

use super::ast::{AstNodeKind, ExprId, LiteralValue, Program};
use crate::{HandlerError, Object, Value};

/// Everything a running handler (or a host function it calls) can touch
pub struct CallContext<'a> {
    pub document: &'a mut Document,
    pub event: &'a mut Event,
    /// Element whose handler is running (`this`)
    pub this: NodeId,
}

impl<'a> CallContext<'a> {
    pub fn new(document: &'a mut Document, event: &'a mut Event, this: NodeId) -> Self {
        Self { document, event, this }
    }

    /// Current value of a form control ("" if it has none)
    pub fn value(&self, element: NodeId) -> String {
        self.document
            .tree()
            .element_value(element)
            .unwrap_or_default()
            .to_string()
    }

    /// Overwrite the current value of a form control
    pub fn set_value(&mut self, element: NodeId, value: &str) -> Result<(), HandlerError> {
        self.document.tree_mut().set_element_value(element, value)?;
        Ok(())
    }
}

/// Name resolution for free identifiers
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Lookup that may read the running handler's document and event
    fn resolve(&self, name: &str, cx: &CallContext<'_>) -> Option<Value> {
        let _ = cx;
        self.lookup(name)
    }
}

impl Scope for Object {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Binds the implicit `event` parameter of inline handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBinding;

impl Scope for EventBinding {
    fn lookup(&self, name: &str) -> Option<Value> {
        (name == "event").then_some(Value::Event)
    }
}

/// Exposes the properties and attributes of the element whose handler
/// runs, so `value` reads `this.value`
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementBinding;

impl Scope for ElementBinding {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }

    fn resolve(&self, name: &str, cx: &CallContext<'_>) -> Option<Value> {
        element_property(cx.document.tree(), cx.this, name)
    }
}

/// Ordered list of scopes; the first one that knows a name wins
#[derive(Default)]
pub struct ScopeChain<'s> {
    scopes: Vec<&'s dyn Scope>,
}

impl<'s> ScopeChain<'s> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Append an outer scope
    pub fn with(mut self, scope: &'s dyn Scope) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl Scope for ScopeChain<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes.iter().find_map(|s| s.lookup(name))
    }

    fn resolve(&self, name: &str, cx: &CallContext<'_>) -> Option<Value> {
        self.scopes.iter().find_map(|s| s.resolve(name, cx))
    }
}

enum Completion {
    Normal,
    Return(Value),
}

/// Run a program; the result is its `return` value, or `undefined`
pub fn run(
    program: &Program,
    cx: &mut CallContext<'_>,
    scope: &dyn Scope,
) -> Result<Value, HandlerError> {
    let interp = Interpreter { program, scope };
    for &stmt in &program.body {
        if let Completion::Return(value) = interp.exec(stmt, cx)? {
            return Ok(value);
        }
    }
    Ok(Value::Undefined)
}

struct Interpreter<'p, 's> {
    program: &'p Program,
    scope: &'s dyn Scope,
}

impl Interpreter<'_, '_> {
    fn kind(&self, id: ExprId) -> Result<&AstNodeKind, HandlerError> {
        self.program
            .ast
            .get(id)
            .ok_or_else(|| HandlerError::Type(format!("dangling expression {}", id.0)))
    }

    fn exec(&self, stmt: ExprId, cx: &mut CallContext<'_>) -> Result<Completion, HandlerError> {
        match self.kind(stmt)? {
            AstNodeKind::ExpressionStatement { expr } => {
                self.eval(*expr, cx)?;
                Ok(Completion::Normal)
            }
            AstNodeKind::ReturnStatement { argument } => {
                let value = match *argument {
                    Some(arg) => self.eval(arg, cx)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            _ => {
                self.eval(stmt, cx)?;
                Ok(Completion::Normal)
            }
        }
    }

    fn eval(&self, expr: ExprId, cx: &mut CallContext<'_>) -> Result<Value, HandlerError> {
        match self.kind(expr)?.clone() {
            AstNodeKind::Identifier { name } => self
                .scope
                .resolve(&name, cx)
                .ok_or_else(|| HandlerError::Reference(name.to_string())),
            AstNodeKind::This => Ok(Value::Element(cx.this)),
            AstNodeKind::Literal { value } => Ok(match value {
                LiteralValue::Undefined => Value::Undefined,
                LiteralValue::Null => Value::Null,
                LiteralValue::Boolean(b) => Value::Bool(b),
                LiteralValue::Number(n) => Value::Number(n),
                LiteralValue::String(s) => Value::String(s.into()),
            }),
            AstNodeKind::Member { object, property } => {
                let object = self.eval(object, cx)?;
                get_property(cx, &object, &property)
            }
            AstNodeKind::Call { callee, arguments } => {
                // Method calls keep their receiver for built-in methods
                if let AstNodeKind::Member { object, property } = self.kind(callee)?.clone() {
                    let receiver = self.eval(object, cx)?;
                    let args = self.eval_arguments(&arguments, cx)?;
                    return call_method(cx, &receiver, &property, &args);
                }
                let what = match self.kind(callee)? {
                    AstNodeKind::Identifier { name } => name.to_string(),
                    _ => "expression".to_string(),
                };
                let function = self.eval(callee, cx)?;
                let args = self.eval_arguments(&arguments, cx)?;
                call_value(cx, &function, &args, &what)
            }
            AstNodeKind::Assign { target, value } => {
                let AstNodeKind::Member { object, property } = self.kind(target)?.clone() else {
                    return Err(HandlerError::Type("Invalid assignment target".into()));
                };
                let object = self.eval(object, cx)?;
                let value = self.eval(value, cx)?;
                set_property(cx, &object, &property, value.clone())?;
                Ok(value)
            }
            AstNodeKind::ExpressionStatement { expr } => self.eval(expr, cx),
            AstNodeKind::ReturnStatement { .. } => {
                Err(HandlerError::Type("return is not an expression".into()))
            }
        }
    }

    fn eval_arguments(
        &self,
        arguments: &[ExprId],
        cx: &mut CallContext<'_>,
    ) -> Result<Vec<Value>, HandlerError> {
        arguments.iter().map(|&arg| self.eval(arg, cx)).collect()
    }
}

fn call_value(
    cx: &mut CallContext<'_>,
    callee: &Value,
    args: &[Value],
    what: &str,
) -> Result<Value, HandlerError> {
    match callee {
        Value::Function(f) => f.call(cx, args),
        other => Err(HandlerError::Type(format!(
            "{} is not a function (got {})",
            what,
            other.type_name()
        ))),
    }
}

fn call_method(
    cx: &mut CallContext<'_>,
    receiver: &Value,
    name: &str,
    args: &[Value],
) -> Result<Value, HandlerError> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or_default();

    match receiver {
        Value::Element(id) => {
            let id = *id;
            match name {
                "getAttribute" => {
                    let attr = arg(0).to_display_string();
                    Ok(cx
                        .document
                        .tree()
                        .get_attribute(id, &attr)
                        .map(Value::from)
                        .unwrap_or(Value::Null))
                }
                "setAttribute" => {
                    let attr = arg(0).to_display_string();
                    let value = arg(1).to_display_string();
                    cx.document.tree_mut().set_attribute(id, &attr, &value)?;
                    Ok(Value::Undefined)
                }
                "hasAttribute" => {
                    let attr = arg(0).to_display_string();
                    Ok(Value::Bool(cx.document.tree().has_attribute(id, &attr)))
                }
                "removeAttribute" => {
                    let attr = arg(0).to_display_string();
                    cx.document.tree_mut().remove_attribute(id, &attr)?;
                    Ok(Value::Undefined)
                }
                _ => {
                    let f = get_property(cx, receiver, name)?;
                    call_value(cx, &f, args, name)
                }
            }
        }
        Value::Event => match name {
            "preventDefault" => {
                cx.event.prevent_default();
                Ok(Value::Undefined)
            }
            "stopPropagation" => {
                cx.event.stop_propagation();
                Ok(Value::Undefined)
            }
            _ => {
                let f = get_property(cx, receiver, name)?;
                call_value(cx, &f, args, name)
            }
        },
        _ => {
            let f = get_property(cx, receiver, name)?;
            call_value(cx, &f, args, name)
        }
    }
}

fn get_property(cx: &CallContext<'_>, object: &Value, name: &str) -> Result<Value, HandlerError> {
    match object {
        Value::Undefined | Value::Null => Err(HandlerError::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            object.type_name(),
            name
        ))),
        Value::Element(id) => {
            Ok(element_property(cx.document.tree(), *id, name).unwrap_or_default())
        }
        Value::Event => {
            let event = &*cx.event;
            Ok(match name {
                "type" => Value::from(event.event_type.name()),
                "target" => Value::Element(event.target),
                "currentTarget" => event.current_target.map(Value::Element).unwrap_or(Value::Null),
                "defaultPrevented" => Value::Bool(event.is_default_prevented()),
                "bubbles" => Value::Bool(event.bubbles),
                "cancelable" => Value::Bool(event.cancelable),
                "eventPhase" => Value::from(match event.phase {
                    EventPhase::None => 0,
                    EventPhase::AtTarget => 2,
                    EventPhase::Bubbling => 3,
                }),
                _ => Value::Undefined,
            })
        }
        Value::Object(o) => Ok(o.get(name).cloned().unwrap_or_default()),
        Value::String(s) if name == "length" => Ok(Value::Number(s.chars().count() as f64)),
        _ => Ok(Value::Undefined),
    }
}

/// Built-in element property, else the attribute of that name
fn element_property(tree: &DomTree, id: NodeId, name: &str) -> Option<Value> {
    Some(match name {
        "value" => Value::from(tree.element_value(id).unwrap_or_default()),
        "id" => Value::from(tree.get_attribute(id, "id").unwrap_or_default()),
        "tagName" => Value::from(tree.tag_name(id).unwrap_or_default().to_ascii_uppercase()),
        "textContent" => Value::from(tree.text_content(id)),
        "parentElement" => tree.parent_element(id).map(Value::Element).unwrap_or(Value::Null),
        attr => Value::from(tree.get_attribute(id, attr)?),
    })
}

fn set_property(
    cx: &mut CallContext<'_>,
    object: &Value,
    name: &str,
    value: Value,
) -> Result<(), HandlerError> {
    match object {
        Value::Element(id) => {
            let text = value.to_display_string();
            match name {
                "value" => cx.document.tree_mut().set_element_value(*id, &text)?,
                "textContent" => {
                    return Err(HandlerError::Type("textContent is read-only here".into()));
                }
                attr => cx.document.tree_mut().set_attribute(*id, attr, &text)?,
            }
            Ok(())
        }
        Value::Undefined | Value::Null => Err(HandlerError::Type(format!(
            "Cannot set properties of {} (setting '{}')",
            object.type_name(),
            name
        ))),
        // Exports objects and event fields are read-only
        _ => Err(HandlerError::Type(format!(
            "Cannot assign to '{}' on {}",
            name,
            object.type_name()
        ))),
    }
}
