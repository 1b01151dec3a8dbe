//! islet Handler Language
//!
//! Inline `on*` attribute handlers are parsed once into a `Program` and
//! evaluated directly: free identifiers are looked up through a `Scope`
//! chain instead of textually wrapping the source and re-evaluating it.
//!
//! Supported syntax is a small JS-shaped subset: calls, member access,
//! member assignment, literals, `this`, `event` and `return`.

mod ast;
mod interp;
mod lexer;
mod parser;
mod token;
mod value;

pub use ast::Program;
pub use interp::{run, CallContext, ElementBinding, EventBinding, Scope, ScopeChain};
pub use value::{NativeFn, NativeFunction, Object, Value};

use islet_dom::DomError;

/// Parse handler source into a program
pub fn compile(source: &str) -> Result<Program, HandlerError> {
    parser::Parser::new(source).parse()
}

/// Handler error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: u32 },

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    /// Raised by host functions
    #[error("{0}")]
    Native(String),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
