//! islet
//!
//! Scoped markup fragments. A `<script scoped>` claims the elements of its
//! container: it gets the elements named with `idx` and binds its exports
//! to the inline `on*` handlers of elements marked `evx`.
//!
//! # Example
//! ```rust,ignore
//! use islet::{Exports, Page};
//!
//! let mut page = Page::load(html)?;
//! let named = page.expose(|| Exports::new().function("save", save))?;
//! let field = named.require("field")?;
//! page.click(button)?;
//! ```

mod page;

pub use page::Page;

pub use islet_dom::{Document, NodeId};
pub use islet_handler::{CallContext, HandlerError, Value};
pub use islet_scope::{
    collect, CollectReport, DispatchOutcome, Exports, FragmentId, NamedElements, ScopeConfig,
    ScopeError, ScopeRegistry, UnderflowPolicy,
};

// Re-export sub-crates for advanced usage
pub use islet_dom as dom;
pub use islet_handler as handler;
pub use islet_html as html;
pub use islet_scope as scope;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
