//! islet Scoped Fragments
//!
//! A fragment is a container element holding a `<script scoped>`. Elements
//! in it are named with `idx="name"` or marked event-bound with `evx`.
//!
//! - [`collect`] walks a parsed document and queues one pending fragment
//!   per scoped script, compiling the inline handlers of event-bound elements.
//! - [`ScopeRegistry::expose`] (or `expose_for` / `claim`) hands the
//!   name-to-element mapping to the script and binds its exports producer.
//! - [`ScopeRegistry::dispatch`] runs inline handlers with the exports in scope.

mod collector;
mod config;
mod dispatch;
mod error;
mod exports;
mod fragment;
mod globals;
mod registry;

pub use collector::{collect, CollectReport};
pub use config::{ScopeConfig, UnderflowPolicy};
pub use dispatch::DispatchOutcome;
pub use error::ScopeError;
pub use exports::{Exports, ExportsProducer};
pub use fragment::{CompiledHandler, FragmentId, NamedElements, PendingFragment};
pub use globals::GlobalScope;
pub use registry::ScopeRegistry;
