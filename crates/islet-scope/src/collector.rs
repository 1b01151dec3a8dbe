//! Fragment Collector
//!
//! Walks a parsed document once, turning every scoped script into a
//! pending fragment and compiling the inline handlers of its event-bound
//! elements.

use islet_dom::{Document, NodeId};

use crate::{CompiledHandler, FragmentId, NamedElements, ScopeError, ScopeRegistry};

/// Outcome of one collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// Fragments enqueued by this pass, in document order
    pub fragments: Vec<FragmentId>,
    pub handlers_compiled: usize,
    /// Handlers whose source did not parse
    pub handlers_invalid: usize,
}

/// Collect every scoped script of `doc` into `registry`.
///
/// Scripts the registry already knows are skipped, so a second pass over
/// the same document enqueues nothing and compiles nothing.
pub fn collect(doc: &Document, registry: &mut ScopeRegistry) -> Result<CollectReport, ScopeError> {
    let config = registry.config().clone();
    let tree = doc.tree();
    let mut report = CollectReport::default();

    for script in doc.query_tag_with_attribute("script", &config.script_marker) {
        if registry.is_collected(script) {
            tracing::debug!("Script {} already collected, skipping", script);
            continue;
        }

        let container = tree
            .parent_element(script)
            .ok_or(ScopeError::OrphanScript { script })?;

        let mut named = NamedElements::new();
        for element in tree.elements_with_attribute(container, &config.name_marker) {
            let name = tree.get_attribute(element, &config.name_marker).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            if let Some(previous) = named.insert(name, element) {
                tracing::debug!("Name '{}' moves from {} to {}", name, previous, element);
            }
        }

        let event_bound = tree.elements_with_attribute(container, &config.event_marker);
        for &element in &event_bound {
            if registry.has_handlers(element) {
                tracing::debug!("Element {} is shared with an earlier fragment", element);
                continue;
            }
            let handlers = compile_handlers(doc, element, &config.handler_prefix);
            report.handlers_compiled += handlers.len();
            report.handlers_invalid += handlers.iter().filter(|h| !h.is_valid()).count();
            registry.set_handlers(element, handlers);
        }

        let id = registry.enqueue(script, container, named, event_bound);
        report.fragments.push(id);
    }

    tracing::debug!(
        "Collected {} fragments, {} handlers ({} invalid)",
        report.fragments.len(),
        report.handlers_compiled,
        report.handlers_invalid
    );
    Ok(report)
}

/// Compile every `<prefix><event>` attribute of an element
fn compile_handlers(doc: &Document, element: NodeId, prefix: &str) -> Vec<CompiledHandler> {
    doc.tree()
        .attributes(element)
        .filter_map(|(name, source)| {
            let event = name.strip_prefix(prefix).filter(|e| !e.is_empty())?;
            let program = islet_handler::compile(source);
            match &program {
                Ok(program) => tracing::trace!(
                    "Compiled {} on {} ({} statements)",
                    name,
                    element,
                    program.statement_count()
                ),
                Err(e) => tracing::warn!("Invalid {} handler on {}: {}", name, element, e),
            }
            Some(CompiledHandler {
                event: event.to_ascii_lowercase(),
                attribute: name.to_string(),
                program,
            })
        })
        .collect()
}
