//! Page - A parsed document with its scoped fragments

use islet_dom::{Document, NodeId};
use islet_html::HtmlParser;
use islet_scope::{
    collect, DispatchOutcome, Exports, NamedElements, ScopeConfig, ScopeError, ScopeRegistry,
};

/// A loaded page: the document and the fragments collected from it
pub struct Page {
    document: Document,
    registry: ScopeRegistry,
}

impl Page {
    /// Parse `html` and collect its scoped fragments
    pub fn load(html: &str) -> Result<Self, ScopeError> {
        Self::load_with_config(html, ScopeConfig::default())
    }

    /// Like `load`, with custom marker names or underflow policy
    pub fn load_with_config(html: &str, config: ScopeConfig) -> Result<Self, ScopeError> {
        Self::load_with_url(html, "about:blank", config)
    }

    pub fn load_with_url(html: &str, url: &str, config: ScopeConfig) -> Result<Self, ScopeError> {
        let mut registry = ScopeRegistry::with_config(config)?;
        let document = HtmlParser::new().parse_with_url(html, url);
        let report = collect(&document, &mut registry)?;

        tracing::info!(
            "Loaded page {}: {} fragments, {} handlers",
            url,
            report.fragments.len(),
            report.handlers_compiled
        );

        Ok(Self { document, registry })
    }

    pub fn url(&self) -> &str {
        self.document.url()
    }

    pub fn title(&self) -> String {
        self.document.title()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScopeRegistry {
        &mut self.registry
    }

    /// Scoped script elements, in document order
    pub fn scoped_scripts(&self) -> Vec<NodeId> {
        self.registry.collected_scripts()
    }

    /// Claim the next fragment (order-based)
    pub fn expose<F>(&mut self, producer: F) -> Result<NamedElements, ScopeError>
    where
        F: Fn() -> Exports + 'static,
    {
        self.registry.expose(producer)
    }

    /// Claim the fragment of a specific script element
    pub fn expose_for<F>(
        &mut self,
        script: NodeId,
        producer: F,
    ) -> Result<NamedElements, ScopeError>
    where
        F: Fn() -> Exports + 'static,
    {
        self.registry.expose_for(script, producer)
    }

    /// Fire an event at an element
    pub fn dispatch(&mut self, target: NodeId, event: &str) -> Result<DispatchOutcome, ScopeError> {
        self.registry.dispatch(&mut self.document, target, event)
    }

    pub fn click(&mut self, target: NodeId) -> Result<DispatchOutcome, ScopeError> {
        self.dispatch(target, "click")
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document.get_element_by_id(id)
    }

    /// Current value of a form control ("" if it has none)
    pub fn value(&self, element: NodeId) -> String {
        self.document
            .tree()
            .element_value(element)
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_collects() {
        let page = Page::load(
            r#"<div><input idx="name"><script scoped></script></div>
               <div><script scoped></script></div>"#,
        )
        .unwrap();

        assert_eq!(page.scoped_scripts().len(), 2);
        assert_eq!(page.registry().pending_len(), 2);
    }

    #[test]
    fn test_load_rejects_bad_config() {
        let config = ScopeConfig {
            script_marker: "has space".into(),
            ..ScopeConfig::default()
        };
        assert!(matches!(Page::load_with_config("", config), Err(ScopeError::Config(_))));
    }

    #[test]
    fn test_value_of_unknown_element_is_empty() {
        let page = Page::load("<input id='x' value='v'>").unwrap();
        let input = page.element_by_id("x").unwrap();
        assert_eq!(page.value(input), "v");
        assert_eq!(page.value(NodeId(9999)), "");
    }
}
