//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes in a fresh tree cannot form a cycle
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate html/head/body after the tree has been built by a parser
    pub fn finalize(&mut self) {
        let html = self
            .tree
            .children(self.tree.root())
            .find(|&(id, _)| self.tree.tag_name(id) == Some("html"))
            .map(|(id, _)| id)
            .unwrap_or(NodeId::NONE);

        let child = |tag: &str| {
            self.tree
                .children(html)
                .find(|&(id, _)| self.tree.tag_name(id) == Some(tag))
                .map(|(id, _)| id)
                .unwrap_or(NodeId::NONE)
        };
        let head = child("head");
        let body = child("body");

        self.html_element = html;
        self.head_element = head;
        self.body_element = body;
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first <title> in <head>
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.tree
            .children(self.head_element)
            .find(|&(id, _)| self.tree.tag_name(id) == Some("title"))
            .map(|(id, _)| self.tree.text_content(id))
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let id = self.tree.interner().lookup(id)?;
        self.tree.descendants(self.tree.root()).find(|&node| {
            self.tree
                .get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|e| e.id == Some(id))
        })
    }

    /// All `<tag attr>` elements in document order (`tag[attr]` selector)
    pub fn query_tag_with_attribute(&self, tag: &str, attr: &str) -> Vec<NodeId> {
        self.tree
            .elements_with_attribute(self.tree.root(), attr)
            .into_iter()
            .filter(|&id| self.tree.tag_name(id) == Some(tag))
            .collect()
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new("about:blank");
        assert_eq!(doc.tree().tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tree().tag_name(doc.head()), Some("head"));
        assert_eq!(doc.tree().tag_name(doc.body()), Some("body"));
    }

    #[test]
    fn test_finalize_finds_skeleton() {
        let mut doc = Document::empty("test://");
        let tree = doc.tree_mut();
        let html = tree.create_element("html");
        let body = tree.create_element("body");
        tree.append_child(tree.root(), html).unwrap();
        tree.append_child(html, body).unwrap();

        doc.finalize();
        assert_eq!(doc.body(), body);
        assert!(!doc.head().is_valid());
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let tree = doc.tree_mut();
        let input = tree.create_element("input");
        tree.set_attribute(input, "id", "email").unwrap();
        tree.append_child(body, input).unwrap();

        assert_eq!(doc.get_element_by_id("email"), Some(input));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }

    #[test]
    fn test_query_tag_with_attribute() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let tree = doc.tree_mut();
        let plain = tree.create_element("script");
        let scoped = tree.create_element("script");
        let div = tree.create_element("div");
        tree.set_attribute(scoped, "scoped", "").unwrap();
        tree.set_attribute(div, "scoped", "").unwrap();
        for n in [plain, scoped, div] {
            tree.append_child(body, n).unwrap();
        }

        assert_eq!(doc.query_tag_with_attribute("script", "scoped"), vec![scoped]);
    }
}
