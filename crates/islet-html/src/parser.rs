//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use islet_dom::{Document, DomTree, ElementData, Node, NodeId, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser {
    keep_whitespace: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self { keep_whitespace: false }
    }

    /// Keep whitespace-only text nodes (dropped by default)
    pub fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT);
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Convert an RcDom node (and its subtree) into the arena
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let name = tree.interner_mut().intern(name);
                let id = tree.push(Node::doctype(name));
                attach(tree, parent, id);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if self.keep_whitespace || !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    attach(tree, parent, id);
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                attach(tree, parent, id);
            }
            RcNodeData::Element { name, attrs, .. } => {
                let ns = tree.interner_mut().intern(&name.ns);
                let local = tree.interner_mut().intern(&name.local);
                let mut elem = ElementData::new(QualName::new(ns, local));

                for attr in attrs.borrow().iter() {
                    let attr_ns = tree.interner_mut().intern(&attr.name.ns);
                    let attr_local = tree.interner_mut().intern(&attr.name.local);
                    let value = attr.value.to_string();

                    if attr.name.local.as_ref() == "id" {
                        elem.id = Some(tree.interner_mut().intern(&value));
                    }
                    elem.set_attr(QualName::new(attr_ns, attr_local), value);
                }

                let id = tree.push(Node::from_element(elem));
                attach(tree, parent, id);

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id);
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not meaningful in HTML documents
            }
        }
    }
}

fn attach(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    if let Err(e) = tree.append_child(parent, child) {
        tracing::debug!("Dropping node {}: {}", child, e);
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert_eq!(doc.title(), "Test");
    }

    #[test]
    fn test_parse_fragment_gets_body() {
        let html = "<div><span>Text</span></div>";
        let doc = HtmlParser::new().parse(html);

        // Fragments get wrapped in html/head/body by html5ever
        assert!(doc.body().is_valid());
        assert_eq!(doc.tree().text_content(doc.body()), "Text");
    }

    #[test]
    fn test_attributes_preserved_in_order() {
        let html = r#"<button evx onclick="save()" idx="btn">Save</button>"#;
        let doc = HtmlParser::new().parse(html);
        let button = doc.query_tag_with_attribute("button", "evx")[0];

        assert_eq!(doc.tree().attribute_names(button), vec!["evx", "onclick", "idx"]);
        assert_eq!(doc.tree().get_attribute(button, "evx"), Some(""));
        assert_eq!(doc.tree().get_attribute(button, "onclick"), Some("save()"));
    }

    #[test]
    fn test_whitespace_text_dropped_by_default() {
        let html = "<div>   </div>";
        let dropped = HtmlParser::new().parse(html);
        let kept = HtmlParser::new().keep_whitespace(true).parse(html);

        assert!(kept.tree().len() > dropped.tree().len());
    }
}
