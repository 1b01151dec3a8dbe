//! islet HTML Parser
//!
//! HTML5 parsing built on html5ever. The parsed tree is converted into the
//! arena DOM the scope collector walks.

mod parser;

pub use islet_dom::{Document, DomTree, Node, NodeId};
pub use parser::HtmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML string with a document URL
pub fn parse_with_url(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
