//! Edge case tests for islet-html
//!
//! Malformed markup and the marker attributes scoped fragments rely on.

use islet_html::{parse, parse_with_url, HtmlParser};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty_string() {
    let doc = parse("");
    assert!(doc.tree().len() >= 1);
    assert!(doc.body().is_valid(), "html5ever always synthesizes a body");
}

#[test]
fn test_parse_only_doctype() {
    let doc = parse("<!DOCTYPE html>");
    assert!(doc.tree().len() > 1);
}

#[test]
fn test_parse_with_url_keeps_url() {
    let doc = parse_with_url("<p>x</p>", "https://example.test/page");
    assert_eq!(doc.url(), "https://example.test/page");
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let doc = parse("<div><p><span>text");
    assert_eq!(doc.tree().text_content(doc.body()), "text");
}

#[test]
fn test_parse_extra_closing_tags() {
    let doc = parse("<div></div></div></div>");
    assert_eq!(doc.tree().children(doc.body()).count(), 1);
}

// ============================================================================
// SCOPED FRAGMENT MARKUP
// ============================================================================

#[test]
fn test_boolean_marker_attributes() {
    let html = r#"
        <section>
            <input idx="field">
            <button evx onclick="save()">Save</button>
            <script scoped>/* host script */</script>
        </section>
    "#;
    let doc = HtmlParser::new().parse(html);

    let scripts = doc.query_tag_with_attribute("script", "scoped");
    assert_eq!(scripts.len(), 1);

    let section = doc.tree().parent_element(scripts[0]).unwrap();
    assert_eq!(doc.tree().tag_name(section), Some("section"));
    assert_eq!(doc.tree().elements_with_attribute(section, "idx").len(), 1);
    assert_eq!(doc.tree().elements_with_attribute(section, "evx").len(), 1);
}

#[test]
fn test_scripts_in_document_order() {
    let html = r#"
        <div id="a"><script scoped></script></div>
        <div id="b"><script scoped></script></div>
        <div id="c"><script></script></div>
    "#;
    let doc = parse(html);
    let scripts = doc.query_tag_with_attribute("script", "scoped");
    let parents: Vec<_> = scripts
        .iter()
        .map(|&s| doc.tree().parent_element(s).unwrap())
        .collect();

    assert_eq!(
        parents,
        vec![
            doc.get_element_by_id("a").unwrap(),
            doc.get_element_by_id("b").unwrap(),
        ]
    );
}

#[test]
fn test_handler_attribute_kept_verbatim() {
    let html = r#"<button evx onclick="add(1, 'two'); event.preventDefault()">+</button>"#;
    let doc = parse(html);
    let button = doc.query_tag_with_attribute("button", "evx")[0];

    assert_eq!(
        doc.tree().get_attribute(button, "onclick"),
        Some("add(1, 'two'); event.preventDefault()")
    );
}

#[test]
fn test_attribute_names_lowercased() {
    let doc = parse(r#"<button EVX onClick="go()">go</button>"#);
    let button = doc.query_tag_with_attribute("button", "evx")[0];
    assert_eq!(doc.tree().attribute_names(button), vec!["evx", "onclick"]);
}
