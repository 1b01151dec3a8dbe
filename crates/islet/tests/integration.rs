//! Integration tests - Full pipeline from markup to handler dispatch
//!
//! HTML → DOM → collection → claims → events

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use islet::{Exports, NodeId, Page, ScopeConfig, ScopeError, UnderflowPolicy, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FULL PIPELINE TESTS
// ============================================================================

#[test]
fn test_save_button_fills_field() -> Result<()> {
    init_tracing();
    let html = r#"
        <!DOCTYPE html>
        <html>
            <head><title>Scoped</title></head>
            <body>
                <form>
                    <input idx="field">
                    <button id="save" evx onclick="save()">Save</button>
                    <script scoped></script>
                </form>
            </body>
        </html>
    "#;

    let mut page = Page::load(html)?;
    assert_eq!(page.title(), "Scoped");
    assert_eq!(page.scoped_scripts().len(), 1);

    let field = Rc::new(Cell::new(NodeId::NONE));
    let captured = field.clone();
    let named = page.expose(move || {
        let field = captured.clone();
        Exports::new().function("save", move |cx, _| {
            cx.set_value(field.get(), "ok")?;
            Ok(Value::Undefined)
        })
    })?;
    field.set(named.require("field")?);
    assert_eq!(page.value(field.get()), "");

    let button = page.element_by_id("save").expect("save button");
    // The attribute keeps its original source
    assert_eq!(page.document().tree().get_attribute(button, "onclick"), Some("save()"));

    let outcome = page.click(button)?;
    assert!(outcome.is_ok(), "errors: {:?}", outcome.errors);
    assert_eq!(page.value(field.get()), "ok");
    Ok(())
}

#[test]
fn test_counter_components_stay_independent() -> Result<()> {
    init_tracing();
    let html = r#"
        <div class="counter">
            <output idx="display" value="0"></output>
            <button id="inc-a" evx onclick="increment()">+</button>
            <script scoped></script>
        </div>
        <div class="counter">
            <output idx="display" value="0"></output>
            <button id="inc-b" evx onclick="increment()">+</button>
            <script scoped></script>
        </div>
    "#;
    let mut page = Page::load(html)?;

    let mut displays = Vec::new();
    for _ in page.scoped_scripts() {
        let display = Rc::new(Cell::new(NodeId::NONE));
        let count = Rc::new(Cell::new(0));
        let (d, c) = (display.clone(), count.clone());
        let named = page.expose(move || {
            let (d, c) = (d.clone(), c.clone());
            Exports::new().function("increment", move |cx, _| {
                c.set(c.get() + 1);
                cx.set_value(d.get(), &c.get().to_string())?;
                Ok(Value::Undefined)
            })
        })?;
        display.set(named.require("display")?);
        displays.push(display);
    }

    let a = page.element_by_id("inc-a").expect("first button");
    let b = page.element_by_id("inc-b").expect("second button");
    page.click(a)?;
    page.click(a)?;
    page.click(b)?;

    assert_eq!(page.value(displays[0].get()), "2");
    assert_eq!(page.value(displays[1].get()), "1");
    Ok(())
}

#[test]
fn test_claim_by_script_node() -> Result<()> {
    init_tracing();
    let mut page = Page::load(
        r#"<div><input idx="one"><script scoped></script></div>
           <div><input idx="two"><script scoped></script></div>"#,
    )?;
    let scripts = page.scoped_scripts();

    let second = page.expose_for(scripts[1], Exports::new)?;
    assert!(second.contains("two"));
    let first = page.expose(Exports::new)?;
    assert!(first.contains("one"));

    assert!(matches!(page.expose(Exports::new), Err(ScopeError::NoPendingFragment { claims: 2 })));
    Ok(())
}

#[test]
fn test_console_and_host_globals() -> Result<()> {
    init_tracing();
    let mut page = Page::load(
        r#"<div>
             <button id="go" evx onclick="console.log('clicked', this.id); report(event.type)"></button>
             <script scoped></script>
           </div>"#,
    )?;

    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = reports.clone();
    page.registry_mut().globals_mut().define(
        "report",
        Value::function("report", move |_, args| {
            let text = args.first().map(Value::to_display_string).unwrap_or_default();
            sink.borrow_mut().push(text);
            Ok(Value::Undefined)
        }),
    );
    page.expose(Exports::new)?;

    let button = page.element_by_id("go").expect("button");
    let outcome = page.click(button)?;
    assert!(outcome.is_ok(), "errors: {:?}", outcome.errors);
    assert_eq!(*reports.borrow(), vec!["click".to_string()]);
    Ok(())
}

#[test]
fn test_handler_reads_element_and_document() -> Result<()> {
    init_tracing();
    let mut page = Page::load(
        r#"<form>
             <input id="query" value="rust">
             <button id="go" name="search" evx
                     onclick="alert(id); copy(name, document.getElementById('query').value)"></button>
             <script scoped></script>
           </form>"#,
    )?;

    let copied = Rc::new(RefCell::new(Vec::new()));
    let sink = copied.clone();
    page.expose(move || {
        let sink = sink.clone();
        Exports::new().function("copy", move |_, args| {
            sink.borrow_mut().extend(args.iter().map(Value::to_display_string));
            Ok(Value::Undefined)
        })
    })?;

    let button = page.element_by_id("go").expect("button");
    let outcome = page.click(button)?;
    assert!(outcome.is_ok(), "errors: {:?}", outcome.errors);
    assert_eq!(*copied.borrow(), vec!["search".to_string(), "rust".to_string()]);
    Ok(())
}

#[test]
fn test_config_from_json() -> Result<()> {
    init_tracing();
    let config = ScopeConfig::from_json(
        r#"{ "script_marker": "island", "name_marker": "ref", "underflow": "empty" }"#,
    )?;
    let mut page = Page::load_with_config(
        r#"<section><span ref="label">hi</span><script island></script></section>"#,
        config,
    )?;
    assert_eq!(page.registry().config().underflow, UnderflowPolicy::Empty);

    let named = page.expose(Exports::new)?;
    let label = named.require("label")?;
    assert_eq!(page.document().tree().text_content(label), "hi");

    // Underflow hands back an empty mapping under this policy
    assert!(page.expose(Exports::new)?.is_empty());
    Ok(())
}

#[test]
fn test_plain_inline_handler_without_fragment() -> Result<()> {
    init_tracing();
    let mut page = Page::load(r#"<a id="link" onclick="return false">x</a>"#)?;
    assert!(page.scoped_scripts().is_empty());

    let link = page.element_by_id("link").expect("link");
    let outcome = page.click(link)?;
    assert_eq!(outcome.handlers_run, 1);
    assert!(outcome.default_prevented);
    Ok(())
}

#[test]
fn test_reset_registry() -> Result<()> {
    init_tracing();
    let mut page = Page::load(r#"<div><button id="go" evx onclick="x()"></button><script scoped></script></div>"#)?;
    page.expose(|| Exports::new().function("x", |_, _| Ok(Value::Undefined)))?;

    let button = page.element_by_id("go").expect("button");
    page.registry_mut().reset();
    assert!(!page.registry().is_event_bound(button));
    assert!(page.scoped_scripts().is_empty());

    // After a reset the element is an ordinary inline handler with no exports
    let outcome = page.click(button)?;
    assert_eq!(outcome.errors.len(), 1);
    Ok(())
}
