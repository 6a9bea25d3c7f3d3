// Unit tests for building snapshots from static HTML

use super::*;

fn find(dom: &DomSnapshot, id: &str) -> NodeId {
    dom.get_element_by_id(id).unwrap()
}

#[test]
fn test_scripts_and_styles_are_dropped() {
    let dom = DomSnapshot::from_html(
        r#"<body><script>var x = "<input id='fake'>";</script><style>p{}</style><p id="p">Hi</p></body>"#,
    );
    assert!(dom.select(|n| n.is("script") || n.is("style")).next().is_none());
    assert_eq!(dom.text_content(find(&dom, "p")), "Hi");
}

#[test]
fn test_visibility_is_inherited() {
    let dom = DomSnapshot::from_html(
        r#"<body>
            <div style="display: none"><input id="a"></div>
            <div style="visibility:hidden !important"><input id="b"></div>
            <section hidden><input id="c"></section>
            <input id="d" type="hidden">
            <input id="e">
        </body>"#,
    );
    for id in ["a", "b", "c", "d"] {
        assert!(!dom.node(find(&dom, id)).visible, "{} should be hidden", id);
    }
    assert!(dom.node(find(&dom, "e")).visible);
}

#[test]
fn test_state_attributes() {
    let dom = DomSnapshot::from_html(
        r#"<input id="a" disabled><input id="b" readonly><input id="c" style="width: 120px;">"#,
    );
    assert!(dom.node(find(&dom, "a")).disabled);
    assert!(dom.node(find(&dom, "b")).read_only);
    assert_eq!(dom.node(find(&dom, "c")).style_width, "120px");
}

#[test]
fn test_initial_values() {
    let dom = DomSnapshot::from_html(
        r#"<input id="i" value="jane@example.com">
           <textarea id="t">Hello there</textarea>
           <select id="s1"><option value="">Choose</option><option value="us" selected>United States</option></select>
           <select id="s2"><option>First</option><option>Second</option></select>"#,
    );
    assert_eq!(dom.node(find(&dom, "i")).value, "jane@example.com");
    assert_eq!(dom.node(find(&dom, "t")).value, "Hello there");
    assert_eq!(dom.node(find(&dom, "s1")).value, "us");
    assert_eq!(dom.node(find(&dom, "s2")).value, "First");
}

#[test]
fn test_attribute_names_are_lowercase() {
    let dom = DomSnapshot::from_html(r#"<input id="x" MaxLength="40" Aria-Label="City">"#);
    let el = dom.node(find(&dom, "x"));
    assert_eq!(el.attr("maxlength"), Some("40"));
    assert_eq!(el.attr("aria-label"), Some("City"));
}
