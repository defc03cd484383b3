//! Tests for shadow DOM scoping: `:host`, `:host()`, `:host-context()`,
//! `::slotted()` and focus across shadow boundaries.

use kestrel_dom::{DomTree, NodeId, ShadowRootMode};
use kestrel_selector::{Options, SelectorEngine};

struct Fixture {
    tree: DomTree,
    body: NodeId,
    host: NodeId,
    shadow: NodeId,
    inner: NodeId,
    slot: NodeId,
    slotted: NodeId,
    unslotted: NodeId,
}

/// `<body class=dark><div id=h class=x>` with an open shadow root holding
/// `<div id=d></div><slot name=s></slot>`, and light children
/// `<span slot=s>` and `<em>`.
fn fixture() -> Fixture {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[("class", "dark")]);
    let host = tree.append_element(body, "div", &[("id", "h"), ("class", "x")]);
    let slotted = tree.append_element(host, "span", &[("slot", "s")]);
    let unslotted = tree.append_element(host, "em", &[]);
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = tree.append_element(shadow, "div", &[("id", "d")]);
    let slot = tree.append_element(shadow, "slot", &[("name", "s")]);
    Fixture {
        tree,
        body,
        host,
        shadow,
        inner,
        slot,
        slotted,
        unslotted,
    }
}

fn matches(tree: &DomTree, selector: &str, node: NodeId) -> bool {
    SelectorEngine::new()
        .matches(tree, selector, node, &Options::default())
        .unwrap()
}

fn all(tree: &DomTree, selector: &str, reference: NodeId) -> Vec<NodeId> {
    SelectorEngine::new()
        .query_selector_all(tree, selector, reference, &Options::default())
        .unwrap()
}

// ========== :host ==========

#[test]
fn test_host_does_not_match_shadow_children() {
    let f = fixture();
    assert!(!matches(&f.tree, ":host", f.inner));
}

#[test]
fn test_host_matches_with_shadow_root_as_anchor() {
    let f = fixture();
    assert!(matches(&f.tree, ":host", f.shadow));
    assert!(matches(&f.tree, ":host(.x)", f.shadow));
    assert!(matches(&f.tree, ":host(#h)", f.shadow));
    assert!(!matches(&f.tree, ":host(.y)", f.shadow));
}

#[test]
fn test_host_is_featureless() {
    let f = fixture();
    // Only the :host family can match the featureless host.
    assert!(!matches(&f.tree, "div", f.shadow));
    assert!(!matches(&f.tree, ".x", f.shadow));
    assert!(!matches(&f.tree, ":host.x", f.shadow));
    assert!(matches(&f.tree, ":is(:host)", f.shadow));
}

#[test]
fn test_host_never_matches_in_light_tree() {
    let f = fixture();
    assert!(!matches(&f.tree, ":host", f.host));
    assert!(!matches(&f.tree, ":host(div)", f.host));
}

#[test]
fn test_host_context() {
    let f = fixture();
    assert!(matches(&f.tree, ":host-context(.dark)", f.shadow));
    assert!(matches(&f.tree, ":host-context(.x)", f.shadow));
    assert!(matches(&f.tree, ":host-context(body)", f.shadow));
    assert!(!matches(&f.tree, ":host-context(.light)", f.shadow));
}

#[test]
fn test_query_inside_shadow_root() {
    let f = fixture();
    assert_eq!(all(&f.tree, ":host > div", f.shadow), vec![f.inner]);
    assert_eq!(all(&f.tree, ":host(.x) #d", f.shadow), vec![f.inner]);
    assert_eq!(all(&f.tree, ":host-context(.dark) slot", f.shadow), vec![f.slot]);
    assert!(all(&f.tree, ":host(.y) > div", f.shadow).is_empty());
    assert_eq!(all(&f.tree, "*", f.shadow), vec![f.inner, f.slot]);
}

#[test]
fn test_document_query_does_not_enter_shadow_trees() {
    let f = fixture();
    let divs = all(&f.tree, "div", NodeId::ROOT);
    assert_eq!(divs, vec![f.host]);
    assert!(all(&f.tree, "#d", NodeId::ROOT).is_empty());
}

#[test]
fn test_closest_stays_in_shadow_tree() {
    let f = fixture();
    let engine = SelectorEngine::new();
    let options = Options::default();
    assert_eq!(engine.closest(&f.tree, "div", f.inner, &options).unwrap(), Some(f.inner));
    assert_eq!(engine.closest(&f.tree, "body", f.inner, &options).unwrap(), None);
}

// ========== ::slotted() ==========

#[test]
fn test_slotted() {
    let f = fixture();
    assert!(matches(&f.tree, "::slotted(span)", f.slotted));
    assert!(matches(&f.tree, "slot[name=s]::slotted(*)", f.slotted));
    assert!(!matches(&f.tree, "slot[name=t]::slotted(span)", f.slotted));
    assert!(!matches(&f.tree, "::slotted(b)", f.slotted));
    assert!(!matches(&f.tree, "::slotted(*)", f.unslotted));
}

#[test]
fn test_slotted_left_side_matches_in_shadow_context() {
    let f = fixture();
    assert!(matches(&f.tree, ":host > slot::slotted(span)", f.slotted));
    assert!(!matches(&f.tree, "body slot::slotted(span)", f.slotted));
}

#[test]
fn test_slotted_rejects_complex_argument() {
    let err = SelectorEngine::new().compile("::slotted(a b)").unwrap_err();
    assert_eq!(err.to_string(), "Invalid selector ::slotted(a b)");
}

// ========== focus ==========

#[test]
fn test_focus_inside_shadow_tree() {
    let mut f = fixture();
    f.tree.document_data_mut().focused = Some(f.inner);
    assert!(matches(&f.tree, ":focus", f.inner));
    assert!(matches(&f.tree, ":focus", f.host));
    assert!(!matches(&f.tree, ":focus", f.body));
    assert!(matches(&f.tree, ":focus-within", f.host));
    assert!(matches(&f.tree, ":focus-within", f.body));
    assert!(!matches(&f.tree, ":focus-within", f.slot));
}

#[test]
fn test_focus_visible() {
    let mut f = fixture();
    f.tree.document_data_mut().focused = Some(f.slotted);
    assert!(!matches(&f.tree, ":focus-visible", f.slotted));
    f.tree.document_data_mut().focus_visible = true;
    assert!(matches(&f.tree, ":focus-visible", f.slotted));
}

#[test]
fn test_hover_propagates_to_ancestors() {
    let mut f = fixture();
    f.tree.document_data_mut().hovered = Some(f.slotted);
    assert!(matches(&f.tree, ":hover", f.slotted));
    assert!(matches(&f.tree, ":hover", f.host));
    assert!(matches(&f.tree, "body:hover", f.body));
    assert!(!matches(&f.tree, ":hover", f.unslotted));
}
