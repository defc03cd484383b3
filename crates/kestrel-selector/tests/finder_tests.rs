//! Tests for `closest`, `query_selector`, `query_selector_all`, the compile
//! cache, options and warnings.

use kestrel_common::warning::{WarnSink, WarningLog};
use kestrel_dom::{DomTree, NodeId};
use kestrel_selector::{MatchConfig, Options, SelectorEngine};

/// `<ul id=ul><li id=a>x</li><li id=b class=sel>y</li><li id=c>z</li></ul>`
fn list_document() -> (DomTree, [NodeId; 4]) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let ul = tree.append_element(body, "ul", &[("id", "ul")]);
    let a = tree.append_element(ul, "li", &[("id", "a")]);
    let _ = tree.append_text(a, "x");
    let b = tree.append_element(ul, "li", &[("id", "b"), ("class", "sel")]);
    let _ = tree.append_text(b, "y");
    let c = tree.append_element(ul, "li", &[("id", "c")]);
    let _ = tree.append_text(c, "z");
    (tree, [ul, a, b, c])
}

fn all(tree: &DomTree, selector: &str, reference: NodeId) -> Vec<NodeId> {
    SelectorEngine::new()
        .query_selector_all(tree, selector, reference, &Options::default())
        .unwrap()
}

fn first(tree: &DomTree, selector: &str, reference: NodeId) -> Option<NodeId> {
    SelectorEngine::new()
        .query_selector(tree, selector, reference, &Options::default())
        .unwrap()
}

fn closest(tree: &DomTree, selector: &str, node: NodeId) -> Option<NodeId> {
    SelectorEngine::new()
        .closest(tree, selector, node, &Options::default())
        .unwrap()
}

// ========== list scenario ==========

#[test]
fn test_query_selector_all_class() {
    let (tree, [ul, _, b, _]) = list_document();
    assert_eq!(all(&tree, "li.sel", ul), vec![b]);
}

#[test]
fn test_query_selector_scope_child() {
    let (tree, [ul, _, b, _]) = list_document();
    assert_eq!(first(&tree, ":scope > li:nth-child(2)", ul), Some(b));
}

#[test]
fn test_closest_ancestor() {
    let (tree, [ul, _, _, c]) = list_document();
    assert_eq!(closest(&tree, "ul", c), Some(ul));
    assert_eq!(closest(&tree, "li", c), Some(c));
    assert_eq!(closest(&tree, "ol", c), None);
}

#[test]
fn test_closest_on_text_is_none() {
    let (tree, [_, a, _, _]) = list_document();
    let text = tree.first_child(a).unwrap();
    assert_eq!(closest(&tree, "li", text), None);
}

// ========== ordering and uniqueness ==========

#[test]
fn test_results_in_document_order() {
    let (tree, [ul, a, b, c]) = list_document();
    assert_eq!(all(&tree, "#c, #a, li.sel", NodeId::ROOT), vec![a, b, c]);
    assert_eq!(all(&tree, "li", ul), vec![a, b, c]);
}

#[test]
fn test_overlapping_branches_deduplicated() {
    let (tree, [_, a, b, c]) = list_document();
    assert_eq!(all(&tree, "li, :is(#a, #b) ~ li, ul > *", NodeId::ROOT), vec![a, b, c]);
    assert_eq!(all(&tree, ":is(#a, li) + li", NodeId::ROOT), vec![b, c]);
}

#[test]
fn test_id_anchored_query() {
    let (tree, [ul, a, b, c]) = list_document();
    assert_eq!(all(&tree, "#ul li", NodeId::ROOT), vec![a, b, c]);
    assert_eq!(all(&tree, "#ul > li.sel", NodeId::ROOT), vec![b]);
    assert_eq!(all(&tree, "#a ~ li", NodeId::ROOT), vec![b, c]);
    assert_eq!(all(&tree, "#a + li", NodeId::ROOT), vec![b]);
    // Results outside the reference subtree are dropped.
    assert_eq!(all(&tree, "#ul li", a), Vec::<NodeId>::new());
    assert_eq!(all(&tree, "#ul li", ul), vec![a, b, c]);
}

#[test]
fn test_id_anchored_query_with_wrapped_has() {
    let (mut tree, [ul, a, b, c]) = list_document();
    let _ = tree.append_element(a, "em", &[]);
    assert_eq!(all(&tree, "#ul > li:not(:has(em))", NodeId::ROOT), vec![b, c]);
    assert_eq!(all(&tree, "#ul li:is(:has(em), .sel)", NodeId::ROOT), vec![a, b]);
    assert_eq!(first(&tree, "#ul li:is(.sel, :has(em))", ul), Some(a));
}

#[test]
fn test_id_anchored_and_plain_branches_merge() {
    let (tree, [ul, a, b, c]) = list_document();
    assert_eq!(all(&tree, "#a ~ li, body > ul", NodeId::ROOT), vec![ul, b, c]);
    assert_eq!(first(&tree, "#b + li, li", NodeId::ROOT), Some(a));
}

#[test]
fn test_reference_itself_excluded() {
    let (tree, [ul, ..]) = list_document();
    assert!(!all(&tree, "ul", ul).contains(&ul));
    assert_eq!(first(&tree, "ul", ul), None);
}

#[test]
fn test_scope_outside_subtree_still_constrains() {
    let (tree, [ul, a, b, c]) = list_document();
    // Ancestors outside the reference subtree still take part in matching.
    assert_eq!(all(&tree, "body li", ul), vec![a, b, c]);
    assert_eq!(all(&tree, "body > li", ul), Vec::<NodeId>::new());
}

// ========== reference kinds ==========

#[test]
fn test_query_document_fragment() {
    let mut tree = DomTree::new();
    let fragment = tree.create_document_fragment();
    let p = tree.create_element("p");
    tree.append_child(fragment, p);
    let span = tree.append_element(p, "span", &[]);
    assert_eq!(all(&tree, "span", fragment), vec![span]);
    assert_eq!(all(&tree, "p > span", fragment), vec![span]);
    assert_eq!(all(&tree, ":scope > p", fragment), vec![p]);
}

#[test]
fn test_query_from_text_returns_nothing() {
    let (tree, [_, a, _, _]) = list_document();
    let text = tree.first_child(a).unwrap();
    assert!(all(&tree, "*", text).is_empty());
    assert_eq!(first(&tree, "*", text), None);
}

#[test]
fn test_query_selector_with_has() {
    let (mut tree, [ul, a, _, _]) = list_document();
    let _ = tree.append_element(a, "em", &[]);
    assert_eq!(all(&tree, "li:has(em)", NodeId::ROOT), vec![a]);
    assert_eq!(first(&tree, ":has(> li.sel)", NodeId::ROOT), Some(ul));
}

#[test]
fn test_idempotent() {
    let (tree, [ul, ..]) = list_document();
    let engine = SelectorEngine::new();
    let options = Options::default();
    let once = engine.query_selector_all(&tree, "li:not(.sel)", ul, &options).unwrap();
    let twice = engine.query_selector_all(&tree, "li:not(.sel)", ul, &options).unwrap();
    assert_eq!(once, twice);
}

// ========== errors ==========

#[test]
fn test_invalid_selector_errors_before_matching() {
    let (tree, [ul, ..]) = list_document();
    let err = SelectorEngine::new()
        .query_selector_all(&tree, "li[", ul, &Options::default())
        .unwrap_err();
    assert_eq!(err.name(), "SyntaxError");
}

// ========== cache ==========

#[test]
fn test_cache_compiles_once() {
    let engine = SelectorEngine::new();
    let first = engine.compile("div > p").unwrap();
    let second = engine.compile("div > p").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().len(), 1);
}

#[test]
fn test_cache_does_not_store_errors() {
    let engine = SelectorEngine::new();
    assert!(engine.compile("div >").is_err());
    assert!(engine.cache().is_empty());
}

// ========== warnings and strict mode ==========

#[test]
fn test_unsupported_pseudo_class_warns_once() {
    let (tree, [ul, ..]) = list_document();
    let log = WarningLog::new();
    let options = Options {
        strict: false,
        warn: Some(&log),
    };
    let found = SelectorEngine::new()
        .query_selector_all(&tree, "li:playing", ul, &options)
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(log.messages(), vec!["Unsupported pseudo-class :playing".to_string()]);
    assert_eq!(log.entries()[0].component, "Selector");
}

#[test]
fn test_unsupported_pseudo_class_strict_fails() {
    let (tree, [ul, ..]) = list_document();
    let options = Options {
        strict: true,
        warn: None,
    };
    let err = SelectorEngine::new()
        .query_selector_all(&tree, "li:playing", ul, &options)
        .unwrap_err();
    assert_eq!(err.name(), "NotSupportedError");
    assert_eq!(err.to_string(), "Unsupported pseudo-class :playing");
}

#[test]
fn test_pseudo_element_never_matches() {
    let (tree, [ul, a, ..]) = list_document();
    let log = WarningLog::new();
    let options = Options {
        strict: false,
        warn: Some(&log),
    };
    let engine = SelectorEngine::new();
    assert!(!engine.matches(&tree, "li::before", a, &options).unwrap());
    assert!(engine.query_selector_all(&tree, "li::before", ul, &options).unwrap().is_empty());
    assert_eq!(
        log.messages(),
        vec![
            "Unsupported pseudo-element ::before".to_string(),
            "Unsupported pseudo-element ::before".to_string(),
        ]
    );
}

#[test]
fn test_closure_warn_sink() {
    let (tree, [_, a, ..]) = list_document();
    let seen = std::cell::RefCell::new(Vec::new());
    let sink = |w: &kestrel_common::warning::Warning| seen.borrow_mut().push(w.message.clone());
    let options = Options {
        strict: false,
        warn: Some(&sink as &dyn WarnSink),
    };
    assert!(!SelectorEngine::new().matches(&tree, ":autofill", a, &options).unwrap());
    assert_eq!(seen.borrow().len(), 1);
}

// ========== configuration ==========

#[test]
fn test_match_config_from_json() {
    let config: MatchConfig = serde_json::from_str(r#"{"strict": true, "unknown": 1}"#).unwrap();
    assert!(config.strict);
    let config: MatchConfig = serde_json::from_str("{}").unwrap();
    assert!(!config.strict);
    let options: Options<'_> = config.into();
    assert!(!options.strict);
    assert!(options.warn.is_none());
}
