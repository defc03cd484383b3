//! Tests for the linguistic pseudo-classes `:lang()` and `:dir()`.

use kestrel_dom::{DomTree, NodeId, ShadowRootMode};
use kestrel_selector::dom_util::{TextDirection, extended_filter, first_strong};
use kestrel_selector::{Options, SelectorEngine};

fn document() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    (tree, body)
}

fn matches(tree: &DomTree, selector: &str, node: NodeId) -> bool {
    SelectorEngine::new()
        .matches(tree, selector, node, &Options::default())
        .unwrap()
}

// ========== extended filtering ==========

#[test]
fn test_extended_filter_prefix() {
    assert!(extended_filter("en", "en-GB"));
    assert!(extended_filter("en", "EN"));
    assert!(!extended_filter("en", "eng"));
    assert!(!extended_filter("en-GB", "en"));
}

#[test]
fn test_extended_filter_skips_intermediate_subtags() {
    assert!(extended_filter("de-DE", "de-Latn-DE"));
    assert!(extended_filter("de-DE", "de-DE-1996"));
    assert!(!extended_filter("de-DE", "de-x-DE"));
    assert!(!extended_filter("de-DE", "de"));
}

#[test]
fn test_extended_filter_wildcards() {
    assert!(extended_filter("*-CH", "de-CH"));
    assert!(extended_filter("*-CH", "fr-Latn-CH"));
    assert!(!extended_filter("*-CH", "de-DE"));
    assert!(extended_filter("*", "ja"));
    assert!(extended_filter("de-*-DE", "de-Latn-DE"));
}

#[test]
fn test_extended_filter_empty() {
    assert!(extended_filter("", ""));
    assert!(!extended_filter("", "en"));
    assert!(!extended_filter("en", ""));
}

// ========== :lang() ==========

#[test]
fn test_lang_attribute() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[("lang", "en-GB")]);
    assert!(matches(&tree, "div:lang(en)", div));
    assert!(matches(&tree, "div:lang(EN-gb)", div));
    assert!(!matches(&tree, "div:lang(eng)", div));
    assert!(!matches(&tree, "div:lang(fr)", div));
    assert!(matches(&tree, "div:lang(fr, en)", div));
}

#[test]
fn test_lang_three_letter_tag() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[("lang", "eng")]);
    assert!(!matches(&tree, ":lang(en)", div));
    assert!(matches(&tree, ":lang(eng)", div));
}

#[test]
fn test_lang_inherited() {
    let (mut tree, body) = document();
    let outer = tree.append_element(body, "div", &[("lang", "fr")]);
    let inner = tree.append_element(outer, "p", &[]);
    let nested = tree.append_element(inner, "span", &[("lang", "de-CH")]);
    assert!(matches(&tree, ":lang(fr)", inner));
    assert!(matches(&tree, ":lang(*-CH)", nested));
    assert!(!matches(&tree, ":lang(fr)", nested));
}

#[test]
fn test_lang_unknown_matches_nothing() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[]);
    assert!(!matches(&tree, ":lang(en)", div));
    assert!(!matches(&tree, ":lang(*)", div));
}

#[test]
fn test_lang_from_content_language_pragma() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let head = tree.append_element(html, "head", &[]);
    let _ = tree.append_element(
        head,
        "meta",
        &[("http-equiv", "Content-Language"), ("content", "de, en")],
    );
    let body = tree.append_element(html, "body", &[]);
    let div = tree.append_element(body, "div", &[]);
    assert!(matches(&tree, ":lang(de)", div));
    assert!(!matches(&tree, ":lang(en)", div));
}

#[test]
fn test_lang_crosses_into_shadow_tree() {
    let (mut tree, body) = document();
    let host = tree.append_element(body, "div", &[("lang", "ja")]);
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = tree.append_element(shadow, "p", &[]);
    assert!(matches(&tree, ":lang(ja)", inner));
}

// ========== :dir() ==========

#[test]
fn test_first_strong() {
    assert_eq!(first_strong("123 abc"), Some(TextDirection::Ltr));
    assert_eq!(first_strong("123 \u{5e9}\u{5dc}\u{5d5}\u{5dd}"), Some(TextDirection::Rtl));
    assert_eq!(first_strong("\u{645}\u{631}\u{62d}\u{628}\u{627}"), Some(TextDirection::Rtl));
    assert_eq!(first_strong("123 !?"), None);
}

#[test]
fn test_dir_defaults_to_ltr() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[]);
    assert!(matches(&tree, ":dir(ltr)", div));
    assert!(!matches(&tree, ":dir(rtl)", div));
}

#[test]
fn test_dir_attribute_inherited() {
    let (mut tree, body) = document();
    let outer = tree.append_element(body, "div", &[("dir", "RTL")]);
    let inner = tree.append_element(outer, "span", &[]);
    let reset = tree.append_element(outer, "span", &[("dir", "ltr")]);
    let bogus = tree.append_element(outer, "span", &[("dir", "up")]);
    assert!(matches(&tree, ":dir(rtl)", outer));
    assert!(matches(&tree, ":dir(rtl)", inner));
    assert!(matches(&tree, ":dir(ltr)", reset));
    assert!(matches(&tree, ":dir(rtl)", bogus));
}

#[test]
fn test_dir_auto_uses_first_strong_text() {
    let (mut tree, body) = document();
    let hebrew = tree.append_element(body, "p", &[("dir", "auto")]);
    let _ = tree.append_text(hebrew, "\u{5e9}\u{5dc}\u{5d5}\u{5dd} abc");
    let latin = tree.append_element(body, "p", &[("dir", "auto")]);
    let _ = tree.append_text(latin, "abc \u{5e9}");
    let neutral = tree.append_element(body, "p", &[("dir", "auto")]);
    let _ = tree.append_text(neutral, "42");
    assert!(matches(&tree, ":dir(rtl)", hebrew));
    assert!(matches(&tree, ":dir(ltr)", latin));
    assert!(matches(&tree, ":dir(ltr)", neutral));
}

#[test]
fn test_dir_auto_finds_text_in_descendants() {
    let (mut tree, body) = document();
    let auto = tree.append_element(body, "div", &[("dir", "auto")]);
    let em = tree.append_element(auto, "em", &[]);
    let _ = tree.append_text(em, "\u{627}\u{644}\u{639}\u{631}\u{628}\u{64a}\u{629}");
    assert!(matches(&tree, ":dir(rtl)", auto));
    assert!(matches(&tree, ":dir(rtl)", em));
}

#[test]
fn test_dir_auto_skips_bdi_and_explicit_dir() {
    let (mut tree, body) = document();
    let auto = tree.append_element(body, "div", &[("dir", "auto")]);
    let bdi = tree.append_element(auto, "bdi", &[]);
    let _ = tree.append_text(bdi, "\u{5e9}\u{5dc}\u{5d5}\u{5dd}");
    let explicit = tree.append_element(auto, "span", &[("dir", "rtl")]);
    let _ = tree.append_text(explicit, "\u{5e9}");
    assert!(matches(&tree, ":dir(ltr)", auto));
    assert!(matches(&tree, ":dir(rtl)", bdi));
}

#[test]
fn test_dir_bdi_without_strong_text_is_ltr() {
    let (mut tree, body) = document();
    let outer = tree.append_element(body, "div", &[("dir", "rtl")]);
    let bdi = tree.append_element(outer, "bdi", &[]);
    let _ = tree.append_text(bdi, "123");
    assert!(matches(&tree, ":dir(ltr)", bdi));
}

#[test]
fn test_dir_tel_input_is_ltr() {
    let (mut tree, body) = document();
    let outer = tree.append_element(body, "div", &[("dir", "rtl")]);
    let tel = tree.append_element(outer, "input", &[("type", "tel")]);
    let text = tree.append_element(outer, "input", &[("type", "text")]);
    assert!(matches(&tree, ":dir(ltr)", tel));
    assert!(matches(&tree, ":dir(rtl)", text));
}

#[test]
fn test_dir_auto_textarea_uses_value() {
    let (mut tree, body) = document();
    let area = tree.append_element(body, "textarea", &[("dir", "auto")]);
    assert!(matches(&tree, ":dir(ltr)", area));
    tree.as_element_mut(area).unwrap().state.value =
        Some("\u{5e9}\u{5dc}\u{5d5}\u{5dd}".to_string());
    assert!(matches(&tree, ":dir(rtl)", area));
}

#[test]
fn test_dir_inherits_across_shadow_boundary() {
    let (mut tree, body) = document();
    let host = tree.append_element(body, "div", &[("dir", "rtl")]);
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = tree.append_element(shadow, "span", &[]);
    assert!(matches(&tree, ":dir(rtl)", inner));
}

#[test]
fn test_dir_auto_slot_uses_assigned_nodes() {
    let (mut tree, body) = document();
    let host = tree.append_element(body, "div", &[]);
    let light = tree.append_element(host, "span", &[]);
    let _ = tree.append_text(light, "\u{5e9}\u{5dc}\u{5d5}\u{5dd}");
    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let slot = tree.append_element(shadow, "slot", &[("dir", "auto")]);
    assert!(matches(&tree, ":dir(rtl)", slot));
}
