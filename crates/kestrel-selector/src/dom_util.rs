//! DOM algorithms the matcher needs beyond plain field access:
//! directionality, language, editability, namespace lookup and document
//! order.

use core::cmp::Ordering;

use kestrel_dom::{DocumentPosition, XMLNS_NAMESPACE};
use unicode_bidi::{BidiClass, bidi_class};

use crate::adapter::{NodeKind, TreeAdapter, xml_lang};
use crate::error::{Result, SelectorError};
use crate::walker::descendants;

/// Resolved text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

impl TextDirection {
    /// The keyword `:dir()` compares against.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// First strong character of `text`, per the Unicode bidi algorithm rules
/// P2 and P3.
#[must_use]
pub fn first_strong(text: &str) -> Option<TextDirection> {
    text.chars().find_map(|c| match bidi_class(c) {
        BidiClass::L => Some(TextDirection::Ltr),
        BidiClass::R | BidiClass::AL => Some(TextDirection::Rtl),
        _ => None,
    })
}

/// A `dir` attribute value in one of its valid states.
fn dir_state<T: TreeAdapter>(tree: &T, element: T::Node) -> Option<String> {
    let value = tree.get_attribute(element, "dir")?.to_ascii_lowercase();
    matches!(value.as_str(), "ltr" | "rtl" | "auto").then_some(value)
}

/// `input` types whose value participates in auto directionality.
fn is_text_like_input<T: TreeAdapter>(tree: &T, element: T::Node) -> bool {
    if tree.html_local_name(element) != Some("input") {
        return false;
    }
    let kind = tree
        .get_attribute(element, "type")
        .map(str::to_ascii_lowercase);
    !matches!(
        kind.as_deref(),
        Some(
            "checkbox" | "radio" | "file" | "image" | "number" | "range" | "color" | "date"
                | "month" | "week" | "time" | "datetime-local"
        )
    )
}

/// The current value of a form control, falling back to its default value.
pub(crate) fn control_value<T: TreeAdapter>(tree: &T, element: T::Node) -> String {
    if let Some(value) = tree.current_value(element) {
        return value;
    }
    if tree.html_local_name(element) == Some("textarea") {
        return tree
            .children(element)
            .filter_map(|child| tree.text(child))
            .collect();
    }
    tree.get_attribute(element, "value")
        .unwrap_or_default()
        .to_string()
}

/// [HTML § 3.2.6.4 The `dir` attribute](https://html.spec.whatwg.org/multipage/dom.html#the-dir-attribute)
///
/// "The directionality of an element (any element, not just an HTML
/// element) is either 'ltr' or 'rtl'."
pub fn directionality<T: TreeAdapter>(tree: &T, element: T::Node) -> TextDirection {
    match dir_state(tree, element).as_deref() {
        Some("ltr") => return TextDirection::Ltr,
        Some("rtl") => return TextDirection::Rtl,
        Some(_) => return auto_directionality(tree, element).unwrap_or(TextDirection::Ltr),
        None => {}
    }

    match tree.html_local_name(element) {
        // "If the element is a bdi element and the dir attribute is not in a
        // defined state ... the directionality of the element is the
        // element's auto directionality."
        Some("bdi") => return auto_directionality(tree, element).unwrap_or(TextDirection::Ltr),
        // "If the element is an input element whose type attribute is in the
        // Telephone state ... 'ltr'."
        Some("input")
            if tree
                .get_attribute(element, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("tel")) =>
        {
            return TextDirection::Ltr;
        }
        _ => {}
    }

    parent_directionality(tree, element)
}

/// "the parent directionality": the parent element's, the host's for a
/// shadow root child, otherwise 'ltr'.
fn parent_directionality<T: TreeAdapter>(tree: &T, node: T::Node) -> TextDirection {
    let Some(parent) = tree.parent(node) else {
        return TextDirection::Ltr;
    };
    match tree.kind(parent) {
        NodeKind::Element => directionality(tree, parent),
        NodeKind::ShadowRoot => tree
            .shadow_host(parent)
            .map_or(TextDirection::Ltr, |host| directionality(tree, host)),
        _ => TextDirection::Ltr,
    }
}

/// [HTML § 3.2.6.4 auto directionality](https://html.spec.whatwg.org/multipage/dom.html#auto-directionality)
fn auto_directionality<T: TreeAdapter>(tree: &T, element: T::Node) -> Option<TextDirection> {
    // "If element is an auto-directionality form-associated element"
    let name = tree.html_local_name(element);
    if name == Some("textarea") || is_text_like_input(tree, element) {
        return first_strong(&control_value(tree, element));
    }

    // "If element is a slot element whose root is a shadow root"
    if name == Some("slot") && tree.kind(tree.root_of(element)) == NodeKind::ShadowRoot {
        for node in tree.assigned_nodes(element) {
            let found = match tree.kind(node) {
                NodeKind::Text => tree.text(node).and_then(first_strong),
                NodeKind::Element if !skips_auto_direction(tree, node) => {
                    contained_text_direction(tree, node)
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        return None;
    }

    contained_text_direction(tree, element)
}

/// Elements whose content does not contribute to an ancestor's auto
/// directionality.
fn skips_auto_direction<T: TreeAdapter>(tree: &T, element: T::Node) -> bool {
    matches!(
        tree.html_local_name(element),
        Some("bdi" | "script" | "style" | "textarea")
    ) || dir_state(tree, element).is_some()
}

/// [HTML § 3.2.6.4 contained text auto directionality](https://html.spec.whatwg.org/multipage/dom.html#contained-text-auto-directionality)
///
/// "For each node descendant of element's descendants, in tree order: if
/// descendant is a bdi, script, style, or textarea element, or has a dir
/// attribute in a defined state, then continue (skipping its descendants)."
fn contained_text_direction<T: TreeAdapter>(tree: &T, element: T::Node) -> Option<TextDirection> {
    let mut stack: Vec<T::Node> = tree.children(element).collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        match tree.kind(node) {
            NodeKind::Text => {
                if let Some(direction) = tree.text(node).and_then(first_strong) {
                    return Some(direction);
                }
            }
            NodeKind::Element if !skips_auto_direction(tree, node) => {
                if tree.html_local_name(node) == Some("slot") {
                    if let Some(direction) = auto_directionality(tree, node) {
                        return Some(direction);
                    }
                    continue;
                }
                let first = stack.len();
                stack.extend(tree.children(node));
                stack[first..].reverse();
            }
            _ => {}
        }
    }
    None
}

/// The host of a shadow root, or the parent.
fn flat_parent<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<T::Node> {
    match tree.parent(node) {
        Some(parent) if tree.kind(parent) == NodeKind::ShadowRoot => tree.shadow_host(parent),
        Some(parent) => Some(parent),
        None if tree.kind(node) == NodeKind::ShadowRoot => tree.shadow_host(node),
        None => None,
    }
}

/// Inclusive ancestors, crossing from shadow roots into their hosts.
pub fn shadow_including_ancestors<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
) -> impl Iterator<Item = T::Node> + '_ {
    core::iter::successors(Some(node), move |&n| flat_parent(tree, n))
}

/// [HTML § 3.2.6.2 The `lang` and `xml:lang` attributes](https://html.spec.whatwg.org/multipage/dom.html#the-lang-and-xml:lang-attributes)
///
/// "To determine the language of a node, user agents must use the first
/// appropriate step in the following list: If the node is an element that
/// has a lang attribute in the XML namespace set ... If the node is an HTML
/// element or an element in the SVG namespace, and it has a lang in no
/// namespace attribute set ... If the node's parent is a shadow root, use
/// the language of that shadow root's host. If the node's parent element is
/// not null, use the language of that parent element. Otherwise, if there
/// is a pragma-set default language set, then that is the language of the
/// node."
///
/// `None` means the language is unknown.
pub fn language<T: TreeAdapter>(tree: &T, element: T::Node) -> Option<String> {
    for node in shadow_including_ancestors(tree, element) {
        if !tree.is_element(node) {
            continue;
        }
        if let Some(lang) = xml_lang(tree, node).or_else(|| tree.get_attribute(node, "lang")) {
            return Some(lang.to_string());
        }
    }
    pragma_language(tree, element)
}

/// [HTML § 4.2.5.3 `http-equiv="content-language"`](https://html.spec.whatwg.org/multipage/semantics.html#attr-meta-http-equiv-content-language)
fn pragma_language<T: TreeAdapter>(tree: &T, element: T::Node) -> Option<String> {
    let document = tree.owner_document(element)?;
    descendants(tree, document)
        .filter(|&n| tree.html_local_name(n) == Some("meta"))
        .filter(|&n| {
            tree.get_attribute(n, "http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("content-language"))
        })
        .find_map(|n| {
            // "If input contains any U+002C COMMA characters, then let input be
            // the substring before the first comma."
            let content = tree.get_attribute(n, "content")?;
            let lang = content.split(',').next().unwrap_or_default().trim();
            (!lang.is_empty()).then(|| lang.to_string())
        })
}

/// [RFC 4647 § 3.3.2 Extended Filtering](https://www.rfc-editor.org/rfc/rfc4647#section-3.3.2)
///
/// Subtags compare ASCII case-insensitively; `*` matches any sequence of
/// subtags; a singleton in the tag stops the match. An empty range matches
/// only an empty language.
#[must_use]
pub fn extended_filter(range: &str, tag: &str) -> bool {
    if range.is_empty() || tag.is_empty() {
        return range.is_empty() && tag.is_empty();
    }
    let range: Vec<String> = range.split('-').map(str::to_ascii_lowercase).collect();
    let tag: Vec<String> = tag.split('-').map(str::to_ascii_lowercase).collect();

    // "Compare the first subtag in the range to the first subtag in the tag.
    // If the first subtags do not match and the range's first subtag is not
    // '*', the match fails."
    if range[0] != "*" && range[0] != tag[0] {
        return false;
    }

    let (mut r, mut t) = (1, 1);
    while r < range.len() {
        if range[r] == "*" {
            r += 1;
            continue;
        }
        let Some(subtag) = tag.get(t) else {
            return false;
        };
        if *subtag == range[r] {
            r += 1;
            t += 1;
        } else if subtag.len() == 1 {
            return false;
        } else {
            t += 1;
        }
    }
    true
}

/// [HTML § 6.8.1 `contenteditable`](https://html.spec.whatwg.org/multipage/interaction.html#attr-contenteditable)
///
/// Whether `element` is editable through `contenteditable` inheritance or
/// the document's design mode.
pub fn is_content_editable<T: TreeAdapter>(tree: &T, element: T::Node) -> bool {
    if let Some(document) = tree.owner_document(element) {
        if tree.document_state(document).design_mode {
            return true;
        }
    }
    for node in core::iter::once(element).chain(tree.ancestors(element)) {
        if !tree.is_element(node) {
            break;
        }
        match tree.get_attribute(node, "contenteditable").map(str::to_ascii_lowercase) {
            Some(value) if matches!(value.as_str(), "" | "true" | "plaintext-only") => return true,
            Some(value) if value == "false" => return false,
            _ => {}
        }
    }
    false
}

/// [DOM § 4.4 locate a namespace](https://dom.spec.whatwg.org/#locate-a-namespace)
///
/// Resolves `prefix` through `xmlns:prefix` declarations on the inclusive
/// ancestors of `element`, then the element's own prefix.
///
/// # Errors
///
/// Returns [`SelectorError::UndeclaredNamespace`] when nothing binds the
/// prefix.
pub fn lookup_namespace<T: TreeAdapter>(
    tree: &T,
    element: T::Node,
    prefix: &str,
) -> Result<Option<String>> {
    let declaration = format!("xmlns:{prefix}");
    for node in core::iter::once(element).chain(tree.ancestors(element)) {
        if !tree.is_element(node) {
            break;
        }
        let declared = tree.attributes(node).find(|a| {
            (a.namespace == Some(XMLNS_NAMESPACE) && a.local_name == prefix)
                || (a.namespace.is_none() && a.local_name == declaration)
        });
        if let Some(attr) = declared {
            return Ok((!attr.value.is_empty()).then(|| attr.value.to_string()));
        }
    }
    if tree.prefix(element) == Some(prefix) {
        return Ok(tree.namespace_uri(element).map(str::to_string));
    }
    Err(SelectorError::UndeclaredNamespace {
        prefix: prefix.to_string(),
    })
}

/// Order two nodes by document position.
pub fn document_order<T: TreeAdapter>(tree: &T, a: T::Node, b: T::Node) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let position = tree.compare_document_position(a, b);
    if position.contains(DocumentPosition::FOLLOWING) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Sort nodes into document order and drop duplicates.
pub fn sort_in_document_order<T: TreeAdapter>(tree: &T, nodes: &mut Vec<T::Node>) {
    nodes.sort_by(|&a, &b| document_order(tree, a, b));
    nodes.dedup();
}
