//! Type, namespace and attribute selectors.

use kestrel_dom::HTML_NAMESPACE;

use crate::adapter::{AttrRef, TreeAdapter};
use crate::ast::{AttrCase, AttrOperator, AttributeSelector, NamespaceConstraint};
use crate::dom_util::lookup_namespace;
use crate::error::Result;

/// [HTML § 4.16.2 Case-sensitivity of selectors](https://html.spec.whatwg.org/multipage/semantics-other.html#case-sensitivity-of-selectors)
///
/// "Attribute selectors on an HTML element in an HTML document must treat
/// the values of attributes with the following names as ASCII
/// case-insensitive"
const CASE_INSENSITIVE_ATTRIBUTES: [&str; 46] = [
    "accept",
    "accept-charset",
    "align",
    "alink",
    "axis",
    "bgcolor",
    "charset",
    "checked",
    "clear",
    "codetype",
    "color",
    "compact",
    "declare",
    "defer",
    "dir",
    "direction",
    "disabled",
    "enctype",
    "face",
    "frame",
    "hreflang",
    "http-equiv",
    "lang",
    "language",
    "link",
    "media",
    "method",
    "multiple",
    "nohref",
    "noresize",
    "noshade",
    "nowrap",
    "readonly",
    "rel",
    "rev",
    "rules",
    "scope",
    "scrolling",
    "selected",
    "shape",
    "target",
    "text",
    "type",
    "valign",
    "valuetype",
    "vlink",
];

/// An HTML element whose node document is an HTML document.
pub(crate) fn is_html_element_in_html_document<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    tree.namespace_uri(node) == Some(HTML_NAMESPACE)
        && tree
            .owner_document(node)
            .is_none_or(|document| tree.is_html_document(document))
}

/// Resolve a namespace constraint against `node`. `None` means any namespace.
fn required_namespace<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    constraint: &NamespaceConstraint,
    unprefixed: Option<Option<String>>,
) -> Result<Option<Option<String>>> {
    Ok(match constraint {
        NamespaceConstraint::Any => None,
        NamespaceConstraint::Default => unprefixed,
        NamespaceConstraint::None => Some(None),
        NamespaceConstraint::Prefix(prefix) => Some(lookup_namespace(tree, node, prefix)?),
    })
}

/// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
/// and [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#the-universal-selector)
///
/// # Errors
///
/// Fails when a namespace prefix cannot be resolved.
pub(crate) fn matches_type<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    namespace: &NamespaceConstraint,
    name: Option<&str>,
    lower_name: Option<&str>,
) -> Result<bool> {
    if let Some(required) = required_namespace(tree, node, namespace, None)? {
        if required.as_deref() != tree.namespace_uri(node) {
            return Ok(false);
        }
    }
    let (Some(name), Some(lower_name)) = (name, lower_name) else {
        return Ok(true);
    };
    let Some(local_name) = tree.local_name(node) else {
        return Ok(false);
    };
    Ok(if is_html_element_in_html_document(tree, node) {
        local_name.eq_ignore_ascii_case(lower_name)
    } else {
        local_name == name
    })
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// # Errors
///
/// Fails when a namespace prefix cannot be resolved.
pub(crate) fn matches_attribute<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    selector: &AttributeSelector,
) -> Result<bool> {
    let required = required_namespace(tree, node, &selector.namespace, Some(None))?;
    let html = is_html_element_in_html_document(tree, node);

    let name_matches = |attr: &AttrRef<'_>| {
        if html && attr.namespace.is_none() {
            attr.local_name.eq_ignore_ascii_case(&selector.lower_name)
        } else {
            attr.local_name == selector.name
        }
    };
    let namespace_matches = |attr: &AttrRef<'_>| {
        required
            .as_ref()
            .is_none_or(|ns| ns.as_deref() == attr.namespace)
    };

    let insensitive = match selector.case {
        AttrCase::Insensitive => true,
        AttrCase::Sensitive => false,
        AttrCase::Default => {
            html && CASE_INSENSITIVE_ATTRIBUTES.contains(&selector.lower_name.as_str())
        }
    };

    Ok(tree
        .attributes(node)
        .filter(|attr| namespace_matches(attr) && name_matches(attr))
        .any(|attr| value_matches(selector.operator, attr.value, &selector.value, insensitive)))
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation) and
/// [§ 6.2](https://www.w3.org/TR/selectors-4/#attribute-substrings) operators.
fn value_matches(operator: AttrOperator, actual: &str, expected: &str, insensitive: bool) -> bool {
    let (actual, expected) = if insensitive {
        (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
    } else {
        (actual.to_string(), expected.to_string())
    };
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        // "If 'val' contains whitespace, it will never represent anything
        // (since the words are separated by spaces). Also if 'val' is the
        // empty string, it will never represent anything."
        AttrOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(|c: char| c.is_ascii_whitespace())
                && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        // "If 'val' is the empty string then the selector does not represent
        // anything."
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}
