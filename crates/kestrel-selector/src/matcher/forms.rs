//! Location and input pseudo-classes that depend on HTML element semantics.
//!
//! [HTML § 4.16.3 Pseudo-classes](https://html.spec.whatwg.org/multipage/semantics-other.html#pseudo-classes)

use std::collections::HashMap;

use fancy_regex::Regex;
use url::Url;

use crate::adapter::{NodeKind, TreeAdapter};
use crate::dom_util::{control_value, is_content_editable};
use crate::walker::descendants;

/// "input" type keyword, lowercased; missing and unknown values are "text".
fn input_type<T: TreeAdapter>(tree: &T, node: T::Node) -> String {
    const KNOWN: [&str; 22] = [
        "hidden",
        "text",
        "search",
        "tel",
        "url",
        "email",
        "password",
        "date",
        "month",
        "week",
        "time",
        "datetime-local",
        "number",
        "range",
        "color",
        "checkbox",
        "radio",
        "file",
        "submit",
        "image",
        "reset",
        "button",
    ];
    tree.get_attribute(node, "type")
        .map(str::to_ascii_lowercase)
        .filter(|t| KNOWN.contains(&t.as_str()))
        .unwrap_or_else(|| "text".to_string())
}

fn is_input_of<T: TreeAdapter>(tree: &T, node: T::Node, types: &[&str]) -> bool {
    tree.html_local_name(node) == Some("input") && types.contains(&input_type(tree, node).as_str())
}

fn is_submit_button<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    match tree.html_local_name(node) {
        Some("button") => tree
            .get_attribute(node, "type")
            .is_none_or(|t| !t.eq_ignore_ascii_case("button") && !t.eq_ignore_ascii_case("reset")),
        Some("input") => matches!(input_type(tree, node).as_str(), "submit" | "image"),
        _ => false,
    }
}

/// [HTML § 4.10.17.3 form owner](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#form-owner)
fn form_owner<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<T::Node> {
    if let Some(id) = tree.get_attribute(node, "form") {
        return descendants(tree, tree.root_of(node)).find(|&n| {
            tree.html_local_name(n) == Some("form") && tree.get_attribute(n, "id") == Some(id)
        });
    }
    tree.ancestors(node)
        .find(|&a| tree.html_local_name(a) == Some("form"))
}

// ========== Links ==========

/// [HTML § 4.16.3 `:link`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-link)
///
/// "All a elements that have an href attribute, and all area elements that
/// have an href attribute."
pub(super) fn is_link<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    matches!(tree.html_local_name(node), Some("a" | "area")) && tree.has_attribute(node, "href")
}

fn document_url<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<Url> {
    let document = tree.owner_document(node)?;
    let url = tree.document_state(document).url?;
    Url::parse(&url).ok()
}

/// [§ 9.3 `:local-link`](https://www.w3.org/TR/selectors-4/#the-local-link-pseudo)
///
/// A link whose target has the document's origin and path.
pub(super) fn is_local_link<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    if !is_link(tree, node) {
        return false;
    }
    let (Some(base), Some(href)) = (document_url(tree, node), tree.get_attribute(node, "href")) else {
        return false;
    };
    base.join(href).is_ok_and(|target| {
        target.origin() == base.origin() && target.path() == base.path()
    })
}

/// [HTML § 7.4.6.4 the indicated part of the document](https://html.spec.whatwg.org/multipage/browsing-the-web.html#the-indicated-part-of-the-document)
///
/// "the first element in tree order ... that has an ID equal to fragment",
/// else "the first a element in tree order ... that has a name attribute
/// whose value is equal to fragment".
pub(super) fn target_element<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<T::Node> {
    let url = document_url(tree, node)?;
    let fragment = url.fragment().filter(|f| !f.is_empty())?;
    let document = tree.owner_document(node)?;
    descendants(tree, document)
        .find(|&n| tree.is_element(n) && tree.get_attribute(n, "id") == Some(fragment))
        .or_else(|| {
            descendants(tree, document).find(|&n| {
                tree.html_local_name(n) == Some("a") && tree.get_attribute(n, "name") == Some(fragment)
            })
        })
}

// ========== Enabled and disabled ==========

/// Elements that can be disabled.
fn can_be_disabled<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    matches!(
        tree.html_local_name(node),
        Some("button" | "input" | "select" | "textarea" | "optgroup" | "option" | "fieldset")
    )
}

/// [HTML § 4.10.15.1 disabled fieldset](https://html.spec.whatwg.org/multipage/form-elements.html#concept-fieldset-disabled)
///
/// "a descendant of another fieldset element whose disabled attribute is
/// specified, and is not a descendant of that fieldset element's first
/// legend element child, if any."
fn in_disabled_fieldset<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    let mut child = node;
    for ancestor in tree.ancestors(node) {
        if tree.html_local_name(ancestor) == Some("fieldset") && tree.has_attribute(ancestor, "disabled") {
            let legend = tree
                .element_children(ancestor)
                .find(|&c| tree.html_local_name(c) == Some("legend"));
            if legend != Some(child) {
                return true;
            }
        }
        child = ancestor;
    }
    false
}

/// [HTML § 4.16.3 `:disabled`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-disabled)
pub(super) fn is_disabled<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    let disabled = tree.has_attribute(node, "disabled");
    match tree.html_local_name(node) {
        Some("button" | "input" | "select" | "textarea" | "fieldset") => {
            disabled || in_disabled_fieldset(tree, node)
        }
        Some("optgroup") => disabled,
        Some("option") => {
            disabled
                || tree.parent(node).is_some_and(|parent| {
                    tree.html_local_name(parent) == Some("optgroup")
                        && tree.has_attribute(parent, "disabled")
                })
        }
        _ => false,
    }
}

/// [HTML § 4.16.3 `:enabled`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-enabled)
pub(super) fn is_enabled<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    can_be_disabled(tree, node) && !is_disabled(tree, node)
}

// ========== Mutability ==========

/// Input types the `readonly` attribute applies to.
const READONLY_TYPES: [&str; 12] = [
    "text",
    "search",
    "url",
    "tel",
    "email",
    "password",
    "date",
    "month",
    "week",
    "time",
    "datetime-local",
    "number",
];

/// [HTML § 4.16.3 `:read-write`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-read-write)
///
/// "input elements to which the readonly attribute applies, and that are
/// mutable ... textarea elements that do not have a readonly attribute, and
/// that are not disabled ... elements that are editing hosts or editable and
/// are neither input elements nor textarea elements"
pub(super) fn is_read_write<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    match tree.html_local_name(node) {
        Some("input") => {
            is_input_of(tree, node, &READONLY_TYPES)
                && !tree.has_attribute(node, "readonly")
                && !is_disabled(tree, node)
        }
        Some("textarea") => !tree.has_attribute(node, "readonly") && !is_disabled(tree, node),
        _ => is_content_editable(tree, node),
    }
}

/// [HTML § 4.16.3 `:placeholder-shown`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-placeholder-shown)
pub(super) fn is_placeholder_shown<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    let applies = tree.html_local_name(node) == Some("textarea")
        || is_input_of(
            tree,
            node,
            &["text", "search", "url", "tel", "email", "password", "number"],
        );
    applies && tree.has_attribute(node, "placeholder") && control_value(tree, node).is_empty()
}

// ========== Checkedness ==========

fn owning_select<T: TreeAdapter>(tree: &T, option: T::Node) -> Option<T::Node> {
    let parent = tree.parent(option)?;
    match tree.html_local_name(parent) {
        Some("select") => Some(parent),
        Some("optgroup") => tree
            .parent(parent)
            .filter(|&grand| tree.html_local_name(grand) == Some("select")),
        _ => None,
    }
}

/// [HTML § 4.10.7 list of options](https://html.spec.whatwg.org/multipage/form-elements.html#concept-select-option-list)
fn options_of<T: TreeAdapter>(tree: &T, select: T::Node) -> Vec<T::Node> {
    let mut options = Vec::new();
    for child in tree.element_children(select) {
        match tree.html_local_name(child) {
            Some("option") => options.push(child),
            Some("optgroup") => options.extend(
                tree.element_children(child)
                    .filter(|&c| tree.html_local_name(c) == Some("option")),
            ),
            _ => {}
        }
    }
    options
}

fn explicit_selectedness<T: TreeAdapter>(tree: &T, option: T::Node) -> bool {
    tree.node_state(option)
        .selected
        .unwrap_or_else(|| tree.has_attribute(option, "selected"))
}

/// [HTML § 4.10.7 selectedness setting algorithm](https://html.spec.whatwg.org/multipage/form-elements.html#selectedness-setting-algorithm)
///
/// "If nodes are inserted or removed ... and the select element's multiple
/// attribute is absent, and display size is 1, and no option elements in
/// the select element's list of options have their selectedness set to
/// true, set the selectedness of the first option element in the list of
/// options in tree order that is not disabled, if any, to true." When
/// several options claim selectedness, the last one wins.
fn is_selected<T: TreeAdapter>(tree: &T, option: T::Node) -> bool {
    let Some(select) = owning_select(tree, option) else {
        return explicit_selectedness(tree, option);
    };
    let single = !tree.has_attribute(select, "multiple")
        && tree
            .get_attribute(select, "size")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .is_none_or(|size| size <= 1);
    if !single {
        return explicit_selectedness(tree, option);
    }
    let options = options_of(tree, select);
    let chosen = options
        .iter()
        .rev()
        .copied()
        .find(|&o| explicit_selectedness(tree, o))
        .or_else(|| options.iter().copied().find(|&o| !is_disabled(tree, o)));
    chosen == Some(option)
}

/// [HTML § 4.16.3 `:checked`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-checked)
pub(super) fn is_checked<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    match tree.html_local_name(node) {
        Some("input") if is_input_of(tree, node, &["checkbox", "radio"]) => tree
            .node_state(node)
            .checked
            .unwrap_or_else(|| tree.has_attribute(node, "checked")),
        Some("option") => is_selected(tree, node),
        _ => false,
    }
}

/// [HTML § 4.10.5.1.17 radio button group](https://html.spec.whatwg.org/multipage/input.html#radio-button-group)
fn radio_group<T: TreeAdapter>(tree: &T, radio: T::Node) -> Vec<T::Node> {
    let name = tree.get_attribute(radio, "name").unwrap_or_default();
    if name.is_empty() {
        return vec![radio];
    }
    let owner = form_owner(tree, radio);
    descendants(tree, tree.root_of(radio))
        .filter(|&n| {
            is_input_of(tree, n, &["radio"])
                && tree.get_attribute(n, "name") == Some(name)
                && form_owner(tree, n) == owner
        })
        .collect()
}

/// [HTML § 4.16.3 `:default`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-default)
///
/// "Submit buttons that are default buttons of their form owner. Input
/// elements to which the checked attribute applies and that have a checked
/// attribute. Option elements that have a selected attribute."
pub(super) fn is_default<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    if is_submit_button(tree, node) {
        let Some(form) = form_owner(tree, node) else {
            return false;
        };
        return descendants(tree, tree.root_of(node))
            .find(|&n| is_submit_button(tree, n) && form_owner(tree, n) == Some(form))
            == Some(node);
    }
    match tree.html_local_name(node) {
        Some("input") => {
            is_input_of(tree, node, &["checkbox", "radio"]) && tree.has_attribute(node, "checked")
        }
        Some("option") => tree.has_attribute(node, "selected"),
        _ => false,
    }
}

/// [HTML § 4.16.3 `:indeterminate`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-indeterminate)
///
/// "input elements whose type attribute is in the Checkbox state and whose
/// indeterminate IDL attribute is set to true; input elements whose type
/// attribute is in the Radio Button state and whose radio button group
/// contains no input elements whose checkedness state is true; progress
/// elements with no value content attribute"
pub(super) fn is_indeterminate<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    match tree.html_local_name(node) {
        Some("input") => match input_type(tree, node).as_str() {
            "checkbox" => tree.node_state(node).indeterminate,
            "radio" => !radio_group(tree, node)
                .into_iter()
                .any(|radio| is_checked(tree, radio)),
            _ => false,
        },
        Some("progress") => !tree.has_attribute(node, "value"),
        _ => false,
    }
}

// ========== Requirement ==========

/// `Some(true)` for `:required`, `Some(false)` for `:optional`, `None` when
/// neither applies.
pub(super) fn is_required<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<bool> {
    match tree.html_local_name(node)? {
        "input" => (!matches!(
            input_type(tree, node).as_str(),
            "hidden" | "range" | "color" | "submit" | "image" | "reset" | "button"
        ))
        .then(|| tree.has_attribute(node, "required")),
        "select" | "textarea" => Some(tree.has_attribute(node, "required")),
        _ => None,
    }
}

// ========== Validity ==========

/// [HTML § 4.10.20.1 candidate for constraint validation](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#candidate-for-constraint-validation)
fn is_candidate<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    let barred = match tree.html_local_name(node) {
        Some("input") => {
            matches!(input_type(tree, node).as_str(), "hidden" | "reset" | "button")
                || (is_input_of(tree, node, &READONLY_TYPES) && tree.has_attribute(node, "readonly"))
        }
        Some("textarea") => tree.has_attribute(node, "readonly"),
        Some("select") => false,
        Some("button") => !is_submit_button(tree, node),
        _ => return false,
    };
    !barred
        && !is_disabled(tree, node)
        && !tree
            .ancestors(node)
            .any(|a| tree.html_local_name(a) == Some("datalist"))
}

/// `Some(true)` for `:valid`, `Some(false)` for `:invalid`, `None` for
/// elements that are neither.
///
/// [HTML § 4.16.3 `:valid`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-valid):
/// "form elements that are not the form owner of any elements that
/// themselves are candidates for constraint validation but do not satisfy
/// their constraints ... fieldset elements that have no descendant elements
/// that themselves are candidates for constraint validation but do not
/// satisfy their constraints"
pub(super) fn validity<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    patterns: &mut PatternCache,
) -> Option<bool> {
    match tree.html_local_name(node)? {
        "form" | "fieldset" => Some(
            !descendants(tree, node)
                .filter(|&n| tree.kind(n) == NodeKind::Element)
                .any(|n| is_candidate(tree, n) && !satisfies_constraints(tree, n, patterns)),
        ),
        _ if is_candidate(tree, node) => Some(satisfies_constraints(tree, node, patterns)),
        _ => None,
    }
}

/// Compiled `pattern` attributes for one call, keyed by attribute text.
///
/// A pattern that does not compile is stored as `None` and ignored.
#[derive(Debug, Default)]
pub(super) struct PatternCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl PatternCache {
    /// The anchored regex for `pattern`: "`^(?:` pattern `)$`".
    fn get(&mut self, pattern: &str) -> Option<&Regex> {
        if !self.compiled.contains_key(pattern) {
            let regex = Regex::new(&format!("^(?:{pattern})$")).ok();
            let _ = self.compiled.insert(pattern.to_string(), regex);
        }
        self.compiled.get(pattern)?.as_ref()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.compiled.len()
    }
}

/// [HTML § 4.10.20.2 satisfy its constraints](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#concept-fv-valid)
fn satisfies_constraints<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    patterns: &mut PatternCache,
) -> bool {
    match tree.html_local_name(node) {
        Some("input") => input_satisfies(tree, node, patterns),
        Some("textarea") => {
            let value = control_value(tree, node);
            !(tree.has_attribute(node, "required") && value.is_empty())
                && !length_mismatch(tree, node, &value)
        }
        Some("select") => {
            if !tree.has_attribute(node, "required") {
                return true;
            }
            // "the select element has no option elements in its list of
            // options that are selected, or ... the only selected option is
            // the placeholder label option"
            options_of(tree, node)
                .into_iter()
                .filter(|&o| is_selected(tree, o))
                .any(|o| !option_value(tree, o).is_empty())
        }
        _ => true,
    }
}

fn option_value<T: TreeAdapter>(tree: &T, option: T::Node) -> String {
    tree.get_attribute(option, "value").map_or_else(
        || {
            descendants(tree, option)
                .filter_map(|n| tree.text(n))
                .collect::<String>()
                .split_ascii_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        },
        str::to_string,
    )
}

fn input_satisfies<T: TreeAdapter>(
    tree: &T,
    node: T::Node,
    patterns: &mut PatternCache,
) -> bool {
    let kind = input_type(tree, node);
    let required = tree.has_attribute(node, "required");
    let value = control_value(tree, node);

    match kind.as_str() {
        "checkbox" => return !(required && !is_checked(tree, node)),
        "radio" => {
            let group = radio_group(tree, node);
            let group_required = group.iter().any(|&r| tree.has_attribute(r, "required"));
            return !(group_required && !group.iter().any(|&r| is_checked(tree, r)));
        }
        _ => {}
    }

    if required && value.is_empty() {
        return false;
    }
    if value.is_empty() {
        return true;
    }

    let values: Vec<&str> = if kind == "email" && tree.has_attribute(node, "multiple") {
        value.split(',').map(str::trim).collect()
    } else {
        vec![value.as_str()]
    };

    // "suffering from a type mismatch"
    let type_ok = match kind.as_str() {
        "email" => values.iter().all(|v| is_valid_email(v)),
        "url" => Url::parse(&value).is_ok(),
        _ => true,
    };
    // "suffering from a pattern mismatch"
    let pattern_ok = match tree.get_attribute(node, "pattern") {
        Some(pattern)
            if matches!(
                kind.as_str(),
                "text" | "search" | "url" | "tel" | "email" | "password"
            ) =>
        {
            patterns
                .get(pattern)
                .is_none_or(|regex| values.iter().all(|v| regex.is_match(v).unwrap_or(true)))
        }
        _ => true,
    };

    type_ok
        && pattern_ok
        && !length_mismatch(tree, node, &value)
        && range_state(tree, node) != Some(false)
}

/// "suffering from being too long" / "too short". Only a value the user has
/// edited can suffer from either.
fn length_mismatch<T: TreeAdapter>(tree: &T, node: T::Node, value: &str) -> bool {
    if tree.current_value(node).is_none() {
        return false;
    }
    let length = value.chars().count();
    let limit = |name| {
        tree.get_attribute(node, name)
            .and_then(|v| v.trim().parse::<usize>().ok())
    };
    limit("maxlength").is_some_and(|max| length > max)
        || limit("minlength").is_some_and(|min| length > 0 && length < min)
}

/// [HTML § 2.2.1 valid email address](https://html.spec.whatwg.org/multipage/input.html#valid-e-mail-address)
fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(c));
    let label_ok = |label: &str| {
        (1..=63).contains(&label.len())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    };
    local_ok && domain.split('.').all(label_ok)
}

// ========== Range ==========

/// A comparable key for an input value of a range-limited type.
fn parse_range_value(kind: &str, value: &str) -> Option<f64> {
    let int = |s: &str| -> Option<u32> {
        (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .then(|| s.parse().ok())
            .flatten()
    };
    let date = |s: &str| -> Option<f64> {
        let mut parts = s.split('-');
        let (y, m, d) = (int(parts.next()?)?, int(parts.next()?)?, int(parts.next()?)?);
        ((1..=12).contains(&m) && (1..=31).contains(&d) && parts.next().is_none())
            .then(|| f64::from(y) * 10_000.0 + f64::from(m) * 100.0 + f64::from(d))
    };
    let time = |s: &str| -> Option<f64> {
        let mut parts = s.split(':');
        let h = int(parts.next()?)?;
        let m = int(parts.next()?)?;
        let seconds = match parts.next() {
            Some(sec) => sec.parse::<f64>().ok().filter(|v| (0.0..60.0).contains(v))?,
            None => 0.0,
        };
        (h < 24 && m < 60).then(|| f64::from(h) * 3600.0 + f64::from(m) * 60.0 + seconds)
    };

    match kind {
        "number" | "range" => value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        "date" => date(value),
        "month" => {
            let (y, m) = value.split_once('-')?;
            let (y, m) = (int(y)?, int(m)?);
            (1..=12).contains(&m).then(|| f64::from(y) * 100.0 + f64::from(m))
        }
        "week" => {
            let (y, w) = value.split_once("-W")?;
            let (y, w) = (int(y)?, int(w)?);
            (1..=53).contains(&w).then(|| f64::from(y) * 100.0 + f64::from(w))
        }
        "time" => time(value),
        "datetime-local" => {
            let (d, t) = value.split_once(['T', ' '])?;
            Some(date(d)? * 100_000.0 + time(t)?)
        }
        _ => None,
    }
}

/// `Some(true)` for `:in-range`, `Some(false)` for `:out-of-range`, `None`
/// for elements without range limitations.
///
/// [HTML § 4.16.3 `:in-range`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-in-range):
/// "input elements that are candidates for constraint validation, that have
/// range limitations, and that are neither suffering from an underflow nor
/// suffering from an overflow"
pub(super) fn range_state<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<bool> {
    if tree.html_local_name(node) != Some("input") {
        return None;
    }
    let kind = input_type(tree, node);
    if !matches!(
        kind.as_str(),
        "number" | "range" | "date" | "month" | "week" | "time" | "datetime-local"
    ) {
        return None;
    }
    // A range input always has limits and its value is clamped into them.
    if kind == "range" {
        return is_candidate(tree, node).then_some(true);
    }

    let bound = |name| {
        tree.get_attribute(node, name)
            .and_then(|v| parse_range_value(&kind, v))
    };
    let (min, max) = (bound("min"), bound("max"));
    if (min.is_none() && max.is_none()) || !is_candidate(tree, node) {
        return None;
    }
    let Some(value) = parse_range_value(&kind, &control_value(tree, node)) else {
        return Some(true);
    };
    let underflow = min.is_some_and(|min| value < min);
    let overflow = max.is_some_and(|max| value > max);
    Some(!underflow && !overflow)
}

// ========== Display state ==========

/// [§ 11.1 `:open`](https://www.w3.org/TR/selectors-4/#open-state)
///
/// `Some(true)` for `:open`, `Some(false)` for `:closed` on elements with an
/// open state (`details`, `dialog`).
pub(super) fn open_state<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<bool> {
    matches!(tree.html_local_name(node), Some("details" | "dialog"))
        .then(|| tree.has_attribute(node, "open"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_compiled_once_per_text() {
        let mut patterns = PatternCache::default();
        assert!(patterns.get("[a-z]+").is_some_and(|r| r.is_match("abc").unwrap_or(false)));
        assert!(patterns.get("[a-z]+").is_some());
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_pattern_is_anchored() {
        let mut patterns = PatternCache::default();
        let regex = patterns.get("b").unwrap();
        assert!(regex.is_match("b").unwrap());
        assert!(!regex.is_match("abc").unwrap());
    }

    #[test]
    fn test_invalid_pattern_remembered() {
        let mut patterns = PatternCache::default();
        assert!(patterns.get("(").is_none());
        assert!(patterns.get("(").is_none());
        assert_eq!(patterns.len(), 1);
    }
}
