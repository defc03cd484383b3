//! Selector matching.
//!
//! [§ 3 Selector syntax and structure](https://www.w3.org/TR/selectors-4/#structure)
//!
//! A [`Matcher`] evaluates a compiled selector against nodes of one tree for
//! the duration of one public call. Complex selectors are matched right to
//! left with backtracking through descendant and sibling combinators;
//! compounds are conjunctions evaluated in their precomputed match order.

mod attribute;
mod forms;
mod nth;
mod relational;

use std::collections::{HashMap, HashSet};

use kestrel_common::warning::{WarnSink, Warning};
use tracing::debug;

use crate::adapter::{DocumentState, NodeKind, TreeAdapter};
use crate::ast::{
    Combinator, ComplexId, CompoundId, CompoundSelector, ListId, PseudoClass, SelectorArena,
    SimpleSelector,
};
use crate::compiler::CompiledSelector;
use crate::dom_util::{directionality, extended_filter, language, shadow_including_ancestors};
use crate::error::{Result, SelectorError};

/// Binding of `:scope` and the shadow tree a match starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScope<N> {
    /// The node `:scope` represents.
    pub scope: Option<N>,
    /// The shadow root whose host is featureless `:host` for this match.
    pub shadow_root: Option<N>,
}

impl<N> Default for MatchScope<N> {
    fn default() -> Self {
        Self {
            scope: None,
            shadow_root: None,
        }
    }
}

impl<N: Copy> MatchScope<N> {
    /// Scope bound to `node`; the shadow context is the shadow root `node`
    /// lives in, if any.
    pub fn at<T: TreeAdapter<Node = N>>(tree: &T, node: N) -> Self {
        let root = tree.root_of(node);
        Self {
            scope: Some(node),
            shadow_root: (tree.kind(root) == NodeKind::ShadowRoot).then_some(root),
        }
    }
}

/// Evaluates one compiled selector against nodes of one tree.
pub struct Matcher<'a, T: TreeAdapter> {
    tree: &'a T,
    arena: &'a SelectorArena,
    root: ListId,
    scope: MatchScope<T::Node>,
    strict: bool,
    warn: Option<&'a dyn WarnSink>,
    /// Messages already delivered during this call.
    warned: HashSet<String>,
    /// `:has()` results per (anchor, argument list).
    has_cache: HashMap<(T::Node, ListId), bool>,
    /// `:has()` evaluations in progress.
    has_stack: Vec<(T::Node, ListId)>,
    /// Compiled `pattern` attributes.
    patterns: forms::PatternCache,
}

impl<'a, T: TreeAdapter> Matcher<'a, T> {
    /// A matcher for `selector` over `tree`.
    pub fn new(
        tree: &'a T,
        selector: &'a CompiledSelector,
        scope: MatchScope<T::Node>,
        strict: bool,
        warn: Option<&'a dyn WarnSink>,
    ) -> Self {
        Self {
            tree,
            arena: selector.arena(),
            root: selector.root(),
            scope,
            strict,
            warn,
            warned: HashSet::new(),
            has_cache: HashMap::new(),
            has_stack: Vec::new(),
            patterns: forms::PatternCache::default(),
        }
    }

    /// The selector arena.
    pub const fn arena(&self) -> &'a SelectorArena {
        self.arena
    }

    /// Does `node` match the whole selector?
    ///
    /// # Errors
    ///
    /// Fails on an undeclared namespace prefix, or in strict mode on an
    /// unsupported pseudo-class or pseudo-element.
    pub fn matches(&mut self, node: T::Node) -> Result<bool> {
        self.matches_list(self.root, node)
    }

    /// Does any member of `list` match `node`?
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn matches_list(&mut self, list: ListId, node: T::Node) -> Result<bool> {
        let arena = self.arena;
        for &complex in &arena.list(list).complexes {
            if self.matches_complex(complex, node)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Does `node` match `complex` as its subject?
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn matches_complex(&mut self, complex: ComplexId, node: T::Node) -> Result<bool> {
        let last = self.arena.complex(complex).compounds.len() - 1;
        self.match_from(complex, last, node, None)
    }

    /// Match compound `index` of `complex` against `node`, then the rest of
    /// the complex leftwards. With `anchor`, the leftmost compound must also
    /// stand in the given relation to the anchor node.
    fn match_from(
        &mut self,
        complex: ComplexId,
        index: usize,
        node: T::Node,
        anchor: Option<(Combinator, T::Node)>,
    ) -> Result<bool> {
        let arena = self.arena;
        let tree = self.tree;
        let selector = arena.complex(complex);
        if !self.matches_compound(selector.compounds[index], node)? {
            return Ok(false);
        }
        if index == 0 {
            return Ok(anchor.is_none_or(|(combinator, anchor)| {
                self.related(combinator, anchor, node)
            }));
        }

        let next = index - 1;
        match selector.combinators[next] {
            Combinator::Descendant => {
                for ancestor in tree.ancestors(node) {
                    if self.match_from(complex, next, ancestor, anchor)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Combinator::Child => match tree.parent(node) {
                Some(parent) => self.match_from(complex, next, parent, anchor),
                None => Ok(false),
            },
            Combinator::NextSibling => {
                match tree.preceding_siblings(node).find(|&s| tree.is_element(s)) {
                    Some(sibling) => self.match_from(complex, next, sibling, anchor),
                    None => Ok(false),
                }
            }
            Combinator::SubsequentSibling => {
                for sibling in tree.preceding_siblings(node) {
                    if tree.is_element(sibling) && self.match_from(complex, next, sibling, anchor)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Combinator::Slot => {
                // [CSS Scoping § 3.2.2 `::slotted()`](https://drafts.csswg.org/css-scoping/#slotted-pseudo)
                // The slot is matched from inside its own shadow tree.
                let Some(slot) = tree.assigned_slot(node) else {
                    return Ok(false);
                };
                let root = tree.root_of(slot);
                let saved = self.scope.shadow_root;
                self.scope.shadow_root = (tree.kind(root) == NodeKind::ShadowRoot).then_some(root);
                let result = self.match_from(complex, next, slot, anchor);
                self.scope.shadow_root = saved;
                result
            }
        }
    }

    /// Is `node` reachable from `anchor` through `combinator`?
    fn related(&self, combinator: Combinator, anchor: T::Node, node: T::Node) -> bool {
        let tree = self.tree;
        match combinator {
            Combinator::Descendant => tree.ancestors(node).any(|a| a == anchor),
            Combinator::Child => tree.parent(node) == Some(anchor),
            Combinator::NextSibling => {
                tree.preceding_siblings(node).find(|&s| tree.is_element(s)) == Some(anchor)
            }
            Combinator::SubsequentSibling => tree.preceding_siblings(node).any(|s| s == anchor),
            Combinator::Slot => tree.assigned_slot(node) == Some(anchor),
        }
    }

    /// Does `node` satisfy every simple selector of `compound`?
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn matches_compound(&mut self, compound: CompoundId, node: T::Node) -> Result<bool> {
        let arena = self.arena;
        let compound = arena.compound(compound);
        if let Some(name) = &compound.pseudo_element {
            return self.unsupported(
                format!("Unsupported pseudo-element ::{name}"),
                SelectorError::UnsupportedPseudoElement { name: name.clone() },
            );
        }
        if !self.tree.is_element(node) {
            return self.matches_featureless(compound, node);
        }
        for &i in &compound.match_order {
            if !self.matches_simple(&compound.simples[i], node)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// [CSS Scoping § 3.1.1 Host elements in a shadow tree](https://drafts.csswg.org/css-scoping/#host-element-in-tree)
    ///
    /// "the shadow host ... is featureless, and only the :host, :host(), and
    /// :host-context() pseudo-classes are allowed to match it."
    ///
    /// Inside its own shadow tree the shadow root stands for the host. A
    /// fragment or shadow root bound to `:scope` matches only `:scope`.
    fn matches_featureless(&mut self, compound: &CompoundSelector, node: T::Node) -> Result<bool> {
        let tree = self.tree;
        let kind = tree.kind(node);
        let host = kind == NodeKind::ShadowRoot && self.scope.shadow_root == Some(node);
        let scope = kind != NodeKind::Document && self.scope.scope == Some(node);
        if (!host && !scope) || compound.simples.is_empty() {
            return Ok(false);
        }

        for &i in &compound.match_order {
            let SimpleSelector::PseudoClass(pseudo) = &compound.simples[i] else {
                return Ok(false);
            };
            let matched = match pseudo {
                PseudoClass::Scope => scope,
                PseudoClass::Host(None) => host,
                PseudoClass::Host(Some(list)) => match tree.shadow_host(node) {
                    Some(element) if host => self.matches_list(*list, element)?,
                    _ => false,
                },
                PseudoClass::HostContext(list) => match tree.shadow_host(node) {
                    Some(element) if host => self.matches_host_context(*list, element)?,
                    _ => false,
                },
                PseudoClass::Is(list) | PseudoClass::Where(list) => {
                    self.matches_list(*list, node)?
                }
                _ => false,
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// [CSS Scoping § 3.2.1 `:host-context()`](https://drafts.csswg.org/css-scoping/#host-selector)
    ///
    /// "evaluates the compound selector against the shadow host and all of
    /// its shadow-including ancestors"
    fn matches_host_context(&mut self, list: ListId, host: T::Node) -> Result<bool> {
        let tree = self.tree;
        for ancestor in shadow_including_ancestors(tree, host) {
            if tree.is_element(ancestor) && self.matches_list(list, ancestor)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn matches_simple(&mut self, simple: &SimpleSelector, node: T::Node) -> Result<bool> {
        let tree = self.tree;
        match simple {
            SimpleSelector::Type {
                namespace,
                name,
                lower_name,
            } => attribute::matches_type(
                tree,
                node,
                namespace,
                name.as_deref(),
                lower_name.as_deref(),
            ),
            // [§ 8.3 ID selectors](https://www.w3.org/TR/selectors-4/#id-selectors)
            SimpleSelector::Id(id) => Ok(tree.get_attribute(node, "id") == Some(id.as_str())),
            // [§ 8.2 Class selectors](https://www.w3.org/TR/selectors-4/#class-html)
            SimpleSelector::Class(class) => Ok(tree
                .get_attribute(node, "class")
                .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))),
            SimpleSelector::Attribute(selector) => {
                attribute::matches_attribute(tree, node, selector)
            }
            SimpleSelector::PseudoClass(pseudo) => self.matches_pseudo_class(pseudo, node),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn matches_pseudo_class(&mut self, pseudo: &PseudoClass, node: T::Node) -> Result<bool> {
        let tree = self.tree;
        Ok(match pseudo {
            // [§ 4 Logical combinations](https://www.w3.org/TR/selectors-4/#logical-combination)
            PseudoClass::Is(list) | PseudoClass::Where(list) => self.matches_list(*list, node)?,
            PseudoClass::Not(list) => !self.matches_list(*list, node)?,
            PseudoClass::Has(list) => self.matches_has(node, *list)?,

            // [§ 14 Tree-structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
            PseudoClass::Nth { kind, anb, of } => self.matches_nth(node, *kind, *anb, *of)?,
            PseudoClass::OnlyChild => nth::is_only(tree, node, false),
            PseudoClass::OnlyOfType => nth::is_only(tree, node, true),
            PseudoClass::Root => is_root(tree, node),
            // "The :empty pseudo-class represents an element that has no
            // children except, optionally, document white space characters."
            // Whitespace text still counts as content, as in browsers.
            PseudoClass::Empty => tree.children(node).all(|child| match tree.kind(child) {
                NodeKind::Element => false,
                NodeKind::Text => tree.text(child).is_none_or(str::is_empty),
                _ => true,
            }),
            PseudoClass::Scope => self.matches_scope(node),

            // Only the featureless host can match these.
            PseudoClass::Host(_) | PseudoClass::HostContext(_) => false,
            // [HTML § 4.13.3 `:defined`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-defined)
            PseudoClass::Defined => tree.node_state(node).defined.unwrap_or_else(|| {
                tree.html_local_name(node).is_none_or(|name| !name.contains('-'))
            }),

            // [§ 7 Linguistic pseudo-classes](https://www.w3.org/TR/selectors-4/#linguistic-pseudos)
            PseudoClass::Dir(dir) => directionality(tree, node).as_str() == dir,
            PseudoClass::Lang(ranges) => language(tree, node)
                .is_some_and(|lang| ranges.iter().any(|range| extended_filter(range, &lang))),

            // [§ 9 Location pseudo-classes](https://www.w3.org/TR/selectors-4/#location)
            PseudoClass::AnyLink | PseudoClass::Link => forms::is_link(tree, node),
            PseudoClass::Visited => false,
            PseudoClass::LocalLink => forms::is_local_link(tree, node),
            PseudoClass::Target => forms::target_element(tree, node) == Some(node),
            PseudoClass::TargetWithin => forms::target_element(tree, node).is_some_and(|target| {
                shadow_including_ancestors(tree, target).any(|a| a == node)
            }),

            // [§ 10 User action pseudo-classes](https://www.w3.org/TR/selectors-4/#useraction-pseudos)
            PseudoClass::Hover => self.state_within(node, |s| s.hovered),
            PseudoClass::Active => self.state_within(node, |s| s.active),
            PseudoClass::Focus => self.is_focused(node),
            PseudoClass::FocusVisible => {
                let state = self.document_state(node);
                state.focus_visible && state.focused == Some(node)
            }
            PseudoClass::FocusWithin => self.state_within(node, |s| s.focused),

            // [§ 13 Input pseudo-classes](https://www.w3.org/TR/selectors-4/#input-pseudos)
            PseudoClass::Enabled => forms::is_enabled(tree, node),
            PseudoClass::Disabled => forms::is_disabled(tree, node),
            PseudoClass::ReadWrite => forms::is_read_write(tree, node),
            PseudoClass::ReadOnly => !forms::is_read_write(tree, node),
            PseudoClass::PlaceholderShown => forms::is_placeholder_shown(tree, node),
            PseudoClass::Default => forms::is_default(tree, node),
            PseudoClass::Checked => forms::is_checked(tree, node),
            PseudoClass::Indeterminate => forms::is_indeterminate(tree, node),
            PseudoClass::Valid => forms::validity(tree, node, &mut self.patterns) == Some(true),
            PseudoClass::Invalid => forms::validity(tree, node, &mut self.patterns) == Some(false),
            PseudoClass::InRange => forms::range_state(tree, node) == Some(true),
            PseudoClass::OutOfRange => forms::range_state(tree, node) == Some(false),
            PseudoClass::Required => forms::is_required(tree, node) == Some(true),
            PseudoClass::Optional => forms::is_required(tree, node) == Some(false),

            // [§ 11 Element display state pseudo-classes](https://www.w3.org/TR/selectors-4/#display-state-pseudos)
            PseudoClass::Open => forms::open_state(tree, node) == Some(true),
            PseudoClass::Closed => forms::open_state(tree, node) == Some(false),
            PseudoClass::Modal => {
                tree.html_local_name(node) == Some("dialog") && tree.node_state(node).modal
            }
            PseudoClass::PopoverOpen => {
                tree.has_attribute(node, "popover") && tree.node_state(node).popover_open
            }

            PseudoClass::Unsupported(name) => {
                return self.unsupported(
                    format!("Unsupported pseudo-class :{name}"),
                    SelectorError::UnsupportedPseudoClass { name: name.clone() },
                );
            }
        })
    }

    /// [§ 4.5 `:scope`](https://www.w3.org/TR/selectors-4/#the-scope-pseudo)
    ///
    /// "If there is no scoping root, then :scope represents the root of the
    /// document." A document scoping root is represented by its document
    /// element.
    fn matches_scope(&self, node: T::Node) -> bool {
        let tree = self.tree;
        match self.scope.scope {
            Some(scope) if scope == node => true,
            Some(scope) if tree.kind(scope) == NodeKind::Document => is_root(tree, node),
            Some(_) => false,
            None => is_root(tree, node),
        }
    }

    fn document_state(&self, node: T::Node) -> DocumentState<T::Node> {
        self.tree
            .owner_document(node)
            .map(|document| self.tree.document_state(document))
            .unwrap_or_default()
    }

    /// `node` is the element picked by `pick` or one of its shadow-including
    /// ancestors.
    fn state_within(
        &self,
        node: T::Node,
        pick: impl Fn(&DocumentState<T::Node>) -> Option<T::Node>,
    ) -> bool {
        pick(&self.document_state(node))
            .is_some_and(|target| shadow_including_ancestors(self.tree, target).any(|a| a == node))
    }

    /// [HTML § 4.16.3 `:focus`](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-focus)
    ///
    /// A shadow host matches when the focused element is inside its shadow
    /// tree.
    fn is_focused(&self, node: T::Node) -> bool {
        let tree = self.tree;
        let Some(focused) = self.document_state(node).focused else {
            return false;
        };
        if focused == node {
            return true;
        }
        let mut root = tree.root_of(focused);
        while tree.kind(root) == NodeKind::ShadowRoot {
            let Some(host) = tree.shadow_host(root) else {
                return false;
            };
            if host == node {
                return true;
            }
            root = tree.root_of(host);
        }
        false
    }

    /// Report a recognized construct the engine does not evaluate. Strict
    /// mode fails; otherwise the warning is delivered once per call and the
    /// predicate does not match.
    fn unsupported(&mut self, message: String, error: SelectorError) -> Result<bool> {
        if self.strict {
            return Err(error);
        }
        if self.warned.insert(message.clone()) {
            debug!(%message, "unsupported selector feature");
            if let Some(sink) = self.warn {
                sink.warn(&Warning::new("Selector", message));
            }
        }
        Ok(false)
    }
}

/// [§ 14.1 `:root`](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
fn is_root<T: TreeAdapter>(tree: &T, node: T::Node) -> bool {
    tree.parent(node)
        .is_some_and(|parent| tree.kind(parent) == NodeKind::Document)
}
