//! The four selector operations.
//!
//! [DOM § 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#parentnode)
//! and [DOM § 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
//!
//! A [`Finder`] runs one public call: it owns the [`Matcher`] (and with it the
//! per-call `:has()` cache and warning dedup set) and picks a traversal
//! strategy per complex selector.

use tracing::trace;

use crate::Options;
use crate::adapter::{NodeKind, TreeAdapter};
use crate::ast::{Combinator, ComplexId, Direction};
use crate::compiler::CompiledSelector;
use crate::dom_util::sort_in_document_order;
use crate::error::Result;
use crate::matcher::{MatchScope, Matcher};
use crate::walker::{TreeCursor, descendants, reconcile};

/// What a query collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every match below the reference node (`querySelectorAll`).
    All,
    /// The first match below the reference node (`querySelector`).
    First,
    /// The reference node itself (`matches`).
    SelfOnly,
    /// The reference node or its nearest matching ancestor (`closest`).
    Lineal,
}

/// One selector call against one tree.
pub struct Finder<'a, T: TreeAdapter> {
    tree: &'a T,
    selector: &'a CompiledSelector,
    reference: T::Node,
    matcher: Matcher<'a, T>,
}

impl<'a, T: TreeAdapter> Finder<'a, T> {
    /// A finder for `selector` with `:scope` bound to `reference`.
    pub fn new(
        tree: &'a T,
        selector: &'a CompiledSelector,
        reference: T::Node,
        options: &Options<'a>,
    ) -> Self {
        Self {
            tree,
            selector,
            reference,
            matcher: Matcher::new(
                tree,
                selector,
                MatchScope::at(tree, reference),
                options.strict,
                options.warn,
            ),
        }
    }

    /// Run the call for `target` from the reference node.
    ///
    /// [`Target::SelfOnly`] and [`Target::Lineal`] yield at most one node,
    /// [`Target::First`] at most one, [`Target::All`] every match in
    /// document order.
    ///
    /// # Errors
    ///
    /// Propagates matching errors: undeclared namespace prefixes, and
    /// unsupported constructs in strict mode.
    pub fn find(&mut self, target: Target) -> Result<Vec<T::Node>> {
        let reference = self.reference;
        match target {
            Target::SelfOnly => Ok(self
                .matches(reference)?
                .then_some(reference)
                .into_iter()
                .collect()),
            Target::Lineal => Ok(self.closest(reference)?.into_iter().collect()),
            Target::First | Target::All => self.query(reference, target == Target::First),
        }
    }

    /// [DOM § 4.9 `matches()`](https://dom.spec.whatwg.org/#dom-element-matches)
    ///
    /// Elements match normally. A shadow root stands for its host, so only
    /// the `:host` family can match it.
    fn matches(&mut self, node: T::Node) -> Result<bool> {
        match self.tree.kind(node) {
            NodeKind::Element | NodeKind::ShadowRoot => self.matcher.matches(node),
            _ => Ok(false),
        }
    }

    /// [DOM § 4.9 `closest()`](https://dom.spec.whatwg.org/#dom-element-closest)
    ///
    /// "the first (starting at element) inclusive ancestor of element that
    /// matches selectors"
    fn closest(&mut self, node: T::Node) -> Result<Option<T::Node>> {
        let tree = self.tree;
        if !tree.is_element(node) {
            return Ok(None);
        }
        for candidate in core::iter::once(node).chain(tree.ancestors(node)) {
            if tree.is_element(candidate) && self.matcher.matches(candidate)? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// [DOM § 4.2.6 scope-match a selectors string](https://dom.spec.whatwg.org/#scope-match-a-selectors-string)
    ///
    /// Ascending complexes are tested on each descendant of `reference` in a
    /// single preorder walk. Descending complexes start from the nodes their
    /// id-anchored leftmost compound matches anywhere in the tree and expand
    /// rightwards; their results are kept only when they lie below
    /// `reference`.
    fn query(&mut self, reference: T::Node, first: bool) -> Result<Vec<T::Node>> {
        let tree = self.tree;
        if !matches!(
            tree.kind(reference),
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::ShadowRoot | NodeKind::Element
        ) {
            return Ok(Vec::new());
        }

        let selector = self.selector;
        let arena = selector.arena();
        let (descend, ascend): (Vec<ComplexId>, Vec<ComplexId>) = arena
            .list(selector.root())
            .complexes
            .iter()
            .copied()
            .partition(|&id| {
                let complex = arena.complex(id);
                // A `:has()` under a logical wrapper is decided candidate-first.
                complex.direction == Direction::Descend
                    && !complex
                        .compounds
                        .iter()
                        .any(|&compound| arena.compound(compound).has_nested_has)
            });
        trace!(
            selector = selector.source(),
            ascend = ascend.len(),
            descend = descend.len(),
            "query strategy"
        );

        let stop_early = first && descend.is_empty();
        let mut found = self.walk_ascending(reference, &ascend, stop_early)?;
        if !descend.is_empty() {
            for &complex in &descend {
                let expanded = self.expand_descending(complex)?;
                let mut cursor = TreeCursor::new(reference);
                for node in expanded {
                    if node == reference {
                        continue;
                    }
                    if let Some(next) = reconcile(tree, cursor.clone(), node) {
                        cursor = next;
                        found.push(node);
                    }
                }
            }
            sort_in_document_order(tree, &mut found);
        }

        if first {
            found.truncate(1);
        }
        Ok(found)
    }

    /// Preorder walk below `reference`, keeping elements that match any of
    /// `complexes`. The result is in document order without duplicates.
    fn walk_ascending(
        &mut self,
        reference: T::Node,
        complexes: &[ComplexId],
        stop_early: bool,
    ) -> Result<Vec<T::Node>> {
        let tree = self.tree;
        let mut found = Vec::new();
        if complexes.is_empty() {
            return Ok(found);
        }
        let mut cursor = TreeCursor::new(reference).next_node(tree);
        while let Some(position) = cursor {
            let node = position.node();
            if tree.is_element(node) {
                for &complex in complexes {
                    if self.matcher.matches_complex(complex, node)? {
                        found.push(node);
                        if stop_early {
                            return Ok(found);
                        }
                        break;
                    }
                }
            }
            cursor = position.next_node(tree);
        }
        Ok(found)
    }

    /// Match the leftmost compound across the tree, then follow each
    /// combinator forward, keeping the nodes that match the next compound.
    fn expand_descending(&mut self, complex: ComplexId) -> Result<Vec<T::Node>> {
        let tree = self.tree;
        let compiled = self.selector;
        let selector = compiled.arena().complex(complex);
        let Some((&entry, rest)) = selector.compounds.split_first() else {
            return Ok(Vec::new());
        };

        let mut current = Vec::new();
        let root = tree.root_of(self.reference);
        for node in descendants(tree, root) {
            if tree.is_element(node) && self.matcher.matches_compound(entry, node)? {
                current.push(node);
            }
        }

        for (&combinator, &compound) in selector.combinators.iter().zip(rest) {
            let mut next = Vec::new();
            for &node in &current {
                for related in forward(tree, combinator, node) {
                    if self.matcher.matches_compound(compound, related)? {
                        next.push(related);
                    }
                }
            }
            sort_in_document_order(tree, &mut next);
            if next.is_empty() {
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }
}

/// Elements reachable from `node` through `combinator`, looking rightwards.
fn forward<T: TreeAdapter>(tree: &T, combinator: Combinator, node: T::Node) -> Vec<T::Node> {
    match combinator {
        Combinator::Descendant => descendants(tree, node).filter(|&n| tree.is_element(n)).collect(),
        Combinator::Child => tree.element_children(node).collect(),
        Combinator::NextSibling => tree
            .following_siblings(node)
            .find(|&n| tree.is_element(n))
            .into_iter()
            .collect(),
        Combinator::SubsequentSibling => tree
            .following_siblings(node)
            .filter(|&n| tree.is_element(n))
            .collect(),
        Combinator::Slot => tree.assigned_nodes(node),
    }
}
