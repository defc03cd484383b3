//! [§ 4.5 The relational pseudo-class `:has()`](https://www.w3.org/TR/selectors-4/#relational)
//!
//! "The relational pseudo-class, :has(), is a functional pseudo-class taking
//! a `<relative-selector-list>` as an argument. It represents an element if
//! any of the relative selectors would match at least one element when
//! anchored against this element."

use super::Matcher;
use crate::adapter::TreeAdapter;
use crate::ast::{Combinator, ComplexId, ListId};
use crate::error::Result;
use crate::walker::descendants;

impl<T: TreeAdapter> Matcher<'_, T> {
    /// Evaluate `:has(list)` anchored at `anchor`.
    ///
    /// Results are cached per (anchor, list) for the rest of the call. An
    /// evaluation already in progress for the same pair does not match.
    pub(super) fn matches_has(&mut self, anchor: T::Node, list: ListId) -> Result<bool> {
        let key = (anchor, list);
        if let Some(&cached) = self.has_cache.get(&key) {
            return Ok(cached);
        }
        if self.has_stack.contains(&key) {
            return Ok(false);
        }

        self.has_stack.push(key);
        let result = self.has_any(anchor, list);
        let _ = self.has_stack.pop();

        let matched = result?;
        let _ = self.has_cache.insert(key, matched);
        Ok(matched)
    }

    fn has_any(&mut self, anchor: T::Node, list: ListId) -> Result<bool> {
        let arena = self.arena;
        for &complex in &arena.list(list).complexes {
            if self.matches_relative(anchor, complex)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Try every node the relative selector can reach from `anchor` as its
    /// subject.
    ///
    /// A leading descendant or child combinator searches the anchor's
    /// subtree; a leading sibling combinator searches the following siblings
    /// and, when a later combinator descends, their subtrees.
    fn matches_relative(&mut self, anchor: T::Node, complex: ComplexId) -> Result<bool> {
        let tree = self.tree;
        let arena = self.arena;
        let selector = arena.complex(complex);
        let leading = selector.leading.unwrap_or(Combinator::Descendant);
        let last = selector.compounds.len() - 1;

        let candidates: Vec<T::Node> = match leading {
            Combinator::Descendant | Combinator::Child | Combinator::Slot => {
                descendants(tree, anchor).filter(|&n| tree.is_element(n)).collect()
            }
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                let descends = selector
                    .combinators
                    .iter()
                    .any(|c| matches!(c, Combinator::Descendant | Combinator::Child));
                let mut nodes = Vec::new();
                for sibling in tree.following_siblings(anchor) {
                    if !tree.is_element(sibling) {
                        continue;
                    }
                    nodes.push(sibling);
                    if descends {
                        nodes.extend(descendants(tree, sibling).filter(|&n| tree.is_element(n)));
                    }
                }
                nodes
            }
        };

        for candidate in candidates {
            if self.match_from(complex, last, candidate, Some((leading, anchor)))? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
