//! [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
//! and [§ 14.5 Typed child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#typed-child-index)

use super::Matcher;
use crate::adapter::TreeAdapter;
use crate::anb::AnB;
use crate::ast::{ListId, NthKind};
use crate::error::Result;

/// Same local name and namespace.
fn same_type<T: TreeAdapter>(tree: &T, a: T::Node, b: T::Node) -> bool {
    tree.local_name(a) == tree.local_name(b) && tree.namespace_uri(a) == tree.namespace_uri(b)
}

/// `:only-child` / `:only-of-type`: no element sibling (of the same type).
pub(super) fn is_only<T: TreeAdapter>(tree: &T, node: T::Node, of_type: bool) -> bool {
    let counted =
        |sibling: T::Node| tree.is_element(sibling) && (!of_type || same_type(tree, sibling, node));
    !tree.preceding_siblings(node).any(counted) && !tree.following_siblings(node).any(counted)
}

impl<T: TreeAdapter> Matcher<'_, T> {
    /// "The :nth-child(An+B [of S]?) pseudo-class notation represents elements
    /// that are among An+Bth elements from the list composed of their
    /// inclusive siblings that match the selector list S."
    ///
    /// Positions are 1-based and counted among element siblings only; with
    /// `of S`, only siblings matching S are counted and the node itself must
    /// match S.
    pub(super) fn matches_nth(
        &mut self,
        node: T::Node,
        kind: NthKind,
        anb: AnB,
        of: Option<ListId>,
    ) -> Result<bool> {
        if let Some(list) = of {
            if !self.matches_list(list, node)? {
                return Ok(false);
            }
        }

        let tree = self.tree;
        let siblings: Vec<T::Node> = if kind.from_end() {
            tree.following_siblings(node).collect()
        } else {
            tree.preceding_siblings(node).collect()
        };

        let mut position: i64 = 1;
        for sibling in siblings {
            if !tree.is_element(sibling) {
                continue;
            }
            let counted = if kind.of_type() {
                same_type(tree, sibling, node)
            } else if let Some(list) = of {
                self.matches_list(list, sibling)?
            } else {
                true
            };
            if counted {
                position += 1;
            }
        }
        Ok(anb.matches(position))
    }
}
