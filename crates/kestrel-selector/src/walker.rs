//! Incremental tree walker.
//!
//! [DOM § 6.1 Interface TreeWalker](https://dom.spec.whatwg.org/#interface-treewalker)
//!
//! A [`TreeCursor`] is a position in a preorder walk of one tree: the current
//! node plus the path from the walk root down to it. It is passed and
//! returned by value, so a walk holds no hidden state. [`reconcile`] moves a
//! cursor to an arbitrary node by climbing to the common ancestor and going
//! back down, instead of restarting from the root.

use crate::adapter::TreeAdapter;

/// A position in a preorder walk rooted at [`TreeCursor::root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeCursor<N> {
    root: N,
    node: N,
    /// Ancestors of `node` below and including `root`, root first.
    path: Vec<N>,
}

impl<N: Copy + Eq> TreeCursor<N> {
    /// A cursor positioned on `root`.
    #[must_use]
    pub const fn new(root: N) -> Self {
        Self {
            root,
            node: root,
            path: Vec::new(),
        }
    }

    /// The walk root.
    #[must_use]
    pub const fn root(&self) -> N {
        self.root
    }

    /// The current node.
    #[must_use]
    pub const fn node(&self) -> N {
        self.node
    }

    /// Depth of the current node below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// [§ 6.1 `nextNode()`](https://dom.spec.whatwg.org/#dom-treewalker-nextnode)
    ///
    /// Advance in preorder. Returns `None` once the walk leaves the root's
    /// subtree. Shadow trees are not entered.
    #[must_use]
    pub fn next_node<T: TreeAdapter<Node = N>>(mut self, tree: &T) -> Option<Self> {
        if let Some(child) = tree.first_child(self.node) {
            self.path.push(self.node);
            self.node = child;
            return Some(self);
        }
        loop {
            if self.node == self.root {
                return None;
            }
            if let Some(sibling) = tree.next_sibling(self.node) {
                self.node = sibling;
                return Some(self);
            }
            self.node = self.path.pop()?;
        }
    }
}

/// Move `cursor` to `target`, reusing the shared part of its path.
///
/// Returns `None` when `target` is not an inclusive descendant of the
/// cursor's root.
#[must_use]
pub fn reconcile<T: TreeAdapter>(
    tree: &T,
    cursor: TreeCursor<T::Node>,
    target: T::Node,
) -> Option<TreeCursor<T::Node>> {
    let TreeCursor {
        root,
        node,
        mut path,
    } = cursor;
    if target == node {
        return Some(TreeCursor { root, node, path });
    }
    if target == root {
        return Some(TreeCursor::new(root));
    }

    // Climb from the target until the walk meets the cursor's current path.
    // Ancestors passed on the way are pushed nearest first.
    let mut below = Vec::new();
    let mut current = tree.parent(target)?;
    loop {
        if current == node {
            path.push(node);
            break;
        }
        if let Some(i) = path.iter().rposition(|&p| p == current) {
            path.truncate(i + 1);
            break;
        }
        below.push(current);
        current = tree.parent(current)?;
    }
    path.extend(below.into_iter().rev());
    Some(TreeCursor {
        root,
        node: target,
        path,
    })
}

/// Preorder descendants of `root`, excluding `root` itself.
pub fn descendants<T: TreeAdapter>(tree: &T, root: T::Node) -> Descendants<'_, T> {
    Descendants {
        tree,
        cursor: Some(TreeCursor::new(root)),
    }
}

/// Iterator over the nodes of a [`TreeCursor`] walk.
pub struct Descendants<'a, T: TreeAdapter> {
    tree: &'a T,
    cursor: Option<TreeCursor<T::Node>>,
}

impl<T: TreeAdapter> Iterator for Descendants<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<T::Node> {
        let cursor = self.cursor.take()?.next_node(self.tree)?;
        let node = cursor.node();
        self.cursor = Some(cursor);
        Some(node)
    }
}
