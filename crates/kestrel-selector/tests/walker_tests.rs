//! Tests for the incremental preorder walker.

use core::cell::Cell;

use kestrel_dom::{DocumentPosition, DomTree, NodeId, ShadowRootMode};
use kestrel_selector::walker::{TreeCursor, descendants, reconcile};
use kestrel_selector::{AttrRef, NodeKind, TreeAdapter};

/// Delegates to a [`DomTree`] and counts `parent` lookups.
struct CountingTree<'a> {
    inner: &'a DomTree,
    parent_calls: Cell<usize>,
}

impl<'a> CountingTree<'a> {
    fn new(inner: &'a DomTree) -> Self {
        Self {
            inner,
            parent_calls: Cell::new(0),
        }
    }
}

impl TreeAdapter for CountingTree<'_> {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        TreeAdapter::kind(self.inner, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_calls.set(self.parent_calls.get() + 1);
        TreeAdapter::parent(self.inner, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::first_child(self.inner, node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::last_child(self.inner, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::next_sibling(self.inner, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::previous_sibling(self.inner, node)
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        TreeAdapter::local_name(self.inner, node)
    }

    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        TreeAdapter::namespace_uri(self.inner, node)
    }

    fn attributes(&self, node: NodeId) -> impl Iterator<Item = AttrRef<'_>> {
        TreeAdapter::attributes(self.inner, node)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        TreeAdapter::text(self.inner, node)
    }

    fn owner_document(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::owner_document(self.inner, node)
    }

    fn compare_document_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        TreeAdapter::compare_document_position(self.inner, reference, other)
    }
}

/// ```text
/// html
/// ├── head
/// │   └── title
/// └── body
///     ├── div
///     │   ├── p
///     │   └── span
///     └── ul
///         └── li
/// ```
fn fixture() -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let head = tree.append_element(html, "head", &[]);
    let title = tree.append_element(head, "title", &[]);
    let body = tree.append_element(html, "body", &[]);
    let div = tree.append_element(body, "div", &[]);
    let p = tree.append_element(div, "p", &[]);
    let span = tree.append_element(div, "span", &[]);
    let ul = tree.append_element(body, "ul", &[]);
    let li = tree.append_element(ul, "li", &[]);
    (tree, vec![html, head, title, body, div, p, span, ul, li])
}

// ========== next_node ==========

#[test]
fn test_next_node_walks_preorder() {
    let (tree, nodes) = fixture();
    let mut cursor = TreeCursor::new(NodeId::ROOT);
    let mut seen = Vec::new();
    while let Some(next) = cursor.next_node(&tree) {
        seen.push(next.node());
        cursor = next;
    }
    assert_eq!(seen, nodes);
}

#[test]
fn test_next_node_tracks_depth() {
    let (tree, nodes) = fixture();
    let cursor = TreeCursor::new(NodeId::ROOT);
    let html = cursor.next_node(&tree).unwrap();
    assert_eq!(html.node(), nodes[0]);
    assert_eq!(html.depth(), 1);
    let head = html.next_node(&tree).unwrap();
    let title = head.next_node(&tree).unwrap();
    assert_eq!(title.depth(), 3);
    let body = title.next_node(&tree).unwrap();
    assert_eq!(body.node(), nodes[3]);
    assert_eq!(body.depth(), 2);
}

#[test]
fn test_next_node_stays_in_subtree() {
    let (tree, nodes) = fixture();
    let div = nodes[4];
    let walked: Vec<_> = descendants(&tree, div).collect();
    assert_eq!(walked, vec![nodes[5], nodes[6]]);
}

#[test]
fn test_leaf_root_has_no_descendants() {
    let (tree, nodes) = fixture();
    assert_eq!(descendants(&tree, nodes[8]).count(), 0);
    assert!(TreeCursor::new(nodes[8]).next_node(&tree).is_none());
}

#[test]
fn test_descendants_skip_shadow_trees() {
    let (mut tree, nodes) = fixture();
    let div = nodes[4];
    let shadow = tree.attach_shadow(div, ShadowRootMode::Closed).unwrap();
    let hidden = tree.append_element(shadow, "b", &[]);
    let walked: Vec<_> = descendants(&tree, NodeId::ROOT).collect();
    assert!(!walked.contains(&hidden));
    assert_eq!(walked.len(), nodes.len());
    assert_eq!(descendants(&tree, shadow).collect::<Vec<_>>(), vec![hidden]);
}

// ========== reconcile ==========

#[test]
fn test_reconcile_moves_across_subtrees() {
    let (tree, nodes) = fixture();
    let title = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[2]).unwrap();
    assert_eq!(title.node(), nodes[2]);
    assert_eq!(title.depth(), 3);

    let li = reconcile(&tree, title, nodes[8]).unwrap();
    assert_eq!(li.node(), nodes[8]);
    assert_eq!(li.depth(), 4);
    assert_eq!(li.root(), NodeId::ROOT);
}

#[test]
fn test_reconcile_then_continue_walk() {
    let (tree, nodes) = fixture();
    let p = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[5]).unwrap();
    let span = p.next_node(&tree).unwrap();
    assert_eq!(span.node(), nodes[6]);
    let ul = span.next_node(&tree).unwrap();
    assert_eq!(ul.node(), nodes[7]);
}

#[test]
fn test_reconcile_matches_fresh_walk() {
    let (tree, nodes) = fixture();
    let walked = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[6]).unwrap();
    let mut fresh = TreeCursor::new(NodeId::ROOT);
    while fresh.node() != nodes[6] {
        fresh = fresh.next_node(&tree).unwrap();
    }
    assert_eq!(walked, fresh);
}

#[test]
fn test_reconcile_outside_root_is_none() {
    let (tree, nodes) = fixture();
    let div = nodes[4];
    assert!(reconcile(&tree, TreeCursor::new(div), nodes[8]).is_none());
    assert!(reconcile(&tree, TreeCursor::new(div), nodes[3]).is_none());
}

#[test]
fn test_reconcile_climbs_only_to_common_ancestor() {
    let (tree, nodes) = fixture();
    let p = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[5]).unwrap();

    let counting = CountingTree::new(&tree);
    let span = reconcile(&counting, p, nodes[6]).unwrap();
    assert_eq!(counting.parent_calls.get(), 1);
    assert_eq!(span.node(), nodes[6]);
    assert_eq!(span.depth(), 4);

    // From span to li the walk meets the path at body.
    counting.parent_calls.set(0);
    let li = reconcile(&counting, span, nodes[8]).unwrap();
    assert_eq!(counting.parent_calls.get(), 2);
    assert_eq!(li.depth(), 4);
    assert_eq!(li.next_node(&tree), None);
}

#[test]
fn test_reconcile_to_ancestor_on_path() {
    let (tree, nodes) = fixture();
    let span = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[6]).unwrap();
    let body = reconcile(&tree, span, nodes[3]).unwrap();
    assert_eq!(body.depth(), 2);
    assert_eq!(body.next_node(&tree).map(|c| c.node()), Some(nodes[4]));
}

#[test]
fn test_reconcile_to_root() {
    let (tree, nodes) = fixture();
    let deep = reconcile(&tree, TreeCursor::new(NodeId::ROOT), nodes[8]).unwrap();
    let back = reconcile(&tree, deep, NodeId::ROOT).unwrap();
    assert_eq!(back, TreeCursor::new(NodeId::ROOT));
}
