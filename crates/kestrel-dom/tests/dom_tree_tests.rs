//! Tests for DOM tree construction, mutation, shadow roots and document position.

use kestrel_dom::{
    DocumentPosition, DomTree, HTML_NAMESPACE, NodeId, SVG_NAMESPACE, ShadowRootMode,
};

// ========== construction ==========

#[test]
fn test_create_element_lowercases_in_html_document() {
    let mut tree = DomTree::new();
    let div = tree.create_element("DIV");
    let data = tree.as_element(div).unwrap();
    assert_eq!(data.local_name, "div");
    assert_eq!(data.namespace.as_deref(), Some(HTML_NAMESPACE));
}

#[test]
fn test_create_element_in_xml_document_keeps_case() {
    let mut tree = DomTree::new_xml();
    let el = tree.create_element("Item");
    let data = tree.as_element(el).unwrap();
    assert_eq!(data.local_name, "Item");
    assert_eq!(data.namespace, None);
    assert!(!tree.is_html_document());
}

#[test]
fn test_create_element_ns_splits_prefix() {
    let mut tree = DomTree::new();
    let el = tree.create_element_ns(Some(SVG_NAMESPACE), "svg:rect");
    let data = tree.as_element(el).unwrap();
    assert_eq!(data.prefix.as_deref(), Some("svg"));
    assert_eq!(data.local_name, "rect");
    assert_eq!(data.qualified_name(), "svg:rect");
}

#[test]
fn test_attributes_keep_insertion_order() {
    let mut tree = DomTree::new();
    let el = tree.append_element(NodeId::ROOT, "div", &[("b", "2"), ("a", "1")]);
    tree.set_attribute(el, "B", "3");
    let names: Vec<_> = tree
        .as_element(el)
        .unwrap()
        .attrs
        .iter()
        .map(|a| (a.local_name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(names, vec![("b", "3"), ("a", "1")]);
}

#[test]
fn test_set_attribute_ns() {
    let mut tree = DomTree::new();
    let el = tree.append_element(NodeId::ROOT, "div", &[]);
    tree.set_attribute_ns(el, Some("urn:x"), "x:foo", "bar");
    let data = tree.as_element(el).unwrap();
    assert_eq!(data.get_attribute_ns(Some("urn:x"), "foo"), Some("bar"));
    assert_eq!(data.get_attribute("x:foo"), Some("bar"));
    assert_eq!(data.get_attribute_ns(None, "foo"), None);
}

#[test]
fn test_id_and_classes() {
    let mut tree = DomTree::new();
    let el = tree.append_element(NodeId::ROOT, "p", &[("id", "x"), ("class", " a  b\tc ")]);
    let data = tree.as_element(el).unwrap();
    assert_eq!(data.id(), Some("x"));
    let classes = data.classes();
    assert_eq!(classes.len(), 3);
    assert!(classes.contains("b"));
}

// ========== mutation ==========

#[test]
fn test_insert_before_relinks_siblings() {
    let mut tree = DomTree::new();
    let parent = tree.append_element(NodeId::ROOT, "div", &[]);
    let a = tree.append_element(parent, "a", &[]);
    let c = tree.append_element(parent, "c", &[]);
    let b = tree.create_element("b");
    tree.insert_before(parent, b, Some(c));

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.parent(b), Some(parent));
}

#[test]
fn test_append_moves_node_between_parents() {
    let mut tree = DomTree::new();
    let first = tree.append_element(NodeId::ROOT, "div", &[]);
    let second = tree.append_element(NodeId::ROOT, "div", &[]);
    let child = tree.append_element(first, "span", &[]);
    tree.append_child(second, child);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
    assert_eq!(tree.next_sibling(first), Some(second));
}

#[test]
fn test_remove_child_clears_links() {
    let mut tree = DomTree::new();
    let parent = tree.append_element(NodeId::ROOT, "div", &[]);
    let a = tree.append_element(parent, "a", &[]);
    let b = tree.append_element(parent, "b", &[]);
    tree.remove_child(parent, a);

    assert_eq!(tree.children(parent), &[b]);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.next_sibling(a), None);
    assert_eq!(tree.prev_sibling(b), None);
}

// ========== traversal ==========

#[test]
fn test_descendants_in_tree_order() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let head = tree.append_element(html, "head", &[]);
    let body = tree.append_element(html, "body", &[]);
    let p = tree.append_element(body, "p", &[]);
    let text = tree.append_text(p, "hi");

    let order: Vec<_> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, body, p, text]);
    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
}

#[test]
fn test_sibling_iterators() {
    let mut tree = DomTree::new();
    let parent = tree.append_element(NodeId::ROOT, "ul", &[]);
    let a = tree.append_element(parent, "li", &[]);
    let b = tree.append_element(parent, "li", &[]);
    let c = tree.append_element(parent, "li", &[]);

    assert_eq!(tree.following_siblings(a).collect::<Vec<_>>(), vec![b, c]);
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![parent, NodeId::ROOT]);
    assert_eq!(tree.root_of(c), NodeId::ROOT);
}

// ========== shadow roots and slots ==========

#[test]
fn test_attach_shadow_is_separate_tree() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "div", &[]);
    let root = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner = tree.append_element(root, "span", &[]);

    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.shadow_host(root), Some(host));
    assert_eq!(tree.shadow_root(host), Some(root));
    assert_eq!(tree.root_of(inner), root);
    assert_eq!(tree.attach_shadow(host, ShadowRootMode::Closed), Some(root));
    assert!(!tree.descendants(NodeId::ROOT).any(|id| id == inner));
}

#[test]
fn test_named_and_default_slot_assignment() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "div", &[]);
    let named = tree.append_element(host, "span", &[("slot", "title")]);
    let plain = tree.append_element(host, "span", &[]);
    let text = tree.append_text(host, "t");
    let root = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let default_slot = tree.append_element(root, "slot", &[]);
    let title_slot = tree.append_element(root, "slot", &[("name", "title")]);

    assert_eq!(tree.find_slot(named), Some(title_slot));
    assert_eq!(tree.find_slot(plain), Some(default_slot));
    assert_eq!(tree.assigned_nodes(default_slot), vec![plain, text]);
    assert_eq!(tree.assigned_nodes(title_slot), vec![named]);
}

// ========== document position ==========

#[test]
fn test_compare_document_position() {
    let mut tree = DomTree::new();
    let parent = tree.append_element(NodeId::ROOT, "div", &[]);
    let a = tree.append_element(parent, "a", &[]);
    let a_child = tree.append_element(a, "i", &[]);
    let b = tree.append_element(parent, "b", &[]);

    assert!(tree.compare_document_position(a, a).is_empty());
    assert_eq!(tree.compare_document_position(a, b), DocumentPosition::FOLLOWING);
    assert_eq!(tree.compare_document_position(b, a_child), DocumentPosition::PRECEDING);
    assert!(
        tree.compare_document_position(a_child, parent)
            .contains(DocumentPosition::CONTAINS)
    );
    assert!(
        tree.compare_document_position(parent, a_child)
            .contains(DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING)
    );
}

#[test]
fn test_disconnected_nodes_are_consistently_ordered() {
    let mut tree = DomTree::new();
    let attached = tree.append_element(NodeId::ROOT, "div", &[]);
    let detached = tree.create_element("div");

    let forward = tree.compare_document_position(attached, detached);
    let backward = tree.compare_document_position(detached, attached);
    assert!(forward.contains(DocumentPosition::DISCONNECTED));
    assert!(forward.contains(DocumentPosition::FOLLOWING));
    assert!(backward.contains(DocumentPosition::PRECEDING));
}
