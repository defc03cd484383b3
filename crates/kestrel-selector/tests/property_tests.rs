//! Property tests over generated trees: result ordering, agreement between
//! the four operations, and `An+B` arithmetic.

use kestrel_dom::{DocumentPosition, DomTree, NodeId};
use kestrel_selector::anb::{AnB, parse_anb};
use kestrel_selector::tokenizer::tokenize;
use kestrel_selector::walker::descendants;
use kestrel_selector::{Options, SelectorEngine};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

const SELECTORS: [&str; 14] = [
    "div",
    "p > span",
    "div .c",
    ".c + p",
    "div ~ span",
    ":nth-child(2n+1)",
    "span:has(> .c)",
    ":is(div, p) span",
    ":not(.c)",
    "#n3 div, #n1 > *",
    ":first-child:last-of-type",
    ":nth-last-child(-n+2 of .c)",
    "body > :where(p, span) ~ .c",
    ":empty",
];

/// A generated tree: each entry picks a parent among the elements created so
/// far, a tag, and whether to carry class `c`.
#[derive(Debug, Clone)]
struct Shape(Vec<(u8, u8)>);

impl Arbitrary for Shape {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 24;
        Self((0..len).map(|_| (u8::arbitrary(g), u8::arbitrary(g))).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self))
    }
}

fn build(shape: &Shape) -> DomTree {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let mut elements = vec![body];
    for (i, &(parent, bits)) in shape.0.iter().enumerate() {
        let parent = elements[usize::from(parent) % elements.len()];
        let tag = ["div", "p", "span"][usize::from(bits % 3)];
        let id = format!("n{i}");
        let mut attrs = vec![("id", id.as_str())];
        if bits & 4 != 0 {
            attrs.push(("class", "c"));
        }
        elements.push(tree.append_element(parent, tag, &attrs));
        if bits & 8 != 0 {
            let _ = tree.append_text(parent, "t");
        }
    }
    tree
}

fn elements(tree: &DomTree) -> Vec<NodeId> {
    descendants(tree, NodeId::ROOT)
        .filter(|&n| tree.as_element(n).is_some())
        .collect()
}

fn selector(pick: u8) -> &'static str {
    SELECTORS[usize::from(pick) % SELECTORS.len()]
}

#[quickcheck]
fn prop_results_in_document_order_without_duplicates(shape: Shape, pick: u8) -> bool {
    let tree = build(&shape);
    let found = SelectorEngine::new()
        .query_selector_all(&tree, selector(pick), NodeId::ROOT, &Options::default())
        .unwrap();
    found.windows(2).all(|w| {
        tree.compare_document_position(w[0], w[1])
            .contains(DocumentPosition::FOLLOWING)
    })
}

#[quickcheck]
fn prop_query_selector_all_agrees_with_matches(shape: Shape, pick: u8) -> bool {
    let tree = build(&shape);
    let engine = SelectorEngine::new();
    let options = Options::default();
    let selector = selector(pick);
    let found = engine
        .query_selector_all(&tree, selector, NodeId::ROOT, &options)
        .unwrap();
    let expected: Vec<NodeId> = elements(&tree)
        .into_iter()
        .filter(|&n| engine.matches(&tree, selector, n, &options).unwrap())
        .collect();
    found == expected
}

#[quickcheck]
fn prop_query_selector_is_first_of_all(shape: Shape, pick: u8) -> bool {
    let tree = build(&shape);
    let engine = SelectorEngine::new();
    let options = Options::default();
    let selector = selector(pick);
    let all = engine
        .query_selector_all(&tree, selector, NodeId::ROOT, &options)
        .unwrap();
    let first = engine
        .query_selector(&tree, selector, NodeId::ROOT, &options)
        .unwrap();
    first == all.first().copied()
}

#[quickcheck]
fn prop_closest_is_nearest_matching_ancestor(shape: Shape, pick: u8, start: u8) -> bool {
    let tree = build(&shape);
    let engine = SelectorEngine::new();
    let options = Options::default();
    let selector = selector(pick);
    let nodes = elements(&tree);
    let node = nodes[usize::from(start) % nodes.len()];
    let expected = core::iter::successors(Some(node), |&n| tree.parent(n))
        .filter(|&n| tree.as_element(n).is_some())
        .find(|&n| engine.matches(&tree, selector, n, &options).unwrap());
    engine.closest(&tree, selector, node, &options).unwrap() == expected
}

#[quickcheck]
fn prop_subtree_query_is_restricted_document_query(shape: Shape, pick: u8, start: u8) -> bool {
    let tree = build(&shape);
    let engine = SelectorEngine::new();
    let options = Options::default();
    let selector = selector(pick);
    let nodes = elements(&tree);
    let reference = nodes[usize::from(start) % nodes.len()];
    let inside: Vec<NodeId> = descendants(&tree, reference).collect();
    let expected: Vec<NodeId> = engine
        .query_selector_all(&tree, selector, NodeId::ROOT, &options)
        .unwrap()
        .into_iter()
        .filter(|n| inside.contains(n))
        .collect();
    engine
        .query_selector_all(&tree, selector, reference, &options)
        .unwrap()
        == expected
}

// ========== An+B ==========

#[quickcheck]
fn prop_anb_matches_some_nonnegative_n(a: i8, b: i8, position: u8) -> bool {
    let a = i64::from(a % 6);
    let b = i64::from(b % 10);
    let position = 1 + i64::from(position % 40);
    let brute = (0..=200).any(|n| a * n + b == position);
    AnB::new(a, b).matches(position) == brute
}

#[quickcheck]
fn prop_anb_parses_formatted_formula(a: i8, b: i8) -> bool {
    let a = i64::from(a % 6);
    let b = i64::from(b % 10);
    let stream = tokenize(&format!("{a}n{b:+}")).unwrap();
    parse_anb(&stream.tokens) == Some(AnB::new(a, b))
}

#[quickcheck]
fn prop_nth_child_selects_formula_positions(a: i8, b: i8, count: u8) -> bool {
    let a = i64::from(a % 4);
    let b = i64::from(b % 6);
    let count = usize::from(count % 12);
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let children: Vec<NodeId> = (0..count)
        .map(|_| tree.append_element(body, "i", &[]))
        .collect();
    let found = SelectorEngine::new()
        .query_selector_all(&tree, &format!("i:nth-child({a}n{b:+})"), body, &Options::default())
        .unwrap();
    let expected: Vec<NodeId> = children
        .iter()
        .zip(1_i64..)
        .filter(|&(_, position)| AnB::new(a, b).matches(position))
        .map(|(&child, _)| child)
        .collect();
    found == expected
}
