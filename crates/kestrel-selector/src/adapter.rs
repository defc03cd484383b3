//! The tree interface the engine reads.
//!
//! The engine never owns or mutates nodes. A host tree implements
//! [`TreeAdapter`] to expose structure, names, attributes, shadow linkage
//! and document state; everything beyond structure has a default so a
//! minimal host only describes its tree shape and element names.

use core::fmt::Debug;
use core::hash::Hash;

use kestrel_dom::{
    DocumentPosition, DomTree, ElementData, NodeId, NodeType, XML_NAMESPACE,
};

/// [DOM § 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype) node kinds
/// the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `DOCUMENT_NODE`
    Document,
    /// `DOCUMENT_FRAGMENT_NODE` that is not a shadow root.
    DocumentFragment,
    /// A shadow root.
    ShadowRoot,
    /// `ELEMENT_NODE`
    Element,
    /// `TEXT_NODE` and `CDATA_SECTION_NODE`
    Text,
    /// `COMMENT_NODE`
    Comment,
    /// Anything else (doctype, processing instruction).
    Other,
}

/// A borrowed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRef<'a> {
    /// Local name.
    pub local_name: &'a str,
    /// Namespace prefix.
    pub prefix: Option<&'a str>,
    /// Namespace URI.
    pub namespace: Option<&'a str>,
    /// Value.
    pub value: &'a str,
}

/// Document-wide state read by user-action and location pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState<N> {
    /// Focused element.
    pub focused: Option<N>,
    /// Element under the pointer.
    pub hovered: Option<N>,
    /// Element being activated.
    pub active: Option<N>,
    /// Focus indicator is shown.
    pub focus_visible: bool,
    /// `document.designMode == "on"`.
    pub design_mode: bool,
    /// Document URL.
    pub url: Option<String>,
}

impl<N> Default for DocumentState<N> {
    fn default() -> Self {
        Self {
            focused: None,
            hovered: None,
            active: None,
            focus_visible: false,
            design_mode: false,
            url: None,
        }
    }
}

/// Element state that is not carried by content attributes.
///
/// `None` means "derive from the content attribute".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeState {
    /// Checkedness of a checkbox or radio button.
    pub checked: Option<bool>,
    /// Selectedness of an option.
    pub selected: Option<bool>,
    /// `indeterminate` IDL attribute.
    pub indeterminate: bool,
    /// Custom element "defined" state.
    pub defined: Option<bool>,
    /// Dialog shown modally.
    pub modal: bool,
    /// Popover showing.
    pub popover_open: bool,
}

/// Read-only access to a host tree.
pub trait TreeAdapter {
    /// Node handle. Cheap to copy and compare.
    type Node: Copy + Eq + Hash + Debug;

    /// What kind of node this is.
    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Parent node. A shadow root has no parent; see [`Self::shadow_host`].
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// First child.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Last child.
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Next sibling.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Previous sibling.
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Element local name.
    fn local_name(&self, node: Self::Node) -> Option<&str>;

    /// Element namespace URI.
    fn namespace_uri(&self, node: Self::Node) -> Option<&str>;

    /// Element namespace prefix.
    fn prefix(&self, _node: Self::Node) -> Option<&str> {
        None
    }

    /// Attributes in order.
    fn attributes(&self, node: Self::Node) -> impl Iterator<Item = AttrRef<'_>>;

    /// Character data of a text node.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// The document this node belongs to.
    fn owner_document(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `document` is an HTML document (not XML).
    fn is_html_document(&self, _document: Self::Node) -> bool {
        true
    }

    /// Focus, hover and URL state of `document`.
    fn document_state(&self, _document: Self::Node) -> DocumentState<Self::Node> {
        DocumentState::default()
    }

    /// Host of a shadow root.
    fn shadow_host(&self, _root: Self::Node) -> Option<Self::Node> {
        None
    }

    /// Shadow root attached to an element.
    fn shadow_root(&self, _element: Self::Node) -> Option<Self::Node> {
        None
    }

    /// Slot a light-tree node is assigned to.
    fn assigned_slot(&self, _node: Self::Node) -> Option<Self::Node> {
        None
    }

    /// Nodes assigned to a slot, in order.
    fn assigned_nodes(&self, _slot: Self::Node) -> Vec<Self::Node> {
        Vec::new()
    }

    /// Position of `other` relative to `reference`.
    fn compare_document_position(
        &self,
        reference: Self::Node,
        other: Self::Node,
    ) -> DocumentPosition;

    /// Runtime element state.
    fn node_state(&self, _element: Self::Node) -> NodeState {
        NodeState::default()
    }

    /// Runtime value of a form control; `None` falls back to the default value.
    fn current_value(&self, _element: Self::Node) -> Option<String> {
        None
    }

    // Provided helpers.

    /// Returns true if `node` is an element.
    fn is_element(&self, node: Self::Node) -> bool {
        self.kind(node) == NodeKind::Element
    }

    /// Value of the null-namespace attribute `local_name`.
    fn get_attribute(&self, node: Self::Node, local_name: &str) -> Option<&str> {
        self.attributes(node)
            .find(|a| a.namespace.is_none() && a.local_name == local_name)
            .map(|a| a.value)
    }

    /// Value of the attribute `local_name` in `namespace`.
    fn get_attribute_ns(
        &self,
        node: Self::Node,
        namespace: &str,
        local_name: &str,
    ) -> Option<&str> {
        self.attributes(node)
            .find(|a| a.namespace == Some(namespace) && a.local_name == local_name)
            .map(|a| a.value)
    }

    /// Returns true if the null-namespace attribute exists.
    fn has_attribute(&self, node: Self::Node, local_name: &str) -> bool {
        self.get_attribute(node, local_name).is_some()
    }

    /// Children in order.
    fn children(&self, node: Self::Node) -> Siblings<'_, Self>
    where
        Self: Sized,
    {
        Siblings {
            tree: self,
            next: self.first_child(node),
            forward: true,
        }
    }

    /// Preceding siblings, nearest first.
    fn preceding_siblings(&self, node: Self::Node) -> Siblings<'_, Self>
    where
        Self: Sized,
    {
        Siblings {
            tree: self,
            next: self.previous_sibling(node),
            forward: false,
        }
    }

    /// Following siblings, nearest first.
    fn following_siblings(&self, node: Self::Node) -> Siblings<'_, Self>
    where
        Self: Sized,
    {
        Siblings {
            tree: self,
            next: self.next_sibling(node),
            forward: true,
        }
    }

    /// Ancestors, parent first. Stops at a tree root.
    fn ancestors(&self, node: Self::Node) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            tree: self,
            next: self.parent(node),
        }
    }

    /// Element children in order.
    fn element_children(&self, node: Self::Node) -> impl Iterator<Item = Self::Node>
    where
        Self: Sized,
    {
        self.children(node).filter(|&n| self.is_element(n))
    }

    /// The root of `node`'s tree: a document, fragment, shadow root, or
    /// detached subtree root.
    fn root_of(&self, node: Self::Node) -> Self::Node
    where
        Self: Sized,
    {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Local name when `node` is an element in the HTML namespace.
    fn html_local_name(&self, node: Self::Node) -> Option<&str> {
        (self.namespace_uri(node) == Some(kestrel_dom::HTML_NAMESPACE))
            .then(|| self.local_name(node))
            .flatten()
    }
}

/// Iterator over siblings in one direction.
pub struct Siblings<'a, T: TreeAdapter> {
    tree: &'a T,
    next: Option<T::Node>,
    forward: bool,
}

impl<T: TreeAdapter> Iterator for Siblings<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<T::Node> {
        let node = self.next?;
        self.next = if self.forward {
            self.tree.next_sibling(node)
        } else {
            self.tree.previous_sibling(node)
        };
        Some(node)
    }
}

/// Iterator over ancestors, parent first.
pub struct Ancestors<'a, T: TreeAdapter> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<T: TreeAdapter> Iterator for Ancestors<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<T::Node> {
        let node = self.next?;
        self.next = self.tree.parent(node);
        Some(node)
    }
}

impl TreeAdapter for DomTree {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.get(node).map(|n| &n.node_type) {
            Some(NodeType::Document(_)) => NodeKind::Document,
            Some(NodeType::DocumentFragment) => NodeKind::DocumentFragment,
            Some(NodeType::ShadowRoot(_)) => NodeKind::ShadowRoot,
            Some(NodeType::Element(_)) => NodeKind::Element,
            Some(NodeType::Text(_)) => NodeKind::Text,
            Some(NodeType::Comment(_)) => NodeKind::Comment,
            None => NodeKind::Other,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Self::first_child(self, node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        Self::last_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::next_sibling(self, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.prev_sibling(node)
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|e| e.local_name.as_str())
    }

    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        self.as_element(node)?.namespace.as_deref()
    }

    fn prefix(&self, node: NodeId) -> Option<&str> {
        self.as_element(node)?.prefix.as_deref()
    }

    fn attributes(&self, node: NodeId) -> impl Iterator<Item = AttrRef<'_>> {
        self.as_element(node)
            .into_iter()
            .flat_map(|e: &ElementData| e.attrs.iter())
            .map(|a| AttrRef {
                local_name: &a.local_name,
                prefix: a.prefix.as_deref(),
                namespace: a.namespace.as_deref(),
                value: &a.value,
            })
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.as_text(node)
    }

    fn owner_document(&self, _node: NodeId) -> Option<NodeId> {
        Some(NodeId::ROOT)
    }

    fn is_html_document(&self, _document: NodeId) -> bool {
        Self::is_html_document(self)
    }

    fn document_state(&self, _document: NodeId) -> DocumentState<NodeId> {
        let data = self.document_data();
        DocumentState {
            focused: data.focused,
            hovered: data.hovered,
            active: data.active,
            focus_visible: data.focus_visible,
            design_mode: data.design_mode,
            url: data.url.clone(),
        }
    }

    fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        Self::shadow_host(self, root)
    }

    fn shadow_root(&self, element: NodeId) -> Option<NodeId> {
        Self::shadow_root(self, element)
    }

    fn assigned_slot(&self, node: NodeId) -> Option<NodeId> {
        self.find_slot(node)
    }

    fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        Self::assigned_nodes(self, slot)
    }

    fn compare_document_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        Self::compare_document_position(self, reference, other)
    }

    fn node_state(&self, element: NodeId) -> NodeState {
        self.as_element(element)
            .map(|e| NodeState {
                checked: e.state.checked,
                selected: e.state.selected,
                indeterminate: e.state.indeterminate,
                defined: e.state.defined,
                modal: e.state.modal,
                popover_open: e.state.popover_open,
            })
            .unwrap_or_default()
    }

    fn current_value(&self, element: NodeId) -> Option<String> {
        self.as_element(element)?.state.value.clone()
    }

    fn get_attribute_ns(&self, node: NodeId, namespace: &str, local_name: &str) -> Option<&str> {
        self.as_element(node)?
            .get_attribute_ns(Some(namespace), local_name)
    }
}

/// `xml:lang` lookup shared by the language helpers.
pub(crate) fn xml_lang<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<&str> {
    tree.get_attribute_ns(node, XML_NAMESPACE, "lang")
}
