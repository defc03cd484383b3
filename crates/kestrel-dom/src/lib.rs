//! DOM tree implementation for the Kestrel selector engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), with the pieces a
//! selector engine needs to read: namespaces, ordered attributes, document
//! fragments, shadow roots, slot assignment and document position.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Shadow
//! roots and fragments live in the same arena as the document, as separate
//! trees whose roots have no parent.

mod position;
mod shadow;

use std::collections::HashSet;

pub use position::DocumentPosition;
pub use shadow::{ShadowRootData, ShadowRootMode};

/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#html-namespace)
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#svg-namespace)
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#mathml-namespace)
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#xml-namespace)
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#xmlns-namespace)
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document(DocumentData),
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
    ShadowRoot(ShadowRootData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-content-type)
///
/// "A document whose content type is not "text/html" is known as an XML
/// document." Selector type matching depends on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// `text/html`
    #[default]
    Html,
    /// Any XML content type.
    Xml,
}

/// Document-level state: content type, URL, and the user-action targets
/// that `:focus`, `:hover` and `:active` observe.
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    /// HTML or XML document.
    pub content_type: ContentType,
    /// The document's URL, used by `:target` and `:local-link`.
    pub url: Option<String>,
    /// The focused area of the document.
    pub focused: Option<NodeId>,
    /// Whether focus should be drawn (`:focus-visible`).
    pub focus_visible: bool,
    /// The element under the pointer.
    pub hovered: Option<NodeId>,
    /// The element being activated.
    pub active: Option<NodeId>,
    /// [`designMode`](https://html.spec.whatwg.org/multipage/interaction.html#designMode)
    pub design_mode: bool,
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes are simply known as attributes. ... Attributes have a
/// namespace (null or a non-empty string), namespace prefix (null or a
/// non-empty string), local name (a non-empty string), value (a string)"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "local name"
    pub local_name: String,
    /// "namespace prefix"
    pub prefix: Option<String>,
    /// "namespace"
    pub namespace: Option<String>,
    /// "value"
    pub value: String,
}

impl Attribute {
    /// An attribute in the null namespace.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            prefix: None,
            namespace: None,
            value: value.into(),
        }
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#concept-attribute-qualified-name)
    ///
    /// "An attribute's qualified name is its local name if its namespace
    /// prefix is null, and its namespace prefix, followed by ":", followed by
    /// its local name, otherwise."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Runtime element state that is not reflected in attributes.
///
/// `None` means "derive from the content attribute".
#[derive(Debug, Clone, Default)]
pub struct ElementState {
    /// Current value of a form control (`value` IDL attribute).
    pub value: Option<String>,
    /// Checkedness of a checkbox or radio button.
    pub checked: Option<bool>,
    /// Selectedness of an `<option>`.
    pub selected: Option<bool>,
    /// `indeterminate` IDL attribute of a checkbox.
    pub indeterminate: bool,
    /// Custom element state; `None` follows the element name.
    pub defined: Option<bool>,
    /// `<dialog>` opened with `showModal()`.
    pub modal: bool,
    /// Popover showing state.
    pub popover_open: bool,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name, custom
/// element state, custom element definition, is value."
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub local_name: String,
    /// "An element's namespace"
    pub namespace: Option<String>,
    /// "An element's namespace prefix"
    pub prefix: Option<String>,
    /// "An element has an associated attribute list", kept in insertion order.
    pub attrs: Vec<Attribute>,
    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-element-shadow-root)
    /// "Elements also have an associated shadow root (null or a shadow root)."
    pub shadow_root: Option<NodeId>,
    /// State not carried by attributes.
    pub state: ElementState,
}

impl ElementData {
    /// An element in the HTML namespace.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self::new_ns(Some(HTML_NAMESPACE), &local_name.into())
    }

    /// [§ 4.9 validate and extract](https://dom.spec.whatwg.org/#validate-and-extract)
    ///
    /// Splits `qualified_name` on the first `:` into prefix and local name.
    #[must_use]
    pub fn new_ns(namespace: Option<&str>, qualified_name: &str) -> Self {
        let (prefix, local_name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.to_string()),
        };
        Self {
            local_name,
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            prefix,
            attrs: Vec::new(),
            shadow_root: None,
            state: ElementState::default(),
        }
    }

    /// Returns true if the element is in the HTML namespace.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.namespace.as_deref() == Some(HTML_NAMESPACE)
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-element-qualified-name)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// [§ 4.9 get an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-name)
    ///
    /// "Return the first attribute in element's attribute list whose
    /// qualified name is qualifiedName; otherwise null."
    #[must_use]
    pub fn get_attribute(&self, qualified_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.qualified_name() == qualified_name)
            .map(|attr| attr.value.as_str())
    }

    /// [§ 4.9 get an attribute by namespace and local name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-namespace)
    #[must_use]
    pub fn get_attribute_ns(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }

    /// Returns true if an attribute with this qualified name exists.
    #[must_use]
    pub fn has_attribute(&self, qualified_name: &str) -> bool {
        self.get_attribute(qualified_name).is_some()
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute_ns(None, "id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.get_attribute_ns(None, "class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// The Document node is always at index 0 ([`NodeId::ROOT`]). Nodes created
/// but never attached, document fragments and shadow roots are roots of
/// their own trees inside the same arena.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new HTML document with just the Document node.
    pub fn new() -> Self {
        Self::with_content_type(ContentType::Html)
    }

    /// Create a new XML document with just the Document node.
    pub fn new_xml() -> Self {
        Self::with_content_type(ContentType::Xml)
    }

    /// Create an empty document of the given content type.
    pub fn with_content_type(content_type: ContentType) -> Self {
        let data = DocumentData {
            content_type,
            ..DocumentData::default()
        };
        Self {
            nodes: vec![Node::detached(NodeType::Document(data))],
        }
    }

    /// Get the root document node ID.
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document's state.
    pub fn document_data(&self) -> &DocumentData {
        match &self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("node 0 is always the document"),
        }
    }

    /// Mutable access to the document's state (focus, hover, URL, ...).
    pub fn document_data_mut(&mut self) -> &mut DocumentData {
        match &mut self.nodes[NodeId::ROOT.0].node_type {
            NodeType::Document(data) => data,
            _ => unreachable!("node 0 is always the document"),
        }
    }

    /// Returns true if this is an HTML document.
    pub fn is_html_document(&self) -> bool {
        self.document_data().content_type == ContentType::Html
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// [`createElement()`](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// "If this is an HTML document, then set localName to localName in ASCII
    /// lowercase." Elements of HTML documents are in the HTML namespace;
    /// XML documents create elements in the null namespace.
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        let data = if self.is_html_document() {
            ElementData::new(local_name.to_ascii_lowercase())
        } else {
            ElementData::new_ns(None, local_name)
        };
        self.alloc(NodeType::Element(data))
    }

    /// [`createElementNS()`](https://dom.spec.whatwg.org/#dom-document-createelementns)
    pub fn create_element_ns(&mut self, namespace: Option<&str>, qualified_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new_ns(
            namespace,
            qualified_name,
        )))
    }

    /// [`createTextNode()`](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// [`createComment()`](https://dom.spec.whatwg.org/#dom-document-createcomment)
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    /// [`createDocumentFragment()`](https://dom.spec.whatwg.org/#dom-document-createdocumentfragment)
    pub fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` before `reference` (or last when
    /// `reference` is `None`). A child that already has a parent is removed
    /// from it first.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }

        let index = reference
            .and_then(|r| self.nodes[parent.0].children.iter().position(|&c| c == r))
            .unwrap_or(self.nodes[parent.0].children.len());

        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.relink_siblings(parent);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.nodes[parent.0].children.iter().position(|&c| c == child) else {
            return;
        };
        let _ = self.nodes[parent.0].children.remove(index);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        self.relink_siblings(parent);
    }

    /// Recompute sibling links of all children of `parent`.
    fn relink_siblings(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for (i, &child) in children.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| children[p]);
            let next = children.get(i + 1).copied();
            let node = &mut self.nodes[child.0];
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
    }

    /// [`setAttribute()`](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII lowercase."
    pub fn set_attribute(&mut self, element: NodeId, qualified_name: &str, value: &str) {
        let lowercase = self.is_html_document()
            && self.as_element(element).is_some_and(ElementData::is_html);
        let name = if lowercase {
            qualified_name.to_ascii_lowercase()
        } else {
            qualified_name.to_string()
        };
        let Some(data) = self.as_element_mut(element) else {
            return;
        };
        if let Some(attr) = data.attrs.iter_mut().find(|a| a.qualified_name() == name) {
            attr.value = value.to_string();
        } else {
            data.attrs.push(Attribute::new(name, value));
        }
    }

    /// [`setAttributeNS()`](https://dom.spec.whatwg.org/#dom-element-setattributens)
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) {
        let (prefix, local_name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.to_string()),
        };
        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        let Some(data) = self.as_element_mut(element) else {
            return;
        };
        if let Some(attr) = data
            .attrs
            .iter_mut()
            .find(|a| a.namespace == namespace && a.local_name == local_name)
        {
            attr.prefix = prefix;
            attr.value = value.to_string();
        } else {
            data.attrs.push(Attribute {
                local_name,
                prefix,
                namespace,
                value: value.to_string(),
            });
        }
    }

    /// [`removeAttribute()`](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    pub fn remove_attribute(&mut self, element: NodeId, qualified_name: &str) {
        if let Some(data) = self.as_element_mut(element) {
            data.attrs.retain(|a| a.qualified_name() != qualified_name);
        }
    }

    /// [`getAttribute()`](https://dom.spec.whatwg.org/#dom-element-getattribute)
    pub fn get_attribute(&self, element: NodeId, qualified_name: &str) -> Option<&str> {
        self.as_element(element)?.get_attribute(qualified_name)
    }

    /// Create an element, set its attributes, and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(id, name, value);
        }
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Iterate over the descendants of `id` in tree order, excluding `id`.
    ///
    /// Shadow trees are not entered.
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        DescendantIterator { tree: self, stack }
    }

    /// [§ 4.2 root](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// "The root of an object is itself, if its parent is null, or else it is
    /// the root of its parent."
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Get element data if this node is an element.
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.html_child(|tag| tag == "head")
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.html_child(|tag| tag == "body" || tag == "frameset")
    }

    fn html_child(&self, wanted: impl Fn(&str) -> bool) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.as_element(id)
                    .is_some_and(|e| e.is_html() && wanted(&e.local_name))
            })
            .copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
    ///
    /// Position of `other` relative to `reference`. Nodes in different trees
    /// are "disconnected" and ordered by their roots' arena indices: "an
    /// implementation-specific but consistent ordering".
    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        if reference == other {
            return DocumentPosition::default();
        }

        let mut ref_chain = vec![reference];
        ref_chain.extend(self.ancestors(reference));
        let mut other_chain = vec![other];
        other_chain.extend(self.ancestors(other));

        let (ref_root, other_root) = (ref_chain[ref_chain.len() - 1], other_chain[other_chain.len() - 1]);
        if ref_root != other_root {
            let order = if other_root > ref_root {
                DocumentPosition::FOLLOWING
            } else {
                DocumentPosition::PRECEDING
            };
            return DocumentPosition::DISCONNECTED | DocumentPosition::IMPLEMENTATION_SPECIFIC | order;
        }

        // "If other is an ancestor of node ... return CONTAINS | PRECEDING."
        if ref_chain.contains(&other) {
            return DocumentPosition::CONTAINS | DocumentPosition::PRECEDING;
        }
        // "If other is a descendant of node ... return CONTAINED_BY | FOLLOWING."
        if other_chain.contains(&reference) {
            return DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING;
        }

        // Walk both chains from the root down to where they diverge.
        let mut ref_iter = ref_chain.iter().rev();
        let mut other_iter = other_chain.iter().rev();
        let mut parent = NodeId::ROOT;
        loop {
            match (ref_iter.next(), other_iter.next()) {
                (Some(a), Some(b)) if a == b => parent = *a,
                (Some(&a), Some(&b)) => {
                    let children = self.children(parent);
                    let a_index = children.iter().position(|&c| c == a);
                    let b_index = children.iter().position(|&c| c == b);
                    return if b_index < a_index {
                        DocumentPosition::PRECEDING
                    } else {
                        DocumentPosition::FOLLOWING
                    };
                }
                _ => return DocumentPosition::FOLLOWING,
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the preceding or following siblings of a node.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Pre-order iterator over descendants.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
