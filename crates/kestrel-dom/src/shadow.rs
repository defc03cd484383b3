//! Shadow roots and slot assignment.
//!
//! [§ 4.2.2 Shadow tree](https://dom.spec.whatwg.org/#concept-shadow-tree)
//!
//! "A shadow root's host is never null." A shadow root is stored in the
//! arena as the root of its own tree; the host keeps a link to it through
//! [`ElementData::shadow_root`](crate::ElementData::shadow_root).

use crate::{DomTree, NodeId, NodeType};

/// [§ 4.8](https://dom.spec.whatwg.org/#shadowroot-mode)
///
/// "Shadow roots have an associated mode ("open" or "closed")."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    /// `mode: "open"`
    #[default]
    Open,
    /// `mode: "closed"`
    Closed,
}

/// Data carried by a shadow root node.
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    /// "A shadow root's host"
    pub host: NodeId,
    /// "mode"
    pub mode: ShadowRootMode,
}

impl DomTree {
    /// [`attachShadow()`](https://dom.spec.whatwg.org/#dom-element-attachshadow)
    ///
    /// Returns the existing shadow root if `host` already has one, and
    /// `None` if `host` is not an element.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Option<NodeId> {
        let existing = self.as_element(host)?.shadow_root;
        if existing.is_some() {
            return existing;
        }
        let root = self.alloc(NodeType::ShadowRoot(ShadowRootData { host, mode }));
        if let Some(data) = self.as_element_mut(host) {
            data.shadow_root = Some(root);
        }
        Some(root)
    }

    /// The shadow root attached to `element`, regardless of mode.
    #[must_use]
    pub fn shadow_root(&self, element: NodeId) -> Option<NodeId> {
        self.as_element(element)?.shadow_root
    }

    /// The host of a shadow root node.
    #[must_use]
    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match &self.get(root)?.node_type {
            NodeType::ShadowRoot(data) => Some(data.host),
            _ => None,
        }
    }

    /// Returns true if `id` is a `<slot>` element in the HTML namespace.
    fn is_slot(&self, id: NodeId) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.is_html() && e.local_name == "slot")
    }

    /// [§ 4.2.2.3 Finding slots](https://dom.spec.whatwg.org/#find-a-slot)
    ///
    /// "1. If slottable's parent is null, then return null.
    ///  2. Let shadow be slottable's parent's shadow root.
    ///  3. If shadow is null, then return null. ...
    ///  5. Return the first slot in tree order in shadow's descendants whose
    ///     name is slottable's name, if any; otherwise null."
    #[must_use]
    pub fn find_slot(&self, slottable: NodeId) -> Option<NodeId> {
        let name = match &self.get(slottable)?.node_type {
            NodeType::Element(data) => data.get_attribute_ns(None, "slot").unwrap_or(""),
            NodeType::Text(_) => "",
            _ => return None,
        };
        let host = self.parent(slottable)?;
        let shadow = self.shadow_root(host)?;
        self.descendants(shadow).find(|&id| {
            self.is_slot(id)
                && self
                    .as_element(id)
                    .and_then(|e| e.get_attribute_ns(None, "name"))
                    .unwrap_or("")
                    == name
        })
    }

    /// [§ 4.2.2.3 Find slottables](https://dom.spec.whatwg.org/#find-slottables)
    ///
    /// The host children assigned to `slot`, in tree order. Empty when
    /// `slot` is not a slot inside a shadow tree.
    #[must_use]
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        if !self.is_slot(slot) {
            return Vec::new();
        }
        let root = self.root_of(slot);
        let Some(host) = self.shadow_host(root) else {
            return Vec::new();
        };
        self.children(host)
            .iter()
            .copied()
            .filter(|&child| self.find_slot(child) == Some(slot))
            .collect()
    }
}
