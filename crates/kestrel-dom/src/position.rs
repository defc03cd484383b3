//! [§ 4.4 compareDocumentPosition()](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)

use core::ops::BitOr;

/// Bitmask returned by [`crate::DomTree::compare_document_position`].
///
/// "The compareDocumentPosition(other) method steps are to return the
/// result of comparing the position of other relative to this."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition(u16);

impl DocumentPosition {
    /// `DOCUMENT_POSITION_DISCONNECTED` (1)
    pub const DISCONNECTED: Self = Self(0x01);
    /// `DOCUMENT_POSITION_PRECEDING` (2): other comes before the reference.
    pub const PRECEDING: Self = Self(0x02);
    /// `DOCUMENT_POSITION_FOLLOWING` (4): other comes after the reference.
    pub const FOLLOWING: Self = Self(0x04);
    /// `DOCUMENT_POSITION_CONTAINS` (8): other is an ancestor of the reference.
    pub const CONTAINS: Self = Self(0x08);
    /// `DOCUMENT_POSITION_CONTAINED_BY` (16): other is a descendant of the reference.
    pub const CONTAINED_BY: Self = Self(0x10);
    /// `DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC` (32)
    pub const IMPLEMENTATION_SPECIFIC: Self = Self(0x20);

    /// Raw bits, as exposed by the DOM API.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns true if every bit of `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Returns true for the "same node" result.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DocumentPosition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
