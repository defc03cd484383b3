//! Selector errors.
//!
//! [DOM § 4.2.6 Scope-match a selectors string](https://dom.spec.whatwg.org/#scope-match-a-selectors-string)
//!
//! "If s is failure, then throw a "SyntaxError" DOMException."
//!
//! Every error carries a stable DOM exception name ([`SelectorError::name`])
//! and a message naming the offending selector or pseudo-class.

use strum_macros::Display;

/// Result alias used throughout the engine.
pub type Result<T> = core::result::Result<T, SelectorError>;

/// Coarse classification of a [`SelectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// Malformed selector syntax, detected by the tokenizer or parser.
    Grammar,
    /// Well-formed syntax that does not name a valid selector.
    Semantic,
    /// A recognized construct the engine does not evaluate (strict mode only).
    NotSupported,
}

/// Errors raised while compiling or matching a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// A token that can never appear in a selector: bad strings or URLs,
    /// unbalanced brackets, blocks, at-keywords.
    #[error("Invalid selector {selector}")]
    InvalidToken {
        /// The full selector text.
        selector: String,
    },

    /// Malformed selector grammar.
    #[error("Invalid selector {selector}")]
    InvalidSelector {
        /// The offending selector fragment.
        selector: String,
    },

    /// Well-formed grammar the compiler rejects: nested `:has()`, a
    /// malformed functional argument, a misplaced pseudo-element.
    #[error("Invalid selector {selector}")]
    InvalidConstruct {
        /// The enclosing pseudo-class or complex selector text.
        selector: String,
    },

    /// A pseudo-class name the engine does not know.
    #[error("Unknown pseudo-class :{name}")]
    UnknownPseudoClass {
        /// Name without the leading colon.
        name: String,
    },

    /// A pseudo-element name the engine does not know.
    #[error("Unknown pseudo-element ::{name}")]
    UnknownPseudoElement {
        /// Name without the leading colons.
        name: String,
    },

    /// A namespace prefix that no `xmlns:` declaration resolves.
    #[error("Undeclared namespace {prefix}")]
    UndeclaredNamespace {
        /// The unresolved prefix.
        prefix: String,
    },

    /// A known pseudo-class that cannot be evaluated.
    #[error("Unsupported pseudo-class :{name}")]
    UnsupportedPseudoClass {
        /// Name without the leading colon.
        name: String,
    },

    /// A known pseudo-element that cannot be evaluated.
    #[error("Unsupported pseudo-element ::{name}")]
    UnsupportedPseudoElement {
        /// Name without the leading colons.
        name: String,
    },

    /// The column combinator `||`.
    #[error("Unsupported combinator {combinator}")]
    UnsupportedCombinator {
        /// The combinator as written.
        combinator: String,
    },
}

impl SelectorError {
    pub(crate) fn invalid(selector: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
        }
    }

    pub(crate) fn invalid_construct(selector: impl Into<String>) -> Self {
        Self::InvalidConstruct {
            selector: selector.into(),
        }
    }

    /// The DOM exception name: `SyntaxError` or `NotSupportedError`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Grammar | ErrorKind::Semantic => "SyntaxError",
            ErrorKind::NotSupported => "NotSupportedError",
        }
    }

    /// Which stage rejected the selector.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidToken { .. } | Self::InvalidSelector { .. } => ErrorKind::Grammar,
            Self::InvalidConstruct { .. }
            | Self::UnknownPseudoClass { .. }
            | Self::UnknownPseudoElement { .. }
            | Self::UndeclaredNamespace { .. } => ErrorKind::Semantic,
            Self::UnsupportedPseudoClass { .. }
            | Self::UnsupportedPseudoElement { .. }
            | Self::UnsupportedCombinator { .. } => ErrorKind::NotSupported,
        }
    }
}
