//! CSS selector engine for the Kestrel workspace.
//!
//! # Scope
//!
//! This crate implements the four selector operations of the DOM over any
//! tree that implements [`TreeAdapter`]:
//! - **`matches`** ([DOM § 4.9](https://dom.spec.whatwg.org/#dom-element-matches))
//! - **`closest`** ([DOM § 4.9](https://dom.spec.whatwg.org/#dom-element-closest))
//! - **`querySelector`** and **`querySelectorAll`**
//!   ([DOM § 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-queryselector))
//!
//! Selector support follows [Selectors Level 4](https://www.w3.org/TR/selectors-4/):
//! - Type, universal, class, ID and attribute selectors with namespaces
//! - All four combinators, `:is()`, `:where()`, `:not()` and `:has()`
//! - Tree-structural pseudo-classes with `An+B` and `of S`
//! - `:dir()`, `:lang()`, location, user-action, input and display-state
//!   pseudo-classes
//! - Shadow DOM scoping: `:host`, `:host()`, `:host-context()`, `::slotted()`
//!
//! # Not Yet Implemented
//!
//! - The column combinator `||` (rejected with `NotSupportedError`)
//! - Pseudo-elements other than `::slotted()` (never match)
//! - `:visited` (never matches)

/// The tree interface and its [`kestrel_dom::DomTree`] implementation.
pub mod adapter;
/// `An+B` microsyntax per [CSS Syntax § 6](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax).
pub mod anb;
/// Compiled selector model.
pub mod ast;
/// Compiled-selector cache.
pub mod cache;
/// Parse tree to compiled selector.
pub mod compiler;
/// DOM algorithms: directionality, language, editability, namespaces, order.
pub mod dom_util;
/// Selector errors.
pub mod error;
/// The four public operations.
pub mod finder;
/// Selector matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod matcher;
/// Selector grammar per [§ 18](https://www.w3.org/TR/selectors-4/#grammar).
pub mod parser;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// Incremental preorder walker.
pub mod walker;

use std::sync::Arc;

use kestrel_common::warning::WarnSink;
use serde::Deserialize;

pub use adapter::{AttrRef, DocumentState, NodeKind, NodeState, TreeAdapter};
pub use cache::SelectorCache;
pub use compiler::{CompiledSelector, compile};
pub use error::{ErrorKind, Result, SelectorError};
pub use finder::{Finder, Target};
pub use matcher::{MatchScope, Matcher};

/// Per-call options.
#[derive(Clone, Copy, Default)]
pub struct Options<'a> {
    /// Fail with `NotSupportedError` on recognized but unsupported
    /// constructs instead of warning and not matching.
    pub strict: bool,
    /// Receives each distinct warning once per call.
    pub warn: Option<&'a dyn WarnSink>,
}

impl core::fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Options")
            .field("strict", &self.strict)
            .field("warn", &self.warn.is_some())
            .finish()
    }
}

/// Serializable part of [`Options`]. Unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// See [`Options::strict`].
    pub strict: bool,
}

impl MatchConfig {
    /// Options with this configuration and the given warning sink.
    #[must_use]
    pub fn options(self, warn: Option<&dyn WarnSink>) -> Options<'_> {
        Options {
            strict: self.strict,
            warn,
        }
    }
}

impl From<MatchConfig> for Options<'_> {
    fn from(config: MatchConfig) -> Self {
        config.options(None)
    }
}

/// Entry point owning a compiled-selector cache.
///
/// Every operation compiles its selector through the cache, so repeated
/// calls with the same selector text compile once.
#[derive(Debug, Default)]
pub struct SelectorEngine {
    cache: SelectorCache,
}

impl SelectorEngine {
    /// An engine with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine's cache.
    #[must_use]
    pub const fn cache(&self) -> &SelectorCache {
        &self.cache
    }

    /// Compile `selector`, or fetch it from the cache.
    ///
    /// # Errors
    ///
    /// `SyntaxError` for invalid selectors, `NotSupportedError` for the
    /// column combinator.
    pub fn compile(&self, selector: &str) -> Result<Arc<CompiledSelector>> {
        self.cache.get_or_compile(selector)
    }

    fn run<T: TreeAdapter>(
        &self,
        tree: &T,
        selector: &str,
        reference: T::Node,
        target: Target,
        options: &Options<'_>,
    ) -> Result<Vec<T::Node>> {
        let compiled = self.compile(selector)?;
        let mut finder = Finder::new(tree, &compiled, reference, options);
        finder.find(target)
    }

    /// [DOM § 4.9 `matches()`](https://dom.spec.whatwg.org/#dom-element-matches)
    ///
    /// Does `node` match `selector` with `:scope` bound to `node`? A shadow
    /// root may be passed to test the `:host` family against its host.
    ///
    /// # Errors
    ///
    /// Compilation errors, undeclared namespace prefixes, and unsupported
    /// constructs in strict mode.
    pub fn matches<T: TreeAdapter>(
        &self,
        tree: &T,
        selector: &str,
        node: T::Node,
        options: &Options<'_>,
    ) -> Result<bool> {
        Ok(!self
            .run(tree, selector, node, Target::SelfOnly, options)?
            .is_empty())
    }

    /// [DOM § 4.9 `closest()`](https://dom.spec.whatwg.org/#dom-element-closest)
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn closest<T: TreeAdapter>(
        &self,
        tree: &T,
        selector: &str,
        node: T::Node,
        options: &Options<'_>,
    ) -> Result<Option<T::Node>> {
        Ok(self
            .run(tree, selector, node, Target::Lineal, options)?
            .into_iter()
            .next())
    }

    /// [DOM § 4.2.6 `querySelector()`](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn query_selector<T: TreeAdapter>(
        &self,
        tree: &T,
        selector: &str,
        reference: T::Node,
        options: &Options<'_>,
    ) -> Result<Option<T::Node>> {
        Ok(self
            .run(tree, selector, reference, Target::First, options)?
            .into_iter()
            .next())
    }

    /// [DOM § 4.2.6 `querySelectorAll()`](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    ///
    /// Matches below `reference`, in document order, without duplicates.
    ///
    /// # Errors
    ///
    /// See [`Self::matches`].
    pub fn query_selector_all<T: TreeAdapter>(
        &self,
        tree: &T,
        selector: &str,
        reference: T::Node,
        options: &Options<'_>,
    ) -> Result<Vec<T::Node>> {
        self.run(tree, selector, reference, Target::All, options)
    }
}
