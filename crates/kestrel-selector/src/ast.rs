//! Compiled selector model.
//!
//! Selector lists, complex selectors and compound selectors live in a flat
//! [`SelectorArena`] and refer to each other by index, so nested lists in
//! `:is()`, `:not()`, `:has()` and `nth-*(... of S)` are cheap to share and a
//! list can be identified by its [`ListId`] alone.

use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::anb::AnB;

/// Index of a [`SelectorList`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub usize);

/// Index of a [`ComplexSelector`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComplexId(pub usize);

/// Index of a [`CompoundSelector`] in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompoundId(pub usize);

/// Flat storage for every list, complex and compound of one compiled selector.
#[derive(Debug, Clone, Default)]
pub struct SelectorArena {
    lists: Vec<SelectorList>,
    complexes: Vec<ComplexSelector>,
    compounds: Vec<CompoundSelector>,
}

impl SelectorArena {
    pub(crate) fn push_list(&mut self, list: SelectorList) -> ListId {
        self.lists.push(list);
        ListId(self.lists.len() - 1)
    }

    pub(crate) fn push_complex(&mut self, complex: ComplexSelector) -> ComplexId {
        self.complexes.push(complex);
        ComplexId(self.complexes.len() - 1)
    }

    pub(crate) fn push_compound(&mut self, compound: CompoundSelector) -> CompoundId {
        self.compounds.push(compound);
        CompoundId(self.compounds.len() - 1)
    }

    /// The list at `id`.
    #[must_use]
    pub fn list(&self, id: ListId) -> &SelectorList {
        &self.lists[id.0]
    }

    /// The complex selector at `id`.
    #[must_use]
    pub fn complex(&self, id: ComplexId) -> &ComplexSelector {
        &self.complexes[id.0]
    }

    /// The compound selector at `id`.
    #[must_use]
    pub fn compound(&self, id: CompoundId) -> &CompoundSelector {
        &self.compounds[id.0]
    }

    /// Number of lists, including the root list.
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }
}

/// A selector list: matches if any member matches.
#[derive(Debug, Clone, Default)]
pub struct SelectorList {
    /// Members in source order.
    pub complexes: Vec<ComplexId>,
    /// Whether any member transitively contains `:has()`.
    pub contains_has: bool,
}

/// How the finder should look for nodes matching a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Test each candidate and match right to left.
    #[default]
    Ascend,
    /// Start from the id-anchored leftmost compound and expand forward.
    Descend,
}

/// Compounds joined by combinators.
///
/// Invariant: `combinators.len() + 1 == compounds.len()`.
#[derive(Debug, Clone)]
pub struct ComplexSelector {
    /// Compounds, left to right.
    pub compounds: Vec<CompoundId>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    pub combinators: Vec<Combinator>,
    /// The leading combinator of a relative selector (`:has()` argument).
    pub leading: Option<Combinator>,
    /// Source text.
    pub text: String,
    /// Traversal strategy.
    pub direction: Direction,
}

impl ComplexSelector {
    /// The rightmost compound.
    #[must_use]
    pub fn subject(&self) -> CompoundId {
        self.compounds[self.compounds.len() - 1]
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
    /// `A::slotted(B)`: B is assigned to a slot matching A.
    Slot,
}

/// Simple selectors that apply to one node.
#[derive(Debug, Clone, Default)]
pub struct CompoundSelector {
    /// Simple selectors in source order.
    pub simples: Vec<SimpleSelector>,
    /// A pseudo-element the engine cannot produce; the compound never matches.
    pub pseudo_element: Option<String>,
    /// A `:has()` sits under a logical wrapper (`:is`, `:where`, `:not`, nth `of`).
    pub has_nested_has: bool,
    /// Any simple selector transitively contains `:has()`.
    pub contains_has: bool,
    /// Indices into `simples`, cheapest first; `:has()`-bearing ones last.
    pub match_order: Vec<usize>,
}

/// [§ 5.3 Namespaces](https://www.w3.org/TR/selectors-4/#type-nmsp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// No prefix written and no default namespace: any namespace.
    Default,
    /// `*|`
    Any,
    /// `|`
    None,
    /// `prefix|`, resolved against the element at match time.
    Prefix(String),
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[att]`
    Exists,
    /// `[att=val]`
    Equals,
    /// `[att~=val]`
    Includes,
    /// `[att|=val]`
    DashMatch,
    /// `[att^=val]`
    Prefix,
    /// `[att$=val]`
    Suffix,
    /// `[att*=val]`
    Substring,
}

/// Value comparison mode for an attribute selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrCase {
    /// Document-language default.
    Default,
    /// `i`
    Insensitive,
    /// `s`
    Sensitive,
}

/// A compiled attribute selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Namespace of the attribute; unprefixed names match the null namespace.
    pub namespace: NamespaceConstraint,
    /// Name as written.
    pub name: String,
    /// ASCII-lowercased name for HTML elements in HTML documents.
    pub lower_name: String,
    /// Operator.
    pub operator: AttrOperator,
    /// Value to compare with; empty for `Exists`.
    pub value: String,
    /// Case mode.
    pub case: AttrCase,
}

/// An atomic predicate.
#[derive(Debug, Clone)]
pub enum SimpleSelector {
    /// Type or universal selector; `name` is `None` for `*`.
    Type {
        /// Namespace constraint.
        namespace: NamespaceConstraint,
        /// Local name as written.
        name: Option<String>,
        /// ASCII-lowercased local name.
        lower_name: Option<String>,
    },
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[...]`
    Attribute(AttributeSelector),
    /// `:name` and `:name(...)`
    PseudoClass(PseudoClass),
}

/// Which siblings an `nth-*` pseudo-class counts, and from which end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthKind {
    /// `:nth-child()`, `:first-child`
    Child,
    /// `:nth-last-child()`, `:last-child`
    LastChild,
    /// `:nth-of-type()`, `:first-of-type`
    OfType,
    /// `:nth-last-of-type()`, `:last-of-type`
    LastOfType,
}

impl NthKind {
    /// Counts from the last sibling.
    #[must_use]
    pub const fn from_end(self) -> bool {
        matches!(self, Self::LastChild | Self::LastOfType)
    }

    /// Counts only siblings of the same element type.
    #[must_use]
    pub const fn of_type(self) -> bool {
        matches!(self, Self::OfType | Self::LastOfType)
    }
}

/// Compiled pseudo-class with its typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// `:is(S)`
    Is(ListId),
    /// `:where(S)`
    Where(ListId),
    /// `:not(S)`
    Not(ListId),
    /// `:has(S)`
    Has(ListId),
    /// `:nth-child(An+B of S)` and the other structural counters.
    Nth {
        /// What is counted.
        kind: NthKind,
        /// The formula.
        anb: AnB,
        /// `of S` filter, child forms only.
        of: Option<ListId>,
    },
    /// `:only-child`
    OnlyChild,
    /// `:only-of-type`
    OnlyOfType,
    /// `:root`
    Root,
    /// `:empty`
    Empty,
    /// `:scope`, and the nesting selector `&`.
    Scope,
    /// `:host` and `:host(S)`
    Host(Option<ListId>),
    /// `:host-context(S)`
    HostContext(ListId),
    /// `:defined`
    Defined,
    /// `:dir(ltr)`; any identifier, lowercased.
    Dir(String),
    /// `:lang(...)` language ranges.
    Lang(Vec<String>),
    /// `:any-link`, `:-webkit-any-link`
    AnyLink,
    /// `:link`
    Link,
    /// `:visited`
    Visited,
    /// `:local-link`
    LocalLink,
    /// `:target`
    Target,
    /// `:target-within`
    TargetWithin,
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:focus`
    Focus,
    /// `:focus-visible`
    FocusVisible,
    /// `:focus-within`
    FocusWithin,
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:read-only`
    ReadOnly,
    /// `:read-write`
    ReadWrite,
    /// `:placeholder-shown`
    PlaceholderShown,
    /// `:default`
    Default,
    /// `:checked`
    Checked,
    /// `:indeterminate`
    Indeterminate,
    /// `:valid`
    Valid,
    /// `:invalid`
    Invalid,
    /// `:in-range`
    InRange,
    /// `:out-of-range`
    OutOfRange,
    /// `:required`
    Required,
    /// `:optional`
    Optional,
    /// `:open`
    Open,
    /// `:closed`
    Closed,
    /// `:modal`
    Modal,
    /// `:popover-open`
    PopoverOpen,
    /// Recognized but not evaluated; never matches.
    Unsupported(String),
}

impl PseudoClass {
    /// The nested list, for pseudo-classes that take a selector argument.
    #[must_use]
    pub const fn nested_list(&self) -> Option<ListId> {
        match self {
            Self::Is(id) | Self::Where(id) | Self::Not(id) | Self::Has(id) => Some(*id),
            Self::HostContext(id) | Self::Host(Some(id)) => Some(*id),
            Self::Nth { of, .. } => *of,
            _ => None,
        }
    }
}

/// Pseudo-class names, resolved ASCII case-insensitively.
///
/// [§ 3.6.2 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
/// "Pseudo-class names are ASCII case-insensitive."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum PseudoClassName {
    Is,
    Where,
    Not,
    Has,
    NthChild,
    NthLastChild,
    NthOfType,
    NthLastOfType,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Root,
    Empty,
    Scope,
    Host,
    HostContext,
    Defined,
    Dir,
    Lang,
    #[strum(serialize = "any-link", serialize = "-webkit-any-link")]
    AnyLink,
    Link,
    Visited,
    LocalLink,
    Target,
    TargetWithin,
    Hover,
    Active,
    Focus,
    FocusVisible,
    FocusWithin,
    Enabled,
    Disabled,
    ReadOnly,
    ReadWrite,
    PlaceholderShown,
    #[strum(serialize = "default")]
    DefaultState,
    Checked,
    Indeterminate,
    Valid,
    Invalid,
    InRange,
    OutOfRange,
    Required,
    Optional,
    Open,
    Closed,
    Modal,
    PopoverOpen,
    // Recognized, not evaluated.
    Autofill,
    Blank,
    Buffering,
    Current,
    Fullscreen,
    Future,
    HasSlotted,
    Muted,
    Past,
    Paused,
    PictureInPicture,
    Playing,
    Seeking,
    Stalled,
    UserInvalid,
    UserValid,
    VolumeLocked,
    #[strum(serialize = "-webkit-autofill")]
    WebkitAutofill,
}

impl PseudoClassName {
    /// Pseudo-classes that are recognized but never evaluated.
    #[must_use]
    pub const fn is_unsupported(self) -> bool {
        matches!(
            self,
            Self::Autofill
                | Self::Blank
                | Self::Buffering
                | Self::Current
                | Self::Fullscreen
                | Self::Future
                | Self::HasSlotted
                | Self::Muted
                | Self::Past
                | Self::Paused
                | Self::PictureInPicture
                | Self::Playing
                | Self::Seeking
                | Self::Stalled
                | Self::UserInvalid
                | Self::UserValid
                | Self::VolumeLocked
                | Self::WebkitAutofill
        )
    }

    /// Pseudo-classes that must be written in functional form.
    #[must_use]
    pub const fn requires_arguments(self) -> bool {
        matches!(
            self,
            Self::Is
                | Self::Where
                | Self::Not
                | Self::Has
                | Self::NthChild
                | Self::NthLastChild
                | Self::NthOfType
                | Self::NthLastOfType
                | Self::HostContext
                | Self::Dir
                | Self::Lang
        )
    }

    /// Pseudo-classes that may be written in functional form.
    #[must_use]
    pub const fn accepts_arguments(self) -> bool {
        self.requires_arguments() || matches!(self, Self::Host | Self::Current)
    }
}

/// Pseudo-element names.
///
/// [CSS Pseudo-Elements](https://www.w3.org/TR/css-pseudo-4/)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum PseudoElementName {
    After,
    Backdrop,
    Before,
    Cue,
    CueRegion,
    DetailsContent,
    FileSelectorButton,
    FirstLetter,
    FirstLine,
    GrammarError,
    Highlight,
    Marker,
    Part,
    Placeholder,
    Selection,
    Slotted,
    SpellingError,
    TargetText,
    ViewTransition,
    ViewTransitionGroup,
    ViewTransitionImagePair,
    ViewTransitionNew,
    ViewTransitionOld,
}

impl PseudoElementName {
    /// Pseudo-elements written in functional form.
    #[must_use]
    pub const fn requires_arguments(self) -> bool {
        matches!(
            self,
            Self::Highlight
                | Self::Part
                | Self::Slotted
                | Self::ViewTransitionGroup
                | Self::ViewTransitionImagePair
                | Self::ViewTransitionNew
                | Self::ViewTransitionOld
        )
    }

    /// Pseudo-elements that may be written in functional form.
    #[must_use]
    pub const fn accepts_arguments(self) -> bool {
        self.requires_arguments() || matches!(self, Self::Cue | Self::CueRegion)
    }
}
