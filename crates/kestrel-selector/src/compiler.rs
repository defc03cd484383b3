//! Selector walker: generic parse tree to compiled selector model.
//!
//! [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
//!
//! The parser only checks syntax. This pass resolves pseudo-class and
//! pseudo-element names, parses functional arguments (nested selector lists,
//! An+B, language ranges), applies the forgiving rules of `:is()` and
//! `:where()`, and records the metadata the finder and matcher use to pick a
//! traversal strategy.

use tracing::trace;

use crate::anb::{AnB, parse_anb};
use crate::ast::{
    AttrCase, AttrOperator, AttributeSelector, Combinator, ComplexId, ComplexSelector,
    CompoundId, CompoundSelector, Direction, ListId, NamespaceConstraint, NthKind, PseudoClass,
    PseudoClassName, PseudoElementName, SelectorArena, SelectorList, SimpleSelector,
};
use crate::error::{Result, SelectorError};
use crate::parser::{
    Arguments, AttrFlag, AttrMatcher, AttributeNode, CombinatorToken, Component, NsPrefix,
    SelectorNode, parse_complex, parse_selector_list, split_list, trim,
};
use crate::tokenizer::{Token, TokenKind, tokenize};

/// A selector compiled into its arena model. Immutable and shareable.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    source: String,
    arena: SelectorArena,
    root: ListId,
    contains_has: bool,
}

impl CompiledSelector {
    /// The selector text this was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Storage for every nested list, complex and compound.
    #[must_use]
    pub const fn arena(&self) -> &SelectorArena {
        &self.arena
    }

    /// The top-level selector list.
    #[must_use]
    pub const fn root(&self) -> ListId {
        self.root
    }

    /// Whether any part of the selector uses `:has()`.
    #[must_use]
    pub const fn contains_has(&self) -> bool {
        self.contains_has
    }
}

/// Compile a selector string.
///
/// # Errors
///
/// Returns a grammar error for malformed syntax and a semantic error for
/// unknown pseudo-classes or pseudo-elements, invalid functional arguments,
/// nested `:has()`, and the column combinator.
pub fn compile(selector: &str) -> Result<CompiledSelector> {
    let stream = tokenize(selector)?;
    let mut compiler = Compiler {
        source: &stream.source,
        arena: SelectorArena::default(),
        in_has: false,
        depth: 0,
    };

    let list = parse_selector_list(&stream.tokens, &stream.source, false)
        .map_err(|_| SelectorError::invalid(selector))?;
    let complexes = list
        .selectors
        .iter()
        .map(|node| compiler.compile_complex(node, false))
        .collect::<Result<Vec<_>>>()?;
    let root = compiler.push_list(complexes);
    let contains_has = compiler.arena.list(root).contains_has;

    Ok(CompiledSelector {
        source: selector.to_string(),
        arena: compiler.arena,
        root,
        contains_has,
    })
}

/// How a functional pseudo-class reads its selector argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMode {
    /// `:is()`, `:where()`: invalid members are dropped.
    Forgiving,
    /// `:not()`, nth `of`: any invalid member invalidates the whole.
    Strict,
    /// `:has()`: strict, and members may begin with a combinator.
    Relative,
    /// `:host()`, `:host-context()`, `::slotted()`: one compound selector.
    Compound,
}

struct Compiler<'s> {
    source: &'s [char],
    arena: SelectorArena,
    /// Compiling inside a `:has()` argument.
    in_has: bool,
    /// Nesting depth of functional selector arguments.
    depth: usize,
}

impl Compiler<'_> {
    fn push_list(&mut self, complexes: Vec<ComplexId>) -> ListId {
        let contains_has = complexes.iter().any(|&id| {
            self.arena
                .complex(id)
                .compounds
                .iter()
                .any(|&c| self.arena.compound(c).contains_has)
        });
        self.arena.push_list(SelectorList {
            complexes,
            contains_has,
        })
    }

    /// [§ 18 `<complex-selector>`](https://www.w3.org/TR/selectors-4/#typedef-complex-selector)
    fn compile_complex(&mut self, node: &SelectorNode, relative: bool) -> Result<ComplexId> {
        let mut groups: Vec<Vec<&Component>> = vec![Vec::new()];
        let mut combinators = Vec::new();
        let mut leading = None;

        for component in &node.components {
            let Component::Combinator(token) = component else {
                if let Some(group) = groups.last_mut() {
                    group.push(component);
                }
                continue;
            };
            let combinator = match token {
                CombinatorToken::Descendant => Combinator::Descendant,
                CombinatorToken::Child => Combinator::Child,
                CombinatorToken::NextSibling => Combinator::NextSibling,
                CombinatorToken::SubsequentSibling => Combinator::SubsequentSibling,
                CombinatorToken::Column => {
                    return Err(SelectorError::UnsupportedCombinator {
                        combinator: "||".to_string(),
                    });
                }
            };
            if relative && combinators.is_empty() && groups.iter().all(Vec::is_empty) {
                leading = Some(combinator);
            } else {
                combinators.push(combinator);
                groups.push(Vec::new());
            }
        }

        let last = groups.len() - 1;
        let mut compounds = Vec::with_capacity(groups.len());
        let mut joins = Vec::with_capacity(combinators.len());
        for (i, group) in groups.iter().enumerate() {
            let (compound, slotted) = self.compile_compound(group, &node.text)?;
            let has_pseudo_element = compound.pseudo_element.is_some() || slotted.is_some();
            if has_pseudo_element && i != last {
                // "A pseudo-element may only appear once in a complex selector,
                // as the last compound."
                return Err(SelectorError::invalid_construct(node.text.as_str()));
            }
            compounds.push(self.finish_compound(compound));
            if let Some(slotted) = slotted {
                joins.push(Combinator::Slot);
                compounds.push(slotted);
            }
            if let Some(&combinator) = combinators.get(i) {
                joins.push(combinator);
            }
        }

        let direction = self.direction(&compounds, &joins, relative);
        let leading = relative.then(|| leading.unwrap_or(Combinator::Descendant));
        Ok(self.arena.push_complex(ComplexSelector {
            compounds,
            combinators: joins,
            leading,
            text: node.text.clone(),
            direction,
        }))
    }

    /// `Descend` when the leftmost compound is anchored by an id and there is
    /// something to its right to expand into.
    fn direction(
        &self,
        compounds: &[CompoundId],
        combinators: &[Combinator],
        relative: bool,
    ) -> Direction {
        let anchored = compounds.first().is_some_and(|&first| {
            self.arena
                .compound(first)
                .simples
                .iter()
                .any(|s| matches!(s, SimpleSelector::Id(_)))
        });
        if anchored
            && !relative
            && compounds.len() > 1
            && !combinators.contains(&Combinator::Slot)
        {
            Direction::Descend
        } else {
            Direction::Ascend
        }
    }

    /// Compute the has-metadata and match order, then store the compound.
    fn finish_compound(&mut self, mut compound: CompoundSelector) -> CompoundId {
        let mut has_bearing = vec![false; compound.simples.len()];
        for (i, simple) in compound.simples.iter().enumerate() {
            let SimpleSelector::PseudoClass(pseudo) = simple else {
                continue;
            };
            let nested = pseudo
                .nested_list()
                .is_some_and(|id| self.arena.list(id).contains_has);
            match pseudo {
                PseudoClass::Has(_) => has_bearing[i] = true,
                _ if nested => {
                    has_bearing[i] = true;
                    compound.has_nested_has = true;
                }
                _ => {}
            }
        }
        compound.contains_has = has_bearing.contains(&true);

        let rank = |i: usize| -> u8 {
            if has_bearing[i] {
                return 5;
            }
            match &compound.simples[i] {
                SimpleSelector::Id(_) => 0,
                SimpleSelector::Type { .. } => 1,
                SimpleSelector::Class(_) => 2,
                SimpleSelector::Attribute(_) => 3,
                SimpleSelector::PseudoClass(_) => 4,
            }
        };
        let mut order: Vec<usize> = (0..compound.simples.len()).collect();
        order.sort_by_key(|&i| rank(i));
        compound.match_order = order;
        self.arena.push_compound(compound)
    }

    /// [§ 18 `<compound-selector>`](https://www.w3.org/TR/selectors-4/#typedef-compound-selector)
    ///
    /// Returns the compound and, for `::slotted()`, the compound the
    /// assigned node must match.
    fn compile_compound(
        &mut self,
        components: &[&Component],
        complex_text: &str,
    ) -> Result<(CompoundSelector, Option<CompoundId>)> {
        let mut compound = CompoundSelector::default();
        let mut slotted = None;

        for component in components {
            if slotted.is_some() {
                return Err(SelectorError::invalid_construct(complex_text));
            }
            let simple = match component {
                Component::Type { prefix, name } => SimpleSelector::Type {
                    namespace: namespace_constraint(prefix.as_ref()),
                    lower_name: name.as_ref().map(|n| n.to_ascii_lowercase()),
                    name: name.clone(),
                },
                Component::Id(id) => SimpleSelector::Id(id.clone()),
                Component::Class(class) => SimpleSelector::Class(class.clone()),
                Component::Attribute(attribute) => {
                    SimpleSelector::Attribute(compile_attribute(attribute))
                }
                Component::PseudoClass { name, args, text } => {
                    SimpleSelector::PseudoClass(self.compile_pseudo_class(name, args.as_ref(), text)?)
                }
                Component::Nesting => SimpleSelector::PseudoClass(PseudoClass::Scope),
                Component::PseudoElement {
                    name, args, text, ..
                } => {
                    if self.depth > 0 {
                        // Pseudo-elements are not valid inside selector arguments.
                        return Err(SelectorError::invalid_construct(text.as_str()));
                    }
                    match self.compile_pseudo_element(name, args.as_ref(), text)? {
                        PseudoElementKind::Slotted(inner) => slotted = Some(inner),
                        PseudoElementKind::Other(name) => {
                            if compound.pseudo_element.is_none() {
                                compound.pseudo_element = Some(name);
                            }
                        }
                    }
                    continue;
                }
                Component::Combinator(_) => continue,
            };
            if compound.pseudo_element.is_none() {
                compound.simples.push(simple);
            }
        }
        Ok((compound, slotted))
    }

    fn compile_pseudo_element(
        &mut self,
        name: &str,
        args: Option<&Arguments>,
        text: &str,
    ) -> Result<PseudoElementKind> {
        let Ok(kind) = name.parse::<PseudoElementName>() else {
            return Err(SelectorError::UnknownPseudoElement {
                name: name.to_string(),
            });
        };
        if (args.is_some() && !kind.accepts_arguments())
            || (args.is_none() && kind.requires_arguments())
        {
            return Err(SelectorError::invalid_construct(text));
        }
        if kind == PseudoElementName::Slotted {
            let args = args.ok_or_else(|| SelectorError::invalid_construct(text))?;
            let list = self.compile_nested(args, text, ListMode::Compound)?;
            let complex = self.arena.list(list).complexes[0];
            return Ok(PseudoElementKind::Slotted(self.arena.complex(complex).compounds[0]));
        }
        Ok(PseudoElementKind::Other(name.to_ascii_lowercase()))
    }

    /// [§ 3.6.2 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    fn compile_pseudo_class(
        &mut self,
        name: &str,
        args: Option<&Arguments>,
        text: &str,
    ) -> Result<PseudoClass> {
        let Ok(kind) = name.parse::<PseudoClassName>() else {
            let lower = name.to_ascii_lowercase();
            if lower.starts_with("-webkit-") {
                return Ok(PseudoClass::Unsupported(lower));
            }
            return Err(SelectorError::UnknownPseudoClass {
                name: name.to_string(),
            });
        };

        if (args.is_some() && !kind.accepts_arguments())
            || (args.is_none() && kind.requires_arguments())
        {
            return Err(SelectorError::invalid_construct(text));
        }
        if kind.is_unsupported() {
            return Ok(PseudoClass::Unsupported(name.to_ascii_lowercase()));
        }

        let list = |this: &mut Self, mode| {
            let args = args.ok_or_else(|| SelectorError::invalid_construct(text))?;
            this.compile_nested(args, text, mode)
        };
        let first = |kind| PseudoClass::Nth {
            kind,
            anb: AnB::new(0, 1),
            of: None,
        };

        Ok(match kind {
            PseudoClassName::Is => PseudoClass::Is(list(self, ListMode::Forgiving)?),
            PseudoClassName::Where => PseudoClass::Where(list(self, ListMode::Forgiving)?),
            PseudoClassName::Not => PseudoClass::Not(list(self, ListMode::Strict)?),
            PseudoClassName::Has => {
                // "The :has() pseudo-class cannot be nested; :has() is not
                // valid within :has()."
                if self.in_has {
                    return Err(SelectorError::invalid_construct(text));
                }
                self.in_has = true;
                let result = list(self, ListMode::Relative);
                self.in_has = false;
                PseudoClass::Has(result?)
            }
            PseudoClassName::NthChild => self.compile_nth(NthKind::Child, args, text)?,
            PseudoClassName::NthLastChild => self.compile_nth(NthKind::LastChild, args, text)?,
            PseudoClassName::NthOfType => self.compile_nth(NthKind::OfType, args, text)?,
            PseudoClassName::NthLastOfType => self.compile_nth(NthKind::LastOfType, args, text)?,
            PseudoClassName::FirstChild => first(NthKind::Child),
            PseudoClassName::LastChild => first(NthKind::LastChild),
            PseudoClassName::FirstOfType => first(NthKind::OfType),
            PseudoClassName::LastOfType => first(NthKind::LastOfType),
            PseudoClassName::OnlyChild => PseudoClass::OnlyChild,
            PseudoClassName::OnlyOfType => PseudoClass::OnlyOfType,
            PseudoClassName::Root => PseudoClass::Root,
            PseudoClassName::Empty => PseudoClass::Empty,
            PseudoClassName::Scope => PseudoClass::Scope,
            PseudoClassName::Host => match args {
                Some(_) => PseudoClass::Host(Some(list(self, ListMode::Compound)?)),
                None => PseudoClass::Host(None),
            },
            PseudoClassName::HostContext => PseudoClass::HostContext(list(self, ListMode::Compound)?),
            PseudoClassName::Defined => PseudoClass::Defined,
            PseudoClassName::Dir => PseudoClass::Dir(dir_argument(args, text)?),
            PseudoClassName::Lang => PseudoClass::Lang(lang_ranges(args, text)?),
            PseudoClassName::AnyLink => PseudoClass::AnyLink,
            PseudoClassName::Link => PseudoClass::Link,
            PseudoClassName::Visited => PseudoClass::Visited,
            PseudoClassName::LocalLink => PseudoClass::LocalLink,
            PseudoClassName::Target => PseudoClass::Target,
            PseudoClassName::TargetWithin => PseudoClass::TargetWithin,
            PseudoClassName::Hover => PseudoClass::Hover,
            PseudoClassName::Active => PseudoClass::Active,
            PseudoClassName::Focus => PseudoClass::Focus,
            PseudoClassName::FocusVisible => PseudoClass::FocusVisible,
            PseudoClassName::FocusWithin => PseudoClass::FocusWithin,
            PseudoClassName::Enabled => PseudoClass::Enabled,
            PseudoClassName::Disabled => PseudoClass::Disabled,
            PseudoClassName::ReadOnly => PseudoClass::ReadOnly,
            PseudoClassName::ReadWrite => PseudoClass::ReadWrite,
            PseudoClassName::PlaceholderShown => PseudoClass::PlaceholderShown,
            PseudoClassName::DefaultState => PseudoClass::Default,
            PseudoClassName::Checked => PseudoClass::Checked,
            PseudoClassName::Indeterminate => PseudoClass::Indeterminate,
            PseudoClassName::Valid => PseudoClass::Valid,
            PseudoClassName::Invalid => PseudoClass::Invalid,
            PseudoClassName::InRange => PseudoClass::InRange,
            PseudoClassName::OutOfRange => PseudoClass::OutOfRange,
            PseudoClassName::Required => PseudoClass::Required,
            PseudoClassName::Optional => PseudoClass::Optional,
            PseudoClassName::Open => PseudoClass::Open,
            PseudoClassName::Closed => PseudoClass::Closed,
            PseudoClassName::Modal => PseudoClass::Modal,
            PseudoClassName::PopoverOpen => PseudoClass::PopoverOpen,
            _ => PseudoClass::Unsupported(name.to_ascii_lowercase()),
        })
    }

    /// [§ 14.3 `:nth-child()`](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    ///
    /// "`:nth-child(An+B [of S]? )`"
    fn compile_nth(
        &mut self,
        kind: NthKind,
        args: Option<&Arguments>,
        text: &str,
    ) -> Result<PseudoClass> {
        let args = args.ok_or_else(|| SelectorError::invalid_construct(text))?;
        let tokens = args.tokens.as_slice();

        let split = matches!(kind, NthKind::Child | NthKind::LastChild)
            .then(|| {
                tokens.iter().enumerate().position(|(i, t)| {
                    i > 0
                        && tokens[i - 1].kind.is_whitespace()
                        && matches!(&t.kind, TokenKind::Ident(word) if word.eq_ignore_ascii_case("of"))
                })
            })
            .flatten();

        let (anb_tokens, of_tokens) = match split {
            Some(i) => (&tokens[..i], Some(&tokens[i + 1..])),
            None => (tokens, None),
        };
        let anb =
            parse_anb(anb_tokens).ok_or_else(|| SelectorError::invalid_construct(text))?;
        let of = match of_tokens {
            Some(of_tokens) => Some(self.compile_token_list(of_tokens, text, ListMode::Strict)?),
            None => None,
        };
        Ok(PseudoClass::Nth { kind, anb, of })
    }

    fn compile_nested(&mut self, args: &Arguments, text: &str, mode: ListMode) -> Result<ListId> {
        self.compile_token_list(&args.tokens, text, mode)
    }

    /// Compile a selector-list argument. Grammar errors are reported with the
    /// text of the enclosing pseudo-class.
    fn compile_token_list(&mut self, tokens: &[Token], text: &str, mode: ListMode) -> Result<ListId> {
        self.depth += 1;
        let result = self.compile_token_list_inner(tokens, text, mode);
        self.depth -= 1;
        result
    }

    fn compile_token_list_inner(
        &mut self,
        tokens: &[Token],
        text: &str,
        mode: ListMode,
    ) -> Result<ListId> {
        if mode == ListMode::Forgiving {
            // [§ 4.2 Forgiving selector parsing](https://www.w3.org/TR/selectors-4/#forgiving-selector)
            // "invalid selectors are ignored, and the remaining selectors are
            // used."
            let mut complexes = Vec::new();
            for member in split_list(tokens) {
                if trim(member).is_empty() {
                    continue;
                }
                let compiled = parse_complex(member, self.source, false)
                    .and_then(|node| self.compile_complex(&node, false));
                match compiled {
                    Ok(id) => complexes.push(id),
                    Err(err) => trace!(%err, "dropping forgiving list member"),
                }
            }
            return Ok(self.push_list(complexes));
        }

        let relative = mode == ListMode::Relative;
        let list = parse_selector_list(tokens, self.source, relative)
            .map_err(|_| SelectorError::invalid(text))?;
        if mode == ListMode::Compound {
            let single_compound = list.selectors.len() == 1
                && !list.selectors[0]
                    .components
                    .iter()
                    .any(|c| matches!(c, Component::Combinator(_)));
            if !single_compound {
                return Err(SelectorError::invalid_construct(text));
            }
        }
        let complexes = list
            .selectors
            .iter()
            .map(|node| self.compile_complex(node, relative))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.push_list(complexes))
    }
}

enum PseudoElementKind {
    Slotted(CompoundId),
    Other(String),
}

fn namespace_constraint(prefix: Option<&NsPrefix>) -> NamespaceConstraint {
    match prefix {
        None => NamespaceConstraint::Default,
        Some(NsPrefix::Any) => NamespaceConstraint::Any,
        Some(NsPrefix::None) => NamespaceConstraint::None,
        Some(NsPrefix::Named(prefix)) => NamespaceConstraint::Prefix(prefix.clone()),
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// "the default namespace does not apply to attributes, therefore attribute
/// selectors without a namespace component apply only to attributes that
/// have no namespace"
fn compile_attribute(node: &AttributeNode) -> AttributeSelector {
    let namespace = match &node.prefix {
        None => NamespaceConstraint::None,
        prefix => namespace_constraint(prefix.as_ref()),
    };
    let (operator, value) = match &node.matcher {
        None => (AttrOperator::Exists, String::new()),
        Some((matcher, value)) => {
            let operator = match matcher {
                AttrMatcher::Equals => AttrOperator::Equals,
                AttrMatcher::Includes => AttrOperator::Includes,
                AttrMatcher::DashMatch => AttrOperator::DashMatch,
                AttrMatcher::Prefix => AttrOperator::Prefix,
                AttrMatcher::Suffix => AttrOperator::Suffix,
                AttrMatcher::Substring => AttrOperator::Substring,
            };
            (operator, value.clone())
        }
    };
    let case = match node.flag {
        None => AttrCase::Default,
        Some(AttrFlag::Insensitive) => AttrCase::Insensitive,
        Some(AttrFlag::Sensitive) => AttrCase::Sensitive,
    };
    AttributeSelector {
        namespace,
        name: node.name.clone(),
        lower_name: node.name.to_ascii_lowercase(),
        operator,
        value,
        case,
    }
}

/// [§ 7.1 `:dir()`](https://www.w3.org/TR/selectors-4/#the-dir-pseudo)
///
/// "Any identifier is valid as argument; invalid values simply do not match."
fn dir_argument(args: Option<&Arguments>, text: &str) -> Result<String> {
    let tokens = args.map(|a| trim(&a.tokens)).unwrap_or_default();
    match tokens {
        [Token {
            kind: TokenKind::Ident(ident),
            ..
        }] => Ok(ident.to_ascii_lowercase()),
        _ => Err(SelectorError::invalid_construct(text)),
    }
}

/// [§ 7.2 `:lang()`](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
///
/// "a comma-separated list of one or more language ranges as its argument.
/// Each language range in :lang() must be a valid CSS `<ident>` or
/// `<string>`."
///
/// An unquoted leading wildcard (`*-CH`) tokenizes as `*` followed by an
/// identifier and is accepted as one range.
fn lang_ranges(args: Option<&Arguments>, text: &str) -> Result<Vec<String>> {
    let args = args.ok_or_else(|| SelectorError::invalid_construct(text))?;
    split_list(&args.tokens)
        .into_iter()
        .map(|member| match trim(member) {
            [
                Token {
                    kind: TokenKind::Ident(range) | TokenKind::String(range),
                    ..
                },
            ] => Ok(range.clone()),
            [Token {
                kind: TokenKind::Delim('*'),
                ..
            }] => Ok("*".to_string()),
            [
                Token {
                    kind: TokenKind::Delim('*'),
                    ..
                },
                Token {
                    kind: TokenKind::Ident(rest),
                    ..
                },
            ] if rest.starts_with('-') => Ok(format!("*{rest}")),
            _ => Err(SelectorError::invalid_construct(text)),
        })
        .collect()
}
