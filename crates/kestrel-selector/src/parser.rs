//! Selector grammar parser.
//!
//! [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
//!
//! Turns a token run into a generic parse tree: a list of complex selectors,
//! each a flat sequence of [`Component`]s. Only syntax is checked here;
//! pseudo-class names and functional arguments are left for the compiler,
//! which parses nested selector lists from the raw [`Arguments`] on demand.

use crate::error::{Result, SelectorError};
use crate::tokenizer::{HashType, Token, TokenKind, source_text};

/// [§ 18 `<selector-list>`](https://www.w3.org/TR/selectors-4/#typedef-selector-list)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorListNode {
    /// The comma-separated members, in source order.
    pub selectors: Vec<SelectorNode>,
}

/// One `<complex-selector>` (or `<relative-selector>`).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorNode {
    /// Simple selectors and combinators, left to right.
    pub components: Vec<Component>,
    /// The source text, without surrounding whitespace.
    pub text: String,
}

/// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsPrefix {
    /// `*|E`: any namespace, including none.
    Any,
    /// `|E`: no namespace.
    None,
    /// `ns|E`: the namespace bound to `ns`.
    Named(String),
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMatcher {
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

/// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrFlag {
    /// `i`
    Insensitive,
    /// `s`
    Sensitive,
}

/// A parsed `[...]` attribute selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNode {
    /// Namespace component, if written.
    pub prefix: Option<NsPrefix>,
    /// Attribute name as written.
    pub name: String,
    /// Operator and value, absent for `[att]`.
    pub matcher: Option<(AttrMatcher, String)>,
    /// Case-sensitivity modifier.
    pub flag: Option<AttrFlag>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorToken {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
    /// `||`
    Column,
}

/// Raw arguments of a functional pseudo-class or pseudo-element.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    /// Tokens between the parentheses.
    pub tokens: Vec<Token>,
    /// Their source text.
    pub text: String,
}

/// One element of a complex selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Type or universal selector; `name` is `None` for `*`.
    Type {
        /// Namespace component, if written.
        prefix: Option<NsPrefix>,
        /// Element name as written.
        name: Option<String>,
    },
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[...]`
    Attribute(AttributeNode),
    /// `:name` or `:name(...)`
    PseudoClass {
        /// Name as written.
        name: String,
        /// Arguments of the functional form.
        args: Option<Arguments>,
        /// Source text including the colon.
        text: String,
    },
    /// `::name`, `::name(...)`, or a legacy single-colon pseudo-element.
    PseudoElement {
        /// Name as written.
        name: String,
        /// Arguments of the functional form.
        args: Option<Arguments>,
        /// Written with a single colon.
        legacy: bool,
        /// Source text including the colons.
        text: String,
    },
    /// `&`
    Nesting,
    /// A combinator between two compounds, or leading a relative selector.
    Combinator(CombinatorToken),
}

impl Component {
    const fn is_combinator(&self) -> bool {
        matches!(self, Self::Combinator(_))
    }
}

/// Pseudo-elements that may be written with a single colon.
///
/// [§ 2.5 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

/// Parse a comma-separated selector list.
///
/// With `relative` set, each member may start with a combinator, as in the
/// argument of `:has()`.
pub fn parse_selector_list(
    tokens: &[Token],
    source: &[char],
    relative: bool,
) -> Result<SelectorListNode> {
    let selectors = split_list(tokens)
        .into_iter()
        .map(|member| parse_complex(member, source, relative))
        .collect::<Result<Vec<_>>>()?;
    Ok(SelectorListNode { selectors })
}

/// Split a token run on top-level commas.
///
/// Commas nested inside functions, parentheses or brackets do not split.
pub fn split_list(tokens: &[Token]) -> Vec<&[Token]> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Function(_) | TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                members.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    members.push(&tokens[start..]);
    members
}

/// Strip leading and trailing whitespace tokens.
pub fn trim(tokens: &[Token]) -> &[Token] {
    let start = tokens
        .iter()
        .position(|t| !t.kind.is_whitespace())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.kind.is_whitespace())
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// Parse one complex (or relative) selector.
pub fn parse_complex(tokens: &[Token], source: &[char], relative: bool) -> Result<SelectorNode> {
    let tokens = trim(tokens);
    let text = source_text(source, tokens);
    let mut parser = Parser {
        tokens,
        source,
        pos: 0,
        text: &text,
        components: Vec::new(),
        compound_len: 0,
        after_pseudo_element: false,
    };
    parser.run(relative)?;
    let components = parser.components;
    Ok(SelectorNode { components, text })
}

struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a [char],
    pos: usize,
    /// Text of the whole complex selector, for error messages.
    text: &'a str,
    components: Vec<Component>,
    /// Simple selectors in the current compound.
    compound_len: usize,
    after_pseudo_element: bool,
}

impl<'a> Parser<'a> {
    fn error(&self) -> SelectorError {
        SelectorError::invalid(self.text)
    }

    fn peek_kind(&self, offset: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn next_kind(&mut self) -> Option<&'a TokenKind> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(&token.kind)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_kind(0).is_some_and(TokenKind::is_whitespace) {
            self.pos += 1;
        }
    }

    /// [§ 18 `<complex-selector>`](https://www.w3.org/TR/selectors-4/#typedef-complex-selector)
    fn run(&mut self, relative: bool) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(self.error());
        }

        let mut pending_descendant = false;
        while let Some(kind) = self.peek_kind(0) {
            if kind.is_whitespace() {
                self.pos += 1;
                pending_descendant = self.compound_len > 0;
                continue;
            }

            if let Some(combinator) = self.peek_combinator() {
                // "<relative-selector> = <combinator>? <complex-selector>"
                let leading_ok = relative && self.components.is_empty();
                if self.compound_len == 0 && !leading_ok {
                    return Err(self.error());
                }
                self.pos += if combinator == CombinatorToken::Column { 2 } else { 1 };
                self.push_combinator(combinator);
                pending_descendant = false;
                continue;
            }

            if pending_descendant {
                self.push_combinator(CombinatorToken::Descendant);
                pending_descendant = false;
            }
            self.parse_simple()?;
        }

        // A combinator must be followed by a compound.
        if self.components.last().is_none_or(Component::is_combinator) {
            return Err(self.error());
        }
        Ok(())
    }

    fn push_combinator(&mut self, combinator: CombinatorToken) {
        self.components.push(Component::Combinator(combinator));
        self.compound_len = 0;
        self.after_pseudo_element = false;
    }

    fn peek_combinator(&self) -> Option<CombinatorToken> {
        match self.peek_kind(0)? {
            TokenKind::Delim('>') => Some(CombinatorToken::Child),
            TokenKind::Delim('+') => Some(CombinatorToken::NextSibling),
            TokenKind::Delim('~') => Some(CombinatorToken::SubsequentSibling),
            TokenKind::Delim('|') if self.peek_kind(1) == Some(&TokenKind::Delim('|')) => {
                Some(CombinatorToken::Column)
            }
            _ => None,
        }
    }

    fn push_simple(&mut self, component: Component) -> Result<()> {
        // After a pseudo-element only pseudo-classes and further
        // pseudo-elements may follow.
        if self.after_pseudo_element
            && !matches!(
                component,
                Component::PseudoClass { .. } | Component::PseudoElement { .. }
            )
        {
            return Err(self.error());
        }
        if matches!(component, Component::PseudoElement { .. }) {
            self.after_pseudo_element = true;
        }
        self.components.push(component);
        self.compound_len += 1;
        Ok(())
    }

    /// [§ 18 `<compound-selector>`](https://www.w3.org/TR/selectors-4/#typedef-compound-selector)
    fn parse_simple(&mut self) -> Result<()> {
        let Some(kind) = self.peek_kind(0).cloned() else {
            return Err(self.error());
        };
        match kind {
            TokenKind::Ident(_) | TokenKind::Delim('*' | '|') => {
                // "<type-selector>" comes first in a compound.
                if self.compound_len > 0 {
                    return Err(self.error());
                }
                let component = self.parse_type()?;
                self.push_simple(component)
            }
            TokenKind::Hash { value, hash_type } => {
                // "<id-selector> = <hash-token>", "the hash token's type flag must be 'id'"
                if hash_type != HashType::Id {
                    return Err(self.error());
                }
                self.pos += 1;
                self.push_simple(Component::Id(value))
            }
            TokenKind::Delim('.') => {
                self.pos += 1;
                match self.next_kind() {
                    Some(TokenKind::Ident(name)) => {
                        let name = name.clone();
                        self.push_simple(Component::Class(name))
                    }
                    _ => Err(self.error()),
                }
            }
            TokenKind::LeftBracket => {
                self.pos += 1;
                let attribute = self.parse_attribute()?;
                self.push_simple(Component::Attribute(attribute))
            }
            TokenKind::Colon => {
                let component = self.parse_pseudo()?;
                self.push_simple(component)
            }
            TokenKind::Delim('&') => {
                self.pos += 1;
                self.push_simple(Component::Nesting)
            }
            _ => Err(self.error()),
        }
    }

    /// [§ 18 `<type-selector>`](https://www.w3.org/TR/selectors-4/#typedef-type-selector)
    ///
    /// `<wq-name> | <ns-prefix>? '*'`, with `<ns-prefix> = [ <ident-token> | '*' ]? '|'`.
    fn parse_type(&mut self) -> Result<Component> {
        let name_of = |kind: Option<&TokenKind>| match kind {
            Some(TokenKind::Ident(name)) => Some(Some(name.clone())),
            Some(TokenKind::Delim('*')) => Some(None),
            _ => None,
        };

        if self.peek_kind(0) == Some(&TokenKind::Delim('|')) {
            let name = name_of(self.peek_kind(1)).ok_or_else(|| self.error())?;
            self.pos += 2;
            return Ok(Component::Type {
                prefix: Some(NsPrefix::None),
                name,
            });
        }

        let first = name_of(self.peek_kind(0)).ok_or_else(|| self.error())?;
        if self.peek_kind(1) == Some(&TokenKind::Delim('|')) {
            if let Some(name) = name_of(self.peek_kind(2)) {
                self.pos += 3;
                let prefix = first.map_or(NsPrefix::Any, NsPrefix::Named);
                return Ok(Component::Type {
                    prefix: Some(prefix),
                    name,
                });
            }
        }
        self.pos += 1;
        Ok(Component::Type {
            prefix: None,
            name: first,
        })
    }

    /// [§ 18 `<attribute-selector>`](https://www.w3.org/TR/selectors-4/#typedef-attribute-selector)
    ///
    /// The opening `[` has been consumed. A missing `]` at end of input is
    /// tolerated.
    fn parse_attribute(&mut self) -> Result<AttributeNode> {
        self.skip_whitespace();

        let ident_at = |parser: &Self, offset| match parser.peek_kind(offset) {
            Some(TokenKind::Ident(name)) => Some(name.clone()),
            _ => None,
        };
        let bar_at = |parser: &Self, offset| parser.peek_kind(offset) == Some(&TokenKind::Delim('|'));

        let (prefix, name) = if bar_at(self, 0) {
            let name = ident_at(self, 1).ok_or_else(|| self.error())?;
            self.pos += 2;
            (Some(NsPrefix::None), name)
        } else if self.peek_kind(0) == Some(&TokenKind::Delim('*')) {
            let name = bar_at(self, 1)
                .then(|| ident_at(self, 2))
                .flatten()
                .ok_or_else(|| self.error())?;
            self.pos += 3;
            (Some(NsPrefix::Any), name)
        } else {
            let first = ident_at(self, 0).ok_or_else(|| self.error())?;
            match (bar_at(self, 1), ident_at(self, 2)) {
                (true, Some(name)) => {
                    self.pos += 3;
                    (Some(NsPrefix::Named(first)), name)
                }
                _ => {
                    self.pos += 1;
                    (None, first)
                }
            }
        };

        self.skip_whitespace();
        let mut attribute = AttributeNode {
            prefix,
            name,
            matcher: None,
            flag: None,
        };

        let Some(kind) = self.next_kind().cloned() else {
            return Ok(attribute);
        };
        let matcher = match kind {
            TokenKind::RightBracket => return Ok(attribute),
            TokenKind::Delim('=') => AttrMatcher::Equals,
            TokenKind::Delim(c @ ('~' | '|' | '^' | '$' | '*'))
                if self.peek_kind(0) == Some(&TokenKind::Delim('=')) =>
            {
                self.pos += 1;
                match c {
                    '~' => AttrMatcher::Includes,
                    '|' => AttrMatcher::DashMatch,
                    '^' => AttrMatcher::Prefix,
                    '$' => AttrMatcher::Suffix,
                    _ => AttrMatcher::Substring,
                }
            }
            _ => return Err(self.error()),
        };

        self.skip_whitespace();
        let value = match self.next_kind() {
            Some(TokenKind::Ident(v) | TokenKind::String(v)) => v.clone(),
            _ => return Err(self.error()),
        };
        attribute.matcher = Some((matcher, value));

        self.skip_whitespace();
        if let Some(TokenKind::Ident(flag)) = self.peek_kind(0) {
            attribute.flag = Some(if flag.eq_ignore_ascii_case("i") {
                AttrFlag::Insensitive
            } else if flag.eq_ignore_ascii_case("s") {
                AttrFlag::Sensitive
            } else {
                return Err(self.error());
            });
            self.pos += 1;
            self.skip_whitespace();
        }

        match self.next_kind() {
            None | Some(TokenKind::RightBracket) => Ok(attribute),
            Some(_) => Err(self.error()),
        }
    }

    /// [§ 18 `<pseudo-class-selector>` / `<pseudo-element-selector>`](https://www.w3.org/TR/selectors-4/#typedef-pseudo-class-selector)
    ///
    /// "`<pseudo-class-selector> = ':' <ident-token> | ':' <function-token>
    /// <any-value> ')'`". No whitespace may follow the colon.
    fn parse_pseudo(&mut self) -> Result<Component> {
        let start = self.pos;
        self.pos += 1;
        let element = self.peek_kind(0) == Some(&TokenKind::Colon);
        if element {
            self.pos += 1;
        }

        let (name, args) = match self.next_kind().cloned() {
            Some(TokenKind::Ident(name)) => (name, None),
            Some(TokenKind::Function(name)) => {
                let args = self.consume_arguments();
                (name, Some(args))
            }
            _ => return Err(self.error()),
        };
        let text = source_text(self.source, &self.tokens[start..self.pos]);

        let legacy = !element
            && args.is_none()
            && LEGACY_PSEUDO_ELEMENTS
                .iter()
                .any(|legacy| name.eq_ignore_ascii_case(legacy));
        Ok(if element || legacy {
            Component::PseudoElement {
                name,
                args,
                legacy,
                text,
            }
        } else {
            Component::PseudoClass { name, args, text }
        })
    }

    /// Collect the balanced tokens of a function body. The function token
    /// has been consumed; the closing `)` is consumed if present.
    fn consume_arguments(&mut self) -> Arguments {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind(0) {
            if kind.opens_paren() {
                depth += 1;
            } else if *kind == TokenKind::RightParen {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            self.pos += 1;
        }
        let tokens = self.tokens[start..self.pos].to_vec();
        if self.peek_kind(0) == Some(&TokenKind::RightParen) {
            self.pos += 1;
        }
        let text = source_text(self.source, &tokens);
        Arguments { tokens, text }
    }
}
