//! [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
//!
//! "Several things in CSS, such as the :nth-child() pseudoclass, need to
//! indicate indexes in a list. The An+B microsyntax is useful for this,
//! allowing an author to easily indicate single elements or all elements
//! at regularly-spaced intervals in a list."
//!
//! The microsyntax is defined over tokens, not characters: `2n+1` arrives as
//! a `<dimension-token>` followed by a signed `<number-token>`, while `2n +
//! 1` puts a `<delim-token>` between them.

use crate::tokenizer::{Numeric, Token, TokenKind};

/// A parsed `An+B` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnB {
    /// Step.
    pub a: i64,
    /// Offset.
    pub b: i64,
}

impl AnB {
    /// Create a formula.
    #[must_use]
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }

    /// Does some `n >= 0` satisfy `a*n + b == position`?
    ///
    /// Positions are 1-based.
    #[must_use]
    pub fn matches(self, position: i64) -> bool {
        let a = i128::from(self.a);
        let diff = i128::from(position) - i128::from(self.b);
        if a == 0 {
            return diff == 0;
        }
        diff % a == 0 && diff / a >= 0
    }
}

/// Parse An+B from a token run (surrounding whitespace allowed).
///
/// Returns `None` when the tokens do not form a valid An+B.
#[must_use]
pub fn parse_anb(tokens: &[Token]) -> Option<AnB> {
    let kinds: Vec<&TokenKind> = tokens
        .iter()
        .map(|t| &t.kind)
        .skip_while(|k| k.is_whitespace())
        .collect();
    let mut cursor = Cursor { kinds, pos: 0 };
    let anb = cursor.parse()?;
    cursor.skip_whitespace();
    cursor.at_end().then_some(anb)
}

struct Cursor<'a> {
    kinds: Vec<&'a TokenKind>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a TokenKind> {
        let kind = self.kinds.get(self.pos).copied()?;
        self.pos += 1;
        Some(kind)
    }

    fn peek(&self) -> Option<&'a TokenKind> {
        self.kinds.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(TokenKind::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.kinds.len()
    }

    fn parse(&mut self) -> Option<AnB> {
        match self.next()? {
            // "odd" / "even"
            TokenKind::Ident(ident) if ident.eq_ignore_ascii_case("odd") => Some(AnB::new(2, 1)),
            TokenKind::Ident(ident) if ident.eq_ignore_ascii_case("even") => Some(AnB::new(2, 0)),

            // "<integer>"
            TokenKind::Number(number) => Some(AnB::new(0, number.integer()?)),

            // "<n-dimension>", "<ndash-dimension>", "<ndashdigit-dimension>"
            TokenKind::Dimension { number, unit } => {
                let a = number.integer()?;
                self.after_n(a, &unit.to_ascii_lowercase())
            }

            // "'+'? n", "-n", and their dashed forms; no whitespace after '+'.
            TokenKind::Delim('+') => match self.next()? {
                TokenKind::Ident(ident) if !ident.starts_with('-') => {
                    self.after_n(1, &ident.to_ascii_lowercase())
                }
                _ => None,
            },
            TokenKind::Ident(ident) => {
                let ident = ident.to_ascii_lowercase();
                match ident.strip_prefix('-') {
                    Some(rest) => self.after_n(-1, rest),
                    None => self.after_n(1, &ident),
                }
            }
            _ => None,
        }
    }

    /// `unit` is what follows the coefficient: `n`, `n-`, or `n-<digits>`.
    fn after_n(&mut self, a: i64, unit: &str) -> Option<AnB> {
        let rest = unit.strip_prefix('n')?;
        match rest {
            "" => self.offset().map(|b| AnB::new(a, b)),
            "-" => {
                // "<ndash-dimension> <signless-integer>"
                self.skip_whitespace();
                let b = self.signless_integer()?;
                Some(AnB::new(a, -b))
            }
            digits => {
                // "<ndashdigit-dimension>" / "<ndashdigit-ident>"
                let digits = digits.strip_prefix('-')?;
                if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let b = Numeric::clamp_integer(digits);
                Some(AnB::new(a, -b))
            }
        }
    }

    /// The optional `+ B` / `- B` / `<signed-integer>` after `An`.
    fn offset(&mut self) -> Option<i64> {
        self.skip_whitespace();
        match self.peek() {
            None => Some(0),
            Some(TokenKind::Number(number)) if number.signed => {
                self.pos += 1;
                number.integer()
            }
            Some(TokenKind::Delim(sign @ ('+' | '-'))) => {
                self.pos += 1;
                self.skip_whitespace();
                let b = self.signless_integer()?;
                Some(if *sign == '-' { -b } else { b })
            }
            Some(_) => None,
        }
    }

    fn signless_integer(&mut self) -> Option<i64> {
        match self.next()? {
            TokenKind::Number(number) if !number.signed => number.integer(),
            _ => None,
        }
    }
}
