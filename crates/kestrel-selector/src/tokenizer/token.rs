//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: `<ident-token>`, `<function-token>`, `<at-keyword-token>`,
//! `<hash-token>`, `<string-token>`, `<bad-string-token>`, `<url-token>`,
//! `<bad-url-token>`, `<delim-token>`, `<number-token>`, `<percentage-token>`,
//! `<dimension-token>`, `<whitespace-token>`, `<CDO-token>`, `<CDC-token>`,
//! `<colon-token>`, `<semicolon-token>`, `<comma-token>`, `<[-token>`,
//! `<]-token>`, `<(-token>`, `<)-token>`, `<{-token>`, and `<}-token>`."
//!
//! Each token records the span of source code points it was consumed from,
//! so the parser can hand the original text of a sub-selector to error
//! messages and to functional pseudo-class arguments.

use core::fmt;
use core::ops::Range;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// "id" - the hash token's value is a valid identifier
    Id,
    /// "unrestricted" - the hash token's value is not a valid identifier
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<number-token>` has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// "integer" - the number is an integer
    Integer,
    /// "number" - the number has a decimal point or exponent
    Number,
}

/// The numeric part shared by number, percentage and dimension tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeric {
    /// "a numeric value"
    pub value: f64,
    /// The integer value if this is an integer type.
    pub int_value: Option<i64>,
    /// "a type flag set to either 'integer' or 'number'"
    pub numeric_type: NumericType,
    /// Whether the representation began with `+` or `-`.
    ///
    /// [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
    /// distinguishes `<signed-integer>` from `<signless-integer>`.
    pub signed: bool,
}

impl Numeric {
    /// Parse the integer representation `[+-]?[0-9]+`, saturating to the
    /// `i32` range.
    ///
    /// [§ 4.3.13 Convert a string to a number](https://www.w3.org/TR/css-syntax-3/#convert-string-to-number)
    /// leaves range to the implementation; clamped values keep `An+B`
    /// arithmetic in bounds.
    #[must_use]
    pub fn clamp_integer(repr: &str) -> i64 {
        let clamped = match repr.parse::<i64>() {
            Ok(value) => value,
            Err(_) if repr.starts_with('-') => i64::MIN,
            Err(_) => i64::MAX,
        };
        clamped.clamp(i64::from(i32::MIN), i64::from(i32::MAX))
    }

    /// The value as an integer, when the type flag is "integer".
    #[must_use]
    pub const fn integer(&self) -> Option<i64> {
        match self.numeric_type {
            NumericType::Integer => self.int_value,
            NumericType::Number => None,
        }
    }
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// Each variant corresponds to a token type in the railroad diagrams.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// "`<ident-token>`"
    Ident(String),
    /// "`<function-token>`", the name without the opening parenthesis
    Function(String),
    /// "`<at-keyword-token>`"
    AtKeyword(String),
    /// "`<hash-token>`"
    Hash {
        /// "a value composed of one or more code points"
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },
    /// "`<string-token>`"
    String(String),
    /// "`<bad-string-token>`"
    BadString,
    /// "`<url-token>`"
    Url(String),
    /// "`<bad-url-token>`"
    BadUrl,
    /// "`<delim-token>`"
    Delim(char),
    /// "`<number-token>`"
    Number(Numeric),
    /// "`<percentage-token>`"
    Percentage(Numeric),
    /// "`<dimension-token>`"
    Dimension {
        /// Numeric value and flags.
        number: Numeric,
        /// "a unit"
        unit: String,
    },
    /// "`<whitespace-token>`"
    Whitespace,
    /// "`<CDO-token>`"
    Cdo,
    /// "`<CDC-token>`"
    Cdc,
    /// "`<colon-token>`"
    Colon,
    /// "`<semicolon-token>`"
    Semicolon,
    /// "`<comma-token>`"
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
}

impl TokenKind {
    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Returns true if this token is the delimiter `c`.
    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        *self == Self::Delim(c)
    }

    /// Returns true if this token opens a block that a `)` closes.
    #[must_use]
    pub const fn opens_paren(&self) -> bool {
        matches!(self, Self::Function(_) | Self::LeftParen)
    }
}

/// A token together with the code-point range it was consumed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Code-point offsets into the preprocessed input.
    pub span: Range<usize>,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "<ident:{v}>"),
            Self::Function(v) => write!(f, "<function:{v}(>"),
            Self::AtKeyword(v) => write!(f, "<at-keyword:@{v}>"),
            Self::Hash { value, hash_type } => {
                let t = match hash_type {
                    HashType::Id => "id",
                    HashType::Unrestricted => "unrestricted",
                };
                write!(f, "<hash:#{value} ({t})>")
            }
            Self::String(v) => write!(f, "<string:\"{v}\">"),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(v) => write!(f, "<url:{v}>"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "<delim:{c}>"),
            Self::Number(n) => write!(f, "<number:{}>", n.value),
            Self::Percentage(n) => write!(f, "<percentage:{}%>", n.value),
            Self::Dimension { number, unit } => write!(f, "<dimension:{}{unit}>", number.value),
            Self::Whitespace => write!(f, "<whitespace>"),
            Self::Cdo => write!(f, "<CDO>"),
            Self::Cdc => write!(f, "<CDC>"),
            Self::Colon => write!(f, "<colon>"),
            Self::Semicolon => write!(f, "<semicolon>"),
            Self::Comma => write!(f, "<comma>"),
            Self::LeftBracket => write!(f, "<[>"),
            Self::RightBracket => write!(f, "<]>"),
            Self::LeftParen => write!(f, "<(>"),
            Self::RightParen => write!(f, "<)>"),
            Self::LeftBrace => write!(f, "<{{>"),
            Self::RightBrace => write!(f, "<}}>"),
        }
    }
}
