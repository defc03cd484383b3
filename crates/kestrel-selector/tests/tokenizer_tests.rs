//! Integration tests for the CSS tokenizer.

use kestrel_selector::tokenizer::{CSSTokenizer, HashType, NumericType, TokenKind, tokenize};

/// Helper to tokenize a string and return the token kinds
fn kinds(input: &str) -> Vec<TokenKind> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run();
    tokenizer
        .into_stream()
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// ========== identifiers ==========

#[test]
fn test_whitespace_collapses() {
    let tokens = kinds("   \t\n  ");
    assert_eq!(tokens, vec![TokenKind::Whitespace]);
}

#[test]
fn test_ident() {
    let tokens = kinds("custom-element");
    assert_eq!(tokens, vec![TokenKind::Ident("custom-element".to_string())]);
}

#[test]
fn test_ident_with_escape() {
    let tokens = kinds("\\31 23");
    assert_eq!(tokens, vec![TokenKind::Ident("123".to_string())]);
    let tokens = kinds("a\\.b");
    assert_eq!(tokens, vec![TokenKind::Ident("a.b".to_string())]);
}

#[test]
fn test_function() {
    let tokens = kinds(":nth-child(");
    assert_eq!(tokens[0], TokenKind::Colon);
    assert_eq!(tokens[1], TokenKind::Function("nth-child".to_string()));
}

// ========== hashes ==========

#[test]
fn test_hash_id() {
    match &kinds("#header")[0] {
        TokenKind::Hash { value, hash_type } => {
            assert_eq!(value, "header");
            assert_eq!(*hash_type, HashType::Id);
        }
        other => panic!("Expected Hash token, got {other}"),
    }
}

#[test]
fn test_hash_unrestricted() {
    match &kinds("#1a")[0] {
        TokenKind::Hash { value, hash_type } => {
            assert_eq!(value, "1a");
            assert_eq!(*hash_type, HashType::Unrestricted);
        }
        other => panic!("Expected Hash token, got {other}"),
    }
}

#[test]
fn test_lone_hash_is_delim() {
    assert_eq!(kinds("# ")[0], TokenKind::Delim('#'));
}

// ========== numbers ==========

#[test]
fn test_number_flags() {
    match &kinds("+5")[0] {
        TokenKind::Number(n) => {
            assert_eq!(n.integer(), Some(5));
            assert!(n.signed);
        }
        other => panic!("Expected Number token, got {other}"),
    }
    match &kinds("-3.5")[0] {
        TokenKind::Number(n) => {
            assert_eq!(n.numeric_type, NumericType::Number);
            assert_eq!(n.integer(), None);
        }
        other => panic!("Expected Number token, got {other}"),
    }
}

#[test]
fn test_integer_saturates() {
    let integer = |input: &str| match &kinds(input)[0] {
        TokenKind::Number(n) => n.integer(),
        other => panic!("Expected Number token, got {other}"),
    };
    assert_eq!(integer("99999999999999999999"), Some(i64::from(i32::MAX)));
    assert_eq!(integer("-9223372036854775808"), Some(i64::from(i32::MIN)));
    assert_eq!(integer("+2147483647"), Some(i64::from(i32::MAX)));
}

#[test]
fn test_dimension_for_anb() {
    let tokens = kinds("2n+1");
    match &tokens[0] {
        TokenKind::Dimension { number, unit } => {
            assert_eq!(number.integer(), Some(2));
            assert_eq!(unit, "n");
        }
        other => panic!("Expected Dimension token, got {other}"),
    }
    assert!(matches!(&tokens[1], TokenKind::Number(n) if n.signed && n.integer() == Some(1)));

    match &kinds("-n-3")[0] {
        TokenKind::Ident(name) => assert_eq!(name, "-n-3"),
        other => panic!("Expected Ident token, got {other}"),
    }
}

// ========== strings ==========

#[test]
fn test_string_escapes() {
    assert_eq!(kinds("\"a\\\"b\"")[0], TokenKind::String("a\"b".to_string()));
    assert_eq!(kinds("'\\41 '")[0], TokenKind::String("A".to_string()));
}

#[test]
fn test_unterminated_string_closes_at_eof() {
    assert_eq!(kinds("'abc"), vec![TokenKind::String("abc".to_string())]);
}

#[test]
fn test_newline_in_string_is_bad_string() {
    assert_eq!(kinds("'a\nb'")[0], TokenKind::BadString);
}

// ========== comments and preprocessing ==========

#[test]
fn test_comments_are_skipped() {
    let tokens = kinds("a/* comment */b");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Ident("b".to_string()),
        ]
    );
}

#[test]
fn test_null_replaced() {
    assert_eq!(kinds("a\0")[0], TokenKind::Ident("a\u{FFFD}".to_string()));
}

#[test]
fn test_spans_cover_source() {
    let stream = tokenize("div > .item").unwrap();
    let n = stream.tokens.len();
    assert_eq!(stream.tokens[n - 1].span, 7..11);
    assert_eq!(stream.text_of(&stream.tokens[n - 2..]), ".item");
    assert_eq!(stream.text_of(&stream.tokens), "div > .item");
}

// ========== selector-level checks ==========

#[test]
fn test_tokenize_rejects_non_selector_tokens() {
    for input in ["a;", "{a}", "@media", "a <!--", "a -->", "a)", "[a)"] {
        let err = tokenize(input).unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid selector {input}"));
    }
}

#[test]
fn test_tokenize_accepts_implicitly_closed_blocks() {
    assert!(tokenize("[title=\"x").is_ok());
    assert!(tokenize(":is(a").is_ok());
}
