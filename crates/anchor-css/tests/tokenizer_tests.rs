//! Integration tests for the CSS tokenizer.

use anchor_css::tokenizer::{CSSToken, CSSTokenizer, HashType, NumericType};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<CSSToken> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

#[test]
fn test_whitespace() {
    let tokens = tokenize("   \t\n  ");
    assert_eq!(tokens.len(), 2); // whitespace + EOF
    assert!(matches!(tokens[0], CSSToken::Whitespace));
    assert!(matches!(tokens[1], CSSToken::EOF));
}

#[test]
fn test_dashed_ident() {
    let tokens = tokenize("--my-anchor");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        CSSToken::Ident(name) => assert_eq!(name, "--my-anchor"),
        other => panic!("Expected Ident token, got {other:?}"),
    }
}

#[test]
fn test_anchor_function() {
    let tokens = tokenize("anchor(--btn bottom)");
    assert_eq!(tokens[0], CSSToken::Function("anchor".to_string()));
    assert_eq!(tokens[1], CSSToken::ident("--btn"));
    assert_eq!(tokens[2], CSSToken::Whitespace);
    assert_eq!(tokens[3], CSSToken::ident("bottom"));
    assert_eq!(tokens[4], CSSToken::RightParen);
    assert!(tokens[5].is_eof());
}

#[test]
fn test_hash_id() {
    let tokens = tokenize("#popup");
    match &tokens[0] {
        CSSToken::Hash { value, hash_type } => {
            assert_eq!(value, "popup");
            assert_eq!(*hash_type, HashType::Id);
        }
        other => panic!("Expected Hash token, got {other:?}"),
    }
}

#[test]
fn test_hash_unrestricted() {
    let tokens = tokenize("#123");
    assert!(matches!(
        &tokens[0],
        CSSToken::Hash {
            hash_type: HashType::Unrestricted,
            ..
        }
    ));
}

#[test]
fn test_dimension_and_percentage() {
    let tokens = tokenize("12px 50%");
    match &tokens[0] {
        CSSToken::Dimension {
            value,
            int_value,
            numeric_type,
            unit,
        } => {
            assert!((value - 12.0).abs() < f64::EPSILON);
            assert_eq!(*int_value, Some(12));
            assert_eq!(*numeric_type, NumericType::Integer);
            assert_eq!(unit, "px");
        }
        other => panic!("Expected Dimension token, got {other:?}"),
    }
    match &tokens[2] {
        CSSToken::Percentage { value, .. } => assert!((value - 50.0).abs() < f64::EPSILON),
        other => panic!("Expected Percentage token, got {other:?}"),
    }
}

#[test]
fn test_decimal_number() {
    let tokens = tokenize("0.5");
    assert!(matches!(
        &tokens[0],
        CSSToken::Number {
            numeric_type: NumericType::Number,
            int_value: None,
            ..
        }
    ));
}

#[test]
fn test_comments_are_skipped() {
    let tokens = tokenize("a/* comment */b");
    assert_eq!(tokens[0], CSSToken::ident("a"));
    assert_eq!(tokens[1], CSSToken::ident("b"));
}

#[test]
fn test_string_and_bad_string() {
    let tokens = tokenize("'ok'");
    assert_eq!(tokens[0], CSSToken::String("ok".to_string()));

    let tokens = tokenize("'broken\n'");
    assert_eq!(tokens[0], CSSToken::BadString);
    assert!(tokens[0].is_error());
}

#[test]
fn test_url_token() {
    let tokens = tokenize("url(a.png)");
    assert_eq!(tokens[0], CSSToken::Url("a.png".to_string()));

    let tokens = tokenize("url(a b)");
    assert_eq!(tokens[0], CSSToken::BadUrl);
}

#[test]
fn test_at_keyword() {
    let tokens = tokenize("@position-try");
    assert_eq!(tokens[0], CSSToken::AtKeyword("position-try".to_string()));
}

#[test]
fn test_escaped_ident() {
    let tokens = tokenize(r"\31 23");
    assert_eq!(tokens[0], CSSToken::ident("123"));
}

#[test]
fn test_display_round_trips_tokens() {
    let text = "calc(anchor(--a top) + 12px)";
    let serialized: String = tokenize(text).iter().map(ToString::to_string).collect();
    assert_eq!(serialized, text);
}

#[test]
fn test_display_escapes_idents() {
    assert_eq!(CSSToken::ident("123").to_string(), r"\31 23");
    assert_eq!(CSSToken::ident("--a").to_string(), "--a");
}
