use super::token::{CSSToken, HashType, NumericType};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// Turns stylesheet text into a flat token stream ending in [`CSSToken::EOF`].
/// Tokenization never fails: malformed input yields `<bad-string-token>` or
/// `<bad-url-token>`, which the parser reports.
pub struct CSSTokenizer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<CSSToken>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize `input` in one call.
    pub fn tokenize(input: &str) -> Vec<CSSToken> {
        let mut tokenizer = Self::new(input);
        tokenizer.run();
        tokenizer.into_tokens()
    }

    /// Consume tokens until EOF.
    pub fn run(&mut self) {
        loop {
            let token = self.consume_token();
            let done = token.is_eof();
            self.tokens.push(token);
            if done {
                break;
            }
        }
    }

    /// Return the collected tokens.
    pub fn into_tokens(self) -> Vec<CSSToken> {
        self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CSSToken {
        self.consume_comments();

        let Some(c) = self.consume() else {
            return CSSToken::EOF;
        };

        match c {
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CSSToken::Whitespace
            }
            '"' | '\'' => self.consume_string_token(c),
            '#' => {
                // "If the next input code point is an ident code point or the
                // next two input code points are a valid escape"
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let hash_type = if self.starts_ident_sequence(0) {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }
            '(' => CSSToken::LeftParen,
            ')' => CSSToken::RightParen,
            ',' => CSSToken::Comma,
            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,
            '[' => CSSToken::LeftBracket,
            ']' => CSSToken::RightBracket,
            '{' => CSSToken::LeftBrace,
            '}' => CSSToken::RightBrace,
            '+' | '.' => {
                self.reconsume();
                if self.starts_number() {
                    self.consume_numeric_token()
                } else {
                    let _ = self.consume();
                    CSSToken::Delim(c)
                }
            }
            '-' => {
                self.reconsume();
                if self.starts_number() {
                    self.consume_numeric_token()
                } else if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') {
                    self.position += 3;
                    CSSToken::CDC
                } else if self.starts_ident_sequence(0) {
                    self.consume_ident_like_token()
                } else {
                    let _ = self.consume();
                    CSSToken::Delim('-')
                }
            }
            '<' => {
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    self.position += 3;
                    CSSToken::CDO
                } else {
                    CSSToken::Delim('<')
                }
            }
            '@' => {
                if self.starts_ident_sequence(0) {
                    CSSToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CSSToken::Delim('@')
                }
            }
            '\\' => {
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // Parse error: lone backslash before a newline.
                    CSSToken::Delim('\\')
                }
            }
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }
            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }
            c => CSSToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// An unterminated comment runs to EOF.
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.position += 1;
                        break;
                    }
                    Some(_) => {}
                    None => return,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char) -> CSSToken {
        let mut value = String::new();
        loop {
            match self.consume() {
                // EOF inside a string is a parse error but still yields the string.
                None => return CSSToken::String(value),
                Some(c) if c == ending => return CSSToken::String(value),
                Some('\n') => {
                    // "Reconsume the current input code point, create a
                    // <bad-string-token>, and return it."
                    self.reconsume();
                    return CSSToken::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => self.position += 1,
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CSSToken {
        let (value, int_value, numeric_type) = self.consume_number();

        if self.starts_ident_sequence(0) {
            CSSToken::Dimension {
                value,
                int_value,
                numeric_type,
                unit: self.consume_ident_sequence(),
            }
        } else if self.peek() == Some('%') {
            self.position += 1;
            CSSToken::Percentage {
                value,
                int_value,
                numeric_type,
            }
        } else {
            CSSToken::Number {
                value,
                int_value,
                numeric_type,
            }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> CSSToken {
        let name = self.consume_ident_sequence();

        if self.peek() != Some('(') {
            return CSSToken::Ident(name);
        }
        self.position += 1;

        if !name.eq_ignore_ascii_case("url") {
            return CSSToken::Function(name);
        }

        // "While the next two input code points are whitespace, consume the
        // next input code point."
        let mut lookahead = 0;
        while self.peek_at(lookahead).is_some_and(is_whitespace) {
            lookahead += 1;
        }
        if matches!(self.peek_at(lookahead), Some('"' | '\'')) {
            // A quoted url is an ordinary function call.
            CSSToken::Function(name)
        } else {
            self.consume_url_token()
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> CSSToken {
        let mut value = String::new();
        self.consume_whitespace();

        loop {
            match self.consume() {
                Some(')') | None => return CSSToken::Url(value),
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    return match self.peek() {
                        Some(')') => {
                            self.position += 1;
                            CSSToken::Url(value)
                        }
                        None => CSSToken::Url(value),
                        Some(_) => self.consume_bad_url_remnants(),
                    };
                }
                Some('"' | '\'' | '(') => return self.consume_bad_url_remnants(),
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        value.push(self.consume_escaped_code_point());
                    } else {
                        return self.consume_bad_url_remnants();
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) -> CSSToken {
        loop {
            match self.consume() {
                Some(')') | None => return CSSToken::BadUrl,
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point();
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if is_ident_code_point(c) {
                result.push(c);
                self.position += 1;
            } else if is_valid_escape(Some(c), self.peek_at(1)) {
                self.position += 1;
                result.push(self.consume_escaped_code_point());
            } else {
                break;
            }
        }
        result
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, Option<i64>, NumericType) {
        let mut numeric_type = NumericType::Integer;
        let mut repr = String::new();

        if matches!(self.peek(), Some('+' | '-')) {
            self.take_into(&mut repr, 1);
        }
        self.take_digits_into(&mut repr);

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.take_into(&mut repr, 1);
            self.take_digits_into(&mut repr);
            numeric_type = NumericType::Number;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.take_into(&mut repr, digit_at);
                self.take_digits_into(&mut repr);
                numeric_type = NumericType::Number;
            }
        }

        let value = repr.parse().unwrap_or(0.0);
        let int_value = match numeric_type {
            NumericType::Integer => repr.parse().ok(),
            NumericType::Number => None,
        };
        (value, int_value, numeric_type)
    }

    fn take_into(&mut self, repr: &mut String, count: usize) {
        for _ in 0..count {
            if let Some(c) = self.consume() {
                repr.push(c);
            }
        }
    }

    fn take_digits_into(&mut self, repr: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            repr.push(c);
            self.position += 1;
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Called with the backslash already consumed.
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                while hex.len() < 6 {
                    match self.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            self.position += 1;
                        }
                        _ => break,
                    }
                }
                if self.peek().is_some_and(is_whitespace) {
                    self.position += 1;
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&cp| cp != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            Some(c) => c,
            None => '\u{FFFD}',
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_ident_sequence(&self, offset: usize) -> bool {
        match self.peek_at(offset) {
            Some('-') => {
                let second = self.peek_at(offset + 1);
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || is_valid_escape(second, self.peek_at(offset + 2))
            }
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(offset + 1)),
            Some(c) => is_ident_start_code_point(c),
            None => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn starts_number(&self) -> bool {
        let digit = |offset| self.peek_at(offset).is_some_and(|c: char| c.is_ascii_digit());
        match self.peek() {
            Some('+' | '-') => digit(1) || (self.peek_at(1) == Some('.') && digit(2)),
            Some('.') => digit(1),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second.is_some_and(|c| c != '\n')
}

/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
/// CR and FF are included because input is not preprocessed.
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
