// ✂️ Tokenizer - word-level splitting of document text
//
// A token is a run of letters/digits, optionally joined by inner punctuation
// ("120,000", "company's", "U.S"), with an optional leading currency symbol
// and an optional trailing percent sign. Everything else delimits.

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$€£¥]?[\p{L}\p{N}]+(?:[.,'’\-][\p{L}\p{N}]+)*%?")
        .expect("token pattern is valid")
});

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

// ============================================================================
// TOKENIZER
// ============================================================================

/// Stateless word tokenizer. Cheap to copy, safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer
    }

    /// Split text into tokens, preserving order and original case
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Number of tokens without allocating them
    pub fn count(&self, text: &str) -> usize {
        TOKEN_REGEX.find_iter(text).count()
    }
}

/// Convenience wrapper over the default tokenizer
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer.tokenize(text)
}

// ============================================================================
// TOKEN SHAPE
// ============================================================================

/// Coarse shape of a numeric token, used as a classifier feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    Money,
    Percent,
    Year,
    Number,
}

impl TokenShape {
    pub fn of(token: &str) -> Option<TokenShape> {
        if let Some(rest) = token.strip_prefix(CURRENCY_SYMBOLS) {
            return is_numeric(rest).then_some(TokenShape::Money);
        }

        if let Some(rest) = token.strip_suffix('%') {
            return is_numeric(rest).then_some(TokenShape::Percent);
        }

        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            if token.len() == 4 && (token.starts_with('1') || token.starts_with('2')) {
                return Some(TokenShape::Year);
            }
            return Some(TokenShape::Number);
        }

        None
    }

    /// Feature name; the '#' prefix can never collide with a token
    pub fn feature(&self) -> &'static str {
        match self {
            TokenShape::Money => "#money",
            TokenShape::Percent => "#percent",
            TokenShape::Year => "#year",
            TokenShape::Number => "#number",
        }
    }
}

fn is_numeric(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

// ============================================================================
// TESTS
// ============================================================================
