//! SQL `LIKE` pattern handling
//!
//! Patterns follow PostgreSQL semantics: `%` matches any run of characters,
//! `_` matches exactly one, and a backslash makes the next character literal.
//! A pattern ending in a lone backslash is malformed, as it is in the store.

use thiserror::Error;

/// Escape character used by every generated `LIKE` clause
pub const LIKE_ESCAPE: char = '\\';

/// A pattern that cannot be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("LIKE pattern must not end with escape character: {0:?}")]
pub struct PatternError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

/// A parsed `LIKE` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    tokens: Vec<Token>,
}

impl LikePattern {
    /// Parses a case-sensitive pattern
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let token = match c {
                '%' => Token::AnyRun,
                '_' => Token::AnyOne,
                LIKE_ESCAPE => match chars.next() {
                    Some(escaped) => Token::Literal(escaped),
                    None => return Err(PatternError(pattern.to_string())),
                },
                other => Token::Literal(other),
            };
            tokens.push(token);
        }
        Ok(Self { tokens })
    }

    /// Returns true if the whole of `text` matches the pattern
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let (mut t, mut p) = (0usize, 0usize);
        // Resume point of the most recent `%`: (token after it, text position it absorbed up to)
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::AnyOne) => {
                    p += 1;
                    t += 1;
                    continue;
                }
                Some(Token::Literal(c)) if *c == text[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                Some(Token::AnyRun) => {
                    backtrack = Some((p + 1, t));
                    p += 1;
                    continue;
                }
                _ => {}
            }

            match backtrack {
                Some((resume, absorbed)) => {
                    p = resume;
                    t = absorbed + 1;
                    backtrack = Some((resume, absorbed + 1));
                }
                None => return false,
            }
        }

        self.tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}

/// Evaluates `text LIKE pattern`
pub fn like(pattern: &str, text: &str) -> Result<bool, PatternError> {
    Ok(LikePattern::parse(pattern)?.matches(text))
}

/// Evaluates `LOWER(text) LIKE LOWER(pattern)`
pub fn ilike(pattern: &str, text: &str) -> Result<bool, PatternError> {
    Ok(LikePattern::parse(&pattern.to_lowercase())?.matches(&text.to_lowercase()))
}

/// Escapes the wildcard and escape characters of a literal value
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Pattern matching `value` as a literal substring
pub fn containing(value: &str) -> String {
    format!("%{}%", escape_like(value))
}
