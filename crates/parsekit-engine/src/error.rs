use std::fmt;

use crate::token::Token;

/// Failure raised while compiling a lexer or parser table.
#[derive(Debug)]
pub enum BuildError {
    /// The grammar contains no productions at all.
    EmptyGrammar,
    /// A rule string does not follow the `LHS : SYM1 SYM2` convention.
    MalformedRule(String),
    /// A rule's left-hand side collides with a declared token name.
    LhsIsToken { name: String },
    /// A right-hand-side symbol is neither a declared token nor the
    /// left-hand side of any production.
    UndefinedSymbol { name: String, rule: String },
    /// A token pattern failed to compile.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    /// A production names a precedence token missing from the precedence table.
    UnknownPrecedence { rule: String, token: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::EmptyGrammar => {
                write!(f, "grammar contains no productions")
            }
            BuildError::MalformedRule(rule) => {
                write!(f, "malformed production rule '{}'", rule)
            }
            BuildError::LhsIsToken { name } => {
                write!(f, "rule left-hand side '{}' is a declared token", name)
            }
            BuildError::UndefinedSymbol { name, rule } => {
                write!(
                    f,
                    "symbol '{}' in rule '{}' is neither a declared token nor a production",
                    name, rule
                )
            }
            BuildError::InvalidPattern { pattern, source } => {
                write!(f, "invalid token pattern '{}': {}", pattern, source)
            }
            BuildError::UnknownPrecedence { rule, token } => {
                write!(
                    f,
                    "precedence token '{}' for rule '{}' is not in the precedence table",
                    token, rule
                )
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// No lexer pattern matched at `position` (a byte offset into the source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub position: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no token pattern matched at offset {}", self.position)
    }
}

impl std::error::Error for LexError {}

/// Structured failure from [`LRParser::parse`](crate::parser::LRParser::parse).
///
/// `E` is the error type of the token iterator driving the parse; lexing
/// failures travel through it unchanged via the `Stream` variant.
#[derive(Debug)]
pub enum ParseError<E> {
    /// Input ended before the grammar reached an accepting state.
    Exhausted,
    /// An interior token had no valid automaton action.
    Unexpected(Token),
    /// The token iterator itself failed.
    Stream(E),
}

impl<E: fmt::Display> fmt::Display for ParseError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Exhausted => {
                write!(f, "tokens were exhausted before the grammar could accept")
            }
            ParseError::Unexpected(token) => {
                write!(f, "no automaton action for token {}", token)
            }
            ParseError::Stream(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ParseError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Stream(e) => Some(e),
            _ => None,
        }
    }
}
