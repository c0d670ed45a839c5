//! The diagnostic taxonomy surfaced to callers, and the classifier that maps
//! engine-level failures onto it.
//!
//! Classification is structural: every engine call is wrapped at the
//! `tokenize`/`parse` boundary and its typed failure variants are translated
//! here. No failure is swallowed or retried; every raised diagnostic is fatal
//! to the current attempt.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use parsekit_engine as engine;

use crate::builder::BuilderPhase;

/// Custom error payload raised by a user-supplied parse error handler.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    /// No token pattern matched at `position`; `character` is the offending
    /// character when the source text was available for enrichment.
    Lexing {
        position: usize,
        character: Option<char>,
    },
    /// An interior token had no valid automaton action.
    Parsing { token: Option<engine::Token> },
    /// Input ended before the grammar reached an accepting state.
    ParsingTokensExhausted,
    /// A production referenced a terminal never declared to the tokenizer.
    ParsingTokenUndefined { name: String },
    /// The error raised by a user-supplied parse error handler.
    Handler(BoxedError),
    /// A staged-builder call arrived in the wrong construction phase.
    IllegalState {
        expected: BuilderPhase,
        found: BuilderPhase,
    },
    /// A malformed rule string or otherwise invalid configuration.
    IllegalArgument(String),
}

impl Error {
    /// Whether this diagnostic belongs to the parsing family
    /// (general, tokens-exhausted, or token-undefined).
    pub fn is_parsing(&self) -> bool {
        matches!(
            self,
            Error::Parsing { .. }
                | Error::ParsingTokensExhausted
                | Error::ParsingTokenUndefined { .. }
        )
    }

    pub fn is_lexing(&self) -> bool {
        matches!(self, Error::Lexing { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexing {
                position,
                character: Some(c),
            } => {
                write!(
                    f,
                    "no token pattern matched character '{}' at offset {}",
                    c, position
                )
            }
            Error::Lexing {
                position,
                character: None,
            } => {
                write!(f, "no token pattern matched at offset {}", position)
            }
            Error::Parsing { token: Some(token) } => {
                write!(
                    f,
                    "parsing failed at token {}: the token could not be matched to any production rule",
                    token
                )
            }
            Error::Parsing { token: None } => {
                write!(f, "parsing failed: a token had no matching production rule")
            }
            Error::ParsingTokensExhausted => {
                write!(
                    f,
                    "tokens were exhausted before the grammar reached an accepting state; \
                     the production rules did not match the full input"
                )
            }
            Error::ParsingTokenUndefined { name } => {
                write!(
                    f,
                    "a production rule references token '{}' which is not in the set of possible tokens",
                    name
                )
            }
            Error::Handler(e) => {
                write!(f, "parse error handler raised: {}", display_message(&**e))
            }
            Error::IllegalState { expected, found } => {
                write!(
                    f,
                    "operation requires the {} phase but the builder is in the {} phase",
                    expected, found
                )
            }
            Error::IllegalArgument(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Handler(e) => Some(&**e as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<engine::LexError> for Error {
    fn from(e: engine::LexError) -> Self {
        classify_lex(e, None)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(e: std::convert::Infallible) -> Self {
        match e {}
    }
}

/// Maps an engine build failure onto the caller-facing taxonomy.
pub(crate) fn classify_build(e: engine::BuildError) -> Error {
    match e {
        engine::BuildError::UndefinedSymbol { name, .. } => Error::ParsingTokenUndefined { name },
        engine::BuildError::EmptyGrammar => {
            Error::IllegalArgument("grammar must contain at least one production".into())
        }
        other => Error::IllegalArgument(other.to_string()),
    }
}

/// Maps an engine lexing failure, enriching it with the offending character
/// when the source text is still at hand.
pub(crate) fn classify_lex(e: engine::LexError, source: Option<&str>) -> Error {
    let character = source.and_then(|s| s.get(e.position..)).and_then(|rest| rest.chars().next());
    Error::Lexing {
        position: e.position,
        character,
    }
}

static TYPE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:Error|Exception):\s*").unwrap());

/// Extracts a human-readable message from a foreign error, stripping a
/// leading `"<TypeName>: "` prefix when its default rendering carries one.
/// Falls back to the raw rendering when stripping would leave nothing.
pub fn display_message(e: &dyn std::error::Error) -> String {
    let raw = e.to_string();
    match TYPE_PREFIX.find(&raw) {
        Some(m) if m.end() < raw.len() => raw[m.end()..].to_string(),
        _ => raw,
    }
}
