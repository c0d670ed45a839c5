//! Tokenizer: compiles named and ignored pattern rules into a lazy token
//! stream producer.
//!
//! Rules match in declaration order; the first pattern that matches at the
//! cursor wins. A *suppressed* rule is matched like any forwarded rule (it
//! consumes input and participates in the ordering) but is stripped from the
//! stream handed to the parser. An *ignore* rule is never named at all and is
//! consumed directly by the lexer.

use std::collections::BTreeSet;

use parsekit_engine::{self as engine, LexerGenerator, PatternFlags, Token};

use crate::error::{Error, classify_build, classify_lex};

/// Prefix of the synthetic names assigned to suppressed rules. The counter is
/// owned by the constructing `Tokenizer`, so independent instances never
/// share numbering.
pub(crate) const SUPPRESSED_MARKER: &str = "__suppressed_";

/// A named or suppressed token pattern.
#[derive(Debug, Clone)]
pub struct TokenRule {
    name: Option<String>,
    pattern: String,
    flags: PatternFlags,
}

impl TokenRule {
    /// A forwarded token: matched and emitted under `name`.
    pub fn named(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pattern: pattern.into(),
            flags: PatternFlags::NONE,
        }
    }

    /// A suppressed token: matched and consumed, never emitted.
    pub fn suppressed(pattern: impl Into<String>) -> Self {
        Self {
            name: None,
            pattern: pattern.into(),
            flags: PatternFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: PatternFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// A pattern consumed during lexing without ever producing a token.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pattern: String,
    flags: PatternFlags,
}

impl IgnoreRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: PatternFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: PatternFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A compiled tokenizer. Each [`tokenize`](Tokenizer::tokenize) call
/// reconstructs the stream from the start of the text; no state is retained
/// between calls.
#[derive(Debug)]
pub struct Tokenizer {
    lexer: engine::Lexer,
    possible: BTreeSet<String>,
    has_suppressed: bool,
}

impl Tokenizer {
    pub fn new(rules: Vec<TokenRule>, ignore: Vec<IgnoreRule>) -> Result<Self, Error> {
        let mut lg = LexerGenerator::new();
        for rule in &ignore {
            lg.ignore_with_flags(&rule.pattern, rule.flags);
        }

        let mut possible = BTreeSet::new();
        let mut suppressed_index = 0usize;
        for rule in &rules {
            match &rule.name {
                Some(name) => {
                    if name.starts_with(SUPPRESSED_MARKER) {
                        return Err(Error::IllegalArgument(format!(
                            "token name '{}' uses the reserved suppressed-rule prefix",
                            name
                        )));
                    }
                    if !possible.insert(name.clone()) {
                        return Err(Error::IllegalArgument(format!(
                            "duplicate token name '{}'",
                            name
                        )));
                    }
                    lg.add_with_flags(name, &rule.pattern, rule.flags);
                }
                None => {
                    let synthetic = format!("{}{}", SUPPRESSED_MARKER, suppressed_index);
                    suppressed_index += 1;
                    lg.add_with_flags(&synthetic, &rule.pattern, rule.flags);
                }
            }
        }

        let lexer = lg.build().map_err(classify_build)?;
        Ok(Self {
            lexer,
            possible,
            has_suppressed: suppressed_index > 0,
        })
    }

    /// The set of forwarded token names, for downstream grammar validation.
    pub fn possible_tokens(&self) -> &BTreeSet<String> {
        &self.possible
    }

    /// Produces a lazy token stream over `text`. Suppressed matches are
    /// consumed but filtered out before the stream reaches the caller.
    pub fn tokenize<'t, 's>(&'t self, text: &'s str) -> TokenStream<'t, 's> {
        TokenStream {
            inner: self.lexer.lex(text),
            source: text,
            filter_suppressed: self.has_suppressed,
        }
    }
}

/// Lazy stream of forwarded tokens; lexing failures surface as
/// [`Error::Lexing`] with the offending character attached.
#[derive(Debug)]
pub struct TokenStream<'t, 's> {
    inner: engine::LexerStream<'t, 's>,
    source: &'s str,
    filter_suppressed: bool,
}

impl Iterator for TokenStream<'_, '_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(token) if self.filter_suppressed && token.name.starts_with(SUPPRESSED_MARKER) => {
                    continue;
                }
                Ok(token) => return Some(Ok(token)),
                Err(e) => return Some(Err(classify_lex(e, Some(self.source)))),
            }
        }
    }
}
