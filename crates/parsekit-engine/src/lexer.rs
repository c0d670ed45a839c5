//! Regex-backed lexer generator.
//!
//! Rules are tried in declaration order and the first pattern that matches at
//! the cursor wins; there is no longest-match tie-break. Ignore patterns are
//! consumed between tokens and never emitted.

use regex::{Regex, RegexBuilder};

use crate::error::{BuildError, LexError};
use crate::token::Token;

/// Regex compilation flags for a single pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
}

impl PatternFlags {
    pub const NONE: PatternFlags = PatternFlags {
        case_insensitive: false,
        multi_line: false,
        dot_matches_new_line: false,
    };

    pub fn case_insensitive() -> Self {
        PatternFlags {
            case_insensitive: true,
            ..PatternFlags::NONE
        }
    }
}

#[derive(Debug, Clone)]
struct RuleSpec {
    name: Option<String>,
    pattern: String,
    flags: PatternFlags,
}

/// Collects token and ignore patterns and compiles them into a [`Lexer`].
#[derive(Debug, Default)]
pub struct LexerGenerator {
    rules: Vec<RuleSpec>,
}

impl LexerGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a forwarded token rule. Declaration order is authoritative.
    pub fn add(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.add_with_flags(name, pattern, PatternFlags::NONE)
    }

    pub fn add_with_flags(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        flags: PatternFlags,
    ) -> &mut Self {
        self.rules.push(RuleSpec {
            name: Some(name.into()),
            pattern: pattern.into(),
            flags,
        });
        self
    }

    /// Declares an ignore rule: matched input is consumed and discarded.
    pub fn ignore(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.ignore_with_flags(pattern, PatternFlags::NONE)
    }

    pub fn ignore_with_flags(
        &mut self,
        pattern: impl Into<String>,
        flags: PatternFlags,
    ) -> &mut Self {
        self.rules.push(RuleSpec {
            name: None,
            pattern: pattern.into(),
            flags,
        });
        self
    }

    pub fn build(&self) -> Result<Lexer, BuildError> {
        let mut ignores = Vec::new();
        let mut rules = Vec::new();
        for spec in &self.rules {
            let regex = compile_anchored(&spec.pattern, spec.flags)?;
            match &spec.name {
                Some(name) => rules.push((name.clone(), regex)),
                None => ignores.push(regex),
            }
        }
        Ok(Lexer { rules, ignores })
    }
}

fn compile_anchored(pattern: &str, flags: PatternFlags) -> Result<Regex, BuildError> {
    let anchored = format!(r"\A(?:{})", pattern);
    RegexBuilder::new(&anchored)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_matches_new_line)
        .build()
        .map_err(|source| BuildError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// A compiled lexer. `lex` may be called any number of times; each call
/// produces a fresh stream starting at the beginning of the text.
#[derive(Debug)]
pub struct Lexer {
    rules: Vec<(String, Regex)>,
    ignores: Vec<Regex>,
}

impl Lexer {
    pub fn lex<'l, 's>(&'l self, source: &'s str) -> LexerStream<'l, 's> {
        LexerStream {
            lexer: self,
            source,
            pos: 0,
            failed: false,
        }
    }
}

/// Lazy token stream over one source text.
#[derive(Debug)]
pub struct LexerStream<'l, 's> {
    lexer: &'l Lexer,
    source: &'s str,
    pos: usize,
    failed: bool,
}

impl LexerStream<'_, '_> {
    /// Byte offset of the next unconsumed character.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for LexerStream<'_, '_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        'scan: loop {
            if self.pos >= self.source.len() {
                return None;
            }
            let rest = &self.source[self.pos..];
            for ignore in &self.lexer.ignores {
                if let Some(m) = ignore.find(rest) {
                    // Zero-width matches would stall the cursor.
                    if m.end() > 0 {
                        self.pos += m.end();
                        continue 'scan;
                    }
                }
            }
            for (name, regex) in &self.lexer.rules {
                if let Some(m) = regex.find(rest) {
                    if m.end() == 0 {
                        continue;
                    }
                    let token = Token::new(name.clone(), &rest[..m.end()], self.pos);
                    self.pos += m.end();
                    return Some(Ok(token));
                }
            }
            self.failed = true;
            return Some(Err(LexError { position: self.pos }));
        }
    }
}
