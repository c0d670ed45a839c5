//! Staged compiler builder: a monotonic lexer-then-parser construction chain.
//!
//! The builder moves through three phases. Pattern registration is only legal
//! while building the lexer, production registration only after
//! [`add_lex`](CompilerBuilder::add_lex), and [`parse`](CompilerBuilder::parse)
//! retires the builder. Any call arriving out of phase fails with
//! [`Error::IllegalState`] naming both phases.

use std::fmt;

use parsekit_engine::{PatternFlags, PrecedenceTable, SymbolValue, Token};

use crate::error::{BoxedError, Error};
use crate::parser::Parser;
use crate::tokenizer::{IgnoreRule, TokenRule, Tokenizer};

/// The construction phase a [`CompilerBuilder`] is in. Transitions are
/// one-way: `BuildingLexer → BuildingParser → ParsingComplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    BuildingLexer,
    BuildingParser,
    ParsingComplete,
}

impl fmt::Display for BuilderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuilderPhase::BuildingLexer => "building-lexer",
            BuilderPhase::BuildingParser => "building-parser",
            BuilderPhase::ParsingComplete => "parsing-complete",
        })
    }
}

struct LexedInput<V, S> {
    tokenizer: Tokenizer,
    source: String,
    parser: Parser<V, S>,
}

/// Assembles a lexer, then a parser, then runs a single parse, in that order.
///
/// Fluent registration methods consume and return the builder, so a phase
/// violation poisons the whole chain at the point it occurs.
pub struct CompilerBuilder<V, S = ()> {
    phase: BuilderPhase,
    token_rules: Vec<TokenRule>,
    ignore_rules: Vec<IgnoreRule>,
    lexed: Option<LexedInput<V, S>>,
}

impl<V: 'static, S: 'static> CompilerBuilder<V, S> {
    pub fn new() -> Self {
        Self {
            phase: BuilderPhase::BuildingLexer,
            token_rules: Vec::new(),
            ignore_rules: Vec::new(),
            lexed: None,
        }
    }

    pub fn phase(&self) -> BuilderPhase {
        self.phase
    }

    fn verify(&self, expected: BuilderPhase) -> Result<(), Error> {
        if self.phase != expected {
            return Err(Error::IllegalState {
                expected,
                found: self.phase,
            });
        }
        Ok(())
    }

    pub fn add_pattern(self, name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, Error> {
        self.add_pattern_with_flags(name, pattern, PatternFlags::NONE)
    }

    pub fn add_pattern_with_flags(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        flags: PatternFlags,
    ) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingLexer)?;
        self.token_rules
            .push(TokenRule::named(name, pattern).with_flags(flags));
        Ok(self)
    }

    pub fn add_ignore_pattern(mut self, pattern: impl Into<String>) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingLexer)?;
        self.ignore_rules.push(IgnoreRule::new(pattern));
        Ok(self)
    }

    /// Finalizes the lexer, stores `source` for lazy tokenization at parse
    /// time, and opens the parser-building phase.
    pub fn add_lex(mut self, source: impl Into<String>) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingLexer)?;
        let rules = std::mem::take(&mut self.token_rules);
        let ignore = std::mem::take(&mut self.ignore_rules);
        let tokenizer = Tokenizer::new(rules, ignore)?;
        let parser = Parser::new(tokenizer.possible_tokens().iter().cloned());
        self.lexed = Some(LexedInput {
            tokenizer,
            source: source.into(),
            parser,
        });
        self.phase = BuilderPhase::BuildingParser;
        Ok(self)
    }

    pub fn add_production(
        mut self,
        rule: &str,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingParser)?;
        self.lexed_mut().parser.production(rule, reducer)?;
        Ok(self)
    }

    /// Registers an empty production; a bare nonterminal name is rewritten to
    /// the `"NAME : "` form.
    pub fn add_empty_production(mut self, name_or_rule: &str) -> Result<Self, Error>
    where
        V: Default,
    {
        self.verify(BuilderPhase::BuildingParser)?;
        self.lexed_mut().parser.empty_production(name_or_rule)?;
        Ok(self)
    }

    pub fn set_precedence(mut self, table: PrecedenceTable) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingParser)?;
        self.lexed_mut().parser.precedence(table);
        Ok(self)
    }

    /// Installs the parse error callback; each call replaces the previous
    /// handler.
    pub fn set_error_handler(
        mut self,
        handler: impl Fn(&Token) -> Result<(), BoxedError> + 'static,
    ) -> Result<Self, Error> {
        self.verify(BuilderPhase::BuildingParser)?;
        self.lexed_mut().parser.error(handler);
        Ok(self)
    }

    /// Compiles the automaton, tokenizes the stored source lazily, and drives
    /// the parse. The builder is retired afterwards whether or not the parse
    /// succeeds.
    pub fn parse(&mut self, state: &mut S) -> Result<V, Error> {
        self.verify(BuilderPhase::BuildingParser)?;
        self.phase = BuilderPhase::ParsingComplete;
        let Some(lexed) = self.lexed.take() else {
            unreachable!("parser phase without a finalized lexer");
        };
        let automaton = lexed.parser.build()?;
        let stream = lexed.tokenizer.tokenize(&lexed.source);
        automaton.parse(stream, state)
    }

    fn lexed_mut(&mut self) -> &mut LexedInput<V, S> {
        match self.lexed.as_mut() {
            Some(lexed) => lexed,
            None => unreachable!("parser phase without a finalized lexer"),
        }
    }
}

impl<V: 'static, S: 'static> Default for CompilerBuilder<V, S> {
    fn default() -> Self {
        Self::new()
    }
}
