//! # ParseKit
//!
//! A declarative front-end for building lexers and LALR(1) parsers.
//!
//! ## Overview
//!
//! This crate layers a typed, ergonomic API over the [`parsekit_engine`]
//! grammar engine:
//!
//! - **Tokenizer**: ordered named/ignored/suppressed pattern rules compiled
//!   into a lazy token stream
//! - **Parser facade**: imperative production registration, precedence, and a
//!   caller-owned error policy around the compiled automaton
//! - **Rule registry**: declarative grammar harvesting from a
//!   [`ParserDefinition`] type
//! - **Staged builder**: a phase-checked lexer-then-parser construction chain
//! - **Error classifier**: every engine failure surfaces as a typed
//!   [`Error`] variant, never an opaque string
//!
//! ## Architecture
//!
//! ```text
//! TokenRule / IgnoreRule
//!     ↓
//! Tokenizer (tokenize)
//!     ↓
//! TokenStream ── lazy Result<Token, Error>
//!     ↓
//! Automaton (parse, threading &mut state into reducers)
//!     ↓
//! V (your value type)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use parsekit::{Parser, Tokenizer, TokenRule, IgnoreRule};
//!
//! let tokenizer = Tokenizer::new(
//!     vec![
//!         TokenRule::named("NUMBER", r"\d+"),
//!         TokenRule::named("PLUS", r"\+"),
//!     ],
//!     vec![IgnoreRule::new(r"\s+")],
//! )
//! .unwrap();
//!
//! let mut parser: Parser<i64> = Parser::new(["NUMBER", "PLUS"]);
//! parser
//!     .production("expr : expr PLUS NUMBER", |mut children, _| {
//!         let lhs = children.remove(0).into_reduced().unwrap();
//!         let rhs: i64 = children[1].token().unwrap().value.parse().unwrap();
//!         lhs + rhs
//!     })
//!     .unwrap()
//!     .production("expr : NUMBER", |children, _| {
//!         children[0].token().unwrap().value.parse().unwrap()
//!     })
//!     .unwrap();
//! let automaton = parser.build().unwrap();
//!
//! let result = automaton.parse(tokenizer.tokenize("1 + 2 + 3"), &mut ());
//! assert_eq!(result.unwrap(), 6);
//! ```

pub mod builder;
pub mod error;
pub mod parser;
pub mod registry;
pub mod tokenizer;

pub use builder::{BuilderPhase, CompilerBuilder};
pub use error::{BoxedError, Error, display_message};
pub use parser::{Automaton, ErrorHandler, Parser, RULE_SEPARATOR, Reducer};
pub use registry::{GrammarRules, ParserDefinition, compile};
pub use tokenizer::{IgnoreRule, TokenRule, TokenStream, Tokenizer};

pub use parsekit_engine::{
    Assoc, END_TOKEN_NAME, PatternFlags, PrecedenceTable, SymbolValue, Token,
};
