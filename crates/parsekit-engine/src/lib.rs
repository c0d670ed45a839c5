//! # parsekit-engine
//!
//! The grammar engine behind `parsekit`: a regex-backed lexer generator and a
//! runtime LALR(1) parser generator.
//!
//! ## Overview
//!
//! - **[`LexerGenerator`]**: turns ordered token/ignore patterns into a
//!   [`Lexer`] producing a lazy token stream
//! - **[`ParserGenerator`]**: turns `"LHS : SYM1 SYM2"` rule strings plus
//!   reducers into an [`LRParser`] (the compiled automaton)
//! - **Structured failures**: every error is a plain data variant
//!   ([`BuildError`], [`LexError`], [`ParseError`]); policy such as user
//!   error callbacks lives in the front-end crate
//!
//! ## Architecture
//!
//! ```text
//! patterns ──> LexerGenerator ──> Lexer ──> Result<Token, LexError> stream
//! rules    ──> ParserGenerator ──> LRParser ──> parse(stream, &mut state)
//! ```
//!
//! The end of input is represented by the reserved terminal
//! [`END_TOKEN_NAME`] (`"$end"`); reaching it without an accepting action is
//! reported as [`ParseError::Exhausted`].

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod token;

mod table;

pub use error::{BuildError, LexError, ParseError};
pub use grammar::{Assoc, END_TOKEN_NAME, PrecedenceTable};
pub use lexer::{Lexer, LexerGenerator, LexerStream, PatternFlags};
pub use parser::{LRParser, ParserGenerator, Reducer, SymbolValue};
pub use token::Token;
