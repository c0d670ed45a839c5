//! Parser facade: imperative rule registration over the grammar engine plus
//! the caller-facing error policy.

use std::rc::Rc;

use parsekit_engine::{
    self as engine, LRParser, ParserGenerator, PrecedenceTable, SymbolValue, Token,
};

use crate::error::{BoxedError, Error, classify_build};

/// Rule strings must contain this separator between LHS and RHS.
pub const RULE_SEPARATOR: &str = " : ";

/// Caller-facing reducer shape: matched children first, threaded state last.
pub type Reducer<V, S> = Rc<dyn Fn(Vec<SymbolValue<V>>, &mut S) -> V>;

/// Callback invoked for an unexpected interior token. Returning `Err`
/// surfaces the payload as [`Error::Handler`]; returning `Ok` falls through
/// to the standard parsing diagnostic.
pub type ErrorHandler = Rc<dyn Fn(&Token) -> Result<(), BoxedError>>;

/// Builds an [`Automaton`] from imperatively registered productions.
///
/// Consumed by [`build`](Parser::build); rebuilding after rules change
/// requires a fresh `Parser`.
pub struct Parser<V, S = ()> {
    generator: ParserGenerator<V, S>,
    handler: Option<ErrorHandler>,
}

impl<V: 'static, S: 'static> Parser<V, S> {
    pub fn new<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            generator: ParserGenerator::new(tokens),
            handler: None,
        }
    }

    pub fn with_precedence<I>(tokens: I, table: PrecedenceTable) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut parser = Self::new(tokens);
        parser.precedence(table);
        parser
    }

    pub fn precedence(&mut self, table: PrecedenceTable) -> &mut Self {
        self.generator.precedence(table);
        self
    }

    /// Registers a production. The rule string must follow the
    /// `"LHS : SYM1 SYM2"` convention; a missing separator fails immediately.
    pub fn production(
        &mut self,
        rule: &str,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Result<&mut Self, Error> {
        self.production_shared(rule, None, Rc::new(reducer))
    }

    pub fn production_with_precedence(
        &mut self,
        rule: &str,
        precedence_token: &str,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Result<&mut Self, Error> {
        self.production_shared(rule, Some(precedence_token), Rc::new(reducer))
    }

    /// Registers a production bound to a shared reducer, so one handler can
    /// serve several near-identical rules.
    pub fn production_shared(
        &mut self,
        rule: &str,
        precedence_token: Option<&str>,
        reducer: Reducer<V, S>,
    ) -> Result<&mut Self, Error> {
        if !rule.contains(RULE_SEPARATOR) {
            return Err(Error::IllegalArgument(format!(
                "rule '{}' must contain the '{}' separator",
                rule, RULE_SEPARATOR
            )));
        }
        // The engine's native reducers take state first; the public
        // convention is children first, state last.
        let adapted = move |state: &mut S, children: Vec<SymbolValue<V>>| reducer(children, state);
        self.generator
            .production_shared(rule, precedence_token, Rc::new(adapted));
        Ok(self)
    }

    /// Registers an empty production. A bare nonterminal name is rewritten to
    /// the `"NAME : "` form; the bound reducer produces `V::default()`.
    pub fn empty_production(&mut self, name_or_rule: &str) -> Result<&mut Self, Error>
    where
        V: Default,
    {
        let rule = if name_or_rule.contains(RULE_SEPARATOR) {
            name_or_rule.to_string()
        } else {
            format!("{}{}", name_or_rule.trim(), RULE_SEPARATOR)
        };
        self.production_shared(&rule, None, Rc::new(|_children, _state: &mut S| V::default()))
    }

    /// Installs the user error callback; each call replaces the previous one.
    pub fn error(&mut self, handler: impl Fn(&Token) -> Result<(), BoxedError> + 'static) -> &mut Self {
        self.handler = Some(Rc::new(handler));
        self
    }

    pub(crate) fn error_shared(&mut self, handler: ErrorHandler) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// Compiles the automaton, validating the grammar. Referencing a terminal
    /// never declared in `tokens` fails with
    /// [`Error::ParsingTokenUndefined`] naming the symbol.
    pub fn build(self) -> Result<Automaton<V, S>, Error> {
        let inner = self.generator.build().map_err(classify_build)?;
        Ok(Automaton {
            inner,
            handler: self.handler,
        })
    }
}

/// The compiled, immutable parsing automaton plus the error policy wrapped
/// around it. Reusable for any number of sequential parses.
pub struct Automaton<V, S = ()> {
    inner: LRParser<V, S>,
    handler: Option<ErrorHandler>,
}

impl<V, S> Automaton<V, S> {
    /// Drives the automaton over `tokens`, threading `state` into every
    /// reducer call (pass `&mut ()` when no state is needed).
    ///
    /// Error policy:
    /// - the synthetic end-of-input marker with no valid action always raises
    ///   [`Error::ParsingTokensExhausted`]; the user handler is never
    ///   consulted for this case
    /// - any other unmatched token invokes the user handler if installed; a
    ///   handler error surfaces as [`Error::Handler`], and otherwise a typed
    ///   [`Error::Parsing`] is always raised
    pub fn parse<I, E>(&self, tokens: I, state: &mut S) -> Result<V, Error>
    where
        I: IntoIterator<Item = Result<Token, E>>,
        E: Into<Error>,
    {
        match self.inner.parse(tokens, state) {
            Ok(value) => Ok(value),
            Err(engine::ParseError::Exhausted) => Err(Error::ParsingTokensExhausted),
            Err(engine::ParseError::Unexpected(token)) => {
                if let Some(handler) = &self.handler {
                    handler(&token).map_err(Error::Handler)?;
                }
                Err(Error::Parsing { token: Some(token) })
            }
            Err(engine::ParseError::Stream(e)) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_separator_is_illegal_argument() {
        let mut parser: Parser<i64> = Parser::new(["NUMBER"]);
        let result = parser.production("expr NUMBER", |_, _| 0);
        assert!(matches!(result, Err(Error::IllegalArgument(_))));
    }

    #[test]
    fn test_empty_production_rewrites_bare_name() {
        let mut parser: Parser<i64> = Parser::new(["NUMBER"]);
        parser
            .production("goal : opt NUMBER", |_, _| 1)
            .unwrap()
            .empty_production("  opt  ")
            .unwrap();
        let automaton = parser.build().unwrap();

        let tokens = vec![Ok::<_, Error>(Token::new("NUMBER", "1", 0))];
        assert_eq!(automaton.parse(tokens, &mut ()).unwrap(), 1);
    }

    #[test]
    fn test_zero_productions_fail_to_build() {
        let parser: Parser<i64> = Parser::new(["NUMBER"]);
        match parser.build() {
            Err(Error::IllegalArgument(message)) => {
                assert!(message.contains("at least one production"));
            }
            other => panic!("expected IllegalArgument, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_undefined_terminal_is_reported_by_name() {
        let mut parser: Parser<i64> = Parser::new(["NUMBER"]);
        parser.production("expr : NUMBER SEMI", |_, _| 0).unwrap();
        match parser.build() {
            Err(Error::ParsingTokenUndefined { name }) => assert_eq!(name, "SEMI"),
            other => panic!("expected ParsingTokenUndefined, got {:?}", other.map(|_| ())),
        }
    }
}
