//! Parser generator and the compiled LR automaton.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{BuildError, ParseError};
use crate::grammar::{self, END, Grammar, PrecedenceTable};
use crate::table::{self, Action};
use crate::token::Token;

/// A value on the parse stack: either a raw token shifted from the input or
/// the result of an earlier reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolValue<V> {
    Token(Token),
    Reduced(V),
}

impl<V> SymbolValue<V> {
    pub fn token(&self) -> Option<&Token> {
        match self {
            SymbolValue::Token(token) => Some(token),
            SymbolValue::Reduced(_) => None,
        }
    }

    pub fn into_token(self) -> Option<Token> {
        match self {
            SymbolValue::Token(token) => Some(token),
            SymbolValue::Reduced(_) => None,
        }
    }

    pub fn into_reduced(self) -> Option<V> {
        match self {
            SymbolValue::Token(_) => None,
            SymbolValue::Reduced(value) => Some(value),
        }
    }
}

/// Native reducer shape: state first, matched children second.
pub type Reducer<V, S> = Rc<dyn Fn(&mut S, Vec<SymbolValue<V>>) -> V>;

/// Accumulates productions and compiles them into an [`LRParser`].
pub struct ParserGenerator<V, S = ()> {
    tokens: Vec<String>,
    precedence: PrecedenceTable,
    rules: Vec<(String, Option<String>)>,
    reducers: Vec<Reducer<V, S>>,
}

impl<V, S> ParserGenerator<V, S> {
    pub fn new<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            precedence: PrecedenceTable::new(),
            rules: Vec::new(),
            reducers: Vec::new(),
        }
    }

    pub fn precedence(&mut self, table: PrecedenceTable) -> &mut Self {
        self.precedence = table;
        self
    }

    /// Registers a production for `rule` (`"LHS : SYM1 SYM2"` convention).
    /// Validation is deferred to [`build`](Self::build).
    pub fn production(
        &mut self,
        rule: &str,
        reducer: impl Fn(&mut S, Vec<SymbolValue<V>>) -> V + 'static,
    ) -> &mut Self {
        self.production_shared(rule, None, Rc::new(reducer))
    }

    pub fn production_with_precedence(
        &mut self,
        rule: &str,
        precedence_token: &str,
        reducer: impl Fn(&mut S, Vec<SymbolValue<V>>) -> V + 'static,
    ) -> &mut Self {
        self.production_shared(rule, Some(precedence_token), Rc::new(reducer))
    }

    /// Registers a production bound to an already-shared reducer, so one
    /// handler can serve several rules.
    pub fn production_shared(
        &mut self,
        rule: &str,
        precedence_token: Option<&str>,
        reducer: Reducer<V, S>,
    ) -> &mut Self {
        self.rules
            .push((rule.to_string(), precedence_token.map(str::to_string)));
        self.reducers.push(reducer);
        self
    }

    pub fn build(self) -> Result<LRParser<V, S>, BuildError> {
        let mut raw = Vec::with_capacity(self.rules.len());
        for (rule, precedence_token) in &self.rules {
            raw.push((grammar::parse_rule(rule)?, precedence_token.clone()));
        }
        let grammar = Grammar::build(&self.tokens, &raw, &self.precedence)?;
        let tables = table::build_tables(&grammar);

        // Production 0 is the augmented start rule; it is accepted, never
        // reduced, so it carries no reducer.
        let mut reducers: Vec<Option<Reducer<V, S>>> = Vec::with_capacity(self.reducers.len() + 1);
        reducers.push(None);
        reducers.extend(self.reducers.into_iter().map(Some));

        let prods = grammar
            .prods
            .iter()
            .map(|prod| (prod.lhs, prod.rhs.len()))
            .collect();

        Ok(LRParser {
            term_ids: grammar.term_ids,
            prods,
            actions: tables.actions,
            gotos: tables.gotos,
            reducers,
        })
    }
}

/// The compiled, immutable shift/reduce automaton.
///
/// Holds no per-parse state; one parser may drive any number of sequential
/// parses.
pub struct LRParser<V, S = ()> {
    term_ids: HashMap<String, u32>,
    /// `(lhs nonterminal, rhs length)` per production.
    prods: Vec<(u32, usize)>,
    actions: Vec<HashMap<u32, Action>>,
    gotos: Vec<HashMap<u32, u32>>,
    reducers: Vec<Option<Reducer<V, S>>>,
}

impl<V, S> LRParser<V, S> {
    /// Drives the automaton over `tokens`, threading `state` into every
    /// reducer call.
    pub fn parse<I, E>(&self, tokens: I, state: &mut S) -> Result<V, ParseError<E>>
    where
        I: IntoIterator<Item = Result<Token, E>>,
    {
        let mut input = tokens.into_iter();
        let mut stack: Vec<u32> = vec![0];
        let mut values: Vec<SymbolValue<V>> = Vec::new();
        let mut lookahead = match input.next() {
            Some(Ok(token)) => Some(token),
            Some(Err(e)) => return Err(ParseError::Stream(e)),
            None => None,
        };

        loop {
            let current = match stack.last() {
                Some(&s) => s as usize,
                None => unreachable!("parser state stack underflow"),
            };
            let terminal = match &lookahead {
                Some(token) => self.term_ids.get(&token.name).copied(),
                None => Some(END),
            };
            let Some(terminal) = terminal else {
                // A runtime token whose name the grammar never declared.
                return Err(match lookahead.take() {
                    Some(token) => ParseError::Unexpected(token),
                    None => ParseError::Exhausted,
                });
            };

            match self.actions[current].get(&terminal).copied() {
                None => {
                    return Err(match lookahead.take() {
                        Some(token) => ParseError::Unexpected(token),
                        None => ParseError::Exhausted,
                    });
                }
                Some(Action::Shift(next_state)) => {
                    let Some(token) = lookahead.take() else {
                        // $end is never a shiftable terminal.
                        return Err(ParseError::Exhausted);
                    };
                    stack.push(next_state);
                    values.push(SymbolValue::Token(token));
                    lookahead = match input.next() {
                        Some(Ok(token)) => Some(token),
                        Some(Err(e)) => return Err(ParseError::Stream(e)),
                        None => None,
                    };
                }
                Some(Action::Reduce(prod)) => {
                    let (lhs, rhs_len) = self.prods[prod as usize];
                    let children = values.split_off(values.len() - rhs_len);
                    stack.truncate(stack.len() - rhs_len);
                    let value = match &self.reducers[prod as usize] {
                        Some(reducer) => reducer(state, children),
                        None => unreachable!("augmented start rule is never reduced"),
                    };
                    let top = match stack.last() {
                        Some(&s) => s as usize,
                        None => unreachable!("parser state stack underflow"),
                    };
                    let goto = match self.gotos[top].get(&lhs) {
                        Some(&target) => target,
                        None => unreachable!("missing goto entry after reduction"),
                    };
                    stack.push(goto);
                    values.push(SymbolValue::Reduced(value));
                }
                Some(Action::Accept) => {
                    return match values.pop() {
                        Some(SymbolValue::Reduced(value)) => Ok(value),
                        _ => unreachable!("accept without a reduced start value"),
                    };
                }
            }
        }
    }
}
