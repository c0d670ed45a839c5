//! Grammar rule registry: declarative rule harvesting from a definition type.
//!
//! A parser-definition type implements [`ParserDefinition`] and returns its
//! rules as an explicit [`GrammarRules`] value. [`compile`] feeds the harvest
//! through the [`Parser`](crate::parser::Parser) facade and returns a ready
//! [`Automaton`].

use std::rc::Rc;

use parsekit_engine::{PrecedenceTable, SymbolValue, Token};

use crate::error::{BoxedError, Error};
use crate::parser::{Automaton, ErrorHandler, Parser, Reducer};

/// A type that declares a grammar: productions, optional empty productions,
/// and at most one error handler.
pub trait ParserDefinition {
    type Value: 'static;
    type State: 'static;

    fn grammar(&self) -> GrammarRules<Self::Value, Self::State>;
}

struct RuleEntry<V, S> {
    rule: String,
    precedence_token: Option<String>,
    reducer: Reducer<V, S>,
}

/// The ordered harvest of rule declarations. Assembled fluently; rule strings
/// are validated when the harvest is compiled, not at registration time.
pub struct GrammarRules<V, S = ()> {
    entries: Vec<RuleEntry<V, S>>,
    handler: Option<ErrorHandler>,
    handler_conflict: bool,
}

impl<V: 'static, S: 'static> GrammarRules<V, S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            handler: None,
            handler_conflict: false,
        }
    }

    pub fn production(
        mut self,
        rule: &str,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Self {
        self.entries.push(RuleEntry {
            rule: rule.to_string(),
            precedence_token: None,
            reducer: Rc::new(reducer),
        });
        self
    }

    pub fn production_with_precedence(
        mut self,
        rule: &str,
        precedence_token: &str,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Self {
        self.entries.push(RuleEntry {
            rule: rule.to_string(),
            precedence_token: Some(precedence_token.to_string()),
            reducer: Rc::new(reducer),
        });
        self
    }

    /// Registers one reducer under several rule strings (fan-out), so
    /// near-identical alternatives can share reduction logic.
    pub fn production_group<'r>(
        mut self,
        rules: impl IntoIterator<Item = &'r str>,
        reducer: impl Fn(Vec<SymbolValue<V>>, &mut S) -> V + 'static,
    ) -> Self {
        let shared: Reducer<V, S> = Rc::new(reducer);
        for rule in rules {
            self.entries.push(RuleEntry {
                rule: rule.to_string(),
                precedence_token: None,
                reducer: Rc::clone(&shared),
            });
        }
        self
    }

    /// Registers an empty production for `name`. No reducer parameter: an
    /// empty production matches nothing, so there is nothing to aggregate and
    /// the bound reducer always yields `V::default()`.
    pub fn empty_production(mut self, name: &str) -> Self
    where
        V: Default,
    {
        let rule = if name.contains(crate::parser::RULE_SEPARATOR) {
            name.to_string()
        } else {
            format!("{}{}", name.trim(), crate::parser::RULE_SEPARATOR)
        };
        self.entries.push(RuleEntry {
            rule,
            precedence_token: None,
            reducer: Rc::new(|_children, _state: &mut S| V::default()),
        });
        self
    }

    /// Installs the error handler. Exactly one handler is meaningful per
    /// grammar; a second registration is a build-time conflict reported by
    /// [`compile`].
    pub fn error_handler(
        mut self,
        handler: impl Fn(&Token) -> Result<(), BoxedError> + 'static,
    ) -> Self {
        if self.handler.is_some() {
            self.handler_conflict = true;
        }
        self.handler = Some(Rc::new(handler));
        self
    }

    /// Feeds the harvest through the parser facade and compiles it.
    pub fn compile<I>(self, tokens: I, precedence: Option<PrecedenceTable>) -> Result<Automaton<V, S>, Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.handler_conflict {
            return Err(Error::IllegalArgument(
                "more than one error handler registered; exactly one is allowed".into(),
            ));
        }
        let mut parser = Parser::new(tokens);
        if let Some(table) = precedence {
            parser.precedence(table);
        }
        for entry in self.entries {
            parser.production_shared(
                &entry.rule,
                entry.precedence_token.as_deref(),
                entry.reducer,
            )?;
        }
        if let Some(handler) = self.handler {
            parser.error_shared(handler);
        }
        parser.build()
    }
}

impl<V: 'static, S: 'static> Default for GrammarRules<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Harvests `definition`'s rules and compiles them into an [`Automaton`] over
/// the given terminal names.
pub fn compile<D, I>(
    definition: &D,
    tokens: I,
    precedence: Option<PrecedenceTable>,
) -> Result<Automaton<D::Value, D::State>, Error>
where
    D: ParserDefinition,
    I: IntoIterator,
    I::Item: Into<String>,
{
    definition.grammar().compile(tokens, precedence)
}
