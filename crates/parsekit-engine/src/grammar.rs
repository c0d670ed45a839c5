//! Symbol interning, rule-string parsing, and grammar analysis (nullability
//! and FIRST sets) feeding the table builder.

use std::collections::{BTreeSet, HashMap};

use smallvec::{SmallVec, smallvec};

use crate::error::BuildError;

/// Name of the synthetic end-of-input terminal.
pub const END_TOKEN_NAME: &str = "$end";

/// Name of the augmented start symbol.
pub(crate) const ACCEPT_SYMBOL: &str = "$accept";

/// Terminal id of [`END_TOKEN_NAME`]; always interned first.
pub(crate) const END: u32 = 0;

/// Associativity of a precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Ordered associativity declarations used to resolve shift/reduce conflicts.
///
/// Levels pushed later bind tighter: `PrecedenceTable::new().left(["PLUS"])
/// .left(["TIMES"])` gives multiplication the stronger binding.
#[derive(Debug, Clone, Default)]
pub struct PrecedenceTable {
    pub(crate) levels: Vec<(Assoc, Vec<String>)>,
}

impl PrecedenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left<I>(mut self, tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.levels
            .push((Assoc::Left, tokens.into_iter().map(Into::into).collect()));
        self
    }

    pub fn right<I>(mut self, tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.levels
            .push((Assoc::Right, tokens.into_iter().map(Into::into).collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn level_of(&self, token: &str) -> Option<(usize, Assoc)> {
        self.levels
            .iter()
            .enumerate()
            .find_map(|(level, (assoc, tokens))| {
                tokens
                    .iter()
                    .any(|t| t == token)
                    .then_some((level, *assoc))
            })
    }
}

/// Interned grammar symbol: terminal or nonterminal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Sym {
    T(u32),
    N(u32),
}

/// A rule string split into its parts, prior to symbol resolution.
#[derive(Debug, Clone)]
pub(crate) struct RawRule {
    pub lhs: String,
    pub rhs: Vec<String>,
    pub text: String,
}

/// Parses the `"LHS : SYM1 SYM2 ..."` convention. An empty right-hand side is
/// written `"LHS : "`.
pub(crate) fn parse_rule(rule: &str) -> Result<RawRule, BuildError> {
    let Some((lhs, rhs)) = rule.split_once(':') else {
        return Err(BuildError::MalformedRule(rule.to_string()));
    };
    let lhs = lhs.trim();
    if lhs.is_empty() || lhs.split_whitespace().count() != 1 {
        return Err(BuildError::MalformedRule(rule.to_string()));
    }
    Ok(RawRule {
        lhs: lhs.to_string(),
        rhs: rhs.split_whitespace().map(str::to_string).collect(),
        text: rule.trim().to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct Prod {
    pub lhs: u32,
    pub rhs: SmallVec<[Sym; 4]>,
    /// Resolved precedence level of the rule, if any.
    pub prec: Option<(usize, Assoc)>,
}

#[derive(Debug)]
pub(crate) struct Grammar {
    pub term_ids: HashMap<String, u32>,
    /// Precedence level per terminal id.
    pub term_prec: Vec<Option<(usize, Assoc)>>,
    /// Productions; index 0 is the augmented `$accept` rule.
    pub prods: Vec<Prod>,
    /// Production indices grouped by left-hand-side nonterminal.
    pub prods_of: Vec<Vec<u32>>,
    pub nullable: Vec<bool>,
    /// FIRST sets (terminal ids) per nonterminal.
    pub first: Vec<BTreeSet<u32>>,
}

impl Grammar {
    pub(crate) fn build(
        tokens: &[String],
        rules: &[(RawRule, Option<String>)],
        precedence: &PrecedenceTable,
    ) -> Result<Grammar, BuildError> {
        if rules.is_empty() {
            return Err(BuildError::EmptyGrammar);
        }

        let mut terminals = vec![END_TOKEN_NAME.to_string()];
        let mut term_ids = HashMap::new();
        term_ids.insert(END_TOKEN_NAME.to_string(), END);
        for token in tokens {
            if token != END_TOKEN_NAME && !term_ids.contains_key(token) {
                term_ids.insert(token.clone(), terminals.len() as u32);
                terminals.push(token.clone());
            }
        }

        let mut nonterminals = vec![ACCEPT_SYMBOL.to_string()];
        let mut nonterm_ids = HashMap::new();
        nonterm_ids.insert(ACCEPT_SYMBOL.to_string(), 0u32);
        for (raw, _) in rules {
            if term_ids.contains_key(&raw.lhs) {
                return Err(BuildError::LhsIsToken {
                    name: raw.lhs.clone(),
                });
            }
            if !nonterm_ids.contains_key(&raw.lhs) {
                nonterm_ids.insert(raw.lhs.clone(), nonterminals.len() as u32);
                nonterminals.push(raw.lhs.clone());
            }
        }

        let mut term_prec = vec![None; terminals.len()];
        for (level, (assoc, names)) in precedence.levels.iter().enumerate() {
            for name in names {
                if let Some(&id) = term_ids.get(name) {
                    term_prec[id as usize] = Some((level, *assoc));
                }
            }
        }

        let start = nonterm_ids[&rules[0].0.lhs];
        let mut prods = vec![Prod {
            lhs: 0,
            rhs: smallvec![Sym::N(start)],
            prec: None,
        }];
        for (raw, prec_name) in rules {
            let mut rhs: SmallVec<[Sym; 4]> = SmallVec::with_capacity(raw.rhs.len());
            for name in &raw.rhs {
                if let Some(&t) = term_ids.get(name) {
                    rhs.push(Sym::T(t));
                } else if let Some(&n) = nonterm_ids.get(name) {
                    rhs.push(Sym::N(n));
                } else {
                    return Err(BuildError::UndefinedSymbol {
                        name: name.clone(),
                        rule: raw.text.clone(),
                    });
                }
            }
            let prec = match prec_name {
                Some(token) => match precedence.level_of(token) {
                    Some(level) => Some(level),
                    None => {
                        return Err(BuildError::UnknownPrecedence {
                            rule: raw.text.clone(),
                            token: token.clone(),
                        });
                    }
                },
                // Implicit rule precedence: that of the last terminal, if any.
                None => rhs
                    .iter()
                    .rev()
                    .find_map(|sym| match sym {
                        Sym::T(t) => Some(term_prec[*t as usize]),
                        Sym::N(_) => None,
                    })
                    .flatten(),
            };
            prods.push(Prod {
                lhs: nonterm_ids[&raw.lhs],
                rhs,
                prec,
            });
        }

        let mut prods_of = vec![Vec::new(); nonterminals.len()];
        for (index, prod) in prods.iter().enumerate() {
            prods_of[prod.lhs as usize].push(index as u32);
        }

        let nullable = compute_nullable(&prods, nonterminals.len());
        let first = compute_first(&prods, &nullable, nonterminals.len());

        Ok(Grammar {
            term_ids,
            term_prec,
            prods,
            prods_of,
            nullable,
            first,
        })
    }

    /// FIRST of a symbol sequence followed by the lookahead set `tail`.
    pub(crate) fn first_of_seq(&self, syms: &[Sym], tail: &BTreeSet<u32>) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        for sym in syms {
            match sym {
                Sym::T(t) => {
                    out.insert(*t);
                    return out;
                }
                Sym::N(n) => {
                    out.extend(&self.first[*n as usize]);
                    if !self.nullable[*n as usize] {
                        return out;
                    }
                }
            }
        }
        out.extend(tail);
        out
    }
}

fn compute_nullable(prods: &[Prod], nonterminal_count: usize) -> Vec<bool> {
    let mut nullable = vec![false; nonterminal_count];
    loop {
        let mut changed = false;
        for prod in prods {
            if nullable[prod.lhs as usize] {
                continue;
            }
            let all_nullable = prod.rhs.iter().all(|sym| match sym {
                Sym::T(_) => false,
                Sym::N(n) => nullable[*n as usize],
            });
            if all_nullable {
                nullable[prod.lhs as usize] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

fn compute_first(prods: &[Prod], nullable: &[bool], nonterminal_count: usize) -> Vec<BTreeSet<u32>> {
    let mut first: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); nonterminal_count];
    loop {
        let mut changed = false;
        for prod in prods {
            let mut add = BTreeSet::new();
            for sym in &prod.rhs {
                match sym {
                    Sym::T(t) => {
                        add.insert(*t);
                        break;
                    }
                    Sym::N(n) => {
                        add.extend(&first[*n as usize]);
                        if !nullable[*n as usize] {
                            break;
                        }
                    }
                }
            }
            let target = &mut first[prod.lhs as usize];
            let before = target.len();
            target.extend(add);
            if target.len() != before {
                changed = true;
            }
        }
        if !changed {
            return first;
        }
    }
}
