//! LALR(1) table construction.
//!
//! The canonical LR(0) collection is built first; lookaheads are then
//! attached to kernel items by spontaneous generation and propagation, and
//! the ACTION/GOTO tables are read off the lookahead-closed states.
//! Shift/reduce conflicts are resolved through the precedence table (yacc
//! conventions); unresolved conflicts default to shift, and reduce/reduce
//! conflicts pick the earlier production.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::grammar::{Assoc, END, Grammar, Sym};

/// Placeholder lookahead used during spontaneous/propagated discovery.
const DUMMY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
}

#[derive(Debug)]
pub(crate) struct Tables {
    /// Per state: terminal id -> action.
    pub actions: Vec<HashMap<u32, Action>>,
    /// Per state: nonterminal id -> successor state.
    pub gotos: Vec<HashMap<u32, u32>>,
}

/// An LR(0) item: position `dot` inside production `prod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    prod: u32,
    dot: u32,
}

impl Item {
    fn advanced(self) -> Item {
        Item {
            prod: self.prod,
            dot: self.dot + 1,
        }
    }
}

fn sym_after_dot(grammar: &Grammar, item: Item) -> Option<Sym> {
    grammar.prods[item.prod as usize]
        .rhs
        .get(item.dot as usize)
        .copied()
}

struct States {
    /// Sorted kernel items per state.
    kernels: Vec<Vec<Item>>,
    /// Outgoing transitions per state.
    transitions: Vec<BTreeMap<Sym, u32>>,
}

fn closure0(grammar: &Grammar, kernel: &[Item]) -> BTreeSet<Item> {
    let mut closure: BTreeSet<Item> = kernel.iter().copied().collect();
    let mut work: Vec<Item> = kernel.to_vec();
    while let Some(item) = work.pop() {
        if let Some(Sym::N(n)) = sym_after_dot(grammar, item) {
            for &prod in &grammar.prods_of[n as usize] {
                let new_item = Item { prod, dot: 0 };
                if closure.insert(new_item) {
                    work.push(new_item);
                }
            }
        }
    }
    closure
}

fn build_states(grammar: &Grammar) -> States {
    let start_kernel = vec![Item { prod: 0, dot: 0 }];
    let mut ids: HashMap<Vec<Item>, u32> = HashMap::new();
    ids.insert(start_kernel.clone(), 0);
    let mut kernels = vec![start_kernel];
    let mut transitions: Vec<BTreeMap<Sym, u32>> = Vec::new();

    let mut next = 0usize;
    while next < kernels.len() {
        let closure = closure0(grammar, &kernels[next]);
        let mut targets: BTreeMap<Sym, BTreeSet<Item>> = BTreeMap::new();
        for &item in &closure {
            if let Some(sym) = sym_after_dot(grammar, item) {
                targets.entry(sym).or_default().insert(item.advanced());
            }
        }
        let mut outgoing = BTreeMap::new();
        for (sym, kernel_set) in targets {
            let kernel: Vec<Item> = kernel_set.into_iter().collect();
            let id = match ids.get(&kernel) {
                Some(&id) => id,
                None => {
                    let id = kernels.len() as u32;
                    ids.insert(kernel.clone(), id);
                    kernels.push(kernel);
                    id
                }
            };
            outgoing.insert(sym, id);
        }
        transitions.push(outgoing);
        next += 1;
    }

    States {
        kernels,
        transitions,
    }
}

/// LR(1) closure over items with lookahead sets.
fn closure1(
    grammar: &Grammar,
    seed: &[(Item, BTreeSet<u32>)],
) -> BTreeMap<Item, BTreeSet<u32>> {
    let mut closure: BTreeMap<Item, BTreeSet<u32>> = BTreeMap::new();
    let mut work: Vec<Item> = Vec::new();
    for (item, lookaheads) in seed {
        closure.entry(*item).or_default().extend(lookaheads);
        work.push(*item);
    }
    while let Some(item) = work.pop() {
        let Some(Sym::N(n)) = sym_after_dot(grammar, item) else {
            continue;
        };
        let prod = &grammar.prods[item.prod as usize];
        let beta = &prod.rhs[(item.dot + 1) as usize..];
        let lookaheads = closure.get(&item).cloned().unwrap_or_default();
        let new_lookaheads = grammar.first_of_seq(beta, &lookaheads);
        for &p in &grammar.prods_of[n as usize] {
            let new_item = Item { prod: p, dot: 0 };
            let entry = closure.entry(new_item).or_default();
            let before = entry.len();
            entry.extend(&new_lookaheads);
            if entry.len() != before {
                work.push(new_item);
            }
        }
    }
    closure
}

/// Computes LALR(1) lookahead sets for every kernel item.
fn kernel_lookaheads(grammar: &Grammar, states: &States) -> Vec<Vec<BTreeSet<u32>>> {
    let mut lookaheads: Vec<Vec<BTreeSet<u32>>> = states
        .kernels
        .iter()
        .map(|kernel| vec![BTreeSet::new(); kernel.len()])
        .collect();
    lookaheads[0][0].insert(END);

    // (from_state, from_item) -> (to_state, to_item) propagation links.
    let mut links: Vec<((usize, usize), (usize, usize))> = Vec::new();
    let mut dummy_seed = BTreeSet::new();
    dummy_seed.insert(DUMMY);

    for (state, kernel) in states.kernels.iter().enumerate() {
        for (kernel_index, &kernel_item) in kernel.iter().enumerate() {
            let probe = closure1(grammar, &[(kernel_item, dummy_seed.clone())]);
            for (item, las) in &probe {
                let Some(sym) = sym_after_dot(grammar, *item) else {
                    continue;
                };
                let target_state = states.transitions[state][&sym] as usize;
                let advanced = item.advanced();
                let target_index = states.kernels[target_state]
                    .binary_search(&advanced)
                    .unwrap_or_else(|_| {
                        unreachable!("advanced item missing from successor kernel")
                    });
                for &la in las {
                    if la == DUMMY {
                        links.push(((state, kernel_index), (target_state, target_index)));
                    } else {
                        lookaheads[target_state][target_index].insert(la);
                    }
                }
            }
        }
    }

    loop {
        let mut changed = false;
        for &((from_state, from_index), (to_state, to_index)) in &links {
            let source = lookaheads[from_state][from_index].clone();
            let target = &mut lookaheads[to_state][to_index];
            let before = target.len();
            target.extend(source);
            if target.len() != before {
                changed = true;
            }
        }
        if !changed {
            return lookaheads;
        }
    }
}

pub(crate) fn build_tables(grammar: &Grammar) -> Tables {
    let states = build_states(grammar);
    let lookaheads = kernel_lookaheads(grammar, &states);

    let mut actions: Vec<HashMap<u32, Action>> = vec![HashMap::new(); states.kernels.len()];
    let mut gotos: Vec<HashMap<u32, u32>> = vec![HashMap::new(); states.kernels.len()];

    for (state, kernel) in states.kernels.iter().enumerate() {
        for (&sym, &target) in &states.transitions[state] {
            match sym {
                Sym::T(t) => insert_action(grammar, &mut actions[state], t, Action::Shift(target)),
                Sym::N(n) => {
                    gotos[state].insert(n, target);
                }
            }
        }

        let seed: Vec<(Item, BTreeSet<u32>)> = kernel
            .iter()
            .enumerate()
            .map(|(i, &item)| (item, lookaheads[state][i].clone()))
            .collect();
        for (item, las) in closure1(grammar, &seed) {
            if sym_after_dot(grammar, item).is_some() {
                continue;
            }
            if item.prod == 0 {
                actions[state].insert(END, Action::Accept);
                continue;
            }
            for la in las {
                insert_action(grammar, &mut actions[state], la, Action::Reduce(item.prod));
            }
        }
    }

    Tables { actions, gotos }
}

fn insert_action(grammar: &Grammar, cell: &mut HashMap<u32, Action>, terminal: u32, new: Action) {
    use std::collections::hash_map::Entry;
    match cell.entry(terminal) {
        Entry::Vacant(slot) => {
            slot.insert(new);
        }
        Entry::Occupied(mut slot) => {
            let resolved = resolve_conflict(grammar, *slot.get(), new, terminal);
            slot.insert(resolved);
        }
    }
}

fn resolve_conflict(grammar: &Grammar, existing: Action, new: Action, terminal: u32) -> Action {
    match (existing, new) {
        (Action::Shift(s), Action::Reduce(p)) | (Action::Reduce(p), Action::Shift(s)) => {
            let rule_prec = grammar.prods[p as usize].prec;
            let token_prec = grammar.term_prec[terminal as usize];
            match (rule_prec, token_prec) {
                (Some((rule_level, assoc)), Some((token_level, _))) => {
                    if token_level > rule_level {
                        Action::Shift(s)
                    } else if token_level < rule_level {
                        Action::Reduce(p)
                    } else {
                        match assoc {
                            Assoc::Left => Action::Reduce(p),
                            Assoc::Right => Action::Shift(s),
                        }
                    }
                }
                _ => Action::Shift(s),
            }
        }
        (Action::Reduce(a), Action::Reduce(b)) => Action::Reduce(a.min(b)),
        (Action::Accept, _) | (_, Action::Accept) => Action::Accept,
        (Action::Shift(s), Action::Shift(_)) => Action::Shift(s),
    }
}
