use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use parsekit::{
    Error, IgnoreRule, Parser, PrecedenceTable, SymbolValue, Token, TokenRule, Tokenizer,
};

#[derive(Debug)]
struct SyntaxError {
    token_name: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: unexpected {}", self.token_name)
    }
}

impl std::error::Error for SyntaxError {}

fn arithmetic_tokenizer() -> Tokenizer {
    Tokenizer::new(
        vec![
            TokenRule::named("NUMBER", r"\d+"),
            TokenRule::named("PLUS", r"\+"),
            TokenRule::named("TIMES", r"\*"),
            TokenRule::named("AT", "@"),
        ],
        vec![IgnoreRule::new(r"\s+")],
    )
    .unwrap()
}

fn number(children: &[SymbolValue<i64>], index: usize) -> i64 {
    children[index].token().unwrap().value.parse().unwrap()
}

fn reduced(children: &mut Vec<SymbolValue<i64>>) -> i64 {
    children.remove(0).into_reduced().unwrap()
}

fn sum_parser() -> Parser<i64> {
    let mut parser = Parser::new(["NUMBER", "PLUS", "TIMES", "AT"]);
    parser
        .production("expr : expr PLUS NUMBER", |mut children, _| {
            let lhs = reduced(&mut children);
            lhs + number(&children, 1)
        })
        .unwrap()
        .production("expr : NUMBER", |children, _| number(&children, 0))
        .unwrap();
    parser
}

#[test]
fn test_left_recursive_sum() {
    let automaton = sum_parser().build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    let result = automaton.parse(tokenizer.tokenize("1 + 2 + 3"), &mut ());
    assert_eq!(result.unwrap(), 6);
}

#[test]
fn test_precedence_table_orders_operators() {
    let table = PrecedenceTable::new()
        .left(["PLUS"])
        .left(["TIMES"]);
    let mut parser: Parser<i64> =
        Parser::with_precedence(["NUMBER", "PLUS", "TIMES"], table);
    parser
        .production("expr : expr PLUS expr", |mut children, _| {
            let lhs = reduced(&mut children);
            children.remove(0);
            lhs + reduced(&mut children)
        })
        .unwrap()
        .production("expr : expr TIMES expr", |mut children, _| {
            let lhs = reduced(&mut children);
            children.remove(0);
            lhs * reduced(&mut children)
        })
        .unwrap()
        .production("expr : NUMBER", |children, _| number(&children, 0))
        .unwrap();
    let automaton = parser.build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    let result = automaton.parse(tokenizer.tokenize("1 + 2 * 3"), &mut ());
    assert_eq!(result.unwrap(), 7);
}

#[test]
fn test_truncated_input_is_tokens_exhausted_and_skips_the_handler() {
    let handler_calls = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&handler_calls);

    let mut parser = sum_parser();
    parser.error(move |_token| {
        seen.set(seen.get() + 1);
        Ok(())
    });
    let automaton = parser.build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    let result = automaton.parse(tokenizer.tokenize("1 +"), &mut ());
    assert!(matches!(result, Err(Error::ParsingTokensExhausted)));
    // End-of-input exhaustion is structural; the user handler never runs.
    assert_eq!(handler_calls.get(), 0);
}

#[test]
fn test_unexpected_interior_token_reaches_the_handler() {
    let mut parser = sum_parser();
    parser.error(|token| {
        Err(Box::new(SyntaxError {
            token_name: token.name.clone(),
        }))
    });
    let automaton = parser.build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    // AT is a declared terminal no production uses.
    match automaton.parse(tokenizer.tokenize("1 @ 2"), &mut ()) {
        Err(Error::Handler(e)) => {
            let custom = e.downcast_ref::<SyntaxError>().unwrap();
            assert_eq!(custom.token_name, "AT");
        }
        other => panic!("expected Error::Handler, got {:?}", other),
    }
}

#[test]
fn test_handler_returning_ok_still_raises_a_parsing_diagnostic() {
    let mut parser = sum_parser();
    parser.error(|_token| Ok(()));
    let automaton = parser.build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    match automaton.parse(tokenizer.tokenize("1 @ 2"), &mut ()) {
        Err(Error::Parsing { token: Some(token) }) => {
            assert_eq!(token.name, "AT");
            assert_eq!(token.position, 2);
        }
        other => panic!("expected Error::Parsing, got {:?}", other),
    }
}

#[test]
fn test_without_a_handler_the_typed_diagnostic_is_raised_directly() {
    let automaton = sum_parser().build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    let result = automaton.parse(tokenizer.tokenize("1 @ 2"), &mut ());
    assert!(matches!(result, Err(Error::Parsing { token: Some(_) })));
}

#[test]
fn test_lexing_failure_propagates_through_parse() {
    let automaton = sum_parser().build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    match automaton.parse(tokenizer.tokenize("1 + %"), &mut ()) {
        Err(Error::Lexing {
            position,
            character,
        }) => {
            assert_eq!(position, 4);
            assert_eq!(character, Some('%'));
        }
        other => panic!("expected Error::Lexing, got {:?}", other),
    }
}

#[test]
fn test_state_is_threaded_through_reducers() {
    let mut parser: Parser<i64, Vec<i64>> = Parser::new(["NUMBER", "PLUS"]);
    parser
        .production("expr : expr PLUS NUMBER", |mut children, state| {
            let lhs = children.remove(0).into_reduced().unwrap();
            let rhs: i64 = children[1].token().unwrap().value.parse().unwrap();
            state.push(rhs);
            lhs + rhs
        })
        .unwrap()
        .production("expr : NUMBER", |children, state| {
            let value: i64 = children[0].token().unwrap().value.parse().unwrap();
            state.push(value);
            value
        })
        .unwrap();
    let automaton = parser.build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    let mut seen = Vec::new();
    let result = automaton.parse(tokenizer.tokenize("1 + 2 + 3"), &mut seen);
    assert_eq!(result.unwrap(), 6);
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn test_automaton_is_reusable_across_parses() {
    let automaton = sum_parser().build().unwrap();
    let tokenizer = arithmetic_tokenizer();

    assert_eq!(
        automaton.parse(tokenizer.tokenize("4 + 5"), &mut ()).unwrap(),
        9
    );
    assert_eq!(
        automaton.parse(tokenizer.tokenize("10"), &mut ()).unwrap(),
        10
    );
    // A failed parse leaves the automaton usable.
    assert!(automaton.parse(tokenizer.tokenize("+"), &mut ()).is_err());
    assert_eq!(
        automaton.parse(tokenizer.tokenize("2 + 2"), &mut ()).unwrap(),
        4
    );
}

#[test]
fn test_reducers_may_capture_owned_environment() {
    let suffix = String::from("!");
    let mut parser: Parser<String> = Parser::new(["NUMBER"]);
    parser
        .production("expr : NUMBER", move |children, _| {
            format!("{}{}", children[0].token().unwrap().value, suffix)
        })
        .unwrap();
    let automaton = parser.build().unwrap();

    let tokens = vec![Ok::<_, Error>(Token::new("NUMBER", "7", 0))];
    assert_eq!(automaton.parse(tokens, &mut ()).unwrap(), "7!");
}

#[test]
fn test_error_family_predicates() {
    assert!(Error::ParsingTokensExhausted.is_parsing());
    assert!(
        Error::ParsingTokenUndefined {
            name: "SEMI".into()
        }
        .is_parsing()
    );
    let lexing = Error::Lexing {
        position: 0,
        character: None,
    };
    assert!(lexing.is_lexing());
    assert!(!lexing.is_parsing());
}
