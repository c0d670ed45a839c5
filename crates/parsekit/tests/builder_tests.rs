use anyhow::Result;

use parsekit::{BuilderPhase, CompilerBuilder, Error, PrecedenceTable};

#[test]
fn test_full_chain_builds_and_parses() -> Result<()> {
    let mut builder: CompilerBuilder<i64> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_pattern("PLUS", r"\+")?
        .add_pattern("TIMES", r"\*")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("2 + 3 * 4")?
        .set_precedence(PrecedenceTable::new().left(["PLUS"]).left(["TIMES"]))?
        .add_production("expr : expr PLUS expr", |mut children, _| {
            let lhs = children.remove(0).into_reduced().unwrap();
            lhs + children.remove(1).into_reduced().unwrap()
        })?
        .add_production("expr : expr TIMES expr", |mut children, _| {
            let lhs = children.remove(0).into_reduced().unwrap();
            lhs * children.remove(1).into_reduced().unwrap()
        })?
        .add_production("expr : NUMBER", |children, _| {
            children[0].token().unwrap().value.parse().unwrap()
        })?;

    assert_eq!(builder.parse(&mut ())?, 14);
    assert_eq!(builder.phase(), BuilderPhase::ParsingComplete);
    Ok(())
}

#[test]
fn test_empty_production_accepts_a_bare_name() -> Result<()> {
    let mut builder: CompilerBuilder<i64> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_pattern("WORD", "[a-z]+")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("42")?
        .add_production("goal : NUMBER suffix", |children, _| {
            children[0].token().unwrap().value.parse().unwrap()
        })?
        .add_production("suffix : WORD", |_children, _| 0)?
        .add_empty_production("suffix")?;

    assert_eq!(builder.parse(&mut ())?, 42);
    Ok(())
}

#[test]
fn test_error_handler_registration_is_replacement() -> Result<()> {
    let mut builder: CompilerBuilder<i64> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_pattern("AT", "@")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("1 @ 2")?
        .add_production("expr : NUMBER", |children, _| {
            children[0].token().unwrap().value.parse().unwrap()
        })?
        .set_error_handler(|_token| {
            panic!("the replaced handler must never run");
        })?
        .set_error_handler(|_token| Ok(()))?;

    // The second handler returns Ok, so the typed diagnostic is raised.
    match builder.parse(&mut ()) {
        Err(Error::Parsing { token: Some(token) }) => assert_eq!(token.name, "AT"),
        other => panic!("expected Error::Parsing, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_truncated_input_is_tokens_exhausted() -> Result<()> {
    let mut builder: CompilerBuilder<i64> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_pattern("PLUS", r"\+")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("1 +")?
        .add_production("expr : expr PLUS NUMBER", |mut children, _| {
            let lhs = children.remove(0).into_reduced().unwrap();
            let rhs: i64 = children[1].token().unwrap().value.parse().unwrap();
            lhs + rhs
        })?
        .add_production("expr : NUMBER", |children, _| {
            children[0].token().unwrap().value.parse().unwrap()
        })?;

    assert!(matches!(
        builder.parse(&mut ()),
        Err(Error::ParsingTokensExhausted)
    ));
    Ok(())
}

#[test]
fn test_lexing_failure_names_the_offending_character() -> Result<()> {
    let mut builder: CompilerBuilder<i64> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("12 ?")?
        .add_production("expr : NUMBER", |children, _| {
            children[0].token().unwrap().value.parse().unwrap()
        })?;

    match builder.parse(&mut ()) {
        Err(Error::Lexing {
            position,
            character,
        }) => {
            assert_eq!(position, 3);
            assert_eq!(character, Some('?'));
        }
        other => panic!("expected Error::Lexing, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_out_of_phase_calls_name_both_phases() {
    let builder: CompilerBuilder<i64> = CompilerBuilder::new();
    match builder.add_production("expr : NUMBER", |_, _| 0) {
        Err(err) => assert_eq!(
            err.to_string(),
            "operation requires the building-parser phase but the builder is in the building-lexer phase"
        ),
        Ok(_) => panic!("expected a phase violation"),
    }
}

#[test]
fn test_state_threading_through_the_builder() -> Result<()> {
    let mut builder: CompilerBuilder<i64, Vec<i64>> = CompilerBuilder::new()
        .add_pattern("NUMBER", r"\d+")?
        .add_ignore_pattern(r"\s+")?
        .add_lex("99")?
        .add_production("expr : NUMBER", |children, state: &mut Vec<i64>| {
            let value: i64 = children[0].token().unwrap().value.parse().unwrap();
            state.push(value);
            value
        })?;

    let mut seen = Vec::new();
    assert_eq!(builder.parse(&mut seen)?, 99);
    assert_eq!(seen, vec![99]);
    Ok(())
}
