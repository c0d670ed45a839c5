use parsekit::{Error, IgnoreRule, PatternFlags, TokenRule, Tokenizer};

fn collect(tokenizer: &Tokenizer, text: &str) -> Vec<(String, String, usize)> {
    tokenizer
        .tokenize(text)
        .map(|item| {
            let token = item.unwrap();
            (token.name, token.value, token.position)
        })
        .collect()
}

#[test]
fn test_declaration_order_beats_longest_match() {
    let tokenizer = Tokenizer::new(
        vec![
            TokenRule::named("A", "a"),
            TokenRule::named("WORD", "[a-z]+"),
        ],
        vec![],
    )
    .unwrap();

    // "A" is declared first, so it claims the leading 'a' even though
    // "WORD" would have matched the whole input.
    assert_eq!(
        collect(&tokenizer, "abc"),
        vec![
            ("A".into(), "a".into(), 0),
            ("WORD".into(), "bc".into(), 1),
        ]
    );
}

#[test]
fn test_suppressed_rules_consume_but_are_not_emitted() {
    let tokenizer = Tokenizer::new(
        vec![
            TokenRule::named("WORD", "[a-z]+"),
            TokenRule::suppressed("#[^\n]*"),
            TokenRule::suppressed("\n"),
        ],
        vec![IgnoreRule::new("[ \t]+")],
    )
    .unwrap();

    // The comment and the newline are consumed (positions advance past
    // them) but never appear in the stream.
    assert_eq!(
        collect(&tokenizer, "abc #comment\ndef"),
        vec![
            ("WORD".into(), "abc".into(), 0),
            ("WORD".into(), "def".into(), 13),
        ]
    );
}

#[test]
fn test_possible_tokens_exclude_suppressed_rules() {
    let tokenizer = Tokenizer::new(
        vec![
            TokenRule::named("WORD", "[a-z]+"),
            TokenRule::suppressed("#[^\n]*"),
            TokenRule::named("NUMBER", r"\d+"),
        ],
        vec![],
    )
    .unwrap();

    let names: Vec<&str> = tokenizer.possible_tokens().iter().map(String::as_str).collect();
    assert_eq!(names, vec!["NUMBER", "WORD"]);
}

#[test]
fn test_lex_failure_carries_offset_and_character() {
    let tokenizer = Tokenizer::new(vec![TokenRule::named("NUMBER", r"\d+")], vec![]).unwrap();

    let mut stream = tokenizer.tokenize("12?34");
    let first = stream.next().unwrap().unwrap();
    assert_eq!((first.name.as_str(), first.value.as_str()), ("NUMBER", "12"));

    match stream.next() {
        Some(Err(Error::Lexing {
            position,
            character,
        })) => {
            assert_eq!(position, 2);
            assert_eq!(character, Some('?'));
        }
        other => panic!("expected a lexing error, got {:?}", other),
    }
    // A failed stream terminates instead of retrying.
    assert!(stream.next().is_none());
}

#[test]
fn test_case_insensitive_flag() {
    let tokenizer = Tokenizer::new(
        vec![
            TokenRule::named("KEYWORD", "select")
                .with_flags(PatternFlags::case_insensitive()),
        ],
        vec![],
    )
    .unwrap();

    assert_eq!(
        collect(&tokenizer, "SeLeCt"),
        vec![("KEYWORD".into(), "SeLeCt".into(), 0)]
    );
}

#[test]
fn test_duplicate_token_name_is_rejected() {
    let result = Tokenizer::new(
        vec![
            TokenRule::named("WORD", "[a-z]+"),
            TokenRule::named("WORD", "[A-Z]+"),
        ],
        vec![],
    );
    match result {
        Err(Error::IllegalArgument(message)) => assert!(message.contains("WORD")),
        _ => panic!("expected IllegalArgument"),
    }
}

#[test]
fn test_reserved_suppressed_prefix_is_rejected() {
    let result = Tokenizer::new(vec![TokenRule::named("__suppressed_0", "x")], vec![]);
    assert!(matches!(result, Err(Error::IllegalArgument(_))));
}

#[test]
fn test_invalid_pattern_is_rejected_at_build() {
    let result = Tokenizer::new(vec![TokenRule::named("BAD", "[unclosed")], vec![]);
    assert!(matches!(result, Err(Error::IllegalArgument(_))));
}

#[test]
fn test_tokenize_is_restartable_from_the_start() {
    let tokenizer = Tokenizer::new(vec![TokenRule::named("WORD", "[a-z]+")], vec![]).unwrap();

    assert_eq!(collect(&tokenizer, "abc"), collect(&tokenizer, "abc"));
}
