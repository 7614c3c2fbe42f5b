use cnf::{
    grammars::{
        context_free::ContextFreeGrammar,
        types::{Grammar, GrammarError, NonTerminal},
    },
    language::Symbol,
};

fn sample_grammar() -> ContextFreeGrammar {
    let rules: &[(&str, &[&str])] = &[("S", &["aA", "b"]), ("A", &["a", "epsilon"])];

    ContextFreeGrammar::from_definition(&["S", "A"], &["a", "b"], "S", rules).unwrap()
}

#[test]
fn test_accessors_keep_declaration_order() {
    let grammar = sample_grammar();

    assert_eq!(grammar.start_symbol().to_string(), "S");

    let non_terminals: Vec<String> = grammar
        .non_terminals()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(non_terminals, ["S", "A"]);

    let terminals: Vec<String> = grammar
        .terminals()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(terminals, ["a", "b"]);

    assert!(grammar
        .erasing_productions()
        .contains(&NonTerminal(Symbol::new("A"))));
}

#[test]
fn test_definition_rendering() {
    assert_eq!(
        sample_grammar().definition(),
        "G = ({S, A}, {a, b}, P, S)\n\nP = {\n  S -> aA | b\n  A -> a | epsilon\n}\n"
    );
}

#[test]
fn test_definition_renders_erasing_only_non_terminals() {
    let rules: &[(&str, &[&str])] = &[("S", &["a"]), ("X", &["epsilon"])];
    let grammar = ContextFreeGrammar::from_definition(&["S", "X"], &["a"], "S", rules).unwrap();

    assert_eq!(
        grammar.definition(),
        "G = ({S, X}, {a}, P, S)\n\nP = {\n  S -> a\n  X -> epsilon\n}\n"
    );
}

#[test]
fn test_from_text_matches_structured_definition() {
    let text = "
# A toy grammar with an erasing production.
non_terminals: S A
terminals: a b
start: S

S -> aA | b
A -> a | epsilon
";

    let grammar = ContextFreeGrammar::from_text(text).unwrap();

    assert_eq!(grammar, sample_grammar());
}

#[test]
fn test_from_text_allows_blank_and_comment_lines_between_headers() {
    let text = "
non_terminals: S A

terminals: a b
# the start symbol comes last
start: S

S -> aA | b
A -> a | epsilon
";

    let grammar = ContextFreeGrammar::from_text(text).unwrap();

    assert_eq!(grammar, sample_grammar());
}

#[test]
fn test_from_text_accepts_unicode_arrows_and_comments() {
    let text = "non_terminals: S\nterminals: a\nstart: S\nS → aS | a # no base case needed\n";

    let grammar = ContextFreeGrammar::from_text(text).unwrap();
    let rules: &[(&str, &[&str])] = &[("S", &["aS", "a"])];

    assert_eq!(
        grammar,
        ContextFreeGrammar::from_definition(&["S"], &["a"], "S", rules).unwrap()
    );
}

#[test]
fn test_from_text_rejects_missing_sections() {
    let error = ContextFreeGrammar::from_text("S -> a\n").unwrap_err();

    assert!(matches!(error, GrammarError::Parse(_)));
}

#[test]
fn test_empty_symbol_name() {
    let error = ContextFreeGrammar::from_definition(&["S", ""], &["a"], "S", &[]).unwrap_err();
    assert_eq!(error, GrammarError::EmptyName);

    let error = ContextFreeGrammar::from_definition(&["S"], &[""], "S", &[]).unwrap_err();
    assert_eq!(error, GrammarError::EmptyName);
}

#[test]
fn test_duplicate_non_terminal() {
    let error = ContextFreeGrammar::from_definition(&["S", "S"], &["a"], "S", &[]).unwrap_err();

    assert_eq!(error, GrammarError::DuplicateNonTerminal(Symbol::new("S")));
}

#[test]
fn test_duplicate_terminal() {
    let error = ContextFreeGrammar::from_definition(&["S"], &["a", "a"], "S", &[]).unwrap_err();

    assert_eq!(error, GrammarError::DuplicateTerminal(Symbol::new("a")));
}

#[test]
fn test_non_terminal_clashing_with_terminal() {
    let error = ContextFreeGrammar::from_definition(&["S", "a"], &["a"], "S", &[]).unwrap_err();

    assert_eq!(error, GrammarError::TerminalNonTerminal(Symbol::new("a")));
}

#[test]
fn test_start_symbol_must_be_declared() {
    let error = ContextFreeGrammar::from_definition(&["S"], &["a"], "X", &[]).unwrap_err();

    assert_eq!(error, GrammarError::StartNotNonTerminal(Symbol::new("X")));
}

#[test]
fn test_rules_for_undeclared_symbol() {
    let rules: &[(&str, &[&str])] = &[("X", &["a"])];
    let error = ContextFreeGrammar::from_definition(&["S"], &["a"], "S", rules).unwrap_err();

    assert_eq!(error, GrammarError::RulesForUndeclaredSymbol(Symbol::new("X")));
}

#[test]
fn test_empty_production_string() {
    let rules: &[(&str, &[&str])] = &[("S", &[""])];
    let error = ContextFreeGrammar::from_definition(&["S"], &["a"], "S", rules).unwrap_err();

    assert_eq!(error, GrammarError::EmptyProduction(Symbol::new("S")));
}

#[test]
fn test_undefined_symbol_in_production() {
    let rules: &[(&str, &[&str])] = &[("S", &["ac"])];
    let error = ContextFreeGrammar::from_definition(&["S"], &["a"], "S", rules).unwrap_err();

    assert_eq!(
        error,
        GrammarError::UndefinedSymbol {
            non_terminal: Symbol::new("S"),
            symbol: Symbol::new("c"),
        }
    );
}

#[test]
fn test_error_messages_name_the_offending_symbol() {
    assert_eq!(
        GrammarError::StartNotNonTerminal(Symbol::new("X")).to_string(),
        "the start symbol 'X' is not a non-terminal"
    );
    assert_eq!(
        GrammarError::EmptyProduction(Symbol::new("S")).to_string(),
        "'S' has an empty production; the empty word is written 'epsilon'"
    );
}
