use cnf::grammars::{context_free::ContextFreeGrammar, types::Grammar};

fn normalize_grammar() {
    let rules: &[(&str, &[&str])] = &[
        ("S", &["dB", "A"]),
        ("A", &["d", "dS", "aBdB"]),
        ("B", &["a", "aS", "AC"]),
        ("D", &["AB"]),
        ("C", &["bC", "epsilon"]),
    ];
    let cfg = ContextFreeGrammar::from_definition(
        &["S", "A", "B", "C", "D"],
        &["a", "b", "d"],
        "S",
        rules,
    )
    .unwrap();

    println!("Initial grammar:\n{}", cfg.definition());

    let normalization = cfg.normalize().unwrap();

    println!(
        "1. Eliminating erasing productions:\n{}",
        normalization.after_epsilon_elimination.definition()
    );
    println!(
        "2. Eliminating unit productions:\n{}",
        normalization.after_unit_elimination.definition()
    );
    println!(
        "3. Eliminating inaccessible symbols:\n{}",
        normalization.after_inaccessible_elimination.definition()
    );
    println!(
        "4. Eliminating unproductive symbols:\n{}",
        normalization.after_unproductive_elimination.definition()
    );
    println!(
        "5. Chomsky normal form:\n{}",
        normalization.chomsky_normal_form.definition()
    );

    println!("{}", normalization.chomsky_normal_form.cyk("dd"));
}

fn main() {
    env_logger::init();

    normalize_grammar();
}
