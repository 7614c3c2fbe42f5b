use std::{borrow::Cow, fmt::Display};

use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::language::{Symbol, Word, EPSILON};

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal(pub Symbol);

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal(pub Symbol);

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum ProductionSymbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl ProductionSymbol {
    pub fn symbol(&self) -> &Symbol {
        match self {
            ProductionSymbol::Terminal(t) => &t.0,
            ProductionSymbol::NonTerminal(nt) => &nt.0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("symbol names cannot be empty")]
    EmptyName,
    #[error("'{0}' appears twice in the non-terminal symbols")]
    DuplicateNonTerminal(Symbol),
    #[error("'{0}' appears twice in the terminal symbols")]
    DuplicateTerminal(Symbol),
    #[error("'{0}' is declared as both a non-terminal and a terminal")]
    TerminalNonTerminal(Symbol),
    #[error("the start symbol '{0}' is not a non-terminal")]
    StartNotNonTerminal(Symbol),
    #[error("'{0}' has productions but is not a declared non-terminal")]
    RulesForUndeclaredSymbol(Symbol),
    #[error("'{0}' has an empty production; the empty word is written 'epsilon'")]
    EmptyProduction(Symbol),
    #[error("'{symbol}' is used in a production of '{non_terminal}' but is not a declared symbol")]
    UndefinedSymbol {
        non_terminal: Symbol,
        symbol: Symbol,
    },
    #[error("ran out of fresh non-terminal names during binarization")]
    NonTerminalPoolExhausted,
    #[error("invalid grammar definition: {0}")]
    Parse(String),
}

pub trait ProductionWord: Display + Clone {
    fn to_word(&self) -> Word<ProductionSymbol>;
}

impl TryFrom<Word<ProductionSymbol>> for NonTerminal {
    type Error = String;

    fn try_from(value: Word<ProductionSymbol>) -> Result<Self, Self::Error> {
        if value.0.len() == 1 {
            if let ProductionSymbol::NonTerminal(nt) = &value.0[0] {
                Ok(nt.clone())
            } else {
                Err("Expected a non-terminal".to_string())
            }
        } else {
            Err("Expected a single non-terminal".to_string())
        }
    }
}

impl ProductionWord for Word<ProductionSymbol> {
    fn to_word(&self) -> Word<ProductionSymbol> {
        Word(self.0.clone())
    }
}

pub trait Grammar<R: ProductionWord> {
    fn start_symbol(&self) -> &NonTerminal;
    fn non_terminals(&self) -> &IndexSet<NonTerminal>;
    fn terminals(&self) -> &IndexSet<Terminal>;
    fn erasing_productions(&self) -> Cow<'_, IndexSet<NonTerminal>>;
    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<R>>;

    fn definition(&self) -> String {
        let erasing_productions = self.erasing_productions();

        let mut definition = format!(
            "G = ({{{}}}, {{{}}}, P, {})\n\n",
            self.non_terminals()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            self.terminals()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            self.start_symbol()
        );

        definition += "P = {\n";

        for (lhs, rhs) in self.productions() {
            let mut alternatives = rhs.iter().map(ToString::to_string).collect::<Vec<_>>();
            if erasing_productions.contains(lhs) {
                alternatives.push(EPSILON.to_owned());
            }

            definition += &format!("  {} -> {}\n", lhs, alternatives.join(" | "));
        }

        for lhs in erasing_productions.as_ref() {
            if !self.productions().contains_key(lhs) {
                definition += &format!("  {} -> {}\n", lhs, EPSILON);
            }
        }

        definition += "}\n";

        definition
    }
}
