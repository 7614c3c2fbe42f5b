use std::{borrow::Cow, fmt::Display};

use indexmap::{indexset, IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;
use tabled::{builder::Builder, settings::Style};

use crate::{
    grammars::{
        context_free::ContextFreeGrammar,
        types::{Grammar, GrammarError, NonTerminal, ProductionSymbol, ProductionWord, Terminal},
    },
    language::{Symbol, Word},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CnfWord {
    Terminal(Terminal),
    NonTerminals(NonTerminal, NonTerminal),
}

impl Display for CnfWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CnfWord::Terminal(t) => write!(f, "{t}"),
            CnfWord::NonTerminals(nt1, nt2) => write!(f, "{nt1}{nt2}"),
        }
    }
}

impl TryFrom<Word<ProductionSymbol>> for CnfWord {
    type Error = String;

    fn try_from(value: Word<ProductionSymbol>) -> Result<Self, Self::Error> {
        if value.0.len() == 1 {
            if let ProductionSymbol::Terminal(t) = &value.0[0] {
                Ok(CnfWord::Terminal(t.clone()))
            } else {
                Err("Expected a terminal".to_string())
            }
        } else if value.0.len() == 2 {
            if let (ProductionSymbol::NonTerminal(nt1), ProductionSymbol::NonTerminal(nt2)) =
                (&value.0[0], &value.0[1])
            {
                Ok(CnfWord::NonTerminals(nt1.clone(), nt2.clone()))
            } else {
                Err("Expected two non-terminals".to_string())
            }
        } else {
            Err(
                "CnfWord can only be created from a word with one terminal or two non-terminals"
                    .to_string(),
            )
        }
    }
}

impl ProductionWord for CnfWord {
    fn to_word(&self) -> Word<ProductionSymbol> {
        match self {
            CnfWord::Terminal(t) => Word(vec![ProductionSymbol::Terminal(t.clone())]),
            CnfWord::NonTerminals(nt1, nt2) => Word(vec![
                ProductionSymbol::NonTerminal(nt1.clone()),
                ProductionSymbol::NonTerminal(nt2.clone()),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChomskyNormalFormGrammar {
    pub(super) start_symbol: NonTerminal,
    pub(super) is_start_symbol_erasable: bool,
    pub(super) non_terminals: IndexSet<NonTerminal>,
    pub(super) terminals: IndexSet<Terminal>,
    pub(super) productions: IndexMap<NonTerminal, IndexSet<CnfWord>>,
}

impl Grammar<CnfWord> for ChomskyNormalFormGrammar {
    fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    fn non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.non_terminals
    }

    fn terminals(&self) -> &IndexSet<Terminal> {
        &self.terminals
    }

    fn erasing_productions(&self) -> Cow<'_, IndexSet<NonTerminal>> {
        Cow::Owned(if self.is_start_symbol_erasable {
            indexset! {self.start_symbol.clone()}
        } else {
            IndexSet::new()
        })
    }

    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<CnfWord>> {
        &self.productions
    }
}

// Single letters first, then every letter with a numeric suffix. Names freed
// by the pruning stages are handed out again.
const FRESH_NAME_ROUNDS: usize = 10;

struct FreshNonTerminalPool {
    taken: IndexSet<Symbol>,
    position: usize,
}

impl FreshNonTerminalPool {
    fn new(grammar: &ContextFreeGrammar) -> Self {
        let mut taken = IndexSet::new();
        taken.extend(grammar.non_terminals.iter().map(|nt| nt.0.clone()));
        taken.extend(grammar.terminals.iter().map(|t| t.0.clone()));

        FreshNonTerminalPool { taken, position: 0 }
    }

    fn allocate(&mut self) -> Result<NonTerminal, GrammarError> {
        while self.position < 26 * FRESH_NAME_ROUNDS {
            let round = self.position / 26;
            let letter = (b'A' + (self.position % 26) as u8) as char;
            self.position += 1;

            let name = if round == 0 {
                letter.to_string()
            } else {
                format!("{letter}{round}")
            };

            let symbol = Symbol::new(name);
            if self.taken.insert(symbol.clone()) {
                return Ok(NonTerminal(symbol));
            }
        }

        Err(GrammarError::NonTerminalPoolExhausted)
    }
}

impl ChomskyNormalFormGrammar {
    pub fn from_context_free_grammar(cfg: &ContextFreeGrammar) -> Result<Self, GrammarError> {
        Ok(cfg.normalize()?.chomsky_normal_form)
    }

    // Expects a grammar that already went through erasing-production and
    // unit-production elimination plus both pruning stages.
    pub(super) fn binarize(cfg: &ContextFreeGrammar) -> Result<Self, GrammarError> {
        let mut pool = FreshNonTerminalPool::new(cfg);
        let mut helper_productions: IndexMap<NonTerminal, IndexSet<CnfWord>> = IndexMap::new();

        let mut isolated_terminals: IndexMap<Terminal, NonTerminal> = IndexMap::new();
        let mut replaced = IndexMap::new();

        for (lhs, rhs) in &cfg.productions {
            let mut next_words = IndexSet::new();

            for word in rhs {
                if word.0.len() == 1 {
                    next_words.insert(word.clone());
                    continue;
                }

                let mut symbols = Vec::with_capacity(word.0.len());
                for symbol in word.symbols() {
                    match symbol {
                        ProductionSymbol::Terminal(t) => {
                            let nt = if let Some(nt) = isolated_terminals.get(t) {
                                nt.clone()
                            } else {
                                let nt = pool.allocate()?;
                                debug!("isolated terminal '{t}' as {nt}");

                                helper_productions
                                    .entry(nt.clone())
                                    .or_insert_with(IndexSet::new)
                                    .insert(CnfWord::Terminal(t.clone()));
                                isolated_terminals.insert(t.clone(), nt.clone());

                                nt
                            };

                            symbols.push(ProductionSymbol::NonTerminal(nt));
                        }
                        ProductionSymbol::NonTerminal(_) => symbols.push(symbol.clone()),
                    }
                }

                next_words.insert(Word::new(symbols));
            }

            replaced.insert(lhs.clone(), next_words);
        }

        let mut productions: IndexMap<NonTerminal, IndexSet<CnfWord>> = IndexMap::new();
        let mut folded_pairs: IndexMap<(NonTerminal, NonTerminal), NonTerminal> = IndexMap::new();

        for (lhs, rhs) in replaced {
            let entry = productions.entry(lhs).or_insert_with(IndexSet::new);

            for word in rhs {
                if word.0.len() == 1 {
                    match &word.0[0] {
                        ProductionSymbol::Terminal(t) => {
                            entry.insert(CnfWord::Terminal(t.clone()));
                        }
                        ProductionSymbol::NonTerminal(_) => {
                            panic!("unit productions must be eliminated before binarization")
                        }
                    }

                    continue;
                }

                let mut symbols = word
                    .0
                    .iter()
                    .map(|symbol| match symbol {
                        ProductionSymbol::NonTerminal(nt) => nt.clone(),
                        ProductionSymbol::Terminal(_) => {
                            panic!("terminals must be isolated before binarization")
                        }
                    })
                    .collect::<Vec<_>>();

                while symbols.len() > 2 {
                    let pair = (symbols[0].clone(), symbols[1].clone());

                    let folded = if let Some(nt) = folded_pairs.get(&pair) {
                        nt.clone()
                    } else {
                        let nt = pool.allocate()?;
                        debug!("folded '{}{}' into {nt}", pair.0, pair.1);

                        helper_productions
                            .entry(nt.clone())
                            .or_insert_with(IndexSet::new)
                            .insert(CnfWord::NonTerminals(pair.0.clone(), pair.1.clone()));
                        folded_pairs.insert(pair, nt.clone());

                        nt
                    };

                    symbols.splice(0..2, [folded]);
                }

                entry.insert(CnfWord::NonTerminals(symbols[0].clone(), symbols[1].clone()));
            }
        }

        let mut non_terminals = cfg.non_terminals.clone();
        non_terminals.extend(helper_productions.keys().cloned());
        productions.extend(helper_productions);

        Ok(Self {
            start_symbol: cfg.start_symbol.clone(),
            is_start_symbol_erasable: cfg.erasing_productions.contains(&cfg.start_symbol),
            non_terminals,
            terminals: cfg.terminals.clone(),
            productions,
        })
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        if !self.non_terminals.contains(&self.start_symbol) {
            return Err(GrammarError::StartNotNonTerminal(self.start_symbol.0.clone()));
        }

        for (lhs, rhs) in &self.productions {
            if !self.non_terminals.contains(lhs) {
                return Err(GrammarError::RulesForUndeclaredSymbol(lhs.0.clone()));
            }

            for word in rhs {
                match word {
                    CnfWord::Terminal(t) => {
                        if !self.terminals.contains(t) {
                            return Err(GrammarError::UndefinedSymbol {
                                non_terminal: lhs.0.clone(),
                                symbol: t.0.clone(),
                            });
                        }
                    }
                    CnfWord::NonTerminals(nt1, nt2) => {
                        for nt in [nt1, nt2] {
                            if !self.non_terminals.contains(nt) {
                                return Err(GrammarError::UndefinedSymbol {
                                    non_terminal: lhs.0.clone(),
                                    symbol: nt.0.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// True if the language contains the empty word.
    pub fn generates_epsilon(&self) -> bool {
        self.is_start_symbol_erasable
    }

    pub fn is_empty(&self) -> bool {
        !self.is_start_symbol_erasable && !self.productions.contains_key(&self.start_symbol)
    }

    pub fn accepts(&self, word: &str) -> bool {
        if word.is_empty() {
            return self.is_start_symbol_erasable;
        }

        self.cyk(word).is_word_in_language()
    }

    pub fn cyk(&self, word: &str) -> CykTable {
        let terminals = word
            .chars()
            .map(|c| Terminal(Symbol::new(c)))
            .collect::<Vec<_>>();

        let n = terminals.len();
        let mut table = CykTable::new(n, word, &self.start_symbol);

        if n == 0 {
            return table;
        }

        for (lhs, rhs) in &self.productions {
            for word in rhs {
                if let CnfWord::Terminal(t) = word {
                    for (i, terminal) in terminals.iter().enumerate() {
                        if terminal == t {
                            table.insert(i, i, lhs.clone());
                        }
                    }
                }
            }
        }

        for d in 0..n - 1 {
            for i in 0..n - d - 1 {
                let j = i + d + 1;

                for k in i..j {
                    for (lhs, rhs) in &self.productions {
                        for word in rhs {
                            if let CnfWord::NonTerminals(nt1, nt2) = word {
                                if table.contains(i, k, nt1) && table.contains(k + 1, j, nt2) {
                                    table.insert(i, j, lhs.clone());
                                }
                            }
                        }
                    }
                }
            }
        }

        table
    }
}

#[derive(Debug)]
pub struct CykTable {
    table: Vec<Vec<IndexSet<NonTerminal>>>,
    word: String,
    start_symbol: NonTerminal,
}

impl CykTable {
    pub fn new(size: usize, word: impl Into<String>, start_symbol: &NonTerminal) -> Self {
        CykTable {
            table: vec![vec![IndexSet::new(); size]; size],
            word: word.into(),
            start_symbol: start_symbol.clone(),
        }
    }

    pub fn contains(&self, i: usize, j: usize, value: &NonTerminal) -> bool {
        self.table[i][j].contains(value)
    }

    pub fn get(&self, i: usize, j: usize) -> &IndexSet<NonTerminal> {
        &self.table[i][j]
    }

    pub fn insert(&mut self, i: usize, j: usize, value: NonTerminal) {
        self.table[i][j].insert(value);
    }

    pub fn is_word_in_language(&self) -> bool {
        match self.table.first() {
            Some(row) => row[self.table.len() - 1].contains(&self.start_symbol),
            None => false,
        }
    }
}

impl Display for CykTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CYK table for the word \"{}\":\n", self.word)?;

        let mut builder = Builder::default();

        for (i, row) in self.table.iter().enumerate() {
            builder.push_record(row.iter().enumerate().map(|(j, s)| {
                if j >= i {
                    format!(
                        "V_{},{} = {}",
                        i + 1,
                        j + 1,
                        if s.is_empty() {
                            "∅".to_string()
                        } else {
                            format!("{{{}}}", s.iter().map(ToString::to_string).join(", "))
                        }
                    )
                } else {
                    String::new()
                }
            }));
        }

        builder.insert_record(0, (1..=self.table.len()).map(|j| format!("j = {}", j)));
        builder.insert_column(
            0,
            std::iter::once(String::new())
                .chain((1..=self.table.len()).map(|i| format!("i = {}", i))),
        );

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(f, "{}", table)?;

        writeln!(
            f,
            "The word \"{}\" is {} the language: {} {} in the top-right cell.",
            self.word,
            if self.is_word_in_language() {
                "in"
            } else {
                "not in"
            },
            self.start_symbol,
            if self.is_word_in_language() {
                "appears"
            } else {
                "does not appear"
            }
        )?;

        Ok(())
    }
}
