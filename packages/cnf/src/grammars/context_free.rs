use std::{borrow::Cow, collections::VecDeque};

use indexmap::{indexset, IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;
use winnow::Parser;

use crate::{
    grammars::{
        parse,
        types::{Grammar, GrammarError, NonTerminal, ProductionSymbol, Terminal},
    },
    language::{Symbol, Word, EPSILON},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFreeGrammar {
    pub(super) non_terminals: IndexSet<NonTerminal>,
    pub(super) terminals: IndexSet<Terminal>,
    pub(super) start_symbol: NonTerminal,
    pub(super) erasing_productions: IndexSet<NonTerminal>,
    pub(super) productions: IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>>,
}

impl Grammar<Word<ProductionSymbol>> for ContextFreeGrammar {
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
        Cow::Borrowed(&self.erasing_productions)
    }

    fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>> {
        &self.productions
    }
}

impl ContextFreeGrammar {
    pub fn from_definition(
        non_terminals: &[&str],
        terminals: &[&str],
        start_symbol: &str,
        rules: &[(&str, &[&str])],
    ) -> Result<Self, GrammarError> {
        let mut declared_non_terminals = IndexSet::new();
        for &name in non_terminals {
            let symbol = Self::declared_symbol(name)?;
            if !declared_non_terminals.insert(NonTerminal(symbol.clone())) {
                return Err(GrammarError::DuplicateNonTerminal(symbol));
            }
        }

        let mut declared_terminals = IndexSet::new();
        for &name in terminals {
            let symbol = Self::declared_symbol(name)?;
            if declared_non_terminals.contains(&NonTerminal(symbol.clone())) {
                return Err(GrammarError::TerminalNonTerminal(symbol));
            }
            if !declared_terminals.insert(Terminal(symbol.clone())) {
                return Err(GrammarError::DuplicateTerminal(symbol));
            }
        }

        let start_symbol = NonTerminal(Self::declared_symbol(start_symbol)?);
        if !declared_non_terminals.contains(&start_symbol) {
            return Err(GrammarError::StartNotNonTerminal(start_symbol.0));
        }

        let mut grammar = Self {
            non_terminals: declared_non_terminals,
            terminals: declared_terminals,
            start_symbol,
            erasing_productions: IndexSet::new(),
            productions: IndexMap::new(),
        };

        for (lhs, alternatives) in rules {
            let lhs = NonTerminal(Self::declared_symbol(*lhs)?);
            if !grammar.non_terminals.contains(&lhs) {
                return Err(GrammarError::RulesForUndeclaredSymbol(lhs.0));
            }

            for &alternative in *alternatives {
                if alternative.is_empty() {
                    return Err(GrammarError::EmptyProduction(lhs.0));
                }

                if alternative == EPSILON {
                    grammar.erasing_productions.insert(lhs.clone());
                    continue;
                }

                let word = grammar.tokenize(&lhs, alternative)?;
                grammar
                    .productions
                    .entry(lhs.clone())
                    .or_insert_with(IndexSet::new)
                    .insert(word);
            }
        }

        Ok(grammar)
    }

    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        let parsed = parse::grammar_definition
            .parse(text)
            .map_err(|error| GrammarError::Parse(error.to_string()))?;

        let rules = parsed
            .rules
            .iter()
            .map(|(lhs, alternatives)| (*lhs, alternatives.as_slice()))
            .collect::<Vec<_>>();

        Self::from_definition(
            &parsed.non_terminals,
            &parsed.terminals,
            parsed.start_symbol,
            &rules,
        )
    }

    fn declared_symbol(name: &str) -> Result<Symbol, GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::EmptyName);
        }

        Ok(Symbol::new(name))
    }

    // Production strings are tokenized one character at a time against the
    // declared alphabets, never by letter case.
    fn tokenize(
        &self,
        lhs: &NonTerminal,
        alternative: &str,
    ) -> Result<Word<ProductionSymbol>, GrammarError> {
        let symbols = alternative
            .chars()
            .map(|c| {
                let symbol = Symbol::new(c);
                if self.non_terminals.contains(&NonTerminal(symbol.clone())) {
                    Ok(ProductionSymbol::NonTerminal(NonTerminal(symbol)))
                } else if self.terminals.contains(&Terminal(symbol.clone())) {
                    Ok(ProductionSymbol::Terminal(Terminal(symbol)))
                } else {
                    Err(GrammarError::UndefinedSymbol {
                        non_terminal: lhs.0.clone(),
                        symbol,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Word::new(symbols))
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        if !self.non_terminals.contains(&self.start_symbol) {
            return Err(GrammarError::StartNotNonTerminal(self.start_symbol.0.clone()));
        }

        for nt in &self.non_terminals {
            if self.terminals.contains(&Terminal(nt.0.clone())) {
                return Err(GrammarError::TerminalNonTerminal(nt.0.clone()));
            }
        }

        for lhs in &self.erasing_productions {
            if !self.non_terminals.contains(lhs) {
                return Err(GrammarError::RulesForUndeclaredSymbol(lhs.0.clone()));
            }
        }

        for (lhs, rhs) in &self.productions {
            if !self.non_terminals.contains(lhs) {
                return Err(GrammarError::RulesForUndeclaredSymbol(lhs.0.clone()));
            }

            for word in rhs {
                if word.is_empty() {
                    return Err(GrammarError::EmptyProduction(lhs.0.clone()));
                }

                for symbol in word.symbols() {
                    let declared = match symbol {
                        ProductionSymbol::Terminal(t) => self.terminals.contains(t),
                        ProductionSymbol::NonTerminal(nt) => self.non_terminals.contains(nt),
                    };

                    if !declared {
                        return Err(GrammarError::UndefinedSymbol {
                            non_terminal: lhs.0.clone(),
                            symbol: symbol.symbol().clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// True if the grammar derives no word at all, not even the empty one.
    pub fn is_empty(&self) -> bool {
        !self.productive_non_terminals().contains(&self.start_symbol)
    }

    pub fn nullable_non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut nullable = self.erasing_productions.clone();

        loop {
            let mut changed = false;

            'outer: for (lhs, rhs) in &self.productions {
                if nullable.contains(lhs) {
                    continue;
                }

                for word in rhs {
                    let is_lhs_nullable = word.0.iter().all(|symbol| {
                        if let ProductionSymbol::NonTerminal(nt) = symbol {
                            nullable.contains(nt)
                        } else {
                            false
                        }
                    });

                    if is_lhs_nullable {
                        nullable.insert(lhs.clone());

                        changed = true;
                        continue 'outer;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        nullable
    }

    pub fn eliminate_erasing_productions(&self) -> Self {
        let nullable = self.nullable_non_terminals();
        if !nullable.is_empty() {
            debug!(
                "nullable non-terminals: {}",
                nullable.iter().map(ToString::to_string).join(", ")
            );
        }

        let mut productions = IndexMap::new();

        for (lhs, rhs) in &self.productions {
            let mut next_productions = IndexSet::new();

            for word in rhs {
                let words = word
                    .0
                    .iter()
                    .cloned()
                    .map(|symbol| match &symbol {
                        ProductionSymbol::NonTerminal(nt) => {
                            if nullable.contains(nt) {
                                vec![Some(symbol), None]
                            } else {
                                vec![Some(symbol)]
                            }
                        }
                        ProductionSymbol::Terminal(_) => vec![Some(symbol)],
                    })
                    .multi_cartesian_product()
                    .filter_map(|word| {
                        let word = word.into_iter().flatten().collect::<Vec<_>>();
                        if word.is_empty() {
                            None
                        } else {
                            Some(Word::new(word))
                        }
                    });

                next_productions.extend(words);
            }

            productions.insert(lhs.clone(), next_productions);
        }

        for lhs in &self.erasing_productions {
            debug!("removed erasing production '{lhs} -> epsilon'");
        }

        let erasing_productions = if nullable.contains(&self.start_symbol) {
            debug!(
                "the start symbol {} is nullable; keeping the empty word marker",
                self.start_symbol
            );

            indexset! {self.start_symbol.clone()}
        } else {
            IndexSet::new()
        };

        Self {
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            start_symbol: self.start_symbol.clone(),
            erasing_productions,
            productions,
        }
    }

    pub fn unit_closure(&self, non_terminal: &NonTerminal) -> IndexSet<NonTerminal> {
        let mut closure = IndexSet::from([non_terminal.clone()]);
        let mut queue = VecDeque::from([non_terminal.clone()]);

        while let Some(current) = queue.pop_front() {
            if let Some(rhs) = self.productions.get(&current) {
                for word in rhs {
                    if word.0.len() == 1 {
                        if let ProductionSymbol::NonTerminal(nt) = &word.0[0] {
                            if closure.insert(nt.clone()) {
                                queue.push_back(nt.clone());
                            }
                        }
                    }
                }
            }
        }

        closure
    }

    pub fn eliminate_unit_productions(&self) -> Self {
        let mut productions = IndexMap::new();

        for lhs in self.productions.keys() {
            let closure = self.unit_closure(lhs);
            if closure.len() > 1 {
                debug!(
                    "unit closure of {}: {{{}}}",
                    lhs,
                    closure.iter().map(ToString::to_string).join(", ")
                );
            }

            let mut next_productions = IndexSet::new();

            for member in &closure {
                if let Some(rhs) = self.productions.get(member) {
                    for word in rhs {
                        if word.0.len() == 1 {
                            if let ProductionSymbol::NonTerminal(nt) = &word.0[0] {
                                if member == lhs {
                                    debug!("removed unit production '{lhs} -> {nt}'");
                                }
                                continue;
                            }
                        }

                        next_productions.insert(word.clone());
                    }
                }
            }

            if !next_productions.is_empty() {
                productions.insert(lhs.clone(), next_productions);
            }
        }

        Self {
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            start_symbol: self.start_symbol.clone(),
            erasing_productions: self.erasing_productions.clone(),
            productions,
        }
    }

    pub fn reachable_non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut reachable = IndexSet::from([self.start_symbol.clone()]);
        let mut queue = VecDeque::from([self.start_symbol.clone()]);

        while let Some(current) = queue.pop_front() {
            if let Some(rhs) = self.productions.get(&current) {
                for word in rhs {
                    for symbol in word.symbols() {
                        if let ProductionSymbol::NonTerminal(nt) = symbol {
                            if reachable.insert(nt.clone()) {
                                queue.push_back(nt.clone());
                            }
                        }
                    }
                }
            }
        }

        reachable
    }

    pub fn eliminate_inaccessible_symbols(&self) -> Self {
        let reachable = self.reachable_non_terminals();

        for nt in &self.non_terminals {
            if !reachable.contains(nt) {
                debug!("removed inaccessible non-terminal {nt}");
            }
        }

        let non_terminals = self
            .non_terminals
            .iter()
            .filter(|&nt| reachable.contains(nt))
            .cloned()
            .collect::<IndexSet<_>>();
        assert!(
            non_terminals.contains(&self.start_symbol),
            "must retain start symbol"
        );

        let mut erasing_productions = self.erasing_productions.clone();
        erasing_productions.retain(|nt| reachable.contains(nt));

        // Productions of reachable non-terminals only ever mention reachable
        // symbols, so dropping the unreachable entries is enough.
        let mut productions = self.productions.clone();
        productions.retain(|lhs, _| reachable.contains(lhs));

        Self {
            non_terminals,
            terminals: self.terminals.clone(),
            start_symbol: self.start_symbol.clone(),
            erasing_productions,
            productions,
        }
    }

    pub fn productive_non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut productive = self.erasing_productions.clone();

        loop {
            let mut changed = false;

            'outer: for (lhs, rhs) in &self.productions {
                if productive.contains(lhs) {
                    continue;
                }

                for word in rhs {
                    let is_lhs_productive = word.0.iter().all(|symbol| {
                        if let ProductionSymbol::NonTerminal(nt) = symbol {
                            productive.contains(nt)
                        } else {
                            true
                        }
                    });

                    if is_lhs_productive {
                        productive.insert(lhs.clone());

                        changed = true;
                        continue 'outer;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        productive
    }

    pub fn eliminate_unproductive_symbols(&self) -> Self {
        let productive = self.productive_non_terminals();

        for nt in &self.non_terminals {
            if !productive.contains(nt) && *nt != self.start_symbol {
                debug!("removed unproductive non-terminal {nt}");
            }
        }

        // The start symbol stays declared even when it derives nothing.
        let non_terminals = self
            .non_terminals
            .iter()
            .filter(|&nt| productive.contains(nt) || *nt == self.start_symbol)
            .cloned()
            .collect::<IndexSet<_>>();

        let mut erasing_productions = self.erasing_productions.clone();
        erasing_productions.retain(|nt| non_terminals.contains(nt));

        let mut productions = IndexMap::new();

        for (lhs, rhs) in &self.productions {
            if !productive.contains(lhs) {
                continue;
            }

            let mut next_productions = IndexSet::new();

            for word in rhs {
                let is_productive_word = word.0.iter().all(|symbol| {
                    if let ProductionSymbol::NonTerminal(nt) = symbol {
                        productive.contains(nt)
                    } else {
                        true
                    }
                });

                if is_productive_word {
                    next_productions.insert(word.clone());
                } else {
                    debug!("removed production '{lhs} -> {word}' deriving no terminal string");
                }
            }

            if !next_productions.is_empty() {
                productions.insert(lhs.clone(), next_productions);
            }
        }

        Self {
            non_terminals,
            terminals: self.terminals.clone(),
            start_symbol: self.start_symbol.clone(),
            erasing_productions,
            productions,
        }
    }
}
