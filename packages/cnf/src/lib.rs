//! Context-free grammar normalization into Chomsky normal form.

pub mod grammars;
pub mod language;
