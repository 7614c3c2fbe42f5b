use log::warn;

use crate::grammars::{
    chomsky_normal_form::ChomskyNormalFormGrammar, context_free::ContextFreeGrammar,
    types::GrammarError,
};

/// The grammar after each normalization stage, in the order the stages run.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub after_epsilon_elimination: ContextFreeGrammar,
    pub after_unit_elimination: ContextFreeGrammar,
    pub after_inaccessible_elimination: ContextFreeGrammar,
    pub after_unproductive_elimination: ContextFreeGrammar,
    pub chomsky_normal_form: ChomskyNormalFormGrammar,
}

impl ContextFreeGrammar {
    pub fn normalize(&self) -> Result<Normalization, GrammarError> {
        self.validate()?;

        let after_epsilon_elimination = self.eliminate_erasing_productions();
        after_epsilon_elimination.validate()?;

        let after_unit_elimination = after_epsilon_elimination.eliminate_unit_productions();
        after_unit_elimination.validate()?;

        let after_inaccessible_elimination = after_unit_elimination.eliminate_inaccessible_symbols();
        after_inaccessible_elimination.validate()?;

        let after_unproductive_elimination =
            after_inaccessible_elimination.eliminate_unproductive_symbols();
        after_unproductive_elimination.validate()?;

        if after_unproductive_elimination.is_empty() {
            warn!("the grammar derives no word at all; the resulting grammar is empty");
        }

        let chomsky_normal_form =
            ChomskyNormalFormGrammar::binarize(&after_unproductive_elimination)?;
        chomsky_normal_form.validate()?;

        Ok(Normalization {
            after_epsilon_elimination,
            after_unit_elimination,
            after_inaccessible_elimination,
            after_unproductive_elimination,
            chomsky_normal_form,
        })
    }

    pub fn to_chomsky_normal_form(&self) -> Result<ChomskyNormalFormGrammar, GrammarError> {
        Ok(self.normalize()?.chomsky_normal_form)
    }
}
