//! This module contains a shipped incomplete solver that decides queries by
//! syntactic inspection alone.

use crate::{
    expr::{known::KnownWord, ArrayId},
    solver::{IncompleteSolver, PartialValidity, Query},
};

/// An incomplete solver whose only decisive answers are syntactic
/// entailments: the query is the constant `true`, or the query (respectively
/// its negation, via the derived validity mode) occurs verbatim in the
/// constraint sequence.
///
/// # Soundness
///
/// Syntactic presence of `q` among the constraints means the path condition
/// contains `q` as a conjunct, so entailment holds under every assignment and
/// an authoritative solver must agree. The checker never claims that an
/// assignment *exists* — establishing satisfiability is beyond syntax — so it
/// never answers `MayBe*` and never decides invalidity on its own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyntacticSolver;

impl SyntacticSolver {
    /// Constructs a new syntactic solver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IncompleteSolver for SyntacticSolver {
    fn compute_truth(&mut self, query: &Query) -> PartialValidity {
        if query.ctx().is_true(query.expr()) {
            return PartialValidity::MustBeTrue;
        }
        if query.constraints().contains(&query.expr()) {
            return PartialValidity::MustBeTrue;
        }
        // An inconsistent path entails anything; the constant-false
        // constraint is the one inconsistency visible to syntax.
        if query.constraints().iter().any(|c| query.ctx().is_false(*c)) {
            return PartialValidity::MustBeTrue;
        }

        PartialValidity::None
    }

    fn compute_value(&mut self, query: &Query) -> Option<KnownWord> {
        query.ctx().constant_value(query.expr())
    }

    fn compute_initial_values(
        &mut self,
        _query: &Query,
        _objects: &[ArrayId],
        _values: &mut Vec<Vec<u8>>,
    ) -> Option<bool> {
        None
    }
}
