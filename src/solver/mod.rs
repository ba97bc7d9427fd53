//! This module contains the validity oracle of the interpolation core: a
//! six-valued partial-validity abstraction for cheap, incomplete decision
//! procedures, the contract of the authoritative solver behind them, and the
//! staged composition of the two.
//!
//! # Soundness
//!
//! Every *decisive* answer an incomplete solver gives must logically entail
//! the matching answer of the authoritative solver it is staged with.
//! Implementers of [`IncompleteSolver`] must satisfy this per implementation;
//! the staged composition relies on it without checking.

pub mod staged;
pub mod syntactic;

use std::fmt::Debug;

use downcast_rs::{impl_downcast, Downcast};

use crate::{
    constant::BOOL_WIDTH_BITS,
    error::solving::{self, Error},
    expr::{known::KnownWord, ArrayId, ExprContext, ExprId},
};

/// A possibly incomplete query validity.
///
/// The discriminants are chosen so that negation is a sign swap.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(i8)]
pub enum PartialValidity {
    /// The query is true under every assignment permitted by the constraints.
    MustBeTrue = 1,

    /// The query is false under every assignment permitted by the
    /// constraints.
    MustBeFalse = -1,

    /// A satisfying assignment is known to exist.
    MayBeTrue = 2,

    /// A falsifying assignment is known to exist.
    MayBeFalse = -2,

    /// Both satisfying and falsifying assignments are known to exist.
    TrueOrFalse = 0,

    /// The validity of the query is unknown.
    None = 3,
}

impl PartialValidity {
    /// Negates the partial validity: must-be and may-be answers swap their
    /// polarity, while [`Self::TrueOrFalse`] and [`Self::None`] are fixed
    /// points.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::MustBeTrue => Self::MustBeFalse,
            Self::MustBeFalse => Self::MustBeTrue,
            Self::MayBeTrue => Self::MayBeFalse,
            Self::MayBeFalse => Self::MayBeTrue,
            Self::TrueOrFalse => Self::TrueOrFalse,
            Self::None => Self::None,
        }
    }
}

/// The authoritative answer domain for validity queries.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Validity {
    /// The query holds under every assignment permitted by the constraints.
    True,

    /// The negation of the query holds under every assignment permitted by
    /// the constraints.
    False,

    /// Neither the query nor its negation is entailed.
    Unknown,
}

/// The status of the most recent authoritative-solver operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationStatus {
    /// The operation completed and the query was solvable.
    SuccessSolvable,

    /// The operation completed and the query was not solvable.
    SuccessUnsolvable,

    /// The operation hit the configured timeout.
    Timeout,

    /// The solver backend failed.
    Failure,
}

/// A single question put to the oracle: does the path condition entail the
/// query expression?
///
/// The negated query expression is pre-computed at construction so that
/// solvers never need mutable access to the expression context, and the
/// existentially quantified shadow arrays of an interpolant query travel with
/// the question for backends that understand quantification.
#[derive(Clone, Copy, Debug)]
pub struct Query<'a> {
    /// The expression context the query's terms live in.
    ctx: &'a ExprContext,

    /// The path constraints, oldest first.
    constraints: &'a [ExprId],

    /// The boolean query expression.
    expr: ExprId,

    /// The pre-computed negation of the query expression.
    negated: ExprId,

    /// Arrays to be read existentially by quantifier-aware backends.
    existentials: &'a [ArrayId],
}

impl<'a> Query<'a> {
    /// Constructs a new query asking whether `constraints` entail `expr`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `expr` is not boolean.
    pub fn new(
        ctx: &'a mut ExprContext,
        constraints: &'a [ExprId],
        expr: ExprId,
        existentials: &'a [ArrayId],
    ) -> solving::Result<Self> {
        let width = ctx.width(expr);
        if width != BOOL_WIDTH_BITS {
            return Err(Error::NonBooleanQuery { width });
        }
        let negated = ctx.not(expr);

        Ok(Self {
            ctx,
            constraints,
            expr,
            negated,
            existentials,
        })
    }

    /// Gets the expression context the query's terms live in.
    #[must_use]
    pub fn ctx(&self) -> &ExprContext {
        self.ctx
    }

    /// Gets the path constraints of the query, oldest first.
    #[must_use]
    pub fn constraints(&self) -> &[ExprId] {
        self.constraints
    }

    /// Gets the boolean query expression.
    #[must_use]
    pub fn expr(&self) -> ExprId {
        self.expr
    }

    /// Gets the pre-computed negation of the query expression.
    #[must_use]
    pub fn negated_expr(&self) -> ExprId {
        self.negated
    }

    /// Gets the arrays to be read existentially by quantifier-aware backends.
    #[must_use]
    pub fn existentials(&self) -> &[ArrayId] {
        self.existentials
    }

    /// Constructs the query for the negated expression under the same
    /// constraints.
    #[must_use]
    pub fn negated_query(&self) -> Self {
        Self {
            ctx: self.ctx,
            constraints: self.constraints,
            expr: self.negated,
            negated: self.expr,
            existentials: self.existentials,
        }
    }
}

/// The contract of an incomplete decision procedure.
///
/// Incomplete solvers are useful for implementing optimisations that may
/// quickly compute an answer but cannot always compute the correct answer.
/// Staged in front of a complete [`Solver`] they form an optimised complete
/// solver; see [`staged::StagedSolver`].
pub trait IncompleteSolver
where
    Self: Debug + Downcast,
{
    /// Determines whether the query expression is provably entailed by the
    /// constraints.
    ///
    /// The answer must be [`PartialValidity::MustBeTrue`] when entailment is
    /// proved, [`PartialValidity::MayBeFalse`] when a falsifying assignment
    /// is known, and [`PartialValidity::None`] otherwise.
    fn compute_truth(&mut self, query: &Query) -> PartialValidity;

    /// Computes a partial validity for the query.
    ///
    /// The default implementation derives the answer from [`Self::compute_truth`]
    /// on the query and its negation. Implementations may override it when a
    /// more efficient one is available.
    fn compute_validity(&mut self, query: &Query) -> PartialValidity {
        let true_result = self.compute_truth(query);
        if true_result == PartialValidity::MustBeTrue {
            return PartialValidity::MustBeTrue;
        }

        let negated = query.negated_query();
        let false_result = self.compute_truth(&negated);
        if false_result == PartialValidity::MustBeTrue {
            return PartialValidity::MustBeFalse;
        }

        let true_decided = true_result != PartialValidity::None;
        let false_decided = false_result != PartialValidity::None;
        match (true_decided, false_decided) {
            (true, true) => PartialValidity::TrueOrFalse,
            (true, false) => PartialValidity::MayBeFalse,
            (false, true) => PartialValidity::MayBeTrue,
            (false, false) => PartialValidity::None,
        }
    }

    /// Attempts to compute a concrete value for the query expression that is
    /// consistent with the constraints.
    ///
    /// Returns [`None`] when the solver cannot produce one.
    fn compute_value(&mut self, query: &Query) -> Option<KnownWord>;

    /// Attempts to compute constant initial contents for each of the given
    /// `objects`.
    ///
    /// On a definitive answer this returns `Some(has_solution)` and, when a
    /// solution exists, fills `values` with one byte vector per object. When
    /// no definitive answer can be produced it returns [`None`] and `values`
    /// must be left untouched.
    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[ArrayId],
        values: &mut Vec<Vec<u8>>,
    ) -> Option<bool>;
}

impl_downcast!(IncompleteSolver);

/// The contract of a complete, authoritative solver.
pub trait Solver
where
    Self: Debug,
{
    /// Determines whether the constraints entail the query expression.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails or times out.
    fn compute_truth(&mut self, query: &Query) -> solving::Result<bool>;

    /// Computes the validity of the query expression under the constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails or times out.
    fn compute_validity(&mut self, query: &Query) -> solving::Result<Validity>;

    /// Computes a concrete value for the query expression that is consistent
    /// with the constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails, times out, or cannot produce a
    /// value.
    fn compute_value(&mut self, query: &Query) -> solving::Result<KnownWord>;

    /// Computes constant initial contents for each of the given `objects`,
    /// filling `values` with one byte vector per object when a solution
    /// exists.
    ///
    /// Returns whether a solution exists; when it does not, `values` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails or times out.
    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[ArrayId],
        values: &mut Vec<Vec<u8>>,
    ) -> solving::Result<bool>;

    /// Gets a rendering of the query as the backend would receive it, for
    /// diagnostics.
    fn constraint_log(&mut self, query: &Query) -> String;

    /// Sets the timeout applied to backend calls, in seconds. Zero disables
    /// the timeout.
    fn set_core_solver_timeout(&mut self, seconds: f64);

    /// Gets the status of the most recent backend operation.
    fn operation_status(&self) -> OperationStatus;
}

#[cfg(test)]
mod test {
    use crate::solver::PartialValidity;

    #[test]
    fn negation_swaps_polarity_and_fixes_the_rest() {
        assert_eq!(
            PartialValidity::MustBeTrue.negate(),
            PartialValidity::MustBeFalse
        );
        assert_eq!(
            PartialValidity::MayBeTrue.negate(),
            PartialValidity::MayBeFalse
        );
        assert_eq!(
            PartialValidity::TrueOrFalse.negate(),
            PartialValidity::TrueOrFalse
        );
        assert_eq!(PartialValidity::None.negate(), PartialValidity::None);
    }

    #[test]
    fn negation_is_an_involution() {
        let all = [
            PartialValidity::MustBeTrue,
            PartialValidity::MustBeFalse,
            PartialValidity::MayBeTrue,
            PartialValidity::MayBeFalse,
            PartialValidity::TrueOrFalse,
            PartialValidity::None,
        ];
        for validity in all {
            assert_eq!(validity.negate().negate(), validity);
        }
    }

    #[test]
    fn discriminants_negate_by_sign_swap() {
        let all = [
            PartialValidity::MustBeTrue,
            PartialValidity::MustBeFalse,
            PartialValidity::MayBeTrue,
            PartialValidity::MayBeFalse,
            PartialValidity::TrueOrFalse,
        ];
        for validity in all {
            assert_eq!(validity.negate() as i8, -(validity as i8));
        }
    }
}
