//! This module contains the staged composition of an incomplete solver with
//! an authoritative one.

use crate::{
    error::solving,
    expr::{known::KnownWord, ArrayId},
    solver::{IncompleteSolver, OperationStatus, PartialValidity, Query, Solver, Validity},
};

/// An adapter staging a cheap, incomplete `primary` solver in front of a
/// complete `secondary` solver, forming an optimised complete solver.
///
/// Decisive answers from the primary short-circuit the secondary; everything
/// else falls through. The administrative operations (constraint logging,
/// timeouts, operation status) always delegate to the secondary, which is the
/// only authoritative source for them.
#[derive(Debug)]
pub struct StagedSolver {
    /// The incomplete solver consulted first.
    primary: Box<dyn IncompleteSolver>,

    /// The authoritative solver answering whatever the primary cannot.
    secondary: Box<dyn Solver>,
}

impl StagedSolver {
    /// Constructs a new staged solver from the provided `primary` and
    /// `secondary`.
    #[must_use]
    pub fn new(primary: Box<dyn IncompleteSolver>, secondary: Box<dyn Solver>) -> Self {
        Self { primary, secondary }
    }

    /// Gets the incomplete primary solver.
    #[must_use]
    pub fn primary(&self) -> &dyn IncompleteSolver {
        self.primary.as_ref()
    }

    /// Gets the authoritative secondary solver.
    #[must_use]
    pub fn secondary(&self) -> &dyn Solver {
        self.secondary.as_ref()
    }
}

impl Solver for StagedSolver {
    fn compute_truth(&mut self, query: &Query) -> solving::Result<bool> {
        match self.primary.compute_truth(query) {
            PartialValidity::MustBeTrue => Ok(true),
            PartialValidity::MayBeFalse => Ok(false),
            _ => self.secondary.compute_truth(query),
        }
    }

    fn compute_validity(&mut self, query: &Query) -> solving::Result<Validity> {
        match self.primary.compute_validity(query) {
            PartialValidity::MustBeTrue => Ok(Validity::True),
            PartialValidity::MustBeFalse => Ok(Validity::False),
            _ => self.secondary.compute_validity(query),
        }
    }

    fn compute_value(&mut self, query: &Query) -> solving::Result<KnownWord> {
        if let Some(value) = self.primary.compute_value(query) {
            return Ok(value);
        }
        self.secondary.compute_value(query)
    }

    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[ArrayId],
        values: &mut Vec<Vec<u8>>,
    ) -> solving::Result<bool> {
        // The primary either answers definitively or leaves the output
        // untouched, so falling through can never hand the caller a partial
        // result.
        if let Some(has_solution) = self.primary.compute_initial_values(query, objects, values) {
            return Ok(has_solution);
        }
        self.secondary.compute_initial_values(query, objects, values)
    }

    fn constraint_log(&mut self, query: &Query) -> String {
        self.secondary.constraint_log(query)
    }

    fn set_core_solver_timeout(&mut self, seconds: f64) {
        self.secondary.set_core_solver_timeout(seconds);
    }

    fn operation_status(&self) -> OperationStatus {
        self.secondary.operation_status()
    }
}
