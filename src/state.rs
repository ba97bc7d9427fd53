//! This module contains the state contract pinned between the interpolation
//! core and the interpreter that drives it.
//!
//! The interpreter owns the real execution state; the core only requires the
//! parts pinned here: a program-point identity for every instruction, and a
//! snapshot of the path constraints under which a node is being explored.

use std::fmt::{Display, Formatter};

use crate::expr::ExprId;

/// The identity of a single instruction in the program under analysis,
/// combined with enough calling context to distinguish inlined copies.
///
/// Program points key the subsumption table and locate errors.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProgramPoint(pub u64);

impl Display for ProgramPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pp{}", self.0)
    }
}

/// A snapshot of the interpreter's execution state as seen by the core.
///
/// The snapshot is taken when a tree node is created and is consulted when the
/// node is checked for subsumption. It is deliberately minimal; evaluation of
/// address expressions to [`crate::store::StateAddress`]es stays on the
/// interpreter's side of the boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionState {
    /// The program point the state is currently at.
    program_point: ProgramPoint,

    /// The path constraints accumulated along the path to this state, oldest
    /// first.
    constraints: Vec<ExprId>,
}

impl ExecutionState {
    /// Constructs a new execution state snapshot at `program_point` under the
    /// provided path `constraints`.
    #[must_use]
    pub fn new(program_point: ProgramPoint, constraints: Vec<ExprId>) -> Self {
        Self {
            program_point,
            constraints,
        }
    }

    /// Gets the program point the state is at.
    #[must_use]
    pub fn program_point(&self) -> ProgramPoint {
        self.program_point
    }

    /// Gets the path constraints of the state, oldest first.
    #[must_use]
    pub fn constraints(&self) -> &[ExprId] {
        self.constraints.as_slice()
    }

    /// Appends a path constraint to the snapshot.
    pub fn add_constraint(&mut self, constraint: ExprId) {
        self.constraints.push(constraint);
    }

    /// Moves the state to a different program point.
    pub fn relocate(&mut self, program_point: ProgramPoint) {
        self.program_point = program_point;
    }
}
