//! This module contains common testing utilities for testing this library.
#![cfg(test)]
#![allow(dead_code)] // Each integration test compiles its own view of these

use std::{cell::RefCell, rc::Rc};

use tx_interpolation::{
    error::solving,
    expr::{known::KnownWord, ArrayId, CompareOp, ExprContext, ExprId},
    solver::{IncompleteSolver, OperationStatus, PartialValidity, Query, Solver, Validity},
};

/// A call counter that stays observable after its solver has been moved into
/// a staged composition.
#[derive(Clone, Debug, Default)]
pub struct CallCounter(Rc<RefCell<usize>>);

impl CallCounter {
    /// Creates a counter at zero.
    #[allow(unused)] // It is actually
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the number of recorded calls.
    #[allow(unused)] // It is actually
    pub fn count(&self) -> usize {
        *self.0.borrow()
    }

    fn bump(&self) {
        *self.0.borrow_mut() += 1;
    }
}

/// An incomplete solver answering every truth query with one fixed partial
/// validity, counting its calls.
#[derive(Debug)]
pub struct FixedPrimary {
    /// The answer given to every truth query.
    pub answer: PartialValidity,

    /// The calls made to the solver.
    pub calls: CallCounter,
}

impl FixedPrimary {
    /// Creates a primary that always answers with `answer`.
    #[allow(unused)] // It is actually
    pub fn answering(answer: PartialValidity) -> Self {
        Self {
            answer,
            calls: CallCounter::new(),
        }
    }
}

impl IncompleteSolver for FixedPrimary {
    fn compute_truth(&mut self, _query: &Query) -> PartialValidity {
        self.calls.bump();
        self.answer
    }

    fn compute_value(&mut self, _query: &Query) -> Option<KnownWord> {
        None
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

/// An authoritative solver answering from a fixed script, counting its calls.
#[derive(Debug)]
pub struct ScriptedSecondary {
    /// The answer given to every truth query.
    pub truth: solving::Result<bool>,

    /// The answer given to every validity query.
    pub validity: solving::Result<Validity>,

    /// The assignment handed out by initial-value queries; [`None`] means no
    /// solution exists.
    pub assignment: Option<Vec<Vec<u8>>>,

    /// The calls made to the solver.
    pub calls: CallCounter,

    /// The most recent timeout the solver was configured with.
    pub timeout: Rc<RefCell<f64>>,
}

impl ScriptedSecondary {
    /// Creates a secondary that proves every truth query.
    #[allow(unused)] // It is actually
    pub fn always_valid() -> Self {
        Self {
            truth: Ok(true),
            validity: Ok(Validity::True),
            assignment: None,
            calls: CallCounter::new(),
            timeout: Rc::new(RefCell::new(0.0)),
        }
    }

    /// Creates a secondary that refutes every truth query.
    #[allow(unused)] // It is actually
    pub fn never_valid() -> Self {
        Self {
            truth: Ok(false),
            validity: Ok(Validity::False),
            assignment: None,
            calls: CallCounter::new(),
            timeout: Rc::new(RefCell::new(0.0)),
        }
    }

    /// Creates a secondary that times out on every query.
    #[allow(unused)] // It is actually
    pub fn timing_out() -> Self {
        Self {
            truth: Err(solving::Error::Timeout { seconds: 1 }),
            validity: Err(solving::Error::Timeout { seconds: 1 }),
            assignment: None,
            calls: CallCounter::new(),
            timeout: Rc::new(RefCell::new(0.0)),
        }
    }

    /// Creates a secondary whose backend fails on every query.
    #[allow(unused)] // It is actually
    pub fn failing() -> Self {
        Self {
            truth: Err(solving::Error::SolverFailure {
                message: String::from("backend unavailable"),
            }),
            validity: Err(solving::Error::SolverFailure {
                message: String::from("backend unavailable"),
            }),
            assignment: None,
            calls: CallCounter::new(),
            timeout: Rc::new(RefCell::new(0.0)),
        }
    }

    /// Attaches an assignment handed out by initial-value queries.
    #[allow(unused)] // It is actually
    pub fn with_assignment(mut self, assignment: Vec<Vec<u8>>) -> Self {
        self.assignment = Some(assignment);
        self
    }
}

impl Solver for ScriptedSecondary {
    fn compute_truth(&mut self, _query: &Query) -> solving::Result<bool> {
        self.calls.bump();
        self.truth.clone()
    }

    fn compute_validity(&mut self, _query: &Query) -> solving::Result<Validity> {
        self.calls.bump();
        self.validity.clone()
    }

    fn compute_value(&mut self, _query: &Query) -> solving::Result<KnownWord> {
        self.calls.bump();
        Err(solving::Error::NoValueAvailable)
    }

    fn compute_initial_values(
        &mut self,
        _query: &Query,
        _objects: &[ArrayId],
        values: &mut Vec<Vec<u8>>,
    ) -> solving::Result<bool> {
        self.calls.bump();
        match &self.assignment {
            Some(assignment) => {
                *values = assignment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn constraint_log(&mut self, _query: &Query) -> String {
        String::from("scripted")
    }

    fn set_core_solver_timeout(&mut self, seconds: f64) {
        *self.timeout.borrow_mut() = seconds;
    }

    fn operation_status(&self) -> OperationStatus {
        OperationStatus::SuccessSolvable
    }
}

/// Creates a symbolic byte named `name`, as a read of the backing array at
/// index zero.
#[allow(unused)] // It is actually
pub fn symbolic_byte(ctx: &mut ExprContext, name: &str) -> ExprId {
    let array = ctx.array(name, 32);
    let index = ctx.constant(KnownWord::zero(), 256);
    ctx.read(array, index)
}

/// Creates the constraint `value > bound` over a symbolic byte.
#[allow(unused)] // It is actually
pub fn greater_than(ctx: &mut ExprContext, value: ExprId, bound: u64) -> ExprId {
    let bound = ctx.constant(KnownWord::from(bound), 8);
    ctx.compare(CompareOp::Ugt, value, bound)
}
