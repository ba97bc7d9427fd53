//! This module is an integration test that exercises the staged composition
//! of an incomplete solver with an authoritative one.
#![cfg(test)]

use tx_interpolation::{
    expr::ExprContext,
    solver::{staged::StagedSolver, PartialValidity, Query, Solver, Validity},
};

mod common;

use common::{greater_than, symbolic_byte, FixedPrimary, ScriptedSecondary};

#[test]
fn decisive_primary_truth_short_circuits_the_secondary() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);

    let primary = FixedPrimary::answering(PartialValidity::MustBeTrue);
    let primary_calls = primary.calls.clone();
    let secondary = ScriptedSecondary::never_valid();
    let secondary_calls = secondary.calls.clone();
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    let query = Query::new(&mut ctx, &[], q, &[])?;
    assert!(staged.compute_truth(&query)?);
    assert_eq!(staged.compute_validity(&query)?, Validity::True);

    // The authoritative solver was never consulted.
    assert_eq!(secondary_calls.count(), 0);
    assert!(primary_calls.count() >= 2);

    // The concrete primary stays reachable through the composition.
    assert!(staged.primary().downcast_ref::<FixedPrimary>().is_some());

    Ok(())
}

#[test]
fn may_be_false_decides_truth_but_not_validity() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);

    let primary = FixedPrimary::answering(PartialValidity::MayBeFalse);
    let secondary = ScriptedSecondary::always_valid();
    let secondary_calls = secondary.calls.clone();
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    let query = Query::new(&mut ctx, &[], q, &[])?;

    // A known falsifying assignment refutes entailment without the
    // secondary.
    assert!(!staged.compute_truth(&query)?);
    assert_eq!(secondary_calls.count(), 0);

    // For the validity mode a may-be answer is not decisive and the query
    // falls through.
    assert_eq!(staged.compute_validity(&query)?, Validity::True);
    assert_eq!(secondary_calls.count(), 1);

    Ok(())
}

#[test]
fn unknown_primary_answers_fall_through() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);

    let primary = FixedPrimary::answering(PartialValidity::None);
    let secondary = ScriptedSecondary::always_valid();
    let secondary_calls = secondary.calls.clone();
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    let query = Query::new(&mut ctx, &[], q, &[])?;
    assert!(staged.compute_truth(&query)?);
    assert_eq!(secondary_calls.count(), 1);

    Ok(())
}

#[test]
fn initial_values_fall_through_to_a_full_assignment() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);
    let objects = [ctx.array("x", 32)];

    let primary = FixedPrimary::answering(PartialValidity::None);
    let assignment = vec![vec![7u8; 32]];
    let secondary = ScriptedSecondary::always_valid().with_assignment(assignment.clone());
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    let query = Query::new(&mut ctx, &[], q, &[])?;
    let mut values = Vec::new();
    let has_solution = staged.compute_initial_values(&query, &objects, &mut values)?;

    assert!(has_solution);
    assert_eq!(values, assignment);

    Ok(())
}

#[test]
fn initial_values_stay_untouched_without_a_solution() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);
    let objects = [ctx.array("x", 32)];

    let primary = FixedPrimary::answering(PartialValidity::None);
    let secondary = ScriptedSecondary::never_valid();
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    let query = Query::new(&mut ctx, &[], q, &[])?;
    let sentinel = vec![vec![9u8]];
    let mut values = sentinel.clone();
    let has_solution = staged.compute_initial_values(&query, &objects, &mut values)?;

    assert!(!has_solution);
    assert_eq!(values, sentinel);

    Ok(())
}

#[test]
fn administrative_operations_delegate_to_the_secondary() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);

    let primary = FixedPrimary::answering(PartialValidity::None);
    let secondary = ScriptedSecondary::always_valid();
    let timeout = secondary.timeout.clone();
    let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));

    staged.set_core_solver_timeout(2.5);
    assert!((*timeout.borrow() - 2.5).abs() < f64::EPSILON);

    let query = Query::new(&mut ctx, &[], q, &[])?;
    assert_eq!(staged.constraint_log(&query), "scripted");
    assert_eq!(
        staged.operation_status(),
        tx_interpolation::solver::OperationStatus::SuccessSolvable
    );

    Ok(())
}

#[test]
fn staged_decisions_agree_with_the_secondary_alone() -> anyhow::Result<()> {
    // For a sound primary, staging must be observationally equivalent to the
    // secondary by itself. The fixed primaries here are sound by
    // construction against the matching secondaries.
    let mut ctx = ExprContext::new();
    let x = symbolic_byte(&mut ctx, "x");
    let q = greater_than(&mut ctx, x, 0);

    let cases = [
        (PartialValidity::MustBeTrue, ScriptedSecondary::always_valid(), true),
        (PartialValidity::None, ScriptedSecondary::always_valid(), true),
        (PartialValidity::MayBeFalse, ScriptedSecondary::never_valid(), false),
        (PartialValidity::None, ScriptedSecondary::never_valid(), false),
    ];

    for (answer, secondary, expected) in cases {
        let primary = FixedPrimary::answering(answer);
        let mut staged = StagedSolver::new(Box::new(primary), Box::new(secondary));
        let query = Query::new(&mut ctx, &[], q, &[])?;
        assert_eq!(staged.compute_truth(&query)?, expected);
    }

    Ok(())
}

#[test]
fn negation_swaps_the_lattice_poles() {
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
