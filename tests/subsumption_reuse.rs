//! This module is an integration test that walks one linear path to an
//! interpolant, publishes it, and checks that a later visit to the same
//! program point is pruned by subsumption.
#![cfg(test)]

use tx_interpolation::{
    error::solving,
    expr::{known::KnownWord, BinaryOp, CompareOp, ExprContext},
    solver::{staged::StagedSolver, syntactic::SyntacticSolver},
    state::{ExecutionState, ProgramPoint},
    store::address::{AllocationContext, AllocationInfo, StateAddress},
    tree::{subsumption::SubsumptionTableEntry, ITree},
    Config,
};

mod common;

use common::{symbolic_byte, ScriptedSecondary};

/// The program point at which the interpolant is recorded and re-queried.
const CHECKPOINT: ProgramPoint = ProgramPoint(42);

/// Builds a tree with two nodes at [`CHECKPOINT`]: the first explored under
/// `x > 0` with `y := x + 1` stored at a fresh allocation, the second
/// revisiting under `x >= 5`. Returns the tree alongside the two node
/// handles.
fn two_visits(
    ctx: &mut ExprContext,
) -> (ITree, tx_interpolation::tree::node::NodeId, tx_interpolation::tree::node::NodeId) {
    let x = symbolic_byte(ctx, "x");
    let zero = ctx.constant(KnownWord::zero(), 8);
    let five = ctx.constant(KnownWord::from(5u64), 8);
    let x_positive = ctx.compare(CompareOp::Ugt, x, zero);
    let x_at_least_five = ctx.compare(CompareOp::Uge, x, five);

    let mut tree = ITree::new(ExecutionState::new(ProgramPoint(0), vec![]));
    let root = tree.root();
    let (first, revisit) = tree.split(
        root,
        ExecutionState::new(CHECKPOINT, vec![x_positive]),
        ExecutionState::new(CHECKPOINT, vec![x_at_least_five]),
    );

    // Both visits perform the same store of `y := x + 1`.
    for node in [first, revisit] {
        let context = AllocationContext::new(vec![], ProgramPoint(7));
        let info = AllocationInfo::new(0x100, 8);
        let offset = ctx.constant(KnownWord::zero(), 64);
        let loc = StateAddress::new(ctx, context, info, offset);

        let one = ctx.constant(KnownWord::one(), 8);
        let y = ctx.binary(BinaryOp::Add, x, one);
        let address = tree.new_value(offset);
        let content = tree.new_value(y);
        tree.update_store(node, Some(loc), address, content);
    }

    (tree, first, revisit)
}

#[test]
fn a_revisited_program_point_is_subsumed() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let (mut tree, first, revisit) = two_visits(&mut ctx);

    // The first visit completes with the interpolant `x + 1 > 1`.
    let x = symbolic_byte(&mut ctx, "x");
    let one = ctx.constant(KnownWord::one(), 8);
    let y = ctx.binary(BinaryOp::Add, x, one);
    let interpolant = ctx.compare(CompareOp::Ugt, y, one);
    tree.complete_with_interpolant(first, interpolant, &mut ctx);
    tree.store(SubsumptionTableEntry::from_node(tree.node(first)));

    // The revisiting state's constraints entail the closed interpolant; the
    // authoritative solver proves it.
    let mut staged = StagedSolver::new(
        Box::new(SyntacticSolver::new()),
        Box::new(ScriptedSecondary::always_valid()),
    );

    tree.set_current_inode(revisit);
    assert!(!tree.is_current_node_subsumed());
    tree.check_current_node_subsumption(&Config::default(), &mut staged, &mut ctx)?;

    assert!(tree.is_current_node_subsumed());

    Ok(())
}

#[test]
fn an_unprovable_entailment_leaves_the_node_unsubsumed() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let (mut tree, first, revisit) = two_visits(&mut ctx);

    let x = symbolic_byte(&mut ctx, "x");
    let one = ctx.constant(KnownWord::one(), 8);
    let y = ctx.binary(BinaryOp::Add, x, one);
    let interpolant = ctx.compare(CompareOp::Ugt, y, one);
    tree.complete_with_interpolant(first, interpolant, &mut ctx);
    tree.store(SubsumptionTableEntry::from_node(tree.node(first)));

    let mut staged = StagedSolver::new(
        Box::new(SyntacticSolver::new()),
        Box::new(ScriptedSecondary::never_valid()),
    );

    tree.set_current_inode(revisit);
    tree.check_current_node_subsumption(&Config::default(), &mut staged, &mut ctx)?;

    assert!(!tree.is_current_node_subsumed());

    Ok(())
}

#[test]
fn a_solver_timeout_is_treated_as_not_subsumed() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let (mut tree, first, revisit) = two_visits(&mut ctx);

    let x = symbolic_byte(&mut ctx, "x");
    let one = ctx.constant(KnownWord::one(), 8);
    let y = ctx.binary(BinaryOp::Add, x, one);
    let interpolant = ctx.compare(CompareOp::Ugt, y, one);
    tree.complete_with_interpolant(first, interpolant, &mut ctx);
    tree.store(SubsumptionTableEntry::from_node(tree.node(first)));

    let mut staged = StagedSolver::new(
        Box::new(SyntacticSolver::new()),
        Box::new(ScriptedSecondary::timing_out()),
    );

    // A timeout is recovered locally: the scan completes without error and
    // the node is simply not pruned.
    tree.set_current_inode(revisit);
    tree.check_current_node_subsumption(&Config::default(), &mut staged, &mut ctx)?;

    assert!(!tree.is_current_node_subsumed());

    Ok(())
}

#[test]
fn program_points_without_entries_are_never_subsumed() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let (mut tree, _first, revisit) = two_visits(&mut ctx);

    // Nothing has been published at the checkpoint yet.
    let mut staged = StagedSolver::new(
        Box::new(SyntacticSolver::new()),
        Box::new(ScriptedSecondary::always_valid()),
    );

    tree.set_current_inode(revisit);
    tree.check_current_node_subsumption(&Config::default(), &mut staged, &mut ctx)?;

    assert!(!tree.is_current_node_subsumed());

    Ok(())
}

#[test]
fn a_backend_failure_surfaces_as_a_located_error() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let (mut tree, first, revisit) = two_visits(&mut ctx);

    let x = symbolic_byte(&mut ctx, "x");
    let one = ctx.constant(KnownWord::one(), 8);
    let y = ctx.binary(BinaryOp::Add, x, one);
    let interpolant = ctx.compare(CompareOp::Ugt, y, one);
    tree.complete_with_interpolant(first, interpolant, &mut ctx);
    tree.store(SubsumptionTableEntry::from_node(tree.node(first)));

    let mut staged = StagedSolver::new(
        Box::new(SyntacticSolver::new()),
        Box::new(ScriptedSecondary::failing()),
    );

    tree.set_current_inode(revisit);
    let result = tree.check_current_node_subsumption(&Config::default(), &mut staged, &mut ctx);

    // The failure must never count as a subsumption, and it reaches the
    // interpreter located at the scanned program point.
    assert!(!tree.is_current_node_subsumed());
    let errors = result.expect_err("a backend failure must surface");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.payloads()[0].location, CHECKPOINT);
    assert!(matches!(
        &errors.payloads()[0].payload,
        tx_interpolation::error::Error::Solving(solving::Error::SolverFailure { .. })
    ));

    Ok(())
}
