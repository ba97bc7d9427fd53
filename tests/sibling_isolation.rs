//! This module is an integration test for the isolation of sibling branches:
//! a store entry used on the left path must surface in left-side retrievals
//! at the branch point and stay invisible to right-side retrievals.
#![cfg(test)]

use std::collections::BTreeSet;

use tx_interpolation::{
    expr::{known::KnownWord, CompareOp, ExprContext},
    state::{ExecutionState, ProgramPoint},
    store::address::{AllocationContext, AllocationInfo, StateAddress},
    tree::{relation::BranchCondition, ITree},
    Config,
};

mod common;

use common::symbolic_byte;

#[test]
fn left_path_usage_stays_invisible_to_the_right_path() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let mut tree = ITree::new(ExecutionState::new(ProgramPoint(0), vec![]));
    let root = tree.root();

    // Store `a := 1` at the branch point; the entry is shared into both
    // children's snapshots.
    let context = AllocationContext::new(vec![], ProgramPoint(3));
    let info = AllocationInfo::new(0x40, 8);
    let offset = ctx.constant(KnownWord::zero(), 64);
    let loc = StateAddress::new(&ctx, context.clone(), info, offset);
    let one = ctx.constant(KnownWord::one(), 8);
    let address = tree.new_value(offset);
    let content = tree.new_value(one);
    tree.update_store(root, Some(loc.clone()), address, content);
    tree.values_mut().set_core(content);
    let entry = tree.find(root, &loc).expect("the entry must be present");

    // Split on `x > 0`.
    let x = symbolic_byte(&mut ctx, "x");
    let zero = ctx.constant(KnownWord::zero(), 8);
    let (left, _right) = tree.split(
        root,
        ExecutionState::new(ProgramPoint(1), vec![]),
        ExecutionState::new(ProgramPoint(2), vec![]),
    );
    tree.node_mut(left)
        .set_branch_condition(BranchCondition::new(x, zero, CompareOp::Ugt));

    // The left path overwrites `a` with a value derived from the shared
    // entry; marking that provenance registers the entry on the left side of
    // the branch point only.
    let two = ctx.constant(KnownWord::from(2u64), 8);
    let left_address = tree.new_value(offset);
    let left_content = tree.new_value(two);
    tree.values_mut().add_store_entry(left_content, entry);
    tree.update_store(left, Some(loc.clone()), left_address, left_content);

    assert!(tree.node(root).store().used_by_left_path().contains(&entry));
    assert!(tree.node(root).store().used_by_right_path().is_empty());

    // A core-only retrieval at the branch point sees the entry on the left
    // side and not on the right.
    let config = Config::default();
    let mut replacements = BTreeSet::new();
    let left_view =
        tree.stored_expressions(root, &config, true, true, &mut ctx, &mut replacements);
    let right_view =
        tree.stored_expressions(root, &config, true, false, &mut ctx, &mut replacements);

    let left_inner = left_view
        .concrete
        .get(&context)
        .expect("the left retrieval must emit the context");
    assert!(left_inner.contains_key(&loc.as_variable()));
    assert!(right_view.concrete.is_empty());

    // The full retrieval is unaffected by path usage and emits the entry on
    // both sides.
    let full_right =
        tree.stored_expressions(root, &config, false, false, &mut ctx, &mut replacements);
    assert!(full_right
        .concrete
        .get(&context)
        .is_some_and(|inner| inner.contains_key(&loc.as_variable())));

    Ok(())
}

#[test]
fn sibling_stores_do_not_leak_across_snapshots() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let mut tree = ITree::new(ExecutionState::new(ProgramPoint(0), vec![]));
    let root = tree.root();

    let context = AllocationContext::new(vec![], ProgramPoint(3));
    let info = AllocationInfo::new(0x40, 8);
    let offset = ctx.constant(KnownWord::zero(), 64);
    let loc = StateAddress::new(&ctx, context, info, offset);

    let (left, right) = tree.split(
        root,
        ExecutionState::new(ProgramPoint(1), vec![]),
        ExecutionState::new(ProgramPoint(2), vec![]),
    );

    // `a := 1` on the left path, `a := 2` on the right path.
    let one = ctx.constant(KnownWord::one(), 8);
    let two = ctx.constant(KnownWord::from(2u64), 8);
    let left_address = tree.new_value(offset);
    let left_content = tree.new_value(one);
    tree.update_store(left, Some(loc.clone()), left_address, left_content);
    let right_address = tree.new_value(offset);
    let right_content = tree.new_value(two);
    tree.update_store(right, Some(loc.clone()), right_address, right_content);

    // Each sibling sees only its own write; the branch point sees neither.
    let left_entry = tree.find(left, &loc).expect("left entry must be present");
    let right_entry = tree.find(right, &loc).expect("right entry must be present");
    assert_eq!(tree.entries().get(left_entry).content(), left_content);
    assert_eq!(tree.entries().get(right_entry).content(), right_content);
    assert_ne!(left_entry, right_entry);
    assert!(tree.find(root, &loc).is_none());

    Ok(())
}
