//! This module is an integration test for allocation recycling: when an
//! allocation context is recycled to a new generation deeper in the tree, the
//! previous generation's entries must move to the historical store and remain
//! extractable there.
#![cfg(test)]

use std::collections::BTreeSet;

use tx_interpolation::{
    expr::{known::KnownWord, ExprContext},
    state::{ExecutionState, ProgramPoint},
    store::address::{AllocationContext, AllocationInfo, StateAddress},
    tree::{node::NodeId, ITree},
    Config,
};

/// Splits repeatedly along the left spine until the frontier reaches the
/// requested depth.
fn descend_to_depth(tree: &mut ITree, from: NodeId, depth: u64) -> NodeId {
    let mut current = from;
    let mut pp = 100;
    while tree.node(current).depth() < depth {
        let (left, _right) = tree.split(
            current,
            ExecutionState::new(ProgramPoint(pp), vec![]),
            ExecutionState::new(ProgramPoint(pp + 1), vec![]),
        );
        current = left;
        pp += 2;
    }
    current
}

#[test]
fn recycling_moves_the_previous_generation_to_the_historical_store() -> anyhow::Result<()> {
    let mut ctx = ExprContext::new();
    let mut tree = ITree::new(ExecutionState::new(ProgramPoint(0), vec![]));

    let context = AllocationContext::new(vec![], ProgramPoint(9));
    let first_generation = AllocationInfo::new(0x1000, 8);
    let second_generation = AllocationInfo::new(0x2000, 8);
    let offset = ctx.constant(KnownWord::zero(), 64);

    // Write `p := v1` into the first generation at depth two.
    let root = tree.root();
    let depth_2 = descend_to_depth(&mut tree, root, 2);
    let loc_1 = StateAddress::new(&ctx, context.clone(), first_generation, offset);
    let v1 = ctx.constant(KnownWord::from(1u64), 64);
    let address_1 = tree.new_value(offset);
    let content_1 = tree.new_value(v1);
    tree.update_store(depth_2, Some(loc_1.clone()), address_1, content_1);

    // At depth five the context is recycled and `p := v2` lands in the new
    // generation.
    let depth_5 = descend_to_depth(&mut tree, depth_2, 5);
    let loc_2 = StateAddress::new(&ctx, context.clone(), second_generation, offset);
    let v2 = ctx.constant(KnownWord::from(2u64), 64);
    let address_2 = tree.new_value(offset);
    let content_2 = tree.new_value(v2);
    tree.update_store(depth_5, Some(loc_2.clone()), address_2, content_2);

    // The live store at depth five holds only the new generation's entry.
    let store = tree.node(depth_5).store();
    let middle = &store.internal()[&context];
    assert_eq!(middle.allocation_info(), second_generation);
    assert_eq!(middle.concrete_entries().len(), 1);
    let live = tree.find(depth_5, &loc_2).expect("live entry must be present");
    assert_eq!(tree.entries().get(live).content(), content_2);

    // The evicted entry is in the concretely-addressed historical store.
    let historical: Vec<_> = store.concrete_historical().values().copied().collect();
    assert_eq!(historical.len(), 1);
    assert_eq!(tree.entries().get(historical[0]).content(), content_1);

    // The node that performed the first write is unaffected by the deeper
    // recycling.
    let old_store = tree.node(depth_2).store();
    assert_eq!(
        old_store.internal()[&context].allocation_info(),
        first_generation
    );
    assert!(old_store.concrete_historical().is_empty());

    // A full retrieval at depth five surfaces the historical entry.
    let config = Config::default();
    let mut replacements = BTreeSet::new();
    let view = tree.stored_expressions(depth_5, &config, false, true, &mut ctx, &mut replacements);
    assert_eq!(view.concrete_historical.len(), 1);
    assert!(view
        .concrete_historical
        .values()
        .next()
        .is_some_and(|value| value.original() == Some(content_1)));

    Ok(())
}
