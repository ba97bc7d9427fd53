//! This module contains the interpolation tree: the binary tree of per-path
//! execution states that accumulates constraints and update relations,
//! synthesises interpolants as subtrees complete, and answers subsumption
//! queries against the table of interpolants already proved.
//!
//! # Arena
//!
//! Nodes live in an arena indexed by [`node::NodeId`]; parent links are plain
//! handles and can never extend a node's lifetime. The upward marking walk of
//! the shadow memory is index chasing over the arena, and retiring a subtree
//! simply vacates its slots.

pub mod constraint;
pub mod node;
pub mod relation;
pub mod subsumption;

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    config::Config,
    error,
    expr::{ArrayId, BinaryOp, ExprContext, ExprId},
    solver::Solver,
    state::{ExecutionState, ProgramPoint},
    store::{
        address::StateAddress,
        value::{EntryId, EntryRegistry, ValueId, ValueRegistry},
        StoredExpressions, TxStore,
    },
    tree::{
        constraint::ConstraintList,
        node::{ITreeNode, InterpolantStatus, NodeId},
        subsumption::SubsumptionTableEntry,
    },
    utility::append_tab,
};

/// The interpolation tree.
///
/// The tree owns its nodes, the registries of values and store entries shared
/// between them, and the subsumption table of interpolants proved during the
/// run. The expression context stays with the driver and is passed into the
/// operations that construct terms.
#[derive(Debug)]
pub struct ITree {
    /// The node arena. Retired nodes leave vacant slots.
    nodes: Vec<Option<ITreeNode>>,

    /// The root of the tree.
    root: NodeId,

    /// The frontier node currently being executed.
    current: NodeId,

    /// The values created on this tree.
    values: ValueRegistry,

    /// The store entries created on this tree.
    entries: EntryRegistry,

    /// The interpolants proved during this run, keyed by program point.
    /// Entries are appended, never replaced.
    table: BTreeMap<ProgramPoint, Vec<SubsumptionTableEntry>>,
}

impl ITree {
    /// Constructs a new tree whose root holds the provided state snapshot.
    ///
    /// The root's path condition is seeded from the snapshot's constraints.
    #[must_use]
    pub fn new(root_state: ExecutionState) -> Self {
        let mut constraints = ConstraintList::new();
        for constraint in root_state.constraints() {
            constraints = constraints.extend(*constraint);
        }

        let root_node = ITreeNode::new(None, root_state, constraints, TxStore::new(0));
        let root = NodeId(0);
        Self {
            nodes: vec![Some(root_node)],
            root,
            current: root,
            values: ValueRegistry::new(),
            entries: EntryRegistry::new(),
            table: BTreeMap::new(),
        }
    }

    /// Gets the root of the tree.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Gets the node behind the provided handle.
    ///
    /// # Panics
    ///
    /// Panics if the node has been retired, as holding a handle past its
    /// subtree's retirement is a programmer error.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &ITreeNode {
        self.nodes[id.index()]
            .as_ref()
            .expect("Node accessed after its subtree was retired")
    }

    /// Gets the node behind the provided handle for modification.
    ///
    /// # Panics
    ///
    /// Panics if the node has been retired, as holding a handle past its
    /// subtree's retirement is a programmer error.
    pub fn node_mut(&mut self, id: NodeId) -> &mut ITreeNode {
        self.nodes[id.index()]
            .as_mut()
            .expect("Node accessed after its subtree was retired")
    }

    /// Gets the registry of values created on this tree.
    #[must_use]
    pub fn values(&self) -> &ValueRegistry {
        &self.values
    }

    /// Gets the registry of values for modification.
    pub fn values_mut(&mut self) -> &mut ValueRegistry {
        &mut self.values
    }

    /// Gets the registry of store entries created on this tree.
    #[must_use]
    pub fn entries(&self) -> &EntryRegistry {
        &self.entries
    }

    /// Registers a fresh value holding `expression`.
    pub fn new_value(&mut self, expression: ExprId) -> ValueId {
        self.values.create(expression)
    }

    /// Sets the frontier node currently being executed.
    ///
    /// # Panics
    ///
    /// Panics if the node has been retired.
    pub fn set_current_inode(&mut self, id: NodeId) {
        assert!(
            self.nodes[id.index()].is_some(),
            "The frontier cannot move to a retired node"
        );
        self.current = id;
    }

    /// Gets the frontier node currently being executed.
    #[must_use]
    pub fn current_inode(&self) -> NodeId {
        self.current
    }

    /// Checks whether the frontier node has been subsumed.
    #[must_use]
    pub fn is_current_node_subsumed(&self) -> bool {
        self.node(self.current).is_subsumed()
    }

    /// Splits `id` into left and right children holding the provided state
    /// snapshots.
    ///
    /// Each child receives a snapshot of the parent's shadow memory one depth
    /// deeper and shares the parent's path condition as the tail of its own.
    ///
    /// # Panics
    ///
    /// Panics if the node has already split, as re-splitting would orphan the
    /// existing children.
    pub fn split(
        &mut self,
        id: NodeId,
        left_data: ExecutionState,
        right_data: ExecutionState,
    ) -> (NodeId, NodeId) {
        assert!(
            self.node(id).left().is_none() && self.node(id).right().is_none(),
            "A node can only split once"
        );

        let constraints = self.node(id).constraints().clone();
        let store = self.node(id).store();

        let left_node = ITreeNode::new(
            Some(id),
            left_data,
            constraints.clone(),
            store.snapshot_for_child(),
        );
        let right_node = ITreeNode::new(
            Some(id),
            right_data,
            constraints,
            store.snapshot_for_child(),
        );

        let left = self.alloc(left_node);
        let right = self.alloc(right_node);
        self.node_mut(id).set_children(left, right);

        (left, right)
    }

    fn alloc(&mut self, node: ITreeNode) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena overflow"));
        self.nodes.push(Some(node));
        id
    }

    /// Retires the subtree rooted at `id`, vacating its arena slots and
    /// clearing the parent's child link.
    ///
    /// Values and entries created under the subtree stay in their registries;
    /// they are unreachable once no live node refers to them.
    pub fn retire_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent() {
            self.node_mut(parent).clear_child(id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.index()].take() {
                if let Some(left) = node.left() {
                    stack.push(left);
                }
                if let Some(right) = node.right() {
                    stack.push(right);
                }
            }
        }
    }

    /// Marks the provided entries as used on the path through `at`,
    /// registering each on the correct side of every ancestor created no
    /// later than the entry.
    ///
    /// Entries created in or below `at` are already locally owned and are
    /// skipped. The walk stops early at the first ancestor that already holds
    /// the entry on the relevant side, as earlier walks have registered it
    /// above.
    ///
    /// # Panics
    ///
    /// Panics if an ancestor's child pointers match neither side of the walk,
    /// which means the tree structure is corrupt.
    pub fn mark_used(&mut self, at: NodeId, entry_list: &BTreeSet<EntryId>) {
        for entry in entry_list {
            let entry_depth = self.entries.get(*entry).depth();

            // Entries can be created at a depth at or past the marking node
            // by the association of values with newly-created entries during
            // a store update.
            if entry_depth >= self.node(at).depth() {
                continue;
            }

            let mut previous = at;
            let mut current = self.node(at).parent();
            while let Some(ancestor) = current {
                if entry_depth > self.node(ancestor).depth() {
                    break;
                }

                let newly_recorded = if self.node(ancestor).left() == Some(previous) {
                    self.node_mut(ancestor).store_mut().record_used_by_left(*entry)
                } else if self.node(ancestor).right() == Some(previous) {
                    self.node_mut(ancestor)
                        .store_mut()
                        .record_used_by_right(*entry)
                } else {
                    panic!("Tree corruption: child is neither left nor right of its parent");
                };

                // Every ancestor above an already-marked one holds the entry
                // from an earlier walk.
                if !newly_recorded {
                    break;
                }

                previous = ancestor;
                current = self.node(ancestor).parent();
            }
        }
    }

    /// Records the store of `value` through `address` to `loc` on the node's
    /// shadow memory.
    ///
    /// A missing location is a no-op. The provenance of `value` is marked
    /// used before the store renews it, which is what keeps interpolants over
    /// ancestors minimal.
    pub fn update_store(
        &mut self,
        at: NodeId,
        loc: Option<StateAddress>,
        address: ValueId,
        value: ValueId,
    ) {
        let Some(loc) = loc else {
            return;
        };

        // Only used entries end up in the interpolant, so the provenance of
        // the stored value is marked before the fresh store resets it.
        let provenance = self.values.get(value).entries().clone();
        self.mark_used(at, &provenance);

        let node = self.node_mut(at);
        let store = node.store_mut();
        // The node borrows the registries' owner, so the insert goes through
        // a detached store borrow.
        let mut owned = std::mem::take(store);
        owned.insert(loc, address, value, &mut self.entries, &mut self.values);
        *self.node_mut(at).store_mut() = owned;
    }

    /// As [`Self::update_store`], additionally recording `address` as a load
    /// address of `value`.
    pub fn update_store_with_loaded_value(
        &mut self,
        at: NodeId,
        loc: Option<StateAddress>,
        address: ValueId,
        value: ValueId,
    ) {
        self.update_store(at, loc, address, value);
        self.values.add_load_address(value, address);
    }

    /// Merges the committed update relations of `from` into those of `to`,
    /// used when one node's effects continue another's path.
    pub fn merge_update_relations(&mut self, from: NodeId, to: NodeId) {
        let relations = self.node(from).update_relations().to_vec();
        self.node_mut(to).add_update_relations(relations);
    }

    /// Looks up the latest entry at `loc` in the node's shadow memory.
    #[must_use]
    pub fn find(&self, at: NodeId, loc: &StateAddress) -> Option<EntryId> {
        self.node(at).store().find(loc)
    }

    /// Finds every concretely-addressed location in the node's shadow memory
    /// whose current content is the provided expression.
    #[must_use]
    pub fn find_stored(&self, at: NodeId, expr: ExprId) -> BTreeSet<StateAddress> {
        self.node(at)
            .store()
            .find_stored(expr, &self.entries, &self.values)
    }

    /// Flattens the node's live and historical stores into their
    /// interpolant-form output maps; see
    /// [`TxStore::stored_expressions`].
    #[allow(clippy::too_many_arguments)] // The retrieval signature is pinned
    pub fn stored_expressions(
        &self,
        at: NodeId,
        config: &Config,
        core_only: bool,
        left_retrieval: bool,
        ctx: &mut ExprContext,
        replacements: &mut BTreeSet<ArrayId>,
    ) -> StoredExpressions {
        self.node(at).store().stored_expressions(
            config,
            core_only,
            left_retrieval,
            ctx,
            replacements,
            &self.entries,
            &self.values,
        )
    }

    /// Publishes a new subsumption table entry. Entries are appended, never
    /// replaced; duplicates are permitted but wasteful.
    pub fn store(&mut self, entry: SubsumptionTableEntry) {
        self.table.entry(entry.program_point()).or_default().push(entry);
    }

    /// Gets the published entries at the provided program point.
    #[must_use]
    pub fn entries_at(&self, program_point: ProgramPoint) -> &[SubsumptionTableEntry] {
        self.table
            .get(&program_point)
            .map_or(&[], |entries| entries.as_slice())
    }

    /// Scans the subsumption table for the frontier node's program point and
    /// marks the node subsumed the moment any recorded interpolant subsumes
    /// its state.
    ///
    /// Solver timeouts and unknowns leave the node unsubsumed; that direction
    /// merely loses pruning and is always sound.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] when the authoritative solver failed (for a reason
    /// other than a timeout) while checking one or more entries, with each
    /// failure located at the scanned program point. Such failures never mark
    /// the node subsumed; the interpreter decides whether to continue
    /// exploration on other paths.
    pub fn check_current_node_subsumption(
        &mut self,
        config: &Config,
        solver: &mut dyn Solver,
        ctx: &mut ExprContext,
    ) -> error::Result<()> {
        let current = self.current;
        let program_point = self.node(current).program_point();
        let state = self.node(current).data().clone();
        let dependencies: Vec<ExprId> = self.node(current).dependencies_loc().to_vec();

        let candidates: Vec<SubsumptionTableEntry> = self
            .table
            .get(&program_point)
            .cloned()
            .unwrap_or_default();

        let mut failures = error::Errors::new();
        for candidate in &candidates {
            match candidate.subsumed(ctx, solver, config, &state, &dependencies) {
                Ok(true) => {
                    self.node_mut(current).set_subsumed(true);
                    return Ok(());
                }
                Ok(false) => (),
                // A failed check cannot prune, but a later entry still can.
                Err(failure) => failures.add_located(program_point, failure.into()),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Marks `at` as a completed leaf with the provided interpolant and
    /// composes interpolants upward for every ancestor whose other subtree
    /// has also completed.
    pub fn complete_with_interpolant(
        &mut self,
        at: NodeId,
        interpolant: ExprId,
        ctx: &mut ExprContext,
    ) {
        let interpolant_loc = (
            self.node(at).get_interpolant_base_location(interpolant),
            None,
        );
        self.node_mut(at).set_interpolant_with_loc(
            interpolant,
            interpolant_loc,
            InterpolantStatus::FullInterpolant,
        );
        self.propagate_interpolants(at, ctx);
    }

    /// Composes interpolants upward from `from` while parents complete.
    ///
    /// A parent whose children have both reached a full interpolant receives
    /// `(¬c ∨ I_left) ∧ (c ∨ I_right)`, where `c` is the branch condition
    /// that selected the left child; with only one side finished the parent
    /// is marked half done and composition defers to the sibling's
    /// completion.
    pub fn propagate_interpolants(&mut self, from: NodeId, ctx: &mut ExprContext) {
        let mut current = self.node(from).parent();

        while let Some(parent) = current {
            let (Some(left), Some(right)) = (self.node(parent).left(), self.node(parent).right())
            else {
                break;
            };

            let left_done = self.node(left).interpolant_status()
                == InterpolantStatus::FullInterpolant;
            let right_done = self.node(right).interpolant_status()
                == InterpolantStatus::FullInterpolant;

            if !(left_done && right_done) {
                if left_done || right_done {
                    self.node_mut(parent)
                        .set_interpolant_status(InterpolantStatus::HalfInterpolant);
                }
                break;
            }

            // An absent interpolant under a full status is the formula true.
            let left_interpolant = self.node(left).get_interpolant().unwrap_or_else(|| ctx.true_());
            let right_interpolant =
                self.node(right).get_interpolant().unwrap_or_else(|| ctx.true_());

            let combined = match self.node(left).latest_branch_condition().cloned() {
                Some(condition) => {
                    let cond = condition.to_expr(ctx);
                    let not_cond = ctx.not(cond);
                    let left_arm = ctx.binary(BinaryOp::Or, not_cond, left_interpolant);
                    let right_arm = ctx.binary(BinaryOp::Or, cond, right_interpolant);
                    ctx.binary(BinaryOp::And, left_arm, right_arm)
                }
                // Without a recorded branch the conjunction is the sound
                // over-approximation of the join.
                None => ctx.binary(BinaryOp::And, left_interpolant, right_interpolant),
            };

            let interpolant_loc = (
                self.node(parent).get_interpolant_base_location(combined),
                None,
            );
            self.node_mut(parent).set_interpolant_with_loc(
                combined,
                interpolant_loc,
                InterpolantStatus::FullInterpolant,
            );

            current = self.node(parent).parent();
        }
    }

    /// Writes a human-readable dump of the tree to `out`, depth first with
    /// children one indent level deeper, every line prefixed by `prefix`.
    pub fn fmt_indented(&self, ctx: &ExprContext, out: &mut String, prefix: &str) {
        self.fmt_subtree(self.root, ctx, out, prefix);

        out.push_str(prefix);
        out.push_str(&format!(
            "subsumption table = [{} program points]",
            self.table.len()
        ));
    }

    fn fmt_subtree(&self, id: NodeId, ctx: &ExprContext, out: &mut String, prefix: &str) {
        let Some(node) = self.nodes[id.index()].as_ref() else {
            return;
        };
        node.fmt_indented(ctx, &self.entries, &self.values, out, prefix);
        out.push('\n');

        let tabs_next = append_tab(prefix);
        if let Some(left) = node.left() {
            self.fmt_subtree(left, ctx, out, &tabs_next);
        }
        if let Some(right) = node.right() {
            self.fmt_subtree(right, ctx, out, &tabs_next);
        }
    }

    /// Renders the tree as a string with no indentation.
    #[must_use]
    pub fn dump(&self, ctx: &ExprContext) -> String {
        let mut out = String::new();
        self.fmt_indented(ctx, &mut out, "");
        out
    }
}
