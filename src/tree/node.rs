//! This module contains the per-path node of the interpolation tree.

use crate::{
    expr::{ExprContext, ExprId},
    state::{ExecutionState, ProgramPoint},
    store::{
        value::{EntryRegistry, ValueRegistry},
        TxStore,
    },
    tree::{
        constraint::ConstraintList,
        relation::{BranchCondition, UpdateRelation},
    },
    utility::append_tab,
};

/// A handle to a node in its owning [`crate::tree::ITree`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Gets the index of the node in its owning tree.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How much of a node's interpolant has been established.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum InterpolantStatus {
    /// No interpolant has been synthesised for the node.
    #[default]
    NoInterpolant,

    /// Exactly one child subtree has produced an interpolant; composition is
    /// deferred until the sibling completes.
    HalfInterpolant,

    /// The node's interpolant is complete: either the node is a leaf that hit
    /// a proof obligation, or both children's interpolants have been composed
    /// upward.
    FullInterpolant,
}

/// A node of the interpolation tree: one state on one explored path, the
/// update relations accumulated along it, and the interpolant synthesised
/// when its subtree completes.
#[derive(Clone, Debug)]
pub struct ITreeNode {
    /// The parent of this node, absent for the root.
    parent: Option<NodeId>,

    /// The left child, once the node has split.
    left: Option<NodeId>,

    /// The right child, once the node has split.
    right: Option<NodeId>,

    /// The program point the node sits at.
    program_point: ProgramPoint,

    /// The interpreter's state snapshot for this node.
    data: ExecutionState,

    /// The node's path condition, sharing its tail with the parent's.
    constraints: ConstraintList,

    /// The committed update relations of the node.
    update_relations: Vec<UpdateRelation>,

    /// Update relations staged but not yet committed.
    new_update_relations: Vec<UpdateRelation>,

    /// The branch that produced this node, absent for the root.
    latest_branch_condition: Option<BranchCondition>,

    /// The synthesised interpolant. Only meaningful when the status is not
    /// [`InterpolantStatus::NoInterpolant`]; an absent interpolant under a
    /// full status is the formula `true`.
    interpolant: Option<ExprId>,

    /// The base location and offset the interpolant constrains, when known.
    interpolant_loc: (Option<ExprId>, Option<ExprId>),

    /// How much of the interpolant has been established.
    status: InterpolantStatus,

    /// The locations the node's state currently depends on, consulted by the
    /// subsumption check.
    dependencies_loc: Vec<ExprId>,

    /// Whether the node has been subsumed by a recorded interpolant.
    is_subsumed: bool,

    /// The node's shadow memory.
    store: TxStore,
}

impl ITreeNode {
    /// Constructs a new node under `parent` holding the provided state
    /// snapshot, path condition and shadow memory.
    pub(crate) fn new(
        parent: Option<NodeId>,
        data: ExecutionState,
        constraints: ConstraintList,
        store: TxStore,
    ) -> Self {
        let program_point = data.program_point();
        Self {
            parent,
            left: None,
            right: None,
            program_point,
            data,
            constraints,
            update_relations: Vec::new(),
            new_update_relations: Vec::new(),
            latest_branch_condition: None,
            interpolant: None,
            interpolant_loc: (None, None),
            status: InterpolantStatus::default(),
            dependencies_loc: Vec::new(),
            is_subsumed: false,
            store,
        }
    }

    /// Gets the parent of this node, absent for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Gets the left child of this node, if it has split.
    #[must_use]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Gets the right child of this node, if it has split.
    #[must_use]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub(crate) fn set_children(&mut self, left: NodeId, right: NodeId) {
        self.left = Some(left);
        self.right = Some(right);
    }

    pub(crate) fn clear_child(&mut self, child: NodeId) {
        if self.left == Some(child) {
            self.left = None;
        }
        if self.right == Some(child) {
            self.right = None;
        }
    }

    /// Gets the program point the node sits at.
    #[must_use]
    pub fn program_point(&self) -> ProgramPoint {
        self.program_point
    }

    /// Moves the node to a different program-point identifier, used when the
    /// interpreter discovers a better key for the location.
    pub fn correct_node_location(&mut self, program_point: ProgramPoint) {
        self.program_point = program_point;
        self.data.relocate(program_point);
    }

    /// Gets the interpreter's state snapshot for this node.
    #[must_use]
    pub fn data(&self) -> &ExecutionState {
        &self.data
    }

    /// Gets the interpreter's state snapshot for modification.
    pub fn data_mut(&mut self) -> &mut ExecutionState {
        &mut self.data
    }

    /// Gets the node's path condition.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintList {
        &self.constraints
    }

    /// Appends a path constraint to the node, extending both the persistent
    /// list and the state snapshot.
    pub fn add_constraint(&mut self, constraint: ExprId) {
        self.constraints = self.constraints.extend(constraint);
        self.data.add_constraint(constraint);
    }

    /// Gets the node's shadow memory.
    #[must_use]
    pub fn store(&self) -> &TxStore {
        &self.store
    }

    /// Gets the node's shadow memory for modification.
    pub fn store_mut(&mut self) -> &mut TxStore {
        &mut self.store
    }

    /// Gets the depth of the node in the tree.
    #[must_use]
    pub fn depth(&self) -> u64 {
        self.store.depth()
    }

    /// Gets the branch that produced this node.
    #[must_use]
    pub fn latest_branch_condition(&self) -> Option<&BranchCondition> {
        self.latest_branch_condition.as_ref()
    }

    /// Records the branch that produced this node.
    pub fn set_branch_condition(&mut self, condition: BranchCondition) {
        self.latest_branch_condition = Some(condition);
    }

    /// Gets the locations the node's state currently depends on.
    #[must_use]
    pub fn dependencies_loc(&self) -> &[ExprId] {
        self.dependencies_loc.as_slice()
    }

    /// Records a location the node's state depends on.
    pub fn add_dependency_loc(&mut self, loc: ExprId) {
        self.dependencies_loc.push(loc);
    }

    /// Checks whether the node has been subsumed by a recorded interpolant.
    #[must_use]
    pub fn is_subsumed(&self) -> bool {
        self.is_subsumed
    }

    pub(crate) fn set_subsumed(&mut self, subsumed: bool) {
        self.is_subsumed = subsumed;
    }

    /// Stages an update relation on the node.
    pub fn add_new_update_relation(&mut self, relation: UpdateRelation) {
        self.new_update_relations.push(relation);
    }

    /// Drains the staged update relations into `relations`.
    pub fn add_stored_new_update_relations_to(&mut self, relations: &mut Vec<UpdateRelation>) {
        relations.append(&mut self.new_update_relations);
    }

    /// Merges the provided relations into the node's committed relations.
    pub fn add_update_relations(&mut self, relations: Vec<UpdateRelation>) {
        self.update_relations.extend(relations);
    }

    /// Gets the committed update relations of the node.
    #[must_use]
    pub fn update_relations(&self) -> &[UpdateRelation] {
        self.update_relations.as_slice()
    }

    /// Gets the staged update relations of the node.
    #[must_use]
    pub fn new_update_relations(&self) -> &[UpdateRelation] {
        self.new_update_relations.as_slice()
    }

    /// Materialises a single expression from the committed update relations.
    ///
    /// `rhs` is rewritten once for each relation whose updated location
    /// occurs as a subterm of `lhs`, with the newest relation's application
    /// ending up outermost.
    pub fn build_update_expression(
        &self,
        ctx: &mut ExprContext,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ExprId {
        Self::apply_relations(&self.update_relations, ctx, lhs, rhs)
    }

    /// As [`Self::build_update_expression`], over the staged relations.
    pub fn build_new_update_expression(
        &self,
        ctx: &mut ExprContext,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ExprId {
        Self::apply_relations(&self.new_update_relations, ctx, lhs, rhs)
    }

    fn apply_relations(
        relations: &[UpdateRelation],
        ctx: &mut ExprContext,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ExprId {
        // The subterm set is deduplicated, so each relation applies at most
        // once per distinct matching subterm.
        let subterms = ctx.subterms(lhs);
        let mut out = rhs;
        for relation in relations {
            if subterms.contains(&relation.base_loc()) {
                out = ctx.binary(relation.operation(), out, relation.value());
            }
        }
        out
    }

    /// Gets the base location of the first committed relation whose base is
    /// the provided interpolant, used to fix the location of a synthesised
    /// interpolant.
    #[must_use]
    pub fn get_interpolant_base_location(&self, interpolant: ExprId) -> Option<ExprId> {
        self.update_relations
            .iter()
            .find(|relation| relation.is_base(interpolant))
            .map(UpdateRelation::base_loc)
    }

    /// Sets the node's interpolant, implying a full status.
    pub fn set_interpolant(&mut self, interpolant: ExprId) {
        self.set_interpolant_with_status(interpolant, InterpolantStatus::FullInterpolant);
    }

    /// Sets the node's interpolant together with its status.
    pub fn set_interpolant_with_status(
        &mut self,
        interpolant: ExprId,
        status: InterpolantStatus,
    ) {
        self.interpolant = Some(interpolant);
        self.status = status;
    }

    /// Sets the node's interpolant together with its location and status.
    pub fn set_interpolant_with_loc(
        &mut self,
        interpolant: ExprId,
        interpolant_loc: (Option<ExprId>, Option<ExprId>),
        status: InterpolantStatus,
    ) {
        self.interpolant = Some(interpolant);
        self.interpolant_loc = interpolant_loc;
        self.status = status;
    }

    /// Gets the node's interpolant, if one has been synthesised.
    #[must_use]
    pub fn get_interpolant(&self) -> Option<ExprId> {
        self.interpolant
    }

    /// Gets the base location and offset the interpolant constrains.
    #[must_use]
    pub fn interpolant_loc(&self) -> (Option<ExprId>, Option<ExprId>) {
        self.interpolant_loc
    }

    /// Gets how much of the interpolant has been established.
    #[must_use]
    pub fn interpolant_status(&self) -> InterpolantStatus {
        self.status
    }

    /// Sets how much of the interpolant has been established.
    pub fn set_interpolant_status(&mut self, status: InterpolantStatus) {
        self.status = status;
    }

    /// Writes a human-readable dump of the node to `out`, with every line
    /// prefixed by `prefix`.
    pub fn fmt_indented(
        &self,
        ctx: &ExprContext,
        entries: &EntryRegistry,
        values: &ValueRegistry,
        out: &mut String,
        prefix: &str,
    ) {
        let tabs_next = append_tab(prefix);

        out.push_str(prefix);
        out.push_str(&format!(
            "node at {} depth = {} status = {:?} subsumed = {}\n",
            self.program_point,
            self.depth(),
            self.status,
            self.is_subsumed
        ));

        out.push_str(prefix);
        out.push_str("interpolant = ");
        match self.interpolant {
            Some(interpolant) => out.push_str(&ctx.display(interpolant)),
            None => out.push_str("(none)"),
        }
        out.push('\n');

        if let Some(condition) = &self.latest_branch_condition {
            out.push_str(prefix);
            let materialised = format!(
                "branch = ({} {} {})",
                condition.comparison().mnemonic(),
                ctx.display(condition.lhs()),
                ctx.display(condition.rhs())
            );
            out.push_str(&materialised);
            out.push('\n');
        }

        out.push_str(prefix);
        out.push_str("constraints = [\n");
        self.constraints.fmt_indented(ctx, out, &tabs_next);
        out.push_str(prefix);
        out.push_str("]\n");

        if !self.update_relations.is_empty() {
            out.push_str(prefix);
            out.push_str("update relations = [\n");
            for relation in &self.update_relations {
                relation.fmt_indented(ctx, out, &tabs_next);
                out.push('\n');
            }
            out.push_str(prefix);
            out.push_str("]\n");
        }

        self.store.fmt_indented(ctx, entries, values, out, prefix);
    }
}
