//! This module contains the cache records published at program points and
//! the subsumption test that decides whether a freshly reached state can be
//! pruned.

use std::collections::BTreeSet;

use crate::{
    config::Config,
    error::solving::{self, Error},
    expr::{ArrayId, BinaryOp, CompareOp, ExprContext, ExprId},
    solver::{Query, Solver},
    state::{ExecutionState, ProgramPoint},
    tree::node::ITreeNode,
};

/// A cache record: a proved interpolant at a program point, together with the
/// location it constrains.
///
/// Multiple entries may exist per program point; a state is pruned the moment
/// any one of them subsumes it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubsumptionTableEntry {
    /// The program point the interpolant was proved at.
    program_point: ProgramPoint,

    /// The proved interpolant. Absent means the trivially-true interpolant.
    interpolant: Option<ExprId>,

    /// The base location and offset the interpolant constrains, when known.
    interpolant_loc: (Option<ExprId>, Option<ExprId>),
}

impl SubsumptionTableEntry {
    /// Constructs a new entry for the provided program point.
    #[must_use]
    pub fn new(
        program_point: ProgramPoint,
        interpolant: Option<ExprId>,
        interpolant_loc: (Option<ExprId>, Option<ExprId>),
    ) -> Self {
        Self {
            program_point,
            interpolant,
            interpolant_loc,
        }
    }

    /// Constructs the entry recording the provided node's interpolant at the
    /// node's program point.
    #[must_use]
    pub fn from_node(node: &ITreeNode) -> Self {
        Self {
            program_point: node.program_point(),
            interpolant: node.get_interpolant(),
            interpolant_loc: node.interpolant_loc(),
        }
    }

    /// Gets the program point the interpolant was proved at.
    #[must_use]
    pub fn program_point(&self) -> ProgramPoint {
        self.program_point
    }

    /// Gets the proved interpolant, absent for the trivially-true one.
    #[must_use]
    pub fn interpolant(&self) -> Option<ExprId> {
        self.interpolant
    }

    /// Gets the base location and offset the interpolant constrains.
    #[must_use]
    pub fn interpolant_loc(&self) -> (Option<ExprId>, Option<ExprId>) {
        self.interpolant_loc
    }

    /// Decides whether the querying state is subsumed by this entry.
    ///
    /// The state is subsumed iff its constraints entail the existential
    /// closure of the interpolant over its free arrays *and* the state
    /// currently accesses the recorded location under an address that is
    /// provably the recorded one. An unknown answer or a solver timeout makes
    /// the result `Ok(false)`: the false-negative direction merely loses
    /// pruning, while the false-positive direction would be unsound.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] when the authoritative solver fails for a reason other
    /// than a timeout; the caller must surface such failures rather than
    /// recover from them.
    pub fn subsumed(
        &self,
        ctx: &mut ExprContext,
        solver: &mut dyn Solver,
        config: &Config,
        state: &ExecutionState,
        dependencies_loc: &[ExprId],
    ) -> solving::Result<bool> {
        if let Some(interpolant) = self.interpolant {
            let mut replacements = BTreeSet::new();
            let closed = if config.use_existential_substitution() {
                ctx.existential_shadow(interpolant, &mut replacements)
            } else {
                interpolant
            };
            let existentials: Vec<ArrayId> = replacements.into_iter().collect();
            let constraints = state.constraints().to_vec();

            let query = Query::new(ctx, &constraints, closed, &existentials)?;
            match solver.compute_truth(&query) {
                Ok(true) => (),
                // A timeout is recovered locally as "not subsumed".
                Ok(false) | Err(Error::Timeout { .. }) => return Ok(false),
                Err(error) => return Err(error),
            }
        }

        self.location_check(ctx, solver, state, dependencies_loc)
    }

    /// Checks that the state accesses the recorded location.
    ///
    /// An entry with no recorded location passes trivially. Otherwise some
    /// dependency location of the querying node must be structurally equal to
    /// the recorded address, or provably equal to it under the state's
    /// constraints. Timeouts leave the dependency undecided and the scan
    /// moves on; other solver failures propagate.
    fn location_check(
        &self,
        ctx: &mut ExprContext,
        solver: &mut dyn Solver,
        state: &ExecutionState,
        dependencies_loc: &[ExprId],
    ) -> solving::Result<bool> {
        let Some(base) = self.interpolant_loc.0 else {
            return Ok(true);
        };
        let target = match self.interpolant_loc.1 {
            Some(offset) if ctx.width(offset) == ctx.width(base) => {
                ctx.binary(BinaryOp::Add, base, offset)
            }
            _ => base,
        };

        let constraints = state.constraints().to_vec();
        for dependency in dependencies_loc {
            if *dependency == target {
                return Ok(true);
            }
            if ctx.width(*dependency) != ctx.width(target) {
                continue;
            }

            let equality = ctx.compare(CompareOp::Eq, *dependency, target);
            let query = Query::new(ctx, &constraints, equality, &[])?;
            match solver.compute_truth(&query) {
                Ok(true) => return Ok(true),
                Ok(false) | Err(Error::Timeout { .. }) => (),
                Err(error) => return Err(error),
            }
        }

        Ok(false)
    }

    /// Writes a human-readable dump of the entry to `out`, with every line
    /// prefixed by `prefix`.
    pub fn fmt_indented(&self, ctx: &ExprContext, out: &mut String, prefix: &str) {
        out.push_str(prefix);
        out.push_str(&format!("subsumption entry at {}\n", self.program_point));
        out.push_str(prefix);
        out.push_str("interpolant = ");
        match self.interpolant {
            Some(interpolant) => out.push_str(&ctx.display(interpolant)),
            None => out.push_str("true"),
        }
        if let Some(base) = self.interpolant_loc.0 {
            out.push('\n');
            out.push_str(prefix);
            out.push_str(&format!("location = {}", ctx.display(base)));
            if let Some(offset) = self.interpolant_loc.1 {
                out.push_str(&format!(" + {}", ctx.display(offset)));
            }
        }
    }

    /// Renders the entry as a string with no indentation.
    #[must_use]
    pub fn dump(&self, ctx: &ExprContext) -> String {
        let mut out = String::new();
        self.fmt_indented(ctx, &mut out, "");
        out
    }
}
