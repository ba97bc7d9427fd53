//! This module contains the record of a single memory-cell update and the
//! summary of the branch that produced a node.
//!
//! Update relations are the raw material from which a node materialises the
//! interpolant expression for a cell: each relation states that the value at
//! `base_loc` was combined, under one operation, with a known operand.

use crate::expr::{BinaryOp, CompareOp, ExprContext, ExprId};

/// The effect of one arithmetic or logical update on a memory cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateRelation {
    /// The base expression the update was observed on, set once discovered.
    base: Option<ExprId>,

    /// The location the base value was loaded from.
    base_loc: ExprId,

    /// The operand the update combined with the base value.
    value: ExprId,

    /// The location the operand was loaded from, when it came from memory.
    value_loc: Option<ExprId>,

    /// The operation applied by the update.
    operation: BinaryOp,
}

impl UpdateRelation {
    /// Constructs a new update relation applying `operation` with `value` to
    /// the cell loaded from `base_loc`.
    #[must_use]
    pub fn new(base_loc: ExprId, value: ExprId, operation: BinaryOp) -> Self {
        Self {
            base: None,
            base_loc,
            value,
            value_loc: None,
            operation,
        }
    }

    /// Sets the base expression the update was observed on.
    pub fn set_base(&mut self, base: ExprId) {
        self.base = Some(base);
    }

    /// Sets the location the operand was loaded from.
    pub fn set_value_loc(&mut self, value_loc: ExprId) {
        self.value_loc = Some(value_loc);
    }

    /// Gets the location the base value was loaded from.
    #[must_use]
    pub fn base_loc(&self) -> ExprId {
        self.base_loc
    }

    /// Gets the operand of the update.
    #[must_use]
    pub fn value(&self) -> ExprId {
        self.value
    }

    /// Gets the operation applied by the update.
    #[must_use]
    pub fn operation(&self) -> BinaryOp {
        self.operation
    }

    /// Checks whether `expr` is the base expression of this relation.
    #[must_use]
    pub fn is_base(&self, expr: ExprId) -> bool {
        self.base == Some(expr)
    }

    /// Applies the relation to `lhs` when `loc_to_compare` is the location
    /// the relation updates, returning the combined expression.
    pub fn make_expr(
        &self,
        ctx: &mut ExprContext,
        loc_to_compare: ExprId,
        lhs: ExprId,
    ) -> Option<ExprId> {
        if loc_to_compare != self.base_loc {
            return None;
        }
        Some(ctx.binary(self.operation, lhs, self.value))
    }

    /// Writes a human-readable dump of the relation to `out`, with every line
    /// prefixed by `prefix`.
    pub fn fmt_indented(&self, ctx: &ExprContext, out: &mut String, prefix: &str) {
        out.push_str(prefix);
        out.push_str(&format!(
            "{} at {} with {}",
            self.operation.mnemonic(),
            ctx.display(self.base_loc),
            ctx.display(self.value)
        ));
        if let Some(base) = self.base {
            out.push_str(&format!(" base = {}", ctx.display(base)));
        }
        if let Some(value_loc) = self.value_loc {
            out.push_str(&format!(" operand from {}", ctx.display(value_loc)));
        }
    }

    /// Renders the relation as a string with no indentation.
    #[must_use]
    pub fn dump(&self, ctx: &ExprContext) -> String {
        let mut out = String::new();
        self.fmt_indented(ctx, &mut out, "");
        out
    }
}

/// A summary of the branch that produced a node: the compared operands and
/// the comparison between them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BranchCondition {
    /// The left operand of the comparison.
    lhs: ExprId,

    /// The right operand of the comparison.
    rhs: ExprId,

    /// The comparison made at the branch.
    comparison: CompareOp,
}

impl BranchCondition {
    /// Constructs a new branch condition comparing `lhs` against `rhs`.
    #[must_use]
    pub fn new(lhs: ExprId, rhs: ExprId, comparison: CompareOp) -> Self {
        Self {
            lhs,
            rhs,
            comparison,
        }
    }

    /// Gets the left operand of the comparison.
    #[must_use]
    pub fn lhs(&self) -> ExprId {
        self.lhs
    }

    /// Gets the right operand of the comparison.
    #[must_use]
    pub fn rhs(&self) -> ExprId {
        self.rhs
    }

    /// Gets the comparison made at the branch.
    #[must_use]
    pub fn comparison(&self) -> CompareOp {
        self.comparison
    }

    /// Materialises the condition as a boolean expression.
    pub fn to_expr(&self, ctx: &mut ExprContext) -> ExprId {
        ctx.compare(self.comparison, self.lhs, self.rhs)
    }
}
