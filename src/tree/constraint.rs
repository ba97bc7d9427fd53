//! This module contains the persistent list that models a node's path
//! condition.
//!
//! Sibling nodes extend the same parent list, so the shared prefix is stored
//! once; extending never mutates an existing cell.

use std::rc::Rc;

use crate::expr::{ExprContext, ExprId};

/// One cell of the persistent list.
#[derive(Debug, Eq, PartialEq)]
struct Cell {
    /// The constraint recorded by this cell.
    constraint: ExprId,

    /// The rest of the path condition.
    tail: Option<Rc<Cell>>,
}

/// The path condition of a tree node, as a persistent cons list of boolean
/// expressions with tails shared between sibling nodes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstraintList {
    head: Option<Rc<Cell>>,
}

impl ConstraintList {
    /// Constructs a new, empty path condition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the path condition with `constraint`, returning the new list.
    ///
    /// The receiver is unchanged and its cells are shared with the result.
    #[must_use]
    pub fn extend(&self, constraint: ExprId) -> Self {
        Self {
            head: Some(Rc::new(Cell {
                constraint,
                tail: self.head.clone(),
            })),
        }
    }

    /// Gets the most recently added constraint, if any.
    #[must_use]
    pub fn car(&self) -> Option<ExprId> {
        self.head.as_ref().map(|cell| cell.constraint)
    }

    /// Gets the path condition without its most recently added constraint.
    #[must_use]
    pub fn cdr(&self) -> Self {
        Self {
            head: self.head.as_ref().and_then(|cell| cell.tail.clone()),
        }
    }

    /// Checks whether the path condition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Gets the number of constraints in the path condition.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut current = self.head.as_ref();
        while let Some(cell) = current {
            count += 1;
            current = cell.tail.as_ref();
        }
        count
    }

    /// Collects the constraints, newest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ExprId> {
        let mut result = Vec::new();
        let mut current = self.head.as_ref();
        while let Some(cell) = current {
            result.push(cell.constraint);
            current = cell.tail.as_ref();
        }
        result
    }

    /// Checks whether the two lists share their head cell by identity.
    ///
    /// Two empty lists share trivially. This is the observable form of the
    /// structural-sharing invariant between siblings.
    #[must_use]
    pub fn shares_cells_with(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Writes a human-readable dump of the path condition to `out`, newest
    /// constraint first, with every line prefixed by `prefix`.
    pub fn fmt_indented(&self, ctx: &ExprContext, out: &mut String, prefix: &str) {
        if self.is_empty() {
            out.push_str(prefix);
            out.push_str("[]");
            return;
        }

        for constraint in self.to_vec() {
            out.push_str(prefix);
            out.push_str(&ctx.display(constraint));
            out.push('\n');
        }
    }

    /// Renders the path condition as a string with no indentation.
    #[must_use]
    pub fn dump(&self, ctx: &ExprContext) -> String {
        let mut out = String::new();
        self.fmt_indented(ctx, &mut out, "");
        out
    }
}
