//! This module contains the addressing vocabulary of the shadow memory: the
//! identity of memory objects, symbolic addresses into them, and the
//! canonical variables under which store entries are keyed.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{
    expr::{ExprContext, ExprId},
    state::ProgramPoint,
};

/// The identity of a single memory object: the call history under which the
/// allocation was reached, plus the allocation site itself.
///
/// Two addresses share a context iff they point into the same generation of
/// the same object. Note that a context outlives any single generation; a
/// recycled allocation keeps its context but changes its
/// [`AllocationInfo`].
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AllocationContext {
    /// The call history leading to the allocation, outermost call first.
    call_history: Vec<ProgramPoint>,

    /// The program point of the allocation itself.
    allocation_site: ProgramPoint,
}

impl AllocationContext {
    /// Constructs a new allocation context for the allocation at
    /// `allocation_site` reached via `call_history`.
    #[must_use]
    pub fn new(call_history: Vec<ProgramPoint>, allocation_site: ProgramPoint) -> Self {
        Self {
            call_history,
            allocation_site,
        }
    }

    /// Gets the call history of the context, outermost call first.
    #[must_use]
    pub fn call_history(&self) -> &[ProgramPoint] {
        self.call_history.as_slice()
    }

    /// Gets the program point of the allocation site.
    #[must_use]
    pub fn allocation_site(&self) -> ProgramPoint {
        self.allocation_site
    }
}

impl Display for AllocationContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}]@{}",
            self.call_history.iter().map(ToString::to_string).join(","),
            self.allocation_site
        )
    }
}

/// One generation of an allocation: its placement and extent.
///
/// Equality is field-wise; a recycled allocation at the same context compares
/// unequal to its predecessor generation through this type.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AllocationInfo {
    /// The base of the allocation in the interpreter's address space.
    base: u64,

    /// The extent of the allocation in bytes.
    size: u64,
}

impl AllocationInfo {
    /// Constructs a new allocation generation descriptor.
    #[must_use]
    pub fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// Gets the base of the allocation.
    #[must_use]
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Gets the extent of the allocation in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Display for AllocationInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}+{}", self.base, self.size)
    }
}

/// A symbolic address on a path: an allocation generation plus a symbolic
/// offset into it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateAddress {
    /// The context of the object pointed into.
    context: AllocationContext,

    /// The generation of the object pointed into.
    info: AllocationInfo,

    /// The symbolic offset into the object.
    offset: ExprId,

    /// Whether the offset is a literal constant. Fixed at construction so the
    /// shadow memory can dispatch without consulting the expression context.
    constant_address: bool,
}

impl StateAddress {
    /// Constructs a new symbolic address, deriving the constant-address flag
    /// from the offset expression.
    #[must_use]
    pub fn new(
        ctx: &ExprContext,
        context: AllocationContext,
        info: AllocationInfo,
        offset: ExprId,
    ) -> Self {
        let constant_address = ctx.constant_value(offset).is_some();
        Self {
            context,
            info,
            offset,
            constant_address,
        }
    }

    /// Gets the allocation context of the address.
    #[must_use]
    pub fn context(&self) -> &AllocationContext {
        &self.context
    }

    /// Gets the allocation generation of the address.
    #[must_use]
    pub fn allocation_info(&self) -> AllocationInfo {
        self.info
    }

    /// Gets the symbolic offset of the address.
    #[must_use]
    pub fn offset(&self) -> ExprId {
        self.offset
    }

    /// Checks whether the offset of the address is a literal constant.
    #[must_use]
    pub fn has_constant_address(&self) -> bool {
        self.constant_address
    }

    /// Derives the canonical variable under which entries at this address are
    /// keyed in the shadow memory.
    #[must_use]
    pub fn as_variable(&self) -> Variable {
        Variable {
            context: self.context.clone(),
            offset:  self.offset,
        }
    }

    /// Writes a human-readable dump of the address to `out`, with every line
    /// prefixed by `prefix`.
    pub fn fmt_indented(&self, ctx: &ExprContext, out: &mut String, prefix: &str) {
        out.push_str(prefix);
        out.push_str(&format!(
            "{} {} offset = {}",
            self.context,
            self.info,
            ctx.display(self.offset)
        ));
    }
}

/// The canonical key of a shadow-memory cell: the allocation context plus the
/// normalised offset into it.
///
/// Offset normalisation is provided by hash-consing; structurally equal
/// offsets share an [`ExprId`], making the variable directly usable as an
/// ordered map key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Variable {
    /// The context of the object the cell lives in.
    context: AllocationContext,

    /// The normalised offset of the cell.
    offset: ExprId,
}

impl Variable {
    /// Constructs a variable directly from a context and a normalised offset.
    #[must_use]
    pub fn new(context: AllocationContext, offset: ExprId) -> Self {
        Self { context, offset }
    }

    /// Gets the allocation context of the variable.
    #[must_use]
    pub fn context(&self) -> &AllocationContext {
        &self.context
    }

    /// Gets the normalised offset of the variable.
    #[must_use]
    pub fn offset(&self) -> ExprId {
        self.offset
    }
}
