//! This module contains the registries for symbolic state values and store
//! entries, and the interpolant-form view of a stored value.
//!
//! Both registries are arenas indexed by integer handles. Handles are the
//! identity of their records: provenance sets, used-by-path sets and the
//! shadow-memory maps all share records by handle, which keeps sharing across
//! sibling branches safe without back-pointers.

use std::collections::BTreeSet;

use crate::{
    expr::{ExprContext, ExprId},
    store::address::StateAddress,
};

/// A handle to a [`StateValue`] in its owning [`ValueRegistry`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ValueId(u32);

impl ValueId {
    /// Gets the index of the value in its owning registry.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to a [`StoreEntry`] in its owning [`EntryRegistry`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntryId(u32);

impl EntryId {
    /// Gets the index of the entry in its owning registry.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A symbolic value on a path, together with the book-keeping needed to later
/// extract a minimal interpolant over the cells that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateValue {
    /// The symbolic expression of the value.
    expression: ExprId,

    /// The provenance of the value: the store entries that produced it.
    entries: BTreeSet<EntryId>,

    /// The address values through which this value was loaded. Loads at
    /// distinct addresses of the same content accumulate here.
    load_addresses: BTreeSet<ValueId>,

    /// Whether the value has flowed into an assertion the engine is trying to
    /// prove. Only core values appear in extracted interpolants.
    core: bool,
}

impl StateValue {
    /// Gets the symbolic expression of the value.
    #[must_use]
    pub fn expression(&self) -> ExprId {
        self.expression
    }

    /// Gets the provenance of the value.
    #[must_use]
    pub fn entries(&self) -> &BTreeSet<EntryId> {
        &self.entries
    }

    /// Gets the address values through which this value was loaded.
    #[must_use]
    pub fn load_addresses(&self) -> &BTreeSet<ValueId> {
        &self.load_addresses
    }

    /// Checks whether the value has flowed into a proof obligation.
    #[must_use]
    pub fn is_core(&self) -> bool {
        self.core
    }
}

/// The owning registry for all [`StateValue`]s created on a tree.
#[derive(Clone, Debug, Default)]
pub struct ValueRegistry {
    values: Vec<StateValue>,
}

impl ValueRegistry {
    /// Constructs a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh value holding `expression`, with empty provenance
    /// and the core flag unset.
    pub fn create(&mut self, expression: ExprId) -> ValueId {
        let id = ValueId(u32::try_from(self.values.len()).expect("value registry overflow"));
        self.values.push(StateValue {
            expression,
            entries: BTreeSet::new(),
            load_addresses: BTreeSet::new(),
            core: false,
        });
        id
    }

    /// Gets the value behind the provided handle.
    #[must_use]
    pub fn get(&self, id: ValueId) -> &StateValue {
        &self.values[id.index()]
    }

    /// Marks the value as having flowed into a proof obligation.
    pub fn set_core(&mut self, id: ValueId) {
        self.values[id.index()].core = true;
    }

    /// Appends a store entry to the value's provenance.
    pub fn add_store_entry(&mut self, id: ValueId, entry: EntryId) {
        self.values[id.index()].entries.insert(entry);
    }

    /// Clears the value's provenance ahead of a fresh store populating it.
    pub fn reset_store_entries(&mut self, id: ValueId) {
        self.values[id.index()].entries.clear();
    }

    /// Records `address` as an address this value was loaded through.
    pub fn add_load_address(&mut self, id: ValueId, address: ValueId) {
        self.values[id.index()].load_addresses.insert(address);
    }

    /// Gets the number of values registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An immutable record of one store to memory.
///
/// Identity is registry identity: two stores to the same slot at different
/// depths are different entries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreEntry {
    /// The address stored to.
    location: StateAddress,

    /// The value of the address itself, as computed on the path.
    address: ValueId,

    /// The value stored.
    content: ValueId,

    /// The tree depth at which the entry was created.
    depth: u64,
}

impl StoreEntry {
    /// Gets the address stored to.
    #[must_use]
    pub fn location(&self) -> &StateAddress {
        &self.location
    }

    /// Gets the value of the address itself.
    #[must_use]
    pub fn address(&self) -> ValueId {
        self.address
    }

    /// Gets the stored value.
    #[must_use]
    pub fn content(&self) -> ValueId {
        self.content
    }

    /// Gets the tree depth at which the entry was created.
    #[must_use]
    pub fn depth(&self) -> u64 {
        self.depth
    }
}

/// The owning registry for all [`StoreEntry`]s created on a tree.
#[derive(Clone, Debug, Default)]
pub struct EntryRegistry {
    entries: Vec<StoreEntry>,
}

impl EntryRegistry {
    /// Constructs a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh entry for the store of `content` through `address`
    /// to `location` at the provided tree `depth`.
    pub fn create(
        &mut self,
        location: StateAddress,
        address: ValueId,
        content: ValueId,
        depth: u64,
    ) -> EntryId {
        let id = EntryId(u32::try_from(self.entries.len()).expect("entry registry overflow"));
        self.entries.push(StoreEntry {
            location,
            address,
            content,
            depth,
        });
        id
    }

    /// Gets the entry behind the provided handle.
    #[must_use]
    pub fn get(&self, id: EntryId) -> &StoreEntry {
        &self.entries[id.index()]
    }

    /// Gets the number of entries registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes a human-readable dump of the entry to `out`, with every line
    /// prefixed by `prefix`.
    pub fn fmt_entry_indented(
        &self,
        id: EntryId,
        ctx: &ExprContext,
        values: &ValueRegistry,
        out: &mut String,
        prefix: &str,
    ) {
        let entry = self.get(id);
        out.push_str(prefix);
        out.push_str("address:\n");
        entry.location.fmt_indented(ctx, out, prefix);
        out.push('\n');
        out.push_str(prefix);
        out.push_str(&format!(
            "content: {}",
            ctx.display(values.get(entry.content).expression())
        ));
        if values.get(entry.content).is_core() {
            out.push_str(" (core)");
        }
        out.push_str(&format!(" depth = {}", entry.depth));
    }
}

/// The interpolant-form view of a stored value: the expression that will
/// appear in an interpolant, together with the original value when the full
/// (non-core-only) retrieval produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterpolantValue {
    /// The expression, post any array substitution.
    expression: ExprId,

    /// The value the expression was adapted from, kept only by full
    /// retrievals.
    original: Option<ValueId>,
}

impl InterpolantValue {
    /// Constructs the interpolant-form of `expression` with no original
    /// recorded.
    #[must_use]
    pub fn new(expression: ExprId) -> Self {
        Self {
            expression,
            original: None,
        }
    }

    /// Constructs the interpolant-form of `expression`, keeping the original
    /// value it was adapted from.
    #[must_use]
    pub fn with_original(expression: ExprId, original: ValueId) -> Self {
        Self {
            expression,
            original: Some(original),
        }
    }

    /// Gets the expression of the interpolant-form value.
    #[must_use]
    pub fn expression(&self) -> ExprId {
        self.expression
    }

    /// Gets the original value, when it was kept.
    #[must_use]
    pub fn original(&self) -> Option<ValueId> {
        self.original
    }
}
