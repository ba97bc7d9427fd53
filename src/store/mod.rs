//! This module contains the shadow memory of the interpolation core.
//!
//! The shadow memory mirrors program memory on a per-path basis, recording for
//! every cell the latest value written together with the provenance needed to
//! later extract a minimal interpolant over exactly the cells that mattered.
//!
//! # Layout
//!
//! The store is a two-level structure. The top level maps an
//! [`address::AllocationContext`] to the [`MiddleStore`] of that object
//! generation; the middle level keys entries by [`address::Variable`], split
//! into a concretely-addressed and a symbolically-addressed map depending on
//! whether the written address had a literal offset.
//!
//! When an allocation context is recycled to a new generation, the previous
//! generation's entries are moved into the *historical* stores. They remain
//! reachable so that interpolants over past states stay extractable.

pub mod address;
pub mod value;

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    config::Config,
    expr::{ArrayId, ExprContext, ExprId},
    store::{
        address::{AllocationContext, AllocationInfo, StateAddress, Variable},
        value::{EntryId, EntryRegistry, InterpolantValue, ValueId, ValueRegistry},
    },
    utility::append_tab,
};

/// The per-context map from variables to interpolant-form values produced by
/// a retrieval.
pub type LowerInterpolantStore = BTreeMap<Variable, InterpolantValue>;

/// The retrieval output keyed by allocation context. Contexts whose inner
/// maps would be empty are elided.
pub type TopInterpolantStore = BTreeMap<AllocationContext, LowerInterpolantStore>;

/// The four output maps of a shadow-memory retrieval: live and historical
/// entries, each split by address constancy.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StoredExpressions {
    /// Concretely-addressed live entries.
    pub concrete: TopInterpolantStore,

    /// Symbolically-addressed live entries.
    pub symbolic: TopInterpolantStore,

    /// Concretely-addressed entries evicted by allocation recycling.
    pub concrete_historical: LowerInterpolantStore,

    /// Symbolically-addressed entries evicted by allocation recycling.
    pub symbolic_historical: LowerInterpolantStore,
}

/// The per-object slice of the shadow memory: one allocation generation and
/// the entries written into it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MiddleStore {
    /// The generation this store belongs to.
    alloc_info: AllocationInfo,

    /// Entries whose addresses have literal offsets.
    concrete: BTreeMap<Variable, EntryId>,

    /// Entries whose addresses have symbolic offsets.
    symbolic: BTreeMap<Variable, EntryId>,
}

impl MiddleStore {
    /// Constructs a new, empty store for the provided generation.
    #[must_use]
    pub fn new(alloc_info: AllocationInfo) -> Self {
        Self {
            alloc_info,
            concrete: BTreeMap::new(),
            symbolic: BTreeMap::new(),
        }
    }

    /// Gets the generation this store belongs to.
    #[must_use]
    pub fn allocation_info(&self) -> AllocationInfo {
        self.alloc_info
    }

    /// Checks whether this store belongs to the provided generation.
    #[must_use]
    pub fn has_allocation_info(&self, info: AllocationInfo) -> bool {
        self.alloc_info == info
    }

    /// Looks up the latest entry at `loc`, dispatching on the constancy of
    /// the address.
    #[must_use]
    pub fn find(&self, loc: &StateAddress) -> Option<EntryId> {
        let map = if loc.has_constant_address() {
            &self.concrete
        } else {
            &self.symbolic
        };
        map.get(&loc.as_variable()).copied()
    }

    /// Records the store of `content` through `address` to `loc` at the
    /// provided tree `depth`.
    ///
    /// Returns the new entry, or [`None`] when `loc` belongs to a different
    /// generation than this store; the caller must then evict this store to
    /// the historical maps and retry against a fresh one.
    pub fn update_store(
        &mut self,
        loc: StateAddress,
        address: ValueId,
        content: ValueId,
        depth: u64,
        entries: &mut EntryRegistry,
    ) -> Option<EntryId> {
        if loc.allocation_info() != self.alloc_info {
            return None;
        }

        let variable = loc.as_variable();
        let concrete = loc.has_constant_address();
        let entry = entries.create(loc, address, content, depth);
        let map = if concrete {
            &mut self.concrete
        } else {
            &mut self.symbolic
        };
        map.insert(variable, entry);
        Some(entry)
    }

    /// Gets the concretely-addressed entries of this store.
    #[must_use]
    pub fn concrete_entries(&self) -> &BTreeMap<Variable, EntryId> {
        &self.concrete
    }

    /// Gets the symbolically-addressed entries of this store.
    #[must_use]
    pub fn symbolic_entries(&self) -> &BTreeMap<Variable, EntryId> {
        &self.symbolic
    }

    /// Writes a human-readable dump of the store to `out`, with every line
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
        out.push_str(&format!("{}:", self.alloc_info));

        Self::fmt_entry_map(
            "concretely-addressed store",
            &self.concrete,
            ctx,
            entries,
            values,
            out,
            prefix,
            &tabs_next,
        );
        Self::fmt_entry_map(
            "symbolically-addressed store",
            &self.symbolic,
            ctx,
            entries,
            values,
            out,
            prefix,
            &tabs_next,
        );
    }

    /// Writes one named entry map in the shared dump format.
    #[allow(clippy::too_many_arguments)] // The dump plumbing is internal
    fn fmt_entry_map(
        label: &str,
        map: &BTreeMap<Variable, EntryId>,
        ctx: &ExprContext,
        entries: &EntryRegistry,
        values: &ValueRegistry,
        out: &mut String,
        prefix: &str,
        tabs_next: &str,
    ) {
        out.push('\n');
        out.push_str(prefix);
        out.push_str(label);
        out.push_str(" = [");
        if !map.is_empty() {
            out.push('\n');
            for (position, entry) in map.values().enumerate() {
                if position > 0 {
                    out.push_str(tabs_next);
                    out.push_str("------------------------------------------\n");
                }
                entries.fmt_entry_indented(*entry, ctx, values, out, tabs_next);
                out.push('\n');
            }
            out.push_str(prefix);
        }
        out.push(']');
    }
}

/// The per-path shadow memory.
///
/// A store belongs to exactly one tree node and carries the node's depth; the
/// used-by-path sets record which inherited entries each child path has been
/// proven to depend on. The sets are append-only, which is what makes the
/// upward marking walk safe to run from either sibling in any order.
#[derive(Clone, Debug, Default)]
pub struct TxStore {
    /// The tree depth of the owning node.
    depth: u64,

    /// The live stores, one per allocation context.
    internal: BTreeMap<AllocationContext, MiddleStore>,

    /// Concretely-addressed entries evicted by allocation recycling.
    concrete_historical: BTreeMap<Variable, EntryId>,

    /// Symbolically-addressed entries evicted by allocation recycling.
    symbolic_historical: BTreeMap<Variable, EntryId>,

    /// Entries proven relevant to the left child path.
    used_by_left_path: BTreeSet<EntryId>,

    /// Entries proven relevant to the right child path.
    used_by_right_path: BTreeSet<EntryId>,
}

impl TxStore {
    /// Constructs a new, empty store at the provided tree `depth`.
    #[must_use]
    pub fn new(depth: u64) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Constructs the child snapshot of this store at `depth + 1`.
    ///
    /// Live and historical entries are shared by handle; the used-by-path
    /// sets start empty as nothing has yet been proven about the child's
    /// paths.
    #[must_use]
    pub fn snapshot_for_child(&self) -> Self {
        Self {
            depth: self.depth + 1,
            internal: self.internal.clone(),
            concrete_historical: self.concrete_historical.clone(),
            symbolic_historical: self.symbolic_historical.clone(),
            used_by_left_path: BTreeSet::new(),
            used_by_right_path: BTreeSet::new(),
        }
    }

    /// Gets the tree depth of the owning node.
    #[must_use]
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Looks up the latest entry at `loc`.
    #[must_use]
    pub fn find(&self, loc: &StateAddress) -> Option<EntryId> {
        self.internal
            .get(loc.context())
            .and_then(|middle| middle.find(loc))
    }

    /// Finds every concretely-addressed location whose current content is the
    /// provided expression.
    ///
    /// This is the reverse index used to discover where a symbolic value
    /// currently resides in memory.
    #[must_use]
    pub fn find_stored(
        &self,
        expr: ExprId,
        entries: &EntryRegistry,
        values: &ValueRegistry,
    ) -> BTreeSet<StateAddress> {
        let mut result = BTreeSet::new();
        for middle in self.internal.values() {
            for entry in middle.concrete_entries().values() {
                let record = entries.get(*entry);
                if values.get(record.content()).expression() == expr {
                    result.insert(record.location().clone());
                }
            }
        }
        result
    }

    /// Records the store of `content` through `address` to `loc`.
    ///
    /// The caller is responsible for having already marked the provenance of
    /// `content` as used (the upward walk needs the tree, which the store
    /// cannot see); this method renews the provenance list and performs the
    /// insert, evicting a stale generation to the historical stores when the
    /// allocation has been recycled.
    pub fn insert(
        &mut self,
        loc: StateAddress,
        address: ValueId,
        content: ValueId,
        entries: &mut EntryRegistry,
        values: &mut ValueRegistry,
    ) {
        // A fresh store is about to populate the provenance list.
        values.reset_store_entries(content);

        if let Some(middle) = self.internal.get_mut(loc.context()) {
            if middle.has_allocation_info(loc.allocation_info()) {
                if let Some(entry) =
                    middle.update_store(loc, address, content, self.depth, entries)
                {
                    // The entry is important whenever the value is used; this
                    // drives the interpolant computation.
                    values.add_store_entry(content, entry);
                }
                return;
            }

            // The allocation has been recycled: save the old generation. The
            // earliest evicted entry wins a key collision.
            for (variable, entry) in middle.concrete_entries() {
                self.concrete_historical
                    .entry(variable.clone())
                    .or_insert(*entry);
            }
            for (variable, entry) in middle.symbolic_entries() {
                self.symbolic_historical
                    .entry(variable.clone())
                    .or_insert(*entry);
            }
        }

        let context = loc.context().clone();
        let mut fresh = MiddleStore::new(loc.allocation_info());
        if let Some(entry) = fresh.update_store(loc, address, content, self.depth, entries) {
            values.add_store_entry(content, entry);
        }
        self.internal.insert(context, fresh);
    }

    /// Records `entry` as used by the left child path.
    ///
    /// Returns `true` when the entry was not already recorded on that side.
    pub fn record_used_by_left(&mut self, entry: EntryId) -> bool {
        self.used_by_left_path.insert(entry)
    }

    /// Records `entry` as used by the right child path.
    ///
    /// Returns `true` when the entry was not already recorded on that side.
    pub fn record_used_by_right(&mut self, entry: EntryId) -> bool {
        self.used_by_right_path.insert(entry)
    }

    /// Gets the entries proven relevant to the left child path.
    #[must_use]
    pub fn used_by_left_path(&self) -> &BTreeSet<EntryId> {
        &self.used_by_left_path
    }

    /// Gets the entries proven relevant to the right child path.
    #[must_use]
    pub fn used_by_right_path(&self) -> &BTreeSet<EntryId> {
        &self.used_by_right_path
    }

    /// Gets the live stores of this shadow memory.
    #[must_use]
    pub fn internal(&self) -> &BTreeMap<AllocationContext, MiddleStore> {
        &self.internal
    }

    /// Gets the concretely-addressed historical store.
    #[must_use]
    pub fn concrete_historical(&self) -> &BTreeMap<Variable, EntryId> {
        &self.concrete_historical
    }

    /// Gets the symbolically-addressed historical store.
    #[must_use]
    pub fn symbolic_historical(&self) -> &BTreeMap<Variable, EntryId> {
        &self.symbolic_historical
    }

    /// Flattens the live and historical stores into their interpolant-form
    /// output maps.
    ///
    /// When `core_only` is `false`, every entry is emitted with its original
    /// value kept. When it is `true`, an entry is emitted only when its
    /// content carries the core flag *and* the entry appears in this store's
    /// used-by set for the side selected by `left_retrieval`; the emitted
    /// expressions pass through existential shadow substitution unless the
    /// configuration suppresses it, and symbolically-addressed entries are
    /// re-keyed by their substituted addresses.
    #[allow(clippy::too_many_arguments)] // The retrieval signature is pinned
    pub fn stored_expressions(
        &self,
        config: &Config,
        core_only: bool,
        left_retrieval: bool,
        ctx: &mut ExprContext,
        replacements: &mut BTreeSet<ArrayId>,
        entries: &EntryRegistry,
        values: &ValueRegistry,
    ) -> StoredExpressions {
        let substitute = config.use_existential_substitution();
        let mut result = StoredExpressions::default();

        for (context, middle) in &self.internal {
            let mut concrete_map = LowerInterpolantStore::new();
            for (variable, entry) in middle.concrete_entries() {
                self.concrete_to_interpolant(
                    variable,
                    *entry,
                    core_only,
                    left_retrieval,
                    substitute,
                    ctx,
                    replacements,
                    entries,
                    values,
                    &mut concrete_map,
                );
            }
            // Contexts with no emitted entries are elided from the output.
            if !concrete_map.is_empty() {
                result.concrete.insert(context.clone(), concrete_map);
            }

            let mut symbolic_map = LowerInterpolantStore::new();
            for (variable, entry) in middle.symbolic_entries() {
                self.symbolic_to_interpolant(
                    variable,
                    *entry,
                    core_only,
                    left_retrieval,
                    substitute,
                    ctx,
                    replacements,
                    entries,
                    values,
                    &mut symbolic_map,
                );
            }
            if !symbolic_map.is_empty() {
                result.symbolic.insert(context.clone(), symbolic_map);
            }
        }

        for (variable, entry) in &self.concrete_historical {
            self.concrete_to_interpolant(
                variable,
                *entry,
                core_only,
                left_retrieval,
                substitute,
                ctx,
                replacements,
                entries,
                values,
                &mut result.concrete_historical,
            );
        }
        for (variable, entry) in &self.symbolic_historical {
            self.symbolic_to_interpolant(
                variable,
                *entry,
                core_only,
                left_retrieval,
                substitute,
                ctx,
                replacements,
                entries,
                values,
                &mut result.symbolic_historical,
            );
        }

        result
    }

    /// Checks whether `entry` passes the core-only emission filter for the
    /// side selected by `left_retrieval`.
    fn emitted_when_core_only(
        &self,
        entry: EntryId,
        left_retrieval: bool,
        values: &ValueRegistry,
        entries: &EntryRegistry,
    ) -> bool {
        if !values.get(entries.get(entry).content()).is_core() {
            return false;
        }
        if left_retrieval {
            self.used_by_left_path.contains(&entry)
        } else {
            self.used_by_right_path.contains(&entry)
        }
    }

    /// Adapts one concretely-addressed entry to interpolant form and inserts
    /// it into `map` under its stored variable.
    #[allow(clippy::too_many_arguments)] // The retrieval plumbing is internal
    fn concrete_to_interpolant(
        &self,
        variable: &Variable,
        entry: EntryId,
        core_only: bool,
        left_retrieval: bool,
        substitute: bool,
        ctx: &mut ExprContext,
        replacements: &mut BTreeSet<ArrayId>,
        entries: &EntryRegistry,
        values: &ValueRegistry,
        map: &mut LowerInterpolantStore,
    ) {
        let content = entries.get(entry).content();
        if !core_only {
            let expression = values.get(content).expression();
            map.insert(
                variable.clone(),
                InterpolantValue::with_original(expression, content),
            );
            return;
        }

        if !self.emitted_when_core_only(entry, left_retrieval, values, entries) {
            return;
        }

        let expression = values.get(content).expression();
        let expression = if substitute {
            ctx.existential_shadow(expression, replacements)
        } else {
            expression
        };
        map.insert(variable.clone(), InterpolantValue::new(expression));
    }

    /// Adapts one symbolically-addressed entry to interpolant form.
    ///
    /// Under core-only retrieval with substitution, the emitted key is a
    /// fresh variable recomputed from the entry's address after the arrays of
    /// its offset have been substituted; the stored key would name arrays
    /// that no longer occur in the emitted expressions.
    #[allow(clippy::too_many_arguments)] // The retrieval plumbing is internal
    fn symbolic_to_interpolant(
        &self,
        variable: &Variable,
        entry: EntryId,
        core_only: bool,
        left_retrieval: bool,
        substitute: bool,
        ctx: &mut ExprContext,
        replacements: &mut BTreeSet<ArrayId>,
        entries: &EntryRegistry,
        values: &ValueRegistry,
        map: &mut LowerInterpolantStore,
    ) {
        let record = entries.get(entry);
        let content = record.content();
        if !core_only {
            let expression = values.get(content).expression();
            map.insert(
                variable.clone(),
                InterpolantValue::with_original(expression, content),
            );
            return;
        }

        if !self.emitted_when_core_only(entry, left_retrieval, values, entries) {
            return;
        }

        let expression = values.get(content).expression();
        if substitute {
            let location = record.location().clone();
            let offset = ctx.existential_shadow(location.offset(), replacements);
            let key = Variable::new(location.context().clone(), offset);
            let expression = ctx.existential_shadow(expression, replacements);
            map.insert(key, InterpolantValue::new(expression));
        } else {
            map.insert(variable.clone(), InterpolantValue::new(expression));
        }
    }

    /// Writes a human-readable dump of the store to `out`, with every line
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
        let tabs_next_next = append_tab(&tabs_next);

        out.push_str(prefix);
        out.push_str("store = [");
        if !self.internal.is_empty() {
            out.push('\n');
            for (position, (context, middle)) in self.internal.iter().enumerate() {
                if position > 0 {
                    out.push('\n');
                }
                out.push_str(&tabs_next);
                out.push_str(&format!("{context}:\n"));
                middle.fmt_indented(ctx, entries, values, out, &tabs_next_next);
            }
            out.push('\n');
            out.push_str(prefix);
        }
        out.push(']');

        Self::fmt_historical(
            "concretely-addressed historical store",
            &self.concrete_historical,
            ctx,
            entries,
            values,
            out,
            prefix,
            &tabs_next,
        );
        Self::fmt_historical(
            "symbolically-addressed historical store",
            &self.symbolic_historical,
            ctx,
            entries,
            values,
            out,
            prefix,
            &tabs_next,
        );
    }

    /// Writes one historical map in the shared dump format.
    #[allow(clippy::too_many_arguments)] // The dump plumbing is internal
    fn fmt_historical(
        label: &str,
        map: &BTreeMap<Variable, EntryId>,
        ctx: &ExprContext,
        entries: &EntryRegistry,
        values: &ValueRegistry,
        out: &mut String,
        prefix: &str,
        tabs_next: &str,
    ) {
        out.push('\n');
        out.push_str(prefix);
        out.push_str(label);
        out.push_str(" = [");
        if !map.is_empty() {
            out.push('\n');
            for (position, entry) in map.values().enumerate() {
                if position > 0 {
                    out.push_str(tabs_next);
                    out.push_str("------------------------------------------\n");
                }
                entries.fmt_entry_indented(*entry, ctx, values, out, tabs_next);
                out.push('\n');
            }
            out.push_str(prefix);
        }
        out.push(']');
    }

    /// Renders the store as a string with no indentation, for diagnostics.
    #[must_use]
    pub fn dump(
        &self,
        ctx: &ExprContext,
        entries: &EntryRegistry,
        values: &ValueRegistry,
    ) -> String {
        let mut out = String::new();
        self.fmt_indented(ctx, entries, values, &mut out, "");
        out
    }
}
