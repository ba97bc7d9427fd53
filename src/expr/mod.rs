//! This module contains the expression algebra consumed by the interpolation
//! core: hash-consed symbolic terms over named byte arrays, with constant
//! folding at construction and substitution of free arrays.
//!
//! # Hash-Consing
//!
//! All terms live in an [`ExprContext`] owned by the driver of the engine and
//! threaded explicitly through every API that constructs expressions. Interning
//! is maximal, which makes [`ExprId`] equality coincide with structural
//! equality and lets the rest of the core use handles as ordered map keys.

pub mod known;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    constant::{BOOL_WIDTH_BITS, BYTE_SIZE_BITS, SHADOW_ARRAY_SUFFIX},
    expr::known::KnownWord,
};

/// A handle to an interned expression.
///
/// Handle equality is structural equality of the underlying terms.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExprId(u32);

impl ExprId {
    /// Gets the index of the expression in its owning context.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to an interned symbolic array.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArrayId(u32);

impl ArrayId {
    /// Gets the index of the array in its owning context.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named symbolic byte array: an uninterpreted function from index to byte,
/// used as the source of free variables in the algebra.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Array {
    /// The unique name of the array.
    name: String,

    /// The number of addressable cells in the array.
    size: u64,
}

impl Array {
    /// Gets the name of the array.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the number of addressable cells in the array.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// The arithmetic and bitwise operations of the algebra.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl BinaryOp {
    /// The mnemonic used when rendering the operation.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mul",
            Self::UDiv => "UDiv",
            Self::SDiv => "SDiv",
            Self::URem => "URem",
            Self::SRem => "SRem",
            Self::And => "And",
            Self::Or => "Or",
            Self::Xor => "Xor",
            Self::Shl => "Shl",
            Self::LShr => "LShr",
            Self::AShr => "AShr",
        }
    }
}

/// The comparison operations of the algebra. All comparisons produce boolean
/// (width-one) terms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl CompareOp {
    /// The mnemonic used when rendering the comparison.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "Eq",
            Self::Ne => "Ne",
            Self::Ult => "Ult",
            Self::Ule => "Ule",
            Self::Ugt => "Ugt",
            Self::Uge => "Uge",
            Self::Slt => "Slt",
            Self::Sle => "Sle",
            Self::Sgt => "Sgt",
            Self::Sge => "Sge",
        }
    }
}

/// The structure of a single interned term.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ExprData {
    /// A concrete constant of the given width.
    Constant { value: KnownWord, width: u16 },

    /// A byte read from a symbolic array at a symbolic index.
    Read { array: ArrayId, index: ExprId },

    /// An arithmetic or bitwise operation over same-width operands.
    Binary {
        op:    BinaryOp,
        left:  ExprId,
        right: ExprId,
    },

    /// A comparison over same-width operands, producing a boolean.
    Compare {
        op:    CompareOp,
        left:  ExprId,
        right: ExprId,
    },

    /// The bitwise complement of a term. On boolean terms this is logical
    /// negation.
    Not { value: ExprId },

    /// A `width`-bit slice of `value` starting at bit `offset`.
    Extract {
        value:  ExprId,
        offset: u16,
        width:  u16,
    },

    /// Concatenation with `left` providing the high bits.
    Concat { left: ExprId, right: ExprId },
}

/// A single interned node together with its computed bit width.
#[derive(Clone, Debug, Eq, PartialEq)]
struct ExprNode {
    data:  ExprData,
    width: u16,
}

/// The owning context for all interned expressions and arrays.
///
/// The context is deliberately the only way to construct terms; it enforces
/// maximal sharing and performs constant folding at construction time.
#[derive(Clone, Debug, Default)]
pub struct ExprContext {
    /// The interned expression nodes, indexed by [`ExprId`].
    nodes: Vec<ExprNode>,

    /// The interning table mapping node structure to existing handles.
    interner: HashMap<ExprData, ExprId>,

    /// The interned arrays, indexed by [`ArrayId`].
    arrays: Vec<Array>,

    /// The interning table for arrays, keyed by name.
    array_interner: HashMap<String, ArrayId>,

    /// The cache of existential shadow arrays already derived from source
    /// arrays.
    shadows: HashMap<ArrayId, ArrayId>,
}

impl ExprContext {
    /// Constructs a new, empty expression context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns the provided node, returning the existing handle if the same
    /// structure has been built before.
    fn intern(&mut self, data: ExprData, width: u16) -> ExprId {
        if let Some(existing) = self.interner.get(&data) {
            return *existing;
        }

        let id = ExprId(u32::try_from(self.nodes.len()).expect("expression arena overflow"));
        self.interner.insert(data.clone(), id);
        self.nodes.push(ExprNode { data, width });
        id
    }

    /// Constructs a constant term of the provided `width`, truncating `value`
    /// to that width so that equal constants always share a node.
    pub fn constant(&mut self, value: KnownWord, width: u16) -> ExprId {
        let value = value.truncated(width);
        self.intern(ExprData::Constant { value, width }, width)
    }

    /// Constructs the boolean constant `true`.
    pub fn true_(&mut self) -> ExprId {
        self.constant(KnownWord::one(), BOOL_WIDTH_BITS)
    }

    /// Constructs the boolean constant `false`.
    pub fn false_(&mut self) -> ExprId {
        self.constant(KnownWord::zero(), BOOL_WIDTH_BITS)
    }

    /// Constructs the boolean constant corresponding to `value`.
    pub fn bool(&mut self, value: bool) -> ExprId {
        if value {
            self.true_()
        } else {
            self.false_()
        }
    }

    /// Interns an array under `name` with the given cell count, returning the
    /// existing handle when the name has been interned before.
    pub fn array(&mut self, name: impl Into<String>, size: u64) -> ArrayId {
        let name = name.into();
        if let Some(existing) = self.array_interner.get(&name) {
            return *existing;
        }

        let id = ArrayId(u32::try_from(self.arrays.len()).expect("array arena overflow"));
        self.array_interner.insert(name.clone(), id);
        self.arrays.push(Array { name, size });
        id
    }

    /// Gets the metadata of the provided array.
    #[must_use]
    pub fn array_info(&self, id: ArrayId) -> &Array {
        &self.arrays[id.index()]
    }

    /// Constructs a read of one byte from `array` at the symbolic `index`.
    pub fn read(&mut self, array: ArrayId, index: ExprId) -> ExprId {
        self.intern(ExprData::Read { array, index }, BYTE_SIZE_BITS)
    }

    /// Constructs the binary operation `op` over `left` and `right`.
    ///
    /// Both-constant operands fold; boolean conjunction and disjunction also
    /// fold against constant operands.
    ///
    /// # Panics
    ///
    /// Panics if the operand widths differ, as this is a programmer error.
    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let width = self.width(left);
        assert_eq!(
            width,
            self.width(right),
            "Binary operands must share a width"
        );

        if let (Some(l), Some(r)) = (self.constant_value(left), self.constant_value(right)) {
            if let Some(folded) = Self::fold_binary(op, l, r, width) {
                return self.constant(folded, width);
            }
        }

        // Identity folds on boolean connectives keep synthesised interpolants
        // small without a separate simplifier pass.
        if width == BOOL_WIDTH_BITS {
            match op {
                BinaryOp::And => {
                    if self.is_true(left) {
                        return right;
                    }
                    if self.is_true(right) {
                        return left;
                    }
                    if self.is_false(left) || self.is_false(right) {
                        return self.false_();
                    }
                }
                BinaryOp::Or => {
                    if self.is_false(left) {
                        return right;
                    }
                    if self.is_false(right) {
                        return left;
                    }
                    if self.is_true(left) || self.is_true(right) {
                        return self.true_();
                    }
                }
                _ => (),
            }
        }

        self.intern(ExprData::Binary { op, left, right }, width)
    }

    /// Folds the binary operation over two constants, returning [`None`] for
    /// division or remainder by zero.
    fn fold_binary(op: BinaryOp, l: KnownWord, r: KnownWord, width: u16) -> Option<KnownWord> {
        match op {
            BinaryOp::Add => Some(l.add(r, width)),
            BinaryOp::Sub => Some(l.sub(r, width)),
            BinaryOp::Mul => Some(l.mul(r, width)),
            BinaryOp::UDiv => l.udiv(r, width),
            BinaryOp::SDiv => l.sdiv(r, width),
            BinaryOp::URem => l.urem(r, width),
            BinaryOp::SRem => l.srem(r, width),
            BinaryOp::And => Some(l.bit_and(r)),
            BinaryOp::Or => Some(l.bit_or(r)),
            BinaryOp::Xor => Some(l.bit_xor(r)),
            BinaryOp::Shl => Some(l.shl(r, width)),
            BinaryOp::LShr => Some(l.lshr(r, width)),
            BinaryOp::AShr => Some(l.ashr(r, width)),
        }
    }

    /// Constructs the comparison `op` over `left` and `right`, producing a
    /// boolean term.
    ///
    /// Structurally equal operands fold for `Eq` and `Ne`, and both-constant
    /// operands always fold.
    ///
    /// # Panics
    ///
    /// Panics if the operand widths differ, as this is a programmer error.
    pub fn compare(&mut self, op: CompareOp, left: ExprId, right: ExprId) -> ExprId {
        let width = self.width(left);
        assert_eq!(
            width,
            self.width(right),
            "Comparison operands must share a width"
        );

        if left == right {
            match op {
                CompareOp::Eq | CompareOp::Ule | CompareOp::Uge | CompareOp::Sle
                | CompareOp::Sge => return self.true_(),
                CompareOp::Ne | CompareOp::Ult | CompareOp::Ugt | CompareOp::Slt
                | CompareOp::Sgt => return self.false_(),
            }
        }

        if let (Some(l), Some(r)) = (self.constant_value(left), self.constant_value(right)) {
            let result = Self::fold_compare(op, l, r, width);
            return self.bool(result);
        }

        self.intern(ExprData::Compare { op, left, right }, BOOL_WIDTH_BITS)
    }

    /// Folds the comparison over two constants.
    fn fold_compare(op: CompareOp, l: KnownWord, r: KnownWord, width: u16) -> bool {
        match op {
            CompareOp::Eq => l == r,
            CompareOp::Ne => l != r,
            CompareOp::Ult => l.ult(r),
            CompareOp::Ule => !r.ult(l),
            CompareOp::Ugt => r.ult(l),
            CompareOp::Uge => !l.ult(r),
            CompareOp::Slt => l.slt(r, width),
            CompareOp::Sle => !r.slt(l, width),
            CompareOp::Sgt => r.slt(l, width),
            CompareOp::Sge => !l.slt(r, width),
        }
    }

    /// Constructs the bitwise complement of `value`. Double negation folds
    /// away, and constants fold.
    pub fn not(&mut self, value: ExprId) -> ExprId {
        let width = self.width(value);

        if let Some(constant) = self.constant_value(value) {
            return self.constant(constant.bit_not(width), width);
        }
        if let ExprData::Not { value: inner } = self.data(value) {
            return *inner;
        }

        self.intern(ExprData::Not { value }, width)
    }

    /// Constructs the boolean implication `left -> right` as `¬left ∨ right`.
    pub fn implies(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let negated = self.not(left);
        self.binary(BinaryOp::Or, negated, right)
    }

    /// Constructs a `width`-bit slice of `value` starting at bit `offset`.
    ///
    /// A full-width extract is the identity, and constants fold.
    ///
    /// # Panics
    ///
    /// Panics if the slice does not fit within `value`, as this is a
    /// programmer error.
    pub fn extract(&mut self, value: ExprId, offset: u16, width: u16) -> ExprId {
        let value_width = self.width(value);
        assert!(
            offset + width <= value_width,
            "Extract of {width} bits at {offset} does not fit in {value_width} bits"
        );

        if offset == 0 && width == value_width {
            return value;
        }
        if let Some(constant) = self.constant_value(value) {
            let extracted = constant.extract(offset, width);
            return self.constant(extracted, width);
        }

        self.intern(
            ExprData::Extract {
                value,
                offset,
                width,
            },
            width,
        )
    }

    /// Constructs the concatenation of `left` (high bits) and `right` (low
    /// bits). Constants fold.
    pub fn concat(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let width = self.width(left) + self.width(right);

        if let (Some(l), Some(r)) = (self.constant_value(left), self.constant_value(right)) {
            let joined = l.concat(r, self.width(right));
            return self.constant(joined, width);
        }

        self.intern(ExprData::Concat { left, right }, width)
    }

    /// Gets the structure of the provided expression.
    #[must_use]
    pub fn data(&self, id: ExprId) -> &ExprData {
        &self.nodes[id.index()].data
    }

    /// Gets the bit width of the provided expression.
    #[must_use]
    pub fn width(&self, id: ExprId) -> u16 {
        self.nodes[id.index()].width
    }

    /// Gets the constant word backing the expression, if it is a constant.
    #[must_use]
    pub fn constant_value(&self, id: ExprId) -> Option<KnownWord> {
        match self.data(id) {
            ExprData::Constant { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Checks whether the expression is the boolean constant `true`.
    #[must_use]
    pub fn is_true(&self, id: ExprId) -> bool {
        matches!(
            self.data(id),
            ExprData::Constant { value, width } if *width == BOOL_WIDTH_BITS && !value.is_zero()
        )
    }

    /// Checks whether the expression is the boolean constant `false`.
    #[must_use]
    pub fn is_false(&self, id: ExprId) -> bool {
        matches!(
            self.data(id),
            ExprData::Constant { value, width } if *width == BOOL_WIDTH_BITS && value.is_zero()
        )
    }

    /// Collects every distinct subterm of `id`, including `id` itself.
    #[must_use]
    pub fn subterms(&self, id: ExprId) -> BTreeSet<ExprId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            match self.data(current) {
                ExprData::Constant { .. } => (),
                ExprData::Read { index, .. } => stack.push(*index),
                ExprData::Binary { left, right, .. }
                | ExprData::Compare { left, right, .. }
                | ExprData::Concat { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
                ExprData::Not { value } | ExprData::Extract { value, .. } => stack.push(*value),
            }
        }

        seen
    }

    /// Collects the free arrays read anywhere under `id`.
    #[must_use]
    pub fn free_arrays(&self, id: ExprId) -> BTreeSet<ArrayId> {
        self.subterms(id)
            .into_iter()
            .filter_map(|term| match self.data(term) {
                ExprData::Read { array, .. } => Some(*array),
                _ => None,
            })
            .collect()
    }

    /// Rebuilds `id` with every array replaced according to `map`. Arrays not
    /// named in the map are left untouched.
    pub fn substitute_arrays(
        &mut self,
        id: ExprId,
        map: &BTreeMap<ArrayId, ArrayId>,
    ) -> ExprId {
        let mut memo: HashMap<ExprId, ExprId> = HashMap::new();
        self.substitute_inner(id, map, &mut memo)
    }

    fn substitute_inner(
        &mut self,
        id: ExprId,
        map: &BTreeMap<ArrayId, ArrayId>,
        memo: &mut HashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(done) = memo.get(&id) {
            return *done;
        }

        let result = match self.data(id).clone() {
            ExprData::Constant { .. } => id,
            ExprData::Read { array, index } => {
                let index = self.substitute_inner(index, map, memo);
                let array = map.get(&array).copied().unwrap_or(array);
                self.read(array, index)
            }
            ExprData::Binary { op, left, right } => {
                let left = self.substitute_inner(left, map, memo);
                let right = self.substitute_inner(right, map, memo);
                self.binary(op, left, right)
            }
            ExprData::Compare { op, left, right } => {
                let left = self.substitute_inner(left, map, memo);
                let right = self.substitute_inner(right, map, memo);
                self.compare(op, left, right)
            }
            ExprData::Not { value } => {
                let value = self.substitute_inner(value, map, memo);
                self.not(value)
            }
            ExprData::Extract {
                value,
                offset,
                width,
            } => {
                let value = self.substitute_inner(value, map, memo);
                self.extract(value, offset, width)
            }
            ExprData::Concat { left, right } => {
                let left = self.substitute_inner(left, map, memo);
                let right = self.substitute_inner(right, map, memo);
                self.concat(left, right)
            }
        };

        memo.insert(id, result);
        result
    }

    /// Gets (creating on first use) the existential shadow array standing in
    /// for `of` in extracted interpolants.
    pub fn shadow_array(&mut self, of: ArrayId) -> ArrayId {
        if let Some(existing) = self.shadows.get(&of) {
            return *existing;
        }

        let source = self.array_info(of);
        let name = format!("{}{SHADOW_ARRAY_SUFFIX}", source.name());
        let size = source.size();
        let shadow = self.array(name, size);
        self.shadows.insert(of, shadow);
        shadow
    }

    /// Rebuilds `id` with every free array replaced by its existential shadow
    /// array, recording the shadows used in `replacements`.
    ///
    /// Terms with no free arrays are returned unchanged.
    pub fn existential_shadow(
        &mut self,
        id: ExprId,
        replacements: &mut BTreeSet<ArrayId>,
    ) -> ExprId {
        let free = self.free_arrays(id);
        if free.is_empty() {
            return id;
        }

        let map: BTreeMap<ArrayId, ArrayId> = free
            .into_iter()
            .map(|array| {
                let shadow = self.shadow_array(array);
                replacements.insert(shadow);
                (array, shadow)
            })
            .collect();

        self.substitute_arrays(id, &map)
    }

    /// Renders the expression as a deterministic s-expression string.
    #[must_use]
    pub fn display(&self, id: ExprId) -> String {
        match self.data(id) {
            ExprData::Constant { value, width } => {
                if *width == BOOL_WIDTH_BITS {
                    if value.is_zero() { "false".into() } else { "true".into() }
                } else {
                    format!("{value}")
                }
            }
            ExprData::Read { array, index } => {
                format!(
                    "(Read {} {})",
                    self.array_info(*array).name(),
                    self.display(*index)
                )
            }
            ExprData::Binary { op, left, right } => {
                format!(
                    "({} {} {})",
                    op.mnemonic(),
                    self.display(*left),
                    self.display(*right)
                )
            }
            ExprData::Compare { op, left, right } => {
                format!(
                    "({} {} {})",
                    op.mnemonic(),
                    self.display(*left),
                    self.display(*right)
                )
            }
            ExprData::Not { value } => format!("(Not {})", self.display(*value)),
            ExprData::Extract {
                value,
                offset,
                width,
            } => {
                format!("(Extract {} {offset} {width})", self.display(*value))
            }
            ExprData::Concat { left, right } => {
                format!("(Concat {} {})", self.display(*left), self.display(*right))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, BTreeSet};

    use crate::expr::{known::KnownWord, BinaryOp, CompareOp, ExprContext};

    #[test]
    fn interning_makes_handle_equality_structural() {
        let mut ctx = ExprContext::new();
        let array = ctx.array("input", 32);
        let index = ctx.constant(KnownWord::zero(), 256);
        let read_1 = ctx.read(array, index);
        let read_2 = ctx.read(array, index);

        assert_eq!(read_1, read_2);
    }

    #[test]
    fn constants_fold_at_construction() {
        let mut ctx = ExprContext::new();
        let two = ctx.constant(KnownWord::from(2u64), 64);
        let three = ctx.constant(KnownWord::from(3u64), 64);
        let sum = ctx.binary(BinaryOp::Add, two, three);

        assert_eq!(ctx.constant_value(sum), Some(KnownWord::from(5u64)));
    }

    #[test]
    fn division_by_zero_does_not_fold() {
        let mut ctx = ExprContext::new();
        let two = ctx.constant(KnownWord::from(2u64), 64);
        let zero = ctx.constant(KnownWord::zero(), 64);
        let quotient = ctx.binary(BinaryOp::UDiv, two, zero);

        assert_eq!(ctx.constant_value(quotient), None);
    }

    #[test]
    fn boolean_identities_fold() {
        let mut ctx = ExprContext::new();
        let array = ctx.array("input", 32);
        let index = ctx.constant(KnownWord::zero(), 256);
        let byte = ctx.read(array, index);
        let zero = ctx.constant(KnownWord::zero(), 8);
        let cond = ctx.compare(CompareOp::Ne, byte, zero);
        let t = ctx.true_();

        assert_eq!(ctx.binary(BinaryOp::And, t, cond), cond);
        assert_eq!(ctx.binary(BinaryOp::Or, t, cond), t);
        let not_not = {
            let negated = ctx.not(cond);
            ctx.not(negated)
        };
        assert_eq!(not_not, cond);
    }

    #[test]
    fn structural_equality_folds_self_comparison() {
        let mut ctx = ExprContext::new();
        let array = ctx.array("input", 32);
        let index = ctx.constant(KnownWord::zero(), 256);
        let byte = ctx.read(array, index);
        let eq = ctx.compare(CompareOp::Eq, byte, byte);

        assert!(ctx.is_true(eq));
    }

    #[test]
    fn can_substitute_free_arrays() {
        let mut ctx = ExprContext::new();
        let source = ctx.array("input", 32);
        let target = ctx.array("replacement", 32);
        let index = ctx.constant(KnownWord::zero(), 256);
        let byte = ctx.read(source, index);
        let zero = ctx.constant(KnownWord::zero(), 8);
        let cond = ctx.compare(CompareOp::Ne, byte, zero);

        let map: BTreeMap<_, _> = [(source, target)].into_iter().collect();
        let substituted = ctx.substitute_arrays(cond, &map);

        assert_eq!(
            ctx.free_arrays(substituted),
            [target].into_iter().collect::<BTreeSet<_>>()
        );
        assert_ne!(substituted, cond);
    }

    #[test]
    fn existential_shadowing_is_cached_and_recorded() {
        let mut ctx = ExprContext::new();
        let source = ctx.array("input", 32);
        let index = ctx.constant(KnownWord::zero(), 256);
        let byte = ctx.read(source, index);

        let mut replacements = BTreeSet::new();
        let shadowed_1 = ctx.existential_shadow(byte, &mut replacements);
        let shadowed_2 = ctx.existential_shadow(byte, &mut replacements);

        assert_eq!(shadowed_1, shadowed_2);
        assert_eq!(replacements.len(), 1);
        let shadow = *replacements.iter().next().unwrap();
        assert_eq!(ctx.array_info(shadow).name(), "input__shadow");
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut ctx = ExprContext::new();
        let array = ctx.array("input", 32);
        let index = ctx.constant(KnownWord::from(1u64), 256);
        let byte = ctx.read(array, index);
        let two = ctx.constant(KnownWord::from(2u64), 8);
        let sum = ctx.binary(BinaryOp::Add, byte, two);

        assert_eq!(ctx.display(sum), "(Add (Read input 0x1) 0x2)");
    }
}
