//! This library implements the interpolation core of a symbolic-execution
//! engine: the machinery that prunes redundant exploration of a program's
//! execution tree by computing and reusing interpolants over symbolic program
//! states.
//!
//! Note that this library is not intended to be nor expected to evolve into a
//! full symbolic-execution engine; the interpreter, memory allocator and
//! solver backends are external collaborators whose interfaces are pinned
//! here.
//!
//! # How it Works
//!
//! From a very high level, pruning is performed as follows:
//!
//! 1. The interpreter drives exploration and mirrors every memory write into
//!    the shadow memory ([`store::TxStore`]) of the current
//!    [`tree::node::ITreeNode`], recording for each cell the symbolic value
//!    written and the provenance needed to reconstruct why it matters.
//! 2. At every branch the current node [`tree::ITree::split`]s, each child
//!    receiving a snapshot of the shadow memory and a path condition that
//!    shares its tail with the parent's.
//! 3. When a path completes a proof obligation, an interpolant is recorded on
//!    the leaf and composed upward through [`tree::ITree`] as sibling
//!    subtrees finish, marking on the way exactly which store entries each
//!    side of every branch depended on.
//! 4. Completed interpolants are published to a subsumption table keyed by
//!    program point. On re-entering a program point the core asks the
//!    validity oracle whether the new state entails a recorded interpolant;
//!    if so the node is subsumed and the whole subtree is pruned.
//! 5. All validity questions route through a [`solver::staged::StagedSolver`]
//!    that lets a cheap, incomplete decision procedure short-circuit calls to
//!    the authoritative one without compromising soundness.
//!
//! # Basic Usage
//!
//! The driver owns an [`expr::ExprContext`] and threads it through every
//! operation that constructs expressions:
//!
//! ```
//! use tx_interpolation::{
//!     expr::{known::KnownWord, CompareOp, ExprContext},
//!     state::{ExecutionState, ProgramPoint},
//!     tree::{subsumption::SubsumptionTableEntry, ITree},
//! };
//!
//! let mut ctx = ExprContext::new();
//! let input = ctx.array("input", 32);
//! let index = ctx.constant(KnownWord::zero(), 256);
//! let byte = ctx.read(input, index);
//! let zero = ctx.constant(KnownWord::zero(), 8);
//! let positive = ctx.compare(CompareOp::Ugt, byte, zero);
//!
//! let mut tree = ITree::new(ExecutionState::new(ProgramPoint(0), vec![positive]));
//! let root = tree.root();
//!
//! // A completed path records its interpolant for later reuse.
//! tree.complete_with_interpolant(root, positive, &mut ctx);
//! tree.store(SubsumptionTableEntry::from_node(tree.node(root)));
//!
//! assert_eq!(tree.entries_at(ProgramPoint(0)).len(), 1);
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod config;
pub mod constant;
pub mod error;
pub mod expr;
pub mod solver;
pub mod state;
pub mod store;
pub mod tree;
pub mod utility;

// Re-exports to provide the library interface.
pub use config::Config;
pub use solver::staged::StagedSolver;
pub use tree::ITree;
