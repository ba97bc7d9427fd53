//! This module contains the primary error type for the library's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.
//!
//! The only fallible subsystem of the core is the validity oracle, so the
//! interface error wraps [`solving::Error`] transparently. Aggregation
//! happens where the propagation policy demands it: a subsumption scan
//! recovers from solver timeouts locally (the node is simply not subsumed)
//! but surfaces every backend failure to the interpreter as a collection of
//! errors located at the program point being scanned.
//!
//! # Invariant Violations
//!
//! Violations of the structural invariants of the interpolation tree (a child
//! pointer that matches neither side during the upward walk, for example) are
//! programmer errors rather than data errors. They abort with a panic and a
//! descriptive message instead of appearing in this hierarchy.

pub mod container;
pub mod solving;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Note that _all_ of the library is public in
/// order to facilitate use-cases beyond the ones designed for.
pub type Result<T> = std::result::Result<T, Errors>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Errors from the validity-oracle subsystem of the library.
    #[error(transparent)]
    Solving(#[from] solving::Error),
}

/// A library error with an associated program-point location.
pub type LocatedError = container::Located<Error>;

/// A container of errors that may occur in the interpolation core.
pub type Errors = container::Errors<LocatedError>;
