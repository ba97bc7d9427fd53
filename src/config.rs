//! This module contains the configuration surface for the interpolation core.

use crate::constant::{DEFAULT_CORE_SOLVER_TIMEOUT_SECONDS, DEFAULT_NO_EXISTENTIAL};

/// The configuration for the interpolation core.
///
/// The configuration is consumed when extracting interpolant-form stores from
/// the shadow memory and when checking subsumption, and is propagated to the
/// authoritative solver through
/// [`crate::solver::Solver::set_core_solver_timeout`].
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Whether to suppress the substitution of free arrays by existential
    /// shadow arrays during interpolant extraction.
    ///
    /// When this is `true`, interpolants are emitted over the original free
    /// arrays of the recorded expressions.
    ///
    /// Note that this flag is only consulted when the `no-existential` crate
    /// feature is enabled; without the feature, substitution is always
    /// applied.
    ///
    /// Defaults to [`DEFAULT_NO_EXISTENTIAL`].
    pub no_existential: bool,

    /// The timeout applied to calls into the authoritative solver, in
    /// seconds. Zero disables the timeout.
    ///
    /// Defaults to [`DEFAULT_CORE_SOLVER_TIMEOUT_SECONDS`].
    pub core_solver_timeout_seconds: f64,
}

impl Config {
    /// Sets the `no_existential` config parameter to `value`.
    #[must_use]
    pub fn with_no_existential(mut self, value: bool) -> Self {
        self.no_existential = value;
        self
    }

    /// Sets the `core_solver_timeout_seconds` config parameter to `value`.
    #[must_use]
    pub fn with_core_solver_timeout(mut self, value: f64) -> Self {
        self.core_solver_timeout_seconds = value;
        self
    }

    /// Checks whether existential shadow substitution should be applied when
    /// extracting interpolant-form values.
    #[must_use]
    pub fn use_existential_substitution(&self) -> bool {
        if cfg!(feature = "no-existential") {
            !self.no_existential
        } else {
            true
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let no_existential = DEFAULT_NO_EXISTENTIAL;
        let core_solver_timeout_seconds = DEFAULT_CORE_SOLVER_TIMEOUT_SECONDS;
        Self {
            no_existential,
            core_solver_timeout_seconds,
        }
    }
}
