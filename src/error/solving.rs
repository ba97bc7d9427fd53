//! This module contains errors pertaining to the validity oracle and the
//! solvers staged behind it.

use thiserror::Error;

use crate::error::container;

/// Errors that occur while deciding queries through the validity oracle.
///
/// Note that a timeout is a perfectly ordinary outcome for an authoritative
/// solver; callers performing subsumption checks must treat it as "not
/// subsumed" rather than as a failure of the engine.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The authoritative solver timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("The authoritative solver failed: {message}")]
    SolverFailure { message: String },

    #[error("The query expression must be boolean but has width {width}")]
    NonBooleanQuery { width: u16 },

    #[error("No solver is able to produce a value for the queried expression")]
    NoValueAvailable,
}

/// A solving error with an associated program point.
pub type LocatedError = container::Located<Error>;

/// A container of solving errors used for aggregation during exploration.
pub type Errors = container::Errors<LocatedError>;

/// The result type for methods that may have solving errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Make it possible to attach locations to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, program_point: crate::state::ProgramPoint) -> Self::Located {
        container::Located {
            location: program_point,
            payload:  self,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::{
            container::Locatable,
            solving::{Error, Errors},
        },
        state::ProgramPoint,
    };

    #[test]
    fn located_errors_render_their_program_point() {
        let error = Error::Timeout { seconds: 3 }.locate(ProgramPoint(12));
        assert_eq!(
            error.to_string(),
            "[pp12]: The authoritative solver timed out after 3 seconds"
        );
    }

    #[test]
    fn containers_keep_errors_sorted_by_location() {
        let mut errors = Errors::new();
        errors.add_located(ProgramPoint(9), Error::NoValueAvailable);
        errors.add_located(ProgramPoint(2), Error::Timeout { seconds: 1 });

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.payloads()[0].location, ProgramPoint(2));
        assert_eq!(errors.payloads()[1].location, ProgramPoint(9));
    }
}
