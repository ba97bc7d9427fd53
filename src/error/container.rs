use std::fmt::Formatter;

use thiserror::Error;

use crate::state::ProgramPoint;

/// An error that is localised to the program point the exploration was at
/// when it occurred.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The program point at which the error occurred.
    pub location: ProgramPoint,

    /// The error data
    pub payload: E,
}

/// Displays the error associated with the program point at which the error
/// occurred.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.location, self.payload)
    }
}

/// A trait for types that can have a program-point location attached to them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached program-point location.
    type Located;

    /// Attach the location described by `program_point` to the error.
    fn locate(self, program_point: ProgramPoint) -> Self::Located;
}

/// A collection of located errors gathered while scanning a node, kept in
/// program-point order so that the interpreter sees failures in the order the
/// exploration reached them.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Errors<E> {
    payloads: Vec<E>,
}

impl<E> Default for Errors<E> {
    fn default() -> Self {
        Self {
            payloads: Vec::new(),
        }
    }
}

impl<E> Errors<E> {
    /// Creates a new container with no errors recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the errors recorded in this container.
    #[must_use]
    pub fn payloads(&self) -> &[E] {
        self.payloads.as_slice()
    }

    /// Gets the number of errors recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Checks whether no errors have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Errors<Located<E>>
where
    E: std::error::Error + Clone,
{
    /// Records an error `payload` at the `program_point` the exploration was
    /// at when it occurred.
    pub fn add_located(&mut self, program_point: ProgramPoint, payload: E) {
        self.payloads.push(Located {
            location: program_point,
            payload,
        });
        self.sort();
    }

    /// Sorts the recorded errors by their program-point location.
    fn sort(&mut self) {
        self.payloads.sort_by_key(|item| item.location);
    }
}

/// Displays the recorded errors one per line under a count header, or a
/// single line when none were recorded.
impl<E> std::fmt::Display for Errors<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.payloads.is_empty() {
            write!(f, "No errors were recorded")?;
        } else {
            writeln!(f, "Recorded {} errors:", self.payloads.len())?;
            for error in &self.payloads {
                writeln!(f, "{error}")?;
            }
        }

        Ok(())
    }
}
