//! Source positions within the query text.

use core::fmt;

/// Zero-based character offset into the SQL text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(usize);

impl Position {
    /// Creates a new position.
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Returns the character offset.
    pub const fn offset(&self) -> usize {
        self.0
    }
}

impl From<usize> for Position {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
