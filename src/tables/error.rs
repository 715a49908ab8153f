//! Table construction errors

use std::fmt;
use std::error::Error;

/// Reasons why a set of tabulated values was rejected.
pub enum TableError {
    /// Name of the table, the expected and the actual number of entries
    Dimension(String, usize, usize),
    /// Name of the table and the offending bounds
    Domain(String, f64, f64),
    /// Name of the table and the first row that is not non-decreasing
    Monotonicity(String, usize),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::Dimension(s, expected, found) => write!(f, "table '{}' should have {} entries, found {}", s, expected, found),
            TableError::Domain(s, min, max) => write!(f, "table '{}' has an invalid domain [{:e}, {:e}]", s, min, max),
            TableError::Monotonicity(s, row) => write!(f, "row {} of table '{}' is not a cumulative distribution", row, s),
        }
    }
}

impl fmt::Debug for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Error for TableError {}

impl TableError {
    pub fn dimension(name: &str, expected: usize, found: usize) -> Self {
        Self::Dimension(name.to_owned(), expected, found)
    }

    pub fn domain(name: &str, min: f64, max: f64) -> Self {
        Self::Domain(name.to_owned(), min, max)
    }

    pub fn monotonicity(name: &str, row: usize) -> Self {
        Self::Monotonicity(name.to_owned(), row)
    }
}
