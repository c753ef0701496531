//! Variable representation in the constraint system

use ark_std::fmt;

/// A wire in the constraint system. Index 0 is always the constant "one"
/// wire, indices `1..=num_inputs` are the primary inputs, everything above
/// is auxiliary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub index: usize,
}

impl Variable {
    /// Create a new variable with the given index
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// The constant "one" wire
    pub fn one() -> Self {
        Self { index: 0 }
    }

    /// Get the variable index
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index)
    }
}
