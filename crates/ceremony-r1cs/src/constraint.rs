//! Rank-1 constraint representation

use crate::LinearCombination;
use ark_ff::Field;
use ark_std::fmt;

/// A rank-1 constraint: A * B = C, where A, B, and C are linear
/// combinations of variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<F: Field> {
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
}

impl<F: Field> Constraint<F> {
    /// Create a new constraint
    pub fn new(a: LinearCombination<F>, b: LinearCombination<F>, c: LinearCombination<F>) -> Self {
        Self { a, b, c }
    }

    /// Check if the constraint is satisfied by the given full assignment
    pub fn is_satisfied(&self, assignment: &[F]) -> bool {
        self.a.evaluate(assignment) * self.b.evaluate(assignment) == self.c.evaluate(assignment)
    }
}

impl<F: Field> fmt::Display for Constraint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) * ({}) = ({})", self.a, self.b, self.c)
    }
}
