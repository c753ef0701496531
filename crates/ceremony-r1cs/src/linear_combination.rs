//! Linear combination representation

use crate::Variable;
use ark_ff::Field;
use ark_std::{fmt, vec::Vec};

/// A term in a linear combination: coefficient * variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term<F: Field> {
    pub coefficient: F,
    pub variable: Variable,
}

impl<F: Field> Term<F> {
    /// Create a new term
    pub fn new(coefficient: F, variable: Variable) -> Self {
        Self {
            coefficient,
            variable,
        }
    }
}

/// A linear combination of variables: c1*v1 + c2*v2 + ... + cn*vn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearCombination<F: Field> {
    pub terms: Vec<Term<F>>,
}

impl<F: Field> LinearCombination<F> {
    /// Create an empty linear combination
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Create a linear combination from a single variable
    pub fn from_variable(variable: Variable) -> Self {
        Self {
            terms: vec![Term::new(F::one(), variable)],
        }
    }

    /// Create a linear combination from a constant
    pub fn from_constant(constant: F) -> Self {
        Self {
            terms: vec![Term::new(constant, Variable::one())],
        }
    }

    /// Add a term to the linear combination
    pub fn add_term(&mut self, coefficient: F, variable: Variable) {
        self.terms.push(Term::new(coefficient, variable));
    }

    /// Evaluate the linear combination against a full assignment
    pub fn evaluate(&self, assignment: &[F]) -> F {
        let mut result = F::zero();
        for term in &self.terms {
            result += term.coefficient * assignment[term.variable.index];
        }
        result
    }

    /// Largest variable index referenced, if any
    pub fn max_index(&self) -> Option<usize> {
        self.terms.iter().map(|t| t.variable.index).max()
    }

    /// Get the number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<F: Field> fmt::Display for LinearCombination<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", term.coefficient, term.variable)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::Fr;

    #[test]
    fn test_linear_combination_evaluation() {
        let x = Variable::new(1);
        let y = Variable::new(2);

        // 2*x + 3*y
        let mut lc = LinearCombination::<Fr>::new();
        lc.add_term(Fr::from(2u64), x);
        lc.add_term(Fr::from(3u64), y);

        // Assignment [1, 5, 7] (one, x=5, y=7): 2*5 + 3*7 = 31
        let assignment = vec![Fr::from(1u64), Fr::from(5u64), Fr::from(7u64)];
        assert_eq!(lc.evaluate(&assignment), Fr::from(31u64));
    }

    #[test]
    fn test_constant_uses_one_wire() {
        let lc = LinearCombination::<Fr>::from_constant(Fr::from(9u64));
        let assignment = vec![Fr::from(1u64), Fr::from(5u64)];
        assert_eq!(lc.evaluate(&assignment), Fr::from(9u64));
        assert_eq!(lc.max_index(), Some(0));
    }
}
