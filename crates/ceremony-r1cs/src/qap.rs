//! Sparse Lagrange-basis QAP map.
//!
//! The constraint matrices are re-expressed per variable: column `j` of each
//! matrix becomes the list of `(lagrange_index, coefficient)` pairs of the
//! polynomial `A_j` (resp. `B_j`, `C_j`) in the Lagrange basis of the FFT
//! domain. The map also appends the input-binding rows that keep the input
//! wires' A-polynomials linearly independent, as required by the Groth16
//! reduction.

use crate::{ConstraintSystem, R1csError};
use ark_ff::FftField;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use ark_std::vec::Vec;

/// A QAP in sparse Lagrange-basis form.
#[derive(Debug, Clone)]
pub struct Qap<F: FftField> {
    /// The FFT domain; its size is the QAP degree `n`
    pub domain: Radix2EvaluationDomain<F>,
    /// Number of primary inputs (excluding the one wire)
    pub num_inputs: usize,
    /// Total number of wires, including the one wire
    pub num_variables: usize,
    /// Per-variable sparse columns of the A matrix
    pub a: Vec<Vec<(usize, F)>>,
    /// Per-variable sparse columns of the B matrix
    pub b: Vec<Vec<(usize, F)>>,
    /// Per-variable sparse columns of the C matrix
    pub c: Vec<Vec<(usize, F)>>,
}

/// Dense evaluations of a QAP at a fixed point, used by the reference key
/// generator and the test suites.
#[derive(Debug, Clone)]
pub struct QapEvaluation<F: FftField> {
    /// `A_j(tau)` for every variable
    pub at: Vec<F>,
    /// `B_j(tau)` for every variable
    pub bt: Vec<F>,
    /// `C_j(tau)` for every variable
    pub ct: Vec<F>,
    /// The vanishing polynomial at tau, `tau^n - 1`
    pub z_at: F,
}

impl<F: FftField> Qap<F> {
    /// Build the QAP from a (normalized) constraint system.
    pub fn from_constraint_system(cs: &ConstraintSystem<F>) -> Result<Self, R1csError> {
        let domain =
            Radix2EvaluationDomain::<F>::new(cs.num_constraints() + cs.num_inputs + 1)
                .ok_or(R1csError::TooManyConstraints)?;

        let mut a = vec![Vec::new(); cs.num_variables];
        let mut b = vec![Vec::new(); cs.num_variables];
        let mut c = vec![Vec::new(); cs.num_variables];

        for (row, constraint) in cs.constraints.iter().enumerate() {
            for term in &constraint.a.terms {
                a[term.variable.index].push((row, term.coefficient));
            }
            for term in &constraint.b.terms {
                b[term.variable.index].push((row, term.coefficient));
            }
            for term in &constraint.c.terms {
                c[term.variable.index].push((row, term.coefficient));
            }
        }

        // Input binding rows: one extra row per input wire (and the one
        // wire) in the A matrix.
        for j in 0..=cs.num_inputs {
            a[j].push((cs.num_constraints() + j, F::one()));
        }

        Ok(Self {
            domain,
            num_inputs: cs.num_inputs,
            num_variables: cs.num_variables,
            a,
            b,
            c,
        })
    }

    /// The QAP degree `n` (a power of two).
    pub fn degree(&self) -> usize {
        self.domain.size()
    }

    /// Evaluate every variable polynomial and the vanishing polynomial at
    /// `tau`.
    pub fn evaluate(&self, tau: F) -> QapEvaluation<F> {
        let lagrange = self.domain.evaluate_all_lagrange_coefficients(tau);
        let column_eval = |columns: &[Vec<(usize, F)>]| -> Vec<F> {
            columns
                .iter()
                .map(|column| {
                    column
                        .iter()
                        .map(|(row, coefficient)| lagrange[*row] * coefficient)
                        .sum()
                })
                .collect()
        };
        QapEvaluation {
            at: column_eval(&self.a),
            bt: column_eval(&self.b),
            ct: column_eval(&self.c),
            z_at: self.domain.evaluate_vanishing_polynomial(tau),
        }
    }

    /// Evaluate `A.w`, `B.w` and `C.w` on the domain for a full assignment.
    pub fn witness_map(&self, assignment: &[F]) -> (Vec<F>, Vec<F>, Vec<F>) {
        debug_assert_eq!(assignment.len(), self.num_variables);
        let n = self.domain.size();
        let mut a_evals = vec![F::zero(); n];
        let mut b_evals = vec![F::zero(); n];
        let mut c_evals = vec![F::zero(); n];
        for (j, w) in assignment.iter().enumerate() {
            for (row, coefficient) in &self.a[j] {
                a_evals[*row] += *coefficient * w;
            }
            for (row, coefficient) in &self.b[j] {
                b_evals[*row] += *coefficient * w;
            }
            for (row, coefficient) in &self.c[j] {
                c_evals[*row] += *coefficient * w;
            }
        }
        (a_evals, b_evals, c_evals)
    }
}
