//! Constraint-system input for the SRS ceremony.
//!
//! The ceremony consumes a rank-1 constraint system produced by an external
//! circuit compiler. This crate holds the R1CS representation, the canonical
//! byte encoding whose BLAKE2b digest (`cs_hash`) is pinned into every
//! phase-2 accumulator, the A/B swap normalization, and the sparse
//! Lagrange-basis QAP map that feeds the linear-combination layer.

#![forbid(unsafe_code)]

pub mod constraint;
pub mod linear_combination;
pub mod qap;
pub mod variable;

pub use constraint::*;
pub use linear_combination::*;
pub use qap::*;
pub use variable::*;

use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_hash::{Digest, DigestWriter};
use thiserror::Error;

/// Errors raised while building, checking, or (de)serializing a constraint
/// system.
#[derive(Debug, Error)]
pub enum R1csError {
    #[error("malformed input: {0}")]
    Io(#[from] ark_std::io::Error),
    #[error("invalid field element: {0}")]
    Serialization(#[from] ark_serialize::SerializationError),
    #[error("variable index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("constraint system too large for the FFT domain")]
    TooManyConstraints,
    #[error("assignment has {actual} entries, expected {expected}")]
    AssignmentLength { expected: usize, actual: usize },
}

/// A rank-1 constraint system.
///
/// Wire 0 is the constant "one", wires `1..=num_inputs` are the primary
/// inputs, the remainder are auxiliary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSystem<F: Field> {
    /// Number of primary inputs (excluding the one wire)
    pub num_inputs: usize,
    /// Total number of wires, including the one wire
    pub num_variables: usize,
    /// Constraints in the system
    pub constraints: Vec<Constraint<F>>,
}

impl<F: Field> ConstraintSystem<F> {
    /// Create an empty constraint system
    pub fn new() -> Self {
        Self {
            num_inputs: 0,
            num_variables: 1,
            constraints: Vec::new(),
        }
    }

    /// Allocate a primary-input wire. Inputs must be allocated before any
    /// auxiliary wire so that they occupy the contiguous range
    /// `1..=num_inputs`.
    pub fn alloc_input(&mut self) -> Variable {
        assert_eq!(
            self.num_variables,
            self.num_inputs + 1,
            "inputs must be allocated before auxiliary wires"
        );
        self.num_inputs += 1;
        let var = Variable::new(self.num_variables);
        self.num_variables += 1;
        var
    }

    /// Allocate an auxiliary wire
    pub fn alloc_auxiliary(&mut self) -> Variable {
        let var = Variable::new(self.num_variables);
        self.num_variables += 1;
        var
    }

    /// Add the constraint `a * b = c`
    pub fn enforce(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) -> Result<(), R1csError> {
        for lc in [&a, &b, &c] {
            if let Some(max) = lc.max_index() {
                if max >= self.num_variables {
                    return Err(R1csError::IndexOutOfBounds(max));
                }
            }
        }
        self.constraints.push(Constraint::new(a, b, c));
        Ok(())
    }

    /// Number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Assemble `[one, primary..., auxiliary...]`, checking lengths
    pub fn full_assignment(
        &self,
        primary: &[F],
        auxiliary: &[F],
    ) -> Result<Vec<F>, R1csError> {
        if 1 + primary.len() + auxiliary.len() != self.num_variables
            || primary.len() != self.num_inputs
        {
            return Err(R1csError::AssignmentLength {
                expected: self.num_variables,
                actual: 1 + primary.len() + auxiliary.len(),
            });
        }
        let mut assignment = Vec::with_capacity(self.num_variables);
        assignment.push(F::one());
        assignment.extend_from_slice(primary);
        assignment.extend_from_slice(auxiliary);
        Ok(assignment)
    }

    /// Check whether the assignment satisfies every constraint
    pub fn is_satisfied(&self, primary: &[F], auxiliary: &[F]) -> Result<bool, R1csError> {
        let assignment = self.full_assignment(primary, auxiliary)?;
        Ok(self
            .constraints
            .iter()
            .all(|constraint| constraint.is_satisfied(&assignment)))
    }

    /// Swap the A and B matrices if B carries more nonzero terms than A.
    ///
    /// Provers evaluate B in G2, where operations cost several times their
    /// G1 counterparts, so the denser side belongs in A. The canonical hash
    /// must be computed after this normalization.
    pub fn swap_ab_if_beneficial(&mut self) {
        let a_terms: usize = self.constraints.iter().map(|cons| cons.a.len()).sum();
        let b_terms: usize = self.constraints.iter().map(|cons| cons.b.len()).sum();
        if b_terms > a_terms {
            for constraint in &mut self.constraints {
                core::mem::swap(&mut constraint.a, &mut constraint.b);
            }
        }
    }

    /// Write the canonical byte encoding
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), R1csError> {
        writer.write_all(&(self.num_inputs as u64).to_le_bytes())?;
        writer.write_all(&(self.num_variables as u64).to_le_bytes())?;
        writer.write_all(&(self.num_constraints() as u64).to_le_bytes())?;
        for constraint in &self.constraints {
            for lc in [&constraint.a, &constraint.b, &constraint.c] {
                writer.write_all(&(lc.len() as u64).to_le_bytes())?;
                for term in &lc.terms {
                    writer.write_all(&(term.variable.index as u64).to_le_bytes())?;
                    term.coefficient.serialize_uncompressed(&mut writer)?;
                }
            }
        }
        Ok(())
    }

    /// Read the canonical byte encoding
    pub fn read<R: Read>(mut reader: R) -> Result<Self, R1csError> {
        let num_inputs = read_u64(&mut reader)? as usize;
        let num_variables = read_u64(&mut reader)? as usize;
        let num_constraints = read_u64(&mut reader)? as usize;
        let mut constraints = Vec::with_capacity(num_constraints);
        for _ in 0..num_constraints {
            let mut lcs = [
                LinearCombination::new(),
                LinearCombination::new(),
                LinearCombination::new(),
            ];
            for lc in &mut lcs {
                let len = read_u64(&mut reader)? as usize;
                for _ in 0..len {
                    let index = read_u64(&mut reader)? as usize;
                    if index >= num_variables {
                        return Err(R1csError::IndexOutOfBounds(index));
                    }
                    let coefficient = F::deserialize_uncompressed(&mut reader)?;
                    lc.add_term(coefficient, Variable::new(index));
                }
            }
            let [a, b, c] = lcs;
            constraints.push(Constraint::new(a, b, c));
        }
        Ok(Self {
            num_inputs,
            num_variables,
            constraints,
        })
    }

    /// BLAKE2b digest of the canonical encoding. This is the `cs_hash`
    /// pinned into the phase-2 accumulator; callers must normalize with
    /// [`Self::swap_ab_if_beneficial`] first so the hash binds the
    /// canonical form.
    pub fn digest(&self) -> Digest {
        let mut writer = DigestWriter::new();
        self.write(&mut writer)
            .expect("hashing is not allowed to fail");
        writer.finalize()
    }
}

impl<F: Field> Default for ConstraintSystem<F> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn read_u64<R: Read>(mut reader: R) -> Result<u64, ark_std::io::Error> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// The two-constraint circuit used throughout the test suites: wires
/// `(one, out, x, y)` with `out` public, enforcing `x*x = y` and
/// `x*y = out`.
pub fn simple_circuit<F: Field>() -> ConstraintSystem<F> {
    let mut cs = ConstraintSystem::new();
    let out = cs.alloc_input();
    let x = cs.alloc_auxiliary();
    let y = cs.alloc_auxiliary();
    cs.enforce(
        LinearCombination::from_variable(x),
        LinearCombination::from_variable(x),
        LinearCombination::from_variable(y),
    )
    .expect("wires are in bounds");
    cs.enforce(
        LinearCombination::from_variable(x),
        LinearCombination::from_variable(y),
        LinearCombination::from_variable(out),
    )
    .expect("wires are in bounds");
    cs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::Fr;

    #[test]
    fn test_simple_circuit_satisfaction() {
        let cs = simple_circuit::<Fr>();
        assert_eq!(cs.num_inputs, 1);
        assert_eq!(cs.num_variables, 4);
        assert_eq!(cs.num_constraints(), 2);

        // x = 2, y = 4, out = 8
        let primary = vec![Fr::from(8u64)];
        let auxiliary = vec![Fr::from(2u64), Fr::from(4u64)];
        assert!(cs.is_satisfied(&primary, &auxiliary).unwrap());

        let bad_primary = vec![Fr::from(9u64)];
        assert!(!cs.is_satisfied(&bad_primary, &auxiliary).unwrap());
    }

    #[test]
    fn test_encoding_round_trip() {
        let cs = simple_circuit::<Fr>();
        let mut bytes = Vec::new();
        cs.write(&mut bytes).unwrap();
        let restored = ConstraintSystem::<Fr>::read(&bytes[..]).unwrap();
        assert_eq!(cs, restored);
        assert_eq!(cs.digest(), restored.digest());
    }

    #[test]
    fn test_truncated_encoding_rejected() {
        let cs = simple_circuit::<Fr>();
        let mut bytes = Vec::new();
        cs.write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(ConstraintSystem::<Fr>::read(&bytes[..]).is_err());
    }

    #[test]
    fn test_swap_ab_binds_hash_to_canonical_form() {
        // B denser than A: the swap must fire, and hashes taken after the
        // swap must agree regardless of the input orientation.
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_auxiliary();
        let y = cs.alloc_auxiliary();
        let z = cs.alloc_auxiliary();
        let mut b = LinearCombination::from_variable(x);
        b.add_term(Fr::from(2u64), y);
        cs.enforce(
            LinearCombination::from_variable(x),
            b.clone(),
            LinearCombination::from_variable(z),
        )
        .unwrap();

        let mut swapped = cs.clone();
        swapped.swap_ab_if_beneficial();
        assert_eq!(swapped.constraints[0].a, b);
        assert_ne!(cs.digest(), swapped.digest());

        // Already-canonical systems are untouched.
        let mut again = swapped.clone();
        again.swap_ab_if_beneficial();
        assert_eq!(swapped.digest(), again.digest());
    }

    #[test]
    fn test_out_of_bounds_wire_rejected() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_auxiliary();
        let result = cs.enforce(
            LinearCombination::from_variable(x),
            LinearCombination::from_variable(Variable::new(17)),
            LinearCombination::from_variable(x),
        );
        assert!(matches!(result, Err(R1csError::IndexOutOfBounds(17))));
    }
}
