//! The linear-combination layer tying a compiled circuit to the phase-1
//! output.
//!
//! Given the QAP and the Lagrange evaluations in the exponent, this layer
//! evaluates every variable polynomial at `tau` inside the groups, producing
//! the circuit-specific rows the phase-2 accumulator and the final keys are
//! built from. No secrets are involved: everything is a linear combination
//! of phase-1 elements.

use crate::serial::{read_points, write_points};
use crate::Phase2Error;
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_serialize::Compress;
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_curve::batch_into_affine;
use ceremony_pot::{LagrangeEvaluations, PowersOfTau};
use ceremony_r1cs::Qap;
use rayon::prelude::*;
use tracing::debug;

/// The circuit-specific linear combinations of phase-1 elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer1<P: Pairing> {
    /// `t(tau) * tau^i * G1` for `i < n-1`
    pub t_tau_powers_g1: Vec<P::G1Affine>,
    /// `A_j(tau) * G1` per variable
    pub a_g1: Vec<P::G1Affine>,
    /// `B_j(tau) * G1` per variable
    pub b_g1: Vec<P::G1Affine>,
    /// `B_j(tau) * G2` per variable
    pub b_g2: Vec<P::G2Affine>,
    /// `(beta * A_j(tau) + alpha * B_j(tau) + C_j(tau)) * G1` per variable
    pub abc_g1: Vec<P::G1Affine>,
}

impl<P: Pairing> Layer1<P> {
    /// The QAP degree this layer was built for.
    pub fn degree(&self) -> usize {
        self.t_tau_powers_g1.len() + 1
    }

    /// Write the uncompressed byte encoding.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), Phase2Error> {
        write_points(&mut writer, &self.t_tau_powers_g1, Compress::No)?;
        write_points(&mut writer, &self.a_g1, Compress::No)?;
        write_points(&mut writer, &self.b_g1, Compress::No)?;
        write_points(&mut writer, &self.b_g2, Compress::No)?;
        write_points(&mut writer, &self.abc_g1, Compress::No)
    }

    /// Read the uncompressed byte encoding, validating every point.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Phase2Error> {
        Ok(Self {
            t_tau_powers_g1: read_points(&mut reader, Compress::No)?,
            a_g1: read_points(&mut reader, Compress::No)?,
            b_g1: read_points(&mut reader, Compress::No)?,
            b_g2: read_points(&mut reader, Compress::No)?,
            abc_g1: read_points(&mut reader, Compress::No)?,
        })
    }
}

fn sparse_combine<G: CurveGroup>(column: &[(usize, G::ScalarField)], basis: &[G::Affine]) -> G {
    column
        .iter()
        .map(|(row, coefficient)| basis[*row] * *coefficient)
        .sum()
}

/// Evaluate every QAP variable polynomial at `tau` in the exponent.
///
/// `abc_g1[0..=num_inputs]` is the verification-key IC; the remaining
/// entries feed the phase-2 L query. The `t(tau) * tau^i` row is assembled
/// directly from the monomial powers as `tau^{n+i} - tau^i`.
pub fn compute_linear_combination<P: Pairing>(
    pot: &PowersOfTau<P>,
    lagrange: &LagrangeEvaluations<P>,
    qap: &Qap<P::ScalarField>,
) -> Result<Layer1<P>, Phase2Error> {
    let n = qap.degree();
    if lagrange.domain_size != n {
        return Err(Phase2Error::InputMismatch(
            "Lagrange evaluations were computed for a different degree",
        ));
    }
    if pot.tau_powers_g1.len() < 2 * n - 1 {
        return Err(Phase2Error::InputMismatch(
            "powers of tau are too short for the QAP degree",
        ));
    }
    debug!(
        degree = n,
        variables = qap.num_variables,
        "computing linear combination"
    );

    let t_tau_powers: Vec<P::G1> = (0..n - 1)
        .into_par_iter()
        .map(|i| pot.tau_powers_g1[n + i].into_group() - pot.tau_powers_g1[i])
        .collect();

    let a_g1: Vec<P::G1> = qap
        .a
        .par_iter()
        .map(|column| sparse_combine(column, &lagrange.lagrange_g1))
        .collect();
    let b_g1: Vec<P::G1> = qap
        .b
        .par_iter()
        .map(|column| sparse_combine(column, &lagrange.lagrange_g1))
        .collect();
    let b_g2: Vec<P::G2> = qap
        .b
        .par_iter()
        .map(|column| sparse_combine(column, &lagrange.lagrange_g2))
        .collect();
    let abc_g1: Vec<P::G1> = (0..qap.num_variables)
        .into_par_iter()
        .map(|j| {
            sparse_combine::<P::G1>(&qap.a[j], &lagrange.beta_lagrange_g1)
                + sparse_combine::<P::G1>(&qap.b[j], &lagrange.alpha_lagrange_g1)
                + sparse_combine::<P::G1>(&qap.c[j], &lagrange.lagrange_g1)
        })
        .collect();

    Ok(Layer1 {
        t_tau_powers_g1: batch_into_affine(&t_tau_powers),
        a_g1: batch_into_affine(&a_g1),
        b_g1: batch_into_affine(&b_g1),
        b_g2: batch_into_affine(&b_g2),
        abc_g1: batch_into_affine(&abc_g1),
    })
}
