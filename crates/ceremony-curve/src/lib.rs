//! Pairing-group helpers shared by the ceremony crates.
//!
//! Everything the ceremony needs from the curve beyond plain arithmetic lives
//! here: the `same_ratio` pairing identity that underpins every consistency
//! check, random-linear-combination compression of vector checks, and batch
//! scalar multiplication for the accumulator updates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_std::vec::Vec;
use rayon::prelude::*;

/// Checks the pairing identity `e(a1, b2) == e(a2, b1)`, i.e. that the ratio
/// `a2 / a1` in G1 equals the ratio `b2 / b1` in G2.
///
/// Returns `false` if `a1` or `b1` is the identity, since a ratio against the
/// identity is meaningless and accepting it would let a malicious contributor
/// zero out the accumulator.
pub fn same_ratio<P: Pairing>(
    a1: P::G1Affine,
    a2: P::G1Affine,
    b1: P::G2Affine,
    b2: P::G2Affine,
) -> bool {
    if a1.is_zero() || b1.is_zero() {
        return false;
    }
    P::pairing(a1, b2) == P::pairing(a2, b1)
}

/// Compresses two equally-sized G1 vectors into a single pair of points by a
/// shared linear combination, so that one `same_ratio` check covers the whole
/// vector relation.
///
/// The caller supplies the combination coefficients; the two sides must be
/// combined with the *same* coefficients for the compressed pair to preserve
/// the per-element ratio relation.
pub fn combine_ratio_pairs<P: Pairing>(
    lhs: &[P::G1Affine],
    rhs: &[P::G1Affine],
    coefficients: &[P::ScalarField],
) -> (P::G1Affine, P::G1Affine) {
    debug_assert_eq!(lhs.len(), rhs.len());
    debug_assert_eq!(lhs.len(), coefficients.len());
    let l = P::G1::msm_unchecked(lhs, coefficients);
    let r = P::G1::msm_unchecked(rhs, coefficients);
    (l.into_affine(), r.into_affine())
}

/// Multiplies every point in `points` by the same scalar, in parallel, and
/// returns the normalized affine results.
pub fn batch_mul<G: CurveGroup>(points: &[G::Affine], scalar: G::ScalarField) -> Vec<G::Affine> {
    let scaled: Vec<G> = points.par_iter().map(|p| *p * scalar).collect();
    G::normalize_batch(&scaled)
}

/// Converts a slice of projective points to affine in one batched inversion.
pub fn batch_into_affine<G: CurveGroup>(points: &[G]) -> Vec<G::Affine> {
    G::normalize_batch(points)
}
