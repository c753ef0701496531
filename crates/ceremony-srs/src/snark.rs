//! Groth16 prover and verifier over the materialized keys.
//!
//! These exist so a finished ceremony can be exercised end to end: the
//! finalize path smoke-tests the keypair it just wrote, and the test suites
//! prove and verify against both the ceremony-built and the
//! secrets-built keys. `gamma = 1` throughout, so the verifier pairs the
//! input commitment against the plain G2 generator.

use crate::{ProvingKey, SrsError, VerificationKey};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::Zero;
use ark_poly::{
    univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain, Evaluations, Polynomial,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::Rng, vec::Vec, UniformRand};
use ceremony_r1cs::Qap;
use tracing::debug;

/// A Groth16 proof.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<P: Pairing> {
    /// `pi_A` in G1
    pub a: P::G1Affine,
    /// `pi_B` in G2
    pub b: P::G2Affine,
    /// `pi_C` in G1
    pub c: P::G1Affine,
}

/// Generate a proof for `(primary, auxiliary)` under the proving key.
pub fn prove<P: Pairing, R: Rng + ?Sized>(
    pk: &ProvingKey<P>,
    primary: &[P::ScalarField],
    auxiliary: &[P::ScalarField],
    rng: &mut R,
) -> Result<Proof<P>, SrsError> {
    if !pk.cs.is_satisfied(primary, auxiliary)? {
        return Err(SrsError::InvalidWitness(
            "assignment does not satisfy the constraint system".into(),
        ));
    }
    let assignment = pk.cs.full_assignment(primary, auxiliary)?;
    let qap = Qap::from_constraint_system(&pk.cs)?;

    // Quotient polynomial h = (A.w * B.w - C.w) / z over the FFT domain.
    let (a_evals, b_evals, c_evals) = qap.witness_map(&assignment);
    let domain = qap.domain;
    let a_poly = Evaluations::from_vec_and_domain(a_evals, domain).interpolate();
    let b_poly = Evaluations::from_vec_and_domain(b_evals, domain).interpolate();
    let c_poly = Evaluations::from_vec_and_domain(c_evals, domain).interpolate();
    let numerator = &(&a_poly * &b_poly) - &c_poly;
    let (h_poly, remainder): (DensePolynomial<P::ScalarField>, _) = numerator
        .divide_by_vanishing_poly(domain)
        .ok_or_else(|| SrsError::InvalidWitness("empty evaluation domain".into()))?;
    if !remainder.is_zero() {
        return Err(SrsError::InvalidWitness(
            "witness polynomial is not divisible by the vanishing polynomial".into(),
        ));
    }
    let h_coeffs = h_poly.coeffs();
    debug!(h_degree = h_poly.degree(), "proving");

    let r = P::ScalarField::rand(rng);
    let s = P::ScalarField::rand(rng);

    let a_acc = pk.alpha_g1.into_group()
        + P::G1::msm_unchecked(&pk.a_query, &assignment)
        + pk.delta_g1 * r;
    let b_g1_acc = pk.beta_g1.into_group()
        + P::G1::msm_unchecked(&pk.b_g1_query, &assignment)
        + pk.delta_g1 * s;
    let b_g2_acc = pk.beta_g2.into_group()
        + P::G2::msm_unchecked(&pk.b_g2_query, &assignment)
        + pk.delta_g2 * s;

    let c_acc = P::G1::msm_unchecked(&pk.l_query, &assignment[pk.cs.num_inputs + 1..])
        + P::G1::msm_unchecked(&pk.h_query[..h_coeffs.len()], h_coeffs)
        + a_acc * s
        + b_g1_acc * r
        - pk.delta_g1 * (r * s);

    Ok(Proof {
        a: a_acc.into_affine(),
        b: b_g2_acc.into_affine(),
        c: c_acc.into_affine(),
    })
}

/// Verify a proof against the verification key and the primary inputs.
pub fn verify<P: Pairing>(
    vk: &VerificationKey<P>,
    primary: &[P::ScalarField],
    proof: &Proof<P>,
) -> Result<bool, SrsError> {
    if primary.len() + 1 != vk.abc_g1.len() {
        return Err(SrsError::InvalidWitness(format!(
            "expected {} primary inputs, got {}",
            vk.abc_g1.len() - 1,
            primary.len()
        )));
    }

    let mut ic = vk.abc_g1[0].into_group();
    for (input, base) in primary.iter().zip(&vk.abc_g1[1..]) {
        ic += *base * *input;
    }

    // e(A, B) = e(alpha, beta) * e(IC, G2) * e(C, delta), rearranged into a
    // single product of four pairings.
    let g1_terms = [
        proof.a,
        (-vk.alpha_g1.into_group()).into_affine(),
        (-ic).into_affine(),
        (-proof.c.into_group()).into_affine(),
    ];
    let g2_terms = [
        proof.b,
        vk.beta_g2,
        P::G2Affine::generator(),
        vk.delta_g2,
    ];
    Ok(P::multi_pairing(g1_terms, g2_terms).is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair_from_secrets;
    use ark_bls12_381::{Bls12_381, Fr};
    use ark_ff::UniformRand;
    use ark_std::test_rng;
    use ceremony_r1cs::simple_circuit;

    fn test_keypair() -> crate::Keypair<Bls12_381> {
        let mut rng = test_rng();
        let mut cs = simple_circuit::<Fr>();
        cs.swap_ab_if_beneficial();
        keypair_from_secrets(
            cs,
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
        )
        .unwrap()
    }

    #[test]
    fn test_prove_and_verify() {
        let mut rng = test_rng();
        let keypair = test_keypair();

        let primary = vec![Fr::from(8u64)];
        let auxiliary = vec![Fr::from(2u64), Fr::from(4u64)];
        let proof = prove(&keypair.pk, &primary, &auxiliary, &mut rng).unwrap();
        assert!(verify(&keypair.vk, &primary, &proof).unwrap());
    }

    #[test]
    fn test_wrong_primary_input_rejected() {
        let mut rng = test_rng();
        let keypair = test_keypair();

        let primary = vec![Fr::from(8u64)];
        let auxiliary = vec![Fr::from(2u64), Fr::from(4u64)];
        let proof = prove(&keypair.pk, &primary, &auxiliary, &mut rng).unwrap();
        assert!(!verify(&keypair.vk, &[Fr::from(9u64)], &proof).unwrap());
    }

    #[test]
    fn test_unsatisfied_witness_rejected() {
        let mut rng = test_rng();
        let keypair = test_keypair();

        let primary = vec![Fr::from(8u64)];
        let bad_auxiliary = vec![Fr::from(2u64), Fr::from(5u64)];
        assert!(matches!(
            prove(&keypair.pk, &primary, &bad_auxiliary, &mut rng),
            Err(SrsError::InvalidWitness(_))
        ));
    }

    #[test]
    fn test_proof_round_trip() {
        let mut rng = test_rng();
        let keypair = test_keypair();

        let primary = vec![Fr::from(8u64)];
        let auxiliary = vec![Fr::from(2u64), Fr::from(4u64)];
        let proof = prove(&keypair.pk, &primary, &auxiliary, &mut rng).unwrap();

        let mut bytes = Vec::new();
        proof.serialize_uncompressed(&mut bytes).unwrap();
        let restored = Proof::<Bls12_381>::deserialize_uncompressed(&bytes[..]).unwrap();
        assert_eq!(proof, restored);
        assert!(verify(&keypair.vk, &primary, &restored).unwrap());
    }
}
