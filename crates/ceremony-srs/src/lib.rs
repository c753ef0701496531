//! SRS materialization: turning a finished phase-2 ceremony into Groth16
//! proving and verification keys.
//!
//! The materializer only rearranges data that already exists (phase-1
//! elements, the linear-combination layer, the final accumulator) into
//! the key layout the prover consumes. A reference generator that builds the
//! same keys directly from the toxic secrets is provided for cross-checking;
//! the two paths must agree bit for bit.

#![forbid(unsafe_code)]

pub mod json;
pub mod snark;

pub use snark::{prove, verify, Proof};

use ark_ec::{pairing::Pairing, CurveGroup, Group};
use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_curve::batch_into_affine;
use ceremony_phase2::{Layer1, Phase2Accumulator, Phase2Error};
use ceremony_pot::PowersOfTau;
use ceremony_r1cs::{ConstraintSystem, Qap, R1csError};
use thiserror::Error;
use tracing::info;

/// Errors raised while materializing, serializing, or using the keys.
#[derive(Debug, Error)]
pub enum SrsError {
    #[error("malformed input: {0}")]
    Io(#[from] ark_std::io::Error),
    #[error("invalid group element: {0}")]
    Serialization(#[from] ark_serialize::SerializationError),
    #[error("constraint system error: {0}")]
    R1cs(#[from] R1csError),
    #[error("phase-2 error: {0}")]
    Phase2(#[from] Phase2Error),
    #[error("inconsistent ceremony inputs: {0}")]
    InputMismatch(&'static str),
    #[error("invalid witness: {0}")]
    InvalidWitness(String),
    #[error("toxic secrets must be non-zero")]
    ZeroSecret,
}

/// Groth16 proving key. The B query is a knowledge-commitment pair per
/// variable: `(B_j(tau) * G2, B_j(tau) * G1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvingKey<P: Pairing> {
    /// `alpha * G1`
    pub alpha_g1: P::G1Affine,
    /// `beta * G1`
    pub beta_g1: P::G1Affine,
    /// `beta * G2`
    pub beta_g2: P::G2Affine,
    /// `delta * G1`
    pub delta_g1: P::G1Affine,
    /// `delta * G2`
    pub delta_g2: P::G2Affine,
    /// `A_j(tau) * G1` per variable
    pub a_query: Vec<P::G1Affine>,
    /// `B_j(tau) * G1` per variable
    pub b_g1_query: Vec<P::G1Affine>,
    /// `B_j(tau) * G2` per variable
    pub b_g2_query: Vec<P::G2Affine>,
    /// `t(tau) * tau^i / delta * G1`
    pub h_query: Vec<P::G1Affine>,
    /// `(beta*A_j + alpha*B_j + C_j)(tau) / delta * G1` for non-input wires
    pub l_query: Vec<P::G1Affine>,
    /// The constraint system the keys were generated for
    pub cs: ConstraintSystem<P::ScalarField>,
}

/// Groth16 verification key (`gamma = 1`, so no gamma element is carried;
/// verifiers pair the IC against the plain G2 generator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey<P: Pairing> {
    /// `alpha * G1`
    pub alpha_g1: P::G1Affine,
    /// `beta * G2`
    pub beta_g2: P::G2Affine,
    /// `delta * G2`
    pub delta_g2: P::G2Affine,
    /// `(beta*A_j + alpha*B_j + C_j)(tau) * G1` for the one wire and the
    /// primary inputs
    pub abc_g1: Vec<P::G1Affine>,
}

/// Proving and verification key for one circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypair<P: Pairing> {
    /// The proving key
    pub pk: ProvingKey<P>,
    /// The verification key
    pub vk: VerificationKey<P>,
}

/// Assemble the keypair from the ceremony outputs.
pub fn materialize<P: Pairing>(
    pot: &PowersOfTau<P>,
    layer1: &Layer1<P>,
    accumulator: &Phase2Accumulator<P>,
    cs: ConstraintSystem<P::ScalarField>,
) -> Result<Keypair<P>, SrsError> {
    if accumulator.cs_hash != cs.digest() {
        return Err(SrsError::InputMismatch(
            "accumulator was pinned to a different constraint system",
        ));
    }
    if layer1.abc_g1.len() != cs.num_variables {
        return Err(SrsError::InputMismatch(
            "linear combination does not cover every variable",
        ));
    }
    if accumulator.l_g1.len() != cs.num_variables - cs.num_inputs - 1 {
        return Err(SrsError::InputMismatch(
            "L query does not cover every non-input variable",
        ));
    }
    info!(
        variables = cs.num_variables,
        inputs = cs.num_inputs,
        "materializing keypair"
    );

    let vk = VerificationKey {
        alpha_g1: pot.alpha_tau_powers_g1[0],
        beta_g2: pot.beta_g2,
        delta_g2: accumulator.delta_g2,
        abc_g1: layer1.abc_g1[..=cs.num_inputs].to_vec(),
    };
    let pk = ProvingKey {
        alpha_g1: pot.alpha_tau_powers_g1[0],
        beta_g1: pot.beta_tau_powers_g1[0],
        beta_g2: pot.beta_g2,
        delta_g1: accumulator.delta_g1,
        delta_g2: accumulator.delta_g2,
        a_query: layer1.a_g1.clone(),
        b_g1_query: layer1.b_g1.clone(),
        b_g2_query: layer1.b_g2.clone(),
        h_query: accumulator.h_g1.clone(),
        l_query: accumulator.l_g1.clone(),
        cs,
    };
    Ok(Keypair { pk, vk })
}

/// Build the same keypair directly from the toxic secrets. Only for tests
/// and cross-checks against [`materialize`]; a real ceremony never exposes
/// these values.
pub fn keypair_from_secrets<P: Pairing>(
    cs: ConstraintSystem<P::ScalarField>,
    tau: P::ScalarField,
    alpha: P::ScalarField,
    beta: P::ScalarField,
    delta: P::ScalarField,
) -> Result<Keypair<P>, SrsError> {
    let delta_inverse = delta.inverse().ok_or(SrsError::ZeroSecret)?;
    let qap = Qap::from_constraint_system(&cs)?;
    let eval = qap.evaluate(tau);
    let n = qap.degree();
    let g1 = P::G1::generator();
    let g2 = P::G2::generator();

    let a_query: Vec<P::G1> = eval.at.iter().map(|v| g1 * *v).collect();
    let b_g1_query: Vec<P::G1> = eval.bt.iter().map(|v| g1 * *v).collect();
    let b_g2_query: Vec<P::G2> = eval.bt.iter().map(|v| g2 * *v).collect();

    let abc = |j: usize| beta * eval.at[j] + alpha * eval.bt[j] + eval.ct[j];
    let abc_g1: Vec<P::G1> = (0..=cs.num_inputs).map(|j| g1 * abc(j)).collect();
    let l_query: Vec<P::G1> = (cs.num_inputs + 1..cs.num_variables)
        .map(|j| g1 * (abc(j) * delta_inverse))
        .collect();

    let mut h_query = Vec::with_capacity(n - 1);
    let mut t_tau_i = eval.z_at * delta_inverse;
    for _ in 0..n - 1 {
        h_query.push(g1 * t_tau_i);
        t_tau_i *= tau;
    }

    let vk = VerificationKey {
        alpha_g1: (g1 * alpha).into_affine(),
        beta_g2: (g2 * beta).into_affine(),
        delta_g2: (g2 * delta).into_affine(),
        abc_g1: batch_into_affine(&abc_g1),
    };
    let pk = ProvingKey {
        alpha_g1: vk.alpha_g1,
        beta_g1: (g1 * beta).into_affine(),
        beta_g2: vk.beta_g2,
        delta_g1: (g1 * delta).into_affine(),
        delta_g2: vk.delta_g2,
        a_query: batch_into_affine(&a_query),
        b_g1_query: batch_into_affine(&b_g1_query),
        b_g2_query: batch_into_affine(&b_g2_query),
        h_query: batch_into_affine(&h_query),
        l_query: batch_into_affine(&l_query),
        cs,
    };
    Ok(Keypair { pk, vk })
}

fn write_points<T: CanonicalSerialize, W: Write>(
    mut writer: W,
    points: &[T],
) -> Result<(), SrsError> {
    writer.write_all(&(points.len() as u64).to_le_bytes())?;
    for point in points {
        point.serialize_uncompressed(&mut writer)?;
    }
    Ok(())
}

fn read_points<T: CanonicalDeserialize, R: Read>(mut reader: R) -> Result<Vec<T>, SrsError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let len = u64::from_le_bytes(buf) as usize;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        points.push(T::deserialize_with_mode(
            &mut reader,
            Compress::No,
            Validate::Yes,
        )?);
    }
    Ok(points)
}

impl<P: Pairing> Keypair<P> {
    /// Write the uncompressed byte encoding: proving key first, then the
    /// verification key.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), SrsError> {
        self.pk.alpha_g1.serialize_uncompressed(&mut writer)?;
        self.pk.beta_g1.serialize_uncompressed(&mut writer)?;
        self.pk.beta_g2.serialize_uncompressed(&mut writer)?;
        self.pk.delta_g1.serialize_uncompressed(&mut writer)?;
        self.pk.delta_g2.serialize_uncompressed(&mut writer)?;
        write_points(&mut writer, &self.pk.a_query)?;
        write_points(&mut writer, &self.pk.b_g1_query)?;
        write_points(&mut writer, &self.pk.b_g2_query)?;
        write_points(&mut writer, &self.pk.h_query)?;
        write_points(&mut writer, &self.pk.l_query)?;
        self.pk.cs.write(&mut writer)?;

        self.vk.alpha_g1.serialize_uncompressed(&mut writer)?;
        self.vk.beta_g2.serialize_uncompressed(&mut writer)?;
        self.vk.delta_g2.serialize_uncompressed(&mut writer)?;
        write_points(&mut writer, &self.vk.abc_g1)
    }

    /// Read the uncompressed byte encoding, validating every point.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, SrsError> {
        let read_g1 = |reader: &mut R| -> Result<P::G1Affine, SrsError> {
            Ok(P::G1Affine::deserialize_with_mode(
                reader,
                Compress::No,
                Validate::Yes,
            )?)
        };
        let read_g2 = |reader: &mut R| -> Result<P::G2Affine, SrsError> {
            Ok(P::G2Affine::deserialize_with_mode(
                reader,
                Compress::No,
                Validate::Yes,
            )?)
        };

        let alpha_g1 = read_g1(&mut reader)?;
        let beta_g1 = read_g1(&mut reader)?;
        let beta_g2 = read_g2(&mut reader)?;
        let delta_g1 = read_g1(&mut reader)?;
        let delta_g2 = read_g2(&mut reader)?;
        let a_query = read_points(&mut reader)?;
        let b_g1_query = read_points(&mut reader)?;
        let b_g2_query = read_points(&mut reader)?;
        let h_query = read_points(&mut reader)?;
        let l_query = read_points(&mut reader)?;
        let cs = ConstraintSystem::read(&mut reader)?;

        let pk = ProvingKey {
            alpha_g1,
            beta_g1,
            beta_g2,
            delta_g1,
            delta_g2,
            a_query,
            b_g1_query,
            b_g2_query,
            h_query,
            l_query,
            cs,
        };
        let vk = VerificationKey {
            alpha_g1: read_g1(&mut reader)?,
            beta_g2: read_g2(&mut reader)?,
            delta_g2: read_g2(&mut reader)?,
            abc_g1: read_points(&mut reader)?,
        };
        Ok(Keypair { pk, vk })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Bls12_381, Fr};
    use ark_ff::UniformRand;
    use ark_std::test_rng;
    use ceremony_phase2::{
        compute_challenge, compute_linear_combination, compute_response, initial_challenge,
        verify_response,
    };
    use ceremony_pot::lagrange_evaluations;
    use ceremony_r1cs::simple_circuit;

    /// Run a two-party ceremony over the simple circuit with known secrets
    /// and return everything needed for cross-checks.
    fn ceremony_keypair(
        tau: Fr,
        alpha: Fr,
        beta: Fr,
        d_1: Fr,
        d_2: Fr,
    ) -> (Keypair<Bls12_381>, ConstraintSystem<Fr>) {
        let mut cs = simple_circuit::<Fr>();
        cs.swap_ab_if_beneficial();
        let qap = Qap::from_constraint_system(&cs).unwrap();
        let pot = PowersOfTau::<Bls12_381>::from_secrets(tau, alpha, beta, qap.degree());
        let lagrange = lagrange_evaluations(&pot, qap.degree()).unwrap();
        let layer1 = compute_linear_combination(&pot, &lagrange, &qap).unwrap();
        let accumulator = Phase2Accumulator::initial(cs.digest(), &layer1, cs.num_inputs);

        let challenge_0 = initial_challenge(accumulator);
        let response_1 = compute_response(&challenge_0, d_1).unwrap();
        verify_response(&challenge_0, &response_1).unwrap();
        let challenge_1 = compute_challenge(response_1);
        let response_2 = compute_response(&challenge_1, d_2).unwrap();
        verify_response(&challenge_1, &response_2).unwrap();

        let keypair = materialize(
            &pot,
            &layer1,
            &response_2.new_accumulator,
            cs.clone(),
        )
        .unwrap();
        (keypair, cs)
    }

    #[test]
    fn test_materialize_matches_generator_from_secrets() {
        let mut rng = test_rng();
        let tau = Fr::rand(&mut rng);
        let alpha = Fr::rand(&mut rng);
        let beta = Fr::rand(&mut rng);
        let d_1 = Fr::rand(&mut rng);
        let d_2 = Fr::rand(&mut rng);

        let (keypair, cs) = ceremony_keypair(tau, alpha, beta, d_1, d_2);
        let direct = keypair_from_secrets(cs, tau, alpha, beta, d_1 * d_2).unwrap();

        assert_eq!(direct.pk.alpha_g1, keypair.pk.alpha_g1);
        assert_eq!(direct.pk.beta_g1, keypair.pk.beta_g1);
        assert_eq!(direct.pk.beta_g2, keypair.pk.beta_g2);
        assert_eq!(direct.pk.delta_g1, keypair.pk.delta_g1);
        assert_eq!(direct.pk.delta_g2, keypair.pk.delta_g2);
        assert_eq!(direct.pk.a_query, keypair.pk.a_query);
        assert_eq!(direct.pk.b_g1_query, keypair.pk.b_g1_query);
        assert_eq!(direct.pk.b_g2_query, keypair.pk.b_g2_query);
        assert_eq!(direct.pk.h_query, keypair.pk.h_query);
        assert_eq!(direct.pk.l_query, keypair.pk.l_query);
        assert_eq!(direct.vk, keypair.vk);

        // And the serialized forms agree byte for byte.
        let mut ceremony_bytes = Vec::new();
        keypair.write(&mut ceremony_bytes).unwrap();
        let mut direct_bytes = Vec::new();
        direct.write(&mut direct_bytes).unwrap();
        assert_eq!(ceremony_bytes, direct_bytes);
    }

    #[test]
    fn test_keypair_round_trip() {
        let mut rng = test_rng();
        let (keypair, _) = ceremony_keypair(
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
            Fr::rand(&mut rng),
        );

        let mut bytes = Vec::new();
        keypair.write(&mut bytes).unwrap();
        let restored = Keypair::<Bls12_381>::read(&bytes[..]).unwrap();
        assert_eq!(keypair, restored);

        // Both copies verify the same proof.
        let primary = vec![Fr::from(8u64)];
        let auxiliary = vec![Fr::from(2u64), Fr::from(4u64)];
        let proof = prove(&keypair.pk, &primary, &auxiliary, &mut rng).unwrap();
        assert!(verify(&keypair.vk, &primary, &proof).unwrap());
        assert!(verify(&restored.vk, &primary, &proof).unwrap());
    }

    #[test]
    fn test_materialize_rejects_foreign_accumulator() {
        let mut rng = test_rng();
        let tau = Fr::rand(&mut rng);
        let mut cs = simple_circuit::<Fr>();
        cs.swap_ab_if_beneficial();
        let qap = Qap::from_constraint_system(&cs).unwrap();
        let pot = PowersOfTau::<Bls12_381>::from_secrets(tau, tau, tau, qap.degree());
        let lagrange = lagrange_evaluations(&pot, qap.degree()).unwrap();
        let layer1 = compute_linear_combination(&pot, &lagrange, &qap).unwrap();

        let mut accumulator = Phase2Accumulator::initial(cs.digest(), &layer1, cs.num_inputs);
        accumulator.cs_hash.0[7] ^= 1;
        assert!(matches!(
            materialize(&pot, &layer1, &accumulator, cs),
            Err(SrsError::InputMismatch(_))
        ));
    }
}
