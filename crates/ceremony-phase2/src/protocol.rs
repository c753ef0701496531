//! Challenge / response messages and the single-step verifier.

use crate::publickey::{compute_public_key, verify_publickey};
use crate::{Phase2Accumulator, Phase2Error, Phase2PublicKey, QueryKind};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::Field;
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_curve::{batch_mul, combine_ratio_pairs, same_ratio};
use ceremony_hash::{hash_to_fr, Digest, DigestWriter};
use tracing::{debug, info};

/// A challenge: the accumulator to contribute on top of, plus the rolling
/// transcript digest the next contribution must answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase2Challenge<P: Pairing> {
    /// Rolling transcript digest
    pub transcript_digest: Digest,
    /// Current accumulator
    pub accumulator: Phase2Accumulator<P>,
}

/// A response: the contributor's public key and the updated accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase2Response<P: Pairing> {
    /// Proof of knowledge of the contribution secret
    pub publickey: Phase2PublicKey<P>,
    /// Accumulator after applying the secret
    pub new_accumulator: Phase2Accumulator<P>,
}

/// The first challenge of a ceremony. Its digest is the hash of the pinned
/// `cs_hash`, so equal circuits yield equal initial transcripts.
pub fn initial_challenge<P: Pairing>(accumulator: Phase2Accumulator<P>) -> Phase2Challenge<P> {
    let transcript_digest = Digest::of_bytes(&accumulator.cs_hash.0);
    Phase2Challenge {
        transcript_digest,
        accumulator,
    }
}

/// Apply a contribution secret to a challenge.
///
/// `delta` picks up the factor `secret`; the H and L queries are rescaled by
/// `secret^-1`. A zero secret is rejected before anything is computed.
pub fn compute_response<P: Pairing>(
    challenge: &Phase2Challenge<P>,
    secret: P::ScalarField,
) -> Result<Phase2Response<P>, Phase2Error> {
    let inverse = secret.inverse().ok_or(Phase2Error::SecretZero)?;
    let accumulator = &challenge.accumulator;

    let publickey =
        compute_public_key::<P>(&challenge.transcript_digest, accumulator.delta_g1, secret);
    info!(
        h_len = accumulator.h_g1.len(),
        l_len = accumulator.l_g1.len(),
        "applying contribution"
    );

    let new_accumulator = Phase2Accumulator {
        cs_hash: accumulator.cs_hash,
        delta_g1: publickey.new_delta_g1,
        delta_g2: (accumulator.delta_g2 * secret).into_affine(),
        h_g1: batch_mul::<P::G1>(&accumulator.h_g1, inverse),
        l_g1: batch_mul::<P::G1>(&accumulator.l_g1, inverse),
    };

    Ok(Phase2Response {
        publickey,
        new_accumulator,
    })
}

/// Derive the next challenge from a verified response:
/// `next_digest = H(prev_digest || encode(publickey))`.
pub fn compute_challenge<P: Pairing>(response: Phase2Response<P>) -> Phase2Challenge<P> {
    let mut writer = DigestWriter::new();
    response
        .publickey
        .transcript_digest
        .write(&mut writer)
        .expect("hashing is not allowed to fail");
    response
        .publickey
        .write(&mut writer)
        .expect("hashing is not allowed to fail");
    Phase2Challenge {
        transcript_digest: writer.finalize(),
        accumulator: response.new_accumulator,
    }
}

/// Deterministic coefficients for compressing a vector ratio check into a
/// single pairing equation, derived from the digests on both sides of the
/// contribution.
fn ratio_coefficients<F: ark_ff::PrimeField>(
    challenge_digest: &Digest,
    response_digest: &Digest,
    len: usize,
) -> Vec<F> {
    (0..len as u64)
        .map(|i| {
            let mut writer = DigestWriter::new();
            challenge_digest
                .write(&mut writer)
                .expect("hashing is not allowed to fail");
            response_digest
                .write(&mut writer)
                .expect("hashing is not allowed to fail");
            use ark_std::io::Write as _;
            writer
                .write_all(&i.to_le_bytes())
                .expect("hashing is not allowed to fail");
            hash_to_fr(&writer.finalize())
        })
        .collect()
}

/// Check a single response against the challenge it answers.
///
/// Every invariant gets its own error so a failing contribution can be
/// diagnosed precisely; the H and L vector relations are compressed into one
/// pairing equation each by a Fiat-Shamir linear combination.
pub fn verify_response<P: Pairing>(
    challenge: &Phase2Challenge<P>,
    response: &Phase2Response<P>,
) -> Result<(), Phase2Error> {
    let old = &challenge.accumulator;
    let new = &response.new_accumulator;
    let publickey = &response.publickey;

    // The contribution must answer this exact challenge.
    if publickey.transcript_digest != challenge.transcript_digest {
        return Err(Phase2Error::DigestMismatch);
    }
    if new.cs_hash != old.cs_hash {
        return Err(Phase2Error::CsHashMismatch);
    }
    if publickey.new_delta_g1 != new.delta_g1 {
        return Err(Phase2Error::DeltaInconsistency);
    }
    if new.h_g1.len() != old.h_g1.len() {
        return Err(Phase2Error::QueryInconsistency(QueryKind::H));
    }
    if new.l_g1.len() != old.l_g1.len() {
        return Err(Phase2Error::QueryInconsistency(QueryKind::L));
    }

    verify_publickey(old.delta_g1, publickey)?;

    // delta must have the same discrete log in both groups.
    if !same_ratio::<P>(
        new.delta_g1,
        P::G1Affine::generator(),
        new.delta_g2,
        P::G2Affine::generator(),
    ) {
        return Err(Phase2Error::DeltaInconsistency);
    }

    // H and L must be the old queries rescaled by exactly delta_j^-1:
    // same_ratio(new[i], old[i], new_delta_g2, G2) for every i, compressed.
    let response_digest = publickey.digest();
    debug!(
        h_len = new.h_g1.len(),
        l_len = new.l_g1.len(),
        "checking query rescaling"
    );

    let coefficients =
        ratio_coefficients::<P::ScalarField>(&challenge.transcript_digest, &response_digest, new.h_g1.len());
    let (new_h, old_h) = combine_ratio_pairs::<P>(&new.h_g1, &old.h_g1, &coefficients);
    if !same_ratio::<P>(new_h, old_h, new.delta_g2, P::G2Affine::generator()) {
        return Err(Phase2Error::QueryInconsistency(QueryKind::H));
    }

    let coefficients =
        ratio_coefficients::<P::ScalarField>(&challenge.transcript_digest, &response_digest, new.l_g1.len());
    let (new_l, old_l) = combine_ratio_pairs::<P>(&new.l_g1, &old.l_g1, &coefficients);
    if !same_ratio::<P>(new_l, old_l, new.delta_g2, P::G2Affine::generator()) {
        return Err(Phase2Error::QueryInconsistency(QueryKind::L));
    }

    Ok(())
}

impl<P: Pairing> Phase2Challenge<P> {
    /// Write the byte encoding: digest followed by the uncompressed
    /// accumulator.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), Phase2Error> {
        self.transcript_digest.write(&mut writer)?;
        self.accumulator.write(&mut writer)
    }

    /// Read the byte encoding.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Phase2Error> {
        Ok(Self {
            transcript_digest: Digest::read(&mut reader)?,
            accumulator: Phase2Accumulator::read(&mut reader)?,
        })
    }
}

impl<P: Pairing> Phase2Response<P> {
    /// Write the byte encoding: public key followed by the compressed
    /// accumulator (responses travel back to the coordinator, so they use
    /// the smaller format).
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), Phase2Error> {
        self.publickey.write(&mut writer)?;
        self.new_accumulator.write_compressed(&mut writer)
    }

    /// Read the byte encoding.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Phase2Error> {
        Ok(Self {
            publickey: Phase2PublicKey::read(&mut reader)?,
            new_accumulator: Phase2Accumulator::read_compressed(&mut reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dummy_accumulator;
    use ark_bls12_381::{Bls12_381, Fr, G1Projective, G2Projective};
    use ark_ec::Group;
    use ark_serialize::CanonicalSerialize;

    const SEED: u64 = 9;
    const DEGREE: usize = 16;
    const NUM_L: usize = 7;

    fn challenge_0() -> Phase2Challenge<Bls12_381> {
        initial_challenge(dummy_accumulator(SEED, DEGREE, NUM_L))
    }

    #[test]
    fn test_initial_challenge_digest_is_hash_of_cs_hash() {
        let challenge = challenge_0();

        // cs_hash = H(encode(Fr(9))); the initial digest hashes it again.
        let mut writer = DigestWriter::new();
        Fr::from(SEED)
            .serialize_uncompressed(&mut writer)
            .unwrap();
        let cs_hash = writer.finalize();
        assert_eq!(challenge.accumulator.cs_hash, cs_hash);
        assert_eq!(challenge.transcript_digest, Digest::of_bytes(&cs_hash.0));
    }

    #[test]
    fn test_zero_secret_rejected() {
        let challenge = challenge_0();
        assert!(matches!(
            compute_response(&challenge, Fr::from(0u64)),
            Err(Phase2Error::SecretZero)
        ));
    }

    #[test]
    fn test_two_contribution_accumulation() {
        let challenge_0 = challenge_0();

        let secret_1 = Fr::from(SEED - 1);
        let response_1 = compute_response(&challenge_0, secret_1).unwrap();
        verify_response(&challenge_0, &response_1).unwrap();
        let challenge_1 = compute_challenge(response_1);

        let secret_2 = Fr::from(SEED - 2);
        let response_2 = compute_response(&challenge_1, secret_2).unwrap();
        verify_response(&challenge_1, &response_2).unwrap();

        let init = &challenge_0.accumulator;
        let fin = &response_2.new_accumulator;
        let delta = secret_1 * secret_2;
        let delta_inv = delta.inverse().unwrap();

        assert_eq!(
            (G1Projective::generator() * delta).into_affine(),
            fin.delta_g1
        );
        assert_eq!(
            (G2Projective::generator() * delta).into_affine(),
            fin.delta_g2
        );
        assert_eq!(init.h_g1.len(), fin.h_g1.len());
        for (h0, h) in init.h_g1.iter().zip(&fin.h_g1) {
            assert_eq!((*h0 * delta_inv).into_affine(), *h);
        }
        assert_eq!(init.l_g1.len(), fin.l_g1.len());
        for (l0, l) in init.l_g1.iter().zip(&fin.l_g1) {
            assert_eq!((*l0 * delta_inv).into_affine(), *l);
        }
    }

    #[test]
    fn test_valid_response_verifies() {
        let challenge = challenge_0();
        let response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        assert_eq!(
            challenge.transcript_digest,
            response.publickey.transcript_digest
        );
        verify_response(&challenge, &response).unwrap();
    }

    #[test]
    fn test_tampered_transcript_digest_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.publickey.transcript_digest.0[32] ^= 1;
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::DigestMismatch)
        ));
    }

    #[test]
    fn test_tampered_publickey_new_delta_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(8u64)).unwrap();
        response.publickey.new_delta_g1 =
            (G1Projective::generator() * Fr::from(7u64)).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::DeltaInconsistency)
        ));
    }

    #[test]
    fn test_tampered_s_delta_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.publickey.s_delta_j_g1 =
            (response.publickey.s_g1 * Fr::from(SEED - 2)).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::ProofOfKnowledge)
        ));
    }

    #[test]
    fn test_tampered_r_delta_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.publickey.r_delta_j_g2 =
            (G2Projective::generator() * Fr::from(SEED - 2)).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::ProofOfKnowledge)
        ));
    }

    #[test]
    fn test_tampered_accumulator_delta_g1_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.new_accumulator.delta_g1 =
            (G1Projective::generator() * Fr::from(SEED - 2)).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::DeltaInconsistency)
        ));
    }

    #[test]
    fn test_tampered_accumulator_delta_g2_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.new_accumulator.delta_g2 =
            (G2Projective::generator() * Fr::from(SEED - 2)).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::DeltaInconsistency)
        ));
    }

    #[test]
    fn test_tampered_h_query_rejected() {
        let challenge = challenge_0();
        let invalid_inverse = Fr::from(SEED - 2).inverse().unwrap();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        let index = DEGREE / 2;
        response.new_accumulator.h_g1[index] =
            (challenge.accumulator.h_g1[index] * invalid_inverse).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::QueryInconsistency(QueryKind::H))
        ));
    }

    #[test]
    fn test_tampered_l_query_rejected() {
        let challenge = challenge_0();
        let invalid_inverse = Fr::from(SEED - 2).inverse().unwrap();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        let index = NUM_L / 2;
        response.new_accumulator.l_g1[index] =
            (challenge.accumulator.l_g1[index] * invalid_inverse).into_affine();
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::QueryInconsistency(QueryKind::L))
        ));
    }

    #[test]
    fn test_tampered_cs_hash_rejected() {
        let challenge = challenge_0();
        let mut response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        response.new_accumulator.cs_hash.0[0] ^= 1;
        assert!(matches!(
            verify_response(&challenge, &response),
            Err(Phase2Error::CsHashMismatch)
        ));
    }

    #[test]
    fn test_challenge_read_write_round_trip() {
        let challenge = challenge_0();
        let mut bytes = Vec::new();
        challenge.write(&mut bytes).unwrap();
        let restored = Phase2Challenge::<Bls12_381>::read(&bytes[..]).unwrap();
        assert_eq!(challenge.transcript_digest, restored.transcript_digest);
        assert_eq!(challenge.accumulator, restored.accumulator);
        assert_eq!(challenge, restored);
    }

    #[test]
    fn test_response_read_write_round_trip() {
        let challenge = challenge_0();
        let response = compute_response(&challenge, Fr::from(SEED - 1)).unwrap();
        let mut bytes = Vec::new();
        response.write(&mut bytes).unwrap();
        let restored = Phase2Response::<Bls12_381>::read(&bytes[..]).unwrap();
        assert_eq!(response, restored);
    }
}
