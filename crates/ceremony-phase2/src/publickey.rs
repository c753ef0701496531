//! The contribution public key: a Schnorr-style proof of knowledge of the
//! contributor's secret, bound to the running transcript.
//!
//! The binding works in two steps. The contributor commits to the pair
//! `(s_g1, s * delta_j)` and derives a G2 point `r_g2` by hashing the
//! transcript digest together with that commitment; publishing
//! `delta_j * r_g2` then proves knowledge of `delta_j` via two `same_ratio`
//! pairing checks. Because `r_g2` depends on the digest, a public key cannot
//! be replayed against any other point of the transcript.

use crate::Phase2Error;
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::io::{Read, Write};
use ceremony_curve::same_ratio;
use ceremony_hash::{hash_to_g2, Digest, DigestWriter};

/// Proof of knowledge of a single contribution's secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase2PublicKey<P: Pairing> {
    /// Digest of the challenge this contribution answers
    pub transcript_digest: Digest,
    /// `delta_j * previous_delta * G1`
    pub new_delta_g1: P::G1Affine,
    /// The commitment base chosen by the contributor
    pub s_g1: P::G1Affine,
    /// `delta_j * s_g1`
    pub s_delta_j_g1: P::G1Affine,
    /// `delta_j * r_g2`, where `r_g2` binds digest and commitment
    pub r_delta_j_g2: P::G2Affine,
}

/// Recompute the PoK base point `r_g2` from the transcript digest and the
/// contributor's commitment pair.
fn pok_base<P: Pairing>(
    transcript_digest: &Digest,
    s_g1: &P::G1Affine,
    s_delta_j_g1: &P::G1Affine,
) -> P::G2 {
    let mut writer = DigestWriter::new();
    transcript_digest
        .write(&mut writer)
        .expect("hashing is not allowed to fail");
    s_g1.serialize_uncompressed(&mut writer)
        .expect("hashing is not allowed to fail");
    s_delta_j_g1
        .serialize_uncompressed(&mut writer)
        .expect("hashing is not allowed to fail");
    hash_to_g2::<P>(&writer.finalize())
}

/// Build the public key for a contribution with secret `delta_j` on top of
/// `old_delta_g1`. The caller must have rejected a zero secret already.
pub fn compute_public_key<P: Pairing>(
    transcript_digest: &Digest,
    old_delta_g1: P::G1Affine,
    delta_j: P::ScalarField,
) -> Phase2PublicKey<P> {
    let s_g1 = P::G1Affine::generator();
    let s_delta_j_g1 = (s_g1 * delta_j).into_affine();
    let r_g2 = pok_base::<P>(transcript_digest, &s_g1, &s_delta_j_g1);
    Phase2PublicKey {
        transcript_digest: *transcript_digest,
        new_delta_g1: (old_delta_g1 * delta_j).into_affine(),
        s_g1,
        s_delta_j_g1,
        r_delta_j_g2: (r_g2 * delta_j).into_affine(),
    }
}

/// Check the two proof-of-knowledge equations against `old_delta_g1`.
pub fn verify_publickey<P: Pairing>(
    old_delta_g1: P::G1Affine,
    publickey: &Phase2PublicKey<P>,
) -> Result<(), Phase2Error> {
    let r_g2 = pok_base::<P>(
        &publickey.transcript_digest,
        &publickey.s_g1,
        &publickey.s_delta_j_g1,
    )
    .into_affine();

    // Knowledge of delta_j such that s_delta = delta_j * s ...
    if !same_ratio::<P>(
        publickey.s_g1,
        publickey.s_delta_j_g1,
        r_g2,
        publickey.r_delta_j_g2,
    ) {
        return Err(Phase2Error::ProofOfKnowledge);
    }
    // ... and that the same delta_j carries old_delta to new_delta.
    if !same_ratio::<P>(
        old_delta_g1,
        publickey.new_delta_g1,
        r_g2,
        publickey.r_delta_j_g2,
    ) {
        return Err(Phase2Error::ProofOfKnowledge);
    }
    Ok(())
}

impl<P: Pairing> Phase2PublicKey<P> {
    /// Write the canonical byte encoding: digest, `s`, `s * delta_j`,
    /// `r * delta_j`, `new_delta`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), Phase2Error> {
        self.transcript_digest.write(&mut writer)?;
        self.s_g1.serialize_uncompressed(&mut writer)?;
        self.s_delta_j_g1.serialize_uncompressed(&mut writer)?;
        self.r_delta_j_g2.serialize_uncompressed(&mut writer)?;
        self.new_delta_g1.serialize_uncompressed(&mut writer)?;
        Ok(())
    }

    /// Read the canonical byte encoding, validating every point.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Phase2Error> {
        let transcript_digest = Digest::read(&mut reader)?;
        Self::read_after_digest(reader, transcript_digest)
    }

    pub(crate) fn read_after_digest<R: Read>(
        mut reader: R,
        transcript_digest: Digest,
    ) -> Result<Self, Phase2Error> {
        let s_g1 = P::G1Affine::deserialize_with_mode(&mut reader, Compress::No, Validate::Yes)?;
        let s_delta_j_g1 =
            P::G1Affine::deserialize_with_mode(&mut reader, Compress::No, Validate::Yes)?;
        let r_delta_j_g2 =
            P::G2Affine::deserialize_with_mode(&mut reader, Compress::No, Validate::Yes)?;
        let new_delta_g1 =
            P::G1Affine::deserialize_with_mode(&mut reader, Compress::No, Validate::Yes)?;
        Ok(Self {
            transcript_digest,
            new_delta_g1,
            s_g1,
            s_delta_j_g1,
            r_delta_j_g2,
        })
    }

    /// Digest of the canonical encoding, used to look a specific
    /// contribution up in a transcript.
    pub fn digest(&self) -> Digest {
        let mut writer = DigestWriter::new();
        self.write(&mut writer)
            .expect("hashing is not allowed to fail");
        writer.finalize()
    }
}
