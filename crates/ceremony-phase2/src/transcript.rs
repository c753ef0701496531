//! End-to-end transcript verification.
//!
//! A transcript file is the concatenation of the contribution public keys in
//! order. Verifying it needs no accumulator vectors at all: each public key
//! is checked against the running digest and the running `delta_g1`, which
//! are then advanced. The coordinator certifies the final accumulator
//! separately with a one-shot [`verify_response`](crate::verify_response).

use crate::publickey::verify_publickey;
use crate::{Phase2Error, Phase2PublicKey};
use ark_ec::pairing::Pairing;
use ark_ec::AffineRepr;
use ark_std::io::Read;
use ceremony_hash::{Digest, DigestWriter, DIGEST_LENGTH};
use tracing::info;

/// Outcome of a successful transcript verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSummary<P: Pairing> {
    /// `delta_g1` after the last contribution
    pub final_delta_g1: P::G1Affine,
    /// Rolling digest after the last contribution
    pub final_digest: Digest,
    /// Whether the searched-for contribution digest appeared
    pub contribution_found: bool,
}

/// Reads a digest, distinguishing a clean end of stream (no bytes at all)
/// from a truncated one.
fn read_digest_or_eof<R: Read>(reader: &mut R) -> Result<Option<Digest>, Phase2Error> {
    let mut buf = [0u8; DIGEST_LENGTH];
    let mut filled = 0;
    while filled < DIGEST_LENGTH {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated public key",
            )
            .into());
        }
        filled += n;
    }
    Ok(Some(Digest(buf)))
}

/// Verify a whole transcript stream.
///
/// Starting from `initial_digest` and `initial_delta_g1` (the generator for
/// a fresh ceremony), public keys are read until end of stream. Each must
/// answer the running digest and carry a valid proof of knowledge against
/// the running delta. If `check_contribution` is given, the summary reports
/// whether any public key hashed to it. An empty stream is an error.
pub fn verify_transcript<P: Pairing, R: Read>(
    initial_digest: Digest,
    initial_delta_g1: P::G1Affine,
    mut reader: R,
    check_contribution: Option<&Digest>,
) -> Result<TranscriptSummary<P>, Phase2Error> {
    let mut running_digest = initial_digest;
    let mut running_delta_g1 = initial_delta_g1;
    let mut contribution_found = false;
    let mut contributions = 0usize;

    while let Some(digest) = read_digest_or_eof(&mut reader)? {
        let publickey = Phase2PublicKey::<P>::read_after_digest(&mut reader, digest)?;

        if publickey.transcript_digest != running_digest {
            return Err(Phase2Error::DigestMismatch);
        }
        verify_publickey(running_delta_g1, &publickey)?;

        if let Some(target) = check_contribution {
            if publickey.digest() == *target {
                contribution_found = true;
            }
        }

        let mut writer = DigestWriter::new();
        running_digest
            .write(&mut writer)
            .expect("hashing is not allowed to fail");
        publickey
            .write(&mut writer)
            .expect("hashing is not allowed to fail");
        running_digest = writer.finalize();
        running_delta_g1 = publickey.new_delta_g1;
        contributions += 1;
    }

    if contributions == 0 {
        return Err(Phase2Error::TranscriptEmpty);
    }
    info!(contributions, "transcript verified");

    Ok(TranscriptSummary {
        final_delta_g1: running_delta_g1,
        final_digest: running_digest,
        contribution_found,
    })
}
