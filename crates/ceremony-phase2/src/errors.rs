//! Error taxonomy for the phase-2 protocol.

use ark_std::fmt;
use thiserror::Error;

/// Which accumulator query failed a rescaling check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// The `t(tau) * tau^i / delta` query
    H,
    /// The `(beta*A_j + alpha*B_j + C_j) / delta` query
    L,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::H => f.write_str("H"),
            QueryKind::L => f.write_str("L"),
        }
    }
}

/// Everything that can go wrong while reading, producing, or verifying
/// phase-2 messages. Verification failures are kept distinct per invariant
/// so a transcript audit can report exactly what broke.
#[derive(Debug, Error)]
pub enum Phase2Error {
    /// Truncated stream or bad framing
    #[error("malformed input: {0}")]
    Io(#[from] ark_std::io::Error),
    /// A group element failed curve or prime-order-subgroup validation
    #[error("invalid group element: {0}")]
    InvalidPoint(#[from] ark_serialize::SerializationError),
    /// Ceremony inputs do not fit together (sizes, domains)
    #[error("inconsistent ceremony inputs: {0}")]
    InputMismatch(&'static str),
    /// The public key answers a different challenge than expected
    #[error("transcript digest does not match the running digest")]
    DigestMismatch,
    /// A `same_ratio` proof-of-knowledge equation failed
    #[error("proof of knowledge is invalid")]
    ProofOfKnowledge,
    /// `new_delta_g1` disagrees between public key and accumulator, or the
    /// G1/G2 images of delta diverge
    #[error("delta is inconsistent")]
    DeltaInconsistency,
    /// The H or L query was not rescaled by exactly `delta^-1`
    #[error("{0} query does not match the delta rescaling")]
    QueryInconsistency(QueryKind),
    /// The pinned constraint-system hash changed
    #[error("constraint system hash changed")]
    CsHashMismatch,
    /// The transcript stream carried no contributions
    #[error("transcript contains no contributions")]
    TranscriptEmpty,
    /// A contribution secret of zero was supplied
    #[error("contribution secret must be non-zero")]
    SecretZero,
}
