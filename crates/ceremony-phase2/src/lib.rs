//! The phase-2 contribution, verification, and transcript protocol of the
//! SRS ceremony.
//!
//! Phase 2 specializes a circuit-independent powers-of-tau output to one
//! circuit. Contributors take turns multiplying a fresh secret into `delta`
//! and dividing it out of the H and L query vectors; each contribution
//! carries a proof of knowledge bound to a rolling transcript digest, so the
//! resulting `delta` is uniformly random as long as a single contributor
//! discarded their secret.
//!
//! The flow is strictly sequential: a [`Phase2Challenge`] wraps the current
//! accumulator, [`compute_response`] applies a secret to it, and
//! [`compute_challenge`] rolls the transcript forward for the next
//! participant. [`verify_response`] certifies one step;
//! [`verify_transcript`] audits a whole ceremony from the public keys alone.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod accumulator;
mod errors;
mod layer1;
mod protocol;
mod publickey;
mod serial;
mod transcript;

pub use accumulator::Phase2Accumulator;
pub use errors::{Phase2Error, QueryKind};
pub use layer1::{compute_linear_combination, Layer1};
pub use protocol::{
    compute_challenge, compute_response, initial_challenge, verify_response, Phase2Challenge,
    Phase2Response,
};
pub use publickey::{compute_public_key, verify_publickey, Phase2PublicKey};
pub use transcript::{verify_transcript, TranscriptSummary};
