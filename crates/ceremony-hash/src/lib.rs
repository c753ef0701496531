//! Transcript hashing for the SRS ceremony.
//!
//! The whole ceremony is bound together by a single 64-byte BLAKE2b digest:
//! it pins the constraint system, chains contributions into a transcript, and
//! anchors each proof-of-knowledge. This crate provides the digest type, an
//! `io::Write` adapter so any canonically-serializable value can be absorbed
//! into a running hash, and the deterministic digest-to-scalar and
//! digest-to-G2 maps.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use ark_ec::pairing::Pairing;
use ark_ff::PrimeField;
use ark_std::{fmt, io, UniformRand};
use blake2::{Blake2b512, Digest as Blake2Digest};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Width of the transcript digest in bytes.
pub const DIGEST_LENGTH: usize = 64;

/// A 64-byte transcript digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; DIGEST_LENGTH]);

impl Digest {
    /// Hashes a byte string into a digest.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Blake2b512::new();
        hasher.update(bytes);
        let mut out = [0u8; DIGEST_LENGTH];
        out.copy_from_slice(&hasher.finalize());
        Digest(out)
    }

    /// Lower-case hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parses a 128-character hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 2 * DIGEST_LENGTH {
            return None;
        }
        let mut out = [0u8; DIGEST_LENGTH];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).ok()?;
        }
        Some(Digest(out))
    }

    /// Writes the raw digest bytes.
    pub fn write<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.0)
    }

    /// Reads a raw 64-byte digest.
    pub fn read<R: io::Read>(mut reader: R) -> io::Result<Self> {
        let mut out = [0u8; DIGEST_LENGTH];
        reader.read_exact(&mut out)?;
        Ok(Digest(out))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A running BLAKE2b hash exposed as an `io::Write` sink, so group elements
/// and aggregates can be absorbed through their canonical serialization.
#[derive(Clone, Default)]
pub struct DigestWriter {
    hasher: Blake2b512,
}

impl DigestWriter {
    /// Starts a fresh hash.
    pub fn new() -> Self {
        Self {
            hasher: Blake2b512::new(),
        }
    }

    /// Finishes the hash and returns the digest.
    pub fn finalize(self) -> Digest {
        let mut out = [0u8; DIGEST_LENGTH];
        out.copy_from_slice(&self.hasher.finalize());
        Digest(out)
    }
}

impl io::Write for DigestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Maps a digest to a scalar by little-endian reduction modulo the field
/// order.
pub fn hash_to_fr<F: PrimeField>(digest: &Digest) -> F {
    F::from_le_bytes_mod_order(&digest.0)
}

/// Maps a digest to a G2 group element.
///
/// The digest seeds a ChaCha20 stream which drives uniform rejection
/// sampling in G2. The map is deterministic: equal digests give equal
/// points on every invocation, on every platform.
pub fn hash_to_g2<P: Pairing>(digest: &Digest) -> P::G2 {
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest.0[..32]);
    let mut rng = ChaCha20Rng::from_seed(seed);
    P::G2::rand(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Bls12_381, Fr};

    #[test]
    fn test_hex_round_trip() {
        let digest = Digest::of_bytes(b"phase2");
        let parsed = Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);

        assert!(Digest::from_hex("abcd").is_none());
        assert!(Digest::from_hex(&"zz".repeat(DIGEST_LENGTH)).is_none());
    }

    #[test]
    fn test_digest_writer_matches_of_bytes() {
        use ark_std::io::Write;

        let mut writer = DigestWriter::new();
        writer.write_all(b"trans").unwrap();
        writer.write_all(b"cript").unwrap();
        assert_eq!(writer.finalize(), Digest::of_bytes(b"transcript"));
    }

    #[test]
    fn test_hash_to_g2_is_stable() {
        // Independently constructed digests at different memory locations
        // must map to the same point.
        let a = Digest::of_bytes(&[]);
        let b = Digest::of_bytes(&[]);
        assert_eq!(
            hash_to_g2::<Bls12_381>(&a),
            hash_to_g2::<Bls12_381>(&b)
        );
    }

    #[test]
    fn test_hash_to_g2_separates_digests() {
        let a = Digest::of_bytes(b"a");
        let b = Digest::of_bytes(b"b");
        assert_ne!(
            hash_to_g2::<Bls12_381>(&a),
            hash_to_g2::<Bls12_381>(&b)
        );
    }

    #[test]
    fn test_hash_to_fr_is_deterministic() {
        let digest = Digest::of_bytes(b"scalar");
        let x: Fr = hash_to_fr(&digest);
        let y: Fr = hash_to_fr(&digest);
        assert_eq!(x, y);
    }
}
