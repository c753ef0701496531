//! The mutable phase-2 ceremony state.

use crate::serial::{read_points, write_points};
use crate::{Layer1, Phase2Error};
use ark_ec::{pairing::Pairing, AffineRepr};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_hash::Digest;

/// The phase-2 accumulator: the evolving `delta` in both groups, the two
/// query vectors rescaled by `delta^-1`, and the pinned constraint-system
/// hash.
///
/// After `k` contributions with secrets `d_1..d_k` (writing
/// `delta = d_1 * ... * d_k`), `delta_g1 = delta * G1`,
/// `h_g1[i] = t(tau) * tau^i * delta^-1 * G1`, and
/// `l_g1[j] = (beta*A_j + alpha*B_j + C_j)(tau) * delta^-1 * G1` for the
/// non-input variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase2Accumulator<P: Pairing> {
    /// Digest of the canonical constraint-system encoding, fixed at
    /// initialization
    pub cs_hash: Digest,
    /// `delta * G1`
    pub delta_g1: P::G1Affine,
    /// `delta * G2`
    pub delta_g2: P::G2Affine,
    /// The H query
    pub h_g1: Vec<P::G1Affine>,
    /// The L query
    pub l_g1: Vec<P::G1Affine>,
}

impl<P: Pairing> Phase2Accumulator<P> {
    /// The deterministic initial accumulator: `delta = 1`, `h_g1` taken
    /// straight from the `t(tau) * tau^i` row and `l_g1` from the non-input
    /// tail of `abc_g1`.
    pub fn initial(cs_hash: Digest, layer1: &Layer1<P>, num_inputs: usize) -> Self {
        Self {
            cs_hash,
            delta_g1: P::G1Affine::generator(),
            delta_g2: P::G2Affine::generator(),
            h_g1: layer1.t_tau_powers_g1.clone(),
            l_g1: layer1.abc_g1[num_inputs + 1..].to_vec(),
        }
    }

    fn write_with_mode<W: Write>(&self, mut writer: W, compress: Compress) -> Result<(), Phase2Error> {
        self.cs_hash.write(&mut writer)?;
        self.delta_g1.serialize_with_mode(&mut writer, compress)?;
        self.delta_g2.serialize_with_mode(&mut writer, compress)?;
        write_points(&mut writer, &self.h_g1, compress)?;
        write_points(&mut writer, &self.l_g1, compress)
    }

    fn read_with_mode<R: Read>(mut reader: R, compress: Compress) -> Result<Self, Phase2Error> {
        let cs_hash = Digest::read(&mut reader)?;
        let delta_g1 =
            P::G1Affine::deserialize_with_mode(&mut reader, compress, Validate::Yes)?;
        let delta_g2 =
            P::G2Affine::deserialize_with_mode(&mut reader, compress, Validate::Yes)?;
        let h_g1 = read_points(&mut reader, compress)?;
        let l_g1 = read_points(&mut reader, compress)?;
        Ok(Self {
            cs_hash,
            delta_g1,
            delta_g2,
            h_g1,
            l_g1,
        })
    }

    /// Write the uncompressed byte encoding.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), Phase2Error> {
        self.write_with_mode(writer, Compress::No)
    }

    /// Read the uncompressed byte encoding, validating every point.
    pub fn read<R: Read>(reader: R) -> Result<Self, Phase2Error> {
        Self::read_with_mode(reader, Compress::No)
    }

    /// Write the compressed byte encoding.
    pub fn write_compressed<W: Write>(&self, writer: W) -> Result<(), Phase2Error> {
        self.write_with_mode(writer, Compress::Yes)
    }

    /// Read the compressed byte encoding, validating every point.
    pub fn read_compressed<R: Read>(reader: R) -> Result<Self, Phase2Error> {
        Self::read_with_mode(reader, Compress::Yes)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::dummy_accumulator;
    use crate::Phase2Accumulator;
    use ark_bls12_381::Bls12_381;

    #[test]
    fn test_uncompressed_round_trip() {
        let accumulator = dummy_accumulator(9, 16, 7);
        let mut bytes = Vec::new();
        accumulator.write(&mut bytes).unwrap();
        let restored = Phase2Accumulator::<Bls12_381>::read(&bytes[..]).unwrap();
        assert_eq!(accumulator, restored);
    }

    #[test]
    fn test_compressed_round_trip_and_size() {
        let accumulator = dummy_accumulator(9, 16, 7);

        let mut uncompressed = Vec::new();
        accumulator.write(&mut uncompressed).unwrap();
        let mut compressed = Vec::new();
        accumulator.write_compressed(&mut compressed).unwrap();

        let restored = Phase2Accumulator::<Bls12_381>::read_compressed(&compressed[..]).unwrap();
        assert_eq!(accumulator, restored);
        assert!(compressed.len() < uncompressed.len());
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let accumulator = dummy_accumulator(9, 16, 7);
        let mut bytes = Vec::new();
        accumulator.write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(Phase2Accumulator::<Bls12_381>::read(&bytes[..]).is_err());
    }
}
