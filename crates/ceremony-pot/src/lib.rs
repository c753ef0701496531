//! Phase-1 powers-of-tau input for the SRS ceremony.
//!
//! The output of an upstream powers-of-tau ceremony is consumed read-only:
//! monomial-basis powers of `tau` in both groups, plus the `alpha`- and
//! `beta`-rotated G1 rows. The Lagrange evaluator converts the monomial
//! basis to evaluations over the size-`n` FFT subgroup by an inverse FFT in
//! the exponent, which is what the linear-combination layer consumes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, Group};
use ark_ff::One;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};
use ceremony_curve::{batch_into_affine, combine_ratio_pairs, same_ratio};
use rand::Rng;
use tracing::debug;

/// Errors raised while loading or using a powers-of-tau file.
#[derive(Debug, thiserror::Error)]
pub enum PotError {
    /// Truncated stream or bad framing
    #[error("malformed input: {0}")]
    Io(#[from] ark_std::io::Error),
    /// A group element failed curve or subgroup validation
    #[error("invalid group element: {0}")]
    InvalidPoint(#[from] ark_serialize::SerializationError),
    /// The requested degree is not a power of two
    #[error("degree {0} is not a power of two")]
    DegreeNotPowerOfTwo(usize),
    /// The file does not carry enough powers for the requested degree
    #[error("insufficient tau powers: need {needed}, have {available}")]
    InsufficientPowers {
        /// Powers required for the requested degree
        needed: usize,
        /// Powers present in the input
        available: usize,
    },
    /// The pairing-based geometric-sequence check failed
    #[error("tau powers are not a consistent geometric sequence")]
    InconsistentRatios,
}

/// The phase-1 output, sufficient for a degree-`n` circuit: `2n-1` G1 powers
/// of tau, `n+1` G2 powers, and `n` alpha- and beta-rotated G1 powers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowersOfTau<P: Pairing> {
    /// `tau^i * G1` for `i < 2n-1`
    pub tau_powers_g1: Vec<P::G1Affine>,
    /// `tau^i * G2` for `i <= n`
    pub tau_powers_g2: Vec<P::G2Affine>,
    /// `alpha * tau^i * G1` for `i < n`
    pub alpha_tau_powers_g1: Vec<P::G1Affine>,
    /// `beta * tau^i * G1` for `i < n`
    pub beta_tau_powers_g1: Vec<P::G1Affine>,
    /// `beta * G2`
    pub beta_g2: P::G2Affine,
}

/// Evaluations of the degree-`n` Lagrange polynomials (and the vanishing
/// polynomial) at `tau`, in the exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagrangeEvaluations<P: Pairing> {
    /// Domain size `n`
    pub domain_size: usize,
    /// `L_i(tau) * G1`
    pub lagrange_g1: Vec<P::G1Affine>,
    /// `L_i(tau) * G2`
    pub lagrange_g2: Vec<P::G2Affine>,
    /// `alpha * L_i(tau) * G1`
    pub alpha_lagrange_g1: Vec<P::G1Affine>,
    /// `beta * L_i(tau) * G1`
    pub beta_lagrange_g1: Vec<P::G1Affine>,
    /// `z(tau) * G1` where `z(x) = x^n - 1`
    pub z_g1: P::G1Affine,
    /// `z(tau) * G2`
    pub z_g2: P::G2Affine,
}

impl<P: Pairing> PowersOfTau<P> {
    /// Deterministically build the powers from known secrets. This stands in
    /// for a real phase-1 transcript in tests and development tooling; a
    /// production ceremony never sees the secrets.
    pub fn from_secrets(
        tau: P::ScalarField,
        alpha: P::ScalarField,
        beta: P::ScalarField,
        n: usize,
    ) -> Self {
        let g1 = P::G1::generator();
        let g2 = P::G2::generator();

        let mut tau_powers = Vec::with_capacity(2 * n - 1);
        let mut power = P::ScalarField::one();
        for _ in 0..(2 * n - 1) {
            tau_powers.push(power);
            power *= tau;
        }

        let tau_powers_g1: Vec<P::G1> = tau_powers.iter().map(|t| g1 * *t).collect();
        let tau_powers_g2: Vec<P::G2> = tau_powers[..=n].iter().map(|t| g2 * *t).collect();
        let alpha_tau_powers_g1: Vec<P::G1> =
            tau_powers[..n].iter().map(|t| g1 * (alpha * *t)).collect();
        let beta_tau_powers_g1: Vec<P::G1> =
            tau_powers[..n].iter().map(|t| g1 * (beta * *t)).collect();

        Self {
            tau_powers_g1: batch_into_affine(&tau_powers_g1),
            tau_powers_g2: batch_into_affine(&tau_powers_g2),
            alpha_tau_powers_g1: batch_into_affine(&alpha_tau_powers_g1),
            beta_tau_powers_g1: batch_into_affine(&beta_tau_powers_g1),
            beta_g2: (g2 * beta).into_affine(),
        }
    }

    /// The degree this file supports: `(|tau_g1| + 1) / 2`.
    pub fn degree(&self) -> usize {
        (self.tau_powers_g1.len() + 1) / 2
    }

    /// Check the structural invariants without knowledge of the secrets:
    /// the zeroth powers are the generators, and successive powers share the
    /// ratio `tau` (compressed into one pairing equation per row via a
    /// random linear combination).
    pub fn validate<R: Rng>(&self, rng: &mut R) -> Result<(), PotError> {
        use ark_ff::UniformRand;

        if self.tau_powers_g1.first() != Some(&P::G1Affine::generator())
            || self.tau_powers_g2.first() != Some(&P::G2Affine::generator())
        {
            return Err(PotError::InconsistentRatios);
        }
        if self.tau_powers_g2.len() < 2 {
            return Err(PotError::InsufficientPowers {
                needed: 2,
                available: self.tau_powers_g2.len(),
            });
        }

        let g2 = P::G2Affine::generator();
        let tau_g2 = self.tau_powers_g2[1];
        for row in [
            &self.tau_powers_g1,
            &self.alpha_tau_powers_g1,
            &self.beta_tau_powers_g1,
        ] {
            if row.len() < 2 {
                continue;
            }
            let coefficients: Vec<P::ScalarField> = (0..row.len() - 1)
                .map(|_| P::ScalarField::rand(rng))
                .collect();
            let (lhs, rhs) =
                combine_ratio_pairs::<P>(&row[..row.len() - 1], &row[1..], &coefficients);
            if !same_ratio::<P>(lhs, rhs, g2, tau_g2) {
                return Err(PotError::InconsistentRatios);
            }
        }

        // G2 row checked against the G1 ratio.
        for window in self.tau_powers_g2.windows(2) {
            if !same_ratio::<P>(
                self.tau_powers_g1[0],
                self.tau_powers_g1[1],
                window[0],
                window[1],
            ) {
                return Err(PotError::InconsistentRatios);
            }
        }
        Ok(())
    }

    /// Write the uncompressed byte encoding.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), PotError> {
        let n = self.degree();
        writer.write_all(&(n as u64).to_le_bytes())?;
        for point in &self.tau_powers_g1 {
            point.serialize_uncompressed(&mut writer)?;
        }
        for point in &self.tau_powers_g2 {
            point.serialize_uncompressed(&mut writer)?;
        }
        for point in &self.alpha_tau_powers_g1 {
            point.serialize_uncompressed(&mut writer)?;
        }
        for point in &self.beta_tau_powers_g1 {
            point.serialize_uncompressed(&mut writer)?;
        }
        self.beta_g2.serialize_uncompressed(&mut writer)?;
        Ok(())
    }

    /// Read the uncompressed byte encoding, validating every point.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, PotError> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        let n = u64::from_le_bytes(buf) as usize;
        if n == 0 || !n.is_power_of_two() {
            return Err(PotError::DegreeNotPowerOfTwo(n));
        }

        let read_g1_row = |reader: &mut R, len: usize| -> Result<Vec<P::G1Affine>, PotError> {
            (0..len)
                .map(|_| {
                    Ok(P::G1Affine::deserialize_with_mode(
                        &mut *reader,
                        Compress::No,
                        Validate::Yes,
                    )?)
                })
                .collect()
        };

        let tau_powers_g1 = read_g1_row(&mut reader, 2 * n - 1)?;
        let tau_powers_g2 = (0..=n)
            .map(|_| {
                Ok(P::G2Affine::deserialize_with_mode(
                    &mut reader,
                    Compress::No,
                    Validate::Yes,
                )?)
            })
            .collect::<Result<Vec<_>, PotError>>()?;
        let alpha_tau_powers_g1 = read_g1_row(&mut reader, n)?;
        let beta_tau_powers_g1 = read_g1_row(&mut reader, n)?;
        let beta_g2 =
            P::G2Affine::deserialize_with_mode(&mut reader, Compress::No, Validate::Yes)?;

        Ok(Self {
            tau_powers_g1,
            tau_powers_g2,
            alpha_tau_powers_g1,
            beta_tau_powers_g1,
            beta_g2,
        })
    }
}

/// Convert the monomial-basis powers into Lagrange evaluations over the
/// size-`n` subgroup by an inverse FFT in the exponent.
pub fn lagrange_evaluations<P: Pairing>(
    pot: &PowersOfTau<P>,
    n: usize,
) -> Result<LagrangeEvaluations<P>, PotError> {
    if n == 0 || !n.is_power_of_two() {
        return Err(PotError::DegreeNotPowerOfTwo(n));
    }
    if pot.tau_powers_g1.len() < 2 * n - 1 {
        return Err(PotError::InsufficientPowers {
            needed: 2 * n - 1,
            available: pot.tau_powers_g1.len(),
        });
    }
    if pot.tau_powers_g2.len() < n + 1 {
        return Err(PotError::InsufficientPowers {
            needed: n + 1,
            available: pot.tau_powers_g2.len(),
        });
    }
    if pot.alpha_tau_powers_g1.len() < n || pot.beta_tau_powers_g1.len() < n {
        return Err(PotError::InsufficientPowers {
            needed: n,
            available: pot.alpha_tau_powers_g1.len().min(pot.beta_tau_powers_g1.len()),
        });
    }

    let domain = Radix2EvaluationDomain::<P::ScalarField>::new(n)
        .ok_or(PotError::DegreeNotPowerOfTwo(n))?;
    debug!(degree = n, "computing Lagrange evaluations in the exponent");

    let ifft_g1 = |points: &[P::G1Affine]| -> Vec<P::G1Affine> {
        let projective: Vec<P::G1> = points[..n].iter().map(|p| p.into_group()).collect();
        batch_into_affine(&domain.ifft(&projective))
    };

    let lagrange_g1 = ifft_g1(&pot.tau_powers_g1);
    let alpha_lagrange_g1 = ifft_g1(&pot.alpha_tau_powers_g1);
    let beta_lagrange_g1 = ifft_g1(&pot.beta_tau_powers_g1);
    let lagrange_g2 = {
        let projective: Vec<P::G2> =
            pot.tau_powers_g2[..n].iter().map(|p| p.into_group()).collect();
        batch_into_affine(&domain.ifft(&projective))
    };

    // z(tau) * G = tau^n * G - G.
    let z_g1 = (pot.tau_powers_g1[n].into_group() - P::G1::generator()).into_affine();
    let z_g2 = (pot.tau_powers_g2[n].into_group() - P::G2::generator()).into_affine();

    Ok(LagrangeEvaluations {
        domain_size: n,
        lagrange_g1,
        lagrange_g2,
        alpha_lagrange_g1,
        beta_lagrange_g1,
        z_g1,
        z_g2,
    })
}
