//! JSON export of the verification key, for consumption by contract
//! tooling and external verifiers.
//!
//! Coordinates are big-endian hex strings; G2 coordinates are two-element
//! arrays `[c0, c1]` over the base field. The export is pinned to BLS12-381
//! since the coordinate layout is curve-specific.

use crate::VerificationKey;
use ark_bls12_381::{Bls12_381, Fq, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use serde_json::{json, Value};

fn fq_hex(value: &Fq) -> String {
    let bytes = value.into_bigint().to_bytes_be();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{hex}")
}

fn g1_json(point: &G1Affine) -> Value {
    json!({
        "x": fq_hex(&point.x),
        "y": fq_hex(&point.y),
    })
}

fn g2_json(point: &G2Affine) -> Value {
    json!({
        "x": [fq_hex(&point.x.c0), fq_hex(&point.x.c1)],
        "y": [fq_hex(&point.y.c0), fq_hex(&point.y.c1)],
    })
}

/// Render the verification key as a JSON object with fields `alpha`,
/// `beta`, `delta`, and `ABC`.
pub fn verification_key_json(vk: &VerificationKey<Bls12_381>) -> Value {
    json!({
        "alpha": g1_json(&vk.alpha_g1),
        "beta": g2_json(&vk.beta_g2),
        "delta": g2_json(&vk.delta_g2),
        "ABC": vk.abc_g1.iter().map(g1_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair_from_secrets;
    use ark_bls12_381::Fr;
    use ceremony_r1cs::simple_circuit;

    #[test]
    fn test_json_shape() {
        let keypair = keypair_from_secrets::<Bls12_381>(
            simple_circuit::<Fr>(),
            Fr::from(3u64),
            Fr::from(5u64),
            Fr::from(7u64),
            Fr::from(11u64),
        )
        .unwrap();

        let value = verification_key_json(&keypair.vk);
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);

        let alpha = &object["alpha"];
        assert!(alpha["x"].as_str().unwrap().starts_with("0x"));
        assert_eq!(object["beta"]["x"].as_array().unwrap().len(), 2);
        assert_eq!(
            object["ABC"].as_array().unwrap().len(),
            keypair.vk.abc_g1.len()
        );

        // The export must parse back as JSON when rendered.
        let rendered = serde_json::to_string_pretty(&value).unwrap();
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, reparsed);
    }
}
