//! Command implementations for the ceremony binary.
//!
//! Every command reads its inputs fully, performs all verification, and only
//! then writes outputs, via a temp-file-and-rename so an interrupted run
//! never clobbers an existing file.

#![forbid(unsafe_code)]

use anyhow::{anyhow, bail, Context, Result};
use ark_bls12_381::{Bls12_381, Fr, G1Affine};
use ark_ec::AffineRepr;
use ceremony_hash::{hash_to_fr, Digest, DigestWriter};
use ceremony_phase2::{
    compute_linear_combination, compute_response, initial_challenge, verify_response,
    verify_transcript, Layer1, Phase2Accumulator, Phase2Challenge, Phase2Error, Phase2Response,
};
use ceremony_pot::{lagrange_evaluations, PowersOfTau};
use ceremony_r1cs::{ConstraintSystem, Qap};
use ceremony_srs::{json::verification_key_json, materialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// A cryptographic check failed; the binary exits with status 2 so scripts
/// can tell a bad contribution from an operational error.
#[derive(Debug, thiserror::Error)]
#[error("verification failed: {0}")]
pub struct VerificationFailure(#[from] pub Phase2Error);

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path).with_context(|| {
        format!("opening {}", path.display())
    })?))
}

fn write_atomic(
    path: &Path,
    write_fn: impl FnOnce(&mut BufWriter<File>) -> Result<()>,
) -> Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let file = File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        write_fn(&mut writer)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

fn load_constraint_system(path: &Path) -> Result<ConstraintSystem<Fr>> {
    let mut cs = ConstraintSystem::<Fr>::read(open(path)?)
        .with_context(|| format!("reading constraint system from {}", path.display()))?;
    cs.swap_ab_if_beneficial();
    Ok(cs)
}

fn compute_layer1(
    pot: &PowersOfTau<Bls12_381>,
    cs: &ConstraintSystem<Fr>,
) -> Result<(Qap<Fr>, Layer1<Bls12_381>)> {
    let qap = Qap::from_constraint_system(cs)?;
    let lagrange = lagrange_evaluations(pot, qap.degree())?;
    let layer1 = compute_linear_combination(pot, &lagrange, &qap)?;
    Ok((qap, layer1))
}

/// `phase2-begin`: derive the deterministic initial challenge from the
/// phase-1 output and the compiled circuit.
pub fn begin(pot_path: &Path, r1cs_path: &Path, out_challenge: &Path) -> Result<()> {
    let pot = PowersOfTau::<Bls12_381>::read(open(pot_path)?)
        .with_context(|| format!("reading powers of tau from {}", pot_path.display()))?;
    pot.validate(&mut rand::thread_rng())
        .context("validating powers of tau")?;
    let cs = load_constraint_system(r1cs_path)?;
    let cs_hash = cs.digest();
    info!(%cs_hash, "constraint system pinned");

    let (_, layer1) = compute_layer1(&pot, &cs)?;
    let challenge = initial_challenge(Phase2Accumulator::initial(
        cs_hash,
        &layer1,
        cs.num_inputs,
    ));

    write_atomic(out_challenge, |writer| {
        challenge.write(writer).map_err(Into::into)
    })?;
    println!("initial challenge digest: {}", challenge.transcript_digest);
    Ok(())
}

/// `phase2-contribute`: apply fresh randomness to a challenge and write the
/// response. The secret never leaves the process.
pub fn contribute(
    challenge_path: &Path,
    response_path: &Path,
    entropy: Option<&Path>,
) -> Result<()> {
    let challenge = Phase2Challenge::<Bls12_381>::read(open(challenge_path)?)
        .with_context(|| format!("reading challenge from {}", challenge_path.display()))?;

    let secret = sample_secret(entropy)?;
    let response = compute_response(&challenge, secret).map_err(VerificationFailure)?;

    // Self-check before anything touches disk.
    verify_response(&challenge, &response).map_err(VerificationFailure)?;

    write_atomic(response_path, |writer| {
        response.write(writer).map_err(Into::into)
    })?;
    println!("contribution digest: {}", response.publickey.digest());
    Ok(())
}

/// Derive a contribution secret from OS randomness, optionally mixed with
/// the bytes of an entropy file. The file can only add entropy, never
/// replace the OS source.
fn sample_secret(entropy: Option<&Path>) -> Result<Fr> {
    use rand::RngCore;

    let mut seed = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    let mut writer = DigestWriter::new();
    writer.write_all(&seed)?;
    if let Some(path) = entropy {
        let bytes = fs::read(path)
            .with_context(|| format!("reading entropy from {}", path.display()))?;
        writer.write_all(&bytes)?;
    }
    Ok(hash_to_fr(&writer.finalize()))
}

/// `phase2-verify-contribution`: one-shot check of a response against its
/// challenge.
pub fn verify_contribution(challenge_path: &Path, response_path: &Path) -> Result<()> {
    let challenge = Phase2Challenge::<Bls12_381>::read(open(challenge_path)?)
        .with_context(|| format!("reading challenge from {}", challenge_path.display()))?;
    let response = Phase2Response::<Bls12_381>::read(open(response_path)?)
        .with_context(|| format!("reading response from {}", response_path.display()))?;

    verify_response(&challenge, &response).map_err(VerificationFailure)?;
    println!(
        "contribution {} verified",
        response.publickey.digest()
    );
    Ok(())
}

/// `phase2-verify-transcript`: audit a whole transcript of public keys.
pub fn verify_transcript_file(
    initial_digest_hex: &str,
    transcript_path: &Path,
    check_contribution_hex: Option<&str>,
) -> Result<()> {
    let initial_digest = Digest::from_hex(initial_digest_hex)
        .ok_or_else(|| anyhow!("initial digest must be 128 hex characters"))?;
    let target = check_contribution_hex
        .map(|hex| {
            Digest::from_hex(hex)
                .ok_or_else(|| anyhow!("contribution digest must be 128 hex characters"))
        })
        .transpose()?;

    let summary = verify_transcript::<Bls12_381, _>(
        initial_digest,
        G1Affine::generator(),
        open(transcript_path)?,
        target.as_ref(),
    )
    .map_err(VerificationFailure)?;

    println!("final transcript digest: {}", summary.final_digest);
    if let Some(target) = target {
        if !summary.contribution_found {
            bail!("contribution {target} not found in transcript");
        }
        println!("contribution {target} found");
    }
    Ok(())
}

/// `phase2-finalize`: verify the final response and materialize the Groth16
/// keypair, optionally exporting the verification key as JSON.
pub fn finalize(
    challenge_path: &Path,
    response_path: &Path,
    r1cs_path: &Path,
    pot_path: &Path,
    out_keypair: &Path,
    vk_json: Option<&Path>,
) -> Result<()> {
    let challenge = Phase2Challenge::<Bls12_381>::read(open(challenge_path)?)
        .with_context(|| format!("reading challenge from {}", challenge_path.display()))?;
    let response = Phase2Response::<Bls12_381>::read(open(response_path)?)
        .with_context(|| format!("reading response from {}", response_path.display()))?;
    verify_response(&challenge, &response).map_err(VerificationFailure)?;

    let pot = PowersOfTau::<Bls12_381>::read(open(pot_path)?)
        .with_context(|| format!("reading powers of tau from {}", pot_path.display()))?;
    let cs = load_constraint_system(r1cs_path)?;
    let (_, layer1) = compute_layer1(&pot, &cs)?;

    let keypair = materialize(&pot, &layer1, &response.new_accumulator, cs)?;
    write_atomic(out_keypair, |writer| {
        keypair.write(writer).map_err(Into::into)
    })?;
    println!("keypair written to {}", out_keypair.display());

    if let Some(path) = vk_json {
        let rendered = serde_json::to_string_pretty(&verification_key_json(&keypair.vk))?;
        write_atomic(path, |writer| {
            writer.write_all(rendered.as_bytes()).map_err(Into::into)
        })?;
        println!("verification key written to {}", path.display());
    }
    Ok(())
}
