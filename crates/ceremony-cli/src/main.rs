//! CLI entry point for the phase-2 SRS ceremony.

use ceremony_cli::VerificationFailure;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "srs-ceremony")]
#[command(about = "Groth16 SRS phase-2 ceremony tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the initial phase-2 challenge from phase-1 output and a circuit
    Phase2Begin {
        /// Powers-of-tau file from the phase-1 ceremony
        pot: PathBuf,
        /// Canonical constraint-system file from the circuit compiler
        r1cs: PathBuf,
        /// Output challenge file
        out_challenge: PathBuf,
    },
    /// Contribute fresh randomness to a challenge
    Phase2Contribute {
        /// Challenge file to contribute on top of
        challenge: PathBuf,
        /// Output response file
        response: PathBuf,
        /// Optional file whose bytes are mixed into the secret derivation
        #[arg(long)]
        entropy: Option<PathBuf>,
    },
    /// Verify a single response against its challenge
    Phase2VerifyContribution {
        /// Challenge file the response answers
        challenge: PathBuf,
        /// Response file to verify
        response: PathBuf,
    },
    /// Verify a whole transcript of contributions
    Phase2VerifyTranscript {
        /// Initial transcript digest, 128 hex characters
        initial_digest: String,
        /// Concatenated public-key transcript file
        transcript: PathBuf,
        /// Require this contribution digest to appear in the transcript
        #[arg(long)]
        check_contribution: Option<String>,
    },
    /// Verify the final response and write the Groth16 keypair
    Phase2Finalize {
        /// Final challenge file
        challenge: PathBuf,
        /// Final response file
        response: PathBuf,
        /// Canonical constraint-system file
        r1cs: PathBuf,
        /// Powers-of-tau file
        pot: PathBuf,
        /// Output keypair file (proving + verification key)
        out_keypair: PathBuf,
        /// Also write the verification key as JSON
        #[arg(long)]
        vk_json: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Phase2Begin {
            pot,
            r1cs,
            out_challenge,
        } => ceremony_cli::begin(&pot, &r1cs, &out_challenge),
        Commands::Phase2Contribute {
            challenge,
            response,
            entropy,
        } => ceremony_cli::contribute(&challenge, &response, entropy.as_deref()),
        Commands::Phase2VerifyContribution {
            challenge,
            response,
        } => ceremony_cli::verify_contribution(&challenge, &response),
        Commands::Phase2VerifyTranscript {
            initial_digest,
            transcript,
            check_contribution,
        } => ceremony_cli::verify_transcript_file(
            &initial_digest,
            &transcript,
            check_contribution.as_deref(),
        ),
        Commands::Phase2Finalize {
            challenge,
            response,
            r1cs,
            pot,
            out_keypair,
            vk_json,
        } => ceremony_cli::finalize(
            &challenge,
            &response,
            &r1cs,
            &pot,
            &out_keypair,
            vk_json.as_deref(),
        ),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            if error.is::<VerificationFailure>() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
