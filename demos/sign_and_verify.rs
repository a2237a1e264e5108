//! ## Example usage of the [`mpcith_dlog`] crate.
//!
//! Generates group parameters and a key pair, then signs a message with both
//! the MPC-in-the-Head signer and the Schnorr reference signer and verifies
//! the results.
//!
//! Set `RUST_LOG=info` to follow the protocol steps.

use anyhow::bail;
use clap::{command, Parser};
use mpcith_dlog::{
    generate_parameters, keygen, rounds_for_security, schnorr_sign, schnorr_verify, sign,
    soundness_bits, verify_signature, WholeSignature,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Instant;
use tracing::{info, span, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bit length of the group order `q`.
    #[arg(short, long, default_value_t = 160)]
    q_bits: usize,
    /// Number of virtual parties per round.
    #[arg(short, long, default_value_t = 5)]
    parties: usize,
    /// Number of rounds. Defaults to the smallest count reaching
    /// `--security-bits`.
    #[arg(short, long)]
    rounds: Option<usize>,
    /// Soundness target used when `--rounds` is not given.
    #[arg(short, long, default_value_t = 128)]
    security_bits: u32,
    /// Message to sign.
    #[arg(long, default_value = "Hello MPCitH")]
    message: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Set up logging.
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .compact()
        .init();
    let span = span!(Level::INFO, "main");
    let _enter = span.entered();

    let mut rng = StdRng::from_entropy();
    let message = cli.message.as_bytes();

    let params = generate_parameters(cli.q_bits, &mut rng)?;
    println!("p = {}", params.p());
    println!("q = {}", params.q());
    println!("g = {}", params.g());

    let key_pair = keygen(&params, &mut rng)?;
    println!("public key y = {}", key_pair.public());

    let n = cli.parties;
    let m = match cli.rounds {
        Some(m) => m,
        None => rounds_for_security(n, cli.security_bits)?,
    };
    info!("Signing with n = {n}, m = {m}");

    let start = Instant::now();
    let sig = sign(message, key_pair.secret(), &params, n, m, &mut rng)?;
    let signed_in = start.elapsed();
    let bytes = sig.to_bytes()?;

    let start = Instant::now();
    let parsed = WholeSignature::try_from_bytes(&bytes)?;
    if !verify_signature(&parsed, message, &params, key_pair.public()) {
        bail!("MPCitH signature failed to verify");
    }
    let verified_in = start.elapsed();
    println!(
        "MPCitH: n = {n}, m = {m}, ~{:.1} bits of soundness, {} bytes, signed in {signed_in:?}, verified in {verified_in:?}",
        soundness_bits(n)? * m as f64,
        bytes.len(),
    );

    let tampered = [message, b"!"].concat();
    if verify_signature(&parsed, &tampered, &params, key_pair.public()) {
        bail!("MPCitH signature verified for a tampered message");
    }

    let schnorr = schnorr_sign(&params, key_pair.secret(), key_pair.public(), message, &mut rng)?;
    if !schnorr_verify(&params, key_pair.public(), message, &schnorr) {
        bail!("Schnorr signature failed to verify");
    }
    println!(
        "Schnorr: (u = {}, c = {}, z = {})",
        schnorr.u(),
        schnorr.c(),
        schnorr.z()
    );

    Ok(())
}
