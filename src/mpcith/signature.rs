// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::{CallerError, Result},
    field::FieldElement,
    group::{GroupElement, Parameters},
    mpcith::{
        challenge::{expand_challenges, transcript_digest, DIGEST_BYTES},
        proof::{verify_single_round, MpcithProof, RoundCommitment},
    },
    utils::message_length_prefix,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Largest supported number of parties. Hidden parties are derived from one
/// challenge byte each, so `n` cannot exceed 256.
pub const MAX_PARTIES: usize = 256;

/// Soundness target below which [`sign`] logs a warning.
pub const RECOMMENDED_SECURITY_BITS: u32 = 128;

/// Bits of soundness contributed by a single round with `n` parties.
///
/// A cheating prover survives a round by guessing the hidden party. With the
/// `byte mod n` derivation the likeliest index is hit with probability
/// `⌈256/n⌉ / 256`, which is exactly `1/n` only when `n` divides 256.
pub fn soundness_bits(n: usize) -> Result<f64> {
    if !(2..=MAX_PARTIES).contains(&n) {
        error!("Number of parties must be in [2, {MAX_PARTIES}], got {n}");
        Err(CallerError::InvalidParameter)?
    }
    let likeliest = MAX_PARTIES.div_ceil(n) as f64 / MAX_PARTIES as f64;
    Ok(-likeliest.log2())
}

/// Smallest number of rounds `m` such that `n` parties give at least
/// `security_bits` bits of soundness.
///
/// For `n = 5` and 128 bits this is 56.
pub fn rounds_for_security(n: usize, security_bits: u32) -> Result<usize> {
    let per_round = soundness_bits(n)?;
    let rounds = (f64::from(security_bits) / per_round).ceil() as usize;
    Ok(rounds.max(1))
}

/// Whether `m` rounds of `n` parties reach [`RECOMMENDED_SECURITY_BITS`] bits
/// of soundness.
pub fn meets_recommended_security(n: usize, m: usize) -> Result<bool> {
    let total_bits = soundness_bits(n)? * m as f64;
    Ok(total_bits >= f64::from(RECOMMENDED_SECURITY_BITS))
}

/// A Fiat-Shamir signature made of `m` independent MPCitH rounds.
///
/// `challenge_seed` is the transcript digest the hidden parties were derived
/// from. A signature is immutable once produced; a parsed signature is
/// untrusted until [`verify_signature`] accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WholeSignature {
    pub(crate) proofs: Vec<MpcithProof>,
    pub(crate) challenge_seed: [u8; DIGEST_BYTES],
}

impl WholeSignature {
    pub fn proofs(&self) -> &[MpcithProof] {
        &self.proofs
    }

    pub fn challenge_seed(&self) -> &[u8; DIGEST_BYTES] {
        &self.challenge_seed
    }

    /// Number of rounds `m`.
    pub fn rounds(&self) -> usize {
        self.proofs.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize!(self)
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        deserialize!(bytes)
    }
}

/// Sign `message` with `m` rounds of `n` parties each.
///
/// `(n, m)` are security parameters supplied by the caller; see
/// [`rounds_for_security`] for choosing `m`. Parameters giving fewer than
/// [`RECOMMENDED_SECURITY_BITS`] bits of soundness are accepted but logged.
#[instrument(skip_all, err(Debug))]
pub fn sign<R: RngCore + CryptoRng>(
    message: &[u8],
    secret: &FieldElement,
    params: &Parameters,
    n: usize,
    m: usize,
    rng: &mut R,
) -> Result<WholeSignature> {
    if m == 0 {
        error!("A signature needs at least one round");
        Err(CallerError::InvalidParameter)?
    }
    if !meets_recommended_security(n, m)? {
        warn!(
            "Signing with n = {n}, m = {m} gives about {:.1} bits of soundness; \
             {} rounds are needed for {RECOMMENDED_SECURITY_BITS} bits",
            soundness_bits(n)? * m as f64,
            rounds_for_security(n, RECOMMENDED_SECURITY_BITS)?
        );
    }
    // Reject oversized messages before doing any per-round work.
    let _ = message_length_prefix(message.len())?;
    info!("Signing message with {m} rounds of {n} parties.");

    let rounds = (0..m)
        .map(|_| RoundCommitment::new(secret, params, n, rng))
        .collect::<Result<Vec<_>>>()?;

    let challenge_seed = transcript_digest(
        message,
        params,
        rounds
            .iter()
            .map(|round| (round.commits(), round.broadcasts())),
    )?;
    let hidden_parties = expand_challenges(&challenge_seed, m, n);

    let proofs = rounds
        .iter()
        .zip(hidden_parties)
        .map(|(round, hidden_party)| round.open(hidden_party))
        .collect::<Result<Vec<_>>>()?;

    Ok(WholeSignature {
        proofs,
        challenge_seed,
    })
}

/// Verify a signature on `message` against the public key `public`.
///
/// Returns `false` on any mismatch without saying which check failed.
#[instrument(skip_all)]
pub fn verify_signature(
    sig: &WholeSignature,
    message: &[u8],
    params: &Parameters,
    public: &GroupElement,
) -> bool {
    let Some(first) = sig.proofs.first() else {
        error!("Signature contains no rounds");
        return false;
    };
    let n = first.parties();
    if !(2..=MAX_PARTIES).contains(&n) {
        error!("Signature uses an unsupported number of parties: {n}");
        return false;
    }
    if sig.proofs.iter().any(|proof| proof.parties() != n) {
        error!("Rounds disagree on the number of parties");
        return false;
    }

    let digest = match transcript_digest(
        message,
        params,
        sig.proofs
            .iter()
            .map(|proof| (proof.commits(), proof.group_shares())),
    ) {
        Ok(digest) => digest,
        Err(e) => {
            error!("Failed to recompute the transcript digest: {e:?}");
            return false;
        }
    };
    if digest != sig.challenge_seed {
        error!("Transcript digest does not match the signature");
        return false;
    }

    let hidden_parties = expand_challenges(&digest, sig.rounds(), n);
    for (round, (proof, expected)) in sig.proofs.iter().zip(hidden_parties).enumerate() {
        if proof.hidden_party() != expected {
            error!("Round {round} hides party {} instead of {expected}", proof.hidden_party());
            return false;
        }
        if !verify_single_round(proof, params, public) {
            error!("Round {round} failed to verify");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::InternalError,
        group::generate_parameters,
        keygen::{keygen, KeyPair},
        utils::testing::init_testing,
    };
    use libpaillier::unknown_order::BigNumber;
    use rand::rngs::StdRng;

    fn setup() -> (StdRng, Parameters, KeyPair) {
        let mut rng = init_testing();
        let params = generate_parameters(16, &mut rng).unwrap();
        let key_pair = keygen(&params, &mut rng).unwrap();
        (rng, params, key_pair)
    }

    #[test]
    fn signatures_verify() {
        let (mut rng, params, key_pair) = setup();
        for (n, m) in [(2usize, 1usize), (3, 4), (5, 20), (16, 8)] {
            let message = format!("message signed with n = {n}, m = {m}");
            let sig = sign(message.as_bytes(), key_pair.secret(), &params, n, m, &mut rng).unwrap();
            assert_eq!(sig.rounds(), m);
            assert!(sig.proofs().iter().all(|proof| proof.parties() == n));
            assert!(verify_signature(&sig, message.as_bytes(), &params, key_pair.public()));
        }
    }

    #[test]
    fn empty_message_can_be_signed() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"", key_pair.secret(), &params, 4, 3, &mut rng).unwrap();
        assert!(verify_signature(&sig, b"", &params, key_pair.public()));
        assert!(!verify_signature(&sig, b"\0", &params, key_pair.public()));
    }

    #[test]
    fn tampered_message_is_rejected() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"Original Message", key_pair.secret(), &params, 5, 10, &mut rng).unwrap();
        assert!(!verify_signature(&sig, b"Tampered Message", &params, key_pair.public()));
    }

    #[test]
    fn other_public_key_is_rejected() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"Hello", key_pair.secret(), &params, 5, 10, &mut rng).unwrap();
        let mut other = keygen(&params, &mut rng).unwrap();
        while other.public() == key_pair.public() {
            other = keygen(&params, &mut rng).unwrap();
        }
        assert!(!verify_signature(&sig, b"Hello", &params, other.public()));
    }

    #[test]
    fn mutated_hidden_party_is_rejected() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"Hello", key_pair.secret(), &params, 5, 6, &mut rng).unwrap();
        for round in 0..sig.rounds() {
            let mut tampered = sig.clone();
            let proof = &mut tampered.proofs[round];
            proof.hidden_party = (proof.hidden_party + 1) % 5;
            assert!(!verify_signature(&tampered, b"Hello", &params, key_pair.public()));
        }
    }

    #[test]
    fn structural_tampering_is_rejected() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"Hello", key_pair.secret(), &params, 4, 5, &mut rng).unwrap();

        let mut empty = sig.clone();
        empty.proofs.clear();
        assert!(!verify_signature(&empty, b"Hello", &params, key_pair.public()));

        let mut dropped_round = sig.clone();
        dropped_round.proofs.pop();
        assert!(!verify_signature(&dropped_round, b"Hello", &params, key_pair.public()));

        let mut swapped = sig.clone();
        swapped.proofs.swap(0, 1);
        assert!(!verify_signature(&swapped, b"Hello", &params, key_pair.public()));

        let mut seed = sig.clone();
        seed.challenge_seed[0] ^= 1;
        assert!(!verify_signature(&seed, b"Hello", &params, key_pair.public()));

        let mut broadcast = sig;
        let g = params.g().clone();
        let target = &mut broadcast.proofs[2].group_shares[0];
        *target = target.mul(&g).unwrap();
        assert!(!verify_signature(&broadcast, b"Hello", &params, key_pair.public()));
    }

    #[test]
    fn fixed_secret_signs_and_verifies() {
        let (mut rng, params, _) = setup();
        let key_pair = KeyPair::from_secret(&params, &BigNumber::from(42u64)).unwrap();
        let message = b"Test Message for MPC";
        let sig = sign(message, key_pair.secret(), &params, 5, 20, &mut rng).unwrap();
        assert!(verify_signature(&sig, message, &params, key_pair.public()));
    }

    #[test]
    fn invalid_security_parameters_are_rejected() {
        let (mut rng, params, key_pair) = setup();
        let invalid = Err(InternalError::CallingApplicationMistake(
            CallerError::InvalidParameter,
        ));
        assert_eq!(sign(b"m", key_pair.secret(), &params, 1, 5, &mut rng), invalid);
        assert_eq!(
            sign(b"m", key_pair.secret(), &params, MAX_PARTIES + 1, 5, &mut rng),
            invalid
        );
        assert_eq!(sign(b"m", key_pair.secret(), &params, 5, 0, &mut rng), invalid);
    }

    #[test]
    fn secret_must_come_from_the_exponent_field() {
        let (mut rng, params, _) = setup();
        let foreign = FieldElement::from_u64(42, &BigNumber::from(13u64)).unwrap();
        assert_eq!(
            sign(b"m", &foreign, &params, 5, 2, &mut rng),
            Err(InternalError::CallingApplicationMistake(
                CallerError::FieldMismatch
            ))
        );
    }

    #[test]
    fn signatures_survive_serialization() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"bytes", key_pair.secret(), &params, 5, 4, &mut rng).unwrap();
        let bytes = sig.to_bytes().unwrap();
        let parsed = WholeSignature::try_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, sig);
        assert!(verify_signature(&parsed, b"bytes", &params, key_pair.public()));

        assert_eq!(
            WholeSignature::try_from_bytes(&bytes[..bytes.len() - 1]),
            Err(InternalError::CallingApplicationMistake(
                CallerError::DeserializationFailed
            ))
        );
    }

    #[test]
    fn round_counts_reach_the_security_target() {
        assert_eq!(rounds_for_security(5, 128).unwrap(), 56);
        assert_eq!(rounds_for_security(2, 128).unwrap(), 128);
        assert_eq!(rounds_for_security(256, 128).unwrap(), 16);
        assert_eq!(rounds_for_security(5, 0).unwrap(), 1);

        for n in 2..=MAX_PARTIES {
            let m = rounds_for_security(n, 128).unwrap();
            assert!(soundness_bits(n).unwrap() * m as f64 >= 128.0);
        }

        assert!(soundness_bits(1).is_err());
        assert!(soundness_bits(MAX_PARTIES + 1).is_err());
    }

    #[test]
    fn power_of_two_parties_are_unbiased() {
        for (n, bits) in [(2usize, 1.0), (4, 2.0), (16, 4.0), (256, 8.0)] {
            assert!((soundness_bits(n).unwrap() - bits).abs() < 1e-9);
        }
        // With bias, n = 5 yields slightly less than log2(5) bits per round.
        assert!(soundness_bits(5).unwrap() < 5f64.log2());
    }
    #[test]
    fn weak_parameters_fall_below_the_recommended_level() {
        assert!(meets_recommended_security(5, 56).unwrap());
        assert!(!meets_recommended_security(5, 55).unwrap());
        assert!(!meets_recommended_security(5, 20).unwrap());
        assert!(meets_recommended_security(2, 128).unwrap());
        assert!(!meets_recommended_security(2, 127).unwrap());
        assert!(meets_recommended_security(256, 16).unwrap());
        assert!(meets_recommended_security(1, 500).is_err());

        for n in [2usize, 3, 5, 7, 100, 255] {
            let m = rounds_for_security(n, RECOMMENDED_SECURITY_BITS).unwrap();
            assert!(meets_recommended_security(n, m).unwrap());
            assert!(!meets_recommended_security(n, m - 1).unwrap());
        }
    }

    #[test]
    fn reordered_openings_do_not_verify() {
        let (mut rng, params, key_pair) = setup();
        let sig = sign(b"Hello", key_pair.secret(), &params, 5, 4, &mut rng).unwrap();
        for round in 0..sig.rounds() {
            let mut tampered = sig.clone();
            tampered.proofs[round].opened_party.swap(0, 1);
            assert_ne!(tampered, sig);
            assert!(!verify_signature(&tampered, b"Hello", &params, key_pair.public()));
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_messages_are_rejected_before_signing() {
        let (mut rng, params, key_pair) = setup();
        // Zeroed allocations are lazy, so this does not touch 4 GiB of memory.
        let message = vec![0u8; 1usize << 32];
        assert_eq!(
            sign(&message, key_pair.secret(), &params, 5, 2, &mut rng),
            Err(InternalError::CallingApplicationMistake(
                CallerError::MessageTooLong
            ))
        );
        assert!(!verify_signature(
            &sign(b"short", key_pair.secret(), &params, 5, 2, &mut rng).unwrap(),
            &message,
            &params,
            key_pair.public()
        ));
    }
}
