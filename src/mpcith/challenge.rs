// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Fiat-Shamir challenge derivation shared by the signer and the verifier.
//!
//! Both sides must feed the hash exactly the same bytes in exactly the same
//! order:
//!
//! ```text
//! SHA-256( len(m) as 4 BE bytes || m
//!          || for each round, in index order:
//!               commit_0 || ... || commit_{n-1}        (q_len bytes each)
//!               g^{s_0}  || ... || g^{s_{n-1}}         (p_len bytes each) )
//! ```
//!
//! The 32-byte digest seeds SHAKE-256, whose first `m` output bytes pick the
//! hidden party of each round as `byte mod n`.
//!
//! ⚠️ `byte mod n` is biased unless `n` divides 256: the indices below
//! `256 mod n` are picked with probability `⌈256/n⌉ / 256` instead of `1/n`.
//! The bias is kept so that signatures stay compatible;
//! [`soundness_bits`](super::soundness_bits) accounts for it.

use crate::{
    errors::Result,
    group::{GroupElement, Parameters},
    mpcith::proof::Commitment,
    utils::{encode_message, int_to_bytes},
};
use sha2::{Digest, Sha256};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// Length of the transcript digest in bytes.
pub const DIGEST_BYTES: usize = 32;

/// Hash the message and the commit phase of every round.
///
/// `rounds` yields each round's commitments and broadcasts in round order.
pub(crate) fn transcript_digest<'a>(
    message: &[u8],
    params: &Parameters,
    rounds: impl IntoIterator<Item = (&'a [Commitment], &'a [GroupElement])>,
) -> Result<[u8; DIGEST_BYTES]> {
    let mut hasher = Sha256::new();
    Digest::update(&mut hasher, encode_message(message)?);
    for (commits, broadcasts) in rounds {
        for commit in commits {
            Digest::update(&mut hasher, commit.to_bytes(params.q_len())?);
        }
        for broadcast in broadcasts {
            // Width comes from the shared parameters, not the element.
            Digest::update(&mut hasher, int_to_bytes(broadcast.value(), params.p_len())?);
        }
    }
    Ok(hasher.finalize().into())
}

/// Expand the transcript digest into one hidden-party index per round.
pub(crate) fn expand_challenges(
    seed: &[u8; DIGEST_BYTES],
    rounds: usize,
    parties: usize,
) -> Vec<usize> {
    let mut xof = Shake256::default();
    xof.update(seed);
    let mut reader = xof.finalize_xof();
    let mut bytes = vec![0u8; rounds];
    reader.read(&mut bytes);
    bytes
        .into_iter()
        .map(|byte| usize::from(byte) % parties)
        .collect()
}
