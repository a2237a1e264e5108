//! MPC-in-the-Head proof of knowledge of a discrete logarithm, and the
//! signature scheme derived from it.[^cite]
//!
//! The prover knows `x ∈ F_q` with `y = g^x` and convinces a verifier of it
//! without revealing `x`.
//!
//! # High-level protocol description
//! A single round runs as follows:
//! - The prover splits `x` into `n` additive shares `s_1, ..., s_n` over
//!   `F_q` and simulates `n` virtual parties, one per share.
//! - Each party commits to its share and broadcasts `g^{s_i}`.
//! - The verifier picks one hidden party. The prover opens every other
//!   share.
//! - The verifier checks each opened share against its commitment and
//!   broadcast, and checks that the product of all broadcasts equals `y`.
//!
//! A cheating prover survives a round only by guessing the hidden party, so
//! `m` independent rounds are run. The signature replaces the verifier by a
//! hash of the message and every round's commitments and broadcasts
//! (Fiat-Shamir), from which all `m` hidden parties are derived at once.
//!
//! [^cite]: Yuval Ishai, Eyal Kushilevitz, Rafail Ostrovsky, and Amit Sahai.
//! Zero-Knowledge from Secure Multiparty Computation. STOC 2007.
// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

mod challenge;
mod proof;
mod signature;

pub use challenge::DIGEST_BYTES;
pub use proof::{
    commit_share, prove_single_round, verify_single_round, Commitment, MpcithProof,
    RoundCommitment,
};
pub use signature::{
    meets_recommended_security, rounds_for_security, sign, soundness_bits, verify_signature,
    WholeSignature, MAX_PARTIES, RECOMMENDED_SECURITY_BITS,
};
