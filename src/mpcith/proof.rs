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
    sharing::FieldShare,
    utils::int_to_bytes,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use tracing::error;
use zeroize::ZeroizeOnDrop;

/// Commitment to one party's share: `SHA-256(share) mod q`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(pub(crate) BigNumber);

impl Commitment {
    pub fn value(&self) -> &BigNumber {
        &self.0
    }

    /// Fixed-width big-endian encoding, `q_len` bytes.
    pub fn to_bytes(&self, q_len: usize) -> Result<Vec<u8>> {
        int_to_bytes(&self.0, q_len)
    }
}

/// Commit to a share by hashing its fixed-width encoding.
pub fn commit_share(share: &FieldElement) -> Result<Commitment> {
    let digest = Sha256::digest(share.to_bytes()?);
    Ok(Commitment(BigNumber::from_slice(digest).nmod(share.modulus())))
}

/// The prover's state after the commit phase of a single round: a fresh
/// sharing of the secret, one commitment per share, and the broadcast
/// `g^{s_i}` of every share.
///
/// # 🔒 Lifetime requirements
/// This type must only be opened _once_. Opening it for two different hidden
/// parties reveals every share, and therefore the secret.
#[derive(Clone, ZeroizeOnDrop)]
pub struct RoundCommitment {
    shares: FieldShare,
    #[zeroize(skip)]
    commits: Vec<Commitment>,
    #[zeroize(skip)]
    broadcasts: Vec<GroupElement>,
}

impl Debug for RoundCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundCommitment")
            .field("shares", &"[redacted]")
            .field("commits", &self.commits)
            .field("broadcasts", &self.broadcasts)
            .finish()
    }
}

impl RoundCommitment {
    /// Split the secret into `n` shares, then commit to and broadcast each
    /// share.
    pub fn new<R: RngCore + CryptoRng>(
        secret: &FieldElement,
        params: &Parameters,
        n: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if secret.modulus() != params.q() {
            error!("Secret does not live in the exponent field of the group");
            Err(CallerError::FieldMismatch)?
        }
        let shares = FieldShare::additive_secret_sharing(secret.value(), n, params.q(), rng)?;
        let commits = shares
            .shares()
            .iter()
            .map(commit_share)
            .collect::<Result<Vec<_>>>()?;
        let broadcasts = shares.exp(params.g())?.into_elements();
        Ok(Self {
            shares,
            commits,
            broadcasts,
        })
    }

    /// Number of virtual parties.
    pub fn parties(&self) -> usize {
        self.commits.len()
    }

    pub fn commits(&self) -> &[Commitment] {
        &self.commits
    }

    pub fn broadcasts(&self) -> &[GroupElement] {
        &self.broadcasts
    }

    /// Reveal every share except the one held by `hidden_party`, in ascending
    /// party order.
    pub fn open(&self, hidden_party: usize) -> Result<MpcithProof> {
        if hidden_party >= self.parties() {
            error!(
                "Hidden party {hidden_party} is out of range for {} parties",
                self.parties()
            );
            Err(CallerError::InvalidParameter)?
        }
        let opened_party = self
            .shares
            .shares()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != hidden_party)
            .map(|(i, share)| (i, share.clone()))
            .collect();
        Ok(MpcithProof {
            commits: self.commits.clone(),
            group_shares: self.broadcasts.clone(),
            hidden_party,
            opened_party,
        })
    }
}

/// One round of the cut-and-choose proof that the prover knows `x` with
/// `y = g^x`.
///
/// The prover commits to `n` shares of `x` and broadcasts `g^{s_i}` for each.
/// All shares except the hidden party's are then opened. The hidden party's
/// broadcast is only constrained through `∏ g^{s_i} = y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpcithProof {
    pub(crate) commits: Vec<Commitment>,
    pub(crate) group_shares: Vec<GroupElement>,
    pub(crate) hidden_party: usize,
    pub(crate) opened_party: Vec<(usize, FieldElement)>,
}

impl MpcithProof {
    pub fn commits(&self) -> &[Commitment] {
        &self.commits
    }

    pub fn group_shares(&self) -> &[GroupElement] {
        &self.group_shares
    }

    pub fn hidden_party(&self) -> usize {
        self.hidden_party
    }

    pub fn opened_party(&self) -> &[(usize, FieldElement)] {
        &self.opened_party
    }

    /// Number of virtual parties, taken from the number of commitments.
    pub fn parties(&self) -> usize {
        self.commits.len()
    }
}

/// Produce a single interactive round for `n` parties.
///
/// The hidden party is drawn uniformly at random after all commitments are
/// fixed, standing in for the verifier's challenge.
pub fn prove_single_round<R: RngCore + CryptoRng>(
    secret: &FieldElement,
    params: &Parameters,
    n: usize,
    rng: &mut R,
) -> Result<MpcithProof> {
    let round = RoundCommitment::new(secret, params, n, rng)?;
    let hidden_party = rng.gen_range(0..n);
    round.open(hidden_party)
}

/// Verify a single round against the public key `y`.
///
/// Every structural or algebraic problem results in `false`; the checks run
/// in a fixed order and stop at the first failure.
pub fn verify_single_round(proof: &MpcithProof, params: &Parameters, y: &GroupElement) -> bool {
    let n = proof.parties();
    if n < 2 {
        error!("A proof needs at least two parties, got {n}");
        return false;
    }
    if proof.group_shares.len() != n {
        error!(
            "Expected {n} group shares, got {}",
            proof.group_shares.len()
        );
        return false;
    }
    if proof.opened_party.len() != n - 1 {
        error!(
            "Expected {} opened parties, got {}",
            n - 1,
            proof.opened_party.len()
        );
        return false;
    }
    if proof.hidden_party >= n {
        error!("Hidden party {} is out of range", proof.hidden_party);
        return false;
    }

    // Openings are listed in strictly ascending party order, which also rules
    // out duplicates and keeps a proof's encoding unique.
    let mut previous: Option<usize> = None;
    for (i, _) in &proof.opened_party {
        if *i == proof.hidden_party {
            error!("Hidden party {i} was also opened");
            return false;
        }
        if *i >= n {
            error!("Opened party {i} is out of range");
            return false;
        }
        if previous.is_some_and(|p| p >= *i) {
            error!("Opened party {i} is out of order or opened twice");
            return false;
        }
        previous = Some(*i);
    }

    for (i, share) in &proof.opened_party {
        if share.modulus() != params.q() {
            error!("Opened share {i} is not an element of F_q");
            return false;
        }
        match commit_share(share) {
            Ok(commitment) if commitment == proof.commits[*i] => {}
            _ => {
                error!("Opened share {i} does not match its commitment");
                return false;
            }
        }
        match params.g().pow(share.value()) {
            Ok(expected) if expected == proof.group_shares[*i] => {}
            _ => {
                error!("Opened share {i} does not match its broadcast");
                return false;
            }
        }
    }

    let product = proof.group_shares[1..]
        .iter()
        .try_fold(proof.group_shares[0].clone(), |acc, element| acc.mul(element));
    match product {
        Ok(product) if &product == y => true,
        _ => {
            error!("Product of group shares does not equal the public key");
            false
        }
    }
}
