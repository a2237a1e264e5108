// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Discrete-log key pairs shared by the MPCitH and Schnorr signers.

use crate::{
    errors::Result,
    field::FieldElement,
    group::{GroupElement, Parameters},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;
use zeroize::ZeroizeOnDrop;

/// A secret exponent `x ∈ F_q` and its public image `y = g^x`.
///
/// # 🔒 Storage requirements
/// The secret is owned by the signer and is never serialized by this crate.
#[derive(Clone, ZeroizeOnDrop)]
pub struct KeyPair {
    secret: FieldElement,
    public: GroupElement,
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("secret", &"[redacted]")
            .field("public", &self.public)
            .finish()
    }
}

impl KeyPair {
    /// Build the key pair for a known secret, reduced mod `q`.
    pub fn from_secret(params: &Parameters, x: &BigNumber) -> Result<Self> {
        let secret = FieldElement::new(x, params.q())?;
        let public = params.g().pow(&secret)?;
        Ok(Self { secret, public })
    }

    pub fn secret(&self) -> &FieldElement {
        &self.secret
    }

    pub fn public(&self) -> &GroupElement {
        &self.public
    }
}

/// Sample a uniformly random secret `x` and set `y = g^x`.
pub fn keygen<R: RngCore + CryptoRng>(params: &Parameters, rng: &mut R) -> Result<KeyPair> {
    let secret = FieldElement::random(params.q(), rng)?;
    let public = params.g().pow(&secret)?;
    Ok(KeyPair { secret, public })
}
