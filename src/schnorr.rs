// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Classical Fiat-Shamir Schnorr signatures over the same group.
//!
//! Serves as a reference for the MPCitH signer: both use the same keys,
//! parameters and message encoding.

use crate::{
    errors::{CallerError, Result},
    field::FieldElement,
    group::{GroupElement, Parameters},
    utils::{encode_message, int_to_bytes},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, instrument};

/// A Schnorr signature `(u, c, z)` with `u = g^r`, `c = H(...)` and
/// `z = r + c·x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature {
    u: GroupElement,
    c: FieldElement,
    z: FieldElement,
}

impl SchnorrSignature {
    pub fn u(&self) -> &GroupElement {
        &self.u
    }

    pub fn c(&self) -> &FieldElement {
        &self.c
    }

    pub fn z(&self) -> &FieldElement {
        &self.z
    }
}

/// `c = SHA-256(p || q || g || y || u || len(m) || m) mod q`, with `p`, `g`,
/// `y`, `u` in `p_len` bytes and `q` in `q_len` bytes.
fn compute_challenge(
    params: &Parameters,
    y: &GroupElement,
    u: &GroupElement,
    message: &[u8],
) -> Result<FieldElement> {
    let mut hasher = Sha256::new();
    hasher.update(int_to_bytes(params.p(), params.p_len())?);
    hasher.update(int_to_bytes(params.q(), params.q_len())?);
    for element in [params.g(), y, u] {
        hasher.update(int_to_bytes(element.value(), params.p_len())?);
    }
    hasher.update(encode_message(message)?);
    FieldElement::new(&BigNumber::from_slice(hasher.finalize()), params.q())
}

#[instrument(skip_all, err(Debug))]
pub fn schnorr_sign<R: RngCore + CryptoRng>(
    params: &Parameters,
    x: &FieldElement,
    y: &GroupElement,
    message: &[u8],
    rng: &mut R,
) -> Result<SchnorrSignature> {
    if x.modulus() != params.q() {
        error!("Secret does not live in the exponent field of the group");
        Err(CallerError::FieldMismatch)?
    }
    let r = FieldElement::random(params.q(), rng)?;
    let u = params.g().pow(&r)?;
    let c = compute_challenge(params, y, &u, message)?;
    let z = r.add(&c.mul(x)?)?;
    Ok(SchnorrSignature { u, c, z })
}

/// Check `c` against the recomputed challenge and `g^z = u·y^c`.
pub fn schnorr_verify(
    params: &Parameters,
    y: &GroupElement,
    message: &[u8],
    sig: &SchnorrSignature,
) -> bool {
    let c = match compute_challenge(params, y, &sig.u, message) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to recompute the Schnorr challenge: {e:?}");
            return false;
        }
    };
    if c != sig.c {
        error!("Schnorr challenge does not match");
        return false;
    }
    let lhs = params.g().pow(&sig.z);
    let rhs = y.pow(&c).and_then(|y_c| sig.u.mul(&y_c));
    match (lhs, rhs) {
        (Ok(lhs), Ok(rhs)) if lhs == rhs => true,
        _ => {
            error!("Schnorr verification equation does not hold");
            false
        }
    }
}
