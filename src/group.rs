// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The order-`q` subgroup of `Z_p^*` and its public parameters.

use crate::{
    errors::{CallerError, Result},
    field::Exponent,
    primes::{is_probable_prime, random_prime_with_bits, PRIME_SEARCH_MAX},
    utils::{byte_len, int_to_bytes, random_bn_in_range, CRYPTOGRAPHIC_RETRY_MAX},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use tracing::{error, info, instrument};
use zeroize::Zeroize;

/// Smallest accepted bit length for the group order `q`.
pub const MIN_Q_BITS: usize = 8;

/// The cofactor `k` in `p = k·q + 1` is drawn from `[2, 2 + MAX_COFACTOR)`.
const MAX_COFACTOR: u64 = 1 << 32;

/// An element of the multiplicative subgroup of order `q` inside `Z_p^*`.
///
/// Membership in the subgroup is assumed, not checked on every operation.
/// Equality requires identical `(p, q)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct GroupElement {
    value: BigNumber,
    p: BigNumber,
    q: BigNumber,
}

impl GroupElement {
    /// Wrap `value mod p` as an element of the order-`q` subgroup of `Z_p^*`.
    ///
    /// Fails if the reduced value is zero, which is not a unit.
    pub fn new(value: &BigNumber, p: &BigNumber, q: &BigNumber) -> Result<Self> {
        if p <= &BigNumber::from(2u64) || q < &BigNumber::from(2u64) {
            error!("Group modulus and order are out of range");
            Err(CallerError::InvalidParameter)?
        }
        let value = value.nmod(p);
        if value == BigNumber::zero() {
            error!("Zero is not an element of the multiplicative group");
            Err(CallerError::InvalidParameter)?
        }
        Ok(Self {
            value,
            p: p.clone(),
            q: q.clone(),
        })
    }

    /// The neutral element `1`.
    pub fn identity(p: &BigNumber, q: &BigNumber) -> Result<Self> {
        Self::new(&BigNumber::one(), p, q)
    }

    pub fn value(&self) -> &BigNumber {
        &self.value
    }

    /// The modulus `p` of the ambient group `Z_p^*`.
    pub fn modulus(&self) -> &BigNumber {
        &self.p
    }

    /// The order `q` of the subgroup.
    pub fn order(&self) -> &BigNumber {
        &self.q
    }

    pub fn is_identity(&self) -> bool {
        self.value == BigNumber::one()
    }

    /// Fixed-width big-endian encoding, `⌈bitlen(p) / 8⌉` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        int_to_bytes(&self.value, byte_len(&self.p))
    }

    fn check_same_group(&self, other: &Self) -> Result<()> {
        if self.p != other.p || self.q != other.q {
            error!("Tried to combine elements of two different groups");
            Err(CallerError::GroupMismatch)?
        }
        Ok(())
    }

    /// The group operation, `self · other mod p`.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.check_same_group(other)?;
        Ok(Self {
            value: self.value.modmul(&other.value, &self.p),
            p: self.p.clone(),
            q: self.q.clone(),
        })
    }

    /// Raise `self` to an exponent, reduced modulo the group order `q`.
    ///
    /// Field-valued exponents must come from `F_q`.
    pub fn pow<'a>(&self, exponent: impl Into<Exponent<'a>>) -> Result<Self> {
        let e = match exponent.into() {
            Exponent::Integer(e) => e.nmod(&self.q),
            Exponent::Field(e) => {
                if e.modulus() != &self.q {
                    error!("Exponent field does not match the group order");
                    Err(CallerError::FieldMismatch)?
                }
                e.value().clone()
            }
        };
        Ok(Self {
            value: self.value.modpow(&e, &self.p),
            p: self.p.clone(),
            q: self.q.clone(),
        })
    }
}

impl PartialOrd for GroupElement {
    /// Compares the stored representatives. Elements of different groups are
    /// unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.p != other.p || self.q != other.q {
            return None;
        }
        Some(self.value.cmp(&other.value))
    }
}

impl fmt::Display for GroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Public parameters of the discrete-log setting: primes `p` and `q` with
/// `q | p - 1`, and a generator `g` of the order-`q` subgroup of `Z_p^*`.
///
/// Created once and shared read-only by signers and verifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    p: BigNumber,
    q: BigNumber,
    g: GroupElement,
    p_len: usize,
    q_len: usize,
}

impl Parameters {
    /// Validate and bundle externally supplied parameters.
    pub fn new(p: &BigNumber, q: &BigNumber, g: &BigNumber) -> Result<Self> {
        if !is_probable_prime(p) || !is_probable_prime(q) {
            error!("Group parameters p and q must both be prime");
            Err(CallerError::InvalidParameter)?
        }
        if (p - &BigNumber::one()).nmod(q) != BigNumber::zero() {
            error!("Group order q does not divide p - 1");
            Err(CallerError::InvalidParameter)?
        }
        let g = GroupElement::new(g, p, q)?;
        // `pow` reduces exponents mod q, so the order check needs the raw
        // modular exponentiation.
        if g.is_identity() || g.value().modpow(q, p) != BigNumber::one() {
            error!("g does not generate the subgroup of order q");
            Err(CallerError::InvalidParameter)?
        }
        Ok(Self::from_parts(p.clone(), q.clone(), g))
    }

    fn from_parts(p: BigNumber, q: BigNumber, g: GroupElement) -> Self {
        let p_len = byte_len(&p);
        let q_len = byte_len(&q);
        Self {
            p,
            q,
            g,
            p_len,
            q_len,
        }
    }

    /// Generate fresh parameters with a `q_bits`-bit group order.
    pub fn generate<R: RngCore + CryptoRng>(q_bits: usize, rng: &mut R) -> Result<Self> {
        generate_parameters(q_bits, rng)
    }

    pub fn p(&self) -> &BigNumber {
        &self.p
    }

    pub fn q(&self) -> &BigNumber {
        &self.q
    }

    pub fn g(&self) -> &GroupElement {
        &self.g
    }

    /// Width in bytes of an encoded group element.
    pub fn p_len(&self) -> usize {
        self.p_len
    }

    /// Width in bytes of an encoded field element.
    pub fn q_len(&self) -> usize {
        self.q_len
    }

    /// The neutral element of the group.
    pub fn identity(&self) -> Result<GroupElement> {
        GroupElement::identity(&self.p, &self.q)
    }

    /// Serialize the parameters for distribution to verifiers.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize!(self)
    }

    /// Parse and re-validate serialized parameters.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let parsed: Parameters = deserialize!(bytes)?;
        Self::new(&parsed.p, &parsed.q, parsed.g.value())
    }
}

/// Generate Schnorr-style group parameters with a `q_bits`-bit prime order.
///
/// 1. Draw a random `q_bits`-bit prime `q`.
/// 2. Draw cofactors `k ≥ 2` until `p = k·q + 1` is prime.
/// 3. Draw bases `a ∈ [2, p - 2]` until `g = a^k mod p ≠ 1`.
#[instrument(skip_all, err(Debug))]
pub fn generate_parameters<R: RngCore + CryptoRng>(q_bits: usize, rng: &mut R) -> Result<Parameters> {
    if q_bits < MIN_Q_BITS {
        error!("q_bits must be at least {MIN_Q_BITS}, got {q_bits}");
        Err(CallerError::InvalidParameter)?
    }
    let q = random_prime_with_bits(q_bits, rng)?;

    let k_low = BigNumber::from(2u64);
    let k_high = &k_low + &BigNumber::from(MAX_COFACTOR);
    let mut found = None;
    for _ in 0..PRIME_SEARCH_MAX {
        let k = random_bn_in_range(rng, &k_low, &k_high)?;
        let p = &k * &q + BigNumber::one();
        if is_probable_prime(&p) {
            found = Some((k, p));
            break;
        }
    }
    let (k, p) = found.ok_or_else(|| {
        error!("Failed to find a prime p = k·q + 1");
        CallerError::RetryFailed
    })?;

    let a_low = BigNumber::from(2u64);
    let a_high = &p - &BigNumber::one();
    let mut generator = None;
    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        let a = random_bn_in_range(rng, &a_low, &a_high)?;
        let g = a.modpow(&k, &p);
        if g != BigNumber::one() {
            generator = Some(g);
            break;
        }
    }
    let g = generator.ok_or_else(|| {
        error!("Failed to find a generator of the order-q subgroup");
        CallerError::RetryFailed
    })?;

    let g = GroupElement::new(&g, &p, &q)?;
    let params = Parameters::from_parts(p, q, g);
    info!(
        "Generated group parameters with {}-byte p and {}-byte q",
        params.p_len, params.q_len
    );
    Ok(params)
}
