// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Additive secret sharing over `F_q` and its lift into the group.

use crate::{
    errors::{CallerError, Result},
    field::FieldElement,
    group::GroupElement,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use std::{fmt::Debug, ops::Index};
use tracing::error;
use zeroize::ZeroizeOnDrop;

/// Smallest number of shares a secret may be split into.
pub const MIN_SHARES: usize = 2;

/// An additive sharing `s_1, ..., s_n` of a secret in `F_q`.
///
/// The shares summed to the secret when the sharing was created; this is not
/// re-checked afterwards.
#[derive(Clone, ZeroizeOnDrop, PartialEq, Eq)]
pub struct FieldShare {
    shares: Vec<FieldElement>,
    modulus: BigNumber,
}

impl Debug for FieldShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldShare")
            .field("n", &self.shares.len())
            .field("shares", &"[redacted]")
            .finish()
    }
}

impl FieldShare {
    /// Split `secret mod q` into `n` additive shares.
    ///
    /// The first `n - 1` shares are uniformly random; the last one is
    /// `secret - Σ s_i mod q`.
    pub fn additive_secret_sharing<R: RngCore + CryptoRng>(
        secret: &BigNumber,
        n: usize,
        q: &BigNumber,
        rng: &mut R,
    ) -> Result<Self> {
        if n < MIN_SHARES {
            error!("Cannot split a secret into {n} shares; need at least {MIN_SHARES}");
            Err(CallerError::InvalidParameter)?
        }
        let mut shares = Vec::with_capacity(n);
        let mut sum = FieldElement::zero(q)?;
        for _ in 0..n - 1 {
            let share = FieldElement::random(q, rng)?;
            sum = sum.add(&share)?;
            shares.push(share);
        }
        shares.push(FieldElement::new(secret, q)?.sub(&sum)?);
        Ok(Self {
            shares,
            modulus: q.clone(),
        })
    }

    /// Sum all shares. This recovers the secret only if every share is
    /// present.
    pub fn reconstruct(&self) -> Result<FieldElement> {
        self.shares
            .iter()
            .try_fold(FieldElement::zero(&self.modulus)?, |sum, share| {
                sum.add(share)
            })
    }

    /// Map each share `s_i` to `g^{s_i}`.
    ///
    /// Requires the field modulus to equal the order of `g`.
    pub fn exp(&self, g: &GroupElement) -> Result<GroupShare> {
        if g.order() != &self.modulus {
            error!("Field modulus does not match the group order");
            Err(CallerError::FieldMismatch)?
        }
        let elements = self
            .shares
            .iter()
            .map(|share| g.pow(share))
            .collect::<Result<Vec<_>>>()?;
        Ok(GroupShare { elements })
    }

    pub fn shares(&self) -> &[FieldElement] {
        &self.shares
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn modulus(&self) -> &BigNumber {
        &self.modulus
    }
}

impl Index<usize> for FieldShare {
    type Output = FieldElement;

    fn index(&self, index: usize) -> &Self::Output {
        &self.shares[index]
    }
}

/// The pointwise image `g^{s_1}, ..., g^{s_n}` of a [`FieldShare`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupShare {
    elements: Vec<GroupElement>,
}

impl GroupShare {
    /// Product of all elements, in index order. Equals `g^secret` for a
    /// sharing of `secret`.
    pub fn product(&self) -> Result<GroupElement> {
        let (first, rest) = self.elements.split_first().ok_or_else(|| {
            error!("Cannot take the product of an empty share set");
            CallerError::InvalidParameter
        })?;
        rest.iter().try_fold(first.clone(), |acc, element| acc.mul(element))
    }

    pub fn elements(&self) -> &[GroupElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<GroupElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
