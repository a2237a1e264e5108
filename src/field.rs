// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Arithmetic in the prime field `F_q = Z/qZ`.

use crate::{
    errors::{CallerError, Result},
    utils::{byte_len, int_to_bytes, random_positive_bn},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use tracing::error;
use zeroize::Zeroize;

/// Smallest modulus accepted for a field.
pub const MIN_FIELD_MODULUS: u64 = 2;

/// An exponent for [`FieldElement::pow`] and
/// [`GroupElement::pow`](crate::group::GroupElement::pow).
///
/// Exponents are either plain integers or elements of a field; both are
/// normalized to a single integer at the call boundary.
#[derive(Clone, Copy, Debug)]
pub enum Exponent<'a> {
    Integer(&'a BigNumber),
    Field(&'a FieldElement),
}

impl<'a> From<&'a BigNumber> for Exponent<'a> {
    fn from(e: &'a BigNumber) -> Self {
        Exponent::Integer(e)
    }
}

impl<'a> From<&'a FieldElement> for Exponent<'a> {
    fn from(e: &'a FieldElement) -> Self {
        Exponent::Field(e)
    }
}

/// An element of `F_q`.
///
/// The stored value is always the canonical representative in `[0, q)`.
/// Equality and ordering compare that representative; ordering carries no
/// algebraic meaning and is only defined between elements of the same field.
///
/// Note that this type derives [`Debug`]; when it holds a secret it should be
/// wrapped in a type that redacts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct FieldElement {
    value: BigNumber,
    modulus: BigNumber,
}

impl FieldElement {
    /// Reduce `value` into the field with modulus `modulus`.
    pub fn new(value: &BigNumber, modulus: &BigNumber) -> Result<Self> {
        if modulus < &BigNumber::from(MIN_FIELD_MODULUS) {
            error!("Field modulus must be at least {MIN_FIELD_MODULUS}");
            Err(CallerError::InvalidParameter)?
        }
        Ok(Self {
            value: value.nmod(modulus),
            modulus: modulus.clone(),
        })
    }

    pub fn from_u64(value: u64, modulus: &BigNumber) -> Result<Self> {
        Self::new(&BigNumber::from(value), modulus)
    }

    pub fn zero(modulus: &BigNumber) -> Result<Self> {
        Self::new(&BigNumber::zero(), modulus)
    }

    pub fn one(modulus: &BigNumber) -> Result<Self> {
        Self::new(&BigNumber::one(), modulus)
    }

    /// Sample an element uniformly at random from `F_q`.
    pub fn random<R: RngCore + CryptoRng>(modulus: &BigNumber, rng: &mut R) -> Result<Self> {
        if modulus < &BigNumber::from(MIN_FIELD_MODULUS) {
            error!("Field modulus must be at least {MIN_FIELD_MODULUS}");
            Err(CallerError::InvalidParameter)?
        }
        Ok(Self {
            value: random_positive_bn(rng, modulus),
            modulus: modulus.clone(),
        })
    }

    /// The canonical representative in `[0, q)`.
    pub fn value(&self) -> &BigNumber {
        &self.value
    }

    pub fn modulus(&self) -> &BigNumber {
        &self.modulus
    }

    pub fn is_zero(&self) -> bool {
        self.value == BigNumber::zero()
    }

    /// Width of the canonical encoding, `⌈bitlen(q) / 8⌉`.
    pub fn byte_len(&self) -> usize {
        byte_len(&self.modulus)
    }

    /// Fixed-width big-endian encoding of the canonical representative.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        int_to_bytes(&self.value, self.byte_len())
    }

    fn check_same_field(&self, other: &Self) -> Result<()> {
        if self.modulus != other.modulus {
            error!("Tried to combine elements of two different fields");
            Err(CallerError::FieldMismatch)?
        }
        Ok(())
    }

    fn with_value(&self, value: BigNumber) -> Self {
        Self {
            value,
            modulus: self.modulus.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_field(other)?;
        Ok(self.with_value(self.value.modadd(&other.value, &self.modulus)))
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_same_field(other)?;
        Ok(self.with_value(self.value.modsub(&other.value, &self.modulus)))
    }

    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.check_same_field(other)?;
        Ok(self.with_value(self.value.modmul(&other.value, &self.modulus)))
    }

    /// Compute `self / other`, i.e. `self * other^{-1}`.
    pub fn div(&self, other: &Self) -> Result<Self> {
        self.check_same_field(other)?;
        self.mul(&other.inverse()?)
    }

    pub fn neg(&self) -> Self {
        self.with_value(self.value.modneg(&self.modulus))
    }

    /// Multiplicative inverse; fails with [`CallerError::DivisionByZero`] on
    /// zero.
    pub fn inverse(&self) -> Result<Self> {
        if self.is_zero() {
            error!("Tried to invert the zero element");
            Err(CallerError::DivisionByZero)?
        }
        let inverse = self.value.invert(&self.modulus).ok_or_else(|| {
            // Only reachable if the modulus is not prime.
            error!("Element has no inverse modulo the field modulus");
            CallerError::DivisionByZero
        })?;
        Ok(self.with_value(inverse))
    }

    /// Raise `self` to an integer or field-valued exponent.
    ///
    /// A negative integer exponent inverts the base first, so raising zero to
    /// a negative power fails with [`CallerError::DivisionByZero`].
    pub fn pow<'a>(&self, exponent: impl Into<Exponent<'a>>) -> Result<Self> {
        let (base, e) = match exponent.into() {
            Exponent::Field(e) => {
                self.check_same_field(e)?;
                (self.clone(), e.value.clone())
            }
            Exponent::Integer(e) if e < &BigNumber::zero() => {
                (self.inverse()?, BigNumber::zero() - e)
            }
            Exponent::Integer(e) => (self.clone(), e.clone()),
        };
        Ok(self.with_value(base.value.modpow(&e, &self.modulus)))
    }

    /// Bitwise AND of the canonical representatives, reduced into the field.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.bitwise(other, |a, b| a & b)
    }

    /// Bitwise OR of the canonical representatives, reduced into the field.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.bitwise(other, |a, b| a | b)
    }

    fn bitwise(&self, other: &Self, op: impl Fn(u8, u8) -> u8) -> Result<Self> {
        self.check_same_field(other)?;
        let lhs = self.to_bytes()?;
        let rhs = other.to_bytes()?;
        let bytes: Vec<u8> = lhs.iter().zip(rhs.iter()).map(|(a, b)| op(*a, *b)).collect();
        Ok(self.with_value(BigNumber::from_slice(bytes).nmod(&self.modulus)))
    }
}

impl PartialOrd for FieldElement {
    /// Compares canonical representatives. Elements of different fields are
    /// unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.modulus != other.modulus {
            return None;
        }
        Some(self.value.cmp(&other.value))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::InternalError, utils::testing::init_testing};

    fn fq(value: u64, q: u64) -> FieldElement {
        FieldElement::from_u64(value, &BigNumber::from(q)).unwrap()
    }

    #[test]
    fn construction_reduces_values() {
        let q = BigNumber::from(13u64);
        assert_eq!(FieldElement::from_u64(27, &q).unwrap(), fq(1, 13));
        let minus_one = BigNumber::zero() - BigNumber::one();
        assert_eq!(FieldElement::new(&minus_one, &q).unwrap(), fq(12, 13));
    }

    #[test]
    fn tiny_moduli_are_rejected() {
        for q in [0u64, 1] {
            assert_eq!(
                FieldElement::from_u64(0, &BigNumber::from(q)),
                Err(InternalError::CallingApplicationMistake(
                    CallerError::InvalidParameter
                ))
            );
        }
        assert!(FieldElement::from_u64(1, &BigNumber::from(2u64)).is_ok());
    }

    #[test]
    fn field_axioms_hold() {
        let mut rng = init_testing();
        for q in [2u64, 3, 13, 65521] {
            let q = BigNumber::from(q);
            let zero = FieldElement::zero(&q).unwrap();
            let one = FieldElement::one(&q).unwrap();
            for _ in 0..50 {
                let a = FieldElement::random(&q, &mut rng).unwrap();
                let b = FieldElement::random(&q, &mut rng).unwrap();

                assert_eq!(a.add(&b).unwrap().sub(&b).unwrap(), a);
                assert_eq!(a.add(&a.neg()).unwrap(), zero);
                assert_eq!(a.mul(&b).unwrap(), b.mul(&a).unwrap());

                if !a.is_zero() {
                    assert_eq!(a.mul(&a.inverse().unwrap()).unwrap(), one);
                    assert_eq!(a.div(&a).unwrap(), one);
                }
            }
        }
    }

    #[test]
    fn inverting_zero_fails() {
        let zero = fq(0, 13);
        assert_eq!(
            zero.inverse(),
            Err(InternalError::CallingApplicationMistake(
                CallerError::DivisionByZero
            ))
        );
        assert!(fq(5, 13).div(&zero).is_err());
        assert!(zero.pow(&(BigNumber::zero() - BigNumber::one())).is_err());
    }

    #[test]
    fn mixing_fields_fails() {
        let a = fq(3, 13);
        let b = fq(3, 17);
        let mismatch = Err(InternalError::CallingApplicationMistake(
            CallerError::FieldMismatch,
        ));
        assert_eq!(a.add(&b), mismatch);
        assert_eq!(a.sub(&b), mismatch);
        assert_eq!(a.mul(&b), mismatch);
        assert_eq!(a.div(&b), mismatch);
        assert_eq!(a.pow(&b), mismatch);
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn pow_accepts_integer_and_field_exponents() {
        let a = fq(3, 13);
        assert_eq!(a.pow(&BigNumber::from(3u64)).unwrap(), fq(1, 13));
        assert_eq!(a.pow(&fq(2, 13)).unwrap(), fq(9, 13));
        assert_eq!(a.pow(&BigNumber::zero()).unwrap(), fq(1, 13));
        // 3^{-1} = 9 (mod 13)
        let minus_one = BigNumber::zero() - BigNumber::one();
        assert_eq!(a.pow(&minus_one).unwrap(), fq(9, 13));
    }

    #[test]
    fn ordering_uses_canonical_representatives() {
        assert!(fq(2, 13) < fq(5, 13));
        assert!(fq(12, 13) > fq(0, 13));
        // 14 reduces to 1.
        assert!(fq(14, 13) < fq(2, 13));
    }

    #[test]
    fn encoding_is_fixed_width_big_endian() {
        let q = BigNumber::from(65521u64);
        let a = FieldElement::from_u64(5, &q).unwrap();
        assert_eq!(a.byte_len(), 2);
        assert_eq!(a.to_bytes().unwrap(), vec![0, 5]);
        assert_eq!(FieldElement::zero(&q).unwrap().to_bytes().unwrap(), vec![0, 0]);
    }

    #[test]
    fn bitwise_operations_match_integers() {
        assert_eq!(fq(0b1100, 251).and(&fq(0b1010, 251)).unwrap(), fq(0b1000, 251));
        assert_eq!(fq(0b1100, 251).or(&fq(0b1010, 251)).unwrap(), fq(0b1110, 251));
        assert!(fq(1, 251).and(&fq(1, 13)).is_err());
    }

    #[test]
    fn random_elements_are_reduced() {
        let mut rng = init_testing();
        let q = BigNumber::from(7u64);
        for _ in 0..100 {
            let a = FieldElement::random(&q, &mut rng).unwrap();
            assert!(a.value() < &q);
        }
    }
}
