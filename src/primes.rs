// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Prime sampling used by group parameter generation.
//!
//! Primality testing is delegated to the big-integer backend
//! ([`BigNumber::is_prime`]); this module only wraps it with bounded
//! rejection sampling.

use crate::{
    errors::{CallerError, Result},
    utils::random_bn_in_range,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use tracing::error;

/// Upper bound on candidates drawn when searching for a prime.
///
/// Primes near `2^k` have density about `1 / (0.69 k)`, so for the sizes used
/// here the search finishes after a few hundred candidates at most.
pub(crate) const PRIME_SEARCH_MAX: usize = 100_000usize;

/// Returns `true` if `n` is (probably) prime.
pub fn is_probable_prime(n: &BigNumber) -> bool {
    if n < &BigNumber::from(2u64) {
        return false;
    }
    n.is_prime()
}

/// Sample a uniformly random prime from `[low, high)`.
pub fn random_prime<R: RngCore + CryptoRng>(
    low: &BigNumber,
    high: &BigNumber,
    rng: &mut R,
) -> Result<BigNumber> {
    for _ in 0..PRIME_SEARCH_MAX {
        let candidate = random_bn_in_range(rng, low, high)?;
        if is_probable_prime(&candidate) {
            return Ok(candidate);
        }
    }
    error!("Failed to find a prime in the requested range");
    Err(CallerError::RetryFailed)?
}

/// Sample a random prime of exactly `bits` bits.
pub fn random_prime_with_bits<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<BigNumber> {
    if bits < 2 {
        error!("Cannot sample a {bits}-bit prime");
        Err(CallerError::InvalidParameter)?
    }
    let low = BigNumber::one() << (bits - 1);
    let high = BigNumber::one() << bits;
    random_prime(&low, &high, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{byte_len, testing::init_testing};

    #[test]
    fn small_primes_are_recognized() {
        let primes = [2u64, 3, 5, 7, 11, 65537];
        let composites = [0u64, 1, 4, 9, 15, 65535];
        for p in primes {
            assert!(is_probable_prime(&BigNumber::from(p)), "{p} is prime");
        }
        for c in composites {
            assert!(!is_probable_prime(&BigNumber::from(c)), "{c} is composite");
        }
    }

    #[test]
    fn random_prime_has_requested_size() {
        let mut rng = init_testing();
        for bits in [8usize, 16, 64] {
            let p = random_prime_with_bits(bits, &mut rng).unwrap();
            assert!(is_probable_prime(&p));
            assert!(p >= BigNumber::one() << (bits - 1));
            assert!(p < BigNumber::one() << bits);
            assert_eq!(byte_len(&p), (bits + 7) / 8);
        }
    }

    #[test]
    fn empty_range_has_no_prime() {
        let mut rng = init_testing();
        // [24, 29) contains no primes.
        let result = random_prime(&BigNumber::from(24u64), &BigNumber::from(29u64), &mut rng);
        assert!(result.is_err());
        assert!(random_prime_with_bits(1, &mut rng).is_err());
    }
}
