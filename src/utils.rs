// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::errors::{CallerError, InternalError, Result};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use tracing::error;

pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 500usize;

/// Width in bytes of the 4-byte big-endian length prefix put in front of
/// every hashed message.
pub(crate) const MESSAGE_LENGTH_PREFIX_BYTES: usize = 4;

/// Sample a number uniformly at random from the range [0, n). This can be used
/// for sampling from a prime field `F_q` or the integers modulo `n` (for any
/// `n`).
pub(crate) fn random_positive_bn<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> BigNumber {
    BigNumber::from_rng(n, rng)
}

/// Sample a number uniformly at random from the range `[low, high)`.
pub(crate) fn random_bn_in_range<R: RngCore + CryptoRng>(
    rng: &mut R,
    low: &BigNumber,
    high: &BigNumber,
) -> Result<BigNumber> {
    if low >= high {
        error!("Cannot sample from an empty range");
        Err(CallerError::InvalidParameter)?
    }
    let width = high - low;
    Ok(low + &random_positive_bn(rng, &width))
}

/// Number of bytes needed to hold `n`, i.e. `⌈bitlen(n) / 8⌉`.
pub(crate) fn byte_len(n: &BigNumber) -> usize {
    n.to_bytes().len()
}

/// Encode a non-negative integer as exactly `len` big-endian bytes.
///
/// Fails if the value is negative or does not fit.
pub(crate) fn int_to_bytes(value: &BigNumber, len: usize) -> Result<Vec<u8>> {
    if value < &BigNumber::zero() {
        error!("Tried to encode a negative integer as fixed-width bytes");
        return Err(InternalError::InternalInvariantFailed);
    }
    let raw = value.to_bytes();
    if raw.len() > len {
        error!(
            "Integer needs {} bytes but the fixed encoding width is {}",
            raw.len(),
            len
        );
        return Err(InternalError::InternalInvariantFailed);
    }
    let mut bytes = vec![0u8; len - raw.len()];
    bytes.extend_from_slice(&raw);
    Ok(bytes)
}

/// The 4-byte big-endian length prefix for a message of `len` bytes.
///
/// Fails with [`CallerError::MessageTooLong`] for messages of `2^32` bytes or
/// more.
pub(crate) fn message_length_prefix(len: usize) -> Result<[u8; MESSAGE_LENGTH_PREFIX_BYTES]> {
    let len = u32::try_from(len).map_err(|_| {
        error!(
            "Message of {len} bytes does not fit behind a {MESSAGE_LENGTH_PREFIX_BYTES}-byte length prefix"
        );
        CallerError::MessageTooLong
    })?;
    Ok(len.to_be_bytes())
}

/// Encode a message for hashing: `len(m)` as 4 big-endian bytes, followed by
/// the raw bytes of `m`.
pub(crate) fn encode_message(message: &[u8]) -> Result<Vec<u8>> {
    let prefix = message_length_prefix(message.len())?;
    let mut bytes = Vec::with_capacity(MESSAGE_LENGTH_PREFIX_BYTES + message.len());
    bytes.extend_from_slice(&prefix);
    bytes.extend_from_slice(message);
    Ok(bytes)
}


////////////////////////////
// Test Utility Functions //
////////////////////////////
