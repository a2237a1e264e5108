// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A signature scheme built from an MPC-in-the-Head proof of knowledge of a
//! discrete logarithm.
//!
//! The signer knows `x ∈ F_q` with `y = g^x` in the order-`q` subgroup of
//! `Z_p^*`. Each signature runs `m` rounds of a simulated `n`-party
//! computation on additive shares of `x`, commits to every party's view, and
//! opens all but one party per round. The hidden parties are derived from a
//! hash of the message and all commitments (Fiat-Shamir).
//!
//! A classical Schnorr signature over the same group is provided in
//! [`schnorr`] as a reference.
//!
//! # Example
//! ```no_run
//! use mpcith_dlog::{generate_parameters, keygen, rounds_for_security, sign, verify_signature};
//!
//! # fn main() -> mpcith_dlog::errors::Result<()> {
//! let mut rng = rand::thread_rng();
//! let params = generate_parameters(160, &mut rng)?;
//! let key_pair = keygen(&params, &mut rng)?;
//!
//! let n = 5;
//! let m = rounds_for_security(n, 128)?;
//! let sig = sign(b"Hello", key_pair.secret(), &params, n, m, &mut rng)?;
//! assert!(verify_signature(&sig, b"Hello", &params, key_pair.public()));
//! # Ok(())
//! # }
//! ```
//!
//! # ⚠️ Security warning
//! Arithmetic is not constant time and the group parameters are small
//! prime-order subgroups of `Z_p^*` chosen by the caller. This crate is meant
//! for experimentation, not for protecting production keys.

#![warn(unused_results)]
#![warn(future_incompatible)]

/// Serialize a value with `bincode`, mapping failures to
/// [`InternalError::Serialization`](crate::errors::InternalError::Serialization).
macro_rules! serialize {
    ($x:expr) => {{
        bincode::serialize($x).map_err(|_| crate::errors::InternalError::Serialization)
    }};
}

/// Deserialize a value with `bincode`, mapping failures to
/// [`CallerError::DeserializationFailed`](crate::errors::CallerError::DeserializationFailed).
macro_rules! deserialize {
    ($x:expr) => {{
        bincode::deserialize($x).map_err(|_| {
            crate::errors::InternalError::from(crate::errors::CallerError::DeserializationFailed)
        })
    }};
}

pub mod errors;
pub mod field;
pub mod group;
pub mod keygen;
pub mod mpcith;
pub mod primes;
pub mod schnorr;
pub mod sharing;
mod utils;

pub use field::FieldElement;
pub use group::{generate_parameters, GroupElement, Parameters};
pub use keygen::{keygen, KeyPair};
pub use mpcith::{
    rounds_for_security, sign, soundness_bits, verify_signature, MpcithProof, WholeSignature,
};
pub use schnorr::{schnorr_sign, schnorr_verify, SchnorrSignature};
pub use sharing::{FieldShare, GroupShare};
