// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Error types.

use thiserror::Error;

/// The default Result type used in this crate.
pub type Result<T> = std::result::Result<T, InternalError>;

/// Represents an error in the manipulation of internal cryptographic data.
#[derive(Clone, Eq, PartialEq, Error, Debug)]
pub enum InternalError {
    /// The calling application made a mistake; see the inner
    /// [`CallerError`] for details.
    #[error("Error: the calling application made a mistake: `{0}`")]
    CallingApplicationMistake(#[from] CallerError),
    #[error("Serialization Error")]
    Serialization,
    /// This indicates a bug in this crate.
    #[error("Internal invariant failed")]
    InternalInvariantFailed,
}

/// Errors that are caused by incorrect behavior by the calling application.
#[derive(Clone, Copy, Eq, PartialEq, Error, Debug)]
pub enum CallerError {
    /// Two field elements with different moduli were combined.
    #[error("Field elements come from different fields")]
    FieldMismatch,
    /// Two group elements with different `(p, q)` were combined.
    #[error("Group elements come from different groups")]
    GroupMismatch,
    /// A construction argument was out of range.
    #[error("Invalid parameter")]
    InvalidParameter,
    /// Attempted to invert the zero element of a field.
    #[error("Division by zero")]
    DivisionByZero,
    /// The message does not fit behind a 4-byte length prefix.
    #[error("Message too long")]
    MessageTooLong,
    /// A bounded sampling loop ran out of attempts.
    #[error("Exceeded maximum number of retries")]
    RetryFailed,
    #[error("Deserialization failed")]
    DeserializationFailed,
}
