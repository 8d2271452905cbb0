/*
  Copyright (c) 2018-present evan GmbH.

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
//! Error taxonomy (spec §7). Errors are *kinds*, not one type per failure
//! site: callers match on the enum variant, not on a string.

use thiserror::Error;

/// Top-level error returned by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed record, bit-length violation, unknown schemaId, or a
    /// mismatch between the uuid sets of a request and a proof.
    #[error("input error: {0}")]
    Input(String),

    /// A wallet or public-repository lookup found nothing for the given key,
    /// or no stored claim satisfies a requested attribute/predicate.
    #[error("not found: {0}")]
    NotFound(String),

    /// The holder's index is no longer a member of the accumulator.
    #[error("revoked: credential at index {0} is no longer in the accumulator")]
    Revoked(u32),

    /// A cryptographic precondition was violated (non-decomposable gap,
    /// non-quadratic-residue where one was required, a non-invertible
    /// element).
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Crypto-specific failures (spec §7's CryptoError kind), kept as their own
/// enum so callers can distinguish *why* the crypto layer refused to
/// proceed without parsing a string.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("{0} cannot be decomposed as a sum of four squares (negative value)")]
    NonDecomposable(String),

    #[error("element is not a quadratic residue mod N")]
    NotAQuadraticResidue,

    #[error("value has no modular inverse")]
    NotInvertible,

    #[error("failed to generate a safe prime within the configured attempt budget")]
    PrimeGenerationFailed,
}

pub type CoreResult<T> = Result<T, CoreError>;
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors surfaced by a [`crate::wallet::Wallet`] implementation.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}
pub type WalletResult<T> = Result<T, WalletError>;

/// Errors surfaced by a [`crate::repository::PublicRepository`] implementation.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}
pub type RepoResult<T> = Result<T, RepoError>;

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::NotFound(m) => CoreError::NotFound(m),
            WalletError::Storage(m) => CoreError::Input(m),
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(m) => CoreError::NotFound(m),
            RepoError::Storage(m) => CoreError::Input(m),
        }
    }
}
