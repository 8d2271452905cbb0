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

//! `anoncreds-core` implements the cryptographic core of an anonymous
//! credentials protocol: Camenisch-Lysyanskaya signatures over a strong-RSA
//! group for blind issuance and selective-disclosure/predicate proofs, and a
//! pairing-based dynamic accumulator for revocation.
//!
//! Three roles sit on top of the primitives here:
//!
//! - [`application::issuer::Issuer`] — schema/key publication, blind claim
//!   issuance, revocation.
//! - [`application::prover::Prover`] — claim requests, claim processing,
//!   witness refresh, and presenting a [`application::datatypes::FullProof`].
//! - [`application::verifier::Verifier`] — proof requests and verification.
//!
//! Both roles are stateless structs of associated functions; all persistent
//! state lives behind the [`wallet::Wallet`] (private) and
//! [`repository::PublicRepository`] (shared/untrusted) capability traits,
//! each with an in-memory reference implementation suitable for tests.
//!
//! No network transport, DID documents, or persistent storage backend live
//! in this crate — those are external collaborators behind the traits above.

#[macro_use]
extern crate log;

pub mod application;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod repository;
pub mod transcript;
pub mod wallet;

/// Initializes `env_logger` exactly once; safe to call from multiple tests.
pub fn init_logger() {
    let _ = env_logger::try_init();
}
