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
//! Protocol bit-length constants (spec §4.12). These must not change without
//! breaking interoperability with any other implementation of this protocol.

/// Bit length of the safe primes p, q making up the signer's RSA modulus N.
pub const LARGE_PRIME: usize = 1024;
/// Bit length of the prover's master secret.
pub const LARGE_MASTER_SECRET: usize = 256;
/// Bit length of v' (the prover's blinding contribution to v).
pub const LARGE_VPRIME: usize = 2724;
/// Bit length of v'' (the issuer's blinding contribution to v).
pub const LARGE_VPRIME_PRIME: usize = 2724;
/// Start of the half-open range primes e are drawn from: [2^E_START, 2^E_START + 2^E_END).
pub const LARGE_E_START: usize = 596;
/// Width (in bits) of the e range above LARGE_E_START.
pub const LARGE_E_END: usize = 119;
/// Bit length of the e~ blind sampled during proof construction.
pub const LARGE_ETILDE: usize = 456;
/// Bit length of the v~ blind sampled during proof construction.
pub const LARGE_VTILDE: usize = 3060;
/// Bit length of the m~_k blinds sampled for hidden/unrevealed attributes.
pub const LARGE_MTILDE: usize = 593;
/// Bit length of the m2~ blind for the context attribute.
pub const LARGE_M2_TILDE: usize = 593;
/// Bit length of the Fiat-Shamir challenge cH.
pub const LARGE_NONCE: usize = 80;

/// Bound for the randomly generated, non-zero context attribute m2.
pub const LARGE_CONTEXT_ATTR: usize = LARGE_MASTER_SECRET;
