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
//! Cross-cutting Fiat-Shamir transcript (spec §9 "Cross-cutting random
//! oracle"): subproof builders return opaque C/Tau contributions rather than
//! writing to module-level state, and this object accumulates them in
//! schema order before the orchestrator hashes the whole thing.

use crate::crypto::bignumber::BigNumber;
use crate::crypto::hash_utils::get_hash_as_int;
use crate::crypto::pairing::{g1_to_bignumber, g2_to_bignumber, gt_to_bignumber};

use crate::application::datatypes::{NonRevocProofCList, NonRevocProofTauList};

/// Accumulates every Tau (commitment) and C (crypto-integer) value
/// contributed across every claim's primary and non-revocation sub-proof,
/// in schema-insertion order, exactly as spec §4.9 step 3 prescribes
/// ("concatenate CList and TauList in schema-order").
#[derive(Default)]
pub struct ChallengeTranscript {
    tau: Vec<BigNumber>,
    c: Vec<BigNumber>,
}

impl ChallengeTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_tau(&mut self, value: BigNumber) {
        self.tau.push(value);
    }

    pub fn push_c(&mut self, value: BigNumber) {
        self.c.push(value);
    }

    /// Folds in a primary sub-proof's contribution: `A'` as C, `T_eq` as
    /// Tau, plus every predicate's flattened `T_0..T_3, T_Delta` commitments
    /// as further Tau entries — mirroring `_getTauList`'s full-loop behavior
    /// (spec §9 open question: `_getCList` returns after its first iteration
    /// in the source, which is a bug; both lists must accumulate across every
    /// claim, as implemented here). `ge_taus` is the concatenation, in
    /// predicate order, of each predicate's five commitments.
    pub fn push_primary(&mut self, a_prime: &BigNumber, t_eq: &BigNumber, ge_taus: &[BigNumber]) {
        self.push_c(a_prime.clone());
        self.push_tau(t_eq.clone());
        for t in ge_taus {
            self.push_tau(t.clone());
        }
    }

    /// Folds in a non-revocation sub-proof's contribution: the eight tau
    /// values, plus the C-list filtered to "crypto integers" (spec §9's
    /// second open question) — the G1/G2 commitments, never the GT witness
    /// commitment `W`, which is not itself hashed directly but only through
    /// the tau values it feeds into.
    pub fn push_non_revoc(&mut self, c_list: &NonRevocProofCList, tau: &NonRevocProofTauList) {
        self.push_tau(g1_to_bignumber(&tau.t1));
        self.push_tau(g1_to_bignumber(&tau.t2));
        self.push_tau(gt_to_bignumber(&tau.t3));
        self.push_tau(gt_to_bignumber(&tau.t4));
        self.push_tau(g1_to_bignumber(&tau.t5));
        self.push_tau(g1_to_bignumber(&tau.t6));
        self.push_tau(gt_to_bignumber(&tau.t7));
        self.push_tau(gt_to_bignumber(&tau.t8));

        self.push_c(g1_to_bignumber(&c_list.e));
        self.push_c(g1_to_bignumber(&c_list.d));
        self.push_c(g1_to_bignumber(&c_list.a));
        self.push_c(g1_to_bignumber(&c_list.g));
        self.push_c(g2_to_bignumber(&c_list.w));
        self.push_c(g1_to_bignumber(&c_list.s));
        self.push_c(g1_to_bignumber(&c_list.u));
    }

    /// `H(nonce ∥ TauList ∥ CList)` (spec §4.10), folded into an integer
    /// below `2^LARGE_NONCE`.
    pub fn challenge(&self, nonce: &BigNumber) -> BigNumber {
        let mut values = Vec::with_capacity(self.tau.len() + self.c.len());
        values.extend(self.tau.iter().cloned());
        values.extend(self.c.iter().cloned());
        get_hash_as_int(nonce, &values)
    }

    /// The C-list in transcript order, as published in `AggregatedProof`.
    pub fn c_list(&self) -> &[BigNumber] {
        &self.c
    }
}
