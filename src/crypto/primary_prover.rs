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
//! Primary proof builder (spec §4.4): witness re-randomization and the
//! Fiat-Shamir commitments/responses for selective disclosure plus `>=`
//! range predicates. Grounded on indy-sdk's prover-side equal/predicate
//! proof construction and on `prover.py`'s `_prepareProof` or bit ordering.

use std::collections::BTreeMap;

use num_bigint_dig::BigInt;
use num_integer::Integer;

use crate::application::datatypes::{
    AttributeValues, PredicateGE, PrimaryClaim, PrimaryEqualProof, PrimaryPredicateGEProof,
    PrimaryProof, PublicKey,
};
use crate::constants::*;
use crate::crypto::bignumber::{rand_bits, BigNumber};
use crate::crypto::hash_utils::four_squares;
use crate::error::CoreResult;

/// A re-randomized CL signature: `A' = A * S^{r'} mod N`, `e' = e - 2^E_START`,
/// `v' = v - e * r'`. Any valid `(A, e, v)` maps to infinitely many
/// equivalent `(A', e', v')` triples; this is what lets the prover reveal a
/// signature without revealing the one the issuer actually produced.
pub struct RandomizedClaim {
    pub a_prime: BigNumber,
    pub e_prime: BigNumber,
    pub v_prime: BigNumber,
}

pub fn randomize_claim(pk: &PublicKey, claim: &PrimaryClaim) -> RandomizedClaim {
    let n = &pk.n.0;
    let r_prime = rand_bits(LARGE_VPRIME);
    let a_prime = (&claim.a.0 * crate::crypto::bignumber::mod_pow(&pk.s.0, &r_prime, n)).mod_floor(n);
    let e_start = BigInt::from(2u32).pow(LARGE_E_START as u32);
    let e_prime = &claim.e.0 - &e_start;
    let v_prime = &claim.v.0 - &claim.e.0 * &r_prime;
    RandomizedClaim {
        a_prime,
        e_prime,
        v_prime,
    }
}

/// All the blinds sampled for one claim's equality sub-proof, kept until
/// the shared challenge `cH` is known.
pub struct EqualProofBlinds {
    pub e_tilde: BigNumber,
    pub v_tilde: BigNumber,
    pub m_tilde: BTreeMap<String, BigNumber>,
    pub m2_tilde: BigNumber,
}

/// Builds `T_eq` and the blinds behind it (spec §4.4 "Commitments (T) and
/// blinds"). `m1_tilde` is sampled once by the orchestrator and shared
/// across every claim in a presentation, per Design Notes §9.
pub fn init_eq_proof(
    pk: &PublicKey,
    randomized: &RandomizedClaim,
    attributes: &AttributeValues,
    revealed_attr_names: &[String],
    m1_tilde: &BigNumber,
) -> (BigNumber, EqualProofBlinds) {
    let n = &pk.n.0;
    let e_tilde = rand_bits(LARGE_ETILDE);
    let v_tilde = rand_bits(LARGE_VTILDE);
    let m2_tilde = rand_bits(LARGE_M2_TILDE);

    let mut m_tilde = BTreeMap::new();
    let mut t = crate::crypto::bignumber::mod_pow(&randomized.a_prime, &e_tilde, n);
    t = (&t * crate::crypto::bignumber::mod_pow(&pk.s.0, &v_tilde, n)).mod_floor(n);
    t = (&t * crate::crypto::bignumber::mod_pow(&pk.rctxt.0, &m2_tilde, n)).mod_floor(n);
    t = (&t * crate::crypto::bignumber::mod_pow(&pk.rms.0, m1_tilde, n)).mod_floor(n);

    for (name, _) in attributes {
        if revealed_attr_names.contains(name) {
            continue;
        }
        let base = pk.r.get(name).expect("every attribute has a public base");
        let blind = rand_bits(LARGE_MTILDE);
        t = (&t * crate::crypto::bignumber::mod_pow(&base.0, &blind, n)).mod_floor(n);
        m_tilde.insert(name.clone(), blind);
    }

    (
        t,
        EqualProofBlinds {
            e_tilde,
            v_tilde,
            m_tilde,
            m2_tilde,
        },
    )
}

/// Finalizes the equality proof once `cH` is known: `e^ = e~ + cH*e'`,
/// `v^ = v~ + cH*v'`, `m^_k = m~_k + cH*a_k`, `m1^ = m1~ + cH*ms`,
/// `m2^ = m2~ + cH*m2`.
#[allow(clippy::too_many_arguments)]
pub fn finalize_eq_proof(
    c_h: &BigNumber,
    randomized: &RandomizedClaim,
    blinds: &EqualProofBlinds,
    attributes: &AttributeValues,
    revealed_attr_names: &[String],
    m1_tilde: &BigNumber,
    ms: &BigNumber,
    m2: &BigNumber,
) -> PrimaryEqualProof {
    let e_hat = &blinds.e_tilde + c_h * &randomized.e_prime;
    let v_hat = &blinds.v_tilde + c_h * &randomized.v_prime;
    let m1_hat = m1_tilde + c_h * ms;
    let m2_hat = &blinds.m2_tilde + c_h * m2;

    let mut m_hat = BTreeMap::new();
    let mut revealed_attrs = BTreeMap::new();
    for (name, value) in attributes {
        if revealed_attr_names.contains(name) {
            revealed_attrs.insert(name.clone(), value.encoded.0.clone());
        } else if let Some(tilde) = blinds.m_tilde.get(name) {
            m_hat.insert(name.clone(), tilde + c_h * &value.encoded.0);
        }
    }

    PrimaryEqualProof {
        revealed_attrs,
        a_prime: randomized.a_prime.clone(),
        e_hat,
        v_hat,
        m_hat,
        m1_hat,
        m2_hat,
    }
}

/// Blinds sampled for one `>=` predicate's four-square proof.
pub struct GeProofBlinds {
    pub u: [BigNumber; 4],
    pub r: [BigNumber; 4],
    pub u_tilde: [BigNumber; 4],
    pub r_tilde: [BigNumber; 4],
    pub alpha_tilde: BigNumber,
    pub r4: BigNumber,
}

/// Decomposes `delta = attr_value - threshold` into four squares and
/// commits `T_i = Z^{u_i} S^{r_i}`, `T_delta = Z^{delta} S^{r4}` (spec §4.4
/// "Predicate (≥) proof"). Returns `delta` itself (needed only to know its
/// sign — `four_squares` already rejects a negative gap), the four `T_i`
/// commitments, and `T_delta`.
pub fn init_ge_proof(
    pk: &PublicKey,
    predicate: &PredicateGE,
    attr_value: i64,
) -> CoreResult<(BigNumber, [BigNumber; 4], BigNumber, GeProofBlinds)> {
    let n = &pk.n.0;
    let delta = BigInt::from(attr_value) - BigInt::from(predicate.value);
    let u = four_squares(&delta)?;
    let r: [BigNumber; 4] = std::array::from_fn(|_| rand_bits(LARGE_VPRIME));
    let r4 = rand_bits(LARGE_VPRIME);

    let t_list: [BigNumber; 4] = std::array::from_fn(|i| {
        (crate::crypto::bignumber::mod_pow(&pk.z.0, &u[i], n)
            * crate::crypto::bignumber::mod_pow(&pk.s.0, &r[i], n))
        .mod_floor(n)
    });
    let t_delta = (crate::crypto::bignumber::mod_pow(&pk.z.0, &delta, n)
        * crate::crypto::bignumber::mod_pow(&pk.s.0, &r4, n))
    .mod_floor(n);

    let u_tilde: [BigNumber; 4] = std::array::from_fn(|_| rand_bits(LARGE_MTILDE));
    let r_tilde: [BigNumber; 4] = std::array::from_fn(|_| rand_bits(LARGE_VPRIME));
    let alpha_tilde = rand_bits(LARGE_VTILDE);

    Ok((
        delta,
        t_list,
        t_delta,
        GeProofBlinds {
            u,
            r,
            u_tilde,
            r_tilde,
            alpha_tilde,
            r4,
        },
    ))
}

/// Finalizes a `>=` predicate proof once `cH` is known. `t`/`t_delta` are
/// the actual commitments `T_0..T_3`/`T_Delta` the verifier recomputes
/// against (spec §4.5) — never the raw `delta` exponent, which would leak
/// the hidden attribute's distance from the threshold.
pub fn finalize_ge_proof(
    c_h: &BigNumber,
    predicate: &PredicateGE,
    t: &[BigNumber; 4],
    t_delta: &BigNumber,
    blinds: &GeProofBlinds,
) -> PrimaryPredicateGEProof {
    let u_hat: [BigNumber; 4] = std::array::from_fn(|i| &blinds.u_tilde[i] + c_h * &blinds.u[i]);
    let r_hat: [BigNumber; 4] = std::array::from_fn(|i| &blinds.r_tilde[i] + c_h * &blinds.r[i]);
    let r_sum = r_hat[0].clone() + &r_hat[1] + &r_hat[2] + &r_hat[3];
    let alpha_hat = &blinds.alpha_tilde + c_h * (&blinds.r4 - r_sum);

    let mut t_map = BTreeMap::new();
    for (i, ti) in t.iter().enumerate() {
        t_map.insert(format!("u{}", i), ti.clone());
    }
    t_map.insert("delta".to_string(), t_delta.clone());

    PrimaryPredicateGEProof {
        u_hat,
        r_hat,
        alpha_hat,
        predicate: predicate.clone(),
        t: t_map,
    }
}

/// Assembles an equality proof and zero or more predicate proofs into one
/// `PrimaryProof`.
pub fn assemble_primary_proof(
    eq_proof: PrimaryEqualProof,
    ge_proofs: Vec<PrimaryPredicateGEProof>,
) -> PrimaryProof {
    PrimaryProof { eq_proof, ge_proofs }
}
