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
//! Primary proof verifier (spec §4.5): recomputes the Tau commitments a
//! `PrimaryProof` implies, given the challenge `cH` and the public key.
//! These values feed the orchestrator's transcript recomputation; they are
//! never compared directly against anything the prover sent — acceptance
//! hinges entirely on `H(nonce, Tau^, C) == cH` (spec §4.9).

use std::collections::BTreeMap;

use num_integer::Integer;

use crate::application::datatypes::{AttributeInfo, PrimaryEqualProof, PrimaryPredicateGEProof, PublicKey};
use crate::crypto::bignumber::{mod_inverse, mod_pow, BigNumber};
use crate::error::{CoreError, CoreResult};

/// Recomputes `T_eq^` from the equality proof's responses and the revealed
/// attribute values:
/// `T_eq^ = A'^{e^} Rms^{m1^} Rctxt^{m2^} (prod_{unrevealed} R_k^{m^_k}) S^{v^}
///           (Z prod_{revealed} R_k^{a_k})^{-cH}`.
pub fn recompute_t_eq(
    pk: &PublicKey,
    proof: &PrimaryEqualProof,
    revealed_attrs: &BTreeMap<String, AttributeInfo>,
    c_h: &BigNumber,
) -> CoreResult<BigNumber> {
    let n = &pk.n.0;

    let mut t = mod_pow(&proof.a_prime, &proof.e_hat, n);
    t = (&t * mod_pow(&pk.rms.0, &proof.m1_hat, n)).mod_floor(n);
    t = (&t * mod_pow(&pk.rctxt.0, &proof.m2_hat, n)).mod_floor(n);
    for (name, m_hat) in &proof.m_hat {
        let base = pk
            .r
            .get(name)
            .ok_or_else(|| CoreError::Input(format!("no public base for attribute '{}'", name)))?;
        t = (&t * mod_pow(&base.0, m_hat, n)).mod_floor(n);
    }
    t = (&t * mod_pow(&pk.s.0, &proof.v_hat, n)).mod_floor(n);

    let mut revealed_product = pk.z.0.clone();
    for name in revealed_attrs.values().map(|a| &a.name) {
        let base = pk
            .r
            .get(name)
            .ok_or_else(|| CoreError::Input(format!("no public base for attribute '{}'", name)))?;
        let value = proof
            .revealed_attrs
            .get(name)
            .ok_or_else(|| CoreError::Input(format!("attribute '{}' was not actually revealed", name)))?;
        revealed_product = (&revealed_product * mod_pow(&base.0, value, n)).mod_floor(n);
    }
    let revealed_inv_pow = mod_pow(
        &mod_inverse(&revealed_product, n).ok_or(crate::error::CryptoError::NotInvertible)?,
        c_h,
        n,
    );
    t = (&t * revealed_inv_pow).mod_floor(n);

    Ok(t)
}

/// Recomputes `T_i^` and `T_Delta^` for one range predicate:
/// `T_i^ = Z^{u^_i} S^{r^_i} T_i^{-cH}`,
/// `T_Delta^ = Z^{threshold*cH} prod T_i^{u^_i} S^{alpha^} T_Delta^{-cH}`,
/// per the verification relation in spec §4.4.
pub fn recompute_ge_tau(
    pk: &PublicKey,
    proof: &PrimaryPredicateGEProof,
    c_h: &BigNumber,
) -> CoreResult<Vec<BigNumber>> {
    let n = &pk.n.0;
    let mut tau = Vec::with_capacity(5);

    for i in 0..4 {
        let key = format!("u{}", i);
        let t_i = proof
            .t
            .get(&key)
            .ok_or_else(|| CoreError::Input(format!("missing commitment '{}'", key)))?;
        let mut ti_hat = mod_pow(&pk.z.0, &proof.u_hat[i], n);
        ti_hat = (&ti_hat * mod_pow(&pk.s.0, &proof.r_hat[i], n)).mod_floor(n);
        let t_i_inv = mod_inverse(t_i, n).ok_or(crate::error::CryptoError::NotInvertible)?;
        ti_hat = (&ti_hat * mod_pow(&t_i_inv, c_h, n)).mod_floor(n);
        tau.push(ti_hat);
    }

    let delta = proof
        .t
        .get("delta")
        .ok_or_else(|| CoreError::Input("missing delta commitment".to_string()))?;
    let mut t_delta_hat = mod_pow(&pk.z.0, &BigNumber::from(proof.predicate.value), c_h);
    for i in 0..4 {
        let key = format!("u{}", i);
        let t_i = proof.t.get(&key).unwrap();
        t_delta_hat = (&t_delta_hat * mod_pow(t_i, &proof.u_hat[i], n)).mod_floor(n);
    }
    t_delta_hat = (&t_delta_hat * mod_pow(&pk.s.0, &proof.alpha_hat, n)).mod_floor(n);
    let delta_inv = mod_inverse(delta, n).ok_or(crate::error::CryptoError::NotInvertible)?;
    t_delta_hat = (&t_delta_hat * mod_pow(&delta_inv, c_h, n)).mod_floor(n);
    tau.push(t_delta_hat);

    Ok(tau)
}
