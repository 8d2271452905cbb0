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
//! Non-revocation proof builder (spec §4.7): witness refresh plus the
//! zero-knowledge proof of membership in the pairing-based accumulator.
//! The eight-pairing tau-list shape (t1..t8) is grounded on indy-sdk's
//! `_create_tau_list_values`/`_create_tau_list_expected_values`; the
//! secrets/blinds split below mirrors the tilde-then-finalize pattern in
//! `primary_prover.rs`'s equality and predicate proofs.

use std::collections::{BTreeSet, HashMap};

use crate::application::datatypes::{
    NonRevocProofCList, NonRevocProofTauList, NonRevocProofXList, NonRevocationClaim,
    RevocationPublicKey,
};
use crate::crypto::pairing::{
    g1_add, g1_mul, g1_sub, g2_add, g2_mul, gt_add, gt_pow, gt_sub, pair, random_scalar,
    GroupOrderElement, PointG2,
};
use crate::error::{CoreError, CoreResult};

/// The actual witness values a non-revocation proof commits to: `rho`/`o`
/// blind `A`'s extra randomizer, `r`/`o'` blind `G`, `r''`/`r'''` blind
/// `S`/`U`, `r'` blinds `W`; `m`, `m'`, `t`, `t'` are the products those
/// tie together, and `m2`/`s`/`c` carry the claim's own secrets through.
pub struct NonRevocProofSecrets {
    pub rho: GroupOrderElement,
    pub r: GroupOrderElement,
    pub r_prime: GroupOrderElement,
    pub r_prime_prime: GroupOrderElement,
    pub r_prime_prime_prime: GroupOrderElement,
    pub o: GroupOrderElement,
    pub o_prime: GroupOrderElement,
    pub m: GroupOrderElement,
    pub m_prime: GroupOrderElement,
    pub t: GroupOrderElement,
    pub t_prime: GroupOrderElement,
    pub m2: GroupOrderElement,
    pub s: GroupOrderElement,
    pub c: GroupOrderElement,
}

/// Fresh per-proof blinds, one for each secret above, sampled independently
/// of the claim and discarded once [`finalize_x_list`] runs.
pub struct NonRevocProofBlinds {
    pub rho: GroupOrderElement,
    pub r: GroupOrderElement,
    pub r_prime: GroupOrderElement,
    pub r_prime_prime: GroupOrderElement,
    pub r_prime_prime_prime: GroupOrderElement,
    pub o: GroupOrderElement,
    pub o_prime: GroupOrderElement,
    pub m: GroupOrderElement,
    pub m_prime: GroupOrderElement,
    pub t: GroupOrderElement,
    pub t_prime: GroupOrderElement,
    pub m2: GroupOrderElement,
    pub s: GroupOrderElement,
    pub c: GroupOrderElement,
}

/// Derives the actual witness secrets behind a non-revocation claim's
/// commitments (spec §4.7). `m`, `m'`, `t`, `t'` are themselves products of
/// two other secrets, the same way `v` ties `A` and `T_eq` together in the
/// primary proof.
pub fn init_secrets(claim: &NonRevocationClaim) -> NonRevocProofSecrets {
    let rho = random_scalar();
    let r = random_scalar();
    let r_prime = random_scalar();
    let r_prime_prime = random_scalar();
    let r_prime_prime_prime = random_scalar();
    let o = random_scalar();
    let o_prime = random_scalar();

    NonRevocProofSecrets {
        m: rho * claim.c,
        m_prime: r * r_prime_prime,
        t: o * claim.c,
        t_prime: o_prime * r_prime_prime_prime,
        rho,
        r,
        r_prime,
        r_prime_prime,
        r_prime_prime_prime,
        o,
        o_prime,
        m2: claim.m2,
        s: claim.vr_prime_prime,
        c: claim.c,
    }
}

/// Samples a fresh blind for every secret, independent of the claim.
pub fn init_blinds() -> NonRevocProofBlinds {
    NonRevocProofBlinds {
        rho: random_scalar(),
        r: random_scalar(),
        r_prime: random_scalar(),
        r_prime_prime: random_scalar(),
        r_prime_prime_prime: random_scalar(),
        o: random_scalar(),
        o_prime: random_scalar(),
        m: random_scalar(),
        m_prime: random_scalar(),
        t: random_scalar(),
        t_prime: random_scalar(),
        m2: random_scalar(),
        s: random_scalar(),
        c: random_scalar(),
    }
}

/// Builds the commitments `{E,D,A,G,W,S,U}`, each blinding one witness
/// component of `claim` by its matching secret.
pub fn create_c_list(
    claim: &NonRevocationClaim,
    secrets: &NonRevocProofSecrets,
    pk_r: &RevocationPublicKey,
) -> NonRevocProofCList {
    let e = g1_add(&g1_mul(&pk_r.h, &secrets.rho), &g1_mul(&pk_r.htilde, &secrets.o));
    let d = g1_add(&g1_mul(&pk_r.g, &secrets.r), &g1_mul(&pk_r.htilde, &secrets.o_prime));
    let a = g1_add(&claim.sigma, &g1_mul(&pk_r.htilde, &secrets.rho));
    let g = g1_add(&claim.g_i, &g1_mul(&pk_r.htilde, &secrets.r));
    let w = g2_add(&claim.witness.omega, &g2_mul(&pk_r.hcap, &secrets.r_prime));
    let s = g1_add(&claim.witness.sigma_i, &g1_mul(&pk_r.htilde, &secrets.r_prime_prime));
    let u = g1_add(&claim.witness.u_i, &g1_mul(&pk_r.htilde, &secrets.r_prime_prime_prime));

    NonRevocProofCList { e, d, a, g, w, s, u }
}

/// Builds the tau list a non-revocation proof contributes to the shared
/// Fiat-Shamir transcript, using the fresh blinds as exponents — the same
/// role `e~`/`v~`/`m~` play in `primary_prover::init_eq_proof`.
pub fn create_tau_list(
    pk_r: &RevocationPublicKey,
    accumulator_acc: &PointG2,
    b: &NonRevocProofBlinds,
    c: &NonRevocProofCList,
) -> NonRevocProofTauList {
    let t1 = g1_add(&g1_mul(&pk_r.h, &b.rho), &g1_mul(&pk_r.htilde, &b.o));
    let t2 = g1_sub(
        &g1_mul(&c.e, &b.c),
        &g1_add(&g1_mul(&pk_r.h, &b.m), &g1_mul(&pk_r.htilde, &b.t)),
    );
    let t3 = gt_sub(
        &gt_add(&gt_pow(&pair(&c.a, &pk_r.y), &b.c), &gt_pow(&pair(&pk_r.htilde, &pk_r.y), &b.rho)),
        &gt_add(
            &gt_pow(&pair(&pk_r.htilde, &pk_r.g_dash), &b.m),
            &gt_add(&gt_pow(&pair(&pk_r.h1, &pk_r.g_dash), &b.m2), &gt_pow(&pair(&pk_r.h2, &pk_r.g_dash), &b.s)),
        ),
    );
    let t4 = gt_sub(
        &gt_pow(&pair(&pk_r.htilde, accumulator_acc), &b.r),
        &gt_pow(&pair(&pk_r.g, &pk_r.hcap), &b.r_prime),
    );
    let t5 = g1_add(&g1_mul(&pk_r.g, &b.r), &g1_mul(&pk_r.htilde, &b.o_prime));
    let t6 = g1_sub(
        &g1_mul(&c.d, &b.r_prime_prime),
        &g1_add(&g1_mul(&pk_r.g, &b.m_prime), &g1_mul(&pk_r.htilde, &b.t_prime)),
    );
    let t7 = gt_add(
        &gt_sub(
            &gt_pow(&pair(&g1_add(&pk_r.pk, &c.g), &pk_r.hcap), &b.r_prime_prime),
            &gt_pow(&pair(&pk_r.htilde, &pk_r.hcap), &b.m_prime),
        ),
        &gt_pow(&pair(&c.s, &pk_r.g_dash), &b.r),
    );
    let t8 = gt_sub(
        &gt_pow(&pair(&pk_r.htilde, &pk_r.hcap), &b.r_prime_prime_prime),
        &gt_pow(&pair(&pk_r.g, &pk_r.hcap), &b.r),
    );

    NonRevocProofTauList { t1, t2, t3, t4, t5, t6, t7, t8 }
}

/// Finalizes the linear responses `s_i = blind_i + cH * secret_i` once the
/// shared challenge `cH` is known.
pub fn finalize_x_list(
    c_h: &GroupOrderElement,
    b: &NonRevocProofBlinds,
    secrets: &NonRevocProofSecrets,
) -> NonRevocProofXList {
    NonRevocProofXList {
        rho: b.rho + *c_h * secrets.rho,
        r: b.r + *c_h * secrets.r,
        r_prime: b.r_prime + *c_h * secrets.r_prime,
        r_prime_prime: b.r_prime_prime + *c_h * secrets.r_prime_prime,
        r_prime_prime_prime: b.r_prime_prime_prime + *c_h * secrets.r_prime_prime_prime,
        o: b.o + *c_h * secrets.o,
        o_prime: b.o_prime + *c_h * secrets.o_prime,
        m: b.m + *c_h * secrets.m,
        m_prime: b.m_prime + *c_h * secrets.m_prime,
        t: b.t + *c_h * secrets.t,
        t_prime: b.t_prime + *c_h * secrets.t_prime,
        m2: b.m2 + *c_h * secrets.m2,
        s: b.s + *c_h * secrets.s,
        c: b.c + *c_h * secrets.c,
    }
}

/// Refreshes a stale witness against the current index set `v_new` (spec
/// §4.7): multiplies in tails for newly-accumulated indices and divides out
/// tails for newly-revoked ones. Fails with [`CoreError::Revoked`] if the
/// holder's own index has left the set.
pub fn update_witness(
    witness: &mut crate::application::datatypes::Witness,
    i: i32,
    max_claim_num: i32,
    v_new: &BTreeSet<i32>,
    tails_g2: &HashMap<i32, PointG2>,
) -> CoreResult<()> {
    if !v_new.contains(&i) {
        return Err(CoreError::Revoked(i as u32));
    }

    let added: Vec<i32> = v_new.difference(&witness.v).copied().collect();
    let removed: Vec<i32> = witness.v.difference(v_new).copied().collect();

    for j in added {
        let index = max_claim_num + 1 - j + i;
        let term = tails_g2
            .get(&index)
            .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", index)))?;
        witness.omega = g2_add(&witness.omega, term);
    }
    for j in removed {
        let index = max_claim_num + 1 - j + i;
        let term = tails_g2
            .get(&index)
            .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", index)))?;
        witness.omega = crate::crypto::pairing::g2_sub(&witness.omega, term);
    }

    witness.v = v_new.clone();
    Ok(())
}
