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
//! Non-revocation proof verifier (spec §4.8): recomputes the tau
//! commitments `{t1^..t8^}` a [`NonRevocProofXList`] of responses implies,
//! given the challenge `cH`, the public key and the claimed commitment list.
//! Grounded on indy-sdk's `_create_tau_list_expected_values` and mirrors
//! `revocation_prover::create_tau_list`'s formula shape term for term, with
//! responses standing in for the prover's blinds.
//!
//! `t2`/`t6` prove the product relations `m = rho*c` / `m' = r*r''` and are
//! self-canceling under the response substitution (no `cH`-correction
//! needed); `t1`/`t5` are direct knowledge-of-opening proofs for `E`/`D` and
//! do need the `- cH*C` correction below.

use crate::application::datatypes::{NonRevocProofCList, NonRevocProofTauList, NonRevocProofXList, RevocationPublicKey};
use crate::crypto::pairing::{g1_add, g1_mul, g1_sub, gt_add, gt_pow, gt_sub, pair, GroupOrderElement, PointG2};

/// Recomputes `{t1^..t8^}` from a non-revocation proof's responses, the
/// commitment list it published, the shared challenge, and the accumulator
/// value the prover claimed membership against.
pub fn recompute_tau_list(
    pk_r: &RevocationPublicKey,
    accumulator_acc: &PointG2,
    c_h: &GroupOrderElement,
    c: &NonRevocProofCList,
    x: &NonRevocProofXList,
) -> NonRevocProofTauList {
    let t1 = g1_sub(
        &g1_add(&g1_mul(&pk_r.h, &x.rho), &g1_mul(&pk_r.htilde, &x.o)),
        &g1_mul(&c.e, c_h),
    );
    let t2 = g1_sub(
        &g1_mul(&c.e, &x.c),
        &g1_add(&g1_mul(&pk_r.h, &x.m), &g1_mul(&pk_r.htilde, &x.t)),
    );
    let t3 = gt_sub(
        &gt_add(&gt_pow(&pair(&c.a, &pk_r.y), &x.c), &gt_pow(&pair(&pk_r.htilde, &pk_r.y), &x.rho)),
        &gt_add(
            &gt_pow(&pair(&pk_r.htilde, &pk_r.g_dash), &x.m),
            &gt_add(&gt_pow(&pair(&pk_r.h1, &pk_r.g_dash), &x.m2), &gt_pow(&pair(&pk_r.h2, &pk_r.g_dash), &x.s)),
        ),
    );
    let t4 = gt_sub(
        &gt_pow(&pair(&pk_r.htilde, accumulator_acc), &x.r),
        &gt_pow(&pair(&pk_r.g, &pk_r.hcap), &x.r_prime),
    );
    let t5 = g1_sub(
        &g1_add(&g1_mul(&pk_r.g, &x.r), &g1_mul(&pk_r.htilde, &x.o_prime)),
        &g1_mul(&c.d, c_h),
    );
    let t6 = g1_sub(
        &g1_mul(&c.d, &x.r_prime_prime),
        &g1_add(&g1_mul(&pk_r.g, &x.m_prime), &g1_mul(&pk_r.htilde, &x.t_prime)),
    );
    let t7 = gt_add(
        &gt_sub(
            &gt_pow(&pair(&g1_add(&pk_r.pk, &c.g), &pk_r.hcap), &x.r_prime_prime),
            &gt_pow(&pair(&pk_r.htilde, &pk_r.hcap), &x.m_prime),
        ),
        &gt_pow(&pair(&c.s, &pk_r.g_dash), &x.r),
    );
    let t8 = gt_sub(
        &gt_pow(&pair(&pk_r.htilde, &pk_r.hcap), &x.r_prime_prime_prime),
        &gt_pow(&pair(&pk_r.g, &pk_r.hcap), &x.r),
    );

    NonRevocProofTauList { t1, t2, t3, t4, t5, t6, t7, t8 }
}
