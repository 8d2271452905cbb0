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
//! Non-revocation issuer: pairing-group key generation, accumulator setup,
//! witness issuance and revocation (spec §4.6). Grounded on indy-sdk's
//! `_generate_revocation_keys`, `issue_accumulator`,
//! `_issue_non_revocation_claim`, and `revoke`.

use std::collections::{BTreeSet, HashMap};

use crate::application::datatypes::{
    Accumulator, AccumulatorSecretKey, NonRevocationClaim, RevocationPublicKey,
    RevocationSecretKey, Witness,
};
use crate::crypto::pairing::{
    self, g1_add, g1_generator, g1_mul, g2_generator, g2_identity, g2_mul, generate_tails_g1,
    generate_tails_g2, random_scalar, scalar_inverse, GroupOrderElement, PointG1, PointG2,
};
use crate::error::{CoreError, CoreResult};

/// Generates the non-revocation issuer's pairing-group generators and
/// secret exponents. `g, h, h0, h1, h2, htilde, u` are random G1 generators,
/// `g'` the G2 companion generator (spec §3's "g, g′"); `x, sk` are random
/// scalars; `pk = g^sk`, `y = h^x`.
pub fn generate_revocation_keys() -> (RevocationPublicKey, RevocationSecretKey) {
    let g = g1_generator_at(random_scalar());
    let g_dash = g2_generator_at(random_scalar());
    let h = g1_generator_at(random_scalar());
    let h0 = g1_generator_at(random_scalar());
    let h1 = g1_generator_at(random_scalar());
    let h2 = g1_generator_at(random_scalar());
    let htilde = g1_generator_at(random_scalar());
    let u = g1_generator_at(random_scalar());
    let x = random_scalar();
    let sk = random_scalar();
    let pk = g1_mul(&g, &sk);
    let y = g2_mul(&g2_generator(), &x);
    let hcap = g2_generator_at(random_scalar());

    (
        RevocationPublicKey {
            g,
            g_dash,
            h,
            h0,
            h1,
            h2,
            htilde,
            hcap,
            u,
            pk,
            y,
        },
        RevocationSecretKey { x, sk },
    )
}

fn g1_generator_at(scalar: GroupOrderElement) -> PointG1 {
    g1_mul(&g1_generator(), &scalar)
}

fn g2_generator_at(scalar: GroupOrderElement) -> PointG2 {
    g2_mul(&g2_generator(), &scalar)
}

/// Precomputed tails tables, published twice (G1 against `g`, G2 against
/// `g'`) per [`pairing::generate_tails_g1`]/[`pairing::generate_tails_g2`].
pub struct RevocationIssuerState {
    pub gamma: AccumulatorSecretKey,
    pub tails_g1: HashMap<i32, PointG1>,
    pub tails_g2: HashMap<i32, PointG2>,
}

/// Builds the dual tails tables `{tails_g1[i], tails_g2[i]}` for
/// `i in [1, 2L] \ {L+1}` (spec §3), keyed exactly the way
/// `issue_non_revocation_claim`/`revoke` index into them — this is the one
/// place that range is allowed to be spelled out, so `issue_accumulator` and
/// the wallet-side `rebuild_issuer_state` (application::issuer) can't drift
/// apart again.
pub fn build_tails_tables(
    gamma: &GroupOrderElement,
    g: &PointG1,
    g_dash: &PointG2,
    capacity_l: i32,
) -> (HashMap<i32, PointG1>, HashMap<i32, PointG2>) {
    let g1_seq = generate_tails_g1(gamma, g, capacity_l as u32);
    let g2_seq = generate_tails_g2(gamma, g_dash, capacity_l as u32);

    let mut tails_g1 = HashMap::new();
    let mut tails_g2 = HashMap::new();
    for i in 1..=(2 * capacity_l) {
        if i != capacity_l + 1 {
            tails_g1.insert(i, g1_seq[i as usize]);
            tails_g2.insert(i, g2_seq[i as usize]);
        }
    }
    (tails_g1, tails_g2)
}

/// `issueAccumulator(L)`: publishes an empty accumulator of capacity `L`
/// and the tails tables derived from a fresh trapdoor γ.
pub fn issue_accumulator(pk_r: &RevocationPublicKey, capacity_l: i32) -> (Accumulator, RevocationIssuerState) {
    let gamma = random_scalar();
    let (tails_g1, tails_g2) = build_tails_tables(&gamma, &pk_r.g, &pk_r.g_dash, capacity_l);

    let accumulator = Accumulator {
        acc: g2_identity(),
        v: BTreeSet::new(),
        max_claim_num: capacity_l,
        current_i: 1,
    };

    (
        accumulator,
        RevocationIssuerState {
            gamma: AccumulatorSecretKey { gamma },
            tails_g1,
            tails_g2,
        },
    )
}

/// Issues a fresh non-revocation witness at index `i` (or the accumulator's
/// next free slot when `i` is `None`). Mirrors indy-sdk's
/// `_issue_non_revocation_claim`: `sigma = (h0 + h1*m2 + ur + g_i + h2*vr'') *
/// (x + c)^{-1}`, `sigma_i = g * (sk + gamma^i)^{-1}`, `u_i = u * gamma^i`,
/// `omega = sum_{j in V} tails_g2[L+1-j+i]`.
#[allow(clippy::too_many_arguments)]
pub fn issue_non_revocation_claim(
    accumulator: &mut Accumulator,
    pk_r: &RevocationPublicKey,
    sk_r: &RevocationSecretKey,
    issuer_state: &RevocationIssuerState,
    context_attribute: &GroupOrderElement,
    ur: &PointG1,
    user_revoc_index: Option<i32>,
) -> CoreResult<NonRevocationClaim> {
    if accumulator.is_full() {
        return Err(CoreError::Input(
            "accumulator is full, a new one must be issued".into(),
        ));
    }

    let i = user_revoc_index.unwrap_or(accumulator.current_i);
    accumulator.current_i += 1;

    let vr_prime_prime = random_scalar();
    let c = random_scalar();
    let m2 = *context_attribute;

    let g_i = *issuer_state
        .tails_g1
        .get(&i)
        .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", i)))?;

    let sigma_base = g1_add(
        &g1_add(&g1_add(&pk_r.h0, &g1_mul(&pk_r.h1, &m2)), ur),
        &g1_add(&g_i, &g1_mul(&pk_r.h2, &vr_prime_prime)),
    );
    let denom = sk_r.x + c;
    let denom_inv = scalar_inverse(&denom).ok_or(crate::error::CryptoError::NotInvertible)?;
    let sigma = g1_mul(&sigma_base, &denom_inv);

    let mut omega = g2_identity();
    for &j in &accumulator.v {
        let index = accumulator.max_claim_num + 1 - j + i;
        let term = issuer_state
            .tails_g2
            .get(&index)
            .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", index)))?;
        omega = pairing::g2_add(&omega, term);
    }

    let gamma_i = gamma_pow(&issuer_state.gamma.gamma, i);
    let sigma_i_denom = sk_r.sk + gamma_i;
    let sigma_i_inv =
        scalar_inverse(&sigma_i_denom).ok_or(crate::error::CryptoError::NotInvertible)?;
    let sigma_i = g1_mul(&pk_r.g, &sigma_i_inv);
    let u_i = g1_mul(&pk_r.u, &gamma_pow(&issuer_state.gamma.gamma, i));

    let index = accumulator.max_claim_num + 1 - i;
    let term = issuer_state
        .tails_g2
        .get(&index)
        .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", index)))?;
    accumulator.acc = pairing::g2_add(&accumulator.acc, term);
    accumulator.v.insert(i);

    Ok(NonRevocationClaim {
        i,
        sigma,
        c,
        vr_prime_prime,
        witness: Witness {
            sigma_i,
            u_i,
            g_i,
            omega,
            v: accumulator.v.clone(),
        },
        g_i,
        m2,
    })
}

/// `gamma ^ exp`, the accumulator trapdoor raised to an index (indy-sdk's
/// `gamma.pow_mod(i)`).
fn gamma_pow(gamma: &GroupOrderElement, exp: i32) -> GroupOrderElement {
    use ark_ff::Field;
    gamma.pow([exp.unsigned_abs() as u64])
}

/// `revoke(i)`: removes `i` from V and updates the accumulator by a single
/// subtraction rather than a full recomputation.
pub fn revoke(
    accumulator: &mut Accumulator,
    issuer_state: &RevocationIssuerState,
    i: i32,
) -> CoreResult<()> {
    if !accumulator.v.remove(&i) {
        return Err(CoreError::NotFound(format!(
            "index {} is not currently in the accumulator",
            i
        )));
    }
    let index = accumulator.max_claim_num + 1 - i;
    let term = issuer_state
        .tails_g2
        .get(&index)
        .ok_or_else(|| CoreError::Input(format!("no tails entry for index {}", index)))?;
    accumulator.acc = pairing::g2_sub(&accumulator.acc, term);
    Ok(())
}
