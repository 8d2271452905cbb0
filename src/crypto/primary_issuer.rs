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
//! Primary (RSA-group) issuer: key generation and blind signing (spec
//! §4.3). Grounded on indy-sdk's `services::crypto::anoncreds::issuer`
//! (`_generate_keys`, `_sign`, `_issue_primary_claim`,
//! `_generate_v_prime_prime`), reworked to use this crate's
//! [`crate::crypto::bignumber`] seam instead of an OpenSSL `BigNumber`
//! wrapper.

use std::collections::BTreeMap;

use num_bigint_dig::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::application::datatypes::{AttributeValues, PrimaryClaim, PublicKey, SecretKey};
use crate::constants::*;
use crate::crypto::bignumber::{
    generate_prime_in_range, generate_safe_prime, mod_inverse, mod_pow, rand_bits, rand_range,
    random_qr, BigNumber,
};
use crate::error::{CoreError, CoreResult};

/// Generates a fresh CL signer key pair over a safe-RSA modulus of
/// `LARGE_PRIME`-bit factors, with one base `R_k` per attribute name.
pub fn generate_keys(attr_names: &[String]) -> CoreResult<(PublicKey, SecretKey)> {
    debug!("generating primary key pair for {} attributes", attr_names.len());

    let p = generate_safe_prime(LARGE_PRIME)?;
    let q = generate_safe_prime(LARGE_PRIME)?;

    let p_prime = (&p - BigInt::one()) / 2;
    let q_prime = (&q - BigInt::one()) / 2;

    let n = &p * &q;
    let s = random_qr(&n);

    let lo = BigInt::from(2u32);
    let hi = &p_prime * &q_prime - BigInt::one();
    let gen_x = || rand_range(&lo, &hi);

    let x_z = gen_x();
    let mut r = BTreeMap::new();
    for name in attr_names {
        let x_k = gen_x();
        r.insert(name.clone(), mod_pow(&s, &x_k, &n));
    }
    let z = mod_pow(&s, &x_z, &n);
    let rms = mod_pow(&s, &gen_x(), &n);
    let rctxt = mod_pow(&s, &gen_x(), &n);

    Ok((
        PublicKey {
            n: crate::application::datatypes::DecString(n),
            s: crate::application::datatypes::DecString(s),
            rms: crate::application::datatypes::DecString(rms),
            rctxt: crate::application::datatypes::DecString(rctxt),
            r: r.into_iter()
                .map(|(k, v)| (k, crate::application::datatypes::DecString(v)))
                .collect(),
            z: crate::application::datatypes::DecString(z),
        },
        SecretKey { p_prime, q_prime },
    ))
}

/// Generates a random, non-zero context attribute `m2`, bounded by
/// `2^LARGE_CONTEXT_ATTR`, scoping a single issued credential.
pub fn generate_context_attribute() -> BigNumber {
    loop {
        let candidate = rand_bits(LARGE_CONTEXT_ATTR);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}

/// `v''` has a fixed bit length with the high bit forced on, so that
/// `v = v' + v''` always lands in the declared range regardless of the
/// prover's choice of `v'`.
fn generate_v_prime_prime() -> BigNumber {
    let a = rand_bits(LARGE_VPRIME_PRIME);
    let high_bit = BigInt::from(2u32).pow((LARGE_VPRIME_PRIME - 1) as u32);
    a | high_bit
}

/// Blind-signs a committed attribute vector (spec §4.3.2): computes
/// `A = Q^{e^{-1} mod p'q'} mod N` where
/// `Q = Z * (U * S^{v''} * Rctxt^{m2} * prod R_k^{a_k})^{-1} mod N`.
pub fn issue_primary_claim(
    pk: &PublicKey,
    sk: &SecretKey,
    u: &BigNumber,
    context_attribute: &BigNumber,
    attributes: &AttributeValues,
) -> CoreResult<PrimaryClaim> {
    let v_prime_prime = generate_v_prime_prime();

    let e_start = BigInt::from(2u32).pow(LARGE_E_START as u32);
    let e_width = BigInt::from(2u32).pow(LARGE_E_END as u32);
    let e_end = &e_start + &e_width;
    let e = generate_prime_in_range(&e_start, &e_end)?;

    let n = &pk.n.0;

    let mut rx = BigInt::one();
    for (name, value) in attributes {
        let base = pk
            .r
            .get(name)
            .ok_or_else(|| CoreError::Input(format!("no public base for attribute '{}'", name)))?;
        rx = (&rx * mod_pow(&base.0, &value.encoded.0, n)).mod_floor(n);
    }
    rx = (&rx * mod_pow(&pk.rctxt.0, context_attribute, n)).mod_floor(n);
    if !u.is_zero() {
        rx = (&rx * u.mod_floor(n)).mod_floor(n);
    }

    let s_pow_v = mod_pow(&pk.s.0, &v_prime_prime, n);
    let denom = (&s_pow_v * &rx).mod_floor(n);
    let denom_inv = mod_inverse(&denom, n).ok_or(crate::error::CryptoError::NotInvertible)?;
    let q = (&pk.z.0 * &denom_inv).mod_floor(n);

    let p_prime_q_prime = &sk.p_prime * &sk.q_prime;
    let e_inv = mod_inverse(&e, &p_prime_q_prime).ok_or(crate::error::CryptoError::NotInvertible)?;
    let a = mod_pow(&q, &e_inv, n);

    Ok(PrimaryClaim {
        m2: crate::application::datatypes::DecString(context_attribute.clone()),
        a: crate::application::datatypes::DecString(a),
        e: crate::application::datatypes::DecString(e),
        v: crate::application::datatypes::DecString(v_prime_prime),
    })
}
