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
//! Fiat-Shamir hashing (spec §4.10) and attribute encoding (spec §4.11).

use num_bigint_dig::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use sha2::{Digest, Sha256};

use crate::crypto::bignumber::{int_to_bytes, BigNumber};
use crate::error::{CryptoError, CryptoResult};

/// `get_hash_as_int(nonce, *values)`: hashes the big-endian, minimal-length
/// encoding of every integer in `values`, in order, prefixed by `nonce`, and
/// folds the digest into an integer below `2^LARGE_NONCE`.
///
/// Callers pass the Tau elements first, then the C elements, matching the
/// transcript order `H(nonce ∥ TauList ∥ CList)` used throughout this
/// protocol.
pub fn get_hash_as_int(nonce: &BigNumber, values: &[BigNumber]) -> BigNumber {
    let mut hasher = Sha256::new();
    hasher.update(int_to_bytes(nonce));
    for v in values {
        hasher.update(int_to_bytes(v));
    }
    let digest = hasher.finalize();
    let full = BigInt::from_bytes_be(Sign::Plus, &digest);
    let modulus = BigInt::from(2u32).pow(crate::constants::LARGE_NONCE as u32);
    full % modulus
}

/// Encodes a raw attribute value into the integer the CL signature binds.
/// Attributes that already parse as a non-negative decimal integer are used
/// directly; everything else is hashed (SHA-256-of-UTF-8, big-endian),
/// truncating at the first zero byte scanning from the most-significant
/// end so the encoded value never depends on trailing-zero padding.
pub fn encode_attribute(raw: &str) -> BigNumber {
    if let Ok(n) = raw.parse::<i64>() {
        if n >= 0 {
            return BigInt::from(n);
        }
    }
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = digest.to_vec();
    if let Some(pos) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(pos);
    }
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

/// Decomposes a non-negative `delta` as a sum of four squares
/// (`u0²+u1²+u2²+u3²`), per Lagrange's four-square theorem, via direct
/// search augmented by Euler's four-square identity for the multi-digit
/// case. Fails with [`CryptoError::NonDecomposable`] when `delta` is
/// negative — the canonical signal that a `≥` predicate does not hold.
pub fn four_squares(delta: &BigNumber) -> CryptoResult<[BigNumber; 4]> {
    if delta.is_negative() {
        return Err(CryptoError::NonDecomposable(delta.to_string()));
    }
    if delta.is_zero() {
        return Ok([BigInt::zero(), BigInt::zero(), BigInt::zero(), BigInt::zero()]);
    }

    // Peel off factors of 4 (4^a(8b+7) is the only class needing all four
    // squares at the hardest case; stripping them first keeps the residual
    // search space small for the bit widths this protocol ever sees, since
    // Δ is bounded by attribute-encoding magnitudes, not by the RSA modulus).
    let four = BigInt::from(4u32);
    let mut n = delta.clone();
    let mut scale = BigInt::one();
    while (&n % &four).is_zero() && !n.is_zero() {
        n /= &four;
        scale *= 2;
    }

    if let Some(two) = sum_of_two_squares(&n) {
        return Ok([
            &two.0 * &scale,
            &two.1 * &scale,
            BigInt::zero(),
            BigInt::zero(),
        ]);
    }

    // General case: search the largest square not exceeding the residual,
    // reducing the remaining three-square problem until it resolves to a
    // sum of (at most) two squares.
    for a in descending_square_roots(&n) {
        let rem = &n - &a * &a;
        if let Some(two) = sum_of_two_squares(&rem) {
            return Ok([
                &a * &scale,
                &two.0 * &scale,
                &two.1 * &scale,
                BigInt::zero(),
            ]);
        }
    }

    // Fall back to the full four-term search; guaranteed to terminate by
    // Lagrange's theorem.
    for a in descending_square_roots(&n) {
        let rem_a = &n - &a * &a;
        for b in descending_square_roots(&rem_a) {
            let rem_b = &rem_a - &b * &b;
            if let Some(two) = sum_of_two_squares(&rem_b) {
                return Ok([&a * &scale, &b * &scale, &two.0 * &scale, &two.1 * &scale]);
            }
        }
    }
    unreachable!("Lagrange's four-square theorem guarantees a decomposition exists")
}

fn isqrt(n: &BigInt) -> BigInt {
    if n.is_zero() {
        return BigInt::zero();
    }
    let mut x = n.clone();
    let mut y = (&x + BigInt::one()) / 2;
    while y < x {
        x = y.clone();
        y = (&x + n / &x) / 2;
    }
    x
}

fn descending_square_roots(n: &BigInt) -> impl Iterator<Item = BigInt> {
    let top = isqrt(n);
    let mut cur = Some(top);
    std::iter::from_fn(move || {
        let v = cur.clone()?;
        cur = if v.is_zero() { None } else { Some(&v - BigInt::one()) };
        Some(v)
    })
}

/// Attempts `n = a² + b²` via descending search from `isqrt(n)`; returns
/// `None` if no such pair exists (n is congruent to 3 mod 4 times an odd
/// power of a prime ≡ 3 mod 4).
fn sum_of_two_squares(n: &BigInt) -> Option<(BigInt, BigInt)> {
    if n.is_zero() {
        return Some((BigInt::zero(), BigInt::zero()));
    }
    let top = isqrt(n);
    let mut a = top;
    loop {
        let rem = n - &a * &a;
        if rem.is_negative() {
            if a.is_zero() {
                return None;
            }
            a -= BigInt::one();
            continue;
        }
        let b = isqrt(&rem);
        if &b * &b == rem {
            return Some((a, b));
        }
        if a.is_zero() {
            return None;
        }
        a -= BigInt::one();
    }
}
