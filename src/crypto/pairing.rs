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
//! Pairing-group capability layer (spec §9: "encapsulate as a trait-like
//! capability: G1/G2 group ops, bilinear map, hashing into G1; revocation
//! code never touches concrete curve types"). Backed by `ark-bn254`; every
//! other module in this crate reaches the curve only through the aliases
//! and functions defined here.

use ark_bn254::{Bn254, Fr, G1Projective, G2Projective};
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::{CurveGroup, Group};
use ark_ff::{BigInteger, PrimeField, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::thread_rng;

use crate::crypto::bignumber::BigNumber;

pub type GroupOrderElement = Fr;
pub type PointG1 = G1Projective;
pub type PointG2 = G2Projective;
pub type Pair = PairingOutput<Bn254>;

/// Samples a uniformly random scalar in the pairing group's prime-order
/// field — used for the accumulator trapdoor γ, issuer secret x, and the
/// per-proof blinds ρ, ρ′, o, o′, r1..r6.
pub fn random_scalar() -> GroupOrderElement {
    Fr::rand(&mut thread_rng())
}

pub fn g1_generator() -> PointG1 {
    G1Projective::generator()
}

pub fn g2_generator() -> PointG2 {
    G2Projective::generator()
}

pub fn g1_mul(p: &PointG1, s: &GroupOrderElement) -> PointG1 {
    p.mul_bigint(s.into_bigint())
}

pub fn g2_mul(p: &PointG2, s: &GroupOrderElement) -> PointG2 {
    p.mul_bigint(s.into_bigint())
}

pub fn g1_add(a: &PointG1, b: &PointG1) -> PointG1 {
    *a + *b
}

pub fn g2_add(a: &PointG2, b: &PointG2) -> PointG2 {
    *a + *b
}

pub fn g1_neg(a: &PointG1) -> PointG1 {
    -*a
}

pub fn g1_sub(a: &PointG1, b: &PointG1) -> PointG1 {
    *a - *b
}

pub fn g2_sub(a: &PointG2, b: &PointG2) -> PointG2 {
    *a - *b
}

pub fn g2_neg(a: &PointG2) -> PointG2 {
    -*a
}

pub fn g1_identity() -> PointG1 {
    G1Projective::zero_point()
}

pub fn g2_identity() -> PointG2 {
    G2Projective::zero_point()
}

trait ZeroPoint {
    fn zero_point() -> Self;
}
impl ZeroPoint for G1Projective {
    fn zero_point() -> Self {
        use ark_ec::Group as _;
        G1Projective::generator() * Fr::from(0u64)
    }
}
impl ZeroPoint for G2Projective {
    fn zero_point() -> Self {
        use ark_ec::Group as _;
        G2Projective::generator() * Fr::from(0u64)
    }
}

/// The bilinear map `e: G1 x G2 -> GT`.
pub fn pair(a: &PointG1, b: &PointG2) -> Pair {
    Bn254::pairing(a.into_affine(), b.into_affine())
}

/// `GT` (ark-ec's `PairingOutput`) is an additive group; "raising a pairing
/// to a scalar power" in multiplicative notation is scalar multiplication
/// here.
pub fn gt_pow(p: &Pair, s: &GroupOrderElement) -> Pair {
    p.mul_bigint(s.into_bigint())
}

pub fn gt_add(a: &Pair, b: &Pair) -> Pair {
    *a + *b
}

pub fn gt_sub(a: &Pair, b: &Pair) -> Pair {
    *a - *b
}

pub fn gt_neg(a: &Pair) -> Pair {
    -*a
}

pub fn scalar_inverse(s: &GroupOrderElement) -> Option<GroupOrderElement> {
    s.inverse()
}

/// Reduces an arbitrary big-endian byte string into a scalar mod the
/// group order, used to carry the RSA-domain context attribute `m2` over
/// into the pairing-group non-revocation claim.
pub fn scalar_from_bytes_be(bytes: &[u8]) -> GroupOrderElement {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Deterministic tails sequence `tails[i] = g^{γ^i}` for `i in [1, 2L] \ {L+1}`
/// (spec §3). `gamma` is the accumulator trapdoor, known only to the
/// non-revocation issuer; `tails` is otherwise published in full.
///
/// Published twice — once against each generator `g` (G1) and `g'` (G2)
/// from spec §3's RevocationPublicKey — since a non-revocation claim's
/// `g_i` term sits alongside G1 signature components while the
/// accumulator value and witness `omega` live in G2 (spec §3: "acc∈G2").
pub fn generate_tails_g1(gamma: &GroupOrderElement, g: &PointG1, capacity_l: u32) -> Vec<PointG1> {
    gamma_powers(gamma, capacity_l)
        .into_iter()
        .map(|p| g1_mul(g, &p))
        .collect()
}

pub fn generate_tails_g2(gamma: &GroupOrderElement, g_dash: &PointG2, capacity_l: u32) -> Vec<PointG2> {
    gamma_powers(gamma, capacity_l)
        .into_iter()
        .map(|p| g2_mul(g_dash, &p))
        .collect()
}

fn gamma_powers(gamma: &GroupOrderElement, capacity_l: u32) -> Vec<GroupOrderElement> {
    let mut powers = Vec::with_capacity(2 * capacity_l as usize + 1);
    let mut cur = Fr::from(1u64);
    for _ in 0..=(2 * capacity_l) {
        powers.push(cur);
        cur *= gamma;
    }
    powers
}

use ark_ff::Field;

/// Reduces a pairing-group element to the integer the Fiat-Shamir hash
/// actually consumes (spec §4.10's `int_to_bytes`), via its canonical
/// compressed encoding. Used to fold G1/G2/GT contributions into the same
/// `get_hash_as_int` transcript the RSA-domain values go through.
fn to_bignumber(bytes: Vec<u8>) -> BigNumber {
    num_bigint_dig::BigInt::from_bytes_be(num_bigint_dig::Sign::Plus, &bytes)
}

pub fn g1_to_bignumber(p: &PointG1) -> BigNumber {
    let mut bytes = Vec::new();
    p.into_affine().serialize_compressed(&mut bytes).expect("serialization to a Vec cannot fail");
    to_bignumber(bytes)
}

pub fn g2_to_bignumber(p: &PointG2) -> BigNumber {
    let mut bytes = Vec::new();
    p.into_affine().serialize_compressed(&mut bytes).expect("serialization to a Vec cannot fail");
    to_bignumber(bytes)
}

pub fn gt_to_bignumber(p: &Pair) -> BigNumber {
    let mut bytes = Vec::new();
    p.serialize_compressed(&mut bytes).expect("serialization to a Vec cannot fail");
    to_bignumber(bytes)
}

const G1_COMPRESSED_LEN: usize = 32;
const G2_COMPRESSED_LEN: usize = 64;
const SCALAR_COMPRESSED_LEN: usize = 32;

/// `to_bignumber` reads a compressed serialization as a big-endian integer
/// without reversing byte order, so reconstructing the original byte string
/// means left-padding back out to the fixed compressed length — a leading
/// zero byte (e.g. an unset compression flag) is otherwise indistinguishable
/// from one the BigNumber's own minimal encoding dropped.
fn from_bignumber_padded(v: &BigNumber, len: usize) -> Vec<u8> {
    let minimal = crate::crypto::bignumber::int_to_bytes(v);
    let mut bytes = vec![0u8; len];
    let start = len - minimal.len();
    bytes[start..].copy_from_slice(&minimal);
    bytes
}

/// Reverse of [`g1_to_bignumber`] — the wire form proof structs round-trip
/// through (spec.md:190's serializable proof artifact).
pub fn g1_from_bignumber(v: &BigNumber) -> Result<PointG1, ark_serialize::SerializationError> {
    let bytes = from_bignumber_padded(v, G1_COMPRESSED_LEN);
    let affine = ark_bn254::G1Affine::deserialize_compressed(&bytes[..])?;
    Ok(affine.into())
}

/// Reverse of [`g2_to_bignumber`].
pub fn g2_from_bignumber(v: &BigNumber) -> Result<PointG2, ark_serialize::SerializationError> {
    let bytes = from_bignumber_padded(v, G2_COMPRESSED_LEN);
    let affine = ark_bn254::G2Affine::deserialize_compressed(&bytes[..])?;
    Ok(affine.into())
}

/// Encodes a scalar (accumulator-order element) as a decimal-friendly
/// `BigNumber` via its canonical compressed byte form, mirroring
/// [`g1_to_bignumber`]/[`g2_to_bignumber`] for the third pairing-group type
/// proof structs carry.
pub fn scalar_to_bignumber(s: &GroupOrderElement) -> BigNumber {
    let mut bytes = Vec::new();
    s.serialize_compressed(&mut bytes).expect("serialization to a Vec cannot fail");
    to_bignumber(bytes)
}

pub fn scalar_from_bignumber(v: &BigNumber) -> Result<GroupOrderElement, ark_serialize::SerializationError> {
    let bytes = from_bignumber_padded(v, SCALAR_COMPRESSED_LEN);
    Fr::deserialize_compressed(&bytes[..])
}
