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
//! Data model (spec §3) and its canonical wire form (spec §4.1, §6).
//!
//! Every record here has two isomorphic forms: the in-memory big-integer
//! form used by the crypto modules, and the canonical JSON dictionary form
//! serialized by `serde`. Integers always serialize as decimal strings so
//! that interop does not depend on a JSON number's platform-specific
//! precision; attribute lists keep insertion order (`serde_json`'s
//! `preserve_order` feature); optional fields serialize as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::bignumber::BigNumber;
use crate::crypto::pairing::{GroupOrderElement, PointG1};
use num_bigint_dig::{BigInt, Sign};

/// Helper newtype so big integers round-trip as decimal strings rather than
/// JSON numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecString(pub BigNumber);

impl Serialize for DecString {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for DecString {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        let (sign, digits) = if let Some(rest) = raw.strip_prefix('-') {
            (Sign::Minus, rest)
        } else {
            (Sign::Plus, raw.as_str())
        };
        let magnitude: num_bigint_dig::BigUint = digits
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not a decimal integer: {}", raw)))?;
        Ok(DecString(BigInt::from_biguint(sign, magnitude)))
    }
}

/// Serde shim for a bare `BigNumber` field, reusing [`DecString`]'s decimal
/// wire form without changing the field's own type, so the crypto modules
/// that read these fields as plain `BigNumber`s need no changes.
mod dec_big {
    use super::{BigNumber, DecString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &BigNumber, s: S) -> Result<S::Ok, S::Error> {
        DecString(v.clone()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigNumber, D::Error> {
        Ok(DecString::deserialize(d)?.0)
    }
}

/// Serde shim for `BTreeMap<String, BigNumber>` fields (`m_hat`, `t`, the
/// equality proof's `revealed_attrs`).
mod dec_big_map {
    use super::{BigNumber, DecString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(v: &BTreeMap<String, BigNumber>, s: S) -> Result<S::Ok, S::Error> {
        let as_dec: BTreeMap<&String, DecString> = v.iter().map(|(k, v)| (k, DecString(v.clone()))).collect();
        as_dec.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, BigNumber>, D::Error> {
        let as_dec: BTreeMap<String, DecString> = BTreeMap::deserialize(d)?;
        Ok(as_dec.into_iter().map(|(k, v)| (k, v.0)).collect())
    }
}

/// Serde shim for the four-square decomposition's `[BigNumber; 4]` fields.
mod dec_big_array4 {
    use super::{BigNumber, DecString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &[BigNumber; 4], s: S) -> Result<S::Ok, S::Error> {
        let as_dec = [
            DecString(v[0].clone()),
            DecString(v[1].clone()),
            DecString(v[2].clone()),
            DecString(v[3].clone()),
        ];
        as_dec.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[BigNumber; 4], D::Error> {
        let [a, b, c, e]: [DecString; 4] = Deserialize::deserialize(d)?;
        Ok([a.0, b.0, c.0, e.0])
    }
}

/// Serde shims for the pairing-group field types proof structs carry,
/// reusing [`DecString`]'s decimal wire form over each type's canonical
/// compressed byte encoding (`crypto::pairing::{g1,g2,scalar}_{to,from}_bignumber`),
/// so `revocation_prover`/`revocation_verifier` keep reading these fields as
/// plain `PointG1`/`PointG2`/`GroupOrderElement`.
mod serde_pairing {
    pub mod g1 {
        use crate::application::datatypes::DecString;
        use crate::crypto::pairing::{g1_from_bignumber, g1_to_bignumber, PointG1};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(v: &PointG1, s: S) -> Result<S::Ok, S::Error> {
            DecString(g1_to_bignumber(v)).serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PointG1, D::Error> {
            let dec = DecString::deserialize(d)?;
            g1_from_bignumber(&dec.0).map_err(serde::de::Error::custom)
        }
    }

    pub mod g2 {
        use crate::application::datatypes::DecString;
        use crate::crypto::pairing::{g2_from_bignumber, g2_to_bignumber, PointG2};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(v: &PointG2, s: S) -> Result<S::Ok, S::Error> {
            DecString(g2_to_bignumber(v)).serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PointG2, D::Error> {
            let dec = DecString::deserialize(d)?;
            g2_from_bignumber(&dec.0).map_err(serde::de::Error::custom)
        }
    }

    pub mod scalar {
        use crate::application::datatypes::DecString;
        use crate::crypto::pairing::{scalar_from_bignumber, scalar_to_bignumber, GroupOrderElement};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(v: &GroupOrderElement, s: S) -> Result<S::Ok, S::Error> {
            DecString(scalar_to_bignumber(v)).serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<GroupOrderElement, D::Error> {
            let dec = DecString::deserialize(d)?;
            scalar_from_bignumber(&dec.0).map_err(serde::de::Error::custom)
        }
    }
}

/// (name, version, issuerId): globally unique identifier of a credential
/// definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaKey {
    pub name: String,
    pub version: String,
    #[serde(rename = "issuerId")]
    pub issuer_id: String,
}

/// A published credential schema: its key, ordered attribute names, and the
/// issuer-assigned sequence number used as `schema_seq_no` elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(flatten)]
    pub key: SchemaKey,
    pub attr_names: Vec<String>,
    pub seq_id: i64,
}

/// CL signer's public key (spec §3's PrimaryPublicKey).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    pub n: DecString,
    pub s: DecString,
    pub rms: DecString,
    pub rctxt: DecString,
    pub r: BTreeMap<String, DecString>,
    pub z: DecString,
}

/// CL signer's private key: the factorization `(p', q')` of `N`.
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub p_prime: BigNumber,
    pub q_prime: BigNumber,
}

/// Pairing-group generators published by the non-revocation issuer.
#[derive(Clone, Debug)]
pub struct RevocationPublicKey {
    pub g: PointG1,
    pub g_dash: crate::crypto::pairing::PointG2,
    pub h: PointG1,
    pub h0: PointG1,
    pub h1: PointG1,
    pub h2: PointG1,
    pub htilde: PointG1,
    pub hcap: crate::crypto::pairing::PointG2,
    pub u: PointG1,
    pub pk: PointG1,
    pub y: crate::crypto::pairing::PointG2,
}

/// Non-revocation issuer's private exponent `x` and accumulator member key `sk`.
#[derive(Clone, Debug)]
pub struct RevocationSecretKey {
    pub x: GroupOrderElement,
    pub sk: GroupOrderElement,
}

/// The accumulator trapdoor γ, kept only by the non-revocation issuer.
#[derive(Clone, Debug)]
pub struct AccumulatorSecretKey {
    pub gamma: GroupOrderElement,
}

/// Current accumulator state (spec §3). `acc` lives in G2, per spec §3's
/// data model ("currentValue acc∈G2"); membership witnesses are built in G1
/// and checked against it via the bilinear map.
#[derive(Clone, Debug)]
pub struct Accumulator {
    pub acc: crate::crypto::pairing::PointG2,
    pub v: std::collections::BTreeSet<i32>,
    pub max_claim_num: i32,
    pub current_i: i32,
}

impl Accumulator {
    pub fn is_full(&self) -> bool {
        self.current_i > self.max_claim_num
    }
}

/// Per-holder non-revocation witness (spec §3). `omega` lives in G2
/// alongside the accumulator it proves membership against; the rest of the
/// witness lives in G1 alongside the signature `sigma` it was issued with.
#[derive(Clone, Debug)]
pub struct Witness {
    pub sigma_i: PointG1,
    pub u_i: PointG1,
    pub g_i: PointG1,
    pub omega: crate::crypto::pairing::PointG2,
    pub v: std::collections::BTreeSet<i32>,
}

/// A raw/encoded attribute pair, as stored by the wallet and echoed back in
/// a proof's revealed section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeValue {
    pub raw: String,
    pub encoded: DecString,
}

pub type AttributeValues = BTreeMap<String, AttributeValue>;

/// CL signature on a committed attribute vector (spec §3's PrimaryClaim).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryClaim {
    pub m2: DecString,
    pub a: DecString,
    pub e: DecString,
    pub v: DecString,
}

/// Non-revocation half of a credential (spec §3's NonRevocationClaim).
#[derive(Clone, Debug)]
pub struct NonRevocationClaim {
    pub i: i32,
    pub sigma: PointG1,
    pub c: GroupOrderElement,
    pub vr_prime_prime: GroupOrderElement,
    pub witness: Witness,
    pub g_i: PointG1,
    pub m2: GroupOrderElement,
}

/// A claim is either primary-only or primary + non-revocation, modeled as a
/// sum type per the Design Notes (§9) to rule out "both fields null" states.
#[derive(Clone, Debug)]
pub enum Claims {
    Primary(PrimaryClaim),
    Both {
        primary: PrimaryClaim,
        non_revoc: NonRevocationClaim,
    },
}

impl Claims {
    pub fn primary(&self) -> &PrimaryClaim {
        match self {
            Claims::Primary(p) => p,
            Claims::Both { primary, .. } => primary,
        }
    }

    pub fn non_revoc(&self) -> Option<&NonRevocationClaim> {
        match self {
            Claims::Primary(_) => None,
            Claims::Both { non_revoc, .. } => Some(non_revoc),
        }
    }
}

/// The prover's blind commitment to its hidden master secret (and,
/// optionally, the pairing-group analogue for non-revocation).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub user_id: String,
    pub u: DecString,
    #[serde(skip)]
    pub ur: Option<PointG1>,
}

/// The random blinds the prover sampled to build `ClaimRequest.u`, kept in
/// the wallet until `processClaim` folds them into the final claim.
#[derive(Clone, Debug)]
pub struct PrimaryClaimInitData {
    pub v_prime: BigNumber,
}

#[derive(Clone, Debug)]
pub struct NonRevocClaimInitData {
    pub vr_prime: GroupOrderElement,
}

/// One requested attribute disclosure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub name: String,
    pub schema_seq_no: Option<i64>,
    pub claim_def_seq_no: Option<i64>,
}

/// A `>=` range predicate on a hidden attribute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredicateGE {
    pub attr_name: String,
    pub value: i64,
    pub schema_seq_no: Option<i64>,
    pub claim_def_seq_no: Option<i64>,
}

/// What a verifier asks a prover to prove (spec §3's ProofRequest).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofRequest {
    pub name: String,
    pub version: String,
    pub nonce: DecString,
    #[serde(rename = "verifiableAttributes")]
    pub revealed_attrs: BTreeMap<String, AttributeInfo>,
    pub predicates: BTreeMap<String, PredicateGE>,
}

/// Echo of what was actually disclosed, returned alongside a proof.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RequestedProof {
    pub revealed_attrs: BTreeMap<String, (String, String, String)>,
    pub predicates: BTreeMap<String, String>,
    pub self_attested_attrs: BTreeMap<String, String>,
    pub unrevealed_attrs: BTreeMap<String, String>,
}

/// Proof of knowledge of a CL signature with selective disclosure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryEqualProof {
    #[serde(with = "dec_big_map")]
    pub revealed_attrs: BTreeMap<String, BigNumber>,
    #[serde(with = "dec_big")]
    pub a_prime: BigNumber,
    #[serde(with = "dec_big")]
    pub e_hat: BigNumber,
    #[serde(with = "dec_big")]
    pub v_hat: BigNumber,
    #[serde(with = "dec_big_map")]
    pub m_hat: BTreeMap<String, BigNumber>,
    #[serde(with = "dec_big")]
    pub m1_hat: BigNumber,
    #[serde(with = "dec_big")]
    pub m2_hat: BigNumber,
}

/// Proof that a hidden attribute's gap to a threshold decomposes as a sum
/// of four squares (spec §4.4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryPredicateGEProof {
    #[serde(with = "dec_big_array4")]
    pub u_hat: [BigNumber; 4],
    #[serde(with = "dec_big_array4")]
    pub r_hat: [BigNumber; 4],
    #[serde(with = "dec_big")]
    pub alpha_hat: BigNumber,
    pub predicate: PredicateGE,
    #[serde(with = "dec_big_map")]
    pub t: BTreeMap<String, BigNumber>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryProof {
    pub eq_proof: PrimaryEqualProof,
    pub ge_proofs: Vec<PrimaryPredicateGEProof>,
}

/// Proof of knowledge of a valid non-revocation witness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NonRevocProof {
    pub x_list: NonRevocProofXList,
    pub c_list: NonRevocProofCList,
}

/// The eight pairing-group commitments submitted by the non-revocation
/// proof builder (spec §4.7).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NonRevocProofCList {
    #[serde(with = "serde_pairing::g1")]
    pub e: PointG1,
    #[serde(with = "serde_pairing::g1")]
    pub d: PointG1,
    #[serde(with = "serde_pairing::g1")]
    pub a: PointG1,
    #[serde(with = "serde_pairing::g1")]
    pub g: PointG1,
    #[serde(with = "serde_pairing::g2")]
    pub w: crate::crypto::pairing::PointG2,
    #[serde(with = "serde_pairing::g1")]
    pub s: PointG1,
    #[serde(with = "serde_pairing::g1")]
    pub u: PointG1,
}

/// The blinds/responses behind [`NonRevocProofCList`], consumed both to
/// build the tau list and — after the challenge is known — to finalize
/// linear responses `s_i = r_i + cH * secret_i`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NonRevocProofXList {
    #[serde(with = "serde_pairing::scalar")]
    pub rho: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub r: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub r_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub r_prime_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub r_prime_prime_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub o: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub o_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub m: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub m_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub t: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub t_prime: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub m2: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub s: GroupOrderElement,
    #[serde(with = "serde_pairing::scalar")]
    pub c: GroupOrderElement,
}

/// The eight tau (τ) commitments a non-revocation proof contributes to the
/// Fiat-Shamir transcript.
#[derive(Clone, Debug)]
pub struct NonRevocProofTauList {
    pub t1: PointG1,
    pub t2: PointG1,
    pub t3: crate::crypto::pairing::Pair,
    pub t4: crate::crypto::pairing::Pair,
    pub t5: PointG1,
    pub t6: PointG1,
    pub t7: crate::crypto::pairing::Pair,
    pub t8: crate::crypto::pairing::Pair,
}

/// One schema's worth of sub-proof (primary + optional non-revocation).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofInfo {
    pub primary_proof: PrimaryProof,
    pub non_revoc_proof: Option<NonRevocProof>,
}

/// The shared Fiat-Shamir challenge plus the full ordered list of C-values
/// it was computed over (spec §6's AggregatedProof).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregatedProof {
    pub c_hash: DecString,
    pub c_list: Vec<DecString>,
}

/// The complete artifact a prover hands a verifier (spec.md:190's
/// serializable proof artifact).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FullProof {
    pub proofs: BTreeMap<String, ProofInfo>,
    pub aggregated_proof: AggregatedProof,
    pub requested_proof: RequestedProof,
}
