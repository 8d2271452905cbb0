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

//! Prover orchestration (spec §4.9 `presentProof`, plus the claim-request and
//! claim-processing steps of §4.2/§4.3). Finds, randomizes and assembles
//! sub-proofs across every schema a `ProofRequest` touches, sharing one
//! Fiat-Shamir challenge via [`crate::transcript::ChallengeTranscript`].

use std::collections::{BTreeMap, HashMap};

use num_integer::Integer;

use crate::application::datatypes::{
    AggregatedProof, Claims, ClaimRequest, FullProof, NonRevocProof,
    NonRevocClaimInitData, PredicateGE, PrimaryClaimInitData, ProofInfo, ProofRequest,
    RequestedProof, Schema, SchemaKey,
};
use crate::constants::{LARGE_MASTER_SECRET, LARGE_MTILDE, LARGE_VPRIME};
use crate::crypto::bignumber::{int_to_bytes, mod_pow, rand_bits, BigNumber};
use crate::crypto::pairing::{g1_mul, random_scalar, scalar_from_bytes_be};
use crate::crypto::primary_prover::{
    assemble_primary_proof, finalize_eq_proof, finalize_ge_proof, init_eq_proof, init_ge_proof, randomize_claim,
};
use crate::crypto::revocation_prover;
use crate::error::{CoreError, CoreResult};
use crate::repository::PublicRepository;
use crate::transcript::ChallengeTranscript;
use crate::wallet::Wallet;

pub struct Prover;

impl Prover {
    /// Samples a fresh master secret and stores it, if the wallet does not
    /// already hold one for this schema.
    pub async fn create_master_secret<W: Wallet>(wallet: &W, schema_id: &SchemaKey) -> CoreResult<BigNumber> {
        if let Ok(existing) = wallet.get_master_secret(schema_id).await {
            return Ok(existing);
        }
        let ms = rand_bits(LARGE_MASTER_SECRET);
        wallet.submit_master_secret(schema_id, ms.clone()).await?;
        Ok(ms)
    }

    /// Builds the blind commitment an issuer signs over (spec §4.2, §6):
    /// `U = S^{v'} Rms^{ms} mod N`, and — if `request_non_revoc` — its
    /// pairing-group analogue `Ur = u^{vr'}`. The blinds are kept in the
    /// wallet until [`Prover::process_claim`] folds them into the issued claim.
    pub async fn create_claim_request<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
        prover_did: &str,
        request_non_revoc: bool,
    ) -> CoreResult<ClaimRequest> {
        let pk = repo.fetch_primary_public_key(schema_id).await?;
        let ms = Self::create_master_secret(wallet, schema_id).await?;

        let n = &pk.n.0;
        let v_prime = rand_bits(LARGE_VPRIME);
        let u = (mod_pow(&pk.s.0, &v_prime, n) * mod_pow(&pk.rms.0, &ms, n)).mod_floor(n);
        wallet
            .submit_primary_claim_init_data(schema_id, PrimaryClaimInitData { v_prime })
            .await?;

        let ur = if request_non_revoc {
            let pk_r = repo.fetch_revocation_public_key(schema_id).await?;
            let vr_prime = random_scalar();
            let ur_point = g1_mul(&pk_r.u, &vr_prime);
            wallet
                .submit_non_revoc_claim_init_data(schema_id, NonRevocClaimInitData { vr_prime })
                .await?;
            Some(ur_point)
        } else {
            None
        };

        Ok(ClaimRequest {
            user_id: prover_did.to_string(),
            u: crate::application::datatypes::DecString(u),
            ur,
        })
    }

    /// Folds the prover's own blind `v'` into a freshly issued claim's `v''`
    /// (spec §4.3.2/§8: `v = v' + v''`), so the claim verifies against the
    /// full `A^e ≡ Z S^v ...` relation without ever revealing `v'` to the
    /// issuer. Writes the claim twice: once as issued, once folded — the
    /// crash-consistent ordering spec §7 requires (context attribute was
    /// already written by the issuer before this runs).
    pub async fn process_claim<W: Wallet>(wallet: &W, schema_id: &SchemaKey, issued: Claims) -> CoreResult<()> {
        wallet.submit_claim(schema_id, issued.clone()).await?;

        let init = wallet.get_primary_claim_init_data(schema_id).await?;
        let folded = match issued {
            Claims::Primary(mut primary) => {
                primary.v = crate::application::datatypes::DecString(primary.v.0 + init.v_prime);
                Claims::Primary(primary)
            }
            Claims::Both { mut primary, non_revoc } => {
                primary.v = crate::application::datatypes::DecString(primary.v.0 + init.v_prime);
                Claims::Both { primary, non_revoc }
            }
        };
        wallet.submit_claim(schema_id, folded).await?;
        Ok(())
    }

    /// Refreshes a stored non-revocation witness against the schema's
    /// current accumulator state (spec §4.7), fetching tails as needed.
    /// Left as an explicit step rather than folded into `present_proof`
    /// silently, since a prover may legitimately want to present a proof
    /// against a witness it has not yet refreshed (spec §8's stale-witness
    /// scenario).
    pub async fn refresh_witness<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
    ) -> CoreResult<()> {
        let mut claims = wallet.get_claim(schema_id).await?;
        let accumulator = repo.fetch_accumulator(schema_id).await?;
        match &mut claims {
            Claims::Primary(_) => {
                return Err(CoreError::Input("schema carries no non-revocation claim to refresh".into()))
            }
            Claims::Both { non_revoc, .. } => {
                if non_revoc.witness.v != accumulator.v {
                    let tails_g2 = repo.fetch_tails_g2(schema_id).await?;
                    revocation_prover::update_witness(
                        &mut non_revoc.witness,
                        non_revoc.i,
                        accumulator.max_claim_num,
                        &accumulator.v,
                        &tails_g2,
                    )?;
                }
            }
        }
        wallet.submit_claim(schema_id, claims).await?;
        Ok(())
    }

    /// `presentProof` (spec §4.9): finds a satisfying claim per requested
    /// attribute/predicate, groups them by schema, builds every sub-proof's
    /// commitments into one shared transcript, derives the challenge, and
    /// finalizes every sub-proof's responses against it.
    pub async fn present_proof<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        request: &ProofRequest,
    ) -> CoreResult<FullProof> {
        debug!(
            "presenting proof for request '{}' ({} revealed, {} predicates)",
            request.name,
            request.revealed_attrs.len(),
            request.predicates.len()
        );

        let all_claims = wallet.get_all_claims().await?;

        #[derive(Default)]
        struct ProofClaimsEntry {
            revealed: Vec<(String, String)>,
            predicates: Vec<(String, PredicateGE)>,
        }

        let mut schemas: HashMap<SchemaKey, Schema> = HashMap::new();
        for schema_id in all_claims.keys() {
            schemas.insert(schema_id.clone(), repo.fetch_schema(schema_id).await?);
        }

        let find_schema = |name: &str, schema_seq_no: Option<i64>| -> CoreResult<SchemaKey> {
            schemas
                .iter()
                .find(|(_, schema)| {
                    schema.attr_names.iter().any(|a| a == name)
                        && schema_seq_no.map_or(true, |seq| schema.seq_id == seq)
                })
                .map(|(key, _)| key.clone())
                .ok_or_else(|| CoreError::NotFound(format!("no claim carries attribute '{}'", name)))
        };

        let mut grouped: BTreeMap<SchemaKey, ProofClaimsEntry> = BTreeMap::new();
        for (uuid, info) in &request.revealed_attrs {
            let schema_id = find_schema(&info.name, info.schema_seq_no)?;
            grouped
                .entry(schema_id)
                .or_default()
                .revealed
                .push((uuid.clone(), info.name.clone()));
        }
        for (uuid, predicate) in &request.predicates {
            let schema_id = find_schema(&predicate.attr_name, predicate.schema_seq_no)?;
            grouped
                .entry(schema_id)
                .or_default()
                .predicates
                .push((uuid.clone(), predicate.clone()));
        }

        // Sampled once and shared across every schema's equality sub-proof
        // (Design Notes §9: "explicit m1~ passing" so a single master secret
        // proves consistent across every claim in the presentation).
        let m1_tilde = rand_bits(LARGE_MTILDE);

        let mut transcript = ChallengeTranscript::new();
        let mut requested_proof = RequestedProof::default();

        struct PendingSchema {
            schema_id: SchemaKey,
            randomized: crate::crypto::primary_prover::RandomizedClaim,
            eq_blinds: crate::crypto::primary_prover::EqualProofBlinds,
            revealed_names: Vec<String>,
            ge_blinds: Vec<(PredicateGE, [BigNumber; 4], BigNumber, crate::crypto::primary_prover::GeProofBlinds)>,
            non_revoc: Option<(
                crate::application::datatypes::NonRevocProofCList,
                revocation_prover::NonRevocProofSecrets,
                revocation_prover::NonRevocProofBlinds,
            )>,
        }

        let mut pending = Vec::new();

        for (schema_id, entry) in &grouped {
            let claims = all_claims
                .get(schema_id)
                .ok_or_else(|| CoreError::NotFound(format!("no claim stored for schema {:?}", schema_id)))?;
            let attribute_values = wallet.get_attribute_values(schema_id).await?;
            let pk = repo.fetch_primary_public_key(schema_id).await?;
            let schema = schemas.get(schema_id).expect("fetched above");

            let randomized = randomize_claim(&pk, claims.primary());
            let revealed_names: Vec<String> = entry.revealed.iter().map(|(_, n)| n.clone()).collect();
            let (t_eq, eq_blinds) = init_eq_proof(&pk, &randomized, &attribute_values, &revealed_names, &m1_tilde);

            let mut ge_blinds = Vec::new();
            let mut ge_taus = Vec::new();
            for (_, predicate) in &entry.predicates {
                let value = attribute_values
                    .get(&predicate.attr_name)
                    .ok_or_else(|| CoreError::NotFound(format!("attribute '{}' not held", predicate.attr_name)))?;
                let attr_value: i64 = value
                    .raw
                    .parse()
                    .map_err(|_| CoreError::Input(format!("attribute '{}' is not numeric", predicate.attr_name)))?;
                let (_, t_list, t_delta, blinds) = init_ge_proof(&pk, predicate, attr_value)?;
                ge_taus.extend(t_list.iter().cloned());
                ge_taus.push(t_delta.clone());
                ge_blinds.push((predicate.clone(), t_list, t_delta, blinds));
            }
            transcript.push_primary(&randomized.a_prime, &t_eq, &ge_taus);

            let non_revoc = if let Some(non_revoc_claim) = claims.non_revoc() {
                let pk_r = repo.fetch_revocation_public_key(schema_id).await?;
                let accumulator = repo.fetch_accumulator(schema_id).await?;
                if !accumulator.v.contains(&non_revoc_claim.i) {
                    return Err(CoreError::Revoked(non_revoc_claim.i as u32));
                }
                let secrets = revocation_prover::init_secrets(non_revoc_claim);
                let blinds = revocation_prover::init_blinds();
                let c_list = revocation_prover::create_c_list(non_revoc_claim, &secrets, &pk_r);
                let tau_list = revocation_prover::create_tau_list(&pk_r, &accumulator.acc, &blinds, &c_list);
                transcript.push_non_revoc(&c_list, &tau_list);
                Some((c_list, secrets, blinds))
            } else {
                None
            };

            for (uuid, name) in &entry.revealed {
                let value = attribute_values
                    .get(name)
                    .ok_or_else(|| CoreError::NotFound(format!("attribute '{}' not held", name)))?;
                requested_proof.revealed_attrs.insert(
                    uuid.clone(),
                    (schema.seq_id.to_string(), value.raw.clone(), value.encoded.0.to_string()),
                );
            }
            for (uuid, predicate) in &entry.predicates {
                requested_proof.predicates.insert(uuid.clone(), schema.seq_id.to_string());
                requested_proof.unrevealed_attrs.insert(uuid.clone(), schema.seq_id.to_string());
            }

            pending.push(PendingSchema {
                schema_id: schema_id.clone(),
                randomized,
                eq_blinds,
                revealed_names,
                ge_blinds,
                non_revoc,
            });
        }

        let c_h = transcript.challenge(&request.nonce.0);
        let c_h_scalar = scalar_from_bytes_be(&int_to_bytes(&c_h));

        let mut proofs = BTreeMap::new();
        for p in pending {
            let attribute_values = wallet.get_attribute_values(&p.schema_id).await?;
            let ms = wallet.get_master_secret(&p.schema_id).await?;
            let claims = all_claims.get(&p.schema_id).expect("grouped from all_claims");
            let m2 = &claims.primary().m2.0;

            let eq_proof = finalize_eq_proof(
                &c_h,
                &p.randomized,
                &p.eq_blinds,
                &attribute_values,
                &p.revealed_names,
                &m1_tilde,
                &ms,
                m2,
            );
            let ge_proofs = p
                .ge_blinds
                .iter()
                .map(|(predicate, t_list, t_delta, blinds)| finalize_ge_proof(&c_h, predicate, t_list, t_delta, blinds))
                .collect();
            let primary_proof = assemble_primary_proof(eq_proof, ge_proofs);

            let non_revoc_proof = p.non_revoc.map(|(c_list, secrets, blinds)| {
                let x_list = revocation_prover::finalize_x_list(&c_h_scalar, &blinds, &secrets);
                NonRevocProof { x_list, c_list }
            });

            let schema = schemas.get(&p.schema_id).expect("fetched above");
            proofs.insert(
                schema.seq_id.to_string(),
                ProofInfo { primary_proof, non_revoc_proof },
            );
        }

        Ok(FullProof {
            proofs,
            aggregated_proof: AggregatedProof {
                c_hash: crate::application::datatypes::DecString(c_h),
                c_list: transcript.c_list().iter().cloned().map(crate::application::datatypes::DecString).collect(),
            },
            requested_proof,
        })
    }
}
