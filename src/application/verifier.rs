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

//! Verifier orchestration (spec §4.9 `verify`): rebuilds the Fiat-Shamir
//! transcript a [`FullProof`] implies from its responses alone and checks it
//! against the challenge the prover claims. The verifier never needs a
//! `Wallet` — only the shared, untrusted `PublicRepository`.

use std::collections::BTreeMap;

use crate::application::datatypes::{
    AttributeInfo, FullProof, PredicateGE, ProofRequest, SchemaKey,
};
use crate::crypto::bignumber::int_to_bytes;
use crate::crypto::hash_utils::encode_attribute;
use crate::crypto::pairing::scalar_from_bytes_be;
use crate::crypto::primary_verifier::{recompute_ge_tau, recompute_t_eq};
use crate::crypto::revocation_verifier::recompute_tau_list;
use crate::error::{CoreError, CoreResult};
use crate::repository::PublicRepository;
use crate::transcript::ChallengeTranscript;

pub struct Verifier;

impl Verifier {
    /// Builds a proof request. Publication/transport is the caller's job.
    pub fn create_proof_request(
        name: &str,
        version: &str,
        nonce: crate::crypto::bignumber::BigNumber,
        revealed_attrs: BTreeMap<String, AttributeInfo>,
        predicates: BTreeMap<String, PredicateGE>,
    ) -> ProofRequest {
        ProofRequest {
            name: name.to_string(),
            version: version.to_string(),
            nonce: crate::application::datatypes::DecString(nonce),
            revealed_attrs,
            predicates,
        }
    }

    /// `verify(ProofRequest, FullProof)` (spec §4.9). A well-formed proof
    /// that simply fails to check returns `Ok(false)`, never an error (spec
    /// §7) — only a malformed request/proof pairing (uuid sets that don't
    /// match between the two) is an `Err(CoreError::Input(_))`, since that is
    /// a caller mistake, not a verification outcome.
    pub async fn verify<R: PublicRepository>(repo: &R, request: &ProofRequest, proof: &FullProof) -> CoreResult<bool> {
        debug!("verifying proof for request '{}'", request.name);

        check_uuid_sets_match(request, proof)?;

        // The equality proof's own `revealed_attrs` is what the Tau
        // recomputation (and therefore the signature relation) actually
        // binds to; `RequestedProof.revealed_attrs` is merely the raw value
        // a prover claims to have disclosed. Nothing else ties the two
        // together, so a tampered claim ("Bob" swapped in for the disclosed
        // "Alex") must be caught here, not left to fall out of the hash
        // comparison.
        for (uuid, info) in &request.revealed_attrs {
            let (seq_str, raw, _) = &proof.requested_proof.revealed_attrs[uuid];
            let proof_info = match proof.proofs.get(seq_str) {
                Some(p) => p,
                None => return Ok(false),
            };
            let committed = match proof_info.primary_proof.eq_proof.revealed_attrs.get(&info.name) {
                Some(v) => v,
                None => return Ok(false),
            };
            if encode_attribute(raw) != *committed {
                return Ok(false);
            }
        }

        let c_h = proof.aggregated_proof.c_hash.0.clone();
        let c_h_scalar = scalar_from_bytes_be(&int_to_bytes(&c_h));

        let per_schema_revealed = group_revealed_attrs_by_schema(request, proof);

        // Resolve every sub-proof's `SchemaKey` up front and iterate in that
        // order — the prover builds the shared transcript by iterating its
        // `BTreeMap<SchemaKey, _>` grouping (application::prover::present_proof),
        // which sorts by `(name, version, issuerId)`, not by the wire-level
        // decimal `seq_id` string `proof.proofs` itself is keyed by. The two
        // orderings coincide only by coincidence for any given schema set, so
        // the verifier must resolve and re-sort rather than trust the map's
        // own key order.
        let mut ordered: Vec<(SchemaKey, &String, &crate::application::datatypes::ProofInfo)> =
            Vec::with_capacity(proof.proofs.len());
        for (seq_str, info) in &proof.proofs {
            let schema_seq_no: i64 = seq_str
                .parse()
                .map_err(|_| CoreError::Input(format!("proof key '{}' is not a schema sequence number", seq_str)))?;
            let schema_id: SchemaKey = repo.fetch_schema_key_by_seq_no(schema_seq_no).await?;
            ordered.push((schema_id, seq_str, info));
        }
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut transcript = ChallengeTranscript::new();

        for (schema_id, seq_str, info) in ordered {
            let pk = repo.fetch_primary_public_key(&schema_id).await?;

            let empty_revealed = BTreeMap::new();
            let revealed_attrs = per_schema_revealed.get(seq_str).unwrap_or(&empty_revealed);
            let t_eq_hat = recompute_t_eq(&pk, &info.primary_proof.eq_proof, revealed_attrs, &c_h)?;

            let mut ge_taus_hat = Vec::new();
            for ge_proof in &info.primary_proof.ge_proofs {
                ge_taus_hat.extend(recompute_ge_tau(&pk, ge_proof, &c_h)?);
            }
            transcript.push_primary(&info.primary_proof.eq_proof.a_prime, &t_eq_hat, &ge_taus_hat);

            if let Some(non_revoc_proof) = &info.non_revoc_proof {
                let pk_r = repo.fetch_revocation_public_key(&schema_id).await?;
                let accumulator = repo.fetch_accumulator(&schema_id).await?;
                let tau_hat = recompute_tau_list(
                    &pk_r,
                    &accumulator.acc,
                    &c_h_scalar,
                    &non_revoc_proof.c_list,
                    &non_revoc_proof.x_list,
                );
                transcript.push_non_revoc(&non_revoc_proof.c_list, &tau_hat);
            }
        }

        let c_h_prime = transcript.challenge(&request.nonce.0);
        Ok(c_h_prime == c_h)
    }
}

/// Rejects a request/proof pairing whose revealed-attribute or predicate
/// uuid sets don't match — an input-format error (spec §7), not a
/// verification failure.
fn check_uuid_sets_match(request: &ProofRequest, proof: &FullProof) -> CoreResult<()> {
    let req_revealed: std::collections::BTreeSet<&String> = request.revealed_attrs.keys().collect();
    let proof_revealed: std::collections::BTreeSet<&String> = proof.requested_proof.revealed_attrs.keys().collect();
    if req_revealed != proof_revealed {
        return Err(CoreError::Input(
            "revealed-attribute uuid set of the proof does not match the request".to_string(),
        ));
    }

    let req_predicates: std::collections::BTreeSet<&String> = request.predicates.keys().collect();
    let proof_predicates: std::collections::BTreeSet<&String> = proof.requested_proof.predicates.keys().collect();
    if req_predicates != proof_predicates {
        return Err(CoreError::Input(
            "predicate uuid set of the proof does not match the request".to_string(),
        ));
    }

    for (uuid, info) in &request.revealed_attrs {
        let (seq_str, _, _) = &proof.requested_proof.revealed_attrs[uuid];
        if let Some(expected) = info.schema_seq_no {
            if seq_str.parse::<i64>().ok() != Some(expected) {
                return Err(CoreError::Input(format!(
                    "revealed attribute '{}' was matched against a different schema than requested",
                    uuid
                )));
            }
        }
    }
    for (uuid, predicate) in &request.predicates {
        let seq_str = &proof.requested_proof.predicates[uuid];
        if let Some(expected) = predicate.schema_seq_no {
            if seq_str.parse::<i64>().ok() != Some(expected) {
                return Err(CoreError::Input(format!(
                    "predicate '{}' was matched against a different schema than requested",
                    uuid
                )));
            }
        }
    }

    Ok(())
}

/// Groups the request's revealed-attribute infos by the schema sequence
/// number the proof actually satisfied them against (not by the request's
/// own, possibly absent, `schema_seq_no` constraint) — the grouping a
/// verifier needs mirrors exactly what the prover committed to.
fn group_revealed_attrs_by_schema(
    request: &ProofRequest,
    proof: &FullProof,
) -> BTreeMap<String, BTreeMap<String, AttributeInfo>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, AttributeInfo>> = BTreeMap::new();
    for (uuid, info) in &request.revealed_attrs {
        let (seq_str, _, _) = &proof.requested_proof.revealed_attrs[uuid];
        grouped.entry(seq_str.clone()).or_default().insert(info.name.clone(), info.clone());
    }
    grouped
}
