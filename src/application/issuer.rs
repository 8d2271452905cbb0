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

//! Issuer orchestration (spec §4.3, §4.6): schema/key publication, blind
//! claim issuance and revocation, wired through the `Wallet`/`PublicRepository`
//! capability traits. The `Issuer` itself is stateless — every operation
//! takes the schema it concerns and the wallet/repository to read and write
//! through, mirroring the teacher's bare `Issuer {}` associated-function shape.

use std::collections::BTreeMap;

use crate::application::datatypes::{
    Accumulator, AccumulatorSecretKey, AttributeValue, AttributeValues, Claims, ClaimRequest,
    NonRevocationClaim, PrimaryClaim, PublicKey, RevocationPublicKey, Schema, SchemaKey,
};
use crate::crypto::bignumber::int_to_bytes;
use crate::crypto::hash_utils::encode_attribute;
use crate::crypto::pairing::{scalar_from_bytes_be, PointG1};
use crate::crypto::primary_issuer;
use crate::crypto::revocation_issuer::{self, RevocationIssuerState};
use crate::error::{CoreError, CoreResult};
use crate::repository::{with_schema_lock, PublicRepository};
use crate::wallet::Wallet;

pub struct Issuer;

impl Issuer {
    /// Builds a schema record. Publication is the caller's job
    /// (`repo.publish_schema`), since a schema may be shared by several
    /// credential definitions before any of them issues a claim.
    pub fn create_credential_schema(
        name: &str,
        version: &str,
        issuer_id: &str,
        attr_names: Vec<String>,
        seq_id: i64,
    ) -> Schema {
        Schema {
            key: SchemaKey {
                name: name.to_string(),
                version: version.to_string(),
                issuer_id: issuer_id.to_string(),
            },
            attr_names,
            seq_id,
        }
    }

    /// Generates a fresh CL signing key over the schema's attribute set,
    /// keeps the secret factors in the wallet, and publishes the public key.
    pub async fn create_credential_definition<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
    ) -> CoreResult<PublicKey> {
        let schema = repo.fetch_schema(schema_id).await?;
        let (pk, sk) = primary_issuer::generate_keys(&schema.attr_names)?;
        wallet.submit_signing_key(schema_id, sk).await?;
        repo.publish_primary_public_key(schema_id, pk.clone()).await?;
        Ok(pk)
    }

    /// Generates the pairing-group revocation key and an empty accumulator
    /// of capacity `capacity_l`, publishing both plus the G2 tails table.
    pub async fn create_revocation_registry<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
        capacity_l: i32,
    ) -> CoreResult<RevocationPublicKey> {
        let (pk_r, sk_r) = revocation_issuer::generate_revocation_keys();
        wallet.submit_revocation_secret_key(schema_id, sk_r).await?;
        repo.publish_revocation_public_key(schema_id, pk_r.clone()).await?;

        let (accumulator, issuer_state) = revocation_issuer::issue_accumulator(&pk_r, capacity_l);
        wallet.submit_accumulator_secret_key(schema_id, issuer_state.gamma).await?;
        repo.publish_accumulator(schema_id, accumulator).await?;
        repo.submit_tails_g2(schema_id, issuer_state.tails_g2).await?;

        Ok(pk_r)
    }

    /// `issueClaim(schemaId, ClaimRequest)` (spec §4.3.2): encodes the raw
    /// attribute values, blind-signs them against the request's commitment,
    /// and — if the credential definition carries revocation support and the
    /// request supplied `ur` — issues a non-revocation witness against the
    /// schema's accumulator. Returns the claim alongside the attribute values
    /// it was issued over, per the spec's literal return shape.
    pub async fn issue_claim<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
        request: &ClaimRequest,
        raw_attributes: BTreeMap<String, String>,
        issue_non_revoc: bool,
    ) -> CoreResult<(Claims, AttributeValues)> {
        debug!("issuing claim for schema {:?}, non-revocation: {}", schema_id, issue_non_revoc);

        let attribute_values: AttributeValues = raw_attributes
            .into_iter()
            .map(|(name, raw)| {
                let encoded = encode_attribute(&raw);
                (
                    name,
                    AttributeValue {
                        raw,
                        encoded: crate::application::datatypes::DecString(encoded),
                    },
                )
            })
            .collect();

        let pk = repo.fetch_primary_public_key(schema_id).await?;
        let sk = wallet.get_signing_key(schema_id).await?;
        let context_attribute = primary_issuer::generate_context_attribute();

        // write context attribute first (spec §7's crash-consistent ordering
        // for the partially-observable issuance sequence).
        let m2_scalar = scalar_from_bytes_be(&int_to_bytes(&context_attribute));
        wallet.submit_context_attribute(schema_id, m2_scalar).await?;

        let primary: PrimaryClaim =
            primary_issuer::issue_primary_claim(&pk, &sk, &request.u.0, &context_attribute, &attribute_values)?;

        let claims = if issue_non_revoc {
            let ur = request.ur.ok_or_else(|| {
                CoreError::Input("non-revocation claim requested but ClaimRequest.ur is missing".into())
            })?;
            let non_revoc = self_issue_non_revocation_claim(wallet, repo, schema_id, &ur, &m2_scalar).await?;
            Claims::Both { primary, non_revoc }
        } else {
            Claims::Primary(primary)
        };

        // write claim (pre-fold; the prover's processClaim overwrites this
        // with the v'+v'' folded version once it runs).
        wallet.submit_claim(schema_id, claims.clone()).await?;
        wallet.submit_attribute_values(schema_id, attribute_values.clone()).await?;

        Ok((claims, attribute_values))
    }

    /// Removes `i` from the schema's accumulator (spec §4.6 `revoke`).
    /// Serialized against concurrent witness refreshes via the repository's
    /// per-schema lock (spec §5).
    pub async fn revoke<W: Wallet, R: PublicRepository>(
        wallet: &W,
        repo: &R,
        schema_id: &SchemaKey,
        i: i32,
    ) -> CoreResult<()> {
        debug!("revoking index {} for schema {:?}", i, schema_id);

        let gamma = wallet.get_accumulator_secret_key(schema_id).await?;
        let pk_r = repo.fetch_revocation_public_key(schema_id).await?;

        let lock = repo.lock_schema(schema_id).await;
        let _guard = with_schema_lock(&lock).await;

        let mut accumulator = repo.fetch_accumulator(schema_id).await?;
        let issuer_state = rebuild_issuer_state(&gamma, &pk_r, accumulator.max_claim_num);
        revocation_issuer::revoke(&mut accumulator, &issuer_state, i)?;
        repo.publish_accumulator(schema_id, accumulator).await?;
        Ok(())
    }
}

async fn self_issue_non_revocation_claim<W: Wallet, R: PublicRepository>(
    wallet: &W,
    repo: &R,
    schema_id: &SchemaKey,
    ur: &PointG1,
    m2_scalar: &crate::crypto::pairing::GroupOrderElement,
) -> CoreResult<NonRevocationClaim> {
    let pk_r = repo.fetch_revocation_public_key(schema_id).await?;
    let sk_r = wallet.get_revocation_secret_key(schema_id).await?;
    let gamma = wallet.get_accumulator_secret_key(schema_id).await?;

    let lock = repo.lock_schema(schema_id).await;
    let _guard = with_schema_lock(&lock).await;

    let mut accumulator: Accumulator = repo.fetch_accumulator(schema_id).await?;
    let issuer_state = rebuild_issuer_state(&gamma, &pk_r, accumulator.max_claim_num);

    let claim = revocation_issuer::issue_non_revocation_claim(
        &mut accumulator,
        &pk_r,
        &sk_r,
        &issuer_state,
        m2_scalar,
        ur,
        None,
    )?;
    repo.publish_accumulator(schema_id, accumulator).await?;
    Ok(claim)
}

/// Regenerates the issuer's tails tables from the accumulator trapdoor
/// gamma, the published revocation key and the schema's registered
/// capacity. Tails are a deterministic function of `(gamma, g, g', L)`
/// (spec §3), so the wallet only needs to keep gamma itself — recomputing
/// the tables on demand avoids a second, redundant private-storage slot.
fn rebuild_issuer_state(
    gamma: &AccumulatorSecretKey,
    pk_r: &RevocationPublicKey,
    capacity_l: i32,
) -> RevocationIssuerState {
    let (tails_g1, tails_g2) =
        revocation_issuer::build_tails_tables(&gamma.gamma, &pk_r.g, &pk_r.g_dash, capacity_l);

    RevocationIssuerState {
        gamma: gamma.clone(),
        tails_g1,
        tails_g2,
    }
}
