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

//! Fixtures shared by the integration test suites (spec §8's literal
//! scenarios): the GVT/XYZCorp schemas, the standard userId, and the
//! end-to-end wiring of an `Issuer`/`Prover`/`Verifier` triple over the
//! in-memory `Wallet`/`PublicRepository`.

use std::collections::BTreeMap;

use anoncreds_core::application::datatypes::{AttributeInfo, PredicateGE, SchemaKey};
use anoncreds_core::application::issuer::Issuer;
use anoncreds_core::application::prover::Prover;
use anoncreds_core::error::CoreResult;
use anoncreds_core::repository::{InMemoryRepository, PublicRepository};
use anoncreds_core::wallet::{InMemoryWallet, Wallet};

pub const ISSUER_ID: &str = "did:example:issuer";
pub const USER_ID: &str = "BzfFCYk";
pub const CAPACITY_L: i32 = 5;

pub fn gvt_attr_names() -> Vec<String> {
    vec!["name".to_string(), "age".to_string(), "height".to_string(), "sex".to_string()]
}

pub fn gvt_raw_attrs() -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    attrs.insert("name".to_string(), "Alex".to_string());
    attrs.insert("age".to_string(), "28".to_string());
    attrs.insert("height".to_string(), "175".to_string());
    attrs.insert("sex".to_string(), "male".to_string());
    attrs
}

pub fn xyz_attr_names() -> Vec<String> {
    vec!["name".to_string(), "status".to_string()]
}

pub fn xyz_raw_attrs() -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    attrs.insert("name".to_string(), "Alex".to_string());
    attrs.insert("status".to_string(), "partial".to_string());
    attrs
}

pub fn age_at_least(value: i64) -> PredicateGE {
    PredicateGE {
        attr_name: "age".to_string(),
        value,
        schema_seq_no: None,
        claim_def_seq_no: None,
    }
}

pub fn reveal(name: &str) -> AttributeInfo {
    AttributeInfo {
        name: name.to_string(),
        schema_seq_no: None,
        claim_def_seq_no: None,
    }
}

/// One schema's issuer-side setup: publishes the schema, a primary key and
/// (optionally) a revocation registry of capacity `CAPACITY_L`.
pub async fn setup_schema(
    repo: &InMemoryRepository,
    wallet_issuer: &InMemoryWallet,
    name: &str,
    attr_names: Vec<String>,
    seq_id: i64,
    with_revocation: bool,
) -> CoreResult<SchemaKey> {
    let schema = Issuer::create_credential_schema(name, "1.0", ISSUER_ID, attr_names, seq_id);
    let schema_id = schema.key.clone();
    repo.publish_schema(schema).await?;

    Issuer::create_credential_definition(wallet_issuer, repo, &schema_id).await?;
    if with_revocation {
        Issuer::create_revocation_registry(wallet_issuer, repo, &schema_id, CAPACITY_L).await?;
    }
    Ok(schema_id)
}

/// Drives a claim from request through issuance to processing, leaving the
/// prover's wallet holding the final, folded claim.
pub async fn issue_and_process<W: Wallet, R: PublicRepository>(
    wallet_issuer: &W,
    wallet_prover: &W,
    repo: &R,
    schema_id: &SchemaKey,
    raw_attrs: BTreeMap<String, String>,
    with_revocation: bool,
) -> CoreResult<()> {
    let request = Prover::create_claim_request(wallet_prover, repo, schema_id, USER_ID, with_revocation).await?;
    let (claims, _attribute_values) =
        Issuer::issue_claim(wallet_issuer, repo, schema_id, &request, raw_attrs, with_revocation).await?;
    Prover::process_claim(wallet_prover, schema_id, claims).await?;
    Ok(())
}
