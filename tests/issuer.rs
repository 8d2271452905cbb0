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

mod common;

use std::error::Error;

use anoncreds_core::application::issuer::Issuer;
use anoncreds_core::repository::{InMemoryRepository, PublicRepository};
use anoncreds_core::wallet::{InMemoryWallet, Wallet};
use common::{gvt_attr_names, gvt_raw_attrs, issue_and_process, setup_schema, ISSUER_ID};

#[tokio::test]
async fn can_create_schema_and_credential_definition() -> Result<(), Box<dyn Error>> {
    anoncreds_core::init_logger();

    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    assert_eq!(schema_id.name, "GVT");
    assert_eq!(schema_id.issuer_id, ISSUER_ID);

    let schema = repo.fetch_schema(&schema_id).await?;
    assert_eq!(schema.attr_names, gvt_attr_names());
    assert_eq!(schema.seq_id, 1);

    let pk = repo.fetch_primary_public_key(&schema_id).await?;
    assert_eq!(pk.r.len(), gvt_attr_names().len());

    Ok(())
}

#[tokio::test]
async fn can_create_revocation_registry() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, true).await?;

    let accumulator = repo.fetch_accumulator(&schema_id).await?;
    assert_eq!(accumulator.max_claim_num, common::CAPACITY_L);
    assert!(accumulator.v.is_empty());
    assert_eq!(accumulator.current_i, 1);

    Ok(())
}

#[tokio::test]
async fn issue_claim_blind_signs_committed_attributes() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), false).await?;

    let claim = wallet_prover.get_claim(&schema_id).await?;
    assert!(claim.non_revoc().is_none());

    let attribute_values = wallet_prover.get_attribute_values(&schema_id).await?;
    assert_eq!(attribute_values.get("name").unwrap().raw, "Alex");

    Ok(())
}

#[tokio::test]
async fn revoke_removes_index_from_accumulator() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, true).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), true).await?;

    let accumulator_before = repo.fetch_accumulator(&schema_id).await?;
    assert!(accumulator_before.v.contains(&1));

    Issuer::revoke(&wallet_issuer, &repo, &schema_id, 1).await?;

    let accumulator_after = repo.fetch_accumulator(&schema_id).await?;
    assert!(!accumulator_after.v.contains(&1));
    assert_ne!(accumulator_after.acc, accumulator_before.acc);

    Ok(())
}
