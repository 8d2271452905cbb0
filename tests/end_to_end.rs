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

use std::collections::BTreeMap;
use std::error::Error;

use anoncreds_core::application::issuer::Issuer;
use anoncreds_core::application::prover::Prover;
use anoncreds_core::application::verifier::Verifier;
use anoncreds_core::crypto::bignumber::rand_bits;
use anoncreds_core::crypto::hash_utils::encode_attribute;
use anoncreds_core::error::CoreError;
use anoncreds_core::repository::{InMemoryRepository, PublicRepository};
use anoncreds_core::wallet::InMemoryWallet;
use common::{age_at_least, gvt_attr_names, gvt_raw_attrs, issue_and_process, reveal, setup_schema, xyz_attr_names, xyz_raw_attrs};

fn fresh_nonce() -> anoncreds_core::crypto::bignumber::BigNumber {
    rand_bits(80)
}

/// Scenario 1: happy path, primary only. Reveal `name`, prove `age >= 18`.
#[tokio::test]
async fn scenario_1_happy_path_primary_only() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), false).await?;

    let mut revealed_attrs = BTreeMap::new();
    revealed_attrs.insert("u".to_string(), reveal("name"));
    let mut predicates = BTreeMap::new();
    predicates.insert("p".to_string(), age_at_least(18));

    let request = Verifier::create_proof_request("proof-of-age", "1.0", fresh_nonce(), revealed_attrs, predicates);
    let proof = Prover::present_proof(&wallet_prover, &repo, &request).await?;

    let ok = Verifier::verify(&repo, &request, &proof).await?;
    assert!(ok);

    let (seq, raw, encoded) = &proof.requested_proof.revealed_attrs["u"];
    assert_eq!(seq, &1.to_string());
    assert_eq!(raw, "Alex");
    assert_eq!(encoded.parse::<num_bigint_dig::BigInt>().unwrap(), encode_attribute("Alex"));

    Ok(())
}

/// Scenario 2: the predicate itself does not hold (age 28 < 30). Delta
/// is negative and cannot be decomposed as a sum of four squares.
#[tokio::test]
async fn scenario_2_predicate_fails_to_decompose() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), false).await?;

    let mut predicates = BTreeMap::new();
    predicates.insert("p".to_string(), age_at_least(30));
    let request = Verifier::create_proof_request("proof-of-age", "1.0", fresh_nonce(), BTreeMap::new(), predicates);

    let err = Prover::present_proof(&wallet_prover, &repo, &request).await.unwrap_err();
    match err {
        CoreError::Crypto(_) => {}
        other => panic!("expected a CryptoError, got {:?}", other),
    }

    Ok(())
}

/// Scenario 3: a proof that verifies fine on its own terms is handed to the
/// verifier with its `RequestedProof` tampered — "Alex" swapped for "Bob".
#[tokio::test]
async fn scenario_3_tampered_revealed_attribute_is_rejected() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), false).await?;

    let mut revealed_attrs = BTreeMap::new();
    revealed_attrs.insert("u".to_string(), reveal("name"));
    let request = Verifier::create_proof_request("proof-of-name", "1.0", fresh_nonce(), revealed_attrs, BTreeMap::new());

    let mut proof = Prover::present_proof(&wallet_prover, &repo, &request).await?;
    assert!(Verifier::verify(&repo, &request, &proof).await?);

    let entry = proof.requested_proof.revealed_attrs.get_mut("u").unwrap();
    entry.1 = "Bob".to_string();

    let ok = Verifier::verify(&repo, &request, &proof).await?;
    assert!(!ok);

    Ok(())
}

/// Scenario 4: revocation happens before the prover acts on it — both
/// `refresh_witness` and `present_proof` must surface the revocation.
#[tokio::test]
async fn scenario_4_revocation_before_present_proof_errors() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, true).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), true).await?;

    Issuer::revoke(&wallet_issuer, &repo, &schema_id, 1).await?;

    let refresh_err = Prover::refresh_witness(&wallet_prover, &repo, &schema_id).await.unwrap_err();
    assert!(matches!(refresh_err, CoreError::Revoked(1)));

    let mut revealed_attrs = BTreeMap::new();
    revealed_attrs.insert("u".to_string(), reveal("name"));
    let request = Verifier::create_proof_request("proof-of-name", "1.0", fresh_nonce(), revealed_attrs, BTreeMap::new());

    let present_err = Prover::present_proof(&wallet_prover, &repo, &request).await.unwrap_err();
    assert!(matches!(present_err, CoreError::Revoked(1)));

    Ok(())
}

/// Scenario 5: the prover presents a proof while still holding a fresh
/// witness, and the issuer revokes only afterward — `present_proof` must
/// succeed (the prover saw a live accumulator at the time), but the
/// verifier, checking against the *current* accumulator, must reject it.
#[tokio::test]
async fn scenario_5_stale_witness_accepted_by_prover_rejected_by_verifier() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let schema_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, true).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &schema_id, gvt_raw_attrs(), true).await?;

    let mut revealed_attrs = BTreeMap::new();
    revealed_attrs.insert("u".to_string(), reveal("name"));
    let request = Verifier::create_proof_request("proof-of-name", "1.0", fresh_nonce(), revealed_attrs, BTreeMap::new());

    let proof = Prover::present_proof(&wallet_prover, &repo, &request).await?;

    Issuer::revoke(&wallet_issuer, &repo, &schema_id, 1).await?;

    let ok = Verifier::verify(&repo, &request, &proof).await?;
    assert!(!ok);

    Ok(())
}

/// Scenario 6: two schemas sharing one master secret. One aggregated proof
/// reveals `name` + `age >= 18` from GVT and `status` from XYZCorp under a
/// single challenge; swapping the GVT equality proof's `m1_hat` in must
/// break verification, since both subproofs only validate together against
/// the same hidden master secret commitment.
#[tokio::test]
async fn scenario_6_cross_schema_aggregation() -> Result<(), Box<dyn Error>> {
    let repo = InMemoryRepository::new();
    let wallet_issuer = InMemoryWallet::new();
    let wallet_prover = InMemoryWallet::new();

    let gvt_id = setup_schema(&repo, &wallet_issuer, "GVT", gvt_attr_names(), 1, false).await?;
    let xyz_id = setup_schema(&repo, &wallet_issuer, "XYZCorp", xyz_attr_names(), 2, false).await?;

    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &gvt_id, gvt_raw_attrs(), false).await?;
    issue_and_process(&wallet_issuer, &wallet_prover, &repo, &xyz_id, xyz_raw_attrs(), false).await?;

    let mut revealed_attrs = BTreeMap::new();
    revealed_attrs.insert("name_from_gvt".to_string(), reveal("name"));
    revealed_attrs.insert("status_from_xyz".to_string(), reveal("status"));
    let mut predicates = BTreeMap::new();
    predicates.insert("age_ge_18".to_string(), age_at_least(18));

    let request = Verifier::create_proof_request("cross-schema", "1.0", fresh_nonce(), revealed_attrs, predicates);
    let proof = Prover::present_proof(&wallet_prover, &repo, &request).await?;

    assert!(Verifier::verify(&repo, &request, &proof).await?);

    let mut tampered = proof.clone();
    let gvt_seq = "1".to_string();
    let xyz_seq = "2".to_string();
    let m1_hat_from_xyz = tampered.proofs[&xyz_seq].primary_proof.eq_proof.m1_hat.clone();
    tampered
        .proofs
        .get_mut(&gvt_seq)
        .unwrap()
        .primary_proof
        .eq_proof
        .m1_hat = m1_hat_from_xyz;

    let ok = Verifier::verify(&repo, &request, &tampered).await?;
    assert!(!ok);

    Ok(())
}
