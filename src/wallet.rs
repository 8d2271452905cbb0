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

//! Wallet capability (spec §4.2, §6): a mapping from schema identifier to
//! the prover's or issuer's secret state. Purely a persistence contract — no
//! cryptography happens here. Ships one in-memory reference implementation
//! (spec §2.14); callers substitute their own persistent backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::datatypes::{
    AccumulatorSecretKey, AttributeValues, Claims, NonRevocClaimInitData, PrimaryClaimInitData, SchemaKey,
    RevocationSecretKey, SecretKey,
};
use crate::crypto::bignumber::BigNumber;
use crate::crypto::pairing::GroupOrderElement;
use crate::error::{WalletError, WalletResult};

/// Everything the prover or issuer keeps privately, keyed by `SchemaKey`.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn get_master_secret(&self, schema_id: &SchemaKey) -> WalletResult<BigNumber>;
    async fn submit_master_secret(&self, schema_id: &SchemaKey, ms: BigNumber) -> WalletResult<()>;

    async fn get_primary_claim_init_data(&self, schema_id: &SchemaKey) -> WalletResult<PrimaryClaimInitData>;
    async fn submit_primary_claim_init_data(
        &self,
        schema_id: &SchemaKey,
        data: PrimaryClaimInitData,
    ) -> WalletResult<()>;

    async fn get_non_revoc_claim_init_data(&self, schema_id: &SchemaKey) -> WalletResult<NonRevocClaimInitData>;
    async fn submit_non_revoc_claim_init_data(
        &self,
        schema_id: &SchemaKey,
        data: NonRevocClaimInitData,
    ) -> WalletResult<()>;

    async fn get_context_attribute(&self, schema_id: &SchemaKey) -> WalletResult<GroupOrderElement>;
    async fn submit_context_attribute(&self, schema_id: &SchemaKey, m2: GroupOrderElement) -> WalletResult<()>;

    async fn get_claim(&self, schema_id: &SchemaKey) -> WalletResult<Claims>;
    async fn submit_claim(&self, schema_id: &SchemaKey, claim: Claims) -> WalletResult<()>;

    /// The raw/encoded attribute values a claim was issued over, handed back
    /// by `Issuer::issue_claim` alongside the `Claims` itself (spec §4.3.2)
    /// and needed again at `presentProof` time to build revealed/hidden
    /// attribute sub-proofs.
    async fn get_attribute_values(&self, schema_id: &SchemaKey) -> WalletResult<AttributeValues>;
    async fn submit_attribute_values(&self, schema_id: &SchemaKey, values: AttributeValues) -> WalletResult<()>;

    async fn get_accumulator_secret_key(&self, schema_id: &SchemaKey) -> WalletResult<AccumulatorSecretKey>;
    async fn submit_accumulator_secret_key(
        &self,
        schema_id: &SchemaKey,
        key: AccumulatorSecretKey,
    ) -> WalletResult<()>;

    /// The issuer's own CL signing key `(p', q')` (spec §4.2 "keys").
    async fn get_signing_key(&self, schema_id: &SchemaKey) -> WalletResult<SecretKey>;
    async fn submit_signing_key(&self, schema_id: &SchemaKey, key: SecretKey) -> WalletResult<()>;

    /// The issuer's own non-revocation signing key `(x, sk)`.
    async fn get_revocation_secret_key(&self, schema_id: &SchemaKey) -> WalletResult<RevocationSecretKey>;
    async fn submit_revocation_secret_key(
        &self,
        schema_id: &SchemaKey,
        key: RevocationSecretKey,
    ) -> WalletResult<()>;

    /// All claims currently held, for `presentProof`'s claim search (spec
    /// §4.9 step 1).
    async fn get_all_claims(&self) -> WalletResult<HashMap<SchemaKey, Claims>>;
}

/// In-memory reference `Wallet`, suitable for tests and as a usage example;
/// not itself the deliverable (spec §6).
#[derive(Default)]
pub struct InMemoryWallet {
    master_secrets: RwLock<HashMap<SchemaKey, BigNumber>>,
    primary_init_data: RwLock<HashMap<SchemaKey, PrimaryClaimInitData>>,
    non_revoc_init_data: RwLock<HashMap<SchemaKey, NonRevocClaimInitData>>,
    context_attrs: RwLock<HashMap<SchemaKey, GroupOrderElement>>,
    claims: RwLock<HashMap<SchemaKey, Claims>>,
    attribute_values: RwLock<HashMap<SchemaKey, AttributeValues>>,
    accumulator_secret_keys: RwLock<HashMap<SchemaKey, AccumulatorSecretKey>>,
    signing_keys: RwLock<HashMap<SchemaKey, SecretKey>>,
    revocation_secret_keys: RwLock<HashMap<SchemaKey, RevocationSecretKey>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, schema_id: &SchemaKey) -> WalletError {
    WalletError::NotFound(format!("no {} stored for schema {:?}", what, schema_id))
}

#[async_trait]
impl Wallet for InMemoryWallet {
    async fn get_master_secret(&self, schema_id: &SchemaKey) -> WalletResult<BigNumber> {
        self.master_secrets
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("master secret", schema_id))
    }

    async fn submit_master_secret(&self, schema_id: &SchemaKey, ms: BigNumber) -> WalletResult<()> {
        self.master_secrets.write().await.insert(schema_id.clone(), ms);
        Ok(())
    }

    async fn get_primary_claim_init_data(&self, schema_id: &SchemaKey) -> WalletResult<PrimaryClaimInitData> {
        self.primary_init_data
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("primary claim init data", schema_id))
    }

    async fn submit_primary_claim_init_data(
        &self,
        schema_id: &SchemaKey,
        data: PrimaryClaimInitData,
    ) -> WalletResult<()> {
        self.primary_init_data.write().await.insert(schema_id.clone(), data);
        Ok(())
    }

    async fn get_non_revoc_claim_init_data(&self, schema_id: &SchemaKey) -> WalletResult<NonRevocClaimInitData> {
        self.non_revoc_init_data
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("non-revocation claim init data", schema_id))
    }

    async fn submit_non_revoc_claim_init_data(
        &self,
        schema_id: &SchemaKey,
        data: NonRevocClaimInitData,
    ) -> WalletResult<()> {
        self.non_revoc_init_data.write().await.insert(schema_id.clone(), data);
        Ok(())
    }

    async fn get_context_attribute(&self, schema_id: &SchemaKey) -> WalletResult<GroupOrderElement> {
        self.context_attrs
            .read()
            .await
            .get(schema_id)
            .copied()
            .ok_or_else(|| not_found("context attribute", schema_id))
    }

    async fn submit_context_attribute(&self, schema_id: &SchemaKey, m2: GroupOrderElement) -> WalletResult<()> {
        self.context_attrs.write().await.insert(schema_id.clone(), m2);
        Ok(())
    }

    async fn get_claim(&self, schema_id: &SchemaKey) -> WalletResult<Claims> {
        self.claims
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("claim", schema_id))
    }

    async fn submit_claim(&self, schema_id: &SchemaKey, claim: Claims) -> WalletResult<()> {
        self.claims.write().await.insert(schema_id.clone(), claim);
        Ok(())
    }

    async fn get_attribute_values(&self, schema_id: &SchemaKey) -> WalletResult<AttributeValues> {
        self.attribute_values
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("attribute values", schema_id))
    }

    async fn submit_attribute_values(&self, schema_id: &SchemaKey, values: AttributeValues) -> WalletResult<()> {
        self.attribute_values.write().await.insert(schema_id.clone(), values);
        Ok(())
    }

    async fn get_accumulator_secret_key(&self, schema_id: &SchemaKey) -> WalletResult<AccumulatorSecretKey> {
        self.accumulator_secret_keys
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("accumulator secret key", schema_id))
    }

    async fn submit_accumulator_secret_key(
        &self,
        schema_id: &SchemaKey,
        key: AccumulatorSecretKey,
    ) -> WalletResult<()> {
        self.accumulator_secret_keys.write().await.insert(schema_id.clone(), key);
        Ok(())
    }

    async fn get_signing_key(&self, schema_id: &SchemaKey) -> WalletResult<SecretKey> {
        self.signing_keys
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("signing key", schema_id))
    }

    async fn submit_signing_key(&self, schema_id: &SchemaKey, key: SecretKey) -> WalletResult<()> {
        self.signing_keys.write().await.insert(schema_id.clone(), key);
        Ok(())
    }

    async fn get_revocation_secret_key(&self, schema_id: &SchemaKey) -> WalletResult<RevocationSecretKey> {
        self.revocation_secret_keys
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("revocation secret key", schema_id))
    }

    async fn submit_revocation_secret_key(
        &self,
        schema_id: &SchemaKey,
        key: RevocationSecretKey,
    ) -> WalletResult<()> {
        self.revocation_secret_keys.write().await.insert(schema_id.clone(), key);
        Ok(())
    }

    async fn get_all_claims(&self) -> WalletResult<HashMap<SchemaKey, Claims>> {
        Ok(self.claims.read().await.clone())
    }
}
