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

//! Public repository capability (spec §4.2, §6): the shared, untrusted
//! bulletin board issuers publish schemas, public keys, accumulators and
//! tails to, and provers/verifiers read from. Ships one in-memory reference
//! implementation (spec §2.14).
//!
//! Per-schema mutations (accumulator updates racing a revocation against a
//! witness refresh) must serialize through a single lock per `SchemaKey`
//! (spec §5) — callers hold the guard this trait's `*_lock` method hands
//! back for the duration of a read-modify-write sequence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::application::datatypes::{Accumulator, PublicKey, RevocationPublicKey, Schema, SchemaKey};
use crate::crypto::pairing::PointG2;
use crate::error::{RepoError, RepoResult};

/// Shared, untrusted storage for everything an issuer publishes.
#[async_trait]
pub trait PublicRepository: Send + Sync {
    async fn publish_schema(&self, schema: Schema) -> RepoResult<()>;
    async fn fetch_schema(&self, schema_id: &SchemaKey) -> RepoResult<Schema>;

    /// Resolves the wire-level `schema_seq_no` a [`FullProof`](crate::application::datatypes::FullProof)
    /// is keyed by back to the `SchemaKey` the rest of this trait addresses by.
    async fn fetch_schema_key_by_seq_no(&self, schema_seq_no: i64) -> RepoResult<SchemaKey>;

    async fn publish_primary_public_key(&self, schema_id: &SchemaKey, pk: PublicKey) -> RepoResult<()>;
    async fn fetch_primary_public_key(&self, schema_id: &SchemaKey) -> RepoResult<PublicKey>;

    async fn publish_revocation_public_key(&self, schema_id: &SchemaKey, pk: RevocationPublicKey) -> RepoResult<()>;
    async fn fetch_revocation_public_key(&self, schema_id: &SchemaKey) -> RepoResult<RevocationPublicKey>;

    async fn publish_accumulator(&self, schema_id: &SchemaKey, acc: Accumulator) -> RepoResult<()>;
    async fn fetch_accumulator(&self, schema_id: &SchemaKey) -> RepoResult<Accumulator>;

    /// Only the G2 tails table is ever read back through this trait: G1
    /// tails exist solely so the issuer can rebuild its own witness-issuance
    /// state from `gamma` (DESIGN.md's tails-persistence decision), and no
    /// prover or verifier operation ever needs one. There is deliberately no
    /// `publish_tails_g1`/`fetch_tails_g1` pair.
    async fn fetch_tails_g2(&self, schema_id: &SchemaKey) -> RepoResult<HashMap<i32, PointG2>>;
    async fn submit_tails_g2(&self, schema_id: &SchemaKey, tails_g2: HashMap<i32, PointG2>) -> RepoResult<()>;

    /// Serializes concurrent read-modify-write access to one schema's
    /// accumulator state (spec §5). Held across a revoke-then-republish or
    /// witness-refresh-then-prove sequence.
    async fn lock_schema(&self, schema_id: &SchemaKey) -> Arc<Mutex<()>>;
}

#[derive(Default)]
pub struct InMemoryRepository {
    schemas: RwLock<HashMap<SchemaKey, Schema>>,
    primary_keys: RwLock<HashMap<SchemaKey, PublicKey>>,
    revocation_keys: RwLock<HashMap<SchemaKey, RevocationPublicKey>>,
    accumulators: RwLock<HashMap<SchemaKey, Accumulator>>,
    tails_g2: RwLock<HashMap<SchemaKey, HashMap<i32, PointG2>>>,
    locks: Mutex<HashMap<SchemaKey, Arc<Mutex<()>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, schema_id: &SchemaKey) -> RepoError {
    RepoError::NotFound(format!("no {} published for schema {:?}", what, schema_id))
}

#[async_trait]
impl PublicRepository for InMemoryRepository {
    async fn publish_schema(&self, schema: Schema) -> RepoResult<()> {
        self.schemas.write().await.insert(schema.key.clone(), schema);
        Ok(())
    }

    async fn fetch_schema(&self, schema_id: &SchemaKey) -> RepoResult<Schema> {
        self.schemas
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("schema", schema_id))
    }

    async fn fetch_schema_key_by_seq_no(&self, schema_seq_no: i64) -> RepoResult<SchemaKey> {
        self.schemas
            .read()
            .await
            .values()
            .find(|schema| schema.seq_id == schema_seq_no)
            .map(|schema| schema.key.clone())
            .ok_or_else(|| RepoError::NotFound(format!("no schema published with seq_no {}", schema_seq_no)))
    }

    async fn publish_primary_public_key(&self, schema_id: &SchemaKey, pk: PublicKey) -> RepoResult<()> {
        self.primary_keys.write().await.insert(schema_id.clone(), pk);
        Ok(())
    }

    async fn fetch_primary_public_key(&self, schema_id: &SchemaKey) -> RepoResult<PublicKey> {
        self.primary_keys
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("primary public key", schema_id))
    }

    async fn publish_revocation_public_key(&self, schema_id: &SchemaKey, pk: RevocationPublicKey) -> RepoResult<()> {
        self.revocation_keys.write().await.insert(schema_id.clone(), pk);
        Ok(())
    }

    async fn fetch_revocation_public_key(&self, schema_id: &SchemaKey) -> RepoResult<RevocationPublicKey> {
        self.revocation_keys
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("revocation public key", schema_id))
    }

    async fn publish_accumulator(&self, schema_id: &SchemaKey, acc: Accumulator) -> RepoResult<()> {
        self.accumulators.write().await.insert(schema_id.clone(), acc);
        Ok(())
    }

    async fn fetch_accumulator(&self, schema_id: &SchemaKey) -> RepoResult<Accumulator> {
        self.accumulators
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("accumulator", schema_id))
    }

    async fn fetch_tails_g2(&self, schema_id: &SchemaKey) -> RepoResult<HashMap<i32, PointG2>> {
        self.tails_g2
            .read()
            .await
            .get(schema_id)
            .cloned()
            .ok_or_else(|| not_found("tails", schema_id))
    }

    async fn submit_tails_g2(&self, schema_id: &SchemaKey, tails_g2: HashMap<i32, PointG2>) -> RepoResult<()> {
        self.tails_g2.write().await.insert(schema_id.clone(), tails_g2);
        Ok(())
    }

    async fn lock_schema(&self, schema_id: &SchemaKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(schema_id.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// Borrow-checker-friendly wrapper a caller can hold across an `.await`
/// boundary while it reads, then writes, a schema's accumulator.
pub async fn with_schema_lock<'a>(lock: &'a Arc<Mutex<()>>) -> MutexGuard<'a, ()> {
    lock.lock().await
}
