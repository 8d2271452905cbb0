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
pub mod bignumber;
pub mod hash_utils;
pub mod pairing;

pub mod primary_issuer;
pub mod primary_prover;
pub mod primary_verifier;

pub mod revocation_issuer;
pub mod revocation_prover;
pub mod revocation_verifier;
