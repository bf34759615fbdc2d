/*******************************************************************************
*   (c) 2018 - 2024 Zondax AG
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

/// Signing fixture with a single expected spend signature
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Position in the fixture file
    pub idx: u32,
    /// Snapshot directory name
    pub name: String,
    /// Hex encoded transaction plan
    pub blob: String,
    /// Hex encoded 64 byte effect hash
    pub expected_effect_hash: String,
    /// Hex encoded spend authorization signature
    pub expected_spend_sig: String,
    /// Hex encoded denom metadata entries
    #[serde(default)]
    pub metadata: Vec<String>,
}

/// Signing fixture generated from the reference transaction plans
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pr4948TestCase {
    /// Index of the reference plan
    pub idx: u32,
    /// Snapshot directory name
    pub name: String,
    /// Hex encoded transaction plan
    pub blob: String,
    /// Hex encoded 64 byte effect hash
    pub expected_effect_hash: String,
    /// Spend signatures, one per spend
    #[serde(default)]
    pub expected_spend_sigs: Vec<String>,
    /// Delegator vote signatures
    #[serde(default)]
    pub expected_delegator_vote_sigs: Vec<String>,
    /// Liquidity tournament vote signatures
    #[serde(default)]
    pub expected_lqt_vote_sigs: Vec<String>,
    /// Action case names in plan order
    #[serde(rename = "actionTypes", default)]
    pub action_types: Vec<String>,
    /// Hex encoded denom metadata entries
    #[serde(default)]
    pub metadata: Vec<String>,
}

impl TestCase {
    /// Binary transaction plan
    pub fn decode_blob(&self) -> Result<Vec<u8>, VectorError> {
        Ok(hex::decode(&self.blob)?)
    }
}

impl Pr4948TestCase {
    /// Binary transaction plan
    pub fn decode_blob(&self) -> Result<Vec<u8>, VectorError> {
        Ok(hex::decode(&self.blob)?)
    }
}

/// Read a JSON array of fixtures
pub fn load_testcases<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, VectorError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|source| VectorError::File { path: path.to_path_buf(), source })?;
    let testcases: Vec<T> = serde_json::from_str(&content)?;

    log::info!("loaded {} test cases from {}", testcases.len(), path.display());

    Ok(testcases)
}
