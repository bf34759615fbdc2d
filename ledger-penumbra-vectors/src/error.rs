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
use std::path::PathBuf;

use thiserror::Error;

use crate::plan::Authorization;

/// Errors raised while loading fixtures or generating vectors
#[derive(Error, Debug)]
pub enum VectorError {
    /// Fixture or output file could not be accessed
    #[error("{path}: {source}")]
    File {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Malformed hex
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),

    /// Transaction plan does not have the expected shape
    #[error("invalid transaction plan: {0}")]
    InvalidPlan(String),

    /// The external authorizer failed
    #[error("authorizer failed: {0}")]
    Authorizer(String),

    /// The effect hash returned by the authorizer is not 64 bytes
    #[error("effect hash must be 64 bytes, got {0}")]
    EffectHashLength(usize),

    /// A signature list does not match the actions requiring it
    #[error("expected {expected} {kind} signatures, got {found}")]
    SignatureCount {
        /// Authorization kind
        kind: Authorization,
        /// Actions requiring this authorization
        expected: usize,
        /// Signatures returned
        found: usize,
    },

    /// A signature is not 64 bytes
    #[error("{kind} signature {index} must be 64 bytes, got {len}")]
    SignatureLength {
        /// Authorization kind
        kind: Authorization,
        /// Position in the list
        index: usize,
        /// Actual length
        len: usize,
    },

    /// Background task panicked or was cancelled
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
