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
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VectorError;
use crate::plan::TransactionPlan;

/// Output of authorizing a plan with a spend key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizedPlan {
    /// Canonical binary encoding of the plan
    pub plan: Vec<u8>,
    /// 64 byte effect hash
    pub effect_hash: Vec<u8>,
    /// One signature per spend, in action order
    pub spend_auths: Vec<Vec<u8>>,
    /// One signature per delegator vote
    pub delegator_vote_auths: Vec<Vec<u8>>,
    /// One signature per liquidity tournament vote
    pub lqt_vote_auths: Vec<Vec<u8>>,
}

/// Encodes a plan and authorizes it with the spend key derived from a seed phrase
pub trait PlanAuthorizer: Send + Sync {
    /// Encode `plan` and sign it with the keys of `seed_phrase`
    fn authorize(&self, seed_phrase: &str, plan: &TransactionPlan) -> Result<AuthorizedPlan, VectorError>;
}

#[derive(Serialize)]
struct AuthorizeRequest<'a> {
    seed_phrase: &'a str,
    plan: Value,
}

#[derive(Deserialize)]
struct AuthorizeResponse {
    plan: String,
    effect_hash: String,
    #[serde(default)]
    spend_auths: Vec<String>,
    #[serde(default)]
    delegator_vote_auths: Vec<String>,
    #[serde(default)]
    lqt_vote_auths: Vec<String>,
}

fn decode_all(list: &[String]) -> Result<Vec<Vec<u8>>, VectorError> {
    list.iter()
        .map(|s| hex::decode(s).map_err(VectorError::from))
        .collect()
}

/// Runs an external program per plan.
///
/// The program reads `{"seed_phrase", "plan"}` from stdin and prints
/// `{"plan", "effect_hash", "spend_auths", "delegator_vote_auths", "lqt_vote_auths"}`
/// with every value hex encoded. See `tools/authorize-plan.mjs`.
#[derive(Clone, Debug)]
pub struct CommandAuthorizer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandAuthorizer {
    /// Run `program` with `args` for every plan
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

impl PlanAuthorizer for CommandAuthorizer {
    fn authorize(&self, seed_phrase: &str, plan: &TransactionPlan) -> Result<AuthorizedPlan, VectorError> {
        let request = serde_json::to_vec(&AuthorizeRequest { seed_phrase, plan: plan.to_json()? })?;

        let spawn_error = |e: std::io::Error| VectorError::Authorizer(format!("{}: {e}", self.program.display()));
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // stdin is fed while both output pipes are drained
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&request)));

        let output = child.wait_with_output().map_err(spawn_error)?;
        let written = match writer {
            Some(handle) => handle
                .join()
                .map_err(|_| VectorError::Authorizer("stdin writer panicked".to_string()))?,
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(VectorError::Authorizer(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written.map_err(spawn_error)?;
        let response: AuthorizeResponse = serde_json::from_slice(&output.stdout)?;

        Ok(AuthorizedPlan {
            plan: hex::decode(response.plan)?,
            effect_hash: hex::decode(response.effect_hash)?,
            spend_auths: decode_all(&response.spend_auths)?,
            delegator_vote_auths: decode_all(&response.delegator_vote_auths)?,
            lqt_vote_auths: decode_all(&response.lqt_vote_auths)?,
        })
    }
}
