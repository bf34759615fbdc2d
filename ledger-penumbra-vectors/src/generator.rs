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
//! Builds signing fixtures from the reference transaction plans published
//! with the Penumbra repository

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authorizer::PlanAuthorizer;
use crate::error::VectorError;
use crate::fixtures::Pr4948TestCase;
use crate::plan::{Authorization, TransactionPlan};

/// Penumbra commit the reference plans are taken from
pub const PR_COMMIT: &str = "d2e56dbf6c721784056d88740b072c3c194cf6eb";

/// Seed phrase the fixtures are generated with, and the emulator is loaded with
pub const TEST_SEED: &str = "equip will roof matter pink blind book anxiety banner elbow sun young";

/// Repository raw content root the plans are fetched from
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/penumbra-zone/penumbra";

/// Plans `0..VECTOR_COUNT` are fetched
pub const VECTOR_COUNT: usize = 11;

/// Indices without a usable plan
pub const SKIPPED_INDICES: [usize; 1] = [2];

/// Generated test cases
pub const TESTCASES_FILE: &str = "penumbra_pr4948_action_testcases.json";
/// Fetched plans, kept alongside the test cases
pub const PLANS_FILE: &str = "penumbra_pr4948_transaction_plans.json";

const EFFECT_HASH_LEN: usize = 64;
const SIGNATURE_LEN: usize = 64;
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where plans come from and how they are signed
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    /// Raw content root, without a trailing commit
    pub base_url: String,
    /// Commit the plans are taken from
    pub commit: String,
    /// Plans `0..count` are considered
    pub count: usize,
    /// Indices that are never fetched
    pub skip: Vec<usize>,
    /// Seed phrase handed to the authorizer
    pub seed: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            commit: PR_COMMIT.to_string(),
            count: VECTOR_COUNT,
            skip: SKIPPED_INDICES.to_vec(),
            seed: TEST_SEED.to_string(),
        }
    }
}

/// A fetched plan, as written to [`PLANS_FILE`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchedPlan {
    /// Index in the reference set
    pub index: usize,
    /// Proto-JSON plan as published
    pub plan: Value,
}

/// URL of reference plan `index` at `commit`
pub fn plan_url(base_url: &str, commit: &str, index: usize) -> String {
    format!(
        "{}/{}/crates/core/transaction/tests/signing_test_vectors/transaction_plan_{}.json",
        base_url.trim_end_matches('/'),
        commit,
        index
    )
}

fn fetch_json(url: &str) -> Option<Value> {
    match ureq::get(url).timeout(FETCH_TIMEOUT).call() {
        Ok(response) => match response.into_json::<Value>() {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("{url}: invalid json: {e}");
                None
            },
        },
        Err(ureq::Error::Status(code, _)) => {
            log::warn!("{url}: status {code}");
            None
        },
        Err(e) => {
            log::warn!("{url}: {e}");
            None
        },
    }
}

/// Fetch every non-skipped plan in parallel.
///
/// Plans that cannot be fetched are left out; the result is ordered by index.
pub async fn fetch_plans(options: &GeneratorOptions) -> Vec<FetchedPlan> {
    let requests = (0..options.count)
        .filter(|i| !options.skip.contains(i))
        .map(|index| {
            let url = plan_url(&options.base_url, &options.commit, index);
            tokio::task::spawn_blocking(move || fetch_json(&url).map(|plan| FetchedPlan { index, plan }))
        });

    futures::future::join_all(requests)
        .await
        .into_iter()
        .filter_map(|r| match r {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("fetch task failed: {e}");
                None
            },
        })
        .collect()
}

fn check_signatures(kind: Authorization, expected: usize, signatures: &[Vec<u8>]) -> Result<Vec<String>, VectorError> {
    if signatures.len() != expected {
        return Err(VectorError::SignatureCount { kind, expected, found: signatures.len() });
    }

    signatures
        .iter()
        .enumerate()
        .map(|(index, sig)| {
            if sig.len() != SIGNATURE_LEN {
                return Err(VectorError::SignatureLength { kind, index, len: sig.len() });
            }
            Ok(hex::encode(sig))
        })
        .collect()
}

/// Decode, authorize and check one plan
pub fn convert_plan_to_testcase(
    json: &Value,
    index: usize,
    seed: &str,
    authorizer: &dyn PlanAuthorizer,
) -> Result<Pr4948TestCase, VectorError> {
    let plan = TransactionPlan::from_json(json)?;
    let authorized = authorizer.authorize(seed, &plan)?;

    if authorized.effect_hash.len() != EFFECT_HASH_LEN {
        return Err(VectorError::EffectHashLength(authorized.effect_hash.len()));
    }

    let required = plan.required_authorizations();
    let spend = check_signatures(Authorization::SpendAuth, required.spend, &authorized.spend_auths)?;
    let delegator_vote = check_signatures(
        Authorization::DelegatorVote,
        required.delegator_vote,
        &authorized.delegator_vote_auths,
    )?;
    let lqt_vote = check_signatures(Authorization::LqtVote, required.lqt_vote, &authorized.lqt_vote_auths)?;

    Ok(Pr4948TestCase {
        idx: index as u32,
        name: format!("Penumbra_PR4948_Vector_{index}"),
        blob: hex::encode(&authorized.plan),
        expected_effect_hash: hex::encode(&authorized.effect_hash),
        expected_spend_sigs: spend,
        expected_delegator_vote_sigs: delegator_vote,
        expected_lqt_vote_sigs: lqt_vote,
        action_types: plan.action_types(),
        metadata: Vec::new(),
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), VectorError> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|source| VectorError::File { path: path.to_path_buf(), source })
}

/// Write [`TESTCASES_FILE`] and [`PLANS_FILE`] into `dir`
pub fn write_outputs(dir: &Path, testcases: &[Pr4948TestCase], plans: &[FetchedPlan]) -> Result<(), VectorError> {
    std::fs::create_dir_all(dir).map_err(|source| VectorError::File { path: dir.to_path_buf(), source })?;

    write_json(&dir.join(TESTCASES_FILE), testcases)?;
    write_json(&dir.join(PLANS_FILE), plans)?;

    log::info!("Generated {} test cases", testcases.len());
    Ok(())
}

/// Fetch, convert and write. Returns the number of test cases written.
///
/// Authorization runs on the blocking pool.
pub async fn generate(
    options: &GeneratorOptions,
    authorizer: Arc<dyn PlanAuthorizer>,
    out_dir: &Path,
) -> Result<usize, VectorError> {
    let plans = fetch_plans(options).await;
    log::info!("fetched {} transaction plans", plans.len());

    let seed = options.seed.clone();
    let (plans, testcases) = tokio::task::spawn_blocking(move || {
        let testcases = plans
            .iter()
            .map(|p| convert_plan_to_testcase(&p.plan, p.index, &seed, authorizer.as_ref()))
            .collect::<Result<Vec<_>, _>>();
        (plans, testcases)
    })
    .await?;
    let testcases = testcases?;

    write_outputs(out_dir, &testcases, &plans)?;
    Ok(testcases.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::authorizer::AuthorizedPlan;
    use crate::fixtures::load_testcases;

    /// Returns one 64 byte signature per requested action, or a fixed answer
    #[derive(Default)]
    struct FakeAuthorizer {
        answer: Option<AuthorizedPlan>,
        seeds: Mutex<Vec<String>>,
    }

    impl PlanAuthorizer for FakeAuthorizer {
        fn authorize(&self, seed_phrase: &str, plan: &TransactionPlan) -> Result<AuthorizedPlan, VectorError> {
            self.seeds
                .lock()
                .unwrap()
                .push(seed_phrase.to_string());
            if let Some(answer) = &self.answer {
                return Ok(answer.clone());
            }

            let required = plan.required_authorizations();
            Ok(AuthorizedPlan {
                plan: vec![0x0a, plan.actions.len() as u8],
                effect_hash: vec![0xee; 64],
                spend_auths: vec![vec![0x01; 64]; required.spend],
                delegator_vote_auths: vec![vec![0x02; 64]; required.delegator_vote],
                lqt_vote_auths: vec![vec![0x03; 64]; required.lqt_vote],
            })
        }
    }

    fn plan_json() -> Value {
        json!({
            "actions": [
                { "spend": {} },
                { "output": {} },
                { "delegatorVote": {} }
            ]
        })
    }

    #[test]
    fn reference_urls() {
        assert_eq!(
            plan_url(DEFAULT_BASE_URL, PR_COMMIT, 3),
            "https://raw.githubusercontent.com/penumbra-zone/penumbra/d2e56dbf6c721784056d88740b072c3c194cf6eb/crates/core/transaction/tests/signing_test_vectors/transaction_plan_3.json"
        );
    }

    #[test]
    fn converts_plan() {
        let authorizer = FakeAuthorizer::default();
        let testcase = convert_plan_to_testcase(&plan_json(), 7, TEST_SEED, &authorizer).unwrap();

        assert_eq!(testcase.idx, 7);
        assert_eq!(testcase.name, "Penumbra_PR4948_Vector_7");
        assert_eq!(testcase.blob, "0a03");
        assert_eq!(testcase.expected_effect_hash, "ee".repeat(64));
        assert_eq!(testcase.expected_spend_sigs, vec!["01".repeat(64)]);
        assert_eq!(testcase.expected_delegator_vote_sigs, vec!["02".repeat(64)]);
        assert!(testcase.expected_lqt_vote_sigs.is_empty());
        assert_eq!(testcase.action_types, vec!["spend", "output", "delegatorVote"]);
        assert!(testcase.metadata.is_empty());
        assert_eq!(authorizer.seeds.lock().unwrap().as_slice(), &[TEST_SEED.to_string()]);
    }

    #[test]
    fn rejects_short_effect_hash() {
        let authorizer = FakeAuthorizer {
            answer: Some(AuthorizedPlan {
                effect_hash: vec![0; 32],
                spend_auths: vec![vec![0; 64]],
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = convert_plan_to_testcase(&plan_json(), 0, TEST_SEED, &authorizer).unwrap_err();
        assert!(matches!(err, VectorError::EffectHashLength(32)));
    }

    #[test]
    fn rejects_missing_signatures() {
        let authorizer = FakeAuthorizer {
            answer: Some(AuthorizedPlan {
                effect_hash: vec![0; 64],
                spend_auths: vec![vec![0; 64]],
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = convert_plan_to_testcase(&plan_json(), 0, TEST_SEED, &authorizer).unwrap_err();
        assert!(matches!(
            err,
            VectorError::SignatureCount { kind: Authorization::DelegatorVote, expected: 1, found: 0 }
        ));
    }

    #[test]
    fn rejects_malformed_plan() {
        let authorizer = FakeAuthorizer::default();
        let err = convert_plan_to_testcase(&json!({ "actions": [{}] }), 0, TEST_SEED, &authorizer).unwrap_err();
        assert!(matches!(err, VectorError::InvalidPlan(_)));
        assert!(authorizer.seeds.lock().unwrap().is_empty());
    }

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let authorizer = FakeAuthorizer::default();
        let plans = vec![FetchedPlan { index: 4, plan: plan_json() }];
        let testcases = vec![convert_plan_to_testcase(&plans[0].plan, 4, TEST_SEED, &authorizer).unwrap()];

        write_outputs(dir.path(), &testcases, &plans).unwrap();

        let loaded = load_testcases::<Pr4948TestCase>(dir.path().join(TESTCASES_FILE)).unwrap();
        assert_eq!(loaded, testcases);

        let written = std::fs::read_to_string(dir.path().join(PLANS_FILE)).unwrap();
        assert!(written.starts_with("[\n  {\n    \"index\": 4,"));
        let plans_back: Vec<FetchedPlan> = serde_json::from_str(&written).unwrap();
        assert_eq!(plans_back, plans);
    }

    #[tokio::test]
    async fn unreachable_plans_are_skipped() {
        let options = GeneratorOptions { base_url: "http://127.0.0.1:1".to_string(), count: 3, ..Default::default() };
        assert!(fetch_plans(&options).await.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let written = generate(&options, Arc::new(FakeAuthorizer::default()), dir.path())
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(std::fs::read_to_string(dir.path().join(TESTCASES_FILE)).unwrap(), "[]");
    }

    /// Serves plan 0 and plan 3, answers 404 for anything else
    async fn serve_plans() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => read += n,
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]);
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or_default();

                    let served = ["/transaction_plan_0.json", "/transaction_plan_3.json"];
                    let response = if served.iter().any(|s| path.ends_with(s)) {
                        let body = plan_json().to_string();
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                             Connection: close\r\n\r\n{body}",
                            body.len()
                        )
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
                    };
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn missing_plans_are_skipped() {
        let options = GeneratorOptions { base_url: serve_plans().await, count: 5, ..Default::default() };

        let plans = fetch_plans(&options).await;
        assert_eq!(
            plans
                .iter()
                .map(|p| p.index)
                .collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(plans[0].plan, plan_json());

        let dir = tempfile::tempdir().unwrap();
        let authorizer = Arc::new(FakeAuthorizer::default());
        let written = generate(&options, authorizer.clone(), dir.path())
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(authorizer.seeds.lock().unwrap().len(), 2);

        let loaded = load_testcases::<Pr4948TestCase>(dir.path().join(TESTCASES_FILE)).unwrap();
        assert_eq!(
            loaded
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Penumbra_PR4948_Vector_0", "Penumbra_PR4948_Vector_3"]
        );
    }

    struct PanickingAuthorizer;

    impl PlanAuthorizer for PanickingAuthorizer {
        fn authorize(&self, _seed_phrase: &str, _plan: &TransactionPlan) -> Result<AuthorizedPlan, VectorError> {
            panic!("authorizer crashed")
        }
    }

    #[tokio::test]
    async fn authorizer_panic_is_reported() {
        let options = GeneratorOptions { base_url: serve_plans().await, count: 1, ..Default::default() };

        let dir = tempfile::tempdir().unwrap();
        let err = generate(&options, Arc::new(PanickingAuthorizer), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Join(_)));
        assert!(!dir.path().join(TESTCASES_FILE).exists());
    }
}
