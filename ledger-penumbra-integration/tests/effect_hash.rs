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
//! Signing fixtures on every model, see `ACTIONS_TESTCASES`

use ledger_penumbra_integration::common::*;
use ledger_penumbra_integration::flows::{app, check_effect_hash, sign_and_approve, start};
use ledger_penumbra_integration::init_logging;
use ledger_penumbra_vectors::{load_testcases, TestCase};
use serial_test::serial;

fn testcases() -> Vec<TestCase> {
    let path = actions_testcases_path();
    if !path.is_file() {
        log::warn!("no fixtures at {}, skipping", path.display());
        return Vec::new();
    }
    load_testcases(&path).unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn start_and_stop() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();
        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn sign() {
    init_logging();

    for testcase in testcases() {
        let blob = testcase.decode_blob().unwrap();

        for model in MODELS.iter() {
            log::info!("signing {} on {}", testcase.name, model.name());
            let emulator = start(model).await.unwrap();

            let response = sign_and_approve(
                &emulator,
                &app(&emulator),
                &penumbra_path(),
                &blob,
                &testcase.metadata,
                &model.snapshot_name(&format!("sign_{}", testcase.name)),
                None,
            )
            .await
            .unwrap();

            check_effect_hash(&testcase.name, &testcase.expected_effect_hash, &response).unwrap();

            emulator.close().await.unwrap();
        }
    }
}
