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
//! Device flows on every model. Needs speculos and the app ELFs, see
//! `PENUMBRA_APP_DIR` and `SPECULOS_BIN`.

use ledger_penumbra_emulator::{main_menu_schedule, MAIN_MENU_COUNTS};
use ledger_penumbra_integration::common::*;
use ledger_penumbra_integration::flows::{app, show_address_and_approve, show_address_options, start, start_with};
use ledger_penumbra_integration::init_logging;
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn start_and_stop() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();
        assert!(emulator.main_menu_snapshot().is_some());
        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn main_menu() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();

        let schedule = main_menu_schedule(model.kind, &MAIN_MENU_COUNTS);
        emulator
            .navigate_and_compare_snapshots(snapshots_dir(), &model.snapshot_name("mainmenu"), &schedule)
            .await
            .unwrap();

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn version() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();

        let version = app(&emulator).get_version().await.unwrap();
        log::info!("{} mode {}", model.name(), version.mode);
        log::info!("{} version {}.{}.{}", model.name(), version.major, version.minor, version.patch);
        log::info!("{} locked {}", model.name(), version.locked);

        assert!(
            (version.major, version.minor, version.patch) > (0, 0, 0),
            "{} reported version 0.0.0",
            model.name()
        );
        assert!(!version.locked);

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn get_fvk() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();

        let fvk = app(&emulator)
            .get_fvk(&penumbra_path(), &address_index())
            .await
            .unwrap();
        log::info!("{:?}", fvk);

        assert_eq!(hex::encode(fvk.to_bytes()), EXPECTED_FVK);

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn get_address() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();

        let address = app(&emulator)
            .get_address(&penumbra_path(), &address_index())
            .await
            .unwrap();

        assert_eq!(hex::encode(address.raw), EXPECTED_ADDRESS);

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn get_address_randomized() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start(model).await.unwrap();

        let address = app(&emulator)
            .get_address(&penumbra_path(), &randomized_address_index())
            .await
            .unwrap();

        assert_ne!(hex::encode(address.raw), EXPECTED_ADDRESS);

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn show_address() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start_with(model, show_address_options(model.kind))
            .await
            .unwrap();

        let address = show_address_and_approve(
            &emulator,
            &app(&emulator),
            &penumbra_path(),
            &address_index(),
            &model.snapshot_name("show_address"),
        )
        .await
        .unwrap();

        assert_eq!(hex::encode(address.raw), EXPECTED_ADDRESS);

        emulator.close().await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires speculos and the app ELFs"]
async fn show_address_randomized() {
    init_logging();

    for model in MODELS.iter() {
        let emulator = start_with(model, show_address_options(model.kind))
            .await
            .unwrap();

        let address = show_address_and_approve(
            &emulator,
            &app(&emulator),
            &penumbra_path(),
            &randomized_address_index(),
            &model.snapshot_name("show_address_randomized"),
        )
        .await
        .unwrap();

        assert_ne!(hex::encode(address.raw), EXPECTED_ADDRESS);

        emulator.close().await.unwrap();
    }
}
