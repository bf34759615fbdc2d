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

use lazy_static::lazy_static;
use ledger_penumbra::config::ADDR_RANDOMIZER_LEN;
use ledger_penumbra::{AddressIndex, PenumbraPath};
use ledger_penumbra_emulator::{DeviceKind, DeviceModel, StartOptions};
use ledger_penumbra_vectors::generator::TESTCASES_FILE;

/// Mnemonic every emulator is started with
pub const APP_SEED: &str = "equip will roof matter pink blind book anxiety banner elbow sun young";

/// Derivation path of account 0
pub const PENUMBRA_PATH: &str = "m/44'/6532'/0'";

/// Address index account
pub const ACCOUNT_ID: u32 = 1;
/// Second account index
pub const ACCOUNT_ID2: u32 = 2;

/// Randomizer of the randomized address flows
pub const RANDOMIZER: [u8; ADDR_RANDOMIZER_LEN] =
    [0x77, 0x01, 0x87, 0x94, 0x12, 0x64, 0xc9, 0x25, 0xf8, 0xba, 0x87, 0x76];

/// ak || nk for account 1
pub const EXPECTED_FVK: &str = "92c3e768d3ecf0f2c4d93d879dbc16226fe8540443a8216d6b093d8684865a063a35ee29cccf93149dfa565ea693aa5cd36dc5cf8adff15081038d31e796580b";

/// Address for account 1 without randomizer
pub const EXPECTED_ADDRESS: &str = "fc48056bc3fa38105dec3bbf85360034324a68f5f9ad7b1b5b6796f97d8279ae15308df6d619d93aab071c2ea360d09dd0f3fa4d3a8a49b9f9b208ee42e491efff1162c3525990477dfc81a681b7d7c1";

/// Binary transaction plan with a single spend
pub const TX_BLOB_EXAMPLE: &str = "0abe020abb020aa8010a300a0a08c8daccb4a6f185e40612220a2029ea9c2f3371f6a487e7e95c247041f4a356f983eb064e5d2b3bcf322ca96a10122085197c5d60cf28b5ec756a657957b310072396577956fd5cd421ca62b4a6bc091a520a50890bc98e3698aa4578e419b028da5672e627c280d8b06166f4c42d5366bccf1fcf3b296cd61e8d744a21f75f2fb697183e18595d8a79008539d8fb138b405db09db65cc42d54c0e772e5d42d5f20b52f10f1a9e496d5f01d1a20732b53ee807140dd5672768ec1a38be09c531a0c6fc185d5f51c18f5f2261d012220f2e2f45f0ea734d7c11321cbf20427b379cfed6f71874ff97e8bcbbfce2d3d012a2073ec22fcaeccfadc720dd0350cf6af7ec274a74be832e8334613638edfd2fb10322093043bfea2094b0398f0e14bccc66a9ec335bbfd1f8e8b4c2c21428947f5e50d121c08cec08d8e1e1206757673762d361a0c0a0a08d6fab2e5c4f992aa0b";

/// Directory holding the app ELFs
pub const PENUMBRA_APP_DIR_ENV: &str = "PENUMBRA_APP_DIR";
/// Fixture file for the effect hash suite
pub const ACTIONS_TESTCASES_ENV: &str = "ACTIONS_TESTCASES";
/// Fixture file for the generated vector suite
pub const PR4948_TESTCASES_ENV: &str = "PR4948_TESTCASES";

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Build output of the app, `../app/output` unless overridden
pub fn app_dir() -> PathBuf {
    std::env::var_os(PENUMBRA_APP_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir().join("..").join("app").join("output"))
}

lazy_static! {
    /// Every device the app is built for
    pub static ref MODELS: Vec<DeviceModel> = {
        let dir = app_dir();
        vec![
            DeviceModel::new(DeviceKind::NanoX, "X", dir.join("app_x.elf")),
            DeviceModel::new(DeviceKind::NanoSP, "SP", dir.join("app_s2.elf")),
            DeviceModel::new(DeviceKind::Stax, "ST", dir.join("app_stax.elf")),
            DeviceModel::new(DeviceKind::Flex, "FL", dir.join("app_flex.elf")),
        ]
    };
}

/// Model entry for one device
pub fn model(kind: DeviceKind) -> Option<&'static DeviceModel> {
    MODELS.iter().find(|m| m.kind == kind)
}

/// `m/44'/6532'/0'`
pub const fn penumbra_path() -> PenumbraPath {
    PenumbraPath::for_account(0)
}

/// Index of [`ACCOUNT_ID`] without randomizer
pub const fn address_index() -> AddressIndex {
    AddressIndex::new(ACCOUNT_ID)
}

/// Index of [`ACCOUNT_ID`] with [`RANDOMIZER`]
pub const fn randomized_address_index() -> AddressIndex {
    AddressIndex::randomized(ACCOUNT_ID, RANDOMIZER)
}

/// Emulator options every suite starts from
pub fn default_options(kind: DeviceKind) -> StartOptions {
    StartOptions { logging: true, custom: Vec::new(), ..StartOptions::new(kind, APP_SEED) }
}

/// Base directory of `snapshots/` and `snapshots-tmp/`
pub fn snapshots_dir() -> PathBuf {
    manifest_dir()
}

fn fixture_path(env: &str, file: &str) -> PathBuf {
    std::env::var_os(env)
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir().join("testcases").join(file))
}

/// Fixtures for the effect hash suite
pub fn actions_testcases_path() -> PathBuf {
    fixture_path(ACTIONS_TESTCASES_ENV, "actions.json")
}

/// Fixtures written by `generate-testcases`
pub fn pr4948_testcases_path() -> PathBuf {
    fixture_path(PR4948_TESTCASES_ENV, TESTCASES_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_constant_matches_account_path() {
        assert_eq!(PENUMBRA_PATH.parse::<PenumbraPath>().unwrap(), penumbra_path());
    }

    #[test]
    fn models_cover_every_device() {
        assert_eq!(MODELS.len(), DeviceKind::ALL.len());
        let sp = model(DeviceKind::NanoSP).unwrap();
        assert_eq!(sp.snapshot_name("mainmenu"), "sp-mainmenu");
        assert!(sp.elf.ends_with("app_s2.elf"));
    }

    #[test]
    fn example_blob_is_hex() {
        let blob = hex::decode(TX_BLOB_EXAMPLE).unwrap();
        assert_eq!(blob[0], 0x0a);
    }

    #[test]
    fn randomized_index_carries_randomizer() {
        assert_eq!(randomized_address_index().randomizer, Some(RANDOMIZER));
        assert!(address_index().randomizer.is_none());
    }
}
