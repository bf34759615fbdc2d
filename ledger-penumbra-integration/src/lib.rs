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
//! Shared setup and flows for the Penumbra app emulator suites

#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
    )
)]
#![deny(missing_docs)]
#![deny(unused_import_braces, unused_qualifications)]

/// Seeds, paths, expected values and fixture locations
pub mod common;
/// Device flows shared by the suites
pub mod flows;

use env_logger::Env;

/// Route `log` output to the test harness, `info` unless `RUST_LOG` says otherwise
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}
