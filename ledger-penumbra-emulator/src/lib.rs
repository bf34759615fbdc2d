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
//! Drives a speculos emulator running the Penumbra app: process lifecycle,
//! APDU transport, screen polling, navigation and snapshot comparison

#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
    )
)]
#![deny(missing_docs)]
#![deny(unused_import_braces, unused_qualifications)]

mod api;
mod emulator;
mod error;
mod model;
mod navigation;
mod options;
/// HTML reports for snapshot mismatches
pub mod report;
mod snapshot;
mod transport;

pub use api::{ApiClient, ScreenEvent};
pub use emulator::{Emulator, MAX_REVIEW_SCREENS};
pub use error::EmulatorError;
pub use model::{DeviceKind, DeviceModel, Point, TouchLayout};
pub use navigation::{main_menu_schedule, ButtonKind, NavigationStep, MAIN_MENU_COUNTS};
pub use options::*;
pub use snapshot::{compare_with_goldens, snapshot_file_name, Snapshot, UPDATE_SNAPSHOTS_ENV};
pub use transport::SpeculosTransport;
