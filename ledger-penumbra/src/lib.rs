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
//! Support library for Penumbra Ledger Nano S+/X, Stax and Flex apps

#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
    )
)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]

mod app;
pub mod config;
mod path;
mod types;

pub use ledger_transport::{APDUAnswer, APDUCommand, APDUErrorCode, Exchange};
/// Ledger app
pub use app::*;
pub use ledger_zondax_generic::{AppInfo, DeviceInfo, LedgerAppError, Version};
pub use path::{PathError, PenumbraPath};
pub use types::*;
