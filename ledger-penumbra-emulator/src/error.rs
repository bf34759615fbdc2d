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
use std::time::Duration;

use thiserror::Error;

fn report_suffix(report: &Option<PathBuf>) -> String {
    report
        .as_ref()
        .map(|r| format!(" (report: {})", r.display()))
        .unwrap_or_default()
}

/// Errors raised while driving the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// The app ELF to load does not exist
    #[error("app elf not found: {0}")]
    MissingElf(PathBuf),

    /// The emulator process could not be spawned or exited early
    #[error("emulator process: {0}")]
    Process(String),

    /// The REST API never answered
    #[error("emulator did not become ready within {0:?}")]
    StartTimeout(Duration),

    /// The screen did not reach the expected state
    #[error("screen timeout after {timeout:?}: {reason}")]
    ScreenTimeout {
        /// What was being waited for
        reason: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// No approve screen was found while walking the review
    #[error("approve keyword {keyword:?} not found after {screens} screens")]
    ApproveNotFound {
        /// Keyword searched for
        keyword: String,
        /// Screens walked
        screens: usize,
    },

    /// Captured snapshots differ from the goldens
    #[error("snapshots for {name} do not match: {reason}{}", report_suffix(.report))]
    SnapshotMismatch {
        /// Snapshot set name
        name: String,
        /// First difference found
        reason: String,
        /// HTML report, when one could be rendered
        report: Option<PathBuf>,
    },

    /// The REST API answered with an error or could not be reached
    #[error("emulator api: {0}")]
    Api(String),

    /// The device answer is not a valid APDU answer
    #[error("invalid apdu answer")]
    InvalidAnswer,

    /// Filesystem or process I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON from the REST API
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Malformed hex from the REST API
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),

    /// Snapshot could not be decoded
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Report template is invalid
    #[error(transparent)]
    Template(#[from] handlebars::TemplateError),

    /// Report could not be rendered
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),

    /// Background task panicked or was cancelled
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

impl From<ureq::Error> for EmulatorError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                EmulatorError::Api(format!("{} returned status {}", response.get_url(), code))
            },
            ureq::Error::Transport(transport) => EmulatorError::Api(transport.to_string()),
        }
    }
}
