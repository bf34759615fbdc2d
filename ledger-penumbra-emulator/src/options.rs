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

use crate::emulator::MAX_REVIEW_SCREENS;
use crate::model::DeviceKind;

/// Overrides the emulator executable
pub const SPECULOS_BIN_ENV: &str = "SPECULOS_BIN";

/// Approve keyword shown by Nano devices on the last review screen
pub const NANO_APPROVE_KEYWORD: &str = "APPROVE";

/// Approve keyword shown by touch devices on the last review screen
pub const TOUCH_APPROVE_KEYWORD: &str = "Hold to sign";

/// How a touch device approves once the approve keyword is on screen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApproveAction {
    /// Hold the confirm button of the device layout
    #[default]
    HoldConfirm,
    /// Tap the element showing the approve keyword
    TapKeyword,
}

/// Options used to start an emulator
#[derive(Clone, Debug)]
pub struct StartOptions {
    /// BIP39 mnemonic loaded into the device
    pub seed: String,
    /// Device to emulate
    pub model: DeviceKind,
    /// Forward the emulator output to the log
    pub logging: bool,
    /// Open an X11 window instead of running headless
    pub x11: bool,
    /// Extra arguments appended to the emulator command line
    pub custom: Vec<String>,
    /// Keyword marking the approve screen, defaults per device
    pub approve_keyword: Option<String>,
    /// Text the home screen shows once the app is loaded, defaults per device
    pub start_text: Option<String>,
    /// Approve gesture on touch devices
    pub approve_action: ApproveAction,
    /// How long a hold-to-confirm gesture lasts
    pub approve_hold: Duration,
    /// Bound on process start plus home screen
    pub start_timeout: Duration,
    /// Bound on every screen wait
    pub screen_timeout: Duration,
    /// Delay between screen polls
    pub poll_interval: Duration,
    /// Review screens walked before giving up on the approve keyword
    pub max_review_screens: usize,
    /// Emulator executable, see [`SPECULOS_BIN_ENV`]
    pub speculos_bin: Option<PathBuf>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            seed: String::new(),
            model: DeviceKind::NanoSP,
            logging: true,
            x11: false,
            custom: Vec::new(),
            approve_keyword: None,
            approve_action: ApproveAction::HoldConfirm,
            start_text: None,
            approve_hold: Duration::from_millis(3000),
            start_timeout: Duration::from_secs(20),
            screen_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(100),
            max_review_screens: MAX_REVIEW_SCREENS,
            speculos_bin: None,
        }
    }
}

impl StartOptions {
    /// Default options for a device with the given seed
    pub fn new(model: DeviceKind, seed: impl Into<String>) -> Self {
        Self { model, seed: seed.into(), ..Default::default() }
    }

    /// Executable to spawn: options, then `SPECULOS_BIN`, then `speculos` from `PATH`
    pub fn speculos_bin(&self) -> PathBuf {
        self.speculos_bin
            .clone()
            .or_else(|| std::env::var_os(SPECULOS_BIN_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("speculos"))
    }

    /// Keyword marking the approve screen
    pub fn approve_keyword(&self) -> &str {
        match &self.approve_keyword {
            Some(keyword) => keyword,
            None if self.model.is_touch() => TOUCH_APPROVE_KEYWORD,
            None => NANO_APPROVE_KEYWORD,
        }
    }

    /// Text the home screen shows once the app is loaded
    pub fn start_text(&self) -> &str {
        match &self.start_text {
            Some(text) => text,
            None if self.model.is_touch() => "This application enables",
            None => "ready",
        }
    }
}
