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
//! Blocking speculos REST calls, run on the tokio blocking pool

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::EmulatorError;
use crate::navigation::ButtonKind;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A text element on the current screen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenEvent {
    /// Rendered text
    pub text: String,
    /// Horizontal position
    #[serde(default)]
    pub x: u32,
    /// Vertical position
    #[serde(default)]
    pub y: u32,
    /// Width
    #[serde(default)]
    pub w: u32,
    /// Height
    #[serde(default)]
    pub h: u32,
}

#[derive(Deserialize)]
struct Events {
    events: Vec<ScreenEvent>,
}

#[derive(Deserialize)]
struct ApduReply {
    data: String,
}

/// Client for the emulator REST API
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
}

async fn blocking<T, F>(f: F) -> Result<T, EmulatorError>
where
    F: FnOnce() -> Result<T, EmulatorError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

impl ApiClient {
    /// Client for the API at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    /// Client for a local API port
    pub fn local(port: u16) -> Self {
        Self::new(format!("http://127.0.0.1:{port}"))
    }

    /// API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Text elements shown on the current screen
    pub async fn current_events(&self) -> Result<Vec<ScreenEvent>, EmulatorError> {
        let url = self.url("/events?currentscreenonly=true");
        blocking(move || {
            let events: Events = ureq::get(&url)
                .timeout(REQUEST_TIMEOUT)
                .call()?
                .into_json()?;
            Ok(events.events)
        })
        .await
    }

    /// PNG of the current screen
    pub async fn screenshot(&self) -> Result<Vec<u8>, EmulatorError> {
        let url = self.url("/screenshot");
        blocking(move || {
            let mut png = Vec::new();
            ureq::get(&url)
                .timeout(REQUEST_TIMEOUT)
                .call()?
                .into_reader()
                .read_to_end(&mut png)?;
            Ok(png)
        })
        .await
    }

    /// Press and release a button
    pub async fn press_button(&self, button: ButtonKind) -> Result<(), EmulatorError> {
        let url = self.url(&format!("/button/{}", button.as_str()));
        log::trace!("button {}", button.as_str());
        blocking(move || {
            ureq::post(&url)
                .timeout(REQUEST_TIMEOUT)
                .send_json(json!({ "action": "press-and-release" }))?;
            Ok(())
        })
        .await
    }

    /// Send a finger action (`press`, `release` or `press-and-release`) at a screen position
    pub async fn finger(&self, action: &'static str, x: u32, y: u32) -> Result<(), EmulatorError> {
        let url = self.url("/finger");
        log::trace!("finger {action} at ({x}, {y})");
        blocking(move || {
            ureq::post(&url)
                .timeout(REQUEST_TIMEOUT)
                .send_json(json!({ "action": action, "x": x, "y": y }))?;
            Ok(())
        })
        .await
    }

    /// Exchange a raw APDU
    ///
    /// The call only returns once the device answers, which for signing
    /// requests means after the user approved or rejected on screen.
    pub async fn apdu(&self, command: Vec<u8>) -> Result<Vec<u8>, EmulatorError> {
        let url = self.url("/apdu");
        log::debug!("=> {}", hex::encode(&command));
        let answer = blocking(move || {
            let reply: ApduReply = ureq::post(&url)
                .send_json(json!({ "data": hex::encode(command) }))?
                .into_json()?;
            Ok(hex::decode(reply.data)?)
        })
        .await?;
        log::debug!("<= {}", hex::encode(&answer));
        Ok(answer)
    }
}
