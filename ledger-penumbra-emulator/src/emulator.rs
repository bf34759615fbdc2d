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
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;
use tokio::process::{Child, Command as ProcessCommand};
use tokio::time::Instant;

use crate::api::{ApiClient, ScreenEvent};
use crate::error::EmulatorError;
use crate::navigation::{ButtonKind, NavigationStep};
use crate::options::{ApproveAction, StartOptions};
use crate::snapshot::{compare_with_goldens, Snapshot};
use crate::transport::SpeculosTransport;

/// Default bound on the review screens walked looking for the approve keyword
pub const MAX_REVIEW_SCREENS: usize = 100;

async fn free_port() -> Result<u16, EmulatorError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

fn forward_logs<R>(stream: R, source: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => log::debug!("[{source}] {line}"),
                Ok(None) => break,
                Err(e) => {
                    log::warn!("{source} log stream error {e:?}");
                    break;
                },
            }
        }
    });
}

/// Running emulator instance with the app loaded
#[derive(educe::Educe)]
#[educe(Debug)]
pub struct Emulator {
    options: StartOptions,
    api: ApiClient,
    main_menu: Option<Snapshot>,
    #[educe(Debug(ignore))]
    child: Option<Child>,
}

impl Emulator {
    /// Spawn the emulator with `elf` and wait for the app home screen
    pub async fn start(elf: impl AsRef<Path>, options: StartOptions) -> Result<Self, EmulatorError> {
        let elf = elf.as_ref();
        if !elf.is_file() {
            return Err(EmulatorError::MissingElf(elf.to_path_buf()));
        }

        let api_port = free_port().await?;
        let apdu_port = free_port().await?;

        let mut args = vec![
            "--model".to_string(),
            options.model.as_str().to_string(),
            "--display".to_string(),
            if options.x11 { "qt" } else { "headless" }.to_string(),
            "--api-port".to_string(),
            api_port.to_string(),
            "--apdu-port".to_string(),
            apdu_port.to_string(),
        ];
        if !options.seed.is_empty() {
            args.push("--seed".to_string());
            args.push(options.seed.clone());
        }
        args.extend(options.custom.iter().cloned());
        args.push(elf.display().to_string());

        let bin = options.speculos_bin();
        log::info!("starting {} on {} with {}", bin.display(), options.model, elf.display());
        log::trace!("speculos args: {:?}", args);

        let output = || if options.logging { Stdio::piped() } else { Stdio::null() };
        let mut child = ProcessCommand::new(&bin)
            .kill_on_drop(true)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(output())
            .stderr(output())
            .spawn()
            .map_err(|e| EmulatorError::Process(format!("could not spawn {}: {e}", bin.display())))?;

        if let Some(stdout) = child.stdout.take() {
            forward_logs(stdout, "speculos");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_logs(stderr, "speculos");
        }

        let mut emulator = Self { options, api: ApiClient::local(api_port), main_menu: None, child: Some(child) };
        emulator.wait_ready().await?;

        Ok(emulator)
    }

    /// Attach to an emulator that is already running, e.g. in a container
    pub async fn attach(api: ApiClient, options: StartOptions) -> Result<Self, EmulatorError> {
        let mut emulator = Self { options, api, main_menu: None, child: None };
        emulator.wait_ready().await?;
        Ok(emulator)
    }

    async fn wait_ready(&mut self) -> Result<(), EmulatorError> {
        let deadline = Instant::now() + self.options.start_timeout;

        loop {
            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(EmulatorError::Process(format!("emulator exited early with {status}")));
                }
            }

            match self.api.current_events().await {
                Ok(_) => break,
                Err(e) => log::trace!("emulator api not ready: {e}"),
            }

            if Instant::now() >= deadline {
                return Err(EmulatorError::StartTimeout(self.options.start_timeout));
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }

        let start_text = self.options.start_text().to_string();
        self.wait_for_text_until(&start_text, deadline, self.options.start_timeout)
            .await?;

        self.main_menu = Some(self.snapshot().await?);
        log::info!("emulator ready at {}", self.api.base_url());

        Ok(())
    }

    /// Stop the emulator and wait for the process to exit
    pub async fn close(mut self) -> Result<(), EmulatorError> {
        if let Some(mut child) = self.child.take() {
            child.kill().await?;
            log::info!("emulator stopped");
        }
        Ok(())
    }

    /// Options the emulator was started with
    pub fn options(&self) -> &StartOptions {
        &self.options
    }

    /// REST API client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// APDU transport to build an app client on
    pub fn transport(&self) -> SpeculosTransport {
        SpeculosTransport::new(self.api.clone())
    }

    /// Capture the current screen
    pub async fn snapshot(&self) -> Result<Snapshot, EmulatorError> {
        Ok(Snapshot::new(self.api.screenshot().await?))
    }

    /// Home screen captured once the app was ready
    pub fn main_menu_snapshot(&self) -> Option<&Snapshot> {
        self.main_menu.as_ref()
    }

    /// Text elements on the current screen
    pub async fn current_events(&self) -> Result<Vec<ScreenEvent>, EmulatorError> {
        self.api.current_events().await
    }

    /// Press and release a button
    pub async fn click(&self, button: ButtonKind) -> Result<(), EmulatorError> {
        self.api.press_button(button).await
    }

    /// Tap the screen
    pub async fn tap(&self, x: u32, y: u32) -> Result<(), EmulatorError> {
        self.api.finger("press-and-release", x, y).await
    }

    /// Press the screen for `ms` milliseconds
    pub async fn hold(&self, x: u32, y: u32, ms: u64) -> Result<(), EmulatorError> {
        self.api.finger("press", x, y).await?;
        tokio::time::sleep(Duration::from_millis(ms)).await;
        self.api.finger("release", x, y).await
    }

    /// Perform one navigation step
    pub async fn perform(&self, step: NavigationStep) -> Result<(), EmulatorError> {
        match step {
            NavigationStep::Click(button) => self.click(button).await,
            NavigationStep::Tap { x, y } => self.tap(x, y).await,
            NavigationStep::Hold { x, y, ms } => self.hold(x, y, ms).await,
        }
    }

    /// Poll until the screen differs from `reference` and return the new screen
    pub async fn wait_until_screen_is_not(&self, reference: &Snapshot) -> Result<Snapshot, EmulatorError> {
        let deadline = Instant::now() + self.options.screen_timeout;
        loop {
            let current = self.snapshot().await?;
            if !current.same_pixels(reference) {
                return Ok(current);
            }

            if Instant::now() >= deadline {
                return Err(EmulatorError::ScreenTimeout {
                    reason: "screen did not change".to_string(),
                    timeout: self.options.screen_timeout,
                });
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    /// Poll until an element of the current screen contains `text` (case insensitive)
    pub async fn wait_for_text(&self, text: &str) -> Result<(), EmulatorError> {
        let deadline = Instant::now() + self.options.screen_timeout;
        self.wait_for_text_until(text, deadline, self.options.screen_timeout)
            .await
    }

    async fn wait_for_text_until(&self, text: &str, deadline: Instant, timeout: Duration) -> Result<(), EmulatorError> {
        loop {
            if self.screen_contains(text).await? {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(EmulatorError::ScreenTimeout { reason: format!("text {text:?} not found"), timeout });
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    async fn screen_contains(&self, text: &str) -> Result<bool, EmulatorError> {
        Ok(self.find_text(text).await?.is_some())
    }

    /// First element of the current screen containing `text` (case insensitive)
    pub async fn find_text(&self, text: &str) -> Result<Option<ScreenEvent>, EmulatorError> {
        let needle = text.to_lowercase();
        Ok(self
            .current_events()
            .await?
            .into_iter()
            .find(|e| e.text.to_lowercase().contains(&needle)))
    }

    /// Capture the current screen and the screen after each step, then
    /// compare the set with the goldens under `dir`
    pub async fn navigate_and_compare_snapshots(
        &self,
        dir: impl AsRef<Path>,
        name: &str,
        schedule: &[NavigationStep],
    ) -> Result<(), EmulatorError> {
        let mut current = self.snapshot().await?;
        let mut snapshots = vec![current.clone()];

        for step in schedule {
            self.perform(*step).await?;
            current = self.wait_until_screen_is_not(&current).await?;
            snapshots.push(current.clone());
        }

        compare_with_goldens(dir.as_ref(), name, &snapshots)
    }

    /// Walk the review screens until the approve keyword shows up, approve,
    /// and compare every captured screen with the goldens under `dir`
    pub async fn compare_snapshots_and_approve(&self, dir: impl AsRef<Path>, name: &str) -> Result<(), EmulatorError> {
        let keyword = self.options.approve_keyword().to_string();
        let layout = self.options.model.touch_layout();

        let mut current = self.snapshot().await?;
        let mut snapshots = vec![current.clone()];

        let screens = self.options.max_review_screens;
        let mut found = None;
        for _ in 0..screens {
            found = self.find_text(&keyword).await?;
            if found.is_some() {
                break;
            }

            match layout {
                Some(layout) => self.tap(layout.next.x, layout.next.y).await?,
                None => self.click(ButtonKind::Right).await?,
            }
            current = self.wait_until_screen_is_not(&current).await?;
            snapshots.push(current.clone());
        }

        let Some(target) = found else {
            return Err(EmulatorError::ApproveNotFound { keyword, screens });
        };

        log::info!("approving on {}", self.options.model);
        match (layout, self.options.approve_action) {
            (None, _) => self.click(ButtonKind::Both).await?,
            (Some(layout), ApproveAction::HoldConfirm) => {
                let ms = self.options.approve_hold.as_millis() as u64;
                self.hold(layout.confirm.x, layout.confirm.y, ms)
                    .await?
            },
            (Some(_), ApproveAction::TapKeyword) => {
                self.tap(target.x + target.w / 2, target.y + target.h / 2)
                    .await?
            },
        }
        snapshots.push(self.wait_until_screen_is_not(&current).await?);

        compare_with_goldens(dir.as_ref(), name, &snapshots)
    }
}
