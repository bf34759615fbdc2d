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
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::EmulatorError;
use crate::report::{render_report, report_dir, ReportStep, SnapshotReport};

/// Set to `1` to replace the goldens with the captured snapshots
pub const UPDATE_SNAPSHOTS_ENV: &str = "UPDATE_SNAPSHOTS";

/// Screen capture as returned by the emulator
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// PNG encoded image
    pub png: Vec<u8>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("png", &format_args!("{} bytes", self.png.len()))
            .finish()
    }
}

impl Snapshot {
    /// Wrap PNG bytes
    pub fn new(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// Read a PNG from disk
    pub fn load(path: &Path) -> Result<Self, EmulatorError> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Write the PNG to disk
    pub fn save(&self, path: &Path) -> Result<(), EmulatorError> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }

    /// Compare decoded pixels, ignoring PNG encoding differences.
    ///
    /// Images that cannot be decoded are compared byte for byte.
    pub fn same_pixels(&self, other: &Snapshot) -> bool {
        if self.png == other.png {
            return true;
        }

        match (image::load_from_memory(&self.png), image::load_from_memory(&other.png)) {
            (Ok(a), Ok(b)) => {
                let (a, b) = (a.to_rgb8(), b.to_rgb8());
                a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
            },
            _ => false,
        }
    }

    /// Base64 PNG, as embedded in reports
    pub fn to_base64(&self) -> String {
        base64::encode(&self.png)
    }
}

/// `00000.png`, `00001.png`, ...
pub fn snapshot_file_name(index: usize) -> String {
    format!("{index:05}.png")
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn list_snapshots(dir: &Path) -> Result<Vec<PathBuf>, EmulatorError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|e| e == "png").unwrap_or(false))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

fn write_set(dir: &Path, snapshots: &[Snapshot]) -> Result<(), EmulatorError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;

    for (index, snapshot) in snapshots.iter().enumerate() {
        snapshot.save(&dir.join(snapshot_file_name(index)))?;
    }
    Ok(())
}

/// Store `snapshots` under `<base>/snapshots-tmp/<name>/` and compare them
/// with the goldens in `<base>/snapshots/<name>/`.
///
/// With `UPDATE_SNAPSHOTS=1` the captured set replaces the goldens. On a
/// mismatch an HTML report is rendered and its path is part of the error.
pub fn compare_with_goldens(base: &Path, name: &str, snapshots: &[Snapshot]) -> Result<(), EmulatorError> {
    let tmp_dir = base.join("snapshots-tmp").join(name);
    let golden_dir = base.join("snapshots").join(name);

    write_set(&tmp_dir, snapshots)?;

    if update_requested() {
        log::info!("updating goldens for {} ({} snapshots)", name, snapshots.len());
        return write_set(&golden_dir, snapshots);
    }

    let goldens = list_snapshots(&golden_dir)?
        .iter()
        .map(|p| Snapshot::load(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut steps = Vec::with_capacity(snapshots.len().max(goldens.len()));
    let mut first_failure = None;
    for index in 0..snapshots.len().max(goldens.len()) {
        let captured = snapshots.get(index);
        let expected = goldens.get(index);
        let pass = match (captured, expected) {
            (Some(c), Some(e)) => c.same_pixels(e),
            _ => false,
        };

        if !pass && first_failure.is_none() {
            first_failure = Some(snapshot_file_name(index));
        }

        steps.push(ReportStep {
            file: snapshot_file_name(index),
            captured: captured.map(Snapshot::to_base64),
            expected: expected.map(Snapshot::to_base64),
            pass,
        });
    }

    let reason = if goldens.is_empty() {
        format!("no goldens in {}", golden_dir.display())
    } else if goldens.len() != snapshots.len() {
        format!("captured {} snapshots, expected {}", snapshots.len(), goldens.len())
    } else if let Some(file) = first_failure {
        format!("snapshot {file} differs")
    } else {
        log::debug!("{}: {} snapshots match", name, snapshots.len());
        return Ok(());
    };

    let report = SnapshotReport { name: name.to_string(), result: false, reason: reason.clone(), steps };
    let report_path = match report_dir() {
        Ok(dir) => {
            let path = dir.join(format!("{name}.html"));
            match render_report(&path, &report) {
                Ok(()) => Some(path),
                Err(err) => {
                    log::warn!("could not render snapshot report: {err}");
                    None
                },
            }
        },
        Err(err) => {
            log::warn!("no report directory: {err}");
            None
        },
    };

    Err(EmulatorError::SnapshotMismatch { name: name.to_string(), reason, report: report_path })
}
