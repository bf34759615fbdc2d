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
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::EmulatorError;

/// Directory reports are written to
pub const REPORT_TMP_DIR_ENV: &str = "REPORT_TMP_DIR";

/// Handlebars template of the HTML report
pub const HB_TEMPLATE: &str = include_str!("../report.hb");

/// One snapshot position in a report
#[derive(Debug, Serialize)]
pub struct ReportStep {
    /// Snapshot file name
    pub file: String,
    /// Base64 PNG captured during the run
    pub captured: Option<String>,
    /// Base64 PNG of the golden
    pub expected: Option<String>,
    /// Whether both images have the same pixels
    pub pass: bool,
}

/// Snapshot comparison outcome, rendered with [`HB_TEMPLATE`]
#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    /// Snapshot set name
    pub name: String,
    /// used in the Handlebars template
    pub result: bool,
    /// First difference found
    pub reason: String,
    /// Side by side images
    pub steps: Vec<ReportStep>,
}

/// Render `report` as HTML into `to`
pub fn render_report(to: &Path, report: &SnapshotReport) -> Result<(), EmulatorError> {
    let mut hb = Handlebars::new();
    hb.register_template_string("report", HB_TEMPLATE)?;

    let writer = File::create(to)?;
    hb.render_to_write("report", report, writer)?;

    log::info!("Rendered report to: {}", to.display());

    Ok(())
}

/// `REPORT_TMP_DIR` if set, otherwise a temporary directory kept for the
/// lifetime of the process and left on disk afterwards
pub fn report_dir() -> Result<PathBuf, EmulatorError> {
    if let Ok(dir) = std::env::var(REPORT_TMP_DIR_ENV) {
        let path = PathBuf::from(dir);
        std::fs::create_dir_all(&path)?;
        return Ok(path);
    }

    static TEMPDIR: OnceLock<PathBuf> = OnceLock::new();
    if let Some(dir) = TEMPDIR.get() {
        return Ok(dir.clone());
    }

    let dir = tempfile::Builder::new()
        .prefix("penumbra-zemu")
        .tempdir()?
        .into_path();
    Ok(TEMPDIR.get_or_init(|| dir).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_steps() {
        let dir = tempfile::tempdir().unwrap();
        let to = dir.path().join("report.html");

        let report = SnapshotReport {
            name: "sp-sign".into(),
            result: false,
            reason: "snapshot 00001.png differs".into(),
            steps: vec![
                ReportStep {
                    file: "00000.png".into(),
                    captured: Some("AAAA".into()),
                    expected: Some("AAAA".into()),
                    pass: true,
                },
                ReportStep { file: "00001.png".into(), captured: Some("BBBB".into()), expected: None, pass: false },
            ],
        };
        render_report(&to, &report).unwrap();

        let html = std::fs::read_to_string(&to).unwrap();
        assert!(html.contains("<title>sp-sign</title>"));
        assert!(html.contains("FAIL: snapshot 00001.png differs"));
        assert!(html.contains("data:image/png;base64,BBBB"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }
}
