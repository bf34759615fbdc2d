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
use std::str::FromStr;

/// Ledger devices supported by the emulator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Nano X
    NanoX,
    /// Nano S+
    NanoSP,
    /// Stax
    Stax,
    /// Flex
    Flex,
}

/// Screen coordinates of a touch target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    /// Horizontal position
    pub x: u32,
    /// Vertical position
    pub y: u32,
}

const fn point(x: u32, y: u32) -> Point {
    Point { x, y }
}

/// Positions of the navigation targets on a touch screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchLayout {
    /// Next page arrow
    pub next: Point,
    /// Previous page / back arrow
    pub back: Point,
    /// Settings and info button on the home screen
    pub info: Point,
    /// Hold-to-confirm button on the last review page
    pub confirm: Point,
}

impl DeviceKind {
    /// All supported devices
    pub const ALL: [DeviceKind; 4] = [DeviceKind::NanoX, DeviceKind::NanoSP, DeviceKind::Stax, DeviceKind::Flex];

    /// Name used by speculos and in snapshot directories
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::NanoX => "nanox",
            DeviceKind::NanoSP => "nanosp",
            DeviceKind::Stax => "stax",
            DeviceKind::Flex => "flex",
        }
    }

    /// Touch screen devices are driven by taps instead of buttons
    pub const fn is_touch(&self) -> bool {
        matches!(self, DeviceKind::Stax | DeviceKind::Flex)
    }

    /// Touch geometry, `None` for button devices
    pub const fn touch_layout(&self) -> Option<TouchLayout> {
        match self {
            DeviceKind::NanoX | DeviceKind::NanoSP => None,
            // 400x672
            DeviceKind::Stax => Some(TouchLayout {
                next: point(335, 606),
                back: point(36, 606),
                info: point(335, 35),
                confirm: point(335, 606),
            }),
            // 480x600
            DeviceKind::Flex => Some(TouchLayout {
                next: point(430, 550),
                back: point(55, 550),
                info: point(405, 75),
                confirm: point(420, 525),
            }),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nanox" => Ok(DeviceKind::NanoX),
            "nanosp" => Ok(DeviceKind::NanoSP),
            "stax" => Ok(DeviceKind::Stax),
            "flex" => Ok(DeviceKind::Flex),
            other => Err(format!("unknown device model {other:?}")),
        }
    }
}

/// A device model together with the app build it runs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceModel {
    /// Device kind
    pub kind: DeviceKind,
    /// Snapshot name prefix (`X`, `SP`, `ST`, `FL`)
    pub prefix: String,
    /// App ELF to load
    pub elf: PathBuf,
}

impl DeviceModel {
    /// Create a model entry
    pub fn new(kind: DeviceKind, prefix: impl Into<String>, elf: impl AsRef<Path>) -> Self {
        Self { kind, prefix: prefix.into(), elf: elf.as_ref().to_path_buf() }
    }

    /// Device name (`nanox`, `nanosp`, ...)
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// True for Stax and Flex
    pub fn is_touch(&self) -> bool {
        self.kind.is_touch()
    }

    /// Snapshot directory name for a test: `<prefix>-<test>`
    pub fn snapshot_name(&self, test: &str) -> String {
        format!("{}-{}", self.prefix.to_lowercase(), test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in DeviceKind::ALL {
            assert_eq!(kind.as_str().parse::<DeviceKind>(), Ok(kind));
        }
        assert!("nanos".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn only_touch_devices_have_a_layout() {
        assert!(DeviceKind::NanoX.touch_layout().is_none());
        assert!(DeviceKind::NanoSP.touch_layout().is_none());
        assert!(DeviceKind::Stax.touch_layout().is_some());
        assert!(DeviceKind::Flex.is_touch());
    }

    #[test]
    fn snapshot_names_use_prefix() {
        let model = DeviceModel::new(DeviceKind::NanoSP, "SP", "../app/output/app_s2.elf");
        assert_eq!(model.name(), "nanosp");
        assert_eq!(model.snapshot_name("sign"), "sp-sign");
    }
}
