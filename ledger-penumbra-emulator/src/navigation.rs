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
use crate::model::DeviceKind;

/// Physical buttons of the Nano devices
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonKind {
    /// Left button
    Left,
    /// Right button
    Right,
    /// Both buttons at once
    Both,
}

impl ButtonKind {
    /// Name used by the REST API
    pub const fn as_str(&self) -> &'static str {
        match self {
            ButtonKind::Left => "left",
            ButtonKind::Right => "right",
            ButtonKind::Both => "both",
        }
    }
}

/// One user interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationStep {
    /// Press and release a button
    Click(ButtonKind),
    /// Tap the screen
    Tap {
        /// Horizontal position
        x: u32,
        /// Vertical position
        y: u32,
    },
    /// Press the screen for `ms` milliseconds
    Hold {
        /// Horizontal position
        x: u32,
        /// Vertical position
        y: u32,
        /// Hold duration
        ms: u64,
    },
}

/// Zondax main menu walk: forward one page, open and close the info page,
/// move to the last entry and back to the first
pub const MAIN_MENU_COUNTS: [i32; 5] = [1, 0, 0, 4, -5];

/// Expand a main menu pattern into navigation steps.
///
/// For Nano devices `n > 0` is `n` right clicks, `n < 0` is `|n|` left clicks
/// and `0` presses both buttons. Touch devices open the info page, page
/// through it once and go back home.
pub fn main_menu_schedule(kind: DeviceKind, counts: &[i32]) -> Vec<NavigationStep> {
    if let Some(layout) = kind.touch_layout() {
        return vec![
            NavigationStep::Tap { x: layout.info.x, y: layout.info.y },
            NavigationStep::Tap { x: layout.next.x, y: layout.next.y },
            NavigationStep::Tap { x: layout.back.x, y: layout.back.y },
        ];
    }

    let mut steps = Vec::new();
    for &n in counts {
        match n {
            0 => steps.push(NavigationStep::Click(ButtonKind::Both)),
            n if n > 0 => steps.extend((0..n).map(|_| NavigationStep::Click(ButtonKind::Right))),
            n => steps.extend((0..n.unsigned_abs()).map(|_| NavigationStep::Click(ButtonKind::Left))),
        }
    }
    steps
}
