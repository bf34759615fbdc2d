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
use std::{fmt, str::FromStr};

use byteorder::{LittleEndian, WriteBytesExt};
use thiserror::Error as ThisError;

use crate::config::HDPATH_LEN;

const HARDENED: u32 = 0x8000_0000;

/// Errors raised while parsing a derivation path
#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The path does not start with `m/`
    #[error("path must start with \"m/\"")]
    MissingRoot,
    /// The path does not have exactly three components
    #[error("expected {HDPATH_LEN} components, found {0}")]
    InvalidLength(usize),
    /// A component is not a hardened index
    #[error("component {0:?} is not hardened")]
    NotHardened(String),
    /// A component is not a number
    #[error("component {0:?} is not a valid index")]
    InvalidIndex(String),
}

/// Penumbra derivation path (`m/44'/6532'/account'`)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PenumbraPath(pub [u32; HDPATH_LEN]);

impl PenumbraPath {
    /// Path for the given account with the Penumbra coin type
    pub const fn for_account(account: u32) -> Self {
        Self([
            HARDENED | 44,
            HARDENED | crate::config::PENUMBRA_COIN_TYPE,
            HARDENED | account,
        ])
    }

    /// Serialize as it is expected by the app (u32 little endian per component)
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HDPATH_LEN * 4);
        for component in self.0.iter() {
            // writing into a Vec cannot fail
            let _ = out.write_u32::<LittleEndian>(*component);
        }
        out
    }
}

impl FromStr for PenumbraPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("m/")
            .ok_or(PathError::MissingRoot)?;

        let components = rest.split('/').collect::<Vec<_>>();
        if components.len() != HDPATH_LEN {
            return Err(PathError::InvalidLength(components.len()));
        }

        let mut path = [0u32; HDPATH_LEN];
        for (slot, component) in path.iter_mut().zip(components) {
            let index = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| PathError::NotHardened(component.to_string()))?;
            let index = index
                .parse::<u32>()
                .ok()
                .filter(|i| *i < HARDENED)
                .ok_or_else(|| PathError::InvalidIndex(component.to_string()))?;
            *slot = HARDENED | index;
        }

        Ok(Self(path))
    }
}

impl fmt::Display for PenumbraPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in self.0.iter() {
            write!(f, "/{}'", component & !HARDENED)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PenumbraPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_path() {
        let path: PenumbraPath = "m/44'/6532'/0'".parse().unwrap();
        assert_eq!(path, PenumbraPath::for_account(0));
        assert_eq!(path.to_string(), "m/44'/6532'/0'");
        assert_eq!(hex::encode(path.serialize()), "2c0000808419008000000080");
    }

    #[test]
    fn reject_bad_paths() {
        assert_eq!("44'/6532'/0'".parse::<PenumbraPath>(), Err(PathError::MissingRoot));
        assert_eq!("m/44'/6532'".parse::<PenumbraPath>(), Err(PathError::InvalidLength(2)));
        assert_eq!(
            "m/44'/6532'/0".parse::<PenumbraPath>(),
            Err(PathError::NotHardened("0".to_string()))
        );
        assert_eq!(
            "m/44'/x'/0'".parse::<PenumbraPath>(),
            Err(PathError::InvalidIndex("x'".to_string()))
        );
    }
}
