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

use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Serialize, Serializer};

use crate::config::{
    ADDRESS_INDEX_LEN, ADDRESS_LEN, ADDR_RANDOMIZER_LEN, AK_LEN, EFFECT_HASH_LEN, FVK_LEN, MAX_DENOM_LEN,
    MAX_METADATA_ENTRIES, NK_LEN, SIGNATURE_LEN,
};

/// Raw address bytes
pub type AddressRaw = [u8; ADDRESS_LEN];

/// Effect hash bytes
pub type EffectHashRaw = [u8; EFFECT_HASH_LEN];

/// Authorization signature bytes
pub type SignatureRaw = [u8; SIGNATURE_LEN];

fn serialize_hex<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode(bytes))
}

fn serialize_hex_list<S>(list: &[SignatureRaw], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(list.iter().map(hex::encode))
}

/// Account and optional randomizer selecting an address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressIndex {
    /// Account number
    pub account: u32,
    /// Optional randomizer to derive a randomized address
    pub randomizer: Option<[u8; ADDR_RANDOMIZER_LEN]>,
}

impl AddressIndex {
    /// Address index for an account without randomizer
    pub const fn new(account: u32) -> Self {
        Self { account, randomizer: None }
    }

    /// Address index for an account with the given randomizer
    pub const fn randomized(account: u32, randomizer: [u8; ADDR_RANDOMIZER_LEN]) -> Self {
        Self { account, randomizer: Some(randomizer) }
    }

    /// Packed serialization: account (u32 LE) | has_randomizer (u8) | randomizer (12 bytes)
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADDRESS_INDEX_LEN);
        let _ = out.write_u32::<LittleEndian>(self.account);
        match self.randomizer {
            Some(randomizer) => {
                out.push(1);
                out.extend_from_slice(&randomizer);
            },
            None => {
                out.push(0);
                out.extend_from_slice(&[0u8; ADDR_RANDOMIZER_LEN]);
            },
        }
        out
    }
}

/// Full viewing key as returned by the device
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FullViewingKey {
    /// Spend verification key
    #[serde(serialize_with = "serialize_hex")]
    pub ak: [u8; AK_LEN],
    /// Nullifier key
    #[serde(serialize_with = "serialize_hex")]
    pub nk: [u8; NK_LEN],
}

impl FullViewingKey {
    /// ak || nk
    pub fn to_bytes(&self) -> [u8; FVK_LEN] {
        let mut out = [0u8; FVK_LEN];
        out[..AK_LEN].copy_from_slice(&self.ak);
        out[AK_LEN..].copy_from_slice(&self.nk);
        out
    }
}

impl fmt::Debug for FullViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullViewingKey")
            .field("ak", &hex::encode(self.ak))
            .field("nk", &hex::encode(self.nk))
            .finish()
    }
}

/// Penumbra address as returned by the device
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Raw address bytes
    #[serde(serialize_with = "serialize_hex")]
    pub raw: AddressRaw,
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address")
            .field(&hex::encode(self.raw))
            .finish()
    }
}

/// Result of a signing request
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignResponse {
    /// Effect hash computed by the device
    #[serde(serialize_with = "serialize_hex")]
    pub effect_hash: EffectHashRaw,
    /// One signature per spend action
    #[serde(serialize_with = "serialize_hex_list")]
    pub spend_auth_signatures: Vec<SignatureRaw>,
    /// One signature per delegator vote action
    #[serde(serialize_with = "serialize_hex_list")]
    pub delegator_vote_signatures: Vec<SignatureRaw>,
    /// One signature per liquidity tournament vote action
    #[serde(serialize_with = "serialize_hex_list")]
    pub lqt_vote_signatures: Vec<SignatureRaw>,
}

impl fmt::Debug for SignResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignResponse")
            .field("effect_hash", &hex::encode(self.effect_hash))
            .field("spend_auth_signatures", &self.spend_auth_signatures.len())
            .field("delegator_vote_signatures", &self.delegator_vote_signatures.len())
            .field("lqt_vote_signatures", &self.lqt_vote_signatures.len())
            .finish()
    }
}

/// Signature counts reported by the device once a transaction is approved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SignatureCounts {
    pub spend: u16,
    pub delegator_vote: u16,
    pub lqt_vote: u16,
}

/// Serialize asset denominations the way the app expects them:
/// count (u8) | for each: len (u8) | bytes
///
/// Returns `None` if there are too many entries or one is too long
pub fn serialize_metadata<S: AsRef<str>>(metadata: &[S]) -> Option<Vec<u8>> {
    if metadata.len() > MAX_METADATA_ENTRIES {
        return None;
    }

    let mut out = Vec::with_capacity(1 + metadata.iter().map(|m| 1 + m.as_ref().len()).sum::<usize>());
    out.push(metadata.len() as u8);
    for denom in metadata {
        let denom = denom.as_ref().as_bytes();
        if denom.len() > MAX_DENOM_LEN - 1 {
            return None;
        }
        out.push(denom.len() as u8);
        out.extend_from_slice(denom);
    }

    Some(out)
}
