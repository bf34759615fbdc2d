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
//! APDU instruction codes and payload sizes of the Penumbra app

/// Application Identifier for Penumbra commands
pub const CLA: u8 = 0x80;

/// Instruction to get an address
pub const INS_GET_ADDR: u8 = 0x01;
/// Instruction to sign a transaction plan
pub const INS_SIGN: u8 = 0x02;
/// Instruction to get the full viewing key
pub const INS_GET_FVK: u8 = 0x03;
/// Instruction to send transaction metadata ahead of signing
pub const INS_TX_METADATA: u8 = 0x04;
/// Instruction to retrieve a spend authorization signature
pub const INS_GET_SPEND_AUTH_SIGNATURE: u8 = 0x05;
/// Instruction to retrieve a delegator vote signature
pub const INS_GET_DELEGATOR_VOTE_SIGNATURE: u8 = 0x06;
/// Instruction to retrieve a liquidity tournament vote signature
pub const INS_GET_LQT_VOTE_SIGNATURE: u8 = 0x07;

/// Number of components in a Penumbra derivation path
pub const HDPATH_LEN: usize = 3;

/// BIP44 coin type registered for Penumbra
pub const PENUMBRA_COIN_TYPE: u32 = 6532;

/// Address randomizer size
pub const ADDR_RANDOMIZER_LEN: usize = 12;

/// Address index size: account (4) + has_randomizer (1) + randomizer (12)
pub const ADDRESS_INDEX_LEN: usize = 4 + 1 + ADDR_RANDOMIZER_LEN;

/// Raw address size
pub const ADDRESS_LEN: usize = 80;

/// Spend verification key size
pub const AK_LEN: usize = 32;

/// Nullifier key size
pub const NK_LEN: usize = 32;

/// Full viewing key size: AK (32) + NK (32)
pub const FVK_LEN: usize = AK_LEN + NK_LEN;

/// Effect hash size
pub const EFFECT_HASH_LEN: usize = 64;

/// Signature size for spend, delegator vote and lqt vote authorizations
pub const SIGNATURE_LEN: usize = 64;

/// Longest denomination the app accepts in transaction metadata
pub const MAX_DENOM_LEN: usize = 120;

/// Most metadata entries a single transaction can carry
pub const MAX_METADATA_ENTRIES: usize = 254;
