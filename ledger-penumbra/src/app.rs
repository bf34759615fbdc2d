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
use std::ops::Deref;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use ledger_transport::{APDUAnswer, APDUCommand, APDUErrorCode, Exchange};
use ledger_zondax_generic::{App, AppExt, AppInfo, ChunkPayloadType, DeviceInfo, LedgerAppError, Version};

use crate::config::*;
use crate::path::PenumbraPath;
use crate::types::{
    serialize_metadata, Address, AddressIndex, FullViewingKey, SignResponse, SignatureCounts, SignatureRaw,
};

/// Ledger App
pub struct PenumbraApp<E> {
    apdu_transport: E,
}

impl<E: Exchange> App for PenumbraApp<E> {
    const CLA: u8 = CLA;
}

impl<E> PenumbraApp<E> {
    /// Connect to the Ledger App
    pub const fn new(apdu_transport: E) -> Self {
        Self { apdu_transport }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &E {
        &self.apdu_transport
    }
}

fn check_response<E, A>(response: &APDUAnswer<A>) -> Result<(), LedgerAppError<E>>
where
    E: std::error::Error,
    A: Deref<Target = [u8]>,
{
    match response.error_code() {
        Ok(APDUErrorCode::NoError) => Ok(()),
        Ok(err) => Err(LedgerAppError::AppSpecific(err as _, err.description())),
        Err(err) => Err(LedgerAppError::AppSpecific(err, "[APDU_ERROR] Unknown".to_string())),
    }
}

impl<E> PenumbraApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
    //this bound is unnecessary but it's repeated here
    // for the sake of documentation
    Self: AppExt<E>,
{
    /// Retrieve the app version
    pub async fn get_version(&self) -> Result<Version, LedgerAppError<E::Error>> {
        <Self as AppExt<E>>::get_version(&self.apdu_transport).await
    }

    /// Retrieve the app info
    pub async fn get_app_info(&self) -> Result<AppInfo, LedgerAppError<E::Error>> {
        <Self as AppExt<E>>::get_app_info(&self.apdu_transport).await
    }

    /// Retrieve the device info
    pub async fn get_device_info(&self) -> Result<DeviceInfo, LedgerAppError<E::Error>> {
        <Self as AppExt<E>>::get_device_info(&self.apdu_transport).await
    }

    /// Retrieves the full viewing key (ak || nk)
    pub async fn get_fvk(
        &self,
        path: &PenumbraPath,
        address_index: &AddressIndex,
    ) -> Result<FullViewingKey, LedgerAppError<E::Error>> {
        let mut data = path.serialize();
        data.extend_from_slice(&address_index.serialize());

        let command = APDUCommand { cla: Self::CLA, ins: INS_GET_FVK, p1: 0x00, p2: 0x00, data };

        let response = self.apdu_transport.exchange(&command).await?;
        check_response::<E::Error, _>(&response)?;

        let response_data = response.data();
        if response_data.len() < FVK_LEN {
            return Err(LedgerAppError::InvalidPK);
        }

        log::info!("Received response {}", response_data.len());

        let mut fvk = FullViewingKey { ak: [0; AK_LEN], nk: [0; NK_LEN] };
        fvk.ak.copy_from_slice(&response_data[..AK_LEN]);
        fvk.nk.copy_from_slice(&response_data[AK_LEN..FVK_LEN]);

        Ok(fvk)
    }

    /// Retrieves an address without user confirmation
    pub async fn get_address(
        &self,
        path: &PenumbraPath,
        address_index: &AddressIndex,
    ) -> Result<Address, LedgerAppError<E::Error>> {
        self.address(path, address_index, false).await
    }

    /// Shows the address on the device and returns it once the user approves
    pub async fn show_address(
        &self,
        path: &PenumbraPath,
        address_index: &AddressIndex,
    ) -> Result<Address, LedgerAppError<E::Error>> {
        self.address(path, address_index, true).await
    }

    async fn address(
        &self,
        path: &PenumbraPath,
        address_index: &AddressIndex,
        require_confirmation: bool,
    ) -> Result<Address, LedgerAppError<E::Error>> {
        let mut data = path.serialize();
        data.extend_from_slice(&address_index.serialize());

        let p1 = if require_confirmation { 1 } else { 0 };
        let command = APDUCommand { cla: Self::CLA, ins: INS_GET_ADDR, p1, p2: 0x00, data };

        let response = self.apdu_transport.exchange(&command).await?;
        check_response::<E::Error, _>(&response)?;

        let response_data = response.data();
        if response_data.len() < ADDRESS_LEN {
            return Err(LedgerAppError::InvalidPK);
        }

        log::info!("Received response {}", response_data.len());

        let mut address = Address { raw: [0; ADDRESS_LEN] };
        address
            .raw
            .copy_from_slice(&response_data[..ADDRESS_LEN]);

        Ok(address)
    }

    /// Sends the asset denominations the app needs to render the transaction
    pub async fn send_metadata<S: AsRef<str>>(&self, metadata: &[S]) -> Result<(), LedgerAppError<E::Error>> {
        let data = serialize_metadata(metadata).ok_or(LedgerAppError::InvalidMessageSize)?;

        log::info!("sending {} metadata entries to ledger", metadata.len());

        let start_command = APDUCommand {
            cla: Self::CLA,
            ins: INS_TX_METADATA,
            p1: ChunkPayloadType::Init as u8,
            p2: 0x00,
            data: Vec::<u8>::new(),
        };

        let response = <Self as AppExt<E>>::send_chunks(&self.apdu_transport, start_command, &data).await?;
        check_response::<E::Error, _>(&response)
    }

    /// Signs a binary encoded transaction plan
    ///
    /// The request only completes once the transaction has been reviewed
    /// and approved on the device. Metadata, if any, is sent first.
    pub async fn sign<S: AsRef<str>>(
        &self,
        path: &PenumbraPath,
        blob: &[u8],
        metadata: &[S],
    ) -> Result<SignResponse, LedgerAppError<E::Error>> {
        if blob.is_empty() {
            return Err(LedgerAppError::InvalidEmptyMessage);
        }

        if !metadata.is_empty() {
            self.send_metadata(metadata).await?;
        }

        let start_command = APDUCommand {
            cla: Self::CLA,
            ins: INS_SIGN,
            p1: ChunkPayloadType::Init as u8,
            p2: 0x00,
            data: path.serialize(),
        };

        log::info!("sending transaction plan ({} bytes) to ledger", blob.len());

        let response = <Self as AppExt<E>>::send_chunks(&self.apdu_transport, start_command, blob).await?;
        check_response::<E::Error, _>(&response)?;

        let response_data = response.data();
        // effect hash | spend qty | delegator vote qty [| lqt vote qty]
        if response_data.len() < EFFECT_HASH_LEN + 2 * 2 {
            return Err(LedgerAppError::NoSignature);
        }

        let mut effect_hash = [0u8; EFFECT_HASH_LEN];
        effect_hash.copy_from_slice(&response_data[..EFFECT_HASH_LEN]);

        let counts_data = &response_data[EFFECT_HASH_LEN..];
        let counts = SignatureCounts {
            spend: LittleEndian::read_u16(&counts_data[0..2]),
            delegator_vote: LittleEndian::read_u16(&counts_data[2..4]),
            lqt_vote: if counts_data.len() >= 6 { LittleEndian::read_u16(&counts_data[4..6]) } else { 0 },
        };

        log::info!("sign ok, effect hash {} {:?}", hex::encode(effect_hash), counts);

        Ok(SignResponse {
            effect_hash,
            spend_auth_signatures: self
                .get_signatures(INS_GET_SPEND_AUTH_SIGNATURE, counts.spend)
                .await?,
            delegator_vote_signatures: self
                .get_signatures(INS_GET_DELEGATOR_VOTE_SIGNATURE, counts.delegator_vote)
                .await?,
            lqt_vote_signatures: self
                .get_signatures(INS_GET_LQT_VOTE_SIGNATURE, counts.lqt_vote)
                .await?,
        })
    }

    async fn get_signatures(&self, ins: u8, count: u16) -> Result<Vec<SignatureRaw>, LedgerAppError<E::Error>> {
        let mut signatures = Vec::with_capacity(count as usize);
        for index in 0..count {
            signatures.push(self.get_signature(ins, index).await?);
        }
        Ok(signatures)
    }

    async fn get_signature(&self, ins: u8, index: u16) -> Result<SignatureRaw, LedgerAppError<E::Error>> {
        let mut data = Vec::with_capacity(2);
        let _ = data.write_u16::<LittleEndian>(index);

        let command = APDUCommand { cla: Self::CLA, ins, p1: 0x00, p2: 0x00, data };

        let response = self.apdu_transport.exchange(&command).await?;
        check_response::<E::Error, _>(&response)?;

        let response_data = response.data();
        if response_data.len() < SIGNATURE_LEN {
            return Err(LedgerAppError::InvalidSignature);
        }

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&response_data[..SIGNATURE_LEN]);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    use matches::assert_matches;

    use super::*;

    /// Replays canned answers and records every command it receives
    #[derive(Default)]
    struct MockTransport {
        answers: Mutex<VecDeque<Vec<u8>>>,
        commands: Mutex<Vec<Vec<u8>>>,
    }

    impl MockTransport {
        fn with_answers<I: IntoIterator<Item = Vec<u8>>>(answers: I) -> Self {
            Self { answers: Mutex::new(answers.into_iter().collect()), commands: Default::default() }
        }

        fn commands(&self) -> Vec<Vec<u8>> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Exchange for MockTransport {
        type Error = io::Error;
        type AnswerType = Vec<u8>;

        async fn exchange<I>(&self, command: &APDUCommand<I>) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
        where
            I: Deref<Target = [u8]> + Send + Sync,
        {
            self.commands
                .lock()
                .unwrap()
                .push(command.serialize());
            let answer = self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no answer queued"))?;
            APDUAnswer::from_answer(answer).map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "short answer"))
        }
    }

    fn ok(data: &[u8]) -> Vec<u8> {
        let mut answer = data.to_vec();
        answer.extend_from_slice(&[0x90, 0x00]);
        answer
    }

    fn path() -> PenumbraPath {
        "m/44'/6532'/0'".parse().unwrap()
    }

    #[tokio::test]
    async fn fvk_is_split_into_ak_and_nk() {
        let mut key = vec![0xAA; AK_LEN];
        key.extend(vec![0xBB; NK_LEN]);
        let app = PenumbraApp::new(MockTransport::with_answers([ok(&key)]));

        let fvk = app
            .get_fvk(&path(), &AddressIndex::new(1))
            .await
            .unwrap();
        assert_eq!(fvk.ak, [0xAA; AK_LEN]);
        assert_eq!(fvk.nk, [0xBB; NK_LEN]);

        let commands = app.transport().commands();
        assert_eq!(commands.len(), 1);
        // cla | ins | p1 | p2 | len | path (12) | address index (17)
        assert_eq!(&commands[0][..4], &[CLA, INS_GET_FVK, 0, 0]);
        assert_eq!(commands[0][4] as usize, 12 + ADDRESS_INDEX_LEN);
        assert_eq!(&commands[0][5..17], path().serialize().as_slice());
    }

    #[tokio::test]
    async fn show_address_requests_confirmation() {
        let app = PenumbraApp::new(MockTransport::with_answers([ok(&[7u8; ADDRESS_LEN])]));

        let address = app
            .show_address(&path(), &AddressIndex::new(1))
            .await
            .unwrap();
        assert_eq!(address.raw, [7u8; ADDRESS_LEN]);
        assert_eq!(&app.transport().commands()[0][..4], &[CLA, INS_GET_ADDR, 1, 0]);
    }

    #[tokio::test]
    async fn short_address_is_rejected() {
        let app = PenumbraApp::new(MockTransport::with_answers([ok(&[7u8; 10])]));

        let err = app
            .get_address(&path(), &AddressIndex::new(1))
            .await
            .unwrap_err();
        assert_matches!(err, LedgerAppError::InvalidPK);
    }

    #[tokio::test]
    async fn device_error_is_reported() {
        let app = PenumbraApp::new(MockTransport::with_answers([vec![0x69, 0x84]]));

        let err = app
            .get_address(&path(), &AddressIndex::new(1))
            .await
            .unwrap_err();
        assert_matches!(err, LedgerAppError::AppSpecific(0x6984, _));
    }

    #[tokio::test]
    async fn sign_fetches_every_signature() {
        let effect_hash = [0x11u8; EFFECT_HASH_LEN];
        let mut sign_reply = effect_hash.to_vec();
        sign_reply.extend_from_slice(&[2, 0, 1, 0]);

        let app = PenumbraApp::new(MockTransport::with_answers([
            // metadata init + last
            ok(&[]),
            ok(&[]),
            // sign init + last
            ok(&[]),
            ok(&sign_reply),
            ok(&[0x01; SIGNATURE_LEN]),
            ok(&[0x02; SIGNATURE_LEN]),
            ok(&[0x03; SIGNATURE_LEN]),
        ]));

        let response = app
            .sign(&path(), &[0xCA, 0xFE], &["upenumbra"])
            .await
            .unwrap();

        assert_eq!(response.effect_hash, effect_hash);
        assert_eq!(response.spend_auth_signatures, vec![[0x01; SIGNATURE_LEN], [0x02; SIGNATURE_LEN]]);
        assert_eq!(response.delegator_vote_signatures, vec![[0x03; SIGNATURE_LEN]]);
        assert!(response.lqt_vote_signatures.is_empty());

        let commands = app.transport().commands();
        assert_eq!(commands.len(), 7);
        assert_eq!(&commands[0][..4], &[CLA, INS_TX_METADATA, ChunkPayloadType::Init as u8, 0]);
        assert_eq!(&commands[1][..4], &[CLA, INS_TX_METADATA, ChunkPayloadType::Last as u8, 0]);
        assert_eq!(&commands[2][..4], &[CLA, INS_SIGN, ChunkPayloadType::Init as u8, 0]);
        assert_eq!(&commands[2][5..], path().serialize().as_slice());
        assert_eq!(&commands[3][..4], &[CLA, INS_SIGN, ChunkPayloadType::Last as u8, 0]);
        assert_eq!(&commands[3][5..], &[0xCA, 0xFE]);
        assert_eq!(&commands[4][..4], &[CLA, INS_GET_SPEND_AUTH_SIGNATURE, 0, 0]);
        assert_eq!(&commands[4][5..], &[0, 0]);
        assert_eq!(&commands[5][5..], &[1, 0]);
        assert_eq!(&commands[6][..4], &[CLA, INS_GET_DELEGATOR_VOTE_SIGNATURE, 0, 0]);
    }

    #[tokio::test]
    async fn sign_reads_optional_lqt_count() {
        let mut sign_reply = vec![0x22u8; EFFECT_HASH_LEN];
        sign_reply.extend_from_slice(&[0, 0, 0, 0, 1, 0]);

        let app = PenumbraApp::new(MockTransport::with_answers([
            ok(&[]),
            ok(&sign_reply),
            ok(&[0x04; SIGNATURE_LEN]),
        ]));

        let response = app
            .sign::<&str>(&path(), &[0x01], &[])
            .await
            .unwrap();
        assert!(response.spend_auth_signatures.is_empty());
        assert_eq!(response.lqt_vote_signatures, vec![[0x04; SIGNATURE_LEN]]);
        assert_eq!(app.transport().commands()[2][1], INS_GET_LQT_VOTE_SIGNATURE);
    }

    #[tokio::test]
    async fn sign_reply_without_counts() {
        // effect hash only, the signature counts are missing
        let app = PenumbraApp::new(MockTransport::with_answers([ok(&[]), ok(&[0x33; EFFECT_HASH_LEN])]));

        let err = app
            .sign::<&str>(&path(), &[0x01], &[])
            .await
            .unwrap_err();
        assert_matches!(err, LedgerAppError::NoSignature);
        assert_eq!(app.transport().commands().len(), 2);
    }

    #[tokio::test]
    async fn short_signature_is_rejected() {
        let mut sign_reply = vec![0x44u8; EFFECT_HASH_LEN];
        sign_reply.extend_from_slice(&[1, 0, 0, 0]);

        let app = PenumbraApp::new(MockTransport::with_answers([
            ok(&[]),
            ok(&sign_reply),
            ok(&[0x05; SIGNATURE_LEN - 1]),
        ]));

        let err = app
            .sign::<&str>(&path(), &[0x01], &[])
            .await
            .unwrap_err();
        assert_matches!(err, LedgerAppError::InvalidSignature);
        assert_eq!(app.transport().commands()[2][1], INS_GET_SPEND_AUTH_SIGNATURE);
    }

    #[tokio::test]
    async fn sign_empty() {
        let app = PenumbraApp::new(MockTransport::default());

        let err = app
            .sign::<&str>(&path(), &[], &[])
            .await
            .unwrap_err();
        assert_matches!(err, LedgerAppError::InvalidEmptyMessage);
        assert!(app.transport().commands().is_empty());
    }
}
