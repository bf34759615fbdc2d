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

use async_trait::async_trait;
use ledger_transport::{APDUAnswer, APDUCommand, Exchange};

use crate::api::ApiClient;
use crate::error::EmulatorError;

/// APDU transport backed by the emulator REST API
#[derive(Clone, Debug)]
pub struct SpeculosTransport {
    api: ApiClient,
}

impl SpeculosTransport {
    /// Transport talking to the given API
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Exchange for SpeculosTransport {
    type Error = EmulatorError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(&self, command: &APDUCommand<I>) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let answer = self.api.apdu(command.serialize()).await?;
        APDUAnswer::from_answer(answer).map_err(|_| EmulatorError::InvalidAnswer)
    }
}
