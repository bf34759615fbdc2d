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
use ledger_penumbra::{Address, AddressIndex, LedgerAppError, PenumbraApp, PenumbraPath, SignResponse};
use ledger_penumbra_emulator::{
    ApproveAction, DeviceKind, DeviceModel, Emulator, EmulatorError, SpeculosTransport, StartOptions,
};
use ledger_penumbra_vectors::{Authorization, Pr4948TestCase, VectorError};
use thiserror::Error as ThisError;

use crate::common::{default_options, snapshots_dir};

/// App client talking to an emulator
pub type EmulatedApp = PenumbraApp<SpeculosTransport>;

/// Errors raised by the suite flows
#[derive(ThisError, Debug)]
pub enum FlowError {
    /// Emulator failure
    #[error(transparent)]
    Emulator(#[from] EmulatorError),
    /// The app answered with an error
    #[error("app error: {0}")]
    App(#[from] LedgerAppError<EmulatorError>),
    /// Fixture could not be loaded
    #[error(transparent)]
    Vectors(#[from] VectorError),
    /// Emulator was attached without capturing the home screen
    #[error("emulator has no main menu snapshot")]
    NoMainMenu,
    /// Device effect hash differs from the fixture
    #[error("{name}: effect hash {found} does not match {expected}")]
    EffectHash {
        /// Test case name
        name: String,
        /// Hex effect hash of the fixture
        expected: String,
        /// Hex effect hash returned by the device
        found: String,
    },
    /// Device returned a different number of signatures
    #[error("{name}: expected {expected} {kind} signatures, device returned {found}")]
    SignatureCount {
        /// Test case name
        name: String,
        /// Authorization kind
        kind: Authorization,
        /// Signatures in the fixture
        expected: usize,
        /// Signatures returned by the device
        found: usize,
    },
}

/// Start `model` with the default suite options
pub async fn start(model: &DeviceModel) -> Result<Emulator, EmulatorError> {
    start_with(model, default_options(model.kind)).await
}

/// Start `model` with custom options; the device kind always follows `model`
pub async fn start_with(model: &DeviceModel, options: StartOptions) -> Result<Emulator, EmulatorError> {
    Emulator::start(&model.elf, StartOptions { model: model.kind, ..options }).await
}

/// App client bound to the emulator transport
pub fn app(emulator: &Emulator) -> EmulatedApp {
    PenumbraApp::new(emulator.transport())
}

/// Options for address review: touch devices confirm by tapping `Confirm`
pub fn show_address_options(kind: DeviceKind) -> StartOptions {
    let mut options = default_options(kind);
    if kind.is_touch() {
        options.approve_keyword = Some("Confirm".to_string());
        options.approve_action = ApproveAction::TapKeyword;
    }
    options
}

async fn review_and_approve(
    emulator: &Emulator,
    snapshot_name: &str,
    wait_text: Option<&str>,
) -> Result<(), FlowError> {
    let main_menu = emulator
        .main_menu_snapshot()
        .cloned()
        .ok_or(FlowError::NoMainMenu)?;

    emulator
        .wait_until_screen_is_not(&main_menu)
        .await?;
    if let Some(text) = wait_text {
        emulator.wait_for_text(text).await?;
    }
    emulator
        .compare_snapshots_and_approve(snapshots_dir(), snapshot_name)
        .await?;

    Ok(())
}

/// Request an address shown on screen and approve it
pub async fn show_address_and_approve(
    emulator: &Emulator,
    app: &EmulatedApp,
    path: &PenumbraPath,
    address_index: &AddressIndex,
    snapshot_name: &str,
) -> Result<Address, FlowError> {
    let request = async {
        app.show_address(path, address_index)
            .await
            .map_err(FlowError::from)
    };

    let (address, ()) = tokio::try_join!(request, review_and_approve(emulator, snapshot_name, None))?;
    Ok(address)
}

/// Sign `blob` while walking and approving the review on screen.
///
/// The request only returns once approved, so the review is driven
/// concurrently: wait until the main menu is gone, optionally for
/// `wait_text`, then compare the review with `snapshot_name` and approve.
pub async fn sign_and_approve<S: AsRef<str>>(
    emulator: &Emulator,
    app: &EmulatedApp,
    path: &PenumbraPath,
    blob: &[u8],
    metadata: &[S],
    snapshot_name: &str,
    wait_text: Option<&str>,
) -> Result<SignResponse, FlowError> {
    let signing = async {
        app.sign(path, blob, metadata)
            .await
            .map_err(FlowError::from)
    };

    let (response, ()) = tokio::try_join!(signing, review_and_approve(emulator, snapshot_name, wait_text))?;
    log::info!("{snapshot_name}: effect hash {}", hex::encode(response.effect_hash));

    Ok(response)
}

/// Compare the effect hash with its hex encoded expectation
pub fn check_effect_hash(name: &str, expected: &str, response: &SignResponse) -> Result<(), FlowError> {
    let found = hex::encode(response.effect_hash);
    if !found.eq_ignore_ascii_case(expected) {
        return Err(FlowError::EffectHash { name: name.to_string(), expected: expected.to_string(), found });
    }
    Ok(())
}

/// Compare the number of signatures of each kind with the fixture
pub fn check_signature_counts(testcase: &Pr4948TestCase, response: &SignResponse) -> Result<(), FlowError> {
    let counts = [
        (Authorization::SpendAuth, testcase.expected_spend_sigs.len(), response.spend_auth_signatures.len()),
        (
            Authorization::DelegatorVote,
            testcase.expected_delegator_vote_sigs.len(),
            response.delegator_vote_signatures.len(),
        ),
        (Authorization::LqtVote, testcase.expected_lqt_vote_sigs.len(), response.lqt_vote_signatures.len()),
    ];

    for (kind, expected, found) in counts {
        if expected != found {
            return Err(FlowError::SignatureCount { name: testcase.name.clone(), kind, expected, found });
        }
    }
    Ok(())
}
