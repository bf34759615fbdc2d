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
//! Typed view over proto-JSON transaction plans
//!
//! Only the action cases are interpreted; action bodies and the remaining
//! plan fields are carried as JSON so the plan can be handed back unchanged.

use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::VectorError;

/// Signature an action needs from the spend authority
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Authorization {
    /// Spend authorization signature
    SpendAuth,
    /// Delegator vote signature
    DelegatorVote,
    /// Liquidity tournament vote signature
    LqtVote,
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Authorization::SpendAuth => "spend auth",
            Authorization::DelegatorVote => "delegator vote",
            Authorization::LqtVote => "lqt vote",
        })
    }
}

macro_rules! action_kinds {
    ($($variant:ident => $camel:literal, $snake:literal;)*) => {
        /// Cases of `penumbra.core.transaction.v1.ActionPlan`
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ActionKind {
            $(
                #[doc = $camel]
                $variant,
            )*
        }

        impl ActionKind {
            /// Every known case
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$variant,)*];

            /// Case name as it appears in proto-JSON and `actionTypes`
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(ActionKind::$variant => $camel,)*
                }
            }

            /// Parse a case name in camelCase or snake_case
            #[allow(unreachable_patterns)]
            pub fn from_case(case: &str) -> Option<Self> {
                match case {
                    $($camel | $snake => Some(ActionKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

action_kinds! {
    Spend => "spend", "spend";
    Output => "output", "output";
    Swap => "swap", "swap";
    SwapClaim => "swapClaim", "swap_claim";
    ValidatorDefinition => "validatorDefinition", "validator_definition";
    IbcRelayAction => "ibcRelayAction", "ibc_relay_action";
    ProposalSubmit => "proposalSubmit", "proposal_submit";
    ProposalWithdraw => "proposalWithdraw", "proposal_withdraw";
    ValidatorVote => "validatorVote", "validator_vote";
    DelegatorVote => "delegatorVote", "delegator_vote";
    ProposalDepositClaim => "proposalDepositClaim", "proposal_deposit_claim";
    PositionOpen => "positionOpen", "position_open";
    PositionClose => "positionClose", "position_close";
    PositionWithdraw => "positionWithdraw", "position_withdraw";
    PositionRewardClaim => "positionRewardClaim", "position_reward_claim";
    Delegate => "delegate", "delegate";
    Undelegate => "undelegate", "undelegate";
    UndelegateClaim => "undelegateClaim", "undelegate_claim";
    CommunityPoolSpend => "communityPoolSpend", "community_pool_spend";
    CommunityPoolOutput => "communityPoolOutput", "community_pool_output";
    CommunityPoolDeposit => "communityPoolDeposit", "community_pool_deposit";
    Ics20Withdrawal => "ics20Withdrawal", "ics20_withdrawal";
    ActionDutchAuctionSchedule => "actionDutchAuctionSchedule", "action_dutch_auction_schedule";
    ActionDutchAuctionEnd => "actionDutchAuctionEnd", "action_dutch_auction_end";
    ActionDutchAuctionWithdraw => "actionDutchAuctionWithdraw", "action_dutch_auction_withdraw";
    ActionLiquidityTournamentVote => "actionLiquidityTournamentVote", "action_liquidity_tournament_vote";
}

impl ActionKind {
    /// Signature the action requires, if any
    pub const fn authorization(&self) -> Option<Authorization> {
        match self {
            ActionKind::Spend => Some(Authorization::SpendAuth),
            ActionKind::DelegatorVote => Some(Authorization::DelegatorVote),
            ActionKind::ActionLiquidityTournamentVote => Some(Authorization::LqtVote),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action of a plan: its case and the untouched case body
#[derive(Clone, Debug, PartialEq)]
pub struct ActionPlan {
    /// Action case
    pub kind: ActionKind,
    /// Case body, as published
    pub body: Value,
}

impl<'de> Deserialize<'de> for ActionPlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!("action plan must hold exactly one case, found {}", map.len())));
        }

        let (case, body) = map
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("empty action plan"))?;
        let kind =
            ActionKind::from_case(&case).ok_or_else(|| D::Error::custom(format!("unknown action case {case:?}")))?;

        Ok(ActionPlan { kind, body })
    }
}

impl Serialize for ActionPlan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.as_str(), &self.body)?;
        map.end()
    }
}

/// Number of signatures of each kind a plan requires
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequiredAuthorizations {
    /// Spend authorization signatures
    pub spend: usize,
    /// Delegator vote signatures
    pub delegator_vote: usize,
    /// Liquidity tournament vote signatures
    pub lqt_vote: usize,
}

impl RequiredAuthorizations {
    /// Count for one authorization kind
    pub fn get(&self, kind: Authorization) -> usize {
        match kind {
            Authorization::SpendAuth => self.spend,
            Authorization::DelegatorVote => self.delegator_vote,
            Authorization::LqtVote => self.lqt_vote,
        }
    }
}

/// `penumbra.core.transaction.v1.TransactionPlan` in proto-JSON form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPlan {
    /// Actions in plan order
    #[serde(default)]
    pub actions: Vec<ActionPlan>,
    /// Chain id, expiry and fee
    #[serde(default, alias = "transaction_parameters", skip_serializing_if = "Option::is_none")]
    pub transaction_parameters: Option<Value>,
    /// Clue plans
    #[serde(default, alias = "detection_data", skip_serializing_if = "Option::is_none")]
    pub detection_data: Option<Value>,
    /// Memo plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<Value>,
    /// Fields this view does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionPlan {
    /// Decode a proto-JSON plan
    pub fn from_json(json: &Value) -> Result<Self, VectorError> {
        TransactionPlan::deserialize(json).map_err(|e| VectorError::InvalidPlan(e.to_string()))
    }

    /// Proto-JSON form, with known fields in camelCase
    pub fn to_json(&self) -> Result<Value, VectorError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Action case names in plan order
    pub fn action_types(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| a.kind.as_str().to_string())
            .collect()
    }

    /// Signatures the plan needs, per kind
    pub fn required_authorizations(&self) -> RequiredAuthorizations {
        let mut required = RequiredAuthorizations::default();
        for action in &self.actions {
            match action.kind.authorization() {
                Some(Authorization::SpendAuth) => required.spend += 1,
                Some(Authorization::DelegatorVote) => required.delegator_vote += 1,
                Some(Authorization::LqtVote) => required.lqt_vote += 1,
                None => {},
            }
        }
        required
    }
}
