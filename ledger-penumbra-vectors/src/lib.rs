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
//! Signing fixtures for the Penumbra app functional tests, and the generator
//! that derives them from the reference transaction plans

#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
    )
)]

/// Turning plans into effect hashes and signatures
pub mod authorizer;
mod error;
/// Fixture files consumed by the functional tests
pub mod fixtures;
pub mod generator;
pub mod plan;

pub use authorizer::{AuthorizedPlan, CommandAuthorizer, PlanAuthorizer};
pub use error::VectorError;
pub use fixtures::{load_testcases, Pr4948TestCase, TestCase};
pub use generator::{
    convert_plan_to_testcase, fetch_plans, generate, write_outputs, FetchedPlan, GeneratorOptions, PR_COMMIT,
    TEST_SEED,
};
pub use plan::{ActionKind, ActionPlan, Authorization, TransactionPlan};
