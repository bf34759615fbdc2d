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
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;

use ledger_penumbra_vectors::generator::{DEFAULT_BASE_URL, SKIPPED_INDICES, VECTOR_COUNT};
use ledger_penumbra_vectors::{generate, CommandAuthorizer, GeneratorOptions, PR_COMMIT, TEST_SEED};

#[derive(Parser, Debug)]
#[command(name = "generate-testcases", version)]
#[command(about = "Generate Penumbra signing fixtures from the reference transaction plans")]
struct CliArgs {
    /// Penumbra commit to take the plans from
    #[arg(long, default_value = PR_COMMIT)]
    commit: String,

    /// Raw content host of the Penumbra repository
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Fetch plans `0..count`
    #[arg(long, default_value_t = VECTOR_COUNT)]
    count: usize,

    /// Plan indices to leave out
    #[arg(long, value_delimiter = ',', default_values_t = SKIPPED_INDICES.to_vec())]
    skip: Vec<usize>,

    /// Seed phrase the plans are authorized with
    #[arg(long, default_value = TEST_SEED)]
    seed: String,

    /// Directory the two JSON files are written to
    #[arg(long, short = 'o', default_value = ".")]
    out_dir: PathBuf,

    /// Authorizer program followed by its arguments, e.g.
    /// `--authorizer node tools/authorize-plan.mjs`
    #[arg(long, required = true, num_args = 1.., allow_hyphen_values = true)]
    authorizer: Vec<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    let mut authorizer_cmd = args.authorizer.into_iter();
    let Some(program) = authorizer_cmd.next() else {
        log::error!("missing authorizer program");
        std::process::exit(2);
    };
    let authorizer = Arc::new(CommandAuthorizer::new(program, authorizer_cmd.collect()));

    let options = GeneratorOptions {
        base_url: args.base_url,
        commit: args.commit,
        count: args.count,
        skip: args.skip,
        seed: args.seed,
    };

    if let Err(e) = generate(&options, authorizer, &args.out_dir).await {
        log::error!("{e}");
        std::process::exit(1);
    }
}
