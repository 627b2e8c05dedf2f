//! Collaborator configuration and wiring for a deployment run.
//!
//! The procedure itself takes no parameters. Everything here configures the
//! chain client and the verification service.

use crate::{
    artifacts::ArtifactStore,
    chain::{
        AlloyChainClient,
        ChainConfig,
    },
    deployer::{
        CONTRACT_NAME,
        Deployer,
        DeploymentRecord,
    },
    error::DeployError,
    report::ConsoleReporter,
    sleep::TokioSleeper,
    verification::ExplorerVerifier,
};
use alloy::signers::local::PrivateKeySigner;
use clap::{
    Parser,
    ValueHint,
};
use deploy_common::args::CliArgs;
use explorer_client::ExplorerClient;
use std::{
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Connection settings for the chain and the block explorer.
#[derive(Parser, Debug, Clone)]
#[clap(
    about = "Deploy the CoinFlip contract and verify it on a block explorer",
    long_about = "Deploy the CoinFlip contract funded with 0.001 ether, wait for confirmation, \
                  give the explorer 45 seconds to index it, then submit its source for verification."
)]
pub struct DeployArgs {
    /// JSON-RPC endpoint of the target chain
    #[clap(
        long = "rpc-url",
        env = "DEPLOY_RPC_URL",
        value_hint = ValueHint::Url,
        default_value = DEFAULT_RPC_URL
    )]
    pub rpc_url: String,

    /// Hex private key of the deploying account
    #[clap(long = "private-key", env = "DEPLOY_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Hardhat artifacts directory
    #[clap(
        long = "artifacts",
        env = "DEPLOY_ARTIFACTS_DIR",
        value_hint = ValueHint::DirPath,
        default_value = "artifacts"
    )]
    pub artifacts: PathBuf,

    /// Blocks to wait for, counting the one that includes the deployment
    #[clap(
        long,
        env = "DEPLOY_CONFIRMATIONS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub confirmations: u64,

    /// Give up waiting for the deployment after this many seconds
    #[clap(long = "confirmation-timeout-secs", env = "DEPLOY_CONFIRMATION_TIMEOUT_SECS")]
    pub confirmation_timeout_secs: Option<u64>,

    /// Etherscan-compatible explorer API endpoint
    #[clap(
        long = "explorer-api-url",
        env = "DEPLOY_EXPLORER_API_URL",
        value_hint = ValueHint::Url,
        default_value = DEFAULT_EXPLORER_API_URL
    )]
    pub explorer_api_url: String,

    /// Chain id sent to the explorer; defaults to the one the RPC node reports
    #[clap(long = "chain-id", env = "DEPLOY_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Explorer API key
    #[clap(long = "explorer-api-key", env = "DEPLOY_EXPLORER_API_KEY", hide_env_values = true)]
    pub explorer_api_key: String,
}

impl DeployArgs {
    fn signer(&self) -> Result<PrivateKeySigner, DeployError> {
        self.private_key
            .trim()
            .parse()
            .map_err(|e| DeployError::Config(format!("invalid private key: {e}")))
    }

    fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            rpc_url: self.rpc_url.clone(),
            confirmations: self.confirmations,
            confirmation_timeout: self.confirmation_timeout_secs.map(Duration::from_secs),
        }
    }

    fn explorer_client(&self, node_chain_id: u64) -> Result<ExplorerClient, DeployError> {
        let chain_id = self.chain_id.unwrap_or(node_chain_id);
        ExplorerClient::new(&self.explorer_api_url, &self.explorer_api_key, chain_id)
            .map_err(|e| DeployError::Config(format!("invalid explorer API: {e}")))
    }

    /// Connects the collaborators and runs the deployment once.
    pub async fn run(&self, cli_args: &CliArgs) -> Result<DeploymentRecord, DeployError> {
        let signer = self.signer()?;
        let artifacts = ArtifactStore::new(&self.artifacts);

        let chain =
            AlloyChainClient::connect(&self.chain_config(), signer, artifacts.clone()).await?;
        let explorer = self.explorer_client(chain.chain_id())?;
        let verifier = ExplorerVerifier::new(explorer, artifacts, CONTRACT_NAME);

        Deployer::new(
            chain,
            verifier,
            TokioSleeper,
            ConsoleReporter::new(cli_args.json_output()),
        )
        .run()
        .await
    }
}
