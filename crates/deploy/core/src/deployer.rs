//! The deployment procedure: blueprint, deploy, confirm, report, settle, verify.
//!
//! Every step waits for the previous one and any failure aborts the run. A
//! contract that deployed but failed verification has already been reported,
//! so the operator can verify it by hand.

use crate::{
    chain::{
        ChainClient,
        DeployOptions,
    },
    error::DeployError,
    report::Reporter,
    sleep::Sleeper,
    verification::VerificationService,
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{
        Address,
        U256,
    },
};
use std::time::Duration;
use tracing::info;

/// Contract deployed by [`Deployer::run`].
pub const CONTRACT_NAME: &str = "CoinFlip";

/// Pause between confirmation and verification so the explorer can index
/// the new contract.
pub const SETTLE_DELAY: Duration = Duration::from_millis(45_000);

/// 0.001 ether in wei.
pub const INITIAL_FUNDING_WEI: u64 = 1_000_000_000_000_000;

pub fn initial_funding() -> U256 {
    U256::from(INITIAL_FUNDING_WEI)
}

/// Outcome of a successful deployment, held only for the rest of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRecord {
    pub contract_address: Address,
    pub constructor_arguments: Vec<DynSolValue>,
    pub initial_funding: U256,
}

pub struct Deployer<C, V, S, R> {
    chain: C,
    verifier: V,
    sleeper: S,
    reporter: R,
}

impl<C, V, S, R> Deployer<C, V, S, R>
where
    C: ChainClient,
    V: VerificationService,
    S: Sleeper,
    R: Reporter,
{
    pub fn new(chain: C, verifier: V, sleeper: S, reporter: R) -> Self {
        Self {
            chain,
            verifier,
            sleeper,
            reporter,
        }
    }

    /// Deploys and verifies [`CONTRACT_NAME`].
    ///
    /// Each call runs the whole procedure from scratch.
    ///
    /// # Errors
    /// * [`DeployError::BlueprintNotFound`] if the build artifacts lack the contract
    /// * [`DeployError::DeploymentFailed`] if the deployment reverts or is never confirmed
    /// * [`DeployError::Verification`] if the explorer rejects the source
    pub async fn run(&self) -> Result<DeploymentRecord, DeployError> {
        let blueprint = self.chain.contract_factory(CONTRACT_NAME).await?;

        let options = DeployOptions {
            value: initial_funding(),
            constructor_arguments: Vec::new(),
        };
        let pending = self.chain.deploy(&blueprint, options.clone()).await?;
        let contract_address = self.chain.await_deployment(pending).await?;

        let record = DeploymentRecord {
            contract_address,
            constructor_arguments: options.constructor_arguments,
            initial_funding: options.value,
        };
        self.reporter.deployed(CONTRACT_NAME, record.contract_address);

        info!(delay = ?SETTLE_DELAY, "Waiting for the explorer to index the contract");
        self.sleeper.sleep(SETTLE_DELAY).await;

        self.verifier
            .verify(record.contract_address, &record.constructor_arguments)
            .await?;
        self.reporter.verified(CONTRACT_NAME, record.contract_address);

        Ok(record)
    }
}
