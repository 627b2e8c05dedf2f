//! Source verification of deployed contracts on a block explorer.

use crate::{
    artifacts::ArtifactStore,
    chain::encode_constructor_args,
    error::VerificationError,
};
use alloy::{
    dyn_abi::DynSolValue,
    hex,
    primitives::Address,
};
use async_trait::async_trait;
use explorer_client::{
    ExplorerClient,
    VerificationRequest,
};
use std::time::Duration;
use tracing::info;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_STATUS_CHECKS: u32 = 20;

/// Matches deployed bytecode against published source.
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn verify(
        &self,
        address: Address,
        constructor_arguments: &[DynSolValue],
    ) -> Result<(), VerificationError>;
}

/// [`VerificationService`] submitting Hardhat build info to an
/// Etherscan-compatible explorer.
pub struct ExplorerVerifier {
    client: ExplorerClient,
    artifacts: ArtifactStore,
    contract_name: String,
    poll_interval: Duration,
    max_status_checks: u32,
}

impl ExplorerVerifier {
    pub fn new(
        client: ExplorerClient,
        artifacts: ArtifactStore,
        contract_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            artifacts,
            contract_name: contract_name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_status_checks: DEFAULT_MAX_STATUS_CHECKS,
        }
    }

    /// Override how the explorer's verdict is polled.
    pub fn with_status_polling(mut self, poll_interval: Duration, max_status_checks: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_status_checks = max_status_checks;
        self
    }

    fn build_request(
        &self,
        address: Address,
        constructor_arguments: &[DynSolValue],
    ) -> Result<VerificationRequest, VerificationError> {
        let blueprint = self.artifacts.blueprint(&self.contract_name)?;
        let build_info = blueprint
            .build_info
            .as_ref()
            .ok_or_else(|| VerificationError::MissingBuildInfo(blueprint.contract_name.clone()))?;

        Ok(VerificationRequest {
            address,
            contract_name: blueprint.fully_qualified_name(),
            compiler_version: format!("v{}", build_info.solc_long_version),
            source: serde_json::to_string(&build_info.input)?,
            constructor_arguments: hex::encode(encode_constructor_args(constructor_arguments)),
        })
    }
}

#[async_trait]
impl VerificationService for ExplorerVerifier {
    async fn verify(
        &self,
        address: Address,
        constructor_arguments: &[DynSolValue],
    ) -> Result<(), VerificationError> {
        let request = self.build_request(address, constructor_arguments)?;
        info!(
            contract = %request.contract_name,
            %address,
            explorer = %self.client.base_url(),
            "Submitting source for verification"
        );

        let guid = self.client.submit_verification(&request).await?;
        self.client
            .wait_for_verification(&guid, self.poll_interval, self.max_status_checks)
            .await?;

        Ok(())
    }
}
