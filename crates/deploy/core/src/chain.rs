//! Chain client: blueprint lookup, deployment submission and confirmation.

use crate::{
    artifacts::{
        ArtifactError,
        ArtifactStore,
        Blueprint,
    },
    error::DeployError,
};
use alloy::{
    dyn_abi::DynSolValue,
    network::{
        EthereumWallet,
        TransactionBuilder,
    },
    primitives::{
        Address,
        TxHash,
        U256,
    },
    providers::{
        DynProvider,
        PendingTransactionBuilder,
        Provider,
        ProviderBuilder,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::TransportError,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{
    debug,
    info,
};

/// Parameters of a deployment transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOptions {
    /// Native currency sent to the constructor, in wei.
    pub value: U256,
    pub constructor_arguments: Vec<DynSolValue>,
}

/// A submitted deployment transaction that may not be mined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeployment {
    pub tx_hash: TxHash,
}

/// Deploys contract blueprints to a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Look up the blueprint of the named contract.
    async fn contract_factory(&self, name: &str) -> Result<Blueprint, DeployError>;

    /// Submit a deployment transaction. Returns as soon as the node accepted it.
    async fn deploy(
        &self,
        blueprint: &Blueprint,
        options: DeployOptions,
    ) -> Result<PendingDeployment, DeployError>;

    /// Wait for the deployment to be confirmed and return the contract address.
    async fn await_deployment(&self, pending: PendingDeployment) -> Result<Address, DeployError>;
}

/// ABI-encode constructor arguments as they are appended to the init code.
pub fn encode_constructor_args(args: &[DynSolValue]) -> Vec<u8> {
    if args.is_empty() {
        return Vec::new();
    }
    DynSolValue::Tuple(args.to_vec()).abi_encode_params()
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// Blocks to wait for, counting the one including the deployment. `1`
    /// returns as soon as the deployment is mined.
    pub confirmations: u64,
    pub confirmation_timeout: Option<Duration>,
}

/// [`ChainClient`] backed by an alloy provider signing with a local key.
pub struct AlloyChainClient {
    provider: DynProvider,
    artifacts: ArtifactStore,
    chain_id: u64,
    confirmations: u64,
    confirmation_timeout: Option<Duration>,
}

impl AlloyChainClient {
    pub async fn connect(
        config: &ChainConfig,
        signer: PrivateKeySigner,
        artifacts: ArtifactStore,
    ) -> Result<Self, DeployError> {
        let deployer = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&config.rpc_url)
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?
            .erased();
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        info!(rpc_url = %config.rpc_url, chain_id, %deployer, "Connected to chain");

        Ok(Self {
            provider,
            artifacts,
            chain_id,
            confirmations: config.confirmations,
            confirmation_timeout: config.confirmation_timeout,
        })
    }

    /// Chain id reported by the node at connect time.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Node errors carry the revert reason when the transaction would fail.
    fn map_send_error(err: TransportError) -> DeployError {
        match err.as_error_resp() {
            Some(payload) => DeployError::DeploymentFailed(payload.message.to_string()),
            None => DeployError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn contract_factory(&self, name: &str) -> Result<Blueprint, DeployError> {
        self.artifacts.blueprint(name).map_err(|err| {
            match err {
                ArtifactError::NotFound(name) => DeployError::BlueprintNotFound(name),
                other => DeployError::Artifact(other),
            }
        })
    }

    async fn deploy(
        &self,
        blueprint: &Blueprint,
        options: DeployOptions,
    ) -> Result<PendingDeployment, DeployError> {
        let expected = blueprint
            .abi
            .constructor()
            .map(|constructor| constructor.inputs.len())
            .unwrap_or_default();
        if expected != options.constructor_arguments.len() {
            return Err(DeployError::InvalidConstructorArgs(
                expected,
                options.constructor_arguments.len(),
            ));
        }

        let mut code = blueprint.bytecode.to_vec();
        code.extend(encode_constructor_args(&options.constructor_arguments));

        let tx = TransactionRequest::default()
            .with_deploy_code(code)
            .with_value(options.value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(Self::map_send_error)?;
        let tx_hash = *pending.tx_hash();

        info!(contract = %blueprint.contract_name, %tx_hash, value = %options.value, "Deployment submitted");
        Ok(PendingDeployment { tx_hash })
    }

    async fn await_deployment(&self, pending: PendingDeployment) -> Result<Address, DeployError> {
        debug!(tx_hash = %pending.tx_hash, confirmations = self.confirmations, "Waiting for deployment");

        let receipt =
            PendingTransactionBuilder::new(self.provider.root().clone(), pending.tx_hash)
                .with_required_confirmations(self.confirmations)
                .with_timeout(self.confirmation_timeout)
                .get_receipt()
                .await
                .map_err(|e| {
                    DeployError::DeploymentFailed(format!(
                        "transaction {} was not confirmed: {e}",
                        pending.tx_hash
                    ))
                })?;

        if !receipt.status() {
            return Err(DeployError::DeploymentFailed(format!(
                "transaction {} reverted",
                pending.tx_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            DeployError::DeploymentFailed(format!(
                "receipt of {} has no contract address",
                pending.tx_hash
            ))
        })
    }
}
