#![cfg(feature = "full-test")]

use alloy::{
    dyn_abi::DynSolValue,
    node_bindings::Anvil,
    primitives::Address,
    providers::{
        Provider,
        ProviderBuilder,
    },
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use deploy_core::{
    artifacts::ArtifactStore,
    chain::{
        AlloyChainClient,
        ChainConfig,
        ChainClient,
        DeployOptions,
    },
    deployer::{
        Deployer,
        initial_funding,
    },
    error::{
        DeployError,
        VerificationError,
    },
    report::ConsoleReporter,
    verification::VerificationService,
};
use serde_json::json;
use std::{
    fs,
    path::Path,
    time::Duration,
};

// Init code returning a single STOP byte as runtime code; accepts value.
const PAYABLE_INIT_CODE: &str = "0x6001600c60003960016000f300";
// PUSH1 0 PUSH1 0 REVERT
const REVERTING_INIT_CODE: &str = "0x60006000fd";

fn write_artifact(root: &Path, name: &str, bytecode: &str) {
    let dir = root.join(format!("contracts/{name}.sol"));
    fs::create_dir_all(&dir).unwrap();
    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": name,
        "sourceName": format!("contracts/{name}.sol"),
        "abi": [],
        "bytecode": bytecode,
        "deployedBytecode": "0x00",
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    fs::write(dir.join(format!("{name}.json")), artifact.to_string()).unwrap();
}

struct NoopVerifier;

#[async_trait]
impl VerificationService for NoopVerifier {
    async fn verify(
        &self,
        _address: Address,
        constructor_arguments: &[DynSolValue],
    ) -> Result<(), VerificationError> {
        assert!(constructor_arguments.is_empty());
        Ok(())
    }
}

struct NoSleep;

#[async_trait]
impl deploy_core::sleep::Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

#[tokio::test]
async fn deploys_funded_contract_on_anvil() {
    let anvil = Anvil::new().try_spawn().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    write_artifact(artifacts.path(), "CoinFlip", PAYABLE_INIT_CODE);

    let config = ChainConfig {
        rpc_url: anvil.endpoint(),
        confirmations: 1,
        confirmation_timeout: Some(Duration::from_secs(30)),
    };
    let signer: PrivateKeySigner = anvil.keys()[0].clone().into();
    let chain = AlloyChainClient::connect(&config, signer, ArtifactStore::new(artifacts.path()))
        .await
        .unwrap();
    assert_eq!(chain.chain_id(), anvil.chain_id());

    let record = Deployer::new(chain, NoopVerifier, NoSleep, ConsoleReporter::default())
        .run()
        .await
        .unwrap();

    let provider = ProviderBuilder::new().connect_http(anvil.endpoint_url());
    let balance = provider.get_balance(record.contract_address).await.unwrap();
    assert_eq!(balance, initial_funding());
    assert_eq!(
        provider.get_code_at(record.contract_address).await.unwrap().to_vec(),
        vec![0x00]
    );
}

#[tokio::test]
async fn reverting_constructor_fails_deployment() {
    let anvil = Anvil::new().try_spawn().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    write_artifact(artifacts.path(), "CoinFlip", REVERTING_INIT_CODE);

    let config = ChainConfig {
        rpc_url: anvil.endpoint(),
        confirmations: 1,
        confirmation_timeout: Some(Duration::from_secs(30)),
    };
    let signer: PrivateKeySigner = anvil.keys()[0].clone().into();
    let chain = AlloyChainClient::connect(&config, signer, ArtifactStore::new(artifacts.path()))
        .await
        .unwrap();

    let blueprint = chain.contract_factory("CoinFlip").await.unwrap();
    let result = async {
        let pending = chain
            .deploy(
                &blueprint,
                DeployOptions {
                    value: initial_funding(),
                    constructor_arguments: vec![],
                },
            )
            .await?;
        chain.await_deployment(pending).await
    }
    .await;

    assert!(
        matches!(result, Err(DeployError::DeploymentFailed(_))),
        "{result:?}"
    );
}

#[tokio::test]
async fn unknown_contract_is_blueprint_not_found() {
    let anvil = Anvil::new().try_spawn().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    write_artifact(artifacts.path(), "Lottery", PAYABLE_INIT_CODE);

    let config = ChainConfig {
        rpc_url: anvil.endpoint(),
        confirmations: 1,
        confirmation_timeout: None,
    };
    let signer: PrivateKeySigner = anvil.keys()[0].clone().into();
    let chain = AlloyChainClient::connect(&config, signer, ArtifactStore::new(artifacts.path()))
        .await
        .unwrap();

    let err = Deployer::new(chain, NoopVerifier, NoSleep, ConsoleReporter::default())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::BlueprintNotFound(_)), "{err:?}");
}
