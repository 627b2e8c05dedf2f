use crate::artifacts::ArtifactError;
use explorer_client::ExplorerClientError;
use thiserror::Error;

/// Errors that abort a deployment run.
///
/// Every step of the run propagates its failure unchanged; nothing is retried.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Contract blueprint not found in build artifacts: {0}")]
    BlueprintNotFound(String),

    #[error("Failed to load contract artifact: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Invalid constructor arguments: expected {0}, got {1}")]
    InvalidConstructorArgs(usize, usize),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("Contract verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Errors raised by the verification service.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("No build info found for {0}; recompile to produce build-info files")]
    MissingBuildInfo(String),

    #[error("Failed to read contract artifact: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Failed to encode verification input: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerClientError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_blueprint_not_found_display() {
        let err = DeployError::BlueprintNotFound("CoinFlip".to_string());
        assert_eq!(
            err.to_string(),
            "Contract blueprint not found in build artifacts: CoinFlip"
        );
    }

    #[test]
    fn test_verification_error_converts_into_deploy_error() {
        let err: DeployError = VerificationError::Explorer(ExplorerClientError::Rejected(
            "NOTOK: Unable to locate ContractCode".to_string(),
        ))
        .into();

        assert_matches!(err, DeployError::Verification(VerificationError::Explorer(_)));
        assert!(err.to_string().contains("Unable to locate ContractCode"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<DeployError>();
        assert_sync::<DeployError>();
    }
}
