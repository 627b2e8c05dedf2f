use std::time::Duration;

use alloy::primitives::Address;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Default request timeout for explorer API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for the Etherscan-compatible contract verification API.
///
/// Explorers process verification submissions asynchronously: a submission
/// returns a GUID which is then polled until the explorer reaches a verdict.
/// Every request carries the `chainid` of the network the contract lives on,
/// which the multichain (V2) Etherscan API requires.
///
/// ``` no_run
/// use explorer_client::{ExplorerClient, VerificationRequest};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let client = ExplorerClient::new("https://api.etherscan.io/v2/api", "API_KEY", 1).unwrap();
///     let request = VerificationRequest {
///         address: Default::default(),
///         contract_name: "contracts/CoinFlip.sol:CoinFlip".to_string(),
///         compiler_version: "v0.8.19+commit.7dd6d404".to_string(),
///         source: "{}".to_string(),
///         constructor_arguments: String::new(),
///     };
///     let guid = client.submit_verification(&request).await.unwrap();
///     client
///         .wait_for_verification(&guid, Duration::from_secs(3), 20)
///         .await
///         .unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct ExplorerClient {
    client: Client,
    base_url: Url,
    api_key: String,
    chain_id: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExplorerClientError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Explorer rejected the request: {0}")]
    Rejected(String),
    #[error("Contract {0} is already verified")]
    AlreadyVerified(Address),
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
    #[error("Verification still pending after {0} status checks")]
    Timeout(u32),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Source metadata submitted for a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Address of the deployed contract.
    pub address: Address,
    /// Fully qualified name, `<source path>:<contract name>`.
    pub contract_name: String,
    /// Full compiler version, `v0.8.19+commit.7dd6d404`.
    pub compiler_version: String,
    /// Solidity standard JSON input, serialized.
    pub source: String,
    /// ABI-encoded constructor arguments as hex without the `0x` prefix.
    pub constructor_arguments: String,
}

/// Verdict of a status check for a submitted verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed(String),
}

/// Envelope every Etherscan-style endpoint responds with.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: String,
}

impl ExplorerResponse {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }
}

impl ExplorerClient {
    /// Create a new explorer client
    pub fn new(api_url: &str, api_key: &str, chain_id: u64) -> Result<Self, ExplorerClientError> {
        let base_url = Url::parse(api_url)?;
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            chain_id,
        })
    }

    /// Base URL of the explorer API
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Chain the verifications are submitted for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn parse_response(
        response: reqwest::Response,
    ) -> Result<ExplorerResponse, ExplorerClientError> {
        if !response.status().is_success() {
            return Err(ExplorerClientError::InvalidResponse(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Submit source code for verification. Returns the GUID to poll.
    pub async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> Result<String, ExplorerClientError> {
        let address = request.address.to_string();
        let chain_id = self.chain_id.to_string();
        let form = [
            ("apikey", self.api_key.as_str()),
            ("chainid", chain_id.as_str()),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", request.source.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract_name.as_str()),
            ("compilerversion", request.compiler_version.as_str()),
            // Etherscan's spelling.
            ("constructorArguements", request.constructor_arguments.as_str()),
        ];

        let response = self
            .client
            .post(self.base_url.clone())
            .form(&form)
            .send()
            .await?;
        let body = Self::parse_response(response).await?;

        if body.is_ok() {
            debug!(guid = %body.result, address = %request.address, "Verification submitted");
            return Ok(body.result);
        }

        if body.result.to_lowercase().contains("already verified") {
            return Err(ExplorerClientError::AlreadyVerified(request.address));
        }

        Err(ExplorerClientError::Rejected(format!(
            "{}: {}",
            body.message, body.result
        )))
    }

    /// Check the status of a previously submitted verification.
    pub async fn check_verification_status(
        &self,
        guid: &str,
    ) -> Result<VerificationStatus, ExplorerClientError> {
        let chain_id = self.chain_id.to_string();
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("chainid", chain_id.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await?;
        let body = Self::parse_response(response).await?;

        if body.result.starts_with("Pending in queue") {
            return Ok(VerificationStatus::Pending);
        }

        if body.is_ok() {
            return Ok(VerificationStatus::Verified);
        }

        // "Already Verified" is a failed attempt, as it is on submission.
        Ok(VerificationStatus::Failed(body.result))
    }

    /// Poll the status of `guid` until the explorer reaches a verdict.
    pub async fn wait_for_verification(
        &self,
        guid: &str,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Result<(), ExplorerClientError> {
        for attempt in 1..=max_attempts {
            match self.check_verification_status(guid).await? {
                VerificationStatus::Verified => return Ok(()),
                VerificationStatus::Failed(reason) => {
                    return Err(ExplorerClientError::VerificationFailed(reason));
                }
                VerificationStatus::Pending => {
                    debug!(guid, attempt, "Verification pending");
                    if attempt < max_attempts {
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        }

        Err(ExplorerClientError::Timeout(max_attempts))
    }
}
