//! Operator-facing output of a deployment run.

use alloy::primitives::Address;
use colored::Colorize;
use serde_json::json;
use tracing::info;

/// Receives the observable milestones of a run.
pub trait Reporter: Send + Sync {
    /// The contract is confirmed on-chain at `address`.
    fn deployed(&self, contract_name: &str, address: Address);

    /// The verification service accepted the contract source.
    fn verified(&self, contract_name: &str, address: Address);
}

/// Prints milestones to stdout, as coloured lines or JSON objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    json_output: bool,
}

impl ConsoleReporter {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    fn deployed_message(&self, contract_name: &str, address: Address) -> String {
        if self.json_output {
            json!({
                "status": "deployed",
                "contract": contract_name,
                "address": address.to_string(),
            })
            .to_string()
        } else {
            format!(
                "{} deployed to {}",
                contract_name.bold(),
                address.to_string().green()
            )
        }
    }

    fn verified_message(&self, contract_name: &str, address: Address) -> String {
        if self.json_output {
            json!({
                "status": "verified",
                "contract": contract_name,
                "address": address.to_string(),
            })
            .to_string()
        } else {
            format!(
                "✅ {} verified at {}",
                contract_name.bold(),
                address.to_string().green()
            )
        }
    }
}

impl Reporter for ConsoleReporter {
    fn deployed(&self, contract_name: &str, address: Address) {
        info!(contract = contract_name, %address, "Contract deployed");
        println!("{}", self.deployed_message(contract_name, address));
    }

    fn verified(&self, contract_name: &str, address: Address) {
        info!(contract = contract_name, %address, "Contract verified");
        println!("{}", self.verified_message(contract_name, address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    #[test]
    fn test_plain_deployed_message_contains_address() {
        colored::control::set_override(false);
        let message = ConsoleReporter::new(false).deployed_message("CoinFlip", ADDRESS);
        assert_eq!(
            message,
            "CoinFlip deployed to 0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_json_deployed_message() {
        let message = ConsoleReporter::new(true).deployed_message("CoinFlip", ADDRESS);
        let value: serde_json::Value = serde_json::from_str(&message).unwrap();

        assert_eq!(value["status"], "deployed");
        assert_eq!(value["contract"], "CoinFlip");
        assert_eq!(
            value["address"],
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_json_verified_message() {
        let message = ConsoleReporter::new(true).verified_message("CoinFlip", ADDRESS);
        let value: serde_json::Value = serde_json::from_str(&message).unwrap();

        assert_eq!(value["status"], "verified");
    }

    #[test]
    fn test_reporter_does_not_panic() {
        ConsoleReporter::new(false).deployed("CoinFlip", ADDRESS);
        ConsoleReporter::new(true).verified("CoinFlip", ADDRESS);
    }
}
