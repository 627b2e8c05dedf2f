use serde_json::Value;
use std::process::{
    Command,
    Output,
};

const DEPLOY_ENV: [&str; 8] = [
    "DEPLOY_RPC_URL",
    "DEPLOY_PRIVATE_KEY",
    "DEPLOY_ARTIFACTS_DIR",
    "DEPLOY_CONFIRMATIONS",
    "DEPLOY_CONFIRMATION_TIMEOUT_SECS",
    "DEPLOY_EXPLORER_API_URL",
    "DEPLOY_EXPLORER_API_KEY",
    "DEPLOY_CHAIN_ID",
];

/// Runs the binary with a malformed key; it fails before touching the network.
fn run_with_invalid_key(extra: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_coinflip-deploy"));
    for var in DEPLOY_ENV {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .args([
            "--rpc-url",
            "http://127.0.0.1:1",
            "--private-key",
            "0x1234",
            "--explorer-api-key",
            "key",
        ])
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn json_mode_prints_error_object_and_exits_with_one() {
    let output = run_with_invalid_key(&["--json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let error = stderr
        .lines()
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
        .unwrap_or_else(|| panic!("no JSON line on stderr: {stderr}"));
    assert_eq!(error["status"], "error");
    assert!(
        error["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid private key"),
        "{error}"
    );
}

#[test]
fn plain_mode_exits_with_one() {
    let output = run_with_invalid_key(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid private key"), "{stderr}");
}
