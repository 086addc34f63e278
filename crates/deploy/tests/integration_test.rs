//! Integration tests for launchpad-deploy.
//!
//! The end-to-end deployment test needs a running development node (anvil or
//! hardhat node) with funded accounts and is gated on LAUNCHPAD_TEST_RPC_URL:
//!
//!   anvil &
//!   LAUNCHPAD_TEST_RPC_URL=http://127.0.0.1:8545 cargo test --test integration_test

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use launchpad_deploy::{
    Deployer, DeployerBuilder, DeploymentRecord, LAUNCHCONF_FILENAME, SignerConfig, find_artifact,
};

/// Artifact for a minimal contract whose runtime code returns 42.
///
/// Creation code copies the 10-byte runtime (push 42, mstore, return) into
/// memory and returns it.
const ANSWER_ARTIFACT: &str = r#"{
    "contractName": "Answer",
    "abi": [],
    "bytecode": "0x600a600c600039600a6000f3602a60005260206000f3"
}"#;

/// Initialize tracing for tests (idempotent).
fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write the Answer artifact into a fresh artifacts directory.
fn write_answer_artifact(root: &Path) -> Result<PathBuf> {
    let artifacts_dir = root.join("artifacts/contracts/Answer.sol");
    std::fs::create_dir_all(&artifacts_dir)?;
    std::fs::write(artifacts_dir.join("Answer.json"), ANSWER_ARTIFACT)?;
    Ok(root.join("artifacts"))
}

#[test]
fn test_artifact_fixture_resolves() -> Result<()> {
    let dir = tempdir::TempDir::new("launchpad-test")?;
    let artifacts_dir = write_answer_artifact(dir.path())?;

    let artifact = find_artifact(&artifacts_dir, "Answer")?;
    assert_eq!(artifact.contract_name, "Answer");
    assert_eq!(artifact.bytecode.len(), 22);
    Ok(())
}

#[test]
fn test_config_file_and_override_layering() -> Result<()> {
    let dir = tempdir::TempDir::new("launchpad-test")?;
    let config_path = dir.path().join(LAUNCHCONF_FILENAME);

    let saved = Deployer {
        rpc_url: "http://10.1.1.1:8545".to_string(),
        chain_id: Some(31337),
        artifacts_dir: PathBuf::from("out"),
        ..Deployer::default()
    };
    saved.save_to_file(&config_path)?;

    // File values win over defaults
    let loaded = DeployerBuilder::new()
        .config_file(config_path.clone())
        .build()?;
    assert_eq!(loaded.rpc_url, "http://10.1.1.1:8545");
    assert_eq!(loaded.chain_id, Some(31337));

    // Explicit overrides win over file values
    let overridden = DeployerBuilder::new()
        .config_file(config_path.clone())
        .rpc_url("http://127.0.0.1:8545")
        .build()?;
    assert_eq!(overridden.rpc_url, "http://127.0.0.1:8545");
    assert_eq!(overridden.chain_id, Some(31337));

    Ok(())
}

/// End-to-end: deploy the Answer contract against a live development node.
#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_against_dev_node() -> Result<()> {
    init_test_tracing();

    let Ok(rpc_url) = std::env::var("LAUNCHPAD_TEST_RPC_URL") else {
        println!("LAUNCHPAD_TEST_RPC_URL not set, skipping end-to-end deployment test");
        return Ok(());
    };

    let dir = tempdir::TempDir::new("launchpad-e2e")?;
    let artifacts_dir = write_answer_artifact(dir.path())?;
    let outdata = dir.path().join("deployments");

    let deployer = DeployerBuilder::new()
        .rpc_url(rpc_url.as_str())
        .artifacts_dir(artifacts_dir)
        .outdata(outdata.clone())
        .signer(SignerConfig::NodeAccount { index: 0 })
        .build()?;

    println!("=== Deploying Answer to {} ===", rpc_url);

    let deployment = deployer
        .deploy("Answer", None)
        .await
        .context("Deployment failed")?;

    println!(
        "Deployed Answer at {} (tx {}, block {}, gas {})",
        deployment.contract_address,
        deployment.transaction_hash,
        deployment.block_number,
        deployment.gas_used
    );

    assert_eq!(deployment.contract_name, "Answer");
    assert!(!deployment.contract_address.is_zero());
    assert!(deployment.gas_used > 0);

    // The record reflects the deployment
    let record = DeploymentRecord::load(&outdata, "Answer")?;
    assert_eq!(record.address, deployment.contract_address.to_string());
    assert_eq!(record.transaction_hash, deployment.transaction_hash);

    println!("=== Test passed! ===");
    Ok(())
}
