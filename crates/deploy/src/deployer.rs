//! Deployment orchestration and persisted configuration.

use std::path::PathBuf;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::artifact;
use crate::chain::{EthClient, TxParams};
use crate::record::DeploymentRecord;
use crate::rpc::{self, RpcClient};
use crate::signer::SignerConfig;
use crate::units;

/// The default name for the launchpad configuration file.
pub const LAUNCHCONF_FILENAME: &str = "Launchpad.toml";

/// Default RPC endpoint (local development node).
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default number of seconds to wait for the deployment transaction to be mined.
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;

/// Maximum time to wait for the node to answer its first request.
const NODE_READY_TIMEOUT_SECS: u64 = 10;

fn default_confirm_timeout() -> u64 {
    DEFAULT_CONFIRM_TIMEOUT_SECS
}

/// Main deployer that drives a single contract deployment.
///
/// This struct contains all the configuration needed to deploy a compiled
/// contract and can be serialized to/from TOML format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployer {
    /// The JSON-RPC endpoint of the target node.
    pub rpc_url: String,
    /// Expected chain ID. Checked against `eth_chainId` before deploying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Directory holding compiled contract artifacts.
    pub artifacts_dir: PathBuf,
    /// Directory for deployment records. If not set, no records are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outdata: Option<PathBuf>,
    /// Gas limit override. If not set, gas is estimated per deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Seconds to wait for the deployment transaction to be mined.
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,
    /// How the deploying account is selected.
    #[serde(default)]
    pub signer: SignerConfig,
}

impl Default for Deployer {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            artifacts_dir: PathBuf::from("artifacts"),
            outdata: None,
            gas_limit: None,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            signer: SignerConfig::default(),
        }
    }
}

/// Result of a completed contract deployment.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub contract_name: String,
    pub deployer: Address,
    /// Deployer balance in wei, read before the deployment transaction.
    pub deployer_balance: U256,
    pub contract_address: Address,
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
}

impl Deployer {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployer config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(LAUNCHCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Connect to the configured node and wait until it answers.
    pub async fn connect(&self) -> Result<EthClient> {
        let url = Url::parse(&self.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", self.rpc_url))?;
        let eth = EthClient::new(RpcClient::new(url)?);

        let probe = eth.clone();
        rpc::wait_until_ready("node", NODE_READY_TIMEOUT_SECS, move || {
            let eth = probe.clone();
            async move { eth.block_number().await.map(|_| ()) }
        })
        .await
        .with_context(|| format!("Node at {} is not responding", self.rpc_url))?;

        Ok(eth)
    }

    /// Deploy `contract` and wait for it to be mined.
    ///
    /// Submits exactly one transaction. The receipt poll retries the read,
    /// never the send.
    pub async fn deploy(
        &self,
        contract: &str,
        constructor_args: Option<&str>,
    ) -> Result<Deployment> {
        let eth = self.connect().await?;

        if let Some(expected) = self.chain_id {
            let actual = eth.chain_id().await?;
            if actual != expected {
                anyhow::bail!(
                    "Chain ID mismatch: node reports {}, configuration expects {}",
                    actual,
                    expected
                );
            }
        }

        let deployer = self
            .signer
            .resolve(&eth)
            .await
            .context("Failed to resolve deployer account")?;
        let balance = eth
            .balance(deployer)
            .await
            .context("Failed to fetch deployer balance")?;

        tracing::info!(
            deployer = %deployer,
            balance_eth = %units::format_ether(balance),
            "Resolved deployer account"
        );

        let artifact = artifact::find_artifact(&self.artifacts_dir, contract)?;

        tracing::info!(
            contract = %artifact.contract_name,
            artifact = %artifact.source_path.display(),
            "Resolved contract artifact"
        );

        let data = artifact.deploy_data(constructor_args)?;

        let mut tx = TxParams {
            from: deployer.to_string(),
            data: Some(data.to_string()),
            ..Default::default()
        };

        let gas = match self.gas_limit {
            Some(limit) => limit,
            None => eth
                .estimate_gas(&tx)
                .await
                .context("Failed to estimate deployment gas")?,
        };
        tx.gas = Some(units::to_quantity(gas));

        tracing::info!(contract = %artifact.contract_name, gas, "Submitting deployment transaction...");

        let tx_hash = eth
            .send_transaction(&tx)
            .await
            .context("Failed to submit deployment transaction")?;

        tracing::info!(tx_hash = %tx_hash, "Transaction sent, waiting for inclusion...");

        let receipt = eth
            .wait_for_receipt(&tx_hash, self.confirm_timeout_secs)
            .await?;

        if receipt.status != 1 {
            anyhow::bail!(
                "Deployment of {} reverted (tx {})",
                artifact.contract_name,
                tx_hash
            );
        }

        let contract_address = receipt
            .contract_address
            .as_deref()
            .context("Deployment receipt has no contract address")?
            .parse::<Address>()
            .context("Failed to parse contract address from receipt")?;

        let code = eth
            .code_at(contract_address)
            .await
            .context("Failed to verify deployed code")?;
        if code.trim_start_matches("0x").is_empty() {
            anyhow::bail!(
                "No code at {} after deployment (tx {})",
                contract_address,
                tx_hash
            );
        }

        tracing::info!(
            address = %contract_address,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Contract deployed"
        );

        let deployment = Deployment {
            contract_name: artifact.contract_name,
            deployer,
            deployer_balance: balance,
            contract_address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        };

        if let Some(outdata) = &self.outdata {
            DeploymentRecord::new(&deployment, self.chain_id).save(outdata)?;
        }

        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_round_trip() {
        let deployer = Deployer {
            rpc_url: "http://127.0.0.1:9933".to_string(),
            chain_id: Some(31337),
            artifacts_dir: PathBuf::from("out"),
            outdata: Some(PathBuf::from("deployments")),
            gas_limit: Some(3_000_000),
            confirm_timeout_secs: 120,
            signer: SignerConfig::NodeAccount { index: 2 },
        };

        let dir = tempdir::TempDir::new("launchconf-test").unwrap();
        let path = dir.path().join(LAUNCHCONF_FILENAME);

        deployer.save_to_file(&path).unwrap();
        let loaded = Deployer::load_from_file(&path).unwrap();
        assert_eq!(loaded, deployer);
    }

    #[test]
    fn test_load_from_directory() {
        let deployer = Deployer::default();

        let dir = tempdir::TempDir::new("launchconf-test").unwrap();
        deployer
            .save_to_file(&dir.path().join(LAUNCHCONF_FILENAME))
            .unwrap();

        let loaded = Deployer::load_from_file(&dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded, deployer);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Deployer::load_from_file(&PathBuf::from("/nonexistent/Launchpad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Deployer = toml::from_str(
            r#"
            rpc_url = "http://127.0.0.1:8545"
            artifacts_dir = "artifacts"
            "#,
        )
        .unwrap();

        assert_eq!(config.signer, SignerConfig::NodeAccount { index: 0 });
        assert_eq!(config.confirm_timeout_secs, 60);
        assert!(config.chain_id.is_none());
        assert!(config.gas_limit.is_none());
    }
}
