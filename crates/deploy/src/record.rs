//! Deployment records written after a successful deploy.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::deployer::Deployment;

/// On-disk record of a single contract deployment.
///
/// Written to `<outdata>/<ContractName>.json`. Redeploying the same contract
/// overwrites the previous record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub deployer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// RFC 3339 timestamp of when the deployment completed.
    pub deployed_at: String,
}

impl DeploymentRecord {
    pub fn new(deployment: &Deployment, chain_id: Option<u64>) -> Self {
        Self {
            contract_name: deployment.contract_name.clone(),
            address: deployment.contract_address.to_string(),
            transaction_hash: deployment.transaction_hash.clone(),
            block_number: deployment.block_number,
            gas_used: deployment.gas_used,
            deployer: deployment.deployer.to_string(),
            chain_id,
            deployed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Write the record to `<outdata>/<ContractName>.json`.
    pub fn save(&self, outdata: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(outdata)
            .with_context(|| format!("Failed to create {}", outdata.display()))?;

        let path = outdata.join(format!("{}.json", self.contract_name));
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment record")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write record to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }

    /// Load the record for `contract_name` from `outdata`.
    pub fn load(outdata: &Path, contract_name: &str) -> Result<Self> {
        let path = outdata.join(format!("{}.json", contract_name));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::{Address, U256};
    use std::str::FromStr;

    fn sample_deployment() -> Deployment {
        Deployment {
            contract_name: "Token".to_string(),
            deployer: Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap(),
            deployer_balance: U256::from(1_000_000_000_000_000_000u64),
            contract_address: Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3")
                .unwrap(),
            transaction_hash: "0xdeadbeef".to_string(),
            block_number: 7,
            gas_used: 321_000,
        }
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempdir::TempDir::new("record-test").unwrap();
        let outdata = dir.path().join("deployments");

        let record = DeploymentRecord::new(&sample_deployment(), Some(31337));
        let path = record.save(&outdata).unwrap();
        assert_eq!(path, outdata.join("Token.json"));

        let loaded = DeploymentRecord::load(&outdata, "Token").unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.chain_id, Some(31337));
        assert_eq!(
            loaded.address,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
        assert!(!loaded.deployed_at.is_empty());
    }

    #[test]
    fn test_redeploy_overwrites_record() {
        let dir = tempdir::TempDir::new("record-test").unwrap();

        let mut deployment = sample_deployment();
        DeploymentRecord::new(&deployment, None).save(dir.path()).unwrap();

        deployment.block_number = 42;
        DeploymentRecord::new(&deployment, None).save(dir.path()).unwrap();

        let loaded = DeploymentRecord::load(dir.path(), "Token").unwrap();
        assert_eq!(loaded.block_number, 42);
    }

    #[test]
    fn test_load_missing_record_fails() {
        let dir = tempdir::TempDir::new("record-test").unwrap();
        assert!(DeploymentRecord::load(dir.path(), "Nope").is_err());
    }
}
