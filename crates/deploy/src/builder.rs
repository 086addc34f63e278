//! Builder module for creating a [`Deployer`] configuration.
//!
//! Configuration sources are layered in order of increasing precedence:
//! built-in defaults, then `Launchpad.toml`, then `LAUNCHPAD_*` environment
//! variables, then explicit overrides set on the builder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use url::Url;

use crate::deployer::{Deployer, LAUNCHCONF_FILENAME};
use crate::signer::SignerConfig;

/// Prefix for environment variable overrides (e.g. `LAUNCHPAD_RPC_URL`).
const ENV_PREFIX: &str = "LAUNCHPAD_";

/// Builder for creating a [`Deployer`] configuration.
///
/// # Example
///
/// ```no_run
/// use launchpad_deploy::DeployerBuilder;
///
/// # fn example() -> anyhow::Result<()> {
/// let deployer = DeployerBuilder::new()
///     .rpc_url("http://127.0.0.1:8545")
///     .artifacts_dir("artifacts")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeployerBuilder {
    config_file: Option<PathBuf>,
    rpc_url: Option<String>,
    chain_id: Option<u64>,
    artifacts_dir: Option<PathBuf>,
    outdata: Option<PathBuf>,
    gas_limit: Option<u64>,
    signer: Option<SignerConfig>,
}

impl DeployerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a specific file instead of the default
    /// `Launchpad.toml` lookup in the working directory.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    pub fn outdata(mut self, outdata: impl Into<PathBuf>) -> Self {
        self.outdata = Some(outdata.into());
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn signer(mut self, signer: SignerConfig) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Merge all configuration layers and validate the result.
    ///
    /// Creates the output data directory if one is configured.
    pub fn build(self) -> Result<Deployer> {
        let mut figment = Figment::from(Serialized::defaults(Deployer::default()));

        figment = match &self.config_file {
            // An explicitly requested file must exist.
            Some(path) => figment.merge(Toml::file_exact(path)),
            None => figment.merge(Toml::file(LAUNCHCONF_FILENAME)),
        };

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        if let Some(rpc_url) = self.rpc_url {
            figment = figment.merge(Serialized::default("rpc_url", rpc_url));
        }
        if let Some(chain_id) = self.chain_id {
            figment = figment.merge(Serialized::default("chain_id", chain_id));
        }
        if let Some(dir) = self.artifacts_dir {
            figment = figment.merge(Serialized::default("artifacts_dir", dir));
        }
        if let Some(outdata) = self.outdata {
            figment = figment.merge(Serialized::default("outdata", outdata));
        }
        if let Some(gas_limit) = self.gas_limit {
            figment = figment.merge(Serialized::default("gas_limit", gas_limit));
        }
        if let Some(signer) = self.signer {
            figment = figment.merge(Serialized::default("signer", signer));
        }

        let deployer: Deployer = figment
            .extract()
            .context("Failed to assemble deployer configuration")?;

        Url::parse(&deployer.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", deployer.rpc_url))?;

        if let Some(outdata) = &deployer.outdata {
            std::fs::create_dir_all(outdata)
                .with_context(|| format!("Failed to create {}", outdata.display()))?;
        }

        Ok(deployer)
    }
}
