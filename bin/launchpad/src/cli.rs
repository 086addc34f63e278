use std::path::PathBuf;

use clap::{Parser, Subcommand};
use launchpad_deploy::{DEFAULT_RPC_URL, SignerConfig};
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RpcProvider {
    /// A development node on the default local port.
    Localhost,
    #[strum(default)]
    Custom(String),
}

impl RpcProvider {
    pub fn to_rpc_url(&self) -> String {
        match self {
            RpcProvider::Localhost => DEFAULT_RPC_URL.to_string(),
            RpcProvider::Custom(url) => url.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(
    author,
    version,
    about = "Deploy compiled EVM contracts to a development node"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "LAUNCHPAD_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Launchpad.toml configuration file to load.
    ///
    /// If not provided, a Launchpad.toml in the working directory is used
    /// when present.
    #[arg(long, alias = "conf", env = "LAUNCHPAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// The JSON-RPC endpoint of the target node (`localhost` or a custom URL).
    #[arg(long, alias = "rpc", env = "LAUNCHPAD_RPC_PROVIDER")]
    pub rpc_provider: Option<RpcProvider>,

    /// Expected chain ID of the target node.
    #[arg(long, env = "LAUNCHPAD_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Directory holding compiled contract artifacts.
    #[arg(long, env = "LAUNCHPAD_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Directory for deployment records.
    #[arg(long, env = "LAUNCHPAD_OUTDATA")]
    pub outdata: Option<PathBuf>,

    /// Index of the node-managed account to deploy from.
    #[arg(
        long,
        env = "LAUNCHPAD_ACCOUNT_INDEX",
        conflicts_with_all = ["private_key", "mnemonic"]
    )]
    pub account_index: Option<usize>,

    /// Private key of the deploying account (used for address derivation only).
    #[arg(
        long,
        env = "LAUNCHPAD_PRIVATE_KEY",
        hide_env_values = true,
        conflicts_with = "mnemonic"
    )]
    pub private_key: Option<String>,

    /// BIP-39 mnemonic of the deploying account (used for address derivation only).
    #[arg(long, env = "LAUNCHPAD_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Derivation index for --mnemonic.
    #[arg(
        long,
        env = "LAUNCHPAD_MNEMONIC_INDEX",
        default_value_t = 0,
        requires = "mnemonic"
    )]
    pub mnemonic_index: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy a compiled contract and print its address.
    Deploy {
        /// Name of the contract artifact to deploy.
        contract: String,

        /// ABI-encoded constructor arguments (hex).
        #[arg(long, alias = "args")]
        constructor_args: Option<String>,

        /// Gas limit override (skips estimation).
        #[arg(long, env = "LAUNCHPAD_GAS_LIMIT")]
        gas_limit: Option<u64>,
    },
    /// List the node-managed accounts and their balances.
    Accounts,
}

impl Cli {
    /// Signer selection from the CLI flags, if any were given.
    pub fn signer(&self) -> Option<SignerConfig> {
        if let Some(private_key) = &self.private_key {
            return Some(SignerConfig::PrivateKey {
                private_key: private_key.clone(),
            });
        }

        if let Some(mnemonic) = &self.mnemonic {
            return Some(SignerConfig::Mnemonic {
                phrase: mnemonic.clone(),
                index: self.mnemonic_index,
            });
        }

        self.account_index
            .map(|index| SignerConfig::NodeAccount { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rpc_provider_parsing() {
        assert_eq!(
            RpcProvider::from_str("localhost").unwrap(),
            RpcProvider::Localhost
        );
        assert_eq!(
            RpcProvider::from_str("http://10.0.0.5:8545").unwrap(),
            RpcProvider::Custom("http://10.0.0.5:8545".to_string())
        );
    }

    #[test]
    fn test_rpc_provider_urls() {
        assert_eq!(
            RpcProvider::Localhost.to_rpc_url(),
            "http://127.0.0.1:8545"
        );
        assert_eq!(
            RpcProvider::Custom("http://example.com:8545".to_string()).to_rpc_url(),
            "http://example.com:8545"
        );
    }

    #[test]
    fn test_signer_flag_precedence() {
        let cli = Cli::parse_from([
            "launchpad",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "deploy",
            "Token",
        ]);
        assert!(matches!(
            cli.signer(),
            Some(SignerConfig::PrivateKey { .. })
        ));

        let cli = Cli::parse_from(["launchpad", "--account-index", "2", "accounts"]);
        assert_eq!(cli.signer(), Some(SignerConfig::NodeAccount { index: 2 }));

        let cli = Cli::parse_from(["launchpad", "accounts"]);
        assert_eq!(cli.signer(), None);
    }

    #[test]
    fn test_deploy_subcommand_args() {
        let cli = Cli::parse_from([
            "launchpad",
            "deploy",
            "Token",
            "--constructor-args",
            "0xabcd",
            "--gas-limit",
            "3000000",
        ]);

        let Command::Deploy {
            contract,
            constructor_args,
            gas_limit,
        } = cli.command
        else {
            panic!("Expected deploy subcommand");
        };

        assert_eq!(contract, "Token");
        assert_eq!(constructor_args.as_deref(), Some("0xabcd"));
        assert_eq!(gas_limit, Some(3_000_000));
    }
}
