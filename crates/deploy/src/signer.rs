//! Deployer account resolution.
//!
//! The node holds the keys and signs the deployment transaction. Local key
//! material, when configured, is only used to derive the account address
//! deterministically.

use alloy_core::primitives::{Address, keccak256};
use alloy_signer_local::{MnemonicBuilder, coins_bip39::English};
use anyhow::{Context, Result};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};

use crate::chain::EthClient;

/// How the deploying account is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SignerConfig {
    /// An account managed by the node, selected by its `eth_accounts` index.
    NodeAccount {
        #[serde(default)]
        index: usize,
    },
    /// The account owning a raw secp256k1 private key.
    PrivateKey { private_key: String },
    /// An account derived from a BIP-39 mnemonic phrase.
    Mnemonic {
        phrase: String,
        #[serde(default)]
        index: u32,
    },
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self::NodeAccount { index: 0 }
    }
}

impl SignerConfig {
    /// Resolve the deployer address.
    ///
    /// Key material never leaves the process; only `node_account` talks to
    /// the node.
    pub async fn resolve(&self, eth: &EthClient) -> Result<Address> {
        match self {
            Self::NodeAccount { index } => {
                let accounts = eth
                    .accounts()
                    .await
                    .context("Failed to fetch node accounts")?;

                accounts.get(*index).copied().with_context(|| {
                    format!(
                        "Account index {} not found on the node ({} account(s) available)",
                        index,
                        accounts.len()
                    )
                })
            }
            Self::PrivateKey { private_key } => address_from_private_key(private_key),
            Self::Mnemonic { phrase, index } => address_from_mnemonic(phrase, *index),
        }
    }
}

/// Derive the EVM address owning a raw secp256k1 private key.
///
/// # Arguments
/// * `private_key_hex` - 32-byte private key as hex string (with or without 0x prefix)
fn address_from_private_key(private_key_hex: &str) -> Result<Address> {
    let private_key_hex = private_key_hex
        .strip_prefix("0x")
        .unwrap_or(private_key_hex);

    let private_key_bytes: [u8; 32] = hex::decode(private_key_hex)
        .context("Private key is not valid hex")?
        .try_into()
        .map_err(|_| anyhow::anyhow!("Private key must be exactly 32 bytes"))?;

    let signing_key = SigningKey::from_bytes(&private_key_bytes.into())
        .map_err(|e| anyhow::anyhow!("Invalid secp256k1 private key: {}", e))?;

    // Get the verifying (public) key
    let verifying_key = signing_key.verifying_key();

    // Get uncompressed public key point (65 bytes: 0x04 prefix + 64 bytes)
    let public_key_point = verifying_key.to_encoded_point(false);
    let public_key_bytes = public_key_point.as_bytes();

    // The address is the last 20 bytes of the keccak hash of the public key
    // without the 0x04 uncompressed marker.
    let hash = keccak256(&public_key_bytes[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Derive the EVM address at `index` of the standard BIP-44 path for `phrase`.
fn address_from_mnemonic(phrase: &str, index: u32) -> Result<Address> {
    let wallet = MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .index(index)
        .context("Invalid account index for mnemonic derivation")?
        .build()
        .context("Failed to derive account from mnemonic")?;

    Ok(wallet.address())
}
