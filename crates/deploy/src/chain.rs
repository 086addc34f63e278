//! Typed queries against an Ethereum JSON-RPC endpoint.

use std::time::Duration;

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::rpc::RpcClient;
use crate::units::{parse_quantity_u64, parse_quantity_u256};

/// Minimum delay between receipt polls.
const RECEIPT_MIN_DELAY: Duration = Duration::from_millis(250);

/// Maximum delay between receipt polls.
const RECEIPT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Transaction parameters for `eth_estimateGas` / `eth_sendTransaction`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TxParams {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Address of the created contract. Only set for creation transactions.
    #[serde(rename = "contractAddress")]
    pub contract_address: Option<String>,
    #[serde(rename = "blockNumber", deserialize_with = "deserialize_u64_from_hex")]
    pub block_number: u64,
    #[serde(rename = "gasUsed", deserialize_with = "deserialize_u64_from_hex")]
    pub gas_used: u64,
    /// 1 on success, 0 if the transaction reverted.
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub status: u64,
}

/// Deserialize a u64 from a hex quantity string (with 0x prefix).
fn deserialize_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

/// Ethereum-specific view over an [`RpcClient`].
#[derive(Debug, Clone)]
pub struct EthClient {
    rpc: RpcClient,
}

impl EthClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// The chain ID reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.rpc.call("eth_chainId", vec![]).await?;
        parse_quantity_u64(&hex).context("Failed to parse eth_chainId result")
    }

    /// The latest block number.
    pub async fn block_number(&self) -> Result<u64> {
        let hex: String = self.rpc.call("eth_blockNumber", vec![]).await?;
        parse_quantity_u64(&hex).context("Failed to parse eth_blockNumber result")
    }

    /// The accounts managed by the node, in node order.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.rpc.call("eth_accounts", vec![]).await?;
        raw.iter()
            .map(|s| {
                s.parse::<Address>()
                    .with_context(|| format!("Node returned an invalid account address: '{}'", s))
            })
            .collect()
    }

    /// The balance of `address` at the latest block, in wei.
    pub async fn balance(&self, address: Address) -> Result<U256> {
        let hex: String = self
            .rpc
            .call(
                "eth_getBalance",
                vec![json!(address.to_string()), json!("latest")],
            )
            .await?;
        parse_quantity_u256(&hex).context("Failed to parse eth_getBalance result")
    }

    /// Estimate the gas needed for `tx`.
    pub async fn estimate_gas(&self, tx: &TxParams) -> Result<u64> {
        let params = serde_json::to_value(tx).context("Failed to serialize transaction parameters")?;
        let hex: String = self.rpc.call("eth_estimateGas", vec![params]).await?;
        parse_quantity_u64(&hex).context("Failed to parse eth_estimateGas result")
    }

    /// Submit a transaction signed by the node. Returns the transaction hash.
    pub async fn send_transaction(&self, tx: &TxParams) -> Result<String> {
        let params = serde_json::to_value(tx).context("Failed to serialize transaction parameters")?;
        self.rpc.call("eth_sendTransaction", vec![params]).await
    }

    /// The receipt for `tx_hash`, or None while the transaction is pending.
    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>> {
        let value: Value = self
            .rpc
            .call("eth_getTransactionReceipt", vec![json!(tx_hash)])
            .await?;

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .context("Failed to deserialize transaction receipt")
            .map(Some)
    }

    /// The deployed code at `address` (hex, "0x" if empty).
    pub async fn code_at(&self, address: Address) -> Result<String> {
        self.rpc
            .call(
                "eth_getCode",
                vec![json!(address.to_string()), json!("latest")],
            )
            .await
    }

    /// Poll for the receipt of `tx_hash` until it is mined.
    ///
    /// Retries the read with bounded exponential backoff. The transaction is
    /// never re-submitted.
    pub async fn wait_for_receipt(&self, tx_hash: &str, timeout_secs: u64) -> Result<TxReceipt> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(RECEIPT_MIN_DELAY)
            .with_max_delay(RECEIPT_MAX_DELAY)
            .with_max_times(usize::MAX);

        let poll = (|| async {
            self.transaction_receipt(tx_hash)
                .await?
                .with_context(|| format!("Transaction {} is still pending", tx_hash))
        })
        .retry(backoff)
        .notify(|err: &anyhow::Error, dur: Duration| {
            tracing::trace!(error = %err, retry_in = ?dur, "Receipt not available yet");
        });

        tokio::time::timeout(Duration::from_secs(timeout_secs), poll)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Transaction {} was not mined within {}s",
                    tx_hash,
                    timeout_secs
                )
            })?
            .with_context(|| format!("Failed to fetch receipt for transaction {}", tx_hash))
    }
}
