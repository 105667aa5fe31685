//! # Node JSON-RPC Chain Source
//!
//! `ChainSource` over a bitcoind-compatible JSON-RPC endpoint.
//!
//! | Operation | Calls |
//! |-----------|-------|
//! | `tip_height` | `getblockcount` |
//! | `block_by_height` | `getblockhash(h)`, then `getblock(hash, 0)` |
//!
//! Blocks are fetched as raw hex and decoded locally with the `bitcoin`
//! crate, so the scanner sees exactly the serialized script and witness
//! bytes. Transaction and block hashes are converted to display order.
//!
//! No retries: a failed call fails the run, and the run resumes from the
//! cursor when restarted.

use crate::container::{read_pem_certificate, ConfigError, RpcConfig};
use async_trait::async_trait;
use bitcoin::hashes::Hash as _;
use ns_03_scan_loop::{ChainSource, ChainSourceError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, ChainBlock, ChainTransaction, Hash, TxInput};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// bitcoind error code for an out-of-range height.
const RPC_INVALID_PARAMETER: i64 = -8;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Failure of a single call, before it is mapped to a `ChainSourceError`.
#[derive(Debug)]
enum CallError {
    /// The node answered with a JSON-RPC error object.
    Node { code: i64, message: String },
    Source(ChainSourceError),
}

impl CallError {
    fn into_source_error(self, method: &str) -> ChainSourceError {
        match self {
            CallError::Node { code, message } => ChainSourceError::InvalidResponse(format!(
                "{} failed with code {}: {}",
                method, code, message
            )),
            CallError::Source(e) => e,
        }
    }
}

/// Chain source backed by a node's JSON-RPC interface.
pub struct BitcoindRpcSource {
    client: Client,
    endpoint: String,
    user: String,
    password: String,
    request_id: AtomicU64,
}

impl BitcoindRpcSource {
    /// Build the HTTP client. Certificate problems are configuration errors.
    pub fn new(config: &RpcConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().timeout(config.timeout());

        if let Some(path) = &config.cert_path {
            let pem = read_pem_certificate(path)?;
            let cert =
                reqwest::Certificate::from_pem(&pem).map_err(|e| ConfigError::Certificate {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| ConfigError::Invalid {
            field: "rpc",
            reason: format!("cannot build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, CallError>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let request = JsonRpcRequest {
            jsonrpc: "1.0",
            id: self.next_id(),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_connect() {
                    format!("cannot connect to {}: {}", self.endpoint, e)
                } else if e.is_timeout() {
                    format!("{} timed out: {}", method, e)
                } else {
                    format!("{} request failed: {}", method, e)
                };
                CallError::Source(ChainSourceError::Transport(message))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CallError::Source(ChainSourceError::Transport(format!(
                "node rejected credentials (HTTP {})",
                status.as_u16()
            ))));
        }

        let body = response.text().await.map_err(|e| {
            CallError::Source(ChainSourceError::Transport(format!(
                "{} response body: {}",
                method, e
            )))
        })?;

        // bitcoind reports RPC errors with a non-2xx status and a JSON body.
        let parsed: JsonRpcResponse<R> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(CallError::Source(ChainSourceError::Transport(format!(
                    "{} returned HTTP {}",
                    method,
                    status.as_u16()
                ))));
            }
            Err(e) => {
                return Err(CallError::Source(ChainSourceError::InvalidResponse(
                    format!("{} returned malformed JSON: {}", method, e),
                )));
            }
        };

        if let Some(error) = parsed.error {
            return Err(CallError::Node {
                code: error.code,
                message: error.message,
            });
        }
        parsed.result.ok_or_else(|| {
            CallError::Source(ChainSourceError::InvalidResponse(format!(
                "{} returned no result",
                method
            )))
        })
    }
}

#[async_trait]
impl ChainSource for BitcoindRpcSource {
    async fn tip_height(&self) -> Result<BlockHeight, ChainSourceError> {
        self.call::<[(); 0], BlockHeight>("getblockcount", [])
            .await
            .map_err(|e| e.into_source_error("getblockcount"))
    }

    async fn block_by_height(&self, height: BlockHeight) -> Result<ChainBlock, ChainSourceError> {
        let hash: String = match self.call("getblockhash", [height]).await {
            Ok(hash) => hash,
            Err(CallError::Node { code, .. }) if code == RPC_INVALID_PARAMETER => {
                return Err(ChainSourceError::NotFound { height });
            }
            Err(e) => return Err(e.into_source_error("getblockhash")),
        };

        let raw: String = self
            .call("getblock", (hash.as_str(), 0u8))
            .await
            .map_err(|e| e.into_source_error("getblock"))?;
        debug!(
            "[runtime] Fetched block {} at height {} ({} bytes)",
            hash,
            height,
            raw.len() / 2
        );

        decode_block_hex(height, &raw)
    }
}

impl std::fmt::Debug for BitcoindRpcSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitcoindRpcSource")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .finish()
    }
}

/// Decode a raw block as returned by `getblock <hash> 0`.
pub fn decode_block_hex(height: BlockHeight, raw: &str) -> Result<ChainBlock, ChainSourceError> {
    let bytes = hex::decode(raw.trim()).map_err(|e| ChainSourceError::Decode {
        height,
        message: format!("block is not hex: {}", e),
    })?;
    let block: bitcoin::Block =
        bitcoin::consensus::deserialize(&bytes).map_err(|e| ChainSourceError::Decode {
            height,
            message: e.to_string(),
        })?;
    Ok(convert_block(height, &block))
}

/// Map a decoded block into the scanner's chain entities.
pub fn convert_block(height: BlockHeight, block: &bitcoin::Block) -> ChainBlock {
    ChainBlock {
        height,
        hash: display_order(block.block_hash().to_byte_array()),
        transactions: block.txdata.iter().map(convert_transaction).collect(),
    }
}

fn convert_transaction(tx: &bitcoin::Transaction) -> ChainTransaction {
    ChainTransaction {
        tx_hash: display_order(tx.compute_txid().to_byte_array()),
        inputs: tx
            .input
            .iter()
            .map(|input| TxInput {
                script_sig: input.script_sig.as_bytes().to_vec(),
                witness: input.witness.iter().map(|item| item.to_vec()).collect(),
            })
            .collect(),
    }
}

/// Hashes are serialized little-endian but displayed reversed.
fn display_order(mut hash: Hash) -> Hash {
    hash.reverse();
    hash
}
