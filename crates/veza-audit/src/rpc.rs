//! # JSON-RPC Audit Ledger
//!
//! Production audit target that commits consent digests on EVM-compatible
//! chains via JSON-RPC.
//!
//! ## How It Works
//!
//! 1. `record` calls the consent registry script's
//!    `recordDigest(bytes32)` function via `eth_sendTransaction`.
//! 2. The JSON-RPC endpoint handles transaction signing — this target
//!    does not hold private keys. The `from` address must be unlocked or
//!    managed by the RPC provider's signing service.
//! 3. `exists` queries the script with `eth_call`; when the endpoint is
//!    unreachable it degrades to the persisted reference+digest pair and
//!    marks the result non-authoritative.

use async_trait::async_trait;

use veza_core::{ConsentDigest, PartyId, RequestId, Timestamp};

use crate::ledger::{
    derive_script_address, matches_persisted_pair, AuditAttestation, AuditError, AuditLedger,
    AuditRecord,
};

/// 4-byte function selector for `recordDigest(bytes32)`.
const RECORD_DIGEST_SELECTOR: &str = "6b3ee21a";

/// 4-byte function selector for `hasDigest(bytes32)`.
const HAS_DIGEST_SELECTOR: &str = "3c2b5e1f";

/// Configuration for the JSON-RPC audit ledger.
#[derive(Debug, Clone)]
pub struct JsonRpcLedgerConfig {
    /// JSON-RPC endpoint URL (HTTPS in production).
    pub rpc_url: String,
    /// Network identifier (e.g., "ethereum", "base", "polygon").
    pub network_id: String,
    /// Address of the deployed consent registry script. When `None`, the
    /// deterministic address derived from the fixed script identifier and
    /// the network is used.
    pub contract_address: Option<String>,
    /// Sender address whose transactions are signed by the RPC provider.
    pub from_address: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl JsonRpcLedgerConfig {
    /// Create a configuration with the default 30 s timeout.
    pub fn new(
        rpc_url: impl Into<String>,
        network_id: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            network_id: network_id.into(),
            contract_address: None,
            from_address: from_address.into(),
            timeout_secs: 30,
        }
    }

    /// Point at a specific deployed registry script instead of the
    /// derived address.
    pub fn with_contract(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }
}

/// Audit ledger that commits digests on an EVM-style chain via JSON-RPC.
#[derive(Debug)]
pub struct JsonRpcLedger {
    client: reqwest::Client,
    config: JsonRpcLedgerConfig,
    script_ref: String,
}

impl JsonRpcLedger {
    /// Create a new JSON-RPC ledger from configuration.
    pub fn new(config: JsonRpcLedgerConfig) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuditError::Unavailable {
                network_id: format!("{}: failed to build HTTP client: {e}", config.network_id),
            })?;

        let script_ref = match &config.contract_address {
            Some(addr) => {
                if !is_valid_eth_address(addr) {
                    return Err(AuditError::Rejected(format!(
                        "invalid contract address: {addr}"
                    )));
                }
                addr.clone()
            }
            None => derive_script_address(&config.network_id),
        };

        if !is_valid_eth_address(&config.from_address) {
            return Err(AuditError::Rejected(format!(
                "invalid from address: {}",
                config.from_address
            )));
        }

        Ok(Self {
            client,
            config,
            script_ref,
        })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AuditError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Unavailable {
                network_id: if e.is_timeout() {
                    format!("{}: request timed out", self.config.network_id)
                } else {
                    format!("{}: {e}", self.config.network_id)
                },
            })?;

        if !resp.status().is_success() {
            return Err(AuditError::Unavailable {
                network_id: format!("{}: HTTP {}", self.config.network_id, resp.status()),
            });
        }

        let json: serde_json::Value =
            resp.json().await.map_err(|e| AuditError::Unavailable {
                network_id: format!("{}: invalid JSON response: {e}", self.config.network_id),
            })?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(AuditError::TransactionFailed {
                network_id: self.config.network_id.clone(),
                reason: msg.to_string(),
            });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| AuditError::Unavailable {
                network_id: format!(
                    "{}: JSON-RPC response missing 'result' field",
                    self.config.network_id
                ),
            })
    }

    /// Encode calldata: 4-byte selector + 32-byte digest.
    fn encode_calldata(selector: &str, digest: &ConsentDigest) -> String {
        format!("0x{selector}{}", digest.to_hex())
    }
}

fn is_valid_eth_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[async_trait]
impl AuditLedger for JsonRpcLedger {
    async fn record(
        &self,
        owner: &PartyId,
        requester: &PartyId,
        digest: &ConsentDigest,
        timestamp: Timestamp,
    ) -> Result<AuditRecord, AuditError> {
        let tx = serde_json::json!({
            "from": self.config.from_address,
            "to": self.script_ref,
            "data": Self::encode_calldata(RECORD_DIGEST_SELECTOR, digest),
        });

        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx]))
            .await?;

        let tx_ref = result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AuditError::TransactionFailed {
                network_id: self.config.network_id.clone(),
                reason: "eth_sendTransaction returned non-string result".to_string(),
            })?;

        tracing::info!(
            owner = %owner,
            requester = %requester,
            network = %self.config.network_id,
            tx_ref = %tx_ref,
            at = %timestamp,
            "committed consent digest to public ledger"
        );

        Ok(AuditRecord {
            tx_ref,
            script_ref: self.script_ref.clone(),
            network_id: self.config.network_id.clone(),
            // Submitted, not yet confirmed. Finality checks go through
            // `exists` once the transaction lands.
            finalized: false,
        })
    }

    async fn exists(
        &self,
        request_id: RequestId,
        expected: &ConsentDigest,
        persisted_tx_ref: &str,
    ) -> AuditAttestation {
        let call = serde_json::json!({
            "to": self.script_ref,
            "data": Self::encode_calldata(HAS_DIGEST_SELECTOR, expected),
        });

        match self
            .rpc_call("eth_call", serde_json::json!([call, "latest"]))
            .await
        {
            Ok(result) => {
                // The script returns an ABI-encoded bool: 32 bytes ending
                // in 0x01 when the digest has been recorded.
                let present = result
                    .as_str()
                    .map(|s| s.trim_start_matches("0x").trim_start_matches('0') == "1")
                    .unwrap_or(false);
                AuditAttestation {
                    present,
                    authoritative: true,
                }
            }
            Err(e) => {
                // Ledger unreachable — degrade to the persisted pair.
                tracing::warn!(
                    request_id = %request_id,
                    network = %self.config.network_id,
                    error = %e,
                    "ledger query failed, falling back to persisted reference check"
                );
                AuditAttestation {
                    present: matches_persisted_pair(persisted_tx_ref, expected),
                    authoritative: false,
                }
            }
        }
    }

    fn is_authoritative(&self) -> bool {
        true
    }

    fn network_id(&self) -> &str {
        &self.config.network_id
    }
}
