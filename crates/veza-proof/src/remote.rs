//! # Remote Prover
//!
//! Registers consent digests with a networked proof service over HTTPS.
//! The digest itself is still computed locally — the service attests and
//! indexes it, it does not define it — so verification never depends on
//! service reachability.

use async_trait::async_trait;
use serde::Deserialize;

use veza_core::Timestamp;

use crate::digest::{consent_digest, ConsentParams, ConsentProof, SCHEME_VERSION};
use crate::traits::{ProofBackend, ProofError};

/// Configuration for the remote proof service client.
#[derive(Debug, Clone)]
pub struct RemoteProverConfig {
    /// Base URL of the proof service (HTTPS in production).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RemoteProverConfig {
    /// Create a configuration with the default 30 s timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }
}

/// Successful submission response from the proof service.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    proof_ref: String,
}

/// Proof backend that registers digests with a remote proof service.
#[derive(Debug)]
pub struct RemoteProver {
    client: reqwest::Client,
    config: RemoteProverConfig,
}

impl RemoteProver {
    /// Create a new remote prover from configuration.
    pub fn new(config: RemoteProverConfig) -> Result<Self, ProofError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProofError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn submit_url(&self) -> String {
        format!("{}/v1/proofs", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProofBackend for RemoteProver {
    async fn submit(&self, params: &ConsentParams) -> Result<ConsentProof, ProofError> {
        let digest = consent_digest(params);

        let body = serde_json::json!({
            "request_id": params.request_id,
            "digest": digest,
            "scheme_version": SCHEME_VERSION,
        });

        let resp = self
            .client
            .post(self.submit_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProofError::Unavailable("proof service request timed out".to_string())
                } else {
                    ProofError::Unavailable(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(ProofError::Rejected(format!(
                "proof service returned HTTP {}",
                resp.status()
            )));
        }

        let submitted: SubmitResponse = resp
            .json()
            .await
            .map_err(|e| ProofError::Rejected(format!("invalid proof service response: {e}")))?;

        tracing::debug!(
            request_id = %params.request_id,
            proof_ref = %submitted.proof_ref,
            "registered consent proof"
        );

        Ok(ConsentProof {
            proof_ref: submitted.proof_ref,
            digest,
            generated_at: Timestamp::now(),
            scheme_version: SCHEME_VERSION.to_string(),
        })
    }

    fn is_authoritative(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "remote-prover"
    }
}
