//! # Application Configuration
//!
//! Env-based configuration, resolved once at startup. Provider selection
//! happens here and only here: a configured proof-service URL selects the
//! remote prover, a configured audit RPC endpoint selects the JSON-RPC
//! ledger, and absence selects the local degraded variants. The rest of
//! the codebase never branches on configuration.

use std::sync::Arc;
use std::time::Duration;

use veza_crypto::EnvelopeKey;

use crate::auth::SecretString;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8460;

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (`VEZA_PORT`).
    pub port: u16,
    /// Optional bearer token (`VEZA_AUTH_TOKEN`). `None` disables auth.
    pub auth_token: Option<SecretString>,
    /// Proof service base URL (`VEZA_PROOF_SERVICE_URL`). `None` selects
    /// the local hash prover.
    pub proof_service_url: Option<String>,
    /// Audit ledger JSON-RPC endpoint (`VEZA_AUDIT_RPC_URL`). `None`
    /// selects the local degraded ledger.
    pub audit_rpc_url: Option<String>,
    /// Audit network identifier (`VEZA_AUDIT_NETWORK`, default "local").
    pub audit_network: String,
    /// Deployed registry script address (`VEZA_AUDIT_CONTRACT`), when the
    /// derived address is not used.
    pub audit_contract: Option<String>,
    /// Sender address for audit transactions (`VEZA_AUDIT_FROM`).
    pub audit_from: Option<String>,
    /// Bound on each provider call during approval
    /// (`VEZA_PROVIDER_TIMEOUT_MS`, default 3000).
    pub provider_timeout: Duration,
    /// Whether the Prometheus endpoint and middleware are mounted
    /// (`VEZA_METRICS_ENABLED`, default true).
    pub metrics_enabled: bool,
    /// Static fallback key for administrative fields
    /// (`VEZA_FALLBACK_KEY_HEX`). Malformed material fails startup.
    pub fallback_key: Option<Arc<EnvelopeKey>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            proof_service_url: None,
            audit_rpc_url: None,
            audit_network: "local".to_string(),
            audit_contract: None,
            audit_from: None,
            provider_timeout: veza_consent::DEFAULT_PROVIDER_TIMEOUT,
            metrics_enabled: true,
            fallback_key: None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the environment.
    ///
    /// Malformed values fail fast — a half-configured consent service
    /// must not come up.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("VEZA_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("VEZA_PORT {raw:?} is not a valid port: {e}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let provider_timeout = match std::env::var("VEZA_PROVIDER_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                anyhow::anyhow!("VEZA_PROVIDER_TIMEOUT_MS {raw:?} is not a number: {e}")
            })?),
            Err(_) => veza_consent::DEFAULT_PROVIDER_TIMEOUT,
        };

        let fallback_key = match std::env::var("VEZA_FALLBACK_KEY_HEX") {
            Ok(raw) => Some(Arc::new(
                EnvelopeKey::from_hex(&raw)
                    .map_err(|e| anyhow::anyhow!("VEZA_FALLBACK_KEY_HEX: {e}"))?,
            )),
            Err(_) => None,
        };

        Ok(Self {
            port,
            auth_token: std::env::var("VEZA_AUTH_TOKEN").ok().map(SecretString::new),
            proof_service_url: std::env::var("VEZA_PROOF_SERVICE_URL").ok(),
            audit_rpc_url: std::env::var("VEZA_AUDIT_RPC_URL").ok(),
            audit_network: std::env::var("VEZA_AUDIT_NETWORK")
                .unwrap_or_else(|_| "local".to_string()),
            audit_contract: std::env::var("VEZA_AUDIT_CONTRACT").ok(),
            audit_from: std::env::var("VEZA_AUDIT_FROM").ok(),
            provider_timeout,
            metrics_enabled: std::env::var("VEZA_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            fallback_key,
        })
    }
}
