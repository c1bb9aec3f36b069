//! # Application State
//!
//! Shared state for the Axum application. Providers are constructed once
//! here, at process start, and injected by reference — there is no
//! lazily-initialized module-level client anywhere in the workspace.

use std::sync::Arc;

use veza_audit::{AuditLedger, JsonRpcLedger, JsonRpcLedgerConfig, LocalLedger};
use veza_consent::{ConsentOrchestrator, GrantRelay, ReleaseGate};
use veza_proof::{HashProver, ProofBackend, RemoteProver, RemoteProverConfig};
use veza_state::{RelayStore, RequestStore};

use crate::config::AppConfig;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration.
    pub config: AppConfig,
    /// The access request store.
    pub requests: Arc<RequestStore>,
    /// The grant relay payload store.
    pub relay_store: Arc<RelayStore>,
    /// The consent orchestrator.
    pub orchestrator: Arc<ConsentOrchestrator>,
    /// The release gate.
    pub gate: Arc<ReleaseGate>,
    /// The grant relay.
    pub relay: Arc<GrantRelay>,
}

impl AppState {
    /// State with the default configuration: local providers, no auth.
    pub fn new() -> Self {
        // The default configuration selects only infallible local
        // providers, so this cannot fail.
        Self::from_config(AppConfig::default())
            .expect("default configuration constructs local providers")
    }

    /// Build the full provider graph from configuration.
    ///
    /// Fails fast on malformed provider configuration — a consent service
    /// with a misconstructed ledger client must not come up.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        // Bound every provider HTTP call, not only the orchestrator's:
        // the release gate's ledger query goes through the same clients.
        let client_timeout_secs = config.provider_timeout.as_secs().max(1);

        let prover: Arc<dyn ProofBackend> = match &config.proof_service_url {
            Some(url) => {
                tracing::info!(url = %url, "proof backend: remote prover");
                let mut prover_config = RemoteProverConfig::new(url);
                prover_config.timeout_secs = client_timeout_secs;
                Arc::new(RemoteProver::new(prover_config)?)
            }
            None => {
                tracing::info!("proof backend: local hash prover (not authoritative)");
                Arc::new(HashProver::new())
            }
        };

        let ledger: Arc<dyn AuditLedger> = match (&config.audit_rpc_url, &config.audit_from) {
            (Some(rpc_url), Some(from)) => {
                let mut ledger_config =
                    JsonRpcLedgerConfig::new(rpc_url, &config.audit_network, from);
                ledger_config.timeout_secs = client_timeout_secs;
                if let Some(contract) = &config.audit_contract {
                    ledger_config = ledger_config.with_contract(contract);
                }
                tracing::info!(
                    network = %config.audit_network,
                    "audit ledger: JSON-RPC"
                );
                Arc::new(JsonRpcLedger::new(ledger_config)?)
            }
            _ => {
                tracing::info!(
                    "audit ledger: local degraded mode (not publicly verifiable)"
                );
                Arc::new(LocalLedger::new())
            }
        };

        let requests = Arc::new(RequestStore::new());
        let relay_store = Arc::new(RelayStore::new());

        let orchestrator = Arc::new(ConsentOrchestrator::new(
            Arc::clone(&prover),
            Arc::clone(&ledger),
            Arc::clone(&requests),
            Arc::clone(&relay_store),
            config.provider_timeout,
        ));
        let gate = Arc::new(ReleaseGate::new(prover, ledger, Arc::clone(&requests)));
        let relay = Arc::new(GrantRelay::new(
            Arc::clone(&requests),
            Arc::clone(&relay_store),
        ));

        Ok(Self {
            config,
            requests,
            relay_store,
            orchestrator,
            gate,
            relay,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
