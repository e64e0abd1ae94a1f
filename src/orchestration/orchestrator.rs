use crate::domain::{Address, WalletSet};
use crate::engine::{TraceContext, TraceSummary, Tracer};
use crate::error::TraceError;
use crate::sink::TraceSink;
use tracing::{info, warn};

/// Runs the tracer over every configured starting wallet, isolating failures
/// per wallet.
pub struct Orchestrator {
    tracer: Tracer,
}

/// Result for one starting wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletOutcome {
    Traced(TraceSummary),
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub wallets: Vec<(Address, WalletOutcome)>,
}

impl RunSummary {
    pub fn records_emitted(&self) -> usize {
        self.wallets
            .iter()
            .map(|(_, outcome)| match outcome {
                WalletOutcome::Traced(summary) => summary.records_emitted,
                WalletOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failed_wallets(&self) -> Vec<&Address> {
        self.wallets
            .iter()
            .filter(|(_, outcome)| matches!(outcome, WalletOutcome::Failed { .. }))
            .map(|(wallet, _)| wallet)
            .collect()
    }
}

impl Orchestrator {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }

    /// Trace every starting wallet in order into a single shared sink.
    pub async fn run(
        &self,
        starting_wallets: &[Address],
        terminating: &WalletSet,
        sink: &mut dyn TraceSink,
    ) -> RunSummary {
        info!(
            "Tracing {} starting wallets against {} terminating wallets",
            starting_wallets.len(),
            terminating.len()
        );

        let mut summary = RunSummary::default();
        for wallet in starting_wallets {
            let outcome = match self.trace_wallet(wallet, terminating, sink).await {
                Ok(traced) => WalletOutcome::Traced(traced),
                Err(e) => {
                    warn!("Error tracing transactions for wallet {}: {}", wallet, e);
                    WalletOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            summary.wallets.push((wallet.clone(), outcome));
        }

        info!(
            "Run complete: {} records, {} of {} wallets failed",
            summary.records_emitted(),
            summary.failed_wallets().len(),
            starting_wallets.len()
        );
        summary
    }

    async fn trace_wallet(
        &self,
        wallet: &Address,
        terminating: &WalletSet,
        sink: &mut dyn TraceSink,
    ) -> Result<TraceSummary, TraceError> {
        let history = self.tracer.gateway().fetch_address_history(wallet).await?;
        let initial = history
            .first()
            .ok_or_else(|| TraceError::NoTransactions(wallet.to_string()))?;

        info!("Tracing wallet {} from transaction {}", wallet, initial.hash);
        let ctx = TraceContext {
            starting_wallet: wallet,
            terminating,
        };
        self.tracer.trace(&initial.hash, ctx, sink).await
    }
}
