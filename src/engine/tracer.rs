//! Backward provenance walk over the transaction graph.
//!
//! The walk is depth-first and driven by an explicit stack of frames. Each
//! frame is one transaction with a cursor over its (input, output) pairs.
//! Records come out input-major, output-minor, and a followed branch's
//! whole subtree is emitted before the next pair of its parent.

use crate::config::{FollowWallet, RateDate, TerminationMode};
use crate::domain::{Address, Decimal, TraceRecord, Transaction, TxHash, TxInput, WalletSet};
use crate::error::TraceError;
use crate::gateway::Gateway;
use crate::sink::TraceSink;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tunables for a trace run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOptions {
    pub termination_mode: TerminationMode,
    pub follow_wallet: FollowWallet,
    pub rate_date: RateDate,
    /// Maximum hops from the starting transaction.
    pub max_depth: usize,
    /// Maximum distinct transactions visited per starting wallet.
    pub max_transactions: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            termination_mode: TerminationMode::StopTransaction,
            follow_wallet: FollowWallet::Destination,
            rate_date: RateDate::WallClock,
            max_depth: 64,
            max_transactions: 10_000,
        }
    }
}

/// Per-starting-wallet context threaded through the walk.
#[derive(Debug, Clone, Copy)]
pub struct TraceContext<'a> {
    pub starting_wallet: &'a Address,
    pub terminating: &'a WalletSet,
}

/// A followed branch that failed and was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFailure {
    /// Funding wallet of the pair that led into the branch.
    pub source_wallet: Address,
    /// Transaction holding that pair, i.e. the parent of the abandoned branch.
    pub tx_hash: TxHash,
    pub error: String,
}

/// Outcome of tracing from one starting transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub records_emitted: usize,
    pub transactions_visited: usize,
    pub terminating_hits: usize,
    pub branch_failures: Vec<BranchFailure>,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Frame {
    tx: Transaction,
    depth: usize,
    /// Parent pair's funding wallet and transaction; `None` for the root.
    via: Option<(Address, TxHash)>,
    input: usize,
    output: usize,
}

impl Frame {
    fn new(tx: Transaction, depth: usize, via: Option<(Address, TxHash)>) -> Self {
        Self {
            tx,
            depth,
            via,
            input: 0,
            output: 0,
        }
    }

    /// Advance to the next (input, output) index pair. Coinbase inputs have no
    /// funding wallet and are passed over.
    fn next_pair(&mut self) -> Option<(usize, usize)> {
        loop {
            let input = self.tx.inputs.get(self.input)?;
            if self.output >= self.tx.outputs.len() || input.source().is_none() {
                if input.source().is_none() {
                    debug!("Skipping input without funding wallet in {}", self.tx.hash);
                }
                self.input += 1;
                self.output = 0;
                continue;
            }
            let pair = (self.input, self.output);
            self.output += 1;
            return Some(pair);
        }
    }
}

/// What the engine does after emitting a pair.
enum Step {
    Continue,
    Push(Frame),
    PopFrame,
}

pub struct Tracer {
    gateway: Arc<dyn Gateway>,
    options: TraceOptions,
    clock: Clock,
}

impl Tracer {
    pub fn new(gateway: Arc<dyn Gateway>, options: TraceOptions) -> Self {
        if options.rate_date == RateDate::WallClock {
            warn!("Valuing transfers at the trace date, not the transaction date");
        }
        Self {
            gateway,
            options,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for rate dates.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Trace backward from `start`, emitting records to `sink`.
    ///
    /// Failures while fetching or valuing the starting transaction itself are
    /// returned. Failures in any followed branch are logged, recorded in the
    /// summary, and only abandon that branch.
    pub async fn trace(
        &self,
        start: &TxHash,
        ctx: TraceContext<'_>,
        sink: &mut dyn TraceSink,
    ) -> Result<TraceSummary, TraceError> {
        let mut summary = TraceSummary::default();
        let mut visited: HashSet<TxHash> = HashSet::new();

        let root = self.gateway.fetch_transaction(start).await?;
        visited.insert(start.clone());
        visited.insert(root.hash.clone());
        summary.transactions_visited = 1;

        let mut stack = vec![Frame::new(root, 0, None)];

        while let Some(frame) = stack.last_mut() {
            let Some((i, o)) = frame.next_pair() else {
                stack.pop();
                continue;
            };

            match self
                .visit_pair(frame, i, o, ctx, sink, &mut visited, &mut summary)
                .await
            {
                Ok(Step::Continue) => {}
                Ok(Step::Push(child)) => stack.push(child),
                Ok(Step::PopFrame) => {
                    stack.pop();
                }
                Err(e @ TraceError::Sink(_)) => return Err(e),
                Err(e) => {
                    let Some(failed) = stack.pop() else {
                        return Err(e);
                    };
                    match failed.via {
                        None => return Err(e),
                        Some((source_wallet, parent_hash)) => {
                            warn!("Failed to trace transaction from {}: {}", source_wallet, e);
                            summary.branch_failures.push(BranchFailure {
                                source_wallet,
                                tx_hash: parent_hash,
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        info!(
            "Trace from {} finished: {} records, {} transactions, {} branch failures",
            ctx.starting_wallet,
            summary.records_emitted,
            summary.transactions_visited,
            summary.branch_failures.len()
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    async fn visit_pair(
        &self,
        frame: &Frame,
        i: usize,
        o: usize,
        ctx: TraceContext<'_>,
        sink: &mut dyn TraceSink,
        visited: &mut HashSet<TxHash>,
        summary: &mut TraceSummary,
    ) -> Result<Step, TraceError> {
        let tx = &frame.tx;
        let input: &TxInput = &tx.inputs[i];
        let Some((source_wallet, coin_amount)) = input.source() else {
            return Ok(Step::Continue);
        };
        let output = &tx.outputs[o];

        // Fee attributed to this one input alone; goes negative when other
        // inputs also fund the outputs.
        let fee_units = coin_amount - tx.total_output_value();

        let dest_amount = Decimal::from_smallest_unit(output.value);
        let fee = Decimal::from_smallest_unit(fee_units);
        let rate = self.gateway.fetch_exchange_rate(self.rate_date(tx)).await?;

        let record = TraceRecord {
            starting_wallet: ctx.starting_wallet.clone(),
            source_wallet: source_wallet.clone(),
            dest_wallet: output.address.clone(),
            dest_amount,
            fee,
            dest_amount_reference: dest_amount * rate,
            fee_reference: fee * rate,
            tx_hash: tx.hash.clone(),
        };
        sink.emit(&record)?;
        summary.records_emitted += 1;

        if ctx.terminating.contains(source_wallet) {
            info!("Reached a terminating wallet: {}", source_wallet);
            summary.terminating_hits += 1;
            return Ok(match self.options.termination_mode {
                TerminationMode::StopTransaction => Step::PopFrame,
                TerminationMode::SkipBranch => Step::Continue,
            });
        }

        let next_wallet = match self.options.follow_wallet {
            FollowWallet::Destination => output.address.as_ref(),
            FollowWallet::Source => Some(source_wallet),
        };
        let Some(next_wallet) = next_wallet else {
            debug!("Output {} of {} has no address, not followed", o, tx.hash);
            return Ok(Step::Continue);
        };

        if frame.depth + 1 > self.options.max_depth {
            warn!(
                "Max depth {} reached at {}, not following {}",
                self.options.max_depth, tx.hash, next_wallet
            );
            return Ok(Step::Continue);
        }

        match self.resolve_next(next_wallet, visited, summary).await {
            Ok(Some(child)) => Ok(Step::Push(Frame::new(
                child,
                frame.depth + 1,
                Some((source_wallet.clone(), tx.hash.clone())),
            ))),
            Ok(None) => Ok(Step::Continue),
            Err(e) => {
                warn!("Failed to trace transaction from {}: {}", source_wallet, e);
                summary.branch_failures.push(BranchFailure {
                    source_wallet: source_wallet.clone(),
                    tx_hash: tx.hash.clone(),
                    error: e.to_string(),
                });
                Ok(Step::Continue)
            }
        }
    }

    /// Pick the next transaction to follow from `wallet`'s history. `None`
    /// when it was already visited or the visit budget is spent.
    async fn resolve_next(
        &self,
        wallet: &Address,
        visited: &mut HashSet<TxHash>,
        summary: &mut TraceSummary,
    ) -> Result<Option<Transaction>, TraceError> {
        let history = self.gateway.fetch_address_history(wallet).await?;
        let Some(next) = history.first() else {
            return Err(TraceError::NoTransactions(wallet.to_string()));
        };

        if visited.contains(&next.hash) {
            debug!("Transaction {} already traced, not following again", next.hash);
            return Ok(None);
        }
        if visited.len() >= self.options.max_transactions {
            warn!(
                "Visited {} transactions, not following {}",
                visited.len(),
                next.hash
            );
            return Ok(None);
        }

        visited.insert(next.hash.clone());
        let tx = self.gateway.fetch_transaction(&next.hash).await?;
        summary.transactions_visited += 1;
        Ok(Some(tx))
    }

    fn rate_date(&self, tx: &Transaction) -> NaiveDate {
        let now = (self.clock)();
        match (self.options.rate_date, tx.time) {
            (RateDate::TransactionTime, Some(secs)) => match Utc.timestamp_opt(secs, 0).single() {
                Some(at) => at.date_naive(),
                None => {
                    warn!("Invalid time {} on {}, using trace date", secs, tx.hash);
                    now.date_naive()
                }
            },
            (RateDate::TransactionTime, None) => {
                debug!("No time on {}, using trace date", tx.hash);
                now.date_naive()
            }
            (RateDate::WallClock, _) => now.date_naive(),
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
