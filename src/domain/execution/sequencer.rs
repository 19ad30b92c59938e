//! Strictly ordered three-leg execution with partial-failure tracking.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info};

use crate::domain::arbitrage::evaluator::ArbitrageOpportunity;
use crate::exchanges::types::Quote;
use crate::infrastructure::ledger::{ActivityEventType, LedgerClient, TradeRecord, TradeStatus};
use crate::infrastructure::notifier::TelegramNotifier;
use crate::shared::errors::ExecutionError;
use crate::shared::utils::format_sol;

pub const STRATEGY_TAG: &str = "triangular_arb";

/// Progress of one triangle through its legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Pending,
    Leg1Sent,
    Leg2Sent,
    Leg3Sent,
    Complete,
    Failed,
}

const AFTER_LEG: [ExecutionState; 3] = [
    ExecutionState::Leg1Sent,
    ExecutionState::Leg2Sent,
    ExecutionState::Leg3Sent,
];

/// Executes one already-quoted swap end to end (build, sign, submit,
/// confirm) and returns its transaction signature.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute_swap(&self, quote: &Quote) -> Result<String, ExecutionError>;
}

/// Runs the three legs of a confirmed opportunity strictly in order, each
/// from its already-fetched quote. A failed leg aborts the sequence
/// immediately: later legs never run, and the wallet is left holding
/// whatever intermediate asset the completed legs produced. No automatic
/// unwind is attempted - operators reconcile manually.
pub struct TriangleSequencer {
    executor: Arc<dyn SwapExecutor>,
    ledger: Arc<LedgerClient>,
    notifier: Arc<TelegramNotifier>,
    inter_leg_delay: Duration,
    state: ExecutionState,
    signatures: Vec<String>,
}

impl TriangleSequencer {
    pub fn new(
        executor: Arc<dyn SwapExecutor>,
        ledger: Arc<LedgerClient>,
        notifier: Arc<TelegramNotifier>,
        inter_leg_delay: Duration,
    ) -> Self {
        Self {
            executor,
            ledger,
            notifier,
            inter_leg_delay,
            state: ExecutionState::Pending,
            signatures: Vec::new(),
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Signatures of the legs that landed, in order. After a failure this
    /// is the partial list the operator needs for reconciliation.
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Execute all three legs. On success returns the ordered signatures;
    /// on failure the error names the leg that broke the sequence.
    pub async fn execute(
        &mut self,
        opportunity: &ArbitrageOpportunity,
    ) -> Result<Vec<String>, ExecutionError> {
        let symbols: Vec<&str> = opportunity.path_name.split('→').collect();

        for (i, quote) in opportunity.quotes.iter().enumerate() {
            let leg_no = i + 1;
            let leg_label = if symbols.len() == 4 {
                format!("{}→{}", symbols[i], symbols[i + 1])
            } else {
                format!("{}→{}", quote.input_mint, quote.output_mint)
            };

            info!("  Executing leg {leg_no}/3: {leg_label}...");
            let signature = match self.executor.execute_swap(quote).await {
                Ok(signature) => signature,
                Err(err) => {
                    self.state = ExecutionState::Failed;
                    error!("  ❌ Leg {leg_no}/3 failed: {err}");
                    self.ledger
                        .log_trade(&TradeRecord {
                            tx_signature: None,
                            input_mint: quote.input_mint.clone(),
                            output_mint: quote.output_mint.clone(),
                            input_amount: quote.in_amount.to_string(),
                            output_amount: quote.out_amount.to_string(),
                            profit_lamports: None,
                            profit_bps: None,
                            strategy: STRATEGY_TAG.to_string(),
                            status: TradeStatus::Failed,
                            error_message: Some(err.to_string()),
                            executed_at: Utc::now(),
                        })
                        .await;
                    self.ledger
                        .log_activity(
                            ActivityEventType::Error,
                            &format!("Leg {leg_no} failed on {}", opportunity.path_name),
                            None,
                            None,
                        )
                        .await;
                    return Err(ExecutionError::LegFailed {
                        leg: leg_no,
                        source: Box::new(err),
                    });
                }
            };

            self.state = AFTER_LEG[i];
            self.signatures.push(signature.clone());
            info!("  Tx: https://solscan.io/tx/{signature}");
            self.ledger
                .log_activity(
                    ActivityEventType::TradeComplete,
                    &format!("Leg {leg_no}: {leg_label}"),
                    None,
                    Some(&signature),
                )
                .await;

            let completes_triangle = leg_no == 3;
            self.ledger
                .log_trade(&TradeRecord {
                    tx_signature: Some(signature.clone()),
                    input_mint: quote.input_mint.clone(),
                    output_mint: quote.output_mint.clone(),
                    input_amount: quote.in_amount.to_string(),
                    output_amount: quote.out_amount.to_string(),
                    profit_lamports: completes_triangle.then_some(opportunity.profit_lamports),
                    profit_bps: completes_triangle.then_some(opportunity.profit_bps),
                    strategy: STRATEGY_TAG.to_string(),
                    status: TradeStatus::Success,
                    error_message: None,
                    executed_at: Utc::now(),
                })
                .await;

            if completes_triangle {
                self.notifier
                    .send_alert(&format!(
                        "✅ <b>Vertex Trade</b>\nPath: {}\nProfit: {} SOL ({} bps)\nTx: https://solscan.io/tx/{}",
                        opportunity.path_name,
                        format_sol(opportunity.profit_lamports),
                        opportunity.profit_bps,
                        signature,
                    ))
                    .await;
            } else {
                // Space the submissions out instead of hammering the
                // network back to back.
                sleep(self.inter_leg_delay).await;
            }
        }

        self.state = ExecutionState::Complete;
        Ok(self.signatures.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::arbitrage::evaluator::test_stub::make_quote;
    use crate::domain::arbitrage::paths::mint;

    struct ScriptedSwapExecutor {
        fail_on_leg: Option<usize>, // 1-based
        calls: Mutex<Vec<String>>,  // input mints, in call order
    }

    impl ScriptedSwapExecutor {
        fn new(fail_on_leg: Option<usize>) -> Self {
            Self {
                fail_on_leg,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SwapExecutor for ScriptedSwapExecutor {
        async fn execute_swap(&self, quote: &Quote) -> Result<String, ExecutionError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(quote.input_mint.clone());
            let leg = calls.len();
            if self.fail_on_leg == Some(leg) {
                return Err(ExecutionError::Submission(
                    "node rejected transaction".to_string(),
                ));
            }
            Ok(format!("sig-{leg}"))
        }
    }

    fn fixture_opportunity() -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            path_name: "SOL→USDC→USDT→SOL".to_string(),
            input_lamports: 1_000_000_000,
            output_lamports: 1_003_300_000,
            profit_lamports: 3_300_000,
            profit_bps: 33,
            quotes: [
                make_quote(mint::SOL, mint::USDC, 1_000_000_000, 185_000_000, 0.01),
                make_quote(mint::USDC, mint::USDT, 185_000_000, 185_100_000, 0.01),
                make_quote(mint::USDT, mint::SOL, 185_100_000, 1_003_300_000, 0.01),
            ],
        }
    }

    fn sequencer(executor: Arc<ScriptedSwapExecutor>) -> TriangleSequencer {
        TriangleSequencer::new(
            executor,
            Arc::new(LedgerClient::disabled()),
            Arc::new(TelegramNotifier::disabled()),
            Duration::from_millis(2_000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_three_legs_succeed_in_order() {
        let executor = Arc::new(ScriptedSwapExecutor::new(None));
        let mut seq = sequencer(executor.clone());

        let signatures = seq.execute(&fixture_opportunity()).await.unwrap();

        assert_eq!(signatures, vec!["sig-1", "sig-2", "sig-3"]);
        assert_eq!(seq.state(), ExecutionState::Complete);
        assert_eq!(
            *executor.calls.lock().unwrap(),
            vec![mint::SOL, mint::USDC, mint::USDT]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_leg_two_failure_aborts_without_leg_three() {
        let executor = Arc::new(ScriptedSwapExecutor::new(Some(2)));
        let mut seq = sequencer(executor.clone());

        let err = seq.execute(&fixture_opportunity()).await.unwrap_err();

        match err {
            ExecutionError::LegFailed { leg, .. } => assert_eq!(leg, 2),
            other => panic!("unexpected error: {other}"),
        }
        // Exactly leg 1's signature was recorded, and leg 3 never ran.
        assert_eq!(seq.signatures(), ["sig-1"]);
        assert_eq!(seq.state(), ExecutionState::Failed);
        assert_eq!(executor.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leg_one_failure_records_nothing() {
        let executor = Arc::new(ScriptedSwapExecutor::new(Some(1)));
        let mut seq = sequencer(executor.clone());

        let err = seq.execute(&fixture_opportunity()).await.unwrap_err();

        match err {
            ExecutionError::LegFailed { leg, .. } => assert_eq!(leg, 1),
            other => panic!("unexpected error: {other}"),
        }
        assert!(seq.signatures().is_empty());
        assert_eq!(seq.state(), ExecutionState::Failed);
        assert_eq!(executor.call_count(), 1);
    }
}
