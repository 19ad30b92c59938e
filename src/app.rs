// src/app.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signer::Signer;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{redacted_rpc_url, ArbitrageCfg, Config};
use crate::domain::arbitrage::evaluator::OpportunityEvaluator;
use crate::domain::arbitrage::paths::triangle_paths;
use crate::domain::arbitrage::scanner::TriangleScanner;
use crate::domain::execution::sequencer::{SwapExecutor, TriangleSequencer};
use crate::exchanges::api_clients::{JupiterQuoteClient, QuoteApiClient};
use crate::infrastructure::ledger::{ActivityEventType, LedgerClient};
use crate::infrastructure::notifier::TelegramNotifier;
use crate::infrastructure::swap_executor::JupiterSwapExecutor;
use crate::infrastructure::wallet;
use crate::shared::utils::format_sol;

/// Emit a liveness log every Nth empty scan cycle.
const HEARTBEAT_EVERY_CYCLES: u64 = 12;

/// Wire the components and run the requested mode: a single dry-run scan,
/// or the polling loop until cancelled.
pub async fn run(config: Config, scan_only: bool) -> Result<()> {
    config.validate()?;

    let api: Arc<dyn QuoteApiClient> = Arc::new(JupiterQuoteClient::new(&config.jupiter));
    let catalog = triangle_paths();

    info!("Vertex Bot - Triangular Arbitrage (strict mode)");
    info!("RPC: {}", redacted_rpc_url(&config.solana.rpc_url));
    info!(
        "Trade size: {} SOL",
        format_sol(config.arbitrage.trade_size_lamports as i64)
    );
    info!(
        "Paths: {}",
        catalog
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("Filters: re-quote before execute, max price impact, safety buffer");

    let evaluator = OpportunityEvaluator::new(api.clone(), config.arbitrage.clone());
    let scanner = TriangleScanner::new(evaluator, catalog, config.arbitrage.clone());

    if scan_only {
        return scan_once(&scanner).await;
    }

    let wallet = Arc::new(wallet::load_keypair(&config.solana.private_key)?);
    info!("Wallet: {}", wallet.pubkey());

    let rpc = Arc::new(RpcClient::new_with_commitment(
        config.solana.rpc_url.clone(),
        CommitmentConfig::confirmed(),
    ));
    let ledger = Arc::new(LedgerClient::new(
        config.ledger.url.clone(),
        config.ledger.service_key.clone(),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        config.telegram.bot_token.clone(),
        config.telegram.chat_id.clone(),
    ));
    let executor: Arc<dyn SwapExecutor> = Arc::new(JupiterSwapExecutor::new(api, rpc, wallet));

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, finishing current cycle...");
            signal_token.cancel();
        }
    });

    run_polling_mode(
        &config.arbitrage,
        scanner,
        executor,
        ledger,
        notifier,
        cancel,
    )
    .await
}

/// One scan across all paths, printed and discarded. No execution.
async fn scan_once(scanner: &TriangleScanner) -> Result<()> {
    info!("Single scan across all paths (no execution)");

    match scanner.scan_all().await? {
        Some(opp) => {
            info!("Opportunity found: {}", opp.path_name);
            info!("  Input:  {} SOL", format_sol(opp.input_lamports as i64));
            info!("  Output: {} SOL", format_sol(opp.output_lamports as i64));
            info!(
                "  Profit: {} SOL ({} bps)",
                format_sol(opp.profit_lamports),
                opp.profit_bps
            );
        }
        None => info!("No profitable opportunity (strict filters)"),
    }

    Ok(())
}

/// Drive scan → re-quote → execute forever, one cycle per poll interval.
/// A failed cycle is logged and the loop moves on; only cancellation stops
/// the process.
pub async fn run_polling_mode(
    params: &ArbitrageCfg,
    scanner: TriangleScanner,
    executor: Arc<dyn SwapExecutor>,
    ledger: Arc<LedgerClient>,
    notifier: Arc<TelegramNotifier>,
    cancel: CancellationToken,
) -> Result<()> {
    info!(
        "Scanning for opportunities every {}ms...",
        params.poll_interval_ms
    );

    let mut interval = tokio::time::interval(Duration::from_millis(params.poll_interval_ms));
    let mut cycle_count: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Scan loop stopped");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        cycle_count += 1;
        if let Err(err) = run_cycle(
            params,
            &scanner,
            &executor,
            &ledger,
            &notifier,
            cycle_count,
        )
        .await
        {
            error!("Cycle {cycle_count} failed: {err:#}");
            ledger
                .log_activity(ActivityEventType::Error, &err.to_string(), None, None)
                .await;
        }
    }
}

async fn run_cycle(
    params: &ArbitrageCfg,
    scanner: &TriangleScanner,
    executor: &Arc<dyn SwapExecutor>,
    ledger: &Arc<LedgerClient>,
    notifier: &Arc<TelegramNotifier>,
    cycle_count: u64,
) -> Result<()> {
    let Some(opp) = scanner.scan_all().await? else {
        if cycle_count % HEARTBEAT_EVERY_CYCLES == 0 {
            info!("No opportunity (cycle {cycle_count})");
            ledger
                .log_activity(
                    ActivityEventType::Heartbeat,
                    &format!("Scan cycle {cycle_count} - no opportunity"),
                    None,
                    None,
                )
                .await;
        }
        return Ok(());
    };

    info!(
        "Opportunity: {} | profit {} SOL ({} bps)",
        opp.path_name,
        format_sol(opp.profit_lamports),
        opp.profit_bps
    );
    ledger
        .log_activity(
            ActivityEventType::Opportunity,
            &format!("{}: {} bps profit", opp.path_name, opp.profit_bps),
            Some(json!({
                "path_name": opp.path_name,
                "profit_bps": opp.profit_bps,
                "profit_lamports": opp.profit_lamports,
            })),
            None,
        )
        .await;

    // Strict: quotes go stale between scan and execution.
    let Some(fresh) = scanner.confirm(&opp).await? else {
        info!("  Skipped: opportunity no longer valid after re-quote");
        ledger
            .log_activity(
                ActivityEventType::Scan,
                "Opportunity no longer valid after re-quote",
                None,
                None,
            )
            .await;
        return Ok(());
    };

    info!("  Re-quote OK. Executing...");
    ledger
        .log_activity(
            ActivityEventType::Executing,
            &format!("Executing {}", fresh.path_name),
            None,
            None,
        )
        .await;

    let mut sequencer = TriangleSequencer::new(
        executor.clone(),
        ledger.clone(),
        notifier.clone(),
        Duration::from_millis(params.inter_leg_delay_ms),
    );
    let signatures = sequencer.execute(&fresh).await?;

    info!("  🚀 Done. Signatures: {}", signatures.join(", "));
    ledger
        .log_activity(
            ActivityEventType::TradeComplete,
            &format!("Triangle complete: {}", fresh.path_name),
            Some(json!({
                "signatures": signatures,
                "profit_lamports": fresh.profit_lamports,
            })),
            None,
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::arbitrage::evaluator::test_stub::ScriptedQuoteClient;
    use crate::domain::arbitrage::paths::{mint, TrianglePath};
    use crate::exchanges::types::Quote;
    use crate::shared::errors::ExecutionError;

    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SwapExecutor for CountingExecutor {
        async fn execute_swap(&self, _quote: &Quote) -> Result<String, ExecutionError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("sig-{n}"))
        }
    }

    fn test_params() -> ArbitrageCfg {
        ArbitrageCfg {
            trade_size_lamports: 1_000_000_000,
            min_profit_bps: 0,
            safety_buffer_bps: 0,
            estimated_fee_per_leg: 0,
            poll_interval_ms: 10,
            ..Default::default()
        }
    }

    fn scanner_over(client: Arc<ScriptedQuoteClient>, catalog: Vec<TrianglePath>) -> TriangleScanner {
        let params = test_params();
        let evaluator = OpportunityEvaluator::new(client, params.clone());
        TriangleScanner::new(evaluator, catalog, params)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_loop_stops_on_cancellation() {
        let scanner = scanner_over(Arc::new(ScriptedQuoteClient::default()), vec![]);
        let executor: Arc<dyn SwapExecutor> = Arc::new(CountingExecutor::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_polling_mode(
            &test_params(),
            scanner,
            executor,
            Arc::new(LedgerClient::disabled()),
            Arc::new(TelegramNotifier::disabled()),
            cancel,
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_scans_confirms_and_executes() {
        let path = TrianglePath::new(
            "SOL→USDC→USDT→SOL",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::USDT),
                (mint::USDT, mint::SOL),
            ],
        );
        let client = Arc::new(
            ScriptedQuoteClient::default()
                .leg(mint::SOL, mint::USDC, 185_000_000, 0.01)
                .leg(mint::USDC, mint::USDT, 185_100_000, 0.01)
                .leg(mint::USDT, mint::SOL, 1_003_300_000, 0.01),
        );
        let scanner = scanner_over(client, vec![path]);

        let executor = Arc::new(CountingExecutor::default());
        let executor_dyn: Arc<dyn SwapExecutor> = executor.clone();

        run_cycle(
            &test_params(),
            &scanner,
            &executor_dyn,
            &Arc::new(LedgerClient::disabled()),
            &Arc::new(TelegramNotifier::disabled()),
            1,
        )
        .await
        .unwrap();

        // Scan found it, the re-quote guard confirmed it, all 3 legs ran.
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_skips_execution_when_requote_rejects() {
        // The scan sees 33 bps; by re-quote time the final leg has decayed
        // to exactly break-even, so the guard must reject and the executor
        // must never run.
        let path = TrianglePath::new(
            "SOL→USDC→USDT→SOL",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::USDT),
                (mint::USDT, mint::SOL),
            ],
        );
        let client = Arc::new(
            ScriptedQuoteClient::default()
                .leg(mint::SOL, mint::USDC, 185_000_000, 0.01)
                .leg(mint::USDC, mint::USDT, 185_100_000, 0.01)
                .leg(mint::USDT, mint::SOL, 1_003_300_000, 0.01)
                .leg(mint::USDT, mint::SOL, 1_000_000_000, 0.01),
        );
        let scanner = scanner_over(client, vec![path]);

        let executor = Arc::new(CountingExecutor::default());
        let executor_dyn: Arc<dyn SwapExecutor> = executor.clone();

        run_cycle(
            &test_params(),
            &scanner,
            &executor_dyn,
            &Arc::new(LedgerClient::disabled()),
            &Arc::new(TelegramNotifier::disabled()),
            1,
        )
        .await
        .unwrap();

        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }
}
