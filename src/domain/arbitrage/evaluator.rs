//! Leg-chained profitability evaluation for a single triangle.

use std::sync::Arc;

use tracing::debug;

use crate::config::ArbitrageCfg;
use crate::domain::arbitrage::paths::TrianglePath;
use crate::exchanges::api_clients::QuoteApiClient;
use crate::exchanges::types::Quote;
use crate::shared::errors::QuoteError;

/// A triangle that cleared every filter, with the quotes that priced it.
/// Never persisted - consumed immediately by the re-quote guard and the
/// execution sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageOpportunity {
    pub path_name: String,
    pub input_lamports: u64,
    pub output_lamports: u64,
    pub profit_lamports: i64,
    pub profit_bps: i64,
    pub quotes: [Quote; 3],
}

/// Profit in basis points relative to the input. Floor-truncating integer
/// division: the figure must never overstate profit.
pub fn profit_bps(profit_lamports: i64, input_lamports: u64) -> i64 {
    (profit_lamports as i128 * 10_000).div_euclid(input_lamports as i128) as i64
}

/// Prices one path by chaining three quotes leg to leg. Pure given its
/// inputs apart from the quote requests themselves - no shared state, so
/// the scanner and the re-quote guard can both call it freely.
pub struct OpportunityEvaluator {
    client: Arc<dyn QuoteApiClient>,
    params: ArbitrageCfg,
}

impl OpportunityEvaluator {
    pub fn new(client: Arc<dyn QuoteApiClient>, params: ArbitrageCfg) -> Self {
        Self { client, params }
    }

    /// Quote the three legs of `path`, feeding each leg's exact output into
    /// the next leg's input. Returns `None` when any leg fails the filters
    /// or the net profit misses the acceptance threshold.
    pub async fn evaluate(
        &self,
        path: &TrianglePath,
        input_lamports: u64,
    ) -> Result<Option<ArbitrageOpportunity>, QuoteError> {
        let Some(q1) = self.quote_leg(path, 0, input_lamports).await? else {
            return Ok(None);
        };
        let Some(q2) = self.quote_leg(path, 1, q1.out_amount).await? else {
            return Ok(None);
        };
        let Some(q3) = self.quote_leg(path, 2, q2.out_amount).await? else {
            return Ok(None);
        };

        let output_lamports = q3.out_amount;
        // Three on-chain executions, charged regardless of what price impact
        // already priced in.
        let fee_buffer = self.params.estimated_fee_per_leg as i64 * 3;
        let profit_lamports = output_lamports as i64 - input_lamports as i64 - fee_buffer;
        let bps = profit_bps(profit_lamports, input_lamports);

        let required_bps = self.params.min_profit_bps + self.params.safety_buffer_bps;
        if profit_lamports <= 0 || bps < required_bps {
            debug!(
                "{}: profit {} lamports ({} bps) below required {} bps",
                path.name, profit_lamports, bps, required_bps
            );
            return Ok(None);
        }

        Ok(Some(ArbitrageOpportunity {
            path_name: path.name.clone(),
            input_lamports,
            output_lamports,
            profit_lamports,
            profit_bps: bps,
            quotes: [q1, q2, q3],
        }))
    }

    async fn quote_leg(
        &self,
        path: &TrianglePath,
        index: usize,
        amount: u64,
    ) -> Result<Option<Quote>, QuoteError> {
        let (from, to) = &path.legs[index];
        let Some(quote) = self
            .client
            .get_quote(from, to, amount, self.params.slippage_bps)
            .await?
        else {
            debug!("{}: leg {} returned no quote", path.name, index + 1);
            return Ok(None);
        };

        if quote.price_impact_pct.abs() > self.params.max_price_impact_pct {
            debug!(
                "{}: leg {} price impact {:.4}% exceeds {:.2}% cap",
                path.name,
                index + 1,
                quote.price_impact_pct,
                self.params.max_price_impact_pct
            );
            return Ok(None);
        }

        Ok(Some(quote))
    }
}

#[cfg(test)]
pub(crate) mod test_stub {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::exchanges::api_clients::QuoteApiClient;
    use crate::exchanges::types::{Quote, SwapTransaction};
    use crate::shared::errors::QuoteError;

    pub(crate) fn make_quote(
        input_mint: &str,
        output_mint: &str,
        in_amount: u64,
        out_amount: u64,
        price_impact_pct: f64,
    ) -> Quote {
        Quote {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            in_amount,
            out_amount,
            price_impact_pct,
            raw: json!({}),
        }
    }

    /// Quote client scripted per directed pair: `Some((out, impact))` prices
    /// the leg, `None` (or an unscripted pair) declines it. Scripting the
    /// same pair repeatedly builds a sequence of answers; the last one
    /// repeats. Counts calls so tests can assert how much network traffic a
    /// code path would cause.
    #[derive(Default)]
    pub(crate) struct ScriptedQuoteClient {
        legs: Mutex<HashMap<(String, String), VecDeque<Option<(u64, f64)>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedQuoteClient {
        pub(crate) fn leg(self, from: &str, to: &str, out_amount: u64, impact: f64) -> Self {
            self.legs
                .lock()
                .unwrap()
                .entry((from.to_string(), to.to_string()))
                .or_default()
                .push_back(Some((out_amount, impact)));
            self
        }

        pub(crate) fn rejected(self, from: &str, to: &str) -> Self {
            self.legs
                .lock()
                .unwrap()
                .entry((from.to_string(), to.to_string()))
                .or_default()
                .push_back(None);
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteApiClient for ScriptedQuoteClient {
        async fn get_quote(
            &self,
            input_mint: &str,
            output_mint: &str,
            amount: u64,
            _slippage_bps: u16,
        ) -> Result<Option<Quote>, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = (input_mint.to_string(), output_mint.to_string());
            let mut legs = self.legs.lock().unwrap();
            let Some(queue) = legs.get_mut(&key) else {
                return Ok(None);
            };
            let behavior = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().copied().flatten()
            };
            Ok(behavior.map(|(out_amount, impact)| {
                make_quote(input_mint, output_mint, amount, out_amount, impact)
            }))
        }

        async fn build_swap(
            &self,
            _quote: &Quote,
            _signer: &str,
        ) -> Result<Option<SwapTransaction>, QuoteError> {
            Ok(None)
        }
    }
}
