//! Catalog scanning and the pre-execution re-quote guard.

use tracing::{info, warn};

use crate::config::ArbitrageCfg;
use crate::domain::arbitrage::evaluator::{ArbitrageOpportunity, OpportunityEvaluator};
use crate::domain::arbitrage::paths::TrianglePath;
use crate::shared::errors::QuoteError;

pub struct TriangleScanner {
    evaluator: OpportunityEvaluator,
    catalog: Vec<TrianglePath>,
    params: ArbitrageCfg,
}

impl TriangleScanner {
    pub fn new(
        evaluator: OpportunityEvaluator,
        catalog: Vec<TrianglePath>,
        params: ArbitrageCfg,
    ) -> Self {
        Self {
            evaluator,
            catalog,
            params,
        }
    }

    /// Evaluate every path with the configured trade size and keep the one
    /// with the strictly greatest profit bps. The `>` comparison means the
    /// first of a tie wins, in catalog order.
    pub async fn scan_all(&self) -> Result<Option<ArbitrageOpportunity>, QuoteError> {
        let mut best: Option<ArbitrageOpportunity> = None;

        for path in &self.catalog {
            let opp = self
                .evaluator
                .evaluate(path, self.params.trade_size_lamports)
                .await?;
            if let Some(opp) = opp {
                info!("💰 {}: {} bps", opp.path_name, opp.profit_bps);
                if best.as_ref().map_or(true, |b| opp.profit_bps > b.profit_bps) {
                    best = Some(opp);
                }
            }
        }

        Ok(best)
    }

    /// Re-quote `opportunity`'s path immediately before execution. With
    /// re-quoting disabled this trusts the scan result and performs no
    /// network calls at all; otherwise the evaluator is re-run wholesale -
    /// same thresholds, fresh quotes - and the trade only proceeds on a
    /// still-valid result.
    pub async fn confirm(
        &self,
        opportunity: &ArbitrageOpportunity,
    ) -> Result<Option<ArbitrageOpportunity>, QuoteError> {
        if !self.params.re_quote_before_execute {
            return Ok(Some(opportunity.clone()));
        }

        let Some(path) = self
            .catalog
            .iter()
            .find(|p| p.name == opportunity.path_name)
        else {
            // The catalog is static, so this should not happen.
            warn!(
                "path {} missing from catalog during re-quote",
                opportunity.path_name
            );
            return Ok(None);
        };

        let fresh = self
            .evaluator
            .evaluate(path, opportunity.input_lamports)
            .await?;
        Ok(match fresh {
            Some(fresh) if fresh.profit_lamports > 0 => Some(fresh),
            _ => None,
        })
    }
}
