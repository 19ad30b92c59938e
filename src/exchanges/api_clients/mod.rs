pub mod jupiter_quote_client;

pub use jupiter_quote_client::JupiterQuoteClient;

use async_trait::async_trait;

use crate::exchanges::types::{Quote, SwapTransaction};
use crate::shared::errors::QuoteError;

/// Boundary to the external quote/swap-build API.
///
/// `Ok(None)` means the API declined the request (no route, unsupported
/// size, rejected pair) - the caller treats it as "no opportunity via this
/// leg", not as a failure. Errors are reserved for exhausted retries and
/// malformed responses.
#[async_trait]
pub trait QuoteApiClient: Send + Sync {
    /// Price one directed swap of `amount` base units.
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Option<Quote>, QuoteError>;

    /// Build a signable transaction for a previously fetched quote.
    async fn build_swap(
        &self,
        quote: &Quote,
        signer: &str,
    ) -> Result<Option<SwapTransaction>, QuoteError>;
}
