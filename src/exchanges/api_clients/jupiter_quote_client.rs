//! Jupiter quote/swap-build API client.
//!
//! Transient network failures are retried with increasing backoff; a timed
//! out attempt backs off longer than other transient failures, since timeout
//! usually means upstream rate-limiting or slowness rather than a one-off
//! network blip. A non-success HTTP status is not retried at all - it means
//! the API declined to quote, and the caller skips the leg.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tokio::time::sleep;
use tracing::warn;

use super::QuoteApiClient;
use crate::config::JupiterCfg;
use crate::exchanges::types::{Quote, SwapTransaction};
use crate::shared::errors::QuoteError;

/// Hard ceiling per attempt; the API can be slow, but the scan loop must
/// never hang on an unresponsive upstream.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Total attempts per request, first try included.
const MAX_ATTEMPTS: u32 = 3;

const TRANSIENT_BACKOFF_MS: u64 = 2_000;
const TIMEOUT_BACKOFF_MS: u64 = 4_000;

/// Outcome classification for a single request attempt.
enum AttemptError<E> {
    Retryable { timed_out: bool, source: E },
    Fatal(E),
}

/// Run `attempt` up to `max_attempts` times, sleeping between retryable
/// failures. The last failure is returned once attempts are exhausted;
/// fatal failures propagate immediately.
async fn retry_with_backoff<T, E, F, Fut>(max_attempts: u32, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(err)) => return Err(err),
            Err(AttemptError::Retryable { timed_out, source }) => {
                if attempts >= max_attempts {
                    return Err(source);
                }
                let base = if timed_out {
                    TIMEOUT_BACKOFF_MS
                } else {
                    TRANSIENT_BACKOFF_MS
                };
                let delay_ms = base * attempts as u64;
                warn!(
                    "quote API request failed (attempt {}/{}), retrying in {}ms",
                    attempts, max_attempts, delay_ms
                );
                sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

fn classify(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, AttemptError<reqwest::Error>> {
    match result {
        Ok(response) => Ok(response),
        Err(err) if err.is_timeout() => Err(AttemptError::Retryable {
            timed_out: true,
            source: err,
        }),
        Err(err) if err.is_connect() || err.is_request() => Err(AttemptError::Retryable {
            timed_out: false,
            source: err,
        }),
        Err(err) => Err(AttemptError::Fatal(err)),
    }
}

/// Jupiter API client
pub struct JupiterQuoteClient {
    http_client: Client,
    quote_url: String,
    swap_url: String,
    api_key: Option<String>,
}

impl JupiterQuoteClient {
    pub fn new(cfg: &JupiterCfg) -> Self {
        Self {
            http_client: Client::new(),
            quote_url: cfg.quote_url.clone(),
            swap_url: cfg.swap_url.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }
}

#[async_trait]
impl QuoteApiClient for JupiterQuoteClient {
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Option<Quote>, QuoteError> {
        let amount = amount.to_string();
        let slippage = slippage_bps.to_string();
        let query = [
            ("inputMint", input_mint),
            ("outputMint", output_mint),
            ("amount", amount.as_str()),
            ("slippageBps", slippage.as_str()),
        ];

        let response = retry_with_backoff(MAX_ATTEMPTS, || {
            let request = self
                .with_api_key(self.http_client.get(&self.quote_url))
                .timeout(REQUEST_TIMEOUT)
                .query(&query);
            async move { classify(request.send().await) }
        })
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("quote API returned {status} for {input_mint}→{output_mint}: {body}");
            return Ok(None);
        }

        let raw: Value = response.json().await?;
        Quote::from_response(raw).map(Some)
    }

    async fn build_swap(
        &self,
        quote: &Quote,
        signer: &str,
    ) -> Result<Option<SwapTransaction>, QuoteError> {
        let body = serde_json::json!({
            "quoteResponse": quote.raw,
            "userPublicKey": signer,
            "wrapAndUnwrapSol": true,
        });

        let response = retry_with_backoff(MAX_ATTEMPTS, || {
            let request = self
                .with_api_key(self.http_client.post(&self.swap_url))
                .timeout(REQUEST_TIMEOUT)
                .json(&body);
            async move { classify(request.send().await) }
        })
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            warn!(
                "swap build returned {status} for {}→{}: {err_body}",
                quote.input_mint, quote.output_mint
            );
            return Ok(None);
        }

        let swap: SwapTransaction = response.json().await?;
        Ok(Some(swap))
    }
}
