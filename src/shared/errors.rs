//! Error handling for the application

use thiserror::Error;

/// Quote API errors that survive the client's retry policy.
///
/// A non-success HTTP status is not represented here at all: the client
/// reports it as "no quote" and the caller skips the path for this cycle.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed quote API response: {0}")]
    Malformed(String),
}

/// Execution-related errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("quote API error: {0}")]
    Quote(#[from] QuoteError),

    #[error("swap build returned no transaction")]
    SwapBuildRejected,

    #[error("invalid swap transaction payload: {0}")]
    InvalidTransaction(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("transaction {0} not confirmed in time")]
    ConfirmationTimeout(String),

    /// The most severe case: a leg failed after earlier legs landed, leaving
    /// the wallet holding an intermediate asset. No automatic unwind is
    /// attempted; operators reconcile manually.
    #[error("leg {leg} failed: {source}")]
    LegFailed {
        leg: usize,
        #[source]
        source: Box<ExecutionError>,
    },
}
