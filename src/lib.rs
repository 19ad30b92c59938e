//! Vertex - Solana triangular arbitrage bot
//! Scans a fixed catalog of triangle paths on the Jupiter swap API and
//! executes only when strict profitability filters pass.

pub mod app;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::arbitrage::evaluator::{ArbitrageOpportunity, OpportunityEvaluator};
pub use domain::arbitrage::scanner::TriangleScanner;
pub use domain::execution::sequencer::TriangleSequencer;
pub use exchanges::api_clients::{JupiterQuoteClient, QuoteApiClient};
pub use infrastructure::ledger::LedgerClient;
