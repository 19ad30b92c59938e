//! Swap execution against the chain: build, sign, submit, confirm.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use tokio::time::sleep;
use tracing::debug;

use crate::domain::execution::sequencer::SwapExecutor;
use crate::exchanges::api_clients::QuoteApiClient;
use crate::exchanges::types::Quote;
use crate::shared::errors::ExecutionError;

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);
const CONFIRM_MAX_POLLS: u32 = 60; // ~30s at 500ms

/// Builds each swap through the quote API, signs it with the trading wallet
/// and submits it through the RPC node, waiting for confirmation.
pub struct JupiterSwapExecutor {
    api: Arc<dyn QuoteApiClient>,
    rpc: Arc<RpcClient>,
    wallet: Arc<Keypair>,
}

impl JupiterSwapExecutor {
    pub fn new(api: Arc<dyn QuoteApiClient>, rpc: Arc<RpcClient>, wallet: Arc<Keypair>) -> Self {
        Self { api, rpc, wallet }
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), ExecutionError> {
        for _ in 0..CONFIRM_MAX_POLLS {
            let confirmed = self
                .rpc
                .confirm_transaction_with_commitment(signature, CommitmentConfig::confirmed())
                .await
                .map_err(|e| ExecutionError::Submission(e.to_string()))?;
            if confirmed.value {
                return Ok(());
            }
            sleep(CONFIRM_POLL_INTERVAL).await;
        }
        Err(ExecutionError::ConfirmationTimeout(signature.to_string()))
    }
}

#[async_trait]
impl SwapExecutor for JupiterSwapExecutor {
    async fn execute_swap(&self, quote: &Quote) -> Result<String, ExecutionError> {
        let signer = self.wallet.pubkey().to_string();
        let Some(swap) = self.api.build_swap(quote, &signer).await? else {
            return Err(ExecutionError::SwapBuildRejected);
        };

        let tx_bytes = BASE64
            .decode(&swap.swap_transaction)
            .map_err(|e| ExecutionError::InvalidTransaction(e.to_string()))?;
        let unsigned: VersionedTransaction = bincode::deserialize(&tx_bytes)
            .map_err(|e| ExecutionError::InvalidTransaction(e.to_string()))?;
        let tx = VersionedTransaction::try_new(unsigned.message, &[self.wallet.as_ref()])
            .map_err(|e| ExecutionError::Signing(e.to_string()))?;

        let signature = self
            .rpc
            .send_transaction_with_config(
                &tx,
                RpcSendTransactionConfig {
                    skip_preflight: false,
                    preflight_commitment: Some(CommitmentLevel::Confirmed),
                    max_retries: Some(3),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;

        debug!("submitted {}→{} as {signature}", quote.input_mint, quote.output_mint);
        self.confirm(&signature).await?;
        Ok(signature.to_string())
    }
}
