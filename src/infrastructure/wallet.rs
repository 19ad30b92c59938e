//! Wallet keypair loading.

use anyhow::{anyhow, Context, Result};
use solana_sdk::signature::Keypair;

/// Decode the base58-encoded secret key from configuration into a keypair.
/// Loaded once at startup and read-only afterwards.
pub fn load_keypair(private_key_bs58: &str) -> Result<Keypair> {
    let secret = bs58::decode(private_key_bs58)
        .into_vec()
        .context("SOLANA_PRIVATE_KEY is not valid base58")?;
    Keypair::from_bytes(&secret).map_err(|e| anyhow!("invalid secret key: {e}"))
}
