//! Data types at the swap-quoting API boundary.
//!
//! Responses are validated into strict internal types here; missing or
//! ill-formed required fields are rejected at this boundary instead of
//! letting loosely shaped JSON flow into the decision logic.

use serde::Deserialize;
use serde_json::Value;

use crate::shared::errors::QuoteError;

/// A priced swap for one leg. Amounts are exact integer base units parsed
/// from the API's decimal strings; they never pass through floating point.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: u64,
    pub out_amount: u64,
    /// Price impact as a percentage (e.g. 0.12 = 0.12%). Display-scale,
    /// only ever compared against the per-leg impact ceiling.
    pub price_impact_pct: f64,
    /// The untouched response body. The swap-build endpoint expects the
    /// original quote echoed back verbatim, so we keep all of it.
    pub raw: Value,
}

impl Quote {
    /// Validate a raw quote response into the internal type.
    pub fn from_response(raw: Value) -> Result<Self, QuoteError> {
        let input_mint = str_field(&raw, "inputMint")?.to_string();
        let output_mint = str_field(&raw, "outputMint")?.to_string();
        let in_amount = amount_field(&raw, "inAmount")?;
        let out_amount = amount_field(&raw, "outAmount")?;
        let price_impact_pct = impact_field(&raw, "priceImpactPct")?;

        Ok(Self {
            input_mint,
            output_mint,
            in_amount,
            out_amount,
            price_impact_pct,
            raw,
        })
    }
}

/// Response from the swap-build endpoint: a base64-encoded transaction ready
/// to sign, plus submission metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: Option<u64>,
    #[serde(default)]
    pub prioritization_fee_lamports: Option<u64>,
}

fn str_field<'a>(raw: &'a Value, name: &str) -> Result<&'a str, QuoteError> {
    raw.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| QuoteError::Malformed(format!("missing field {name}")))
}

fn amount_field(raw: &Value, name: &str) -> Result<u64, QuoteError> {
    str_field(raw, name)?
        .parse()
        .map_err(|_| QuoteError::Malformed(format!("field {name} is not a base-unit integer string")))
}

// The API reports price impact as a decimal string, but some routes omit the
// quotes around it; accept both.
fn impact_field(raw: &Value, name: &str) -> Result<f64, QuoteError> {
    match raw.get(name) {
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| QuoteError::Malformed(format!("field {name} is not a percentage"))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| QuoteError::Malformed(format!("field {name} is not a percentage"))),
        _ => Err(QuoteError::Malformed(format!("missing field {name}"))),
    }
}
