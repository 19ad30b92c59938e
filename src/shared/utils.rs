//! Utility functions and helpers

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Lamports to SOL for display. Money math stays in integer lamports
/// everywhere; this is formatting only.
pub fn lamports_to_sol(lamports: i64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Format a lamport amount as a SOL string with 6 decimals.
pub fn format_sol(lamports: i64) -> String {
    format!("{:.6}", lamports_to_sol(lamports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(1_000_000_000), "1.000000");
        assert_eq!(format_sol(10_000_000), "0.010000");
        assert_eq!(format_sol(-50_000), "-0.000050");
    }
}
