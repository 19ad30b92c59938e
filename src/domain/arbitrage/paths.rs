//! Static catalog of triangular swap cycles.
//!
//! Paths are enumerated at process start and never mutated. There is no
//! pathfinding: these six cycles are the whole search space.

/// Mainnet mints for the tokens the catalog trades.
pub mod mint {
    pub const SOL: &str = "So11111111111111111111111111111111111111112";
    pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    pub const USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
    pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
    pub const JUP: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";
}

/// A three-leg cycle: each leg is a directed `(from, to)` mint pair, and the
/// last leg returns to the first leg's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrianglePath {
    pub name: String,
    pub legs: [(String, String); 3],
}

impl TrianglePath {
    pub fn new(name: &str, legs: [(&str, &str); 3]) -> Self {
        Self {
            name: name.to_string(),
            legs: legs.map(|(from, to)| (from.to_string(), to.to_string())),
        }
    }

    /// A path is well-formed when each leg starts where the previous one
    /// ended, wrapping around to close the cycle.
    pub fn is_closed_cycle(&self) -> bool {
        (0..3).all(|i| self.legs[i].1 == self.legs[(i + 1) % 3].0)
    }
}

/// The six triangles scanned every cycle. Order matters: the scanner breaks
/// profit ties in favor of the earliest entry.
pub fn triangle_paths() -> Vec<TrianglePath> {
    vec![
        // Stables (SOL/USDC/USDT)
        TrianglePath::new(
            "SOL→USDC→USDT→SOL",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::USDT),
                (mint::USDT, mint::SOL),
            ],
        ),
        TrianglePath::new(
            "SOL→USDT→USDC→SOL",
            [
                (mint::SOL, mint::USDT),
                (mint::USDT, mint::USDC),
                (mint::USDC, mint::SOL),
            ],
        ),
        // SOL/USDC/BONK
        TrianglePath::new(
            "SOL→USDC→BONK→SOL",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::BONK),
                (mint::BONK, mint::SOL),
            ],
        ),
        TrianglePath::new(
            "SOL→BONK→USDC→SOL",
            [
                (mint::SOL, mint::BONK),
                (mint::BONK, mint::USDC),
                (mint::USDC, mint::SOL),
            ],
        ),
        // SOL/USDC/JUP
        TrianglePath::new(
            "SOL→USDC→JUP→SOL",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::JUP),
                (mint::JUP, mint::SOL),
            ],
        ),
        TrianglePath::new(
            "SOL→JUP→USDC→SOL",
            [
                (mint::SOL, mint::JUP),
                (mint::JUP, mint::USDC),
                (mint::USDC, mint::SOL),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_paths_are_closed_cycles() {
        for path in triangle_paths() {
            assert!(path.is_closed_cycle(), "{} does not close", path.name);
            // Closure spelled out: leg-to-leg continuity plus the wrap-around.
            assert_eq!(path.legs[0].1, path.legs[1].0);
            assert_eq!(path.legs[1].1, path.legs[2].0);
            assert_eq!(path.legs[2].1, path.legs[0].0);
        }
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let paths = triangle_paths();
        let names: HashSet<_> = paths.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), paths.len());
    }

    #[test]
    fn test_broken_cycle_is_detected() {
        let path = TrianglePath::new(
            "broken",
            [
                (mint::SOL, mint::USDC),
                (mint::USDC, mint::USDT),
                (mint::BONK, mint::SOL), // does not continue from USDT
            ],
        );
        assert!(!path.is_closed_cycle());
    }
}
