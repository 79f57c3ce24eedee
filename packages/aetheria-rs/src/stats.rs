//! Player Statistics
//!
//! Battle results aggregated on the hub chain. Read-only: the hub is only
//! written by the composers when a battle message lands.

use alloy::primitives::U256;
use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;

/// Per-NFT battle record as reported by `getPlayerStats(tokenId)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub total_battles: u32,
    pub goblins_killed: u32,
    pub battles_lost: u32,
}

impl PlayerStats {
    pub fn new(total_battles: u32, goblins_killed: u32, battles_lost: u32) -> Self {
        Self {
            total_battles,
            goblins_killed,
            battles_lost,
        }
    }

    /// Share of battles won, `None` before the first battle
    pub fn win_rate(&self) -> Option<f64> {
        if self.total_battles == 0 {
            return None;
        }
        Some(f64::from(self.goblins_killed) / f64::from(self.total_battles))
    }

    /// Win rate as a whole percentage for display
    pub fn win_rate_percent(&self) -> Option<u32> {
        self.win_rate().map(|r| (r * 100.0).round() as u32)
    }
}

/// Read access to the stats hub contract
#[async_trait]
pub trait StatsHub: Send + Sync {
    /// `getPlayerStats(tokenId)`
    async fn player_stats(&self, token_id: U256) -> Result<PlayerStats>;

    /// `totalGoblinsKilled()` across all players
    async fn total_goblins_killed(&self) -> Result<U256>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_none_without_battles() {
        assert_eq!(PlayerStats::default().win_rate(), None);
        assert_eq!(PlayerStats::default().win_rate_percent(), None);
    }

    #[test]
    fn test_win_rate() {
        let stats = PlayerStats::new(4, 3, 1);
        assert_eq!(stats.win_rate(), Some(0.75));
        assert_eq!(stats.win_rate_percent(), Some(75));

        let stats = PlayerStats::new(3, 1, 2);
        assert_eq!(stats.win_rate_percent(), Some(33));
    }
}
