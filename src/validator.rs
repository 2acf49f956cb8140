// ✅ Transition Validator - is this sale legal?
// Rules run in order: squad not full, price > 0, bid within max bid.

use crate::config::AuctionConfig;
use crate::error::{AuctionError, Result};
use crate::player::{Player, Team};
use crate::stats::team_stats;
use serde::Serialize;

/// Preview of a proposed sale, shown before the hammer falls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleQuote {
    pub team: Team,
    pub bid: u32,
    pub count: usize,
    pub max_squad_size: u32,
    pub is_full: bool,
    pub max_bid: i64,
    /// Max bid minus the bid; negative when the bid is too high
    pub remaining_after_bid: i64,
}

impl SaleQuote {
    pub fn can_afford(&self) -> bool {
        self.bid as i64 <= self.max_bid
    }

    /// The decision `validate_sale` would make
    pub fn decision(&self) -> Result<()> {
        if self.is_full {
            return Err(AuctionError::TeamFull {
                team: self.team,
                count: self.count,
                max_squad_size: self.max_squad_size,
            });
        }
        if self.bid == 0 {
            return Err(AuctionError::InvalidPrice);
        }
        if !self.can_afford() {
            return Err(AuctionError::InsufficientFunds {
                team: self.team,
                bid: self.bid,
                max_bid: self.max_bid,
            });
        }
        Ok(())
    }
}

pub fn quote_sale(players: &[Player], config: &AuctionConfig, team: Team, bid: u32) -> SaleQuote {
    let stats = team_stats(players, config, team);
    let max_bid = stats.max_bid(config);

    SaleQuote {
        team,
        bid,
        count: stats.count,
        max_squad_size: config.max_squad_size,
        is_full: stats.is_full(config),
        max_bid,
        remaining_after_bid: max_bid - bid as i64,
    }
}

/// Check a bid for `team` against the current roster and rules
pub fn validate_sale(players: &[Player], config: &AuctionConfig, team: Team, bid: u32) -> Result<SaleQuote> {
    let quote = quote_sale(players, config, team, bid);
    quote.decision()?;
    Ok(quote)
}
