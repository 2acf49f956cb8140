// 📊 Team Stats - derived purse and roster numbers
// Pure functions of (players, config). Recomputed on every read, never cached.

use crate::config::AuctionConfig;
use crate::player::{Player, Sport, Team};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub team: Team,
    pub count: usize,
    pub spent: i64,
    pub empty_slots: u32,
    /// Purse limit minus spent
    pub purse: i64,
    /// Purse after reserving base price for every empty slot
    pub disposable: i64,
    pub cricket: usize,
    pub badminton: usize,
    pub tt: usize,
}

impl TeamStats {
    pub fn sport_count(&self, sport: Sport) -> usize {
        match sport {
            Sport::Cricket => self.cricket,
            Sport::Badminton => self.badminton,
            Sport::TT => self.tt,
        }
    }

    pub fn is_full(&self, config: &AuctionConfig) -> bool {
        self.count >= config.max_squad_size as usize
    }

    /// Highest legal bid: the reserve already holds one base-price slot for this purchase
    pub fn max_bid(&self, config: &AuctionConfig) -> i64 {
        self.disposable + config.base_price as i64
    }
}

/// Stats for a single team
pub fn team_stats(players: &[Player], config: &AuctionConfig, team: Team) -> TeamStats {
    let roster: Vec<&Player> = players.iter().filter(|p| p.team == Some(team)).collect();

    let count = roster.len();
    let spent: i64 = roster.iter().map(|p| p.price as i64).sum();
    let playing = |sport: Sport| roster.iter().filter(|p| p.plays(sport)).count();

    let purse = config.purse_limit as i64 - spent;
    let empty_slots = (config.max_squad_size as usize).saturating_sub(count) as u32;
    let reserve = empty_slots as i64 * config.base_price as i64;

    TeamStats {
        team,
        count,
        spent,
        empty_slots,
        purse,
        disposable: purse - reserve,
        cricket: playing(Sport::Cricket),
        badminton: playing(Sport::Badminton),
        tt: playing(Sport::TT),
    }
}

/// Stats for every team, in `Team::ALL` order
pub fn calculate_team_stats(players: &[Player], config: &AuctionConfig) -> Vec<TeamStats> {
    Team::ALL
        .iter()
        .map(|team| team_stats(players, config, *team))
        .collect()
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TopBid {
    pub sport: Sport,
    pub player: Option<Player>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_sold: usize,
    pub total_slots: usize,
    pub remaining: usize,
    pub top_bids: Vec<TopBid>,
    pub teams: Vec<TeamStats>,
}

/// Highest-priced sold player who plays `sport`. Ties go to the earlier roster entry.
pub fn top_bid(players: &[Player], sport: Sport) -> Option<&Player> {
    players
        .iter()
        .filter(|p| p.is_sold() && p.plays(sport))
        .fold(None, |best: Option<&Player>, p| match best {
            Some(b) if b.price >= p.price => Some(b),
            _ => Some(p),
        })
}

pub fn dashboard(players: &[Player], config: &AuctionConfig) -> DashboardSummary {
    let teams = calculate_team_stats(players, config);
    let total_sold: usize = teams.iter().map(|t| t.count).sum();
    let total_slots = Team::ALL.len() * config.max_squad_size as usize;

    DashboardSummary {
        total_sold,
        total_slots,
        remaining: total_slots.saturating_sub(total_sold),
        top_bids: Sport::ALL
            .iter()
            .map(|sport| TopBid {
                sport: *sport,
                player: top_bid(players, *sport).cloned(),
            })
            .collect(),
        teams,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Grade;

    fn sold(id: u32, name: &str, team: Team, price: u32, grades: [Grade; 3]) -> Player {
        let mut p = Player::new(id, name, grades[0], grades[1], grades[2]);
        p.team = Some(team);
        p.price = price;
        p
    }

    #[test]
    fn test_empty_team_reserves_every_slot() {
        let config = AuctionConfig::default();
        let stats = team_stats(&[], &config, Team::AlfenRoyals);

        assert_eq!(stats.count, 0);
        assert_eq!(stats.spent, 0);
        assert_eq!(stats.empty_slots, 35);
        assert_eq!(stats.purse, 2500);
        assert_eq!(stats.disposable, 2150);
        assert_eq!(stats.max_bid(&config), 2160);
        assert!(!stats.is_full(&config));
    }

    #[test]
    fn test_spent_and_sport_counts() {
        let config = AuctionConfig::default();
        let players = vec![
            sold(1, "A", Team::LanternLegends, 100, [Grade::A, Grade::None, Grade::None]),
            sold(2, "B", Team::LanternLegends, 50, [Grade::B, Grade::C, Grade::None]),
            sold(3, "C", Team::TalukaFighters, 70, [Grade::None, Grade::None, Grade::A]),
            Player::new(4, "D", Grade::A, Grade::A, Grade::A),
        ];

        let stats = team_stats(&players, &config, Team::LanternLegends);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.spent, 150);
        assert_eq!(stats.cricket, 2);
        assert_eq!(stats.badminton, 1);
        assert_eq!(stats.tt, 0);
        assert_eq!(stats.sport_count(Sport::Cricket), 2);
        assert_eq!(stats.purse, 2350);
        assert_eq!(stats.disposable, 2350 - 33 * 10);
    }

    #[test]
    fn test_overfull_team_has_no_negative_slots() {
        let config = AuctionConfig::new(100, 2, 10).unwrap();
        let players: Vec<Player> = (1..=3)
            .map(|i| sold(i, "X", Team::AlfenRoyals, 40, [Grade::A, Grade::None, Grade::None]))
            .collect();

        let stats = team_stats(&players, &config, Team::AlfenRoyals);
        assert_eq!(stats.empty_slots, 0);
        assert_eq!(stats.disposable, -20);
        assert!(stats.is_full(&config));
    }

    #[test]
    fn test_disposable_non_increasing_as_team_buys() {
        let config = AuctionConfig::default();
        let mut players = Vec::new();
        let mut previous = team_stats(&players, &config, Team::PrimarkSuperkings).disposable;

        for (i, price) in [10u32, 25, 10, 300, 10].iter().enumerate() {
            players.push(sold(
                i as u32 + 1,
                "P",
                Team::PrimarkSuperkings,
                *price,
                [Grade::A, Grade::None, Grade::None],
            ));
            let now = team_stats(&players, &config, Team::PrimarkSuperkings).disposable;
            assert!(now <= previous, "disposable went up: {} -> {}", previous, now);
            previous = now;
        }
    }

    #[test]
    fn test_all_teams_in_fixed_order() {
        let stats = calculate_team_stats(&[], &AuctionConfig::default());
        let teams: Vec<Team> = stats.iter().map(|s| s.team).collect();
        assert_eq!(teams, Team::ALL.to_vec());
    }

    #[test]
    fn test_dashboard_totals_and_top_bids() {
        let config = AuctionConfig::default();
        let players = vec![
            sold(1, "Bat", Team::AlfenRoyals, 120, [Grade::A, Grade::None, Grade::None]),
            sold(2, "AllRounder", Team::TalukaFighters, 200, [Grade::B, Grade::B, Grade::None]),
            sold(3, "Tie", Team::LanternLegends, 200, [Grade::C, Grade::None, Grade::None]),
            Player::new(4, "Unsold TT", Grade::None, Grade::None, Grade::A),
        ];

        let summary = dashboard(&players, &config);
        assert_eq!(summary.total_sold, 3);
        assert_eq!(summary.total_slots, 210);
        assert_eq!(summary.remaining, 207);

        let cricket = summary.top_bids.iter().find(|t| t.sport == Sport::Cricket).unwrap();
        assert_eq!(cricket.player.as_ref().unwrap().name, "AllRounder");

        let tt = summary.top_bids.iter().find(|t| t.sport == Sport::TT).unwrap();
        assert!(tt.player.is_none());
    }
}
