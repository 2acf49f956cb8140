// 🔨 Auction Session - the ledger and everything that changes it
//
// One explicit session object owns the roster, the rules, the audit log and
// the operator login. Front-ends send `Command`s and read derived state back;
// they never touch the roster directly.

use crate::audit::{AuditCategory, AuditLog};
use crate::auth::OperatorAuth;
use crate::config::{AuctionConfig, Settings};
use crate::csv_io;
use crate::error::{AuctionError, Result};
use crate::player::{seed_players, Grade, Player, PlayerId, Sport, Team};
use crate::stats::{self, DashboardSummary, TeamStats};
use crate::validator::{self, SaleQuote};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Hammer down: sell an unsold player after budget/slot validation
    Sell {
        player_id: PlayerId,
        team: Team,
        bid: u32,
    },
    /// Return a sold player to the pool
    Revert { player_id: PlayerId },
    /// Operator override of team/price, no budget checks
    UpdateSale {
        player_id: PlayerId,
        team: Team,
        price: u32,
    },
    /// Pre-auction captain pick, no budget checks
    AssignCaptain {
        player_id: PlayerId,
        team: Team,
        sport: Sport,
        price: u32,
    },
    /// Replace the roster with a CSV table
    Import { csv: String },
    Export,
    SaveConfig { config: AuctionConfig },
    /// Draw a random unsold player as the active selection
    SpinRandom {
        #[serde(default)]
        sport: Option<Sport>,
        #[serde(default)]
        grade: Option<Grade>,
    },
    Select { player_id: PlayerId },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Sell { .. } => "sell",
            Command::Revert { .. } => "revert",
            Command::UpdateSale { .. } => "update_sale",
            Command::AssignCaptain { .. } => "assign_captain",
            Command::Import { .. } => "import",
            Command::Export => "export",
            Command::SaveConfig { .. } => "save_config",
            Command::SpinRandom { .. } => "spin_random",
            Command::Select { .. } => "select",
        }
    }

    /// Export is read-only; everything else needs the operator
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Command::Export)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Sold { player: Player, quote: SaleQuote },
    Reverted { player: Player, previous_team: Team },
    Updated { player: Player },
    CaptainAssigned { player: Player },
    Imported { count: usize },
    Exported { csv: String },
    ConfigSaved { config: AuctionConfig },
    Selected { player: Player },
}

impl Outcome {
    /// Human readable confirmation line
    pub fn message(&self) -> String {
        match self {
            Outcome::Sold { player, .. } => format!(
                "SOLD: {} to {} for {}",
                player.name,
                player.team.map(|t| t.as_str()).unwrap_or("-"),
                player.price
            ),
            Outcome::Reverted { player, .. } => format!("Player {} is now Unsold!", player.name),
            Outcome::Updated { .. } => "Updated!".to_string(),
            Outcome::CaptainAssigned { .. } => "Captain Assigned!".to_string(),
            Outcome::Imported { count } => format!("Loaded {} players.", count),
            Outcome::Exported { .. } => "Export ready".to_string(),
            Outcome::ConfigSaved { .. } => "Configuration Saved!".to_string(),
            Outcome::Selected { player } => format!("Selected: {}", player.name),
        }
    }

    fn changes_state(&self) -> bool {
        !matches!(self, Outcome::Exported { .. })
    }
}

/// Sent to subscribers after every command that changed the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub revision: u64,
    pub command: &'static str,
    pub message: String,
}

type Subscriber = Box<dyn FnMut(&StateChange) + Send>;

// ============================================================================
// SESSION
// ============================================================================

pub struct AuctionSession {
    players: Vec<Player>,
    config: AuctionConfig,
    audit: AuditLog,
    auth: OperatorAuth,
    selected: Option<PlayerId>,
    revision: u64,
    rng: StdRng,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for AuctionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuctionSession")
            .field("players", &self.players.len())
            .field("config", &self.config)
            .field("audit", &self.audit.len())
            .field("authenticated", &self.auth.is_authenticated())
            .field("selected", &self.selected)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl AuctionSession {
    pub fn new(players: Vec<Player>, config: AuctionConfig, auth: OperatorAuth) -> Self {
        AuctionSession {
            players,
            config,
            audit: AuditLog::new(),
            auth,
            selected: None,
            revision: 0,
            rng: StdRng::from_os_rng(),
            subscribers: Vec::new(),
        }
    }

    /// Session built from the settings file; `players` defaults to the seed roster
    pub fn from_settings(settings: &Settings, players: Option<Vec<Player>>) -> Self {
        Self::new(
            players.unwrap_or_else(seed_players),
            settings.auction,
            OperatorAuth::new(settings.operator_password_sha256.clone()),
        )
    }

    /// Fixed RNG seed, for reproducible random draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ------------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------------

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.selected.and_then(|id| self.player(id))
    }

    pub fn team_stats(&self) -> Vec<TeamStats> {
        stats::calculate_team_stats(&self.players, &self.config)
    }

    pub fn stats_for(&self, team: Team) -> TeamStats {
        stats::team_stats(&self.players, &self.config, team)
    }

    pub fn dashboard(&self) -> DashboardSummary {
        stats::dashboard(&self.players, &self.config)
    }

    /// Preview a bid without committing it
    pub fn quote(&self, team: Team, bid: u32) -> SaleQuote {
        validator::quote_sale(&self.players, &self.config, team, bid)
    }

    pub fn unsold_players(&self, search: &str) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| !p.is_sold() && p.matches_name(search))
            .collect()
    }

    pub fn sold_players(&self, search: &str) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.is_sold() && p.matches_name(search))
            .collect()
    }

    pub fn roster(&self, team: Team) -> Vec<&Player> {
        self.players.iter().filter(|p| p.team == Some(team)).collect()
    }

    /// `price > 0` exactly when a team is set, for every player
    pub fn is_consistent(&self) -> bool {
        self.players.iter().all(Player::is_consistent)
    }

    // ------------------------------------------------------------------------
    // Operator login
    // ------------------------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn login(&mut self, password: &str) -> Result<()> {
        match self.auth.login(password) {
            Ok(()) => {
                tracing::info!("operator logged in");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("operator login failed");
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        tracing::info!("operator logged out");
    }

    /// Check the operator password without logging this session in.
    /// Front-ends with several clients keep their own per-client grants.
    pub fn verify_password(&self, password: &str) -> Result<()> {
        self.auth.verify(password).inspect_err(|_| {
            tracing::warn!("operator password rejected");
        })
    }

    // ------------------------------------------------------------------------
    // Write side
    // ------------------------------------------------------------------------

    /// Register a presentation-layer callback for state changes
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Apply one command. Failed commands leave the session untouched.
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        let authorized = self.auth.is_authenticated();
        self.apply_authorized(command, authorized)
    }

    /// Apply one command on behalf of a caller whose login was checked
    /// elsewhere; the session's own login flag is ignored.
    pub fn apply_authorized(&mut self, command: Command, authorized: bool) -> Result<Outcome> {
        let name = command.name();

        let result = if command.requires_auth() && !authorized {
            Err(AuctionError::NotAuthenticated)
        } else {
            self.execute(command)
        };

        match &result {
            Ok(outcome) => {
                tracing::info!(command = name, "{}", outcome.message());
                if outcome.changes_state() {
                    self.revision += 1;
                    let change = StateChange {
                        revision: self.revision,
                        command: name,
                        message: outcome.message(),
                    };
                    for subscriber in self.subscribers.iter_mut() {
                        subscriber(&change);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(command = name, kind = e.kind(), "command rejected: {}", e);
            }
        }

        result
    }

    fn execute(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Sell { player_id, team, bid } => self.sell(player_id, team, bid),
            Command::Revert { player_id } => self.revert(player_id),
            Command::UpdateSale { player_id, team, price } => self.update_sale(player_id, team, price),
            Command::AssignCaptain {
                player_id,
                team,
                sport,
                price,
            } => self.assign_captain(player_id, team, sport, price),
            Command::Import { csv } => self.import(&csv),
            Command::Export => Ok(Outcome::Exported {
                csv: csv_io::export_to_string(&self.players)?,
            }),
            Command::SaveConfig { config } => self.save_config(config),
            Command::SpinRandom { sport, grade } => self.spin_random(sport, grade),
            Command::Select { player_id } => self.select(player_id),
        }
    }

    fn index_of(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(AuctionError::PlayerNotFound(id))
    }

    fn unsold_index(&self, id: PlayerId) -> Result<usize> {
        let idx = self.index_of(id)?;
        if self.players[idx].is_sold() {
            return Err(AuctionError::PlayerAlreadySold(id));
        }
        Ok(idx)
    }

    fn sold_index(&self, id: PlayerId) -> Result<usize> {
        let idx = self.index_of(id)?;
        if !self.players[idx].is_sold() {
            return Err(AuctionError::PlayerNotSold(id));
        }
        Ok(idx)
    }

    fn sell(&mut self, id: PlayerId, team: Team, bid: u32) -> Result<Outcome> {
        let idx = self.unsold_index(id)?;
        let quote = validator::validate_sale(&self.players, &self.config, team, bid)?;

        let player = &mut self.players[idx];
        player.team = Some(team);
        player.price = bid;
        let player = player.clone();

        self.audit.record(
            format!("SOLD: {} to {} for {}", player.name, team, bid),
            AuditCategory::Sale,
        );
        if self.selected == Some(id) {
            self.selected = None;
        }

        Ok(Outcome::Sold { player, quote })
    }

    fn revert(&mut self, id: PlayerId) -> Result<Outcome> {
        let idx = self.sold_index(id)?;

        let player = &mut self.players[idx];
        let previous_team = player.team.take().ok_or(AuctionError::PlayerNotSold(id))?;
        player.price = 0;
        player.captain_for = None;
        let player = player.clone();

        self.audit.record(
            format!("REVERT: {} removed from {}", player.name, previous_team),
            AuditCategory::Revert,
        );

        Ok(Outcome::Reverted {
            player,
            previous_team,
        })
    }

    fn update_sale(&mut self, id: PlayerId, team: Team, price: u32) -> Result<Outcome> {
        let idx = self.sold_index(id)?;
        if price == 0 {
            return Err(AuctionError::InvalidPrice);
        }

        let player = &mut self.players[idx];
        player.team = Some(team);
        player.price = price;
        let player = player.clone();

        self.audit.record(
            format!("CORRECTION: {} updated to {} @ {}", player.name, team, price),
            AuditCategory::Correction,
        );

        Ok(Outcome::Updated { player })
    }

    fn assign_captain(&mut self, id: PlayerId, team: Team, sport: Sport, price: u32) -> Result<Outcome> {
        let idx = self.unsold_index(id)?;
        if price == 0 {
            return Err(AuctionError::InvalidPrice);
        }

        if let Some(existing) = self
            .players
            .iter()
            .find(|p| p.team == Some(team) && p.captain_for == Some(sport))
        {
            tracing::warn!(
                team = %team,
                sport = %sport,
                existing = %existing.name,
                "team already has a captain for this sport"
            );
        }

        let player = &mut self.players[idx];
        player.team = Some(team);
        player.price = price;
        player.captain_for = Some(sport);
        let player = player.clone();

        self.audit.record(
            format!("CAPTAIN: {} assigned to {} ({})", player.name, team, sport),
            AuditCategory::Captain,
        );
        if self.selected == Some(id) {
            self.selected = None;
        }

        Ok(Outcome::CaptainAssigned { player })
    }

    fn import(&mut self, csv: &str) -> Result<Outcome> {
        let players = csv_io::import_players(csv.as_bytes())?;
        let count = players.len();

        self.players = players;
        self.selected = None;
        self.audit
            .record(format!("IMPORT: loaded {} players", count), AuditCategory::Info);

        Ok(Outcome::Imported { count })
    }

    fn save_config(&mut self, config: AuctionConfig) -> Result<Outcome> {
        config.validate()?;
        self.config = config;
        self.audit.record(
            format!(
                "CONFIG: purse {}, squad {}, base {}",
                config.purse_limit, config.max_squad_size, config.base_price
            ),
            AuditCategory::Info,
        );
        Ok(Outcome::ConfigSaved { config })
    }

    fn spin_random(&mut self, sport: Option<Sport>, grade: Option<Grade>) -> Result<Outcome> {
        if let Some(grade) = grade {
            // Accepted for compatibility with the picker UI; the pool ignores it.
            tracing::warn!(grade = %grade, "grade filter is not applied to random selection");
        }

        let pool: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_sold() && sport.map_or(true, |s| p.plays(s)))
            .map(|(i, _)| i)
            .collect();

        if pool.is_empty() {
            return Err(AuctionError::EmptySelectionPool);
        }

        let pick = pool[self.rng.random_range(0..pool.len())];
        let player = self.players[pick].clone();
        self.selected = Some(player.id);

        Ok(Outcome::Selected { player })
    }

    fn select(&mut self, id: PlayerId) -> Result<Outcome> {
        let idx = self.unsold_index(id)?;
        let player = self.players[idx].clone();
        self.selected = Some(id);
        Ok(Outcome::Selected { player })
    }
}

impl Default for AuctionSession {
    fn default() -> Self {
        Self::new(seed_players(), AuctionConfig::default(), OperatorAuth::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
