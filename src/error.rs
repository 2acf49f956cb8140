// ⚠️ Error Types - validation, import and authentication failures
// All failures are recoverable values; nothing here terminates the process.

use crate::player::{PlayerId, Team};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuctionError {
    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------
    #[error("{team} is full ({count}/{max_squad_size})")]
    TeamFull {
        team: Team,
        count: usize,
        max_squad_size: u32,
    },

    #[error("Insufficient funds for {team}: bid {bid} exceeds max bid {max_bid}")]
    InsufficientFunds { team: Team, bid: u32, max_bid: i64 },

    #[error("No players match the selection criteria")]
    EmptySelectionPool,

    #[error("Price must be greater than zero")]
    InvalidPrice,

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is already sold")]
    PlayerAlreadySold(PlayerId),

    #[error("Player {0} is not sold")]
    PlayerNotSold(PlayerId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------
    #[error("Admin access required")]
    NotAuthenticated,

    #[error("Incorrect password")]
    AuthenticationFailed,

    // ------------------------------------------------------------------------
    // Import / IO
    // ------------------------------------------------------------------------
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuctionError {
    /// Short category name, used in logs and API responses
    pub fn kind(&self) -> &'static str {
        match self {
            AuctionError::TeamFull { .. } => "team_full",
            AuctionError::InsufficientFunds { .. } => "insufficient_funds",
            AuctionError::EmptySelectionPool => "empty_selection_pool",
            AuctionError::InvalidPrice => "invalid_price",
            AuctionError::PlayerNotFound(_) => "player_not_found",
            AuctionError::PlayerAlreadySold(_) => "player_already_sold",
            AuctionError::PlayerNotSold(_) => "player_not_sold",
            AuctionError::InvalidConfig(_) => "invalid_config",
            AuctionError::NotAuthenticated => "not_authenticated",
            AuctionError::AuthenticationFailed => "authentication_failed",
            AuctionError::Import(_) => "import",
            AuctionError::Csv(_) => "csv",
            AuctionError::Io(_) => "io",
            AuctionError::Serialization(_) => "serialization",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuctionError::NotAuthenticated | AuctionError::AuthenticationFailed
        )
    }
}

/// Reasons a player file is refused
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV missing required columns: {required:?} (missing: {missing:?})")]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Error parsing CSV at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("Duplicate player ID {id} at line {line}")]
    DuplicateId { id: u32, line: u64 },

    #[error("Line {line}: price and team must be set together (price {price}, team {team:?})")]
    InconsistentRow {
        line: u64,
        price: u32,
        team: Option<String>,
    },

    #[error("Line {line}: captain for {sport} but no team")]
    UnsoldCaptain { line: u64, sport: String },

    #[error("Error parsing CSV: {0}")]
    Parse(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AuctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_reason() {
        let full = AuctionError::TeamFull {
            team: Team::AlfenRoyals,
            count: 35,
            max_squad_size: 35,
        };
        assert_eq!(full.to_string(), "Alfen Royals is full (35/35)");
        assert_eq!(full.kind(), "team_full");

        let funds = AuctionError::InsufficientFunds {
            team: Team::TalukaFighters,
            bid: 2161,
            max_bid: 2160,
        };
        assert!(funds.to_string().contains("max bid 2160"));
    }

    #[test]
    fn test_import_error_lists_required_columns() {
        let err: AuctionError = ImportError::MissingColumns {
            required: vec!["Name".into(), "Cricket".into(), "Badminton".into(), "TT".into()],
            missing: vec!["TT".into()],
        }
        .into();

        let msg = err.to_string();
        assert!(msg.contains("Name"));
        assert!(msg.contains("missing: [\"TT\"]"));
        assert_eq!(err.kind(), "import");
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(AuctionError::NotAuthenticated.is_auth_failure());
        assert!(AuctionError::AuthenticationFailed.is_auth_failure());
        assert!(!AuctionError::InvalidPrice.is_auth_failure());
    }
}
