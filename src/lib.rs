// Auction Ledger - Core Library
// Exposes all modules for use in the TUI, the API server, and tests

pub mod player;
pub mod config;
pub mod auth;
pub mod audit;
pub mod error;
pub mod stats;
pub mod validator;
pub mod csv_io;
pub mod session;
pub mod logging;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use player::{seed_players, Grade, Player, PlayerId, Sport, Team};
pub use config::{AuctionConfig, Settings};
pub use auth::{hash_password, OperatorAuth, DEFAULT_PASSWORD};
pub use audit::{AuditCategory, AuditEntry, AuditLog, AUDIT_LOG_CAPACITY};
pub use error::{AuctionError, ImportError};
pub use stats::{calculate_team_stats, dashboard, team_stats, DashboardSummary, TeamStats, TopBid};
pub use validator::{quote_sale, validate_sale, SaleQuote};
pub use csv_io::{export_file, export_players, export_to_string, import_file, import_players};
pub use session::{AuctionSession, Command, Outcome, StateChange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
