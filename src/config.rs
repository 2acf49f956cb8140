// ⚙️ Configuration - auction rules + settings file
// Rules are data: loaded from JSON, replaced wholesale on save

use crate::auth::{hash_password, DEFAULT_PASSWORD};
use crate::error::{AuctionError, Result};
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// AUCTION CONFIG
// ============================================================================

/// Tournament rules applied to every stats computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionConfig {
    pub purse_limit: u32,
    pub max_squad_size: u32,
    pub base_price: u32,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        AuctionConfig {
            purse_limit: 2500,
            max_squad_size: 35,
            base_price: 10,
        }
    }
}

impl AuctionConfig {
    pub fn new(purse_limit: u32, max_squad_size: u32, base_price: u32) -> Result<Self> {
        let config = AuctionConfig {
            purse_limit,
            max_squad_size,
            base_price,
        };
        config.validate()?;
        Ok(config)
    }

    /// All three values must be positive
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.purse_limit == 0 {
            problems.push("purse limit must be positive");
        }
        if self.max_squad_size == 0 {
            problems.push("max squad size must be positive");
        }
        if self.base_price == 0 {
            problems.push("base price must be positive");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AuctionError::InvalidConfig(problems.join(", ")))
        }
    }
}

// ============================================================================
// SETTINGS FILE
// ============================================================================

fn default_server_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_password_digest() -> String {
    hash_password(DEFAULT_PASSWORD)
}

/// Everything the binaries read at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub auction: AuctionConfig,

    /// SHA-256 hex digest of the shared operator password
    #[serde(default = "default_password_digest")]
    pub operator_password_sha256: String,

    /// Player file loaded at startup instead of the seed roster
    #[serde(default)]
    pub players_csv: Option<PathBuf>,

    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auction: AuctionConfig::default(),
            operator_password_sha256: default_password_digest(),
            players_csv: None,
            server_addr: default_server_addr(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        let settings: Settings =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;
        settings
            .auction
            .validate()
            .context("Settings file contains invalid auction rules")?;

        Ok(settings)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = ?path.as_ref(), "settings file not found, using defaults");
            Ok(Settings::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Write new auction rules into the settings file, keeping its other fields
    pub fn store_auction<P: AsRef<Path>>(path: P, config: AuctionConfig) -> anyhow::Result<()> {
        let mut settings = Self::load_or_default(path.as_ref())?;
        settings.auction = config;
        settings.save(path.as_ref())?;
        tracing::info!(path = ?path.as_ref(), "auction rules saved to settings file");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
