// 📂 CSV Import / Export - the player table on disk
// Same column layout in both directions so an export can be re-imported as-is.

use crate::error::{ImportError, Result};
use crate::player::{Grade, Player, PlayerId, Sport, Team};
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Columns an import must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["Name", "Cricket", "Badminton", "TT"];

/// Full export header, in order
pub const EXPORT_COLUMNS: [&str; 8] = [
    "ID", "Name", "Team", "Price", "Cricket", "Badminton", "TT", "CaptainFor",
];

/// One row as it appears in the file
#[derive(Debug, Deserialize, Serialize)]
struct PlayerRecord {
    #[serde(rename = "ID", default)]
    id: Option<String>,

    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Team", default)]
    team: Option<String>,

    #[serde(rename = "Price", default)]
    price: Option<String>,

    #[serde(rename = "Cricket")]
    cricket: String,

    #[serde(rename = "Badminton")]
    badminton: String,

    #[serde(rename = "TT")]
    tt: String,

    #[serde(rename = "CaptainFor", default)]
    captain_for: Option<String>,
}

impl From<&Player> for PlayerRecord {
    fn from(p: &Player) -> Self {
        PlayerRecord {
            id: Some(p.id.0.to_string()),
            name: p.name.clone(),
            team: p.team.map(|t| t.as_str().to_string()),
            price: Some(p.price.to_string()),
            cricket: p.cricket.to_string(),
            badminton: p.badminton.to_string(),
            tt: p.tt.to_string(),
            captain_for: p.captain_for.map(|s| s.as_str().to_string()),
        }
    }
}

/// Blank cells count as absent
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts "120" and spreadsheet-style "120.0"
fn parse_whole_number(raw: &str) -> std::result::Result<u32, String> {
    if let Ok(n) = raw.parse::<u32>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(format!("'{}' is not a non-negative whole number", raw)),
    }
}

fn invalid(line: u64, message: impl Into<String>) -> ImportError {
    ImportError::InvalidRow {
        line,
        message: message.into(),
    }
}

fn record_to_player(record: PlayerRecord, line: u64, fallback_id: u32) -> std::result::Result<Player, ImportError> {
    let name = record.name.trim();
    if name.is_empty() {
        return Err(invalid(line, "Name is empty"));
    }

    let id = match non_blank(&record.id) {
        Some(raw) => parse_whole_number(raw).map_err(|e| invalid(line, format!("ID {}", e)))?,
        None => fallback_id,
    };
    if id == 0 {
        return Err(invalid(line, "ID must be positive"));
    }

    let team = non_blank(&record.team)
        .map(|raw| raw.parse::<Team>())
        .transpose()
        .map_err(|e| invalid(line, e))?;

    let price = non_blank(&record.price)
        .map(parse_whole_number)
        .transpose()
        .map_err(|e| invalid(line, format!("Price {}", e)))?
        .unwrap_or(0);

    if (price > 0) != team.is_some() {
        return Err(ImportError::InconsistentRow {
            line,
            price,
            team: team.map(|t| t.as_str().to_string()),
        });
    }

    let grade = |raw: &str, column: &str| {
        raw.parse::<Grade>()
            .map_err(|e| invalid(line, format!("{}: {}", column, e)))
    };

    let captain_for = non_blank(&record.captain_for)
        .map(|raw| raw.parse::<Sport>())
        .transpose()
        .map_err(|e| invalid(line, format!("CaptainFor: {}", e)))?;

    if let (Some(sport), None) = (captain_for, team) {
        return Err(ImportError::UnsoldCaptain {
            line,
            sport: sport.as_str().to_string(),
        });
    }

    Ok(Player {
        id: PlayerId(id),
        name: name.to_string(),
        team,
        price,
        cricket: grade(&record.cricket, "Cricket")?,
        badminton: grade(&record.badminton, "Badminton")?,
        tt: grade(&record.tt, "TT")?,
        captain_for,
    })
}

/// Parse a player table. Either every row is accepted or nothing is returned.
pub fn import_players<R: Read>(reader: R) -> std::result::Result<Vec<Player>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            required: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            missing,
        });
    }

    let mut players = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in rdr.records().enumerate() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(index as u64 + 2);

        let record: PlayerRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| invalid(line, e.to_string()))?;
        let player = record_to_player(record, line, index as u32 + 1)?;

        if !seen.insert(player.id) {
            return Err(ImportError::DuplicateId { id: player.id.0, line });
        }
        players.push(player);
    }

    tracing::debug!(count = players.len(), "parsed player table");
    Ok(players)
}

/// Write every player, one row each, with the full header
pub fn export_players<W: Write>(writer: W, players: &[Player]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    // an empty table still gets its header
    if players.is_empty() {
        wtr.write_record(EXPORT_COLUMNS)?;
    }
    for player in players {
        wtr.serialize(PlayerRecord::from(player))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_string(players: &[Player]) -> Result<String> {
    let mut buf = Vec::new();
    export_players(&mut buf, players)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn import_file(path: &Path) -> anyhow::Result<Vec<Player>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let players = import_players(file).with_context(|| format!("Failed to import {:?}", path))?;
    Ok(players)
}

pub fn export_file(path: &Path, players: &[Player]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    export_players(file, players)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
