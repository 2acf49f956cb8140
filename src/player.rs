// 🏏 Player Model - typed roster records
// Players, teams, sports and grades for the multi-sport auction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GRADE
// ============================================================================

/// Per-sport skill tier. `None` is written as "0" (does not play the sport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    A,
    B,
    C,
    None,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::None => "0",
        }
    }

    /// True for A, B and C.
    pub fn is_playing(&self) -> bool {
        !matches!(self, Grade::None)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            // spreadsheets leave blank cells for missing grades
            "0" | "" => Ok(Grade::None),
            other => Err(format!("unknown grade '{}' (expected A, B, C or 0)", other)),
        }
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.as_str().to_string()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// SPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Cricket,
    Badminton,
    TT,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Cricket, Sport::Badminton, Sport::TT];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Cricket => "Cricket",
            Sport::Badminton => "Badminton",
            Sport::TT => "TT",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Sport::Cricket => "🏏",
            Sport::Badminton => "🏸",
            Sport::TT => "🏓",
        }
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cricket" => Ok(Sport::Cricket),
            "badminton" => Ok(Sport::Badminton),
            "tt" | "table tennis" => Ok(Sport::TT),
            other => Err(format!("unknown sport '{}'", other)),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// TEAM
// ============================================================================

/// The six franchises of the event. A grouping key, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Team {
    AdityaAvengers,
    AlfenRoyals,
    LanternLegends,
    PrimarkSuperkings,
    SaiKripaSoldiers,
    TalukaFighters,
}

impl Team {
    pub const ALL: [Team; 6] = [
        Team::AdityaAvengers,
        Team::AlfenRoyals,
        Team::LanternLegends,
        Team::PrimarkSuperkings,
        Team::SaiKripaSoldiers,
        Team::TalukaFighters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::AdityaAvengers => "Aditya Avengers",
            Team::AlfenRoyals => "Alfen Royals",
            Team::LanternLegends => "Lantern Legends",
            Team::PrimarkSuperkings => "Primark Superkings",
            Team::SaiKripaSoldiers => "Sai Kripa Soldiers",
            Team::TalukaFighters => "Taluka Fighters",
        }
    }

    /// Position in `Team::ALL`
    pub fn index(&self) -> usize {
        Team::ALL
            .iter()
            .position(|t| t == self)
            .unwrap_or_default()
    }

    pub fn next(&self) -> Team {
        Team::ALL[(self.index() + 1) % Team::ALL.len()]
    }

    pub fn previous(&self) -> Team {
        Team::ALL[(self.index() + Team::ALL.len() - 1) % Team::ALL.len()]
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Team::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown team '{}'", wanted))
    }
}

impl TryFrom<String> for Team {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Team> for String {
    fn from(team: Team) -> Self {
        team.as_str().to_string()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// Stable player identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One auction entrant.
///
/// Invariant: `price > 0` exactly when `team` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Option<Team>,
    pub price: u32,
    pub cricket: Grade,
    pub badminton: Grade,
    pub tt: Grade,
    pub captain_for: Option<Sport>,
}

impl Player {
    /// New unsold player
    pub fn new(id: u32, name: &str, cricket: Grade, badminton: Grade, tt: Grade) -> Self {
        Player {
            id: PlayerId(id),
            name: name.to_string(),
            team: None,
            price: 0,
            cricket,
            badminton,
            tt,
            captain_for: None,
        }
    }

    pub fn grade(&self, sport: Sport) -> Grade {
        match sport {
            Sport::Cricket => self.cricket,
            Sport::Badminton => self.badminton,
            Sport::TT => self.tt,
        }
    }

    pub fn plays(&self, sport: Sport) -> bool {
        self.grade(sport).is_playing()
    }

    pub fn is_sold(&self) -> bool {
        self.team.is_some()
    }

    pub fn is_consistent(&self) -> bool {
        (self.price > 0) == self.team.is_some()
    }

    /// Case-insensitive substring match on the name. Empty terms match all.
    pub fn matches_name(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }

    pub fn status(&self) -> &'static str {
        if self.is_sold() {
            "SOLD"
        } else {
            "UNSOLD"
        }
    }
}

/// Roster used when no file has been imported
pub fn seed_players() -> Vec<Player> {
    vec![
        Player::new(1, "Ar. Abhishek Chandaliya", Grade::A, Grade::B, Grade::None),
        Player::new(2, "Virat K", Grade::A, Grade::None, Grade::None),
        Player::new(3, "PV Sindhu", Grade::None, Grade::A, Grade::None),
        Player::new(4, "Sharath Kamal", Grade::None, Grade::None, Grade::A),
        Player::new(5, "Amit Jain", Grade::B, Grade::B, Grade::B),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_parsing() {
        assert_eq!("A".parse::<Grade>().unwrap(), Grade::A);
        assert_eq!(" c ".parse::<Grade>().unwrap(), Grade::C);
        assert_eq!("0".parse::<Grade>().unwrap(), Grade::None);
        assert_eq!("".parse::<Grade>().unwrap(), Grade::None);
        assert!("D".parse::<Grade>().is_err());

        assert!(Grade::B.is_playing());
        assert!(!Grade::None.is_playing());
        assert_eq!(Grade::None.to_string(), "0");
    }

    #[test]
    fn test_team_names_round_trip() {
        for team in Team::ALL {
            assert_eq!(team.as_str().parse::<Team>().unwrap(), team);
        }
        assert_eq!("alfen royals".parse::<Team>().unwrap(), Team::AlfenRoyals);
        assert!("Mumbai Indians".parse::<Team>().is_err());
    }

    #[test]
    fn test_team_cycling_wraps() {
        assert_eq!(Team::TalukaFighters.next(), Team::AdityaAvengers);
        assert_eq!(Team::AdityaAvengers.previous(), Team::TalukaFighters);
        assert_eq!(Team::LanternLegends.index(), 2);
    }

    #[test]
    fn test_sport_parsing() {
        assert_eq!("tt".parse::<Sport>().unwrap(), Sport::TT);
        assert_eq!("Cricket".parse::<Sport>().unwrap(), Sport::Cricket);
        assert!("Hockey".parse::<Sport>().is_err());
    }

    #[test]
    fn test_player_helpers() {
        let mut p = Player::new(7, "Amit Jain", Grade::B, Grade::None, Grade::C);
        assert!(p.plays(Sport::Cricket));
        assert!(!p.plays(Sport::Badminton));
        assert!(p.matches_name("amit"));
        assert!(p.matches_name("  "));
        assert!(!p.matches_name("virat"));
        assert!(p.is_consistent());
        assert_eq!(p.status(), "UNSOLD");

        p.team = Some(Team::AlfenRoyals);
        assert!(!p.is_consistent());
        p.price = 40;
        assert!(p.is_consistent());
        assert_eq!(p.status(), "SOLD");
    }

    #[test]
    fn test_seed_players_are_unsold_and_unique() {
        let players = seed_players();
        assert_eq!(players.len(), 5);
        assert!(players.iter().all(|p| !p.is_sold() && p.is_consistent()));

        let mut ids: Vec<_> = players.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
