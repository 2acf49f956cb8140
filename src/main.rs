use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use auction_ledger::{csv_io, export_file, import_file, logging, AuctionSession, Settings};

#[derive(Debug, Parser)]
#[command(name = "auction-ledger", version, about = "Live sports-auction ledger")]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(long, default_value = "auction.json")]
    settings: PathBuf,

    /// Player CSV to load instead of the seed roster
    #[arg(long)]
    players: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Interactive auctioneer dashboard (default)
    Tui,
    /// Print team standings
    Stats,
    /// Write the player table to a CSV file
    Export { out: PathBuf },
    /// Validate a player CSV without loading it
    Check { csv: PathBuf },
}

fn load_session(cli: &Cli) -> Result<AuctionSession> {
    let settings = Settings::load_or_default(&cli.settings)?;

    let players_path = cli.players.clone().or_else(|| settings.players_csv.clone());
    let players = match players_path {
        Some(path) => {
            let players = import_file(&path)?;
            tracing::info!(count = players.len(), path = ?path, "loaded players");
            Some(players)
        }
        None => None,
    };

    Ok(AuctionSession::from_settings(&settings, players))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; logging would draw over it
    if !matches!(cli.command, None | Some(Mode::Tui)) {
        logging::init(cli.verbose, false);
    }

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None | Some(Mode::Tui) => run_ui_mode(load_session(cli)?, &cli.settings)?,
        Some(Mode::Stats) => print_stats(&load_session(cli)?),
        Some(Mode::Export { out }) => run_export(&load_session(cli)?, out)?,
        // needs no session
        Some(Mode::Check { csv }) => run_check(csv)?,
    }

    Ok(())
}

fn print_stats(session: &AuctionSession) {
    let config = session.config();
    let summary = session.dashboard();

    println!("📊 Team Standings");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{:<22} {:>7} {:>8} {:>8} {:>11} {:>4} {:>4} {:>4}",
        "Team", "Squad", "Spent", "Purse", "Disposable", "🏏", "🏸", "🏓"
    );
    for s in &summary.teams {
        println!(
            "{:<22} {:>3}/{:<3} {:>8} {:>8} {:>11} {:>4} {:>4} {:>4}",
            s.team, s.count, config.max_squad_size, s.spent, s.purse, s.disposable, s.cricket, s.badminton, s.tt
        );
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Total Sold: {} ({} remaining of {} slots)",
        summary.total_sold, summary.remaining, summary.total_slots
    );
    for top in &summary.top_bids {
        match &top.player {
            Some(p) => println!("{} Top {}: {} @ ₹{}", top.sport.icon(), top.sport, p.name, p.price),
            None => println!("{} Top {}: No Bids", top.sport.icon(), top.sport),
        }
    }
}

fn run_export(session: &AuctionSession, out: &Path) -> Result<()> {
    export_file(out, session.players())?;
    println!("✓ Exported {} players to {:?}", session.players().len(), out);
    Ok(())
}

fn run_check(path: &Path) -> Result<()> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    match csv_io::import_players(file) {
        Ok(players) => {
            let sold = players.iter().filter(|p| p.is_sold()).count();
            println!("✓ {:?} is valid: {} players ({} sold)", path, players.len(), sold);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(session: AuctionSession, settings_path: &Path) -> Result<()> {
    println!("🖥️  Loading Auction Ledger UI...\n");

    let mut app = auction_ledger::ui::App::new(session).with_settings_path(settings_path);
    auction_ledger::ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_session: AuctionSession, _settings_path: &Path) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin auction-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_ignores_broken_player_roster() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.csv");
        fs::write(&broken, "Name,Cricket\nRohit,A\n").unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "Name,Cricket,Badminton,TT\nRohit,A,0,0\n").unwrap();

        let settings = dir.path().join("auction.json");
        let cli = Cli::parse_from([
            "auction-ledger",
            "--settings",
            settings.to_str().unwrap(),
            "--players",
            broken.to_str().unwrap(),
            "check",
            good.to_str().unwrap(),
        ]);
        assert!(run(&cli).is_ok());

        // modes that need the roster still report it
        let out = dir.path().join("out.csv");
        let cli = Cli::parse_from([
            "auction-ledger",
            "--settings",
            settings.to_str().unwrap(),
            "--players",
            broken.to_str().unwrap(),
            "export",
            out.to_str().unwrap(),
        ]);
        assert!(run(&cli).is_err());
        assert!(!out.exists());
    }
}
