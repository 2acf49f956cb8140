use crate::audit::AuditCategory;
use crate::config::{AuctionConfig, Settings};
use crate::csv_io;
use crate::player::{Player, PlayerId, Sport, Team};
use crate::session::{AuctionSession, Command, Outcome, StateChange};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Console,
    Teams,
    Settings,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Console,
            Page::Console => Page::Teams,
            Page::Teams => Page::Settings,
            Page::Settings => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Settings,
            Page::Console => Page::Dashboard,
            Page::Teams => Page::Console,
            Page::Settings => Page::Teams,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "📊 Dashboard",
            Page::Console => "🔨 Auction Console",
            Page::Teams => "👥 Teams",
            Page::Settings => "⚙️ Settings",
        }
    }
}

/// What the prompt line is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Password,
    Search,
    Bid,
    CorrectionPrice,
    PurseLimit,
    MaxSquadSize,
    BasePrice,
    ImportPath,
    ExportPath,
}

impl InputField {
    fn label(&self) -> &'static str {
        match self {
            InputField::Password => "Password",
            InputField::Search => "Search Name",
            InputField::Bid => "Winning Bid",
            InputField::CorrectionPrice => "New Price",
            InputField::PurseLimit => "Purse Limit",
            InputField::MaxSquadSize => "Max Squad",
            InputField::BasePrice => "Base Price",
            InputField::ImportPath => "Import CSV from",
            InputField::ExportPath => "Export CSV to",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            InputField::Bid
                | InputField::CorrectionPrice
                | InputField::PurseLimit
                | InputField::MaxSquadSize
                | InputField::BasePrice
        )
    }
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub field: InputField,
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

pub struct App {
    pub session: AuctionSession,
    pub current_page: Page,
    pub unsold_state: TableState,
    pub team_state: TableState,
    pub roster_state: TableState,
    pub show_roster: bool,
    pub search: String,
    pub spin_sport: Option<Sport>,
    pub captain_sport: Sport,
    pub bid_team: Team,
    pub bid: u32,
    pub draft_config: AuctionConfig,
    pub input: Option<InputState>,
    pub flash: Option<Flash>,
    pub last_change: Option<StateChange>,
    pub should_quit: bool,
    /// Where saved auction rules are written back
    pub settings_path: Option<PathBuf>,
    changes: Receiver<StateChange>,
}

impl App {
    pub fn new(mut session: AuctionSession) -> Self {
        let (tx, rx) = mpsc::channel();
        session.subscribe(move |change| {
            let _ = tx.send(change.clone());
        });

        let mut unsold_state = TableState::default();
        if !session.unsold_players("").is_empty() {
            unsold_state.select(Some(0));
        }

        let mut team_state = TableState::default();
        team_state.select(Some(0));

        let draft_config = *session.config();
        let bid = draft_config.base_price;

        Self {
            session,
            current_page: Page::Dashboard,
            unsold_state,
            team_state,
            roster_state: TableState::default(),
            show_roster: false,
            search: String::new(),
            spin_sport: None,
            captain_sport: Sport::Cricket,
            bid_team: Team::ALL[0],
            bid,
            draft_config,
            input: None,
            flash: None,
            last_change: None,
            should_quit: false,
            settings_path: None,
            changes: rx,
        }
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Pull pending session notifications and re-clamp selections
    pub fn drain_changes(&mut self) {
        while let Ok(change) = self.changes.try_recv() {
            self.last_change = Some(change);
        }
        let unsold = self.unsold_list().len();
        clamp(&mut self.unsold_state, unsold);
        let roster = self.roster_list().len();
        clamp(&mut self.roster_state, roster);
    }

    pub fn unsold_list(&self) -> Vec<&Player> {
        self.session.unsold_players(&self.search)
    }

    pub fn selected_team(&self) -> Team {
        let i = self.team_state.selected().unwrap_or(0);
        Team::ALL[i.min(Team::ALL.len() - 1)]
    }

    pub fn roster_list(&self) -> Vec<&Player> {
        self.session.roster(self.selected_team())
    }

    fn highlighted_unsold(&self) -> Option<PlayerId> {
        self.unsold_state
            .selected()
            .and_then(|i| self.unsold_list().get(i).map(|p| p.id))
    }

    fn highlighted_roster(&self) -> Option<Player> {
        self.roster_state
            .selected()
            .and_then(|i| self.roster_list().get(i).map(|p| (*p).clone()))
    }

    /// Run a command and turn the result into a status message
    pub fn run(&mut self, command: Command) -> Option<Outcome> {
        let result = self.session.apply(command);
        self.drain_changes();
        match result {
            Ok(outcome) => {
                self.flash = Some(Flash::Success(outcome.message()));
                Some(outcome)
            }
            Err(e) => {
                self.flash = Some(Flash::Error(format!("❌ {}", e)));
                None
            }
        }
    }

    fn start_input(&mut self, field: InputField) {
        let buffer = match field {
            InputField::Search => self.search.clone(),
            _ => String::new(),
        };
        self.input = Some(InputState { field, buffer });
    }

    // ------------------------------------------------------------------------
    // Key handling
    // ------------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.input.is_some() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc if !self.show_roster => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.previous_page();
                return;
            }
            KeyCode::Tab => {
                self.next_page();
                return;
            }
            KeyCode::BackTab => {
                self.previous_page();
                return;
            }
            _ => {}
        }

        match self.current_page {
            Page::Dashboard => {}
            Page::Console => self.handle_console_key(key),
            Page::Teams => self.handle_teams_key(key),
            Page::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_console_key(&mut self, key: KeyEvent) {
        let len = self.unsold_list().len();
        let step = self.session.config().base_price.max(1);

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => next(&mut self.unsold_state, len),
            KeyCode::Up | KeyCode::Char('k') => previous(&mut self.unsold_state, len),
            KeyCode::Char('/') => self.start_input(InputField::Search),
            KeyCode::Char(' ') => {
                if let Some(id) = self.highlighted_unsold() {
                    self.run(Command::Select { player_id: id });
                }
            }
            KeyCode::Char('f') => {
                self.spin_sport = match self.spin_sport {
                    None => Some(Sport::Cricket),
                    Some(Sport::Cricket) => Some(Sport::Badminton),
                    Some(Sport::Badminton) => Some(Sport::TT),
                    Some(Sport::TT) => None,
                };
            }
            KeyCode::Char('r') => {
                let sport = self.spin_sport;
                self.run(Command::SpinRandom { sport, grade: None });
            }
            KeyCode::Left => self.bid_team = self.bid_team.previous(),
            KeyCode::Right => self.bid_team = self.bid_team.next(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.bid = self.bid.saturating_add(step),
            KeyCode::Char('-') => self.bid = self.bid.saturating_sub(step),
            KeyCode::Char('b') => self.start_input(InputField::Bid),
            KeyCode::Char('g') => {
                self.captain_sport = match self.captain_sport {
                    Sport::Cricket => Sport::Badminton,
                    Sport::Badminton => Sport::TT,
                    Sport::TT => Sport::Cricket,
                };
            }
            KeyCode::Enter => match self.session.selected_player().map(|p| p.id) {
                Some(player_id) => {
                    let command = Command::Sell {
                        player_id,
                        team: self.bid_team,
                        bid: self.bid,
                    };
                    if self.run(command).is_some() {
                        self.bid = self.session.config().base_price;
                    }
                }
                None => self.flash = Some(Flash::Error("Select a player to start bidding.".into())),
            },
            KeyCode::Char('c') => match self.session.selected_player().map(|p| p.id) {
                Some(player_id) => {
                    self.run(Command::AssignCaptain {
                        player_id,
                        team: self.bid_team,
                        sport: self.captain_sport,
                        price: self.bid,
                    });
                }
                None => self.flash = Some(Flash::Error("Select a player first.".into())),
            },
            _ => {}
        }
    }

    fn handle_teams_key(&mut self, key: KeyEvent) {
        if !self.show_roster {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => next(&mut self.team_state, Team::ALL.len()),
                KeyCode::Up | KeyCode::Char('k') => previous(&mut self.team_state, Team::ALL.len()),
                KeyCode::Enter => {
                    self.show_roster = true;
                    let len = self.roster_list().len();
                    self.roster_state.select(if len > 0 { Some(0) } else { None });
                }
                _ => {}
            }
            return;
        }

        let len = self.roster_list().len();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.show_roster = false,
            KeyCode::Down | KeyCode::Char('j') => next(&mut self.roster_state, len),
            KeyCode::Up | KeyCode::Char('k') => previous(&mut self.roster_state, len),
            KeyCode::Char('x') => {
                if let Some(player) = self.highlighted_roster() {
                    self.run(Command::Revert { player_id: player.id });
                }
            }
            KeyCode::Char('p') => {
                if self.highlighted_roster().is_some() {
                    self.start_input(InputField::CorrectionPrice);
                }
            }
            KeyCode::Left | KeyCode::Right => {
                if let Some(player) = self.highlighted_roster() {
                    let current = player.team.unwrap_or(self.selected_team());
                    let team = if key.code == KeyCode::Left {
                        current.previous()
                    } else {
                        current.next()
                    };
                    self.run(Command::UpdateSale {
                        player_id: player.id,
                        team,
                        price: player.price,
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        if !self.session.is_authenticated() {
            if let KeyCode::Char('l') | KeyCode::Enter = key.code {
                self.start_input(InputField::Password);
            }
            return;
        }

        match key.code {
            KeyCode::Char('o') => {
                self.session.logout();
                self.flash = None;
            }
            KeyCode::Char('1') => self.start_input(InputField::PurseLimit),
            KeyCode::Char('2') => self.start_input(InputField::MaxSquadSize),
            KeyCode::Char('3') => self.start_input(InputField::BasePrice),
            KeyCode::Char('s') => {
                let config = self.draft_config;
                if let Some(Outcome::ConfigSaved { config }) = self.run(Command::SaveConfig { config }) {
                    self.persist_config(config);
                }
            }
            KeyCode::Char('e') => self.start_input(InputField::ExportPath),
            KeyCode::Char('i') => self.start_input(InputField::ImportPath),
            _ => {}
        }
    }

    fn persist_config(&mut self, config: AuctionConfig) {
        let Some(path) = self.settings_path.clone() else {
            return;
        };
        if let Err(e) = Settings::store_auction(&path, config) {
            self.flash = Some(Flash::Error(format!("❌ Rules applied but not saved: {:#}", e)));
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => {
                if let Some(input) = self.input.take() {
                    self.submit_input(input);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.input.as_mut() {
                    input.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.input.as_mut() {
                    if !input.field.is_numeric() || c.is_ascii_digit() {
                        input.buffer.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn submit_input(&mut self, input: InputState) {
        let text = input.buffer.trim().to_string();
        let number = text.parse::<u32>().ok();

        match input.field {
            InputField::Password => match self.session.login(&input.buffer) {
                Ok(()) => self.flash = Some(Flash::Success("You are logged in as Admin.".into())),
                Err(e) => self.flash = Some(Flash::Error(format!("❌ {}", e))),
            },
            InputField::Search => {
                self.search = text;
                let len = self.unsold_list().len();
                self.unsold_state.select(if len > 0 { Some(0) } else { None });
            }
            InputField::Bid => {
                if let Some(n) = number {
                    self.bid = n;
                }
            }
            InputField::CorrectionPrice => {
                if let (Some(price), Some(player)) = (number, self.highlighted_roster()) {
                    let team = player.team.unwrap_or(self.selected_team());
                    self.run(Command::UpdateSale {
                        player_id: player.id,
                        team,
                        price,
                    });
                }
            }
            InputField::PurseLimit => {
                if let Some(n) = number {
                    self.draft_config.purse_limit = n;
                }
            }
            InputField::MaxSquadSize => {
                if let Some(n) = number {
                    self.draft_config.max_squad_size = n;
                }
            }
            InputField::BasePrice => {
                if let Some(n) = number {
                    self.draft_config.base_price = n;
                }
            }
            InputField::ImportPath => match std::fs::read_to_string(&text) {
                Ok(csv) => {
                    self.run(Command::Import { csv });
                }
                Err(e) => self.flash = Some(Flash::Error(format!("❌ Cannot read {}: {}", text, e))),
            },
            InputField::ExportPath => {
                match csv_io::export_file(Path::new(&text), self.session.players()) {
                    Ok(()) => self.flash = Some(Flash::Success(format!("Exported to {}", text))),
                    Err(e) => self.flash = Some(Flash::Error(format!("❌ {:#}", e))),
                }
            }
        }
    }
}

fn clamp(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

fn next(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    };
    state.select(Some(i));
}

fn previous(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    };
    state.select(Some(i));
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.drain_changes();
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::Console => render_console(f, chunks[1], app),
        Page::Teams => render_teams(f, chunks[1], app),
        Page::Settings => render_settings(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn table_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Dashboard, Page::Console, Page::Teams, Page::Settings];

    let mut tab_spans = vec![Span::styled(
        "🏆 ABCD Auction  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let summary = app.session.dashboard();
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Sold: {}/{}", summary.total_sold, summary.total_slots),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    if app.session.is_authenticated() {
        tab_spans.push(Span::styled("🔓 Admin", Style::default().fg(Color::Green)));
    } else {
        tab_spans.push(Span::styled("🔒 Viewer", Style::default().fg(Color::DarkGray)));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(7),
        ])
        .split(area);

    let summary = app.session.dashboard();

    // Top metrics
    let metric_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);

    let total = Paragraph::new(vec![
        Line::from(Span::styled(
            summary.total_sold.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} Remaining", summary.remaining),
            Style::default().fg(Color::Yellow),
        )),
    ])
    .block(table_block(" Total Sold "));
    f.render_widget(total, metric_chunks[0]);

    for (i, top) in summary.top_bids.iter().enumerate() {
        let title = match top.sport {
            Sport::Cricket => " 🏏 Top Cricketer ",
            Sport::Badminton => " 🏸 Top Shuttler ",
            Sport::TT => " 🏓 Top Paddler ",
        };
        let (value, name) = match &top.player {
            Some(p) => (format!("₹{}", p.price), p.name.clone()),
            None => ("-".to_string(), "No Bids".to_string()),
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(truncate(&name, 28)),
        ])
        .block(table_block(title));
        f.render_widget(card, metric_chunks[i + 1]);
    }

    // Standings
    let header = Row::new(
        ["Team", "Purse Left (₹)", "Squad Size", "🏏 Cricket", "🏸 Badminton", "🏓 TT"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = summary.teams.iter().map(|s| {
        let purse_color = if s.disposable > 0 { Color::Green } else { Color::Red };
        Row::new(vec![
            Cell::from(s.team.as_str()),
            Cell::from(format!("₹{}", s.disposable)).style(Style::default().fg(purse_color)),
            Cell::from(s.count.to_string()),
            Cell::from(s.cricket.to_string()),
            Cell::from(s.badminton.to_string()),
            Cell::from(s.tt.to_string()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(table_block(" Team Standings "));
    f.render_widget(table, chunks[1]);

    render_activity(f, chunks[2], app, 5);
}

fn render_activity(f: &mut Frame, area: Rect, app: &App, limit: usize) {
    let items: Vec<ListItem> = app
        .session
        .audit()
        .recent(limit)
        .map(|entry| {
            let color = match entry.category {
                AuditCategory::Sale => Color::Green,
                AuditCategory::Revert => Color::Red,
                AuditCategory::Captain => Color::Yellow,
                AuditCategory::Correction | AuditCategory::Info => Color::Cyan,
            };
            ListItem::new(Line::from(vec![
                Span::styled(entry.time_label(), Style::default().fg(Color::DarkGray)),
                Span::raw(format!(" {} ", entry.category.icon())),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items).block(table_block(" 📜 Recent Activity "));
    f.render_widget(list, area);
}

fn render_console(f: &mut Frame, area: Rect, app: &mut App) {
    if !app.session.is_authenticated() {
        let warning = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  🔒 Admin Access Required. Please login in Settings.",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        ])
        .block(table_block(" Auction Console "));
        f.render_widget(warning, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    // Left: unsold players
    let sport_label = app.spin_sport.map(|s| s.as_str()).unwrap_or("All");
    let title = if app.search.is_empty() {
        format!(" Unsold Players · Spin: {} ", sport_label)
    } else {
        format!(" Unsold matching '{}' · Spin: {} ", app.search, sport_label)
    };

    let selected_id = app.session.selected_player().map(|p| p.id);
    let rows: Vec<Row> = app
        .unsold_list()
        .iter()
        .map(|p| {
            let style = if Some(p.id) == selected_id {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(p.id.to_string()),
                Cell::from(truncate(&p.name, 26)),
                Cell::from(p.cricket.as_str()),
                Cell::from(p.badminton.as_str()),
                Cell::from(p.tt.as_str()),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(
        ["ID", "Name", "🏏", "🏸", "🏓"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray));

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ],
    )
    .header(header)
    .block(table_block(&title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[0], &mut app.unsold_state);

    // Right: hero card + bidding
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(chunks[1]);

    let Some(player) = app.session.selected_player() else {
        let info = Paragraph::new("  Select a player to start bidding (Space to pick, r to spin).")
            .block(table_block(" Player "));
        f.render_widget(info, chunks[1]);
        return;
    };

    let hero = Paragraph::new(vec![
        Line::from(Span::styled(
            player.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("PLAYER ID: {}", player.id),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("🏏 Cricket: {}", player.cricket), Style::default().fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled(format!("🏸 Badminton: {}", player.badminton), Style::default().fg(Color::Green)),
            Span::raw("   "),
            Span::styled(format!("🏓 TT: {}", player.tt), Style::default().fg(Color::Blue)),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    f.render_widget(hero, right[0]);

    let quote = app.session.quote(app.bid_team, app.bid);
    let verdict = match quote.decision() {
        Ok(()) => Span::styled(
            format!("✅ Budget OK. Remaining after bid: {}", quote.remaining_after_bid),
            Style::default().fg(Color::Green),
        ),
        Err(e) => Span::styled(format!("❌ {}", e), Style::default().fg(Color::Red)),
    };

    let bidding = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Winning Team: "),
            Span::styled(
                format!("◀ {} ▶", app.bid_team),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  ({}/{})", quote.count, quote.max_squad_size)),
        ]),
        Line::from(vec![
            Span::raw("Winning Bid:  "),
            Span::styled(
                format!("₹{}", app.bid),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  (Max Bid: {})", quote.max_bid)),
        ]),
        Line::from(""),
        Line::from(verdict),
        Line::from(""),
        Line::from(Span::styled(
            format!("Captain sport: {} {}", app.captain_sport.icon(), app.captain_sport),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(table_block(" 💰 Bidding "));
    f.render_widget(bidding, right[1]);
}

fn render_teams(f: &mut Frame, area: Rect, app: &mut App) {
    let config = *app.session.config();

    if app.show_roster {
        let team = app.selected_team();
        let stats = app.session.stats_for(team);
        let title = format!(
            " {} (Sold: {}/{}) - Purse: ₹{} - Spent: ₹{} ",
            team, stats.count, config.max_squad_size, stats.disposable, stats.spent
        );

        let header = Row::new(
            ["Name", "Price", "Cricket", "Badminton", "TT", "CaptainFor"]
                .iter()
                .map(|h| Cell::from(*h).style(header_style())),
        )
        .style(Style::default().bg(Color::DarkGray));

        let rows: Vec<Row> = app
            .roster_list()
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(truncate(&p.name, 28)),
                    Cell::from(format!("₹{}", p.price)),
                    Cell::from(p.cricket.as_str()),
                    Cell::from(p.badminton.as_str()),
                    Cell::from(p.tt.as_str()),
                    Cell::from(p.captain_for.map(|s| s.as_str()).unwrap_or("")),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(30),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Length(11),
                Constraint::Length(4),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(table_block(&title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

        f.render_stateful_widget(table, area, &mut app.roster_state);
        return;
    }

    let header = Row::new(
        ["Team", "Squad", "Spent", "Purse", "Disposable", "Cricket", "Badminton", "TT"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray));

    let rows: Vec<Row> = app
        .session
        .team_stats()
        .iter()
        .map(|s| {
            let squad_color = if s.is_full(&config) { Color::Red } else { Color::White };
            Row::new(vec![
                Cell::from(s.team.as_str()),
                Cell::from(format!("{}/{}", s.count, config.max_squad_size))
                    .style(Style::default().fg(squad_color)),
                Cell::from(format!("₹{}", s.spent)),
                Cell::from(format!("₹{}", s.purse)),
                Cell::from(format!("₹{}", s.disposable)),
                Cell::from(s.cricket.to_string()),
                Cell::from(s.badminton.to_string()),
                Cell::from(s.tt.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(4),
        ],
    )
    .header(header)
    .block(table_block(" Teams & Rosters "))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.team_state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let mut lines = vec![Line::from("")];
    if !app.session.is_authenticated() {
        lines.push(Line::from(Span::styled(
            "  Admin Login",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("l", Style::default().fg(Color::Yellow)),
            Span::raw(" to unlock"),
        ]));
    } else {
        let current = app.session.config();
        let draft = app.draft_config;
        let row = |key: &'static str, label: &'static str, now: u32, pending: u32| {
            let mut spans = vec![
                Span::raw("  "),
                Span::styled(key, Style::default().fg(Color::Yellow)),
                Span::raw(format!(". {:<12} {:>6}", label, now)),
            ];
            if now != pending {
                spans.push(Span::styled(
                    format!("  → {}", pending),
                    Style::default().fg(Color::Green),
                ));
            }
            Line::from(spans)
        };

        lines.push(Line::from(Span::styled(
            "  ✅ You are logged in as Admin.",
            Style::default().fg(Color::Green),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Tournament Config",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(row("1", "Purse Limit", current.purse_limit, draft.purse_limit));
        lines.push(row("2", "Max Squad", current.max_squad_size, draft.max_squad_size));
        lines.push(row("3", "Base Price", current.base_price, draft.base_price));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("s", Style::default().fg(Color::Yellow)),
            Span::raw(". Save Config"),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Data Management",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("e", Style::default().fg(Color::Yellow)),
            Span::raw(". Export Player Data (CSV)"),
        ]));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("i", Style::default().fg(Color::Yellow)),
            Span::raw(". Import / Overwrite Database"),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("o", Style::default().fg(Color::Red)),
            Span::raw(". Logout"),
        ]));
    }

    let panel = Paragraph::new(lines).block(table_block(" ⚙️ Settings & Admin "));
    f.render_widget(panel, chunks[0]);

    render_activity(f, chunks[1], app, crate::audit::AUDIT_LOG_CAPACITY);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(input) = &app.input {
        let shown = if input.field == InputField::Password {
            "•".repeat(input.buffer.chars().count())
        } else {
            input.buffer.clone()
        };
        status_spans.push(Span::styled(
            format!(" {}: ", input.field.label()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::styled(
            format!("{}█", shown),
            Style::default().fg(Color::White),
        ));
        status_spans.push(Span::raw("  | "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" OK | "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Cancel"));
    } else {
        match &app.flash {
            Some(Flash::Success(msg)) => {
                status_spans.push(Span::styled(format!(" {} ", msg), Style::default().fg(Color::Green)));
                status_spans.push(Span::raw("| "));
            }
            Some(Flash::Error(msg)) => {
                status_spans.push(Span::styled(format!(" {} ", msg), Style::default().fg(Color::Red)));
                status_spans.push(Span::raw("| "));
            }
            None => {}
        }

        let hints: &[(&str, &str)] = match app.current_page {
            Page::Dashboard => &[],
            Page::Console => &[
                ("Space", "Pick"),
                ("r/f", "Spin/Sport"),
                ("←/→", "Team"),
                ("+/-/b", "Bid"),
                ("Enter", "SOLD"),
                ("c/g", "Captain"),
                ("/", "Search"),
            ],
            Page::Teams if app.show_roster => &[
                ("x", "Revert"),
                ("p", "Price"),
                ("←/→", "Move"),
                ("Esc", "Back"),
            ],
            Page::Teams => &[("Enter", "Roster")],
            Page::Settings => &[],
        };
        for (key, label) in hints {
            status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(format!(" {} | ", label)));
        }

        status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Page | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEFAULT_PASSWORD;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
    }

    fn logged_in_app() -> App {
        let mut app = App::new(AuctionSession::default().with_seed(3));
        app.current_page = Page::Settings;
        app.handle_key(key(KeyCode::Char('l')));
        type_text(&mut app, DEFAULT_PASSWORD);
        assert!(app.session.is_authenticated());
        app
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Dashboard.next(), Page::Console);
        assert_eq!(Page::Settings.next(), Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::Settings);
    }

    #[test]
    fn test_wrong_password_flashes_error() {
        let mut app = App::new(AuctionSession::default());
        app.current_page = Page::Settings;
        app.handle_key(key(KeyCode::Char('l')));
        type_text(&mut app, "nope");

        assert!(!app.session.is_authenticated());
        assert_eq!(app.flash, Some(Flash::Error("❌ Incorrect password".into())));
    }

    #[test]
    fn test_console_sale_flow() {
        let mut app = logged_in_app();
        app.current_page = Page::Console;

        // pick the highlighted first unsold player, raise the bid, sell
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.selected_player().unwrap().id, PlayerId(1));

        app.handle_key(key(KeyCode::Char('b')));
        type_text(&mut app, "120");
        assert_eq!(app.bid, 120);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));

        let player = app.session.player(PlayerId(1)).unwrap();
        assert_eq!(player.team, Some(Team::AlfenRoyals));
        assert_eq!(player.price, 120);
        assert_eq!(app.bid, 10);
        assert!(matches!(app.flash, Some(Flash::Success(_))));
        assert_eq!(app.last_change.as_ref().unwrap().command, "sell");
        assert_eq!(app.unsold_list().len(), 4);
    }

    #[test]
    fn test_console_rejected_bid_keeps_player_unsold() {
        let mut app = logged_in_app();
        app.current_page = Page::Console;
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('b')));
        type_text(&mut app, "2161");
        app.handle_key(key(KeyCode::Enter));

        assert!(!app.session.player(PlayerId(1)).unwrap().is_sold());
        match &app.flash {
            Some(Flash::Error(msg)) => assert!(msg.contains("max bid 2160")),
            other => panic!("expected error flash, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_prompt_ignores_letters() {
        let mut app = logged_in_app();
        app.current_page = Page::Console;
        app.handle_key(key(KeyCode::Char('b')));
        type_text(&mut app, "4x2");
        assert_eq!(app.bid, 42);
    }

    #[test]
    fn test_search_filters_unsold_list() {
        let mut app = logged_in_app();
        app.current_page = Page::Console;
        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "sindhu");

        let names: Vec<_> = app.unsold_list().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["PV Sindhu"]);
    }

    #[test]
    fn test_roster_revert_and_move() {
        let mut app = logged_in_app();
        app.run(Command::Sell { player_id: PlayerId(2), team: Team::AdityaAvengers, bid: 50 });
        app.run(Command::Sell { player_id: PlayerId(3), team: Team::AdityaAvengers, bid: 60 });

        app.current_page = Page::Teams;
        app.handle_key(key(KeyCode::Enter));
        assert!(app.show_roster);
        assert_eq!(app.roster_list().len(), 2);

        // move the first rostered player to the next team
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.player(PlayerId(2)).unwrap().team, Some(Team::AlfenRoyals));
        assert_eq!(app.roster_list().len(), 1);

        // revert the remaining one
        app.handle_key(key(KeyCode::Char('x')));
        assert!(!app.session.player(PlayerId(3)).unwrap().is_sold());
        assert_eq!(app.roster_state.selected(), None);

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.show_roster);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_settings_save_config() {
        let mut app = logged_in_app();
        app.handle_key(key(KeyCode::Char('3')));
        type_text(&mut app, "25");
        assert_eq!(app.session.config().base_price, 10);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.session.config().base_price, 25);
    }

    #[test]
    fn test_saved_rules_reach_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auction.json");

        let mut app = logged_in_app().with_settings_path(&path);
        app.handle_key(key(KeyCode::Char('1')));
        type_text(&mut app, "3000");
        app.handle_key(key(KeyCode::Char('s')));

        assert!(matches!(app.flash, Some(Flash::Success(_))));
        let stored = Settings::from_file(&path).unwrap();
        assert_eq!(stored.auction.purse_limit, 3000);
        assert_eq!(stored.auction.base_price, 10);
    }

    #[test]
    fn test_selection_clamped_after_last_row_sold() {
        let mut app = logged_in_app();
        app.unsold_state.select(Some(4));

        app.run(Command::Sell { player_id: PlayerId(5), team: Team::LanternLegends, bid: 30 });
        assert_eq!(app.unsold_list().len(), 4);
        assert_eq!(app.unsold_state.selected(), Some(3));
    }

    #[test]
    fn test_console_locked_without_login() {
        let mut app = App::new(AuctionSession::default());
        app.current_page = Page::Console;
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.session.selected_player().is_none());

        let text = screen_text(&mut app);
        assert!(text.contains("Admin Access Required"));
    }

    #[test]
    fn test_every_page_renders() {
        let mut app = logged_in_app();
        app.run(Command::Sell { player_id: PlayerId(1), team: Team::TalukaFighters, bid: 99 });
        app.run(Command::Select { player_id: PlayerId(2) });

        for page in [Page::Dashboard, Page::Console, Page::Teams, Page::Settings] {
            app.current_page = page;
            let text = screen_text(&mut app);
            assert!(text.contains("ABCD Auction"));
        }

        app.current_page = Page::Dashboard;
        assert!(screen_text(&mut app).contains("Team Standings"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(AuctionSession::default());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ar. Abhishek Chandaliya", 10), "Ar. Abh...");
        assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
    }
}
