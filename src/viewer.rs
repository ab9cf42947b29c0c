use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, TableState};

use xg_entropy::pipeline::{PlayerRow, TeamRow};
use xg_entropy::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Players,
    Chart,
    Teams,
}

struct Viewer<'a> {
    players: &'a [PlayerRow],
    teams: &'a [TeamRow],
    min_shots: usize,
    view: View,
    selected: usize,
    only_min_shots: bool,
    only_foxes: bool,
    should_quit: bool,
}

impl<'a> Viewer<'a> {
    fn new(players: &'a [PlayerRow], teams: &'a [TeamRow], min_shots: usize) -> Self {
        Self {
            players,
            teams,
            min_shots,
            view: View::Players,
            selected: 0,
            only_min_shots: true,
            only_foxes: false,
            should_quit: false,
        }
    }

    fn visible_players(&self) -> Vec<PlayerRow> {
        self.players
            .iter()
            .filter(|p| !self.only_min_shots || p.shots >= self.min_shots)
            .filter(|p| !self.only_foxes || p.fox_in_box_flag == Some(true))
            .cloned()
            .collect()
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Teams => self.teams.len(),
            View::Players | View::Chart => self.visible_players().len(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.switch(View::Players),
            KeyCode::Char('2') => self.switch(View::Chart),
            KeyCode::Char('3') => self.switch(View::Teams),
            KeyCode::Tab => self.switch(match self.view {
                View::Players => View::Chart,
                View::Chart => View::Teams,
                View::Teams => View::Players,
            }),
            KeyCode::Char('j') | KeyCode::Down => {
                let total = self.row_count();
                if total > 0 {
                    self.selected = (self.selected + 1).min(total - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char('m') => {
                self.only_min_shots = !self.only_min_shots;
                self.selected = 0;
            }
            KeyCode::Char('f') => {
                self.only_foxes = !self.only_foxes;
                self.selected = 0;
            }
            _ => {}
        }
    }

    fn switch(&mut self, view: View) {
        self.view = view;
        self.selected = 0;
    }
}

pub fn run(players: &[PlayerRow], teams: &[TeamRow], min_shots: usize) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut viewer = Viewer::new(players, teams, min_shots);
    let res = run_viewer(&mut terminal, &mut viewer);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_viewer<B: Backend>(terminal: &mut Terminal<B>, viewer: &mut Viewer<'_>) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, viewer))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    viewer.on_key(key);
                }
            }
        }

        if viewer.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, viewer: &Viewer<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(viewer)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match viewer.view {
        View::Players => render_players(frame, chunks[1], viewer),
        View::Chart => render_chart(frame, chunks[1], viewer),
        View::Teams => render_teams(frame, chunks[1], viewer),
    }

    let footer = Paragraph::new(
        "1 players  2 chart  3 teams  j/k move  m min-shots filter  f fox filter  q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn header_text(viewer: &Viewer<'_>) -> String {
    let view = match viewer.view {
        View::Players => "Players",
        View::Chart => "Adjusted xG",
        View::Teams => "Teams",
    };
    let mut filters = Vec::new();
    if viewer.only_min_shots {
        filters.push(format!("shots >= {}", viewer.min_shots));
    }
    if viewer.only_foxes {
        filters.push("fox-in-box only".to_string());
    }
    let filters = if filters.is_empty() {
        "no filters".to_string()
    } else {
        filters.join(", ")
    };
    format!(
        "xG entropy | {view} | {} players, {} teams | {filters}",
        viewer.players.len(),
        viewer.teams.len()
    )
}

fn render_players(frame: &mut Frame, area: Rect, viewer: &Viewer<'_>) {
    let rows = viewer.visible_players();
    let table = report::ranked_table(&rows, rows.len(), "Entropy-adjusted xG".to_string())
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(viewer.selected.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_teams(frame: &mut Frame, area: Rect, viewer: &Viewer<'_>) {
    let table = report::team_table(viewer.teams, "Team summary".to_string())
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default();
    if !viewer.teams.is_empty() {
        state.select(Some(viewer.selected.min(viewer.teams.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_chart(frame: &mut Frame, area: Rect, viewer: &Viewer<'_>) {
    let rows = viewer.visible_players();
    let visible = area.height.saturating_sub(2) as usize;
    let start = viewer.selected.min(rows.len().saturating_sub(visible.max(1)));
    let chart = report::xg_adj_bar_chart(
        &rows[start.min(rows.len())..],
        visible,
        "Top xG adjusted (unscaled)".to_string(),
    );
    frame.render_widget(chart, area);
}
