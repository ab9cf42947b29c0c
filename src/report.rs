//! Text renderings of the ranked player table and its charts.
//!
//! Widgets are built once and can be drawn either into a live terminal frame
//! (the viewer) or into an off-screen buffer that is dumped as plain text.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Row, Table, Widget};

use crate::pipeline::{PlayerRow, TeamRow};

pub const TABLE_TOP_N: usize = 25;
pub const BAR_TOP_N: usize = 20;
pub const STACKED_TOP_N: usize = 15;

const TABLE_WIDTH: u16 = 150;
const CHART_WIDTH: u16 = 100;

pub const PLAYER_HEADERS: [&str; 11] = [
    "Rank",
    "player",
    "teams",
    "shots",
    "xg",
    "xg_adj",
    "xg_adj_pct",
    "stability",
    "goals",
    "g_minus_xg",
    "fox",
];

const PLAYER_WIDTHS: [Constraint; 11] = [
    Constraint::Length(5),
    Constraint::Length(26),
    Constraint::Length(28),
    Constraint::Length(7),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Length(10),
    Constraint::Length(9),
    Constraint::Length(6),
    Constraint::Length(10),
    Constraint::Length(4),
];

pub const TEAM_HEADERS: [&str; 6] = ["team", "shots", "xg", "xg_per_shot", "goals", "box_share"];

const TEAM_WIDTHS: [Constraint; 6] = [
    Constraint::Length(28),
    Constraint::Length(7),
    Constraint::Length(8),
    Constraint::Length(11),
    Constraint::Length(6),
    Constraint::Length(9),
];

/// Display strings for one ranked player, in `PLAYER_HEADERS` order.
pub fn player_cells(row: &PlayerRow) -> [String; 11] {
    [
        row.rank.map(|r| fmt_int(r as usize)).unwrap_or_default(),
        row.display_name(),
        row.teams.clone(),
        fmt_int(row.shots),
        fmt_num(row.xg),
        fmt_num(row.xg_adj),
        fmt_num(row.xg_adj_pct),
        fmt_num(row.stability),
        fmt_int(row.goals),
        fmt_num(row.g_minus_xg),
        if row.fox_in_box_flag == Some(true) {
            "FOX".to_string()
        } else {
            String::new()
        },
    ]
}

pub fn team_cells(row: &TeamRow) -> [String; 6] {
    [
        row.team
            .clone()
            .or_else(|| row.team_id.map(|id| format!("#{id}")))
            .unwrap_or_else(|| "(unknown)".to_string()),
        fmt_int(row.shots),
        fmt_num(row.xg),
        fmt_num(row.xg_per_shot),
        fmt_int(row.goals),
        fmt_num(row.box_share),
    ]
}

pub fn ranked_table<'a>(rows: &[PlayerRow], top_n: usize, title: String) -> Table<'a> {
    let body: Vec<Row<'a>> = rows
        .iter()
        .take(top_n)
        .map(|r| Row::new(player_cells(r)))
        .collect();
    Table::new(body, PLAYER_WIDTHS)
        .header(header_row(&PLAYER_HEADERS))
        .block(Block::default().borders(Borders::ALL).title(title))
}

pub fn team_table<'a>(rows: &[TeamRow], title: String) -> Table<'a> {
    let body: Vec<Row<'a>> = rows.iter().map(|r| Row::new(team_cells(r))).collect();
    Table::new(body, TEAM_WIDTHS)
        .header(header_row(&TEAM_HEADERS))
        .block(Block::default().borders(Borders::ALL).title(title))
}

fn header_row<'a>(headers: &[&'a str]) -> Row<'a> {
    Row::new(headers.iter().copied())
        .style(Style::default().add_modifier(Modifier::BOLD))
}

/// Horizontal bars of adjusted xG, highest first.
pub fn xg_adj_bar_chart<'a>(rows: &[PlayerRow], top_n: usize, title: String) -> BarChart<'a> {
    let bars: Vec<Bar<'a>> = rows
        .iter()
        .take(top_n)
        .map(|r| {
            Bar::default()
                .value(hundredths(r.xg_adj))
                .label(Line::from(r.display_name()))
                .text_value(format!("{:.2}", r.xg_adj))
                .style(Style::default().fg(Color::Green))
        })
        .collect();
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
}

/// Trusted (adjusted) xG next to the flexible remainder, one group per player.
pub fn core_flexible_chart<'a>(rows: &[PlayerRow], top_n: usize, title: String) -> BarChart<'a> {
    let mut chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1);
    for r in rows.iter().take(top_n) {
        let flexible = (r.xg - r.xg_adj).max(0.0);
        let core = Bar::default()
            .value(hundredths(r.xg_adj))
            .label(Line::from(r.display_name()))
            .text_value(format!("{:.2}", r.xg_adj))
            .style(Style::default().fg(Color::Green));
        let flex = Bar::default()
            .value(hundredths(flexible))
            .label(Line::from("  flexible"))
            .text_value(format!("{flexible:.2}"))
            .style(Style::default().fg(Color::Yellow));
        chart = chart.data(BarGroup::default().bars(&[core, flex]));
    }
    chart
}

/// Draw a widget into an off-screen buffer and return its text, one line per row.
pub fn render_to_text<W: Widget>(widget: W, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width.max(1), height.max(1));
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);

    let mut out = String::new();
    for line in buf.content.chunks(area.width as usize) {
        let text: String = line.iter().map(|cell| cell.symbol()).collect();
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out
}

/// Write the three text reports for players with at least `min_shots` shots.
///
/// `rows` is expected to be ranked already.
pub fn write_reports(out_dir: &Path, rows: &[PlayerRow], min_shots: usize) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create report dir {}", out_dir.display()))?;

    let table_n = rows.len().min(TABLE_TOP_N);
    let bar_n = rows.len().min(BAR_TOP_N);
    let stacked_n = rows.len().min(STACKED_TOP_N);

    let reports = [
        (
            format!("ft_table_{min_shots}plus.txt"),
            render_to_text(
                ranked_table(
                    rows,
                    TABLE_TOP_N,
                    format!("Entropy-adjusted xG (unscaled), shots >= {min_shots}"),
                ),
                TABLE_WIDTH,
                table_n as u16 + 3,
            ),
        ),
        (
            format!("bar_xg_adj_{min_shots}plus.txt"),
            render_to_text(
                xg_adj_bar_chart(rows, BAR_TOP_N, "Top xG adjusted (unscaled)".to_string()),
                CHART_WIDTH,
                bar_n as u16 + 2,
            ),
        ),
        (
            format!("stacked_core_flexible_{min_shots}plus.txt"),
            render_to_text(
                core_flexible_chart(rows, STACKED_TOP_N, "Trusted vs Flexible xG".to_string()),
                CHART_WIDTH,
                (stacked_n as u16 * 3).saturating_sub(1).max(1) + 2,
            ),
        ),
    ];

    let mut written = Vec::with_capacity(reports.len());
    for (name, text) in reports {
        let path = out_dir.join(name);
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn hundredths(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        (v * 100.0).round() as u64
    } else {
        0
    }
}

pub fn fmt_num(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        String::new()
    }
}

/// Integer with thousands separators.
pub fn fmt_int(v: usize) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{fmt_int, fmt_num, render_to_text};
    use ratatui::widgets::{Block, Borders, Paragraph};

    #[test]
    fn thousands_separators() {
        assert_eq!(fmt_int(0), "0");
        assert_eq!(fmt_int(999), "999");
        assert_eq!(fmt_int(1000), "1,000");
        assert_eq!(fmt_int(1234567), "1,234,567");
    }

    #[test]
    fn non_finite_numbers_render_blank() {
        assert_eq!(fmt_num(f64::NAN), "");
        assert_eq!(fmt_num(1.005), "1.00");
    }

    #[test]
    fn off_screen_render_keeps_text() {
        let text = render_to_text(
            Paragraph::new("hello").block(Block::default().borders(Borders::ALL)),
            12,
            3,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("hello"));
    }
}
