use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;

use crate::config::RunConfig;
use crate::pipeline::{PlayerRow, TeamRow};
use crate::shots::{BadFile, ShotRecord};

pub struct ExportTables<'a> {
    pub shots: &'a [ShotRecord],
    pub players: &'a [PlayerRow],
    pub teams: &'a [TeamRow],
    pub bad_files: &'a [BadFile],
    pub run: &'a RunConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub shots: usize,
    pub players: usize,
    pub teams: usize,
    pub bad_files: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    fn text(v: Option<&str>) -> Self {
        v.map_or(Self::Empty, |s| Self::Text(s.to_string()))
    }

    fn number(v: f64) -> Self {
        if v.is_finite() { Self::Number(v) } else { Self::Empty }
    }

    fn opt_number(v: Option<f64>) -> Self {
        v.map_or(Self::Empty, Self::number)
    }

    fn opt_count<T: Into<f64>>(v: Option<T>) -> Self {
        v.map_or(Self::Empty, |n| Self::Number(n.into()))
    }
}

pub fn export_excel(path: &Path, tables: &ExportTables<'_>) -> Result<ExportReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }

    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let sheets: [(&str, &[&str], Vec<Vec<CellValue>>); 5] = [
        (
            "shots_raw",
            SHOT_COLUMNS,
            tables.shots.iter().map(shot_row).collect(),
        ),
        (
            "player_all",
            PLAYER_COLUMNS,
            tables.players.iter().map(player_row).collect(),
        ),
        (
            "team_summary",
            TEAM_COLUMNS,
            tables.teams.iter().map(team_row).collect(),
        ),
        (
            "bad_files",
            &["file", "error"],
            tables
                .bad_files
                .iter()
                .map(|b| vec![CellValue::Text(b.file.clone()), CellValue::Text(b.error.clone())])
                .collect(),
        ),
        ("run_info", &["key", "value"], run_info_rows(tables.run)),
    ];

    for (name, columns, rows) in &sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_header(sheet, columns, &header)?;
        write_rows(sheet, rows).with_context(|| format!("write sheet {name}"))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        shots: tables.shots.len(),
        players: tables.players.len(),
        teams: tables.teams.len(),
        bad_files: tables.bad_files.len(),
    })
}

const SHOT_COLUMNS: &[&str] = &[
    "source_file",
    "matchId",
    "eventId",
    "period",
    "minute",
    "second",
    "timestamp",
    "teamId",
    "team",
    "opponentId",
    "opponent",
    "playerId",
    "player",
    "playerPos",
    "x",
    "y",
    "shotType",
    "bodyPart",
    "isGoal",
    "isPenalty",
    "xg",
];

const PLAYER_COLUMNS: &[&str] = &[
    "Rank",
    "playerId",
    "player",
    "shots",
    "xg",
    "xg_per_shot",
    "goals",
    "g_minus_xg",
    "shot_entropy",
    "spatial_entropy",
    "type_entropy",
    "box_shot_share",
    "central_box_share",
    "avg_dist_to_goal",
    "teams",
    "stability",
    "xg_adj",
    "xg_adj_pct",
    "fox_in_box_flag",
];

const TEAM_COLUMNS: &[&str] = &[
    "teamId",
    "team",
    "shots",
    "xg",
    "xg_per_shot",
    "goals",
    "box_share",
];

fn id_cell(id: Option<u64>) -> CellValue {
    // Ids above 2^53 lose precision as numbers.
    match id {
        Some(v) if v < (1u64 << 53) => CellValue::Number(v as f64),
        Some(v) => CellValue::Text(v.to_string()),
        None => CellValue::Empty,
    }
}

pub fn shot_row(s: &ShotRecord) -> Vec<CellValue> {
    vec![
        CellValue::Text(s.source_file.clone()),
        id_cell(s.match_id),
        id_cell(s.event_id),
        CellValue::text(s.period.as_deref()),
        CellValue::opt_count(s.minute),
        CellValue::opt_count(s.second),
        CellValue::text(s.timestamp.as_deref()),
        id_cell(s.team_id),
        CellValue::text(s.team.as_deref()),
        id_cell(s.opponent_id),
        CellValue::text(s.opponent.as_deref()),
        id_cell(s.player_id),
        CellValue::text(s.player.as_deref()),
        CellValue::text(s.player_pos.as_deref()),
        CellValue::opt_number(s.x),
        CellValue::opt_number(s.y),
        CellValue::text(s.shot_type.as_deref()),
        CellValue::text(s.body_part.as_deref()),
        CellValue::Bool(s.is_goal),
        CellValue::Bool(s.is_penalty),
        CellValue::number(s.xg),
    ]
}

pub fn player_row(p: &PlayerRow) -> Vec<CellValue> {
    vec![
        CellValue::opt_count(p.rank),
        id_cell(p.player_id),
        CellValue::text(p.player.as_deref()),
        CellValue::number(p.shots as f64),
        CellValue::number(p.xg),
        CellValue::number(p.xg_per_shot),
        CellValue::number(p.goals as f64),
        CellValue::number(p.g_minus_xg),
        CellValue::number(p.shot_entropy),
        CellValue::number(p.spatial_entropy),
        CellValue::opt_number(p.type_entropy),
        CellValue::number(p.box_shot_share),
        CellValue::number(p.central_box_share),
        CellValue::opt_number(p.avg_dist_to_goal),
        CellValue::Text(p.teams.clone()),
        CellValue::number(p.stability),
        CellValue::number(p.xg_adj),
        CellValue::number(p.xg_adj_pct),
        p.fox_in_box_flag.map_or(CellValue::Empty, CellValue::Bool),
    ]
}

pub fn team_row(t: &TeamRow) -> Vec<CellValue> {
    vec![
        id_cell(t.team_id),
        CellValue::text(t.team.as_deref()),
        CellValue::number(t.shots as f64),
        CellValue::number(t.xg),
        CellValue::number(t.xg_per_shot),
        CellValue::number(t.goals as f64),
        CellValue::number(t.box_share),
    ]
}

/// Generation time plus the effective configuration, one `key`/`value` per row.
pub fn run_info_rows(run: &RunConfig) -> Vec<Vec<CellValue>> {
    let mut rows = vec![vec![
        CellValue::Text("generated_at".to_string()),
        CellValue::Text(Utc::now().to_rfc3339()),
    ]];
    let mut flat = Vec::new();
    if let Ok(value) = serde_json::to_value(run) {
        flatten_json("", &value, &mut flat);
    }
    rows.extend(
        flat.into_iter()
            .map(|(key, value)| vec![CellValue::Text(key), value]),
    );
    rows
}

fn flatten_json(prefix: &str, value: &Value, out: &mut Vec<(String, CellValue)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_json(&path, child, out);
            }
        }
        Value::Number(n) => out.push((
            prefix.to_string(),
            n.as_f64().map_or(CellValue::Empty, CellValue::number),
        )),
        Value::Bool(b) => out.push((prefix.to_string(), CellValue::Bool(*b))),
        Value::String(s) => out.push((prefix.to_string(), CellValue::Text(s.clone()))),
        Value::Null | Value::Array(_) => out.push((prefix.to_string(), CellValue::Empty)),
    }
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str], format: &Format) -> Result<()> {
    for (col_idx, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, *name, format)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<CellValue>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        for (col_idx, value) in row.iter().enumerate() {
            let c = col_idx as u16;
            match value {
                CellValue::Text(s) => worksheet.write_string(r, c, s).map(|_| ()),
                CellValue::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
                CellValue::Bool(b) => worksheet.write_boolean(r, c, *b).map(|_| ()),
                CellValue::Empty => Ok(()),
            }
            .with_context(|| format!("write cell ({r},{c})"))?;
        }
    }
    Ok(())
}
