use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, warn};

use crate::shots::{BadFile, ShotRecord};

const PENALTY_KEYS: &[&str] = &["isPenalty", "penalty", "fromPenalty", "is_penalty"];
const GOAL_KEYS: &[&str] = &["isGoal", "goal"];

#[derive(Debug, Clone, Default)]
pub struct LoadedShots {
    pub shots: Vec<ShotRecord>,
    pub bad_files: Vec<BadFile>,
    pub files_scanned: usize,
    pub penalties_dropped: usize,
}

/// Load every shot with an xG value from the match files under `root`.
///
/// Files that cannot be read or parsed are reported in `bad_files` and do not
/// stop the run. Finding no shots at all is an error.
pub fn load_shots(root: &Path, exclude_penalties: bool) -> Result<LoadedShots> {
    let files = iter_json_files(root)?;
    info!(files = files.len(), root = %root.display(), "loading match files");

    let parsed: Vec<(&PathBuf, Result<Vec<ShotRecord>>)> = files
        .par_iter()
        .map(|path| (path, extract_shots_from_file(path, root)))
        .collect();

    let mut shots = Vec::new();
    let mut bad_files = Vec::new();
    for (path, result) in parsed {
        match result {
            Ok(rows) => shots.extend(rows),
            Err(err) => {
                warn!(file = %path.display(), "skipping match file: {err:#}");
                bad_files.push(BadFile {
                    file: path.display().to_string(),
                    error: format!("{err:#}"),
                });
            }
        }
    }

    if shots.is_empty() {
        bail!("no shots with shot.xg found under {}", root.display());
    }

    let before = shots.len();
    if exclude_penalties {
        shots.retain(|s| !s.is_penalty);
    }
    let penalties_dropped = before - shots.len();
    info!(
        shots = shots.len(),
        penalties_dropped,
        bad_files = bad_files.len(),
        "loaded shots"
    );

    Ok(LoadedShots {
        shots,
        bad_files,
        files_scanned: files.len(),
        penalties_dropped,
    })
}

/// All `*.json` / `*.JSON` files below `root`, sorted.
///
/// Only `root` itself must be readable. Unreadable subdirectories are logged
/// and skipped, and symlinked directories are not followed.
pub fn iter_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).with_context(|| format!("scan {}", root.display()))?;
    let mut out = Vec::new();
    walk(entries, &mut out);
    out.sort();
    out.dedup();
    Ok(out)
}

fn walk(entries: fs::ReadDir, out: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable directory entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        // `DirEntry::file_type` does not follow symlinks.
        let Ok(kind) = entry.file_type() else {
            warn!(path = %path.display(), "skipping entry with unknown type");
            continue;
        };
        if kind.is_dir() {
            match fs::read_dir(&path) {
                Ok(children) => walk(children, out),
                Err(err) => warn!(dir = %path.display(), "skipping unreadable directory: {err}"),
            }
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "json" || e == "JSON")
        {
            out.push(path);
        }
    }
}

pub fn extract_shots_from_file(path: &Path, root: &Path) -> Result<Vec<ShotRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let rel = path.strip_prefix(root).unwrap_or(path);
    extract_shots_from_json(&raw, &rel.to_string_lossy())
}

/// Shot records from one match document. Events without a `shot` object or
/// without a numeric `shot.xg` are skipped.
pub fn extract_shots_from_json(raw: &str, source_file: &str) -> Result<Vec<ShotRecord>> {
    let root: Value = serde_json::from_str(raw).context("invalid match json")?;
    if !root.is_object() {
        return Err(anyhow!("match json root is not an object"));
    }
    let Some(events) = root.get("events").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for ev in events {
        let Some(shot) = ev.get("shot").filter(|s| s.is_object()) else {
            continue;
        };
        let Some(xg) = shot.get("xg").and_then(to_f64).filter(|v| v.is_finite()) else {
            continue;
        };

        rows.push(ShotRecord {
            source_file: source_file.to_string(),
            match_id: path_get(ev, "matchId").and_then(to_u64),
            event_id: path_get(ev, "id").and_then(to_u64),
            period: path_get(ev, "matchPeriod").and_then(to_text),
            minute: path_get(ev, "minute").and_then(to_u32),
            second: path_get(ev, "second").and_then(to_u32),
            timestamp: path_get(ev, "matchTimestamp").and_then(to_text),
            team_id: path_get(ev, "team.id").and_then(to_u64),
            team: path_get(ev, "team.name").and_then(to_text),
            opponent_id: path_get(ev, "opponentTeam.id").and_then(to_u64),
            opponent: path_get(ev, "opponentTeam.name").and_then(to_text),
            player_id: path_get(ev, "player.id").and_then(to_u64),
            player: path_get(ev, "player.name").and_then(to_text),
            player_pos: path_get(ev, "player.position").and_then(to_text),
            x: path_get(ev, "location.x").and_then(to_f64),
            y: path_get(ev, "location.y").and_then(to_f64),
            shot_type: shot.get("type").and_then(to_text),
            body_part: shot.get("bodyPart").and_then(to_text),
            is_goal: infer_is_goal(shot),
            is_penalty: infer_is_penalty(shot),
            xg,
        });
    }
    Ok(rows)
}

pub fn infer_is_goal(shot: &Value) -> bool {
    for key in GOAL_KEYS {
        match shot.get(*key) {
            None | Some(Value::Null) => continue,
            Some(v) => return truthy(v),
        }
    }
    shot.get("result")
        .and_then(Value::as_str)
        .is_some_and(|r| r.eq_ignore_ascii_case("goal"))
}

pub fn infer_is_penalty(shot: &Value) -> bool {
    for key in PENALTY_KEYS {
        match shot.get(*key) {
            Some(Value::Bool(b)) => return *b,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v == 0.0 => return false,
                Some(v) if v == 1.0 => return true,
                _ => {}
            },
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => return true,
                "false" => return false,
                _ => {}
            },
            _ => {}
        }
    }
    shot.get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.to_ascii_lowercase().starts_with("pen"))
}

fn path_get<'a>(v: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = v;
    for key in path.split('.') {
        cur = cur.as_object()?.get(key)?;
    }
    (!cur.is_null()).then_some(cur)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn to_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn to_u32(v: &Value) -> Option<u32> {
    to_u64(v).and_then(|n| u32::try_from(n).ok())
}

fn to_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
