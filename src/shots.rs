use serde::{Deserialize, Serialize};

/// One detected shot, as produced by the ingest layer.
///
/// Coordinates use the 0..100 pitch frame with the attacked goal at (100, 50).
/// `xg` is always a finite number; shots without one never make it into a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    #[serde(default)]
    pub source_file: String,
    pub match_id: Option<u64>,
    pub event_id: Option<u64>,
    pub period: Option<String>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub timestamp: Option<String>,
    pub team_id: Option<u64>,
    pub team: Option<String>,
    pub opponent_id: Option<u64>,
    pub opponent: Option<String>,
    pub player_id: Option<u64>,
    pub player: Option<String>,
    pub player_pos: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub shot_type: Option<String>,
    pub body_part: Option<String>,
    #[serde(default)]
    pub is_goal: bool,
    #[serde(default)]
    pub is_penalty: bool,
    pub xg: f64,
}

impl ShotRecord {
    pub fn has_location(&self) -> bool {
        matches!((self.x, self.y), (Some(x), Some(y)) if x.is_finite() && y.is_finite())
    }
}

/// A match file the ingest layer could not read or parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadFile {
    pub file: String,
    pub error: String,
}
