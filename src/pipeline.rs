use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, bail};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EntropyConfig;
use crate::entropy::{shot_entropy, spatial_entropy_grid, type_entropy};
use crate::features::location_features;
use crate::shots::ShotRecord;
use crate::stability;

/// Identity of a player or team group. Missing ids and names are kept as-is,
/// so shots without a player id form their own group instead of vanishing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub id: Option<u64>,
    pub name: Option<String>,
}

impl GroupKey {
    // Present values sort before missing ones.
    fn sort_key(&self) -> (bool, Option<u64>, bool, Option<String>) {
        (
            self.id.is_none(),
            self.id,
            self.name.is_none(),
            self.name.clone(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ShotGroup<'a> {
    pub key: GroupKey,
    pub shots: Vec<&'a ShotRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_id: Option<u64>,
    pub player: Option<String>,
    pub shots: usize,
    pub xg: f64,
    pub xg_per_shot: f64,
    pub goals: usize,
    pub g_minus_xg: f64,

    pub shot_entropy: f64,
    pub spatial_entropy: f64,
    pub type_entropy: Option<f64>,

    pub box_shot_share: f64,
    pub central_box_share: f64,
    pub avg_dist_to_goal: Option<f64>,
    pub teams: String,

    pub stability: f64,
    pub xg_adj: f64,
    pub xg_adj_pct: f64,

    pub fox_in_box_flag: Option<bool>,
    pub rank: Option<u32>,
}

impl PlayerRow {
    pub fn display_name(&self) -> String {
        match (&self.player, self.player_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "(unknown)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    pub team_id: Option<u64>,
    pub team: Option<String>,
    pub shots: usize,
    pub xg: f64,
    pub xg_per_shot: f64,
    pub goals: usize,
    pub box_share: f64,
}

/// Fails when the table cannot be aggregated at all.
pub fn validate_shots(shots: &[ShotRecord]) -> Result<()> {
    if shots.is_empty() {
        bail!("no usable data: shot table is empty");
    }
    if let Some((idx, shot)) = shots.iter().enumerate().find(|(_, s)| !s.xg.is_finite()) {
        bail!(
            "no usable data: shot #{idx} from {:?} has non-finite xg {}",
            shot.source_file,
            shot.xg
        );
    }
    Ok(())
}

pub fn group_by_player(shots: &[ShotRecord]) -> Vec<ShotGroup<'_>> {
    group_by(shots, |s| GroupKey {
        id: s.player_id,
        name: s.player.clone(),
    })
}

pub fn group_by_team(shots: &[ShotRecord]) -> Vec<ShotGroup<'_>> {
    group_by(shots, |s| GroupKey {
        id: s.team_id,
        name: s.team.clone(),
    })
}

fn group_by<'a>(
    shots: &'a [ShotRecord],
    key_of: impl Fn(&ShotRecord) -> GroupKey,
) -> Vec<ShotGroup<'a>> {
    let mut groups: BTreeMap<_, ShotGroup<'a>> = BTreeMap::new();
    for shot in shots {
        let key = key_of(shot);
        groups
            .entry(key.sort_key())
            .or_insert_with(|| ShotGroup {
                key,
                shots: Vec::new(),
            })
            .shots
            .push(shot);
    }
    groups.into_values().collect()
}

/// One row per player, with stability fields filled in. Not ranked, not flagged.
pub fn compute_player_table(shots: &[ShotRecord], cfg: &EntropyConfig) -> Result<Vec<PlayerRow>> {
    validate_shots(shots)?;
    let groups = group_by_player(shots);
    let mut rows: Vec<PlayerRow> = groups
        .par_iter()
        .map(|group| summarize_player(group, cfg))
        .collect();
    stability::apply_stability(&mut rows, cfg);
    debug!(
        shots = shots.len(),
        players = rows.len(),
        grid_x = cfg.grid_x,
        grid_y = cfg.grid_y,
        "computed player table"
    );
    Ok(rows)
}

pub fn summarize_player(group: &ShotGroup<'_>, cfg: &EntropyConfig) -> PlayerRow {
    let shots = &group.shots;
    let n = shots.len();
    let xg: f64 = shots.iter().map(|s| s.xg).sum();
    let goals = shots.iter().filter(|s| s.is_goal).count();

    let mut inside = 0usize;
    let mut central = 0usize;
    let mut dist_sum = 0.0;
    let mut dist_n = 0usize;
    for shot in shots {
        let loc = location_features(shot);
        if loc.inside_box {
            inside += 1;
        }
        if loc.central_box {
            central += 1;
        }
        if let Some(d) = loc.dist_to_goal {
            dist_sum += d;
            dist_n += 1;
        }
    }

    let teams: BTreeSet<&str> = shots.iter().filter_map(|s| s.team.as_deref()).collect();

    PlayerRow {
        player_id: group.key.id,
        player: group.key.name.clone(),
        shots: n,
        xg,
        xg_per_shot: share(xg, n),
        goals,
        g_minus_xg: goals as f64 - xg,
        shot_entropy: shot_entropy(shots),
        spatial_entropy: spatial_entropy_grid(shots, cfg.grid_x, cfg.grid_y),
        type_entropy: type_entropy(shots),
        box_shot_share: share(inside as f64, n),
        central_box_share: share(central as f64, n),
        avg_dist_to_goal: (dist_n > 0).then(|| dist_sum / dist_n as f64),
        teams: teams.into_iter().collect::<Vec<_>>().join(", "),
        stability: 0.0,
        xg_adj: 0.0,
        xg_adj_pct: 0.0,
        fox_in_box_flag: None,
        rank: None,
    }
}

/// One row per team, ordered by xG then shot count, both descending.
pub fn team_summary(shots: &[ShotRecord]) -> Result<Vec<TeamRow>> {
    validate_shots(shots)?;
    let groups = group_by_team(shots);
    let mut rows: Vec<TeamRow> = groups.par_iter().map(summarize_team).collect();
    rows.sort_by(|a, b| b.xg.total_cmp(&a.xg).then(b.shots.cmp(&a.shots)));
    debug!(teams = rows.len(), "computed team summary");
    Ok(rows)
}

pub fn summarize_team(group: &ShotGroup<'_>) -> TeamRow {
    let shots = &group.shots;
    let n = shots.len();
    let xg: f64 = shots.iter().map(|s| s.xg).sum();
    let inside = shots.iter().filter(|s| location_features(s).inside_box).count();
    TeamRow {
        team_id: group.key.id,
        team: group.key.name.clone(),
        // Counts recorded events, so rows without an event id do not add to it.
        shots: shots.iter().filter(|s| s.event_id.is_some()).count(),
        xg,
        xg_per_shot: share(xg, n),
        goals: shots.iter().filter(|s| s.is_goal).count(),
        box_share: share(inside as f64, n),
    }
}

fn share(value: f64, n: usize) -> f64 {
    if n == 0 { 0.0 } else { value / n as f64 }
}
