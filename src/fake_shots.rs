use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::shots::ShotRecord;

#[derive(Debug, Clone, Copy)]
pub struct FakeDatasetConfig {
    pub seed: u64,
    pub teams: usize,
    pub players_per_team: usize,
    pub matches: usize,
    pub shots_per_team_match: usize,
    pub penalty_rate: f64,
}

impl Default for FakeDatasetConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            teams: 8,
            players_per_team: 5,
            matches: 120,
            shots_per_team_match: 12,
            penalty_rate: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Poacher,
    Roamer,
    LongRange,
}

#[derive(Debug, Clone)]
struct FakePlayer {
    id: u64,
    name: String,
    position: &'static str,
    profile: Profile,
    volume: f64,
}

#[derive(Debug, Clone)]
struct FakeTeam {
    id: u64,
    name: String,
    players: Vec<FakePlayer>,
}

/// A seeded synthetic season of shots with a mix of shooter profiles.
pub fn fake_shot_table(cfg: &FakeDatasetConfig) -> Vec<ShotRecord> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let teams = seed_teams(cfg);
    if teams.len() < 2 {
        return Vec::new();
    }

    let mut shots = Vec::new();
    let mut event_id = 1_000_000u64;
    for m in 0..cfg.matches {
        let match_id = 5_000 + m as u64;
        let home = m % teams.len();
        let away = (home + 1 + m / teams.len()) % teams.len();
        let away = if away == home { (home + 1) % teams.len() } else { away };

        for (team, opponent) in [(&teams[home], &teams[away]), (&teams[away], &teams[home])] {
            let n = rng.gen_range(cfg.shots_per_team_match / 2..=cfg.shots_per_team_match * 3 / 2);
            for _ in 0..n {
                let player = pick_player(&team.players, &mut rng);
                event_id += 1;
                let is_penalty = rng.gen_bool(cfg.penalty_rate.clamp(0.0, 1.0));
                shots.push(fake_shot(
                    &mut rng, match_id, event_id, team, opponent, player, is_penalty,
                ));
            }
        }
    }
    shots
}

/// Write the synthetic season as one Wyscout-style JSON document per match.
/// Returns the number of files written.
pub fn write_fake_dataset(dir: &Path, cfg: &FakeDatasetConfig) -> Result<usize> {
    let shots = fake_shot_table(cfg);
    let mut by_match: BTreeMap<u64, Vec<&ShotRecord>> = BTreeMap::new();
    for shot in &shots {
        by_match.entry(shot.match_id.unwrap_or_default()).or_default().push(shot);
    }

    let season_dir = dir.join("season");
    fs::create_dir_all(&season_dir)
        .with_context(|| format!("create dataset dir {}", season_dir.display()))?;
    for (match_id, match_shots) in &by_match {
        let doc = match_document(*match_id, match_shots);
        let path = season_dir.join(format!("match_{match_id}.json"));
        let raw = serde_json::to_string_pretty(&doc).context("serialize match document")?;
        fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(by_match.len())
}

pub fn match_document(match_id: u64, shots: &[&ShotRecord]) -> Value {
    let mut events: Vec<Value> = shots.iter().map(|s| shot_event(s)).collect();
    // A non-shot event so readers have something to skip.
    if let Some(first) = shots.first() {
        events.insert(
            0,
            json!({
                "id": first.event_id.unwrap_or_default().saturating_sub(1),
                "matchId": match_id,
                "type": {"primary": "pass"},
                "team": {"id": first.team_id, "name": first.team},
                "location": {"x": 50, "y": 50},
            }),
        );
    }
    json!({ "matchId": match_id, "events": events })
}

fn shot_event(s: &ShotRecord) -> Value {
    json!({
        "id": s.event_id,
        "matchId": s.match_id,
        "matchPeriod": s.period,
        "minute": s.minute,
        "second": s.second,
        "matchTimestamp": s.timestamp,
        "team": {"id": s.team_id, "name": s.team},
        "opponentTeam": {"id": s.opponent_id, "name": s.opponent},
        "player": {"id": s.player_id, "name": s.player, "position": s.player_pos},
        "location": {"x": s.x, "y": s.y},
        "shot": {
            "xg": s.xg,
            "type": s.shot_type,
            "bodyPart": s.body_part,
            "isGoal": s.is_goal,
            "isPenalty": s.is_penalty,
        },
    })
}

fn seed_teams(cfg: &FakeDatasetConfig) -> Vec<FakeTeam> {
    const CLUBS: &[&str] = &[
        "Northbridge", "Eastport", "Riverside", "Highmoor", "Kingsfield", "Westvale",
        "Ashford", "Marlow", "Brookhaven", "Stonegate",
    ];
    const PROFILES: [(Profile, &str, f64); 5] = [
        (Profile::Poacher, "CF", 3.0),
        (Profile::Roamer, "LW", 2.0),
        (Profile::Roamer, "RW", 1.5),
        (Profile::LongRange, "CM", 1.2),
        (Profile::LongRange, "CB", 0.4),
    ];

    (0..cfg.teams)
        .map(|t| {
            let club = CLUBS[t % CLUBS.len()];
            let name = if t < CLUBS.len() {
                format!("{club} FC")
            } else {
                format!("{club} FC {}", t / CLUBS.len() + 1)
            };
            let players = (0..cfg.players_per_team.max(1))
                .map(|p| {
                    let (profile, position, volume) = PROFILES[p % PROFILES.len()];
                    FakePlayer {
                        id: (t as u64 + 1) * 100 + p as u64,
                        name: format!("{club} {position} {}", p + 1),
                        position,
                        profile,
                        volume,
                    }
                })
                .collect();
            FakeTeam {
                id: 10 + t as u64,
                name,
                players,
            }
        })
        .collect()
}

fn pick_player<'a>(players: &'a [FakePlayer], rng: &mut StdRng) -> &'a FakePlayer {
    let total: f64 = players.iter().map(|p| p.volume).sum();
    let mut roll = rng.gen_range(0.0..total);
    for p in players {
        if roll < p.volume {
            return p;
        }
        roll -= p.volume;
    }
    &players[players.len() - 1]
}

fn fake_shot(
    rng: &mut StdRng,
    match_id: u64,
    event_id: u64,
    team: &FakeTeam,
    opponent: &FakeTeam,
    player: &FakePlayer,
    is_penalty: bool,
) -> ShotRecord {
    let (x, y, xg, shot_type, body_part) = if is_penalty {
        (89.0, 50.0, 0.76, "penalty", "right_foot")
    } else {
        match player.profile {
            Profile::Poacher => {
                let head = rng.gen_bool(0.35);
                (
                    rng.gen_range(88.0..99.0),
                    rng.gen_range(40.0..60.0),
                    rng.gen_range(0.10..0.45),
                    if head { "head" } else { "shot" },
                    if head { "head_or_other" } else { "right_foot" },
                )
            }
            Profile::Roamer => (
                rng.gen_range(68.0..98.0),
                rng.gen_range(15.0..85.0),
                rng.gen_range(0.03..0.30),
                if rng.gen_bool(0.2) { "volley" } else { "shot" },
                if rng.gen_bool(0.5) { "left_foot" } else { "right_foot" },
            ),
            Profile::LongRange => (
                rng.gen_range(62.0..83.0),
                rng.gen_range(25.0..75.0),
                rng.gen_range(0.01..0.08),
                if rng.gen_bool(0.1) { "free_kick" } else { "shot" },
                "right_foot",
            ),
        }
    };

    let minute = rng.gen_range(0..95u32);
    let second = rng.gen_range(0..60u32);
    ShotRecord {
        source_file: String::new(),
        match_id: Some(match_id),
        event_id: Some(event_id),
        period: Some(if minute < 45 { "1H" } else { "2H" }.to_string()),
        minute: Some(minute),
        second: Some(second),
        timestamp: Some(format!("00:{minute:02}:{second:02}.000")),
        team_id: Some(team.id),
        team: Some(team.name.clone()),
        opponent_id: Some(opponent.id),
        opponent: Some(opponent.name.clone()),
        player_id: Some(player.id),
        player: Some(player.name.clone()),
        player_pos: Some(player.position.to_string()),
        x: Some(round2(x)),
        y: Some(round2(y)),
        shot_type: Some(shot_type.to_string()),
        body_part: Some(body_part.to_string()),
        is_goal: rng.gen_bool(xg),
        is_penalty,
        xg: round2(xg),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{FakeDatasetConfig, fake_shot_table};

    #[test]
    fn same_seed_same_table() {
        let cfg = FakeDatasetConfig {
            matches: 10,
            ..Default::default()
        };
        assert_eq!(fake_shot_table(&cfg), fake_shot_table(&cfg));
    }

    #[test]
    fn shots_are_well_formed() {
        let shots = fake_shot_table(&FakeDatasetConfig::default());
        assert!(!shots.is_empty());
        for s in &shots {
            assert!(s.xg.is_finite() && (0.0..=1.0).contains(&s.xg));
            assert!(s.has_location());
            assert_ne!(s.team_id, s.opponent_id);
        }
    }
}
