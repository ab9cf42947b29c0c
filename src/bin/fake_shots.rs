use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xg_entropy::fake_shots::{FakeDatasetConfig, fake_shot_table, write_fake_dataset};

const USAGE: &str = "\
usage: fake_shots --out DIR [options]

  --out DIR              dataset folder (match files go under DIR/season)
  --seed N               RNG seed (default 7)
  --teams N              number of clubs (default 8)
  --players N            shooters per club (default 5)
  --matches N            number of matches (default 120)
  --shots-per-match N    average shots per team per match (default 12)
  --penalty-rate P       share of shots that are penalties (default 0.02)
";

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{USAGE}");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xg_entropy=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let (out, cfg) = parse_args(&args)?;
    info!(out = %out.display(), seed = cfg.seed, matches = cfg.matches, "writing synthetic dataset");

    let files = write_fake_dataset(&out, &cfg)?;
    let shots = fake_shot_table(&cfg);
    let penalties = shots.iter().filter(|s| s.is_penalty).count();

    println!("Synthetic dataset written");
    println!("Dir: {}", out.join("season").display());
    println!("Match files: {files}");
    println!("Shots: {} (penalties: {penalties})", shots.len());
    println!("Players: {}", cfg.teams * cfg.players_per_team.max(1));
    Ok(())
}

fn parse_args(args: &[String]) -> Result<(PathBuf, FakeDatasetConfig)> {
    let mut out = None;
    let mut cfg = FakeDatasetConfig::default();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        let (flag, value) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => {
                idx += 1;
                (arg.as_str(), args.get(idx).cloned())
            }
        };
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("{flag} needs a value\n\n{USAGE}"))?;

        match flag {
            "--out" => out = Some(PathBuf::from(value)),
            "--seed" => cfg.seed = parse_num(flag, &value)?,
            "--teams" => cfg.teams = parse_num(flag, &value)?,
            "--players" => cfg.players_per_team = parse_num(flag, &value)?,
            "--matches" => cfg.matches = parse_num(flag, &value)?,
            "--shots-per-match" => cfg.shots_per_team_match = parse_num(flag, &value)?,
            "--penalty-rate" => {
                let rate: f64 = parse_num(flag, &value)?;
                if !(0.0..=1.0).contains(&rate) {
                    bail!("--penalty-rate must be within 0..=1, got {rate}");
                }
                cfg.penalty_rate = rate;
            }
            other => bail!("unknown argument {other}\n\n{USAGE}"),
        }
        idx += 1;
    }

    if cfg.teams < 2 {
        bail!("--teams must be at least 2");
    }
    let out = out.ok_or_else(|| anyhow!("--out is required\n\n{USAGE}"))?;
    Ok((out, cfg))
}

fn parse_num<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("{flag} expects a number, got {raw:?}"))
}
