use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;

use xg_entropy::config::RunConfig;
use xg_entropy::export::{ExportTables, export_excel};
use xg_entropy::fake_shots::{FakeDatasetConfig, fake_shot_table};
use xg_entropy::ingest::{LoadedShots, load_shots};
use xg_entropy::stability::filter_min_shots;
use xg_entropy::{add_fox_in_box_flag, compute_player_table, rank_players, report, team_summary};

mod viewer;

const USAGE: &str = "\
usage: xg_entropy --root DIR --out-xlsx FILE [options]

  --root DIR           folder containing match JSON files (searched recursively)
  --out-xlsx FILE      output workbook path
  --out-dir DIR        also write text reports into DIR
  --min-shots N        min shots for the ranked view and reports (default 250)
  --no-exclude-pens    keep penalty shots
  --grid-x N           spatial entropy grid columns (default 6)
  --grid-y N           spatial entropy grid rows (default 4)
  --config FILE        JSON run config (entropy, fox, min_shots)
  --demo               use a synthetic dataset instead of --root
  --tui                browse the results in the terminal after exporting
";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    root: Option<PathBuf>,
    out_xlsx: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    min_shots: Option<usize>,
    no_exclude_pens: bool,
    grid_x: Option<usize>,
    grid_y: Option<usize>,
    config: Option<PathBuf>,
    demo: bool,
    tui: bool,
    help: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1).collect())?;
    if args.help {
        print!("{USAGE}");
        return Ok(());
    }
    init_tracing(args.tui)?;

    let run = resolve_run_config(&args)?;
    let out_xlsx = args
        .out_xlsx
        .clone()
        .ok_or_else(|| anyhow!("--out-xlsx is required\n\n{USAGE}"))?;

    let loaded = if args.demo {
        demo_shots(run.entropy.exclude_penalties)
    } else {
        let root = args
            .root
            .clone()
            .ok_or_else(|| anyhow!("--root is required (or pass --demo)\n\n{USAGE}"))?;
        load_shots(&root, run.entropy.exclude_penalties)?
    };

    let players = compute_player_table(&loaded.shots, &run.entropy)?;
    let players = rank_players(add_fox_in_box_flag(players, &run.fox));
    let players_min = filter_min_shots(&players, run.min_shots);
    let teams = team_summary(&loaded.shots)?;

    let report = export_excel(
        &out_xlsx,
        &ExportTables {
            shots: &loaded.shots,
            players: &players,
            teams: &teams,
            bad_files: &loaded.bad_files,
            run: &run,
        },
    )?;
    info!(path = %out_xlsx.display(), "workbook written");

    let mut report_files = Vec::new();
    if let Some(dir) = &args.out_dir {
        report_files = report::write_reports(dir, &players_min, run.min_shots)?;
    }

    println!("xG entropy run complete");
    println!("Workbook: {}", out_xlsx.display());
    println!("Files scanned: {}", loaded.files_scanned);
    println!(
        "Shots: {} (penalties dropped: {})",
        report.shots, loaded.penalties_dropped
    );
    println!(
        "Players: {} ({} with >= {} shots)",
        report.players,
        players_min.len(),
        run.min_shots
    );
    println!("Teams: {}", report.teams);
    let foxes = players.iter().filter(|p| p.fox_in_box_flag == Some(true)).count();
    println!("Fox-in-box players: {foxes}");
    for path in &report_files {
        println!("Report: {}", path.display());
    }
    if !loaded.bad_files.is_empty() {
        println!("Bad files: {}", loaded.bad_files.len());
        for bad in loaded.bad_files.iter().take(8) {
            println!(" - {}: {}", bad.file, bad.error);
        }
    }

    if args.tui {
        viewer::run(&players, &teams, run.min_shots).context("terminal viewer failed")?;
    }
    Ok(())
}

fn resolve_run_config(args: &CliArgs) -> Result<RunConfig> {
    let mut run = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    }
    .with_env_overrides();

    if let Some(n) = args.min_shots {
        run.min_shots = n;
    }
    if args.no_exclude_pens {
        run.entropy.exclude_penalties = false;
    }
    let grid_x = args.grid_x.unwrap_or(run.entropy.grid_x);
    let grid_y = args.grid_y.unwrap_or(run.entropy.grid_y);
    run.entropy = run.entropy.with_grid(grid_x, grid_y);
    Ok(run)
}

fn demo_shots(exclude_penalties: bool) -> LoadedShots {
    let mut shots = fake_shot_table(&FakeDatasetConfig::default());
    let before = shots.len();
    if exclude_penalties {
        shots.retain(|s| !s.is_penalty);
    }
    LoadedShots {
        penalties_dropped: before - shots.len(),
        shots,
        bad_files: Vec::new(),
        files_scanned: 0,
    }
}

/// Log to stderr. The viewer owns the terminal, so it only gets warnings.
fn init_tracing(tui: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let default_filter = if tui { "warn" } else { "xg_entropy=info,warn" };
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            let v = match inline.clone() {
                Some(v) => v,
                None => iter.next().ok_or_else(|| anyhow!("{name} needs a value"))?,
            };
            let v = v.trim().to_string();
            if v.is_empty() {
                bail!("{name} needs a non-empty value");
            }
            Ok(v)
        };

        match flag.as_str() {
            "--root" => out.root = Some(PathBuf::from(value("--root")?)),
            "--out-xlsx" => out.out_xlsx = Some(PathBuf::from(value("--out-xlsx")?)),
            "--out-dir" => out.out_dir = Some(PathBuf::from(value("--out-dir")?)),
            "--config" => out.config = Some(PathBuf::from(value("--config")?)),
            "--min-shots" => out.min_shots = Some(parse_count("--min-shots", &value("--min-shots")?)?),
            "--grid-x" => out.grid_x = Some(parse_count("--grid-x", &value("--grid-x")?)?),
            "--grid-y" => out.grid_y = Some(parse_count("--grid-y", &value("--grid-y")?)?),
            "--no-exclude-pens" => out.no_exclude_pens = true,
            "--demo" => out.demo = true,
            "--tui" => out.tui = true,
            "-h" | "--help" => out.help = true,
            other => bail!("unknown argument {other}\n\n{USAGE}"),
        }
    }
    Ok(out)
}

fn parse_count(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .with_context(|| format!("{name} expects a non-negative integer, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{CliArgs, parse_args, resolve_run_config};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_both_flag_styles() {
        let parsed = parse_args(args(&[
            "--root",
            "data",
            "--out-xlsx=out/x.xlsx",
            "--min-shots",
            "100",
            "--grid-x=8",
            "--no-exclude-pens",
        ]))
        .unwrap();
        assert_eq!(parsed.root, Some(PathBuf::from("data")));
        assert_eq!(parsed.out_xlsx, Some(PathBuf::from("out/x.xlsx")));
        assert_eq!(parsed.min_shots, Some(100));
        assert_eq!(parsed.grid_x, Some(8));
        assert!(parsed.no_exclude_pens);
    }

    #[test]
    fn rejects_unknown_and_missing_values() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--root"])).is_err());
        assert!(parse_args(args(&["--grid-x", "-2"])).is_err());
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = CliArgs {
            grid_x: Some(0),
            min_shots: Some(10),
            no_exclude_pens: true,
            ..Default::default()
        };
        let run = resolve_run_config(&cli).unwrap();
        assert_eq!(run.entropy.grid_x, 1);
        assert_eq!(run.min_shots, 10);
        assert!(!run.entropy.exclude_penalties);
    }
}
