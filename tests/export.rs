use std::path::PathBuf;

use xg_entropy::config::RunConfig;
use xg_entropy::export::{ExportTables, export_excel};
use xg_entropy::ingest::load_shots;
use xg_entropy::report::{self, PLAYER_HEADERS, ranked_table, render_to_text};
use xg_entropy::shots::ShotRecord;
use xg_entropy::{add_fox_in_box_flag, compute_player_table, rank_players, team_summary};

fn fixture_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("matches");
    path
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xg_entropy_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn workbook_counts_match_tables() {
    let run = RunConfig::default();
    let loaded = load_shots(&fixture_root(), run.entropy.exclude_penalties).unwrap();
    let players = rank_players(add_fox_in_box_flag(
        compute_player_table(&loaded.shots, &run.entropy).unwrap(),
        &run.fox,
    ));
    let teams = team_summary(&loaded.shots).unwrap();

    let dir = scratch_dir("export");
    let path = dir.join("nested").join("entropy.xlsx");
    let report = export_excel(
        &path,
        &ExportTables {
            shots: &loaded.shots,
            players: &players,
            teams: &teams,
            bad_files: &loaded.bad_files,
            run: &run,
        },
    )
    .expect("workbook should be written");

    assert_eq!(report.shots, 6);
    assert_eq!(report.players, 4);
    assert_eq!(report.teams, 4);
    assert_eq!(report.bad_files, 2);
    let meta = std::fs::metadata(&path).expect("workbook exists");
    assert!(meta.len() > 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn text_reports_show_ranked_players() {
    let run = RunConfig::default();
    let loaded = load_shots(&fixture_root(), true).unwrap();
    let players = rank_players(add_fox_in_box_flag(
        compute_player_table(&loaded.shots, &run.entropy).unwrap(),
        &run.fox,
    ));

    let text = render_to_text(ranked_table(&players, 10, "ranked".to_string()), 150, 8);
    for header in PLAYER_HEADERS {
        assert!(text.contains(header), "missing header {header}");
    }
    assert!(text.contains("Alpha Striker"));
    assert!(!text.contains("FOX"));

    let dir = scratch_dir("reports");
    let files = report::write_reports(&dir, &players, 1).expect("reports should be written");
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "ft_table_1plus.txt",
            "bar_xg_adj_1plus.txt",
            "stacked_core_flexible_1plus.txt",
        ]
    );
    let table = std::fs::read_to_string(&files[0]).unwrap();
    assert!(table.contains("Gamma Nine"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn flagged_poacher_is_marked_in_reports() {
    let run = RunConfig::default();
    let shots: Vec<ShotRecord> = (0..55)
        .map(|i| ShotRecord {
            event_id: Some(7000 + i),
            team_id: Some(3),
            team: Some("Box FC".to_string()),
            player_id: Some(7),
            player: Some("Box Poacher".to_string()),
            x: Some(92.0),
            y: Some(50.0),
            shot_type: Some("head".to_string()),
            xg: 0.2,
            ..Default::default()
        })
        .collect();
    let players = rank_players(add_fox_in_box_flag(
        compute_player_table(&shots, &run.entropy).unwrap(),
        &run.fox,
    ));
    assert_eq!(players[0].fox_in_box_flag, Some(true));

    let text = render_to_text(ranked_table(&players, 10, "ranked".to_string()), 150, 5);
    let row = text
        .lines()
        .find(|l| l.contains("Box Poacher"))
        .expect("player row should render");
    assert!(row.contains("FOX"), "row without marker: {row}");

    let dir = scratch_dir("fox_reports");
    let files = report::write_reports(&dir, &players, 50).expect("reports should be written");
    let table = std::fs::read_to_string(&files[0]).unwrap();
    assert!(files[0].ends_with("ft_table_50plus.txt"));
    assert!(table.contains("Box Poacher"));
    assert!(table.contains("FOX"));

    let _ = std::fs::remove_dir_all(&dir);
}
