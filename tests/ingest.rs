use std::path::{Path, PathBuf};

use xg_entropy::ingest::{extract_shots_from_json, iter_json_files, load_shots};

fn fixture_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("matches");
    path
}

#[test]
fn finds_json_files_recursively_in_order() {
    let root = fixture_root();
    let files = iter_json_files(&root).expect("fixture dir should be readable");
    let rel: Vec<PathBuf> = files
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        rel,
        vec![
            PathBuf::from("broken.json"),
            PathBuf::from("not_object.json"),
            Path::new("round1").join("match_1.json"),
            Path::new("round2").join("match_2.JSON"),
        ]
    );
}

#[test]
fn loads_shots_and_reports_bad_files() {
    let loaded = load_shots(&fixture_root(), true).expect("fixture should load");
    assert_eq!(loaded.files_scanned, 4);
    assert_eq!(loaded.bad_files.len(), 2);
    assert!(loaded.bad_files.iter().any(|b| b.file.ends_with("broken.json")));
    assert!(loaded.bad_files.iter().any(|b| b.file.ends_with("not_object.json")));

    assert_eq!(loaded.penalties_dropped, 1);
    assert_eq!(loaded.shots.len(), 6);
    assert!(loaded.shots.iter().all(|s| !s.is_penalty));

    let total: f64 = loaded.shots.iter().map(|s| s.xg).sum();
    assert!((total - 1.05).abs() < 1e-9);
}

#[test]
fn keeps_penalties_when_asked() {
    let loaded = load_shots(&fixture_root(), false).expect("fixture should load");
    assert_eq!(loaded.penalties_dropped, 0);
    assert_eq!(loaded.shots.len(), 7);
    let pen = loaded
        .shots
        .iter()
        .find(|s| s.event_id == Some(104))
        .expect("penalty shot should be present");
    assert!(pen.is_penalty);
    assert!(pen.is_goal);
}

#[test]
fn parses_fields_and_numeric_strings() {
    let loaded = load_shots(&fixture_root(), true).expect("fixture should load");
    let s = loaded
        .shots
        .iter()
        .find(|s| s.event_id == Some(102))
        .expect("string-id shot should parse");
    assert_eq!(s.match_id, Some(1));
    assert_eq!(s.x, Some(95.0));
    assert!((s.xg - 0.25).abs() < 1e-12);
    assert!(s.is_goal);
    assert_eq!(s.player.as_deref(), Some("Alpha Striker"));
    assert_eq!(s.opponent.as_deref(), Some("Other FC"));
    assert_eq!(
        PathBuf::from(&s.source_file),
        Path::new("round1").join("match_1.json")
    );

    let anon = loaded
        .shots
        .iter()
        .find(|s| s.event_id == Some(107))
        .expect("anonymous shot should parse");
    assert_eq!(anon.player_id, None);
    assert_eq!(anon.team, None);
    assert_eq!(anon.x, None);
    assert_eq!(anon.y, Some(40.0));

    let gamma = loaded
        .shots
        .iter()
        .find(|s| s.event_id == Some(201))
        .unwrap();
    assert!(!gamma.is_goal);
    assert!(!gamma.is_penalty);
}

#[test]
fn empty_directory_is_an_error() {
    let dir = std::env::temp_dir().join(format!("xg_entropy_empty_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let err = load_shots(&dir, true).unwrap_err();
    assert!(err.to_string().contains("no shots with shot.xg found"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn documents_without_events_yield_nothing() {
    assert!(extract_shots_from_json(r#"{"matchId": 1}"#, "x.json").unwrap().is_empty());
    assert!(extract_shots_from_json(r#"{"events": [{"shot": 1}]}"#, "x.json").unwrap().is_empty());
    assert!(extract_shots_from_json("not json", "x.json").is_err());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let dir = std::env::temp_dir().join(format!("xg_entropy_links_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let nested = dir.join("round1");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::copy(
        fixture_root().join("round1").join("match_1.json"),
        nested.join("match_1.json"),
    )
    .unwrap();
    // A cycle back to the root and a second path to the same match.
    std::os::unix::fs::symlink(&dir, nested.join("loop")).unwrap();
    std::os::unix::fs::symlink(&nested, dir.join("alias")).unwrap();

    let files = iter_json_files(&dir).expect("walk should terminate");
    assert_eq!(files, vec![nested.join("match_1.json")]);

    let loaded = load_shots(&dir, true).expect("linked tree should load");
    assert_eq!(loaded.files_scanned, 1);
    assert_eq!(loaded.shots.len(), 4);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_root_is_an_error() {
    let dir = std::env::temp_dir().join(format!("xg_entropy_missing_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    assert!(iter_json_files(&dir).is_err());
}
