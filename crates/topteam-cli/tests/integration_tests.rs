// Integration tests for the topteam binary's library surface: config on
// disk → pipeline → rendered report.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use topteam_cli::app;
use topteam_cli::config::{ensure_config_files, load_config_from, OutputFormat, SourceKind, CONFIG_FILE};
use topteam_cli::output;

// ===========================================================================
// Helpers
// ===========================================================================

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn fixture(name: &str) -> String {
    crate_root()
        .join("../topteam-fpl/tests/fixtures")
        .join(name)
        .display()
        .to_string()
        .replace('\\', "/")
}

/// A workspace dir whose `defaults/` holds the shipped config, rewritten to
/// read the fixture season.
fn workspace(name: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(tmp.join("defaults")).unwrap();

    let text = fs::read_to_string(crate_root().join("defaults").join(CONFIG_FILE))
        .unwrap()
        .replace("kind = \"api\"", "kind = \"csv\"")
        .replace(
            "# players_csv = \"data/players_raw.csv\"",
            &format!("players_csv = \"{}\"", fixture("players.csv")),
        )
        .replace(
            "# names_csv = \"data/player_idlist.csv\"",
            &format!("names_csv = \"{}\"", fixture("names.csv")),
        )
        .replace("trials = 10000", "trials = 150")
        .replace("# seed = 42", "seed = 42")
        .replace("format = \"json\"", "format = \"text\"");
    fs::write(tmp.join("defaults").join(CONFIG_FILE), text).unwrap();
    tmp
}

// ===========================================================================
// End to end
// ===========================================================================

#[tokio::test]
async fn first_run_copies_defaults_and_prints_a_team() {
    let root = workspace("topteam_it_first_run");
    let copied = ensure_config_files(&root).unwrap();
    assert_eq!(copied.len(), 1);

    let config = load_config_from(&root).unwrap();
    assert_eq!(config.source.kind, SourceKind::Csv);
    assert_eq!(config.output.format, OutputFormat::Text);

    let report = app::run(&config, Arc::new(AtomicBool::new(false)))
        .await
        .unwrap();
    let text = output::render(&report, config.output.format).unwrap();

    assert!(text.starts_with("GKP: "));
    assert!(text.contains("Captain: "));
    assert!(text.contains("150 of 150 trials, 21 players"));

    let _ = fs::remove_dir_all(&root);
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let root = workspace("topteam_it_seeded");
    ensure_config_files(&root).unwrap();
    let config = load_config_from(&root).unwrap();

    let first = app::run(&config, Arc::new(AtomicBool::new(false))).await.unwrap();
    let second = app::run(&config, Arc::new(AtomicBool::new(false))).await.unwrap();
    assert_eq!(first.lineup, second.lineup);
    assert_eq!(first.squad, second.squad);

    let _ = fs::remove_dir_all(&root);
}

#[tokio::test]
async fn prefill_from_config_is_honoured() {
    let root = workspace("topteam_it_prefill");
    let path = root.join("defaults").join(CONFIG_FILE);
    let text = fs::read_to_string(&path)
        .unwrap()
        .replace("prefill = []", "prefill = [\"Saka\"]");
    fs::write(&path, text).unwrap();
    ensure_config_files(&root).unwrap();
    let config = load_config_from(&root).unwrap();

    let report = app::run(&config, Arc::new(AtomicBool::new(false))).await.unwrap();
    let squad = report.squad.unwrap();
    assert!(squad.players.mid.iter().any(|p| p.name == "Saka"));

    let _ = fs::remove_dir_all(&root);
}
