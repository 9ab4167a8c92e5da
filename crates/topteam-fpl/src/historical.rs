// Historical season datasets: a positional players CSV plus an id → name CSV.
//
// Players file columns (header row skipped): 0 id, 1 club, 2 position,
// 3 cost, 4 status, 6 total points, 8 points per game. Other columns are
// ignored.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use topteam_core::player::{Candidate, Position};

use crate::filter::RawPlayer;

const COL_ID: usize = 0;
const COL_CLUB: usize = 1;
const COL_POSITION: usize = 2;
const COL_COST: usize = 3;
const COL_STATUS: usize = 4;
const COL_TOTAL_POINTS: usize = 6;
const COL_PPG: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum HistoricalError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn load_names_from_reader<R: Read>(rdr: R) -> Result<HashMap<u32, String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut names = HashMap::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed name row: {}", e);
                continue;
            }
        };
        let id = record.get(0).and_then(|s| s.trim().parse::<u32>().ok());
        match (id, record.get(1)) {
            (Some(id), Some(name)) => {
                names.insert(id, name.trim().to_string());
            }
            _ => warn!("skipping name row without id and name: {:?}", record),
        }
    }
    Ok(names)
}

fn parse_row(record: &csv::StringRecord, names: &HashMap<u32, String>) -> Result<RawPlayer, String> {
    let field = |col: usize| {
        record
            .get(col)
            .map(str::trim)
            .ok_or_else(|| format!("missing column {col}"))
    };

    let id: u32 = field(COL_ID)?.parse().map_err(|_| "bad id".to_string())?;
    let position_code = field(COL_POSITION)?;
    let position = Position::from_code(position_code)
        .ok_or_else(|| format!("player {id}: unknown position '{position_code}'"))?;
    let cost: f64 = field(COL_COST)?
        .parse()
        .map_err(|_| format!("player {id}: bad cost"))?;
    let total_points: i32 = field(COL_TOTAL_POINTS)?
        .parse()
        .map_err(|_| format!("player {id}: bad total points"))?;
    let ppg: f64 = field(COL_PPG)?
        .parse()
        .map_err(|_| format!("player {id}: bad points per game"))?;
    if !cost.is_finite() || cost < 0.0 || !ppg.is_finite() {
        return Err(format!("player {id}: non-finite cost or PPG"));
    }
    let name = names
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("player {id}: no entry in names file"))?;

    Ok(RawPlayer {
        candidate: Candidate {
            id,
            name,
            club: field(COL_CLUB)?.to_string(),
            position,
            cost_tenths: (cost * 10.0).round() as u32,
            ppg,
            total_points,
        },
        available: field(COL_STATUS)? == "Available",
    })
}

/// Load raw players from reader pairs. Malformed rows are skipped.
pub fn load_players_from_reader<P: Read, N: Read>(
    players: P,
    names: N,
) -> Result<Vec<RawPlayer>, csv::Error> {
    let names = load_names_from_reader(names)?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(players);
    let mut out = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => match parse_row(&record, &names) {
                Ok(player) => out.push(player),
                Err(reason) => warn!("skipping player row: {}", reason),
            },
            Err(e) => warn!("skipping malformed player row: {}", e),
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Path-based loader
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, HistoricalError> {
    std::fs::File::open(path).map_err(|e| HistoricalError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a historical season from disk.
pub fn load_players(path: &Path, names_path: &Path) -> Result<Vec<RawPlayer>, HistoricalError> {
    let players = open(path)?;
    let names = open(names_path)?;
    let loaded = load_players_from_reader(players, names).map_err(|e| HistoricalError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if loaded.is_empty() {
        return Err(HistoricalError::Validation(format!(
            "{} produced zero valid rows",
            path.display()
        )));
    }
    Ok(loaded)
}
