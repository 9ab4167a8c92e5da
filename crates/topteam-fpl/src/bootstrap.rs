// FPL `bootstrap-static` document: fetching and conversion to raw players.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info, warn};

use topteam_core::player::{Candidate, Position};

use crate::filter::RawPlayer;

pub const DEFAULT_BOOTSTRAP_URL: &str = "https://fantasy.premierleague.com/api/bootstrap-static/";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("malformed bootstrap document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("player {id} references unknown team {team}")]
    UnknownTeam { id: u32, team: u32 },
}

// ---------------------------------------------------------------------------
// Wire structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BootstrapDoc {
    elements: Vec<Element>,
    teams: Vec<Team>,
    element_types: Vec<ElementType>,
}

#[derive(Debug, Deserialize)]
struct Element {
    id: u32,
    web_name: String,
    team: u32,
    element_type: u32,
    now_cost: u32,
    total_points: i32,
    /// Decimal as a string, e.g. `"5.4"`.
    points_per_game: String,
    #[serde(default)]
    chance_of_playing_next_round: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: u32,
    short_name: String,
}

#[derive(Debug, Deserialize)]
struct ElementType {
    id: u32,
    plural_name_short: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Download the bootstrap document body.
pub async fn fetch_bootstrap(url: &str) -> Result<String, BootstrapError> {
    let http_err = |source| BootstrapError::Http {
        url: url.to_string(),
        source,
    };
    info!("fetching player data from {}", url);
    let response = reqwest::get(url)
        .await
        .map_err(http_err)?
        .error_for_status()
        .map_err(http_err)?;
    response.text().await.map_err(http_err)
}

/// Convert a bootstrap document into raw players.
///
/// Managers and unknown element types are skipped. A player whose PPG does
/// not parse is skipped with a warning. A player is available when the
/// document gives no chance of playing, or 100.
pub fn parse_bootstrap(body: &str) -> Result<Vec<RawPlayer>, BootstrapError> {
    let doc: BootstrapDoc = serde_json::from_str(body)?;

    let teams: HashMap<u32, &str> = doc
        .teams
        .iter()
        .map(|t| (t.id, t.short_name.as_str()))
        .collect();
    let positions: HashMap<u32, Option<Position>> = doc
        .element_types
        .iter()
        .map(|et| (et.id, Position::from_code(&et.plural_name_short)))
        .collect();

    let mut players = Vec::with_capacity(doc.elements.len());
    for el in &doc.elements {
        let Some(position) = positions.get(&el.element_type).copied().flatten() else {
            debug!(id = el.id, element_type = el.element_type, "skipping non-player element");
            continue;
        };
        let club = teams.get(&el.team).ok_or(BootstrapError::UnknownTeam {
            id: el.id,
            team: el.team,
        })?;
        let ppg = match el.points_per_game.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(
                    "skipping '{}': unparseable points_per_game '{}'",
                    el.web_name, el.points_per_game
                );
                continue;
            }
        };

        players.push(RawPlayer {
            candidate: Candidate {
                id: el.id,
                name: el.web_name.clone(),
                club: club.to_string(),
                position,
                cost_tenths: el.now_cost,
                ppg,
                total_points: el.total_points,
            },
            available: matches!(el.chance_of_playing_next_round, None | Some(100)),
        });
    }

    info!(players = players.len(), "parsed bootstrap document");
    Ok(players)
}
