// Report rendering for stdout.

use std::fmt::Write;

use topteam_core::player::Position;
use topteam_core::report::{PlayerReport, PositionGroups, SearchReport};

use crate::config::OutputFormat;

pub fn render(report: &SearchReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn player_list(players: &[PlayerReport]) -> String {
    players
        .iter()
        .map(|p| format!("{}({})", p.name, p.ppg))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_groups(out: &mut String, groups: &PositionGroups) {
    for pos in Position::ALL {
        let _ = writeln!(out, "{}: {}", pos, player_list(groups.get(pos)));
    }
}

/// Plain-text team sheet: one line per position, then totals.
pub fn render_text(report: &SearchReport) -> String {
    let mut out = String::new();

    if let Some(lineup) = &report.lineup {
        write_groups(&mut out, &lineup.starters);
        let _ = writeln!(out, "B: {}", player_list(&lineup.bench));
        out.push('\n');
        let _ = writeln!(out, "Captain: {}({})", lineup.captain.name, lineup.captain.ppg);
        let _ = writeln!(out, "Team PPG: {}", lineup.points);
        let _ = writeln!(out, "Total Cost: {}", lineup.cost);
    } else if let Some(squad) = &report.squad {
        write_groups(&mut out, &squad.players);
        out.push('\n');
        let _ = writeln!(out, "Squad PPG: {}", squad.points);
        let _ = writeln!(out, "Total Cost: {}", squad.cost);
    } else {
        out.push_str("No squad found.\n");
    }

    let run = &report.run;
    let _ = write!(
        out,
        "\n{} of {} trials, {} players, {:.2}s",
        run.trials_run, run.trials_requested, run.player_count, run.runtime_secs
    );
    if run.stopped_early {
        out.push_str(" (stopped early)");
    }
    out.push('\n');
    out
}
