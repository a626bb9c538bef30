//! Plain-text rendering of the view state for the terminal front-end.

use std::fmt::Write;

use super::state::{StatsView, ViewState};
use crate::fixtures::{classify, describe, Fixture, FixtureState, FixtureStats};

const RULE: &str = "────────────────────────────────────────────────────────";

pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "⚽ Live Football Scores");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{}", control_hints(state));

    if let Some(err) = state.error() {
        let _ = writeln!(out, "! {}", err);
    }
    if state.is_streaming() {
        let _ = writeln!(out, "● Live stream active");
    }
    if state.is_loading() {
        let _ = writeln!(out, "Loading fixtures...");
    } else if state.fixtures().is_empty() {
        let _ = writeln!(out, "No fixtures found");
    }
    if let Some(updated) = state.last_updated() {
        let _ = writeln!(out, "Updated {}", updated.format("%H:%M:%S UTC"));
    }

    for fixture in state.fixtures() {
        let _ = writeln!(out, "{}", RULE);
        render_fixture(&mut out, fixture);
    }

    if let Some(selection) = state.selection() {
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(
            out,
            "Match details: {} vs {}",
            selection.fixture.home_team, selection.fixture.away_team
        );
        match &selection.stats {
            StatsView::Loading { .. } => {
                let _ = writeln!(out, "Loading statistics...");
            }
            StatsView::Ready(pair) => render_stats(&mut out, &pair.home, &pair.away),
            StatsView::Unavailable => {
                let _ = writeln!(out, "No statistics available");
            }
        }
    }

    out
}

fn control_hints(state: &ViewState) -> String {
    let controls = state.controls();
    let mut hints = Vec::new();
    if controls.load {
        hints.push("[live]");
        hints.push("[today]");
    }
    if controls.start_stream {
        hints.push("[stream]");
    }
    if controls.stop_stream {
        hints.push("[stop]");
    }
    hints.push("[open <id>]");
    if state.selection().is_some() {
        hints.push("[close]");
    }
    hints.push("[quit]");
    hints.join(" ")
}

fn render_fixture(out: &mut String, fixture: &Fixture) {
    let marker = match classify(&fixture.status_short) {
        FixtureState::Live => "●",
        FixtureState::Finished => "■",
        FixtureState::Scheduled => "○",
    };
    let _ = writeln!(
        out,
        "#{:<9} {:>22} {:>2} - {:<2} {}",
        fixture.id, fixture.home_team, fixture.home_score, fixture.away_score, fixture.away_team
    );
    let _ = writeln!(
        out,
        "           {} {}  |  {} ({})",
        marker,
        describe(fixture),
        fixture.league_name,
        fixture.country
    );
}

fn render_stats(out: &mut String, home: &FixtureStats, away: &FixtureStats) {
    let rows: [(&str, String, String); 13] = [
        ("Possession", home.ball_possession.clone(), away.ball_possession.clone()),
        ("Shots on goal", home.shots_on_goal.to_string(), away.shots_on_goal.to_string()),
        ("Shots off goal", home.shots_off_goal.to_string(), away.shots_off_goal.to_string()),
        ("Total shots", home.total_shots.to_string(), away.total_shots.to_string()),
        ("Blocked shots", home.blocked_shots.to_string(), away.blocked_shots.to_string()),
        ("Corners", home.corner_kicks.to_string(), away.corner_kicks.to_string()),
        ("Offsides", home.offsides.to_string(), away.offsides.to_string()),
        ("Fouls", home.fouls.to_string(), away.fouls.to_string()),
        ("Yellow cards", home.yellow_cards.to_string(), away.yellow_cards.to_string()),
        ("Red cards", home.red_cards.to_string(), away.red_cards.to_string()),
        ("Saves", home.goalkeeper_saves.to_string(), away.goalkeeper_saves.to_string()),
        ("Passes", home.total_passes.to_string(), away.total_passes.to_string()),
        ("Pass accuracy", home.passes_percentage.clone(), away.passes_percentage.clone()),
    ];

    let _ = writeln!(out, "{:>16} {:^16} {:<16}", home.team, "", away.team);
    for (label, h, a) in rows {
        let _ = writeln!(out, "{:>16} {:^16} {:<16}", h, label, a);
    }
}
