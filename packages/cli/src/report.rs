//! Plain-text rendering of predictions and the label table.

use std::fmt::Write as _;

use geo_state_geography_models::{Coordinate, NigerianState};
use geo_state_inference::RankedPrediction;

/// Width of the text progress bar, in cells.
const BAR_WIDTH: usize = 20;

/// Renders a headline plus one line per ranked state.
#[must_use]
pub fn ranked(coordinate: Coordinate, ranked: &RankedPrediction) -> String {
    let mut out = String::new();

    let Some(top) = ranked.top() else {
        let _ = writeln!(out, "No prediction for {coordinate}");
        return out;
    };

    let _ = writeln!(
        out,
        "Predicted State: {} ({:.1}% confidence) at {coordinate}",
        top.state, top.confidence
    );
    out.push('\n');

    for (icon, p) in ranked.with_icons() {
        let _ = writeln!(
            out,
            "{icon} {:<12} {:>5.1}%  [{}]",
            p.state.name(),
            p.confidence,
            bar(p.progress_percent())
        );
    }

    out
}

/// Renders the label table in classifier index order.
#[must_use]
pub fn states() -> String {
    let mut out = String::new();
    for state in NigerianState::all() {
        let _ = writeln!(out, "{:>2}  {state}", state.index());
    }
    out
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
