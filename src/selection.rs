use crate::chart::PizzaRequest;
use crate::db::models::{PlayerStats, StatValue};
use crate::stats::{slice_colors, SliceColor, Stat};

pub const NO_TEAMS: &str = "Could not load team names.";
pub const NO_PLAYERS: &str = "No players found for the selected team.";
pub const NO_PLAYER_DATA: &str = "No data found for the specified player.";
pub const NO_STATS_SELECTED: &str = "Please select at least one stat to display the plot.";

/// A player's stats row projected onto the current stat selection: parallel
/// sequences in selection order, ready for [`crate::chart::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub stats: Vec<Stat>,
    /// Percentiles scaled to 0–100
    pub percentiles: Vec<f64>,
    pub values: Vec<Option<StatValue>>,
    pub ranks: Vec<Option<i64>>,
    pub slice_colors: Vec<SliceColor>,
}

impl Projection {
    pub fn request<'a>(
        &'a self,
        player: &'a str,
        team: &'a str,
        season_label: &'a str,
    ) -> PizzaRequest<'a> {
        PizzaRequest {
            player,
            team,
            season_label,
            stats: &self.stats,
            percentiles: &self.percentiles,
            values: &self.values,
            slice_colors: &self.slice_colors,
            ranks: &self.ranks,
        }
    }
}

/// Project `row` onto `selected`. A NULL percentile draws as an empty
/// wedge; a NULL value or rank stays absent.
pub fn project(row: &PlayerStats, selected: &[Stat]) -> Projection {
    let mut percentiles = Vec::with_capacity(selected.len());
    let mut values = Vec::with_capacity(selected.len());
    let mut ranks = Vec::with_capacity(selected.len());

    for &stat in selected {
        let line = row.line(stat);
        percentiles.push(line.and_then(|l| l.percentile).unwrap_or(0.0) * 100.0);
        values.push(line.and_then(|l| l.value));
        ranks.push(line.and_then(|l| l.rank));
    }

    Projection {
        stats: selected.to_vec(),
        percentiles,
        values,
        ranks,
        slice_colors: slice_colors(selected.len()),
    }
}

/// Resolve display labels to stats, keeping the given order. Duplicates
/// are dropped; an unknown label is returned as the error.
pub fn parse_selection<S: AsRef<str>>(labels: &[S]) -> Result<Vec<Stat>, String> {
    let mut selected = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.as_ref();
        let stat = Stat::from_label(label).ok_or_else(|| label.to_string())?;
        if !selected.contains(&stat) {
            selected.push(stat);
        }
    }
    Ok(selected)
}
