use serde::{Deserialize, Serialize};

/// One of the eight tracked per-player statistics.
///
/// Each stat has a display label shown in the UI and a base column in
/// `player_stats_with_percentiles`; the percentile and rank live in
/// `<column>_percentile` and `<column>_rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Points,
    Assists,
    Rebounds,
    FieldGoals,
    ThreePointersMade,
    FreeThrowAttempts,
    ThreePointPct,
    FreeThrowPct,
}

impl Stat {
    /// Catalog order; also the default selection order.
    pub const ALL: [Stat; 8] = [
        Stat::Points,
        Stat::Assists,
        Stat::Rebounds,
        Stat::FieldGoals,
        Stat::ThreePointersMade,
        Stat::FreeThrowAttempts,
        Stat::ThreePointPct,
        Stat::FreeThrowPct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Points => "Points per Game",
            Stat::Assists => "Assists per Game",
            Stat::Rebounds => "Rebounds per Game",
            Stat::FieldGoals => "Field Goals Made per Game",
            Stat::ThreePointersMade => "Total Three Pointers Made",
            Stat::FreeThrowAttempts => "FT Attempted per Game",
            Stat::ThreePointPct => "Three-Point %",
            Stat::FreeThrowPct => "Free Throw %",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Stat::Points => "avg_points",
            Stat::Assists => "avg_assists",
            Stat::Rebounds => "avg_rebounds",
            Stat::FieldGoals => "avg_field_goals",
            Stat::ThreePointersMade => "total_three_pointers",
            Stat::FreeThrowAttempts => "avg_free_throw_attempts",
            Stat::ThreePointPct => "three_point_percentage",
            Stat::FreeThrowPct => "free_throw_percentage",
        }
    }

    pub fn percentile_column(self) -> String {
        format!("{}_percentile", self.column())
    }

    pub fn rank_column(self) -> String {
        format!("{}_rank", self.column())
    }

    /// Look up a stat by its display label.
    pub fn from_label(label: &str) -> Option<Stat> {
        Stat::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Wedge colors. Assigned by position within the current selection, not by
/// stat identity, so deselecting a stat shifts the colors of those after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceColor {
    Blue,
    Green,
    Red,
}

impl SliceColor {
    pub fn css(self) -> &'static str {
        match self {
            SliceColor::Blue => "blue",
            SliceColor::Green => "green",
            SliceColor::Red => "red",
        }
    }

    /// Color for the wedge at `position` in the selection.
    pub fn for_position(position: usize) -> SliceColor {
        match position {
            0..=2 => SliceColor::Blue,
            3..=5 => SliceColor::Green,
            _ => SliceColor::Red,
        }
    }
}

/// Palette for a selection of `n` stats.
pub fn slice_colors(n: usize) -> Vec<SliceColor> {
    (0..n).map(SliceColor::for_position).collect()
}
