//! Pizza chart construction.
//!
//! A pizza chart has one wedge per selected stat, all wedges spanning the
//! same angle, each extending from the centre out to its percentile. The
//! raw value sits in a colored box on the wedge, and top-3 ranks get a medal
//! icon above that box.
//!
//! [`render`] is pure: it validates the parallel input sequences and lays
//! everything out into a [`PizzaChart`]. Turning the chart into markup is
//! [`PizzaChart::to_svg`]; loading the medal images is [`MedalIcons::load`].

pub mod medals;
pub mod svg;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use medals::{Medal, MedalIcon, MedalIcons, MedalLayout};

use crate::db::models::StatValue;
use crate::stats::{SliceColor, Stat};

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 800.0;
const CENTER: (f64, f64) = (400.0, 440.0);
const OUTER_RADIUS: f64 = 270.0;
/// Stat labels sit at 110% of the outer radius.
const PARAM_LOCATION: f64 = 1.10;
/// Value boxes never sit closer to the centre than this fraction of the radius.
const MIN_VALUE_RADIUS: f64 = 0.15;
pub const MEDAL_SIZE: f64 = 28.0;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("at least one stat is required to draw a pizza chart")]
    Empty,

    #[error("{field} has {found} entries but {expected} stats were selected")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("failed to load medal image {}: {source}", .path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported medal image format: {}", .path.display())]
    UnsupportedAsset { path: PathBuf },
}

/// Everything needed to draw one chart. The five sequences are parallel and
/// must have the same length.
#[derive(Debug, Clone, Copy)]
pub struct PizzaRequest<'a> {
    pub player: &'a str,
    pub team: &'a str,
    pub season_label: &'a str,
    pub stats: &'a [Stat],
    /// Percentiles already scaled to 0–100
    pub percentiles: &'a [f64],
    pub values: &'a [Option<StatValue>],
    pub slice_colors: &'a [SliceColor],
    pub ranks: &'a [Option<i64>],
}

/// One wedge of the chart. Angles are degrees clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub stat: Stat,
    pub color: SliceColor,
    /// Percentile clamped to 0–100
    pub percentile: f64,
    pub value_text: String,
    pub start_deg: f64,
    pub end_deg: f64,
    pub radius: f64,
    pub label_pos: (f64, f64),
    pub value_pos: (f64, f64),
}

/// A medal icon placed above a wedge's value box.
#[derive(Debug, Clone)]
pub struct MedalOverlay {
    pub wedge: usize,
    pub medal: Medal,
    /// Top-left corner of the icon
    pub pos: (f64, f64),
    pub icon: Arc<MedalIcon>,
}

/// A fully laid-out pizza chart.
#[derive(Debug, Clone)]
pub struct PizzaChart {
    pub title: String,
    pub subtitle: String,
    pub center: (f64, f64),
    pub outer_radius: f64,
    pub wedges: Vec<Wedge>,
    pub medals: Vec<MedalOverlay>,
}

impl PizzaChart {
    /// Boundary angles between neighbouring wedges.
    pub fn spoke_angles(&self) -> Vec<f64> {
        if self.wedges.len() < 2 {
            return Vec::new();
        }
        self.wedges.iter().map(|w| w.start_deg).collect()
    }
}

/// Build the chart for `req`, attaching icons from `medals` to top-3 ranks.
pub fn render(req: &PizzaRequest<'_>, medals: &MedalIcons) -> Result<PizzaChart, ChartError> {
    let n = req.stats.len();
    if n == 0 {
        return Err(ChartError::Empty);
    }
    check_len("percentiles", n, req.percentiles.len())?;
    check_len("values", n, req.values.len())?;
    check_len("slice_colors", n, req.slice_colors.len())?;
    check_len("ranks", n, req.ranks.len())?;

    let span = 360.0 / n as f64;
    let mut wedges = Vec::with_capacity(n);
    let mut overlays = Vec::new();

    for (i, &stat) in req.stats.iter().enumerate() {
        let percentile = clamp_percentile(req.percentiles[i]);
        let start_deg = i as f64 * span;
        let end_deg = start_deg + span;
        let mid_deg = start_deg + span / 2.0;
        let radius = OUTER_RADIUS * percentile / 100.0;

        let label_pos = polar(mid_deg, OUTER_RADIUS * PARAM_LOCATION);
        let value_pos = polar(mid_deg, radius.max(OUTER_RADIUS * MIN_VALUE_RADIUS));

        if let Some(medal) = req.ranks[i].and_then(Medal::for_rank) {
            overlays.push(MedalOverlay {
                wedge: i,
                medal,
                pos: medal_anchor(value_pos),
                icon: medals.icon(medal),
            });
        }

        wedges.push(Wedge {
            stat,
            color: req.slice_colors[i],
            percentile,
            value_text: format_value(req.values[i]),
            start_deg,
            end_deg,
            radius,
            label_pos,
            value_pos,
        });
    }

    Ok(PizzaChart {
        title: format!("{} per Game - {}", req.player, req.team),
        subtitle: req.season_label.to_string(),
        center: CENTER,
        outer_radius: OUTER_RADIUS,
        wedges,
        medals: overlays,
    })
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), ChartError> {
    if expected != found {
        return Err(ChartError::LengthMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

fn clamp_percentile(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 100.0)
    }
}

/// Point at `radius` from the chart centre, `deg` clockwise from 12 o'clock.
pub(crate) fn polar(deg: f64, radius: f64) -> (f64, f64) {
    let rad = deg.to_radians();
    (CENTER.0 + radius * rad.sin(), CENTER.1 - radius * rad.cos())
}

/// The icon is centred horizontally on the value box and sits half its own
/// height above it.
fn medal_anchor((x, y): (f64, f64)) -> (f64, f64) {
    (x - MEDAL_SIZE / 2.0, y - MEDAL_SIZE * 1.5)
}

/// Text for a raw stat value, as stored. NULL shows as `-`.
pub fn format_value(value: Option<StatValue>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::db::models::StatValue::{Float, Int};

    fn icons() -> MedalIcons {
        MedalIcons::from_bytes(b"gold".to_vec(), b"silver".to_vec(), b"bronze".to_vec())
    }

    fn request<'a>(
        stats: &'a [Stat],
        percentiles: &'a [f64],
        values: &'a [Option<StatValue>],
        colors: &'a [SliceColor],
        ranks: &'a [Option<i64>],
    ) -> PizzaRequest<'a> {
        PizzaRequest {
            player: "LeBron James",
            team: "Lakers",
            season_label: "NBA Season | 2023-24",
            stats,
            percentiles,
            values,
            slice_colors: colors,
            ranks,
        }
    }

    #[test]
    fn test_lebron_scenario() {
        let stats = [Stat::Points, Stat::Assists];
        let percentiles = [98.0, 80.0];
        let values = [Some(Float(25.7)), Some(Float(7.2))];
        let colors = crate::stats::slice_colors(2);
        let ranks = [Some(1), Some(15)];
        let req = request(&stats, &percentiles, &values, &colors, &ranks);
        let chart = render(&req, &icons()).unwrap();

        assert_eq!(chart.wedges.len(), 2);
        assert_relative_eq!(chart.wedges[0].percentile, 98.0);
        assert_relative_eq!(chart.wedges[1].percentile, 80.0);
        assert_eq!(chart.wedges[0].value_text, "25.7");
        assert_eq!(chart.wedges[1].value_text, "7.2");

        assert_eq!(chart.medals.len(), 1);
        assert_eq!(chart.medals[0].wedge, 0);
        assert_eq!(chart.medals[0].medal, Medal::Gold);

        assert_eq!(chart.title, "LeBron James per Game - Lakers");
        assert_eq!(chart.subtitle, "NBA Season | 2023-24");
    }

    #[test]
    fn test_equal_angular_spacing() {
        let stats = Stat::ALL;
        let colors = crate::stats::slice_colors(8);
        let chart = render(
            &request(&stats, &[50.0; 8], &[Some(Float(1.0)); 8], &colors, &[None; 8]),
            &icons(),
        )
        .unwrap();
        for (i, w) in chart.wedges.iter().enumerate() {
            assert_relative_eq!(w.start_deg, i as f64 * 45.0);
            assert_relative_eq!(w.end_deg - w.start_deg, 45.0);
        }
        assert_eq!(chart.spoke_angles().len(), 8);
    }

    #[test]
    fn test_radius_proportional_to_percentile() {
        let stats = [Stat::Points, Stat::Assists, Stat::Rebounds];
        let colors = crate::stats::slice_colors(3);
        let chart = render(
            &request(&stats, &[100.0, 50.0, 0.0], &[None; 3], &colors, &[None; 3]),
            &icons(),
        )
        .unwrap();
        assert_relative_eq!(chart.wedges[0].radius, OUTER_RADIUS);
        assert_relative_eq!(chart.wedges[1].radius, OUTER_RADIUS / 2.0);
        assert_relative_eq!(chart.wedges[2].radius, 0.0);
    }

    #[test]
    fn test_two_wedge_labels_point_sideways() {
        let stats = [Stat::Points, Stat::Assists];
        let colors = crate::stats::slice_colors(2);
        let chart = render(
            &request(&stats, &[60.0, 60.0], &[None; 2], &colors, &[None; 2]),
            &icons(),
        )
        .unwrap();
        // First wedge spans 0..180 so its midpoint points right (3 o'clock)
        let (x, y) = chart.wedges[0].label_pos;
        assert_relative_eq!(x, CENTER.0 + OUTER_RADIUS * PARAM_LOCATION, epsilon = 1e-9);
        assert_relative_eq!(y, CENTER.1, epsilon = 1e-9);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let stats = [Stat::Points, Stat::Assists];
        let colors = crate::stats::slice_colors(2);
        let err = render(
            &request(&stats, &[98.0], &[Some(Float(25.7)), Some(Float(7.2))], &colors, &[Some(1), None]),
            &icons(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChartError::LengthMismatch { field: "percentiles", expected: 2, found: 1 }
        ));

        let err = render(
            &request(&stats, &[98.0, 80.0], &[Some(Float(25.7)), Some(Float(7.2))], &colors, &[Some(1)]),
            &icons(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::LengthMismatch { field: "ranks", .. }));

        let three_colors = crate::stats::slice_colors(3);
        let err = render(
            &request(&stats, &[98.0, 80.0], &[None, None], &three_colors, &[None, None]),
            &icons(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::LengthMismatch { field: "slice_colors", .. }));
    }

    #[test]
    fn test_empty_rejected() {
        let err = render(&request(&[], &[], &[], &[], &[]), &icons()).unwrap_err();
        assert!(matches!(err, ChartError::Empty));
    }

    #[test]
    fn test_medals_only_for_top_three() {
        let stats = Stat::ALL;
        let colors = crate::stats::slice_colors(8);
        let ranks = [Some(0), Some(1), Some(2), Some(3), Some(4), Some(-1), None, Some(100)];
        let chart = render(
            &request(&stats, &[90.0; 8], &[Some(Float(1.5)); 8], &colors, &ranks),
            &icons(),
        )
        .unwrap();
        let placed: Vec<(usize, Medal)> = chart.medals.iter().map(|m| (m.wedge, m.medal)).collect();
        assert_eq!(
            placed,
            vec![(1, Medal::Gold), (2, Medal::Silver), (3, Medal::Bronze)]
        );
        assert_eq!(chart.medals[1].icon.data, b"silver".to_vec());
    }

    #[test]
    fn test_medal_sits_above_value_box() {
        let stats = [Stat::Points];
        let chart = render(
            &request(&stats, &[98.0], &[Some(Float(25.7))], &[SliceColor::Blue], &[Some(1)]),
            &icons(),
        )
        .unwrap();
        let (vx, vy) = chart.wedges[0].value_pos;
        let (mx, my) = chart.medals[0].pos;
        assert_relative_eq!(mx + MEDAL_SIZE / 2.0, vx);
        assert!(my + MEDAL_SIZE < vy);
    }

    #[test]
    fn test_percentiles_clamped() {
        let stats = [Stat::Points, Stat::Assists, Stat::Rebounds];
        let colors = crate::stats::slice_colors(3);
        let chart = render(
            &request(&stats, &[140.0, -5.0, f64::NAN], &[None; 3], &colors, &[None; 3]),
            &icons(),
        )
        .unwrap();
        assert_relative_eq!(chart.wedges[0].percentile, 100.0);
        assert_relative_eq!(chart.wedges[1].percentile, 0.0);
        assert_relative_eq!(chart.wedges[2].percentile, 0.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(Float(25.7))), "25.7");
        assert_eq!(format_value(Some(Float(0.41))), "0.41");
        assert_eq!(format_value(Some(Float(132.0))), "132.0");
        assert_eq!(format_value(Some(Int(132))), "132");
        assert_eq!(format_value(Some(Float(0.123456789))), "0.123456789");
        assert_eq!(format_value(None), "-");
    }
}
