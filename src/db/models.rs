use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stats::Stat;

/// A team from the `teams` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// A player with at least one recorded minutes-played figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

/// Storage types reported for integer columns: `typeof()` in SQLite,
/// `pg_typeof()` in Postgres.
const INTEGER_KINDS: [&str; 3] = ["integer", "bigint", "smallint"];

/// A raw stat value, keeping whether the column stored an integer.
///
/// Serialized as a bare JSON number, so `132` comes back as `Int` and
/// `132.0` as `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    /// Build from a column's storage type name and its value read as f64.
    pub fn from_column(kind: Option<&str>, value: Option<f64>) -> Option<StatValue> {
        let value = value?;
        let is_integer = kind
            .map(|k| INTEGER_KINDS.contains(&k.trim().to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_integer {
            Some(StatValue::Int(value as i64))
        } else {
            Some(StatValue::Float(value))
        }
    }
}

/// Integers print as stored (`132`). Floats keep full precision, whole
/// floats keep one decimal place (`3.0`).
impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StatValue::Int(v) => write!(f, "{}", v),
            StatValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{:.1}", v)
            }
            StatValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Value, percentile and rank of one stat for one player.
///
/// Any of the three may be NULL upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub stat: Stat,
    /// Raw per-game (or total) value
    pub value: Option<StatValue>,
    /// Percentile among peers (0.0–1.0)
    pub percentile: Option<f64>,
    /// 1 = best
    pub rank: Option<i64>,
}

/// One row of `player_stats_with_percentiles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: i64,
    pub total_minutes_played: Option<f64>,
    /// One entry per stat, in catalog order
    pub lines: Vec<StatLine>,
}

impl PlayerStats {
    pub fn line(&self, stat: Stat) -> Option<&StatLine> {
        self.lines.iter().find(|l| l.stat == stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_columns_stay_integers() {
        assert_eq!(
            StatValue::from_column(Some("integer"), Some(132.0)),
            Some(StatValue::Int(132))
        );
        assert_eq!(
            StatValue::from_column(Some("bigint"), Some(7.0)),
            Some(StatValue::Int(7))
        );
        assert_eq!(
            StatValue::from_column(Some("double precision"), Some(132.0)),
            Some(StatValue::Float(132.0))
        );
        assert_eq!(
            StatValue::from_column(Some("real"), Some(25.7)),
            Some(StatValue::Float(25.7))
        );
        assert_eq!(StatValue::from_column(Some("null"), None), None);
    }

    #[test]
    fn test_display_keeps_stored_precision() {
        assert_eq!(StatValue::Int(132).to_string(), "132");
        assert_eq!(StatValue::Int(0).to_string(), "0");
        assert_eq!(StatValue::Float(132.0).to_string(), "132.0");
        assert_eq!(StatValue::Float(25.7).to_string(), "25.7");
        assert_eq!(StatValue::Float(0.123456789).to_string(), "0.123456789");
    }

    #[test]
    fn test_json_number_shape_survives_round_trip() {
        let values = vec![StatValue::Int(132), StatValue::Float(132.0), StatValue::Float(0.41)];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, "[132,132.0,0.41]");
        let back: Vec<StatValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
