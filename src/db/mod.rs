use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod models;
pub mod postgres;
pub mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use crate::stats::Stat;
use models::*;

/// Read-only access to the precomputed percentile tables.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// All teams, alphabetical by name.
    async fn list_teams(&self) -> Result<Vec<Team>>;

    /// Players of `team_id` with recorded minutes, most minutes first.
    async fn list_players_for_team(&self, team_id: i64) -> Result<Vec<Player>>;

    /// The player's percentile row, `None` if there is none.
    async fn get_player_stats(&self, player_id: i64) -> Result<Option<PlayerStats>>;

    /// Release connections. Called once at shutdown.
    async fn close(&self) {}

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Result of a data-access call under the non-fatal error policy: on
/// failure `data` is empty/absent and `error` holds a message for the user.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub error: Option<String>,
}

impl<T> Fetched<T> {
    fn ok(data: T) -> Self {
        Fetched { data, error: None }
    }
}

/// Wraps a [`StatsStore`] so query failures become user-visible messages
/// instead of errors.
#[derive(Clone)]
pub struct DataAccess {
    store: Arc<dyn StatsStore>,
}

impl DataAccess {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        DataAccess { store }
    }

    pub async fn list_teams(&self) -> Fetched<Vec<Team>> {
        match self.store.list_teams().await {
            Ok(teams) => {
                debug!("{}: loaded {} teams", self.store.name(), teams.len());
                Fetched::ok(teams)
            }
            Err(e) => {
                warn!("Team query failed: {:#}", e);
                Fetched {
                    data: Vec::new(),
                    error: Some(format!(
                        "Error querying the database for team names: {}",
                        e
                    )),
                }
            }
        }
    }

    pub async fn list_players_for_team(&self, team_id: i64) -> Fetched<Vec<Player>> {
        match self.store.list_players_for_team(team_id).await {
            Ok(players) => {
                debug!(
                    "{}: team {} has {} players with minutes",
                    self.store.name(),
                    team_id,
                    players.len()
                );
                Fetched::ok(players)
            }
            Err(e) => {
                warn!("Player query for team {} failed: {:#}", team_id, e);
                Fetched {
                    data: Vec::new(),
                    error: Some(format!("Error querying the database for players: {}", e)),
                }
            }
        }
    }

    pub async fn get_player_stats(&self, player_id: i64) -> Fetched<Option<PlayerStats>> {
        match self.store.get_player_stats(player_id).await {
            Ok(row) => Fetched::ok(row),
            Err(e) => {
                warn!("Stats query for player {} failed: {:#}", player_id, e);
                Fetched {
                    data: None,
                    error: Some(format!("Error querying the database: {}", e)),
                }
            }
        }
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}

// ── SQL shared by both backends ───────────────────────────────────────────────

/// The bits of SQL that differ between the two backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Placeholder for the single bound id.
    fn placeholder(self) -> &'static str {
        match self {
            Dialect::Sqlite => "?1",
            Dialect::Postgres => "$1",
        }
    }

    /// Expression yielding the lowercase storage type name of `column`.
    fn type_of(self, column: &str) -> String {
        match self {
            Dialect::Sqlite => format!("typeof({})", column),
            Dialect::Postgres => format!("CAST(pg_typeof({}) AS TEXT)", column),
        }
    }
}

pub(crate) const TEAMS_SQL: &str = "SELECT DISTINCT name, CAST(id AS BIGINT) AS id FROM teams ORDER BY name";

/// Players of one team, bound to the dialect's placeholder.
pub(crate) fn players_sql(dialect: Dialect) -> String {
    format!(
        "SELECT p.name, CAST(p.id AS BIGINT)
         FROM players p
         JOIN player_stats_with_percentiles s ON p.id = s.player_id
         WHERE p.team_id = {} AND s.total_minutes_played IS NOT NULL
         GROUP BY p.id, p.name
         ORDER BY MAX(s.total_minutes_played) DESC, p.name",
        dialect.placeholder()
    )
}

/// Stats row query for one player.
///
/// Columns come back as `player_id, total_minutes_played`, then for each
/// stat in [`Stat::ALL`] order: the value's storage type, the value,
/// percentile and rank. Values are read as f64 next to their type name so
/// integer columns can be told apart from floats.
pub(crate) fn player_stats_sql(dialect: Dialect) -> String {
    let mut cols = vec![
        "CAST(player_id AS BIGINT)".to_string(),
        "CAST(total_minutes_played AS DOUBLE PRECISION)".to_string(),
    ];
    for stat in Stat::ALL {
        cols.push(dialect.type_of(stat.column()));
        cols.push(format!("CAST({} AS DOUBLE PRECISION)", stat.column()));
        cols.push(format!("CAST({} AS DOUBLE PRECISION)", stat.percentile_column()));
        cols.push(format!("CAST({} AS BIGINT)", stat.rank_column()));
    }
    format!(
        "SELECT {} FROM player_stats_with_percentiles WHERE player_id = {} LIMIT 1",
        cols.join(", "),
        dialect.placeholder()
    )
}

/// Index of the first column of `Stat::ALL[i]` in [`player_stats_sql`].
pub(crate) fn stat_column_offset(i: usize) -> usize {
    2 + 4 * i
}

/// Columns of one stat as read from a row: type name, value, percentile, rank.
pub(crate) type RawStatColumns = (Option<String>, Option<f64>, Option<f64>, Option<i64>);

/// Assemble a [`PlayerStats`] from a row, given a reader for the four
/// columns of a stat at a column offset.
pub(crate) fn assemble_stats<E>(
    player_id: i64,
    total_minutes_played: Option<f64>,
    mut read: impl FnMut(usize) -> std::result::Result<RawStatColumns, E>,
) -> std::result::Result<PlayerStats, E> {
    let mut lines = Vec::with_capacity(Stat::ALL.len());
    for (i, stat) in Stat::ALL.into_iter().enumerate() {
        let (kind, value, percentile, rank) = read(stat_column_offset(i))?;
        lines.push(StatLine {
            stat,
            value: StatValue::from_column(kind.as_deref(), value),
            percentile,
            rank,
        });
    }
    Ok(PlayerStats {
        player_id,
        total_minutes_played,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl StatsStore for BrokenStore {
        async fn list_teams(&self) -> Result<Vec<Team>> {
            anyhow::bail!("connection refused")
        }
        async fn list_players_for_team(&self, _team_id: i64) -> Result<Vec<Player>> {
            anyhow::bail!("connection refused")
        }
        async fn get_player_stats(&self, _player_id: i64) -> Result<Option<PlayerStats>> {
            anyhow::bail!("relation does not exist")
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_failures_become_messages() {
        let data = DataAccess::new(Arc::new(BrokenStore));

        let teams = data.list_teams().await;
        assert!(teams.data.is_empty());
        assert_eq!(
            teams.error.as_deref(),
            Some("Error querying the database for team names: connection refused")
        );

        let players = data.list_players_for_team(1).await;
        assert!(players.data.is_empty());
        assert!(players.error.unwrap().contains("for players"));

        let stats = data.get_player_stats(10).await;
        assert!(stats.data.is_none());
        assert_eq!(
            stats.error.as_deref(),
            Some("Error querying the database: relation does not exist")
        );
    }

    #[test]
    fn test_sqlite_stats_sql() {
        let sql = player_stats_sql(Dialect::Sqlite);
        assert!(sql.contains("typeof(total_three_pointers), CAST(total_three_pointers AS DOUBLE PRECISION)"));
        assert!(sql.contains("CAST(free_throw_percentage_rank AS BIGINT)"));
        assert!(sql.ends_with("WHERE player_id = ?1 LIMIT 1"));
        assert!(!sql.contains("$1"));
        assert_eq!(stat_column_offset(0), 2);
        assert_eq!(stat_column_offset(7), 30);
        // 2 leading columns, 4 per stat
        assert_eq!(sql.matches(", ").count() + 1, 2 + 4 * Stat::ALL.len());
    }

    #[test]
    fn test_postgres_sql_uses_numbered_placeholders() {
        let players = players_sql(Dialect::Postgres);
        assert!(players.contains("WHERE p.team_id = $1 AND"));
        assert!(!players.contains("?1"));

        let stats = player_stats_sql(Dialect::Postgres);
        assert!(stats.contains("CAST(pg_typeof(avg_points) AS TEXT), CAST(avg_points AS DOUBLE PRECISION)"));
        assert!(stats.ends_with("WHERE player_id = $1 LIMIT 1"));
        assert!(!stats.contains("?1"));
        assert!(!stats.contains("typeof(avg_points), "));
    }

    #[test]
    fn test_assemble_follows_catalog_order() {
        let row = assemble_stats::<()>(10, Some(3000.0), |offset| {
            let kind = if offset == stat_column_offset(4) { "integer" } else { "real" };
            Ok((Some(kind.to_string()), Some(offset as f64), Some(0.5), Some(offset as i64)))
        })
        .unwrap();
        assert_eq!(row.lines.len(), 8);
        assert_eq!(row.lines[0].stat, Stat::Points);
        assert_eq!(row.line(Stat::Assists).unwrap().value, Some(StatValue::Float(6.0)));
        assert_eq!(
            row.line(Stat::ThreePointersMade).unwrap().value,
            Some(StatValue::Int(18))
        );
        assert_eq!(row.line(Stat::FreeThrowPct).unwrap().rank, Some(30));
    }
}
