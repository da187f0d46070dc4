use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::sync::{Arc, Mutex};

use super::models::*;
use super::{assemble_stats, player_stats_sql, players_sql, Dialect, StatsStore, TEAMS_SQL};

/// SQLite-backed store (single connection with mutex)
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open an existing SQLite database read-only.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("opening SQLite database {}", path))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("SQLite connection mutex poisoned"))
    }

    fn query_teams(&self) -> Result<Vec<Team>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(TEAMS_SQL)?;
        let teams = stmt
            .query_map([], |row| {
                Ok(Team {
                    name: row.get(0)?,
                    id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn query_players(&self, team_id: i64) -> Result<Vec<Player>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&players_sql(Dialect::Sqlite))?;
        let players = stmt
            .query_map(params![team_id], |row| {
                Ok(Player {
                    name: row.get(0)?,
                    id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    fn query_player_stats(&self, player_id: i64) -> Result<Option<PlayerStats>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &player_stats_sql(Dialect::Sqlite),
                params![player_id],
                map_player_stats,
            )
            .optional()?;
        Ok(row)
    }
}

#[async_trait]
impl StatsStore for SqliteStore {
    async fn list_teams(&self) -> Result<Vec<Team>> {
        self.query_teams()
    }

    async fn list_players_for_team(&self, team_id: i64) -> Result<Vec<Player>> {
        self.query_players(team_id)
    }

    async fn get_player_stats(&self, player_id: i64) -> Result<Option<PlayerStats>> {
        self.query_player_stats(player_id)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn map_player_stats(row: &rusqlite::Row) -> rusqlite::Result<PlayerStats> {
    assemble_stats(row.get(0)?, row.get(1)?, |offset| -> rusqlite::Result<_> {
        Ok((
            row.get(offset)?,
            row.get(offset + 1)?,
            row.get(offset + 2)?,
            row.get(offset + 3)?,
        ))
    })
}

/// Schema of the upstream tables, used by the test fixtures.
#[cfg(test)]
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE teams (
    id   INTEGER PRIMARY KEY,
    name TEXT    NOT NULL
);

CREATE TABLE players (
    id      INTEGER PRIMARY KEY,
    team_id INTEGER NOT NULL REFERENCES teams(id),
    name    TEXT    NOT NULL
);

CREATE TABLE player_stats_with_percentiles (
    player_id                          INTEGER NOT NULL REFERENCES players(id),
    total_minutes_played               REAL,
    avg_points                         REAL,
    avg_points_percentile              REAL,
    avg_points_rank                    REAL,
    avg_assists                        REAL,
    avg_assists_percentile             REAL,
    avg_assists_rank                   REAL,
    avg_rebounds                       REAL,
    avg_rebounds_percentile            REAL,
    avg_rebounds_rank                  REAL,
    avg_field_goals                    REAL,
    avg_field_goals_percentile         REAL,
    avg_field_goals_rank               REAL,
    total_three_pointers               INTEGER,
    total_three_pointers_percentile    REAL,
    total_three_pointers_rank          REAL,
    avg_free_throw_attempts            REAL,
    avg_free_throw_attempts_percentile REAL,
    avg_free_throw_attempts_rank       REAL,
    three_point_percentage             REAL,
    three_point_percentage_percentile  REAL,
    three_point_percentage_rank        REAL,
    free_throw_percentage              REAL,
    free_throw_percentage_percentile   REAL,
    free_throw_percentage_rank         REAL
);
"#;

/// In-memory store seeded with a small league:
///
/// - Celtics (2): no players with recorded minutes
/// - Lakers (1): LeBron James (10, 3000 min), Anthony Davis (11, 2800 min),
///   Bench Guy (12, no stats row), Two-Way Guy (13, NULL minutes)
#[cfg(test)]
pub fn fixture() -> SqliteStore {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA_SQL).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO teams (id, name) VALUES (1, 'Lakers'), (2, 'Celtics'), (3, 'Bulls');
        INSERT INTO players (id, team_id, name) VALUES
            (10, 1, 'LeBron James'),
            (11, 1, 'Anthony Davis'),
            (12, 1, 'Bench Guy'),
            (13, 1, 'Two-Way Guy'),
            (20, 2, 'Unused Rookie'),
            (30, 3, 'Bulls Starter');
        INSERT INTO player_stats_with_percentiles VALUES
            (10, 3000.0,
             25.7, 0.98, 1.0,
             7.2, 0.80, 15.0,
             7.3, 0.85, 12.0,
             9.6, 0.95, 4.0,
             132, 0.70, 40.0,
             5.7, 0.90, 9.0,
             0.41, 0.88, 2.0,
             0.75, 0.35, 180.0),
            (11, 2800.0,
             24.1, 0.97, 3.0,
             3.5, 0.55, 90.0,
             12.6, 0.99, 1.0,
             9.4, 0.94, 5.0,
             22, 0.20, 260.0,
             7.1, 0.96, 3.0,
             NULL, NULL, NULL,
             0.82, 0.60, 110.0),
            (13, NULL,
             1.0, 0.01, 400.0,
             0.5, 0.02, 410.0,
             0.8, 0.03, 405.0,
             0.4, 0.01, 420.0,
             0, 0.0, 450.0,
             0.1, 0.01, 430.0,
             0.0, 0.0, 450.0,
             0.5, 0.05, 400.0),
            (30, 2500.0,
             20.0, 0.90, 20.0,
             4.0, 0.60, 80.0,
             5.0, 0.50, 150.0,
             7.0, 0.80, 40.0,
             80, 0.50, 140.0,
             4.0, 0.70, 60.0,
             0.36, 0.60, 100.0,
             0.80, 0.50, 150.0);
        "#,
    )
    .unwrap();
    SqliteStore::from_connection(conn)
}
