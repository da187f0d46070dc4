use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

use super::models::*;
use super::{assemble_stats, player_stats_sql, players_sql, Dialect, StatsStore, TEAMS_SQL};

/// Connection settings for the Postgres backend
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: String,
}

/// Postgres-backed store over a lazily connected sqlx pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build the pool without connecting; the first query opens a
    /// connection, so an unreachable server shows up as a query error.
    pub fn connect_lazy(settings: &PgSettings) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.username)
            .database(&settings.database);
        if let Some(password) = &settings.password {
            options = options.password(password);
        }
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_lazy_with(options);
        info!(
            "Postgres pool configured for {}@{}:{}/{}",
            settings.username, settings.host, settings.port, settings.database
        );
        PgStore { pool }
    }
}

#[async_trait]
impl StatsStore for PgStore {
    async fn list_teams(&self) -> Result<Vec<Team>> {
        let rows = sqlx::query(TEAMS_SQL).fetch_all(&self.pool).await?;
        let teams = rows
            .iter()
            .map(|row| -> Result<Team, sqlx::Error> {
                Ok(Team {
                    name: row.try_get(0)?,
                    id: row.try_get(1)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(teams)
    }

    async fn list_players_for_team(&self, team_id: i64) -> Result<Vec<Player>> {
        let rows = sqlx::query(&players_sql(Dialect::Postgres))
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        let players = rows
            .iter()
            .map(|row| -> Result<Player, sqlx::Error> {
                Ok(Player {
                    name: row.try_get(0)?,
                    id: row.try_get(1)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(players)
    }

    async fn get_player_stats(&self, player_id: i64) -> Result<Option<PlayerStats>> {
        let row = sqlx::query(&player_stats_sql(Dialect::Postgres))
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(map_player_stats(&row)?)),
            None => Ok(None),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Postgres pool closed");
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

fn map_player_stats(row: &PgRow) -> Result<PlayerStats, sqlx::Error> {
    assemble_stats(row.try_get(0)?, row.try_get(1)?, |offset| -> Result<_, sqlx::Error> {
        Ok((
            row.try_get(offset)?,
            row.try_get(offset + 1)?,
            row.try_get(offset + 2)?,
            row.try_get(offset + 3)?,
        ))
    })
}
