use clap::Parser;
use std::path::PathBuf;

use crate::chart::MedalLayout;
use crate::db::postgres::PgSettings;

/// Basketball player percentile pizza charts
#[derive(Parser, Debug, Clone)]
#[command(name = "hoops-pizza", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8501")]
    pub dashboard_addr: String,

    /// Read stats from this SQLite file instead of Postgres
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<String>,

    /// Postgres user
    #[arg(long, env = "DB_USERNAME")]
    pub db_username: Option<String>,

    /// Postgres password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Postgres host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Postgres port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    /// Postgres database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Directory holding the medal images
    #[arg(long, env = "IMAGES_DIR", default_value = "images")]
    pub images_dir: PathBuf,

    /// Which medal images to use for ranks 1–3
    #[arg(long, env = "MEDAL_LAYOUT", value_enum, default_value = "shared")]
    pub medal_layout: MedalLayout,

    /// Second title line of every chart
    #[arg(long, env = "SEASON_LABEL", default_value = "NBA Season | 2023-24")]
    pub season_label: String,
}

/// Where player stats are read from
#[derive(Debug, Clone)]
pub enum Backend {
    Sqlite(String),
    Postgres(PgSettings),
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_path.is_none() {
            if self.db_username.is_none() {
                anyhow::bail!("DB_USERNAME is required unless --database-path is given");
            }
            if self.db_name.is_none() {
                anyhow::bail!("DB_NAME is required unless --database-path is given");
            }
        }
        if self.db_port == 0 {
            anyhow::bail!("db_port must be non-zero");
        }
        if self.season_label.trim().is_empty() {
            anyhow::bail!("season_label must not be empty");
        }
        Ok(())
    }

    /// The configured backend. Call after [`Config::validate`].
    pub fn backend(&self) -> anyhow::Result<Backend> {
        if let Some(path) = &self.database_path {
            return Ok(Backend::Sqlite(path.clone()));
        }
        let (Some(username), Some(database)) = (&self.db_username, &self.db_name) else {
            anyhow::bail!("Postgres backend needs DB_USERNAME and DB_NAME");
        };
        Ok(Backend::Postgres(PgSettings {
            host: self.db_host.clone(),
            port: self.db_port,
            username: username.clone(),
            password: self.db_password.clone(),
            database: database.clone(),
        }))
    }
}
