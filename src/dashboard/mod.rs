use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error};

use crate::chart::{self, MedalIcons, MedalLayout};
use crate::db::models::{Player, PlayerStats, Team};
use crate::db::DataAccess;
use crate::selection::{self, NO_PLAYERS, NO_PLAYER_DATA, NO_STATS_SELECTED, NO_TEAMS};
use crate::stats::Stat;

#[derive(Clone)]
pub struct AppState {
    pub data: DataAccess,
    pub images_dir: PathBuf,
    pub medal_layout: MedalLayout,
    pub season_label: String,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/stats", get(catalog_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/teams/:team_id/players", get(players_handler))
        .route("/api/players/:player_id/stats", get(player_stats_handler))
        .route("/api/pizza", post(pizza_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Outcome of one selection stage: the data, a query error if one
/// happened, and the empty-state message to show instead of the next
/// widget.
#[derive(Debug, Serialize)]
struct Stage<T> {
    data: T,
    error: Option<String>,
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    key: Stat,
    label: &'static str,
    column: &'static str,
    default_selected: bool,
}

#[derive(Debug, Deserialize)]
struct PizzaBody {
    player: String,
    team: String,
    /// Display labels, in the order the wedges should appear
    stats: Vec<String>,
    row: PlayerStats,
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/stats
async fn catalog_handler() -> impl IntoResponse {
    let entries: Vec<CatalogEntry> = Stat::ALL
        .into_iter()
        .map(|stat| CatalogEntry {
            key: stat,
            label: stat.label(),
            column: stat.column(),
            default_selected: true,
        })
        .collect();
    Json(entries)
}

/// GET /api/teams
async fn teams_handler(State(state): State<Arc<AppState>>) -> Json<Stage<Vec<Team>>> {
    let fetched = state.data.list_teams().await;
    let message = fetched.data.is_empty().then_some(NO_TEAMS);
    Json(Stage {
        data: fetched.data,
        error: fetched.error,
        message,
    })
}

/// GET /api/teams/:team_id/players
async fn players_handler(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> Json<Stage<Vec<Player>>> {
    let fetched = state.data.list_players_for_team(team_id).await;
    let message = fetched.data.is_empty().then_some(NO_PLAYERS);
    Json(Stage {
        data: fetched.data,
        error: fetched.error,
        message,
    })
}

/// GET /api/players/:player_id/stats
async fn player_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> Json<Stage<Option<PlayerStats>>> {
    let fetched = state.data.get_player_stats(player_id).await;
    let message = fetched.data.is_none().then_some(NO_PLAYER_DATA);
    Json(Stage {
        data: fetched.data,
        error: fetched.error,
        message,
    })
}

/// POST /api/pizza
///
/// Renders from the stats row the page already holds, so changing the stat
/// selection never touches the database.
async fn pizza_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PizzaBody>,
) -> Result<Response, (StatusCode, String)> {
    let selected = selection::parse_selection(&body.stats)
        .map_err(|label| (StatusCode::BAD_REQUEST, format!("Unknown stat: {}", label)))?;
    if selected.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, NO_STATS_SELECTED.to_string()));
    }

    let medals = MedalIcons::load(&state.images_dir, state.medal_layout).map_err(|e| {
        error!("Medal assets unavailable: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let projection = selection::project(&body.row, &selected);
    let request = projection.request(&body.player, &body.team, &state.season_label);
    let chart = chart::render(&request, &medals).map_err(|e| {
        error!("Pizza render failed for {}: {}", body.player, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    debug!(
        "Rendered pizza for {} ({} wedges, {} medals)",
        body.player,
        chart.wedges.len(),
        chart.medals.len()
    );

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], chart.to_svg()).into_response())
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Interactive Basketball Pizza Plot</title>
<style>
  :root {
    --bg: #f7f7f9;
    --card: #ffffff;
    --border: #d9dbe3;
    --accent: #1f4fd1;
    --text: #1c1e26;
    --muted: #6b6f80;
    --red: #c62839;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); background: var(--card); }
  header h1 { font-size: 1.5rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; grid-template-columns: 320px 1fr; gap: 1.5rem; }
  @media (max-width: 900px) { main { grid-template-columns: 1fr; } }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  label.field { display: block; color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin: .8rem 0 .4rem; }
  label.field:first-child { margin-top: 0; }
  select { width: 100%; padding: .45rem; border: 1px solid var(--border); border-radius: 6px; font-size: .95rem; }
  select:disabled { color: var(--muted); }
  .stat-option { display: flex; align-items: center; gap: .5rem; padding: .2rem 0; font-size: .9rem; }
  .notice { color: var(--muted); padding: 1rem 0; font-size: .95rem; }
  .notice.error { color: var(--red); }
  #chart svg { width: 100%; height: auto; max-width: 800px; }
</style>
</head>
<body>
<header><h1>Interactive Basketball Pizza Plot</h1></header>

<main>
  <div class="panel">
    <label class="field" for="team">Team Name</label>
    <select id="team" disabled></select>
    <label class="field" for="player">Player Name</label>
    <select id="player" disabled></select>
    <label class="field">Select Stats to Display</label>
    <div id="stats"></div>
    <div id="selection-notice" class="notice"></div>
  </div>

  <div class="panel">
    <div id="notice" class="notice"></div>
    <div id="chart"></div>
  </div>
</main>

<script>
const state = { teams: [], players: [], row: null, catalog: [], renderSeq: 0 };
const $ = id => document.getElementById(id);

function notice(el, text, isError) {
  el.textContent = text || '';
  el.className = 'notice' + (isError ? ' error' : '');
}

function clearChart(text, isError) {
  $('chart').innerHTML = '';
  notice($('notice'), text, isError);
}

function fill(select, items) {
  select.innerHTML = '';
  for (const item of items) {
    const opt = document.createElement('option');
    opt.value = item.id;
    opt.textContent = item.name;
    select.appendChild(opt);
  }
  select.disabled = items.length === 0;
}

async function getJson(url) {
  const r = await fetch(url);
  if (!r.ok) throw new Error(await r.text());
  return r.json();
}

function showStage(stage) {
  if (stage.error) notice($('selection-notice'), stage.error, true);
  else notice($('selection-notice'), stage.message, false);
}

async function loadCatalog() {
  state.catalog = await getJson('/api/stats');
  const box = $('stats');
  box.innerHTML = '';
  for (const entry of state.catalog) {
    const row = document.createElement('label');
    row.className = 'stat-option';
    const cb = document.createElement('input');
    cb.type = 'checkbox';
    cb.value = entry.label;
    cb.checked = entry.default_selected;
    cb.addEventListener('change', renderPizza);
    row.appendChild(cb);
    row.appendChild(document.createTextNode(entry.label));
    box.appendChild(row);
  }
}

async function loadTeams() {
  const stage = await getJson('/api/teams');
  state.teams = stage.data;
  fill($('team'), state.teams);
  showStage(stage);
  if (state.teams.length) await loadPlayers();
  else clearChart(stage.message, false);
}

// Responses for a team or player that is no longer selected are dropped.
async function loadPlayers() {
  const teamId = $('team').value;
  state.row = null;
  state.renderSeq++;
  const stage = await getJson(`/api/teams/${teamId}/players`);
  if ($('team').value !== teamId) return;
  state.players = stage.data;
  fill($('player'), state.players);
  showStage(stage);
  if (state.players.length) await loadPlayerStats();
  else clearChart(stage.message, false);
}

async function loadPlayerStats() {
  const teamId = $('team').value;
  const playerId = $('player').value;
  state.row = null;
  state.renderSeq++;
  const stage = await getJson(`/api/players/${playerId}/stats`);
  if ($('team').value !== teamId || $('player').value !== playerId) return;
  state.row = stage.data;
  showStage(stage);
  if (state.row) await renderPizza();
  else clearChart(stage.message, !!stage.error);
}

function selectedLabels() {
  return Array.from($('stats').querySelectorAll('input:checked')).map(cb => cb.value);
}

async function renderPizza() {
  if (!state.row) return;
  const seq = ++state.renderSeq;
  const team = $('team').selectedOptions[0];
  const player = $('player').selectedOptions[0];
  const r = await fetch('/api/pizza', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({
      player: player ? player.textContent : '',
      team: team ? team.textContent : '',
      stats: selectedLabels(),
      row: state.row,
    }),
  });
  const text = await r.text();
  if (seq !== state.renderSeq) return;
  if (!r.ok) { clearChart(text, r.status >= 500); return; }
  notice($('notice'), '', false);
  $('chart').innerHTML = text;
}

// Each widget only re-runs the stages downstream of it.
$('team').addEventListener('change', () => loadPlayers().catch(e => clearChart(e.message, true)));
$('player').addEventListener('change', () => loadPlayerStats().catch(e => clearChart(e.message, true)));

loadCatalog()
  .then(loadTeams)
  .catch(e => clearChart(e.message, true));
</script>
</body>
</html>"#;
