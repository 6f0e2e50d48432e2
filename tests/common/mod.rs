#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use color_eyre::{eyre::eyre, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use whodtheyplayfor::{
    cache::CachedRepository,
    db::{Db, DbConfig},
    models::PlayerRecord,
    services::quiz::{AppearanceRepository, QuizService},
    session::SessionStore,
    AppState,
};

pub const COMPETITION: &str = "Champions League";

/// A handle to a server nobody listens on; every query fails.
pub fn unreachable_db() -> Db {
    Db::connect_lazy(&DbConfig {
        server: "127.0.0.1:1".to_string(),
        database: "football".to_string(),
        username: "reader".to_string(),
        password: "secret".to_string(),
        competition: COMPETITION.to_string(),
    })
    .expect("lazy pool should build")
}

pub fn app_state<R: AppearanceRepository>(repo: R) -> AppState<R> {
    AppState {
        quiz: Arc::new(QuizService::new(CachedRepository::new(
            repo,
            Duration::from_secs(1200),
        ))),
        sessions: SessionStore::new(Duration::from_secs(3600)),
        competition: Arc::from(COMPETITION),
        reset_delay: Duration::from_secs(3),
        secure_cookies: false,
    }
}

/// In-memory appearances: eligible players per threshold and one record per player.
#[derive(Default)]
pub struct FixedAppearances {
    pools: HashMap<i32, Vec<String>>,
    records: HashMap<String, PlayerRecord>,
}

impl FixedAppearances {
    pub fn pool(mut self, min_seasons: i32, players: &[&str]) -> Self {
        self.pools
            .insert(min_seasons, players.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn record(mut self, player: &str, teams: &[&str], seasons: i32) -> Self {
        self.records.insert(
            player.to_string(),
            PlayerRecord {
                teams: teams.iter().map(|t| t.to_string()).collect(),
                number_of_seasons: seasons,
            },
        );
        self
    }
}

impl AppearanceRepository for FixedAppearances {
    async fn latest_game_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 5, 31).ok_or_else(|| eyre!("bad date"))
    }

    async fn players(&self, min_seasons: i32) -> Result<Vec<String>> {
        Ok(self.pools.get(&min_seasons).cloned().unwrap_or_default())
    }

    async fn player_record(&self, player_name: &str) -> Result<PlayerRecord> {
        self.records
            .get(player_name)
            .cloned()
            .ok_or_else(|| eyre!("unknown player {player_name}"))
    }

    async fn teams(&self) -> Result<Vec<String>> {
        let teams: BTreeSet<String> = self
            .records
            .values()
            .flat_map(|record| record.teams.iter().cloned())
            .collect();
        Ok(teams.into_iter().collect())
    }
}

/// Database in a fresh schema seeded from `rows`. Needs `TEST_DATABASE_URL`.
///
/// Rows are `(player_name, team_name, competition_name, number_of_seasons, game_date)`.
pub async fn seeded_db(rows: &[(&str, &str, &str, i32, &str)]) -> Db {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a Postgres database");
    let options = PgConnectOptions::from_str(&url).expect("TEST_DATABASE_URL should parse");

    let schema = format!("test_{}", ulid::Ulid::new().to_string().to_lowercase());
    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await
        .expect("failed to connect to test database");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("failed to create schema");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options.options([("search_path", schema.as_str())]))
        .await
        .expect("failed to connect with schema");

    sqlx::query(
        r#"
        CREATE TABLE fbref_appearances (
            player_name TEXT NOT NULL,
            team_name TEXT NOT NULL,
            competition_name TEXT NOT NULL,
            number_of_seasons INTEGER NOT NULL,
            game_date DATE NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("failed to create table");

    for &(player, team, competition, seasons, date) in rows {
        sqlx::query(
            "INSERT INTO fbref_appearances VALUES ($1, $2, $3, $4, $5::DATE)",
        )
        .bind(player)
        .bind(team)
        .bind(competition)
        .bind(seasons)
        .bind(date)
        .execute(&pool)
        .await
        .expect("failed to insert row");
    }

    Db::from_pool(pool, COMPETITION)
}
