use chrono::NaiveDate;
use color_eyre::{eyre::OptionExt, Result};

use super::models::PlayerTeamRow;
use super::Db;
use crate::models::{season_mode, PlayerRecord};
use crate::services::quiz::AppearanceRepository;

impl Db {
    pub async fn latest_game_date(&self) -> Result<NaiveDate> {
        let latest: Option<NaiveDate> = sqlx::query_scalar(
            "SELECT MAX(game_date) FROM fbref_appearances WHERE competition_name = $1",
        )
        .bind(self.competition())
        .fetch_one(&self.pool)
        .await?;

        latest.ok_or_eyre("no games recorded for competition")
    }

    /// Distinct players with at least `min_seasons` seasons, sorted by name.
    pub async fn players(&self, min_seasons: i32) -> Result<Vec<String>> {
        let mut players: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT player_name
            FROM fbref_appearances
            WHERE competition_name = $1
                AND number_of_seasons >= $2
            "#,
        )
        .bind(self.competition())
        .bind(min_seasons)
        .fetch_all(&self.pool)
        .await?;

        // Byte order rather than the server collation.
        players.sort();
        Ok(players)
    }

    pub async fn player_record(&self, player_name: &str) -> Result<PlayerRecord> {
        let rows: Vec<PlayerTeamRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT team_name, number_of_seasons
            FROM fbref_appearances
            WHERE competition_name = $1
                AND player_name = $2
            "#,
        )
        .bind(self.competition())
        .bind(player_name)
        .fetch_all(&self.pool)
        .await?;

        let number_of_seasons = season_mode(rows.iter().map(|r| r.number_of_seasons))
            .ok_or_else(|| color_eyre::eyre::eyre!("no appearances recorded for '{player_name}'"))?;
        let teams = rows.into_iter().map(|r| r.team_name).collect();

        Ok(PlayerRecord {
            teams,
            number_of_seasons,
        })
    }

    /// Every club in the table, across all competitions.
    pub async fn teams(&self) -> Result<Vec<String>> {
        let mut teams: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT team_name FROM fbref_appearances")
                .fetch_all(&self.pool)
                .await?;

        teams.sort();
        Ok(teams)
    }
}

impl AppearanceRepository for Db {
    async fn latest_game_date(&self) -> Result<NaiveDate> {
        Db::latest_game_date(self).await
    }

    async fn players(&self, min_seasons: i32) -> Result<Vec<String>> {
        Db::players(self, min_seasons).await
    }

    async fn player_record(&self, player_name: &str) -> Result<PlayerRecord> {
        Db::player_record(self, player_name).await
    }

    async fn teams(&self) -> Result<Vec<String>> {
        Db::teams(self).await
    }
}
