// Database row structs

#[derive(Debug, sqlx::FromRow)]
pub struct PlayerTeamRow {
    pub team_name: String,
    pub number_of_seasons: i32,
}
